//! Presentation Layer: renders the screening page and its result table.

use askama::Template;

use crate::models::screening::{Action, FileFailure, ScreeningReport};
use crate::screening::form::InputMode;

pub const EMPTY_FILTER_MESSAGE: &str = "Oops... No data found";

/// Table of result records. The template prepends the 1-based `Sl.No` column.
#[derive(Debug, Clone)]
pub struct ResultTable {
    pub heading: String,
    pub columns: &'static [&'static str],
    pub rows: Vec<Vec<String>>,
    /// Set instead of rendering an empty filter table.
    pub empty_message: Option<String>,
}

impl ResultTable {
    pub fn from_report(report: &ScreeningReport) -> Self {
        let rows: Vec<Vec<String>> = report.records.iter().map(|r| r.cells()).collect();
        let (heading, empty_message) = match report.action {
            Action::Filter if rows.is_empty() => {
                (String::new(), Some(EMPTY_FILTER_MESSAGE.to_string()))
            }
            Action::Filter => (format!("Total Responses: {}", rows.len()), None),
            _ => ("Responses:".to_string(), None),
        };
        ResultTable {
            heading,
            columns: report.action.columns(),
            rows,
            empty_message,
        }
    }
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct ScreenPage<'a> {
    pub actions: &'a [Action],
    pub mode: &'a str,
    pub location: &'a str,
    pub job_description: &'a str,
    pub notice: Option<String>,
    pub message: Option<String>,
    pub table: Option<ResultTable>,
    pub failures: Vec<FileFailure>,
}

impl<'a> ScreenPage<'a> {
    /// The page as first served, or re-served with the user's previous input.
    pub fn new(mode: InputMode, location: &'a str, job_description: &'a str) -> Self {
        ScreenPage {
            actions: &Action::ALL,
            mode: mode.as_str(),
            location,
            job_description,
            notice: None,
            message: None,
            table: None,
            failures: Vec::new(),
        }
    }

    pub fn with_report(mut self, report: ScreeningReport) -> Self {
        self.table = Some(ResultTable::from_report(&report));
        self.failures = report.failures;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    use crate::models::screening::{ResultRecord, Stage};
    use crate::screening::parser::{Field, Verdict};

    fn report(action: Action, records: Vec<ResultRecord>) -> ScreeningReport {
        ScreeningReport {
            run_id: Uuid::new_v4(),
            action,
            generated_at: Utc::now(),
            total: records.len(),
            records,
            failures: vec![],
            excluded: 0,
        }
    }

    #[test]
    fn test_fit_table_rows_and_columns() {
        let table = ResultTable::from_report(&report(
            Action::FitForRole,
            vec![ResultRecord::FitForRole {
                file_name: "a.pdf".into(),
                status: Verdict::No,
                reason: Field::Parsed("Lacks Rust".into()),
            }],
        ));
        assert_eq!(table.heading, "Responses:");
        assert_eq!(table.columns, &["File Name", "Status", "Reason"]);
        assert_eq!(table.rows, vec![vec!["a.pdf", "No", "Lacks Rust"]]);
        assert!(table.empty_message.is_none());
    }

    #[test]
    fn test_filter_heading_counts_rows() {
        let table = ResultTable::from_report(&report(
            Action::Filter,
            vec![
                ResultRecord::Filter {
                    file_name: "a.pdf".into(),
                    reason: Field::Parsed("Rust".into()),
                },
                ResultRecord::Filter {
                    file_name: "b.pdf".into(),
                    reason: Field::Unparsed,
                },
            ],
        ));
        assert_eq!(table.heading, "Total Responses: 2");
    }

    #[test]
    fn test_empty_filter_shows_message() {
        let table = ResultTable::from_report(&report(Action::Filter, vec![]));
        assert_eq!(table.empty_message.as_deref(), Some(EMPTY_FILTER_MESSAGE));
    }

    #[test]
    fn test_page_renders_sl_no_and_escapes_cells() {
        let page = ScreenPage::new(InputMode::Upload, "", "Rust dev").with_report(report(
            Action::Summary,
            vec![
                ResultRecord::Summary {
                    file_name: "a.pdf".into(),
                    response: "Uses <script> tags".into(),
                },
                ResultRecord::Summary {
                    file_name: "b.pdf".into(),
                    response: "Fresher".into(),
                },
            ],
        ));
        let html = page.render().unwrap();
        assert!(html.contains("<th>Sl.No</th>"));
        assert!(html.contains("<td>1</td>"));
        assert!(html.contains("<td>2</td>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("Summary of the Resumes"));
        assert!(html.contains("Rust dev"));
    }

    #[test]
    fn test_page_lists_failures() {
        let mut r = report(Action::Summary, vec![]);
        r.failures.push(FileFailure {
            file_name: "bad.pdf".into(),
            stage: Stage::Extraction,
            message: "not a PDF document".into(),
        });
        r.total = 1;
        let html = ScreenPage::new(InputMode::Upload, "", "").with_report(r).render().unwrap();
        assert!(html.contains("bad.pdf (extraction): not a PDF document"));
    }

    #[test]
    fn test_page_renders_message_without_table() {
        let mut page = ScreenPage::new(InputMode::LocalFolder, "/tmp/x", "");
        page.message = Some("Please provide the Job Description".into());
        let html = page.render().unwrap();
        assert!(html.contains("Please provide the Job Description"));
        assert!(!html.contains("<table>"));
        assert!(html.contains(r#"<option value="folder" selected>"#));
    }
}
