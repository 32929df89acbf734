use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::screening::parser::{Field, Verdict};

/// The four screening actions offered by the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Summary,
    PercentageMatch,
    FitForRole,
    Filter,
}

impl Action {
    pub const ALL: [Action; 4] = [
        Action::Summary,
        Action::PercentageMatch,
        Action::FitForRole,
        Action::Filter,
    ];

    /// Summary works from the resume alone; everything else compares against a JD.
    pub fn requires_job_description(&self) -> bool {
        !matches!(self, Action::Summary)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Summary => "summary",
            Action::PercentageMatch => "percentage_match",
            Action::FitForRole => "fit_for_role",
            Action::Filter => "filter",
        }
    }

    /// Button label shown in the sidebar.
    pub fn label(&self) -> &'static str {
        match self {
            Action::Summary => "Summary of the Resumes",
            Action::PercentageMatch => "Percentage Match",
            Action::FitForRole => "Fit for Role",
            Action::Filter => "Filter",
        }
    }

    /// Table columns after the leading `Sl.No` index.
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Action::Summary => &["File Name", "Response"],
            Action::PercentageMatch => &[
                "File Name",
                "Percentage Match",
                "Keywords Missing",
                "Final Thoughts",
            ],
            Action::FitForRole => &["File Name", "Status", "Reason"],
            Action::Filter => &["File Name", "Reason"],
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|a| a.as_str() == s.trim())
            .ok_or_else(|| format!("unknown action '{s}'"))
    }
}

/// One processed document. Shape depends on the action that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ResultRecord {
    Summary {
        file_name: String,
        response: String,
    },
    PercentageMatch {
        file_name: String,
        percentage_match: Field,
        keywords_missing: Field,
        final_thoughts: Field,
    },
    FitForRole {
        file_name: String,
        status: Verdict,
        reason: Field,
    },
    Filter {
        file_name: String,
        reason: Field,
    },
}

impl ResultRecord {
    pub fn file_name(&self) -> &str {
        match self {
            ResultRecord::Summary { file_name, .. }
            | ResultRecord::PercentageMatch { file_name, .. }
            | ResultRecord::FitForRole { file_name, .. }
            | ResultRecord::Filter { file_name, .. } => file_name,
        }
    }

    /// Cell values in the order of `Action::columns`.
    pub fn cells(&self) -> Vec<String> {
        match self {
            ResultRecord::Summary {
                file_name,
                response,
            } => vec![file_name.clone(), response.clone()],
            ResultRecord::PercentageMatch {
                file_name,
                percentage_match,
                keywords_missing,
                final_thoughts,
            } => vec![
                file_name.clone(),
                percentage_match.to_string(),
                keywords_missing.to_string(),
                final_thoughts.to_string(),
            ],
            ResultRecord::FitForRole {
                file_name,
                status,
                reason,
            } => vec![file_name.clone(), status.to_string(), reason.to_string()],
            ResultRecord::Filter { file_name, reason } => {
                vec![file_name.clone(), reason.to_string()]
            }
        }
    }
}

/// Pipeline stage at which a document's task failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Extraction,
    Model,
    Parsing,
    Task,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Extraction => "extraction",
            Stage::Model => "model",
            Stage::Parsing => "parsing",
            Stage::Task => "task",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFailure {
    pub file_name: String,
    pub stage: Stage,
    pub message: String,
}

/// Outcome of one screening run. Every input document is accounted for exactly
/// once across `records`, `failures` and `excluded`.
#[derive(Debug, Clone, Serialize)]
pub struct ScreeningReport {
    pub run_id: Uuid,
    pub action: Action,
    pub generated_at: DateTime<Utc>,
    pub total: usize,
    /// Completion order, not upload order.
    pub records: Vec<ResultRecord>,
    pub failures: Vec<FileFailure>,
    /// Documents dropped by the filter action because their verdict was "No".
    pub excluded: usize,
}

impl ScreeningReport {
    pub fn is_reconciled(&self) -> bool {
        self.records.len() + self.failures.len() + self.excluded == self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_round_trips_through_form_value() {
        for action in Action::ALL {
            assert_eq!(action.as_str().parse::<Action>().unwrap(), action);
        }
        assert!("rank".parse::<Action>().is_err());
    }

    #[test]
    fn test_only_summary_skips_job_description() {
        assert!(!Action::Summary.requires_job_description());
        assert!(Action::PercentageMatch.requires_job_description());
        assert!(Action::FitForRole.requires_job_description());
        assert!(Action::Filter.requires_job_description());
    }

    #[test]
    fn test_cells_follow_columns() {
        let record = ResultRecord::PercentageMatch {
            file_name: "a.pdf".into(),
            percentage_match: Field::Parsed("80%".into()),
            keywords_missing: Field::Unparsed,
            final_thoughts: Field::Parsed("Good".into()),
        };
        let cells = record.cells();
        assert_eq!(cells.len(), Action::PercentageMatch.columns().len());
        assert_eq!(cells, vec!["a.pdf", "80%", "(unparsed)", "Good"]);
    }

    #[test]
    fn test_fit_record_serializes_flat() {
        let record = ResultRecord::FitForRole {
            file_name: "b.pdf".into(),
            status: Verdict::Yes,
            reason: Field::Parsed("Knows Rust".into()),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"file_name": "b.pdf", "status": "Yes", "reason": "Knows Rust"})
        );
    }
}
