//! Response Parsers: structured extraction from the model's free-text replies.
//!
//! These parsers are coupled to the wording of `PERCENTAGE_MATCH_PROMPT` and
//! `FIT_FOR_ROLE_PROMPT`. The markers matched here are the ones those prompts
//! ask the model to emit.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Serialize, Serializer};
use thiserror::Error;

/// Rendered in place of a field the reply did not contain.
pub const UNPARSED_MARKER: &str = "(unparsed)";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("reply contains no standalone 'Yes' or 'No' verdict")]
    MissingVerdict,
}

/// A value recovered from a reply, or an explicit marker that it was absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    Parsed(String),
    Unparsed,
}

impl Field {
    fn from_capture(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if !v.is_empty() => Field::Parsed(v.to_string()),
            _ => Field::Unparsed,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Field::Parsed(v) => v,
            Field::Unparsed => UNPARSED_MARKER,
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, Field::Parsed(_))
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One structured view of a model reply.
pub trait StructuredReply: Sized {
    fn parse(reply: &str) -> Result<Self, ParseError>;
}

/// Reply to the percentage-match prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PercentageMatch {
    pub percentage: Field,
    pub keywords_missing: Field,
    pub final_thoughts: Field,
}

/// Reply to the fit-for-role prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FitAssessment {
    pub is_relatable: Verdict,
    pub reason: Field,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Verdict {
    Yes,
    No,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Yes => "Yes",
            Verdict::No => "No",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn percentage_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([^%]+%)").expect("valid regex"))
}

fn keywords_missing_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)Keywords Missing:(.*?)Final Thoughts:").expect("valid regex"))
}

fn final_thoughts_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)Final Thoughts:(.*)$").expect("valid regex"))
}

fn verdict_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(Yes|No)\b").expect("valid regex"))
}

impl StructuredReply for PercentageMatch {
    /// Never fails: each missing marker yields an `Unparsed` field.
    fn parse(reply: &str) -> Result<Self, ParseError> {
        let capture = |re: &Regex| {
            re.captures(reply)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str())
        };
        Ok(PercentageMatch {
            percentage: Field::from_capture(capture(percentage_re())),
            keywords_missing: Field::from_capture(capture(keywords_missing_re())),
            final_thoughts: Field::from_capture(capture(final_thoughts_re())),
        })
    }
}

impl StructuredReply for FitAssessment {
    fn parse(reply: &str) -> Result<Self, ParseError> {
        let token = verdict_re()
            .captures(reply)
            .and_then(|c| c.get(1))
            .ok_or(ParseError::MissingVerdict)?;

        let is_relatable = if token.as_str() == "Yes" {
            Verdict::Yes
        } else {
            Verdict::No
        };

        let remainder = reply[token.end()..]
            .trim_start_matches(|c: char| c.is_whitespace() || matches!(c, ',' | '.' | ':' | ';' | '-'))
            .trim_end();

        Ok(FitAssessment {
            is_relatable,
            reason: Field::from_capture(Some(capitalize_first(remainder).as_str())),
        })
    }
}

/// Upper-cases the first character and leaves the rest untouched.
fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(v: &str) -> Field {
        Field::Parsed(v.to_string())
    }

    #[test]
    fn test_percentage_match_single_line_reply() {
        let reply = "82% Keywords Missing: cloud, testing Final Thoughts: Strong candidate.";
        let result = PercentageMatch::parse(reply).unwrap();
        assert_eq!(
            result,
            PercentageMatch {
                percentage: parsed("82%"),
                keywords_missing: parsed("cloud, testing"),
                final_thoughts: parsed("Strong candidate."),
            }
        );
    }

    #[test]
    fn test_percentage_match_multi_line_reply() {
        let reply = "75%\n\nKeywords Missing: Kubernetes,\nTerraform\n\nFinal Thoughts: Solid backend\nexperience overall.";
        let result = PercentageMatch::parse(reply).unwrap();
        assert_eq!(result.percentage, parsed("75%"));
        assert_eq!(result.keywords_missing, parsed("Kubernetes,\nTerraform"));
        assert_eq!(result.final_thoughts, parsed("Solid backend\nexperience overall."));
    }

    #[test]
    fn test_percentage_is_leading_run_through_first_percent() {
        let reply = "Match: 64% overall, 10% bonus Keywords Missing: None Final Thoughts: Ok";
        let result = PercentageMatch::parse(reply).unwrap();
        assert_eq!(result.percentage, parsed("Match: 64%"));
    }

    #[test]
    fn test_fields_cover_whole_reply_modulo_markers() {
        let reply = "90% Keywords Missing: Go Final Thoughts: Hire.";
        let result = PercentageMatch::parse(reply).unwrap();
        let rebuilt = format!(
            "{} Keywords Missing: {} Final Thoughts: {}",
            result.percentage, result.keywords_missing, result.final_thoughts
        );
        assert_eq!(rebuilt, reply);
    }

    #[test]
    fn test_missing_markers_are_explicitly_unparsed() {
        let result = PercentageMatch::parse("I cannot evaluate this resume.").unwrap();
        assert_eq!(result.percentage, Field::Unparsed);
        assert_eq!(result.keywords_missing, Field::Unparsed);
        assert_eq!(result.final_thoughts, Field::Unparsed);
        assert_eq!(result.final_thoughts.to_string(), UNPARSED_MARKER);
    }

    #[test]
    fn test_final_thoughts_without_keywords_marker() {
        let result = PercentageMatch::parse("55% Final Thoughts: Needs more cloud work").unwrap();
        assert_eq!(result.percentage, parsed("55%"));
        assert_eq!(result.keywords_missing, Field::Unparsed);
        assert_eq!(result.final_thoughts, parsed("Needs more cloud work"));
    }

    #[test]
    fn test_fit_for_role_yes_with_reason() {
        let reply = "Yes, strong alignment with backend requirements.";
        let result = FitAssessment::parse(reply).unwrap();
        assert_eq!(result.is_relatable, Verdict::Yes);
        assert_eq!(result.reason, parsed("Strong alignment with backend requirements."));
    }

    #[test]
    fn test_fit_for_role_no_with_period() {
        let result = FitAssessment::parse("No. the candidate has only frontend experience").unwrap();
        assert_eq!(result.is_relatable, Verdict::No);
        assert_eq!(result.reason, parsed("The candidate has only frontend experience"));
    }

    #[test]
    fn test_fit_for_role_keeps_inner_capitalisation() {
        let result = FitAssessment::parse("Yes - uses AWS and PostgreSQL daily").unwrap();
        assert_eq!(result.reason, parsed("Uses AWS and PostgreSQL daily"));
    }

    #[test]
    fn test_fit_for_role_ignores_embedded_tokens() {
        let result = FitAssessment::parse("Nothing stands out. Not a Yesman. No, lacks Rust.").unwrap();
        assert_eq!(result.is_relatable, Verdict::No);
        assert_eq!(result.reason, parsed("Lacks Rust."));
    }

    #[test]
    fn test_fit_for_role_verdict_without_reason() {
        let result = FitAssessment::parse("Yes").unwrap();
        assert_eq!(result.is_relatable, Verdict::Yes);
        assert_eq!(result.reason, Field::Unparsed);
    }

    #[test]
    fn test_fit_for_role_without_verdict_is_an_error() {
        assert_eq!(
            FitAssessment::parse("The candidate could be relatable."),
            Err(ParseError::MissingVerdict)
        );
    }

    #[test]
    fn test_parsing_is_deterministic() {
        let reply = "Yes, good fit.";
        assert_eq!(FitAssessment::parse(reply), FitAssessment::parse(reply));
    }

    #[test]
    fn test_field_serializes_as_string() {
        let json = serde_json::to_value(PercentageMatch::parse("70%").unwrap()).unwrap();
        assert_eq!(json["percentage"], "70%");
        assert_eq!(json["keywords_missing"], UNPARSED_MARKER);
    }
}
