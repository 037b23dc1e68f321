//! Extraction of program values embedded in noise lines
//!
//! Debug statements frequently echo the value the program is about to
//! print (`Result: 42`). Patterns are tried in table order and only the
//! first match counts.

use lazy_static::lazy_static;
use regex::Regex;

pub struct ExtractionRule {
    pub label: &'static str,
    pub pattern: Regex,
}

impl ExtractionRule {
    /// Builds `^<fragment>\s*(.+)$`, case-insensitive. `fragment` is a regex
    /// fragment that includes its separator; `label` only names the rule.
    fn new(label: &'static str, fragment: &str) -> Self {
        let source = format!(r"(?i)^{fragment}\s*(.+)$");
        Self {
            label,
            pattern: Regex::new(&source).unwrap_or_else(|e| panic!("invalid extraction rule {label}: {e}")),
        }
    }

    /// Trimmed capture, or `None` when the rule does not apply or the value is blank
    pub fn apply(&self, line: &str) -> Option<String> {
        let captured = self.pattern.captures(line)?.get(1)?.as_str().trim();
        if captured.is_empty() {
            None
        } else {
            Some(captured.to_string())
        }
    }
}

lazy_static! {
    static ref EXTRACTION_RULES: Vec<ExtractionRule> = vec![
        ExtractionRule::new("Generated greeting", r"Generated greeting:"),
        ExtractionRule::new("Debug: Generated greeting", r"Debug: Generated greeting -"),
        ExtractionRule::new("Output", r"Output:"),
        ExtractionRule::new("Result", r"Result:"),
        ExtractionRule::new("Answer", r"Answer:"),
        ExtractionRule::new("Response", r"Response:"),
        ExtractionRule::new("Final", r"Final:"),
        ExtractionRule::new("Calculated", r"Calculated:"),
    ];
}

pub fn extraction_rules() -> &'static [ExtractionRule] {
    &EXTRACTION_RULES
}

/// Value embedded in a noise line, from the first rule that matches.
///
/// A matching rule whose capture is blank ends the search with `None`.
pub fn extract(line: &str) -> Option<String> {
    extraction_rules()
        .iter()
        .find(|rule| rule.pattern.is_match(line))
        .and_then(|rule| rule.apply(line))
}
