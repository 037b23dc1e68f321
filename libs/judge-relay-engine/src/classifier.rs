//! Line classifier
//!
//! Decides whether a captured stdout line is diagnostic noise rather than
//! program output. Rules live in an ordered table so each one can be tested
//! on its own and new conventions are appended without touching callers.

use lazy_static::lazy_static;
use regex::Regex;

pub struct NoiseRule {
    pub name: &'static str,
    pub pattern: Regex,
}

impl NoiseRule {
    fn new(name: &'static str, pattern: &str) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).unwrap_or_else(|e| panic!("invalid noise rule {name}: {e}")),
        }
    }

    pub fn matches(&self, line: &str) -> bool {
        self.pattern.is_match(line)
    }
}

lazy_static! {
    static ref NOISE_RULES: Vec<NoiseRule> = vec![
        NoiseRule::new("debug_prefix", r"(?i)^DEBUG:"),
        NoiseRule::new("info_prefix", r"(?i)^INFO:"),
        NoiseRule::new("warning_prefix", r"(?i)^WARNING:"),
        NoiseRule::new("error_prefix", r"(?i)^ERROR:"),
        NoiseRule::new("trace_prefix", r"(?i)^TRACE:"),
        NoiseRule::new("bracketed_tag", r"^\[.*\]"),
        NoiseRule::new("iso_date", r"^\d{4}-\d{2}-\d{2}"),
        NoiseRule::new("starting_function", r"(?i)^Starting the function"),
        NoiseRule::new("input_name", r"(?i)^Input name is:"),
        NoiseRule::new("generated_greeting", r"(?i)^Generated greeting:"),
        NoiseRule::new("debug_label", r"(?i)^Debug:"),
        NoiseRule::new("log_label", r"(?i)^Log:"),
        NoiseRule::new("processing", r"(?i)^Processing"),
        NoiseRule::new("calculating", r"(?i)^Calculating"),
        NoiseRule::new("python_print", r"^print\s*\("),
        NoiseRule::new("java_print", r"^System\.out\.print"),
        NoiseRule::new("cpp_std", r"^std::"),
        NoiseRule::new("comment_debug", r"(?i)^#.*debug"),
    ];
}

/// The full ordered rule table
pub fn noise_rules() -> &'static [NoiseRule] {
    &NOISE_RULES
}

/// Name of the first rule matching the trimmed line, if any
pub fn matching_rule(line: &str) -> Option<&'static str> {
    let line = line.trim();
    noise_rules()
        .iter()
        .find(|rule| rule.matches(line))
        .map(|rule| rule.name)
}

pub fn is_noise(line: &str) -> bool {
    matching_rule(line).is_some()
}
