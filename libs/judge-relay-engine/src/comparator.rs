//! Output comparator
//!
//! Compares the extracted actual output against the caller's expected value
//! at several strictness tiers and explains any mismatch.
//!
//! Lengths and character codes are measured in Unicode scalar values.

use judge_relay_common::types::{Comparison, Difference, MissingOutput, OutputComparison};
use tracing::debug;

pub const MISSING_OUTPUT_REASON: &str = "Missing output for comparison";

fn char_codes(s: &str) -> Vec<u32> {
    s.chars().map(u32::from).collect()
}

pub fn compare(actual: Option<&str>, expected: Option<&str>) -> OutputComparison {
    let (actual, expected) = match (actual, expected) {
        (Some(a), Some(e)) if !a.is_empty() && !e.is_empty() => (a, e),
        _ => {
            return OutputComparison::Missing(MissingOutput {
                matched: false,
                reason: MISSING_OUTPUT_REASON.to_string(),
                actual_length: actual.map_or(0, |a| a.chars().count()),
                expected_length: expected.map_or(0, |e| e.chars().count()),
            });
        }
    };

    debug!(actual = ?actual, expected = ?expected, "Comparing outputs");

    let actual_trimmed = actual.trim();
    let expected_trimmed = expected.trim();
    let actual_length = actual.chars().count();
    let expected_length = expected.chars().count();

    let exact_match = actual == expected;
    let mut differences = Vec::new();
    let mut actual_char_codes = None;
    let mut expected_char_codes = None;

    if !exact_match {
        if actual_length != expected_length {
            differences.push(Difference::LengthMismatch);
        }
        if actual_trimmed != expected_trimmed {
            differences.push(Difference::ContentDifference);
        }
        if actual != actual_trimmed || expected != expected_trimmed {
            differences.push(Difference::WhitespaceDifference);
        }
        let actual_codes = char_codes(actual);
        let expected_codes = char_codes(expected);
        if actual_codes != expected_codes {
            differences.push(Difference::EncodingDifference);
            actual_char_codes = Some(actual_codes);
            expected_char_codes = Some(expected_codes);
        }
    }

    let comparison = Comparison {
        exact_match,
        trimmed_match: actual_trimmed == expected_trimmed,
        case_insensitive_match: actual_trimmed.to_lowercase() == expected_trimmed.to_lowercase(),
        actual_output: actual.to_string(),
        expected_output: expected.to_string(),
        actual_length,
        expected_length,
        differences,
        actual_char_codes,
        expected_char_codes,
    };

    debug!(
        exact = comparison.exact_match,
        trimmed = comparison.trimmed_match,
        case_insensitive = comparison.case_insensitive_match,
        differences = comparison.differences.len(),
        "Comparison result"
    );

    OutputComparison::Compared(comparison)
}
