//! Output normalizer
//!
//! Splits a captured stream into program output and diagnostic noise.
//!
//! **Rules:**
//! - Noise lines go to `logs`; a value extracted from one is emitted once
//! - Other lines are emitted verbatim unless their trimmed form was already emitted
//! - `lines` is always the verbatim split of the trimmed input
//!
//! The seen-set lives for one call only.

use std::collections::HashSet;

use judge_relay_common::types::NormalizedOutput;

use crate::classifier;
use crate::extractor;

pub fn normalize(raw: Option<&str>) -> NormalizedOutput {
    let raw = match raw {
        Some(raw) if !raw.is_empty() => raw.trim(),
        _ => return NormalizedOutput::empty(),
    };

    let lines: Vec<&str> = raw.split('\n').collect();
    let mut seen: HashSet<String> = HashSet::new();
    let mut actual_lines: Vec<String> = Vec::new();
    let mut log_lines: Vec<&str> = Vec::new();

    for &line in &lines {
        if classifier::is_noise(line) {
            log_lines.push(line);
            if let Some(value) = extractor::extract(line) {
                if seen.insert(value.clone()) {
                    actual_lines.push(value);
                }
            }
        } else if seen.insert(line.trim().to_string()) {
            actual_lines.push(line.to_string());
        }
    }

    let actual = actual_lines.join("\n").trim().to_string();

    NormalizedOutput {
        raw: Some(raw.to_string()),
        actual: (!actual.is_empty()).then_some(actual),
        logs: (!log_lines.is_empty()).then(|| log_lines.join("\n")),
        lines: lines.into_iter().map(str::to_string).collect(),
    }
}
