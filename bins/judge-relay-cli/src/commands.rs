// CLI commands for the judge relay
use anyhow::{bail, Context, Result};
use judge_relay_common::config::Config;
use judge_relay_common::languages;
use judge_relay_common::status::STATUSES;
use judge_relay_common::types::{Submission, SubmitOptions};
use judge_relay_engine::{comparator, normalizer, Judge0Client, Orchestrator};
use serde::Serialize;
use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

fn orchestrator() -> Result<Orchestrator> {
    let config = Config::from_env();
    let client = Judge0Client::new(&config).context("Failed to create Judge0 client")?;
    Ok(Orchestrator::new(Arc::new(client)))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", rendered);
    Ok(())
}

/// Accept either a numeric Judge0 id or a known language name
pub fn resolve_language(language: &str) -> Result<u32> {
    if let Ok(id) = language.trim().parse::<u32>() {
        if id == 0 {
            bail!("Language id must be positive");
        }
        return Ok(id);
    }

    match languages::language_id(language) {
        Some(id) => Ok(id),
        None => {
            let known: Vec<&str> = languages::LANGUAGES.iter().map(|(name, _)| *name).collect();
            bail!(
                "Unknown language '{}'. Known languages: {}",
                language,
                known.join(", ")
            )
        }
    }
}

/// Submit a source file, optionally harvesting the actual output first
pub async fn submit(
    file: &Path,
    language: &str,
    stdin: String,
    expected: Option<String>,
    use_actual: bool,
    raw: bool,
) -> Result<()> {
    let source_code = fs::read_to_string(file)
        .with_context(|| format!("Failed to read source file {}", file.display()))?;
    if source_code.is_empty() {
        bail!("Source file {} is empty", file.display());
    }

    let submission = Submission {
        source_code,
        language_id: resolve_language(language)?,
        stdin,
        expected_output: expected.filter(|e| !e.is_empty()),
    };
    let options = SubmitOptions {
        use_actual_as_expected: use_actual,
    };

    eprintln!(
        "→ Submitting {} as {} (language id {})",
        file.display(),
        languages::language_name(submission.language_id).unwrap_or("unlisted language"),
        submission.language_id
    );

    let orchestrator = orchestrator()?;
    if raw {
        let response = orchestrator
            .submit(&submission, options)
            .await
            .context("Submission failed")?;
        print_json(&response)
    } else {
        let result = orchestrator
            .run(&submission, options)
            .await
            .context("Submission failed")?;
        print_json(&result)
    }
}

pub async fn get(token: &str, no_source: bool) -> Result<()> {
    let mut result = orchestrator()?
        .get(token)
        .await
        .with_context(|| format!("Failed to get submission {}", token))?;
    if no_source {
        result = result.without_source();
    }
    print_json(&result)
}

pub async fn batch_get(tokens: Vec<String>) -> Result<()> {
    let tokens: Vec<String> = tokens
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    if tokens.is_empty() {
        bail!("At least one token is required");
    }
    debug!(count = tokens.len(), "Fetching batch");

    let results = orchestrator()?
        .batch_get(&tokens)
        .await
        .context("Failed to get batch submissions")?;
    print_json(&results)
}

pub async fn languages() -> Result<()> {
    let languages = orchestrator()?
        .languages()
        .await
        .context("Failed to get languages")?;
    print_json(&languages)
}

pub async fn statuses(local: bool) -> Result<()> {
    if local {
        return print_json(&STATUSES);
    }
    let statuses = orchestrator()?
        .statuses()
        .await
        .context("Failed to get statuses")?;
    print_json(&statuses)
}

pub fn normalize(file: Option<&Path>) -> Result<()> {
    let raw = match file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read stdin")?;
            buffer
        }
    };
    let normalized = normalizer::normalize(Some(&raw));
    debug!(
        lines = normalized.lines.len(),
        has_logs = normalized.logs.is_some(),
        "Normalized input"
    );
    print_json(&normalized)
}

pub fn compare(actual: &str, expected: &str) -> Result<()> {
    print_json(&comparator::compare(Some(actual), Some(expected)))
}
