//! Resolve runtime settings: CLI flags > env vars > config file > defaults.

use std::path::PathBuf;

use anyhow::Context;
use cvsift_core::DEFAULT_SENTINEL;
use cvsift_core::config_file::{ConfigFile, ExtractionFileConfig, RulesMode};
use cvsift_extract::{BucketRule, ExtractionConfig, ExtractionConfigBuilder};
use cvsift_reporting::DEFAULT_CSV_PATH;
use cvsift_spacy::{DEFAULT_MODEL, DEFAULT_PYTHON};

/// Values given on the command line.
#[derive(Debug, Default)]
pub struct Overrides {
    pub python: Option<String>,
    pub model: Option<String>,
    pub sentinel: Option<String>,
    pub csv_path: Option<PathBuf>,
}

#[derive(Debug)]
pub struct Settings {
    pub python: String,
    pub model: String,
    pub sentinel: String,
    pub csv_path: PathBuf,
    pub extraction: ExtractionConfig,
}

/// Merge flags, environment (looked up through `env`) and the config file.
pub fn resolve(
    overrides: Overrides,
    env: impl Fn(&str) -> Option<String>,
    file: &ConfigFile,
) -> anyhow::Result<Settings> {
    let nlp = file.nlp.clone().unwrap_or_default();
    let output = file.output.clone().unwrap_or_default();

    let python = overrides
        .python
        .or_else(|| env("CVSIFT_PYTHON"))
        .or(nlp.python)
        .unwrap_or_else(|| DEFAULT_PYTHON.to_string());
    let model = overrides
        .model
        .or_else(|| env("CVSIFT_MODEL"))
        .or(nlp.model)
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());
    let csv_path = overrides
        .csv_path
        .or_else(|| env("CVSIFT_CSV_PATH").map(PathBuf::from))
        .or_else(|| output.csv_path.map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CSV_PATH));
    let sentinel = overrides
        .sentinel
        .or(output.sentinel)
        .unwrap_or_else(|| DEFAULT_SENTINEL.to_string());

    let extraction = extraction_config(file.extraction.as_ref())?;

    Ok(Settings {
        python,
        model,
        sentinel,
        csv_path,
        extraction,
    })
}

fn extraction_config(file: Option<&ExtractionFileConfig>) -> anyhow::Result<ExtractionConfig> {
    let Some(file) = file else {
        return Ok(ExtractionConfig::default());
    };

    let mut builder = ExtractionConfigBuilder::new();
    if let Some(label) = &file.person_label {
        builder = builder.person_label(label);
    }
    if let Some(tags) = &file.skill_pos {
        builder = builder.set_skill_pos(tags.clone());
    }
    if let Some(rules) = &file.rules {
        let rules: Vec<BucketRule> = rules
            .iter()
            .map(|r| BucketRule {
                labels: r.labels.clone(),
                bucket: r.bucket,
            })
            .collect();
        builder = match file.rules_mode.unwrap_or_default() {
            RulesMode::Replace => builder.set_bucket_rules(rules),
            RulesMode::Extend => rules
                .into_iter()
                .fold(builder, |b, rule| b.add_bucket_rule(rule)),
        };
    }

    // Patterns are checked one at a time so the error names the bad key.
    if let Some(pattern) = &file.email_pattern {
        ExtractionConfigBuilder::new()
            .email_regex(pattern)
            .build()
            .with_context(|| format!("invalid extraction.email_pattern {pattern:?}"))?;
        builder = builder.email_regex(pattern);
    }
    if let Some(pattern) = &file.phone_pattern {
        ExtractionConfigBuilder::new()
            .phone_regex(pattern)
            .build()
            .with_context(|| format!("invalid extraction.phone_pattern {pattern:?}"))?;
        builder = builder.phone_regex(pattern);
    }

    Ok(builder.build()?)
}
