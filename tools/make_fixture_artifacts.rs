//! Fixture Artifact Writer
//!
//! Writes a small hand-weighted TF-IDF vectorizer and logistic regression
//! classifier so the form can be tried without trained model files.

use anyhow::{Context, Result};
use clap::Parser;
use sentiment_form::models::classifier::{LinearModel, MultiClass};
use sentiment_form::vectorizer::TfidfVectorizer;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "make-fixture-artifacts")]
struct Args {
    /// Output directory
    #[arg(long, default_value = "models")]
    out: PathBuf,
}

/// (term, negative, neutral, positive) weights
const LEXICON: &[(&str, f64, f64, f64)] = &[
    ("love", -1.5, -0.5, 2.5),
    ("great", -1.2, -0.4, 2.0),
    ("excellent", -1.5, -0.5, 2.5),
    ("amazing", -1.4, -0.4, 2.2),
    ("recommend", -0.8, -0.2, 1.5),
    ("good", -0.8, 0.0, 1.2),
    ("fine", -0.2, 0.8, 0.2),
    ("okay", -0.2, 1.0, 0.0),
    ("average", 0.0, 1.2, -0.3),
    ("bad", 1.2, -0.2, -1.0),
    ("terrible", 2.2, -0.6, -1.8),
    ("awful", 2.2, -0.6, -1.8),
    ("worst", 2.5, -0.7, -2.0),
    ("rude", 1.8, -0.4, -1.4),
    ("waste", 2.0, -0.5, -1.5),
];

fn tagged<T: Serialize>(kind: &str, artifact: &T) -> Result<Value> {
    let mut value = serde_json::to_value(artifact)?;
    value["kind"] = json!(kind);
    Ok(value)
}

fn write_json(path: &Path, value: &Value) -> Result<()> {
    fs::write(path, serde_json::to_vec_pretty(value)?)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), "Artifact written");
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    let args = Args::parse();

    let vocabulary: HashMap<String, usize> = LEXICON
        .iter()
        .enumerate()
        .map(|(i, (term, ..))| (term.to_string(), i))
        .collect();
    let vectorizer = TfidfVectorizer::new(vocabulary, Some(vec![1.0; LEXICON.len()]));

    let classifier = LinearModel {
        classes: vec![
            "negative".to_string(),
            "neutral".to_string(),
            "positive".to_string(),
        ],
        coef: vec![
            LEXICON.iter().map(|(_, n, _, _)| *n).collect(),
            LEXICON.iter().map(|(_, _, z, _)| *z).collect(),
            LEXICON.iter().map(|(_, _, _, p)| *p).collect(),
        ],
        intercept: vec![0.0, 0.3, 0.0],
        multi_class: MultiClass::Multinomial,
    };

    fs::create_dir_all(&args.out)
        .with_context(|| format!("Failed to create {}", args.out.display()))?;
    write_json(&args.out.join("vectorizer.json"), &tagged("tfidf", &vectorizer)?)?;
    write_json(
        &args.out.join("model.json"),
        &tagged("logistic_regression", &classifier)?,
    )?;

    info!(
        dir = %args.out.display(),
        features = LEXICON.len(),
        "Fixture artifacts ready"
    );
    Ok(())
}
