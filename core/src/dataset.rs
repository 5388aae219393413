//! Reading the three datasets from disk.
//!
//! Accepts CSV (with a header row), a JSON array of objects, or JSONL. Each
//! record needs `title`, `description` and `url`; other columns are ignored.

use crate::error::AgoraError;
use crate::store::{Category, Collections, Record};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const REQUIRED_COLUMNS: [&str; 3] = ["title", "description", "url"];

fn file_stem_key(category: Category) -> &'static str {
    match category {
        Category::Case => "cases",
        Category::Method => "methods",
        Category::Organization => "organizations",
    }
}

fn is_dataset_ext(path: &Path) -> bool {
    matches!(path.extension().and_then(|s| s.to_str()), Some("csv" | "json" | "jsonl"))
}

/// Find the dataset file for `category` in `dir`: the first file (by name) whose
/// stem contains `cases`, `methods` or `organizations`.
pub fn find_dataset(dir: &Path, category: Category) -> Result<PathBuf, AgoraError> {
    let key = file_stem_key(category);
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .find(|p| {
            p.is_file()
                && is_dataset_ext(p)
                && p.file_stem().and_then(|s| s.to_str()).map(|s| s.to_lowercase().contains(key)).unwrap_or(false)
        })
        .ok_or_else(|| AgoraError::load(format!("no {key} dataset (csv/json/jsonl) in {}", dir.display())))
}

/// Load all three datasets from a directory.
pub fn load_dir(dir: &Path) -> Result<Collections, AgoraError> {
    let cases = load_records(&find_dataset(dir, Category::Case)?)?;
    let methods = load_records(&find_dataset(dir, Category::Method)?)?;
    let organizations = load_records(&find_dataset(dir, Category::Organization)?)?;
    Ok(Collections { cases, methods, organizations })
}

pub fn load_records(path: &Path) -> Result<Vec<Record>, AgoraError> {
    let records = match path.extension().and_then(|s| s.to_str()) {
        Some("csv") => load_csv(path),
        Some("jsonl") => load_jsonl(path),
        Some("json") => load_json(path),
        _ => Err(AgoraError::load(format!("unsupported dataset format: {}", path.display()))),
    }?;
    tracing::debug!(path = %path.display(), records = records.len(), "dataset read");
    Ok(records)
}

fn load_csv(path: &Path) -> Result<Vec<Record>, AgoraError> {
    let err = |e: csv::Error| AgoraError::load(format!("{}: {e}", path.display()));
    let mut reader = csv::Reader::from_path(path).map_err(err)?;
    let headers = reader.headers().map_err(err)?.clone();
    for col in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h.trim() == col) {
            return Err(AgoraError::load(format!("{}: missing required column `{col}`", path.display())));
        }
    }
    reader.deserialize::<Record>().map(|r| r.map_err(err)).collect()
}

fn load_jsonl(path: &Path) -> Result<Vec<Record>, AgoraError> {
    let f = File::open(path).map_err(|e| AgoraError::load(format!("{}: {e}", path.display())))?;
    let mut out = Vec::new();
    for (n, line) in BufReader::new(f).lines().enumerate() {
        let line = line.map_err(|e| AgoraError::load(format!("{}: {e}", path.display())))?;
        if line.trim().is_empty() { continue; }
        let rec: Record = serde_json::from_str(&line)
            .map_err(|e| AgoraError::load(format!("{} line {}: {e}", path.display(), n + 1)))?;
        out.push(rec);
    }
    Ok(out)
}

fn load_json(path: &Path) -> Result<Vec<Record>, AgoraError> {
    let f = File::open(path).map_err(|e| AgoraError::load(format!("{}: {e}", path.display())))?;
    let json: serde_json::Value = serde_json::from_reader(BufReader::new(f))
        .map_err(|e| AgoraError::load(format!("{}: {e}", path.display())))?;
    let to_record = |v: serde_json::Value| {
        serde_json::from_value::<Record>(v).map_err(|e| AgoraError::load(format!("{}: {e}", path.display())))
    };
    match json {
        serde_json::Value::Array(arr) => arr.into_iter().map(to_record).collect(),
        serde_json::Value::Object(_) => Ok(vec![to_record(json)?]),
        _ => Err(AgoraError::load(format!("{}: expected an array of records", path.display()))),
    }
}
