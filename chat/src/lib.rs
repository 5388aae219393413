use agora_core::{AgoraError, IndexBundle, QueryResult, RankConfig, NO_ANSWER};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, Write};
use std::path::Path;

/// Render a ranked result as the lines a user sees.
pub fn render(result: &QueryResult<'_>, show_scores: bool) -> String {
    let Some(primary) = &result.primary else {
        return NO_ANSWER.to_string();
    };
    let mut out = String::from("Answer: ");
    out.push_str(&primary.document.answer_line());
    if show_scores {
        out.push_str(&format!(" (Score: {:.2})", primary.combined_score));
    }
    if !result.suggestions.is_empty() {
        out.push_str("\nRelated suggestions:");
        for s in &result.suggestions {
            out.push_str("\n- ");
            out.push_str(&s.document.suggestion_line());
            if show_scores {
                out.push_str(&format!(" (Score: {:.2})", s.combined_score));
            }
        }
    }
    out
}

/// Answer one query. Recoverable errors become a message instead of failing.
pub fn answer(bundle: &IndexBundle, query: &str, config: &RankConfig, show_scores: bool) -> Result<String> {
    match bundle.rank(query, config) {
        Ok(result) => Ok(render(&result, show_scores)),
        Err(AgoraError::InvalidQuery) => Ok("Please type a question.".to_string()),
        Err(e) if e.is_recoverable() => {
            tracing::warn!(error = %e, "query failed");
            Ok(format!("Sorry, something went wrong answering that: {e}"))
        }
        Err(e) => Err(e.into()),
    }
}

/// Read questions line by line until EOF or `quit`/`exit`.
pub fn run_repl<R: BufRead, W: Write>(bundle: &IndexBundle, config: &RankConfig, show_scores: bool, input: R, mut out: W) -> Result<usize> {
    let mut answered = 0usize;
    write!(out, "> ")?;
    out.flush()?;
    for line in input.lines() {
        let line = line?;
        let q = line.trim();
        if matches!(q, "quit" | "exit") { break; }
        if !q.is_empty() {
            writeln!(out, "{}", answer(bundle, q, config, show_scores)?)?;
            answered += 1;
        }
        write!(out, "> ")?;
        out.flush()?;
    }
    writeln!(out)?;
    Ok(answered)
}

#[derive(Debug, Clone, Deserialize)]
pub struct EvalCase {
    pub query: String,
    pub expected: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvalOutcome {
    pub query: String,
    pub expected: String,
    pub answer: Option<String>,
    pub passed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvalReport {
    pub outcomes: Vec<EvalOutcome>,
    pub correct: usize,
    pub total: usize,
}

impl EvalReport {
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 { 0.0 } else { self.correct as f64 / self.total as f64 * 100.0 }
    }
}

pub fn load_eval_cases(path: &Path) -> Result<Vec<EvalCase>> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let cases = serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
    Ok(cases)
}

/// A case passes when `expected` appears, case-insensitively, in the primary answer line.
pub fn evaluate(bundle: &IndexBundle, cases: &[EvalCase], config: &RankConfig) -> Result<EvalReport> {
    let mut outcomes = Vec::with_capacity(cases.len());
    for case in cases {
        let answer = match bundle.rank(&case.query, config) {
            Ok(r) => r.primary.map(|p| p.document.answer_line()),
            Err(e) if e.is_recoverable() => None,
            Err(e) => return Err(e.into()),
        };
        let passed = answer
            .as_deref()
            .map(|a| a.to_lowercase().contains(&case.expected.to_lowercase()))
            .unwrap_or(false);
        outcomes.push(EvalOutcome { query: case.query.clone(), expected: case.expected.clone(), answer, passed });
    }
    let correct = outcomes.iter().filter(|o| o.passed).count();
    let total = outcomes.len();
    tracing::info!(correct, total, "evaluation finished");
    Ok(EvalReport { outcomes, correct, total })
}
