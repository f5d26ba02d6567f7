//! Source-consistency signal: are the answer's claims in the sources?

use std::collections::HashSet;

use vigil_core::models::{Finding, RetrievedChunk, Signal};

use super::SignalResult;
use crate::text;

const UNSUPPORTED_WEIGHT: f64 = 0.7;
const COVERAGE_WEIGHT: f64 = 0.3;

pub fn evaluate(
    answer: &str,
    chunks: &[RetrievedChunk],
    min_relevance: f64,
    support_ratio: f64,
) -> SignalResult {
    let claims: Vec<Vec<String>> = text::sentences(answer)
        .into_iter()
        .map(text::content_terms)
        .filter(|terms| !terms.is_empty())
        .collect();
    if claims.is_empty() {
        return SignalResult::clean();
    }

    let sources: HashSet<String> = chunks
        .iter()
        .filter(|c| c.relevance_score >= min_relevance)
        .flat_map(|c| text::content_terms(&c.content))
        .collect();
    if sources.is_empty() {
        return SignalResult::new(
            1.0,
            vec![Finding {
                signal: Signal::SourceConsistency,
                rule_id: "no_sources".into(),
                description: "no retrieved chunk above the relevance cutoff".into(),
            }],
        );
    }

    let unsupported = claims
        .iter()
        .filter(|terms| {
            let found = terms.iter().filter(|t| sources.contains(*t)).count();
            (found as f64 / terms.len() as f64) < support_ratio
        })
        .count();

    let answer_terms: HashSet<&String> = claims.iter().flatten().collect();
    let covered = answer_terms.iter().filter(|t| sources.contains(**t)).count();
    let coverage = covered as f64 / answer_terms.len() as f64;

    let unsupported_fraction = unsupported as f64 / claims.len() as f64;
    let score = UNSUPPORTED_WEIGHT * unsupported_fraction + COVERAGE_WEIGHT * (1.0 - coverage);

    let mut findings = Vec::new();
    if unsupported > 0 {
        findings.push(Finding {
            signal: Signal::SourceConsistency,
            rule_id: "unsupported_claims".into(),
            description: format!(
                "{unsupported} of {} sentences lack source support; term coverage {:.0}%",
                claims.len(),
                coverage * 100.0
            ),
        });
    }
    SignalResult::new(score, findings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(content: &str, relevance: f64) -> RetrievedChunk {
        RetrievedChunk::new("c", content, relevance)
    }

    #[test]
    fn empty_answer_is_safe() {
        assert_eq!(evaluate("", &[], 0.0, 0.5).score, 0.0);
        assert_eq!(evaluate("  . ", &[chunk("text", 1.0)], 0.0, 0.5).score, 0.0);
    }

    #[test]
    fn no_chunks_is_maximal() {
        assert_eq!(evaluate("Metformin lowers glucose.", &[], 0.0, 0.5).score, 1.0);
    }

    #[test]
    fn low_relevance_chunks_are_ignored() {
        let chunks = [chunk("Metformin lowers glucose", 0.1)];
        assert_eq!(evaluate("Metformin lowers glucose.", &chunks, 0.5, 0.5).score, 1.0);
        assert_eq!(evaluate("Metformin lowers glucose.", &chunks, 0.0, 0.5).score, 0.0);
    }

    #[test]
    fn partial_support() {
        let chunks = [chunk("Metformin lowers blood glucose in type 2 diabetes", 0.9)];
        let result = evaluate(
            "Metformin lowers glucose. Warfarin requires monitoring.",
            &chunks,
            0.0,
            0.5,
        );
        // One of two sentences unsupported; 3 of 6 terms covered.
        let expected = 0.7 * 0.5 + 0.3 * 0.5;
        assert!((result.score - expected).abs() < 1e-9, "{}", result.score);
        assert_eq!(result.findings.len(), 1);
    }
}
