//! Quality assessment: deterministic, multi-dimensional heuristic score for
//! generated text.
//!
//! Components (each capped at its weight, summed, clamped to 1.0):
//! 1. Length appropriateness   0.25
//! 2. Keyword integration      0.25
//! 3. Readability              0.20
//! 4. Engagement indicators    0.15
//! 5. Structure                0.15

use serde::Serialize;

use crate::generation::request::GenerationRequest;
use crate::generation::text::{
    closing_section, has_header_markers, has_list_markers, sentence_terminators, word_count,
};

pub const LENGTH_WEIGHT: f64 = 0.25;
pub const KEYWORD_WEIGHT: f64 = 0.25;
pub const READABILITY_WEIGHT: f64 = 0.20;
pub const ENGAGEMENT_WEIGHT: f64 = 0.15;
pub const STRUCTURE_WEIGHT: f64 = 0.15;

const CTA_WORDS: &[&str] = &[
    "click", "visit", "learn", "discover", "join", "get", "try", "start", "explore",
];

const CLOSING_WORDS: &[&str] = &["conclusion", "in summary", "to summarize", "finally"];

/// Per-component scores. `total()` is the value persisted as `quality_score`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QualityBreakdown {
    pub length: f64,
    pub keywords: f64,
    pub readability: f64,
    pub engagement: f64,
    pub structure: f64,
}

impl QualityBreakdown {
    pub fn total(&self) -> f64 {
        (self.length + self.keywords + self.readability + self.engagement + self.structure)
            .clamp(0.0, 1.0)
    }
}

/// Scores `text` against the request that produced it. Pure function.
pub fn assess_quality(text: &str, request: &GenerationRequest) -> f64 {
    quality_breakdown(text, request).total()
}

pub fn quality_breakdown(text: &str, request: &GenerationRequest) -> QualityBreakdown {
    let words = word_count(text);
    QualityBreakdown {
        length: length_score(words, request.target_length),
        keywords: keyword_score(text, &request.keywords),
        readability: readability_score(words, sentence_terminators(text)),
        engagement: engagement_score(text),
        structure: structure_score(text),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Components
// ────────────────────────────────────────────────────────────────────────────

fn length_score(words: usize, target: Option<u32>) -> f64 {
    match target {
        Some(target) if target > 0 => {
            let ratio = words as f64 / target as f64;
            if (0.9..=1.1).contains(&ratio) {
                LENGTH_WEIGHT
            } else if (0.8..=1.2).contains(&ratio) {
                0.20
            } else if (0.7..=1.3).contains(&ratio) {
                0.15
            } else {
                0.10
            }
        }
        _ => {
            if (100..=2000).contains(&words) {
                LENGTH_WEIGHT
            } else if (50..=3000).contains(&words) {
                0.15
            } else {
                0.10
            }
        }
    }
}

/// Fraction of keywords present (case-insensitive substring match).
pub fn keyword_presence_ratio(text: &str, keywords: &[String]) -> f64 {
    if keywords.is_empty() {
        return 1.0;
    }
    let lower = text.to_lowercase();
    let present = keywords
        .iter()
        .filter(|k| lower.contains(&k.to_lowercase()))
        .count();
    present as f64 / keywords.len() as f64
}

fn keyword_score(text: &str, keywords: &[String]) -> f64 {
    if keywords.is_empty() {
        return KEYWORD_WEIGHT;
    }
    let ratio = keyword_presence_ratio(text, keywords);
    if ratio >= 0.9 {
        KEYWORD_WEIGHT
    } else if ratio >= 0.7 {
        0.20
    } else if ratio >= 0.5 {
        0.15
    } else {
        0.10
    }
}

fn readability_score(words: usize, sentences: usize) -> f64 {
    if sentences == 0 {
        return 0.0;
    }
    let avg = words as f64 / sentences as f64;
    if (15.0..=20.0).contains(&avg) {
        READABILITY_WEIGHT
    } else if (10.0..=25.0).contains(&avg) {
        0.15
    } else if (8.0..=30.0).contains(&avg) {
        0.10
    } else {
        0.05
    }
}

fn engagement_score(text: &str) -> f64 {
    let lower = text.to_lowercase();
    let mut score = 0.0;
    if text.contains('?') {
        score += 0.05;
    }
    if text.chars().any(|c| c.is_ascii_digit()) {
        score += 0.04;
    }
    if CTA_WORDS.iter().any(|w| lower.contains(w)) {
        score += 0.03;
    }
    if has_list_markers(text) {
        score += 0.03;
    }
    f64::min(score, ENGAGEMENT_WEIGHT)
}

fn structure_score(text: &str) -> f64 {
    let mut score = 0.0;

    let paragraphs = text.matches("\n\n").count() + 1;
    if (3..=10).contains(&paragraphs) {
        score += 0.05;
    } else if paragraphs > 1 {
        score += 0.03;
    }

    if has_header_markers(text) {
        score += 0.05;
    }

    let opening = match text.find('.') {
        Some(idx) => &text[..idx],
        None => crate::generation::text::truncate_chars(text, 100),
    };
    if (8..=20).contains(&word_count(opening)) {
        score += 0.03;
    }

    let closing = closing_section(text).to_lowercase();
    if CLOSING_WORDS.iter().any(|w| closing.contains(w)) {
        score += 0.02;
    }

    f64::min(score, STRUCTURE_WEIGHT)
}
