//! SEO scoring: keyword presence, density, placement and structural signals.
//!
//! Returns a neutral 0.5 when no keywords were requested. Otherwise:
//! presence 0.35, density 0.25, placement 0.20 (additive, capped),
//! structure 0.20 (additive, capped). Deterministic, no I/O.

use crate::generation::quality::keyword_presence_ratio;
use crate::generation::text::{closing_section, has_list_markers, header_lines, word_count};

pub const NEUTRAL_SEO_SCORE: f64 = 0.5;

const PLACEMENT_WEIGHT: f64 = 0.20;
const STRUCTURE_WEIGHT: f64 = 0.20;

pub fn seo_score(text: &str, keywords: &[String]) -> f64 {
    if keywords.is_empty() {
        return NEUTRAL_SEO_SCORE;
    }

    let lower = text.to_lowercase();
    let lowered: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();
    let words = word_count(text);

    let score = presence_score(text, keywords)
        + density_score(&lower, &lowered, words)
        + placement_score(text, &lowered)
        + structure_score(text, words);

    score.clamp(0.0, 1.0)
}

fn presence_score(text: &str, keywords: &[String]) -> f64 {
    let ratio = keyword_presence_ratio(text, keywords);
    if ratio >= 0.9 {
        0.35
    } else if ratio >= 0.7 {
        0.28
    } else if ratio >= 0.5 {
        0.20
    } else {
        0.10
    }
}

/// Keyword density in percent: 100 × occurrences / words.
pub fn keyword_density(lower_text: &str, lower_keywords: &[String], words: usize) -> f64 {
    if words == 0 {
        return 0.0;
    }
    let occurrences: usize = lower_keywords
        .iter()
        .map(|k| lower_text.matches(k.as_str()).count())
        .sum();
    100.0 * occurrences as f64 / words as f64
}

fn density_score(lower_text: &str, lower_keywords: &[String], words: usize) -> f64 {
    if words == 0 {
        return 0.0;
    }
    let density = keyword_density(lower_text, lower_keywords, words);
    if (1.0..=3.0).contains(&density) {
        0.25
    } else if (0.5..1.0).contains(&density) {
        0.20
    } else if density > 3.0 && density <= 5.0 {
        0.15
    } else {
        0.05
    }
}

fn placement_score(text: &str, lower_keywords: &[String]) -> f64 {
    let any_in = |haystack: &str| lower_keywords.iter().any(|k| haystack.contains(k.as_str()));
    let mut score = 0.0;

    let opening = text
        .split_whitespace()
        .take(100)
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    if any_in(&opening) {
        score += 0.07;
    }

    let headers = header_lines(text).collect::<Vec<_>>().join(" ").to_lowercase();
    if !headers.is_empty() && any_in(&headers) {
        score += 0.07;
    }

    if any_in(&closing_section(text).to_lowercase()) {
        score += 0.06;
    }

    f64::min(score, PLACEMENT_WEIGHT)
}

fn structure_score(text: &str, words: usize) -> f64 {
    let mut score = 0.0;

    if (500..=2500).contains(&words) {
        score += 0.08;
    } else if (300..=3000).contains(&words) {
        score += 0.05;
    } else {
        score += 0.02;
    }

    if ["##", "H2:", "H3:"].iter().any(|m| text.contains(m)) {
        score += 0.06;
    }

    if has_list_markers(text) {
        score += 0.04;
    }

    if text.contains('[') && text.contains(']') {
        score += 0.02;
    }

    f64::min(score, STRUCTURE_WEIGHT)
}
