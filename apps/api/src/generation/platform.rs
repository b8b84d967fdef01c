//! Per-destination validation and best-effort reshaping.
//!
//! `validate` is a hard character ceiling. `optimize` applies layout rules for
//! each destination and always finishes by enforcing that ceiling, so its
//! output is never longer than the platform accepts.

use tracing::warn;

use crate::generation::request::{ContentCategory, GenerationRequest, Platform};
use crate::generation::text::{char_len, truncate_chars};

const ELLIPSIS: &str = "...";

/// LinkedIn shows roughly this many characters before "see more".
const LINKEDIN_PREVIEW_CUTOFF: usize = 140;
const LINKEDIN_BREAK_SEARCH: usize = 10;

const FACEBOOK_OPENING_WINDOW: usize = 200;

/// TikTok captions read best well under the platform maximum.
const TIKTOK_CAPTION_CEILING: usize = 150;

const YOUTUBE_CEILING: usize = 5000;
const YOUTUBE_TIMESTAMP_BLOCK: &str = "📍 Timestamps:\n0:00 - Intro\n\n";

/// First matching keyword picks the emoji.
const TIKTOK_EMOJI_LEXICON: &[(&str, &str)] = &[
    ("tip", "💡"),
    ("business", "💼"),
    ("marketing", "📈"),
    ("ai", "🤖"),
    ("money", "💰"),
    ("success", "🏆"),
];

/// Hard character ceiling per destination. `None` means unlimited.
pub fn char_ceiling(platform: Platform) -> Option<usize> {
    match platform {
        Platform::Twitter => Some(280),
        Platform::Linkedin => Some(3000),
        Platform::Facebook => Some(5000),
        Platform::Instagram => Some(2200),
        Platform::Youtube => Some(YOUTUBE_CEILING),
        Platform::Tiktok => Some(2200),
        Platform::Pinterest => Some(500),
        Platform::Blog | Platform::Email => None,
    }
}

/// Ceiling `optimize` shapes toward. Tighter than `char_ceiling` for TikTok.
fn optimize_ceiling(platform: Platform) -> Option<usize> {
    match platform {
        Platform::Tiktok => Some(TIKTOK_CAPTION_CEILING),
        other => char_ceiling(other),
    }
}

/// Hard-truncates `text` to the platform ceiling. Idempotent.
pub fn validate(text: &str, platform: Platform) -> String {
    match char_ceiling(platform) {
        Some(limit) => hard_limit(text, limit, platform),
        None => text.to_string(),
    }
}

fn hard_limit(text: &str, limit: usize, platform: Platform) -> String {
    let len = char_len(text);
    if len <= limit {
        return text.to_string();
    }
    warn!(
        platform = platform.as_str(),
        len, limit, "Content exceeds platform ceiling, truncating"
    );
    truncate_chars(text, limit).to_string()
}

/// Reshapes `text` for `platform`. Never fails and never grows past the
/// platform ceiling; conforming input comes back unchanged.
pub fn optimize(text: &str, platform: Platform, request: &GenerationRequest) -> String {
    let text = text.trim();
    let shaped = match platform {
        Platform::Twitter => shorten_keeping_hashtags(text, 280),
        Platform::Linkedin => linkedin_preview_break(text),
        Platform::Instagram => instagram_caption(text, 2200),
        Platform::Facebook => facebook_opening_break(text),
        Platform::Youtube if request.category == ContentCategory::Script => {
            youtube_timestamps(text, YOUTUBE_CEILING)
        }
        Platform::Tiktok => tiktok_caption(text),
        _ => text.to_string(),
    };

    let shaped = shaped.trim();
    let bounded = match optimize_ceiling(platform) {
        Some(limit) => hard_limit(shaped, limit, platform),
        None => shaped.to_string(),
    };
    bounded.trim_end().to_string()
}

// ────────────────────────────────────────────────────────────────────────────
// Short-form
// ────────────────────────────────────────────────────────────────────────────

/// Fits `text` within `limit`, cutting the body while keeping its hashtag
/// tokens. Tags are dropped from the back if they would take more than half
/// the limit.
fn shorten_keeping_hashtags(text: &str, limit: usize) -> String {
    if char_len(text) <= limit {
        return text.to_string();
    }

    let (body, mut tags) = detach_hashtags(text);
    let mut suffix = tags.join(" ");
    while !tags.is_empty() && char_len(&suffix) + 1 > limit / 2 {
        tags.pop();
        suffix = tags.join(" ");
    }

    if suffix.is_empty() {
        return cut_at_boundary(&body, limit);
    }
    let budget = limit - char_len(&suffix) - 1;
    format!("{} {suffix}", cut_at_boundary(&body, budget))
}

/// Splits hashtag tokens (`#` plus at least one character) out of `text`.
fn detach_hashtags(text: &str) -> (String, Vec<String>) {
    let mut tags = Vec::new();
    let lines: Vec<String> = text
        .lines()
        .map(|line| {
            let mut kept = Vec::new();
            for token in line.split_whitespace() {
                if token.len() > 1 && token.starts_with('#') {
                    tags.push(token.to_string());
                } else {
                    kept.push(token);
                }
            }
            kept.join(" ")
        })
        .collect();
    (lines.join("\n").trim().to_string(), tags)
}

/// Truncates to `budget` characters, preferring a sentence end found after
/// 5/7 of the budget, then a word boundary after 25/28 of it (200 and 250 of
/// a 280 limit).
fn cut_at_boundary(text: &str, budget: usize) -> String {
    if char_len(text) <= budget {
        return text.to_string();
    }

    let window = truncate_chars(text, budget.saturating_sub(ELLIPSIS.len()));
    let sentence_floor = budget * 5 / 7;
    let word_floor = budget * 25 / 28;

    if let Some(idx) = window.rfind(|c: char| matches!(c, '.' | '!' | '?')) {
        if char_len(&window[..idx]) > sentence_floor {
            return window[..=idx].to_string();
        }
    }
    if let Some(idx) = window.rfind(' ') {
        if char_len(&window[..idx]) > word_floor {
            return format!("{}{ELLIPSIS}", &window[..idx]);
        }
    }
    format!("{window}{ELLIPSIS}")
}

fn fit_with_ellipsis(text: &str, limit: usize) -> String {
    if char_len(text) <= limit {
        return text.to_string();
    }
    let cut = truncate_chars(text, limit.saturating_sub(ELLIPSIS.len()));
    format!("{}{ELLIPSIS}", cut.trim_end())
}

// ────────────────────────────────────────────────────────────────────────────
// Layout rules
// ────────────────────────────────────────────────────────────────────────────

fn linkedin_preview_break(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= LINKEDIN_PREVIEW_CUTOFF {
        return text.to_string();
    }

    let head: String = chars
        .iter()
        .take(LINKEDIN_PREVIEW_CUTOFF + LINKEDIN_BREAK_SEARCH + 2)
        .collect();
    if head.contains("\n\n") {
        return text.to_string();
    }

    let sentence_end = chars.iter().position(|c| *c == '.');
    if matches!(sentence_end, Some(p) if p <= LINKEDIN_PREVIEW_CUTOFF) {
        return text.to_string();
    }

    let search_end = (LINKEDIN_PREVIEW_CUTOFF + LINKEDIN_BREAK_SEARCH).min(chars.len());
    match (LINKEDIN_PREVIEW_CUTOFF - LINKEDIN_BREAK_SEARCH..search_end).find(|&i| chars[i] == ' ') {
        Some(i) => {
            let before: String = chars[..i].iter().collect();
            let after: String = chars[i + 1..].iter().collect();
            format!("{before}\n\n{after}")
        }
        None => text.to_string(),
    }
}

/// Splits lines carrying a `#` from the rest. Both keep their relative order;
/// the body is trimmed and each tag line is trimmed.
fn split_hashtag_lines(text: &str) -> (String, Vec<&str>) {
    let (tag_lines, body_lines): (Vec<&str>, Vec<&str>) =
        text.lines().partition(|line| line.contains('#'));
    (
        body_lines.join("\n").trim().to_string(),
        tag_lines.into_iter().map(str::trim).collect(),
    )
}

/// Leading tag lines that fit within `budget`, joined by newlines. Whole lines
/// are dropped from the back; a first line that is too long on its own is
/// shortened and kept only if it still carries a `#`.
fn tag_block(tag_lines: &[&str], budget: usize) -> String {
    let mut block = String::new();
    for line in tag_lines {
        let candidate = if block.is_empty() {
            line.to_string()
        } else {
            format!("{block}\n{line}")
        };
        if char_len(&candidate) > budget {
            break;
        }
        block = candidate;
    }

    if block.is_empty() {
        if let Some(first) = tag_lines.first() {
            let shortened = fit_with_ellipsis(first, budget);
            if shortened.contains('#') {
                return shortened;
            }
        }
    }
    block
}

/// Fits the caption within `limit` with hashtag lines moved to the end. The
/// tag block takes at most half the limit when there is body text; the body
/// is shortened into whatever remains.
fn instagram_caption(text: &str, limit: usize) -> String {
    if !text.contains('#') {
        return fit_with_ellipsis(text, limit);
    }
    let (body, tag_lines) = split_hashtag_lines(text);

    if body.is_empty() {
        let block = tag_block(&tag_lines, limit);
        if block.is_empty() {
            // no tag survives shortening, so the result carries no `#` at all
            return fit_with_ellipsis(tag_lines.first().copied().unwrap_or_default(), limit);
        }
        return block;
    }

    let block = tag_block(&tag_lines, limit / 2);
    if block.is_empty() {
        return fit_with_ellipsis(&body, limit);
    }
    let body = fit_with_ellipsis(&body, limit - char_len(&block) - 2);
    format!("{body}\n\n{block}")
}

fn facebook_opening_break(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= FACEBOOK_OPENING_WINDOW {
        return text.to_string();
    }
    let opening: String = chars.iter().take(FACEBOOK_OPENING_WINDOW).collect();
    if opening.contains("\n\n") {
        return text.to_string();
    }

    match chars.iter().position(|c| *c == '.') {
        Some(p) if p < FACEBOOK_OPENING_WINDOW => {
            let first: String = chars[..=p].iter().collect();
            let rest: String = chars[p + 1..].iter().collect();
            let rest = rest.trim_start();
            if rest.is_empty() {
                text.to_string()
            } else {
                format!("{first}\n\n{rest}")
            }
        }
        _ => text.to_string(),
    }
}

/// Prepends a timestamp block unless one already sits within the part of the
/// description that survives the ceiling.
fn youtube_timestamps(text: &str, ceiling: usize) -> String {
    let visible = truncate_chars(text, ceiling);
    if visible.contains("[00:00]") || visible.contains("0:00") {
        return text.to_string();
    }
    format!("{YOUTUBE_TIMESTAMP_BLOCK}{text}")
}

fn tiktok_caption(text: &str) -> String {
    let fitted = fit_with_ellipsis(text, TIKTOK_CAPTION_CEILING);
    if !fitted.is_ascii() {
        return fitted;
    }

    let lower = fitted.to_lowercase();
    let Some((_, emoji)) = TIKTOK_EMOJI_LEXICON
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
    else {
        return fitted;
    };

    let prefix_len = char_len(emoji) + 1;
    let body = fit_with_ellipsis(&fitted, TIKTOK_CAPTION_CEILING - prefix_len);
    format!("{emoji} {body}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::hashtags::add_hashtags;

    fn request(category: ContentCategory) -> GenerationRequest {
        GenerationRequest::sample(category, "Urban gardening tips")
    }

    fn long_prose(sentences: usize) -> String {
        (0..sentences)
            .map(|i| format!("Sentence number {i} talks about growing herbs on small balconies."))
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn test_every_platform_has_a_ceiling_decision() {
        for platform in Platform::ALL {
            let unlimited = matches!(platform, Platform::Blog | Platform::Email);
            assert_eq!(char_ceiling(platform).is_none(), unlimited, "{platform:?}");
        }
    }

    #[test]
    fn test_validate_is_idempotent_and_bounded() {
        let text = "ü".repeat(6000);
        for platform in Platform::ALL {
            let once = validate(&text, platform);
            assert_eq!(validate(&once, platform), once, "{platform:?}");
            if let Some(limit) = char_ceiling(platform) {
                assert!(char_len(&once) <= limit, "{platform:?}");
            }
        }
    }

    #[test]
    fn test_validate_passes_short_text_through() {
        assert_eq!(validate("short", Platform::Twitter), "short");
    }

    #[test]
    fn test_optimize_never_exceeds_ceiling() {
        let text = format!("{}\n#Garden #Herbs", long_prose(120));
        let req = request(ContentCategory::Script);
        for platform in Platform::ALL {
            let out = optimize(&text, platform, &req);
            if let Some(limit) = optimize_ceiling(platform) {
                assert!(char_len(&out) <= limit, "{platform:?}: {}", char_len(&out));
            }
        }
    }

    #[test]
    fn test_optimize_is_idempotent() {
        let text = format!("#Garden\n{}", long_prose(40));
        let req = request(ContentCategory::Script);
        for platform in Platform::ALL {
            let once = optimize(&text, platform, &req);
            let twice = optimize(&once, platform, &req);
            assert_eq!(once, twice, "{platform:?}");
        }
    }

    fn last_line_carries_tag_if_any_does(text: &str) -> bool {
        !text.lines().any(|l| l.contains('#'))
            || text.lines().last().is_some_and(|l| l.contains('#'))
    }

    fn shaping_inputs() -> Vec<String> {
        vec![
            String::new(),
            "Basil loves sun.".to_string(),
            format!("\n\n{}\n\n", long_prose(6)),
            format!("\n\nBasil loves sun. {}", "water it often ".repeat(20)),
            long_prose(40),
            long_prose(100),
            format!("{} 0:00 recap", long_prose(90)),
            format!(
                "{}\n{} #BalconyGarden\n{} #HerbLife",
                long_prose(16),
                long_prose(12),
                long_prose(24)
            ),
            format!("{} #Basil #Mint", long_prose(10)),
            "#OnlyTags #Here\n\n#More".to_string(),
            "#Tag ".repeat(600),
            "Grüße aus dem Garten 🌱 ".repeat(150),
            format!(
                "Intro line\n{}\n\n#Garden\n  trailing body  \n",
                "#Herbs ".repeat(200)
            ),
        ]
    }

    #[test]
    fn test_optimize_idempotent_and_bounded_across_inputs() {
        for category in [ContentCategory::Script, ContentCategory::Article] {
            let req = request(category);
            for (i, text) in shaping_inputs().iter().enumerate() {
                for platform in Platform::ALL {
                    let once = optimize(text, platform, &req);
                    let twice = optimize(&once, platform, &req);
                    assert_eq!(once, twice, "{platform:?} {category:?} input {i}");
                    if let Some(limit) = optimize_ceiling(platform) {
                        assert!(char_len(&once) <= limit, "{platform:?} input {i}");
                    }
                    if platform == Platform::Instagram {
                        assert!(last_line_carries_tag_if_any_does(&once), "input {i}: {once}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_instagram_oversized_tag_lines_stay_last() {
        let caption = format!(
            "{}\n{} #BalconyGarden\n{} #HerbLife",
            long_prose(16),
            long_prose(12),
            long_prose(24)
        );
        assert!(char_len(&caption) > 2200);

        let req = request(ContentCategory::SocialUpdate);
        let once = optimize(&caption, Platform::Instagram, &req);
        assert!(char_len(&once) <= 2200);
        assert!(once.lines().last().unwrap().ends_with("#BalconyGarden"), "{once}");
        assert!(once.starts_with("Sentence number 0"));
        assert_eq!(optimize(&once, Platform::Instagram, &req), once);
    }

    #[test]
    fn test_instagram_tag_only_caption_is_shortened() {
        let req = request(ContentCategory::SocialUpdate);
        let out = optimize(&"#Tag ".repeat(600), Platform::Instagram, &req);
        assert!(char_len(&out) <= 2200);
        assert!(out.starts_with("#Tag #Tag"));
        assert!(out.ends_with("..."));
    }

    #[test]
    fn test_leading_blank_lines_do_not_hide_opening_break() {
        let text = format!("\n\nBasil loves sun. {}", "water it often ".repeat(20));
        let req = request(ContentCategory::SocialUpdate);

        let facebook = optimize(&text, Platform::Facebook, &req);
        assert!(facebook.starts_with("Basil loves sun.\n\nwater"), "{facebook}");
        assert_eq!(optimize(&facebook, Platform::Facebook, &req), facebook);

        let linkedin_text = format!("\n\n{}", "word ".repeat(60));
        let linkedin = optimize(&linkedin_text, Platform::Linkedin, &req);
        assert!(linkedin.contains("\n\n"));
        assert_eq!(optimize(&linkedin, Platform::Linkedin, &req), linkedin);
    }

    #[test]
    fn test_youtube_marker_past_ceiling_still_gets_block() {
        let text = format!("{} 0:00 recap", long_prose(90));
        assert!(char_len(&text) > 5000);
        let out = optimize(&text, Platform::Youtube, &request(ContentCategory::Script));
        assert!(out.starts_with("📍 Timestamps:"));
        assert!(char_len(&out) <= 5000);
    }

    #[test]
    fn test_twitter_prefers_sentence_boundary() {
        let out = optimize(&long_prose(10), Platform::Twitter, &request(ContentCategory::SocialUpdate));
        assert!(char_len(&out) <= 280);
        assert!(char_len(&out) > 200);
        assert!(out.ends_with('.'), "{out}");
    }

    #[test]
    fn test_twitter_falls_back_to_word_boundary() {
        let text = "word ".repeat(100);
        let out = optimize(&text, Platform::Twitter, &request(ContentCategory::SocialUpdate));
        assert!(out.ends_with("word..."), "{out}");
        assert!(char_len(&out) <= 280);
    }

    #[test]
    fn test_twitter_hard_cut_without_spaces() {
        let out = optimize(&"x".repeat(400), Platform::Twitter, &request(ContentCategory::SocialUpdate));
        assert_eq!(char_len(&out), 280);
        assert!(out.ends_with("..."));
    }

    #[test]
    fn test_twitter_keeps_hashtags_through_truncation() {
        let keywords = vec!["urban gardening".to_string(), "balcony plants".to_string()];
        let tagged = add_hashtags(&long_prose(10), &keywords, Platform::Twitter);
        let out = optimize(&tagged, Platform::Twitter, &request(ContentCategory::SocialUpdate));
        assert!(char_len(&out) <= 280);
        assert!(out.contains("#Urbangardening"), "{out}");
        assert!(out.contains("#Balconyplants"), "{out}");
    }

    #[test]
    fn test_linkedin_breaks_near_preview_cutoff() {
        let text = "word ".repeat(60);
        let out = optimize(&text, Platform::Linkedin, &request(ContentCategory::SocialUpdate));
        let idx = out.find("\n\n").expect("paragraph break inserted");
        assert!((130..150).contains(&idx), "break at {idx}");
    }

    #[test]
    fn test_linkedin_leaves_early_sentence_alone() {
        let text = format!("Short opener. {}", "word ".repeat(60));
        let out = optimize(&text, Platform::Linkedin, &request(ContentCategory::SocialUpdate));
        assert_eq!(out, text.trim());
    }

    #[test]
    fn test_instagram_moves_hashtag_lines_last() {
        let text = "First line\n#Garden #Herbs\nSecond line\nThird line";
        let out = optimize(text, Platform::Instagram, &request(ContentCategory::SocialUpdate));
        assert_eq!(out, "First line\nSecond line\nThird line\n\n#Garden #Herbs");
    }

    #[test]
    fn test_facebook_breaks_after_first_sentence() {
        let text = format!("Big news today. {}", "more words ".repeat(30));
        let out = optimize(&text, Platform::Facebook, &request(ContentCategory::SocialUpdate));
        assert!(out.starts_with("Big news today.\n\nmore words"), "{out}");
    }

    #[test]
    fn test_youtube_timestamps_only_for_scripts() {
        let text = "Welcome to the channel.";
        let script = optimize(text, Platform::Youtube, &request(ContentCategory::Script));
        assert!(script.starts_with("📍 Timestamps:\n0:00 - Intro"));
        let article = optimize(text, Platform::Youtube, &request(ContentCategory::Article));
        assert_eq!(article, text);
        let stamped = "[00:00] Hello there";
        assert_eq!(optimize(stamped, Platform::Youtube, &request(ContentCategory::Script)), stamped);
    }

    #[test]
    fn test_tiktok_adds_emoji_and_fits_caption() {
        let text = format!("Marketing {}", "x".repeat(200));
        let out = optimize(&text, Platform::Tiktok, &request(ContentCategory::SocialUpdate));
        assert!(out.starts_with("📈 "), "{out}");
        assert!(char_len(&out) <= 150);
    }

    #[test]
    fn test_tiktok_keeps_existing_symbols() {
        let text = "Grow basil 🌿 indoors, a quick tip";
        let out = optimize(text, Platform::Tiktok, &request(ContentCategory::SocialUpdate));
        assert_eq!(out, text);
    }

    #[test]
    fn test_unlimited_platforms_pass_through() {
        let text = long_prose(200);
        assert_eq!(optimize(&text, Platform::Blog, &request(ContentCategory::Article)), text);
        assert_eq!(validate(&text, Platform::Email), text);
    }
}
