//! Hashtag synthesis. Turns request keywords into platform-styled `#tags`.

use crate::generation::request::Platform;

const MIN_TAG_CHARS: usize = 3;
const MAX_TAG_CHARS: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Appended to the first line.
    Inline,
    /// Trailing block after a blank line.
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Casing {
    /// `Urbangardening`
    CapitalizeFirst,
    /// `UrbanGardening`
    Camel,
    /// `urbangardening`
    Lower,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashtagConfig {
    pub max_tags: usize,
    pub placement: Placement,
    pub casing: Casing,
}

/// Per-platform hashtag strategy. `None` means the platform gets no tags.
pub fn hashtag_config(platform: Platform) -> Option<HashtagConfig> {
    let (max_tags, placement, casing) = match platform {
        Platform::Twitter => (2, Placement::Inline, Casing::CapitalizeFirst),
        Platform::Instagram => (10, Placement::End, Casing::Camel),
        Platform::Linkedin => (5, Placement::End, Casing::CapitalizeFirst),
        Platform::Facebook => (2, Placement::Inline, Casing::CapitalizeFirst),
        Platform::Tiktok => (5, Placement::Inline, Casing::Lower),
        Platform::Pinterest => (5, Placement::End, Casing::CapitalizeFirst),
        Platform::Blog | Platform::Youtube | Platform::Email => return None,
    };
    Some(HashtagConfig {
        max_tags,
        placement,
        casing,
    })
}

/// Adds hashtags built from `keywords` to `text`.
///
/// No-op when there are no keywords, when the text already carries a `#`,
/// or when the platform has no hashtag strategy.
pub fn add_hashtags(text: &str, keywords: &[String], platform: Platform) -> String {
    if keywords.is_empty() || text.contains('#') {
        return text.to_string();
    }
    let Some(config) = hashtag_config(platform) else {
        return text.to_string();
    };

    let tags = build_hashtags(keywords, &config);
    if tags.is_empty() {
        return text.to_string();
    }
    let tag_line = tags.join(" ");

    match config.placement {
        Placement::Inline => match text.split_once('\n') {
            Some((first, rest)) => format!("{first} {tag_line}\n{rest}"),
            None => format!("{text} {tag_line}"),
        },
        Placement::End => format!("{text}\n\n{tag_line}"),
    }
}

/// Formats the first `max_tags` keywords, dropping tags outside 3..=30 chars.
pub fn build_hashtags(keywords: &[String], config: &HashtagConfig) -> Vec<String> {
    keywords
        .iter()
        .take(config.max_tags)
        .map(|k| format_tag(k, config.casing))
        .filter(|t| (MIN_TAG_CHARS..=MAX_TAG_CHARS).contains(&t.chars().count()))
        .map(|t| format!("#{t}"))
        .collect()
}

fn format_tag(keyword: &str, casing: Casing) -> String {
    let is_separator = |c: char| c.is_whitespace() || c == '-' || c == '_';
    match casing {
        Casing::CapitalizeFirst => {
            let joined: String = keyword.chars().filter(|c| !is_separator(*c)).collect();
            capitalize(&joined)
        }
        Casing::Camel => keyword
            .split(is_separator)
            .filter(|w| !w.is_empty())
            .map(capitalize)
            .collect(),
        Casing::Lower => keyword
            .chars()
            .filter(|c| !is_separator(*c))
            .collect::<String>()
            .to_lowercase(),
    }
}

/// First character upper-cased, the rest lower-cased.
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
