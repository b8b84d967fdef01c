//! Generation request model: content categories, tones, destinations, and the
//! normalization applied before a request enters the pipeline.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

pub const MAX_KEYWORDS: usize = 10;
pub const MIN_TOPIC_CHARS: usize = 5;
pub const MAX_TOPIC_CHARS: usize = 500;
pub const MAX_AUDIENCE_CHARS: usize = 200;
pub const MIN_TARGET_WORDS: u32 = 50;
pub const MAX_OUTLINE_CHARS: usize = 4000;

// ────────────────────────────────────────────────────────────────────────────
// Enumerations
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentCategory {
    Article,
    SocialUpdate,
    Message,
    Advertisement,
    LandingCopy,
    Script,
    ProductCopy,
    ReleaseNotice,
}

impl ContentCategory {
    pub const ALL: [ContentCategory; 8] = [
        ContentCategory::Article,
        ContentCategory::SocialUpdate,
        ContentCategory::Message,
        ContentCategory::Advertisement,
        ContentCategory::LandingCopy,
        ContentCategory::Script,
        ContentCategory::ProductCopy,
        ContentCategory::ReleaseNotice,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentCategory::Article => "article",
            ContentCategory::SocialUpdate => "social_update",
            ContentCategory::Message => "message",
            ContentCategory::Advertisement => "advertisement",
            ContentCategory::LandingCopy => "landing_copy",
            ContentCategory::Script => "script",
            ContentCategory::ProductCopy => "product_copy",
            ContentCategory::ReleaseNotice => "release_notice",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    #[default]
    Professional,
    Casual,
    Enthusiastic,
    Conversational,
    Authoritative,
    Friendly,
    Humorous,
    Inspirational,
}

impl Tone {
    pub const ALL: [Tone; 8] = [
        Tone::Professional,
        Tone::Casual,
        Tone::Enthusiastic,
        Tone::Conversational,
        Tone::Authoritative,
        Tone::Friendly,
        Tone::Humorous,
        Tone::Inspirational,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Professional => "professional",
            Tone::Casual => "casual",
            Tone::Enthusiastic => "enthusiastic",
            Tone::Conversational => "conversational",
            Tone::Authoritative => "authoritative",
            Tone::Friendly => "friendly",
            Tone::Humorous => "humorous",
            Tone::Inspirational => "inspirational",
        }
    }
}

/// Destination the generated text is shaped for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    #[default]
    Blog,
    Twitter,
    Linkedin,
    Instagram,
    Facebook,
    Youtube,
    Tiktok,
    Pinterest,
    Email,
}

impl Platform {
    pub const ALL: [Platform; 9] = [
        Platform::Blog,
        Platform::Twitter,
        Platform::Linkedin,
        Platform::Instagram,
        Platform::Facebook,
        Platform::Youtube,
        Platform::Tiktok,
        Platform::Pinterest,
        Platform::Email,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Blog => "blog",
            Platform::Twitter => "twitter",
            Platform::Linkedin => "linkedin",
            Platform::Instagram => "instagram",
            Platform::Facebook => "facebook",
            Platform::Youtube => "youtube",
            Platform::Tiktok => "tiktok",
            Platform::Pinterest => "pinterest",
            Platform::Email => "email",
        }
    }

    /// Social destinations where the pipeline synthesizes hashtags on request.
    pub fn takes_generated_hashtags(&self) -> bool {
        matches!(
            self,
            Platform::Twitter | Platform::Instagram | Platform::Linkedin
        )
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Request
// ────────────────────────────────────────────────────────────────────────────

fn default_true() -> bool {
    true
}

/// A request for one piece of generated marketing text.
///
/// Construct from JSON, then call [`GenerationRequest::normalize`] before use:
/// the rest of the pipeline assumes a trimmed topic and a clean keyword list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub category: ContentCategory,
    pub topic: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub tone: Tone,
    #[serde(default)]
    pub target_audience: Option<String>,
    #[serde(default)]
    pub platform: Platform,
    /// Target word count.
    #[serde(default)]
    pub target_length: Option<u32>,
    #[serde(default = "default_true")]
    pub include_hashtags: bool,
    #[serde(default = "default_true")]
    pub seo_optimize: bool,
    #[serde(default)]
    pub generate_variants: bool,
    #[serde(default)]
    pub use_premium: bool,
    /// Section structure the text should follow. Filled in by templates.
    #[serde(default)]
    pub outline: Option<String>,
}

impl GenerationRequest {
    /// Trims and validates the request.
    ///
    /// Keywords are trimmed, blank entries dropped, and duplicates removed
    /// case-insensitively (first spelling wins) before the count is checked.
    pub fn normalize(mut self, max_target_words: u32) -> Result<Self, AppError> {
        self.topic = self.topic.trim().to_string();
        let topic_chars = self.topic.chars().count();
        if topic_chars < MIN_TOPIC_CHARS {
            return Err(AppError::Validation(format!(
                "topic must be at least {MIN_TOPIC_CHARS} characters"
            )));
        }
        if topic_chars > MAX_TOPIC_CHARS {
            return Err(AppError::Validation(format!(
                "topic must be at most {MAX_TOPIC_CHARS} characters"
            )));
        }

        let mut seen = HashSet::new();
        self.keywords = self
            .keywords
            .iter()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .filter(|k| seen.insert(k.to_lowercase()))
            .map(str::to_string)
            .collect();
        if self.keywords.len() > MAX_KEYWORDS {
            return Err(AppError::Validation(format!(
                "at most {MAX_KEYWORDS} keywords are allowed (got {})",
                self.keywords.len()
            )));
        }

        self.target_audience = self
            .target_audience
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty());
        if let Some(audience) = &self.target_audience {
            if audience.chars().count() > MAX_AUDIENCE_CHARS {
                return Err(AppError::Validation(format!(
                    "target_audience must be at most {MAX_AUDIENCE_CHARS} characters"
                )));
            }
        }

        self.outline = self
            .outline
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty());
        if let Some(outline) = &self.outline {
            if outline.chars().count() > MAX_OUTLINE_CHARS {
                return Err(AppError::Validation(format!(
                    "outline must be at most {MAX_OUTLINE_CHARS} characters"
                )));
            }
        }

        if let Some(length) = self.target_length {
            if !(MIN_TARGET_WORDS..=max_target_words).contains(&length) {
                return Err(AppError::Validation(format!(
                    "target_length must be between {MIN_TARGET_WORDS} and {max_target_words} words"
                )));
            }
        }

        Ok(self)
    }

    /// Same request with a different tone. Used for comparison variants.
    pub fn with_tone(&self, tone: Tone) -> Self {
        Self {
            tone,
            ..self.clone()
        }
    }
}

#[cfg(test)]
impl GenerationRequest {
    /// Minimal request with the serde defaults applied.
    pub fn sample(category: ContentCategory, topic: &str) -> Self {
        Self {
            category,
            topic: topic.to_string(),
            keywords: vec![],
            tone: Tone::default(),
            target_audience: None,
            platform: Platform::default(),
            target_length: None,
            include_hashtags: true,
            seo_optimize: true,
            generate_variants: false,
            use_premium: false,
            outline: None,
        }
    }
}
