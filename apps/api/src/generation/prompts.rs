//! Prompt templates for content generation and synthesis.
//!
//! One system template per content category, parameterized by tone, audience
//! and platform. Prompts are deterministic for a given request.

use crate::generation::request::{ContentCategory, GenerationRequest, Platform};
use crate::llm_client::prompts::{ORGANIC_KEYWORDS_INSTRUCTION, PLAIN_OUTPUT_INSTRUCTION};

pub const GENERATION_TEMPERATURE: f32 = 0.7;
pub const SYNTHESIS_TEMPERATURE: f32 = 0.5;

/// Token budget when the request has no target length.
pub const DEFAULT_MAX_TOKENS: u32 = 2000;
const TOKENS_PER_WORD: f64 = 1.3;
const TOKEN_HEADROOM: f64 = 1.5;

pub const SYNTHESIS_SYSTEM: &str =
    "You are an expert editor who merges drafts from multiple writers into one stronger piece.";

/// `target_words × 1.3 × 1.5`, capped at `cap`.
pub fn max_tokens(target_words: Option<u32>, cap: u32) -> u32 {
    match target_words {
        Some(words) => {
            let estimate = (words as f64 * TOKENS_PER_WORD * TOKEN_HEADROOM) as u32;
            estimate.min(cap)
        }
        None => DEFAULT_MAX_TOKENS.min(cap),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// System prompts
// ────────────────────────────────────────────────────────────────────────────

pub fn system_prompt(request: &GenerationRequest) -> String {
    let tone = request.tone.as_str();
    let platform = request.platform.as_str();
    let audience = request
        .target_audience
        .as_deref()
        .unwrap_or("a general audience");

    let (role, strengths, direction) = match request.category {
        ContentCategory::Article => (
            "an expert blog writer and content strategist".to_string(),
            "engaging, search-friendly articles; holding attention from intro to conclusion; \
             supporting points with stories and data; actionable takeaways",
            format!(
                "Write in a {tone} tone for {audience}. Deliver genuine value and practical insight throughout."
            ),
        ),
        ContentCategory::SocialUpdate => (
            format!("a social media specialist focused on {platform}"),
            "scroll-stopping hooks; platform-native formatting; clear calls-to-action; \
             writing for reach and engagement",
            format!(
                "Write in a {tone} tone tailored to {platform}. Keep it concise, shareable, and end with a clear call-to-action."
            ),
        ),
        ContentCategory::Message => (
            "an email marketing specialist with a track record of conversions".to_string(),
            "subject lines that get opened; persuasive body copy; strong calls-to-action; \
             personalization for the reader",
            format!(
                "Write in a {tone} tone for {audience}. Lead with a clear value proposition and close with one strong call-to-action."
            ),
        ),
        ContentCategory::Advertisement => (
            "a direct-response copywriter".to_string(),
            "attention-grabbing headlines; benefit-driven copy; urgency; buyer psychology",
            format!(
                "Write in a {tone} tone that drives immediate action. Favor benefits over features and finish with a clear call-to-action."
            ),
        ),
        ContentCategory::LandingCopy => (
            "a conversion optimization expert writing landing page copy".to_string(),
            "headlines that convert; page structure; handling objections; building trust with social proof",
            format!(
                "Write in a {tone} tone for {audience}. Structure: headline, value proposition, benefits, social proof, call-to-action."
            ),
        ),
        ContentCategory::Script => (
            format!("a video script writer creating scripts for {platform}"),
            "hooks in the first three seconds; pacing for video; keeping viewers watching; memorable endings",
            format!(
                "Write in a {tone} tone for {platform}. Include a hook, a story arc, clear value, and a call-to-action."
            ),
        ),
        ContentCategory::ProductCopy => (
            "an e-commerce copywriter specializing in product descriptions".to_string(),
            "benefit-driven product copy; addressing customer pain points; creating desire; \
             search-friendly product pages",
            format!(
                "Write in a {tone} tone that sells to {audience}. Explain the benefits, the key features, and why to buy now."
            ),
        ),
        ContentCategory::ReleaseNotice => (
            "a PR professional writing press releases".to_string(),
            "AP style; newsworthy angles; inverted-pyramid structure; media-ready copy",
            format!(
                "Write in a {tone} tone following press release conventions. Structure: headline, dateline, lead, body, boilerplate, contact."
            ),
        ),
    };

    format!("You are {role}.\n\nYour strengths: {strengths}.\n\n{direction}\n\n{PLAIN_OUTPUT_INSTRUCTION}")
}

// ────────────────────────────────────────────────────────────────────────────
// User prompt
// ────────────────────────────────────────────────────────────────────────────

/// Suggested length when the request gives no target.
pub fn suggested_length(category: ContentCategory) -> &'static str {
    match category {
        ContentCategory::Article => "800-1200 words",
        ContentCategory::SocialUpdate => "50-100 words",
        ContentCategory::Message => "200-400 words",
        ContentCategory::Advertisement => "50-150 words",
        ContentCategory::LandingCopy => "500-800 words",
        ContentCategory::Script => "150-300 words",
        ContentCategory::ProductCopy => "150-250 words",
        ContentCategory::ReleaseNotice => "400-600 words",
    }
}

/// Guidance for each destination. Blog gets none.
pub fn platform_guidance(platform: Platform) -> Option<&'static str> {
    match platform {
        Platform::Blog => None,
        Platform::Twitter => Some("Concise and punchy. Stay under 280 characters."),
        Platform::Linkedin => {
            Some("Professional register. Use 3-5 relevant hashtags. Invite discussion.")
        }
        Platform::Instagram => {
            Some("Visual storytelling with emojis. Include 5-10 relevant hashtags.")
        }
        Platform::Facebook => Some("Conversational. Ask a question to encourage comments."),
        Platform::Youtube => Some("Include timestamps. Hook viewers in the first 3 seconds."),
        Platform::Tiktok => Some("Fast-paced, trend-aware, entertainment first."),
        Platform::Pinterest => Some("Search-optimized with a detailed pin description."),
        Platform::Email => Some("Scannable paragraphs with a single clear call-to-action."),
    }
}

const ARTICLE_SEO_REQUIREMENTS: &str = "\
SEO requirements:
- Suggest a meta description of 150-160 characters
- Structure the article with H2 and H3 headers
- Point out internal linking opportunities
- Use lists and bullet points for readability
- End with a strong conclusion and call-to-action";

pub fn user_prompt(request: &GenerationRequest) -> String {
    let mut parts = vec![format!("Topic: {}", request.topic)];

    if !request.keywords.is_empty() {
        parts.push(format!(
            "Keywords: {}\n{ORGANIC_KEYWORDS_INSTRUCTION}",
            request.keywords.join(", ")
        ));
    }

    match request.target_length {
        Some(words) => parts.push(format!("Target length: approximately {words} words")),
        None => parts.push(format!(
            "Target length: {}",
            suggested_length(request.category)
        )),
    }

    if let Some(audience) = &request.target_audience {
        parts.push(format!("Target audience: {audience}"));
    }

    if let Some(tip) = platform_guidance(request.platform) {
        parts.push(format!(
            "Platform: optimize specifically for {}\nPlatform tip: {tip}",
            request.platform.as_str()
        ));
    }

    if let Some(outline) = &request.outline {
        parts.push(format!("Follow this structure, replacing bracketed hints:\n{outline}"));
    }

    if request.seo_optimize && request.category == ContentCategory::Article {
        parts.push(ARTICLE_SEO_REQUIREMENTS.to_string());
    }

    parts.join("\n\n")
}

// ────────────────────────────────────────────────────────────────────────────
// Synthesis
// ────────────────────────────────────────────────────────────────────────────

/// Merge prompt embedding both drafts verbatim.
pub fn synthesis_prompt(first: &str, second: &str) -> String {
    format!(
        "Two writers produced drafts for the same brief. Combine them into a single, stronger version.\n\n\
         Draft A:\n{first}\n\n\
         Draft B:\n{second}\n\n\
         Guidelines:\n\
         - Keep the tone and structure of the stronger draft\n\
         - Use the most compelling phrasing and examples from either draft\n\
         - Keep the same target audience\n\
         - Make the result read as one coherent piece\n\n\
         {PLAIN_OUTPUT_INSTRUCTION}"
    )
}
