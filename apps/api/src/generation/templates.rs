//! Built-in content templates: proven section structures that either come
//! back filled for manual editing or steer a normal generation run.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::generation::orchestrator::{ContentOrchestrator, GenerationResult};
use crate::generation::request::{ContentCategory, GenerationRequest, Platform, Tone};

#[derive(Debug, Clone, Serialize)]
pub struct ContentTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub best_for: &'static [&'static str],
    pub example: &'static str,
    pub category: ContentCategory,
    pub platform: Platform,
    pub tone: Tone,
    /// Bracketed hints such as `[Topic]` are substituted from variables.
    pub structure: &'static str,
}

/// Listing entry without the structure body.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateSummary {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub best_for: &'static [&'static str],
    pub example: &'static str,
    pub category: ContentCategory,
}

#[derive(Debug, Serialize)]
pub struct TemplateCatalog {
    pub total: usize,
    pub templates: Vec<TemplateSummary>,
}

pub const TEMPLATES: &[ContentTemplate] = &[
    ContentTemplate {
        id: "blog_listicle",
        name: "Listicle Blog Post",
        description: "Number-based article format (e.g. '10 Tips for...')",
        best_for: &["How-to guides", "Tips and tricks", "Resource lists"],
        example: "10 AI Marketing Tools That Will Transform Your Business",
        category: ContentCategory::Article,
        platform: Platform::Blog,
        tone: Tone::Professional,
        structure: "# [Number] [Topic] [Benefit]\n\n\
                    ## Introduction\n\
                    Hook the reader with a relatable problem or question. Preview what they'll learn.\n\n\
                    ## [Item 1]: [Compelling Title]\n\
                    Detailed explanation with examples\n\n\
                    ## [Item 2]: [Compelling Title]\n\
                    Detailed explanation with examples\n\n\
                    Continue for all items.\n\n\
                    ## Conclusion\n\
                    Summarize key takeaways and include a clear call-to-action.",
    },
    ContentTemplate {
        id: "blog_how_to",
        name: "How-To Guide",
        description: "Step-by-step tutorial format",
        best_for: &["Tutorials", "Process guides", "Skill-building"],
        example: "How to Set Up Your First Marketing Campaign in 30 Minutes",
        category: ContentCategory::Article,
        platform: Platform::Blog,
        tone: Tone::Friendly,
        structure: "# How to [Topic]\n\n\
                    ## Introduction\n\
                    - Why this matters\n\
                    - What you'll need\n\
                    - Expected outcome\n\n\
                    ## Step 1: [Action]\n\
                    Detailed instructions with examples\n\n\
                    ## Step 2: [Action]\n\
                    Detailed instructions with examples\n\n\
                    Continue for all steps.\n\n\
                    ## Common Mistakes to Avoid\n\
                    List of pitfalls and how to avoid them\n\n\
                    ## Conclusion\n\
                    Summary and next steps",
    },
    ContentTemplate {
        id: "social_campaign",
        name: "Multi-Platform Social Campaign",
        description: "Coordinated social media campaign across platforms",
        best_for: &["Product launches", "Events", "Brand awareness"],
        example: "New product launch campaign",
        category: ContentCategory::SocialUpdate,
        platform: Platform::Linkedin,
        tone: Tone::Enthusiastic,
        structure: "Campaign: [Topic]\n\n\
                    twitter: Hook + Value + CTA in 280 chars. 1-2 hashtags max.\n\
                    linkedin: Professional insight + statistics + engagement question. 3-5 hashtags.\n\
                    instagram: Visual story + personal touch + 5-10 hashtags.\n\
                    facebook: Conversational + community-focused + question to drive comments.",
    },
    ContentTemplate {
        id: "email_welcome",
        name: "Welcome Email Sequence",
        description: "3-email sequence for new subscribers",
        best_for: &["New subscribers", "Customer onboarding", "Building relationships"],
        example: "SaaS product welcome sequence",
        category: ContentCategory::Message,
        platform: Platform::Email,
        tone: Tone::Friendly,
        structure: "Email 1 (immediately)\n\
                    Subject: Welcome to [Brand]! Here's what to expect...\n\
                    Warm greeting + Set expectations + Quick win + What's next\n\n\
                    Email 2 (day 3)\n\
                    Subject: The one thing that changed everything for [Audience]\n\
                    Story hook + Problem identification + Solution + Social proof\n\n\
                    Email 3 (day 7)\n\
                    Subject: Ready to [Result]? Start here.\n\
                    Recap value + Clear offer + Address objections + Urgent CTA",
    },
    ContentTemplate {
        id: "ad_copy_psa",
        name: "Problem-Solution-Action Ad",
        description: "Classic direct response ad framework",
        best_for: &["Facebook ads", "Google ads", "LinkedIn ads"],
        example: "Facebook ad for marketing software",
        category: ContentCategory::Advertisement,
        platform: Platform::Facebook,
        tone: Tone::Enthusiastic,
        structure: "Headline: [Pain point as a question or statement]\n\n\
                    Problem: Are you struggling with [Problem]?\n\n\
                    Solution: [Product] helps you [Benefit] without [Objection].\n\n\
                    Proof: [Statistic, testimonial, or result]\n\n\
                    Call-to-action: [Clear, action-oriented CTA with urgency]",
    },
    ContentTemplate {
        id: "landing_page",
        name: "High-Converting Landing Page",
        description: "Conversion-focused page structure",
        best_for: &["Product pages", "Lead magnets", "Event registrations"],
        example: "SaaS product landing page",
        category: ContentCategory::LandingCopy,
        platform: Platform::Blog,
        tone: Tone::Professional,
        structure: "## Headline\n\
                    [Value proposition in 10 words or less]\n\n\
                    ### Subheadline\n\
                    Who it's for and what they get\n\n\
                    ### The Problem\n\
                    ### The Solution\n\
                    ### Key Benefits\n\
                    - [Benefit 1]\n\
                    - [Benefit 2]\n\
                    - [Benefit 3]\n\n\
                    ### How It Works\n\
                    1. [Step 1]\n\
                    2. [Step 2]\n\
                    3. [Step 3]\n\n\
                    ### Social Proof\n\
                    ### Pricing\n\
                    ### Risk Reversal\n\
                    ### FAQ\n\
                    ### Final CTA",
    },
];

fn default_true() -> bool {
    true
}

/// POST body for generating from a template. Unset fields fall back to the
/// template's category defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TemplateGenerateRequest {
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Values for bracketed hints, keyed without brackets.
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
    #[serde(default = "default_true")]
    pub use_ai: bool,
    #[serde(default)]
    pub tone: Option<Tone>,
    #[serde(default)]
    pub platform: Option<Platform>,
    #[serde(default)]
    pub target_audience: Option<String>,
    #[serde(default)]
    pub target_length: Option<u32>,
    #[serde(default)]
    pub use_premium: bool,
}

#[derive(Debug, Serialize)]
pub struct TemplateOutput {
    pub template_id: &'static str,
    pub ai_generated: bool,
    pub content: String,
    /// Present only when the text came from a generation run.
    pub generation: Option<GenerationResult>,
}

pub fn catalog() -> TemplateCatalog {
    let templates: Vec<TemplateSummary> = TEMPLATES
        .iter()
        .map(|t| TemplateSummary {
            id: t.id,
            name: t.name,
            description: t.description,
            best_for: t.best_for,
            example: t.example,
            category: t.category,
        })
        .collect();
    TemplateCatalog {
        total: templates.len(),
        templates,
    }
}

pub fn find_template(id: &str) -> Result<&'static ContentTemplate, AppError> {
    TEMPLATES
        .iter()
        .find(|t| t.id == id)
        .ok_or_else(|| AppError::NotFound(format!("Template '{id}' not found")))
}

/// Substitutes `[key]` hints. Unknown hints stay bracketed.
pub fn fill_structure(structure: &str, variables: &BTreeMap<String, String>) -> String {
    variables
        .iter()
        .fold(structure.to_string(), |filled, (key, value)| {
            filled.replace(&format!("[{key}]"), value)
        })
}

impl TemplateGenerateRequest {
    /// Variables with the topic standing in for `[Topic]` unless overridden.
    fn variables(&self) -> BTreeMap<String, String> {
        let mut variables = self.variables.clone();
        let topic = self.topic.trim();
        if !topic.is_empty() {
            variables
                .entry("Topic".to_string())
                .or_insert_with(|| topic.to_string());
        }
        variables
    }

    fn into_generation(self, template: &ContentTemplate, outline: String) -> GenerationRequest {
        GenerationRequest {
            category: template.category,
            topic: self.topic,
            keywords: self.keywords,
            tone: self.tone.unwrap_or(template.tone),
            target_audience: self.target_audience,
            platform: self.platform.unwrap_or(template.platform),
            target_length: self.target_length,
            include_hashtags: true,
            seo_optimize: true,
            generate_variants: false,
            use_premium: self.use_premium,
            outline: Some(outline),
        }
    }
}

/// Fills the template, then either returns it as-is or runs it through the
/// regular generation pipeline (budget admission included).
pub async fn generate_from_template(
    orchestrator: &ContentOrchestrator,
    template_id: &str,
    request: TemplateGenerateRequest,
) -> Result<TemplateOutput, AppError> {
    let template = find_template(template_id)?;
    let filled = fill_structure(template.structure, &request.variables());

    if !request.use_ai {
        return Ok(TemplateOutput {
            template_id: template.id,
            ai_generated: false,
            content: filled,
            generation: None,
        });
    }

    info!(template = template.id, "Generating from template");
    let result = orchestrator
        .generate(request.into_generation(template, filled))
        .await?;
    Ok(TemplateOutput {
        template_id: template.id,
        ai_generated: true,
        content: result.content.clone(),
        generation: Some(result),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use super::*;
    use crate::generation::budget::{BudgetGuard, BudgetPolicy};
    use crate::generation::gateway::ProviderGateway;
    use crate::generation::orchestrator::OrchestratorSettings;
    use crate::jobs::JobQueue;
    use crate::llm_client::mock::ScriptedProvider;
    use crate::store::memory::MemoryStore;

    fn orchestrator(provider: Arc<ScriptedProvider>, store: Arc<MemoryStore>) -> ContentOrchestrator {
        let (jobs, _rx) = JobQueue::new(16);
        ContentOrchestrator::new(
            ProviderGateway::new(provider, None, 4000),
            BudgetGuard::new(BudgetPolicy::new(0.0, 0), store.clone()),
            store,
            jobs,
            OrchestratorSettings {
                max_target_words: 5000,
                ..OrchestratorSettings::default()
            },
        )
    }

    #[test]
    fn test_catalog_ids_are_unique() {
        let catalog = catalog();
        assert_eq!(catalog.total, TEMPLATES.len());
        let ids: HashSet<_> = catalog.templates.iter().map(|t| t.id).collect();
        assert_eq!(ids.len(), TEMPLATES.len());
    }

    #[test]
    fn test_unknown_template_is_not_found() {
        assert!(matches!(find_template("press_kit"), Err(AppError::NotFound(_))));
        assert_eq!(find_template("landing_page").unwrap().category, ContentCategory::LandingCopy);
    }

    #[test]
    fn test_fill_replaces_known_hints_only() {
        let mut variables = BTreeMap::new();
        variables.insert("Number".to_string(), "7".to_string());
        variables.insert("Topic".to_string(), "balcony herbs".to_string());
        let filled = fill_structure("# [Number] [Topic] [Benefit]", &variables);
        assert_eq!(filled, "# 7 balcony herbs [Benefit]");
    }

    #[tokio::test]
    async fn test_manual_fill_skips_generation() {
        let provider = Arc::new(ScriptedProvider::replying("primary", "unused"));
        let store = Arc::new(MemoryStore::new());
        let orchestrator = orchestrator(provider.clone(), store.clone());

        let output = generate_from_template(
            &orchestrator,
            "blog_how_to",
            TemplateGenerateRequest {
                topic: "repot a fiddle leaf fig".to_string(),
                use_ai: false,
                ..TemplateGenerateRequest::default()
            },
        )
        .await
        .unwrap();

        assert!(!output.ai_generated);
        assert!(output.content.starts_with("# How to repot a fiddle leaf fig"));
        assert!(output.generation.is_none());
        assert!(provider.calls().is_empty());
        assert!(store.all_content().is_empty());
    }

    #[tokio::test]
    async fn test_ai_fill_uses_template_defaults_and_outline() {
        let provider = Arc::new(ScriptedProvider::replying(
            "primary",
            "Problem: dry soil. Solution: self-watering pots. Order today.",
        ));
        let store = Arc::new(MemoryStore::new());
        let orchestrator = orchestrator(provider.clone(), store.clone());

        let output = generate_from_template(
            &orchestrator,
            "ad_copy_psa",
            TemplateGenerateRequest {
                topic: "Self-watering planters".to_string(),
                use_ai: true,
                ..TemplateGenerateRequest::default()
            },
        )
        .await
        .unwrap();

        assert!(output.ai_generated);
        let generation = output.generation.unwrap();
        assert_eq!(generation.category, ContentCategory::Advertisement);
        assert_eq!(generation.platform, Platform::Facebook);
        assert_eq!(output.content, generation.content);

        let calls = provider.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].user.contains("Call-to-action:"));
        assert_eq!(store.all_content().len(), 1);
    }

    #[tokio::test]
    async fn test_ai_fill_still_validates_topic() {
        let provider = Arc::new(ScriptedProvider::replying("primary", "unused"));
        let orchestrator = orchestrator(provider, Arc::new(MemoryStore::new()));
        let result = generate_from_template(
            &orchestrator,
            "blog_listicle",
            TemplateGenerateRequest {
                use_ai: true,
                ..TemplateGenerateRequest::default()
            },
        )
        .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
