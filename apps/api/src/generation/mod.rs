// Content generation engine.
// Request validation, budget admission, provider routing, scoring, platform
// shaping, variants, publish preparation, templates and the dashboard.
// All provider calls go through llm_client via the gateway.

pub mod budget;
pub mod dashboard;
pub mod gateway;
pub mod handlers;
pub mod hashtags;
pub mod orchestrator;
pub mod platform;
pub mod prompts;
pub mod publish;
pub mod quality;
pub mod request;
pub mod seo;
pub mod templates;
pub mod text;
pub mod variants;
