//! Provider gateway: single-call and premium dual-call generation.
//!
//! Premium runs the primary and secondary providers concurrently and
//! tolerates either failing. Two drafts are merged by a synthesis call on the
//! primary; if that fails the longer draft wins. Without a secondary the
//! gateway quietly runs the standard path.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::generation::prompts::{
    max_tokens, synthesis_prompt, system_prompt, user_prompt, GENERATION_TEMPERATURE,
    SYNTHESIS_SYSTEM, SYNTHESIS_TEMPERATURE,
};
use crate::generation::request::GenerationRequest;
use crate::llm_client::{LlmError, TextProvider};
use crate::models::content::ModelTier;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// Standard path: the one provider call failed.
    #[error("{provider} generation failed: {source}")]
    Provider {
        provider: String,
        #[source]
        source: LlmError,
    },

    /// Premium path: every provider call failed.
    #[error("All providers failed ({})", .0.join("; "))]
    AllProvidersFailed(Vec<String>),
}

/// Final text plus which path produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayOutput {
    pub text: String,
    pub tier: ModelTier,
    pub model: String,
}

#[derive(Clone)]
pub struct ProviderGateway {
    primary: Arc<dyn TextProvider>,
    secondary: Option<Arc<dyn TextProvider>>,
    token_cap: u32,
}

impl ProviderGateway {
    pub fn new(
        primary: Arc<dyn TextProvider>,
        secondary: Option<Arc<dyn TextProvider>>,
        token_cap: u32,
    ) -> Self {
        Self {
            primary,
            secondary,
            token_cap,
        }
    }

    pub fn has_secondary(&self) -> bool {
        self.secondary.is_some()
    }

    /// Routes to premium when requested and a secondary exists, else standard.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<GatewayOutput, GatewayError> {
        if request.use_premium {
            self.generate_premium(request).await
        } else {
            self.generate_standard(request).await
        }
    }

    pub async fn generate_standard(
        &self,
        request: &GenerationRequest,
    ) -> Result<GatewayOutput, GatewayError> {
        let (system, user, tokens) = self.prompt_pair(request);
        let text = self
            .primary
            .complete(&system, &user, tokens, GENERATION_TEMPERATURE)
            .await
            .map_err(|source| GatewayError::Provider {
                provider: self.primary.name().to_string(),
                source,
            })?;

        Ok(GatewayOutput {
            text,
            tier: ModelTier::Standard,
            model: self.primary.model().to_string(),
        })
    }

    pub async fn generate_premium(
        &self,
        request: &GenerationRequest,
    ) -> Result<GatewayOutput, GatewayError> {
        let Some(secondary) = &self.secondary else {
            warn!("Premium requested but no secondary provider configured, using standard generation");
            return self.generate_standard(request).await;
        };

        let (system, user, tokens) = self.prompt_pair(request);
        let (first, second) = tokio::join!(
            self.primary
                .complete(&system, &user, tokens, GENERATION_TEMPERATURE),
            secondary.complete(&system, &user, tokens, GENERATION_TEMPERATURE),
        );

        match (first, second) {
            (Ok(a), Ok(b)) => Ok(self.synthesize(a, b, tokens).await),
            (Ok(text), Err(e)) => {
                warn!(provider = secondary.name(), error = %e, "Secondary provider failed, using primary draft");
                Ok(self.single_draft(text, self.primary.as_ref()))
            }
            (Err(e), Ok(text)) => {
                warn!(provider = self.primary.name(), error = %e, "Primary provider failed, using secondary draft");
                Ok(self.single_draft(text, secondary.as_ref()))
            }
            (Err(a), Err(b)) => Err(GatewayError::AllProvidersFailed(vec![
                format!("{}: {a}", self.primary.name()),
                format!("{}: {b}", secondary.name()),
            ])),
        }
    }

    fn prompt_pair(&self, request: &GenerationRequest) -> (String, String, u32) {
        (
            system_prompt(request),
            user_prompt(request),
            max_tokens(request.target_length, self.token_cap),
        )
    }

    fn single_draft(&self, text: String, provider: &dyn TextProvider) -> GatewayOutput {
        GatewayOutput {
            text,
            tier: ModelTier::MultiModel,
            model: provider.model().to_string(),
        }
    }

    async fn synthesize(&self, first: String, second: String, tokens: u32) -> GatewayOutput {
        let prompt = synthesis_prompt(&first, &second);
        match self
            .primary
            .complete(SYNTHESIS_SYSTEM, &prompt, tokens, SYNTHESIS_TEMPERATURE)
            .await
        {
            Ok(text) => {
                info!("Synthesized premium drafts");
                GatewayOutput {
                    text,
                    tier: ModelTier::MultiModel,
                    model: self.primary.model().to_string(),
                }
            }
            Err(e) => {
                warn!(error = %e, "Synthesis failed, returning the longer draft");
                let text = if second.chars().count() > first.chars().count() {
                    second
                } else {
                    first
                };
                GatewayOutput {
                    text,
                    tier: ModelTier::MultiModel,
                    model: self.primary.model().to_string(),
                }
            }
        }
    }
}
