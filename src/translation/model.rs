/*!
 * The translation capability: build a prompt for a content unit, submit it.
 *
 * `ModelTranslator` pairs any `Provider` with a `RetryPolicy`; `create_model`
 * wires the configured backend with its policy.
 */

use anyhow::Result;
use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::app_config::{Config, TranslationProvider};
use crate::book::Content;
use crate::errors::ProviderError;
use crate::logging::SharedLog;
use crate::providers::chatglm::ChatGlm;
use crate::providers::openai::OpenAI;
use crate::providers::Provider;
use crate::translation::concurrency::ProviderProfile;
use crate::translation::prompts;
use crate::translation::retry::RetryPolicy;

/// A backend able to translate content units
#[async_trait]
pub trait TranslationModel: Send + Sync + Debug {
    /// Name used in log messages
    fn name(&self) -> &str;

    /// Prompt for `content`, or `None` when the unit is not translated
    fn make_prompt(&self, content: &Content, target_language: &str) -> Option<String> {
        prompts::prompt_for(content, target_language)
    }

    /// Submit a prompt and return the trimmed response text
    async fn make_request(&self, prompt: &str, cancel: &CancellationToken) -> Result<String, ProviderError>;
}

/// A provider driven by a retry policy
#[derive(Debug)]
pub struct ModelTranslator<P: Provider> {
    name: String,
    provider: P,
    policy: RetryPolicy,
    log: SharedLog,
}

impl<P: Provider> ModelTranslator<P> {
    pub fn new(name: impl Into<String>, provider: P, policy: RetryPolicy, log: SharedLog) -> Self {
        Self {
            name: name.into(),
            provider,
            policy,
            log,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

#[async_trait]
impl<P: Provider> TranslationModel for ModelTranslator<P> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn make_request(&self, prompt: &str, cancel: &CancellationToken) -> Result<String, ProviderError> {
        let provider = &self.provider;
        self.policy
            .run(cancel, self.log.as_ref(), || async move {
                let response = provider.complete(provider.build_request(prompt)).await?;
                P::extract_text(&response)
            })
            .await
    }
}

/// Build the translation model for the configured provider
pub fn create_model(config: &Config, log: SharedLog) -> Result<Arc<dyn TranslationModel>> {
    let translation = &config.translation;
    let common = &translation.common;
    let policy = if ProviderProfile::for_provider(translation.provider).rate_limited {
        RetryPolicy::rate_limited(common.max_attempts, common.rate_limit_delay(), common.retry_backoff())
    } else {
        RetryPolicy::single_attempt()
    };

    let model: Arc<dyn TranslationModel> = match translation.provider {
        TranslationProvider::ChatGlm => {
            let provider = ChatGlm::new(translation.get_endpoint(), translation.get_timeout());
            Arc::new(ModelTranslator::new(
                format!("ChatGLM ({})", translation.get_model()),
                provider,
                policy,
                log,
            ))
        }
        TranslationProvider::OpenAI => {
            let provider = OpenAI::new(
                translation.get_api_key(),
                translation.get_endpoint(),
                translation.get_model(),
                translation.get_timeout(),
            )
            .with_temperature(common.temperature)
            .with_max_tokens(common.max_tokens);
            Arc::new(ModelTranslator::new(
                format!("OpenAI ({})", provider.model()),
                provider,
                policy,
                log,
            ))
        }
    };

    Ok(model)
}
