/*!
 * Provider-specific concurrency tuning.
 *
 * A local model service answers one request at a time, while the hosted API
 * tolerates a few requests in flight before throttling kicks in.
 */

use crate::app_config::TranslationProvider;

/// Provider-specific concurrency profile with tuned defaults
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderProfile {
    /// Maximum concurrent requests
    pub max_concurrent_requests: usize,
    /// Whether the provider throttles with rate-limit responses
    pub rate_limited: bool,
}

impl ProviderProfile {
    /// Get the profile for a given provider
    pub fn for_provider(provider: TranslationProvider) -> Self {
        match provider {
            TranslationProvider::ChatGlm => Self {
                max_concurrent_requests: 1,
                rate_limited: false,
            },
            TranslationProvider::OpenAI => Self {
                max_concurrent_requests: 4,
                rate_limited: true,
            },
        }
    }

    /// Get effective concurrent requests, respecting any user override
    pub fn effective_concurrent_requests(&self, user_override: Option<usize>) -> usize {
        user_override.unwrap_or(self.max_concurrent_requests).max(1)
    }
}
