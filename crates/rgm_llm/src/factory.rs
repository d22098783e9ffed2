//! Generator construction from settings.

use std::sync::Arc;

use tracing::info;

use rgm_core::GenerationSettings;

use crate::error::LlmResult;
use crate::gemini::GeminiGenerator;
use crate::openai::OpenAiGenerator;
use crate::provider::{GenerationOptions, Generator, Provider};
use crate::retry::RetryPolicy;

impl From<&GenerationSettings> for GenerationOptions {
    fn from(settings: &GenerationSettings) -> Self {
        Self {
            max_output_tokens: settings.max_output_tokens,
            temperature: settings.temperature,
        }
    }
}

impl From<&GenerationSettings> for RetryPolicy {
    fn from(settings: &GenerationSettings) -> Self {
        RetryPolicy::new(
            settings.max_attempts,
            std::time::Duration::from_secs(settings.retry_delay_secs),
        )
    }
}

/// Build the configured provider's client, reading its API key from the
/// environment.
pub fn create_generator(settings: &GenerationSettings) -> LlmResult<Arc<dyn Generator>> {
    let provider = Provider::parse(&settings.provider)?;
    let options = GenerationOptions::from(settings);
    info!(provider = %provider, "Creating generation client");

    let generator: Arc<dyn Generator> = match provider {
        Provider::Gemini => {
            let mut client = GeminiGenerator::from_env()?.with_options(options);
            if let Some(url) = &settings.base_url {
                client = client.with_base_url(url);
            }
            Arc::new(client)
        }
        Provider::OpenAi => {
            let mut client = OpenAiGenerator::from_env()?.with_options(options);
            if let Some(url) = &settings.base_url {
                client = client.with_base_url(url);
            }
            Arc::new(client)
        }
    };
    Ok(generator)
}
