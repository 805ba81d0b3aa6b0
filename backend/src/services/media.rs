//! Motivation quotes and illustration URLs

use crate::config::ImageConfig;
use crate::error::ApiError;
use crate::llm::CompletionClient;
use fitness_coach_shared::prompt::{clean_quote, image_url, motivation_messages, FALLBACK_QUOTE};
use fitness_coach_shared::types::{ImageResponse, QuoteResponse};
use tracing::warn;

pub struct MediaService;

impl MediaService {
    /// One short quote; never fails, falls back to a fixed line
    pub async fn motivation(completion: &dyn CompletionClient) -> QuoteResponse {
        let quote = match completion.complete(&motivation_messages()).await {
            Ok(raw) => clean_quote(&raw),
            Err(e) => {
                warn!("Motivation quote failed, using fallback: {}", e);
                String::new()
            }
        };

        QuoteResponse {
            quote: if quote.is_empty() {
                FALLBACK_QUOTE.to_string()
            } else {
                quote
            },
        }
    }

    /// Image URL for a prompt; the image host renders on GET
    pub fn illustration(config: &ImageConfig, prompt: &str) -> Result<ImageResponse, ApiError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(ApiError::BadRequest("Prompt missing".to_string()));
        }

        Ok(ImageResponse {
            image_url: image_url(&config.base_url, prompt, config.width, config.height),
            placeholder: config.placeholder.clone(),
            error_placeholder: config.error_placeholder.clone(),
        })
    }
}
