use std::sync::Arc;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};

use super::transport::{ContentTransport, RawResponse};
use crate::{
    assembler,
    config::DEFAULT_INTER_CALL_DELAY,
    error::{BabyFaceError, Result},
    models::{ErrorEnvelope, GenerateContentRequest, GenerateContentResponse, GenerationRequest, ImagePayload},
    prompt,
};

const QUOTA_MARKERS: [&str; 3] = ["quota", "rate limit", "billing"];
const DEFAULT_SERVICE_MESSAGE: &str = "API request failed";

/// Issues one `generateContent` call per requested image, one at a time.
#[derive(Clone)]
pub struct ImageClient {
    transport: Arc<dyn ContentTransport>,
    inter_call_delay: Duration,
}

impl ImageClient {
    pub fn new(transport: Arc<dyn ContentTransport>) -> Self {
        Self {
            transport,
            inter_call_delay: DEFAULT_INTER_CALL_DELAY,
        }
    }

    pub fn with_inter_call_delay(mut self, delay: Duration) -> Self {
        self.inter_call_delay = delay;
        self
    }

    pub fn inter_call_delay(&self) -> Duration {
        self.inter_call_delay
    }

    /// Generates `request.number_of_images` images for one target age, in call order.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<Vec<ImagePayload>> {
        let instruction = prompt::build_prompt(request);
        let mut images = Vec::with_capacity(usize::from(request.number_of_images));

        log::info!(
            "Generating {} image(s) for age '{}'",
            request.number_of_images,
            request.age
        );

        for index in 0..request.number_of_images {
            if index > 0 {
                log::debug!(
                    "Waiting {}ms before the next request",
                    self.inter_call_delay.as_millis()
                );
                tokio::time::sleep(self.inter_call_delay).await;
            }

            let parts = assembler::assemble_parts(&request.subjects, &instruction)?;
            let body = GenerateContentRequest::image_and_text(parts);

            let raw = self.transport.generate_content(&body).await?;
            let image = classify_response(raw)?;

            log::debug!(
                "Image {}/{} for '{}' received ({}, {} bytes)",
                index + 1,
                request.number_of_images,
                request.age,
                image.mime_type,
                image.data.len()
            );
            images.push(image);
        }

        Ok(images)
    }
}

/// Turns one raw exchange into an image or the matching error.
pub fn classify_response(raw: RawResponse) -> Result<ImagePayload> {
    if !raw.is_success() {
        return Err(classify_failure(raw.status, &raw.body));
    }

    let response: GenerateContentResponse = serde_json::from_str(&raw.body)
        .map_err(|e| BabyFaceError::MalformedResponse(e.to_string()))?;
    let parts = response
        .first_candidate_parts()
        .ok_or(BabyFaceError::NoImageProduced)?;

    if let Some(inline) = parts.iter().find_map(|part| part.inline_data.as_ref()) {
        let data = STANDARD
            .decode(inline.data.as_bytes())
            .map_err(|e| BabyFaceError::MalformedResponse(format!("Invalid image data: {}", e)))?;
        return Ok(ImagePayload::new(inline.mime_type.clone(), data));
    }

    if let Some(text) = parts
        .iter()
        .filter_map(|part| part.text.as_deref())
        .find(|text| !text.is_empty())
    {
        return Err(BabyFaceError::UnexpectedTextResponse(text.to_string()));
    }

    Err(BabyFaceError::NoImageProduced)
}

pub fn is_quota_failure(status: u16, body: &str) -> bool {
    status == 429 || QUOTA_MARKERS.iter().any(|marker| body.contains(marker))
}

pub fn classify_failure(status: u16, body: &str) -> BabyFaceError {
    if is_quota_failure(status, body) {
        return BabyFaceError::quota_exceeded(status);
    }

    let message = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => envelope
            .error
            .and_then(|detail| detail.message)
            .unwrap_or_else(|| DEFAULT_SERVICE_MESSAGE.to_string()),
        Err(_) if body.trim().is_empty() => DEFAULT_SERVICE_MESSAGE.to_string(),
        Err(_) => body.to_string(),
    };

    BabyFaceError::ServiceError { status, message }
}
