use serde::{Deserialize, Serialize};

use super::ImagePayload;

/// One unit of a multi-modal request: an attachment or a text block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Part {
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
    Text {
        text: String,
    },
}

impl Part {
    pub fn image(payload: &ImagePayload) -> Self {
        Part::Inline {
            inline_data: InlineData {
                mime_type: payload.mime_type.clone(),
                data: payload.to_base64(),
            },
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Part::Text { text: text.into() }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Part::Text { text } => Some(text),
            Part::Inline { .. } => None,
        }
    }

    pub fn is_inline(&self) -> bool {
        matches!(self, Part::Inline { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineData {
    #[serde(rename = "mimeType", alias = "mime_type")]
    pub mime_type: String,
    /// Base64 encoded bytes.
    pub data: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<RequestContent>,
    #[serde(rename = "generationConfig")]
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestContent {
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationConfig {
    #[serde(rename = "responseModalities")]
    pub response_modalities: Vec<String>,
}

impl GenerateContentRequest {
    /// A single-turn request asking for image and text output.
    pub fn image_and_text(parts: Vec<Part>) -> Self {
        Self {
            contents: vec![RequestContent { parts }],
            generation_config: GenerationConfig {
                response_modalities: vec!["IMAGE".to_string(), "TEXT".to_string()],
            },
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponsePart {
    #[serde(default, rename = "inlineData", alias = "inline_data")]
    pub inline_data: Option<InlineData>,
    #[serde(default)]
    pub text: Option<String>,
}

impl GenerateContentResponse {
    /// Parts of the first candidate, if it carries any content.
    pub fn first_candidate_parts(&self) -> Option<&[ResponsePart]> {
        self.candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .map(|content| content.parts.as_slice())
    }
}

/// `{"error": {"message": ...}}` body returned with non-success statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorEnvelope {
    pub error: Option<ErrorDetail>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorDetail {
    pub message: Option<String>,
    pub status: Option<String>,
    pub code: Option<u16>,
}
