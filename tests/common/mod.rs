//! Shared fixtures for the run tests: a scripted transport and small runs.

use std::collections::VecDeque;
use std::num::NonZeroU32;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use babyface::{
    models::{AnnotatedImage, GenerateContentRequest},
    BlendConfiguration, ChildProfile, ContentTransport, GenerationMode, GenerationRun,
    ImageClient, ImagePayload, Orchestrator, ParentDetails, RawResponse, Result, SubjectImages,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tokio::time::Instant;

/// One request the transport received, with the (virtual) time it arrived.
#[allow(dead_code)]
pub struct RecordedCall {
    pub at: Instant,
    pub request: GenerateContentRequest,
}

/// Answers calls from a fixed script and records every request.
#[allow(dead_code)]
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<RawResponse>>,
    calls: Mutex<Vec<RecordedCall>>,
}

#[allow(dead_code)]
impl ScriptedTransport {
    pub fn new(responses: Vec<RawResponse>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().iter().map(|call| call.at).collect()
    }

    /// Every text part of the `call`-th request, in order.
    pub fn texts(&self, call: usize) -> Vec<String> {
        self.calls.lock().unwrap()[call].request.contents[0]
            .parts
            .iter()
            .filter_map(|part| part.as_text().map(String::from))
            .collect()
    }

    /// Text of the last part of every recorded request.
    pub fn instructions(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|call| {
                call.request.contents[0]
                    .parts
                    .last()
                    .and_then(|part| part.as_text())
                    .unwrap_or_default()
                    .to_string()
            })
            .collect()
    }
}

#[async_trait]
impl ContentTransport for ScriptedTransport {
    async fn generate_content(&self, request: &GenerateContentRequest) -> Result<RawResponse> {
        self.calls.lock().unwrap().push(RecordedCall {
            at: Instant::now(),
            request: request.clone(),
        });
        let next = self.responses.lock().unwrap().pop_front();
        Ok(next.expect("transport called more often than scripted"))
    }
}

#[allow(dead_code)]
pub fn image_response(bytes: &[u8]) -> RawResponse {
    RawResponse::new(
        200,
        format!(
            r#"{{"candidates":[{{"content":{{"parts":[{{"inlineData":{{"mimeType":"image/png","data":"{}"}}}}]}}}}]}}"#,
            STANDARD.encode(bytes)
        ),
    )
}

#[allow(dead_code)]
pub fn text_response(text: &str) -> RawResponse {
    RawResponse::new(
        200,
        serde_json::json!({ "candidates": [{ "content": { "parts": [{ "text": text }] } }] })
            .to_string(),
    )
}

#[allow(dead_code)]
pub fn orchestrator(transport: Arc<ScriptedTransport>) -> Orchestrator {
    Orchestrator::new(ImageClient::new(transport).with_inter_call_delay(Duration::from_secs(4)))
}

#[allow(dead_code)]
pub fn separate_subjects() -> SubjectImages {
    SubjectImages::Separate {
        father: vec![AnnotatedImage::single(
            "f1",
            ImagePayload::new("image/jpeg", vec![0xFF, 0xD8]),
            Some("30"),
        )],
        mother: vec![AnnotatedImage::single(
            "m1",
            ImagePayload::new("image/jpeg", vec![0xFF, 0xD9]),
            None,
        )],
    }
}

#[allow(dead_code)]
pub fn profile(blend: BlendConfiguration) -> ChildProfile {
    ChildProfile {
        parents: ParentDetails::default(),
        child_number: NonZeroU32::MIN,
        gender: Default::default(),
        blend,
    }
}

#[allow(dead_code)]
pub fn run(subjects: SubjectImages, mode: GenerationMode) -> GenerationRun {
    GenerationRun::new(subjects, profile(BlendConfiguration::default()), mode)
}
