pub mod image_client;
pub mod transport;

use std::sync::Arc;

use crate::{config::GeminiConfig, error::Result, orchestrator::Orchestrator};

pub use image_client::ImageClient;
pub use transport::{ContentTransport, HttpTransport, RawResponse};

/// Entry point wiring the HTTP transport, the image client and the orchestrator.
#[derive(Clone)]
pub struct GeminiClient {
    image_client: ImageClient,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self> {
        config.validate()?;
        let transport = HttpTransport::new(&config)?;
        log::info!("Gemini client ready for {}", transport.endpoint());

        Ok(Self::with_transport(Arc::new(transport), &config))
    }

    /// Uses a caller-provided transport, e.g. a proxy or a scripted test double.
    pub fn with_transport(transport: Arc<dyn ContentTransport>, config: &GeminiConfig) -> Self {
        Self {
            image_client: ImageClient::new(transport).with_inter_call_delay(config.inter_call_delay),
        }
    }

    pub fn image(&self) -> &ImageClient {
        &self.image_client
    }

    pub fn orchestrator(&self) -> Orchestrator {
        Orchestrator::new(self.image_client.clone())
    }
}
