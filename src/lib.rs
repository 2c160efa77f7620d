//! Predicts what two parents' child might look like by sending their photos,
//! age notes and a resemblance blend to Gemini's image model.
//!
//! The pieces, leaves first: [`models`] (blend, photos, requests, wire
//! types), [`prompt`] (instruction text), [`assembler`] (request parts),
//! [`gemini`] (rate-limited client), and [`orchestrator`] (runs across ages
//! with progressive results). [`session`] holds front-end form state and
//! builds runs from it.

pub mod assembler;
pub mod config;
pub mod error;
pub mod gemini;
pub mod job;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod prompt;
pub mod session;

pub use config::GeminiConfig;
pub use error::{BabyFaceError, Result};
pub use gemini::{ContentTransport, GeminiClient, HttpTransport, ImageClient, RawResponse};
pub use models::{
    AnnotatedImage, BlendConfiguration, ChildProfile, FacialFeature, FeatureRatio, FixedAge,
    Gender, GenerationMode, GenerationRequest, GenerationRun, ImagePayload, ParentDetails,
    SubjectImages,
};
pub use orchestrator::{Orchestrator, RunEvent};
pub use session::{AgeSelection, PhotoCollection, Session};
