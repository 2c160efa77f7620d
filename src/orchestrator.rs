//! Drives the image client across the ages of a run and publishes results
//! as they accumulate.

use std::pin::Pin;

use futures::stream::Stream;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use uuid::Uuid;

use crate::{
    error::{BabyFaceError, Result},
    gemini::ImageClient,
    logger,
    models::{GenerationMode, GenerationRun, ImagePayload},
};

pub const MISSING_REQUIRED_PHOTOS: &str =
    "Please upload at least one photo for each required category.";
pub const MISSING_AGE_SELECTION: &str = "Please select at least one age for age progression.";

/// Progress of a run observed through [`Orchestrator::run_stream`].
#[derive(Debug)]
pub enum RunEvent {
    /// Everything generated so far, in call order.
    Published(Vec<ImagePayload>),
    Finished(Vec<ImagePayload>),
    /// Images published before the failure stay valid.
    Failed(BabyFaceError),
}

#[derive(Clone)]
pub struct Orchestrator {
    client: ImageClient,
}

impl Orchestrator {
    pub fn new(client: ImageClient) -> Self {
        Self { client }
    }

    /// Checks the run can start. No call is issued for a run that fails this.
    pub fn validate(run: &GenerationRun) -> Result<()> {
        if let GenerationMode::AgeProgression { ages, .. } = &run.mode {
            if ages.is_empty() {
                return Err(BabyFaceError::input(MISSING_AGE_SELECTION));
            }
        }
        if !run.subjects.is_complete() {
            return Err(BabyFaceError::input(MISSING_REQUIRED_PHOTOS));
        }
        Ok(())
    }

    /// Runs every batch in order. `on_progress` receives the complete result
    /// of a fixed-age run, or the accumulated images after each age of a
    /// progression. The first failing call ends the run.
    pub async fn run<F>(&self, run: &GenerationRun, mut on_progress: F) -> Result<Vec<ImagePayload>>
    where
        F: FnMut(&[ImagePayload]),
    {
        Self::validate(run)?;

        let run_id = Uuid::new_v4();
        let _timer = logger::timer(&format!("generation run {}", run_id));
        let batches = run.mode.batches();
        let total = batches.len();
        log::info!(
            "Run {}: {} age(s), {} photo(s), {} blend",
            run_id,
            total,
            run.subjects.image_count(),
            if run.profile.blend.is_detailed() { "detailed" } else { "simple" }
        );

        let mut accumulated: Vec<ImagePayload> = Vec::new();
        for (position, (age, count)) in batches.into_iter().enumerate() {
            let request = run.request_for(age, count);
            let batch = self.client.generate(&request).await.map_err(|e| {
                log::error!(
                    "Run {} stopped at age '{}' ({}/{}): {}",
                    run_id,
                    request.age,
                    position + 1,
                    total,
                    e
                );
                e
            })?;

            accumulated.extend(batch);
            log::info!(
                "Run {}: age '{}' done, {} image(s) so far",
                run_id,
                request.age,
                accumulated.len()
            );
            on_progress(&accumulated);
        }

        Ok(accumulated)
    }

    /// Spawns the run and reports its progress as a stream of [`RunEvent`]s.
    /// Dropping the stream does not cancel calls already in flight.
    pub fn run_stream(&self, run: GenerationRun) -> Pin<Box<dyn Stream<Item = RunEvent> + Send>> {
        let (tx, rx) = mpsc::unbounded_channel();
        let orchestrator = self.clone();

        tokio::spawn(async move {
            let progress = tx.clone();
            let outcome = orchestrator
                .run(&run, move |images| {
                    let _ = progress.send(RunEvent::Published(images.to_vec()));
                })
                .await;

            let event = match outcome {
                Ok(images) => RunEvent::Finished(images),
                Err(e) => RunEvent::Failed(e),
            };
            if tx.send(event).is_err() {
                log::debug!("Run finished after its observer went away");
            }
        });

        Box::pin(UnboundedReceiverStream::new(rx))
    }
}
