use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use babyface::{
    job::JobManifest,
    logger::{self, LogLevel, LoggerConfig},
    GeminiClient, GeminiConfig, ImagePayload,
};

const USAGE: &str = "usage: babyface <job.json>";

#[tokio::main]
async fn main() -> ExitCode {
    let dotenv_loaded = dotenv::dotenv().is_ok();

    let level = env::var("BABYFACE_LOG")
        .ok()
        .and_then(|name| LogLevel::parse(&name))
        .unwrap_or(LogLevel::Info);
    if let Err(e) = logger::init_with_config(LoggerConfig::default().with_level(level)) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }
    if dotenv_loaded {
        log::debug!("✅ .env file loaded");
    } else {
        log::debug!("No .env file found, using system environment variables");
    }

    let Some(job_path) = env::args().nth(1).map(PathBuf::from) else {
        log::error!("{}", USAGE);
        return ExitCode::from(2);
    };

    let mut published = 0usize;
    match run(&job_path, &mut published).await {
        Ok(count) => {
            log::info!("🎉 Generated {} image(s)", count);
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{}", e);
            log::error!("{} image(s) were published before the failure", published);
            ExitCode::FAILURE
        }
    }
}

async fn run(job_path: &Path, published: &mut usize) -> babyface::Result<usize> {
    let manifest = JobManifest::load(job_path).await?;
    let output_dir = manifest.output_dir.clone();
    let session = manifest.into_session().await?;
    let run = session.to_run()?;

    let client = GeminiClient::new(GeminiConfig::from_env())?;
    log::info!("🔄 Generating {} age(s)...", run.mode.batches().len());

    let mut latest: Vec<ImagePayload> = Vec::new();
    let outcome = client
        .orchestrator()
        .run(&run, |images| {
            log::info!("🖼️  {} image(s) ready", images.len());
            *published = images.len();
            latest = images.to_vec();
        })
        .await;

    // Whatever was published before a failure is still written out.
    let saved = match &output_dir {
        Some(dir) => save_images(dir, &latest).await,
        None => Ok(()),
    };

    settle(outcome, saved)
}

/// The run's own error wins over a failure to write its partial output.
fn settle(
    outcome: babyface::Result<Vec<ImagePayload>>,
    saved: babyface::Result<()>,
) -> babyface::Result<usize> {
    match (outcome, saved) {
        (Ok(images), Ok(())) => Ok(images.len()),
        (Ok(_), Err(e)) | (Err(e), Ok(())) => Err(e),
        (Err(e), Err(save_error)) => {
            log::error!(
                "Could not save the images published before the failure: {}",
                save_error
            );
            Err(e)
        }
    }
}

async fn save_images(dir: &Path, images: &[ImagePayload]) -> babyface::Result<()> {
    if images.is_empty() {
        return Ok(());
    }
    tokio::fs::create_dir_all(dir).await?;
    for (index, image) in images.iter().enumerate() {
        let path = dir.join(format!("child_{}.{}", index + 1, image.extension()));
        tokio::fs::write(&path, &image.data).await?;
        log::info!("💾 Saved {}", path.display());
    }
    Ok(())
}
