mod cli;
mod config;
mod render;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::Parser;
use progress_core::{AnalysisRequest, EntityId, JobId, Notice};
use progress_engine::{ReqwestProgressClient, TrackerEvent, TrackerHandle};
use tracker_logging::{tracker_error, tracker_info, tracker_warn};

use cli::{Cli, Command, StartMode};
use config::AppConfig;

const LOG_FILENAME: &str = "tracker.log";

enum Outcome {
    Finished(Notice),
    Interrupted,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mode = match cli.command {
        Command::WriteConfig { path } => {
            let path = path.unwrap_or_else(|| PathBuf::from(config::DEFAULT_CONFIG_FILENAME));
            config::save(&path, &AppConfig::default())?;
            println!("Wrote default config to {}", path.display());
            return Ok(());
        }
        Command::Analyze {
            entity,
            company,
            website,
            industry,
            job_id,
        } => StartMode::Analyze(AnalysisRequest {
            job_id: job_id.map(JobId::new).unwrap_or_else(JobId::generate),
            entity_id: EntityId::new(entity),
            company_name: company,
            website,
            industry,
        }),
        Command::Follow { entity, job_id } => StartMode::Follow {
            job_id: JobId::new(job_id),
            entity_id: EntityId::new(entity),
        },
    };

    let (mut config, config_source) = config::load(cli.config.as_deref())?;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    tracker_logging::initialize(
        config.log_destination(cli.quiet),
        tracker_logging::level_for_verbosity(cli.verbose),
        Path::new(LOG_FILENAME),
    );
    match config_source {
        Some(path) => tracker_info!("Loaded config from {}", path.display()),
        None => tracker_info!("No {} found; using defaults", config::DEFAULT_CONFIG_FILENAME),
    }

    run(config, mode).await
}

async fn run(config: AppConfig, mode: StartMode) -> Result<()> {
    let client = ReqwestProgressClient::new(config.client_settings())
        .with_context(|| format!("invalid service base url {}", config.base_url))?;
    let mut handle = TrackerHandle::spawn(Arc::new(client), config.tracker_settings());

    let entity_id = mode.entity_id().clone();
    match mode {
        StartMode::Analyze(request) => {
            tracker_info!(
                "Submitting analysis of {} as job {}",
                request.company_name,
                request.job_id
            );
            handle.analyze(request);
        }
        StartMode::Follow { job_id, entity_id } => handle.start(job_id, entity_id),
    }

    let mut last_line: Option<String> = None;
    let outcome = loop {
        tokio::select! {
            event = handle.next_event() => match event {
                Some(TrackerEvent::ViewChanged(view)) => {
                    if let Some(line) = render::progress_line(&view, &entity_id) {
                        if last_line.as_deref() != Some(line.as_str()) {
                            println!("{} {}", timestamp(), line);
                            last_line = Some(line);
                        }
                    }
                }
                Some(TrackerEvent::Notice(notice)) => break Outcome::Finished(notice),
                None => {
                    tracker_error!("Tracker event channel closed before a notice");
                    bail!("tracker stopped unexpectedly")
                }
            },
            _ = tokio::signal::ctrl_c() => break Outcome::Interrupted,
        }
    };
    handle.dispose().await;

    match outcome {
        Outcome::Finished(notice) => {
            println!("{} {}", timestamp(), render::notice_line(&notice));
            if let Notice::Failed { reason, job_id, .. } = notice {
                tracker_error!("Job {} failed: {}", job_id, reason);
                bail!("analysis failed: {reason}");
            }
            Ok(())
        }
        Outcome::Interrupted => {
            tracker_warn!("Interrupted; analysis may still be running remotely");
            bail!("interrupted")
        }
    }
}

fn timestamp() -> String {
    Local::now().format("%H:%M:%S").to_string()
}
