use std::path::PathBuf;

use clap::{Parser, Subcommand};
use progress_core::{AnalysisRequest, EntityId, JobId};

#[derive(Debug, Parser)]
#[command(name = "tracker_app")]
#[command(version)]
#[command(about = "Follow a remote company analysis and render its progress", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log to tracker.log only; the terminal shows just progress lines
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file (RON). Defaults to ./tracker.ron when present.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the service base URL from the config file
    #[arg(long, global = true)]
    pub base_url: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Submit a new analysis for a company and follow it to the end
    Analyze {
        /// Company record id
        #[arg(long)]
        entity: String,

        #[arg(long)]
        company: String,

        #[arg(long)]
        website: Option<String>,

        #[arg(long)]
        industry: Option<String>,

        /// Job id to submit with; a random one is generated otherwise
        #[arg(long)]
        job_id: Option<String>,
    },
    /// Follow a job that was already started elsewhere
    Follow {
        #[arg(long)]
        entity: String,

        #[arg(long)]
        job_id: String,
    },
    /// Write the default configuration to PATH (default ./tracker.ron)
    WriteConfig { path: Option<PathBuf> },
}

/// How the tracker should pick up the job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartMode {
    Analyze(AnalysisRequest),
    Follow { job_id: JobId, entity_id: EntityId },
}

impl StartMode {
    pub fn entity_id(&self) -> &EntityId {
        match self {
            StartMode::Analyze(request) => &request.entity_id,
            StartMode::Follow { entity_id, .. } => entity_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_analyze_with_global_flags() {
        let cli = Cli::try_parse_from([
            "tracker_app",
            "-vv",
            "--base-url",
            "http://api.local",
            "analyze",
            "--entity",
            "17",
            "--company",
            "Acme",
            "--website",
            "https://acme.example",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        assert!(!cli.quiet);
        assert_eq!(cli.base_url.as_deref(), Some("http://api.local"));
        match cli.command {
            Command::Analyze {
                entity,
                company,
                website,
                industry,
                job_id,
            } => {
                assert_eq!(entity, "17");
                assert_eq!(company, "Acme");
                assert_eq!(website.as_deref(), Some("https://acme.example"));
                assert!(industry.is_none());
                assert!(job_id.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn follow_requires_job_id() {
        assert!(Cli::try_parse_from(["tracker_app", "follow", "--entity", "1"]).is_err());
        let args = ["tracker_app", "follow", "--entity", "1", "--job-id", "j"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(matches!(cli.command, Command::Follow { .. }));
    }

    #[test]
    fn quiet_is_accepted_after_the_subcommand() {
        let cli = Cli::try_parse_from([
            "tracker_app",
            "follow",
            "--entity",
            "1",
            "--job-id",
            "j",
            "-q",
        ])
        .unwrap();
        assert!(cli.quiet);
    }
}
