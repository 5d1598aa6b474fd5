//! Binary entry point for the study question generator.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;
use subquiz_core::questions::openai::{OpenAiChat, OpenAiSettings};
use subquiz_core::questions::{self, QuestionCounts};
use subquiz_core::transcript;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Command line options for the binary.
#[derive(Parser)]
#[command(name = "subquiz", about = "Generate study questions from video subtitles.")]
struct Cli {
    /// Enable verbose debug and trace logs.
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the compacted transcript of a subtitle file.
    Transcript {
        /// Path to the SRT file.
        input: PathBuf,

        /// Print the segments as JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Print the full prompt that would be sent to the model.
    Prompt {
        /// Path to the SRT file.
        input: PathBuf,

        #[command(flatten)]
        counts: CountArgs,
    },
    /// Generate the student version of the questions.
    Questions {
        /// Path to the SRT file.
        input: PathBuf,

        #[command(flatten)]
        counts: CountArgs,

        #[command(flatten)]
        model: ModelArgs,
    },
    /// Add answers to a previously generated list of questions.
    Answers {
        /// Path to the SRT file the questions were generated from.
        input: PathBuf,

        /// File holding the student version of the questions.
        #[arg(long)]
        questions: PathBuf,

        #[command(flatten)]
        model: ModelArgs,
    },
}

/// Number of questions per category.
#[derive(Args)]
struct CountArgs {
    /// Multiple-choice questions.
    #[arg(long, default_value_t = 5)]
    mcq: u32,

    /// Short-answer questions.
    #[arg(long, default_value_t = 3)]
    short: u32,

    /// Discussion questions.
    #[arg(long, default_value_t = 1)]
    discussion: u32,
}

impl From<&CountArgs> for QuestionCounts {
    fn from(args: &CountArgs) -> Self {
        QuestionCounts::new(args.mcq, args.short, args.discussion)
    }
}

/// Overrides for the model settings read from the environment.
#[derive(Args)]
struct ModelArgs {
    /// Chat completion endpoint (defaults to OPENAI_API_ENDPOINT).
    #[arg(long)]
    endpoint: Option<String>,

    /// Model name (defaults to OPENAI_MODEL).
    #[arg(long)]
    model: Option<String>,

    /// Request timeout in seconds (defaults to OPENAI_TIMEOUT_SECS or 180).
    #[arg(long)]
    timeout_secs: Option<u64>,
}

impl ModelArgs {
    fn build(&self) -> Result<OpenAiChat> {
        let mut settings = OpenAiSettings::from_env()?;
        if let Some(endpoint) = &self.endpoint {
            settings.endpoint = endpoint.clone();
        }
        if let Some(model) = &self.model {
            settings.model = model.clone();
        }
        if let Some(secs) = self.timeout_secs {
            settings.timeout = Duration::from_secs(secs);
        }
        OpenAiChat::new(settings)
    }
}

fn read_subtitles(path: &Path) -> Result<String> {
    questions::load_subtitles(path).with_context(|| format!("reading {}", path.display()))
}

/// Application entry point which parses CLI args and performs actions.
/// Logs go to stderr so stdout only carries the requested text.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let filter = if cli.debug {
        EnvFilter::default()
            .add_directive("subquiz=trace".parse()?)
            .add_directive("subquiz_core=trace".parse()?)
            .add_directive("info".parse()?)
    } else {
        EnvFilter::default()
            .add_directive("subquiz=info".parse()?)
            .add_directive("subquiz_core=info".parse()?)
            .add_directive("warn".parse()?)
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Transcript { input, json } => {
            let raw = read_subtitles(&input)?;
            if json {
                let entries = transcript::compact_entries(&raw);
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                println!("{}", transcript::try_compact_transcript(&raw)?);
            }
        }
        Command::Prompt { input, counts } => {
            let raw = read_subtitles(&input)?;
            println!("{}", questions::preview_prompt(&raw, &(&counts).into())?);
        }
        Command::Questions {
            input,
            counts,
            model,
        } => {
            let raw = read_subtitles(&input)?;
            let chat = model.build()?;
            let text = questions::generate_questions(&chat, &raw, &(&counts).into()).await?;
            println!("{text}");
        }
        Command::Answers {
            input,
            questions: questions_path,
            model,
        } => {
            let raw = read_subtitles(&input)?;
            let student = std::fs::read_to_string(&questions_path)
                .with_context(|| format!("reading {}", questions_path.display()))?;
            let chat = model.build()?;
            info!("adding answers to {}", questions_path.display());
            let text = questions::generate_answers(&chat, &raw, &student).await?;
            println!("{text}");
        }
    }
    Ok(())
}
