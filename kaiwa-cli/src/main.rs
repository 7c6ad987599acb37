// Kaiwa Command Line Interface
// Suggestion extraction, voice assignment and dialog playback from the terminal

mod config;
mod console;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use config::AppConfig;
use console::ConsoleEngine;
use kaiwa_core::{BookmarkDraft, DialogTurn, Role};
use kaiwa_llm::{require_api_key, ResponseAccumulator, SuggestionPrompt};
use kaiwa_spk::{
    track_assignments, PlaybackEvent, PlaybackRate, PlaybackScheduler, SpeechSlot,
    VoiceAssignment, VoiceCatalogue, VoiceHandle, VoiceResolver,
};
use serde::de::DeserializeOwned;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "kaiwa")]
#[command(about = "Kaiwa - English conversation practice for Japanese speakers", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract suggestions from a model response
    Extract {
        /// File holding the response text (stdin when omitted)
        #[arg(long, short)]
        file: Option<PathBuf>,

        /// Print the bookmark draft for the suggestion with this index
        #[arg(long)]
        bookmark: Option<usize>,
    },

    /// Resolve role voices from a JSON voice list
    Voices {
        /// JSON array of voices
        #[arg(long)]
        catalogue: PathBuf,
    },

    /// Play a dialog through the console engine
    Play {
        /// JSON array of dialog turns
        #[arg(long)]
        dialog: PathBuf,

        /// Playback rate (0.5, 0.75 or 1.0)
        #[arg(long, value_parser = parse_rate)]
        rate: Option<PlaybackRate>,

        /// JSON array of voices offered to the engine
        #[arg(long)]
        catalogue: Option<PathBuf>,
    },

    /// Speak one sentence with the default voice
    Say {
        text: String,
    },

    /// Show the suggestion prompt for a learning request
    Prompt {
        input: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level);

    let config = AppConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Extract { file, bookmark } => {
            extract_suggestions(file.as_deref(), bookmark)?;
        }
        Commands::Voices { catalogue } => {
            show_voices(&config, &catalogue)?;
        }
        Commands::Play {
            dialog,
            rate,
            catalogue,
        } => {
            play_dialog(&config, &dialog, rate, catalogue.as_deref()).await?;
        }
        Commands::Say { text } => {
            say(&config, &text).await?;
        }
        Commands::Prompt { input } => {
            show_prompt(&config, &input)?;
        }
    }

    Ok(())
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn parse_rate(value: &str) -> Result<PlaybackRate, String> {
    value.parse::<PlaybackRate>().map_err(|e| e.to_string())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
}

fn extract_suggestions(file: Option<&Path>, bookmark: Option<usize>) -> Result<()> {
    let reader: Box<dyn Read> = match file {
        Some(path) => Box::new(
            std::fs::File::open(path)
                .with_context(|| format!("Failed to open {}", path.display()))?,
        ),
        None => Box::new(io::stdin()),
    };

    // Feed the response in line-sized deltas, as a stream would arrive
    let mut accumulator = ResponseAccumulator::new();
    for line in BufReader::new(reader).lines() {
        accumulator.push(&line?);
        accumulator.push("\n");
    }
    debug!("Read {} chunks", accumulator.chunk_count());

    let suggestions = accumulator.finish();
    info!("Extracted {} suggestions", suggestions.len());

    match bookmark {
        Some(index) => {
            let suggestion = suggestions
                .iter()
                .find(|s| s.index == index)
                .ok_or_else(|| anyhow!("No suggestion with index {}", index))?;
            let draft = BookmarkDraft::from(suggestion);
            draft.validate()?;
            println!("{}", serde_json::to_string_pretty(&draft)?);
        }
        None => {
            println!("{}", serde_json::to_string_pretty(&suggestions)?);
        }
    }

    Ok(())
}

fn show_voices(config: &AppConfig, catalogue: &Path) -> Result<()> {
    let voices: Vec<VoiceHandle> = read_json(catalogue)?;
    let assignment = VoiceResolver::from_config(&config.speech).resolve(&voices);
    print_assignment(&assignment);
    println!("{}", serde_json::to_string_pretty(&assignment)?);
    Ok(())
}

fn print_assignment(assignment: &VoiceAssignment) {
    for role in Role::ALL {
        match assignment.voice_for(role) {
            Some(voice) => println!("{}: {} ({})", role, voice.name, voice.lang),
            None => println!("{}: runtime default voice", role),
        }
    }
}

fn show_prompt(config: &AppConfig, input: &str) -> Result<()> {
    let prompt = SuggestionPrompt::build(input, &config.suggestions)?;

    if let Err(e) = require_api_key(&config.suggestions) {
        warn!("{}", e);
    }

    println!("{}", SuggestionPrompt::greeting());
    println!("{}", serde_json::to_string_pretty(&prompt)?);
    Ok(())
}

/// Engine, catalogue and scheduler for one playback command
struct PlaybackSession {
    // Keeps assignment tracking alive
    _catalogue: VoiceCatalogue,
    assignments: watch::Receiver<VoiceAssignment>,
    scheduler: PlaybackScheduler,
    events: broadcast::Receiver<PlaybackEvent>,
}

impl PlaybackSession {
    fn start(config: &AppConfig, voices: Vec<VoiceHandle>) -> Result<Self> {
        let engine = Arc::new(ConsoleEngine::new(Handle::current(), voices));

        let catalogue = VoiceCatalogue::new();
        catalogue.refresh_from(engine.as_ref());
        let assignments = track_assignments(
            catalogue.subscribe(),
            VoiceResolver::from_config(&config.speech),
        );

        let slot = SpeechSlot::detect(engine);
        let scheduler = PlaybackScheduler::new(slot, config.speech.clone())?;
        let events = scheduler.subscribe();

        Ok(Self {
            _catalogue: catalogue,
            assignments,
            scheduler,
            events,
        })
    }

    /// Wait until playback stops; Ctrl-C stops it early
    async fn run_to_end(&mut self) -> Result<()> {
        if self.scheduler.status().is_at_rest() {
            return Ok(());
        }

        let mut tracking = true;
        loop {
            tokio::select! {
                event = self.events.recv() => match event {
                    Ok(PlaybackEvent::Stopped { reason }) => {
                        println!("⏹  Playback stopped ({:?})", reason);
                        return Ok(());
                    }
                    Ok(PlaybackEvent::TurnStarted { index }) => {
                        debug!("Turn {} started", index);
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        warn!("Missed {} playback events", missed);
                    }
                    Err(broadcast::error::RecvError::Closed) => return Ok(()),
                },
                changed = self.assignments.changed(), if tracking => {
                    if changed.is_err() {
                        tracking = false;
                        continue;
                    }
                    let assignment = self.assignments.borrow_and_update().clone();
                    self.scheduler.set_voice_assignment(assignment);
                }
                signal = tokio::signal::ctrl_c() => {
                    signal?;
                    info!("Interrupted, stopping playback");
                    self.scheduler.stop();
                }
            }
        }
    }
}

async fn play_dialog(
    config: &AppConfig,
    dialog: &Path,
    rate: Option<PlaybackRate>,
    catalogue: Option<&Path>,
) -> Result<()> {
    let turns: Vec<DialogTurn> = read_json(dialog)?;
    if turns.is_empty() {
        info!("Dialog {} has no turns, nothing to play", dialog.display());
        println!("Nothing to play");
        return Ok(());
    }

    let voices: Vec<VoiceHandle> = match catalogue {
        Some(path) => read_json(path)?,
        None => Vec::new(),
    };

    let mut session = PlaybackSession::start(config, voices)?;
    let assignment = session.assignments.borrow_and_update().clone();
    print_assignment(&assignment);

    let rate = rate.unwrap_or_else(|| session.scheduler.rate());
    println!("▶  Playing {} turns at {}", turns.len(), rate);
    session.scheduler.play_all(turns, assignment, rate)?;
    session.run_to_end().await
}

async fn say(config: &AppConfig, text: &str) -> Result<()> {
    let mut session = PlaybackSession::start(config, Vec::new())?;
    session.scheduler.play_single(text)?;
    session.run_to_end().await
}
