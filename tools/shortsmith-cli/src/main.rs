//! Shortsmith CLI — assemble narrated vertical gaming shorts.
//!
//! Usage:
//!   shortsmith create <GAME> --images DIR --video FILE   Build a video
//!   shortsmith script <GAME>                             Preview a generated script
//!   shortsmith layout                                    Print the band layout
//!   shortsmith captions --duration SECS                  Export SRT/VTT captions
//!   shortsmith caption-video FILE --script TEXT          Burn captions into a video
//!   shortsmith check                                     Check external tools
//!   shortsmith config                                    Show the effective config

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use shortsmith_common::config::{AppConfig, LoggingConfig};
use shortsmith_project_model::layout::VideoMode;

mod commands;

#[derive(Parser)]
#[command(
    name = "shortsmith",
    about = "Assemble narrated 9:16 gaming shorts from screenshots and gameplay",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a video for a game
    Create {
        /// Game name
        game: String,

        /// Directory of screenshots for the slideshow band
        #[arg(long)]
        images: PathBuf,

        /// Gameplay clip for the video band
        #[arg(long)]
        video: PathBuf,

        /// Store page URL, kept in the run record
        #[arg(long)]
        steam_url: Option<String>,

        /// Comma-separated features to mention
        #[arg(long, default_value = "")]
        features: String,

        /// Narration text to use verbatim
        #[arg(long, conflicts_with = "script_file")]
        script: Option<String>,

        /// File holding the narration text
        #[arg(long)]
        script_file: Option<PathBuf>,

        /// Layout mode: standard|4x|beautiful_captions
        #[arg(long, default_value = "standard")]
        mode: VideoMode,

        /// Gameplay start offset (seconds)
        #[arg(long)]
        start: Option<f64>,

        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Generate the longer context-length script
        #[arg(long)]
        context: bool,

        /// Use a silent track sized from the speaking-rate estimate
        #[arg(long)]
        silent_narration: bool,

        /// Write the timeline as JSON instead of encoding a video
        #[arg(long)]
        dry_run: bool,

        /// Also write an SRT next to the video
        #[arg(long)]
        subtitles: bool,
    },

    /// Preview the generated script for a game
    Script {
        /// Game name
        game: String,

        /// Comma-separated features to mention
        #[arg(long, default_value = "")]
        features: String,

        /// Generate the longer context-length script
        #[arg(long)]
        context: bool,

        /// Layout mode (selects the template family)
        #[arg(long, default_value = "standard")]
        mode: VideoMode,
    },

    /// Print the canvas bands for a mode
    Layout {
        /// Layout mode: standard|4x|beautiful_captions
        #[arg(long, default_value = "standard")]
        mode: VideoMode,

        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compute word timings for a script and export them as subtitles
    Captions {
        /// Narration text
        #[arg(long, conflicts_with = "script_file", required_unless_present = "script_file")]
        script: Option<String>,

        /// File holding the narration text
        #[arg(long)]
        script_file: Option<PathBuf>,

        /// Narration duration (seconds)
        #[arg(long)]
        duration: f64,

        /// Output file (.srt or .vtt); stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// One cue per on-screen phrase instead of per word
        #[arg(long)]
        phrases: bool,
    },

    /// Burn word-highlight captions into an existing video
    CaptionVideo {
        /// Video to caption
        video: PathBuf,

        /// Narration text spoken in the video
        #[arg(long, conflicts_with = "script_file", required_unless_present = "script_file")]
        script: Option<String>,

        /// File holding the narration text
        #[arg(long)]
        script_file: Option<PathBuf>,

        /// Output file (default: <name>_with_captions next to the video)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check external tools
    Check,

    /// Show the effective configuration
    Config {
        /// Write it to the config file
        #[arg(long)]
        write: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load();

    let level = if cli.verbose {
        "debug".to_string()
    } else {
        config.logging.level.clone()
    };
    shortsmith_common::logging::init_logging(&LoggingConfig {
        level,
        ..config.logging.clone()
    });

    match cli.command {
        Commands::Create {
            game,
            images,
            video,
            steam_url,
            features,
            script,
            script_file,
            mode,
            start,
            output,
            context,
            silent_narration,
            dry_run,
            subtitles,
        } => {
            commands::create::run(
                config,
                commands::create::CreateArgs {
                    game,
                    images,
                    video,
                    steam_url,
                    features,
                    script,
                    script_file,
                    mode,
                    start,
                    output,
                    context,
                    silent_narration,
                    dry_run,
                    subtitles,
                },
            )
            .await
        }
        Commands::Script {
            game,
            features,
            context,
            mode,
        } => commands::script::run(&config, &game, &features, context, mode),
        Commands::Layout { mode, json } => commands::layout::run(&config, mode, json),
        Commands::Captions {
            script,
            script_file,
            duration,
            output,
            phrases,
        } => commands::captions::run(&config, script, script_file, duration, output, phrases),
        Commands::CaptionVideo {
            video,
            script,
            script_file,
            output,
        } => commands::caption_video::run(config, video, script, script_file, output).await,
        Commands::Check => commands::check::run(&config),
        Commands::Config { write } => commands::config::run(&config, write),
    }
}
