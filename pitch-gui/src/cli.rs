use anyhow::Context;
use clap::{Parser, Subcommand};
use pitch_core::config::Config;
use pitch_core::decode::decode_audio;
use pitch_core::offline::analyze_recording;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "pitch-gui", about = "Microphone pitch monitor with offline note detection")]
pub struct Cli {
    /// Config file (default: ./pitchscope.toml, then the user config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Detect the notes in an audio file (WAV, MP3, FLAC, OGG) and exit
    Analyze {
        /// Input audio file
        input: PathBuf,

        /// Print the records as JSON
        #[arg(long)]
        json: bool,

        /// Step through the clip in real time
        #[arg(long)]
        paced: bool,
    },
}

/// Runs the `analyze` subcommand.
pub fn run_analyze(
    input: &Path,
    mut config: Config,
    json: bool,
    paced: bool,
) -> anyhow::Result<()> {
    config.offline.paced |= paced;

    let recording = decode_audio(input)?;
    let notes = analyze_recording(&recording, &config.offline, config.detection);
    log::info!(target: "main", "Analysed {} steps of {}", notes.len(), input.display());

    if json {
        let out = serde_json::to_string_pretty(&notes)
            .context("Failed to serialize detected notes")?;
        println!("{out}");
    } else {
        for note in &notes {
            println!("{note}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_launches_ui() {
        let cli = Cli::try_parse_from(["pitch-gui"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn analyze_takes_flags_and_global_config() {
        let cli = Cli::try_parse_from([
            "pitch-gui", "analyze", "clip.wav", "--json", "--config", "custom.toml",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        match cli.command {
            Some(Command::Analyze { input, json, paced }) => {
                assert_eq!(input, PathBuf::from("clip.wav"));
                assert!(json);
                assert!(!paced);
            }
            None => panic!("expected analyze subcommand"),
        }
    }

    #[test]
    fn analyze_requires_input() {
        assert!(Cli::try_parse_from(["pitch-gui", "analyze"]).is_err());
    }

    #[test]
    fn analyze_reports_missing_file() {
        let missing = std::env::temp_dir().join("pitchscope-missing-input.wav");
        assert!(run_analyze(&missing, Config::default(), false, false).is_err());
    }
}
