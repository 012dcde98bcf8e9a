use std::path::PathBuf;

use anyhow::{ensure, Result};
use clap::{Args, Parser, Subcommand};
use uuid::Uuid;

use crate::catalog::{Category, Difficulty};

#[derive(Parser, Debug)]
#[command(
    name = "pronunciation-trainer",
    version,
    about = "Grade pronunciation attempts against reference text and track progress"
)]
pub struct Cli {
    /// Recording metadata store (JSON file); overrides PRONUNCIATION_STORE.
    #[arg(long, global = true, value_name = "PATH")]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Score a transcript against its reference text.
    Grade(GradeArgs),
    /// Word-by-word phonetic notation for a piece of text.
    Ipa {
        #[arg(value_name = "TEXT")]
        text: String,
    },
    /// Grade an audio recording whose transcript is already known.
    Analyze(AnalyzeArgs),
    /// Inspect and manage saved recording metadata.
    #[command(subcommand)]
    Recordings(RecordingsCommand),
    /// Aggregate statistics, overall or for one user.
    Stats {
        #[arg(long, value_name = "USER")]
        user: Option<String>,
    },
    /// Practice phrases, optionally filtered.
    Phrases {
        #[arg(long)]
        difficulty: Option<Difficulty>,
        #[arg(long)]
        category: Option<Category>,
    },
    /// Available text-to-speech voices.
    Voices,
}

#[derive(Args, Debug, Clone)]
pub struct GradeArgs {
    /// Text the learner was asked to read.
    #[arg(long)]
    pub reference: String,
    /// Text recognized from the learner's speech.
    #[arg(long)]
    pub transcribed: String,
}

#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    /// Recorded attempt (WAV, MP3, FLAC, OGG, ...).
    #[arg(long, value_name = "PATH")]
    pub audio: PathBuf,
    #[arg(long)]
    pub reference: String,
    /// Transcript of the recording produced by an external recognizer.
    #[arg(long)]
    pub transcript: String,
    #[arg(long)]
    pub user: Option<String>,
    /// Skip saving metadata to the store.
    #[arg(long = "no-save")]
    pub no_save: bool,
    /// Delete the audio file after grading.
    #[arg(long = "remove-audio")]
    pub remove_audio: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum RecordingsCommand {
    /// Newest recordings first.
    List {
        #[arg(long)]
        user: Option<String>,
        #[arg(long)]
        limit: Option<usize>,
    },
    Get {
        id: Uuid,
    },
    /// Apply a partial JSON update, e.g. '{"score": 80}'.
    Update {
        id: Uuid,
        #[arg(long, value_name = "JSON")]
        json: String,
    },
    Delete {
        id: Uuid,
    },
    /// Case-insensitive text search.
    Search {
        query: String,
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },
    /// Recordings with scores inside an inclusive range.
    ScoreRange {
        #[arg(long, default_value_t = 0)]
        min: u8,
        #[arg(long, default_value_t = 100)]
        max: u8,
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },
}

impl RecordingsCommand {
    pub fn validate(&self) -> Result<()> {
        if let RecordingsCommand::ScoreRange { min, max, .. } = self {
            ensure!(*max <= 100, "max score must be at most 100");
            ensure!(min <= max, "min score must not exceed max score");
        }
        Ok(())
    }
}

/// Default listing size: everyone's recordings, or a single user's.
pub fn list_limit(user: Option<&str>, limit: Option<usize>) -> usize {
    limit.unwrap_or(if user.is_some() { 50 } else { 100 })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_grade_arguments() {
        let cli = Cli::try_parse_from([
            "pronunciation-trainer",
            "grade",
            "--reference",
            "The cat sat",
            "--transcribed",
            "The dog sat",
        ])
        .unwrap();
        let Command::Grade(args) = cli.command else {
            panic!("expected grade command");
        };
        assert_eq!(args.reference, "The cat sat");
        assert!(cli.store.is_none());
    }

    #[test]
    fn store_flag_is_global() {
        let cli = Cli::try_parse_from([
            "pronunciation-trainer",
            "recordings",
            "list",
            "--store",
            "/tmp/r.json",
        ])
        .unwrap();
        assert_eq!(cli.store, Some(PathBuf::from("/tmp/r.json")));
    }

    #[test]
    fn score_range_defaults_and_validation() {
        let cli =
            Cli::try_parse_from(["pronunciation-trainer", "recordings", "score-range"]).unwrap();
        let Command::Recordings(cmd) = cli.command else {
            panic!("expected recordings command");
        };
        assert!(cmd.validate().is_ok());

        let bad = RecordingsCommand::ScoreRange {
            min: 80,
            max: 20,
            limit: 5,
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn rejects_malformed_ids_and_filters() {
        assert!(Cli::try_parse_from(["pronunciation-trainer", "recordings", "get", "nope"]).is_err());
        assert!(
            Cli::try_parse_from(["pronunciation-trainer", "phrases", "--difficulty", "expert"])
                .is_err()
        );
    }

    #[test]
    fn list_limit_depends_on_user_filter() {
        assert_eq!(list_limit(None, None), 100);
        assert_eq!(list_limit(Some("ann"), None), 50);
        assert_eq!(list_limit(Some("ann"), Some(3)), 3);
    }
}
