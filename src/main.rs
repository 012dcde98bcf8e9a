use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use pronunciation_trainer::catalog::phrases;
use pronunciation_trainer::cli::{list_limit, AnalyzeArgs, Cli, Command, RecordingsCommand};
use pronunciation_trainer::config::AppConfig;
use pronunciation_trainer::recordings::{
    statistics, user_statistics, JsonFileStore, MemoryStore, RecordingStore, RecordingUpdate,
};
use pronunciation_trainer::service::{AnalyzeRequest, PronunciationService};
use pronunciation_trainer::speech::{NoSynthesis, ProvidedTranscript, VOICES};

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = AppConfig::from_env(cli.store.clone()).context("Failed to load configuration")?;

    match cli.command {
        Command::Grade(args) => {
            let service = offline_service(&config, "", MemoryStore::new());
            print_json(&service.grade(&args.reference, &args.transcribed)?)
        }
        Command::Ipa { text } => {
            let service = offline_service(&config, "", MemoryStore::new());
            print_json(&service.ipa(&text))
        }
        Command::Analyze(args) => analyze(&config, &args),
        Command::Recordings(cmd) => recordings(&config, cmd),
        Command::Stats { user } => {
            let store = open_store(&config)?;
            match user {
                Some(user) => print_json(&user_statistics(&store, &user)?),
                None => print_json(&statistics(&store)?),
            }
        }
        Command::Phrases {
            difficulty,
            category,
        } => print_json(&serde_json::json!({ "phrases": phrases(difficulty, category) })),
        Command::Voices => print_json(&serde_json::json!({ "voices": VOICES })),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn analyze(config: &AppConfig, args: &AnalyzeArgs) -> Result<()> {
    let service = offline_service(config, &args.transcript, open_store(config)?);
    let request = AnalyzeRequest {
        user_id: args.user.clone(),
        save: !args.no_save,
        remove_audio: args.remove_audio,
        ..AnalyzeRequest::new(&args.audio, &args.reference)
    };
    let result = service
        .analyze(&request)
        .with_context(|| format!("Failed to analyze {:?}", args.audio))?;
    print_json(&result)
}

fn recordings(config: &AppConfig, cmd: RecordingsCommand) -> Result<()> {
    cmd.validate()?;
    let store = open_store(config)?;
    match cmd {
        RecordingsCommand::List { user, limit } => {
            let limit = list_limit(user.as_deref(), limit);
            let recordings = match user.as_deref() {
                Some(user) => store.list_by_user(user, limit)?,
                None => store.list(limit)?,
            };
            print_json(&serde_json::json!({
                "recordings": recordings,
                "count": recordings.len(),
            }))
        }
        RecordingsCommand::Get { id } => match store.get(id)? {
            Some(recording) => print_json(&recording),
            None => bail!("Recording not found: {id}"),
        },
        RecordingsCommand::Update { id, json } => {
            let update: RecordingUpdate =
                serde_json::from_str(&json).context("Failed to parse update JSON")?;
            if !store.update(id, update)? {
                bail!("Recording not found: {id}");
            }
            print_json(&serde_json::json!({ "message": "Recording updated successfully" }))
        }
        RecordingsCommand::Delete { id } => {
            if !store.delete(id)? {
                bail!("Recording not found: {id}");
            }
            print_json(&serde_json::json!({ "message": "Recording deleted successfully" }))
        }
        RecordingsCommand::Search { query, limit } => {
            let recordings = store.search(&query, limit)?;
            print_json(&serde_json::json!({
                "recordings": recordings,
                "count": recordings.len(),
                "query": query,
            }))
        }
        RecordingsCommand::ScoreRange { min, max, limit } => {
            let recordings = store.by_score_range(min, max, limit)?;
            print_json(&serde_json::json!({
                "recordings": recordings,
                "count": recordings.len(),
                "score_range": format!("{min}-{max}"),
            }))
        }
    }
}

fn open_store(config: &AppConfig) -> Result<JsonFileStore> {
    JsonFileStore::open(&config.store_path)
}

fn offline_service<R: RecordingStore>(
    config: &AppConfig,
    transcript: &str,
    store: R,
) -> PronunciationService<ProvidedTranscript, NoSynthesis, R> {
    PronunciationService::new(
        ProvidedTranscript::new(transcript),
        NoSynthesis,
        store,
        config.clone(),
    )
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("Failed to render JSON output")?;
    println!("{rendered}");
    Ok(())
}
