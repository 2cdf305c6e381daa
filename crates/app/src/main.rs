mod logging;

use std::fmt;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Duration;
use services::demo::demo_store;
use services::{
    AdaptiveQuestionGenerator, AppServices, Clock, InMemoryIdentityProvider, Providers,
    QuizSession, SelectedFile, SimulatedNotesGenerator, SimulatedSyllabusProcessor,
    SyllabusInput,
};
use storage::repository::Storage;
use study_core::model::{Choice, ProviderConfig, ProviderConfigDraft};
use tracing::debug;

const DEFAULT_CONFIG_PATH: &str = "study-local.json";

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    InvalidSeed { raw: String },
    InvalidSetting { raw: String },
    UnknownSettingKey(String),
    ConflictingSource,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::InvalidSeed { raw } => write!(f, "invalid --seed value: {raw}"),
            ArgsError::InvalidSetting { raw } => {
                write!(f, "invalid --set value (expected key=value): {raw}")
            }
            ArgsError::UnknownSettingKey(key) => write!(f, "unknown config key: {key}"),
            ArgsError::ConflictingSource => write!(f, "use either --file or --text, not both"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [dashboard] [--config <path>] [--seed <n>]");
    eprintln!("  cargo run -p app -- quiz        [--config <path>] [--seed <n>]");
    eprintln!("  cargo run -p app -- ingest      (--file <path> | --text <syllabus>)");
    eprintln!("  cargo run -p app -- config      [--set <key>=<value>]...");
    eprintln!();
    eprintln!("Config keys:");
    eprintln!("  apiKey, authDomain, projectId, storageBucket, messagingSenderId, appId");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  STUDY_CONFIG_PATH (default {DEFAULT_CONFIG_PATH}), STUDY_LOG, STUDY_SEED");
}

#[derive(Debug)]
enum Command {
    Dashboard,
    Quiz,
    Ingest(SyllabusSource),
    Config(Vec<(String, String)>),
}

#[derive(Debug)]
enum SyllabusSource {
    File(PathBuf),
    Text(String),
}

struct Args {
    command: Command,
    config_path: PathBuf,
    seed: Option<u64>,
}

impl Args {
    fn parse(argv: Vec<String>) -> Result<Self, ArgsError> {
        let mut config_path = std::env::var("STUDY_CONFIG_PATH")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
        let mut seed = match std::env::var("STUDY_SEED") {
            Ok(raw) => Some(parse_seed(raw)?),
            Err(_) => None,
        };

        let mut iter = argv.into_iter().peekable();
        let name = match iter.peek() {
            Some(first) if !first.starts_with("--") => iter.next(),
            _ => None,
        };

        let mut file: Option<PathBuf> = None;
        let mut text: Option<String> = None;
        let mut settings = Vec::new();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--config" => config_path = PathBuf::from(require_value(&mut iter, "--config")?),
                "--seed" => seed = Some(parse_seed(require_value(&mut iter, "--seed")?)?),
                "--file" => file = Some(PathBuf::from(require_value(&mut iter, "--file")?)),
                "--text" => text = Some(require_value(&mut iter, "--text")?),
                "--set" => settings.push(parse_setting(require_value(&mut iter, "--set")?)?),
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let command = match name.as_deref() {
            None | Some("dashboard") => Command::Dashboard,
            Some("quiz") => Command::Quiz,
            Some("ingest") => match (file, text) {
                (Some(_), Some(_)) => return Err(ArgsError::ConflictingSource),
                (Some(path), None) => Command::Ingest(SyllabusSource::File(path)),
                (None, Some(text)) => Command::Ingest(SyllabusSource::Text(text)),
                (None, None) => Command::Ingest(SyllabusSource::Text(String::new())),
            },
            Some("config") => Command::Config(settings),
            Some(other) => return Err(ArgsError::UnknownCommand(other.to_string())),
        };

        Ok(Self {
            command,
            config_path,
            seed,
        })
    }
}

fn parse_seed(raw: String) -> Result<u64, ArgsError> {
    raw.trim()
        .parse()
        .map_err(|_| ArgsError::InvalidSeed { raw })
}

fn parse_setting(raw: String) -> Result<(String, String), ArgsError> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(ArgsError::InvalidSetting { raw }),
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let filter = std::env::var("STUDY_LOG").unwrap_or_else(|_| "info".into());
    logging::init_tracing(&filter);

    let raw_args = std::env::args().skip(1).collect();
    let args = Args::parse(raw_args).inspect_err(|_| print_usage())?;

    let generator = args.seed.map_or_else(
        AdaptiveQuestionGenerator::from_os_rng,
        AdaptiveQuestionGenerator::from_seed,
    );
    let providers = Providers {
        identity: Arc::new(InMemoryIdentityProvider::new()),
        syllabus: Arc::new(SimulatedSyllabusProcessor::default()),
        notes: Arc::new(SimulatedNotesGenerator::default()),
    };
    let mut app = AppServices::new(
        Storage::local_file(&args.config_path),
        providers,
        Clock::default(),
        generator,
        demo_store()?,
    )
    .await?;
    app.store_mut()
        .subscribe(|event, _| debug!(?event, "store changed"));

    match args.command {
        Command::Dashboard => {
            print_dashboard(&app);
            Ok(())
        }
        Command::Quiz => run_quiz(&mut app),
        Command::Ingest(source) => run_ingest(&mut app, source).await,
        Command::Config(settings) => run_config(&app, &args.config_path, settings).await,
    }
}

fn print_dashboard(app: &AppServices) {
    let summary = app.dashboard();
    println!("Subjects:          {}", summary.subject_count);
    println!("Overall progress:  {}%", summary.overall_progress);
    println!("Completed topics:  {}", summary.completed_topics);
    println!("Quizzes taken:     {}", summary.quizzes_taken);
    println!("Average score:     {}%", summary.average_score);
    println!("Study time:        {}h", summary.study_hours);
    println!("Streak:            {} days", summary.streak_days);
    println!();
    for subject in app.store().subjects() {
        println!(
            "[{:>3}%] {} ({}/{} topics, uploaded {})",
            subject.progress(),
            subject.name(),
            subject.completed_topics(),
            subject.total_topics(),
            subject.upload_date().format("%Y-%m-%d"),
        );
    }
    if !summary.weak_topics.is_empty() {
        println!();
        println!("Weak areas: {}", summary.weak_topics.join(", "));
    }
}

fn run_quiz(app: &mut AppServices) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = app.start_quiz()?;
    let clock = Clock::default();
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    let mut last_tick = clock.now();

    println!("Answer with A-D, Enter to skip, p for previous, q to finish.");
    'questions: loop {
        print_question(&session);
        std::io::stdout().flush()?;
        let Some(line) = lines.next().transpose()? else {
            break;
        };

        let elapsed = clock.elapsed_secs_since(last_tick);
        last_tick += Duration::seconds(i64::try_from(elapsed).unwrap_or_default());
        for _ in 0..elapsed {
            if session.tick(clock.now()).is_some() {
                println!("Time is up.");
                break 'questions;
            }
        }

        match line.trim().to_ascii_lowercase().as_str() {
            "q" => break,
            "p" => {
                session.previous();
                continue;
            }
            "" => {}
            answer => match answer_index(answer) {
                Some(index) => session.select_answer(index)?,
                None => {
                    println!("Please answer with A, B, C or D.");
                    continue;
                }
            },
        }
        if !session.next() {
            break;
        }
    }

    let result = app.complete_quiz(&mut session)?;
    println!();
    println!(
        "Score: {}% ({} of {} correct) in {}",
        result.score,
        result.correct_answers,
        result.total_questions,
        services::quiz::format_clock(result.time_spent),
    );
    if !result.weak_topics.is_empty() {
        println!("Review these topics: {}", result.weak_topics.join(", "));
    }
    Ok(())
}

fn print_question(session: &QuizSession) {
    let Some(question) = session.current_question() else {
        return;
    };
    println!();
    println!(
        "Question {} of {} ({}%)  [{:?}] {}  {} left",
        session.current_index() + 1,
        session.len(),
        session.progress_percent(),
        question.difficulty(),
        question.topic(),
        session.format_remaining(),
    );
    println!("{}", question.question());
    for (choice, option) in Choice::ALL.iter().zip(question.options()) {
        let marker = if session.answer_for(question.id()) == Some(*choice) {
            "*"
        } else {
            " "
        };
        println!(" {marker}{choice:?}) {option}");
    }
}

fn answer_index(answer: &str) -> Option<usize> {
    match answer {
        "a" => Some(0),
        "b" => Some(1),
        "c" => Some(2),
        "d" => Some(3),
        _ => None,
    }
}

async fn run_ingest(
    app: &mut AppServices,
    source: SyllabusSource,
) -> Result<(), Box<dyn std::error::Error>> {
    let input = match source {
        SyllabusSource::Text(text) => SyllabusInput::from_text(text),
        SyllabusSource::File(path) => {
            let file = SelectedFile {
                name: file_name(&path),
                content_type: content_type_for(&path).to_string(),
                bytes: std::fs::read(&path)?,
            };
            let uploads = app.uploads_mut();
            uploads.select(file)?;
            let url = uploads
                .upload(&mut |percent| eprintln!("Uploading... {percent}%"))
                .await?;
            println!("Uploaded to {url}");
            SyllabusInput::from_file(url.to_string())
        }
    };

    let subject_id = app
        .ingest(&input, &mut |stage| {
            eprintln!("[{:>3}%] {}", stage.percent, stage.label);
        })
        .await?;

    let subjects = app.store().subjects();
    if let Some(subject) = subjects.iter().find(|s| s.id() == &subject_id) {
        println!(
            "Added {} ({} topics)",
            subject.name(),
            subject.total_topics()
        );
        for unit in subject.units() {
            println!("  {}", unit.name());
            for topic in unit.topics() {
                println!("    - {}", topic.name());
            }
        }
    }
    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| "syllabus".into(), |name| name.to_string_lossy().into())
}

fn content_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("pdf") => "application/pdf",
        Some("docx") => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        Some("txt") => "text/plain",
        _ => "application/octet-stream",
    }
}

async fn run_config(
    app: &AppServices,
    path: &Path,
    settings: Vec<(String, String)>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = app.config().load().await?;
    if !settings.is_empty() {
        let mut draft = config.to_draft();
        for (key, value) in settings {
            apply_setting(&mut draft, &key, value)?;
        }
        config = app.config().save(draft).await?;
        println!("Saved provider config to {}", path.display());
    }
    print_config(&config);
    Ok(())
}

fn apply_setting(
    draft: &mut ProviderConfigDraft,
    key: &str,
    value: String,
) -> Result<(), ArgsError> {
    let slot = match key {
        "apiKey" => &mut draft.api_key,
        "authDomain" => &mut draft.auth_domain,
        "projectId" => &mut draft.project_id,
        "storageBucket" => &mut draft.storage_bucket,
        "messagingSenderId" => &mut draft.messaging_sender_id,
        "appId" => &mut draft.app_id,
        _ => return Err(ArgsError::UnknownSettingKey(key.to_string())),
    };
    *slot = Some(value);
    Ok(())
}

fn print_config(config: &ProviderConfig) {
    let show = |value: Option<&str>| value.unwrap_or("(not set)").to_string();
    println!("apiKey:            {}", show(config.api_key()));
    println!("authDomain:        {}", show(config.auth_domain()));
    println!("projectId:         {}", show(config.project_id()));
    println!("storageBucket:     {}", show(config.storage_bucket()));
    println!("messagingSenderId: {}", show(config.messaging_sender_id()));
    println!("appId:             {}", show(config.app_id()));
    println!(
        "Status:            {}",
        if config.is_configured() {
            "configured"
        } else {
            "not configured"
        }
    );
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
