use clap::Parser;
use notes_core::{LanguageModel, NoteCreate, NoteStore, Result};
use notes_inference::{Annotation, AnnotationService, Config, ModelHandle};
use notes_storage::StorageConfig;
use notes_web::{AppState, StaticTokenVerifier, Timeouts};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn, Level};

const HEALTH_CHECK_OWNER: &str = "__health_check__";
const PROBE_PROMPT: &str = "Merhaba! Sadece \"tamam\" yaz.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HumanDuration(Duration);

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut total_millis = 0u64;
        let mut current_number = String::new();
        let mut has_unit = false;
        let mut chars = s.chars().peekable();

        while let Some(c) = chars.next() {
            if c.is_ascii_digit() {
                current_number.push(c);
            } else if let Ok(num) = current_number.parse::<u64>() {
                let unit_millis = match c {
                    'm' if chars.peek() == Some(&'s') => {
                        chars.next();
                        1
                    }
                    's' => 1000,
                    'm' => 60_000,
                    'h' => 3_600_000,
                    _ => return Err(format!("Invalid duration unit: {}", c)),
                };
                total_millis = add_millis(total_millis, num, unit_millis)?;
                current_number.clear();
                has_unit = true;
            } else if !c.is_whitespace() {
                return Err(format!("Invalid character in duration: {}", c));
            }
        }

        // A bare number is seconds
        if !current_number.is_empty() {
            let num = current_number
                .parse::<u64>()
                .map_err(|_| "Invalid number in duration".to_string())?;
            total_millis = add_millis(total_millis, num, 1000)?;
            has_unit = true;
        }

        if !has_unit {
            return Err("Duration must include a number".to_string());
        }

        Ok(HumanDuration(Duration::from_millis(total_millis)))
    }
}

fn add_millis(total: u64, num: u64, unit_millis: u64) -> std::result::Result<u64, String> {
    num.checked_mul(unit_millis)
        .and_then(|millis| total.checked_add(millis))
        .ok_or_else(|| "Duration is too large".to_string())
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Notes backend with AI summaries and to-do detection", long_about = None)]
pub struct Cli {
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,
    #[arg(long, env = "PORT", default_value_t = 8000)]
    port: u16,
    #[arg(long, env = "DEBUG")]
    debug: bool,
    /// Deadline for soft deletes (e.g. 10s, 1m30s, 500ms)
    #[arg(long, env = "REQUEST_TIMEOUT", default_value = "10s")]
    request_timeout: HumanDuration,
    /// How long the annotation service waits for a model reply
    #[arg(long, env = "MODEL_TIMEOUT", default_value = "35s")]
    model_timeout: HumanDuration,
    /// Deadline for the annotation endpoints and the post-create to-do extraction [default: model timeout + 5s]
    #[arg(long, env = "ANNOTATION_TIMEOUT")]
    annotation_timeout: Option<HumanDuration>,
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
    #[arg(long, env = "GEMINI_MODEL", default_value = notes_inference::DEFAULT_MODEL)]
    model: String,
    #[arg(long, env = "GEMINI_BASE_URL", default_value = notes_inference::DEFAULT_BASE_URL)]
    model_url: String,
    #[arg(long, env = "NOTES_STORAGE", default_value = "memory", help = "Storage backend: memory (default), sqlite")]
    storage: String,
    #[arg(long, env = "NOTES_DATABASE", default_value = "notes.db")]
    database: PathBuf,
    /// Accepted bearer tokens as `token=uid[:email]`, comma separated
    #[arg(long, env = "NOTES_AUTH_TOKENS", default_value = "", hide_env_values = true)]
    auth_tokens: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API
    Serve,
    /// Summarize a text once and print the result as JSON
    Summarize { text: String },
    /// Detect to-dos in a text once and print the result as JSON
    ExtractTodos { text: String },
    /// Send a probe prompt to the configured model
    CheckModel,
}

impl Cli {
    fn model_config(&self) -> Config {
        Config {
            api_key: self.api_key.clone(),
            model_name: self.model.clone(),
            base_url: self.model_url.clone(),
            timeout: self.model_timeout.0,
            ..Config::default()
        }
    }

    fn timeouts(&self) -> Timeouts {
        let mut timeouts = Timeouts::for_model(self.model_timeout.0);
        timeouts.request = self.request_timeout.0;
        if let Some(HumanDuration(annotation)) = self.annotation_timeout {
            if annotation <= timeouts.model {
                warn!(
                    "⚠️ Annotation timeout {:?} does not exceed the model timeout {:?}, slow model replies will surface as 408",
                    annotation, timeouts.model
                );
            }
            timeouts.annotation = annotation;
        }
        timeouts
    }
}

async fn check_storage(storage: &Arc<dyn NoteStore>, storage_type: &str) -> Result<()> {
    let probe = NoteCreate {
        id: None,
        title: "Health check".to_string(),
        content: "Storage health check".to_string(),
    };
    let note = storage.create(probe, HEALTH_CHECK_OWNER).await?;

    if storage.get(&note.id, HEALTH_CHECK_OWNER).await?.is_none() {
        return Err(notes_core::Error::Storage("Failed to retrieve health check note".to_string()));
    }

    info!("🏦 Storage backend initialized successfully (using {})", storage_type);

    if let Err(e) = storage.hard_delete(&note.id, HEALTH_CHECK_OWNER).await {
        warn!("⚠️ Failed to clean up health check note: {}", e);
    }

    Ok(())
}

async fn check_model(model: &Arc<dyn LanguageModel>, timeout: Duration) -> Result<()> {
    info!("🧠 Sending probe prompt to {}...", model.name());
    let reply = tokio::time::timeout(timeout, model.generate(PROBE_PROMPT))
        .await
        .map_err(|_| notes_core::Error::Timeout(timeout))??;
    info!("✅ Model {} answered: {}", model.name(), reply.trim());
    Ok(())
}

fn print_annotation<T: serde::Serialize>(annotation: Annotation<T>) -> Result<()> {
    if let Some(reason) = annotation.reason() {
        warn!("⚠️ Model answer unavailable, showing fallback: {}", reason);
    }
    println!("{}", serde_json::to_string_pretty(annotation.value())?);
    Ok(())
}

async fn serve(cli: &Cli) -> Result<()> {
    let storage_config = StorageConfig {
        database_path: cli.database.clone(),
    };
    let storage = notes_storage::create_storage(&cli.storage, &storage_config).await?;

    info!("💾 Checking storage connection...");
    check_storage(&storage, &cli.storage).await?;

    let verifier = StaticTokenVerifier::parse(&cli.auth_tokens)?;
    if verifier.is_empty() {
        warn!("⚠️ No auth tokens configured, every /api/notes request will be rejected");
    } else {
        info!("🔑 Loaded {} auth tokens", verifier.len());
    }

    // Built on first request, a missing key only fails the AI endpoints
    let model = Arc::new(ModelHandle::new(cli.model_config()));
    let state = AppState::new(storage, model, Arc::new(verifier), cli.timeouts());
    let app = notes_web::create_app(state).await;

    let addr = format!("{}:{}", cli.host, cli.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("🚀 Notes API listening on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.debug { Level::DEBUG } else { Level::INFO })
        .init();

    match &cli.command {
        Commands::Serve => serve(&cli).await?,
        Commands::Summarize { text } => {
            let model = notes_inference::create_model(&cli.model_config()).await?;
            let service = AnnotationService::new(model, cli.model_timeout.0);
            print_annotation(service.summarize(text).await)?;
        }
        Commands::ExtractTodos { text } => {
            let model = notes_inference::create_model(&cli.model_config()).await?;
            let service = AnnotationService::new(model, cli.model_timeout.0);
            print_annotation(service.extract_todos(text).await)?;
        }
        Commands::CheckModel => {
            let model = notes_inference::create_model(&cli.model_config()).await?;
            check_model(&model, cli.model_timeout.0).await?;
        }
    }

    Ok(())
}
