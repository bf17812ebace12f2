use std::io::{self, Write};
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::LocalTime;

use augur::banner::{BannerInfo, print_banner};
use augur::consts::{
    DEFAULT_GEMINI_BASE_URL, DEFAULT_MODEL, DEFAULT_PROJECT, DEFAULT_TRACE_ENDPOINT,
    DEFAULT_TRACE_TIMEOUT, TRACE_FLUSH_TIMEOUT,
};
use augur::spinner::Spinner;
use augur::{Config, ConfigurationError, QueryPipeline, Settings};

/// Credentials come only from the environment (or `.env`):
/// GEM_API_KEY for the model, LANG_API for run tracing.
#[derive(Parser)]
#[command(name = "augur", version, about = "Ask a hosted model one question at a time.")]
struct Cli {
    /// Gemini model id
    #[arg(long, env = "AUGUR_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// Gemini REST API base URL
    #[arg(long, env = "GEMINI_BASE_URL", default_value = DEFAULT_GEMINI_BASE_URL)]
    base_url: String,

    /// Request timeout in seconds (default: none)
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Run-tracing service base URL
    #[arg(long, env = "LANGCHAIN_ENDPOINT", default_value = DEFAULT_TRACE_ENDPOINT)]
    trace_endpoint: String,

    /// Run-tracing project name
    #[arg(long, env = "LANGCHAIN_PROJECT", default_value = DEFAULT_PROJECT)]
    project: String,

    /// Answer a single question and exit (non-interactive)
    #[arg(short, long)]
    ask: Option<String>,

    /// Debug-level logging
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

impl Cli {
    fn settings(&self) -> Settings {
        Settings {
            model: self.model.clone(),
            base_url: self.base_url.clone(),
            timeout: self.timeout.map(Duration::from_secs),
            trace_endpoint: self.trace_endpoint.clone(),
            trace_timeout: DEFAULT_TRACE_TIMEOUT,
            project: self.project.clone(),
        }
    }
}

/// What one line typed at the prompt asks for.
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Blank,
    Quit,
    /// The line as typed, surrounding whitespace included.
    Question(&'a str),
}

fn classify(line: &str) -> Input<'_> {
    match line.trim() {
        "" => Input::Blank,
        "quit" | "exit" => Input::Quit,
        _ => Input::Question(line),
    }
}

/// A `.env` that exists but can't be used. A missing one is normal.
fn dotenv_problem<T>(loaded: &Result<T, dotenvy::Error>) -> Option<&dotenvy::Error> {
    match loaded {
        Err(dotenvy::Error::Io(e)) if e.kind() == io::ErrorKind::NotFound => None,
        Err(e) => Some(e),
        Ok(_) => None,
    }
}

/// Reported once by `main`'s error return, cause chain included.
fn startup_error(e: ConfigurationError) -> anyhow::Error {
    anyhow::Error::new(e).context("cannot start without configuration")
}

fn init_logging(verbose: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(if verbose { "debug" } else { "info" }))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .with_timer(LocalTime::new(time::macros::format_description!(
            "[hour]:[minute]:[second]"
        )))
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Real environment variables take precedence over .env entries
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    if let Some(e) = dotenv_problem(&dotenv) {
        warn!("ignoring .env: {}", e);
    }

    // No input is read until configuration is complete
    let config = Config::from_env(cli.settings()).map_err(startup_error)?;
    let pipeline = QueryPipeline::new(&config).context("failed to build query pipeline")?;
    info!(model = pipeline.model_id(), project = %config.tracing.project, "ready");

    // Single question mode
    if let Some(question) = cli.ask {
        let result = pipeline.answer(&question).await;
        pipeline.flush(TRACE_FLUSH_TIMEOUT).await;
        println!("{}", result?);
        return Ok(());
    }

    print_banner(&BannerInfo {
        model: pipeline.model_id(),
        trace_project: &config.tracing.project,
        trace_endpoint: &config.tracing.endpoint,
    });

    // REPL — async stdin so Ctrl+C is caught at the prompt too
    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();
    let waiting = format!("asking {}", pipeline.model_id());

    loop {
        print!("\naugur> ");
        io::stdout().flush()?;

        let line = tokio::select! {
            result = lines.next_line() => {
                match result {
                    Ok(Some(line)) => line,
                    Ok(None) => {
                        // Ctrl+D (EOF)
                        println!();
                        break;
                    }
                    Err(e) => {
                        eprintln!("input error: {}", e);
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!();
                break;
            }
        };

        let question = match classify(&line) {
            // Only submitted (non-blank) input is asked, like a text box
            Input::Blank => continue,
            Input::Quit => break,
            Input::Question(question) => question,
        };

        let spinner = Spinner::start(&waiting);
        // Ctrl+C while waiting abandons the question, not the session
        tokio::select! {
            result = pipeline.answer(question) => {
                spinner.stop().await;
                match result {
                    Ok(answer) => println!("\n{}", answer),
                    Err(e) => eprintln!("\nerror: {}", e),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                spinner.stop().await;
                println!("\n\ninterrupted");
            }
        }
    }

    pipeline.flush(TRACE_FLUSH_TIMEOUT).await;
    println!("goodbye.");
    Ok(())
}
