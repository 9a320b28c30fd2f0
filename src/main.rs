use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, bail};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader, Lines, Stdin};

use burnish::audit::sqlite::SqliteAuditLog;
use burnish::audit::writer::AuditWriter;
use burnish::banner::{BannerInfo, print_banner, print_goodbye};
use burnish::client::EnhanceClient;
use burnish::commands::{CommandRegistry, CommandResult, SessionInfo, StateChange};
use burnish::config::{Config, KEY_MODEL, SETTING_KEYS};
use burnish::consts::{DEFAULT_HISTORY_LIMIT, DEFAULT_MODEL, default_db_path};
use burnish::editor::{Buffer, parse_line_range};
use burnish::enhancer::EnhanceService;
use burnish::enhancer::openai::OpenAiBackend;
use burnish::presentation::{Presentation, State};
use burnish::server::{ApiState, ServerConfig, serve};
use burnish::spinner::Spinner;

#[derive(Parser)]
#[command(name = "burnish", version, about = "Rough prompts in, polished briefs out.")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// SQLite database path for settings and the audit log
    /// (use :memory: for ephemeral)
    #[arg(long, global = true)]
    db: Option<String>,

    /// Model to request (overrides the configured preference)
    #[arg(long, global = true)]
    model: Option<String>,

    /// User id attached to requests and audit records
    #[arg(long, global = true)]
    user: Option<String>,

    /// Endpoint base URL (overrides the whole resolution chain)
    #[arg(long, global = true)]
    api_url: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the enhancement API server
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        #[arg(short, long, default_value_t = 3000)]
        port: u16,
    },
    /// Enhance a prompt from arguments, stdin, or a file region
    Enhance {
        /// Prompt text; stdin is read when absent and no --file is given
        prompt: Vec<String>,

        /// Enhance a region of this file instead of an argument prompt
        #[arg(long)]
        file: Option<PathBuf>,

        /// 1-based inclusive line range, e.g. 10:24 (whole file when absent)
        #[arg(long, requires = "file")]
        lines: Option<String>,

        /// Write the enhanced text back over the selection
        #[arg(long, requires = "file")]
        write: bool,

        /// Skip the keep/revert prompt after writing
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Show recent enhancements, newest first
    History {
        #[arg(long, default_value_t = DEFAULT_HISTORY_LIMIT)]
        limit: usize,
    },
    /// Read or write settings (api_base_url, production_api_url, model)
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print one setting
    Get { key: String },
    /// Store one setting
    Set { key: String, value: String },
    /// Remove one setting
    Unset { key: String },
    /// Print all settings
    List,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut cli = Cli::parse();
    let command = cli.command.take();

    let db_path = cli
        .db
        .clone()
        .unwrap_or_else(|| default_db_path().to_string_lossy().into_owned());
    if db_path != ":memory:"
        && let Some(parent) = Path::new(&db_path).parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let config = Config::open(&db_path)?;

    match command {
        Some(Command::Serve { host, port }) => run_serve(&db_path, host, port).await,
        Some(Command::Enhance {
            prompt,
            file,
            lines,
            write,
            yes,
        }) => {
            let client = build_client(&cli, &config)?;
            let model = resolve_model(cli.model.clone(), &config)?;
            match file {
                Some(path) => {
                    enhance_file(&client, model.as_deref(), &path, lines.as_deref(), write, yes)
                        .await
                }
                None => enhance_once(&client, model.as_deref(), prompt).await,
            }
        }
        Some(Command::History { limit }) => {
            let client = build_client(&cli, &config)?;
            run_history(&client, cli.user.as_deref(), limit).await
        }
        Some(Command::Config { action }) => run_config(&config, action),
        None => run_repl(&cli, &config, &db_path).await,
    }
}

/// One shared client per process, pointed at the resolved endpoint.
fn build_client(cli: &Cli, config: &Config) -> anyhow::Result<EnhanceClient> {
    let endpoint = resolve_endpoint(cli.api_url.as_deref(), config)?;
    Ok(EnhanceClient::new(endpoint).with_user(cli.user.clone()))
}

fn resolve_endpoint(cli_override: Option<&str>, config: &Config) -> anyhow::Result<String> {
    match cli_override {
        Some(url) => Ok(url.trim_end_matches('/').to_string()),
        None => config.resolve_api_base_url(),
    }
}

fn resolve_model(cli_model: Option<String>, config: &Config) -> anyhow::Result<Option<String>> {
    match cli_model {
        Some(model) => Ok(Some(model)),
        None => config.get(KEY_MODEL),
    }
}

async fn run_serve(db_path: &str, host: String, port: u16) -> anyhow::Result<()> {
    let store = Arc::new(SqliteAuditLog::new(db_path)?);
    let writer = AuditWriter::spawn(store.clone());
    let service = EnhanceService::new(Box::new(OpenAiBackend::new()), writer);
    let state = Arc::new(ApiState {
        service,
        audit: store,
    });
    serve(ServerConfig { host, port }, state).await
}

/// The pipe surface: prompt in, enhanced Markdown out.
async fn enhance_once(
    client: &EnhanceClient,
    model: Option<&str>,
    prompt_args: Vec<String>,
) -> anyhow::Result<()> {
    let prompt = if prompt_args.is_empty() {
        let mut text = String::new();
        tokio::io::stdin()
            .read_to_string(&mut text)
            .await
            .context("failed to read prompt from stdin")?;
        text
    } else {
        prompt_args.join(" ")
    };
    if prompt.trim().is_empty() {
        bail!("nothing to enhance");
    }

    let mut view = Presentation::new();
    view.begin()?;
    let spinner = Spinner::start("enhancing");

    match client.enhance(&prompt, model).await {
        Ok(enhanced) => {
            spinner.stop().await;
            view.succeed(prompt, enhanced.as_str())?;
            println!("{enhanced}");
            Ok(())
        }
        Err(e) => {
            spinner.stop_with(&format!("✗ {e}")).await;
            view.fail(e.to_string())?;
            Err(e.into())
        }
    }
}

/// The editor surface: replace a file region in place, then keep or revert.
async fn enhance_file(
    client: &EnhanceClient,
    model: Option<&str>,
    path: &Path,
    lines: Option<&str>,
    write: bool,
    yes: bool,
) -> anyhow::Result<()> {
    let mut buffer = Buffer::load(path)?;
    let selection = match lines {
        Some(spec) => {
            let (first, last) = parse_line_range(spec)?;
            buffer.select_lines(first..=last)?
        }
        None => buffer.select_all(),
    };
    let original = buffer.slice(&selection).to_string();
    if original.trim().is_empty() {
        bail!("nothing to enhance in the selection");
    }

    let mut view = Presentation::new();
    view.begin()?;
    let spinner = Spinner::start("enhancing");

    let enhanced = match client.enhance(&original, model).await {
        Ok(enhanced) => {
            spinner.stop_with("✓ enhanced").await;
            enhanced
        }
        Err(e) => {
            spinner.stop_with(&format!("✗ {e}")).await;
            view.fail(e.to_string())?;
            return Err(e.into());
        }
    };
    view.succeed(original.as_str(), enhanced.as_str())?;

    if !write {
        println!("{enhanced}");
        return Ok(());
    }

    let replacement = buffer.replace(&selection, &enhanced);
    view.apply()?;
    buffer.save(path)?;
    eprintln!("✓ replaced selection in {}", path.display());

    if yes {
        return Ok(());
    }

    // Keep or revert. Silence finalizes the replacement when the result
    // view expires.
    let deadline = view.auto_dismiss().unwrap_or_default();
    eprint!("keep replacement? [K/r] (auto-keep in {}s) ", deadline.as_secs());
    io::stderr().flush()?;

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    tokio::select! {
        line = input.next_line() => {
            let answer = line?.unwrap_or_default();
            if answer.trim().eq_ignore_ascii_case("r") {
                buffer.revert(&replacement);
                buffer.save(path)?;
                view.revert()?;
                eprintln!("✓ reverted {}", path.display());
            } else {
                eprintln!("✓ kept");
            }
        }
        _ = tokio::time::sleep(deadline) => {
            eprintln!("\n(no answer, kept)");
        }
    }
    view.dismiss()?;
    Ok(())
}

async fn run_history(
    client: &EnhanceClient,
    user: Option<&str>,
    limit: usize,
) -> anyhow::Result<()> {
    let records = client.history(user, limit).await?;
    if records.is_empty() {
        println!("no enhancements yet");
        return Ok(());
    }
    for record in &records {
        let model = record.model.as_deref().unwrap_or("-");
        let user = record.user_id.as_deref().unwrap_or("-");
        println!("{}  model:{model}  user:{user}", record.created_at);
        println!("  {}", record.raw_prompt.lines().next().unwrap_or(""));
    }
    Ok(())
}

fn run_config(config: &Config, action: ConfigAction) -> anyhow::Result<()> {
    match action {
        ConfigAction::Get { key } => {
            check_setting_key(&key)?;
            match config.get(&key)? {
                Some(value) => println!("{value}"),
                None => println!("(unset)"),
            }
        }
        ConfigAction::Set { key, value } => {
            check_setting_key(&key)?;
            let value = value.trim();
            if value.is_empty() {
                bail!("value for {key} must not be empty; use `config unset {key}` instead");
            }
            config.set(&key, value)?;
            println!("✓ {key} = {value}");
        }
        ConfigAction::Unset { key } => {
            check_setting_key(&key)?;
            config.remove(&key)?;
            println!("✓ {key} unset");
        }
        ConfigAction::List => {
            for (key, value) in config.entries()? {
                println!("{key} = {value}");
            }
        }
    }
    Ok(())
}

fn check_setting_key(key: &str) -> anyhow::Result<()> {
    if !SETTING_KEYS.contains(&key) {
        bail!("unknown setting {key}; known settings: {}", SETTING_KEYS.join(", "));
    }
    Ok(())
}

/// The playground surface: a REPL where plain input is enhanced and
/// slash-commands adjust the session.
async fn run_repl(cli: &Cli, config: &Config, db_path: &str) -> anyhow::Result<()> {
    let mut endpoint = resolve_endpoint(cli.api_url.as_deref(), config)?;
    let mut model = resolve_model(cli.model.clone(), config)?;
    let mut client = EnhanceClient::new(endpoint.clone()).with_user(cli.user.clone());

    print_banner(&BannerInfo {
        endpoint: &endpoint,
        model: model.as_deref().unwrap_or(DEFAULT_MODEL),
        user: cli.user.as_deref().unwrap_or("—"),
        db: if db_path == ":memory:" { "ephemeral" } else { db_path },
    });

    let registry = CommandRegistry::new();
    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    loop {
        print!("\nburnish> ");
        io::stdout().flush()?;

        // Read next line, interruptible by Ctrl+C
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
                        eprintln!("input error: {e}");
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!();
                break;
            }
        };

        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let result = {
            let info = SessionInfo {
                endpoint: &endpoint,
                model: model.as_deref(),
                user: cli.user.as_deref(),
                db_path,
                client: &client,
                config,
            };
            registry.dispatch(input, &info).await
        };

        match result {
            CommandResult::NotACommand => {}
            CommandResult::Handled => continue,
            CommandResult::StateChanged(change) => {
                match change {
                    StateChange::Model(new_model) => model = new_model,
                    StateChange::Endpoint(url) => {
                        endpoint = url;
                        client = EnhanceClient::new(endpoint.clone()).with_user(cli.user.clone());
                    }
                }
                continue;
            }
            CommandResult::Quit => break,
        }

        // Plain input: one enhancement, one per-invocation view.
        let mut view = Presentation::new();
        view.begin()?;
        let spinner = Spinner::start("enhancing");

        // Ctrl+C abandons the request, not the REPL
        let outcome = tokio::select! {
            result = client.enhance(input, model.as_deref()) => Some(result),
            _ = tokio::signal::ctrl_c() => None,
        };

        match outcome {
            None => {
                spinner.stop_with("✗ interrupted").await;
            }
            Some(Ok(enhanced)) => {
                spinner.stop().await;
                view.succeed(input, enhanced.as_str())?;
                show_result_view(&mut view, &mut lines).await?;
            }
            Some(Err(e)) => {
                spinner.stop().await;
                view.fail(e.to_string())?;
                show_error_view(&mut view, &mut lines).await?;
            }
        }
    }

    print_goodbye();
    Ok(())
}

/// Hold the success view until the user dismisses it or it expires.
async fn show_result_view(
    view: &mut Presentation,
    lines: &mut Lines<BufReader<Stdin>>,
) -> anyhow::Result<()> {
    if let State::Success {
        original, enhanced, ..
    } = view.state()
    {
        println!("\n--- original ---\n{original}\n\n--- enhanced ---\n{enhanced}");
    }

    let deadline = view.auto_dismiss().unwrap_or_default();
    print!("\n[enter] dismiss (auto in {}s) ", deadline.as_secs());
    io::stdout().flush()?;

    tokio::select! {
        _ = lines.next_line() => {}
        _ = tokio::time::sleep(deadline) => println!(),
    }
    view.dismiss()?;
    Ok(())
}

/// Hold the error notice until dismissed or expired.
async fn show_error_view(
    view: &mut Presentation,
    lines: &mut Lines<BufReader<Stdin>>,
) -> anyhow::Result<()> {
    if let State::Error { message } = view.state() {
        eprintln!("✗ {message}");
    }

    let deadline = view.auto_dismiss().unwrap_or_default();
    print!("[enter] dismiss (auto in {}s) ", deadline.as_secs());
    io::stdout().flush()?;

    tokio::select! {
        _ = lines.next_line() => {}
        _ = tokio::time::sleep(deadline) => println!(),
    }
    view.dismiss()?;
    Ok(())
}
