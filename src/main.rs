use anyhow::Result;
use clap::{CommandFactory, Parser};
use owo_colors::OwoColorize;
use salesql::ChatEngine;
use salesql::chat::history::History;
use salesql::cli::{Cli, Commands, ConfigAction, ModelsAction};
use salesql::config::Config;
use salesql::llm::client::HttpCompletionClient;
use salesql::models::catalog::{get_model, list_models, resolve_name};
use salesql::models::download::{download_model, ensure_model, format_model_info, is_model_installed};
use salesql::stt::transcriber::Transcriber;
use salesql::stt::whisper::{WhisperConfig, WhisperTranscriber};
use std::io::Write;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    let mut cli = Cli::parse();

    match cli.command.take() {
        None => {
            let config = load_config(&cli)?;
            run_serve(&config, None, None, cli.no_download, cli.quiet).await?;
        }
        Some(Commands::Serve { host, port }) => {
            let config = load_config(&cli)?;
            run_serve(&config, host, port, cli.no_download, cli.quiet).await?;
        }
        Some(Commands::Ask { question }) => {
            let config = load_config(&cli)?;
            run_ask(&config, question).await?;
        }
        Some(Commands::Transcribe { file }) => {
            let config = load_config(&cli)?;
            let transcriber = build_transcriber(&config, cli.no_download, cli.quiet).await?;
            let text = transcriber.transcribe_file(&file)?;
            println!("{}", text);
        }
        Some(Commands::Models { action }) => {
            handle_models_command(action, cli.config.as_deref()).await?;
        }
        Some(Commands::Config { action }) => {
            handle_config_command(action, cli.config.as_deref())?;
        }
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "salesql",
                &mut std::io::stdout(),
            );
        }
    }

    Ok(())
}

/// Load configuration and fold in environment and CLI overrides.
///
/// Priority order:
/// 1. CLI flags (--model, --language)
/// 2. Environment variables (SALESQL_*)
/// 3. Custom config path from CLI (--config), or the default config path
/// 4. Built-in defaults
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = if let Some(path) = cli.config.as_deref() {
        Config::load(path)?
    } else {
        Config::load_or_default(&Config::default_path())?
    }
    .with_env_overrides();

    if let Some(model) = &cli.model {
        config.stt.model = model.clone();
    }
    if let Some(language) = &cli.language {
        config.stt.language = language.clone();
    }

    Ok(config)
}

/// Load the Whisper model named in the config, downloading it if needed.
async fn build_transcriber(
    config: &Config,
    no_download: bool,
    quiet: bool,
) -> Result<Arc<dyn Transcriber>> {
    let model_path = ensure_model(&config.stt.model, no_download, !quiet).await?;
    let transcriber = WhisperTranscriber::new(WhisperConfig {
        model_path,
        language: config.stt.language.clone(),
        threads: config.stt.threads,
    })?;
    Ok(Arc::new(transcriber))
}

/// Serve the chat page. Both models are loaded once, before binding.
async fn run_serve(
    config: &Config,
    host: Option<String>,
    port: Option<u16>,
    no_download: bool,
    quiet: bool,
) -> Result<()> {
    let transcriber = build_transcriber(config, no_download, quiet).await?;
    let completion = Arc::new(HttpCompletionClient::from_config(&config.llm)?);

    if !quiet {
        eprintln!("Loaded transcription model: {}", transcriber.model_name());
    }

    let engine = ChatEngine::new(transcriber, completion);
    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);

    salesql::server::serve(engine, &host, port).await?;
    Ok(())
}

/// Terminal chat: one-shot with a question, interactive loop without.
async fn run_ask(config: &Config, question: Option<String>) -> Result<()> {
    let completion = Arc::new(HttpCompletionClient::from_config(&config.llm)?);
    let engine = ChatEngine::text_only(completion);

    if let Some(question) = question {
        let (reply, _) = engine.submit_text(&question, History::new()).await?;
        salesql::output::render_exchange(&question, &reply);
        return Ok(());
    }

    // Interactive: thread one history through the whole session
    let mut history = History::new();
    let stdin = std::io::stdin();
    loop {
        print!("{} ", "?".green().bold());
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break; // EOF
        }
        let question = line.trim();
        if question.is_empty() || question == "exit" || question == "quit" {
            break;
        }

        match engine.submit_text(question, history.clone()).await {
            Ok((reply, updated)) => {
                history = updated;
                salesql::output::render_exchange(question, &reply);
            }
            Err(e) => {
                eprintln!("{}", format!("Error: {}", e).red());
            }
        }
    }
    Ok(())
}

/// Handle model management commands.
async fn handle_models_command(
    action: ModelsAction,
    custom_path: Option<&std::path::Path>,
) -> Result<()> {
    match action {
        ModelsAction::List => {
            println!("Available models:");
            for model in list_models() {
                println!("  {}", format_model_info(model));
            }
        }
        ModelsAction::Install { name } => {
            let path = download_model(&name, true).await?;
            println!("Model '{}' installed successfully", name);
            println!("Location: {}", path.display());
        }
        ModelsAction::Use { name } => {
            let resolved = resolve_name(&name);
            if resolved != name {
                println!("Resolved '{name}' to '{resolved}'");
            }
            if get_model(resolved).is_none() {
                eprintln!("Unknown model: '{name}'");
                eprintln!("Run `salesql models list` to see available models.");
                std::process::exit(1);
            }

            let config_path = custom_path
                .map(std::path::PathBuf::from)
                .unwrap_or_else(Config::default_path);
            Config::update_model(&config_path, resolved)?;
            println!("Default model set to '{resolved}'");

            if !is_model_installed(resolved) {
                println!(
                    "Note: model not yet downloaded. Run `salesql models install {resolved}` or it will download on first use."
                );
            }
        }
    }
    Ok(())
}

/// Handle configuration commands.
fn handle_config_command(
    action: ConfigAction,
    custom_path: Option<&std::path::Path>,
) -> Result<()> {
    let config_path = custom_path
        .map(std::path::PathBuf::from)
        .unwrap_or_else(Config::default_path);

    match action {
        ConfigAction::Get { key } => {
            let config = Config::load_or_default(&config_path)?.with_env_overrides();
            match config.get_value_by_path(&key) {
                Ok(value) => println!("{}", value),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
        ConfigAction::Set { key, value } => {
            Config::set_value_by_path(&config_path, &key, &value)?;
            println!("Set {} = {}", key, value);
        }
        ConfigAction::Dump => {
            print!("{}", Config::dump_template());
        }
    }
    Ok(())
}
