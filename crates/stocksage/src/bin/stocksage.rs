//! StockSage REPL
//!
//! Ask stock questions in plain English; answers are computed from Yahoo
//! Finance data and narrated by the chat model.
//!
//! # Usage
//!
//! ```bash
//! export OPENAI_API_KEY="sk-..."
//! # optional: OPENAI_API_BASE, OPENAI_MODEL, STOCKSAGE_RANGE, STOCKSAGE_CHART_PATH
//!
//! cargo run --bin stocksage -p stocksage
//! ```

use anyhow::Context;
use clap::Parser;
use sage_llm::providers::{OpenAIConfig, OpenAIProvider};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use stocksage::{
    Conversation, Dispatcher, HistoryRange, Indicators, Rendered, SageConfig, YahooFinanceClient,
};

/// Conversational stock-analysis assistant
#[derive(Debug, Parser)]
#[command(name = "stocksage", version, about)]
struct Args {
    /// Chat model (overrides OPENAI_MODEL)
    #[arg(long)]
    model: Option<String>,

    /// API base URL (overrides OPENAI_API_BASE)
    #[arg(long)]
    api_base: Option<String>,

    /// HTTP timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// History window: 1mo, 3mo, 6mo, 1y, 2y, 5y or ytd (overrides STOCKSAGE_RANGE)
    #[arg(long)]
    range: Option<HistoryRange>,

    /// Where charts are written (overrides STOCKSAGE_CHART_PATH)
    #[arg(long)]
    chart_path: Option<PathBuf>,

    /// System prompt sent with every agent call (overrides STOCKSAGE_SYSTEM_PROMPT)
    #[arg(long)]
    system_prompt: Option<String>,
}

fn print_banner() {
    println!(
        r"
StockSage: Stock Analysis Assistant

  Ask things like:
    What is the stock price of Apple?
    Calculate the 20-day SMA for MSFT
    What's the RSI of NVDA?
    Plot Tesla's stock price

  Commands:
    /help     - show this help
    /history  - show the conversation so far
    /exit     - quit
"
    );
}

fn load_config(args: &Args) -> anyhow::Result<SageConfig> {
    // Flags override env values before anything is validated
    let mut builder = SageConfig::env_builder().context("invalid StockSage environment")?;
    if let Some(model) = &args.model {
        builder = builder.model(model.clone());
    }
    if let Some(range) = args.range {
        builder = builder.range(range);
    }
    if let Some(chart_path) = &args.chart_path {
        builder = builder.chart_path(chart_path.clone());
    }
    if let Some(prompt) = &args.system_prompt {
        builder = builder.system_prompt(prompt.clone());
    }

    Ok(builder.build()?)
}

fn provider_config(args: &Args) -> anyhow::Result<OpenAIConfig> {
    let mut config = OpenAIConfig::from_env().context("OPENAI_API_KEY must be set")?;
    if let Some(api_base) = &args.api_base {
        config = config.with_api_base(api_base.clone());
    }
    if let Some(timeout) = args.timeout {
        config = config.with_timeout(timeout);
    }
    Ok(config)
}

fn print_rendered(rendered: &Rendered) {
    match rendered {
        Rendered::Reply(text) | Rendered::Narration { text, .. } => println!("{text}\n"),
        Rendered::Chart { ticker, path } => {
            println!("Chart of {ticker} saved to {}\n", path.display());
        }
        Rendered::Error(message) => eprintln!("{message}\n"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    sage_utils::init_tracing("warn,stocksage=info");

    let args = Args::parse();
    let config = load_config(&args)?;
    let provider_config = provider_config(&args)?;

    print_banner();
    println!("Configuration:");
    println!("  API Base: {}", provider_config.api_base);
    println!("  Model: {}", config.model);
    println!("  History: {}", config.range);
    println!("  Charts: {}", config.chart_path.display());
    println!();

    let provider = Arc::new(OpenAIProvider::with_config(provider_config)?);
    let indicators = Indicators::new(Arc::new(YahooFinanceClient::new()), &config);
    let sage = Dispatcher::new(provider, indicators, config);
    let mut conversation = Conversation::new();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("> ");
        stdout.flush()?;

        let mut input = String::new();
        match stdin.lock().read_line(&mut input) {
            Ok(0) => {
                println!("\nGoodbye!");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("Error reading input: {e}");
                continue;
            }
        }

        let input = input.trim();
        match input {
            "" => continue,
            "/exit" | "/quit" => {
                println!("Goodbye!");
                break;
            }
            "/help" => {
                print_banner();
                continue;
            }
            "/history" => {
                if conversation.is_empty() {
                    println!("(no messages yet)\n");
                } else {
                    for line in conversation.transcript() {
                        println!("  {line}");
                    }
                    println!();
                }
                continue;
            }
            _ => {}
        }

        let rendered = sage.handle_turn(&mut conversation, input).await;
        print_rendered(&rendered);
    }

    Ok(())
}
