//! carbonscore CLI: carbon footprint questionnaire and ecology FAQ.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use carbonscore::assistant::Assistant;
use carbonscore::config::BotConfig;
use carbonscore::extract::Slot;

#[derive(Parser)]
#[command(name = "carbonscore", version, about = "Carbon footprint chatbot")]
struct Cli {
    /// Configuration file (TOML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Word-vector file in fastText `.vec` format.
    #[arg(long, global = true)]
    embeddings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive conversation on stdin/stdout; starts the questionnaire.
    Chat {
        /// User id of the conversation.
        #[arg(long, default_value = "local")]
        user: String,
    },

    /// Answer a single question with the FAQ, then the fallback service.
    Ask {
        question: String,
    },

    /// Run one slot extractor and print the typed result.
    Extract {
        /// car_usage, flat_surface, heating_sources, screen_time, diet or clothes_count.
        slot: Slot,
        text: String,
    },

    /// Inspect the FAQ catalog.
    Faq {
        #[command(subcommand)]
        action: FaqAction,
    },
}

#[derive(Subcommand)]
enum FaqAction {
    /// List the catalog questions.
    List,
    /// Show the closest catalog question and its score.
    Match {
        query: String,
    },
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = BotConfig::discover(cli.config.as_deref())?;
    if let Some(path) = cli.embeddings {
        config.embeddings_path = Some(path);
    }
    let assistant = Assistant::from_config(&config)?;

    match cli.command {
        Commands::Chat { user } => {
            println!("{}", assistant.start_session(&user));
            let stdin = std::io::stdin();
            let mut stdout = std::io::stdout();
            print!("> ");
            stdout.flush().into_diagnostic()?;
            for line in stdin.lock().lines() {
                let line = line.into_diagnostic()?;
                if matches!(line.trim(), "/quit" | "/exit") {
                    break;
                }
                println!("{}", assistant.handle_message(&user, &line));
                print!("> ");
                stdout.flush().into_diagnostic()?;
            }
            println!();
        }

        Commands::Ask { question } => {
            println!("{}", assistant.answer(&question));
        }

        Commands::Extract { slot, text } => match assistant.extractors().extract(slot, &text) {
            Some(value) => {
                println!("{slot}: {value}");
                println!("{}", serde_json::to_string(&value).into_diagnostic()?);
            }
            None => println!("{slot}: (no value)"),
        },

        Commands::Faq { action } => match action {
            FaqAction::List => {
                let matcher = assistant.matcher();
                println!("FAQ ({} entries):", matcher.len());
                for (i, question) in matcher.questions().enumerate() {
                    println!("  {}. {question}", i + 1);
                }
            }
            FaqAction::Match { query } => match assistant.matcher().best_match(&query) {
                Some(m) => {
                    let verdict = if m.score > assistant.matcher().threshold() {
                        "answered"
                    } else {
                        "below threshold"
                    };
                    println!(
                        "{:.4} ({verdict}) \"{}\"\n{}",
                        m.score, m.entry.question, m.entry.answer
                    );
                }
                None => println!("FAQ catalog is empty."),
            },
        },
    }

    Ok(())
}
