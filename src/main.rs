//! Menu bot chat client
//!
//! Line-oriented REPL over a [`SessionController`]. Logs go to stderr as
//! JSON so the transcript on stdout stays readable.

use menubot_client::backend::{BotBackend, HttpBackend, LoggingBackend};
use menubot_client::config::ClientConfig;
use menubot_client::locale::{FileLocaleStore, Locale, LocalePreferenceStore};
use menubot_client::menu::{find_by_ordinal, render_menu};
use menubot_client::session::{SessionController, Turn};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const HELP: &str = "Commands: /menu  /health  /lang <si|en>  /quit";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "menubot_client=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr),
        )
        .init();

    // Configuration
    let config = ClientConfig::from_env();
    let locale_store = FileLocaleStore::new(config.locale_file.clone());
    let locale = locale_store.load_or_default();

    let backend: Arc<dyn BotBackend> = Arc::new(HttpBackend::new(&config)?);
    let controller = SessionController::new(LoggingBackend::new(backend));
    tracing::info!(base_url = %controller.backend().base_url(), locale = %locale, "Session started");

    println!(
        "Connected to {} (language: {})",
        controller.backend().base_url(),
        locale.display_name()
    );
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match line.split_once(' ').unwrap_or((line, "")) {
            ("/quit" | "/exit", _) => break,
            ("/help", _) => println!("{HELP}"),
            ("/menu", _) => match controller.fetch_menu().await {
                Ok(options) if options.is_empty() => println!("(no menu items)"),
                Ok(options) => print!("{}", render_menu(&options)),
                Err(failure) => println!("{}", failure.user_message()),
            },
            ("/health", _) => {
                let check = controller.test_connection().await;
                println!("{}", check.message);
            }
            ("/lang", code) => match code.parse::<Locale>() {
                Ok(locale) => match locale_store.save(locale) {
                    Ok(()) => println!("Language set to {}", locale.display_name()),
                    Err(e) => eprintln!("Could not save language: {e}"),
                },
                Err(e) => eprintln!("{e}"),
            },
            _ => {
                let options = controller.last_menu_options();
                let result = match find_by_ordinal(&options, line) {
                    Some(option) => controller.select_option(option).await,
                    None => controller.submit_user_text(line).await,
                };
                match result {
                    Ok(reply) => {
                        if let Some(turn) = controller.transcript().last() {
                            print_turn(turn);
                        }
                        if reply.failure().is_some_and(|f| f.kind.is_retryable()) {
                            println!("(send the same message again to retry)");
                        }
                    }
                    Err(e) => eprintln!("{e}"),
                }
            }
        }
    }

    Ok(())
}

fn print_turn(turn: &Turn) {
    println!("bot> {}", turn.text);
    if !turn.options.is_empty() {
        print!("{}", render_menu(&turn.options));
    }
}
