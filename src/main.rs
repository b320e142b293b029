use clap::{Arg, Command};
use std::env;
use std::process;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod extract;
mod server;
mod utils;

use config::{parse_port, ServerConfig};
use server::app::{serve, AppState};

const BANNER_MIN_WIDTH: usize = 44;

/// Visible width of a banner line, ignoring SGR color sequences.
fn visible_width(text: &str) -> usize {
    let mut width = 0;
    let mut in_escape = false;
    for ch in text.chars() {
        match (in_escape, ch) {
            (false, '\x1b') => in_escape = true,
            (true, 'm') => in_escape = false,
            (true, _) => {}
            (false, _) => width += 1,
        }
    }
    width
}

/// Startup banner: title centered, detail rows left-aligned, box sized to fit.
fn render_banner(title: &str, rows: &[(&str, String)]) -> String {
    let label_width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    let body: Vec<String> = rows
        .iter()
        .map(|(label, value)| format!("{:<width$}  {}", label, value, width = label_width))
        .collect();
    let inner = body
        .iter()
        .map(|line| visible_width(line))
        .chain(std::iter::once(visible_width(title)))
        .max()
        .unwrap_or(0)
        .max(BANNER_MIN_WIDTH)
        + 2;

    let title_pad = inner - visible_width(title);
    let mut out = format!("\x1b[36m╭{}╮\n", "─".repeat(inner));
    out.push_str(&format!(
        "│{}\x1b[1m{}\x1b[0m\x1b[36m{}│\n",
        " ".repeat(title_pad / 2),
        title,
        " ".repeat(title_pad - title_pad / 2)
    ));
    out.push_str(&format!("├{}┤\n", "─".repeat(inner)));
    for line in &body {
        out.push_str(&format!(
            "│ \x1b[0m{}\x1b[36m{}│\n",
            line,
            " ".repeat(inner - 1 - visible_width(line))
        ));
    }
    out.push_str(&format!("╰{}╯\x1b[0m", "─".repeat(inner)));
    out
}

#[tokio::main]
async fn main() {
    let matches = Command::new("doctext-server")
        .version(env!("CARGO_PKG_VERSION"))
        .about("HTTP service that extracts plain text from remote PDF and DOCX documents")
        .long_about(
            "Endpoints:\n\
            - GET /extract?url=<absolute-url>: download a PDF or DOCX and return its text\n\
            - GET /: liveness check\n\
            - GET /_version: build information",
        )
        .arg(
            Arg::new("port")
                .long("port")
                .short('p')
                .value_name("PORT")
                .help("TCP port to listen on (falls back to $PORT, then 3000)")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .short('q')
                .help("Suppress the startup banner and log only errors")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let quiet = matches.get_flag("quiet");

    // RUST_LOG wins; otherwise info, or error in quiet mode
    let default_level = if quiet { "error" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let raw_port = matches
        .get_one::<String>("port")
        .cloned()
        .or_else(|| env::var("PORT").ok());

    let port = match parse_port(raw_port.as_deref()) {
        Ok(port) => port,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            process::exit(1);
        }
    };
    let config = ServerConfig::with_port(port);

    let state = match AppState::from_config(&config) {
        Ok(state) => state,
        Err(e) => {
            error!("Failed to initialize service: {:#}", e);
            process::exit(1);
        }
    };

    if !quiet {
        let banner = render_banner(
            &format!("doctext-server {}", env!("CARGO_PKG_VERSION")),
            &[
                ("listen", format!("http://0.0.0.0:{}", port)),
                ("extract", "GET /extract?url=<pdf|docx url>".to_string()),
                ("fetch", format!(
                    "{}s timeout, {} redirects",
                    config.fetch_timeout.as_secs(),
                    config.max_redirects
                )),
                ("pdf wait", format!("{} ms", config.engine_wait.as_millis())),
            ],
        );
        eprintln!("\n{}\n", banner);
    }

    // Result is observable only through the engine state.
    state.extractor.pdf_engine().spawn_warmup();

    info!("Starting HTTP server...");
    if let Err(e) = serve(&config, state).await {
        error!("Failed to start server: {:#}", e);
        process::exit(1);
    }
}
