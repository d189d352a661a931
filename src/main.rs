// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Discourse Bridge CLI
//!
//! One-shot mode reads a single request description from stdin and writes
//! a single response description to stdout. Serve mode keeps the session
//! alive across newline-delimited requests.

use std::env;
use std::io::Write;
use std::process::ExitCode;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use discourse_bridge::{BridgeConfig, BridgeResponse, Error, Executor, LoginFailurePolicy};

/// Written when a response cannot be serialized at all
const FALLBACK_RESPONSE: &str =
    r#"{"success": false, "error": "Failed to serialize response", "error_type": "SerializationError"}"#;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // stdout carries the protocol, so diagnostics go to stderr
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("discourse_bridge=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let (command, config) = match parse_args(&args) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("{}", e);
            print_usage();
            return ExitCode::from(1);
        }
    };

    match command.as_deref() {
        None | Some("request") => run_once(&Executor::new(config)).await,
        Some("serve") => match serve(&Executor::new(config)).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                error!(error = %format!("{:#}", e), "Serve loop stopped");
                ExitCode::from(1)
            }
        },
        Some("--help") | Some("-h") | Some("help") => {
            print_usage();
            ExitCode::SUCCESS
        }
        Some("--version") | Some("-v") | Some("version") => {
            println!("discourse-bridge {}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        Some(cmd) => {
            eprintln!("Unknown command: {}", cmd);
            print_usage();
            ExitCode::from(1)
        }
    }
}

/// Split arguments into the command and the bridge configuration
fn parse_args(args: &[String]) -> Result<(Option<String>, BridgeConfig), String> {
    let mut command = None;
    let mut config = BridgeConfig::default();
    let mut iter = args.iter().skip(1);

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--strict-login" => config = config.login_failure(LoginFailurePolicy::Abort),
            "--lenient-login" => config = config.login_failure(LoginFailurePolicy::Continue),
            "--insecure" => config = config.ignore_https_errors(true),
            "--proxy" => {
                let proxy = iter.next().ok_or("Usage: --proxy <url>")?;
                config = config.proxy(proxy.as_str());
            }
            "--user-agent" => {
                let user_agent = iter.next().ok_or("Usage: --user-agent <ua>")?;
                config = config.user_agent(user_agent.as_str());
            }
            "--help" | "-h" | "--version" | "-v" => command = Some(arg.clone()),
            flag if flag.starts_with("--") => return Err(format!("Unknown option: {}", flag)),
            cmd if command.is_none() => command = Some(cmd.to_string()),
            extra => return Err(format!("Unexpected argument: {}", extra)),
        }
    }

    Ok((command, config))
}

fn print_usage() {
    eprintln!(
        r#"Discourse Bridge - Authenticated Discourse API calls over stdin/stdout

USAGE:
    discourse-bridge [COMMAND] [OPTIONS]

COMMANDS:
    request         Read one JSON request from stdin, write one JSON response (default)
    serve           Read newline-delimited JSON requests until EOF, one session throughout
    help            Show this help message
    version         Show version information

OPTIONS:
    --strict-login          A failed login aborts the request
    --lenient-login         A failed login is logged and the request is sent anyway (default)
    --proxy <url>           Route all traffic through a proxy
    --insecure              Accept invalid TLS certificates
    --user-agent <ua>       Override the User-Agent header

EXAMPLES:
    echo '{{"url": "https://forum.example.com/latest.json", "method": "GET"}}' | discourse-bridge
    discourse-bridge serve --strict-login < requests.ndjson

Set RUST_LOG (e.g. RUST_LOG=discourse_bridge=debug) for more diagnostics on stderr.
"#
    );
}

fn render(response: &BridgeResponse) -> String {
    response.to_json().unwrap_or_else(|e| {
        error!(error = %e, "Failed to serialize response");
        FALLBACK_RESPONSE.to_string()
    })
}

async fn run_once(executor: &Executor) -> ExitCode {
    let mut input = String::new();
    let response = match tokio::io::stdin().read_to_string(&mut input).await {
        Ok(_) => executor.handle_json(&input).await,
        Err(e) => BridgeResponse::failure(&Error::input(format!("Failed to read stdin: {}", e))),
    };

    let mut stdout = std::io::stdout().lock();
    if let Err(e) = stdout
        .write_all(render(&response).as_bytes())
        .and_then(|_| stdout.flush())
    {
        error!(error = %e, "Failed to write response");
        return ExitCode::from(1);
    }

    ExitCode::from(response.exit_code())
}

async fn serve(executor: &Executor) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).split(b'\n');
    let mut stdout = tokio::io::stdout();

    info!("Serving newline-delimited requests on stdin");

    while let Some(line) = lines
        .next_segment()
        .await
        .context("Failed to read request line")?
    {
        let response = match String::from_utf8(line) {
            Ok(line) if line.trim().is_empty() => continue,
            Ok(line) => executor.handle_json(line.trim_end_matches('\r')).await,
            Err(_) => BridgeResponse::failure(&Error::input("Request line is not valid UTF-8")),
        };

        let mut out = render(&response);
        out.push('\n');
        stdout
            .write_all(out.as_bytes())
            .await
            .context("Failed to write response")?;
        stdout.flush().await.context("Failed to flush stdout")?;
    }

    info!(
        sessions = executor.registry().sessions_created(),
        "Input closed, shutting down"
    );
    Ok(())
}
