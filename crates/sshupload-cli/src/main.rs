// sshupload CLI
//
// Usage: sshupload --host example.com -u deploy -r /var/www/ [-d dist]

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

mod commands;
mod handler;

#[tokio::main]
async fn main() -> ExitCode {
    let args = commands::Args::parse();

    // RUST_LOG=debug sshupload ...  (상태 전이, 호스트키 fingerprint 포함)
    let default_level = if args.verbose { "debug" } else { "info" };
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_level))
        )
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    match handler::run(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("upload failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
