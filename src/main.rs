use std::process::ExitCode;

use clap::Parser;
use hbnb_portal::cli::{Args, init_logging, open_portal, run};
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    init_logging(&args.log_format);

    let portal = match open_portal(&args) {
        Ok(portal) => portal,
        Err(e) => {
            error!(error = %e, "Failed to start");
            return ExitCode::FAILURE;
        }
    };

    run(&portal, &args.command).await
}
