//! Binary entrypoint for the `sortid` CLI.

use std::process::ExitCode;

fn main() -> ExitCode {
    // `.env` may supply SORTID_MACHINE_ID / SORTID_CONFIG / RUST_LOG.
    let _ = dotenvy::dotenv();
    match sortid::run(std::env::args()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
