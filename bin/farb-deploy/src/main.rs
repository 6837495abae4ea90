//! `farb-deploy`: deploys the Block, Token and Distributor contracts to a single network.
//!
//! Prints `<Name> deployed at <Address>` to stdout for every confirmed contract and exits with a
//! non-zero status on the first failure.

use std::process::ExitCode;

use clap::Parser;

mod cmd;
mod common;

pub use cmd::*;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cmd = DeployCmd::parse();
    if let Err(e) = cmd.log.init() {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }

    match cmd.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
