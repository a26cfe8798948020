use std::process::ExitCode;

use clap::Parser;
use search_index_explorer::cli::{Cli, is_broken_pipe, run};
use search_index_explorer::utils::logging::init_logging;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match run(cli) {
        Ok(code) => code,
        // Reader closed early, as with `| head`
        Err(e) if is_broken_pipe(&e) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
