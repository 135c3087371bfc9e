mod cli;
mod client;
mod models;
mod repl;
mod render;

use std::process::ExitCode;

use client::HTTPClient;
use repl::REPL;

fn main() -> ExitCode {
    let config = cli::parse_config();
    let client = match HTTPClient::new(&config.base_url, config.token.clone()) {
        Ok(client) => client,
        Err(err) => {
            render::error(&err);
            return ExitCode::FAILURE;
        }
    };
    let mut repl = REPL::new(config, client);
    repl.run();
    ExitCode::SUCCESS
}
