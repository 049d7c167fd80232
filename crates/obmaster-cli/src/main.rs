use clap::Parser;
use obmaster::{Client, Config};
use std::io;
use std::process::ExitCode;

mod app;
mod cli;
mod display;
mod session;
#[cfg(test)]
mod test_support;

use cli::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    obmaster_observability::init(cli.verbose);

    let stdin = io::stdin();
    let stdout = io::stdout();
    let code = app::run(
        Config::from_env(),
        Client::from_config,
        cli.command,
        stdin.lock(),
        &mut stdout.lock(),
        &mut io::stderr(),
    )
    .await?;
    Ok(ExitCode::from(code))
}
