use std::io;

use anyhow::Context;
use clap::Parser;
use courier_app::cli::{Cli, Command};
use courier_app::platform::app::Session;
use courier_app::platform::commands::{self, ProcessRequest};
use courier_app::platform::config::ClientConfig;
use courier_app::platform::{logging, shell};
use courier_logging::courier_info;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = ClientConfig::load(cli.config.as_deref())?;
    config.apply_overrides(&cli.overrides());
    logging::initialize(config.log_destination(), config.log_level(cli.verbose)?);
    courier_info!(
        "courier {} using {}",
        env!("CARGO_PKG_VERSION"),
        config.server_url
    );

    let mut session = Session::from_config(&config).context("cannot start session")?;
    let mut stdout = io::stdout().lock();

    match cli.command {
        Command::Actions => commands::list_actions(&mut session, None, &mut stdout),
        Command::Process {
            actions,
            recursive,
            paths,
        } => {
            let request = ProcessRequest {
                actions,
                paths,
                recursive,
            };
            commands::process(&mut session, &request, None, &mut stdout)
        }
        Command::Shell => {
            session.open(None);
            shell::run_shell(&mut session, io::stdin().lock(), &mut stdout)?;
            Ok(())
        }
    }
}
