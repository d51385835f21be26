use std::process;

use clap::Parser;
use govukctl::{error::Error, Cli, Commands};
use tracing::error;
use tracing_subscriber::FmtSubscriber;

fn main() {
  let cli = Cli::parse();
  let subscriber = FmtSubscriber::builder()
    .with_max_level(cli.verbosity.level_filter())
    .without_time()
    .with_writer(std::io::stderr)
    .finish();
  tracing::subscriber::set_global_default(subscriber).expect("Setting default subscriber failed");

  let result = match &cli.command {
    Commands::SetContext(cmd) => cmd.run().map(|()| 0),
    Commands::GetContext(cmd) => cmd.run().map(|()| 0),
    Commands::ListContexts(cmd) => cmd.run().map(|()| 0),
    Commands::SetUsername(cmd) => cmd.run().map(|()| 0),
    Commands::GetUsername(cmd) => cmd.run().map(|()| 0),
    Commands::Ssh(cmd) => cmd.run(),
    Commands::Aws(cmd) => cmd.run(),
  };

  match result {
    Ok(code) => process::exit(code),
    Err(err) => {
      error!("{err:#}");
      process::exit(err.downcast_ref::<Error>().map_or(1, Error::exit_code))
    }
  }
}
