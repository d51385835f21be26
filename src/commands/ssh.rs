use anyhow::Result;
use clap::Args;
use tracing::info;

use crate::{
  commands::{context::current_context, username::resolve_username},
  utils,
};

/// Input arguments for the `ssh` command
#[derive(Args, Debug)]
pub struct Ssh {
  /// Arguments passed through to ssh
  #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
  pub args: Vec<String>,
}

impl Ssh {
  /// Open a connection routed through the current context's jump host
  pub fn run(&self) -> Result<i32> {
    let context = current_context()?;
    let username = resolve_username()?;
    let target = format!("{}@{}", username, context.jumpbox());
    info!("connecting to {target}");

    let mut argv = vec![target];
    argv.extend(self.args.iter().cloned());

    Ok(utils::run_with_env("ssh", &argv, &[])?)
  }
}
