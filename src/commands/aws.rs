use anyhow::{anyhow, Result};
use clap::Args;

use crate::{
  commands::{context::current_context, username::resolve_username},
  context::Context,
  manager::{SessionManager, StdinPrompt},
  profile::RoleMapping,
  provider::AwsCliProvider,
  session::FileSessionStore,
  state_dir, utils,
};

/// Input arguments for the `aws` command
#[derive(Args, Debug)]
pub struct Aws {
  /// Context to acquire credentials for, defaults to the current context
  #[arg(short, long)]
  pub context: Option<String>,

  /// Run the trailing arguments as a command in their own right instead of
  /// passing them to the `aws` binary
  #[arg(short, long)]
  pub invoke: bool,

  /// Arguments passed to `aws` (or to the invoked command)
  #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
  pub args: Vec<String>,
}

impl Aws {
  /// Acquire credentials for the context and run the wrapped command with
  /// them in its environment, propagating the child's exit code
  pub fn run(&self) -> Result<i32> {
    let context: Context = match &self.context {
      Some(name) => name.parse()?,
      None => current_context()?,
    };

    let roles = RoleMapping::load()?;
    let provider = AwsCliProvider;
    let prompt = StdinPrompt;
    let mut store = FileSessionStore::new(state_dir()?);
    let username = resolve_username()?;

    let mut manager = SessionManager::new(&provider, &mut store, &prompt, &roles, username);
    let session = manager.acquire(context)?;
    let envs = session.env_vars();

    match self.invoke {
      true => {
        let (cmd, args) = self
          .args
          .split_first()
          .ok_or_else(|| anyhow!("no command given to invoke"))?;
        Ok(utils::run_with_env(cmd, args, &envs)?)
      }
      false => Ok(utils::run_with_env("aws", &self.args, &envs)?),
    }
  }
}
