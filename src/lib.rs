pub mod cli;
pub mod commands;
pub mod context;
pub mod error;
pub mod manager;
pub mod profile;
pub mod provider;
pub mod session;
pub mod utils;

use std::{env, path::PathBuf};

use anyhow::{anyhow, Result};
pub use cli::{Cli, Commands};

/// Directory holding the current context, username and cached sessions
///
/// `GOVUKCTL_HOME` overrides the default of `~/.govukctl`
pub fn state_dir() -> Result<PathBuf> {
  if let Ok(dir) = env::var("GOVUKCTL_HOME") {
    return Ok(PathBuf::from(dir));
  }

  dirs::home_dir()
    .map(|home| home.join(".govukctl"))
    .ok_or_else(|| anyhow!("unable to determine the home directory"))
}
