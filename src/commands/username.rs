use std::{env, fs};

use anyhow::Result;
use clap::Args;
use tracing::info;

use crate::{error::Error, state_dir};

/// File within the state directory holding the operator username
pub const USERNAME_FILE: &str = "username";

/// The stored username, falling back to $USER
pub fn resolve_username() -> Result<String> {
  let path = state_dir()?.join(USERNAME_FILE);
  if path.exists() {
    let contents = fs::read_to_string(&path)?;
    let username = contents.trim();
    if !username.is_empty() {
      return Ok(username.to_string());
    }
  }

  Ok(env::var("USER").map_err(|_| Error::MissingUsername)?)
}

/// Input arguments for the `set-username` command
#[derive(Args, Debug)]
pub struct SetUsername {
  /// Username used for SSH logins and role session names
  pub username: Option<String>,
}

impl SetUsername {
  pub fn run(&self) -> Result<()> {
    let username = self.username.as_deref().ok_or(Error::MissingUsername)?;

    let dir = state_dir()?;
    fs::create_dir_all(&dir)?;
    fs::write(dir.join(USERNAME_FILE), format!("{username}\n"))?;
    info!("username set to {username}");

    Ok(())
  }
}

/// Input arguments for the `get-username` command
#[derive(Args, Debug)]
pub struct GetUsername {}

impl GetUsername {
  pub fn run(&self) -> Result<()> {
    let username = resolve_username()?;
    println!("{username}");

    Ok(())
  }
}
