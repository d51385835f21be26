use std::{
  fs::OpenOptions,
  io::Write,
  os::unix::fs::OpenOptionsExt,
  path::Path,
  process::Command,
};

use crate::error::Error;

pub struct CmdResult {
  pub stdout: String,
  pub stderr: String,
  pub status: i32,
}

/// Execute a command, capturing its output and exit status
pub fn cmd_exec(cmd: &str, args: Vec<&str>, envs: &[(&str, String)]) -> Result<CmdResult, Error> {
  let output = Command::new(cmd)
    .args(args)
    .envs(envs.iter().map(|(key, value)| (key, value)))
    .output()?;

  Ok(CmdResult {
    stdout: String::from_utf8_lossy(&output.stdout).to_string(),
    stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    status: output.status.code().unwrap_or(1),
  })
}

/// Run a command with inherited stdio and extra environment, returning its exit code
///
/// Used for wrapped invocations where the child owns the terminal
pub fn run_with_env(cmd: &str, args: &[String], envs: &[(&str, String)]) -> Result<i32, Error> {
  let status = Command::new(cmd)
    .args(args)
    .envs(envs.iter().map(|(key, value)| (key, value)))
    .status()?;

  Ok(status.code().unwrap_or(1))
}

/// Write a file to disk, setting the file mode
///
/// Always truncates - stale content must never survive a refresh
pub fn write_file<P: AsRef<Path>>(contents: &[u8], path: P, mode: u32) -> Result<(), Error> {
  let mut file = OpenOptions::new()
    .write(true)
    .create(true)
    .truncate(true)
    .mode(mode)
    .open(&path)?;
  file.write_all(contents)?;

  Ok(())
}
