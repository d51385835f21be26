use clap::{Parser, Subcommand, ValueEnum};
use tracing::level_filters::LevelFilter;

use crate::commands;

/// Styles for CLI
fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .literal(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::BrightCyan))),
    )
    .usage(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
}

/// Diagnostic output level
///
/// `silent` suppresses everything, including error messages, for scripting use
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Verbosity {
  Silent,
  Info,
  Debug,
}

impl Verbosity {
  pub fn level_filter(&self) -> LevelFilter {
    match self {
      Verbosity::Silent => LevelFilter::OFF,
      Verbosity::Info => LevelFilter::INFO,
      Verbosity::Debug => LevelFilter::DEBUG,
    }
  }
}

#[derive(Debug, Parser)]
#[command(author, about, version)]
#[command(propagate_version = true)]
#[command(styles=get_styles())]
pub struct Cli {
  #[command(subcommand)]
  pub command: Commands,

  /// Diagnostic verbosity
  #[arg(long, global = true, value_enum, env = "GOVUKCTL_VERBOSITY", default_value = "info")]
  pub verbosity: Verbosity,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
  /// Set the current context
  SetContext(commands::context::SetContext),

  /// Print the current context
  GetContext(commands::context::GetContext),

  /// List the available contexts, marking the active one
  ListContexts(commands::context::ListContexts),

  /// Store the username used for SSH logins and role session names
  SetUsername(commands::username::SetUsername),

  /// Print the stored username
  GetUsername(commands::username::GetUsername),

  /// SSH to the current context via its jump host
  Ssh(commands::ssh::Ssh),

  /// Run a command with temporary credentials for a context
  ///
  /// Reuses cached sessions while they have more than five minutes left,
  /// otherwise refreshes them through MFA and role assumption first
  Aws(commands::aws::Aws),
}
