use std::{fmt, fs, path::PathBuf, str::FromStr};

use crate::error::Error;

/// File within the state directory holding the active context name
pub const CONTEXT_FILE: &str = "context";

/// A named deployment environment the operator targets
///
/// The set is closed - a persisted value outside it is a configuration
/// error, not a new context
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Context {
  Ci,
  Integration,
  Staging,
  Production,
  StagingAws,
  ProductionAws,
}

impl Context {
  pub const ALL: [Context; 6] = [
    Context::Ci,
    Context::Integration,
    Context::Staging,
    Context::Production,
    Context::StagingAws,
    Context::ProductionAws,
  ];

  pub fn name(&self) -> &'static str {
    match self {
      Context::Ci => "ci",
      Context::Integration => "integration",
      Context::Staging => "staging",
      Context::Production => "production",
      Context::StagingAws => "staging-aws",
      Context::ProductionAws => "production-aws",
    }
  }

  pub fn names() -> Vec<&'static str> {
    Self::ALL.iter().map(|context| context.name()).collect()
  }

  /// Profile holding the role to assume for this context
  pub fn role_profile(&self) -> String {
    format!("govuk-{self}")
  }

  /// Jump host fronting SSH access into this context
  pub fn jumpbox(&self) -> String {
    match self {
      Context::StagingAws => "jumpbox.staging.govuk.digital".to_string(),
      Context::ProductionAws => "jumpbox.production.govuk.digital".to_string(),
      _ => format!("jumpbox.{self}.publishing.service.gov.uk"),
    }
  }
}

impl fmt::Display for Context {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.name())
  }
}

impl FromStr for Context {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::ALL
      .iter()
      .copied()
      .find(|context| context.name() == s)
      .ok_or_else(|| Error::InvalidContext {
        given: Some(s.to_string()),
      })
  }
}

/// Persistence seam for the active context
///
/// Trait wrapper to support testing with an in-memory store
pub trait ContextStore {
  fn get(&self) -> Result<Option<Context>, Error>;
  fn put(&mut self, context: Context) -> Result<(), Error>;
}

/// Context store backed by a single-line file
pub struct FileContextStore {
  path: PathBuf,
}

impl FileContextStore {
  pub fn new<P: Into<PathBuf>>(path: P) -> Self {
    Self { path: path.into() }
  }
}

impl ContextStore for FileContextStore {
  fn get(&self) -> Result<Option<Context>, Error> {
    if !self.path.exists() {
      return Ok(None);
    }

    let contents = fs::read_to_string(&self.path)?;
    let name = contents.trim();
    match name.is_empty() {
      true => Ok(None),
      false => Ok(Some(name.parse()?)),
    }
  }

  fn put(&mut self, context: Context) -> Result<(), Error> {
    if let Some(parent) = self.path.parent() {
      fs::create_dir_all(parent)?;
    }
    fs::write(&self.path, format!("{context}\n"))?;

    Ok(())
  }
}
