use std::{
  env,
  path::{Path, PathBuf},
};

use ini::Ini;

use crate::{context::Context, error::Error};

/// Profile holding the operator's MFA-backed identity
pub const IDENTITY_PROFILE: &str = "gds";

/// The AWS shared config file path
///
/// Respects the AWS_CONFIG_FILE environment variable if set
fn aws_config_path() -> Option<PathBuf> {
  if let Ok(path) = env::var("AWS_CONFIG_FILE") {
    return Some(PathBuf::from(path));
  }

  dirs::home_dir().map(|home| home.join(".aws").join("config"))
}

/// Read-only lookup of MFA devices and role ARNs in the AWS shared config
///
/// The mapping follows the profile naming convention: `gds` for the
/// identity profile, `govuk-<context>` for each environment role
pub struct RoleMapping {
  ini: Ini,
}

impl RoleMapping {
  pub fn load() -> Result<Self, Error> {
    let path =
      aws_config_path().ok_or_else(|| Error::Config("unable to determine the AWS config file path".to_string()))?;
    Self::load_from(path)
  }

  pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
    let ini = Ini::load_from_file(path.as_ref()).map_err(|err| Error::Config(err.to_string()))?;

    Ok(Self { ini })
  }

  pub fn parse(contents: &str) -> Result<Self, Error> {
    let ini = Ini::load_from_str(contents).map_err(|err| Error::Config(err.to_string()))?;

    Ok(Self { ini })
  }

  /// MFA device identifier for the identity profile
  pub fn mfa_serial(&self) -> Result<String, Error> {
    self.profile_key(IDENTITY_PROFILE, "mfa_serial")
  }

  /// Role to assume for the given context
  pub fn role_arn(&self, context: Context) -> Result<String, Error> {
    self.profile_key(&context.role_profile(), "role_arn")
  }

  fn profile_key(&self, profile: &str, key: &str) -> Result<String, Error> {
    // `aws configure` writes sections as `[profile <name>]`; bare section
    // names are accepted too
    let section = self
      .ini
      .section(Some(format!("profile {profile}")))
      .or_else(|| self.ini.section(Some(profile)))
      .ok_or_else(|| Error::Config(format!("profile '{profile}' not found in the AWS config file")))?;

    section
      .get(key)
      .map(str::to_string)
      .ok_or_else(|| Error::Config(format!("'{key}' is not set for profile '{profile}'")))
  }
}
