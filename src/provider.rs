use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::{error::Error, profile::IDENTITY_PROFILE, session::CredentialSession, utils};

/// Issues temporary credentials
///
/// Trait seam so tests can simulate the token exchange and role assumption
/// without network access
pub trait CredentialProvider {
  /// Exchange an MFA token for an identity session
  fn get_session_token(&self, mfa_serial: &str, token_code: &str) -> Result<CredentialSession, Error>;

  /// Assume an environment role using a valid identity session
  fn assume_role(
    &self,
    role_arn: &str,
    session_name: &str,
    identity: &CredentialSession,
  ) -> Result<CredentialSession, Error>;
}

/// Response shape shared by `sts get-session-token` and `sts assume-role`
#[derive(Debug, Deserialize)]
struct StsResponse {
  #[serde(rename = "Credentials")]
  credentials: StsCredentials,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct StsCredentials {
  access_key_id: String,
  secret_access_key: String,
  session_token: String,
  expiration: String,
}

/// Credential provider backed by the `aws` CLI
pub struct AwsCliProvider;

impl AwsCliProvider {
  fn parse_credentials(stdout: &str) -> Result<CredentialSession, Error> {
    let response: StsResponse = serde_json::from_str(stdout).map_err(|err| Error::CredentialExchangeFailed {
      status: 1,
      stderr: format!("unexpected STS response: {err}"),
    })?;

    let expiration = DateTime::parse_from_rfc3339(&response.credentials.expiration)
      .map_err(|err| Error::CredentialExchangeFailed {
        status: 1,
        stderr: format!("unexpected STS expiration timestamp: {err}"),
      })?
      .with_timezone(&Utc);

    Ok(CredentialSession {
      access_key_id: response.credentials.access_key_id,
      secret_access_key: response.credentials.secret_access_key,
      session_token: response.credentials.session_token,
      expiration,
    })
  }

  fn check(result: utils::CmdResult) -> Result<CredentialSession, Error> {
    match result.status {
      0 => Self::parse_credentials(&result.stdout),
      status => Err(Error::CredentialExchangeFailed {
        status,
        stderr: result.stderr,
      }),
    }
  }
}

impl CredentialProvider for AwsCliProvider {
  fn get_session_token(&self, mfa_serial: &str, token_code: &str) -> Result<CredentialSession, Error> {
    debug!("requesting a session token for {mfa_serial}");
    let result = utils::cmd_exec(
      "aws",
      vec![
        "--profile",
        IDENTITY_PROFILE,
        "sts",
        "get-session-token",
        "--serial-number",
        mfa_serial,
        "--token-code",
        token_code,
      ],
      &[],
    )?;

    Self::check(result)
  }

  fn assume_role(
    &self,
    role_arn: &str,
    session_name: &str,
    identity: &CredentialSession,
  ) -> Result<CredentialSession, Error> {
    debug!("assuming {role_arn} as {session_name}");
    // the identity session is what authorises the assumption
    let envs = identity.env_vars();
    let result = utils::cmd_exec(
      "aws",
      vec![
        "sts",
        "assume-role",
        "--role-arn",
        role_arn,
        "--role-session-name",
        session_name,
      ],
      &envs,
    )?;

    Self::check(result)
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  const RESPONSE: &str = r#"{
    "Credentials": {
      "AccessKeyId": "ASIAXXEXAMPLE",
      "SecretAccessKey": "wJalrXUtnFEMI/K7MDENG",
      "SessionToken": "FwoGZXIvYXdzEBY",
      "Expiration": "2026-08-25T20:00:00+00:00"
    }
  }"#;

  #[test]
  fn it_parses_the_sts_credentials_blob() {
    let session = AwsCliProvider::parse_credentials(RESPONSE).unwrap();
    assert_eq!(session.access_key_id, "ASIAXXEXAMPLE");
    assert_eq!(session.secret_access_key, "wJalrXUtnFEMI/K7MDENG");
    assert_eq!(session.session_token, "FwoGZXIvYXdzEBY");
    assert_eq!(session.expiration, Utc.with_ymd_and_hms(2026, 8, 25, 20, 0, 0).unwrap());
  }

  #[test]
  fn it_parses_a_zulu_expiration() {
    let response = RESPONSE.replace("2026-08-25T20:00:00+00:00", "2026-08-25T20:00:00Z");
    let session = AwsCliProvider::parse_credentials(&response).unwrap();
    assert_eq!(session.expiration, Utc.with_ymd_and_hms(2026, 8, 25, 20, 0, 0).unwrap());
  }

  #[test]
  fn it_rejects_a_malformed_response() {
    let err = AwsCliProvider::parse_credentials("not json").unwrap_err();
    assert!(matches!(err, Error::CredentialExchangeFailed { status: 1, .. }));
  }

  #[test]
  fn it_surfaces_the_provider_exit_status() {
    let result = utils::CmdResult {
      stdout: String::new(),
      stderr: "An error occurred (InvalidClientTokenId)".to_string(),
      status: 254,
    };

    let err = AwsCliProvider::check(result).unwrap_err();
    match err {
      Error::CredentialExchangeFailed { status, stderr } => {
        assert_eq!(status, 254);
        assert!(stderr.contains("InvalidClientTokenId"));
      }
      other => panic!("unexpected error: {other}"),
    }
  }
}
