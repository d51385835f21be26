use std::io::Write;

use chrono::Utc;
use tracing::{debug, info};

use crate::{
  context::Context,
  error::Error,
  profile::RoleMapping,
  provider::CredentialProvider,
  session::{CredentialSession, SessionSlot, SessionStore},
};

/// Prompts the operator for a current MFA token
///
/// Trait wrapper to support testing with a scripted token
pub trait TokenPrompt {
  /// `expired` indicates a previous identity session existed but lapsed,
  /// which changes the prompt framing
  fn read_token(&self, expired: bool) -> Result<String, Error>;
}

/// Terminal prompt writing to stderr and reading one line from stdin
pub struct StdinPrompt;

impl TokenPrompt for StdinPrompt {
  fn read_token(&self, expired: bool) -> Result<String, Error> {
    let mut stderr = std::io::stderr();
    match expired {
      true => write!(stderr, "Your GDS session has expired. Enter MFA token: ")?,
      false => write!(stderr, "Enter MFA token: ")?,
    }
    stderr.flush()?;

    let mut token = String::new();
    std::io::stdin().read_line(&mut token)?;

    Ok(token.trim().to_string())
  }
}

/// Produces valid environment credentials for a context
///
/// Cached sessions are reused while more than the safety margin remains
/// before expiry; otherwise the manager escalates through the identity
/// session (MFA) and role assumption. At most one MFA prompt and two
/// session writes per invocation
pub struct SessionManager<'a, P, S, T> {
  provider: &'a P,
  store: &'a mut S,
  prompt: &'a T,
  roles: &'a RoleMapping,
  username: String,
}

impl<'a, P, S, T> SessionManager<'a, P, S, T>
where
  P: CredentialProvider,
  S: SessionStore,
  T: TokenPrompt,
{
  pub fn new(provider: &'a P, store: &'a mut S, prompt: &'a T, roles: &'a RoleMapping, username: String) -> Self {
    Self {
      provider,
      store,
      prompt,
      roles,
      username,
    }
  }

  pub fn acquire(&mut self, context: Context) -> Result<CredentialSession, Error> {
    let now = Utc::now();

    let slot = SessionSlot::Environment(context);
    if let Some(session) = self.store.get(slot)? {
      if session.is_valid_at(now) {
        debug!("reusing the cached {context} session");
        return Ok(session);
      }
      debug!("the cached {context} session has expired or is within the safety margin");
    }

    let identity = self.identity_session()?;

    let role_arn = self.roles.role_arn(context)?;
    // audit naming only, a mismatch with the pre-MFA wall clock is benign
    let session_name = format!("{}-{}", self.username, Utc::now().format("%d-%m-%y_%H-%M"));
    info!("assuming {role_arn}");
    let session = self.provider.assume_role(&role_arn, &session_name, &identity)?;
    self.store.put(slot, &session)?;
    info!("refreshed the {context} session");

    Ok(session)
  }

  fn identity_session(&mut self) -> Result<CredentialSession, Error> {
    let cached = self.store.get(SessionSlot::Identity)?;
    if let Some(session) = &cached {
      if session.is_valid_at(Utc::now()) {
        debug!("reusing the cached identity session");
        return Ok(session.clone());
      }
    }

    let mfa_serial = self.roles.mfa_serial()?;
    let token = self.prompt.read_token(cached.is_some())?;
    let session = self.provider.get_session_token(&mfa_serial, &token)?;
    self.store.put(SessionSlot::Identity, &session)?;
    info!("refreshed the identity session");

    Ok(session)
  }
}
