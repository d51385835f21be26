use std::{fs, path::PathBuf};

use chrono::{DateTime, Duration, Utc};

use crate::{context::Context, error::Error, utils};

/// Remaining lifetime below which a session is treated as already expired
///
/// Leaves enough headroom for the wrapped command to finish before the
/// credentials actually lapse
pub const EXPIRY_MARGIN_SECS: i64 = 300;

/// A set of temporary credentials
///
/// Identity and environment sessions share this shape; the slot they are
/// persisted in is what distinguishes them
#[derive(Clone, Debug, PartialEq)]
pub struct CredentialSession {
  pub access_key_id: String,
  pub secret_access_key: String,
  pub session_token: String,
  pub expiration: DateTime<Utc>,
}

impl CredentialSession {
  /// Whether the session can still be used at `now`
  ///
  /// Requires all fields to be populated and more than the safety margin
  /// remaining before expiry. Wall-clock comparison; operator clock skew
  /// is an accepted risk
  pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
    !self.access_key_id.is_empty()
      && !self.secret_access_key.is_empty()
      && !self.session_token.is_empty()
      && self.expiration - now > Duration::seconds(EXPIRY_MARGIN_SECS)
  }

  /// The four credential fields as environment variables for a wrapped command
  pub fn env_vars(&self) -> Vec<(&'static str, String)> {
    vec![
      ("AWS_ACCESS_KEY_ID", self.access_key_id.clone()),
      ("AWS_SECRET_ACCESS_KEY", self.secret_access_key.clone()),
      ("AWS_SESSION_TOKEN", self.session_token.clone()),
      ("AWS_EXPIRATION", self.expiration.to_rfc3339()),
    ]
  }

  /// Render the session as a sourceable script of `export` assignments
  pub fn to_exports(&self) -> String {
    self
      .env_vars()
      .iter()
      .map(|(key, value)| format!("export {key}={value}\n"))
      .collect()
  }

  /// Parse a session back out of its `export` script form
  ///
  /// Lines that are not one of the four expected assignments are ignored;
  /// a missing assignment makes the whole file unusable
  pub fn from_exports(contents: &str) -> Option<Self> {
    let mut access_key_id = None;
    let mut secret_access_key = None;
    let mut session_token = None;
    let mut expiration = None;

    for line in contents.lines() {
      let Some(assignment) = line.strip_prefix("export ") else {
        continue;
      };
      let Some((key, value)) = assignment.split_once('=') else {
        continue;
      };
      match key {
        "AWS_ACCESS_KEY_ID" => access_key_id = Some(value.to_string()),
        "AWS_SECRET_ACCESS_KEY" => secret_access_key = Some(value.to_string()),
        "AWS_SESSION_TOKEN" => session_token = Some(value.to_string()),
        "AWS_EXPIRATION" => {
          expiration = DateTime::parse_from_rfc3339(value)
            .ok()
            .map(|timestamp| timestamp.with_timezone(&Utc))
        }
        _ => {}
      }
    }

    Some(Self {
      access_key_id: access_key_id?,
      secret_access_key: secret_access_key?,
      session_token: session_token?,
      expiration: expiration?,
    })
  }
}

/// Where a session is persisted
///
/// The identity session has a single slot; environment sessions have one
/// slot per context
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SessionSlot {
  Identity,
  Environment(Context),
}

impl SessionSlot {
  fn file_name(&self) -> String {
    match self {
      SessionSlot::Identity => "session-gds.sh".to_string(),
      SessionSlot::Environment(context) => format!("session-govuk-{context}.sh"),
    }
  }
}

/// Persistence seam for cached sessions
///
/// Trait wrapper to support testing with an in-memory store
pub trait SessionStore {
  fn get(&self, slot: SessionSlot) -> Result<Option<CredentialSession>, Error>;
  fn put(&mut self, slot: SessionSlot, session: &CredentialSession) -> Result<(), Error>;
}

/// Session store backed by small export scripts in the state directory
pub struct FileSessionStore {
  dir: PathBuf,
}

impl FileSessionStore {
  pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
    Self { dir: dir.into() }
  }

  fn path(&self, slot: SessionSlot) -> PathBuf {
    self.dir.join(slot.file_name())
  }
}

impl SessionStore for FileSessionStore {
  fn get(&self, slot: SessionSlot) -> Result<Option<CredentialSession>, Error> {
    let path = self.path(slot);
    if !path.exists() {
      return Ok(None);
    }

    // an incomplete or unreadable file is bypassed, not deleted
    let contents = fs::read_to_string(&path)?;
    Ok(CredentialSession::from_exports(&contents))
  }

  fn put(&mut self, slot: SessionSlot, session: &CredentialSession) -> Result<(), Error> {
    fs::create_dir_all(&self.dir)?;
    utils::write_file(session.to_exports().as_bytes(), self.path(slot), 0o600)
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;
  use rstest::rstest;
  use tempfile::TempDir;

  use super::*;

  fn session(expiration: DateTime<Utc>) -> CredentialSession {
    CredentialSession {
      access_key_id: "ASIAXXEXAMPLE".to_string(),
      secret_access_key: "wJalrXUtnFEMI/K7MDENG".to_string(),
      session_token: "FwoGZXIvYXdzEBY".to_string(),
      expiration,
    }
  }

  #[rstest]
  #[case(3600, true)]
  #[case(301, true)]
  #[case(300, false)]
  #[case(200, false)]
  #[case(0, false)]
  #[case(-60, false)]
  fn it_applies_the_expiry_margin(#[case] remaining_secs: i64, #[case] valid: bool) {
    let now = Utc::now();
    let session = session(now + Duration::seconds(remaining_secs));
    assert_eq!(session.is_valid_at(now), valid);
  }

  #[test]
  fn it_treats_an_empty_field_as_invalid() {
    let now = Utc::now();
    let mut session = session(now + Duration::seconds(3600));
    session.session_token = String::new();
    assert!(!session.is_valid_at(now));
  }

  #[test]
  fn it_round_trips_the_export_format() {
    let expiration = Utc.with_ymd_and_hms(2026, 8, 25, 12, 0, 0).unwrap();
    let session = session(expiration);
    let parsed = CredentialSession::from_exports(&session.to_exports()).unwrap();
    assert_eq!(parsed, session);
  }

  #[test]
  fn it_parses_exports_in_any_order_and_skips_other_lines() {
    let contents = "# written by govukctl\n\
                    export AWS_EXPIRATION=2026-08-25T12:00:00+00:00\n\
                    export AWS_SESSION_TOKEN=FwoGZXIvYXdzEBY\n\
                    unset SOMETHING_ELSE\n\
                    export AWS_SECRET_ACCESS_KEY=wJalrXUtnFEMI/K7MDENG\n\
                    export AWS_ACCESS_KEY_ID=ASIAXXEXAMPLE\n";

    let parsed = CredentialSession::from_exports(contents).unwrap();
    assert_eq!(parsed.access_key_id, "ASIAXXEXAMPLE");
    assert_eq!(parsed.expiration, Utc.with_ymd_and_hms(2026, 8, 25, 12, 0, 0).unwrap());
  }

  #[rstest]
  #[case("export AWS_ACCESS_KEY_ID=a\nexport AWS_SECRET_ACCESS_KEY=b\nexport AWS_SESSION_TOKEN=c\n")]
  #[case("export AWS_ACCESS_KEY_ID=a\nexport AWS_EXPIRATION=2026-08-25T12:00:00Z\n")]
  #[case("export AWS_ACCESS_KEY_ID=a\nexport AWS_SECRET_ACCESS_KEY=b\nexport AWS_SESSION_TOKEN=c\nexport AWS_EXPIRATION=not-a-timestamp\n")]
  #[case("")]
  fn it_rejects_incomplete_export_files(#[case] contents: &str) {
    assert_eq!(CredentialSession::from_exports(contents), None);
  }

  #[test]
  fn it_persists_sessions_to_per_slot_files() {
    let dir = TempDir::new().unwrap();
    let mut store = FileSessionStore::new(dir.path());
    let identity = session(Utc.with_ymd_and_hms(2026, 8, 25, 12, 0, 0).unwrap());
    let environment = session(Utc.with_ymd_and_hms(2026, 8, 25, 13, 0, 0).unwrap());

    store.put(SessionSlot::Identity, &identity).unwrap();
    store
      .put(SessionSlot::Environment(Context::Staging), &environment)
      .unwrap();

    assert!(dir.path().join("session-gds.sh").exists());
    assert!(dir.path().join("session-govuk-staging.sh").exists());
    assert_eq!(store.get(SessionSlot::Identity).unwrap(), Some(identity));
    assert_eq!(
      store.get(SessionSlot::Environment(Context::Staging)).unwrap(),
      Some(environment)
    );
    assert_eq!(store.get(SessionSlot::Environment(Context::Ci)).unwrap(), None);
  }

  #[test]
  fn it_bypasses_unparseable_session_files() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("session-gds.sh"), "not a session\n").unwrap();

    let store = FileSessionStore::new(dir.path());
    assert_eq!(store.get(SessionSlot::Identity).unwrap(), None);
  }

  #[test]
  fn it_fully_overwrites_a_slot_on_refresh() {
    let dir = TempDir::new().unwrap();
    let mut store = FileSessionStore::new(dir.path());

    let mut stale = session(Utc.with_ymd_and_hms(2026, 8, 25, 12, 0, 0).unwrap());
    stale.session_token = "a-very-long-stale-token-that-should-not-survive".to_string();
    store.put(SessionSlot::Identity, &stale).unwrap();

    let fresh = session(Utc.with_ymd_and_hms(2026, 8, 25, 20, 0, 0).unwrap());
    store.put(SessionSlot::Identity, &fresh).unwrap();

    let contents = fs::read_to_string(dir.path().join("session-gds.sh")).unwrap();
    assert!(!contents.contains("stale-token"));
    assert_eq!(store.get(SessionSlot::Identity).unwrap(), Some(fresh));
  }

  #[cfg(unix)]
  #[test]
  fn it_restricts_session_file_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let mut store = FileSessionStore::new(dir.path());
    let session = session(Utc.with_ymd_and_hms(2026, 8, 25, 12, 0, 0).unwrap());
    store.put(SessionSlot::Identity, &session).unwrap();

    let mode = fs::metadata(dir.path().join("session-gds.sh"))
      .unwrap()
      .permissions()
      .mode();
    assert_eq!(mode & 0o777, 0o600);
  }
}
