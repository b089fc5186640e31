use crate::statics;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The single username/password pair the console operates with. Stored as
/// plaintext JSON in one file under the user config dir; the service has no
/// token scheme, credentials ride along on every validated call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn is_filled(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }
}

/// Injected session context: one credential slot with get/set/clear, plus
/// the file it persists to. Passed to the screens explicitly rather than
/// read from ambient storage, so logout and tests stay tractable.
#[derive(Debug)]
pub struct Session {
    creds: Option<Credentials>,
    store_path: Option<PathBuf>,
}

impl Session {
    /// Session backed by the default per-user credential file, pre-loaded
    /// with whatever a previous run persisted.
    pub fn load_default() -> Self {
        let store_path = default_store_path();
        let creds = store_path.as_deref().and_then(|path| {
            let bytes = std::fs::read(path).ok()?;
            serde_json::from_slice::<Credentials>(&bytes)
                .ok()
                .filter(Credentials::is_filled)
        });
        Self { creds, store_path }
    }

    /// Detached session for tests: no file behind it.
    pub fn in_memory() -> Self {
        Self {
            creds: None,
            store_path: None,
        }
    }

    pub fn get(&self) -> Option<&Credentials> {
        self.creds.as_ref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.creds.is_some()
    }

    /// Store validated credentials and persist them. Persistence failure is
    /// reported but the in-memory slot is set regardless; the session stays
    /// usable for this run.
    pub fn set(&mut self, creds: Credentials) -> anyhow::Result<()> {
        self.creds = Some(creds.clone());
        let Some(path) = &self.store_path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let body = serde_json::to_string(&creds)?;
        std::fs::write(path, body).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }

    /// Logout: clear the slot and delete the stored file. An in-flight call
    /// that started before the clear may still succeed with the old
    /// credentials; that late result is best-effort and simply ignored.
    pub fn clear(&mut self) {
        self.creds = None;
        if let Some(path) = &self.store_path {
            let _ = std::fs::remove_file(path);
        }
    }
}

fn default_store_path() -> Option<PathBuf> {
    Some(
        dirs::config_dir()?
            .join(statics::CREDS_DIR)
            .join(statics::CREDS_FILE),
    )
}

#[cfg(test)]
mod tests {
    use super::{Credentials, Session};

    #[test]
    fn in_memory_session_set_and_clear() {
        let mut session = Session::in_memory();
        assert!(!session.is_logged_in());

        session
            .set(Credentials {
                username: "admin".to_string(),
                password: "hunter2".to_string(),
            })
            .unwrap();
        assert!(session.is_logged_in());
        assert_eq!(session.get().unwrap().username, "admin");

        session.clear();
        assert!(session.get().is_none());
    }

    #[test]
    fn persisted_credentials_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("creds.json");

        let mut session = Session {
            creds: None,
            store_path: Some(path.clone()),
        };
        session
            .set(Credentials {
                username: "u".to_string(),
                password: "p".to_string(),
            })
            .unwrap();
        assert!(path.exists());

        let raw = std::fs::read_to_string(&path).unwrap();
        let parsed: Credentials = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed.username, "u");

        session.clear();
        assert!(!path.exists());
    }
}
