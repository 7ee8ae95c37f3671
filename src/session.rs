//! Signed-in identity.
//!
//! The session is an opaque record of who is acting. `None` means nobody is
//! signed in; mutations ask for a `&Session` and so cannot be reached without one.
//! How the identity was proven is outside this crate.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const SESSION_FILE_NAME: &str = "session.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    pub signed_in_at: DateTime<Utc>,
}

impl Session {
    pub fn new(user_id: impl Into<String>, display_name: Option<String>) -> Self {
        Session {
            user_id: user_id.into(),
            display_name,
            signed_in_at: Utc::now(),
        }
    }

    /// The name recorded as `created_by` on new tasks.
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.user_id)
    }

    /// Load the session stored under `home`, if any.
    pub fn load(home: &Path) -> Result<Option<Session>> {
        let path = home.join(SESSION_FILE_NAME);
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
        Ok(Some(serde_json::from_str(&raw)?))
    }

    pub fn save(&self, home: &Path) -> Result<()> {
        fs::create_dir_all(home).map_err(|e| Error::io(home, e))?;
        let path = home.join(SESSION_FILE_NAME);
        let data = serde_json::to_string_pretty(self)?;
        fs::write(&path, data).map_err(|e| Error::io(&path, e))?;
        tracing::info!(user = %self.user_id, "signed in");
        Ok(())
    }

    /// Remove the stored session. Returns whether one existed.
    pub fn clear(home: &Path) -> Result<bool> {
        let path = home.join(SESSION_FILE_NAME);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path).map_err(|e| Error::io(&path, e))?;
        tracing::info!("signed out");
        Ok(true)
    }
}

/// Turn an optional session into the identity a mutation needs.
pub fn require(session: Option<&Session>) -> Result<&Session> {
    session.ok_or(Error::Unauthenticated)
}
