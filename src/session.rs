// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Who is acting. Commands receive a [`SessionProvider`] instead of reading
//! a global, and pass the owner id explicitly into store calls.

use anyhow::{Result, bail};
use rusqlite::Connection;
use serde::Serialize;
use tracing::info;

use crate::utils::{clear_setting, get_setting, set_setting};

const SESSION_KEY: &str = "session_user";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: String,
}

pub type SessionListener = Box<dyn Fn(Option<&User>)>;

pub trait SessionProvider {
    fn current_user(&self) -> Result<Option<User>>;
    fn on_session_change(&mut self, listener: SessionListener);
}

/// Trimmed user id, rejecting blank input.
fn checked_user_id(user_id: &str) -> Result<&str> {
    let user_id = user_id.trim();
    if user_id.is_empty() {
        bail!("User id must not be empty");
    }
    Ok(user_id)
}

pub fn require_user(session: &dyn SessionProvider) -> Result<User> {
    match session.current_user()? {
        Some(u) => Ok(u),
        None => bail!("Not logged in; run `billfold login <user>` or pass --user"),
    }
}

/// A session pinned for the whole process, e.g. from `--user`.
pub struct StaticSession {
    user: Option<User>,
}

impl StaticSession {
    pub fn new(user_id: &str) -> Self {
        Self {
            user: Some(User {
                id: user_id.to_string(),
            }),
        }
    }

    /// Session for a user id typed on the command line.
    pub fn pinned(user_id: &str) -> Result<Self> {
        Ok(Self::new(checked_user_id(user_id)?))
    }

    pub fn anonymous() -> Self {
        Self { user: None }
    }
}

impl SessionProvider for StaticSession {
    fn current_user(&self) -> Result<Option<User>> {
        Ok(self.user.clone())
    }

    // Never changes, so listeners are never called.
    fn on_session_change(&mut self, _listener: SessionListener) {}
}

/// Session persisted in the `settings` table between runs.
pub struct SettingsSession<'c> {
    conn: &'c Connection,
    listeners: Vec<SessionListener>,
}

impl<'c> SettingsSession<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self {
            conn,
            listeners: Vec::new(),
        }
    }

    pub fn login(&self, user_id: &str) -> Result<User> {
        let user_id = checked_user_id(user_id)?;
        set_setting(self.conn, SESSION_KEY, user_id)?;
        let user = User {
            id: user_id.to_string(),
        };
        info!(user = %user.id, "logged in");
        self.notify(Some(&user));
        Ok(user)
    }

    pub fn logout(&self) -> Result<()> {
        clear_setting(self.conn, SESSION_KEY)?;
        info!("logged out");
        self.notify(None);
        Ok(())
    }

    fn notify(&self, user: Option<&User>) {
        for l in &self.listeners {
            l(user);
        }
    }
}

impl SessionProvider for SettingsSession<'_> {
    fn current_user(&self) -> Result<Option<User>> {
        Ok(get_setting(self.conn, SESSION_KEY)?.map(|id| User { id }))
    }

    fn on_session_change(&mut self, listener: SessionListener) {
        self.listeners.push(listener);
    }
}
