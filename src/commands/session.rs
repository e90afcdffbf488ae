// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::invoices::id_arg;
use crate::session::{SessionProvider, SettingsSession};
use anyhow::Result;

pub fn login(session: &SettingsSession<'_>, sub: &clap::ArgMatches) -> Result<()> {
    let user = session.login(id_arg(sub, "user-id")?)?;
    println!("Logged in as {}", user.id);
    Ok(())
}

pub fn logout(session: &SettingsSession<'_>) -> Result<()> {
    session.logout()?;
    println!("Logged out");
    Ok(())
}

pub fn whoami(session: &dyn SessionProvider) -> Result<()> {
    match session.current_user()? {
        Some(u) => println!("{}", u.id),
        None => println!("Not logged in"),
    }
    Ok(())
}
