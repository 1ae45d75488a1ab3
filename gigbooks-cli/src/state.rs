//! Local state paths and the login session.
//!
//! Everything the CLI persists lives under `~/.gigbooks/`: the ledger
//! (`books.json`), the session (`session.json`), credentials
//! (`auth.json`), and chat logs.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub fn ensure_gigbooks_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    let dir = PathBuf::from(home).join(".gigbooks");
    std::fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn ledger_path() -> Result<PathBuf> {
    Ok(ensure_gigbooks_home()?.join("books.json"))
}

/// Who is logged in on this machine and which timezone their day ends in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_timezone() -> String {
    "America/Chicago".to_string()
}

pub fn write_session(session: &Session) -> Result<()> {
    let path = ensure_gigbooks_home()?.join("session.json");
    std::fs::write(&path, serde_json::to_string_pretty(session)?)
        .with_context(|| format!("write {}", path.display()))
}

pub fn read_session() -> Result<Session> {
    let path = ensure_gigbooks_home()?.join("session.json");
    let raw = match std::fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            bail!("not logged in; run: gigbooks register (or gigbooks login)")
        }
        Err(e) => return Err(e).with_context(|| format!("read {}", path.display())),
    };
    serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))
}
