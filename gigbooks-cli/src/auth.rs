//! Stored model credentials for the assistant fallback.
//!
//! Keys are pasted once and kept in `~/.gigbooks/auth.json`. Prefix
//! checks catch the common paste mistakes (wrong key, extra text).

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::state::ensure_gigbooks_home;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anthropic_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openai_api_key: Option<String>,
}

impl Credentials {
    fn path() -> Result<PathBuf> {
        Ok(ensure_gigbooks_home()?.join("auth.json"))
    }

    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw)
                .with_context(|| format!("parse {}", path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e).with_context(|| format!("read {}", path.display())),
        }
    }

    pub fn store(&self) -> Result<()> {
        let path = Self::path()?;
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, raw).with_context(|| format!("write {}", path.display()))
    }
}

fn read_secret(label: &str) -> Result<String> {
    print!("{label}: ");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

pub fn store_anthropic_token() -> Result<()> {
    let token = read_secret("Paste Anthropic token (sk-ant-...)")?;
    if !token.starts_with("sk-ant-") {
        bail!("that doesn't look like an Anthropic token (expected sk-ant- prefix)");
    }
    let mut creds = Credentials::load()?;
    creds.anthropic_token = Some(token);
    creds.store()?;
    println!("Anthropic token saved to ~/.gigbooks/auth.json");
    Ok(())
}

pub fn store_openai_key() -> Result<()> {
    let key = read_secret("Paste OpenAI API key (sk-...)")?;
    if !key.starts_with("sk-") {
        bail!("that doesn't look like an OpenAI API key (expected sk- prefix)");
    }
    let mut creds = Credentials::load()?;
    creds.openai_api_key = Some(key);
    creds.store()?;
    println!("OpenAI API key saved to ~/.gigbooks/auth.json");
    Ok(())
}
