//! Fallback generator: one chat completion against Anthropic or OpenAI.
//!
//! Used only when the deterministic router has no answer. One request per
//! prompt, at most once; no retries, no streaming.

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use serde_json::json;

use gigbooks_core::types::UserProfile;

use crate::auth::Credentials;

const ANTHROPIC_MODEL: &str = "claude-3-5-sonnet-latest";
const OPENAI_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub role: &'static str,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user", content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: "assistant", content: content.into() }
    }
}

/// A configured model endpoint, picked from stored credentials.
/// Anthropic wins when both are present.
#[derive(Debug, Clone)]
pub enum Fallback {
    Anthropic { token: String, model: String },
    OpenAI { key: String, model: String },
}

impl Fallback {
    pub fn from_saved() -> Result<Option<Self>> {
        let creds = Credentials::load()?;
        if let Some(token) = creds.anthropic_token {
            return Ok(Some(Fallback::Anthropic {
                token,
                model: ANTHROPIC_MODEL.to_string(),
            }));
        }
        if let Some(key) = creds.openai_api_key {
            return Ok(Some(Fallback::OpenAI {
                key,
                model: OPENAI_MODEL.to_string(),
            }));
        }
        Ok(None)
    }

    /// Blocking completion call. The binary runs under `#[tokio::main]`,
    /// so when a runtime is already current we must block in place on its
    /// handle instead of nesting a second runtime (which panics).
    pub fn complete(&self, system: &str, turns: &[ChatTurn]) -> Result<String> {
        let reply = match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                tokio::task::block_in_place(|| handle.block_on(self.send(system, turns)))?
            }
            Err(_) => tokio::runtime::Runtime::new()
                .context("start runtime for model call")?
                .block_on(self.send(system, turns))?,
        };
        if reply.is_empty() {
            bail!("model returned an empty reply");
        }
        Ok(reply)
    }

    async fn send(&self, system: &str, turns: &[ChatTurn]) -> Result<String> {
        match self {
            Fallback::Anthropic { token, model } => {
                anthropic_message(token, model, system, turns).await
            }
            Fallback::OpenAI { key, model } => {
                openai_completion(key, model, system, turns).await
            }
        }
    }
}

/// Fixed scope instruction for the fallback generator. The assistant
/// stays on business/freelance topics and declines everything else.
pub fn assistant_system_prompt(user: Option<&UserProfile>) -> String {
    let mut s = String::from(
        "You are the gigbooks assistant, helping a freelancer run their business.\n\
Stay on topic: invoicing, expenses, clients, cash flow, and freelance work.\n\
You may draft short business writing (reminder emails, follow-ups, apologies) when asked.\n\
Be concise and practical.\n\
If a request is outside business or freelance topics, reply exactly:\n\
\"I can only help with your business and freelance work. Try asking about invoices, expenses, or income.\"",
    );
    if let Some(u) = user {
        s.push_str(&format!(
            "\nThe user is {} and runs \"{}\".",
            u.fullname, u.business
        ));
    }
    s
}

fn turn_objects(turns: &[ChatTurn]) -> Vec<serde_json::Value> {
    turns
        .iter()
        .map(|t| json!({ "role": t.role, "content": t.content }))
        .collect()
}

async fn anthropic_message(
    token: &str,
    model: &str,
    system: &str,
    turns: &[ChatTurn],
) -> Result<String> {
    #[derive(Deserialize)]
    struct Reply {
        content: Vec<ReplyBlock>,
    }

    #[derive(Deserialize)]
    struct ReplyBlock {
        #[serde(rename = "type")]
        kind: String,
        #[serde(default)]
        text: String,
    }

    let body = json!({
        "model": model,
        "max_tokens": 450,
        "system": system,
        "messages": turn_objects(turns),
    });

    let resp = reqwest::Client::new()
        .post("https://api.anthropic.com/v1/messages")
        .bearer_auth(token)
        .header("anthropic-version", "2023-06-01")
        .json(&body)
        .send()
        .await
        .context("calling anthropic")?;

    let status = resp.status();
    if !status.is_success() {
        bail!(
            "anthropic returned {status}: {}",
            resp.text().await.unwrap_or_default()
        );
    }

    let reply: Reply = resp.json().await.context("decoding anthropic reply")?;
    let text: String = reply
        .content
        .iter()
        .filter(|b| b.kind == "text")
        .map(|b| b.text.as_str())
        .collect();
    Ok(text.trim().to_string())
}

async fn openai_completion(
    key: &str,
    model: &str,
    system: &str,
    turns: &[ChatTurn],
) -> Result<String> {
    #[derive(Deserialize)]
    struct Reply {
        choices: Vec<ReplyChoice>,
    }

    #[derive(Deserialize)]
    struct ReplyChoice {
        message: ReplyMessage,
    }

    #[derive(Deserialize)]
    struct ReplyMessage {
        #[serde(default)]
        content: Option<String>,
    }

    let mut messages = vec![json!({ "role": "system", "content": system })];
    messages.extend(turn_objects(turns));

    let body = json!({
        "model": model,
        "temperature": 0.4,
        "messages": messages,
    });

    let resp = reqwest::Client::new()
        .post("https://api.openai.com/v1/chat/completions")
        .bearer_auth(key)
        .json(&body)
        .send()
        .await
        .context("calling openai")?;

    let status = resp.status();
    if !status.is_success() {
        bail!(
            "openai returned {status}: {}",
            resp.text().await.unwrap_or_default()
        );
    }

    let reply: Reply = resp.json().await.context("decoding openai reply")?;
    let text = reply
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .unwrap_or_default();
    Ok(text.trim().to_string())
}
