//! `inspect`: show what a token says about itself.

use std::path::Path;

use anyhow::Result;
use openerp_session::{Claims, Clock, ExpiryStatus, SystemClock, TokenError, decode_token, format_remaining};
use serde::Serialize;

use crate::config::ClientConfig;

/// Everything `inspect` prints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectReport {
    #[serde(flatten)]
    pub status: ExpiryStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl InspectReport {
    pub fn new(decoded: &Result<Claims, TokenError>, now: i64) -> Self {
        let status = ExpiryStatus::evaluate(decoded, now);
        let remaining = match status {
            ExpiryStatus::Valid { remaining_seconds } => Some(format_remaining(remaining_seconds)),
            _ => None,
        };
        match decoded {
            Ok(claims) => Self {
                status,
                remaining,
                subject: claims.subject().map(String::from),
                name: claims.name().map(String::from),
                expires_at: claims
                    .exp
                    .and_then(|exp| chrono::DateTime::from_timestamp(exp, 0))
                    .map(|t| t.to_rfc3339()),
                error: None,
            },
            Err(e) => Self {
                status,
                remaining,
                subject: None,
                name: None,
                expires_at: None,
                error: Some(e.to_string()),
            },
        }
    }

    /// Two-column table, one field per line.
    pub fn to_table(&self) -> String {
        let mut rows = vec![("STATUS", self.status.label().to_string())];
        let optional = [
            ("REMAINING", &self.remaining),
            ("SUBJECT", &self.subject),
            ("NAME", &self.name),
            ("EXPIRES", &self.expires_at),
            ("ERROR", &self.error),
        ];
        for (label, value) in optional {
            if let Some(value) = value {
                rows.push((label, value.clone()));
            }
        }
        rows.iter()
            .map(|(label, value)| format!("{:<10} {}", label, value))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Inspect `token`, or the current context's token when none is given.
pub fn inspect(token: Option<&str>, json_output: bool, client_config_path: &Path) -> Result<()> {
    let token = match token {
        Some(t) => Some(t.to_string()),
        None => {
            let config = ClientConfig::load(client_config_path)?;
            let ctx = config
                .current()
                .ok_or_else(|| anyhow::anyhow!("No current context. Pass a token or run `openerp use context <name>`."))?;
            config.token_for(&ctx.name)
        }
    };

    let report = InspectReport::new(&decode_token(token.as_deref()), SystemClock.now_unix());
    if json_output {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.to_table());
    }
    Ok(())
}
