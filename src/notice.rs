//! Purpose: Define a stable, structured schema for non-fatal stderr notices.
//! Exports: `Notice`, `notice_json`, `toast_notices`.
//! Role: Carries storefront toasts out of the CLI without touching stdout payloads.
//! Invariants: Notices are non-fatal and never alter stdout payloads.
//! Invariants: JSON schema is additive-only; `kind`, `time`, `cmd`, `message` are always present.
use serde_json::{Map, Value, json};

use crate::ui::toast::Toasts;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: String,
    pub time: String,
    pub cmd: String,
    pub message: String,
    pub details: Map<String, Value>,
}

pub fn notice_json(notice: &Notice) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(notice.kind));
    inner.insert("time".to_string(), json!(notice.time));
    inner.insert("cmd".to_string(), json!(notice.cmd));
    inner.insert("message".to_string(), json!(notice.message));
    inner.insert("details".to_string(), Value::Object(notice.details.clone()));

    let mut outer = Map::new();
    outer.insert("notice".to_string(), Value::Object(inner));
    Value::Object(outer)
}

/// One `toast` notice per active toast, oldest first.
pub fn toast_notices(toasts: &Toasts, cmd: &str, time: &str) -> Vec<Notice> {
    toasts
        .active()
        .iter()
        .map(|toast| Notice {
            kind: "toast".to_string(),
            time: time.to_string(),
            cmd: cmd.to_string(),
            message: toast.message.clone(),
            details: Map::new(),
        })
        .collect()
}
