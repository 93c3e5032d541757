use serde::Serialize;
use super::task::{RawTask, DEFAULT_PURPOSE};

/// Environment model
///
/// `purpose` is only a fallback; the purpose shown for a bar is resolved
/// per (environment, batch) and stored on the range.
#[derive(Debug, Clone, Serialize)]
pub struct Environment {
    pub name: String,
    pub purpose: String,
    pub color: String,
    #[serde(skip)]
    pub tasks: Vec<RawTask>,
}

impl Environment {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            purpose: DEFAULT_PURPOSE.to_string(),
            color: color.into(),
            tasks: Vec::new(),
        }
    }
}
