use serde::{Deserialize, Serialize};

/// Canonical schedule status
///
/// Every raw status string maps onto exactly one of these four values.
/// Unknown strings fall back to `NotStarted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    NotStarted,
    Preparing,
    Verifying,
    Completed,
}

/// Raw spellings seen in source sheets, and the status they stand for.
/// English entries are compared case-insensitively.
const SYNONYMS: &[(&str, Status)] = &[
    ("待開始", Status::NotStarted),
    ("未指定", Status::NotStarted),
    ("規劃中", Status::NotStarted),
    ("進行中", Status::Preparing),
    ("前置準備中", Status::Preparing),
    ("IT前置準備中", Status::Preparing),
    ("測試中", Status::Verifying),
    ("測試進行中", Status::Verifying),
    ("User測試進行中", Status::Verifying),
    ("完成", Status::Completed),
    ("已驗證", Status::Completed),
    ("pending", Status::NotStarted),
    ("todo", Status::NotStarted),
    ("planned", Status::NotStarted),
    ("not started", Status::NotStarted),
    ("in progress", Status::Preparing),
    ("in-progress", Status::Preparing),
    ("preparing", Status::Preparing),
    ("testing", Status::Verifying),
    ("verifying", Status::Verifying),
    ("done", Status::Completed),
    ("complete", Status::Completed),
    ("verified", Status::Completed),
];

impl Status {
    pub const ALL: [Status; 4] = [
        Status::NotStarted,
        Status::Preparing,
        Status::Verifying,
        Status::Completed,
    ];

    /// Machine-facing slug
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::NotStarted => "not-started",
            Status::Preparing => "preparing",
            Status::Verifying => "verifying",
            Status::Completed => "completed",
        }
    }

    /// Display label as it appears in schedule sheets
    pub fn label(&self) -> &'static str {
        match self {
            Status::NotStarted => "未開始",
            Status::Preparing => "準備中",
            Status::Verifying => "驗證中",
            Status::Completed => "已完成",
        }
    }

    /// Exact match on a slug or a label, no synonyms
    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s || status.label() == s)
    }

    /// Display ordering: lower sorts first
    pub fn priority(&self) -> u8 {
        match self {
            Status::NotStarted => 1,
            Status::Preparing => 2,
            Status::Verifying => 3,
            Status::Completed => 4,
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Map an arbitrary status string onto a canonical status.
///
/// Lookup order: synonym table, then canonical slug/label, then `NotStarted`.
/// Never fails, and `normalize_status(normalize_status(x).label())` equals
/// `normalize_status(x)` for every input.
pub fn normalize_status(raw: &str) -> Status {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Status::NotStarted;
    }

    let lowered = trimmed.to_lowercase();
    if let Some((_, status)) = SYNONYMS
        .iter()
        .find(|(synonym, _)| *synonym == trimmed || *synonym == lowered)
    {
        return *status;
    }

    Status::from_str(trimmed)
        .or_else(|| Status::from_str(&lowered))
        .unwrap_or(Status::NotStarted)
}
