use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Process-wide emergency stop
///
/// The default value means "not halted".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HaltInfo {
    pub halted: bool,
    pub reason: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl HaltInfo {
    pub fn raised(reason: String) -> Self {
        Self {
            halted: true,
            reason: Some(reason),
            timestamp: Some(Utc::now()),
        }
    }
}
