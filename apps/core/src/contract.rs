use serde::{Deserialize, Serialize};

use crate::announcer::{Announcement, Severity};
use crate::registry::InitError;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FilterReport {
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init_error: Option<String>,
    pub query: String,
    pub matched_count: usize,
    pub total_count: usize,
    pub status_text: String,
    pub polite_region: String,
    pub alert_region: String,
    pub announcement_pending: bool,
    pub visible: Vec<String>,
}

impl FilterReport {
    pub fn uninitialized(error: &InitError) -> Self {
        Self {
            active: false,
            init_error: Some(error.to_string()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnnouncementDto {
    pub severity: Severity,
    pub text: String,
}

impl From<Announcement> for AnnouncementDto {
    fn from(value: Announcement) -> Self {
        Self {
            severity: value.message.severity,
            text: value.message.text,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum StepEvent {
    Start,
    Input(String),
    Submit,
    Wait { elapsed_ms: u64 },
    First { label: Option<String> },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StepReport {
    pub step: usize,
    pub at_ms: u64,
    pub event: StepEvent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub announced: Option<AnnouncementDto>,
    pub report: FilterReport,
}
