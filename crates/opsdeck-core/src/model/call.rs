// ── Active call domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::entity_id::EntityId;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum CallStatus {
    Active,
    OnHold,
    Ringing,
    Transferred,
}

/// A live channel as shown on the call board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveCall {
    pub id: EntityId,
    pub caller_number: String,
    pub caller_name: Option<String>,
    pub started_at: DateTime<Utc>,
    /// Name of the IVR menu the caller is currently in.
    pub current_menu: String,
    pub status: CallStatus,
    pub channel: String,
    /// Elapsed seconds, recomputed by the duration ticker.
    pub duration_secs: u64,
}

impl ActiveCall {
    pub fn display_name(&self) -> &str {
        self.caller_name.as_deref().unwrap_or("Unknown Caller")
    }

    /// Elapsed whole seconds at `now`; clock skew clamps to zero.
    pub fn elapsed_at(&self, now: DateTime<Utc>) -> u64 {
        u64::try_from((now - self.started_at).num_seconds()).unwrap_or(0)
    }
}
