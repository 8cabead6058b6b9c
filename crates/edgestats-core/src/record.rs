//! Wire records handed to the management-plane consumer.
//!
//! Field names follow the consumer's expected JSON: `ok`, `running`, `stats`,
//! `period`, `tunnel_stats`, `utc`, and `state` / `stateReason` only on the
//! record that carries live status.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::delta::DeltaMap;

/// Live router status computed at read time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveStatus {
    pub running: bool,
    pub state: String,
    pub reason: String,
}

impl LiveStatus {
    /// Status reported while load simulation replaces the real dataplane.
    pub fn simulated() -> Self {
        Self {
            running: true,
            state: "running".to_string(),
            reason: String::new(),
        }
    }
}

/// One entry of update history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeltaRecord {
    #[serde(with = "flag")]
    pub ok: bool,
    pub running: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(
        rename = "stateReason",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub state_reason: Option<String>,
    pub stats: DeltaMap,
    pub period: f64,
    pub tunnel_stats: Value,
    pub utc: f64,
}

impl DeltaRecord {
    /// Stand-in record returned when nothing was collected since the last drain.
    pub fn placeholder(ok: bool, status: &LiveStatus, utc: f64) -> Self {
        Self {
            ok,
            running: false,
            state: None,
            state_reason: None,
            stats: DeltaMap::new(),
            period: 0.0,
            tunnel_stats: empty_blob(),
            utc,
        }
        .with_status(status)
    }

    /// Copy of this record carrying `status` instead of its capture-time flag.
    pub fn with_status(mut self, status: &LiveStatus) -> Self {
        self.running = status.running;
        self.state = Some(status.state.clone());
        self.state_reason = Some(status.reason.clone());
        self
    }
}

/// Result of draining the update history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrainResponse {
    pub message: Vec<DeltaRecord>,
    #[serde(with = "flag")]
    pub ok: bool,
}

impl DrainResponse {
    /// Build the consumer view from drained history and the current status.
    ///
    /// Only the newest record is annotated with `status`; when `records` is
    /// empty a single placeholder is synthesized.
    pub fn compose(
        mut records: Vec<DeltaRecord>,
        store_ok: bool,
        status: &LiveStatus,
        utc: f64,
    ) -> Self {
        match records.pop() {
            Some(last) => records.push(last.with_status(status)),
            None => records.push(DeltaRecord::placeholder(store_ok, status, utc)),
        }
        Self {
            message: records,
            ok: true,
        }
    }
}

/// The empty tunnel stats blob, `{}`.
pub fn empty_blob() -> Value {
    Value::Object(serde_json::Map::new())
}

/// Serialize a boolean as the integer `0` / `1`.
mod flag {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        match u8::deserialize(deserializer)? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(D::Error::custom(format!("expected 0 or 1, got {other}"))),
        }
    }
}
