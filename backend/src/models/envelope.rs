//! Message envelopes sent to the client.
//!
//! Every message on the wire is one `Envelope`. The enum is internally tagged
//! on `type`, so each variant carries exactly the fields its JSON schema
//! requires:
//!
//! ```text
//! {"type":"start","uuid":…,"timestamp":"…Z"}
//! {"type":"end","uuid":…,"timestamp":"…Z"}
//! {"type":"spawn","uuid":…,"order":{…},"payment":{…}}
//! {"type":"info","message":…}
//! {"type":"scale-up","entity":"order","factor":2}
//! {"type":"scale-down","entity":"payment","factor":1}
//! ```
//!
//! # Example
//!
//! ```rust
//! use flowprobe_core_rs::models::Envelope;
//!
//! let envelope = Envelope::info("Lunch rush hour");
//! let json = serde_json::to_string(&envelope).unwrap();
//! assert_eq!(json, r#"{"type":"info","message":"Lunch rush hour"}"#);
//! ```

use crate::models::session::Entity;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One sampled order or payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDraw {
    pub uuid: Uuid,

    /// Top-level category (e.g. "mobile", "cards")
    #[serde(rename = "type")]
    pub category: String,

    /// Sub-type within the category (e.g. "android", "visa")
    #[serde(rename = "name")]
    pub subtype: String,

    /// Magnitude, always in [1, 50]
    pub value: u32,
}

/// A single client-facing message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Envelope {
    /// First message of every session
    Start { uuid: Uuid, timestamp: String },

    /// Last message of every session
    End { uuid: Uuid, timestamp: String },

    /// One synthetic order/payment pair
    Spawn {
        uuid: Uuid,
        order: CategoryDraw,
        payment: CategoryDraw,
    },

    /// Narrative or telemetry text; no effect on session state
    Info { message: String },

    /// Capacity for `entity` increased by `factor`
    ScaleUp { entity: Entity, factor: u32 },

    /// Capacity for `entity` decreased by `factor`
    ScaleDown { entity: Entity, factor: u32 },
}

impl Envelope {
    pub fn start(session_id: Uuid, at: DateTime<Utc>) -> Self {
        Envelope::Start {
            uuid: session_id,
            timestamp: format_timestamp(at),
        }
    }

    pub fn end(session_id: Uuid, at: DateTime<Utc>) -> Self {
        Envelope::End {
            uuid: session_id,
            timestamp: format_timestamp(at),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Envelope::Info {
            message: message.into(),
        }
    }

    /// Wire name of this variant (the JSON `type` field).
    pub fn kind(&self) -> &'static str {
        match self {
            Envelope::Start { .. } => "start",
            Envelope::End { .. } => "end",
            Envelope::Spawn { .. } => "spawn",
            Envelope::Info { .. } => "info",
            Envelope::ScaleUp { .. } => "scale-up",
            Envelope::ScaleDown { .. } => "scale-down",
        }
    }
}

/// RFC 3339, UTC, microsecond precision, `Z` suffix.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}
