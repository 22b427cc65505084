// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! The wire envelope shared by every event kind.
//!
//! The metrics service expects `metric_value` to be a JSON *string* holding
//! the encoded payload, not a nested object. The payload is therefore
//! encoded twice: once into `metric_value`, and again as part of the body.

use serde::{Deserialize, Serialize};

use crate::error::DeliveryError;

/// Outer request body posted to the metrics endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub event_type: String,
    pub metric_value: String,
}

impl EventEnvelope {
    /// Wrap a payload, encoding it into `metric_value`.
    pub fn new<P: Serialize + ?Sized>(
        event_type: impl Into<String>,
        payload: &P,
    ) -> Result<Self, DeliveryError> {
        Ok(Self {
            event_type: event_type.into(),
            metric_value: serde_json::to_string(payload)?,
        })
    }

    /// Encode the full request body.
    pub fn to_body(&self) -> Result<String, DeliveryError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode `metric_value` back into a JSON value.
    pub fn payload(&self) -> Result<serde_json::Value, DeliveryError> {
        Ok(serde_json::from_str(&self.metric_value)?)
    }
}
