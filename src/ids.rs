// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Identifier and timestamp helpers.

use chrono::{SecondsFormat, Utc};
use uuid::Uuid;

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Length of the random suffix on a call id.
pub const CALL_ID_SUFFIX_LEN: usize = 9;

/// Generate a call identifier of the form `{epoch_millis}-{9 base36 chars}`.
///
/// Low-collision, not globally unique.
pub fn generate_call_id() -> String {
    let suffix: String = (0..CALL_ID_SUFFIX_LEN)
        .map(|_| BASE36[fastrand::usize(..BASE36.len())] as char)
        .collect();
    format!("{}-{}", Utc::now().timestamp_millis(), suffix)
}

/// Generate a session identifier.
pub fn generate_session_id() -> String {
    Uuid::new_v4().to_string()
}

/// Current time as an ISO-8601 UTC string with millisecond precision.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_id_format() {
        let id = generate_call_id();
        let (millis, suffix) = id.split_once('-').unwrap();
        assert!(millis.parse::<i64>().unwrap() > 0);
        assert_eq!(suffix.len(), CALL_ID_SUFFIX_LEN);
        assert!(suffix.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn test_call_ids_differ() {
        assert_ne!(generate_call_id(), generate_call_id());
    }

    #[test]
    fn test_session_id_is_uuid() {
        let id = generate_session_id();
        assert!(Uuid::parse_str(&id).is_ok());
    }

    #[test]
    fn test_timestamp_format() {
        let ts = timestamp_now();
        assert!(ts.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
    }
}
