//! Column encoding shared by the repositories.
//!
//! Ids are stored as hyphenated UUID text and timestamps as RFC 3339 text
//! with a fixed precision, so lexical order matches chronological order.

use std::str::FromStr;

use chrono::SecondsFormat;
use labhub_domain::time::{Timestamp, parse_rfc3339};

pub(crate) fn encode_time(value: &Timestamp) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn decode_time(value: &str) -> Result<Timestamp, sqlx::Error> {
    parse_rfc3339(value).map_err(|err| sqlx::Error::Decode(Box::new(err)))
}

pub(crate) fn decode_optional_time(value: Option<String>) -> Result<Option<Timestamp>, sqlx::Error> {
    value.as_deref().map(decode_time).transpose()
}

pub(crate) fn decode_id<T>(value: &str) -> Result<T, sqlx::Error>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    T::from_str(value).map_err(|err| sqlx::Error::Decode(Box::new(err)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use labhub_domain::id::JobId;

    #[test]
    fn should_order_encoded_times_chronologically() {
        let early = parse_rfc3339("2026-03-01T10:00:00Z").unwrap();
        let late = parse_rfc3339("2026-03-01T10:00:00.5Z").unwrap();

        assert!(encode_time(&early) < encode_time(&late));
        assert_eq!(encode_time(&early), "2026-03-01T10:00:00.000000Z");
    }

    #[test]
    fn should_reject_malformed_id() {
        let result = decode_id::<JobId>("not-a-uuid");
        assert!(matches!(result, Err(sqlx::Error::Decode(_))));
    }
}
