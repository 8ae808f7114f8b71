//! URL, datetime and logging helpers shared by both API generations.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde_json::Value;
use std::fmt::Display;
use uuid::Uuid;

const REDACTED: &str = "********";

/// Join URL fragments with single slashes and a trailing slash.
///
/// `join_urls(&["http://test/api/", "v2", "/simulations/"])` yields
/// `http://test/api/v2/simulations/`.
#[must_use]
pub fn join_urls(fragments: &[&str]) -> String {
    let joined = fragments
        .iter()
        .map(|frag| frag.trim_matches('/'))
        .collect::<Vec<_>>()
        .join("/");
    format!("{joined}/")
}

/// Ensure an API root ends in `/api/`.
#[must_use]
pub fn normalize_api_url(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    if trimmed.ends_with("/api") {
        format!("{trimmed}/")
    } else {
        format!("{trimmed}/api/")
    }
}

/// Normalize `1`, `"1"` and `"v1"` to `"v1"`.
#[must_use]
pub fn normalize_api_version(version: impl Display) -> String {
    let version = version.to_string();
    if version.starts_with('v') {
        version
    } else {
        format!("v{version}")
    }
}

/// Extract the resource identifier from an API detail URL.
///
/// Detail URLs have the shape `scheme://host/api/<version>/<resource>/<id>`; the
/// identifier is the seventh `/`-separated segment.
#[must_use]
pub fn id_from_url(url: &str) -> Option<&str> {
    url.split('/').nth(6).filter(|segment| !segment.is_empty())
}

/// Parse an ISO-8601 string. A trailing `Z` is accepted and naive values are read as UTC.
#[must_use]
pub fn parse_iso_datetime(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Render a datetime as UTC ISO-8601 with a `Z` suffix.
#[must_use]
pub fn format_iso_datetime(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Parse a string as a UUID.
#[must_use]
pub fn to_uuid(value: &str) -> Option<Uuid> {
    Uuid::parse_str(value).ok()
}

/// Copy of `payload` with every `password` value masked, for logging.
#[must_use]
pub fn redact_payload(payload: &Value) -> Value {
    match payload {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, value)| {
                    let value = if key.to_ascii_lowercase().contains("password") {
                        Value::String(REDACTED.to_string())
                    } else {
                        redact_payload(value)
                    };
                    (key.clone(), value)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(redact_payload).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn join_urls_strips_slashes() {
        assert_eq!(
            join_urls(&["http://test/api/", "v2", "/simulations/nodes/"]),
            "http://test/api/v2/simulations/nodes/"
        );
        assert_eq!(join_urls(&["http://test/api", "v1", "login"]), "http://test/api/v1/login/");
    }

    #[test]
    fn normalize_api_url_variants() {
        assert_eq!(normalize_api_url("http://localhost/api/"), "http://localhost/api/");
        assert_eq!(normalize_api_url("http://localhost"), "http://localhost/api/");
        assert_eq!(normalize_api_url("http://localhost/api"), "http://localhost/api/");
    }

    #[test]
    fn normalize_api_version_variants() {
        assert_eq!(normalize_api_version("v1"), "v1");
        assert_eq!(normalize_api_version("1"), "v1");
        assert_eq!(normalize_api_version(1), "v1");
    }

    #[test]
    fn id_from_detail_url() {
        assert_eq!(
            id_from_url("http://testserver/api/v1/test/abc123"),
            Some("abc123")
        );
        assert_eq!(id_from_url("abc123"), None);
    }

    #[test]
    fn parse_and_format_datetime() {
        let expected = Utc.with_ymd_and_hms(2030, 12, 12, 22, 5, 3).unwrap();
        assert_eq!(parse_iso_datetime("2030-12-12T22:05:03Z"), Some(expected));
        assert_eq!(parse_iso_datetime("2030-12-12T22:05:03+00:00"), Some(expected));
        assert_eq!(parse_iso_datetime("2030-12-12T22:05:03"), Some(expected));
        assert_eq!(parse_iso_datetime("not a date"), None);
        assert_eq!(format_iso_datetime(&expected), "2030-12-12T22:05:03Z");
    }

    #[test]
    fn redact_masks_passwords() {
        let payload = json!({
            "username": "john",
            "password": "hunter2",
            "nested": [{"console_password": "x"}]
        });
        let redacted = redact_payload(&payload);
        assert_eq!(redacted["username"], "john");
        assert_eq!(redacted["password"], REDACTED);
        assert_eq!(redacted["nested"][0]["console_password"], REDACTED);
    }
}
