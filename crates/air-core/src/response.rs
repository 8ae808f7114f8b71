//! HTTP responses and the validation every endpoint call funnels through.

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// A fully buffered response from the Air API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    status: u16,
    text: String,
}

impl HttpResponse {
    /// Create a response from its status code and body text.
    #[must_use]
    pub fn new(status: u16, text: impl Into<String>) -> Self {
        Self {
            status,
            text: text.into(),
        }
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Raw body text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns true for 2xx responses.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Decode the body as JSON into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnexpectedResponse`] carrying the raw body if decoding fails.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.text)
            .map_err(|_| Error::unexpected_response(self.status, &self.text))
    }

    /// Decode the body as an untyped JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnexpectedResponse`] if the body is not JSON.
    pub fn json_value(&self) -> Result<Value> {
        self.json::<Value>()
    }
}

/// Body shape an operation expects from the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedBody {
    /// A JSON object
    Object,
    /// A JSON array
    Array,
    /// A JSON string
    Str,
    /// Body is not inspected (e.g. 204 No Content)
    Ignore,
}

impl ExpectedBody {
    const fn type_name(self) -> &'static str {
        match self {
            Self::Object => "dict",
            Self::Array => "list",
            Self::Str => "str",
            Self::Ignore => "None",
        }
    }

    fn matches(self, value: &Value) -> bool {
        match self {
            Self::Object => value.is_object(),
            Self::Array => value.is_array(),
            Self::Str => value.is_string(),
            Self::Ignore => true,
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "None",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

/// Validate a response's status code and body shape.
///
/// # Errors
///
/// Returns [`Error::UnexpectedResponse`] when the status differs from `status`, when the
/// body is not JSON, or when the decoded JSON does not have the expected shape.
pub fn validate_response(res: &HttpResponse, status: u16, expected: ExpectedBody) -> Result<()> {
    if res.status() != status {
        return Err(Error::unexpected_response(res.status(), res.text()));
    }
    if expected == ExpectedBody::Ignore {
        return Ok(());
    }
    let value = res.json_value()?;
    if !expected.matches(&value) {
        return Err(Error::unexpected_response(
            res.status(),
            format!(
                "Expected API response to be of type `{}`, got `{}`",
                expected.type_name(),
                json_type_name(&value)
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_matching_object() {
        let res = HttpResponse::new(200, r#"{"id": "abc123"}"#);
        assert!(validate_response(&res, 200, ExpectedBody::Object).is_ok());
    }

    #[test]
    fn rejects_unexpected_status() {
        let res = HttpResponse::new(400, "bad request");
        let err = validate_response(&res, 200, ExpectedBody::Object).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Received an unexpected response from the Air API (400): bad request"
        );
        assert_eq!(err.status_code(), Some(400));
    }

    #[test]
    fn ignore_skips_body() {
        let res = HttpResponse::new(204, "");
        assert!(validate_response(&res, 204, ExpectedBody::Ignore).is_ok());
    }

    #[test]
    fn rejects_invalid_json() {
        let res = HttpResponse::new(200, "<html>");
        let err = validate_response(&res, 200, ExpectedBody::Object).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Received an unexpected response from the Air API (200): <html>"
        );
    }

    #[test]
    fn rejects_wrong_shape() {
        let res = HttpResponse::new(200, "{}");
        let err = validate_response(&res, 200, ExpectedBody::Array).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Received an unexpected response from the Air API (200): \
             Expected API response to be of type `list`, got `dict`"
        );
    }

    #[test]
    fn string_body() {
        let res = HttpResponse::new(201, r#""abc123""#);
        assert!(validate_response(&res, 201, ExpectedBody::Str).is_ok());
        assert_eq!(res.json::<String>().unwrap(), "abc123");
    }
}
