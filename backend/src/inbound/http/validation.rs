//! Validation error builders shared by inbound HTTP adapters.
//!
//! Every validation failure becomes `invalid_request` with a `details`
//! object naming the offending `field` and a stable machine `code`.

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::domain::Error;

/// Request field names as they appear in JSON bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub(crate) const fn as_str(self) -> &'static str {
        self.0
    }
}

pub(crate) const EMAIL: FieldName = FieldName::new("email");
pub(crate) const PASSWORD: FieldName = FieldName::new("password");
pub(crate) const FULL_NAME: FieldName = FieldName::new("fullName");
pub(crate) const COMPANY_NAME: FieldName = FieldName::new("companyName");
pub(crate) const ACCOUNT_ID: FieldName = FieldName::new("accountId");
pub(crate) const TIER: FieldName = FieldName::new("tier");
pub(crate) const EXPIRY: FieldName = FieldName::new("expiry");
pub(crate) const BODY: FieldName = FieldName::new("body");

/// `invalid_request` carrying `field` and `code` details.
pub(crate) fn field_error(field: FieldName, code: &str, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "code": code,
    }))
}

pub(crate) fn invalid_timestamp_error(field: FieldName, value: &str) -> Error {
    let name = field.as_str();
    Error::invalid_request(format!("{name} must be an RFC 3339 timestamp")).with_details(json!({
        "field": name,
        "value": value,
        "code": "invalid_timestamp",
    }))
}

pub(crate) fn parse_optional_rfc3339_timestamp(
    value: Option<&str>,
    field: FieldName,
) -> Result<Option<DateTime<Utc>>, Error> {
    value
        .map(|raw| {
            DateTime::parse_from_rfc3339(raw)
                .map(|timestamp| timestamp.with_timezone(&Utc))
                .map_err(|_| invalid_timestamp_error(field, raw))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    fn field_errors_carry_details() {
        let error = field_error(EMAIL, "invalid_email", "email must be a valid address");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
        assert_eq!(
            error.details(),
            Some(&json!({"field": "email", "code": "invalid_email"}))
        );
    }

    #[rstest]
    #[case(None, true)]
    #[case(Some("2026-05-01T00:00:00Z"), true)]
    #[case(Some("2026-05-01T02:00:00+02:00"), true)]
    #[case(Some("next tuesday"), false)]
    fn timestamps_parse_or_fail_with_details(#[case] raw: Option<&str>, #[case] ok: bool) {
        let parsed = parse_optional_rfc3339_timestamp(raw, EXPIRY);
        assert_eq!(parsed.is_ok(), ok);
        if let Err(error) = parsed {
            let details = error.details().expect("details present");
            assert_eq!(details.get("field"), Some(&json!("expiry")));
            assert_eq!(details.get("code"), Some(&json!("invalid_timestamp")));
        }
    }

    #[rstest]
    fn offsets_normalise_to_utc() {
        let parsed = parse_optional_rfc3339_timestamp(Some("2026-05-01T02:00:00+02:00"), EXPIRY)
            .expect("valid timestamp")
            .expect("present");
        assert_eq!(parsed.to_rfc3339(), "2026-05-01T00:00:00+00:00");
    }
}
