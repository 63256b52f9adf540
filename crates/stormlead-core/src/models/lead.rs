//! Lead model: a prospective customer's inquiry, stored exactly as submitted.

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Server-assigned key holding the lead identifier.
pub const LEAD_ID_FIELD: &str = "id";
/// Server-assigned key holding the submission timestamp.
pub const SUBMITTED_AT_FIELD: &str = "submittedAt";

/// A stored lead.
///
/// Client fields are kept verbatim and in submission order, followed by the
/// server-assigned `id` (milliseconds since the Unix epoch) and `submittedAt`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    #[serde(flatten)]
    pub fields: Map<String, Value>,
    pub id: i64,
    #[serde(rename = "submittedAt", with = "millis_rfc3339")]
    pub submitted_at: DateTime<Utc>,
}

impl Lead {
    /// Build a lead from a client payload. Any client-supplied `id` or
    /// `submittedAt` is discarded in favor of the server values.
    pub fn new(mut fields: Map<String, Value>, id: i64, submitted_at: DateTime<Utc>) -> Self {
        fields.remove(LEAD_ID_FIELD);
        fields.remove(SUBMITTED_AT_FIELD);
        Self {
            fields,
            id,
            submitted_at,
        }
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

impl utoipa::PartialSchema for Lead {
    fn schema() -> utoipa::openapi::RefOr<utoipa::openapi::schema::Schema> {
        use utoipa::openapi::schema::{
            AdditionalProperties, KnownFormat, ObjectBuilder, Schema, SchemaFormat, Type,
        };

        ObjectBuilder::new()
            .description(Some(
                "Client-submitted fields (any shape) plus server-assigned id and submittedAt",
            ))
            .property(
                LEAD_ID_FIELD,
                ObjectBuilder::new()
                    .schema_type(Type::Integer)
                    .format(Some(SchemaFormat::KnownFormat(KnownFormat::Int64))),
            )
            .required(LEAD_ID_FIELD)
            .property(
                SUBMITTED_AT_FIELD,
                ObjectBuilder::new()
                    .schema_type(Type::String)
                    .format(Some(SchemaFormat::KnownFormat(KnownFormat::DateTime))),
            )
            .required(SUBMITTED_AT_FIELD)
            .additional_properties(Some(AdditionalProperties::<Schema>::FreeForm(true)))
            .into()
    }
}

impl utoipa::ToSchema for Lead {
    fn name() -> Cow<'static, str> {
        Cow::Borrowed("Lead")
    }
}

/// ISO-8601 UTC with millisecond precision and a `Z` suffix, e.g. `2024-05-01T12:30:45.123Z`.
mod millis_rfc3339 {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn payload(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("test payload must be an object"),
        }
    }

    #[test]
    fn serializes_client_fields_then_server_fields() {
        let submitted_at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 45).unwrap()
            + chrono::Duration::milliseconds(123);
        let lead = Lead::new(
            payload(json!({"name": "Jane Doe", "email": "jane@example.com"})),
            1714566645123,
            submitted_at,
        );

        let text = serde_json::to_string(&lead).unwrap();
        assert_eq!(
            text,
            r#"{"name":"Jane Doe","email":"jane@example.com","id":1714566645123,"submittedAt":"2024-05-01T12:30:45.123Z"}"#
        );
    }

    #[test]
    fn client_supplied_server_fields_are_overwritten() {
        let lead = Lead::new(
            payload(json!({"id": "spoofed", "submittedAt": "yesterday", "phone": "555-0100"})),
            42,
            Utc::now(),
        );

        assert_eq!(lead.id, 42);
        assert_eq!(lead.fields.len(), 1);
        assert_eq!(lead.field("phone"), Some(&json!("555-0100")));
    }

    #[test]
    fn round_trips_through_stored_form() {
        let stored = json!({
            "name": "Sam",
            "service": "roof-repair",
            "id": 1700000000000_i64,
            "submittedAt": "2023-11-14T22:13:20.000Z"
        });

        let lead: Lead = serde_json::from_value(stored.clone()).unwrap();
        assert_eq!(lead.id, 1700000000000);
        assert_eq!(lead.field("service"), Some(&json!("roof-repair")));
        assert!(!lead.fields.contains_key("id"));
        assert_eq!(serde_json::to_value(&lead).unwrap(), stored);
    }
}
