use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One company as it appears both in the reference dataset and in the
/// extraction output. Every field is text, identifiers included.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyRecord {
    #[serde(default, deserialize_with = "string_from_any")]
    pub company_name: String,
    #[serde(rename = "SNI", default, deserialize_with = "string_from_any")]
    pub sni: String,
    #[serde(default, deserialize_with = "string_from_any")]
    pub text: String,
    #[serde(default, deserialize_with = "string_from_any")]
    pub phone_number: String,
    #[serde(default, deserialize_with = "string_from_any")]
    pub org_number: String,
    #[serde(default, deserialize_with = "string_from_any")]
    pub address: String,
    #[serde(default, deserialize_with = "string_from_any")]
    pub municipality: String,
    #[serde(default, deserialize_with = "string_from_any")]
    pub postal_code: String,
    #[serde(default, deserialize_with = "string_from_any")]
    pub url: String,
}

pub const RECORD_KEYS: [&str; 9] = [
    "company_name",
    "SNI",
    "text",
    "phone_number",
    "org_number",
    "address",
    "municipality",
    "postal_code",
    "url",
];

// `"SNI": 46900` reads as "46900", `null` as "".
fn string_from_any<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string value, found {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::{CompanyRecord, RECORD_KEYS};

    #[test]
    fn serializes_exactly_the_record_keys() {
        let value = serde_json::to_value(CompanyRecord::default()).unwrap();
        let object = value.as_object().unwrap();

        let keys: Vec<&str> = object.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys.len(), RECORD_KEYS.len());
        for key in RECORD_KEYS {
            assert!(matches!(object.get(key), Some(Value::String(_))), "{key}");
        }
    }

    #[test]
    fn numeric_and_missing_values_become_text() {
        let record: CompanyRecord = serde_json::from_value(json!({
            "company_name": "SSAB",
            "SNI": 24100,
            "postal_code": null,
            "url": "https://ssab.se/"
        }))
        .unwrap();

        assert_eq!(record.sni, "24100");
        assert_eq!(record.postal_code, "");
        assert_eq!(record.org_number, "");
        assert_eq!(record.url, "https://ssab.se/");
    }

    #[test]
    fn nested_values_are_rejected() {
        let result: Result<CompanyRecord, _> =
            serde_json::from_value(json!({ "company_name": ["SSAB"] }));

        assert!(result.is_err());
    }
}
