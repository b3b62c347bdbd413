use serde::Serialize;
use serde_json::Value;

/// Version reported when an integration has no published version.
pub const UNKNOWN_VERSION: &str = "unknown";

/// An SDK integration as returned by the integration search endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntegrationRecord {
    pub app_name: String,
    /// Native type labels, in API order.
    pub native_types: Vec<String>,
    /// Major version of the last published version, or `"unknown"`.
    pub version: String,
    /// `metaData.resourceHierarchy`; empty when absent.
    pub persona: String,
}

impl IntegrationRecord {
    pub fn from_search_result(item: &Value) -> Self {
        let native_types = item
            .get("nativeType")
            .and_then(Value::as_array)
            .map(|types| {
                types
                    .iter()
                    .filter_map(|nt| nt.get("label").and_then(Value::as_str))
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        let versions = item
            .get("versions")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        Self {
            app_name: str_field(item, "name"),
            native_types,
            version: latest_published_major(versions),
            persona: item
                .get("metaData")
                .map(|meta| str_field(meta, "resourceHierarchy"))
                .unwrap_or_default(),
        }
    }
}

/// Pick the last `Published` entry in the order the API returned them and
/// keep the leading segment of its dotted `tag`.
pub fn latest_published_major(versions: &[Value]) -> String {
    versions
        .iter()
        .filter(|v| v.get("state").and_then(Value::as_str) == Some("Published"))
        .last()
        .and_then(|v| v.get("tag").and_then(Value::as_str))
        .and_then(|tag| tag.split('.').next())
        .filter(|major| !major.is_empty())
        .map(String::from)
        .unwrap_or_else(|| UNKNOWN_VERSION.to_string())
}

fn str_field(item: &Value, key: &str) -> String {
    item.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
