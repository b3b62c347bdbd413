use serde::Serialize;
use serde_json::Value;

pub const GLOBAL_SCOPE: &str = "GLOBAL";

/// A global template or one of its tenant-scoped clones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateRecord {
    pub id: String,
    pub name: String,
    pub description: String,
    pub app_name: String,
    pub native_type: String,
    pub version: String,
    pub scope: String,
    pub persona: String,
    /// Parent global template id; only set on clones.
    pub parent_id: Option<String>,
}

impl TemplateRecord {
    /// Parse a global template search result.
    pub fn from_global_result(item: &Value, persona: &str) -> Self {
        Self {
            scope: item
                .get("scope")
                .and_then(Value::as_str)
                .unwrap_or(GLOBAL_SCOPE)
                .to_string(),
            persona: persona.to_string(),
            parent_id: None,
            ..Self::common(item)
        }
    }

    /// Parse a cloned template search result. `parentUUID` wins over the id
    /// the search was filtered by.
    pub fn from_clone_result(item: &Value, parent_id: &str) -> Self {
        Self {
            scope: str_field(item, "scope"),
            persona: String::new(),
            parent_id: Some(
                item.get("parentUUID")
                    .and_then(Value::as_str)
                    .unwrap_or(parent_id)
                    .to_string(),
            ),
            ..Self::common(item)
        }
    }

    fn common(item: &Value) -> Self {
        Self {
            id: str_field(item, "id"),
            name: str_field(item, "name"),
            description: str_field(item, "description"),
            app_name: str_field(item, "appName"),
            native_type: str_field(item, "nativeType"),
            version: match item.get("version") {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Number(n)) => n.to_string(),
                _ => String::new(),
            },
            scope: String::new(),
            persona: String::new(),
            parent_id: None,
        }
    }

    pub fn is_clone(&self) -> bool {
        self.parent_id.is_some()
    }
}

fn str_field(item: &Value, key: &str) -> String {
    item.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
