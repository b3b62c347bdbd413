use serde_json::{Map, Value};

/// Full JSON body of a template, keys kept in server order. Only `id`,
/// `name` and `clonedTemplateId` are ever inspected.
pub type CustomizationPayload = Map<String, Value>;

/// Turn a source tenant's customization payload into a clone request for
/// the target tenant.
///
/// The source `id` is dropped (it names a record in the other tenant),
/// `clonedTemplateId` is pointed at the target's global template, and `name`
/// is replaced when a non-empty `new_name` is given. All other fields pass
/// through untouched. `source` itself is left unchanged.
pub fn build_clone_payload(
    source: &CustomizationPayload,
    target_global_template_id: &str,
    new_name: Option<&str>,
) -> CustomizationPayload {
    let mut payload: CustomizationPayload = source
        .iter()
        .filter(|(key, _)| key.as_str() != "id")
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    payload.insert(
        "clonedTemplateId".to_string(),
        Value::String(target_global_template_id.to_string()),
    );

    if let Some(name) = new_name.filter(|n| !n.is_empty()) {
        payload.insert("name".to_string(), Value::String(name.to_string()));
    }

    payload
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> CustomizationPayload {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {}", other),
        }
    }

    #[test]
    fn test_strips_id_and_sets_cloned_template_id() {
        let source = object(json!({"id": "A", "name": "X", "other": 1}));
        let payload = build_clone_payload(&source, "B", None);
        assert_eq!(
            Value::Object(payload),
            json!({"name": "X", "other": 1, "clonedTemplateId": "B"})
        );
    }

    #[test]
    fn test_new_name_overrides_name() {
        let source = object(json!({"id": "A", "name": "X", "other": 1}));
        let payload = build_clone_payload(&source, "B", Some("Y"));
        assert_eq!(payload["name"], "Y");
        assert!(!payload.contains_key("id"));
    }

    #[test]
    fn test_empty_new_name_keeps_original() {
        let source = object(json!({"name": "X"}));
        let payload = build_clone_payload(&source, "B", Some(""));
        assert_eq!(payload["name"], "X");
    }

    #[test]
    fn test_source_is_not_mutated() {
        let source = object(json!({"id": "A", "name": "X", "monitors": [{"id": "m1"}]}));
        let snapshot = source.clone();
        let _ = build_clone_payload(&source, "B", Some("Y"));
        assert_eq!(source, snapshot);
    }

    #[test]
    fn test_nested_structures_pass_through_verbatim() {
        let source = object(json!({
            "id": "A",
            "monitors": [{"id": "m1", "thresholds": {"critical": 90}}],
            "clonedTemplateId": "stale"
        }));
        let payload = build_clone_payload(&source, "B", None);
        assert_eq!(payload["monitors"], json!([{"id": "m1", "thresholds": {"critical": 90}}]));
        assert_eq!(payload["clonedTemplateId"], "B");
    }

    #[test]
    fn test_key_order_is_preserved() {
        let source = object(json!({"id": "A", "zeta": 1, "alpha": 2, "name": "X"}));
        let payload = build_clone_payload(&source, "B", None);
        let keys: Vec<&str> = payload.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "name", "clonedTemplateId"]);
    }
}
