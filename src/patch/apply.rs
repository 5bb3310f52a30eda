//! In-memory edits applied to a solution before it is written back.
//!
//! Each function reports whether it changed anything so the caller can
//! skip the write when nothing did.

use super::PatchAction;
use crate::model::ComponentSpec;
use crate::value::{shape, Mapping, Value};
use crate::{Error, Result};

/// Upserts or removes `payload` in `seq`.
///
/// With a dedup key, the first mapping entry whose `dedup_key` field
/// equals the payload's is replaced or removed. Otherwise `Add` appends.
/// Without a dedup key there is no way to identify an entry, so `Remove`
/// never matches.
pub fn patch_sequence(
    seq: &mut Vec<Value>,
    payload: &Mapping,
    dedup_key: &str,
    action: PatchAction,
) -> bool {
    if !dedup_key.is_empty() {
        let wanted = payload.get(dedup_key);
        let hit = seq
            .iter()
            .position(|entry| matches!(entry, Value::Object(m) if same_key(m.get(dedup_key), wanted)));

        if let Some(i) = hit {
            match action {
                PatchAction::Remove => {
                    seq.remove(i);
                }
                PatchAction::Add => seq[i] = Value::Object(payload.clone()),
            }
            return true;
        }
    }

    match action {
        PatchAction::Add => {
            seq.push(Value::Object(payload.clone()));
            true
        }
        PatchAction::Remove => false,
    }
}

// Numbers compare by value so that `1` and `1.0` address the same entry.
fn same_key(a: Option<&Value>, b: Option<&Value>) -> bool {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

/// Replaces, appends or removes a whole component, matched by name.
pub fn patch_component(
    components: &mut Vec<ComponentSpec>,
    component: ComponentSpec,
    action: PatchAction,
) -> bool {
    let hit = components.iter().position(|c| c.name == component.name);
    match (hit, action) {
        (Some(i), PatchAction::Remove) => {
            components.remove(i);
            true
        }
        (Some(i), PatchAction::Add) => {
            components[i] = component;
            true
        }
        (None, PatchAction::Add) => {
            components.push(component);
            true
        }
        (None, PatchAction::Remove) => false,
    }
}

/// Patches the sequence held by `property` of `component`.
///
/// With a `sub_key`, the property must be a mapping whose `sub_key` entry
/// is the sequence. A missing property is left alone.
pub fn patch_property(
    component: &mut ComponentSpec,
    property: &str,
    sub_key: &str,
    payload: &Mapping,
    dedup_key: &str,
    action: PatchAction,
) -> Result<bool> {
    let Some(target) = component.properties.get_mut(property) else {
        return Ok(false);
    };

    let seq = if sub_key.is_empty() {
        match target {
            Value::Array(seq) => seq,
            other => {
                return Err(Error::BadConfig(format!(
                    "target property '{property}' is not valid: expected sequence, found {}",
                    shape(other)
                )))
            }
        }
    } else {
        let detail = match target {
            Value::Object(detail) => detail,
            other => {
                return Err(Error::BadConfig(format!(
                    "subKey '{sub_key}' is not valid: property '{property}' is a {}, not a mapping",
                    shape(other)
                )))
            }
        };
        match detail.get_mut(sub_key) {
            Some(Value::Array(seq)) => seq,
            Some(other) => {
                return Err(Error::BadConfig(format!(
                    "target properties are not valid: '{property}.{sub_key}' is a {}, not a sequence",
                    shape(other)
                )))
            }
            None => {
                return Err(Error::BadConfig(format!(
                    "subKey '{sub_key}' is not valid: not present in property '{property}'"
                )))
            }
        }
    };

    Ok(patch_sequence(seq, payload, dedup_key, action))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn mapping(value: Value) -> Mapping {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    fn seq(value: Value) -> Vec<Value> {
        match value {
            Value::Array(items) => items,
            _ => unreachable!(),
        }
    }

    fn component(name: &str, properties: Value) -> ComponentSpec {
        ComponentSpec {
            name: name.to_string(),
            properties: mapping(properties),
            ..Default::default()
        }
    }

    #[test]
    fn test_dedup_add_replaces_in_place() {
        let mut s = seq(json!([{"id": "a", "v": 1}, {"id": "b", "v": 2}]));
        let changed = patch_sequence(&mut s, &mapping(json!({"id": "a", "v": 9})), "id", PatchAction::Add);

        assert!(changed);
        assert_eq!(Value::Array(s), json!([{"id": "a", "v": 9}, {"id": "b", "v": 2}]));
    }

    #[test]
    fn test_dedup_remove() {
        let mut s = seq(json!([{"id": "a", "v": 1}, {"id": "b", "v": 2}]));
        let changed = patch_sequence(&mut s, &mapping(json!({"id": "a", "v": 9})), "id", PatchAction::Remove);

        assert!(changed);
        assert_eq!(Value::Array(s), json!([{"id": "b", "v": 2}]));
    }

    #[test]
    fn test_dedup_numeric_key_ignores_representation() {
        let mut s = seq(json!([{"port": 80, "proto": "tcp"}, {"port": "80"}]));
        let changed = patch_sequence(&mut s, &mapping(json!({"port": 80.0, "proto": "udp"})), "port", PatchAction::Add);

        assert!(changed);
        assert_eq!(Value::Array(s), json!([{"port": 80.0, "proto": "udp"}, {"port": "80"}]));
    }

    #[test]
    fn test_dedup_add_twice_keeps_one_entry() {
        let mut s = Vec::new();
        let payload = mapping(json!({"id": "a"}));
        patch_sequence(&mut s, &payload, "id", PatchAction::Add);
        patch_sequence(&mut s, &payload, "id", PatchAction::Add);
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn test_without_dedup_add_appends_twice() {
        let mut s = Vec::new();
        let payload = mapping(json!({"id": "a"}));
        patch_sequence(&mut s, &payload, "", PatchAction::Add);
        patch_sequence(&mut s, &payload, "", PatchAction::Add);
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn test_without_dedup_remove_never_matches() {
        let mut s = seq(json!([{"id": "a"}]));
        let changed = patch_sequence(&mut s, &mapping(json!({"id": "a"})), "", PatchAction::Remove);
        assert!(!changed);
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn test_dedup_remove_without_match_is_unchanged() {
        let mut s = seq(json!([{"id": "a"}, "scalar"]));
        let changed = patch_sequence(&mut s, &mapping(json!({"id": "z"})), "id", PatchAction::Remove);
        assert!(!changed);
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn test_component_upsert_and_remove() {
        let mut components = vec![component("web", json!({"image": "v1"}))];

        assert!(patch_component(&mut components, component("web", json!({"image": "v2"})), PatchAction::Add));
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].properties["image"], json!("v2"));

        assert!(patch_component(&mut components, component("db", json!({})), PatchAction::Add));
        assert_eq!(components.len(), 2);

        assert!(patch_component(&mut components, component("web", json!({})), PatchAction::Remove));
        assert_eq!(components.len(), 1);
        assert!(!patch_component(&mut components, component("ghost", json!({})), PatchAction::Remove));
    }

    #[test]
    fn test_property_sequence() {
        let mut c = component("web", json!({"ports": [{"port": 80}]}));
        let changed = patch_property(&mut c, "ports", "", &mapping(json!({"port": 443})), "port", PatchAction::Add).unwrap();
        assert!(changed);
        assert_eq!(c.properties["ports"], json!([{"port": 80}, {"port": 443}]));
    }

    #[test]
    fn test_property_sub_key() {
        let mut c = component("web", json!({"routing": {"mode": "strict", "routes": [{"path": "/a"}]}}));
        let changed = patch_property(&mut c, "routing", "routes", &mapping(json!({"path": "/a", "to": "x"})), "path", PatchAction::Add).unwrap();
        assert!(changed);
        assert_eq!(
            c.properties["routing"],
            json!({"mode": "strict", "routes": [{"path": "/a", "to": "x"}]})
        );
    }

    #[test]
    fn test_missing_property_is_noop() {
        let mut c = component("web", json!({}));
        let changed = patch_property(&mut c, "ports", "", &Mapping::new(), "", PatchAction::Add).unwrap();
        assert!(!changed);
    }

    #[test]
    fn test_shape_violations_are_bad_config() {
        let payload = Mapping::new();
        let mut c = component("web", json!({"flat": "x", "detail": {"list": 1}}));

        for (property, sub_key) in [("flat", ""), ("flat", "list"), ("detail", "list"), ("detail", "absent")] {
            let err = patch_property(&mut c, property, sub_key, &payload, "", PatchAction::Add).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::BadConfig, "{property}/{sub_key}");
        }
    }
}
