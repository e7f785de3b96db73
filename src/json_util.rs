use serde_json::Value;

pub fn first_string(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| {
        value
            .get(key)
            .and_then(|v| v.as_str())
            .map(|text| text.trim())
            .filter(|text| !text.is_empty())
            .map(|text| text.to_string())
    })
}

pub fn string_at(value: &Value, path: &[&str]) -> Option<String> {
    let mut cursor = value;
    for key in path {
        cursor = cursor.get(key)?;
    }
    cursor
        .as_str()
        .map(|text| text.trim())
        .filter(|text| !text.is_empty())
        .map(|text| text.to_string())
}

pub fn first_array<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Vec<Value>> {
    keys.iter()
        .find_map(|key| value.get(key).and_then(|v| v.as_array()))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn first_string_skips_absent_and_blank_keys() {
        let value = json!({ "display_name": "", "external_name": " TP53 " });
        assert_eq!(
            first_string(&value, &["display_name", "external_name"]).as_deref(),
            Some("TP53")
        );
        assert_eq!(first_string(&value, &["missing"]), None);
    }

    #[test]
    fn first_string_ignores_non_string_values() {
        let value = json!({ "count": 3, "name": "BRCA2" });
        assert_eq!(
            first_string(&value, &["count", "name"]).as_deref(),
            Some("BRCA2")
        );
    }

    #[test]
    fn string_at_walks_nested_objects() {
        let value = json!({ "geneName": { "value": "TP53" } });
        assert_eq!(
            string_at(&value, &["geneName", "value"]).as_deref(),
            Some("TP53")
        );
        assert_eq!(string_at(&value, &["geneName", "missing"]), None);
    }

    #[test]
    fn first_array_probes_in_order() {
        let value = json!({ "data": [1, 2], "results": [3] });
        let found = first_array(&value, &["results", "data"]).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(first_array(&value, &["missing"]), None);
    }
}
