//! Frontmatter extraction, import loading, and feature merging.
//!
//! A workflow markdown file opens with a `---` fenced YAML block; the block
//! parses into a `serde_json::Value` map (key order preserved) and the rest
//! of the file is the markdown body. Imports resolve relative to the
//! importing file and contribute their `features:` sections in import order.

use crate::error::{Error, Result};
use crate::value::get_map_field_as_map;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Split a workflow document into its frontmatter map and markdown body.
///
/// A document without a frontmatter fence yields an empty map and the full
/// content as body. An unterminated fence or a non-mapping frontmatter root
/// is an error.
pub fn extract_frontmatter(content: &str) -> Result<(Map<String, Value>, String)> {
    let mut lines = content.lines();
    match lines.next() {
        Some(first) if first.trim_end() == "---" => {}
        _ => return Ok((Map::new(), content.to_string())),
    }

    let mut yaml_lines: Vec<&str> = Vec::new();
    let mut body_lines: Vec<&str> = Vec::new();
    let mut terminated = false;
    for line in lines {
        if !terminated && line.trim_end() == "---" {
            terminated = true;
            continue;
        }
        if terminated {
            body_lines.push(line);
        } else {
            yaml_lines.push(line);
        }
    }
    if !terminated {
        return Err(Error::Frontmatter("unterminated frontmatter fence".to_string()));
    }

    let yaml_text = yaml_lines.join("\n");
    let parsed: Value = serde_yaml::from_str(&yaml_text)?;
    let map = match parsed {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        _ => return Err(Error::Frontmatter("frontmatter is not a mapping".to_string())),
    };
    Ok((map, body_lines.join("\n")))
}

/// Load the feature sets contributed by import fragments, in import order.
///
/// Each import path resolves relative to `base_dir`. Markdown imports carry
/// their features inside a frontmatter block; `.yml`/`.yaml` imports are
/// bare YAML mappings. A missing or unparsable import fails the compile of
/// the importing workflow.
pub fn load_imported_features(base_dir: &Path, imports: &[String]) -> Result<Vec<Map<String, Value>>> {
    let mut feature_sets = Vec::new();
    for import in imports {
        let path = base_dir.join(import);
        let content = fs::read_to_string(&path).map_err(|e| Error::Import {
            path: import.clone(),
            reason: e.to_string(),
        })?;
        let map = if import.ends_with(".md") {
            extract_frontmatter(&content)
                .map_err(|e| Error::Import {
                    path: import.clone(),
                    reason: e.to_string(),
                })?
                .0
        } else {
            let parsed: Value = serde_yaml::from_str(&content).map_err(|e| Error::Import {
                path: import.clone(),
                reason: e.to_string(),
            })?;
            match parsed {
                Value::Object(map) => map,
                Value::Null => Map::new(),
                _ => {
                    return Err(Error::Import {
                        path: import.clone(),
                        reason: "import is not a mapping".to_string(),
                    })
                }
            }
        };
        let features = get_map_field_as_map(Some(&map), "features")
            .cloned()
            .unwrap_or_default();
        debug!("import '{import}' contributed {} feature(s)", features.len());
        feature_sets.push(features);
    }
    Ok(feature_sets)
}

/// Merge top-level features with imported feature sets.
///
/// Any key present in the top-level set wins over every import. Among the
/// imports, the earliest occurrence of a key wins; later values for that
/// key are discarded. Neither input is mutated. The error return is
/// reserved for schema-level validation and is threaded through callers.
pub fn merge_features(
    top_features: Option<&Map<String, Value>>,
    imported_features: &[Map<String, Value>],
) -> Result<Map<String, Value>> {
    let mut merged = top_features.cloned().unwrap_or_default();
    for imported in imported_features {
        for (key, value) in imported {
            if !merged.contains_key(key) {
                merged.insert(key.clone(), value.clone());
            }
        }
    }
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::tempdir;

    fn map(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_extract_frontmatter_splits_yaml_and_body() {
        let content = "---\nname: Triage\non:\n  issues:\n---\n\n# Instructions\n\nDo the thing.";
        let (frontmatter, body) = extract_frontmatter(content).unwrap();
        assert_eq!(frontmatter.get("name"), Some(&json!("Triage")));
        assert!(frontmatter.contains_key("on"));
        assert!(body.contains("# Instructions"));
        assert!(!body.contains("---"));
    }

    #[test]
    fn test_extract_frontmatter_without_fence() {
        let content = "# Just markdown\n";
        let (frontmatter, body) = extract_frontmatter(content).unwrap();
        assert!(frontmatter.is_empty());
        assert_eq!(body, content);
    }

    #[test]
    fn test_extract_frontmatter_unterminated_fence_errors() {
        let content = "---\nname: Broken\n\nNo closing fence.";
        assert!(extract_frontmatter(content).is_err());
    }

    #[test]
    fn test_extract_frontmatter_non_mapping_errors() {
        let content = "---\n- a\n- b\n---\nbody";
        assert!(extract_frontmatter(content).is_err());
    }

    #[test]
    fn test_extract_frontmatter_empty_block() {
        let content = "---\n---\nbody";
        let (frontmatter, body) = extract_frontmatter(content).unwrap();
        assert!(frontmatter.is_empty());
        assert_eq!(body, "body");
    }

    #[test]
    fn test_merge_features_with_no_imports() {
        let top = map(json!({"feature1": true, "feature2": false}));
        let result = merge_features(Some(&top), &[]).unwrap();
        assert_eq!(result, top);
    }

    #[test]
    fn test_merge_features_with_nil_top_level_and_imports() {
        let imports = vec![map(json!({"feature1": true, "feature2": "enabled"}))];
        let result = merge_features(None, &imports).unwrap();
        assert_eq!(result.get("feature1"), Some(&json!(true)));
        assert_eq!(result.get("feature2"), Some(&json!("enabled")));
    }

    #[test]
    fn test_merge_features_with_single_import() {
        let top = map(json!({"top-feature": true}));
        let imports = vec![map(json!({"imported-feature1": true, "imported-feature2": false}))];
        let result = merge_features(Some(&top), &imports).unwrap();
        assert_eq!(result.get("top-feature"), Some(&json!(true)));
        assert_eq!(result.get("imported-feature1"), Some(&json!(true)));
        assert_eq!(result.get("imported-feature2"), Some(&json!(false)));
        assert_eq!(result.len(), 3);
    }

    #[test]
    fn test_merge_features_with_multiple_imports() {
        let top = map(json!({"top-feature": true}));
        let imports = vec![
            map(json!({"import1-feature": "value1"})),
            map(json!({"import2-feature": 123})),
            map(json!({"import3-feature": false})),
        ];
        let result = merge_features(Some(&top), &imports).unwrap();
        assert_eq!(result.get("import1-feature"), Some(&json!("value1")));
        assert_eq!(result.get("import2-feature"), Some(&json!(123)));
        assert_eq!(result.get("import3-feature"), Some(&json!(false)));
        assert_eq!(result.len(), 4);
    }

    #[test]
    fn test_merge_features_top_level_precedence() {
        let top = map(json!({"shared-feature": "top-level-value", "top-only": true}));
        let imports = vec![map(json!({"shared-feature": "imported-value", "import-only": false}))];
        let result = merge_features(Some(&top), &imports).unwrap();
        assert_eq!(result.get("shared-feature"), Some(&json!("top-level-value")));
        assert_eq!(result.get("top-only"), Some(&json!(true)));
        assert_eq!(result.get("import-only"), Some(&json!(false)));
        assert_eq!(result.len(), 3);
    }

    #[test]
    fn test_merge_features_first_import_wins_on_conflicts() {
        let top = map(json!({"top-feature": "top"}));
        let imports = vec![
            map(json!({"feature-a": "first-import", "feature-b": 100})),
            // feature-a here is discarded: first import wins
            map(json!({"feature-a": "second-import", "feature-c": true})),
        ];
        let result = merge_features(Some(&top), &imports).unwrap();
        assert_eq!(result.get("feature-a"), Some(&json!("first-import")));
        assert_eq!(result.get("feature-b"), Some(&json!(100)));
        assert_eq!(result.get("feature-c"), Some(&json!(true)));
        assert_eq!(result.len(), 4);
    }

    #[test]
    fn test_merge_features_various_value_types() {
        let top = map(json!({"bool-feature": true, "string-feature": "enabled"}));
        let imports = vec![map(json!({
            "int-feature": 42,
            "float-feature": 3.14,
            "nil-feature": null,
            "array-feature": ["a", "b", "c"],
            "map-feature": {"nested": "value"}
        }))];
        let result = merge_features(Some(&top), &imports).unwrap();
        assert_eq!(result.get("int-feature"), Some(&json!(42)));
        assert_eq!(result.get("float-feature"), Some(&json!(3.14)));
        assert_eq!(result.get("nil-feature"), Some(&json!(null)));
        assert_eq!(result.get("array-feature"), Some(&json!(["a", "b", "c"])));
        assert_eq!(result.get("map-feature"), Some(&json!({"nested": "value"})));
    }

    #[test]
    fn test_merge_features_empty_top_level_with_multiple_imports() {
        let top = Map::new();
        let imports = vec![map(json!({"feature1": true})), map(json!({"feature2": false}))];
        let result = merge_features(Some(&top), &imports).unwrap();
        assert_eq!(result.get("feature1"), Some(&json!(true)));
        assert_eq!(result.get("feature2"), Some(&json!(false)));
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_merge_features_preserves_top_level_on_same_key() {
        let top = map(json!({"feature": false}));
        let imports = vec![map(json!({"feature": true}))];
        let result = merge_features(Some(&top), &imports).unwrap();
        assert_eq!(result.get("feature"), Some(&json!(false)));
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn test_merge_features_does_not_mutate_inputs() {
        let top = map(json!({"a": 1}));
        let imports = vec![map(json!({"a": 2, "b": 3}))];
        let _ = merge_features(Some(&top), &imports).unwrap();
        assert_eq!(top, map(json!({"a": 1})));
        assert_eq!(imports[0], map(json!({"a": 2, "b": 3})));
    }

    #[test]
    fn test_load_imported_features_from_markdown_and_yaml() {
        let dir = tempdir().unwrap();
        let base = dir.path();
        let mut md = fs::File::create(base.join("shared.md")).unwrap();
        writeln!(md, "---\nfeatures:\n  alpha: true\n---\nShared instructions.").unwrap();
        fs::write(base.join("extra.yml"), "features:\n  beta: 2\n").unwrap();

        let sets = load_imported_features(
            base,
            &["shared.md".to_string(), "extra.yml".to_string()],
        )
        .unwrap();
        assert_eq!(sets.len(), 2);
        assert_eq!(sets[0].get("alpha"), Some(&json!(true)));
        assert_eq!(sets[1].get("beta"), Some(&json!(2)));
    }

    #[test]
    fn test_load_imported_features_missing_file_errors() {
        let dir = tempdir().unwrap();
        let err = load_imported_features(dir.path(), &["nope.md".to_string()]).unwrap_err();
        assert!(err.to_string().contains("nope.md"));
    }

    #[test]
    fn test_load_imported_features_without_features_section() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("plain.yml"), "name: shared\n").unwrap();
        let sets = load_imported_features(dir.path(), &["plain.yml".to_string()]).unwrap();
        assert_eq!(sets.len(), 1);
        assert!(sets[0].is_empty());
    }
}
