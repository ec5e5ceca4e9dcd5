//! Plugin application ordering
//!
//! Plugin ids must resolve against the known registry, and the declared
//! application order must respect the ordering constraints between them.
//! The Flutter Gradle plugin must be applied after the Android and Kotlin
//! Gradle plugins.

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use renormind_core::validation::{ValidationError, ValidationResult};
use std::collections::BTreeMap;

/// The Android application plugin
pub const ANDROID_APPLICATION: &str = "com.android.application";
/// The Kotlin Android plugin
pub const KOTLIN_ANDROID: &str = "kotlin-android";
/// The Flutter Gradle plugin
pub const FLUTTER_GRADLE: &str = "dev.flutter.flutter-gradle-plugin";

/// Plugin ids the resolver can apply
const KNOWN_PLUGINS: &[&str] = &[
    ANDROID_APPLICATION,
    "com.android.library",
    KOTLIN_ANDROID,
    "org.jetbrains.kotlin.android",
    FLUTTER_GRADLE,
    "com.google.gms.google-services",
];

/// (before, after) pairs that must hold when both plugins are applied
const ORDERING_CONSTRAINTS: &[(&str, &str)] = &[
    (ANDROID_APPLICATION, FLUTTER_GRADLE),
    (KOTLIN_ANDROID, FLUTTER_GRADLE),
    ("org.jetbrains.kotlin.android", FLUTTER_GRADLE),
];

/// Validate the declared plugin list against the registry and the ordering
/// constraint graph.
pub fn check(plugins: &[String]) -> ValidationResult {
    let mut result = ValidationResult::new();

    let mut positions: BTreeMap<&str, usize> = BTreeMap::new();
    for (index, id) in plugins.iter().enumerate() {
        if !KNOWN_PLUGINS.contains(&id.as_str()) {
            result.add_error(ValidationError {
                field: format!("plugins[{}]", index),
                message: format!("Unresolved plugin id: {}", id),
                code: "PLUGIN_UNRESOLVED".to_string(),
                expected: Some(KNOWN_PLUGINS.join(", ")),
                actual: Some(id.clone()),
            });
            continue;
        }
        if positions.insert(id.as_str(), index).is_some() {
            result.add_error(ValidationError {
                field: format!("plugins[{}]", index),
                message: format!("Plugin applied twice: {}", id),
                code: "PLUGIN_ORDER".to_string(),
                expected: Some("each plugin applied once".to_string()),
                actual: Some(id.clone()),
            });
        }
    }

    // Constraint graph over the plugins actually present. Toposort guards
    // against contradictory constraints before the position check runs.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
    for &id in positions.keys() {
        graph.add_node(id);
    }
    for &(before, after) in ORDERING_CONSTRAINTS {
        if positions.contains_key(before) && positions.contains_key(after) {
            graph.add_edge(before, after, ());
        }
    }

    if toposort(&graph, None).is_err() {
        result.add_error(ValidationError {
            field: "plugins".to_string(),
            message: "Plugin ordering constraints are cyclic".to_string(),
            code: "PLUGIN_ORDER".to_string(),
            expected: None,
            actual: None,
        });
        return result;
    }

    for (before, after) in graph.all_edges().map(|(a, b, _)| (a, b)) {
        if positions[before] > positions[after] {
            result.add_error(ValidationError {
                field: "plugins".to_string(),
                message: format!("{} must be applied after {}", after, before),
                code: "PLUGIN_ORDER".to_string(),
                expected: Some(format!("{} before {}", before, after)),
                actual: Some(format!("{} before {}", after, before)),
            });
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_standard_order_is_valid() {
        let result = check(&ids(&[ANDROID_APPLICATION, KOTLIN_ANDROID, FLUTTER_GRADLE]));
        assert!(result.is_valid());
    }

    #[test]
    fn test_flutter_before_android_fails() {
        let result = check(&ids(&[FLUTTER_GRADLE, ANDROID_APPLICATION, KOTLIN_ANDROID]));
        assert!(!result.is_valid());
        assert!(result.errors().iter().all(|e| e.code == "PLUGIN_ORDER"));
    }

    #[test]
    fn test_unresolved_plugin_id_fails() {
        let result = check(&ids(&[ANDROID_APPLICATION, "com.example.mystery-plugin"]));
        assert!(!result.is_valid());
        assert_eq!(result.errors()[0].code, "PLUGIN_UNRESOLVED");
    }

    #[test]
    fn test_duplicate_plugin_fails() {
        let result = check(&ids(&[
            ANDROID_APPLICATION,
            ANDROID_APPLICATION,
            FLUTTER_GRADLE,
        ]));
        assert!(!result.is_valid());
    }

    #[test]
    fn test_constraints_only_bind_present_plugins() {
        // No flutter plugin, so the ordering edges never materialize.
        let result = check(&ids(&[KOTLIN_ANDROID, ANDROID_APPLICATION]));
        assert!(result.is_valid());
    }
}
