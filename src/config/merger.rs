//! Layering of YAML configuration values.
//!
//! # Merge Rules
//!
//! - Mappings merge key by key, recursively
//! - Sequences are replaced as a whole, so a local `disabled_backends`
//!   list overrides the project's list rather than extending it
//! - `~` (null) in a later layer removes the key, restoring the default
//! - Scalars in later layers replace earlier ones

use serde_yaml::Value;

/// Merge `overlay` onto `base`, overlay winning at each conflict.
pub fn deep_merge(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            let mut result = base_map.clone();

            for (key, overlay_value) in overlay_map {
                if overlay_value.is_null() {
                    result.remove(key);
                } else if let Some(base_value) = base_map.get(key) {
                    result.insert(key.clone(), deep_merge(base_value, overlay_value));
                } else {
                    result.insert(key.clone(), overlay_value.clone());
                }
            }

            Value::Mapping(result)
        }

        (_, overlay) => overlay.clone(),
    }
}

/// Merge layers in order; the last has the highest priority.
pub fn merge_configs(configs: &[Value]) -> Value {
    configs
        .iter()
        .fold(Value::Mapping(Default::default()), |acc, config| {
            deep_merge(&acc, config)
        })
}
