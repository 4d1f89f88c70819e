use serde_json::{Map, Value};

/// Metadata attributes copied onto a release, keyed by normalised field name.
pub type PackageInfo = Map<String, Value>;

/// Converts a JSONB column value into [`PackageInfo`], treating anything that
/// is not an object as empty.
pub fn package_info_from_value(value: Value) -> PackageInfo {
    match value {
        Value::Object(map) => map,
        _ => PackageInfo::new(),
    }
}
