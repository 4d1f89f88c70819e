//! Parsing of Python core metadata (`PKG-INFO` / `METADATA`).
//!
//! The format is a sequence of RFC 822 style `Key: value` headers, optionally
//! followed by a blank line and a free-form body holding the long description.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::traits::PackageMetadata;

/// The value of a metadata attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Single(String),
    Multi(Vec<String>),
}

impl FieldValue {
    /// Returns the value of a single-valued field.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Single(value) => Some(value),
            FieldValue::Multi(_) => None,
        }
    }

    /// Iterates the values regardless of arity.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        let values: &[String] = match self {
            FieldValue::Single(value) => std::slice::from_ref(value),
            FieldValue::Multi(values) => values,
        };
        values.iter().map(String::as_str)
    }
}

/// Metadata record of a single distribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreMetadata {
    pub name: String,
    pub version: String,
    /// Every field found in the metadata file, `name` and `version` included.
    pub attributes: BTreeMap<String, FieldValue>,
}

impl CoreMetadata {
    /// Parses metadata text. Returns `None` when `Name` or `Version` is
    /// missing or empty.
    pub fn parse(content: &str) -> Option<Self> {
        let attributes = parse_fields(content);

        let name = attributes.get("name")?.as_str()?.trim().to_string();
        let version = attributes.get("version")?.as_str()?.trim().to_string();
        if name.is_empty() || version.is_empty() {
            return None;
        }

        Some(Self {
            name,
            version,
            attributes,
        })
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.attributes.get(key)
    }
}

impl PackageMetadata for CoreMetadata {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn attributes(&self) -> &BTreeMap<String, FieldValue> {
        &self.attributes
    }
}

/// Maps a header name to its attribute key and whether it may repeat.
fn attribute_key(header: &str) -> (String, bool) {
    let key = header.trim().to_ascii_lowercase().replace('-', "_");
    let plural = match key.as_str() {
        "classifier" => Some("classifiers"),
        "platform" => Some("platforms"),
        "supported_platform" => Some("supported_platforms"),
        "provides_extra" => Some("provides_extras"),
        "project_url" => Some("project_urls"),
        "license_file" => Some("license_files"),
        "requires" | "provides" | "obsoletes" | "requires_dist" | "provides_dist"
        | "obsoletes_dist" | "requires_external" | "dynamic" => None,
        _ => return (key, false),
    };

    match plural {
        Some(plural) => (plural.to_string(), true),
        None => (key, true),
    }
}

fn insert_field(fields: &mut BTreeMap<String, FieldValue>, header: &str, value: String) {
    let (key, multi) = attribute_key(header);

    if !multi {
        fields.entry(key).or_insert(FieldValue::Single(value));
        return;
    }

    match fields.entry(key).or_insert_with(|| FieldValue::Multi(Vec::new())) {
        FieldValue::Multi(values) => values.push(value),
        FieldValue::Single(_) => {}
    }
}

fn parse_fields(content: &str) -> BTreeMap<String, FieldValue> {
    let mut fields = BTreeMap::new();
    let mut current: Option<(String, String)> = None;
    let mut lines = content.lines();
    let mut body = Vec::new();

    for line in lines.by_ref() {
        if line.is_empty() {
            break;
        }

        // A whitespace-only line is a folded blank line inside the current value.
        if line.starts_with([' ', '\t']) {
            if let Some((_, value)) = current.as_mut() {
                let folded = line.trim_start();
                let folded = folded.strip_prefix('|').unwrap_or(folded);
                value.push('\n');
                value.push_str(folded);
            }
            continue;
        }

        if let Some((header, value)) = current.take() {
            insert_field(&mut fields, &header, value);
        }

        if let Some((header, value)) = line.split_once(':') {
            current = Some((header.to_string(), value.trim().to_string()));
        }
    }

    if let Some((header, value)) = current.take() {
        insert_field(&mut fields, &header, value);
    }

    body.extend(lines);
    let body = body.join("\n");
    let body = body.trim_matches('\n');
    if !body.trim().is_empty() {
        fields.insert(
            "description".to_string(),
            FieldValue::Single(body.to_string()),
        );
    }

    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    const PKG_INFO: &str = "\
Metadata-Version: 1.1
Name: foo
Version: 1.0
Summary: A sample package
Author: Jane Doe
Author-email: x@example.com
Maintainer-email: Ops <ops@example.com>
License: MIT
Description: First line
        |  indented second line
Platform: any
Classifier: Development Status :: 5 - Production/Stable
Classifier: Programming Language :: Python
";

    #[test]
    fn test_parse_core_fields() {
        let meta = CoreMetadata::parse(PKG_INFO).unwrap();

        assert_eq!(meta.name(), "foo");
        assert_eq!(meta.version(), "1.0");
        assert_eq!(
            meta.get("author_email").and_then(FieldValue::as_str),
            Some("x@example.com")
        );
        assert_eq!(
            meta.get("metadata_version").and_then(FieldValue::as_str),
            Some("1.1")
        );
        assert_eq!(
            meta.get("name").and_then(FieldValue::as_str),
            Some("foo")
        );
    }

    #[test]
    fn test_parse_repeated_fields() {
        let meta = CoreMetadata::parse(PKG_INFO).unwrap();

        assert_eq!(
            meta.get("classifiers"),
            Some(&FieldValue::Multi(vec![
                "Development Status :: 5 - Production/Stable".to_string(),
                "Programming Language :: Python".to_string(),
            ]))
        );
        assert_eq!(
            meta.get("platforms"),
            Some(&FieldValue::Multi(vec!["any".to_string()]))
        );
    }

    #[test]
    fn test_parse_continuation_lines() {
        let meta = CoreMetadata::parse(PKG_INFO).unwrap();
        assert_eq!(
            meta.get("description").and_then(FieldValue::as_str),
            Some("First line\n  indented second line")
        );
    }

    #[test]
    fn test_parse_blank_continuation_keeps_later_headers() {
        let content = "\
Metadata-Version: 1.0
Name: foo
Version: 1.0
Description: Para one\n        \n        Para two
Platform: any
Classifier: Programming Language :: Python
";
        let meta = CoreMetadata::parse(content).unwrap();

        assert_eq!(
            meta.get("description").and_then(FieldValue::as_str),
            Some("Para one\n\nPara two")
        );
        assert_eq!(
            meta.get("platforms"),
            Some(&FieldValue::Multi(vec!["any".to_string()]))
        );
        assert_eq!(
            meta.get("classifiers"),
            Some(&FieldValue::Multi(vec![
                "Programming Language :: Python".to_string()
            ]))
        );
    }

    #[test]
    fn test_parse_body_is_description() {
        let content = "\
Metadata-Version: 2.1
Name: bar
Version: 2.0
Requires-Dist: requests>=2
Requires-Dist: click
Provides-Extra: cli
Project-URL: Homepage, https://example.com

# Bar

Long description.
";
        let meta = CoreMetadata::parse(content).unwrap();

        assert_eq!(
            meta.get("description").and_then(FieldValue::as_str),
            Some("# Bar\n\nLong description.")
        );
        assert_eq!(meta.get("requires_dist").unwrap().values().count(), 2);
        assert_eq!(
            meta.get("provides_extras"),
            Some(&FieldValue::Multi(vec!["cli".to_string()]))
        );
        assert_eq!(
            meta.get("project_urls"),
            Some(&FieldValue::Multi(vec![
                "Homepage, https://example.com".to_string()
            ]))
        );
    }

    #[test]
    fn test_parse_requires_name_and_version() {
        assert!(CoreMetadata::parse("Metadata-Version: 1.0\nName: foo\n").is_none());
        assert!(CoreMetadata::parse("Version: 1.0\n").is_none());
        assert!(CoreMetadata::parse("Name: \nVersion: 1.0\n").is_none());
        assert!(CoreMetadata::parse("").is_none());
    }

    #[test]
    fn test_field_value_values() {
        let single = FieldValue::Single("x".to_string());
        let multi = FieldValue::Multi(vec!["a".to_string(), "b".to_string()]);

        assert_eq!(single.values().collect::<Vec<_>>(), ["x"]);
        assert_eq!(multi.values().collect::<Vec<_>>(), ["a", "b"]);
        assert_eq!(multi.as_str(), None);
    }
}
