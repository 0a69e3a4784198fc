//! Server label payloads and JSON-lines command scripts.

use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::format::error::FormatError;
use crate::model::Annotation;
use crate::state::AnnotationCommand;

/// Completion payload of an image fetch.
///
/// `labels` is a JSON object keyed by annotation id. Entries are kept in
/// document order; the ids stored on each entry are authoritative.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImagesResponse {
    #[serde(
        default,
        deserialize_with = "labels_in_order",
        serialize_with = "labels_as_map"
    )]
    pub labels: Vec<Annotation>,
}

impl ImagesResponse {
    pub fn from_json(json: &str) -> Result<Self, FormatError> {
        Ok(serde_json::from_str(json)?)
    }
}

fn labels_in_order<'de, D>(deserializer: D) -> Result<Vec<Annotation>, D::Error>
where
    D: Deserializer<'de>,
{
    struct LabelsVisitor;

    impl<'de> Visitor<'de> for LabelsVisitor {
        type Value = Vec<Annotation>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of annotation id to annotation, or null")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut labels = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((_key, annotation)) = map.next_entry::<String, Annotation>()? {
                labels.push(annotation);
            }
            Ok(labels)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(LabelsVisitor)
}

fn labels_as_map<S>(labels: &[Annotation], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut map = serializer.serialize_map(Some(labels.len()))?;
    for annotation in labels {
        map.serialize_entry(annotation.id.as_str(), annotation)?;
    }
    map.end()
}

struct LabelMap<'a>(&'a [Annotation]);

impl Serialize for LabelMap<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        labels_as_map(self.0, serializer)
    }
}

/// Serialize annotations as a pretty `{ id: annotation }` object.
pub fn labels_to_json(annotations: &[Annotation]) -> Result<String, FormatError> {
    Ok(serde_json::to_string_pretty(&LabelMap(annotations))?)
}

/// Parse a JSON-lines command script. Blank lines are skipped.
pub fn parse_command_script(script: &str) -> Result<Vec<AnnotationCommand>, FormatError> {
    script
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line).map_err(|source| FormatError::Script {
                line: i + 1,
                source,
            })
        })
        .collect()
}
