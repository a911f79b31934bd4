pub mod engine;
pub mod factory;
pub mod ifc;
pub mod step;

pub use crate::error::ParseError;
pub use engine::{ExtractionEngine, RawEntity};
pub use factory::ParserFactory;
pub use ifc::{IfcParser, StepEngine};
pub use step::{StepEntity, StepFile, StepValue};

use crate::classify::classify;
use crate::export::{to_document_with, Document, ExportOptions};
use crate::format::FileFormat;
use crate::model::{Attributes, Discipline, Element, ModelMetadata};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::io;
use std::path::Path;

/// Contract shared by every format parser.
///
/// A parser holds the result of its latest successful [`parse`](Self::parse).
/// Before that, or after a failed parse, it reports the empty state:
/// [`ModelMetadata::empty`] and no elements.
pub trait BimParser: Send + Sync {
    /// Format this parser reads.
    fn format(&self) -> FileFormat;

    /// Parses the file at `path`, replacing any previous state.
    ///
    /// # Errors
    ///
    /// - [`ParseError::FileNotFound`] if `path` does not exist.
    /// - [`ParseError::MalformedInput`] if the content fails validation.
    /// - [`ParseError::ParseFailure`] / [`ParseError::Extraction`] for I/O
    ///   and engine failures.
    ///
    /// On error the parser is left in the empty state.
    fn parse(&mut self, path: &Path) -> Result<(), ParseError>;

    fn metadata(&self) -> &ModelMetadata;

    /// Elements in extraction order. Empty is a valid outcome.
    fn elements(&self) -> &[Element];

    /// Canonical export document of the current state. Performs no I/O.
    fn export_to_json(&self) -> Document {
        self.export_to_json_with(ExportOptions::default())
    }

    fn export_to_json_with(&self, options: ExportOptions) -> Document {
        to_document_with(self.metadata(), self.elements(), options)
    }
}

/// Reads the whole source file, telling a missing path apart from other I/O errors.
pub(crate) fn read_source(path: &Path) -> Result<Vec<u8>, ParseError> {
    std::fs::read(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => ParseError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => ParseError::ParseFailure {
            path: path.to_path_buf(),
            source,
        },
    })
}

/// Classifies raw engine entities and wraps them into elements.
///
/// Entities without a label get their 1-based position as id. An entity
/// whose own type is unmapped is classified by its type object.
pub(crate) fn normalize(raw: Vec<RawEntity>) -> Result<Vec<Element>, ParseError> {
    let mut seen_ids = HashSet::with_capacity(raw.len());
    let mut elements = Vec::with_capacity(raw.len());

    for (index, entity) in raw.into_iter().enumerate() {
        let entity_type = entity.entity_type.trim();
        if entity_type.is_empty() {
            return Err(ParseError::malformed(format!(
                "entity at position {} has no type",
                index + 1
            )));
        }

        let id = entity
            .label
            .filter(|label| !label.trim().is_empty())
            .unwrap_or_else(|| (index + 1).to_string());
        if !seen_ids.insert(id.clone()) {
            return Err(ParseError::malformed(format!("duplicate element id '{id}'")));
        }

        let attributes = Attributes::try_from(entity.attributes)
            .map_err(|e| ParseError::malformed(format!("element '{id}': {e}")))?;

        let discipline = match classify(entity_type) {
            Discipline::Unknown => entity
                .type_object
                .as_deref()
                .map_or(Discipline::Unknown, classify),
            discipline => discipline,
        };

        let mut element = Element::new(id, entity_type, discipline)
            .with_guid(entity.guid)
            .with_attributes(attributes);
        if let Some(geometry_ref) = entity.geometry_ref {
            element = element.with_geometry_ref(geometry_ref);
        }
        if let Some(volume) = element.attributes.volume_quantity() {
            element.set_volume_estimated(volume);
        }

        elements.push(element);
    }

    Ok(elements)
}

/// Lowercase hex SHA-256 of the file content.
#[must_use]
pub fn fingerprint(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalize_classifies_and_keeps_order() {
        let raw = vec![
            RawEntity::new("IFCDUCTSEGMENT", "g1").with_label("20"),
            RawEntity::new("IFCBUILDINGELEMENTPROXY", "g2").with_label("10"),
            RawEntity::new("IFCCOLUMN", "").with_label("30"),
        ];

        let elements = normalize(raw).unwrap();
        let ids: Vec<&str> = elements.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["20", "10", "30"]);
        assert_eq!(elements[0].discipline, Discipline::Hvac);
        assert_eq!(elements[1].discipline, Discipline::Unknown);
        assert_eq!(elements[2].discipline, Discipline::Structure);
        assert_eq!(elements[2].guid, "");
    }

    #[test]
    fn normalize_classifies_generic_entities_by_type_object() {
        let raw = vec![
            RawEntity::new("IFCFLOWSEGMENT", "a").with_type_object("IFCDUCTSEGMENTTYPE"),
            RawEntity::new("IFCFLOWSEGMENT", "b").with_type_object("IFCCABLESEGMENTTYPE"),
            RawEntity::new("IFCFLOWTERMINAL", "c").with_type_object("IFCSANITARYTERMINALTYPE"),
            RawEntity::new("IFCFLOWSEGMENT", "d"),
            // Own type wins over the type object
            RawEntity::new("IFCWALL", "e").with_type_object("IFCPIPESEGMENTTYPE"),
        ];

        let elements = normalize(raw).unwrap();
        let disciplines: Vec<Discipline> = elements.iter().map(|e| e.discipline).collect();
        assert_eq!(
            disciplines,
            [
                Discipline::Hvac,
                Discipline::Electrical,
                Discipline::Plumbing,
                Discipline::Unknown,
                Discipline::Architecture,
            ]
        );
        assert_eq!(elements[0].entity_type, "IFCFLOWSEGMENT");
    }

    #[test]
    fn normalize_falls_back_to_position_ids() {
        let raw = vec![RawEntity::new("OST_Walls", ""), RawEntity::new("OST_Doors", "")];
        let elements = normalize(raw).unwrap();
        assert_eq!(elements[0].id, "1");
        assert_eq!(elements[1].id, "2");
    }

    #[test]
    fn normalize_rejects_invalid_entities() {
        let untyped = vec![RawEntity::new("  ", "g")];
        assert!(matches!(normalize(untyped), Err(ParseError::MalformedInput { .. })));

        let duplicated = vec![
            RawEntity::new("IFCWALL", "a").with_label("1"),
            RawEntity::new("IFCWALL", "b").with_label("1"),
        ];
        assert!(matches!(normalize(duplicated), Err(ParseError::MalformedInput { .. })));

        let bad_key = vec![RawEntity::new("IFCWALL", "a").with_attribute("", 1)];
        assert!(matches!(normalize(bad_key), Err(ParseError::MalformedInput { .. })));
    }

    #[test]
    fn normalize_derives_volume_from_quantities() {
        let raw = vec![
            RawEntity::new("IFCSLAB", "a")
                .with_attribute("NetVolume", json!(4.2))
                .with_geometry_ref("#88"),
            RawEntity::new("IFCSLAB", "b"),
        ];
        let elements = normalize(raw).unwrap();
        assert_eq!(elements[0].volume_estimated(), Some(4.2));
        assert_eq!(elements[0].geometry_ref.as_deref(), Some("#88"));
        assert_eq!(elements[1].volume_estimated(), None);
        assert_eq!(elements[1].cost_estimated(), None);
    }

    #[test]
    fn fingerprint_is_sha256_hex() {
        assert_eq!(
            fingerprint(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(fingerprint(b"abc").len(), 64);
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = read_source(Path::new("definitely/missing.ifc")).unwrap_err();
        assert!(matches!(err, ParseError::FileNotFound { .. }));
    }
}
