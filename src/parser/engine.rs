//! Port to the format-specific extraction engines.
//!
//! An engine turns raw file bytes into loosely-typed entity tuples. The
//! parsers never see an engine's own types, only [`RawEntity`], so any
//! engine (or a test double returning fixtures) can be plugged in.

use crate::error::ExtractionError;
use serde_json::Value;
use std::collections::BTreeMap;

/// One entity as reported by an extraction engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawEntity {
    /// Source-format entity type name.
    pub entity_type: String,
    /// Empty when the source has none.
    pub guid: String,
    pub attributes: BTreeMap<String, Value>,
    /// Engine-local identifier, if the format has one.
    pub label: Option<String>,
    pub geometry_ref: Option<String>,
    /// Entity name of the linked type object, e.g. `IFCDUCTSEGMENTTYPE`.
    pub type_object: Option<String>,
}

impl RawEntity {
    #[must_use]
    pub fn new(entity_type: impl Into<String>, guid: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            guid: guid.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_geometry_ref(mut self, geometry_ref: impl Into<String>) -> Self {
        self.geometry_ref = Some(geometry_ref.into());
        self
    }

    #[must_use]
    pub fn with_type_object(mut self, type_object: impl Into<String>) -> Self {
        self.type_object = Some(type_object.into());
        self
    }
}

/// Extracts raw entities from file content.
///
/// Implementations must be pure with respect to their input: no I/O, and
/// the same bytes always yield the same entities in the same order.
pub trait ExtractionEngine: Send + Sync {
    fn raw_entities(&self, bytes: &[u8]) -> Result<Vec<RawEntity>, ExtractionError>;
}
