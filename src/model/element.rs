use super::Discipline;
use crate::error::AttributeError;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Quantity names checked, in order, for a volume estimate.
const VOLUME_KEYS: &[&str] = &["NetVolume", "GrossVolume", "Volume"];

/// Format-specific properties with no first-class field on [`Element`].
///
/// Keys are unique and never empty. Values are `serde_json::Value`, so they
/// are JSON-representable by construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Attributes(BTreeMap<String, Value>);

impl Attributes {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value, replacing any previous value under the same key.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<(), AttributeError> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(AttributeError::EmptyKey);
        }
        self.0.insert(key, value.into());
        Ok(())
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// First positive volume quantity found in the bag.
    #[must_use]
    pub fn volume_quantity(&self) -> Option<f64> {
        VOLUME_KEYS
            .iter()
            .filter_map(|key| self.0.get(*key).and_then(Value::as_f64))
            .find(|v| v.is_finite() && *v > 0.0)
    }
}

impl TryFrom<BTreeMap<String, Value>> for Attributes {
    type Error = AttributeError;

    fn try_from(map: BTreeMap<String, Value>) -> Result<Self, Self::Error> {
        if map.keys().any(|k| k.trim().is_empty()) {
            return Err(AttributeError::EmptyKey);
        }
        Ok(Self(map))
    }
}

/// One normalized BIM entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub id: String,
    /// Empty when the source format carries no GUID.
    pub guid: String,
    pub discipline: Discipline,
    /// Source-format entity name, verbatim.
    pub entity_type: String,
    volume_estimated: Option<f64>,
    cost_estimated: Option<f64>,
    pub attributes: Attributes,
    /// Handle for out-of-band geometry lookup. Never dereferenced here.
    pub geometry_ref: Option<String>,
}

impl Element {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        entity_type: impl Into<String>,
        discipline: Discipline,
    ) -> Self {
        Self {
            id: id.into(),
            guid: String::new(),
            discipline,
            entity_type: entity_type.into(),
            volume_estimated: None,
            cost_estimated: None,
            attributes: Attributes::new(),
            geometry_ref: None,
        }
    }

    #[must_use]
    pub fn with_guid(mut self, guid: impl Into<String>) -> Self {
        self.guid = guid.into();
        self
    }

    #[must_use]
    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    #[must_use]
    pub fn with_geometry_ref(mut self, geometry_ref: impl Into<String>) -> Self {
        self.geometry_ref = Some(geometry_ref.into());
        self
    }

    /// Negative or non-finite values leave the estimate unset.
    pub fn set_volume_estimated(&mut self, volume: f64) {
        self.volume_estimated = valid_estimate(volume);
    }

    /// Negative or non-finite values leave the estimate unset.
    pub fn set_cost_estimated(&mut self, cost: f64) {
        self.cost_estimated = valid_estimate(cost);
    }

    /// `None` means "not computed", distinct from a computed zero.
    #[must_use]
    pub fn volume_estimated(&self) -> Option<f64> {
        self.volume_estimated
    }

    /// `None` means "not computed", distinct from a computed zero.
    #[must_use]
    pub fn cost_estimated(&self) -> Option<f64> {
        self.cost_estimated
    }
}

fn valid_estimate(value: f64) -> Option<f64> {
    (value.is_finite() && value >= 0.0).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rejects_empty_attribute_keys() {
        let mut attributes = Attributes::new();
        assert_eq!(attributes.insert("", "x"), Err(AttributeError::EmptyKey));
        assert_eq!(attributes.insert("   ", 1), Err(AttributeError::EmptyKey));
        assert!(attributes.insert("FireRating", "EI60").is_ok());
        assert_eq!(attributes.len(), 1);

        let map = BTreeMap::from([(String::new(), json!(1))]);
        assert_eq!(Attributes::try_from(map), Err(AttributeError::EmptyKey));
    }

    #[test]
    fn insert_replaces_existing_key() {
        let mut attributes = Attributes::new();
        attributes.insert("Name", "old").unwrap();
        attributes.insert("Name", "new").unwrap();
        assert_eq!(attributes.len(), 1);
        assert_eq!(attributes.get("Name"), Some(&json!("new")));
    }

    #[test]
    fn estimates_distinguish_unset_from_zero() {
        let mut element = Element::new("1", "IfcWall", Discipline::Architecture);
        assert_eq!(element.volume_estimated(), None);

        element.set_volume_estimated(0.0);
        assert_eq!(element.volume_estimated(), Some(0.0));

        element.set_volume_estimated(-2.5);
        assert_eq!(element.volume_estimated(), None);

        element.set_cost_estimated(f64::NAN);
        assert_eq!(element.cost_estimated(), None);
        element.set_cost_estimated(120.0);
        assert_eq!(element.cost_estimated(), Some(120.0));
    }

    #[test]
    fn volume_quantity_prefers_net_volume() {
        let mut attributes = Attributes::new();
        attributes.insert("GrossVolume", 3.0).unwrap();
        attributes.insert("NetVolume", 2.5).unwrap();
        assert_eq!(attributes.volume_quantity(), Some(2.5));

        let mut only_gross = Attributes::new();
        only_gross.insert("NetVolume", 0.0).unwrap();
        only_gross.insert("GrossVolume", 3.0).unwrap();
        assert_eq!(only_gross.volume_quantity(), Some(3.0));

        let mut textual = Attributes::new();
        textual.insert("Volume", "large").unwrap();
        assert_eq!(textual.volume_quantity(), None);
    }
}
