use super::engine::{ExtractionEngine, RawEntity};
use super::step::{StepEntity, StepFile, StepValue};
use super::{file_name, fingerprint, normalize, read_source, BimParser};
use crate::error::{ExtractionError, ParseError};
use crate::format::FileFormat;
use crate::model::{Element, ModelMetadata};
use serde_json::{Number, Value};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Length of an IFC GlobalId (compressed base64 GUID).
const GLOBAL_ID_LEN: usize = 22;

/// Placed entities that are spatial containers, positioning aids, ports or
/// voids, not building elements.
const NON_ELEMENT_PRODUCTS: &[&str] = &[
    "IFCPROJECT",
    "IFCSITE",
    "IFCBUILDING",
    "IFCBUILDINGSTOREY",
    "IFCFACILITY",
    "IFCFACILITYPART",
    "IFCFACILITYPARTCOMMON",
    "IFCBRIDGE",
    "IFCBRIDGEPART",
    "IFCROAD",
    "IFCROADPART",
    "IFCRAILWAY",
    "IFCRAILWAYPART",
    "IFCMARINEFACILITY",
    "IFCMARINEPART",
    "IFCEXTERNALSPATIALELEMENT",
    "IFCSPATIALZONE",
    "IFCGRID",
    "IFCALIGNMENT",
    "IFCREFERENT",
    "IFCDISTRIBUTIONPORT",
    "IFCOPENINGELEMENT",
    "IFCOPENINGSTANDARDCASE",
    "IFCVOIDINGFEATURE",
];

/// Entities an `ObjectPlacement` attribute may point at.
const PLACEMENT_ENTITIES: &[&str] = &[
    "IFCLOCALPLACEMENT",
    "IFCGRIDPLACEMENT",
    "IFCLINEARPLACEMENT",
];

/// Quantity entities and the attribute index of their value.
const QUANTITY_ENTITIES: &[&str] = &[
    "IFCQUANTITYLENGTH",
    "IFCQUANTITYAREA",
    "IFCQUANTITYVOLUME",
    "IFCQUANTITYCOUNT",
    "IFCQUANTITYWEIGHT",
    "IFCQUANTITYTIME",
];
const QUANTITY_VALUE_INDEX: usize = 3;

/// Product attributes copied into the attribute bag, by index.
const PRODUCT_ATTRIBUTES: &[(usize, &str)] =
    &[(2, "Name"), (3, "Description"), (4, "ObjectType"), (7, "Tag")];

/// Reference parser for IFC (STEP physical file) models.
///
/// Entity extraction is delegated to an [`ExtractionEngine`]; the default
/// [`StepEngine`] reads the STEP text directly.
///
/// # Example
///
/// ```no_run
/// use bim_ingest::parser::{BimParser, IfcParser};
/// use std::path::Path;
///
/// let mut parser = IfcParser::new();
/// parser.parse(Path::new("model.ifc"))?;
/// println!("{} elements", parser.metadata().total_elements);
/// # Ok::<(), bim_ingest::error::ParseError>(())
/// ```
#[derive(Debug, Default)]
pub struct IfcParser<E = StepEngine> {
    engine: E,
    metadata: ModelMetadata,
    elements: Vec<Element>,
}

impl IfcParser {
    #[must_use]
    pub fn new() -> Self {
        Self::with_engine(StepEngine)
    }
}

impl<E: ExtractionEngine> IfcParser<E> {
    /// Creates a parser that extracts entities with `engine`.
    pub fn with_engine(engine: E) -> Self {
        Self {
            engine,
            metadata: ModelMetadata::empty(),
            elements: Vec::new(),
        }
    }
}

impl<E: ExtractionEngine> BimParser for IfcParser<E> {
    fn format(&self) -> FileFormat {
        FileFormat::Ifc
    }

    fn parse(&mut self, path: &Path) -> Result<(), ParseError> {
        self.metadata = ModelMetadata::empty();
        self.elements = Vec::new();

        let bytes = read_source(path)?;
        let raw = self.engine.raw_entities(&bytes)?;
        let elements = normalize(raw)?;

        self.metadata = ModelMetadata::summarize(
            fingerprint(&bytes),
            FileFormat::Ifc,
            file_name(path),
            &elements,
        );
        self.elements = elements;
        Ok(())
    }

    fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    fn elements(&self) -> &[Element] {
        &self.elements
    }
}

/// Extraction engine reading IFC products from STEP text.
///
/// Empty content yields no entities. Products are reported in STEP id
/// order with their identity attributes, single-value properties,
/// element quantities and containing storey.
#[derive(Debug, Clone, Copy, Default)]
pub struct StepEngine;

impl ExtractionEngine for StepEngine {
    fn raw_entities(&self, bytes: &[u8]) -> Result<Vec<RawEntity>, ExtractionError> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        let content = std::str::from_utf8(bytes).map_err(|e| {
            ExtractionError::Malformed(format!("content is not valid UTF-8: {e}"))
        })?;
        let step_file = StepFile::parse(content)?;

        let element_properties = extract_property_sets(&step_file);
        let element_storeys = extract_storey_names(&step_file);
        let element_types = extract_type_objects(&step_file);

        Ok(step_file
            .entities
            .values()
            .filter(|entity| is_element(&step_file, entity))
            .map(|entity| {
                let mut raw = to_raw_entity(entity, &element_properties, &element_storeys);
                if let Some(type_object) = element_types.get(&entity.id) {
                    raw = raw.with_type_object(type_object.clone());
                }
                raw
            })
            .collect())
    }
}

/// IfcProduct subtypes outside the spatial structure: a GlobalId at index 0
/// and an `ObjectPlacement` at index 5 that resolves to a placement entity.
/// Non-products such as `IfcActor` also hold a reference at index 5.
fn is_element(step_file: &StepFile, entity: &StepEntity) -> bool {
    let entity_type = entity.entity_type.to_ascii_uppercase();
    if entity_type.starts_with("IFCREL") || NON_ELEMENT_PRODUCTS.contains(&entity_type.as_str()) {
        return false;
    }

    let has_global_id = entity
        .values
        .first()
        .and_then(StepValue::as_str)
        .is_some_and(|g| g.chars().count() == GLOBAL_ID_LEN);
    let has_placement = entity
        .values
        .get(5)
        .and_then(StepValue::as_reference)
        .and_then(|id| step_file.get_entity(id))
        .is_some_and(|placement| PLACEMENT_ENTITIES.iter().any(|t| placement.is(t)));

    has_global_id && has_placement
}

fn to_raw_entity(
    entity: &StepEntity,
    element_properties: &HashMap<u64, BTreeMap<String, Value>>,
    element_storeys: &HashMap<u64, String>,
) -> RawEntity {
    let guid = entity
        .values
        .first()
        .and_then(StepValue::as_str)
        .unwrap_or_default();

    let mut raw = RawEntity::new(entity.entity_type.clone(), guid).with_label(entity.id.to_string());

    if let Some(properties) = element_properties.get(&entity.id) {
        raw.attributes.extend(properties.clone());
    }
    if let Some(storey) = element_storeys.get(&entity.id) {
        raw.attributes.insert("Storey".into(), Value::String(storey.clone()));
    }
    for (index, key) in PRODUCT_ATTRIBUTES {
        if let Some(value) = entity.values.get(*index).and_then(StepValue::as_str) {
            if !value.is_empty() {
                raw.attributes.insert((*key).into(), Value::String(value.to_string()));
            }
        }
    }

    // Index 6 = Representation
    if let Some(representation) = entity.values.get(6).and_then(StepValue::as_reference) {
        raw = raw.with_geometry_ref(format!("#{representation}"));
    }

    raw
}

/// Element → entity name of its type object, linked through IFCRELDEFINESBYTYPE.
///
/// IFC2x3 MEP elements are generic (`IfcFlowSegment`, `IfcFlowTerminal`...)
/// and only their type object says what they are.
fn extract_type_objects(step_file: &StepFile) -> HashMap<u64, String> {
    let mut element_types = HashMap::new();

    for rel in step_file.entities_of_type("IFCRELDEFINESBYTYPE") {
        // Index 4 = RelatedObjects, index 5 = RelatingType
        let Some(type_object) = rel
            .values
            .get(5)
            .and_then(StepValue::as_reference)
            .and_then(|id| step_file.get_entity(id))
        else {
            continue;
        };

        for element_id in rel.values.get(4).map(StepValue::references).unwrap_or_default() {
            element_types.insert(element_id, type_object.entity_type.clone());
        }
    }

    element_types
}

/// Element → name of the storey that contains it.
fn extract_storey_names(step_file: &StepFile) -> HashMap<u64, String> {
    let mut element_storeys = HashMap::new();

    for rel in step_file.entities_of_type("IFCRELCONTAINEDINSPATIALSTRUCTURE") {
        // Index 4 = RelatedElements, index 5 = RelatingStructure
        let Some(structure) = rel
            .values
            .get(5)
            .and_then(StepValue::as_reference)
            .and_then(|id| step_file.get_entity(id))
            .filter(|e| e.is("IFCBUILDINGSTOREY"))
        else {
            continue;
        };

        let name = structure
            .values
            .get(2)
            .and_then(StepValue::as_str)
            .map_or_else(|| format!("Storey #{}", structure.id), str::to_string);

        for element_id in rel.values.get(4).map(StepValue::references).unwrap_or_default() {
            element_storeys.insert(element_id, name.clone());
        }
    }

    element_storeys
}

/// Element → properties and quantities linked through IFCRELDEFINESBYPROPERTIES.
fn extract_property_sets(step_file: &StepFile) -> HashMap<u64, BTreeMap<String, Value>> {
    let mut definitions: HashMap<u64, BTreeMap<String, Value>> = HashMap::new();

    for pset in step_file.entities_of_type("IFCPROPERTYSET") {
        // Index 4 = HasProperties
        let props = collect_named_values(step_file, pset.values.get(4), |prop| {
            prop.is("IFCPROPERTYSINGLEVALUE").then(|| prop.values.get(2)).flatten()
        });
        definitions.insert(pset.id, props);
    }

    for quantity_set in step_file.entities_of_type("IFCELEMENTQUANTITY") {
        // Index 5 = Quantities
        let quantities = collect_named_values(step_file, quantity_set.values.get(5), |q| {
            QUANTITY_ENTITIES
                .iter()
                .any(|t| q.is(t))
                .then(|| q.values.get(QUANTITY_VALUE_INDEX))
                .flatten()
        });
        definitions.insert(quantity_set.id, quantities);
    }

    let mut element_properties: HashMap<u64, BTreeMap<String, Value>> = HashMap::new();

    for rel in step_file.entities_of_type("IFCRELDEFINESBYPROPERTIES") {
        // Index 4 = RelatedObjects, index 5 = RelatingPropertyDefinition
        let Some(props) = rel
            .values
            .get(5)
            .and_then(StepValue::as_reference)
            .and_then(|id| definitions.get(&id))
        else {
            continue;
        };

        for element_id in rel.values.get(4).map(StepValue::references).unwrap_or_default() {
            element_properties
                .entry(element_id)
                .or_default()
                .extend(props.clone());
        }
    }

    element_properties
}

/// Name → JSON value for each referenced entity that `value_of` accepts.
/// The name is always attribute 0; nameless and valueless entries are skipped.
fn collect_named_values<'a>(
    step_file: &'a StepFile,
    refs: Option<&StepValue>,
    value_of: impl Fn(&'a StepEntity) -> Option<&'a StepValue>,
) -> BTreeMap<String, Value> {
    let mut values = BTreeMap::new();

    for id in refs.map(StepValue::references).unwrap_or_default() {
        let Some(entity) = step_file.get_entity(id) else {
            continue;
        };
        let name = entity.values.first().and_then(StepValue::as_str).unwrap_or_default();
        if name.trim().is_empty() {
            continue;
        }
        if let Some(value) = value_of(entity).and_then(step_value_to_json) {
            values.insert(name.to_string(), value);
        }
    }

    values
}

fn step_value_to_json(value: &StepValue) -> Option<Value> {
    match value {
        StepValue::String(s) | StepValue::Enum(s) => Some(Value::String(s.clone())),
        StepValue::Real(f) => Number::from_f64(*f).map(Value::Number),
        StepValue::Integer(i) => Some(Value::from(*i)),
        StepValue::Boolean(b) => Some(Value::Bool(*b)),
        StepValue::Reference(id) => Some(Value::String(format!("#{id}"))),
        StepValue::List(items) => Some(Value::Array(
            items.iter().filter_map(step_value_to_json).collect(),
        )),
        StepValue::Null | StepValue::Derived => None,
    }
}
