use crate::error::ExportError;
use crate::format::FileFormat;
use crate::model::{Attributes, Discipline, Element, ModelMetadata};
use serde::Serialize;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Switches for the keys added on top of the baseline document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportOptions {
    /// Adds `metadata.elementsByDiscipline` and a `discipline` key per element.
    pub include_disciplines: bool,
}

/// The canonical export document.
///
/// Field order follows declaration order and is part of the output
/// contract. Unset estimates are written as `0.0`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub metadata: MetadataDocument,
    pub elements: Vec<ElementDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataDocument {
    pub file_hash: String,
    pub format: FileFormat,
    pub total_elements: usize,
    pub original_file_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elements_by_discipline: Option<BTreeMap<Discipline, usize>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementDocument {
    pub id: String,
    pub guid: String,
    #[serde(rename = "type")]
    pub entity_type: String,
    pub volume_estimated: f64,
    pub cost_estimated: f64,
    pub attributes: Attributes,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discipline: Option<Discipline>,
}

impl Document {
    /// Compact single-line JSON.
    pub fn to_json_string(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Indented JSON.
    pub fn to_json_pretty(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Renders the baseline document. Element order is kept as given.
#[must_use]
pub fn to_document(metadata: &ModelMetadata, elements: &[Element]) -> Document {
    to_document_with(metadata, elements, ExportOptions::default())
}

#[must_use]
pub fn to_document_with(
    metadata: &ModelMetadata,
    elements: &[Element],
    options: ExportOptions,
) -> Document {
    let metadata = MetadataDocument {
        file_hash: metadata.file_hash.clone(),
        format: metadata.format,
        total_elements: metadata.total_elements,
        original_file_name: metadata.original_file_name.clone(),
        elements_by_discipline: options
            .include_disciplines
            .then(|| metadata.elements_by_discipline.clone()),
    };

    let elements = elements
        .iter()
        .map(|element| ElementDocument {
            id: element.id.clone(),
            guid: element.guid.clone(),
            entity_type: element.entity_type.clone(),
            volume_estimated: element.volume_estimated().unwrap_or(0.0),
            cost_estimated: element.cost_estimated().unwrap_or(0.0),
            attributes: element.attributes.clone(),
            discipline: options.include_disciplines.then_some(element.discipline),
        })
        .collect();

    Document { metadata, elements }
}

pub fn write_json<P: AsRef<Path>>(
    document: &Document,
    path: P,
    pretty: bool,
) -> Result<(), ExportError> {
    let path_ref = path.as_ref();
    let json = if pretty {
        document.to_json_pretty()?
    } else {
        document.to_json_string()?
    };

    let mut file = File::create(path_ref).map_err(|source| ExportError::FileCreate {
        path: path_ref.to_path_buf(),
        source,
    })?;

    file.write_all(json.as_bytes())
        .map_err(|e| ExportError::WriteError {
            message: e.to_string(),
        })?;

    Ok(())
}

/// `<file>.json`, next to the source: `model.ifc` becomes `model.ifc.json`.
#[must_use]
pub fn default_output_path<P: AsRef<Path>>(source: P) -> PathBuf {
    let mut path = OsString::from(source.as_ref().as_os_str());
    path.push(".json");
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_metadata() -> ModelMetadata {
        ModelMetadata {
            file_hash: "abc".into(),
            format: FileFormat::Ifc,
            total_elements: 0,
            elements_by_discipline: BTreeMap::new(),
            original_file_name: "x.ifc".into(),
        }
    }

    fn sample_elements() -> Vec<Element> {
        let mut attributes = Attributes::new();
        attributes.insert("Name", "Basic Wall").unwrap();
        attributes.insert("IsExternal", true).unwrap();

        let mut wall = Element::new("20", "IFCWALL", Discipline::Architecture)
            .with_guid("2O2Fr$t4X7Zf8NOew3FLOH")
            .with_attributes(attributes);
        wall.set_volume_estimated(1.5);

        let duct = Element::new("21", "IFCDUCTSEGMENT", Discipline::Hvac);
        vec![wall, duct]
    }

    #[test]
    fn empty_model_exports_canonical_document() {
        let document = to_document(&sample_metadata(), &[]);
        assert_eq!(
            document.to_json_string().unwrap(),
            r#"{"metadata":{"fileHash":"abc","format":"IFC","totalElements":0,"originalFileName":"x.ifc"},"elements":[]}"#
        );
    }

    #[test]
    fn elements_keep_order_and_field_layout() {
        let elements = sample_elements();
        let metadata = ModelMetadata::summarize("h".into(), FileFormat::Ifc, "m.ifc".into(), &elements);
        let json = to_document(&metadata, &elements).to_json_string().unwrap();

        assert_eq!(
            json,
            concat!(
                r#"{"metadata":{"fileHash":"h","format":"IFC","totalElements":2,"originalFileName":"m.ifc"},"#,
                r#""elements":["#,
                r#"{"id":"20","guid":"2O2Fr$t4X7Zf8NOew3FLOH","type":"IFCWALL","volumeEstimated":1.5,"costEstimated":0.0,"attributes":{"IsExternal":true,"Name":"Basic Wall"}},"#,
                r#"{"id":"21","guid":"","type":"IFCDUCTSEGMENT","volumeEstimated":0.0,"costEstimated":0.0,"attributes":{}}"#,
                r#"]}"#
            )
        );
    }

    #[test]
    fn discipline_keys_are_additive() {
        let elements = sample_elements();
        let metadata = ModelMetadata::summarize("h".into(), FileFormat::Ifc, "m.ifc".into(), &elements);

        let baseline: serde_json::Value =
            serde_json::from_str(&to_document(&metadata, &elements).to_json_string().unwrap()).unwrap();
        let extended: serde_json::Value = serde_json::from_str(
            &to_document_with(&metadata, &elements, ExportOptions { include_disciplines: true })
                .to_json_string()
                .unwrap(),
        )
        .unwrap();

        for (key, value) in baseline["metadata"].as_object().unwrap() {
            assert_eq!(&extended["metadata"][key], value);
        }
        assert_eq!(
            extended["metadata"]["elementsByDiscipline"],
            serde_json::json!({"Architecture": 1, "HVAC": 1})
        );
        assert_eq!(extended["elements"][0]["discipline"], "Architecture");
        assert_eq!(extended["elements"][1]["discipline"], "HVAC");
        assert!(baseline["elements"][0].get("discipline").is_none());
    }

    #[test]
    fn export_is_idempotent() {
        let elements = sample_elements();
        let metadata = ModelMetadata::summarize("h".into(), FileFormat::Ifc, "m.ifc".into(), &elements);
        let first = to_document(&metadata, &elements).to_json_pretty().unwrap();
        let second = to_document(&metadata, &elements).to_json_pretty().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn output_path_appends_json() {
        assert_eq!(default_output_path("model.ifc"), PathBuf::from("model.ifc.json"));
        assert_eq!(
            default_output_path("dir/Site.IFC"),
            PathBuf::from("dir/Site.IFC.json")
        );
    }

    #[test]
    fn writes_document_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        let document = to_document(&sample_metadata(), &[]);

        write_json(&document, &path, false).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            document.to_json_string().unwrap()
        );

        let missing_dir = dir.path().join("nope").join("out.json");
        assert!(matches!(
            write_json(&document, &missing_dir, true),
            Err(ExportError::FileCreate { .. })
        ));
    }
}
