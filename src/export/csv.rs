use crate::error::ExportError;
use crate::model::Element;
use std::fs::File;
use std::path::Path;

/// Writes a quantity sheet with one row per element.
///
/// Estimates that were never computed are left blank rather than written
/// as zero.
pub fn export_csv<P: AsRef<Path>>(elements: &[Element], path: P) -> Result<(), ExportError> {
    let path_ref = path.as_ref();
    let file = File::create(path_ref).map_err(|source| ExportError::FileCreate {
        path: path_ref.to_path_buf(),
        source,
    })?;

    let mut writer = csv::Writer::from_writer(file);

    writer.write_record([
        "id",
        "guid",
        "type",
        "discipline",
        "volumeEstimated",
        "costEstimated",
    ])?;

    for element in elements {
        let volume = format_estimate(element.volume_estimated());
        let cost = format_estimate(element.cost_estimated());
        writer.write_record([
            element.id.as_str(),
            element.guid.as_str(),
            element.entity_type.as_str(),
            element.discipline.as_str(),
            volume.as_str(),
            cost.as_str(),
        ])?;
    }

    writer.flush().map_err(|e| ExportError::WriteError {
        message: e.to_string(),
    })?;

    Ok(())
}

fn format_estimate(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Discipline;
    use pretty_assertions::assert_eq;

    #[test]
    fn writes_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quantities.csv");

        let mut slab = Element::new("7", "IFCSLAB", Discipline::Structure).with_guid("g-7");
        slab.set_volume_estimated(12.5);
        slab.set_cost_estimated(0.0);
        let pipe = Element::new("8", "IFCPIPESEGMENT", Discipline::Plumbing);

        export_csv(&[slab, pipe], &path).unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "id,guid,type,discipline,volumeEstimated,costEstimated\n\
             7,g-7,IFCSLAB,Structure,12.5,0\n\
             8,,IFCPIPESEGMENT,Plumbing,,\n"
        );
    }
}
