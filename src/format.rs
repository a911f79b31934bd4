//! Source file formats and format detection.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// STEP physical file magic that every IFC file opens with.
const STEP_MAGIC: &[u8] = b"ISO-10303-21;";
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Authoring format of a BIM file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum FileFormat {
    #[serde(rename = "IFC")]
    Ifc,
    #[serde(rename = "DGN")]
    Dgn,
    #[serde(rename = "RVT")]
    Rvt,
    #[default]
    Unknown,
}

impl FileFormat {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            FileFormat::Ifc => "IFC",
            FileFormat::Dgn => "DGN",
            FileFormat::Rvt => "RVT",
            FileFormat::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "IFC" => Ok(FileFormat::Ifc),
            "DGN" => Ok(FileFormat::Dgn),
            "RVT" => Ok(FileFormat::Rvt),
            "UNKNOWN" => Ok(FileFormat::Unknown),
            other => Err(format!("unrecognized format name: {other}")),
        }
    }
}

/// Detects the format from the path's extension, case-insensitively.
///
/// Never touches the file system. Anything that is not `.ifc`, `.dgn` or
/// `.rvt` (including no extension at all) is [`FileFormat::Unknown`].
///
/// # Example
///
/// ```
/// use bim_ingest::format::{detect_format, FileFormat};
///
/// assert_eq!(detect_format("tower.IFC"), FileFormat::Ifc);
/// assert_eq!(detect_format("README"), FileFormat::Unknown);
/// ```
pub fn detect_format<P: AsRef<Path>>(path: P) -> FileFormat {
    let Some(ext) = path.as_ref().extension().and_then(|e| e.to_str()) else {
        return FileFormat::Unknown;
    };

    match ext.to_ascii_lowercase().as_str() {
        "ifc" => FileFormat::Ifc,
        "dgn" => FileFormat::Dgn,
        "rvt" => FileFormat::Rvt,
        _ => FileFormat::Unknown,
    }
}

/// Guesses the format from the first bytes of a file.
///
/// Only STEP content is recognized. RVT and DGN v8 share the OLE compound
/// container, so their content alone is ambiguous and yields `None`.
#[must_use]
pub fn sniff_format(head: &[u8]) -> Option<FileFormat> {
    let head = head.strip_prefix(UTF8_BOM).unwrap_or(head);
    let start = head.iter().position(|b| !b.is_ascii_whitespace())?;

    head[start..]
        .starts_with(STEP_MAGIC)
        .then_some(FileFormat::Ifc)
}

/// Extension-based detection with content sniffing as a fallback.
///
/// A recognized extension always wins, so the result stays deterministic for
/// well-named files.
pub fn detect_format_with_content<P: AsRef<Path>>(path: P, head: &[u8]) -> FileFormat {
    match detect_format(path) {
        FileFormat::Unknown => sniff_format(head).unwrap_or(FileFormat::Unknown),
        known => known,
    }
}
