pub mod csv;
pub mod json;

pub use crate::error::ExportError;
pub use csv::export_csv;
pub use json::{
    default_output_path, to_document, to_document_with, write_json, Document, ElementDocument,
    ExportOptions, MetadataDocument,
};
