//! # BIM Ingest
//!
//! Normalizes BIM files from different authoring formats into one
//! format-independent element model with aggregate metadata.
//!
//! ## Features
//!
//! - Detect the source format (IFC, DGN, RVT) from the file name
//! - Parse IFC (STEP) models into normalized elements
//! - Classify elements by discipline (Architecture, Structure, MEP...)
//! - Export to a canonical JSON document and a CSV quantity sheet
//!
//! ## Example
//!
//! ```no_run
//! use bim_ingest::parser::ParserFactory;
//! use std::path::Path;
//!
//! let path = Path::new("model.ifc");
//! let mut parser = ParserFactory::for_path(path)?;
//! parser.parse(path)?;
//! println!("Elements: {}", parser.metadata().total_elements);
//! let json = parser.export_to_json().to_json_string().expect("serializable");
//! # Ok::<(), bim_ingest::error::ParseError>(())
//! ```

pub mod classify;
pub mod error;
pub mod export;
pub mod format;
pub mod model;
pub mod parser;
