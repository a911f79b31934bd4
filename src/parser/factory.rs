use super::{BimParser, IfcParser};
use crate::error::ParseError;
use crate::format::{detect_format, FileFormat};
use std::path::Path;

type Constructor = fn() -> Box<dyn BimParser>;

/// Formats with a parser implementation. Adding a format is one entry here.
///
/// DGN and RVT are recognized by the detector but have no entry yet; until a
/// `DgnParser` / `RvtParser` is registered, `create` reports them as
/// [`ParseError::UnsupportedFormat`].
const REGISTRY: &[(FileFormat, Constructor)] = &[(FileFormat::Ifc, new_ifc_parser)];

fn new_ifc_parser() -> Box<dyn BimParser> {
    Box::new(IfcParser::new())
}

/// Binds formats to parser instances.
///
/// Stateless: every call allocates a fresh parser, so it is safe to call from
/// any number of threads.
pub struct ParserFactory;

impl ParserFactory {
    /// Creates a parser for `format`.
    ///
    /// # Errors
    ///
    /// - [`ParseError::UnknownFormat`] for [`FileFormat::Unknown`].
    /// - [`ParseError::UnsupportedFormat`] for recognized formats without a
    ///   parser (DGN, RVT).
    ///
    /// # Example
    ///
    /// ```
    /// use bim_ingest::format::FileFormat;
    /// use bim_ingest::parser::ParserFactory;
    ///
    /// let parser = ParserFactory::create(FileFormat::Ifc)?;
    /// assert_eq!(parser.format(), FileFormat::Ifc);
    /// assert!(ParserFactory::create(FileFormat::Rvt).is_err());
    /// # Ok::<(), bim_ingest::error::ParseError>(())
    /// ```
    pub fn create(format: FileFormat) -> Result<Box<dyn BimParser>, ParseError> {
        if format == FileFormat::Unknown {
            return Err(ParseError::UnknownFormat { path: None });
        }

        REGISTRY
            .iter()
            .find(|(registered, _)| *registered == format)
            .map(|(_, constructor)| constructor())
            .ok_or(ParseError::UnsupportedFormat { format })
    }

    /// Detects the format of `path` by extension and creates its parser.
    pub fn for_path<P: AsRef<Path>>(path: P) -> Result<Box<dyn BimParser>, ParseError> {
        let path = path.as_ref();
        match detect_format(path) {
            FileFormat::Unknown => Err(ParseError::UnknownFormat {
                path: Some(path.to_path_buf()),
            }),
            format => Self::create(format),
        }
    }

    /// Formats that [`create`](Self::create) can build a parser for.
    #[must_use]
    pub fn supported_formats() -> Vec<FileFormat> {
        REGISTRY.iter().map(|(format, _)| *format).collect()
    }
}
