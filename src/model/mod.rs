pub mod discipline;
pub mod element;
pub mod metadata;

pub use discipline::Discipline;
pub use element::{Attributes, Element};
pub use metadata::ModelMetadata;
