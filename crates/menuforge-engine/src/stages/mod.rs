//! Concrete pipeline stages.

mod designer;
mod extractor;
mod generator;
mod structurer;
mod validator;

pub use designer::{Designer, DesignerInput};
pub use extractor::Extractor;
pub use generator::{Generator, GeneratorInput};
pub use structurer::Structurer;
pub use validator::{validate, Validator, ValidatorInput};
