//! Section schema validator: a fixed catalog of independent rules run over
//! the raw template text and its decoded `{% schema %}` block.

mod diagnostic;
mod error;
mod linter;
mod rules;

pub use diagnostic::{Finding, RuleOutcome, Severity};
pub use error::{load_schema, SchemaError};
pub use linter::{validate_schema, validate_with, ValidateOptions, ValidationResult};
pub use rules::{RuleRegistry, ValidationRule};
