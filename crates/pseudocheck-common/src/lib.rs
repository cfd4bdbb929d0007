pub mod config;
pub mod errors;

pub use config::{CheckerSection, ConfigError, OutputSection, PseudocheckConfig};
pub use errors::{Category, CheckResult, Diagnostic, DiagnosticBag, Severity};
