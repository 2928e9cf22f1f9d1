//! Validator registry and factory functions.

use std::collections::{HashMap, HashSet};

use crate::config::ScanConfig;
use crate::file_types::FileType;
use crate::validators::{
    DocxValidator, JpegValidator, PdfValidator, PngValidator, TextValidator, Validator,
};

/// Factory function type that creates validator instances.
pub type ValidatorFactory = fn() -> Box<dyn Validator>;

const DEFAULTS: &[(FileType, ValidatorFactory)] = &[
    (FileType::PlainText, text_validator),
    (FileType::Png, png_validator),
    (FileType::Jpeg, jpeg_validator),
    (FileType::Pdf, pdf_validator),
    (FileType::Docx, docx_validator),
];

fn text_validator() -> Box<dyn Validator> {
    Box::new(TextValidator)
}

fn png_validator() -> Box<dyn Validator> {
    Box::new(PngValidator)
}

fn jpeg_validator() -> Box<dyn Validator> {
    Box::new(JpegValidator)
}

fn pdf_validator() -> Box<dyn Validator> {
    Box::new(PdfValidator)
}

fn docx_validator() -> Box<dyn Validator> {
    Box::new(DocxValidator)
}

/// Registry that maps [`FileType`] values to a validator.
///
/// Each file type has at most one validator; registering a second factory for
/// the same type replaces the first. [`FileType::Unsupported`] never has one.
pub struct ValidatorRegistry {
    validators: HashMap<FileType, Box<dyn Validator>>,
    disabled_validators: HashSet<String>,
}

impl ValidatorRegistry {
    /// Create an empty registry with no registered validators.
    pub fn new() -> Self {
        Self {
            validators: HashMap::new(),
            disabled_validators: HashSet::new(),
        }
    }

    /// Create a registry pre-populated with the built-in validators.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for &(file_type, factory) in DEFAULTS {
            registry.register(file_type, factory);
        }
        registry
    }

    /// Built-in validators minus the ones `config` disables.
    pub fn from_config(config: &ScanConfig) -> Self {
        let mut registry = Self::with_defaults();
        for name in config.disabled_validators() {
            registry.disable_validator(name.as_str());
        }
        registry
    }

    /// Register a validator factory for a given file type.
    ///
    /// Registrations for [`FileType::Unsupported`] are ignored.
    pub fn register(&mut self, file_type: FileType, factory: ValidatorFactory) {
        if !file_type.is_validatable() {
            return;
        }
        self.validators.insert(file_type, factory());
    }

    /// The enabled validator for `file_type`, if any.
    pub fn validator_for(&self, file_type: FileType) -> Option<&dyn Validator> {
        self.validators
            .get(&file_type)
            .filter(|v| !self.disabled_validators.contains(v.name()))
            .map(|v| v.as_ref())
    }

    /// Disable a validator by name at runtime.
    ///
    /// The name must match [`Validator::name()`] (e.g. `"PdfValidator"`).
    pub fn disable_validator(&mut self, name: impl Into<String>) {
        self.disabled_validators.insert(name.into());
    }

    /// Number of file types with a registered validator, disabled or not.
    pub fn registered_count(&self) -> usize {
        self.validators.len()
    }
}

impl Default for ValidatorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
