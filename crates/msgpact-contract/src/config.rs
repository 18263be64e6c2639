use msgpact_schema::ValidationConfig;

/// Controls registry construction and the validation behavior of the
/// contracts derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryConfig {
    /// When true, contracts reject fields that are not declared.
    pub strict_mode: bool,
    /// Maximum bytes accepted for a declaration document.
    pub max_document_size: usize,
}

impl RegistryConfig {
    /// Validation settings handed to every derived contract.
    pub fn validation(&self) -> ValidationConfig {
        ValidationConfig {
            strict_mode: self.strict_mode,
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            strict_mode: false,
            max_document_size: 256 * 1024,
        }
    }
}
