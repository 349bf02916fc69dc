use thiserror::Error;

/// A field that still lacks a type descriptor after backfill.
///
/// Collected (not reported one at a time) so a single run surfaces every
/// offender at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingFieldEntry {
    pub source_class: String,
    pub target_class: String,
    pub source_field: String,
    pub target_field: String,
}

impl std::fmt::Display for MissingFieldEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "field \"{} -> {}\" in class \"{} -> {}\"",
            self.source_field, self.target_field, self.source_class, self.target_class
        )
    }
}

/// Mapping-engine error types for better error handling
#[derive(Error, Debug)]
pub enum MappingError {
    #[error("Malformed mapping entry at line {line}")]
    MalformedMappingEntry { line: usize },

    #[error("Class '{class_name}' could not be resolved by any inheritance provider")]
    ClassNotResolvable { class_name: String },

    #[error("Duplicate constructor entry for class '{owner}': id {id}, descriptor {descriptor}")]
    DuplicateConstructorEntry {
        owner: String,
        id: u32,
        descriptor: String,
    },

    #[error("Malformed constructor entry at line {line}")]
    MalformedConstructorEntry { line: usize },

    #[error("{} field mappings are missing type signatures", entries.len())]
    IncompleteFieldSignatures { entries: Vec<MissingFieldEntry> },

    #[error("Cannot write field \"{field}\" in class \"{class}\" since it has no field type")]
    MissingFieldType { class: String, field: String },

    #[error("Invalid pipeline config: missing key \"{missing_key}\"")]
    InvalidConfigSchema { missing_key: String },

    #[error("Malformed type descriptor: \"{descriptor}\"")]
    MalformedTypeDescriptor { descriptor: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MappingError>;
