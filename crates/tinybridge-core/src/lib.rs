//! # Tinybridge Core
//!
//! Mapping-graph composition and inheritance-completion engine for JVM
//! namespace mappings, including:
//! - Mapping data model (classes, methods, fields, parameters, descriptors)
//! - Mapping table and side-table readers
//! - Inheritance completion over a pluggable, cached classfile provider chain
//! - Composition (reverse / merge) of mapping sets sharing a namespace
//! - Parameter and constructor name synthesis
//! - Strict completeness validation and cross-namespace field-type backfill
//! - tiny v2 serialization and the acceptor boundary for external remappers
//!
//! The engine is a single-threaded batch pipeline over in-memory sets;
//! artifact resolution, archive handling, and bytecode rewriting live with
//! external collaborators.

#![warn(clippy::all)]

pub mod compose;
pub mod config;
pub mod error;
pub mod inherit;
pub mod model;
pub mod reader;
pub mod synth;
pub mod validate;
pub mod writer;

// Re-export commonly used types
pub use compose::{merge, merge_with_policy, reverse, MergePolicy};
pub use config::{read_config, PipelineConfig};
pub use error::{MappingError, MissingFieldEntry, Result};
pub use inherit::{
    complete, BytecodeInheritanceProvider, CachingInheritanceProvider,
    CascadingInheritanceProvider, ClassBytesProvider, ClassInfo, DirectoryClassBytesProvider,
    InheritanceProvider, MemberInfo, TableInheritanceProvider,
};
pub use model::{
    BaseType, ClassMapping, FieldMapping, FieldType, MappingSet, MethodDescriptor, MethodKey,
    MethodMapping,
};
pub use reader::tables::{ConstructorEntry, ConstructorTable, StaticMethodSet};
pub use synth::{synthesize_constructors, synthesize_parameter_names, SynthesizerConfig};
pub use validate::{prune_classes, resolve_field_types, verify_field_types, FieldTypeProvider};
pub use writer::{apply, write_tiny_v2, MappingAcceptor, MemberRef};

/// Crate version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize tracing for tinybridge components
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("tinybridge_core=info".parse().unwrap()),
        )
        .init();
}
