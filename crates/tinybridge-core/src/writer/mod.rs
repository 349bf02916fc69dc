//! Mapping serialization.
//!
//! Two output modes: the tiny v2 text format (consumed by external tooling)
//! and the accept-style visitor boundary in [`acceptor`].

pub mod acceptor;

use std::io::Write;

use tracing::debug;

use crate::error::{MappingError, Result};
use crate::model::{ClassMapping, MappingSet};

pub use acceptor::{apply, MappingAcceptor, MemberRef};

/// Serialize a completed set as tiny v2.
///
/// Header convention of the consuming tool: the target namespace label
/// comes first. Every field row requires a type descriptor; a field
/// without one is a fatal [`MappingError::MissingFieldType`] (the strict
/// validation pass should have caught it earlier).
pub fn write_tiny_v2<W: Write>(set: &MappingSet, out: &mut W) -> Result<()> {
    writeln!(
        out,
        "tiny\t2\t0\t{}\t{}",
        set.target_namespace(),
        set.source_namespace()
    )?;

    let mut written = 0usize;
    for class in set.classes.values() {
        written += write_class(out, class, &class.source, class.target_name())?;
    }
    debug!(classes = written, "wrote tiny v2 mappings");
    Ok(())
}

fn write_class<W: Write>(
    out: &mut W,
    class: &ClassMapping,
    full_source: &str,
    full_target: &str,
) -> Result<usize> {
    writeln!(out, "c\t{}\t{}", full_source, full_target)?;

    for method in class.methods.values() {
        writeln!(
            out,
            "\tm\t{}\t{}\t{}",
            method.key.descriptor,
            method.key.name,
            method.target_name()
        )?;
    }

    for field in class.fields.values() {
        let field_type = field.field_type.as_ref().ok_or_else(|| {
            MappingError::MissingFieldType {
                class: format!("{} -> {}", full_source, full_target),
                field: format!("{} -> {}", field.source, field.target),
            }
        })?;
        writeln!(
            out,
            "\tf\t{}\t{}\t{}",
            field_type, field.source, field.target
        )?;
    }

    let mut written = 1;
    for inner in class.inner.values() {
        written += write_class(
            out,
            inner,
            &format!("{}${}", full_source, inner.source),
            &format!("{}${}", full_target, inner.target_name()),
        )?;
    }
    Ok(written)
}
