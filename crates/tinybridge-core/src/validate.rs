//! Strict-mode completeness checks and cross-namespace backfill.
//!
//! The primary table omits field type descriptors; the tiny v2 output
//! requires them. A [`FieldTypeProvider`] looks the same source class+field
//! pair up in a second, already-completed set sharing the source namespace.
//! Backfill is lazy with respect to that second set (it is only consulted
//! per missing field, never eagerly copied), so the order fields were read
//! in does not matter.

use tracing::{debug, info};

use crate::error::{MappingError, MissingFieldEntry, Result};
use crate::model::{FieldType, MappingSet};

/// Looks up a type descriptor for a field identified by its
/// source-namespace class and field names.
pub trait FieldTypeProvider {
    fn field_type(&self, source_class: &str, source_field: &str) -> Option<FieldType>;
}

/// A completed mapping set answers from its own recorded field types; the
/// shared source namespace makes the class+field pair line up.
impl FieldTypeProvider for MappingSet {
    fn field_type(&self, source_class: &str, source_field: &str) -> Option<FieldType> {
        self.class(source_class)?
            .fields
            .get(source_field)?
            .field_type
            .clone()
    }
}

/// Fill in missing field types from the provider. Monotonic: recorded types
/// are never replaced. Returns how many fields were backfilled.
pub fn resolve_field_types(set: &mut MappingSet, provider: &dyn FieldTypeProvider) -> usize {
    let mut resolved: Vec<(String, String, FieldType)> = Vec::new();
    set.iterate_classes(|full_source, _full_target, class| {
        for field in class.fields.values() {
            if field.field_type.is_some() {
                continue;
            }
            if let Some(ty) = provider.field_type(full_source, &field.source) {
                resolved.push((full_source.to_string(), field.source.clone(), ty));
            }
        }
    });

    let count = resolved.len();
    for (class_name, field_name, ty) in resolved {
        if let Some(class) = set.class_mut(&class_name) {
            if let Some(field) = class.fields.get_mut(&field_name) {
                field.field_type.get_or_insert(ty);
            }
        }
    }
    debug!(fields = count, "backfilled field types");
    count
}

/// Strict completeness check: every field must carry a type descriptor.
///
/// All offenders are collected into one error rather than failing on the
/// first, so a single run reports everything there is to fix.
pub fn verify_field_types(set: &MappingSet) -> Result<()> {
    let mut missing = Vec::new();
    set.iterate_classes(|full_source, full_target, class| {
        for field in class.fields.values() {
            if field.field_type.is_none() {
                missing.push(MissingFieldEntry {
                    source_class: full_source.to_string(),
                    target_class: full_target.to_string(),
                    source_field: field.source.clone(),
                    target_field: field.target.clone(),
                });
            }
        }
    });

    if missing.is_empty() {
        Ok(())
    } else {
        Err(MappingError::IncompleteFieldSignatures { entries: missing })
    }
}

/// Remove denylisted top-level classes by source name.
///
/// Upstream tables are known to ship entries for classes that no longer
/// exist in the program; those are declared in configuration and filtered
/// here as a plain collection step. Returns how many entries were removed.
pub fn prune_classes(set: &mut MappingSet, denylist: &[String]) -> usize {
    let mut removed = 0;
    for name in denylist {
        if set.classes.shift_remove(name).is_some() {
            info!(class = %name, "pruned stale top-level mapping");
            removed += 1;
        }
    }
    removed
}
