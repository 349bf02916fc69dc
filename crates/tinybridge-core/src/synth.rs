//! Deterministic parameter and constructor name synthesis.
//!
//! Machine-generated tables encode a numeric id inside the target method
//! name (`func_12345_a`). Parameter names are derived from that id plus the
//! logical parameter index, so the same method always yields the same names
//! across runs. Constructors have no rows in the source table at all; they
//! are assembled from the auxiliary constructor table, whose descriptors are
//! given in the target namespace and must be translated back first.

use tracing::debug;

use crate::error::Result;
use crate::model::{ClassMapping, MappingSet, MethodKey};
use crate::reader::tables::ConstructorTable;

/// Naming conventions for synthesized entries.
#[derive(Debug, Clone)]
pub struct SynthesizerConfig {
    /// Target-name prefix marking methods that carry a numeric id.
    pub method_name_prefix: String,
    /// Prefix for synthesized method parameter names.
    pub parameter_prefix: String,
    /// Prefix for synthesized constructor parameter names.
    pub constructor_parameter_prefix: String,
}

impl Default for SynthesizerConfig {
    fn default() -> Self {
        Self {
            method_name_prefix: "func_".to_string(),
            parameter_prefix: "p_".to_string(),
            constructor_parameter_prefix: "p_i".to_string(),
        }
    }
}

/// Assign `<prefix><id>_<index>_` names to every parameter of every method
/// whose target name carries the configured id prefix. Existing parameter
/// names are left alone.
pub fn synthesize_parameter_names(set: &mut MappingSet, config: &SynthesizerConfig) {
    let mut named = 0usize;
    for class in set.classes.values_mut() {
        named += synthesize_class(class, config);
    }
    debug!(parameters = named, "synthesized parameter names");
}

fn synthesize_class(class: &mut ClassMapping, config: &SynthesizerConfig) -> usize {
    let mut named = 0;
    for method in class.methods.values_mut() {
        let target = method.target_name();
        if !target.starts_with(&config.method_name_prefix) {
            continue;
        }
        let id: String = target.chars().filter(char::is_ascii_digit).collect();
        if id.is_empty() {
            continue;
        }
        for index in 0..method.key.descriptor.parameters.len() {
            if method.parameters.contains_key(&index) {
                continue;
            }
            let name = format!("{}{}_{}_", config.parameter_prefix, id, index);
            method.set_parameter_name(index, name);
            named += 1;
        }
    }
    for inner in class.inner.values_mut() {
        named += synthesize_class(inner, config);
    }
    named
}

/// Insert synthetic `<init>` mappings from the constructor table.
///
/// Entries are keyed by the owning class's target-namespace name and carry
/// target-namespace descriptors; `reverse` (the already-built reversal of
/// `set`) translates those back into the source namespace so the new method
/// key lands on the obfuscated side like every other key.
pub fn synthesize_constructors(
    set: &mut MappingSet,
    table: &ConstructorTable,
    reverse: &MappingSet,
    config: &SynthesizerConfig,
) -> Result<()> {
    // Resolve owners first; the mutation below must not observe a half-built
    // view of the set.
    let mut planned: Vec<(String, MethodKey, u32)> = Vec::new();
    set.iterate_classes(|full_source, full_target, _class| {
        for entry in table.entries_for(full_target) {
            let source_descriptor = reverse.remap_method_descriptor(&entry.descriptor);
            planned.push((
                full_source.to_string(),
                MethodKey::new("<init>", source_descriptor),
                entry.id,
            ));
        }
    });

    let planned_count = planned.len();
    for (owner, key, id) in planned {
        let Some(class) = set.class_mut(&owner) else {
            continue;
        };
        let parameter_count = key.descriptor.parameters.len();
        let method = class.get_or_create_method(key);
        method.target = Some("<init>".to_string());
        for index in 0..parameter_count {
            if method.parameters.contains_key(&index) {
                continue;
            }
            let name = format!("{}{}_{}_", config.constructor_parameter_prefix, id, index);
            method.set_parameter_name(index, name);
        }
    }

    debug!(constructors = planned_count, "synthesized constructor mappings");
    Ok(())
}
