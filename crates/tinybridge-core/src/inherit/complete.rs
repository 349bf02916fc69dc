//! Inheritance completion.
//!
//! Input tables only enumerate directly-declared members, so an override in
//! a subclass may have no row of its own. Completion walks every mapped
//! class's hierarchy and copies ancestor method target names down onto
//! overrides the subclass declares, guaranteeing one name across the whole
//! override chain. The pass mutates the set in place, only ever adds
//! information, and is idempotent.

use std::collections::{HashSet, VecDeque};

use tracing::debug;

use crate::error::{MappingError, Result};
use crate::model::{MappingSet, MethodKey};

use super::InheritanceProvider;

/// Complete every class mapping in the set against the provider chain.
///
/// Fails with [`MappingError::ClassNotResolvable`] when a hierarchy link
/// cannot be resolved while the class still has method mappings lacking an
/// explicit target, i.e. when the answer would actually be needed.
pub fn complete(set: &mut MappingSet, provider: &dyn InheritanceProvider) -> Result<()> {
    let mut copied = 0usize;
    for name in set.class_names() {
        copied += complete_class(set, &name, provider)?;
    }
    debug!(methods = copied, "inheritance completion finished");
    Ok(())
}

fn complete_class(
    set: &mut MappingSet,
    name: &str,
    provider: &dyn InheritanceProvider,
) -> Result<usize> {
    let Some(info) = provider.provide(name) else {
        // No hierarchy context. Harmless unless this class still has
        // mappings that completion would have to decide.
        if let Some(class) = set.class(name) {
            if class.methods.values().any(|m| !m.has_explicit_target()) {
                return Err(MappingError::ClassNotResolvable {
                    class_name: name.to_string(),
                });
            }
        }
        return Ok(0);
    };

    // Breadth-first over the hierarchy: direct super, then interfaces, then
    // their parents. Nearer ancestors take precedence for a signature mapped
    // at several levels. Diamond interface inheritance is deduplicated.
    let mut queue: VecDeque<String> = VecDeque::new();
    queue.extend(info.super_name.iter().cloned());
    queue.extend(info.interfaces.iter().cloned());

    let mut ancestors = Vec::new();
    let mut unresolved: Option<String> = None;
    let mut seen: HashSet<String> = HashSet::new();
    while let Some(parent) = queue.pop_front() {
        if !seen.insert(parent.clone()) {
            continue;
        }
        match provider.provide(&parent) {
            Some(parent_info) => {
                queue.extend(parent_info.super_name.iter().cloned());
                queue.extend(parent_info.interfaces.iter().cloned());
                ancestors.push(parent);
            }
            None => {
                if unresolved.is_none() {
                    unresolved = Some(parent);
                }
            }
        }
    }

    // A static redeclaration hides the ancestor method instead of overriding
    // it, so it keeps its own name and is excluded here.
    let declared: HashSet<(&str, String)> = info
        .methods
        .iter()
        .filter(|m| !m.is_static())
        .map(|m| (m.name.as_str(), m.descriptor.clone()))
        .collect();

    let mut patches: Vec<(MethodKey, String)> = Vec::new();
    if let Some(class) = set.class(name) {
        for ancestor_name in &ancestors {
            let Some(ancestor) = set.class(ancestor_name) else {
                continue;
            };
            for method in ancestor.methods.values() {
                // Constructors and static initializers never participate in
                // override chains.
                if method.key.name == "<init>" || method.key.name == "<clinit>" {
                    continue;
                }
                if !method.has_explicit_target() {
                    continue;
                }
                let signature = (method.key.name.as_str(), method.key.descriptor.to_string());
                if !declared.contains(&signature) {
                    continue;
                }
                match class.methods.get(&method.key) {
                    Some(existing) if existing.has_explicit_target() => {}
                    _ => patches.push((method.key.clone(), method.target_name().to_string())),
                }
            }
        }
    }

    let Some(class) = set.class_mut(name) else {
        return Ok(0);
    };
    let mut copied = 0;
    for (key, target) in patches {
        let method = class.get_or_create_method(key);
        if !method.has_explicit_target() {
            method.target = Some(target);
            copied += 1;
        }
    }

    if let Some(parent) = unresolved {
        if class.methods.values().any(|m| !m.has_explicit_target()) {
            return Err(MappingError::ClassNotResolvable { class_name: parent });
        }
    }

    Ok(copied)
}
