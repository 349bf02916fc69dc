//! Mapping data model.
//!
//! A [`MappingSet`] is a directed mapping of symbols from a source namespace
//! to a target namespace: top-level classes keyed by fully-qualified source
//! name, each owning nested inner classes, methods keyed by
//! (name, descriptor), and fields keyed by name.
//!
//! A set is built once (by the reader, or synthetically by composition) and
//! is read-only downstream, except for the two documented in-place phases:
//! inheritance completion and field-type backfill. Both are monotonic - they
//! only add missing information.

pub mod descriptor;

use std::collections::BTreeMap;
use std::fmt;

use indexmap::IndexMap;

pub use descriptor::{BaseType, FieldType, MethodDescriptor};

/// Identifies a method within its owning class: source name plus source
/// descriptor. Overloads differ only by descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodKey {
    pub name: String,
    pub descriptor: MethodDescriptor,
}

impl MethodKey {
    pub fn new(name: impl Into<String>, descriptor: MethodDescriptor) -> Self {
        Self {
            name: name.into(),
            descriptor,
        }
    }
}

impl fmt::Display for MethodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, self.descriptor)
    }
}

/// A single method mapping, owning its parameter name table.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodMapping {
    pub key: MethodKey,
    /// Explicit target name; `None` until completion copies one down from an
    /// ancestor, in which case the source name stands in.
    pub target: Option<String>,
    /// Logical parameter index (0-based) -> target name. Not slot indices;
    /// slot arithmetic happens at acceptor time.
    pub parameters: BTreeMap<usize, String>,
}

impl MethodMapping {
    pub fn new(key: MethodKey) -> Self {
        Self {
            key,
            target: None,
            parameters: BTreeMap::new(),
        }
    }

    /// Target name, falling back to the source name when no explicit target
    /// has been assigned.
    pub fn target_name(&self) -> &str {
        self.target.as_deref().unwrap_or(&self.key.name)
    }

    pub fn has_explicit_target(&self) -> bool {
        self.target.is_some()
    }

    /// Assign a parameter name by logical index.
    ///
    /// `index` must be less than the descriptor's declared parameter count.
    pub fn set_parameter_name(&mut self, index: usize, name: impl Into<String>) {
        debug_assert!(
            index < self.key.descriptor.parameters.len(),
            "parameter index {} out of range for {}",
            index,
            self.key
        );
        self.parameters.insert(index, name.into());
    }
}

/// A single field mapping. The type descriptor may be absent on read and is
/// backfilled later; the tiny v2 writer requires it.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMapping {
    pub source: String,
    pub target: String,
    pub field_type: Option<FieldType>,
}

impl FieldMapping {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            field_type: None,
        }
    }
}

/// A class mapping node. Inner classes form a tree under their top-level
/// class; names are stored simple (the part after the last `$`) and full
/// names are computed by joining with `$`.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassMapping {
    pub source: String,
    /// Simple target name. `None` for classes created implicitly as parents
    /// of a nested entry before their own row was seen.
    pub target: Option<String>,
    pub inner: IndexMap<String, ClassMapping>,
    pub methods: IndexMap<MethodKey, MethodMapping>,
    pub fields: IndexMap<String, FieldMapping>,
}

impl ClassMapping {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: None,
            inner: IndexMap::new(),
            methods: IndexMap::new(),
            fields: IndexMap::new(),
        }
    }

    pub fn target_name(&self) -> &str {
        self.target.as_deref().unwrap_or(&self.source)
    }

    pub fn get_or_create_inner(&mut self, source: &str) -> &mut ClassMapping {
        self.inner
            .entry(source.to_string())
            .or_insert_with(|| ClassMapping::new(source))
    }

    pub fn get_or_create_method(&mut self, key: MethodKey) -> &mut MethodMapping {
        self.methods
            .entry(key.clone())
            .or_insert_with(|| MethodMapping::new(key))
    }

    pub fn get_or_create_field(&mut self, source: &str) -> &mut FieldMapping {
        self.fields
            .entry(source.to_string())
            .or_insert_with(|| FieldMapping::new(source, source))
    }
}

/// Root container: a directed mapping between two namespaces.
///
/// The namespace pair is fixed at construction; reversal and composition
/// produce new sets rather than mutating this one.
#[derive(Debug, Clone, PartialEq)]
pub struct MappingSet {
    source_namespace: String,
    target_namespace: String,
    pub classes: IndexMap<String, ClassMapping>,
}

impl MappingSet {
    pub fn new(source_namespace: impl Into<String>, target_namespace: impl Into<String>) -> Self {
        Self {
            source_namespace: source_namespace.into(),
            target_namespace: target_namespace.into(),
            classes: IndexMap::new(),
        }
    }

    pub fn source_namespace(&self) -> &str {
        &self.source_namespace
    }

    pub fn target_namespace(&self) -> &str {
        &self.target_namespace
    }

    /// Look up a class by fully-qualified source name, descending through
    /// `$`-separated inner class segments.
    pub fn class(&self, full_source: &str) -> Option<&ClassMapping> {
        let mut segments = full_source.split('$');
        let mut current = self.classes.get(segments.next()?)?;
        for segment in segments {
            current = current.inner.get(segment)?;
        }
        Some(current)
    }

    pub fn class_mut(&mut self, full_source: &str) -> Option<&mut ClassMapping> {
        let mut segments = full_source.split('$');
        let mut current = self.classes.get_mut(segments.next()?)?;
        for segment in segments {
            current = current.inner.get_mut(segment)?;
        }
        Some(current)
    }

    /// Get or create the class at the given fully-qualified source name,
    /// creating implicit parents for nested names as needed.
    pub fn get_or_create_class(&mut self, full_source: &str) -> &mut ClassMapping {
        let mut segments = full_source.split('$');
        let top = segments.next().unwrap_or(full_source);
        let mut current = self
            .classes
            .entry(top.to_string())
            .or_insert_with(|| ClassMapping::new(top));
        for segment in segments {
            current = current.get_or_create_inner(segment);
        }
        current
    }

    /// Fully-qualified source names of every class in the set, parents
    /// before their inner classes, in insertion order.
    pub fn class_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        for (name, class) in &self.classes {
            collect_names(name, class, &mut names);
        }
        names
    }

    /// Visit every class with its full source and target names, parents
    /// before inner classes, in insertion order.
    pub fn iterate_classes<F>(&self, mut action: F)
    where
        F: FnMut(&str, &str, &ClassMapping),
    {
        for class in self.classes.values() {
            iterate_class(class.source.clone(), class.target_name().to_string(), class, &mut action);
        }
    }

    /// Translate a fully-qualified source-namespace class name into the
    /// target namespace. Unmapped segments pass through unchanged.
    pub fn remap_class_name(&self, full_source: &str) -> String {
        let mut out = String::new();
        let mut node: Option<&ClassMapping> = None;
        let mut off_tree = false;
        for segment in full_source.split('$') {
            let next = if off_tree {
                None
            } else {
                match node {
                    None => self.classes.get(segment),
                    Some(parent) => parent.inner.get(segment),
                }
            };
            if !out.is_empty() {
                out.push('$');
            }
            match next {
                Some(class) => out.push_str(class.target_name()),
                // Once off the mapped tree, remaining segments pass through
                None => {
                    out.push_str(segment);
                    off_tree = true;
                }
            }
            node = next;
        }
        out
    }

    /// Translate a field type from the source namespace to the target one.
    pub fn remap_field_type(&self, ty: &FieldType) -> FieldType {
        match ty {
            FieldType::Base(base) => FieldType::Base(*base),
            FieldType::Object(name) => FieldType::Object(self.remap_class_name(name)),
            FieldType::Array {
                dimensions,
                element,
            } => FieldType::Array {
                dimensions: *dimensions,
                element: Box::new(self.remap_field_type(element)),
            },
        }
    }

    /// Translate a method descriptor from the source namespace to the
    /// target one.
    pub fn remap_method_descriptor(&self, descriptor: &MethodDescriptor) -> MethodDescriptor {
        MethodDescriptor {
            parameters: descriptor
                .parameters
                .iter()
                .map(|ty| self.remap_field_type(ty))
                .collect(),
            return_type: descriptor
                .return_type
                .as_ref()
                .map(|ty| self.remap_field_type(ty)),
        }
    }
}

fn collect_names(full: &str, class: &ClassMapping, out: &mut Vec<String>) {
    out.push(full.to_string());
    for (name, inner) in &class.inner {
        collect_names(&format!("{}${}", full, name), inner, out);
    }
}

fn iterate_class<F>(full_source: String, full_target: String, class: &ClassMapping, action: &mut F)
where
    F: FnMut(&str, &str, &ClassMapping),
{
    action(&full_source, &full_target, class);
    for inner in class.inner.values() {
        iterate_class(
            format!("{}${}", full_source, inner.source),
            format!("{}${}", full_target, inner.target_name()),
            inner,
            action,
        );
    }
}
