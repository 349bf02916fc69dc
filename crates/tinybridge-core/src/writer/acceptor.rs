//! Accept-style visitor boundary consumed by the external bytecode
//! remapper.
//!
//! This contract is the one downstream dependency surface; it stays stable
//! regardless of internal representation changes. `apply` pushes a completed
//! set through an acceptor in a fixed order (class, its fields, its methods,
//! each method immediately followed by its parameters) so output is
//! deterministic across runs.

use crate::error::Result;
use crate::model::{FieldType, MappingSet};
use crate::reader::tables::StaticMethodSet;
use crate::validate;

/// A member reference in the source namespace: owning class, member name,
/// member descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberRef<'a> {
    pub owner: &'a str,
    pub name: &'a str,
    pub descriptor: &'a str,
}

/// Receives a completed mapping set entry by entry.
pub trait MappingAcceptor {
    fn accept_class(&mut self, source: &str, target: &str);
    fn accept_field(&mut self, member: MemberRef<'_>, field_type: Option<&FieldType>, target: &str);
    fn accept_method(&mut self, member: MemberRef<'_>, target: &str);
    /// `slot_index` is the local-variable-table slot, not the logical
    /// parameter index.
    fn accept_method_parameter(&mut self, method: MemberRef<'_>, slot_index: usize, target: &str);
}

/// Push the whole set through the acceptor.
///
/// With `strict` set, every field must carry a type descriptor; offenders
/// are collected into one [`IncompleteFieldSignatures`] error up front.
/// Parameter slot indices account for the receiver (instance methods start
/// at slot 1, statics at 0) and for wide primitives taking two slots.
///
/// [`IncompleteFieldSignatures`]: crate::error::MappingError::IncompleteFieldSignatures
pub fn apply(
    set: &MappingSet,
    acceptor: &mut dyn MappingAcceptor,
    static_methods: &StaticMethodSet,
    strict: bool,
) -> Result<()> {
    if strict {
        validate::verify_field_types(set)?;
    }

    set.iterate_classes(|full_source, full_target, class| {
        acceptor.accept_class(full_source, full_target);

        for field in class.fields.values() {
            let descriptor = field
                .field_type
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default();
            let member = MemberRef {
                owner: full_source,
                name: &field.source,
                descriptor: &descriptor,
            };
            acceptor.accept_field(member, field.field_type.as_ref(), &field.target);
        }

        for method in class.methods.values() {
            let descriptor = method.key.descriptor.to_string();
            let member = MemberRef {
                owner: full_source,
                name: &method.key.name,
                descriptor: &descriptor,
            };
            acceptor.accept_method(member, method.target_name());

            let first_slot = if static_methods.is_static(method) { 0 } else { 1 };
            for (&index, name) in &method.parameters {
                // An entry beyond the declared parameter count has no slot;
                // skip it rather than panic on the slice.
                let Some(preceding) = method.key.descriptor.parameters.get(..index) else {
                    continue;
                };
                let slot: usize =
                    first_slot + preceding.iter().map(FieldType::slot_width).sum::<usize>();
                acceptor.accept_method_parameter(member, slot, name);
            }
        }
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MappingError;
    use crate::model::{MethodDescriptor, MethodKey};

    #[derive(Default)]
    struct RecordingAcceptor {
        events: Vec<String>,
    }

    impl MappingAcceptor for RecordingAcceptor {
        fn accept_class(&mut self, source: &str, target: &str) {
            self.events.push(format!("class {} -> {}", source, target));
        }

        fn accept_field(
            &mut self,
            member: MemberRef<'_>,
            field_type: Option<&FieldType>,
            target: &str,
        ) {
            let ty = field_type.map(ToString::to_string).unwrap_or_else(|| "?".to_string());
            self.events.push(format!(
                "field {}.{}:{} -> {}",
                member.owner, member.name, ty, target
            ));
        }

        fn accept_method(&mut self, member: MemberRef<'_>, target: &str) {
            self.events.push(format!(
                "method {}.{}{} -> {}",
                member.owner, member.name, member.descriptor, target
            ));
        }

        fn accept_method_parameter(&mut self, method: MemberRef<'_>, slot_index: usize, target: &str) {
            self.events
                .push(format!("param {}.{} slot {} -> {}", method.owner, method.name, slot_index, target));
        }
    }

    fn key(name: &str, desc: &str) -> MethodKey {
        MethodKey::new(name, MethodDescriptor::parse(desc).unwrap())
    }

    fn sample_set() -> MappingSet {
        let mut set = MappingSet::new("official", "srg");
        let a = set.get_or_create_class("a");
        a.target = Some("Foo".to_string());
        let f = a.get_or_create_field("x");
        f.target = "field_1_x".to_string();
        f.field_type = Some(FieldType::parse("I").unwrap());
        let m = a.get_or_create_method(key("m", "(IJI)V"));
        m.target = Some("func_1_m".to_string());
        m.set_parameter_name(0, "p_1_0_");
        m.set_parameter_name(1, "p_1_1_");
        m.set_parameter_name(2, "p_1_2_");
        set
    }

    #[test]
    fn visits_in_stable_order() {
        let set = sample_set();
        let mut acceptor = RecordingAcceptor::default();
        apply(&set, &mut acceptor, &StaticMethodSet::default(), true).unwrap();

        assert_eq!(
            acceptor.events,
            vec![
                "class a -> Foo",
                "field a.x:I -> field_1_x",
                "method a.m(IJI)V -> func_1_m",
                // Instance method: receiver takes slot 0, long takes two
                "param a.m slot 1 -> p_1_0_",
                "param a.m slot 2 -> p_1_1_",
                "param a.m slot 4 -> p_1_2_",
            ]
        );
    }

    #[test]
    fn static_methods_start_at_slot_zero() {
        let set = sample_set();
        let statics = StaticMethodSet::parse("func_1_m\n");
        let mut acceptor = RecordingAcceptor::default();
        apply(&set, &mut acceptor, &statics, true).unwrap();

        let params: Vec<&String> = acceptor
            .events
            .iter()
            .filter(|e| e.starts_with("param"))
            .collect();
        assert_eq!(
            params,
            vec![
                "param a.m slot 0 -> p_1_0_",
                "param a.m slot 1 -> p_1_1_",
                "param a.m slot 3 -> p_1_2_",
            ]
        );
    }

    #[test]
    fn parameter_entries_beyond_the_declared_count_are_skipped() {
        let mut set = sample_set();
        set.class_mut("a")
            .unwrap()
            .methods
            .get_mut(&key("m", "(IJI)V"))
            .unwrap()
            .parameters
            .insert(9, "ghost".to_string());

        let mut acceptor = RecordingAcceptor::default();
        apply(&set, &mut acceptor, &StaticMethodSet::default(), true).unwrap();

        assert!(!acceptor.events.iter().any(|e| e.contains("ghost")));
        assert_eq!(
            acceptor.events.iter().filter(|e| e.starts_with("param")).count(),
            3
        );
    }

    #[test]
    fn strict_mode_fails_before_visiting() {
        let mut set = sample_set();
        set.class_mut("a").unwrap().get_or_create_field("untyped").target = "field_2_u".to_string();

        let mut acceptor = RecordingAcceptor::default();
        match apply(&set, &mut acceptor, &StaticMethodSet::default(), true) {
            Err(MappingError::IncompleteFieldSignatures { entries }) => {
                assert_eq!(entries.len(), 1);
                assert_eq!(entries[0].source_field, "untyped");
            }
            other => panic!("expected IncompleteFieldSignatures, got {:?}", other),
        }
        assert!(acceptor.events.is_empty());
    }

    #[test]
    fn non_strict_mode_passes_missing_types_through() {
        let mut set = sample_set();
        set.class_mut("a").unwrap().get_or_create_field("untyped").target = "field_2_u".to_string();

        let mut acceptor = RecordingAcceptor::default();
        apply(&set, &mut acceptor, &StaticMethodSet::default(), false).unwrap();
        assert!(acceptor
            .events
            .contains(&"field a.untyped:? -> field_2_u".to_string()));
    }
}
