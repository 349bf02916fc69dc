//! Algebraic operations over mapping sets: reversal and chaining.
//!
//! Both build a brand new [`MappingSet`]; operands are never mutated.

use tracing::debug;

use crate::model::{ClassMapping, FieldMapping, MappingSet, MethodKey, MethodMapping};

/// What `merge` does with a class or member that has no counterpart in the
/// second set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergePolicy {
    /// Keep the first set's target name as the final name. The default:
    /// real-world tables routinely cover different class subsets and
    /// dropping the difference loses mappings the remapper still needs.
    #[default]
    PassThrough,
    /// Omit the unmatched class or member from the composed set.
    Drop,
}

/// Invert a mapping set's direction.
///
/// Every class, method, field, and parameter entry survives under swapped
/// names; member descriptors and field types are translated into the new
/// source namespace through the original set. A parameter entry carries only
/// an index and a name, so it is kept as-is.
pub fn reverse(set: &MappingSet) -> MappingSet {
    let mut out = MappingSet::new(set.target_namespace(), set.source_namespace());
    for class in set.classes.values() {
        let reversed = reverse_class(set, class);
        out.classes.insert(reversed.source.clone(), reversed);
    }
    debug!(
        source = out.source_namespace(),
        target = out.target_namespace(),
        "reversed mapping set"
    );
    out
}

fn reverse_class(set: &MappingSet, class: &ClassMapping) -> ClassMapping {
    let mut out = ClassMapping::new(class.target_name());
    out.target = Some(class.source.clone());

    for method in class.methods.values() {
        let key = MethodKey::new(
            method.target_name(),
            set.remap_method_descriptor(&method.key.descriptor),
        );
        let mut reversed = MethodMapping::new(key);
        reversed.target = Some(method.key.name.clone());
        reversed.parameters = method.parameters.clone();
        out.methods.insert(reversed.key.clone(), reversed);
    }

    for field in class.fields.values() {
        let mut reversed = FieldMapping::new(field.target.clone(), field.source.clone());
        reversed.field_type = field
            .field_type
            .as_ref()
            .map(|ty| set.remap_field_type(ty));
        out.fields.insert(reversed.source.clone(), reversed);
    }

    for inner in class.inner.values() {
        let reversed = reverse_class(set, inner);
        out.inner.insert(reversed.source.clone(), reversed);
    }

    out
}

/// Chain two sets sharing a namespace: `A: X->Y` composed with `B: Y->Z`
/// yields `X->Z`, with the default pass-through policy for entries absent
/// from `B`.
pub fn merge(a: &MappingSet, b: &MappingSet) -> MappingSet {
    merge_with_policy(a, b, MergePolicy::default())
}

/// `merge` with an explicit unmatched-entry policy.
///
/// `A`'s tree drives the result: for each of `A`'s classes the class in `B`
/// whose source name equals `A`'s target name is joined in, recursively,
/// and members are joined by `A`'s target name plus `A`'s descriptor
/// translated through `A` into the shared namespace.
pub fn merge_with_policy(a: &MappingSet, b: &MappingSet, policy: MergePolicy) -> MappingSet {
    debug_assert_eq!(
        a.target_namespace(),
        b.source_namespace(),
        "merge requires a shared namespace"
    );

    let mut out = MappingSet::new(a.source_namespace(), b.target_namespace());
    for class in a.classes.values() {
        if let Some(merged) = merge_class(a, b, class, class.target_name(), policy) {
            out.classes.insert(merged.source.clone(), merged);
        }
    }
    debug!(
        classes = out.classes.len(),
        source = out.source_namespace(),
        target = out.target_namespace(),
        "merged mapping sets"
    );
    out
}

fn merge_class(
    a: &MappingSet,
    b: &MappingSet,
    a_class: &ClassMapping,
    a_full_target: &str,
    policy: MergePolicy,
) -> Option<ClassMapping> {
    let b_class = b.class(a_full_target);
    if b_class.is_none() && policy == MergePolicy::Drop {
        return None;
    }

    let mut out = ClassMapping::new(a_class.source.clone());
    out.target = Some(match b_class {
        Some(b_class) => b_class.target_name().to_string(),
        None => a_class.target_name().to_string(),
    });

    for method in a_class.methods.values() {
        let join_key = MethodKey::new(
            method.target_name(),
            a.remap_method_descriptor(&method.key.descriptor),
        );
        let b_method = b_class.and_then(|c| c.methods.get(&join_key));
        if b_method.is_none() && policy == MergePolicy::Drop {
            continue;
        }

        let mut merged = MethodMapping::new(method.key.clone());
        merged.target = Some(match b_method {
            Some(b_method) => b_method.target_name().to_string(),
            None => method.target_name().to_string(),
        });
        merged.parameters = method.parameters.clone();
        if let Some(b_method) = b_method {
            // B's parameter names are the further-composed ones; they win
            // per index.
            for (&index, name) in &b_method.parameters {
                merged.parameters.insert(index, name.clone());
            }
        }
        out.methods.insert(merged.key.clone(), merged);
    }

    for field in a_class.fields.values() {
        let b_field = b_class.and_then(|c| c.fields.get(&field.target));
        if b_field.is_none() && policy == MergePolicy::Drop {
            continue;
        }

        let mut merged = FieldMapping::new(field.source.clone(), match b_field {
            Some(b_field) => b_field.target.clone(),
            None => field.target.clone(),
        });
        // The composed set's source namespace is A's, so A's recorded type
        // (if any) is the one that stays valid.
        merged.field_type = field.field_type.clone();
        out.fields.insert(merged.source.clone(), merged);
    }

    for inner in a_class.inner.values() {
        let inner_full_target = format!("{}${}", a_full_target, inner.target_name());
        if let Some(merged) = merge_class(a, b, inner, &inner_full_target, policy) {
            out.inner.insert(merged.source.clone(), merged);
        }
    }

    Some(out)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{FieldType, MethodDescriptor};
    use crate::reader;

    fn key(name: &str, desc: &str) -> MethodKey {
        MethodKey::new(name, MethodDescriptor::parse(desc).unwrap())
    }

    fn sample_set() -> MappingSet {
        let mut set = MappingSet::new("official", "srg");
        let a = set.get_or_create_class("a");
        a.target = Some("net/example/Foo".to_string());
        let m = a.get_or_create_method(key("m", "(La;)La;"));
        m.target = Some("func_1_m".to_string());
        m.set_parameter_name(0, "p_1_0_");
        let f = a.get_or_create_field("x");
        f.target = "field_2_x".to_string();
        f.field_type = Some(FieldType::parse("La;").unwrap());

        let inner = set.get_or_create_class("a$b");
        inner.target = Some("Bar".to_string());
        inner.get_or_create_method(key("n", "()V")).target = Some("func_3_n".to_string());
        set
    }

    #[test]
    fn reverse_swaps_names_and_translates_descriptors() {
        let set = sample_set();
        let reversed = reverse(&set);

        assert_eq!(reversed.source_namespace(), "srg");
        assert_eq!(reversed.target_namespace(), "official");

        let foo = reversed.class("net/example/Foo").unwrap();
        assert_eq!(foo.target_name(), "a");
        let m = &foo.methods[&key("func_1_m", "(Lnet/example/Foo;)Lnet/example/Foo;")];
        assert_eq!(m.target_name(), "m");
        assert_eq!(m.parameters[&0], "p_1_0_");

        let x = &foo.fields["field_2_x"];
        assert_eq!(x.target, "x");
        assert_eq!(
            x.field_type,
            Some(FieldType::parse("Lnet/example/Foo;").unwrap())
        );

        // Inner classes survive under swapped simple names
        let bar = reversed.class("net/example/Foo$Bar").unwrap();
        assert_eq!(bar.target_name(), "b");
        assert!(bar.methods.contains_key(&key("func_3_n", "()V")));
    }

    #[test]
    fn double_reverse_is_identity() {
        let set = sample_set();
        assert_eq!(reverse(&reverse(&set)), set);
    }

    #[test]
    fn reverse_does_not_mutate_operand() {
        let set = sample_set();
        let copy = set.clone();
        let _ = reverse(&set);
        assert_eq!(set, copy);
    }

    fn intermediary_set() -> MappingSet {
        let mut b = MappingSet::new("srg", "named");
        let foo = b.get_or_create_class("net/example/Foo");
        foo.target = Some("com/mod/Widget".to_string());
        foo.get_or_create_method(key("func_1_m", "(Lnet/example/Foo;)Lnet/example/Foo;"))
            .target = Some("transform".to_string());
        foo.get_or_create_field("field_2_x").target = "counter".to_string();
        b
    }

    #[test]
    fn merge_joins_through_the_shared_namespace() {
        let a = sample_set();
        let b = intermediary_set();
        let merged = merge(&a, &b);

        assert_eq!(merged.source_namespace(), "official");
        assert_eq!(merged.target_namespace(), "named");

        let class = merged.class("a").unwrap();
        assert_eq!(class.target_name(), "com/mod/Widget");
        // Member joined by A's target name + A-translated descriptor
        assert_eq!(class.methods[&key("m", "(La;)La;")].target_name(), "transform");
        assert_eq!(class.fields["x"].target, "counter");
        // Field type stays in the composed set's source namespace
        assert_eq!(class.fields["x"].field_type, Some(FieldType::parse("La;").unwrap()));
    }

    #[test]
    fn merge_passes_through_unmatched_entries_by_default() {
        let a = sample_set();
        let b = MappingSet::new("srg", "named");
        let merged = merge(&a, &b);

        let class = merged.class("a").unwrap();
        assert_eq!(class.target_name(), "net/example/Foo");
        assert_eq!(class.methods[&key("m", "(La;)La;")].target_name(), "func_1_m");
        assert_eq!(class.fields["x"].target, "field_2_x");
        assert!(merged.class("a$b").is_some());
    }

    #[test]
    fn merge_drop_policy_omits_unmatched_entries() {
        let a = sample_set();
        let mut b = MappingSet::new("srg", "named");
        b.get_or_create_class("net/example/Foo").target = Some("Widget".to_string());

        let merged = merge_with_policy(&a, &b, MergePolicy::Drop);
        let class = merged.class("a").unwrap();
        assert_eq!(class.target_name(), "Widget");
        // Members and the inner class had no counterpart in b
        assert!(class.methods.is_empty());
        assert!(class.fields.is_empty());
        assert!(class.inner.is_empty());
    }

    #[test]
    fn merge_does_not_mutate_operands() {
        let a = sample_set();
        let b = intermediary_set();
        let (a_copy, b_copy) = (a.clone(), b.clone());
        let _ = merge(&a, &b);
        assert_eq!(a, a_copy);
        assert_eq!(b, b_copy);
    }

    #[test]
    fn read_then_merge_end_to_end() {
        let a = reader::parse("A\tfoo\n\tm\t()I\tgetX\tm_1_\n", "official", "srg").unwrap();
        let mut b = MappingSet::new("srg", "named");
        b.get_or_create_class("foo").target = Some("Bar".to_string());

        let merged = merge(&a, &b);
        let class = merged.class("A").unwrap();
        assert_eq!(class.target_name(), "Bar");
        assert_eq!(class.methods[&key("getX", "()I")].target_name(), "m_1_");
    }
}
