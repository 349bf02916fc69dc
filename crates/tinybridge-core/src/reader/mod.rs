//! Mapping text reader.
//!
//! Parses the indentation-delimited two-namespace table format into a
//! [`MappingSet`]. A class row carries no leading tab and two columns
//! (source, target); member rows carry exactly one leading tab and belong to
//! the most recent class row. Member rows come in two shapes, both of which
//! appear in upstream table families:
//!
//! ```text
//! a    net/example/Foo          class
//!     fld    field_1_a          field (untagged)
//!     mth    ()V    func_1_a    method (untagged, descriptor in the middle)
//!     f    I    fld    field_1_a    field (tagged, with type)
//!     m    ()V    mth    func_1_a   method (tagged)
//! ```
//!
//! Rows with the wrong column count fail with
//! [`MappingError::MalformedMappingEntry`] carrying the 1-based line number;
//! nothing is silently skipped. Nested classes appear as additional
//! non-indented rows with `$`-qualified source names and are attached under
//! their enclosing class.

pub mod tables;

use tracing::debug;

use crate::error::{MappingError, Result};
use crate::model::{FieldType, MappingSet, MethodDescriptor, MethodKey};

/// Parse mapping text into a [`MappingSet`] directed from `source_namespace`
/// to `target_namespace`.
pub fn parse(input: &str, source_namespace: &str, target_namespace: &str) -> Result<MappingSet> {
    let mut set = MappingSet::new(source_namespace, target_namespace);
    let mut current_class: Option<String> = None;

    for (index, raw_line) in input.lines().enumerate() {
        let line_number = index + 1;
        if raw_line.is_empty() {
            continue;
        }

        if let Some(member_line) = raw_line.strip_prefix('\t') {
            let owner = current_class
                .as_deref()
                .ok_or(MappingError::MalformedMappingEntry { line: line_number })?;
            parse_member_line(&mut set, owner, member_line, line_number)?;
        } else {
            let full_source = parse_class_line(&mut set, raw_line, line_number)?;
            current_class = Some(full_source);
        }
    }

    debug!(
        classes = set.class_names().len(),
        source = source_namespace,
        target = target_namespace,
        "parsed mapping set"
    );
    Ok(set)
}

fn parse_class_line(set: &mut MappingSet, line: &str, line_number: usize) -> Result<String> {
    let columns: Vec<&str> = line.split('\t').collect();
    if columns.len() != 2 || columns.iter().any(|c| c.is_empty()) {
        return Err(MappingError::MalformedMappingEntry { line: line_number });
    }

    let (source, target) = (columns[0], columns[1]);
    let class = set.get_or_create_class(source);
    // Inner class rows carry the full target name; only the simple trailing
    // segment is stored, the rest is recomputed from the parents.
    let simple_target = if source.contains('$') {
        target.rsplit('$').next().unwrap_or(target)
    } else {
        target
    };
    class.target = Some(simple_target.to_string());
    Ok(source.to_string())
}

fn parse_member_line(
    set: &mut MappingSet,
    owner: &str,
    line: &str,
    line_number: usize,
) -> Result<()> {
    let columns: Vec<&str> = line.split('\t').collect();
    if columns.iter().any(|c| c.is_empty()) {
        return Err(MappingError::MalformedMappingEntry { line: line_number });
    }
    let malformed = || MappingError::MalformedMappingEntry { line: line_number };
    let class = set.class_mut(owner).ok_or_else(malformed)?;

    match columns.as_slice() {
        // Tagged method row: m <descriptor> <source> <target>
        ["m", descriptor, source, target] => {
            let descriptor = MethodDescriptor::parse(descriptor).map_err(|_| malformed())?;
            let method = class.get_or_create_method(MethodKey::new(*source, descriptor));
            method.target = Some((*target).to_string());
        }
        // Tagged field row with type: f <type> <source> <target>
        ["f", field_type, source, target] => {
            let field_type = FieldType::parse(field_type).map_err(|_| malformed())?;
            let field = class.get_or_create_field(source);
            field.target = (*target).to_string();
            field.field_type = Some(field_type);
        }
        // Tagged field row without type, unless the middle column is a
        // descriptor (then it is an untagged method that happens to be
        // named "f")
        ["f", source, target] if !source.starts_with('(') => {
            let field = class.get_or_create_field(source);
            field.target = (*target).to_string();
        }
        // Untagged method row: <source> <descriptor> <target>
        [source, descriptor, target] => {
            let descriptor = MethodDescriptor::parse(descriptor).map_err(|_| malformed())?;
            let method = class.get_or_create_method(MethodKey::new(*source, descriptor));
            method.target = Some((*target).to_string());
        }
        // Untagged field row: <source> <target>
        [source, target] => {
            let field = class.get_or_create_field(source);
            field.target = (*target).to_string();
        }
        _ => return Err(malformed()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_classes_with_members() {
        let input = "a\tnet/example/Foo\n\tfld\tfield_1_a\n\tmth\t(I)V\tfunc_1_a\n";
        let set = parse(input, "official", "srg").unwrap();

        let class = set.class("a").unwrap();
        assert_eq!(class.target_name(), "net/example/Foo");
        assert_eq!(class.fields["fld"].target, "field_1_a");
        assert_eq!(class.fields["fld"].field_type, None);

        let key = MethodKey::new("mth", MethodDescriptor::parse("(I)V").unwrap());
        assert_eq!(class.methods[&key].target_name(), "func_1_a");
    }

    #[test]
    fn parses_tagged_member_rows() {
        let input = "A\tfoo\n\tm\t()I\tgetX\tm_1_\n\tf\tI\tfld\tfield_1_\n";
        let set = parse(input, "official", "srg").unwrap();

        let class = set.class("A").unwrap();
        let key = MethodKey::new("getX", MethodDescriptor::parse("()I").unwrap());
        assert_eq!(class.methods[&key].target_name(), "m_1_");
        assert_eq!(
            class.fields["fld"].field_type,
            Some(FieldType::parse("I").unwrap())
        );
    }

    #[test]
    fn assembles_inner_classes_from_qualified_rows() {
        let input = "a\tnet/example/Foo\na$b\tnet/example/Foo$Bar\n\tmth\t()V\tfunc_2_b\n";
        let set = parse(input, "official", "srg").unwrap();

        let inner = set.class("a$b").unwrap();
        assert_eq!(inner.target_name(), "Bar");
        assert_eq!(set.remap_class_name("a$b"), "net/example/Foo$Bar");
        let key = MethodKey::new("mth", MethodDescriptor::parse("()V").unwrap());
        assert_eq!(inner.methods[&key].target_name(), "func_2_b");
    }

    #[test]
    fn inner_class_row_may_precede_parent() {
        let input = "a$b\tFoo$Bar\na\tFoo\n";
        let set = parse(input, "official", "srg").unwrap();
        assert_eq!(set.class("a").unwrap().target_name(), "Foo");
        assert_eq!(set.class("a$b").unwrap().target_name(), "Bar");
    }

    #[test]
    fn reports_malformed_lines_with_line_number() {
        let input = "a\tFoo\n\tonly_one_column_after_tab_is_wrong\n";
        match parse(input, "official", "srg") {
            Err(MappingError::MalformedMappingEntry { line }) => assert_eq!(line, 2),
            other => panic!("expected MalformedMappingEntry, got {:?}", other),
        }

        let input = "a\tFoo\textra\n";
        match parse(input, "official", "srg") {
            Err(MappingError::MalformedMappingEntry { line }) => assert_eq!(line, 1),
            other => panic!("expected MalformedMappingEntry, got {:?}", other),
        }
    }

    #[test]
    fn member_row_without_class_is_malformed() {
        let input = "\tfld\tfield_1_a\n";
        match parse(input, "official", "srg") {
            Err(MappingError::MalformedMappingEntry { line }) => assert_eq!(line, 1),
            other => panic!("expected MalformedMappingEntry, got {:?}", other),
        }
    }

    #[test]
    fn bad_descriptor_is_malformed_at_its_line() {
        let input = "a\tFoo\n\tmth\t(Q)V\tfunc_1_a\n";
        match parse(input, "official", "srg") {
            Err(MappingError::MalformedMappingEntry { line }) => assert_eq!(line, 2),
            other => panic!("expected MalformedMappingEntry, got {:?}", other),
        }
    }
}
