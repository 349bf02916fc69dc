//! Auxiliary side tables: the static-method list and the constructor table.
//!
//! Both arrive as plain text alongside the main mapping table. The
//! static-method list is one method identifier per line. The constructor
//! table is whitespace-separated rows of `<numericId> <ownerTargetName>
//! <descriptor>`, the descriptor being in the target namespace.

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::error::{MappingError, Result};
use crate::model::{MethodDescriptor, MethodMapping};

/// Set of method names known to be static.
///
/// Membership decides the first local-variable slot when emitting parameter
/// names (statics have no receiver in slot 0). Upstream tables key these by
/// the stable srg-form name, which sits on either side of a set depending on
/// its direction, so both the source and target name are checked.
#[derive(Debug, Clone, Default)]
pub struct StaticMethodSet {
    names: HashSet<String>,
}

impl StaticMethodSet {
    pub fn parse(input: &str) -> Self {
        let names = input
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        Self { names }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn is_static(&self, method: &MethodMapping) -> bool {
        self.contains(method.target_name()) || self.contains(&method.key.name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// One constructor row: owner class (target namespace), numeric id, and
/// descriptor (target namespace). Overloads produce multiple rows per owner.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstructorEntry {
    pub owner: String,
    pub id: u32,
    pub descriptor: MethodDescriptor,
}

/// Constructor table keyed by owner class target-namespace name.
#[derive(Debug, Clone, Default)]
pub struct ConstructorTable {
    entries: IndexMap<String, Vec<ConstructorEntry>>,
}

impl ConstructorTable {
    pub fn parse(input: &str) -> Result<Self> {
        let mut table = ConstructorTable::default();

        for (index, raw_line) in input.lines().enumerate() {
            let line_number = index + 1;
            if raw_line.trim().is_empty() {
                continue;
            }

            let parts: Vec<&str> = raw_line.split_whitespace().collect();
            if parts.len() != 3 {
                return Err(MappingError::MalformedConstructorEntry { line: line_number });
            }

            let id: u32 = parts[0]
                .parse()
                .map_err(|_| MappingError::MalformedConstructorEntry { line: line_number })?;
            let owner = parts[1].to_string();
            let descriptor = MethodDescriptor::parse(parts[2])?;

            let entries = table.entries.entry(owner.clone()).or_default();
            if entries
                .iter()
                .any(|e| e.id == id && e.descriptor == descriptor)
            {
                return Err(MappingError::DuplicateConstructorEntry {
                    owner,
                    id,
                    descriptor: descriptor.to_string(),
                });
            }
            entries.push(ConstructorEntry {
                owner,
                id,
                descriptor,
            });
        }

        Ok(table)
    }

    /// Constructor rows for a class, looked up by target-namespace name.
    pub fn entries_for(&self, owner_target_name: &str) -> &[ConstructorEntry] {
        self.entries
            .get(owner_target_name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MethodKey;

    #[test]
    fn parses_static_method_list() {
        let set = StaticMethodSet::parse("func_1_a\nfunc_2_b\n\nfunc_3_c\n");
        assert_eq!(set.len(), 3);
        assert!(set.contains("func_2_b"));
        assert!(!set.contains("func_9_z"));
    }

    #[test]
    fn static_check_matches_either_name_side() {
        let set = StaticMethodSet::parse("func_1_a\n");
        let mut method = MethodMapping::new(MethodKey::new(
            "a",
            MethodDescriptor::parse("()V").unwrap(),
        ));
        method.target = Some("func_1_a".to_string());
        assert!(set.is_static(&method));

        let mut reversed = MethodMapping::new(MethodKey::new(
            "func_1_a",
            MethodDescriptor::parse("()V").unwrap(),
        ));
        reversed.target = Some("a".to_string());
        assert!(set.is_static(&reversed));
    }

    #[test]
    fn parses_constructor_rows() {
        let table = ConstructorTable::parse("100 net/example/Foo (I)V\n101 net/example/Foo ()V\n")
            .unwrap();
        let entries = table.entries_for("net/example/Foo");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, 100);
        assert_eq!(entries[0].descriptor.to_string(), "(I)V");
        assert!(table.entries_for("net/example/Missing").is_empty());
    }

    #[test]
    fn rejects_wrong_field_count() {
        match ConstructorTable::parse("100 net/example/Foo\n") {
            Err(MappingError::MalformedConstructorEntry { line }) => assert_eq!(line, 1),
            other => panic!("expected MalformedConstructorEntry, got {:?}", other),
        }
    }

    #[test]
    fn rejects_non_numeric_id() {
        match ConstructorTable::parse("abc net/example/Foo (I)V\n") {
            Err(MappingError::MalformedConstructorEntry { line }) => assert_eq!(line, 1),
            other => panic!("expected MalformedConstructorEntry, got {:?}", other),
        }
    }

    #[test]
    fn rejects_duplicate_id_descriptor_pairs() {
        let input = "100 net/example/Foo (I)V\n100 net/example/Foo (I)V\n";
        match ConstructorTable::parse(input) {
            Err(MappingError::DuplicateConstructorEntry { owner, id, .. }) => {
                assert_eq!(owner, "net/example/Foo");
                assert_eq!(id, 100);
            }
            other => panic!("expected DuplicateConstructorEntry, got {:?}", other),
        }
    }

    #[test]
    fn same_id_different_descriptor_is_allowed() {
        let input = "100 net/example/Foo (I)V\n100 net/example/Foo (J)V\n";
        let table = ConstructorTable::parse(input).unwrap();
        assert_eq!(table.entries_for("net/example/Foo").len(), 2);
    }
}
