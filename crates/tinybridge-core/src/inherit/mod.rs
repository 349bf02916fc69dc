//! Class hierarchy resolution.
//!
//! An [`InheritanceProvider`] resolves a class name to its hierarchy context
//! ([`ClassInfo`]). Providers compose: a cascading provider tries an ordered
//! list and takes the first hit, and a caching decorator memoizes answers
//! (including negative ones) for the lifetime of one completion pass. The
//! usual chain is bundled classfiles first, then a static platform-class
//! table for JRE roots.

pub mod classfile;
pub mod complete;

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use tracing::warn;

pub use classfile::{parse_class, ClassInfo, MemberInfo};
pub use complete::complete;

/// Resolves a class name to its raw classfile bytes.
pub trait ClassBytesProvider {
    fn class_bytes(&self, class_name: &str) -> Option<Vec<u8>>;
}

/// Resolves a class name to its hierarchy context.
pub trait InheritanceProvider {
    fn provide(&self, class_name: &str) -> Option<ClassInfo>;
}

/// Inheritance provider backed by raw classfile bytes.
pub struct BytecodeInheritanceProvider<P> {
    bytes: P,
}

impl<P: ClassBytesProvider> BytecodeInheritanceProvider<P> {
    pub fn new(bytes: P) -> Self {
        Self { bytes }
    }
}

impl<P: ClassBytesProvider> InheritanceProvider for BytecodeInheritanceProvider<P> {
    fn provide(&self, class_name: &str) -> Option<ClassInfo> {
        let bytes = self.bytes.class_bytes(class_name)?;
        match classfile::parse_class(&bytes) {
            Ok(info) => Some(info),
            Err(error) => {
                warn!(class = class_name, %error, "failed to parse classfile");
                None
            }
        }
    }
}

/// Tries an ordered list of providers; the first non-empty answer wins.
#[derive(Default)]
pub struct CascadingInheritanceProvider {
    providers: Vec<Box<dyn InheritanceProvider>>,
}

impl CascadingInheritanceProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn install(&mut self, provider: Box<dyn InheritanceProvider>) -> &mut Self {
        self.providers.push(provider);
        self
    }
}

impl InheritanceProvider for CascadingInheritanceProvider {
    fn provide(&self, class_name: &str) -> Option<ClassInfo> {
        self.providers
            .iter()
            .find_map(|provider| provider.provide(class_name))
    }
}

/// Memoizing decorator. An answer (hit or miss) is never expected to change
/// within one completion pass, so both are cached.
pub struct CachingInheritanceProvider<P> {
    inner: P,
    cache: RefCell<HashMap<String, Option<ClassInfo>>>,
}

impl<P: InheritanceProvider> CachingInheritanceProvider<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            cache: RefCell::new(HashMap::new()),
        }
    }
}

impl<P: InheritanceProvider> InheritanceProvider for CachingInheritanceProvider<P> {
    fn provide(&self, class_name: &str) -> Option<ClassInfo> {
        if let Some(cached) = self.cache.borrow().get(class_name) {
            return cached.clone();
        }
        let info = self.inner.provide(class_name);
        self.cache
            .borrow_mut()
            .insert(class_name.to_string(), info.clone());
        info
    }
}

/// Provider backed by a pre-populated table of [`ClassInfo`] entries.
///
/// Stands in for runtime reflection as the fallback for platform classes:
/// the hierarchy roots the program links against are declared up front as
/// plain data.
#[derive(Default)]
pub struct TableInheritanceProvider {
    classes: HashMap<String, ClassInfo>,
}

impl TableInheritanceProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table pre-seeded with `java/lang/Object`, the one root every
    /// hierarchy reaches.
    pub fn with_platform_roots() -> Self {
        let mut table = Self::new();
        table.insert(ClassInfo {
            name: "java/lang/Object".to_string(),
            super_name: None,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
        });
        table
    }

    pub fn insert(&mut self, info: ClassInfo) -> &mut Self {
        self.classes.insert(info.name.clone(), info);
        self
    }
}

impl InheritanceProvider for TableInheritanceProvider {
    fn provide(&self, class_name: &str) -> Option<ClassInfo> {
        self.classes.get(class_name).cloned()
    }
}

/// Classfile bytes from an extracted class directory
/// (`<root>/net/example/Foo.class`). Archive extraction itself happens
/// upstream.
pub struct DirectoryClassBytesProvider {
    root: PathBuf,
}

impl DirectoryClassBytesProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ClassBytesProvider for DirectoryClassBytesProvider {
    fn class_bytes(&self, class_name: &str) -> Option<Vec<u8>> {
        let mut path = self.root.clone();
        for segment in class_name.split('/') {
            path.push(segment);
        }
        path.set_extension("class");
        fs::read(&path).ok()
    }
}

/// In-memory bytes table, mainly for tests and pre-extracted inputs.
#[derive(Default)]
pub struct MapClassBytesProvider {
    classes: HashMap<String, Vec<u8>>,
}

impl MapClassBytesProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, class_name: impl Into<String>, bytes: Vec<u8>) -> &mut Self {
        self.classes.insert(class_name.into(), bytes);
        self
    }
}

impl ClassBytesProvider for MapClassBytesProvider {
    fn class_bytes(&self, class_name: &str) -> Option<Vec<u8>> {
        self.classes.get(class_name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::classfile::test_support::class_bytes;
    use super::*;

    struct CountingProvider {
        inner: TableInheritanceProvider,
        calls: RefCell<usize>,
    }

    impl InheritanceProvider for CountingProvider {
        fn provide(&self, class_name: &str) -> Option<ClassInfo> {
            *self.calls.borrow_mut() += 1;
            self.inner.provide(class_name)
        }
    }

    fn simple_info(name: &str, super_name: Option<&str>) -> ClassInfo {
        ClassInfo {
            name: name.to_string(),
            super_name: super_name.map(str::to_string),
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    #[test]
    fn bytecode_provider_parses_real_bytes() {
        let mut bytes = MapClassBytesProvider::new();
        bytes.insert("a", class_bytes("a", Some("java/lang/Object"), &[], &[]));
        let provider = BytecodeInheritanceProvider::new(bytes);

        let info = provider.provide("a").unwrap();
        assert_eq!(info.super_name.as_deref(), Some("java/lang/Object"));
        assert!(provider.provide("missing").is_none());
    }

    #[test]
    fn bytecode_provider_swallows_garbage_bytes() {
        let mut bytes = MapClassBytesProvider::new();
        bytes.insert("junk", b"definitely not a classfile".to_vec());
        let provider = BytecodeInheritanceProvider::new(bytes);
        assert!(provider.provide("junk").is_none());
    }

    #[test]
    fn cascading_takes_first_hit_in_install_order() {
        let mut first = TableInheritanceProvider::new();
        first.insert(simple_info("a", Some("from_first")));
        let mut second = TableInheritanceProvider::new();
        second.insert(simple_info("a", Some("from_second")));
        second.insert(simple_info("b", None));

        let mut cascade = CascadingInheritanceProvider::new();
        cascade.install(Box::new(first)).install(Box::new(second));

        assert_eq!(
            cascade.provide("a").unwrap().super_name.as_deref(),
            Some("from_first")
        );
        assert!(cascade.provide("b").is_some());
        assert!(cascade.provide("c").is_none());
    }

    #[test]
    fn caching_provider_asks_inner_once() {
        let mut inner = TableInheritanceProvider::new();
        inner.insert(simple_info("a", None));
        let counting = CountingProvider {
            inner,
            calls: RefCell::new(0),
        };
        let caching = CachingInheritanceProvider::new(counting);

        assert!(caching.provide("a").is_some());
        assert!(caching.provide("a").is_some());
        assert!(caching.provide("missing").is_none());
        assert!(caching.provide("missing").is_none());
        assert_eq!(*caching.inner.calls.borrow(), 2);
    }

    #[test]
    fn directory_provider_reads_class_files() {
        let dir = tempfile::tempdir().unwrap();
        let class_dir = dir.path().join("net/example");
        fs::create_dir_all(&class_dir).unwrap();
        fs::write(class_dir.join("Foo.class"), b"bytes").unwrap();

        let provider = DirectoryClassBytesProvider::new(dir.path());
        assert_eq!(provider.class_bytes("net/example/Foo").unwrap(), b"bytes");
        assert!(provider.class_bytes("net/example/Bar").is_none());
    }
}
