//! Minimal JVM classfile reader.
//!
//! Completion only needs hierarchy context: the class name, its direct
//! superclass and interfaces, and the declared member signatures. Everything
//! else (attributes, code) is skipped over.

use anyhow::{bail, ensure, Result};

/// Hierarchy context for one class, as resolved by an inheritance provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassInfo {
    /// Internal-form name, e.g. `net/example/Foo$Bar`
    pub name: String,
    /// `None` only for `java/lang/Object`
    pub super_name: Option<String>,
    pub interfaces: Vec<String>,
    pub fields: Vec<MemberInfo>,
    pub methods: Vec<MemberInfo>,
}

/// A declared field or method: name, descriptor, access flags.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberInfo {
    pub name: String,
    pub descriptor: String,
    pub access: u16,
}

const ACC_STATIC: u16 = 0x0008;

impl MemberInfo {
    pub fn is_static(&self) -> bool {
        self.access & ACC_STATIC != 0
    }
}

/// Parse the header of a classfile: constant pool, hierarchy links, and the
/// declared member tables.
pub fn parse_class(bytes: &[u8]) -> Result<ClassInfo> {
    let mut r = Reader::new(bytes);

    let magic = r.u32()?;
    ensure!(magic == 0xCAFE_BABE, "bad classfile magic: {:#x}", magic);
    r.u16()?; // minor version
    r.u16()?; // major version

    let pool = ConstantPool::parse(&mut r)?;

    r.u16()?; // access flags
    let this_class = r.u16()?;
    let super_class = r.u16()?;

    let name = pool.class_name(this_class)?.to_string();
    let super_name = if super_class == 0 {
        None
    } else {
        Some(pool.class_name(super_class)?.to_string())
    };

    let interface_count = r.u16()?;
    let mut interfaces = Vec::with_capacity(interface_count as usize);
    for _ in 0..interface_count {
        let index = r.u16()?;
        interfaces.push(pool.class_name(index)?.to_string());
    }

    let fields = parse_members(&mut r, &pool)?;
    let methods = parse_members(&mut r, &pool)?;

    Ok(ClassInfo {
        name,
        super_name,
        interfaces,
        fields,
        methods,
    })
}

fn parse_members(r: &mut Reader<'_>, pool: &ConstantPool) -> Result<Vec<MemberInfo>> {
    let count = r.u16()?;
    let mut members = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let access = r.u16()?;
        let name = pool.utf8(r.u16()?)?.to_string();
        let descriptor = pool.utf8(r.u16()?)?.to_string();
        let attribute_count = r.u16()?;
        for _ in 0..attribute_count {
            r.u16()?; // attribute name
            let length = r.u32()?;
            r.skip(length as usize)?;
        }
        members.push(MemberInfo {
            name,
            descriptor,
            access,
        });
    }
    Ok(members)
}

enum Constant {
    Utf8(String),
    Class(u16),
    Other,
}

struct ConstantPool {
    // 1-based; longs/doubles occupy two slots, the second is `Other`
    entries: Vec<Constant>,
}

impl ConstantPool {
    fn parse(r: &mut Reader<'_>) -> Result<Self> {
        let count = r.u16()?;
        let mut entries = Vec::with_capacity(count as usize);
        entries.push(Constant::Other); // index 0 is unused

        let mut index = 1;
        while index < count {
            let tag = r.u8()?;
            let entry = match tag {
                1 => {
                    let length = r.u16()? as usize;
                    let raw = r.bytes(length)?;
                    // Modified UTF-8 differences only affect code points that
                    // never appear in class or member names.
                    Constant::Utf8(String::from_utf8_lossy(raw).into_owned())
                }
                7 => Constant::Class(r.u16()?),
                3 | 4 => {
                    r.skip(4)?;
                    Constant::Other
                }
                5 | 6 => {
                    r.skip(8)?;
                    entries.push(Constant::Other);
                    index += 1;
                    Constant::Other
                }
                8 | 16 | 19 | 20 => {
                    r.skip(2)?;
                    Constant::Other
                }
                15 => {
                    r.skip(3)?;
                    Constant::Other
                }
                9 | 10 | 11 | 12 | 17 | 18 => {
                    r.skip(4)?;
                    Constant::Other
                }
                _ => bail!("unknown constant pool tag {}", tag),
            };
            entries.push(entry);
            index += 1;
        }

        Ok(Self { entries })
    }

    fn utf8(&self, index: u16) -> Result<&str> {
        match self.entries.get(index as usize) {
            Some(Constant::Utf8(s)) => Ok(s),
            _ => bail!("constant {} is not Utf8", index),
        }
    }

    fn class_name(&self, index: u16) -> Result<&str> {
        match self.entries.get(index as usize) {
            Some(Constant::Class(name_index)) => self.utf8(*name_index),
            _ => bail!("constant {} is not a Class", index),
        }
    }
}

struct Reader<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    fn bytes(&mut self, length: usize) -> Result<&'a [u8]> {
        let end = self.position.checked_add(length).filter(|&e| e <= self.bytes.len());
        match end {
            Some(end) => {
                let slice = &self.bytes[self.position..end];
                self.position = end;
                Ok(slice)
            }
            None => bail!("truncated classfile at offset {}", self.position),
        }
    }

    fn skip(&mut self, length: usize) -> Result<()> {
        self.bytes(length).map(|_| ())
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.bytes(1)?[0])
    }

    fn u16(&mut self) -> Result<u16> {
        let b = self.bytes(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> Result<u32> {
        let b = self.bytes(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }
}
