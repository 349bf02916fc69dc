//! JVM type descriptor model.
//!
//! Descriptors move between namespaces during composition and constructor
//! synthesis, so they are kept structured rather than as opaque strings.
//! The grammar is the standard classfile one: `I`, `Lnet/example/Foo;`,
//! `[[J`, `(IJ)Ljava/lang/String;`.

use std::fmt;

use crate::error::{MappingError, Result};

/// JVM primitive types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseType {
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Boolean,
}

impl BaseType {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'B' => Some(BaseType::Byte),
            'C' => Some(BaseType::Char),
            'D' => Some(BaseType::Double),
            'F' => Some(BaseType::Float),
            'I' => Some(BaseType::Int),
            'J' => Some(BaseType::Long),
            'S' => Some(BaseType::Short),
            'Z' => Some(BaseType::Boolean),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            BaseType::Byte => 'B',
            BaseType::Char => 'C',
            BaseType::Double => 'D',
            BaseType::Float => 'F',
            BaseType::Int => 'I',
            BaseType::Long => 'J',
            BaseType::Short => 'S',
            BaseType::Boolean => 'Z',
        }
    }

    /// Longs and doubles take up two local variable slots.
    pub fn is_wide(self) -> bool {
        matches!(self, BaseType::Long | BaseType::Double)
    }
}

/// A field type: primitive, object, or array
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    Base(BaseType),
    /// Internal-form class name, e.g. `java/lang/String` or `a$b`
    Object(String),
    Array {
        dimensions: usize,
        element: Box<FieldType>,
    },
}

impl FieldType {
    pub fn parse(descriptor: &str) -> Result<Self> {
        let mut chars = descriptor.chars().peekable();
        let ty = parse_field_type(&mut chars, descriptor)?;
        if chars.next().is_some() {
            return Err(malformed(descriptor));
        }
        Ok(ty)
    }

    /// One local variable slot, or two for long/double
    pub fn slot_width(&self) -> usize {
        match self {
            FieldType::Base(base) if base.is_wide() => 2,
            _ => 1,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Base(base) => write!(f, "{}", base.as_char()),
            FieldType::Object(name) => write!(f, "L{};", name),
            FieldType::Array {
                dimensions,
                element,
            } => {
                for _ in 0..*dimensions {
                    write!(f, "[")?;
                }
                write!(f, "{}", element)
            }
        }
    }
}

/// A method descriptor: parameter types and return type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodDescriptor {
    pub parameters: Vec<FieldType>,
    /// `None` is `void`
    pub return_type: Option<FieldType>,
}

impl MethodDescriptor {
    pub fn parse(descriptor: &str) -> Result<Self> {
        let mut chars = descriptor.chars().peekable();
        if chars.next() != Some('(') {
            return Err(malformed(descriptor));
        }

        let mut parameters = Vec::new();
        loop {
            match chars.peek() {
                Some(')') => {
                    chars.next();
                    break;
                }
                Some(_) => parameters.push(parse_field_type(&mut chars, descriptor)?),
                None => return Err(malformed(descriptor)),
            }
        }

        let return_type = match chars.peek() {
            Some('V') => {
                chars.next();
                None
            }
            Some(_) => Some(parse_field_type(&mut chars, descriptor)?),
            None => return Err(malformed(descriptor)),
        };

        if chars.next().is_some() {
            return Err(malformed(descriptor));
        }

        Ok(MethodDescriptor {
            parameters,
            return_type,
        })
    }
}

impl fmt::Display for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for param in &self.parameters {
            write!(f, "{}", param)?;
        }
        write!(f, ")")?;
        match &self.return_type {
            Some(ty) => write!(f, "{}", ty),
            None => write!(f, "V"),
        }
    }
}

fn malformed(descriptor: &str) -> MappingError {
    MappingError::MalformedTypeDescriptor {
        descriptor: descriptor.to_string(),
    }
}

fn parse_field_type(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    descriptor: &str,
) -> Result<FieldType> {
    let mut dimensions = 0;
    while chars.peek() == Some(&'[') {
        chars.next();
        dimensions += 1;
    }

    let c = chars.next().ok_or_else(|| malformed(descriptor))?;
    let element = if let Some(base) = BaseType::from_char(c) {
        FieldType::Base(base)
    } else if c == 'L' {
        let mut name = String::new();
        loop {
            match chars.next() {
                Some(';') => break,
                Some(ch) => name.push(ch),
                None => return Err(malformed(descriptor)),
            }
        }
        if name.is_empty() {
            return Err(malformed(descriptor));
        }
        FieldType::Object(name)
    } else {
        return Err(malformed(descriptor));
    };

    if dimensions == 0 {
        Ok(element)
    } else {
        Ok(FieldType::Array {
            dimensions,
            element: Box::new(element),
        })
    }
}
