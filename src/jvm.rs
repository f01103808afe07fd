/// JVM surface types: class names, method identities, descriptors, and
/// concrete values.
///
/// Class-file decoding is an external collaborator; this module only models
/// enough of the JVM's naming and typing to key the bytecode cache and to
/// drive the engines. Long/double/byte/short parameters are collapsed onto
/// the int/float pair the engines actually reason about.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::AnalysisError;

// ---------------------------------------------------------------------------
// Class names
// ---------------------------------------------------------------------------

/// A binary class name, stored slash-separated (`jpamb/cases/Simple`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassName(String);

impl ClassName {
    pub fn new(slashed: impl Into<String>) -> Self {
        ClassName(slashed.into())
    }

    pub fn from_dotted(dotted: &str) -> Self {
        ClassName(dotted.replace('.', "/"))
    }

    pub fn slashed(&self) -> &str {
        &self.0
    }

    pub fn dotted(&self) -> String {
        self.0.replace('/', ".")
    }
}

impl fmt::Display for ClassName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dotted())
    }
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// The value types the engines distinguish.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Type {
    Int,
    Boolean,
    Char,
    Float,
    Ref,
    Array(Box<Type>),
}

impl Type {
    /// The descriptor characters that widen to `Int` on the operand stack.
    pub fn is_int_like(&self) -> bool {
        matches!(self, Type::Int | Type::Boolean | Type::Char)
    }
}

// ---------------------------------------------------------------------------
// Method descriptors
// ---------------------------------------------------------------------------

/// A parsed `(params)ret` descriptor. Equality and hashing go through the
/// raw text, which fully determines the parse.
#[derive(Debug, Clone)]
pub struct MethodDescriptor {
    raw: String,
    pub params: Vec<Type>,
    pub ret: Option<Type>,
}

impl MethodDescriptor {
    /// Parse `(II[IZ)V`-style descriptors. `J`/`B`/`S` collapse to int,
    /// `D` to float, object references to `Ref`.
    pub fn parse(raw: &str) -> Result<Self, AnalysisError> {
        let bad = || AnalysisError::BadDescriptor(raw.to_string());
        let inner = raw.strip_prefix('(').ok_or_else(bad)?;
        let close = inner.find(')').ok_or_else(bad)?;
        let (psig, rsig) = (&inner[..close], &inner[close + 1..]);

        let mut params = Vec::new();
        let mut chars = psig.chars().peekable();
        while chars.peek().is_some() {
            params.push(Self::parse_one(&mut chars).ok_or_else(bad)?);
        }

        let ret = match rsig {
            "V" => None,
            sig => {
                let mut chars = sig.chars().peekable();
                let ty = Self::parse_one(&mut chars).ok_or_else(bad)?;
                if chars.next().is_some() {
                    return Err(bad());
                }
                Some(ty)
            }
        };

        Ok(MethodDescriptor { raw: raw.to_string(), params, ret })
    }

    /// The empty `()V` descriptor, used when a target omits one.
    pub fn void() -> Self {
        MethodDescriptor { raw: "()V".to_string(), params: Vec::new(), ret: None }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    fn parse_one(chars: &mut std::iter::Peekable<std::str::Chars>) -> Option<Type> {
        match chars.next()? {
            'I' | 'J' | 'B' | 'S' => Some(Type::Int),
            'Z' => Some(Type::Boolean),
            'C' => Some(Type::Char),
            'F' | 'D' => Some(Type::Float),
            'L' => {
                while chars.next()? != ';' {}
                Some(Type::Ref)
            }
            '[' => Some(Type::Array(Box::new(Self::parse_one(chars)?))),
            _ => None,
        }
    }
}

impl PartialEq for MethodDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for MethodDescriptor {}

impl std::hash::Hash for MethodDescriptor {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl fmt::Display for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for MethodDescriptor {
    fn serialize<S: serde::Serializer>(&self, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for MethodDescriptor {
    fn deserialize<D: serde::Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(de)?;
        MethodDescriptor::parse(&raw).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Method identity
// ---------------------------------------------------------------------------

/// Owner class + name + descriptor. The key into the bytecode cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodId {
    pub class: ClassName,
    pub name: String,
    pub descriptor: MethodDescriptor,
}

impl MethodId {
    pub fn new(class: ClassName, name: impl Into<String>, descriptor: MethodDescriptor) -> Self {
        MethodId { class, name: name.into(), descriptor }
    }

    /// Parse a qualname target, `pkg.Class.method` or
    /// `pkg.Class.method:(I)I`. A missing descriptor yields `()V`.
    pub fn parse(target: &str) -> Result<Self, AnalysisError> {
        let bad = || AnalysisError::BadTarget(target.to_string());
        let (qual, desc) = match target.split_once(':') {
            Some((q, d)) => (q, Some(d)),
            None => (target, None),
        };
        let (class_part, name) = qual.rsplit_once('.').ok_or_else(bad)?;
        if class_part.is_empty() || name.is_empty() {
            return Err(bad());
        }
        let descriptor = match desc {
            Some(d) => MethodDescriptor::parse(d)?,
            None => MethodDescriptor::void(),
        };
        Ok(MethodId::new(ClassName::from_dotted(class_part), name, descriptor))
    }
}

impl fmt::Display for MethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}:{}", self.class.dotted(), self.name, self.descriptor)
    }
}

// ---------------------------------------------------------------------------
// Concrete values
// ---------------------------------------------------------------------------

/// A concrete runtime value. References are heap indices; `Ref(0)` is null.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Value {
    Int(i32),
    Bool(bool),
    Char(char),
    Float(f32),
    Ref(u32),
}

impl Value {
    pub const NULL: Value = Value::Ref(0);

    /// Booleans and chars live as ints on the operand stack.
    pub fn widen(self) -> Value {
        match self {
            Value::Bool(b) => Value::Int(b as i32),
            Value::Char(c) => Value::Int(c as i32),
            other => other,
        }
    }

    pub fn as_int(self) -> Option<i32> {
        match self.widen() {
            Value::Int(n) => Some(n),
            _ => None,
        }
    }

    pub fn type_name(self) -> &'static str {
        match self {
            Value::Int(_)   => "int",
            Value::Bool(_)  => "boolean",
            Value::Char(_)  => "char",
            Value::Float(_) => "float",
            Value::Ref(_)   => "reference",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n)   => write!(f, "{n}"),
            Value::Bool(b)  => write!(f, "{b}"),
            Value::Char(c)  => write!(f, "'{c}'"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Ref(0)   => f.write_str("null"),
            Value::Ref(r)   => write!(f, "@{r}"),
        }
    }
}
