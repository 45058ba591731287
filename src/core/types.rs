//! Parsed type model — what the type host hands back for a batch of
//! declarations.
//!
//! A [`TypeNode`] is an owned tree: nested types (members, pointer targets,
//! array elements, parameters, return values) are held by value, so a parse
//! result can never contain a cycle.  Named type references point at other
//! types by id and name only.
//!
//! The wire form is JSON produced by the external host.  Decoding goes through
//! [`WireType`], a flat record with every class-specific field optional, and is
//! validated in [`TryFrom<WireType>`] so a `pointer` without a `target` is a
//! decode error rather than a half-built node.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ───────────────────────────────────────── type class ────────

/// The shape of a type, as tagged by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeClass {
    Void,
    Bool,
    Integer,
    Float,
    Structure,
    Enumeration,
    Pointer,
    Array,
    Function,
    VarArgs,
    Value,
    NamedTypeReference,
    WideChar,
    Unknown,
}

impl TypeClass {
    /// Map a wire class tag to a class.  Anything unrecognised is `Unknown`.
    pub fn from_wire(tag: &str) -> Self {
        match tag {
            "void" => Self::Void,
            "bool" => Self::Bool,
            "integer" => Self::Integer,
            "float" => Self::Float,
            "structure" => Self::Structure,
            "enumeration" => Self::Enumeration,
            "pointer" => Self::Pointer,
            "array" => Self::Array,
            "function" => Self::Function,
            "varargs" => Self::VarArgs,
            "value" => Self::Value,
            "named_type_reference" => Self::NamedTypeReference,
            "wide_char" => Self::WideChar,
            _ => Self::Unknown,
        }
    }
}

/// Whether a structure is a struct, a class or a union.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StructureVariant {
    #[default]
    Struct,
    Class,
    Union,
}

impl fmt::Display for StructureVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Struct => "struct",
            Self::Class => "class",
            Self::Union => "union",
        })
    }
}

/// What kind of declaration a named type reference refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamedTypeClass {
    #[default]
    Unknown,
    Typedef,
    Class,
    Struct,
    Union,
    Enum,
}

impl fmt::Display for NamedTypeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unknown => "unknown",
            Self::Typedef => "typedef",
            Self::Class => "class",
            Self::Struct => "struct",
            Self::Union => "union",
            Self::Enum => "enum",
        })
    }
}

// ───────────────────────────────────────── type node ─────────

/// A named, offset-positioned entry: structure field, enumeration member or
/// function parameter.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Member {
    pub name: String,
    #[serde(default)]
    pub offset: u64,
    #[serde(rename = "type")]
    pub ty: TypeNode,
}

#[cfg(test)]
impl Member {
    pub fn new(name: impl Into<String>, offset: u64, ty: TypeNode) -> Self {
        Self {
            name: name.into(),
            offset,
            ty,
        }
    }
}

/// Function signature details.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionType {
    pub stack_adjustment: i64,
    pub calling_convention: Option<String>,
    pub has_variable_arguments: bool,
    pub can_return: bool,
    pub return_value: Box<TypeNode>,
    pub parameters: Vec<Member>,
}

/// Class-specific payload of a [`TypeNode`].
#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    Void,
    Bool,
    Integer {
        signed: bool,
    },
    Float,
    Structure {
        variant: StructureVariant,
        packed: bool,
        members: Vec<Member>,
    },
    Enumeration {
        members: Vec<Member>,
    },
    Pointer {
        target: Box<TypeNode>,
    },
    Array {
        count: u64,
        element_type: Box<TypeNode>,
    },
    Function(FunctionType),
    VarArgs,
    Value,
    NamedTypeReference {
        named_type_class: NamedTypeClass,
        type_id: String,
        name: String,
    },
    WideChar,
    /// A class this build does not know about.  Carried so it can still be
    /// shown rather than rejected.
    Unknown,
}

/// One parsed type description.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "WireType")]
pub struct TypeNode {
    pub width: u64,
    pub alignment: u64,
    pub kind: TypeKind,
}

impl TypeNode {
    pub fn new(width: u64, alignment: u64, kind: TypeKind) -> Self {
        Self {
            width,
            alignment,
            kind,
        }
    }

    pub fn class(&self) -> TypeClass {
        match self.kind {
            TypeKind::Void => TypeClass::Void,
            TypeKind::Bool => TypeClass::Bool,
            TypeKind::Integer { .. } => TypeClass::Integer,
            TypeKind::Float => TypeClass::Float,
            TypeKind::Structure { .. } => TypeClass::Structure,
            TypeKind::Enumeration { .. } => TypeClass::Enumeration,
            TypeKind::Pointer { .. } => TypeClass::Pointer,
            TypeKind::Array { .. } => TypeClass::Array,
            TypeKind::Function(_) => TypeClass::Function,
            TypeKind::VarArgs => TypeClass::VarArgs,
            TypeKind::Value => TypeClass::Value,
            TypeKind::NamedTypeReference { .. } => TypeClass::NamedTypeReference,
            TypeKind::WideChar => TypeClass::WideChar,
            TypeKind::Unknown => TypeClass::Unknown,
        }
    }
}

// ───────────────────────────────────────── parse result ──────

/// A declared name and its type.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Declaration {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeNode,
}

/// Everything one parse produced.  Each list keeps the host's order.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ParseResult {
    #[serde(default)]
    pub types: Vec<Declaration>,
    #[serde(default)]
    pub variables: Vec<Declaration>,
    #[serde(default)]
    pub functions: Vec<Declaration>,
}

impl ParseResult {
    pub fn is_empty(&self) -> bool {
        self.types.is_empty() && self.variables.is_empty() && self.functions.is_empty()
    }
}

// ───────────────────────────────────────── wire decoding ─────

/// Raised when a wire type lacks a field its class requires.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeDecodeError {
    #[error("{class} type is missing `{field}`")]
    MissingField {
        class: &'static str,
        field: &'static str,
    },
}

fn missing(class: &'static str, field: &'static str) -> TypeDecodeError {
    TypeDecodeError::MissingField { class, field }
}

/// Flat wire record.  Class-specific fields are optional here and checked in
/// the conversion.
#[derive(Debug, Deserialize)]
struct WireType {
    class: String,
    #[serde(default)]
    width: u64,
    #[serde(default)]
    alignment: u64,
    signed: Option<bool>,
    #[serde(rename = "type")]
    variant: Option<StructureVariant>,
    packed: Option<bool>,
    members: Option<Vec<Member>>,
    target: Option<Box<TypeNode>>,
    count: Option<u64>,
    element_type: Option<Box<TypeNode>>,
    stack_adjustment: Option<i64>,
    calling_convention: Option<String>,
    has_variable_arguments: Option<bool>,
    can_return: Option<bool>,
    return_value: Option<Box<TypeNode>>,
    parameters: Option<Vec<Member>>,
    named_type_class: Option<NamedTypeClass>,
    type_id: Option<String>,
    name: Option<String>,
}

impl TryFrom<WireType> for TypeNode {
    type Error = TypeDecodeError;

    fn try_from(w: WireType) -> Result<Self, Self::Error> {
        let kind = match TypeClass::from_wire(&w.class) {
            TypeClass::Void => TypeKind::Void,
            TypeClass::Bool => TypeKind::Bool,
            TypeClass::Integer => TypeKind::Integer {
                signed: w.signed.ok_or_else(|| missing("integer", "signed"))?,
            },
            TypeClass::Float => TypeKind::Float,
            TypeClass::Structure => TypeKind::Structure {
                variant: w.variant.unwrap_or_default(),
                packed: w.packed.unwrap_or(false),
                members: w.members.unwrap_or_default(),
            },
            TypeClass::Enumeration => TypeKind::Enumeration {
                members: w.members.unwrap_or_default(),
            },
            TypeClass::Pointer => TypeKind::Pointer {
                target: w.target.ok_or_else(|| missing("pointer", "target"))?,
            },
            TypeClass::Array => TypeKind::Array {
                count: w.count.unwrap_or(0),
                element_type: w
                    .element_type
                    .ok_or_else(|| missing("array", "element_type"))?,
            },
            TypeClass::Function => TypeKind::Function(FunctionType {
                stack_adjustment: w.stack_adjustment.unwrap_or(0),
                calling_convention: w.calling_convention,
                has_variable_arguments: w.has_variable_arguments.unwrap_or(false),
                can_return: w.can_return.unwrap_or(true),
                return_value: w
                    .return_value
                    .ok_or_else(|| missing("function", "return_value"))?,
                parameters: w.parameters.unwrap_or_default(),
            }),
            TypeClass::VarArgs => TypeKind::VarArgs,
            TypeClass::Value => TypeKind::Value,
            TypeClass::NamedTypeReference => TypeKind::NamedTypeReference {
                named_type_class: w.named_type_class.unwrap_or_default(),
                type_id: w.type_id.unwrap_or_default(),
                name: w.name.ok_or_else(|| missing("named_type_reference", "name"))?,
            },
            TypeClass::WideChar => TypeKind::WideChar,
            TypeClass::Unknown => TypeKind::Unknown,
        };
        Ok(TypeNode::new(w.width, w.alignment, kind))
    }
}
