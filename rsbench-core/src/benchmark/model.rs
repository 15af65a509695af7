//! Type, Field and Program Model
//!
//! This module defines the ground-truth representation shared by the generator,
//! the emitter and the recovered-model parser.
//!
//! # Type System
//! - **Int / UInt**: 1, 2, 4 or 8 bytes
//! - **Float**: 4 or 8 bytes
//! - **Pointer**: 8 bytes, to a struct or untyped
//! - **EmbeddedStruct**: inline copy of another struct
//!
//! Fields reference structs by id only; the `StructGraph` owns every struct.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeMap;

/// Struct identifier. Generated structs are numbered 1..=N.
pub type StructId = u32;

/// Function identifier. 0 is the entry point.
pub type FunctionId = u32;

/// Id of the no-argument entry function.
pub const ENTRY_FUNCTION: FunctionId = 0;

/// Pointer width of the target in bytes.
pub const POINTER_WIDTH: u8 = 8;

/// Closed type tag, used when drawing a random type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeTag {
    Int,
    UInt,
    Float,
    Pointer,
    EmbeddedStruct,
}

impl TypeTag {
    /// Every tag a struct field may carry.
    pub const ALL: [TypeTag; 5] = [
        TypeTag::Int,
        TypeTag::UInt,
        TypeTag::Float,
        TypeTag::Pointer,
        TypeTag::EmbeddedStruct,
    ];

    /// Tags that never reference another struct.
    pub const PRIMITIVE: [TypeTag; 3] = [TypeTag::Int, TypeTag::UInt, TypeTag::Float];

    /// Tags a function parameter may carry. Structs are only passed by pointer.
    pub const ARGUMENT: [TypeTag; 4] = [
        TypeTag::Int,
        TypeTag::UInt,
        TypeTag::Float,
        TypeTag::Pointer,
    ];

    /// The primitive kind of this tag, `None` for struct references.
    pub fn primitive(self) -> Option<PrimitiveKind> {
        match self {
            TypeTag::Int => Some(PrimitiveKind::Int),
            TypeTag::UInt => Some(PrimitiveKind::UInt),
            TypeTag::Float => Some(PrimitiveKind::Float),
            TypeTag::Pointer | TypeTag::EmbeddedStruct => None,
        }
    }
}

/// Type tags that reference no struct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Int,
    UInt,
    Float,
}

/// Concrete field or argument type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    /// Signed integer, width in bytes
    Int { width: u8 },
    /// Unsigned integer, width in bytes
    UInt { width: u8 },
    /// IEEE float, width in bytes
    Float { width: u8 },
    /// Pointer to a struct, or `void*` when `target` is `None`
    Pointer { target: Option<StructId> },
    /// Inline struct value
    EmbeddedStruct { target: StructId },
}

impl FieldType {
    pub fn tag(&self) -> TypeTag {
        match self {
            FieldType::Int { .. } => TypeTag::Int,
            FieldType::UInt { .. } => TypeTag::UInt,
            FieldType::Float { .. } => TypeTag::Float,
            FieldType::Pointer { .. } => TypeTag::Pointer,
            FieldType::EmbeddedStruct { .. } => TypeTag::EmbeddedStruct,
        }
    }

    /// Width in bytes. Embedded structs have no width of their own.
    pub fn width(&self) -> Option<u8> {
        match self {
            FieldType::Int { width } | FieldType::UInt { width } | FieldType::Float { width } => {
                Some(*width)
            }
            FieldType::Pointer { .. } => Some(POINTER_WIDTH),
            FieldType::EmbeddedStruct { .. } => None,
        }
    }

    /// Struct this type references, if any.
    pub fn target(&self) -> Option<StructId> {
        match self {
            FieldType::Pointer { target } => *target,
            FieldType::EmbeddedStruct { target } => Some(*target),
            FieldType::Int { .. } | FieldType::UInt { .. } | FieldType::Float { .. } => None,
        }
    }

    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            FieldType::Int { .. } | FieldType::UInt { .. } | FieldType::Float { .. }
        )
    }
}

/// Named member of a struct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub ty: FieldType,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Composite type definition. Field order is part of the layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Struct {
    pub id: StructId,
    pub name: String,
    pub fields: Vec<Field>,
}

impl Struct {
    pub fn new(id: StructId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Struct with the generator's naming scheme (`rs_<id>`).
    pub fn generated(id: StructId) -> Self {
        Self::new(id, struct_name(id))
    }

    pub fn push_field(&mut self, field: Field) {
        self.fields.push(field);
    }
}

/// Generator name for a struct id.
pub fn struct_name(id: StructId) -> String {
    format!("rs_{}", id)
}

/// Generator name for a function id. The entry point is emitted as `main`.
pub fn function_name(id: FunctionId) -> String {
    format!("f_{}", id)
}

/// Generator name for the field or argument at `index`.
pub fn member_name(index: usize) -> String {
    format!("_{}", index)
}

/// Set of struct definitions keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructGraph {
    structs: BTreeMap<StructId, Struct>,
}

impl StructGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a struct under its own id.
    pub fn insert(&mut self, structure: Struct) {
        self.structs.insert(structure.id, structure);
    }

    pub fn get(&self, id: StructId) -> Option<&Struct> {
        self.structs.get(&id)
    }

    pub fn get_mut(&mut self, id: StructId) -> Option<&mut Struct> {
        self.structs.get_mut(&id)
    }

    pub fn contains(&self, id: StructId) -> bool {
        self.structs.contains_key(&id)
    }

    /// Structs in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Struct> {
        self.structs.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = StructId> + '_ {
        self.structs.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.structs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.structs.is_empty()
    }

    /// Name of a struct, falling back to the generator scheme for unknown ids.
    pub fn struct_name(&self, id: StructId) -> String {
        self.get(id)
            .map(|s| s.name.clone())
            .unwrap_or_else(|| struct_name(id))
    }

    /// Canonical C++ spelling of a type.
    ///
    /// Equal types always render equal names; the function generator indexes
    /// reachable paths by this string.
    pub fn type_name(&self, ty: &FieldType) -> String {
        match ty {
            FieldType::Int { width } => format!("int{}_t", u32::from(*width) * 8),
            FieldType::UInt { width } => format!("uint{}_t", u32::from(*width) * 8),
            FieldType::Float { width } => {
                if *width == 4 {
                    "float".to_string()
                } else {
                    "double".to_string()
                }
            }
            FieldType::Pointer { target: Some(id) } => format!("{}*", self.struct_name(*id)),
            FieldType::Pointer { target: None } => "void*".to_string(),
            FieldType::EmbeddedStruct { target } => self.struct_name(*target),
        }
    }
}

impl FromIterator<Struct> for StructGraph {
    fn from_iter<I: IntoIterator<Item = Struct>>(iter: I) -> Self {
        let mut graph = StructGraph::new();
        for structure in iter {
            graph.insert(structure);
        }
        graph
    }
}

/// Function parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argument {
    pub name: String,
    pub ty: FieldType,
}

impl Argument {
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Actual argument of a synthesized call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operand {
    /// Access path rooted at one of the caller's arguments
    Path(String),
    /// Type-appropriate zero value
    Default(FieldType),
}

/// One statement of a generated function body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Statement {
    /// `path = use(path);` on a primitive leaf
    Use { path: String },
    /// Call to another generated function
    Call {
        callee: FunctionId,
        args: Vec<Operand>,
    },
}

/// Generated function: signature plus synthesized body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Function {
    pub id: FunctionId,
    /// Most functions take at most 8 arguments
    pub args: SmallVec<[Argument; 8]>,
    pub body: Vec<Statement>,
}

impl Function {
    pub fn new(id: FunctionId) -> Self {
        Self {
            id,
            args: SmallVec::new(),
            body: Vec::new(),
        }
    }

    pub fn is_entry(&self) -> bool {
        self.id == ENTRY_FUNCTION
    }
}

/// Complete generated program. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub structs: StructGraph,
    /// Functions keyed by id; id 0 is the entry point
    pub functions: BTreeMap<FunctionId, Function>,
}

impl Program {
    /// The entry function (id 0).
    pub fn entry(&self) -> Option<&Function> {
        self.functions.get(&ENTRY_FUNCTION)
    }

    /// Non-entry functions in ascending id order.
    pub fn callable_functions(&self) -> impl Iterator<Item = &Function> {
        self.functions.values().filter(|f| !f.is_entry())
    }
}
