use std::collections::HashMap;

use serde::Serialize;

use super::reference::canonical_key;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NumberType {
    Boolean,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Sint8,
    Sint16,
    Sint32,
    Sint64,
    Float32,
    Float64,
}

impl NumberType {
    /// wire width in bytes
    pub fn size(&self) -> usize {
        match self {
            NumberType::Boolean | NumberType::Uint8 | NumberType::Sint8 => 1,
            NumberType::Uint16 | NumberType::Sint16 => 2,
            NumberType::Uint32 | NumberType::Sint32 | NumberType::Float32 => 4,
            NumberType::Uint64 | NumberType::Sint64 | NumberType::Float64 => 8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StringLength {
    /// total byte width, BOM + text + terminator + padding
    Fixed(u32),
    /// framed by a 4-byte big-endian length field
    Dynamic,
}

/// Handle of a node in [`Module::nodes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TypeId(pub(crate) usize);

/// Handle of a record in [`Module::records`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RecordId(pub(crate) usize);

impl TypeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl RecordId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// 根据Someip规范，payload的数据类型有：
/// 1. 数值类型：bool,u8,u16,u32,u64,i8,i16,i32,i64,f32,f64
/// 2. 字符串类型：定长或者动态长度，UTF-8,UTF-16LE,UTF-16BE
/// 3. 数组类型：定长数组或者带长度字段的动态数组，可嵌套
/// 4. 结构体类型：通过名字引用，可嵌套
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MatrixType {
    Number { size: NumberType },
    String { length: StringLength },
    Array { element: TypeId, count: u32 },
    Sequence { element: TypeId },
    Struct { record: RecordId },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordField {
    pub name: String,
    pub data_type: TypeId,
}

/// Field order is wire order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordDef {
    pub name: String,
    pub fields: Vec<RecordField>,
}

/// Closed type graph built from one configuration document. Immutable once
/// built, safe to share between decoding threads.
#[derive(Debug, Clone, Serialize)]
pub struct Module {
    pub name: String,
    pub(crate) nodes: Vec<MatrixType>,
    pub(crate) node_names: Vec<String>,
    pub(crate) types_by_name: HashMap<String, TypeId>,
    pub(crate) records: Vec<RecordDef>,
}

impl Module {
    /// Resolve a raw reference (path or bare name) to its type.
    pub fn lookup(&self, reference: &str) -> Option<TypeId> {
        self.types_by_name.get(&canonical_key(reference)).copied()
    }

    pub fn node(&self, id: TypeId) -> Option<&MatrixType> {
        self.nodes.get(id.0)
    }

    /// declared short name of the data type behind `id`
    pub fn type_name(&self, id: TypeId) -> Option<&str> {
        self.node_names.get(id.0).map(String::as_str)
    }

    pub fn record(&self, id: RecordId) -> Option<&RecordDef> {
        self.records.get(id.0)
    }

    pub fn record_by_name(&self, name: &str) -> Option<&RecordDef> {
        match self.lookup(name).and_then(|id| self.node(id)) {
            Some(MatrixType::Struct { record }) => self.record(*record),
            _ => None,
        }
    }

    /// records in declaration order
    pub fn records(&self) -> &[RecordDef] {
        &self.records
    }

    pub fn type_count(&self) -> usize {
        self.nodes.len()
    }
}
