//! 从配置文档构建类型图
pub mod builder;
pub mod json;
pub mod raw;
pub mod reference;
pub mod types;

pub use builder::build_module;
pub use raw::ConfigDocument;
pub use types::{MatrixType, Module, NumberType, RecordDef, RecordField, StringLength, TypeId};
