use thiserror::Error;

use crate::types::SomeipServiceId;

/// 构建期错误：配置缺失、引用无法解析等，构建直接失败
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuildError {
    #[error("missing required field `{field}` in {owner}")]
    MissingField { owner: String, field: &'static str },
    #[error("unknown primitive reference: {0}")]
    UnknownPrimitiveReference(String),
    #[error("unresolved reference `{reference}` in {owner}")]
    UnresolvedReference { owner: String, reference: String },
    #[error("duplicate data type: {0}")]
    DuplicateType(String),
    #[error("duplicate field `{field}` in record {record}")]
    DuplicateField { record: String, field: String },
    #[error("record {0} contains itself without a sequence in between")]
    RecursiveRecord(String),
    #[error("duplicate service id {0}")]
    DuplicateService(SomeipServiceId),
    #[error("duplicate service interface: {0}")]
    DuplicateInterface(String),
    #[error("service {0} declares no events or field notifiers")]
    EmptyService(String),
    #[error("service interface {0} declares no events or fields")]
    EmptyInterface(String),
    #[error("interface `{interface}` of service {service} not found")]
    InterfaceNotFound { service: String, interface: String },
    #[error("`{reference}` of service {service} does not belong to interface `{interface}`")]
    ForeignReference {
        service: String,
        interface: String,
        reference: String,
    },
    #[error("`{reference}` of service {service} not declared by interface `{interface}`")]
    DanglingReference {
        service: String,
        interface: String,
        reference: String,
    },
    #[error("`{key}` appears twice in {table}")]
    DuplicateKey { table: String, key: String },
    #[error("event id {id} used twice in service {service}")]
    DuplicateIdentifier { service: String, id: u32 },
    #[error("configuration document has neither adaptive nor classic sections")]
    NoAddressingSections,
}

/// Step of the Classic Platform resolution chain that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpHop {
    ServiceInstance,
    HeaderId,
    PduTriggering,
    SignalPdu,
    Signal,
    SignalMapping,
    Interface,
    Operation,
}

impl std::fmt::Display for CpHop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CpHop::ServiceInstance => "hop 1 (topology provided service instance)",
            CpHop::HeaderId => "hop 2 (topology socket connection header id)",
            CpHop::PduTriggering => "hop 3 (topology pdu triggering)",
            CpHop::SignalPdu => "hop 3 (communication i-signal pdu)",
            CpHop::Signal => "hop 3 (communication i-signal)",
            CpHop::SignalMapping => "hop 4 (system signal mapping)",
            CpHop::Interface => "hop 5 (software interface)",
            CpHop::Operation => "hop 5 (interface operation)",
        };
        f.write_str(s)
    }
}

/// 查找期错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    #[error("service {0} not found")]
    ServiceNotFound(SomeipServiceId),
    #[error("unknown event or field id {id} in service {service}")]
    UnknownEventOrField { service: SomeipServiceId, id: u32 },
    #[error("{hop}: no entry for `{key}`")]
    Hop { hop: CpHop, key: String },
    #[error("type `{0}` not found")]
    TypeNotFound(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeErrorKind {
    #[error("expect data len {needed} got len {got}")]
    InsufficientData { needed: usize, got: usize },
    #[error("missing or invalid byte order mark")]
    MissingOrInvalidBom,
    #[error("string terminator not found")]
    TerminatorNotFound,
    #[error("invalid {encoding} text: {detail}")]
    InvalidText {
        encoding: &'static str,
        detail: String,
    },
    #[error("unknown type node {0}")]
    UnknownType(usize),
    #[error("record nesting deeper than {0}")]
    RecursionLimit(usize),
}

/// 解码期错误，带上出错字段的路径和字节偏移
#[derive(Error, Debug, Clone, PartialEq)]
#[error("failed to decode `{path}` at byte {offset}: {kind}")]
pub struct DecodeError {
    pub path: String,
    pub offset: usize,
    pub kind: DecodeErrorKind,
}

#[derive(Error, Debug)]
pub enum MyError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("invalid argument: {0}")]
    ArgInputError(String),
}
