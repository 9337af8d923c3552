//! Raw declarations as supplied by the configuration extraction layer.
//! References are kept exactly as they appear in the document, they are
//! canonicalized on use.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::{SomeipHeaderId, SomeipMethodId, SomeipServiceId};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RawElement {
    pub short_name: String,
    pub type_ref: String,
}

/// Category-specific payload of a declared data type.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "category")]
pub enum RawDescriptor {
    #[serde(rename = "TYPE_REFERENCE")]
    Primitive {
        type_ref: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        string_size: Option<u32>,
    },
    /// `array_size` absent or 0 means a variable-length sequence
    #[serde(rename = "ARRAY", alias = "VECTOR")]
    Array {
        #[serde(default)]
        array_size: u32,
        element_ref: String,
    },
    #[serde(rename = "STRUCTURE")]
    Record { elements: Vec<RawElement> },
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RawDataType {
    pub short_name: String,
    #[serde(flatten)]
    pub descriptor: RawDescriptor,
}

impl RawDataType {
    pub fn primitive(short_name: &str, type_ref: &str) -> Self {
        Self {
            short_name: short_name.to_owned(),
            descriptor: RawDescriptor::Primitive {
                type_ref: type_ref.to_owned(),
                string_size: None,
            },
        }
    }

    pub fn string(short_name: &str, string_size: Option<u32>) -> Self {
        Self {
            short_name: short_name.to_owned(),
            descriptor: RawDescriptor::Primitive {
                type_ref: "string".to_owned(),
                string_size,
            },
        }
    }

    pub fn array(short_name: &str, element_ref: &str, array_size: u32) -> Self {
        Self {
            short_name: short_name.to_owned(),
            descriptor: RawDescriptor::Array {
                array_size,
                element_ref: element_ref.to_owned(),
            },
        }
    }

    pub fn record(short_name: &str, elements: &[(&str, &str)]) -> Self {
        Self {
            short_name: short_name.to_owned(),
            descriptor: RawDescriptor::Record {
                elements: elements
                    .iter()
                    .map(|(name, type_ref)| RawElement {
                        short_name: (*name).to_owned(),
                        type_ref: (*type_ref).to_owned(),
                    })
                    .collect(),
            },
        }
    }
}

// ------- Adaptive Platform

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RawEventDeployment {
    pub event_id: SomeipMethodId,
    pub short_name: String,
    pub event_ref: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RawFieldDeployment {
    /// notifier event id
    pub event_id: SomeipMethodId,
    pub short_name: String,
    pub field_ref: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RawService {
    pub short_name: String,
    pub service_id: SomeipServiceId,
    pub interface_ref: String,
    #[serde(default)]
    pub events: Vec<RawEventDeployment>,
    #[serde(default)]
    pub field_notifiers: Vec<RawFieldDeployment>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RawInterfaceMember {
    pub short_name: String,
    pub type_ref: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RawServiceInterface {
    pub short_name: String,
    #[serde(default)]
    pub events: Vec<RawInterfaceMember>,
    #[serde(default)]
    pub fields: Vec<RawInterfaceMember>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
pub struct RawAdaptive {
    pub services: Vec<RawService>,
    pub interfaces: Vec<RawServiceInterface>,
}

// ------- Classic Platform

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RawSocketConnection {
    pub header_id: SomeipHeaderId,
    pub pdu_triggering_ref: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RawSignalMapping {
    pub call_signal_ref: String,
    pub target_operation_ref: String,
}

/// The CP tables, one per configuration sub-parser. Keys of the string maps
/// are short names, values raw references.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
pub struct RawClassic {
    /// topology: provided service instances, service id -> instance name
    pub service_instances: HashMap<SomeipServiceId, String>,
    /// topology: socket connection ipdu identifiers
    pub socket_connections: Vec<RawSocketConnection>,
    /// topology: pdu triggering -> i-pdu ref
    pub pdu_triggerings: HashMap<String, String>,
    /// communication: i-signal-i-pdu -> i-signal ref
    pub signal_pdus: HashMap<String, String>,
    /// communication: i-signal -> system signal ref
    pub signals: HashMap<String, String>,
    /// system: call signal ref -> target operation ref, in document order
    pub signal_mappings: Vec<RawSignalMapping>,
    /// software types: interface -> operation -> argument type ref
    pub interfaces: HashMap<String, HashMap<String, String>>,
}

/// One configuration document as handed over by the extraction layer.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ConfigDocument {
    pub name: String,
    pub data_types: Vec<RawDataType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adaptive: Option<RawAdaptive>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classic: Option<RawClassic>,
}
