use serde::{Deserialize, Serialize};

pub type SomeipServiceId = u16;
pub type SomeipMethodId = u16;
/// Classic Platform socket-connection header id: service id in the high
/// half, method/event id in the low half.
pub type SomeipHeaderId = u32;

/// 把两个16位的ID拼接成CP矩阵里使用的32位Header ID
pub fn header_id(service_id: SomeipServiceId, method_id: SomeipMethodId) -> SomeipHeaderId {
    ((service_id as u32) << 16) | method_id as u32
}

/// Byte order of multi-byte numbers inside a payload. One value per decode
/// session, there is no per-field override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
pub enum Endianness {
    #[default]
    BigEndian,
    LittleEndian,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
pub enum LengthFieldSize {
    B8,
    B16,
    #[default]
    B32,
}

impl LengthFieldSize {
    pub fn bytes(&self) -> usize {
        match self {
            LengthFieldSize::B8 => 1,
            LengthFieldSize::B16 => 2,
            LengthFieldSize::B32 => 4,
        }
    }
}

impl TryFrom<u8> for LengthFieldSize {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            1 => LengthFieldSize::B8,
            2 => LengthFieldSize::B16,
            4 => LengthFieldSize::B32,
            _ => return Err(format!("unsupported length field size: {} bytes", value)),
        })
    }
}

/// What a sequence length field counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
pub enum LengthFieldUnit {
    #[default]
    Bytes,
    Elements,
}

fn default_max_depth() -> usize {
    64
}

/// 解码会话的序列化参数，整个会话内不变
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct SerializationParameter {
    #[serde(default)]
    pub endianness: Endianness,
    /// width of the length field framing a sequence
    #[serde(default)]
    pub length_field_size: LengthFieldSize,
    #[serde(default)]
    pub length_field_unit: LengthFieldUnit,
    /// padding after a variable-width element that is followed by another
    /// element, 0 or 1 disables it
    #[serde(default)]
    pub alignment: usize,
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for SerializationParameter {
    fn default() -> Self {
        Self {
            endianness: Endianness::default(),
            length_field_size: LengthFieldSize::default(),
            length_field_unit: LengthFieldUnit::default(),
            alignment: 0,
            max_depth: default_max_depth(),
        }
    }
}

impl SerializationParameter {
    pub fn with_endianness(mut self, endianness: Endianness) -> Self {
        self.endianness = endianness;
        self
    }

    pub fn with_length_field_size(mut self, size: LengthFieldSize) -> Self {
        self.length_field_size = size;
        self
    }

    pub fn with_length_field_unit(mut self, unit: LengthFieldUnit) -> Self {
        self.length_field_unit = unit;
        self
    }

    pub fn with_alignment(mut self, alignment: usize) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}
