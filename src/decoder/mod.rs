//! 按照类型图把SOME/IP payload解码成 [`Value`]
//!
//! One [`PayloadDecoder`] borrows an immutable [`Module`] and carries the
//! session parameters; every `decode` call owns its own cursor, so one
//! decoder can serve many threads.

pub mod string;
pub mod value;

use bytes::{Buf, TryGetError};
use log::trace;

use crate::errors::{DecodeError, DecodeErrorKind};
use crate::matrix::{MatrixType, Module, NumberType, StringLength, TypeId};
use crate::matrix::types::RecordId;
use crate::types::{Endianness, LengthFieldSize, LengthFieldUnit, SerializationParameter};

pub use value::Value;

fn eof(e: TryGetError) -> DecodeErrorKind {
    DecodeErrorKind::InsufficientData {
        needed: e.requested,
        got: e.available,
    }
}

/// Read position inside the payload. `base` is the payload offset of the
/// first byte of `buf`, so sub-cursors report offsets of the whole payload.
struct Cursor<'a> {
    buf: &'a [u8],
    base: usize,
    initial_len: usize,
}

impl<'a> Cursor<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            base: 0,
            initial_len: buf.len(),
        }
    }

    fn offset(&self) -> usize {
        self.base + self.initial_len - self.buf.remaining()
    }

    fn error(&self, path: &str, kind: DecodeErrorKind) -> DecodeError {
        DecodeError {
            path: path.to_owned(),
            offset: self.offset(),
            kind,
        }
    }

    /// An element that read nothing cannot bound the remaining `left`
    /// elements, so they must still fit one byte each.
    fn check_progress(&self, start: usize, left: usize, path: &str) -> Result<(), DecodeError> {
        if self.offset() == start && left > self.buf.remaining() {
            return Err(self.error(
                path,
                DecodeErrorKind::InsufficientData {
                    needed: left,
                    got: self.buf.remaining(),
                },
            ));
        }
        Ok(())
    }

    /// split off the next `len` bytes as their own cursor
    fn take(&mut self, len: usize, path: &str) -> Result<Cursor<'a>, DecodeError> {
        if self.buf.remaining() < len {
            return Err(self.error(
                path,
                DecodeErrorKind::InsufficientData {
                    needed: len,
                    got: self.buf.remaining(),
                },
            ));
        }
        let buf: &'a [u8] = self.buf;
        let (head, tail) = buf.split_at(len);
        let sub = Cursor {
            buf: head,
            base: self.offset(),
            initial_len: len,
        };
        self.buf = tail;
        Ok(sub)
    }
}

macro_rules! read_number {
    ($cur:expr, $big_endian:expr, $be:ident, $le:ident) => {
        if $big_endian {
            $cur.buf.$be()
        } else {
            $cur.buf.$le()
        }
    };
}

pub struct PayloadDecoder<'m> {
    module: &'m Module,
    config: SerializationParameter,
}

impl<'m> PayloadDecoder<'m> {
    pub fn new(module: &'m Module, config: SerializationParameter) -> Self {
        Self { module, config }
    }

    pub fn config(&self) -> &SerializationParameter {
        &self.config
    }

    /// Decode one value of type `root` from the front of `data`. `label`
    /// starts every error path. Returns the value and the bytes left over.
    pub fn decode<'a>(
        &self,
        root: TypeId,
        label: &str,
        data: &'a [u8],
    ) -> Result<(Value, &'a [u8]), DecodeError> {
        let mut cursor = Cursor::new(data);
        let value = self.decode_type(root, &mut cursor, label, 0)?;
        trace!(
            "{}: {} of {} bytes consumed",
            label,
            cursor.offset(),
            data.len()
        );
        Ok((value, cursor.buf))
    }

    fn decode_type(
        &self,
        ty: TypeId,
        cur: &mut Cursor<'_>,
        path: &str,
        depth: usize,
    ) -> Result<Value, DecodeError> {
        let node = self
            .module
            .node(ty)
            .ok_or_else(|| cur.error(path, DecodeErrorKind::UnknownType(ty.index())))?;
        match node {
            MatrixType::Number { size } => self.decode_number(*size, cur, path),
            MatrixType::String { length } => self.decode_string(*length, cur, path),
            MatrixType::Array { element, count } => {
                let count = *count as usize;
                let mut items = Vec::with_capacity(count.min(cur.buf.remaining()));
                for i in 0..count {
                    let p = format!("{path}[{i}]");
                    let start = cur.offset();
                    items.push(self.decode_type(*element, cur, &p, depth)?);
                    cur.check_progress(start, count - i - 1, &p)?;
                    if i + 1 < count {
                        self.skip_padding(*element, start, cur, &p)?;
                    }
                }
                Ok(Value::Array(items))
            }
            MatrixType::Sequence { element } => self.decode_sequence(*element, cur, path, depth),
            MatrixType::Struct { record } => self.decode_record(*record, cur, path, depth + 1),
        }
    }

    fn decode_number(
        &self,
        size: NumberType,
        cur: &mut Cursor<'_>,
        path: &str,
    ) -> Result<Value, DecodeError> {
        let be = self.config.endianness == Endianness::BigEndian;
        let value = match size {
            NumberType::Boolean => cur.buf.try_get_u8().map(|b| Value::Bool(b != 0)),
            NumberType::Uint8 => cur.buf.try_get_u8().map(Value::U8),
            NumberType::Sint8 => cur.buf.try_get_i8().map(Value::I8),
            NumberType::Uint16 => read_number!(cur, be, try_get_u16, try_get_u16_le).map(Value::U16),
            NumberType::Sint16 => read_number!(cur, be, try_get_i16, try_get_i16_le).map(Value::I16),
            NumberType::Uint32 => read_number!(cur, be, try_get_u32, try_get_u32_le).map(Value::U32),
            NumberType::Sint32 => read_number!(cur, be, try_get_i32, try_get_i32_le).map(Value::I32),
            NumberType::Uint64 => read_number!(cur, be, try_get_u64, try_get_u64_le).map(Value::U64),
            NumberType::Sint64 => read_number!(cur, be, try_get_i64, try_get_i64_le).map(Value::I64),
            NumberType::Float32 => read_number!(cur, be, try_get_f32, try_get_f32_le).map(Value::F32),
            NumberType::Float64 => read_number!(cur, be, try_get_f64, try_get_f64_le).map(Value::F64),
        };
        let value = value.map_err(|e| cur.error(path, eof(e)))?;
        trace!("{} = {:?}", path, value);
        Ok(value)
    }

    fn decode_string(
        &self,
        length: StringLength,
        cur: &mut Cursor<'_>,
        path: &str,
    ) -> Result<Value, DecodeError> {
        let (text, consumed) = match length {
            StringLength::Fixed(width) => string::decode_fixed(cur.buf, width as usize),
            StringLength::Dynamic => string::decode_dynamic(cur.buf),
        }
        .map_err(|kind| cur.error(path, kind))?;
        cur.buf.advance(consumed);
        trace!("{} = {:?}", path, text);
        Ok(Value::String(text))
    }

    fn read_length(&self, cur: &mut Cursor<'_>, path: &str) -> Result<usize, DecodeError> {
        let be = self.config.endianness == Endianness::BigEndian;
        let len = match self.config.length_field_size {
            LengthFieldSize::B8 => cur.buf.try_get_u8().map(usize::from),
            LengthFieldSize::B16 => {
                read_number!(cur, be, try_get_u16, try_get_u16_le).map(usize::from)
            }
            LengthFieldSize::B32 => {
                read_number!(cur, be, try_get_u32, try_get_u32_le).map(|n| n as usize)
            }
        };
        len.map_err(|e| cur.error(path, eof(e)))
    }

    fn decode_sequence(
        &self,
        element: TypeId,
        cur: &mut Cursor<'_>,
        path: &str,
        depth: usize,
    ) -> Result<Value, DecodeError> {
        let len = self.read_length(cur, path)?;
        let mut items = Vec::new();
        match self.config.length_field_unit {
            LengthFieldUnit::Bytes => {
                let mut sub = cur.take(len, path)?;
                while sub.buf.has_remaining() {
                    let p = format!("{path}[{}]", items.len());
                    let start = sub.offset();
                    items.push(self.decode_type(element, &mut sub, &p, depth)?);
                    if sub.offset() == start {
                        // zero-width elements would never drain the frame
                        break;
                    }
                    if sub.buf.has_remaining() {
                        self.skip_padding(element, start, &mut sub, &p)?;
                    }
                }
            }
            LengthFieldUnit::Elements => {
                items.reserve(len.min(cur.buf.remaining()));
                for i in 0..len {
                    let p = format!("{path}[{i}]");
                    let start = cur.offset();
                    items.push(self.decode_type(element, cur, &p, depth)?);
                    cur.check_progress(start, len - i - 1, &p)?;
                    if i + 1 < len {
                        self.skip_padding(element, start, cur, &p)?;
                    }
                }
            }
        }
        trace!("{}: {} elements", path, items.len());
        Ok(Value::Array(items))
    }

    fn decode_record(
        &self,
        record: RecordId,
        cur: &mut Cursor<'_>,
        path: &str,
        depth: usize,
    ) -> Result<Value, DecodeError> {
        if depth > self.config.max_depth {
            return Err(cur.error(path, DecodeErrorKind::RecursionLimit(self.config.max_depth)));
        }
        let def = self
            .module
            .record(record)
            .ok_or_else(|| cur.error(path, DecodeErrorKind::UnknownType(record.index())))?;
        let mut fields = Vec::with_capacity(def.fields.len());
        for (i, field) in def.fields.iter().enumerate() {
            let p = format!("{}.{}", path, field.name);
            let start = cur.offset();
            let value = self.decode_type(field.data_type, cur, &p, depth)?;
            if i + 1 < def.fields.len() {
                self.skip_padding(field.data_type, start, cur, &p)?;
            }
            fields.push((field.name.clone(), value));
        }
        Ok(Value::Struct(fields))
    }

    /// variable-width elements are padded to the session alignment when
    /// another element follows them
    fn is_variable(&self, ty: TypeId) -> bool {
        matches!(
            self.module.node(ty),
            Some(MatrixType::Sequence { .. })
                | Some(MatrixType::String {
                    length: StringLength::Dynamic
                })
        )
    }

    fn skip_padding(
        &self,
        element: TypeId,
        start: usize,
        cur: &mut Cursor<'_>,
        path: &str,
    ) -> Result<(), DecodeError> {
        let alignment = self.config.alignment;
        if alignment <= 1 || !self.is_variable(element) {
            return Ok(());
        }
        let pad = (alignment - (cur.offset() - start) % alignment) % alignment;
        if pad > cur.buf.remaining() {
            return Err(cur.error(
                path,
                DecodeErrorKind::InsufficientData {
                    needed: pad,
                    got: cur.buf.remaining(),
                },
            ));
        }
        if pad > 0 {
            trace!("{}: skip {} padding bytes", path, pad);
            cur.buf.advance(pad);
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod decoder_tests {
    use super::string::{encode_dynamic, encode_fixed, Encoding};
    use super::*;
    use crate::matrix::build_module;
    use crate::matrix::raw::RawDataType;

    pub(crate) fn hex(s: &str) -> Vec<u8> {
        hex::decode(s).unwrap()
    }

    fn numbers() -> Vec<RawDataType> {
        vec![
            RawDataType::primitive("Bool", "boolean"),
            RawDataType::primitive("U8", "uint8"),
            RawDataType::primitive("I8", "sint8"),
            RawDataType::primitive("U16", "uint16"),
            RawDataType::primitive("I16", "sint16"),
            RawDataType::primitive("U32", "uint32"),
            RawDataType::primitive("I32", "sint32"),
            RawDataType::primitive("U64", "uint64"),
            RawDataType::primitive("I64", "sint64"),
            RawDataType::primitive("F32", "float32"),
            RawDataType::primitive("F64", "float64"),
        ]
    }

    fn decode_as(
        module: &Module,
        config: SerializationParameter,
        ty: &str,
        data: &[u8],
    ) -> Result<(Value, usize), DecodeError> {
        let id = module.lookup(ty).unwrap();
        PayloadDecoder::new(module, config)
            .decode(id, ty, data)
            .map(|(v, rest)| (v, rest.len()))
    }

    fn be() -> SerializationParameter {
        SerializationParameter::default()
    }

    fn le() -> SerializationParameter {
        SerializationParameter::default().with_endianness(Endianness::LittleEndian)
    }

    #[test]
    fn thirty_key_values() {
        let module = build_module(
            "m",
            &[
                RawDataType::primitive("UInt32", "uint32_t"),
                RawDataType::record("KeyValue", &[("key", "UInt32"), ("value", "UInt32")]),
                RawDataType::array("KeyValues", "KeyValue", 30),
            ],
        )
        .unwrap();
        let data = [0u8, 0, 0, 1].repeat(60);
        let (value, rest) = decode_as(&module, be(), "KeyValues", &data).unwrap();
        assert_eq!(rest, 0);
        let items = value.as_array().unwrap();
        assert_eq!(items.len(), 30);
        let one = Value::Struct(vec![
            ("key".to_owned(), Value::U32(1)),
            ("value".to_owned(), Value::U32(1)),
        ]);
        assert!(items.iter().all(|v| *v == one));
    }

    #[test]
    fn short_uint32_fails() {
        let module = build_module("m", &numbers()).unwrap();
        let err = decode_as(&module, be(), "U32", &[0, 0, 1]).unwrap_err();
        assert_eq!(
            err,
            DecodeError {
                path: "U32".to_owned(),
                offset: 0,
                kind: DecodeErrorKind::InsufficientData { needed: 4, got: 3 }
            }
        );
    }

    #[test]
    fn endianness_sensitivity() {
        let module = build_module("m", &numbers()).unwrap();
        let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
        for ty in ["U16", "I16", "U32", "I32", "U64", "I64", "F32", "F64"] {
            let big = decode_as(&module, be(), ty, &data).unwrap();
            let little = decode_as(&module, le(), ty, &data).unwrap();
            assert_ne!(big.0, little.0, "{}", ty);
            assert_eq!(big.1, little.1);
        }
        for ty in ["U8", "I8", "Bool"] {
            assert_eq!(
                decode_as(&module, be(), ty, &data).unwrap(),
                decode_as(&module, le(), ty, &data).unwrap()
            );
        }
        assert_eq!(decode_as(&module, be(), "U16", &data).unwrap().0, Value::U16(0x0102));
        assert_eq!(decode_as(&module, le(), "U16", &data).unwrap().0, Value::U16(0x0201));
    }

    #[test]
    fn number_semantics() {
        let module = build_module("m", &numbers()).unwrap();
        assert_eq!(decode_as(&module, be(), "Bool", &[0x02]).unwrap().0, Value::Bool(true));
        assert_eq!(decode_as(&module, be(), "Bool", &[0x00]).unwrap().0, Value::Bool(false));
        assert_eq!(decode_as(&module, be(), "I8", &[0xFF]).unwrap().0, Value::I8(-1));
        assert_eq!(
            decode_as(&module, be(), "I32", &[0xFF, 0xFF, 0xFF, 0xFE]).unwrap().0,
            Value::I32(-2)
        );
        assert_eq!(
            decode_as(&module, be(), "F32", &1.5f32.to_be_bytes()).unwrap().0,
            Value::F32(1.5)
        );
        assert_eq!(
            decode_as(&module, le(), "F64", &(-0.25f64).to_le_bytes()).unwrap().0,
            Value::F64(-0.25)
        );
        assert_eq!(
            decode_as(&module, le(), "I64", &(-7i64).to_le_bytes()).unwrap().0,
            Value::I64(-7)
        );
    }

    #[test]
    fn remainder_is_left_over() {
        let module = build_module("m", &numbers()).unwrap();
        let data = [0, 1, 2, 3, 4, 5, 6];
        let id = module.lookup("U16").unwrap();
        let decoder = PayloadDecoder::new(&module, be());
        let (value, rest) = decoder.decode(id, "U16", &data).unwrap();
        assert_eq!(value, Value::U16(1));
        assert_eq!(rest, &data[2..]);
        let (value, rest) = decoder.decode(id, "U16", rest).unwrap();
        assert_eq!(value, Value::U16(0x0203));
        assert_eq!(rest.len(), 3);
    }

    #[test]
    fn field_order_follows_declaration() {
        let module = build_module(
            "m",
            &[
                RawDataType::primitive("U8", "uint8"),
                RawDataType::record("Rec", &[("zulu", "U8"), ("alpha", "U8"), ("mike", "U8")]),
            ],
        )
        .unwrap();
        let (value, _) = decode_as(&module, be(), "Rec", &[3, 1, 2]).unwrap();
        assert_eq!(value.field_names(), ["zulu", "alpha", "mike"]);
        assert_eq!(value.get("alpha"), Some(&Value::U8(1)));
    }

    fn wifi_module() -> Module {
        build_module(
            "wifi",
            &[
                RawDataType::record(
                    "WiFiApList",
                    &[
                        ("wiFiApNum", "/DataTypes/Int32"),
                        ("wiFiApArray", "/DataTypes/WiFiApInfoArray"),
                    ],
                ),
                RawDataType::array("WiFiApInfoArray", "/DataTypes/WiFiApInfo", 0),
                RawDataType::record(
                    "WiFiApInfo",
                    &[
                        ("wiFiApName", "/DataTypes/WiFiApName"),
                        ("wiFiStrength", "/DataTypes/Int32"),
                        ("wiFiEncryption", "/DataTypes/Int32"),
                    ],
                ),
                RawDataType::string("WiFiApName", Some(64)),
                RawDataType::primitive("Int32", "/AUTOSAR/StdTypes/int32_t"),
            ],
        )
        .unwrap()
    }

    pub(crate) const WIFI_AP_LIST: &str = "0000000200000090efbbbfe4b8ade69687205749464900000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000c00000022efbbbf456e676c697368205749464900000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000380000004e";

    #[test]
    fn wifi_ap_list() {
        let module = wifi_module();
        let data = hex(WIFI_AP_LIST);
        let (value, rest) = decode_as(&module, be(), "WiFiApList", &data).unwrap();
        assert_eq!(rest, 0);
        assert_eq!(value.get("wiFiApNum"), Some(&Value::I32(2)));
        let aps = value.get("wiFiApArray").and_then(Value::as_array).unwrap();
        assert_eq!(aps.len(), 2);
        assert_eq!(aps[0].get("wiFiApName").and_then(Value::as_str), Some("中文 WIFI"));
        assert_eq!(aps[0].get("wiFiStrength"), Some(&Value::I32(12)));
        assert_eq!(aps[0].get("wiFiEncryption"), Some(&Value::I32(34)));
        assert_eq!(aps[1].get("wiFiApName").and_then(Value::as_str), Some("English WIFI"));
        assert_eq!(aps[1].get("wiFiStrength"), Some(&Value::I32(56)));
        assert_eq!(aps[1].get("wiFiEncryption"), Some(&Value::I32(78)));
        assert_eq!(
            serde_json::to_string(&aps[1]).unwrap(),
            r#"{"wiFiApName":"English WIFI","wiFiStrength":56,"wiFiEncryption":78}"#
        );
    }

    #[test]
    fn error_path_and_offset() {
        let module = wifi_module();
        let mut data = hex(WIFI_AP_LIST);
        // break the BOM of the second name
        data[80] = 0x00;
        let err = decode_as(&module, be(), "WiFiApList", &data).unwrap_err();
        assert_eq!(err.path, "WiFiApList.wiFiApArray[1].wiFiApName");
        assert_eq!(err.offset, 80);
        assert_eq!(err.kind, DecodeErrorKind::MissingOrInvalidBom);

        // frame longer than the payload
        let err = decode_as(&module, be(), "WiFiApList", &data[..100]).unwrap_err();
        assert_eq!(err.path, "WiFiApList.wiFiApArray");
        assert_eq!(
            err.kind,
            DecodeErrorKind::InsufficientData {
                needed: 144,
                got: 92
            }
        );
    }

    #[test]
    fn sequence_counting_elements() {
        let module = build_module(
            "m",
            &[
                RawDataType::primitive("U16", "uint16"),
                RawDataType::array("U16s", "U16", 0),
            ],
        )
        .unwrap();
        let config = be()
            .with_length_field_unit(LengthFieldUnit::Elements)
            .with_length_field_size(LengthFieldSize::B8);
        let (value, rest) = decode_as(&module, config, "U16s", &[2, 0, 1, 0, 2, 9]).unwrap();
        assert_eq!(value, Value::Array(vec![Value::U16(1), Value::U16(2)]));
        assert_eq!(rest, 1);

        let config = le().with_length_field_size(LengthFieldSize::B16);
        let (value, rest) = decode_as(&module, config, "U16s", &[4, 0, 1, 0, 2, 0]).unwrap();
        assert_eq!(value, Value::Array(vec![Value::U16(1), Value::U16(2)]));
        assert_eq!(rest, 0);
    }

    #[test]
    fn empty_sequence() {
        let module = build_module(
            "m",
            &[
                RawDataType::primitive("U16", "uint16"),
                RawDataType::array("U16s", "U16", 0),
            ],
        )
        .unwrap();
        let (value, rest) = decode_as(&module, be(), "U16s", &[0, 0, 0, 0, 7]).unwrap();
        assert_eq!(value, Value::Array(vec![]));
        assert_eq!(rest, 1);
    }

    /// empty records are refused by the builder, so the graph is put together by hand
    fn zero_width_module() -> Module {
        use crate::matrix::types::RecordDef;
        Module {
            name: "m".to_owned(),
            nodes: vec![
                MatrixType::Struct { record: RecordId(0) },
                MatrixType::Sequence { element: TypeId(0) },
                MatrixType::Array {
                    element: TypeId(0),
                    count: 5,
                },
            ],
            node_names: vec!["Empty".to_owned(), "Empties".to_owned(), "FiveEmpties".to_owned()],
            types_by_name: [("empty", 0), ("empties", 1), ("fiveempties", 2)]
                .into_iter()
                .map(|(k, i)| (k.to_owned(), TypeId(i)))
                .collect(),
            records: vec![RecordDef {
                name: "Empty".to_owned(),
                fields: vec![],
            }],
        }
    }

    #[test]
    fn zero_width_elements_bounded_by_payload() {
        let module = zero_width_module();
        let config = be().with_length_field_unit(LengthFieldUnit::Elements);

        let err = decode_as(&module, config, "Empties", &20_000_000u32.to_be_bytes()).unwrap_err();
        assert_eq!(
            err,
            DecodeError {
                path: "Empties[0]".to_owned(),
                offset: 4,
                kind: DecodeErrorKind::InsufficientData {
                    needed: 19_999_999,
                    got: 0
                }
            }
        );

        let (value, rest) = decode_as(&module, config, "Empties", &[0, 0, 0, 3, 7, 7, 7]).unwrap();
        assert_eq!(value.as_array().map(|a| a.len()), Some(3));
        assert_eq!(rest, 3);

        let err = decode_as(&module, be(), "FiveEmpties", &[]).unwrap_err();
        assert_eq!(err.path, "FiveEmpties[0]");
    }

    #[test]
    fn padding_after_dynamic_strings() {
        let module = build_module(
            "m",
            &[
                RawDataType::string("Name", None),
                RawDataType::primitive("U8", "uint8"),
                RawDataType::record("Entry", &[("name", "Name"), ("flag", "U8")]),
            ],
        )
        .unwrap();
        // 4 + 3 + 2 + 1 = 10 bytes, padded to 12
        let mut data = encode_dynamic("ab", Encoding::Utf8, 0);
        assert_eq!(data.len(), 10);
        data.extend([0, 0, 7]);

        let (value, rest) = decode_as(&module, be().with_alignment(4), "Entry", &data).unwrap();
        assert_eq!(value.get("name").and_then(Value::as_str), Some("ab"));
        assert_eq!(value.get("flag"), Some(&Value::U8(7)));
        assert_eq!(rest, 0);

        let (value, rest) = decode_as(&module, be(), "Entry", &data).unwrap();
        assert_eq!(value.get("flag"), Some(&Value::U8(0)));
        assert_eq!(rest, 2);
    }

    #[test]
    fn byte_conservation() {
        let module = wifi_module();
        let mut data = hex(WIFI_AP_LIST);
        data.extend([1, 2, 3]);
        let (_, rest) = decode_as(&module, be(), "WiFiApList", &data).unwrap();
        assert_eq!(rest, 3);

        let name = module.lookup("WiFiApName").unwrap();
        let fixed = encode_fixed("中文", Encoding::Utf16Le, 64);
        let decoder = PayloadDecoder::new(&module, be());
        let (_, rest) = decoder.decode(name, "name", &fixed).unwrap();
        assert!(rest.is_empty());
    }

    #[test]
    fn recursion_limit() {
        let module = build_module(
            "m",
            &[
                RawDataType::primitive("U8", "uint8"),
                RawDataType::record("Tree", &[("value", "U8"), ("children", "Trees")]),
                RawDataType::array("Trees", "Tree", 0),
            ],
        )
        .unwrap();
        let config = be()
            .with_length_field_unit(LengthFieldUnit::Elements)
            .with_length_field_size(LengthFieldSize::B8);
        // one level: value 5, no children
        let (value, _) = decode_as(&module, config, "Tree", &[5, 0]).unwrap();
        assert_eq!(value.get("children"), Some(&Value::Array(vec![])));

        // a chain of single children deeper than the limit
        let chain = [1u8, 1].repeat(4);
        let err = decode_as(&module, config.with_max_depth(2), "Tree", &chain).unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::RecursionLimit(2));
        assert_eq!(err.path, "Tree.children[0].children[0]");
    }

    #[test]
    fn deterministic() {
        let module = wifi_module();
        let data = hex(WIFI_AP_LIST);
        let first = decode_as(&module, be(), "WiFiApList", &data).unwrap();
        let second = decode_as(&module, be(), "WiFiApList", &data).unwrap();
        assert_eq!(first, second);
    }
}
