use std::fmt;
use std::io::{ErrorKind, Read, Write};

use rmp::encode::{self, ValueWriteError};
use rmp::Marker;

use crate::error::{Result, WireError};

/// Default maximum string/binary payload size: 64 MiB (camera images are the
/// largest payloads the host returns).
pub const DEFAULT_MAX_BYTES: usize = 64 * 1024 * 1024;

/// Default maximum element count for arrays and maps.
pub const DEFAULT_MAX_ITEMS: usize = 1 << 20;

/// Default maximum nesting depth.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Limits applied while decoding values from the stream.
///
/// The host is trusted, but a desynchronized stream can present garbage
/// lengths; these caps keep a bad length header from exhausting memory.
#[derive(Debug, Clone)]
pub struct DecodeConfig {
    /// Maximum string/binary payload size in bytes.
    pub max_bytes: usize,
    /// Maximum array/map element count.
    pub max_items: usize,
    /// Maximum nesting depth.
    pub max_depth: usize,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BYTES,
            max_items: DEFAULT_MAX_ITEMS,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// A payload value representable in the wire format.
///
/// Decoded integers normalize to [`Value::Int`] whenever they fit in `i64`;
/// [`Value::UInt`] only carries values above `i64::MAX`, so encode/decode
/// roundtrips are stable across the whole unsigned range.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(i64),
    UInt(u64),
    F32(f32),
    F64(f64),
    Str(String),
    Bin(Vec<u8>),
    Array(Vec<Value>),
    /// Structured record with ordered entries; the host keys records by
    /// field-name strings.
    Map(Vec<(Value, Value)>),
}

impl Value {
    /// Encode this value in its compact msgpack form.
    pub fn encode_to<W: Write>(&self, wr: &mut W) -> Result<()> {
        match self {
            Value::Nil => encode::write_nil(wr)?,
            Value::Bool(v) => encode::write_bool(wr, *v)?,
            Value::Int(v) => {
                encode::write_sint(wr, *v).map_err(flatten_write_err)?;
            }
            Value::UInt(v) => {
                encode::write_uint(wr, *v).map_err(flatten_write_err)?;
            }
            Value::F32(v) => encode::write_f32(wr, *v).map_err(flatten_write_err)?,
            Value::F64(v) => encode::write_f64(wr, *v).map_err(flatten_write_err)?,
            Value::Str(v) => encode::write_str(wr, v).map_err(flatten_write_err)?,
            Value::Bin(v) => encode::write_bin(wr, v).map_err(flatten_write_err)?,
            Value::Array(items) => {
                encode::write_array_len(wr, checked_len(items.len())?)
                    .map_err(flatten_write_err)?;
                for item in items {
                    item.encode_to(wr)?;
                }
            }
            Value::Map(entries) => {
                encode::write_map_len(wr, checked_len(entries.len())?)
                    .map_err(flatten_write_err)?;
                for (key, value) in entries {
                    key.encode_to(wr)?;
                    value.encode_to(wr)?;
                }
            }
        }
        Ok(())
    }

    /// Encode into a fresh byte vector.
    pub fn encode_to_vec(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.encode_to(&mut buf)?;
        Ok(buf)
    }

    /// Decode one complete value from the stream (blocking) with default
    /// limits.
    pub fn decode_from<R: Read>(rd: &mut R) -> Result<Value> {
        Self::decode_from_with(rd, &DecodeConfig::default())
    }

    /// Decode one complete value from the stream with explicit limits.
    pub fn decode_from_with<R: Read>(rd: &mut R, config: &DecodeConfig) -> Result<Value> {
        decode_value(rd, config, config.max_depth)
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::UInt(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Int(v) => u64::try_from(*v).ok(),
            Value::UInt(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric widening: accepts both float widths and integers, since the
    /// host encodes whole-number floats as integers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::F64(v) => Some(*v),
            Value::F32(v) => Some(f64::from(*v)),
            Value::Int(v) => Some(*v as f64),
            Value::UInt(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        self.as_f64().map(|v| v as f32)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bin(&self) -> Option<&[u8]> {
        match self {
            Value::Bin(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&[(Value, Value)]> {
        match self {
            Value::Map(v) => Some(v),
            _ => None,
        }
    }

    /// Look up a record field by its string key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map()?.iter().find_map(|(k, v)| match k {
            Value::Str(name) if name == key => Some(v),
            _ => None,
        })
    }
}

fn checked_len(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| WireError::TooLarge {
        size: len,
        max: u32::MAX as usize,
    })
}

fn flatten_write_err(err: ValueWriteError<std::io::Error>) -> WireError {
    match err {
        ValueWriteError::InvalidMarkerWrite(e) | ValueWriteError::InvalidDataWrite(e) => {
            WireError::Io(e)
        }
    }
}

fn decode_value<R: Read>(rd: &mut R, config: &DecodeConfig, depth: usize) -> Result<Value> {
    if depth == 0 {
        return Err(WireError::DepthLimit {
            max: config.max_depth,
        });
    }

    let marker = Marker::from_u8(read_u8(rd)?);
    let value = match marker {
        Marker::Null => Value::Nil,
        Marker::True => Value::Bool(true),
        Marker::False => Value::Bool(false),

        Marker::FixPos(n) => Value::Int(i64::from(n)),
        Marker::FixNeg(n) => Value::Int(i64::from(n)),
        Marker::U8 => Value::Int(i64::from(read_u8(rd)?)),
        Marker::U16 => Value::Int(i64::from(read_u16(rd)?)),
        Marker::U32 => Value::Int(i64::from(read_u32(rd)?)),
        Marker::U64 => {
            let raw = read_u64(rd)?;
            match i64::try_from(raw) {
                Ok(v) => Value::Int(v),
                Err(_) => Value::UInt(raw),
            }
        }
        Marker::I8 => Value::Int(i64::from(read_i8(rd)?)),
        Marker::I16 => Value::Int(i64::from(read_i16(rd)?)),
        Marker::I32 => Value::Int(i64::from(read_i32(rd)?)),
        Marker::I64 => Value::Int(read_i64(rd)?),

        Marker::F32 => Value::F32(f32::from_be_bytes(read_array(rd)?)),
        Marker::F64 => Value::F64(f64::from_be_bytes(read_array(rd)?)),

        Marker::FixStr(len) => decode_str(rd, len as usize, config)?,
        Marker::Str8 => {
            let len = read_u8(rd)? as usize;
            decode_str(rd, len, config)?
        }
        Marker::Str16 => {
            let len = read_u16(rd)? as usize;
            decode_str(rd, len, config)?
        }
        Marker::Str32 => {
            let len = read_u32(rd)? as usize;
            decode_str(rd, len, config)?
        }

        Marker::Bin8 => {
            let len = read_u8(rd)? as usize;
            Value::Bin(read_bytes(rd, len, config)?)
        }
        Marker::Bin16 => {
            let len = read_u16(rd)? as usize;
            Value::Bin(read_bytes(rd, len, config)?)
        }
        Marker::Bin32 => {
            let len = read_u32(rd)? as usize;
            Value::Bin(read_bytes(rd, len, config)?)
        }

        Marker::FixArray(len) => decode_array(rd, len as usize, config, depth)?,
        Marker::Array16 => {
            let len = read_u16(rd)? as usize;
            decode_array(rd, len, config, depth)?
        }
        Marker::Array32 => {
            let len = read_u32(rd)? as usize;
            decode_array(rd, len, config, depth)?
        }

        Marker::FixMap(len) => decode_map(rd, len as usize, config, depth)?,
        Marker::Map16 => {
            let len = read_u16(rd)? as usize;
            decode_map(rd, len, config, depth)?
        }
        Marker::Map32 => {
            let len = read_u32(rd)? as usize;
            decode_map(rd, len, config, depth)?
        }

        marker => return Err(WireError::UnsupportedMarker { marker }),
    };

    Ok(value)
}

fn decode_str<R: Read>(rd: &mut R, len: usize, config: &DecodeConfig) -> Result<Value> {
    let bytes = read_bytes(rd, len, config)?;
    Ok(Value::Str(String::from_utf8(bytes)?))
}

fn decode_array<R: Read>(
    rd: &mut R,
    len: usize,
    config: &DecodeConfig,
    depth: usize,
) -> Result<Value> {
    if len > config.max_items {
        return Err(WireError::TooLarge {
            size: len,
            max: config.max_items,
        });
    }
    let mut items = Vec::with_capacity(len.min(4096));
    for _ in 0..len {
        items.push(decode_value(rd, config, depth - 1)?);
    }
    Ok(Value::Array(items))
}

fn decode_map<R: Read>(
    rd: &mut R,
    len: usize,
    config: &DecodeConfig,
    depth: usize,
) -> Result<Value> {
    if len > config.max_items {
        return Err(WireError::TooLarge {
            size: len,
            max: config.max_items,
        });
    }
    let mut entries = Vec::with_capacity(len.min(4096));
    for _ in 0..len {
        let key = decode_value(rd, config, depth - 1)?;
        let value = decode_value(rd, config, depth - 1)?;
        entries.push((key, value));
    }
    Ok(Value::Map(entries))
}

fn read_bytes<R: Read>(rd: &mut R, len: usize, config: &DecodeConfig) -> Result<Vec<u8>> {
    if len > config.max_bytes {
        return Err(WireError::TooLarge {
            size: len,
            max: config.max_bytes,
        });
    }
    let mut buf = vec![0u8; len];
    read_exact_or_closed(rd, &mut buf)?;
    Ok(buf)
}

fn read_array<R: Read, const N: usize>(rd: &mut R) -> Result<[u8; N]> {
    let mut buf = [0u8; N];
    read_exact_or_closed(rd, &mut buf)?;
    Ok(buf)
}

fn read_u8<R: Read>(rd: &mut R) -> Result<u8> {
    Ok(read_array::<R, 1>(rd)?[0])
}

fn read_u16<R: Read>(rd: &mut R) -> Result<u16> {
    Ok(u16::from_be_bytes(read_array(rd)?))
}

fn read_u32<R: Read>(rd: &mut R) -> Result<u32> {
    Ok(u32::from_be_bytes(read_array(rd)?))
}

fn read_u64<R: Read>(rd: &mut R) -> Result<u64> {
    Ok(u64::from_be_bytes(read_array(rd)?))
}

fn read_i8<R: Read>(rd: &mut R) -> Result<i8> {
    Ok(i8::from_be_bytes(read_array(rd)?))
}

fn read_i16<R: Read>(rd: &mut R) -> Result<i16> {
    Ok(i16::from_be_bytes(read_array(rd)?))
}

fn read_i32<R: Read>(rd: &mut R) -> Result<i32> {
    Ok(i32::from_be_bytes(read_array(rd)?))
}

fn read_i64<R: Read>(rd: &mut R) -> Result<i64> {
    Ok(i64::from_be_bytes(read_array(rd)?))
}

fn read_exact_or_closed<R: Read>(rd: &mut R, buf: &mut [u8]) -> Result<()> {
    rd.read_exact(buf).map_err(|err| {
        if err.kind() == ErrorKind::UnexpectedEof {
            WireError::ConnectionClosed
        } else {
            WireError::Io(err)
        }
    })
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        match i64::try_from(v) {
            Ok(v) => Value::Int(v),
            Err(_) => Value::UInt(v),
        }
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::F32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::F64(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bin(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(v)
    }
}

impl fmt::Display for Value {
    /// JSON-like rendering for logs and error messages; never used on the
    /// wire.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "null"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::UInt(v) => write!(f, "{v}"),
            Value::F32(v) => write!(f, "{v}"),
            Value::F64(v) => write!(f, "{v}"),
            Value::Str(v) => write!(f, "\"{}\"", v.escape_default()),
            Value::Bin(v) => write!(f, "<binary {} bytes>", v.len()),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Map(entries) => {
                write!(f, "{{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn roundtrip(value: Value) -> Value {
        let bytes = value.encode_to_vec().unwrap();
        Value::decode_from(&mut Cursor::new(bytes)).unwrap()
    }

    #[test]
    fn roundtrip_scalars() {
        for value in [
            Value::Nil,
            Value::Bool(true),
            Value::Bool(false),
            Value::Int(0),
            Value::Int(127),
            Value::Int(128),
            Value::Int(-1),
            Value::Int(-32),
            Value::Int(-33),
            Value::Int(i64::MIN),
            Value::Int(i64::MAX),
            Value::UInt(u64::MAX),
            Value::F32(1.5),
            Value::F64(-2.25),
            Value::Str("armDisarm".to_string()),
            Value::Str(String::new()),
            Value::Bin(vec![0x00, 0xff, 0x7f]),
        ] {
            assert_eq!(roundtrip(value.clone()), value);
        }
    }

    #[test]
    fn roundtrip_collections() {
        let value = Value::Array(vec![
            Value::Bool(true),
            Value::Str("drone-1".to_string()),
            Value::Map(vec![
                (Value::Str("x_val".to_string()), Value::F64(1.0)),
                (Value::Str("y_val".to_string()), Value::F64(-2.0)),
            ]),
            Value::Array(vec![]),
        ]);
        assert_eq!(roundtrip(value.clone()), value);
    }

    #[test]
    fn golden_bytes_fix_forms() {
        assert_eq!(Value::Nil.encode_to_vec().unwrap(), vec![0xc0]);
        assert_eq!(Value::Bool(true).encode_to_vec().unwrap(), vec![0xc3]);
        assert_eq!(Value::Bool(false).encode_to_vec().unwrap(), vec![0xc2]);
        assert_eq!(Value::Int(0).encode_to_vec().unwrap(), vec![0x00]);
        assert_eq!(Value::Int(5).encode_to_vec().unwrap(), vec![0x05]);
        assert_eq!(Value::Int(-1).encode_to_vec().unwrap(), vec![0xff]);
        assert_eq!(
            Value::Str("ping".to_string()).encode_to_vec().unwrap(),
            vec![0xa4, b'p', b'i', b'n', b'g']
        );
        assert_eq!(Value::Array(vec![]).encode_to_vec().unwrap(), vec![0x90]);
        assert_eq!(Value::Map(vec![]).encode_to_vec().unwrap(), vec![0x80]);
    }

    #[test]
    fn large_unsigned_survives() {
        let bytes = Value::UInt(u64::MAX).encode_to_vec().unwrap();
        assert_eq!(bytes[0], 0xcf);
        assert_eq!(roundtrip(Value::UInt(u64::MAX)), Value::UInt(u64::MAX));
    }

    #[test]
    fn unsigned_that_fits_normalizes_to_int() {
        // 0xcf marker with a value below i64::MAX decodes as Int.
        let mut bytes = vec![0xcf];
        bytes.extend_from_slice(&42u64.to_be_bytes());
        let value = Value::decode_from(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(value, Value::Int(42));
    }

    #[test]
    fn truncated_input_is_connection_closed() {
        let err = Value::decode_from(&mut Cursor::new(vec![0xa4, b'p'])).unwrap_err();
        assert!(matches!(err, WireError::ConnectionClosed));

        let err = Value::decode_from(&mut Cursor::new(Vec::<u8>::new())).unwrap_err();
        assert!(matches!(err, WireError::ConnectionClosed));
    }

    #[test]
    fn extension_markers_rejected() {
        // Ext8
        let err = Value::decode_from(&mut Cursor::new(vec![0xc7, 0x01, 0x00, 0xaa])).unwrap_err();
        assert!(matches!(err, WireError::UnsupportedMarker { .. }));
    }

    #[test]
    fn invalid_utf8_rejected() {
        let err = Value::decode_from(&mut Cursor::new(vec![0xa2, 0xff, 0xfe])).unwrap_err();
        assert!(matches!(err, WireError::InvalidString(_)));
    }

    #[test]
    fn oversized_blob_rejected_before_allocation() {
        // Bin32 declaring 4 GiB - 1.
        let bytes = vec![0xc6, 0xff, 0xff, 0xff, 0xff];
        let config = DecodeConfig {
            max_bytes: 1024,
            ..DecodeConfig::default()
        };
        let err = Value::decode_from_with(&mut Cursor::new(bytes), &config).unwrap_err();
        assert!(matches!(err, WireError::TooLarge { max: 1024, .. }));
    }

    #[test]
    fn oversized_collection_rejected() {
        // Array32 declaring far more items than allowed.
        let bytes = vec![0xdd, 0x00, 0x10, 0x00, 0x00];
        let config = DecodeConfig {
            max_items: 16,
            ..DecodeConfig::default()
        };
        let err = Value::decode_from_with(&mut Cursor::new(bytes), &config).unwrap_err();
        assert!(matches!(err, WireError::TooLarge { max: 16, .. }));
    }

    #[test]
    fn depth_limit_enforced() {
        let mut value = Value::Int(1);
        for _ in 0..6 {
            value = Value::Array(vec![value]);
        }
        let bytes = value.encode_to_vec().unwrap();
        let config = DecodeConfig {
            max_depth: 4,
            ..DecodeConfig::default()
        };
        let err = Value::decode_from_with(&mut Cursor::new(bytes), &config).unwrap_err();
        assert!(matches!(err, WireError::DepthLimit { max: 4 }));
    }

    #[test]
    fn decode_consumes_exactly_one_value() {
        let mut bytes = Value::Int(1).encode_to_vec().unwrap();
        bytes.extend(Value::Str("next".to_string()).encode_to_vec().unwrap());

        let mut cursor = Cursor::new(bytes);
        assert_eq!(Value::decode_from(&mut cursor).unwrap(), Value::Int(1));
        assert_eq!(
            Value::decode_from(&mut cursor).unwrap(),
            Value::Str("next".to_string())
        );
    }

    #[test]
    fn map_field_lookup() {
        let value = Value::Map(vec![
            (Value::Str("x_val".to_string()), Value::F64(3.5)),
            (Value::Str("y_val".to_string()), Value::Int(2)),
        ]);
        assert_eq!(value.get("x_val").and_then(Value::as_f64), Some(3.5));
        assert_eq!(value.get("y_val").and_then(Value::as_f64), Some(2.0));
        assert!(value.get("z_val").is_none());
    }

    #[test]
    fn accessor_widening() {
        assert_eq!(Value::F32(1.5).as_f64(), Some(1.5));
        assert_eq!(Value::Int(-3).as_f64(), Some(-3.0));
        assert_eq!(Value::Int(7).as_u64(), Some(7));
        assert_eq!(Value::Int(-7).as_u64(), None);
        assert_eq!(Value::UInt(u64::MAX).as_i64(), None);
        assert_eq!(Value::Str("x".to_string()).as_bool(), None);
    }

    #[test]
    fn display_is_json_like() {
        let value = Value::Array(vec![
            Value::Nil,
            Value::Bool(true),
            Value::Str("a\"b".to_string()),
            Value::Bin(vec![1, 2, 3]),
        ]);
        assert_eq!(
            value.to_string(),
            "[null, true, \"a\\\"b\", <binary 3 bytes>]"
        );
    }
}
