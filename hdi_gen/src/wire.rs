//! Executable model of the binding wire format.
//!
//! Generated bindings never link against this module; it exists so the
//! encoding rules the emitters follow (framing, widths, bounds) can be
//! exercised directly. Scalars are little-endian at their native width,
//! bool travels as int8 and enum as uint64. Strings and containers carry a
//! `uint32` length prefix; unions are raw bytes of their C size.

use hdi_types::{StructType, Type};
use thiserror::Error;
use tracing::debug;

/// Byte bound for any buffer sized from wire data (`HDI_BUFF_MAX_SIZE`).
pub const MAX_BUFF_SIZE: usize = 1024 * 200;

const POINTER_SIZE: usize = 8;
const UNION_ALIGN: usize = 8;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    UInt(u32),
    UShort(u16),
    ULong(u64),
    Float(f32),
    Double(f64),
    String(String),
    FileDescriptor(i32),
    Enum(u64),
    Struct(Vec<Value>),
    Union(Vec<u8>),
    List(Vec<Value>),
    Array(Vec<Value>),
    /// Remote object handle.
    Interface(u32),
    Sequenceable(Vec<u8>),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WireError {
    #[error("invalid data: {0}")]
    InvalidParameter(String),
    #[error("allocation of {requested} elements failed")]
    MallocFailure { requested: usize },
    #[error("parcel truncated: needed {needed} bytes, {available} available")]
    Truncated { needed: usize, available: usize },
    #[error("value {value} does not have type {ty}")]
    ShapeMismatch { ty: String, value: String },
}

pub type WireResult<T> = Result<T, WireError>;

/// Size and alignment of a type as laid out by the C backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub size: usize,
    pub align: usize,
}

impl Layout {
    const fn new(size: usize, align: usize) -> Self {
        Self { size, align }
    }
}

fn align_up(offset: usize, align: usize) -> usize {
    offset.div_ceil(align) * align
}

pub fn c_layout(ty: &Type) -> Layout {
    match ty {
        Type::Bool | Type::Byte => Layout::new(1, 1),
        Type::Short | Type::UShort => Layout::new(2, 2),
        Type::Int | Type::UInt | Type::Float | Type::FileDescriptor | Type::Enum(_) => {
            Layout::new(4, 4)
        }
        Type::Long | Type::ULong | Type::Double => Layout::new(8, 8),
        Type::String
        | Type::List(_)
        | Type::Array(_)
        | Type::Interface(_)
        | Type::Sequenceable(_) => Layout::new(POINTER_SIZE, POINTER_SIZE),
        Type::Struct(s) => struct_layout(s),
        Type::Union(u) => {
            let (size, align) = u.fields.iter().fold((0, UNION_ALIGN), |(size, align), field| {
                let layout = c_layout(&field.field_type);
                (size.max(layout.size), align.max(layout.align))
            });
            Layout::new(align_up(size, align), align)
        }
    }
}

/* Container members are a pointer followed by their uint32_t length */
fn struct_layout(struct_type: &StructType) -> Layout {
    let mut offset = 0;
    let mut align = 1;
    let mut place = |layout: Layout, offset: &mut usize| {
        *offset = align_up(*offset, layout.align) + layout.size;
        align = align.max(layout.align);
    };
    for field in &struct_type.fields {
        place(c_layout(&field.field_type), &mut offset);
        if field.field_type.is_container() {
            place(Layout::new(4, 4), &mut offset);
        }
    }
    Layout::new(align_up(offset, align), align)
}

/// Append-only write buffer with a read cursor.
///
/// `reserved` counts element slots reserved for decoded containers, so a
/// rejected count can be shown to have allocated nothing.
#[derive(Debug, Clone, Default)]
pub struct Parcel {
    data: Vec<u8>,
    cursor: usize,
    reserved: usize,
}

impl Parcel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self {
            data,
            cursor: 0,
            reserved: 0,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.cursor
    }

    pub fn reserved(&self) -> usize {
        self.reserved
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    pub fn write_u32(&mut self, value: u32) {
        self.write_bytes(&value.to_le_bytes());
    }

    pub fn read_bytes(&mut self, len: usize) -> WireResult<&[u8]> {
        if len > self.remaining() {
            return Err(WireError::Truncated {
                needed: len,
                available: self.remaining(),
            });
        }
        let start = self.cursor;
        self.cursor += len;
        Ok(&self.data[start..self.cursor])
    }

    fn read_array<const N: usize>(&mut self) -> WireResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub fn read_u32(&mut self) -> WireResult<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }
}

fn mismatch(ty: &Type, value: &Value) -> WireError {
    WireError::ShapeMismatch {
        ty: ty.describe(),
        value: format!("{:?}", value),
    }
}

fn length_prefix(len: usize) -> WireResult<u32> {
    u32::try_from(len).map_err(|_| WireError::InvalidParameter(format!("length {} overflows u32", len)))
}

pub fn encode(ty: &Type, value: &Value, parcel: &mut Parcel) -> WireResult<()> {
    match (ty, value) {
        (Type::Bool, Value::Bool(v)) => parcel.write_bytes(&[u8::from(*v)]),
        (Type::Byte, Value::Byte(v)) => parcel.write_bytes(&v.to_le_bytes()),
        (Type::Short, Value::Short(v)) => parcel.write_bytes(&v.to_le_bytes()),
        (Type::Int, Value::Int(v)) => parcel.write_bytes(&v.to_le_bytes()),
        (Type::Long, Value::Long(v)) => parcel.write_bytes(&v.to_le_bytes()),
        (Type::UInt, Value::UInt(v)) => parcel.write_bytes(&v.to_le_bytes()),
        (Type::UShort, Value::UShort(v)) => parcel.write_bytes(&v.to_le_bytes()),
        (Type::ULong, Value::ULong(v)) => parcel.write_bytes(&v.to_le_bytes()),
        (Type::Float, Value::Float(v)) => parcel.write_bytes(&v.to_le_bytes()),
        (Type::Double, Value::Double(v)) => parcel.write_bytes(&v.to_le_bytes()),
        (Type::FileDescriptor, Value::FileDescriptor(fd)) => {
            if *fd < 0 {
                return Err(WireError::InvalidParameter(format!("file descriptor {}", fd)));
            }
            parcel.write_bytes(&fd.to_le_bytes());
        }
        (Type::Enum(_), Value::Enum(v)) => parcel.write_bytes(&v.to_le_bytes()),
        (Type::Interface(_), Value::Interface(handle)) => parcel.write_u32(*handle),
        (Type::String, Value::String(s)) => {
            parcel.write_u32(length_prefix(s.len())?);
            parcel.write_bytes(s.as_bytes());
        }
        (Type::Sequenceable(_), Value::Sequenceable(blob)) => {
            parcel.write_u32(length_prefix(blob.len())?);
            parcel.write_bytes(blob);
        }
        (Type::Union(_), Value::Union(bytes)) => {
            if bytes.len() != c_layout(ty).size {
                return Err(mismatch(ty, value));
            }
            parcel.write_bytes(bytes);
        }
        (Type::Struct(s), Value::Struct(fields)) => {
            if fields.len() != s.fields.len() {
                return Err(mismatch(ty, value));
            }
            for (field, field_value) in s.fields.iter().zip(fields) {
                encode(&field.field_type, field_value, parcel)?;
            }
        }
        (Type::List(l), Value::List(items)) => encode_elements(&l.element_type, items, parcel)?,
        (Type::Array(a), Value::Array(items)) => encode_elements(&a.element_type, items, parcel)?,
        _ => return Err(mismatch(ty, value)),
    }
    Ok(())
}

fn encode_elements(element: &Type, items: &[Value], parcel: &mut Parcel) -> WireResult<()> {
    parcel.write_u32(length_prefix(items.len())?);
    for item in items {
        encode(element, item, parcel)?;
    }
    Ok(())
}

pub fn decode(ty: &Type, parcel: &mut Parcel) -> WireResult<Value> {
    let value = match ty {
        Type::Bool => Value::Bool(i8::from_le_bytes(parcel.read_array()?) != 0),
        Type::Byte => Value::Byte(i8::from_le_bytes(parcel.read_array()?)),
        Type::Short => Value::Short(i16::from_le_bytes(parcel.read_array()?)),
        Type::Int => Value::Int(i32::from_le_bytes(parcel.read_array()?)),
        Type::Long => Value::Long(i64::from_le_bytes(parcel.read_array()?)),
        Type::UInt => Value::UInt(u32::from_le_bytes(parcel.read_array()?)),
        Type::UShort => Value::UShort(u16::from_le_bytes(parcel.read_array()?)),
        Type::ULong => Value::ULong(u64::from_le_bytes(parcel.read_array()?)),
        Type::Float => Value::Float(f32::from_le_bytes(parcel.read_array()?)),
        Type::Double => Value::Double(f64::from_le_bytes(parcel.read_array()?)),
        Type::FileDescriptor => {
            let fd = i32::from_le_bytes(parcel.read_array()?);
            if fd < 0 {
                return Err(WireError::InvalidParameter(format!("file descriptor {}", fd)));
            }
            Value::FileDescriptor(fd)
        }
        Type::Enum(_) => Value::Enum(u64::from_le_bytes(parcel.read_array()?)),
        Type::Interface(_) => Value::Interface(parcel.read_u32()?),
        Type::String => {
            let bytes = read_blob(parcel, "string")?;
            let text = String::from_utf8(bytes)
                .map_err(|err| WireError::InvalidParameter(format!("string is not utf-8: {}", err)))?;
            Value::String(text)
        }
        Type::Sequenceable(_) => Value::Sequenceable(read_blob(parcel, "sequenceable")?),
        Type::Union(_) => Value::Union(parcel.read_bytes(c_layout(ty).size)?.to_vec()),
        Type::Struct(s) => {
            let mut fields = Vec::with_capacity(s.fields.len());
            for field in &s.fields {
                fields.push(decode(&field.field_type, parcel)?);
            }
            Value::Struct(fields)
        }
        Type::List(l) => Value::List(decode_elements(&l.element_type, parcel)?),
        Type::Array(a) => Value::Array(decode_elements(&a.element_type, parcel)?),
    };
    Ok(value)
}

fn read_blob(parcel: &mut Parcel, what: &str) -> WireResult<Vec<u8>> {
    let len = parcel.read_u32()? as usize;
    if len > MAX_BUFF_SIZE {
        return Err(WireError::InvalidParameter(format!("{} length {} is invalid data", what, len)));
    }
    Ok(parcel.read_bytes(len)?.to_vec())
}

/* Empty structs and unions still occupy a slot per element */
fn element_limit(element: &Type) -> usize {
    MAX_BUFF_SIZE / c_layout(element).size.max(1)
}

/// The count is bounded by `MAX_BUFF_SIZE / sizeof(element)` before any
/// slot is reserved; a rejected count leaves the parcel's reservation
/// untouched.
fn decode_elements(element: &Type, parcel: &mut Parcel) -> WireResult<Vec<Value>> {
    let count = parcel.read_u32()? as usize;
    let limit = element_limit(element);
    if count > limit {
        debug!(count, limit, element = %element, "rejecting element count");
        return Err(WireError::InvalidParameter(format!(
            "count {} exceeds {} elements of {}",
            count, limit, element
        )));
    }
    let mut items = Vec::new();
    items
        .try_reserve_exact(count)
        .map_err(|_| WireError::MallocFailure { requested: count })?;
    parcel.reserved += count;
    for _ in 0..count {
        items.push(decode(element, parcel)?);
    }
    Ok(items)
}
