/*
Payload, either table b-tree data or index b-tree keys, is always in the
"record format". A record contains a header and a body, in that order. The
header begins with a single varint which determines the total number of
bytes in the header, including the size varint itself. Following it are one
or more additional varints, one per column: the serial type numbers. The
values for each column in the record immediately follow the header, decoded
per their serial type.
*/

use crate::cursor::ByteCursor;
use crate::error::DbError;
use crate::sql_data_types::{SerialType, Value};

/// Decodes one record starting at the cursor's current position. Returns the
/// ordered column values and the number of bytes the whole record occupied.
pub fn decode_record(cursor: &mut ByteCursor) -> Result<(Vec<Value>, usize), DbError> {
    let start = cursor.position();

    let header_size = cursor.read_varint()?;
    let header_end = start + header_size.0 as usize;

    let mut serial_types = Vec::new();
    while cursor.position() < header_end {
        let varint = cursor.read_varint()?;
        serial_types.push(SerialType::from_varint(&varint));
    }

    let mut values = Vec::with_capacity(serial_types.len());
    for serial_type in serial_types {
        values.push(decode_value(cursor, serial_type)?);
    }

    Ok((values, cursor.position() - start))
}

fn decode_value(cursor: &mut ByteCursor, serial_type: SerialType) -> Result<Value, DbError> {
    match serial_type {
        SerialType::Null => Ok(Value::Null),
        SerialType::I8 => Ok(Value::Int(cursor.read_u8()? as i8 as i64)),
        SerialType::I16 => Ok(Value::Int(cursor.read_u16()? as i16 as i64)),
        SerialType::I24 => {
            let n = cursor.read_u24()?;
            let signed = ((n << 8) as i32) >> 8;
            Ok(Value::Int(signed as i64))
        }
        SerialType::I32 => Ok(Value::Int(cursor.read_u32()? as i32 as i64)),
        SerialType::I48 => {
            let n = cursor.read_u48()?;
            let signed = ((n << 16) as i64) >> 16;
            Ok(Value::Int(signed))
        }
        SerialType::I64 => Ok(Value::Int(cursor.read_u64()? as i64)),
        SerialType::F64 => Ok(Value::Float(f64::from_bits(cursor.read_u64()?))),
        SerialType::Zero => Ok(Value::Int(0)),
        SerialType::One => Ok(Value::Int(1)),
        SerialType::Reserved(code) => Err(DbError::MalformedRecord(format!(
            "reserved serial type {code} encountered"
        ))),
        SerialType::Blob(n) => Ok(Value::Blob(cursor.read_bytes(n as usize)?.to_vec())),
        SerialType::Text(n) => Ok(Value::Text(cursor.read_bytes(n as usize)?.to_vec())),
    }
}
