//! A positioned reader over an in-memory page buffer.
//!
//! Pages are read off disk whole (see `page::fetch_page`) and every
//! downstream decode — cell headers, varints, record bodies — walks that
//! buffer through a `ByteCursor` rather than re-seeking the file per field.

use crate::error::DbError;
use crate::sql_data_types::VarInt;

#[derive(Debug)]
pub struct ByteCursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        ByteCursor { buf, pos: 0 }
    }

    pub fn at(buf: &'a [u8], pos: usize) -> Self {
        ByteCursor { buf, pos }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn seek(&mut self, pos: usize) {
        self.pos = pos;
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], DbError> {
        let end = self.pos + n;
        if end > self.buf.len() {
            return Err(DbError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!("expected {n} bytes at offset {}, buffer has {}", self.pos, self.buf.len()),
            )));
        }
        let slice = &self.buf[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    pub fn read_u8(&mut self) -> Result<u8, DbError> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, DbError> {
        Ok(u16::from_be_bytes(self.take(2)?.try_into().unwrap()))
    }

    pub fn read_u24(&mut self) -> Result<u32, DbError> {
        let bytes = self.take(3)?;
        Ok(u32::from_be_bytes([0, bytes[0], bytes[1], bytes[2]]))
    }

    pub fn read_u32(&mut self) -> Result<u32, DbError> {
        Ok(u32::from_be_bytes(self.take(4)?.try_into().unwrap()))
    }

    pub fn read_u48(&mut self) -> Result<u64, DbError> {
        let bytes = self.take(6)?;
        Ok(u64::from_be_bytes([
            0, 0, bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5],
        ]))
    }

    pub fn read_u64(&mut self) -> Result<u64, DbError> {
        Ok(u64::from_be_bytes(self.take(8)?.try_into().unwrap()))
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], DbError> {
        self.take(n)
    }

    /// Reads a varint at the current position and advances past it.
    pub fn read_varint(&mut self) -> Result<VarInt, DbError> {
        use crate::sql_data_types::VarIntError;

        let varint = VarInt::from_be_bytes(&self.buf[self.pos.min(self.buf.len())..]).map_err(
            |e| match e {
                VarIntError::Empty | VarIntError::Incomplete => DbError::Io(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "truncated varint",
                )),
                VarIntError::TooLong => DbError::MalformedRecord(e.to_string()),
            },
        )?;
        self.pos += varint.1 as usize;
        Ok(varint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_fixed_width_big_endian_integers() {
        let buf = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
        let mut cursor = ByteCursor::new(&buf);
        assert_eq!(cursor.read_u8().unwrap(), 0x01);
        cursor.seek(0);
        assert_eq!(cursor.read_u16().unwrap(), 0x0102);
        cursor.seek(0);
        assert_eq!(cursor.read_u32().unwrap(), 0x01020304);
        cursor.seek(0);
        assert_eq!(cursor.read_u64().unwrap(), 0x0102030405060708);
    }

    #[test]
    fn eof_is_an_io_error() {
        let buf = [0x00];
        let mut cursor = ByteCursor::new(&buf);
        assert!(cursor.read_u32().is_err());
    }

    #[test]
    fn varint_advances_cursor_by_its_own_width() {
        let buf = [0b1000_0001, 0b0000_0001, 0xFF];
        let mut cursor = ByteCursor::new(&buf);
        let v = cursor.read_varint().unwrap();
        assert_eq!(v.0, 129);
        assert_eq!(cursor.position(), 2);
    }
}
