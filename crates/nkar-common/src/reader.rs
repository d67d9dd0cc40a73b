//! Cursor over an archive image.
//!
//! Offsets and lengths decoded from archive headers are untrusted. Every
//! cursor advance and every absolute range lookup goes through the checks
//! here, so callers can feed header fields straight in.

use byteorder::{ByteOrder, LittleEndian};
use zerocopy::FromBytes;

use crate::{Error, Result};

/// A little-endian cursor over a borrowed byte slice.
///
/// Reads borrow from the underlying slice; a failed read leaves the cursor
/// where it was.
///
/// # Example
///
/// ```
/// use nkar_common::BinaryReader;
///
/// let record = [0x50, 0x4b, 0x05, 0x06, 0x2a, 0x00];
/// let mut reader = BinaryReader::new(&record);
///
/// assert_eq!(reader.read_u32().unwrap(), 0x06054b50);
/// assert_eq!(reader.read_u16().unwrap(), 42);
/// assert!(reader.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct BinaryReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> BinaryReader<'a> {
    #[inline]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Start reading at an absolute offset, which may equal `data.len()`.
    pub fn new_at(data: &'a [u8], offset: u64) -> Result<Self> {
        let position = checked_end(offset, 0, data.len())?;
        Ok(Self { data, position })
    }

    #[inline]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Length of the whole slice, not of what is left.
    #[inline]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub const fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Take the next `count` bytes.
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        let available = self.remaining();
        if count > available {
            return Err(Error::UnexpectedEof {
                needed: count,
                available,
            });
        }
        let start = self.position;
        self.position += count;
        Ok(&self.data[start..self.position])
    }

    pub fn skip(&mut self, count: usize) -> Result<()> {
        self.read_bytes(count).map(drop)
    }

    #[inline]
    pub fn read_u16(&mut self) -> Result<u16> {
        self.read_bytes(2).map(LittleEndian::read_u16)
    }

    #[inline]
    pub fn read_u32(&mut self) -> Result<u32> {
        self.read_bytes(4).map(LittleEndian::read_u32)
    }

    /// Read `length` bytes as text. Invalid UTF-8 becomes U+FFFD.
    pub fn read_string_lossy(&mut self, length: usize) -> Result<String> {
        self.read_bytes(length)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    /// Copy a fixed-layout header out of the slice.
    pub fn read_struct<T: FromBytes>(&mut self) -> Result<T> {
        let size = std::mem::size_of::<T>();
        let bytes = self.read_bytes(size)?;
        T::read_from_bytes(bytes).map_err(|_| Error::UnexpectedEof {
            needed: size,
            available: bytes.len(),
        })
    }

    /// Borrow `length` bytes at absolute `offset`. The cursor is ignored.
    pub fn range(&self, offset: u64, length: u64) -> Result<&'a [u8]> {
        let end = checked_end(offset, length, self.data.len())?;
        // offset <= end <= len
        Ok(&self.data[offset as usize..end])
    }
}

fn checked_end(offset: u64, length: u64, buffer_len: usize) -> Result<usize> {
    offset
        .checked_add(length)
        .filter(|&end| end <= buffer_len as u64)
        .map(|end| end as usize)
        .ok_or(Error::OutOfBounds {
            offset,
            length,
            buffer_len,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use zerocopy::{Immutable, KnownLayout};

    #[derive(FromBytes, KnownLayout, Immutable)]
    #[repr(C, packed)]
    struct Pair {
        kind: u16,
        size: u32,
    }

    #[test]
    fn test_sequential_fields() {
        // signature, method, name length, name
        let record = [0x50, 0x4b, 0x01, 0x02, 0x08, 0x00, 0x03, 0x00, b'a', b'/', b'b'];
        let mut reader = BinaryReader::new(&record);

        assert_eq!(reader.read_u32().unwrap(), 0x02014b50);
        assert_eq!(reader.read_u16().unwrap(), 8);
        let name_len = reader.read_u16().unwrap() as usize;
        assert_eq!(reader.read_string_lossy(name_len).unwrap(), "a/b");
        assert!(reader.is_empty());
        assert_eq!(reader.len(), record.len());
    }

    #[test]
    fn test_read_struct() {
        let data = [0x01, 0x00, 0x10, 0x00, 0x00, 0x00, 0xEE];
        let mut reader = BinaryReader::new(&data);

        let pair: Pair = reader.read_struct().unwrap();
        let (kind, size) = (pair.kind, pair.size);
        assert_eq!((kind, size), (1, 16));
        assert_eq!(reader.remaining(), 1);
        assert!(reader.read_struct::<Pair>().is_err());
    }

    #[test]
    fn test_short_read_keeps_position() {
        let data = [0x01, 0x02];
        let mut reader = BinaryReader::new(&data);

        assert!(matches!(
            reader.read_u32(),
            Err(Error::UnexpectedEof {
                needed: 4,
                available: 2
            })
        ));
        assert!(reader.skip(3).is_err());
        assert_eq!(reader.position(), 0);
        reader.skip(2).unwrap();
        assert!(reader.is_empty());
    }

    #[test]
    fn test_range_bounds() {
        let data = [0u8, 1, 2, 3, 4, 5, 6, 7];
        let reader = BinaryReader::new(&data);

        assert_eq!(reader.range(2, 3).unwrap(), &[2, 3, 4]);
        assert_eq!(reader.range(8, 0).unwrap(), &[] as &[u8]);
        assert!(matches!(
            reader.range(6, 3),
            Err(Error::OutOfBounds { buffer_len: 8, .. })
        ));
        assert!(reader.range(u64::MAX, 2).is_err());
    }

    #[test]
    fn test_new_at() {
        let data = [0xAAu8, 0xBB, 0xCC];
        let mut reader = BinaryReader::new_at(&data, 1).unwrap();
        assert_eq!(reader.read_bytes(2).unwrap(), &[0xBB, 0xCC]);
        assert!(BinaryReader::new_at(&data, 3).unwrap().is_empty());
        assert!(BinaryReader::new_at(&data, 4).is_err());
    }

    #[test]
    fn test_lossy_names() {
        let data = [b'a', b'/', 0xFF, b'c'];
        let mut reader = BinaryReader::new(&data);
        assert_eq!(reader.read_string_lossy(4).unwrap(), "a/\u{FFFD}c");
    }
}
