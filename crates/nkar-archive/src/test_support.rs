//! In-memory ZIP writer for unit-test fixtures.

use std::io::Write;

use flate2::write::DeflateEncoder;
use flate2::Compression;

/// 1980-01-01 00:00:00, the earliest DOS timestamp.
pub(crate) const DOS_EPOCH: u32 = (1 << 5 | 1) << 16;

struct FixtureEntry {
    name: String,
    payload: Vec<u8>,
    method: u16,
    flags: u16,
    crc32: u32,
    uncompressed_size: u32,
    last_modified: u32,
    extra: Vec<u8>,
    comment: Vec<u8>,
}

/// Builds a byte-exact ZIP image entry by entry.
#[derive(Default)]
pub(crate) struct ArchiveBuilder {
    entries: Vec<FixtureEntry>,
    comment: Vec<u8>,
}

impl ArchiveBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn stored(self, name: &str, data: &[u8]) -> Self {
        self.raw(name, data.to_vec(), 0, data)
    }

    pub(crate) fn deflated(self, name: &str, data: &[u8]) -> Self {
        let compressed = deflate(data);
        self.raw(name, compressed, 8, data)
    }

    pub(crate) fn directory(self, name: &str) -> Self {
        self.stored(name, &[])
    }

    /// Add an entry with an explicit payload and method code. `original` is
    /// the uncompressed content used for the size and CRC fields.
    pub(crate) fn raw(
        mut self,
        name: &str,
        payload: Vec<u8>,
        method: u16,
        original: &[u8],
    ) -> Self {
        self.entries.push(FixtureEntry {
            name: name.to_string(),
            payload,
            method,
            flags: 0,
            crc32: crc32fast::hash(original),
            uncompressed_size: original.len() as u32,
            last_modified: DOS_EPOCH,
            extra: Vec::new(),
            comment: Vec::new(),
        });
        self
    }

    pub(crate) fn modified(mut self, dos_datetime: u32) -> Self {
        self.last_entry().last_modified = dos_datetime;
        self
    }

    pub(crate) fn encrypted(mut self) -> Self {
        self.last_entry().flags |= 1;
        self
    }

    pub(crate) fn crc32(mut self, crc32: u32) -> Self {
        self.last_entry().crc32 = crc32;
        self
    }

    /// Attach central-directory extra and comment fields to the last entry.
    pub(crate) fn annotate(mut self, extra: &[u8], comment: &[u8]) -> Self {
        let entry = self.last_entry();
        entry.extra = extra.to_vec();
        entry.comment = comment.to_vec();
        self
    }

    pub(crate) fn comment(mut self, comment: &[u8]) -> Self {
        self.comment = comment.to_vec();
        self
    }

    fn last_entry(&mut self) -> &mut FixtureEntry {
        self.entries.last_mut().expect("builder has no entries")
    }

    pub(crate) fn build(&self) -> Vec<u8> {
        let mut out = Vec::new();
        let mut local_offsets = Vec::with_capacity(self.entries.len());

        for entry in &self.entries {
            local_offsets.push(out.len() as u32);
            put_u32(&mut out, 0x04034b50);
            put_u16(&mut out, 20);
            put_u16(&mut out, entry.flags);
            put_u16(&mut out, entry.method);
            put_u32(&mut out, entry.last_modified);
            put_u32(&mut out, entry.crc32);
            put_u32(&mut out, entry.payload.len() as u32);
            put_u32(&mut out, entry.uncompressed_size);
            put_u16(&mut out, entry.name.len() as u16);
            put_u16(&mut out, 0);
            out.extend_from_slice(entry.name.as_bytes());
            out.extend_from_slice(&entry.payload);
        }

        let cd_offset = out.len() as u32;
        for (entry, local_offset) in self.entries.iter().zip(local_offsets) {
            put_u32(&mut out, 0x02014b50);
            put_u16(&mut out, 20);
            put_u16(&mut out, 20);
            put_u16(&mut out, entry.flags);
            put_u16(&mut out, entry.method);
            put_u32(&mut out, entry.last_modified);
            put_u32(&mut out, entry.crc32);
            put_u32(&mut out, entry.payload.len() as u32);
            put_u32(&mut out, entry.uncompressed_size);
            put_u16(&mut out, entry.name.len() as u16);
            put_u16(&mut out, entry.extra.len() as u16);
            put_u16(&mut out, entry.comment.len() as u16);
            put_u16(&mut out, 0);
            put_u16(&mut out, 0);
            put_u32(&mut out, 0);
            put_u32(&mut out, local_offset);
            out.extend_from_slice(entry.name.as_bytes());
            out.extend_from_slice(&entry.extra);
            out.extend_from_slice(&entry.comment);
        }
        let cd_size = out.len() as u32 - cd_offset;

        put_u32(&mut out, 0x06054b50);
        put_u16(&mut out, 0);
        put_u16(&mut out, 0);
        put_u16(&mut out, self.entries.len() as u16);
        put_u16(&mut out, self.entries.len() as u16);
        put_u32(&mut out, cd_size);
        put_u32(&mut out, cd_offset);
        put_u16(&mut out, self.comment.len() as u16);
        out.extend_from_slice(&self.comment);
        out
    }
}

pub(crate) fn deflate(data: &[u8]) -> Vec<u8> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Deterministic, mildly compressible test content.
pub(crate) fn sample_payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| b"nkar-payload-"[i % 13] ^ (i / 97) as u8).collect()
}

pub(crate) fn put_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_le_bytes());
}

pub(crate) fn put_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}
