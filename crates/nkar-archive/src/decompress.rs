//! Decompression of entry payloads.

use flate2::{Decompress, FlushDecompress, Status};

use crate::entry::ArchiveEntry;
use crate::zip::CompressionMethod;
use crate::{Error, Result};

/// Size of the input and output windows fed to the inflater per step.
const CHUNK_SIZE: usize = 16 * 1024;

/// Upper bound on how far DEFLATE can expand its input.
const MAX_DEFLATE_RATIO: usize = 1032;

/// Decompress an entry's payload.
///
/// `payload` must be exactly the entry's `compressed_size` bytes, taken
/// either from a resident archive image or from a positioned file read; the
/// result is the same either way. The output is checked against the
/// directory's size and CRC-32.
pub fn decompress_entry(entry: &ArchiveEntry, payload: &[u8]) -> Result<Vec<u8>> {
    if entry.is_encrypted() {
        return Err(Error::Encrypted(entry.name().to_string()));
    }

    let expected_size = usize::try_from(entry.uncompressed_size()).map_err(|_| {
        Error::Decompression(format!(
            "{} bytes does not fit in memory",
            entry.uncompressed_size()
        ))
    })?;

    let output = match entry.compression_method()? {
        CompressionMethod::Store => copy_stored(payload, expected_size)?,
        CompressionMethod::Deflate => inflate_sized(payload, expected_size)?,
    };

    let actual = crc32fast::hash(&output);
    if actual != entry.crc32() {
        return Err(Error::ChecksumMismatch {
            name: entry.name().to_string(),
            expected: entry.crc32(),
            actual,
        });
    }

    Ok(output)
}

/// Copy a stored payload.
pub fn copy_stored(payload: &[u8], expected_size: usize) -> Result<Vec<u8>> {
    if payload.len() != expected_size {
        return Err(Error::Decompression(format!(
            "stored entry size mismatch: expected {}, got {}",
            expected_size,
            payload.len()
        )));
    }
    Ok(payload.to_vec())
}

/// Inflate a raw DEFLATE stream that must expand to exactly `expected_size`
/// bytes and must end exactly at the end of `data`.
pub fn inflate_sized(data: &[u8], expected_size: usize) -> Result<Vec<u8>> {
    let mut inflater = Decompress::new(false);
    // the declared size is untrusted until the stream reaches it
    let mut output =
        Vec::with_capacity(expected_size.min(data.len().saturating_mul(MAX_DEFLATE_RATIO)));
    let mut chunk = vec![0u8; CHUNK_SIZE];

    loop {
        let consumed = inflater.total_in() as usize;
        let produced = inflater.total_out();
        let input_end = data.len().min(consumed + CHUNK_SIZE);

        let status = inflater
            .decompress(&data[consumed..input_end], &mut chunk, FlushDecompress::None)
            .map_err(|e| Error::Decompression(e.to_string()))?;

        let written = (inflater.total_out() - produced) as usize;
        output.extend_from_slice(&chunk[..written]);

        if output.len() > expected_size {
            return Err(Error::Decompression(format!(
                "stream expands past the declared {expected_size} bytes"
            )));
        }

        match status {
            Status::StreamEnd => break,
            Status::Ok | Status::BufError => {
                let progressed = inflater.total_in() as usize != consumed || written != 0;
                if !progressed {
                    return Err(Error::Decompression(format!(
                        "stream truncated after {} of {} input bytes",
                        consumed,
                        data.len()
                    )));
                }
            }
        }
    }

    let consumed = inflater.total_in() as usize;
    if consumed != data.len() {
        return Err(Error::Decompression(format!(
            "stream ended after {} of {} input bytes",
            consumed,
            data.len()
        )));
    }
    if output.len() != expected_size {
        return Err(Error::Decompression(format!(
            "size mismatch: expected {}, got {}",
            expected_size,
            output.len()
        )));
    }

    Ok(output)
}
