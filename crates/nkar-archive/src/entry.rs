//! Archive entry metadata.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::zip::CompressionMethod;
use crate::{Error, Result};

/// Whether an entry names a file or a directory marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EntryKind {
    File,
    Directory,
}

/// An entry (member) within an archive.
///
/// This contains metadata about the member, not the data itself.
/// Use [`Archive::read`](crate::Archive::read) to get the contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Forward-slash path within the archive.
    name: String,
    /// Raw compression method code.
    compression: u16,
    /// Compressed size in bytes.
    compressed_size: u64,
    /// Uncompressed size in bytes.
    uncompressed_size: u64,
    /// Absolute offset of the payload (past the local header).
    data_offset: u64,
    /// CRC32 checksum of uncompressed data.
    crc32: u32,
    /// Whether general purpose bit 0 is set.
    encrypted: bool,
    /// Last modification, seconds since the Unix epoch.
    modified: u64,
}

impl ArchiveEntry {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        name: String,
        compression: u16,
        compressed_size: u64,
        uncompressed_size: u64,
        data_offset: u64,
        crc32: u32,
        encrypted: bool,
        dos_datetime: u32,
    ) -> Self {
        Self {
            name,
            compression,
            compressed_size,
            uncompressed_size,
            data_offset,
            crc32,
            encrypted,
            modified: dos_datetime_to_unix(dos_datetime).unwrap_or(0),
        }
    }

    /// Get the entry name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the raw compression method code.
    #[inline]
    pub fn compression(&self) -> u16 {
        self.compression
    }

    /// Get the compression method, failing for codes this crate cannot decode.
    pub fn compression_method(&self) -> Result<CompressionMethod> {
        CompressionMethod::try_from(self.compression).map_err(Error::UnsupportedCompression)
    }

    /// Get the compressed size in bytes.
    #[inline]
    pub fn compressed_size(&self) -> u64 {
        self.compressed_size
    }

    /// Get the uncompressed size in bytes.
    #[inline]
    pub fn uncompressed_size(&self) -> u64 {
        self.uncompressed_size
    }

    /// Get the absolute offset of the entry's payload.
    #[inline]
    pub fn data_offset(&self) -> u64 {
        self.data_offset
    }

    /// Get the CRC32 checksum.
    #[inline]
    pub fn crc32(&self) -> u32 {
        self.crc32
    }

    /// Check if the entry is encrypted.
    #[inline]
    pub fn is_encrypted(&self) -> bool {
        self.encrypted
    }

    /// Last modification time as seconds since the Unix epoch.
    ///
    /// DOS timestamps carry no time zone and are read as UTC. Invalid
    /// timestamps map to 0.
    #[inline]
    pub fn modified_unix(&self) -> u64 {
        self.modified
    }

    /// Last modification time as a `SystemTime`.
    pub fn modified(&self) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(self.modified)
    }

    /// Check if this entry represents a directory.
    #[inline]
    pub fn is_dir(&self) -> bool {
        self.name.ends_with('/')
    }

    /// Get the entry kind.
    #[inline]
    pub fn kind(&self) -> EntryKind {
        if self.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        }
    }
}

/// Convert DOS date/time format to seconds since the Unix epoch.
///
/// DOS date/time format:
/// - Time: bits 0-4 = seconds/2, bits 5-10 = minutes, bits 11-15 = hours
/// - Date: bits 16-20 = day, bits 21-24 = month, bits 25-31 = year-1980
pub(crate) fn dos_datetime_to_unix(datetime: u32) -> Option<u64> {
    let year = 1980 + ((datetime >> 25) & 0x7F) as i64;
    let month = ((datetime >> 21) & 0x0F) as i64;
    let day = ((datetime >> 16) & 0x1F) as i64;
    let hour = ((datetime >> 11) & 0x1F) as i64;
    let minute = ((datetime >> 5) & 0x3F) as i64;
    let second = ((datetime & 0x1F) * 2) as i64;

    if !(1..=12).contains(&month) || day < 1 || hour > 23 || minute > 59 || second > 59 {
        return None;
    }
    if day > days_in_month(year, month) {
        return None;
    }

    let days = days_from_civil(year, month, day);
    let secs = days * 86_400 + hour * 3_600 + minute * 60 + second;
    u64::try_from(secs).ok()
}

fn days_in_month(year: i64, month: i64) -> i64 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

fn is_leap_year(year: i64) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

/// Days between 1970-01-01 and the given proleptic Gregorian date.
fn days_from_civil(year: i64, month: i64, day: i64) -> i64 {
    let year = if month <= 2 { year - 1 } else { year };
    let era = year.div_euclid(400);
    let year_of_era = year - era * 400;
    let month_index = (month + 9) % 12;
    let day_of_year = (153 * month_index + 2) / 5 + day - 1;
    let day_of_era = year_of_era * 365 + year_of_era / 4 - year_of_era / 100 + day_of_year;
    era * 146_097 + day_of_era - 719_468
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dos(year: u32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> u32 {
        let date = ((year - 1980) << 9) | (month << 5) | day;
        let time = (hour << 11) | (minute << 5) | (second / 2);
        (date << 16) | time
    }

    fn entry(name: &str) -> ArchiveEntry {
        ArchiveEntry::new(name.to_string(), 0, 0, 0, 0, 0, false, 0)
    }

    #[test]
    fn test_dos_epoch() {
        assert_eq!(dos_datetime_to_unix(dos(1980, 1, 1, 0, 0, 0)), Some(315_532_800));
    }

    #[test]
    fn test_dos_datetime_conversion() {
        // 2016-03-01 12:34:56 UTC
        assert_eq!(
            dos_datetime_to_unix(dos(2016, 3, 1, 12, 34, 56)),
            Some(1_456_835_696)
        );
        // leap day
        assert_eq!(
            dos_datetime_to_unix(dos(2020, 2, 29, 0, 0, 0)),
            Some(1_582_934_400)
        );
    }

    #[test]
    fn test_invalid_dos_datetime() {
        assert_eq!(dos_datetime_to_unix(0), None);
        assert_eq!(dos_datetime_to_unix(dos(2019, 2, 29, 0, 0, 0)), None);
        assert_eq!(dos_datetime_to_unix(dos(2019, 13, 1, 0, 0, 0)), None);
        assert_eq!(entry("a").modified_unix(), 0);
    }

    #[test]
    fn test_is_dir() {
        assert!(entry("lib-scripting/").is_dir());
        assert_eq!(entry("lib-scripting/").kind(), EntryKind::Directory);
        assert!(!entry("lib-scripting/timer.js").is_dir());
        assert_eq!(entry("lib-scripting/timer.js").kind(), EntryKind::File);
    }

    #[test]
    fn test_compression_method() {
        let stored = entry("a");
        assert_eq!(stored.compression_method().unwrap(), CompressionMethod::Store);

        let bzip2 = ArchiveEntry::new("b".to_string(), 12, 0, 0, 0, 0, false, 0);
        assert!(matches!(
            bzip2.compression_method(),
            Err(Error::UnsupportedCompression(12))
        ));
    }
}
