//! Signature scanning.

/// Offsets of `needle` in `haystack`, rightmost first.
///
/// Trailer discovery walks candidates from the end of the file, so the
/// iterator yields them in that order.
pub fn rfind_iter<'a>(needle: &'a [u8], haystack: &'a [u8]) -> impl Iterator<Item = usize> + 'a {
    memchr::memmem::rfind_iter(haystack, needle)
}
