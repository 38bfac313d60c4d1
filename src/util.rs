/// Internal abstraction for types of outputs (slice vs Vec)
///
/// Note for all functions: we guarantee writing all the way up to the limit
pub trait OutputSink<ErrTy> {
    /// Add the given literal run to the output
    ///
    /// If this would overflow the output, return Err(ErrTy::OutputTooSmall).
    fn put_lits(&mut self, lits: &[u8]) -> Result<(), ErrTy>;
    /// Add a backreference to the output
    ///
    /// A `disp` of 0 means the current position minus 1.
    /// Increasing `disp` means further backwards
    ///
    /// Copy `len` bytes, which as usual for LZ77 may exceed `disp`.
    fn put_backref(&mut self, disp: usize, len: usize) -> Result<(), ErrTy>;
    /// Make room for `additional` more bytes before writing them
    ///
    /// Bounded outputs have nothing to do here; they fail once the limit is hit.
    fn reserve(&mut self, _additional: usize) -> Result<(), ErrTy> {
        Ok(())
    }
}

pub struct BufOutput<'a> {
    pub pos: usize,
    pub buf: &'a mut [u8],
}
impl<'a> From<&'a mut [u8]> for BufOutput<'a> {
    fn from(buf: &'a mut [u8]) -> Self {
        Self { pos: 0, buf }
    }
}

#[cfg(feature = "alloc")]
pub struct VecOutput {
    pub vec: alloc::vec::Vec<u8>,
}
#[cfg(feature = "alloc")]
impl From<alloc::vec::Vec<u8>> for VecOutput {
    fn from(vec: alloc::vec::Vec<u8>) -> Self {
        Self { vec }
    }
}

/// Number of distinct values a little-endian field of `nb_bytes` bytes can hold
///
/// Saturates at `usize::MAX` when the field is as wide as (or wider than) a `usize`.
pub fn field_range(nb_bytes: u8) -> usize {
    1usize.checked_shl(8 * nb_bytes as u32).unwrap_or(usize::MAX)
}

/// Little-endian bytes of `n`, truncated to `nb_bytes`
///
/// Callers guarantee `n` fits; upper bytes are dropped otherwise.
pub fn le_field(n: usize, nb_bytes: u8) -> ([u8; 8], usize) {
    debug_assert!(nb_bytes as usize <= 8);
    debug_assert!(nb_bytes >= 8 || (n as u64) >> (8 * nb_bytes as u32) == 0);
    ((n as u64).to_le_bytes(), nb_bytes as usize)
}

/// Read a little-endian field of up to 8 bytes
pub fn read_le_field(bytes: &[u8]) -> u64 {
    debug_assert!(bytes.len() <= 8);
    bytes
        .iter()
        .rev()
        .fold(0u64, |acc, &b| (acc << 8) | b as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_range() {
        assert_eq!(field_range(1), 256);
        assert_eq!(field_range(2), 65536);
        assert_eq!(field_range(3), 1 << 24);
        #[cfg(target_pointer_width = "64")]
        assert_eq!(field_range(8), usize::MAX);
    }

    #[test]
    fn test_le_field() {
        let (bytes, n) = le_field(0x0102, 2);
        assert_eq!(&bytes[..n], [0x02, 0x01]);

        let (bytes, n) = le_field(0x05, 3);
        assert_eq!(&bytes[..n], [0x05, 0x00, 0x00]);

        let (bytes, n) = le_field(0xff, 1);
        assert_eq!(&bytes[..n], [0xff]);
    }

    #[test]
    fn test_read_le_field() {
        assert_eq!(read_le_field(&[0x02, 0x01]), 0x0102);
        assert_eq!(read_le_field(&[0xff]), 0xff);
        assert_eq!(read_le_field(&[]), 0);
        assert_eq!(
            read_le_field(&[0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]),
            u64::MAX
        );
    }
}
