// -----------------------------------------------------------------------------
// Fixed-offset cursor over raw account data.
//
// Every read is bounds-checked and reports the offset it was attempted at, so a
// stale or foreign account surfaces as a `LayoutError` rather than a panic.
// -----------------------------------------------------------------------------

use solana_program::hash::hashv;
use solana_program::pubkey::Pubkey;

use crate::error::LayoutError;

pub const PUBKEY_LEN: usize = 32;
pub const DISCRIMINATOR_LEN: usize = 8;
pub const LENGTH_PREFIX_LEN: usize = 4;

/// Anchor account discriminator: `sha256("account:<name>")[..8]`.
pub fn account_discriminator(name: &str) -> [u8; DISCRIMINATOR_LEN] {
    sighash("account", name)
}

/// Anchor instruction discriminator: `sha256("global:<name>")[..8]`.
pub fn instruction_discriminator(name: &str) -> [u8; DISCRIMINATOR_LEN] {
    sighash("global", name)
}

fn sighash(namespace: &str, name: &str) -> [u8; DISCRIMINATOR_LEN] {
    let hash = hashv(&[namespace.as_bytes(), b":", name.as_bytes()]);
    let mut out = [0u8; DISCRIMINATOR_LEN];
    out.copy_from_slice(&hash.to_bytes()[..DISCRIMINATOR_LEN]);
    out
}

#[derive(Debug, Clone)]
pub struct LayoutReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> LayoutReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    /// Starts the cursor at an absolute offset. Nothing is checked until the first read.
    pub fn at(data: &'a [u8], offset: usize) -> Self {
        Self { data, offset }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.offset)
    }

    fn take(&mut self, needed: usize) -> Result<&'a [u8], LayoutError> {
        let truncated = LayoutError::TruncatedBuffer {
            offset: self.offset,
            needed,
            len: self.data.len(),
        };
        let end = self.offset.checked_add(needed).ok_or(truncated.clone())?;
        let bytes = self.data.get(self.offset..end).ok_or(truncated)?;
        self.offset = end;
        Ok(bytes)
    }

    pub fn read_bytes<const N: usize>(&mut self) -> Result<[u8; N], LayoutError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn read_pubkey(&mut self) -> Result<Pubkey, LayoutError> {
        Ok(Pubkey::new_from_array(self.read_bytes::<PUBKEY_LEN>()?))
    }

    pub fn read_u8(&mut self) -> Result<u8, LayoutError> {
        Ok(self.take(1)?[0])
    }

    /// Reads a one-byte value stored in a wider slot. Only the first byte is
    /// meaningful; the rest of the slot is consumed and discarded.
    pub fn read_u8_padded(&mut self, width: usize) -> Result<u8, LayoutError> {
        let slot = self.take(width.max(1))?;
        Ok(slot[0])
    }

    pub fn read_u32_le(&mut self) -> Result<u32, LayoutError> {
        Ok(u32::from_le_bytes(self.read_bytes::<4>()?))
    }

    pub fn read_u64_le(&mut self) -> Result<u64, LayoutError> {
        Ok(u64::from_le_bytes(self.read_bytes::<8>()?))
    }

    pub fn read_u128_le(&mut self) -> Result<u128, LayoutError> {
        Ok(u128::from_le_bytes(self.read_bytes::<16>()?))
    }

    pub fn skip(&mut self, n: usize) -> Result<(), LayoutError> {
        self.take(n).map(|_| ())
    }

    /// Reads the 4-byte little-endian element count of a borsh `Vec`.
    pub fn read_length_prefixed_count(&mut self) -> Result<usize, LayoutError> {
        Ok(self.read_u32_le()? as usize)
    }
}

/// Append-only counterpart of [`LayoutReader`], used to produce canonical buffers.
#[derive(Debug, Default, Clone)]
pub struct LayoutWriter {
    buf: Vec<u8>,
}

impl LayoutWriter {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn write_pubkey(&mut self, key: &Pubkey) {
        self.buf.extend_from_slice(key.as_ref());
    }

    /// Writes `value` into a `width`-byte slot, zero filling the padding.
    pub fn write_u8_padded(&mut self, value: u8, width: usize) {
        self.buf.push(value);
        self.write_zeros(width.saturating_sub(1));
    }

    pub fn write_u32_le(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_u64_le(&mut self, value: u64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_u128_le(&mut self, value: u128) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_zeros(&mut self, n: usize) {
        self.buf.resize(self.buf.len() + n, 0);
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_advance_cursor() {
        let mut data = vec![7u8; 32];
        data.extend_from_slice(&42u64.to_le_bytes());
        data.extend_from_slice(&(u128::MAX - 1).to_le_bytes());
        data.push(9);

        let mut reader = LayoutReader::new(&data);
        assert_eq!(reader.read_pubkey().unwrap(), Pubkey::new_from_array([7u8; 32]));
        assert_eq!(reader.offset(), 32);
        assert_eq!(reader.read_u64_le().unwrap(), 42);
        assert_eq!(reader.read_u128_le().unwrap(), u128::MAX - 1);
        assert_eq!(reader.read_u8().unwrap(), 9);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_truncated_read_reports_offset_and_length() {
        let data = [0u8; 10];
        let mut reader = LayoutReader::new(&data);
        reader.skip(4).unwrap();

        let err = reader.read_u64_le().unwrap_err();
        assert_eq!(
            err,
            LayoutError::TruncatedBuffer {
                offset: 4,
                needed: 8,
                len: 10
            }
        );
        // A failed read leaves the cursor where it was.
        assert_eq!(reader.offset(), 4);
    }

    #[test]
    fn test_cursor_past_end_is_truncated_not_panic() {
        let data = [1u8; 4];
        let mut reader = LayoutReader::at(&data, 100);
        assert!(matches!(
            reader.read_u8(),
            Err(LayoutError::TruncatedBuffer { offset: 100, .. })
        ));

        let mut reader = LayoutReader::at(&data, usize::MAX);
        assert!(reader.skip(1).is_err());
    }

    #[test]
    fn test_padded_u8_discards_padding() {
        let data = [6u8, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 3];
        let mut reader = LayoutReader::new(&data);
        assert_eq!(reader.read_u8_padded(8).unwrap(), 6);
        assert_eq!(reader.read_u8().unwrap(), 3);
    }

    #[test]
    fn test_length_prefixed_count() {
        let mut data = 3u32.to_le_bytes().to_vec();
        data.extend_from_slice(&[0u8; 2]);
        let mut reader = LayoutReader::new(&data);
        assert_eq!(reader.read_length_prefixed_count().unwrap(), 3);
        assert_eq!(reader.offset(), LENGTH_PREFIX_LEN);
    }

    #[test]
    fn test_writer_mirrors_reader() {
        let key = Pubkey::new_unique();
        let mut writer = LayoutWriter::with_capacity(64);
        writer.write_pubkey(&key);
        writer.write_u8_padded(6, 8);
        writer.write_u32_le(5);
        writer.write_u64_le(u64::MAX);
        let data = writer.into_inner();
        assert_eq!(data.len(), 32 + 8 + 4 + 8);

        let mut reader = LayoutReader::new(&data);
        assert_eq!(reader.read_pubkey().unwrap(), key);
        assert_eq!(reader.read_u8_padded(8).unwrap(), 6);
        assert_eq!(reader.read_u32_le().unwrap(), 5);
        assert_eq!(reader.read_u64_le().unwrap(), u64::MAX);
    }

    #[test]
    fn test_known_instruction_discriminators() {
        assert_eq!(
            instruction_discriminator("deposit"),
            [242, 35, 198, 137, 82, 225, 242, 182]
        );
        assert_eq!(
            instruction_discriminator("withdraw"),
            [183, 18, 70, 156, 148, 109, 161, 34]
        );
    }
}
