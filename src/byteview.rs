//! A shared, mutable byte buffer with endian-aware, bounds-checked typed
//! reads and writes.
//!
//! Every PE structure in this crate is a lightweight *view*: a
//! `(ByteView, base offset)` pair that borrows the same underlying buffer.
//! Cloning a [`ByteView`] is cheap (it clones an `Rc`, not the bytes), so
//! views can be constructed and discarded freely. All writes go through the
//! same buffer, so any two views over the same image observe each other's
//! mutations immediately — there is exactly one logical mutable resource
//! per [`crate::Image`].

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{Error, Result};

/// Shared mutable byte buffer backing a PE image.
#[derive(Debug, Clone)]
pub struct ByteView {
    inner: Rc<RefCell<Vec<u8>>>,
}

impl ByteView {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(bytes)),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_bounds(&self, offset: usize, width: usize) -> Result<()> {
        let buffer_len = self.len();
        match offset.checked_add(width) {
            Some(end) if end <= buffer_len => Ok(()),
            _ => Err(Error::bounds(offset, width, buffer_len)),
        }
    }

    pub fn read_u8(&self, offset: usize) -> Result<u8> {
        self.check_bounds(offset, 1)?;
        Ok(self.inner.borrow()[offset])
    }

    pub fn read_u16(&self, offset: usize) -> Result<u16> {
        self.check_bounds(offset, 2)?;
        let buf = self.inner.borrow();
        Ok(u16::from_le_bytes([buf[offset], buf[offset + 1]]))
    }

    pub fn read_u32(&self, offset: usize) -> Result<u32> {
        self.check_bounds(offset, 4)?;
        let buf = self.inner.borrow();
        Ok(u32::from_le_bytes([
            buf[offset],
            buf[offset + 1],
            buf[offset + 2],
            buf[offset + 3],
        ]))
    }

    pub fn read_u64(&self, offset: usize) -> Result<u64> {
        self.check_bounds(offset, 8)?;
        let buf = self.inner.borrow();
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&buf[offset..offset + 8]);
        Ok(u64::from_le_bytes(bytes))
    }

    /// Reads a pointer-sized (4 or 8 byte) value, used by the bitness-polymorphic
    /// Optional Header / TLS / Load Config views.
    pub fn read_uint(&self, offset: usize, is_64bit: bool) -> Result<u64> {
        if is_64bit {
            self.read_u64(offset)
        } else {
            self.read_u32(offset).map(u64::from)
        }
    }

    pub fn write_u8(&self, offset: usize, value: u8) -> Result<()> {
        self.check_bounds(offset, 1)?;
        self.inner.borrow_mut()[offset] = value;
        Ok(())
    }

    pub fn write_u16(&self, offset: usize, value: u16) -> Result<()> {
        self.check_bounds(offset, 2)?;
        let bytes = value.to_le_bytes();
        let mut buf = self.inner.borrow_mut();
        buf[offset..offset + 2].copy_from_slice(&bytes);
        Ok(())
    }

    pub fn write_u32(&self, offset: usize, value: u32) -> Result<()> {
        self.check_bounds(offset, 4)?;
        let bytes = value.to_le_bytes();
        let mut buf = self.inner.borrow_mut();
        buf[offset..offset + 4].copy_from_slice(&bytes);
        Ok(())
    }

    pub fn write_u64(&self, offset: usize, value: u64) -> Result<()> {
        self.check_bounds(offset, 8)?;
        let bytes = value.to_le_bytes();
        let mut buf = self.inner.borrow_mut();
        buf[offset..offset + 8].copy_from_slice(&bytes);
        Ok(())
    }

    pub fn write_uint(&self, offset: usize, value: u64, is_64bit: bool) -> Result<()> {
        if is_64bit {
            self.write_u64(offset, value)
        } else {
            self.write_u32(offset, value as u32)
        }
    }

    /// Extracts a copy of `length` bytes starting at `offset`.
    pub fn read_bytes(&self, offset: usize, length: usize) -> Result<Vec<u8>> {
        self.check_bounds(offset, length)?;
        let buf = self.inner.borrow();
        Ok(buf[offset..offset + length].to_vec())
    }

    pub fn write_bytes(&self, offset: usize, bytes: &[u8]) -> Result<()> {
        self.check_bounds(offset, bytes.len())?;
        let mut buf = self.inner.borrow_mut();
        buf[offset..offset + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    /// Reads a NUL-terminated ASCII string starting at `offset`. Halts at the
    /// first zero byte, or at the end of the buffer if none is found.
    pub fn read_ascii_cstring(&self, offset: usize) -> Result<String> {
        if offset > self.len() {
            return Err(Error::bounds(offset, 0, self.len()));
        }
        let buf = self.inner.borrow();
        let slice = &buf[offset..];
        let end = slice.iter().position(|&b| b == 0).unwrap_or(slice.len());
        Ok(String::from_utf8_lossy(&slice[..end]).into_owned())
    }

    /// Reads a UTF-16LE string of exactly `char_count` 16-bit code units
    /// starting at `offset`. Does not assume NUL termination.
    pub fn read_utf16le_string(&self, offset: usize, char_count: usize) -> Result<String> {
        let byte_len = char_count
            .checked_mul(2)
            .ok_or_else(|| Error::invalid_argument("utf16 character count overflows byte length"))?;
        self.check_bounds(offset, byte_len)?;
        let buf = self.inner.borrow();
        let units: Vec<u16> = buf[offset..offset + byte_len]
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        Ok(String::from_utf16_lossy(&units))
    }

    /// Removes `length` bytes starting at `offset`, shifting subsequent bytes
    /// down and shrinking the buffer.
    pub fn remove_range(&self, offset: usize, length: usize) -> Result<()> {
        self.check_bounds(offset, length)?;
        let mut buf = self.inner.borrow_mut();
        buf.drain(offset..offset + length);
        Ok(())
    }

    /// Appends bytes to the end of the buffer, e.g. when growing a section table.
    pub fn append(&self, bytes: &[u8]) {
        self.inner.borrow_mut().extend_from_slice(bytes);
    }

    /// Produces a snapshot of the current bytes, suitable for persisting to disk.
    pub fn snapshot(&self) -> Vec<u8> {
        self.inner.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read_roundtrips_every_width() {
        let view = ByteView::new(vec![0u8; 32]);
        view.write_u8(0, 0xAB).unwrap();
        assert_eq!(view.read_u8(0).unwrap(), 0xAB);

        view.write_u16(4, 0x1234).unwrap();
        assert_eq!(view.read_u16(4).unwrap(), 0x1234);

        view.write_u32(8, 0xDEADBEEF).unwrap();
        assert_eq!(view.read_u32(8).unwrap(), 0xDEADBEEF);

        view.write_u64(16, 0x0123_4567_89AB_CDEF).unwrap();
        assert_eq!(view.read_u64(16).unwrap(), 0x0123_4567_89AB_CDEF);
    }

    #[test]
    fn write_does_not_disturb_neighboring_bytes() {
        let view = ByteView::new(vec![0xFFu8; 16]);
        view.write_u32(4, 0).unwrap();
        let snapshot = view.snapshot();
        assert_eq!(&snapshot[0..4], &[0xFF, 0xFF, 0xFF, 0xFF]);
        assert_eq!(&snapshot[4..8], &[0, 0, 0, 0]);
        assert_eq!(&snapshot[8..16], &[0xFF; 8]);
    }

    #[test]
    fn read_at_end_minus_width_succeeds_one_past_fails() {
        let view = ByteView::new(vec![0u8; 8]);
        assert!(view.read_u32(4).is_ok());
        assert!(view.read_u32(5).is_err());
    }

    #[test]
    fn ascii_cstring_halts_at_first_zero() {
        let view = ByteView::new(b"GetProcAddress\0garbage".to_vec());
        assert_eq!(view.read_ascii_cstring(0).unwrap(), "GetProcAddress");
    }

    #[test]
    fn utf16le_does_not_assume_termination() {
        let text: Vec<u16> = "Version".encode_utf16().collect();
        let mut bytes = Vec::new();
        for unit in &text {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        bytes.extend_from_slice(&[0xAA, 0xAA]); // trailing garbage, no NUL
        let view = ByteView::new(bytes);
        assert_eq!(
            view.read_utf16le_string(0, text.len()).unwrap(),
            "Version"
        );
    }

    #[test]
    fn clones_share_the_same_buffer() {
        let view = ByteView::new(vec![0u8; 4]);
        let clone = view.clone();
        clone.write_u32(0, 42).unwrap();
        assert_eq!(view.read_u32(0).unwrap(), 42);
    }

    #[test]
    fn negative_offset_argument_is_rejected_by_caller_layer() {
        // ByteView itself takes usize offsets; negative offsets are rejected
        // one layer up, at the Image/view constructors that accept signed
        // RVAs or user-supplied indices. See `rva` module tests.
    }
}
