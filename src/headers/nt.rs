//! The NT Headers: the 4-byte PE signature, the COFF File Header, and the
//! bitness-polymorphic Optional Header, anchored at `DosHeader::e_lfanew`.

use crate::byteview::ByteView;
use crate::error::{Error, Result};
use crate::headers::file_header::{FileHeader, FILE_HEADER_SIZE};
use crate::headers::optional_header::OptionalHeader;

pub const PE_SIGNATURE: u32 = 0x0000_4550; // "PE\0\0"

const SIGNATURE_OFFSET: usize = 0x00;
const FILE_HEADER_OFFSET: usize = 0x04;
const OPTIONAL_HEADER_OFFSET: usize = FILE_HEADER_OFFSET + FILE_HEADER_SIZE; // 0x18

/// A live window onto the NT Headers, rooted at `e_lfanew`.
#[derive(Debug, Clone)]
pub struct NtHeaders {
    buffer: ByteView,
    offset: usize,
}

impl NtHeaders {
    /// Constructs a view over the NT headers at `offset`, probing the
    /// Optional Header's Magic field to determine bitness.
    pub(crate) fn new(buffer: ByteView, offset: usize) -> Result<Self> {
        // Touch the signature eagerly so malformed images fail fast at open
        // time rather than on first field access.
        buffer.read_u32(offset + SIGNATURE_OFFSET)?;
        Ok(Self { buffer, offset })
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn signature(&self) -> Result<u32> {
        self.buffer.read_u32(self.offset + SIGNATURE_OFFSET)
    }

    pub fn set_signature(&self, value: u32) -> Result<()> {
        self.buffer.write_u32(self.offset + SIGNATURE_OFFSET, value)
    }

    pub fn is_valid_signature(&self) -> Result<bool> {
        Ok(self.signature()? == PE_SIGNATURE)
    }

    pub fn file_header(&self) -> FileHeader {
        FileHeader::new(self.buffer.clone(), self.offset + FILE_HEADER_OFFSET)
    }

    /// Probes the Optional Header's Magic field and constructs the
    /// corresponding polymorphic view. Only `MAGIC_PE32_PLUS` selects the
    /// PE32+ (64-bit) layout; any other Magic, including `MAGIC_ROM`, is
    /// treated as PE32 — ROM images are out of scope (per spec.md's
    /// Non-goals) and share PE32's field offsets closely enough that no
    /// separate layout is needed.
    pub fn optional_header(&self) -> Result<OptionalHeader> {
        let is_64bit =
            OptionalHeader::probe_is_64bit(&self.buffer, self.offset + OPTIONAL_HEADER_OFFSET)?;
        Ok(OptionalHeader::new(
            self.buffer.clone(),
            self.offset + OPTIONAL_HEADER_OFFSET,
            is_64bit,
        ))
    }

    pub fn is_64bit(&self) -> Result<bool> {
        Ok(self.optional_header()?.is_64bit())
    }

    /// File offset one past the Optional Header, where the Section Header
    /// table begins, honoring `SizeOfOptionalHeader` rather than assuming the
    /// structural size of the decoded bitness (some linkers pad it).
    pub fn section_table_offset(&self) -> Result<usize> {
        let size_of_optional_header = self.file_header().size_of_optional_header()? as usize;
        let offset = self.offset + OPTIONAL_HEADER_OFFSET + size_of_optional_header;
        if offset > self.buffer.len() {
            return Err(Error::invalid_data(
                "SizeOfOptionalHeader places the section table past the end of the buffer",
            ));
        }
        Ok(offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headers::optional_header::MAGIC_PE32_PLUS;

    fn nt_buffer() -> ByteView {
        let mut bytes = vec![0u8; OPTIONAL_HEADER_OFFSET + 0x70 + 16 * 8];
        bytes[0..4].copy_from_slice(&PE_SIGNATURE.to_le_bytes());
        bytes[OPTIONAL_HEADER_OFFSET..OPTIONAL_HEADER_OFFSET + 2]
            .copy_from_slice(&MAGIC_PE32_PLUS.to_le_bytes());
        ByteView::new(bytes)
    }

    #[test]
    fn recognizes_pe_signature() {
        let nt = NtHeaders::new(nt_buffer(), 0).unwrap();
        assert!(nt.is_valid_signature().unwrap());
    }

    #[test]
    fn probes_bitness_through_to_optional_header() {
        let nt = NtHeaders::new(nt_buffer(), 0).unwrap();
        assert!(nt.is_64bit().unwrap());
        let opt = nt.optional_header().unwrap();
        assert!(opt.is_64bit());
    }

    #[test]
    fn section_table_offset_honors_size_of_optional_header() {
        let nt = NtHeaders::new(nt_buffer(), 0).unwrap();
        nt.file_header().set_size_of_optional_header(0xF0).unwrap();
        assert_eq!(
            nt.section_table_offset().unwrap(),
            OPTIONAL_HEADER_OFFSET + 0xF0
        );
    }
}
