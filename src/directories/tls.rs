//! TLS Directory: Thread Local Storage template plus callback list, per
//! spec.md §4.9.

use crate::byteview::ByteView;
use crate::error::Result;
use crate::headers::section_header::SectionTable;
use crate::rva::resolve_va;

/// A live window onto the bitness-polymorphic TLS directory. Every pointer
/// field is the same width as the image (4 bytes for PE32, 8 for PE32+);
/// `SizeOfZeroFill` and `Characteristics` are always `u32`.
#[derive(Debug, Clone)]
pub struct TlsDirectory {
    buffer: ByteView,
    offset: usize,
    is_64bit: bool,
    sections: SectionTable,
}

impl TlsDirectory {
    pub(crate) fn new(
        buffer: ByteView,
        offset: usize,
        is_64bit: bool,
        sections: SectionTable,
    ) -> Self {
        Self {
            buffer,
            offset,
            is_64bit,
            sections,
        }
    }

    fn word_width(&self) -> usize {
        if self.is_64bit {
            8
        } else {
            4
        }
    }

    pub fn start_address_of_raw_data(&self) -> Result<u64> {
        self.buffer.read_uint(self.offset, self.is_64bit)
    }

    pub fn end_address_of_raw_data(&self) -> Result<u64> {
        self.buffer
            .read_uint(self.offset + self.word_width(), self.is_64bit)
    }

    pub fn address_of_index(&self) -> Result<u64> {
        self.buffer
            .read_uint(self.offset + 2 * self.word_width(), self.is_64bit)
    }

    pub fn address_of_callbacks(&self) -> Result<u64> {
        self.buffer
            .read_uint(self.offset + 3 * self.word_width(), self.is_64bit)
    }

    pub fn size_of_zero_fill(&self) -> Result<u32> {
        self.buffer.read_u32(self.offset + 4 * self.word_width())
    }

    pub fn characteristics(&self) -> Result<u32> {
        self.buffer
            .read_u32(self.offset + 4 * self.word_width() + 4)
    }

    /// Walks the null-terminated callback pointer array at
    /// `VA(AddressOfCallBacks)`, stopping at the first zero entry. Returns an
    /// empty sequence if `AddressOfCallBacks` is zero.
    pub fn callbacks(&self) -> Result<Vec<u64>> {
        let address = self.address_of_callbacks()?;
        if address == 0 {
            return Ok(Vec::new());
        }
        let mut table_offset = resolve_va(address, &self.sections)?;
        let width = self.word_width();

        let mut callbacks = Vec::new();
        loop {
            let value = self.buffer.read_uint(table_offset, self.is_64bit)?;
            if value == 0 {
                break;
            }
            callbacks.push(value);
            table_offset += width;
        }
        Ok(callbacks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headers::section_header::SectionHeader;

    fn one_section(buffer: &ByteView, image_base: u64) -> SectionTable {
        let header_offset = buffer.len();
        buffer.append(&[0u8; 40]);
        let header = SectionHeader::new(buffer.clone(), header_offset, image_base);
        header.set_virtual_address(0).unwrap();
        header.set_virtual_size(0x10000).unwrap();
        header.set_pointer_to_raw_data(0).unwrap();
        vec![header]
    }

    #[test]
    fn reads_32bit_fields_at_4_byte_stride() {
        let buffer = ByteView::new(vec![0u8; 0x100]);
        let sections = one_section(&buffer, 0x0040_0000);
        buffer.write_u32(0x00, 0x0040_1000).unwrap();
        buffer.write_u32(0x04, 0x0040_2000).unwrap();
        buffer.write_u32(0x08, 0x0040_3000).unwrap();
        buffer.write_u32(0x0C, 0).unwrap();
        buffer.write_u32(0x10, 0x40).unwrap();
        buffer.write_u32(0x14, 0x1).unwrap();

        let tls = TlsDirectory::new(buffer, 0, false, sections);
        assert_eq!(tls.start_address_of_raw_data().unwrap(), 0x0040_1000);
        assert_eq!(tls.size_of_zero_fill().unwrap(), 0x40);
        assert_eq!(tls.characteristics().unwrap(), 1);
        assert!(tls.callbacks().unwrap().is_empty());
    }

    #[test]
    fn callbacks_stop_at_first_zero() {
        let buffer = ByteView::new(vec![0u8; 0x200]);
        let image_base = 0x1_0000_0000u64;
        let sections = one_section(&buffer, image_base);

        let directory_offset = 0x18;
        // AddressOfCallBacks is the 4th pointer-sized field (offset + 24).
        buffer
            .write_u64(directory_offset + 24, image_base + 0x50)
            .unwrap();

        buffer.write_u64(0x50, image_base + 0x100).unwrap();
        buffer.write_u64(0x58, image_base + 0x200).unwrap();
        buffer.write_u64(0x60, 0).unwrap();

        let tls = TlsDirectory::new(buffer, directory_offset, true, sections);
        let callbacks = tls.callbacks().unwrap();
        assert_eq!(callbacks, vec![image_base + 0x100, image_base + 0x200]);
    }
}
