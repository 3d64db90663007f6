//! Section header view and vector.
//!
//! The basic unit of code or data within a PE file. All the raw data in a
//! section is contiguous on disk; its in-memory placement, once loaded, can
//! differ (`virtual_address` vs `pointer_to_raw_data`). A PE image always
//! carries a flat array of fixed 40-byte records immediately following the
//! Optional Header.

use crate::byteview::ByteView;
use crate::enums::section_flags::SectionCharacteristics;
use crate::error::Result;

pub const SECTION_HEADER_SIZE: usize = 40;

const NAME_OFFSET: usize = 0x00;
const VIRTUAL_SIZE_OFFSET: usize = 0x08;
const VIRTUAL_ADDRESS_OFFSET: usize = 0x0C;
const SIZE_OF_RAW_DATA_OFFSET: usize = 0x10;
const POINTER_TO_RAW_DATA_OFFSET: usize = 0x14;
const POINTER_TO_RELOCATIONS_OFFSET: usize = 0x18;
const POINTER_TO_LINENUMBERS_OFFSET: usize = 0x1C;
const NUMBER_OF_RELOCATIONS_OFFSET: usize = 0x20;
const NUMBER_OF_LINENUMBERS_OFFSET: usize = 0x22;
const CHARACTERISTICS_OFFSET: usize = 0x24;

/// A live window onto one 40-byte section-header record.
///
/// Carries the image base alongside the raw record so that RVA-resolving
/// code can also resolve full virtual addresses without a second lookup —
/// a design choice called out explicitly in spec.md §4.2.
#[derive(Debug, Clone)]
pub struct SectionHeader {
    buffer: ByteView,
    offset: usize,
    image_base: u64,
}

impl SectionHeader {
    pub(crate) fn new(buffer: ByteView, offset: usize, image_base: u64) -> Self {
        Self {
            buffer,
            offset,
            image_base,
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn image_base(&self) -> u64 {
        self.image_base
    }

    /// The raw, zero-padded 8-byte name, not necessarily NUL-terminated.
    pub fn raw_name(&self) -> Result<[u8; 8]> {
        let bytes = self.buffer.read_bytes(self.offset + NAME_OFFSET, 8)?;
        let mut out = [0u8; 8];
        out.copy_from_slice(&bytes);
        Ok(out)
    }

    /// The name decoded as UTF-8, truncated at the first NUL if present.
    pub fn name(&self) -> Result<String> {
        let raw = self.raw_name()?;
        let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
        Ok(String::from_utf8_lossy(&raw[..end]).into_owned())
    }

    pub fn set_name(&self, name: &str) -> Result<()> {
        let mut bytes = [0u8; 8];
        let src = name.as_bytes();
        let len = src.len().min(8);
        bytes[..len].copy_from_slice(&src[..len]);
        self.buffer.write_bytes(self.offset + NAME_OFFSET, &bytes)
    }

    pub fn virtual_size(&self) -> Result<u32> {
        self.buffer.read_u32(self.offset + VIRTUAL_SIZE_OFFSET)
    }

    pub fn set_virtual_size(&self, value: u32) -> Result<()> {
        self.buffer.write_u32(self.offset + VIRTUAL_SIZE_OFFSET, value)
    }

    pub fn virtual_address(&self) -> Result<u32> {
        self.buffer.read_u32(self.offset + VIRTUAL_ADDRESS_OFFSET)
    }

    pub fn set_virtual_address(&self, value: u32) -> Result<()> {
        self.buffer
            .write_u32(self.offset + VIRTUAL_ADDRESS_OFFSET, value)
    }

    pub fn size_of_raw_data(&self) -> Result<u32> {
        self.buffer.read_u32(self.offset + SIZE_OF_RAW_DATA_OFFSET)
    }

    pub fn set_size_of_raw_data(&self, value: u32) -> Result<()> {
        self.buffer
            .write_u32(self.offset + SIZE_OF_RAW_DATA_OFFSET, value)
    }

    pub fn pointer_to_raw_data(&self) -> Result<u32> {
        self.buffer
            .read_u32(self.offset + POINTER_TO_RAW_DATA_OFFSET)
    }

    pub fn set_pointer_to_raw_data(&self, value: u32) -> Result<()> {
        self.buffer
            .write_u32(self.offset + POINTER_TO_RAW_DATA_OFFSET, value)
    }

    pub fn pointer_to_relocations(&self) -> Result<u32> {
        self.buffer
            .read_u32(self.offset + POINTER_TO_RELOCATIONS_OFFSET)
    }

    pub fn pointer_to_linenumbers(&self) -> Result<u32> {
        self.buffer
            .read_u32(self.offset + POINTER_TO_LINENUMBERS_OFFSET)
    }

    pub fn number_of_relocations(&self) -> Result<u16> {
        self.buffer
            .read_u16(self.offset + NUMBER_OF_RELOCATIONS_OFFSET)
    }

    pub fn number_of_linenumbers(&self) -> Result<u16> {
        self.buffer
            .read_u16(self.offset + NUMBER_OF_LINENUMBERS_OFFSET)
    }

    pub fn characteristics(&self) -> Result<SectionCharacteristics> {
        let bits = self.buffer.read_u32(self.offset + CHARACTERISTICS_OFFSET)?;
        Ok(SectionCharacteristics::from_bits_retain(bits))
    }

    pub fn set_characteristics(&self, value: SectionCharacteristics) -> Result<()> {
        self.buffer
            .write_u32(self.offset + CHARACTERISTICS_OFFSET, value.bits())
    }

    /// Whether `rva` falls within `[virtual_address, virtual_address + virtual_size)`.
    pub fn contains_rva(&self, rva: u32) -> Result<bool> {
        let start = self.virtual_address()?;
        let size = self.virtual_size()?;
        Ok(rva >= start && (rva as u64) < start as u64 + size as u64)
    }

    /// Re-encodes this record's current field values into a standalone
    /// 40-byte buffer, independent of the backing ByteView. Used when
    /// appending a freshly-built section header to the table.
    pub fn encode(&self) -> Result<[u8; SECTION_HEADER_SIZE]> {
        let mut out = [0u8; SECTION_HEADER_SIZE];
        out[0..8].copy_from_slice(&self.raw_name()?);
        out[8..12].copy_from_slice(&self.virtual_size()?.to_le_bytes());
        out[12..16].copy_from_slice(&self.virtual_address()?.to_le_bytes());
        out[16..20].copy_from_slice(&self.size_of_raw_data()?.to_le_bytes());
        out[20..24].copy_from_slice(&self.pointer_to_raw_data()?.to_le_bytes());
        out[24..28].copy_from_slice(&self.pointer_to_relocations()?.to_le_bytes());
        out[28..32].copy_from_slice(&self.pointer_to_linenumbers()?.to_le_bytes());
        out[32..34].copy_from_slice(&self.number_of_relocations()?.to_le_bytes());
        out[34..36].copy_from_slice(&self.number_of_linenumbers()?.to_le_bytes());
        out[36..40].copy_from_slice(&self.characteristics()?.bits().to_le_bytes());
        Ok(out)
    }

    /// Encodes a section header record directly from field values, without
    /// an existing buffer window to read from. Used when synthesizing a new
    /// section to append to the table.
    #[allow(clippy::too_many_arguments)]
    pub fn encode_record(
        name: &str,
        virtual_size: u32,
        virtual_address: u32,
        size_of_raw_data: u32,
        pointer_to_raw_data: u32,
        pointer_to_relocations: u32,
        pointer_to_linenumbers: u32,
        number_of_relocations: u16,
        number_of_linenumbers: u16,
        characteristics: SectionCharacteristics,
    ) -> [u8; SECTION_HEADER_SIZE] {
        let mut out = [0u8; SECTION_HEADER_SIZE];
        let name_bytes = name.as_bytes();
        let len = name_bytes.len().min(8);
        out[0..len].copy_from_slice(&name_bytes[..len]);
        out[8..12].copy_from_slice(&virtual_size.to_le_bytes());
        out[12..16].copy_from_slice(&virtual_address.to_le_bytes());
        out[16..20].copy_from_slice(&size_of_raw_data.to_le_bytes());
        out[20..24].copy_from_slice(&pointer_to_raw_data.to_le_bytes());
        out[24..28].copy_from_slice(&pointer_to_relocations.to_le_bytes());
        out[28..32].copy_from_slice(&pointer_to_linenumbers.to_le_bytes());
        out[32..34].copy_from_slice(&number_of_relocations.to_le_bytes());
        out[34..36].copy_from_slice(&number_of_linenumbers.to_le_bytes());
        out[36..40].copy_from_slice(&characteristics.bits().to_le_bytes());
        out
    }
}

/// An ordered sequence of section headers.
pub type SectionTable = Vec<SectionHeader>;

pub(crate) fn read_section_table(
    buffer: &ByteView,
    base_offset: usize,
    count: u16,
    image_base: u64,
) -> Result<SectionTable> {
    let mut sections = Vec::with_capacity(count as usize);
    for i in 0..count as usize {
        let offset = base_offset + i * SECTION_HEADER_SIZE;
        sections.push(SectionHeader::new(buffer.clone(), offset, image_base));
    }
    Ok(sections)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section_buffer() -> ByteView {
        ByteView::new(vec![0u8; SECTION_HEADER_SIZE])
    }

    #[test]
    fn name_without_terminator_is_full_8_bytes() {
        let buffer = section_buffer();
        let header = SectionHeader::new(buffer, 0, 0);
        header.set_name(".textxxx").unwrap();
        assert_eq!(header.name().unwrap(), ".textxxx");
    }

    #[test]
    fn name_with_terminator_truncates() {
        let buffer = section_buffer();
        let header = SectionHeader::new(buffer, 0, 0);
        header.set_name(".text").unwrap();
        assert_eq!(header.name().unwrap(), ".text");
        assert_eq!(header.raw_name().unwrap(), *b".text\0\0\0");
    }

    #[test]
    fn contains_rva_checks_half_open_range() {
        let buffer = section_buffer();
        let header = SectionHeader::new(buffer, 0, 0);
        header.set_virtual_address(0x1000).unwrap();
        header.set_virtual_size(0x200).unwrap();
        assert!(header.contains_rva(0x1000).unwrap());
        assert!(header.contains_rva(0x11FF).unwrap());
        assert!(!header.contains_rva(0x1200).unwrap());
        assert!(!header.contains_rva(0x0FFF).unwrap());
    }

    #[test]
    fn encode_round_trips_every_field() {
        let buffer = section_buffer();
        let header = SectionHeader::new(buffer, 0, 0);
        header.set_name(".data").unwrap();
        header.set_virtual_size(0x123).unwrap();
        header.set_virtual_address(0x2000).unwrap();
        header.set_size_of_raw_data(0x200).unwrap();
        header.set_pointer_to_raw_data(0x600).unwrap();
        header
            .set_characteristics(SectionCharacteristics::MEM_READ | SectionCharacteristics::MEM_WRITE)
            .unwrap();

        let encoded = header.encode().unwrap();
        let roundtrip_buffer = ByteView::new(encoded.to_vec());
        let roundtrip = SectionHeader::new(roundtrip_buffer, 0, 0);
        assert_eq!(roundtrip.name().unwrap(), ".data");
        assert_eq!(roundtrip.virtual_address().unwrap(), 0x2000);
        assert_eq!(
            roundtrip.characteristics().unwrap(),
            SectionCharacteristics::MEM_READ | SectionCharacteristics::MEM_WRITE
        );
    }
}
