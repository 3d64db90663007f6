//! The Optional Header: present on every image file, polymorphic in
//! bitness. Bitness is decoded from the `Magic` field (0x10B = PE32, 0x20B
//! = PE32+, 0x107 = ROM) and then carried as a single `is_64bit` flag into
//! every bitness-dependent accessor — per spec.md §9's design note, this
//! crate avoids inheritance in favor of that flag.

use crate::byteview::ByteView;
use crate::enums::{DllCharacteristics, Subsystem};
use crate::error::{Error, Result};
use crate::headers::data_directory::DataDirectoryTable;

pub const MAGIC_PE32: u16 = 0x10B;
pub const MAGIC_PE32_PLUS: u16 = 0x20B;
pub const MAGIC_ROM: u16 = 0x107;

const MAGIC_OFFSET: usize = 0x00;
const MAJOR_LINKER_VERSION_OFFSET: usize = 0x02;
const MINOR_LINKER_VERSION_OFFSET: usize = 0x03;
const SIZE_OF_CODE_OFFSET: usize = 0x04;
const SIZE_OF_INITIALIZED_DATA_OFFSET: usize = 0x08;
const SIZE_OF_UNINITIALIZED_DATA_OFFSET: usize = 0x0C;
const ADDRESS_OF_ENTRY_POINT_OFFSET: usize = 0x10;
const BASE_OF_CODE_OFFSET: usize = 0x14;
const BASE_OF_DATA_OFFSET_PE32: usize = 0x18;

const MAJOR_OS_VERSION_OFFSET: usize = 0x28;
const MINOR_OS_VERSION_OFFSET: usize = 0x2A;
const MAJOR_IMAGE_VERSION_OFFSET: usize = 0x2C;
const MINOR_IMAGE_VERSION_OFFSET: usize = 0x2E;
const MAJOR_SUBSYSTEM_VERSION_OFFSET: usize = 0x30;
const MINOR_SUBSYSTEM_VERSION_OFFSET: usize = 0x32;
const WIN32_VERSION_VALUE_OFFSET: usize = 0x34;
const SIZE_OF_IMAGE_OFFSET: usize = 0x38;
const SIZE_OF_HEADERS_OFFSET: usize = 0x3C;
const CHECK_SUM_OFFSET: usize = 0x40;
const SUBSYSTEM_OFFSET: usize = 0x44;
const DLL_CHARACTERISTICS_OFFSET: usize = 0x46;

/// `NumberOfRvaAndSizes` offset and the Data Directory base offset are
/// bitness-dependent, computed by [`OptionalHeader::image_base_offset`] and
/// friends below.
impl OptionalHeader {
    fn image_base_offset(&self) -> usize {
        BASE_OF_DATA_OFFSET_PE32 // 0x18, same for both: PE32 has BaseOfData there, PE32+ has ImageBase there
    }

    fn post_image_base_offset(&self) -> usize {
        if self.is_64bit {
            0x18 + 8
        } else {
            0x18 + 4 + 4 // BaseOfData (4) + ImageBase (4)
        }
    }

    fn stack_heap_offset(&self) -> usize {
        0x48
    }

    fn loader_flags_offset(&self) -> usize {
        if self.is_64bit { 0x68 } else { 0x58 }
    }

    fn number_of_rva_and_sizes_offset(&self) -> usize {
        if self.is_64bit { 0x6C } else { 0x5C }
    }

    fn data_directory_offset(&self) -> usize {
        if self.is_64bit { 0x70 } else { 0x60 }
    }

    fn word_width(&self) -> usize {
        if self.is_64bit {
            8
        } else {
            4
        }
    }
}

/// A live window onto the bitness-polymorphic Optional Header.
#[derive(Debug, Clone)]
pub struct OptionalHeader {
    buffer: ByteView,
    offset: usize,
    is_64bit: bool,
}

impl OptionalHeader {
    pub(crate) fn new(buffer: ByteView, offset: usize, is_64bit: bool) -> Self {
        Self {
            buffer,
            offset,
            is_64bit,
        }
    }

    /// Probes the Magic field at `offset` to decide bitness without
    /// constructing a header first. Only `MAGIC_PE32_PLUS` selects the
    /// 64-bit layout; any other value (`MAGIC_PE32`, `MAGIC_ROM`, or
    /// garbage) is treated as PE32 rather than erroring.
    pub(crate) fn probe_is_64bit(buffer: &ByteView, offset: usize) -> Result<bool> {
        let magic = buffer.read_u16(offset + MAGIC_OFFSET)?;
        Ok(magic == MAGIC_PE32_PLUS)
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn is_64bit(&self) -> bool {
        self.is_64bit
    }

    pub fn magic(&self) -> Result<u16> {
        self.buffer.read_u16(self.offset + MAGIC_OFFSET)
    }

    pub fn set_magic(&self, value: u16) -> Result<()> {
        self.buffer.write_u16(self.offset + MAGIC_OFFSET, value)
    }

    pub fn major_linker_version(&self) -> Result<u8> {
        self.buffer.read_u8(self.offset + MAJOR_LINKER_VERSION_OFFSET)
    }

    pub fn set_major_linker_version(&self, value: u8) -> Result<()> {
        self.buffer
            .write_u8(self.offset + MAJOR_LINKER_VERSION_OFFSET, value)
    }

    pub fn minor_linker_version(&self) -> Result<u8> {
        self.buffer.read_u8(self.offset + MINOR_LINKER_VERSION_OFFSET)
    }

    pub fn set_minor_linker_version(&self, value: u8) -> Result<()> {
        self.buffer
            .write_u8(self.offset + MINOR_LINKER_VERSION_OFFSET, value)
    }

    pub fn size_of_code(&self) -> Result<u32> {
        self.buffer.read_u32(self.offset + SIZE_OF_CODE_OFFSET)
    }
    pub fn set_size_of_code(&self, value: u32) -> Result<()> {
        self.buffer.write_u32(self.offset + SIZE_OF_CODE_OFFSET, value)
    }

    pub fn size_of_initialized_data(&self) -> Result<u32> {
        self.buffer
            .read_u32(self.offset + SIZE_OF_INITIALIZED_DATA_OFFSET)
    }
    pub fn set_size_of_initialized_data(&self, value: u32) -> Result<()> {
        self.buffer
            .write_u32(self.offset + SIZE_OF_INITIALIZED_DATA_OFFSET, value)
    }

    pub fn size_of_uninitialized_data(&self) -> Result<u32> {
        self.buffer
            .read_u32(self.offset + SIZE_OF_UNINITIALIZED_DATA_OFFSET)
    }
    pub fn set_size_of_uninitialized_data(&self, value: u32) -> Result<()> {
        self.buffer
            .write_u32(self.offset + SIZE_OF_UNINITIALIZED_DATA_OFFSET, value)
    }

    pub fn address_of_entry_point(&self) -> Result<u32> {
        self.buffer
            .read_u32(self.offset + ADDRESS_OF_ENTRY_POINT_OFFSET)
    }
    pub fn set_address_of_entry_point(&self, value: u32) -> Result<()> {
        self.buffer
            .write_u32(self.offset + ADDRESS_OF_ENTRY_POINT_OFFSET, value)
    }

    pub fn base_of_code(&self) -> Result<u32> {
        self.buffer.read_u32(self.offset + BASE_OF_CODE_OFFSET)
    }
    pub fn set_base_of_code(&self, value: u32) -> Result<()> {
        self.buffer.write_u32(self.offset + BASE_OF_CODE_OFFSET, value)
    }

    /// PE32 only. Reading on PE32+ returns `None`.
    pub fn base_of_data(&self) -> Result<Option<u32>> {
        if self.is_64bit {
            Ok(None)
        } else {
            Ok(Some(
                self.buffer.read_u32(self.offset + BASE_OF_DATA_OFFSET_PE32)?,
            ))
        }
    }

    /// Writing `BaseOfData` on a PE32+ image is semantically forbidden: the
    /// field does not exist in that layout.
    pub fn set_base_of_data(&self, value: u32) -> Result<()> {
        if self.is_64bit {
            return Err(Error::invalid_operation(
                "BaseOfData does not exist on a PE32+ Optional Header",
            ));
        }
        self.buffer
            .write_u32(self.offset + BASE_OF_DATA_OFFSET_PE32, value)
    }

    pub fn image_base(&self) -> Result<u64> {
        self.buffer
            .read_uint(self.offset + self.image_base_offset(), self.is_64bit)
    }

    pub fn set_image_base(&self, value: u64) -> Result<()> {
        self.buffer
            .write_uint(self.offset + self.image_base_offset(), value, self.is_64bit)
    }

    pub fn section_alignment(&self) -> Result<u32> {
        self.buffer
            .read_u32(self.offset + self.post_image_base_offset())
    }
    pub fn set_section_alignment(&self, value: u32) -> Result<()> {
        self.buffer
            .write_u32(self.offset + self.post_image_base_offset(), value)
    }

    pub fn file_alignment(&self) -> Result<u32> {
        self.buffer
            .read_u32(self.offset + self.post_image_base_offset() + 4)
    }
    pub fn set_file_alignment(&self, value: u32) -> Result<()> {
        self.buffer
            .write_u32(self.offset + self.post_image_base_offset() + 4, value)
    }

    pub fn major_operating_system_version(&self) -> Result<u16> {
        self.buffer.read_u16(self.offset + MAJOR_OS_VERSION_OFFSET)
    }
    pub fn set_major_operating_system_version(&self, value: u16) -> Result<()> {
        self.buffer
            .write_u16(self.offset + MAJOR_OS_VERSION_OFFSET, value)
    }

    pub fn minor_operating_system_version(&self) -> Result<u16> {
        self.buffer.read_u16(self.offset + MINOR_OS_VERSION_OFFSET)
    }
    pub fn set_minor_operating_system_version(&self, value: u16) -> Result<()> {
        self.buffer
            .write_u16(self.offset + MINOR_OS_VERSION_OFFSET, value)
    }

    pub fn major_image_version(&self) -> Result<u16> {
        self.buffer.read_u16(self.offset + MAJOR_IMAGE_VERSION_OFFSET)
    }
    pub fn set_major_image_version(&self, value: u16) -> Result<()> {
        self.buffer
            .write_u16(self.offset + MAJOR_IMAGE_VERSION_OFFSET, value)
    }

    pub fn minor_image_version(&self) -> Result<u16> {
        self.buffer.read_u16(self.offset + MINOR_IMAGE_VERSION_OFFSET)
    }
    pub fn set_minor_image_version(&self, value: u16) -> Result<()> {
        self.buffer
            .write_u16(self.offset + MINOR_IMAGE_VERSION_OFFSET, value)
    }

    pub fn major_subsystem_version(&self) -> Result<u16> {
        self.buffer
            .read_u16(self.offset + MAJOR_SUBSYSTEM_VERSION_OFFSET)
    }
    pub fn set_major_subsystem_version(&self, value: u16) -> Result<()> {
        self.buffer
            .write_u16(self.offset + MAJOR_SUBSYSTEM_VERSION_OFFSET, value)
    }

    pub fn minor_subsystem_version(&self) -> Result<u16> {
        self.buffer
            .read_u16(self.offset + MINOR_SUBSYSTEM_VERSION_OFFSET)
    }
    pub fn set_minor_subsystem_version(&self, value: u16) -> Result<()> {
        self.buffer
            .write_u16(self.offset + MINOR_SUBSYSTEM_VERSION_OFFSET, value)
    }

    pub fn win32_version_value(&self) -> Result<u32> {
        self.buffer.read_u32(self.offset + WIN32_VERSION_VALUE_OFFSET)
    }
    pub fn set_win32_version_value(&self, value: u32) -> Result<()> {
        self.buffer
            .write_u32(self.offset + WIN32_VERSION_VALUE_OFFSET, value)
    }

    pub fn size_of_image(&self) -> Result<u32> {
        self.buffer.read_u32(self.offset + SIZE_OF_IMAGE_OFFSET)
    }
    pub fn set_size_of_image(&self, value: u32) -> Result<()> {
        self.buffer.write_u32(self.offset + SIZE_OF_IMAGE_OFFSET, value)
    }

    pub fn size_of_headers(&self) -> Result<u32> {
        self.buffer.read_u32(self.offset + SIZE_OF_HEADERS_OFFSET)
    }
    pub fn set_size_of_headers(&self, value: u32) -> Result<()> {
        self.buffer
            .write_u32(self.offset + SIZE_OF_HEADERS_OFFSET, value)
    }

    pub fn check_sum(&self) -> Result<u32> {
        self.buffer.read_u32(self.offset + CHECK_SUM_OFFSET)
    }
    pub fn set_check_sum(&self, value: u32) -> Result<()> {
        self.buffer.write_u32(self.offset + CHECK_SUM_OFFSET, value)
    }

    pub fn subsystem(&self) -> Result<Subsystem> {
        Ok(Subsystem::from_u16(
            self.buffer.read_u16(self.offset + SUBSYSTEM_OFFSET)?,
        ))
    }
    pub fn set_subsystem(&self, value: Subsystem) -> Result<()> {
        self.buffer
            .write_u16(self.offset + SUBSYSTEM_OFFSET, value.to_u16())
    }

    pub fn dll_characteristics(&self) -> Result<DllCharacteristics> {
        let bits = self.buffer.read_u16(self.offset + DLL_CHARACTERISTICS_OFFSET)?;
        Ok(DllCharacteristics::from_bits_retain(bits))
    }
    pub fn set_dll_characteristics(&self, value: DllCharacteristics) -> Result<()> {
        self.buffer
            .write_u16(self.offset + DLL_CHARACTERISTICS_OFFSET, value.bits())
    }

    pub fn size_of_stack_reserve(&self) -> Result<u64> {
        self.buffer
            .read_uint(self.offset + self.stack_heap_offset(), self.is_64bit)
    }
    pub fn set_size_of_stack_reserve(&self, value: u64) -> Result<()> {
        self.buffer
            .write_uint(self.offset + self.stack_heap_offset(), value, self.is_64bit)
    }

    pub fn size_of_stack_commit(&self) -> Result<u64> {
        self.buffer.read_uint(
            self.offset + self.stack_heap_offset() + self.word_width(),
            self.is_64bit,
        )
    }
    pub fn set_size_of_stack_commit(&self, value: u64) -> Result<()> {
        self.buffer.write_uint(
            self.offset + self.stack_heap_offset() + self.word_width(),
            value,
            self.is_64bit,
        )
    }

    pub fn size_of_heap_reserve(&self) -> Result<u64> {
        self.buffer.read_uint(
            self.offset + self.stack_heap_offset() + 2 * self.word_width(),
            self.is_64bit,
        )
    }
    pub fn set_size_of_heap_reserve(&self, value: u64) -> Result<()> {
        self.buffer.write_uint(
            self.offset + self.stack_heap_offset() + 2 * self.word_width(),
            value,
            self.is_64bit,
        )
    }

    pub fn size_of_heap_commit(&self) -> Result<u64> {
        self.buffer.read_uint(
            self.offset + self.stack_heap_offset() + 3 * self.word_width(),
            self.is_64bit,
        )
    }
    pub fn set_size_of_heap_commit(&self, value: u64) -> Result<()> {
        self.buffer.write_uint(
            self.offset + self.stack_heap_offset() + 3 * self.word_width(),
            value,
            self.is_64bit,
        )
    }

    pub fn loader_flags(&self) -> Result<u32> {
        self.buffer.read_u32(self.offset + self.loader_flags_offset())
    }
    pub fn set_loader_flags(&self, value: u32) -> Result<()> {
        self.buffer
            .write_u32(self.offset + self.loader_flags_offset(), value)
    }

    pub fn number_of_rva_and_sizes(&self) -> Result<u32> {
        self.buffer
            .read_u32(self.offset + self.number_of_rva_and_sizes_offset())
    }
    pub fn set_number_of_rva_and_sizes(&self, value: u32) -> Result<()> {
        self.buffer
            .write_u32(self.offset + self.number_of_rva_and_sizes_offset(), value)
    }

    pub fn data_directory(&self) -> DataDirectoryTable {
        DataDirectoryTable::new(self.buffer.clone(), self.offset + self.data_directory_offset())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pe32plus_buffer() -> ByteView {
        let mut bytes = vec![0u8; 0x70 + 16 * 8];
        bytes[0..2].copy_from_slice(&MAGIC_PE32_PLUS.to_le_bytes());
        ByteView::new(bytes)
    }

    fn pe32_buffer() -> ByteView {
        let mut bytes = vec![0u8; 0x60 + 16 * 8];
        bytes[0..2].copy_from_slice(&MAGIC_PE32.to_le_bytes());
        ByteView::new(bytes)
    }

    #[test]
    fn scenario_a_bitness_probe_and_entry_point() {
        let buffer = pe32plus_buffer();
        let header = OptionalHeader::new(buffer.clone(), 0, true);
        header.set_address_of_entry_point(0x1234).unwrap();
        assert!(OptionalHeader::probe_is_64bit(&buffer, 0).unwrap());
        assert_eq!(header.address_of_entry_point().unwrap(), 0x1234);
    }

    #[test]
    fn pe32_exposes_base_of_data_pe32_plus_does_not() {
        let pe32 = OptionalHeader::new(pe32_buffer(), 0, false);
        pe32.set_base_of_data(0x2000).unwrap();
        assert_eq!(pe32.base_of_data().unwrap(), Some(0x2000));

        let pe32p = OptionalHeader::new(pe32plus_buffer(), 0, true);
        assert_eq!(pe32p.base_of_data().unwrap(), None);
        assert!(matches!(
            pe32p.set_base_of_data(1),
            Err(Error::InvalidOperation { .. })
        ));
    }

    #[test]
    fn image_base_width_differs_by_bitness() {
        let pe32 = OptionalHeader::new(pe32_buffer(), 0, false);
        pe32.set_image_base(0x0040_0000).unwrap();
        assert_eq!(pe32.image_base().unwrap(), 0x0040_0000);

        let pe32p = OptionalHeader::new(pe32plus_buffer(), 0, true);
        pe32p.set_image_base(0x0001_4000_0000).unwrap();
        assert_eq!(pe32p.image_base().unwrap(), 0x0001_4000_0000);
    }

    #[test]
    fn data_directory_present_at_bitness_dependent_offset() {
        let pe32 = OptionalHeader::new(pe32_buffer(), 0, false);
        let dir = pe32.data_directory();
        dir.entry(crate::enums::DataDirectoryKind::Export)
            .set_virtual_address(0x3000)
            .unwrap();
        assert_eq!(
            pe32.data_directory()
                .entry(crate::enums::DataDirectoryKind::Export)
                .virtual_address()
                .unwrap(),
            0x3000
        );

        let pe32p = OptionalHeader::new(pe32plus_buffer(), 0, true);
        let dir = pe32p.data_directory();
        dir.entry(crate::enums::DataDirectoryKind::Export)
            .set_virtual_address(0x4000)
            .unwrap();
        assert_eq!(
            pe32p
                .data_directory()
                .entry(crate::enums::DataDirectoryKind::Export)
                .virtual_address()
                .unwrap(),
            0x4000
        );
    }

    #[test]
    fn number_of_rva_and_sizes_below_16_still_exposes_16_slots() {
        let pe32 = OptionalHeader::new(pe32_buffer(), 0, false);
        pe32.set_number_of_rva_and_sizes(2).unwrap();
        let entries = pe32.data_directory().entries();
        assert_eq!(entries.len(), 16);
        // slot 15 reads as zero, but does not error.
        assert_eq!(entries[15].virtual_address().unwrap(), 0);
    }
}
