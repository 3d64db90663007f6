//! The COFF File Header: 20 bytes, immediately following the PE signature.

use chrono::{DateTime, Utc};

use crate::byteview::ByteView;
use crate::enums::{FileCharacteristics, Machine};
use crate::error::Result;

pub const FILE_HEADER_SIZE: usize = 20;

const MACHINE_OFFSET: usize = 0x00;
const NUMBER_OF_SECTIONS_OFFSET: usize = 0x02;
const TIME_DATE_STAMP_OFFSET: usize = 0x04;
const POINTER_TO_SYMBOL_TABLE_OFFSET: usize = 0x08;
const NUMBER_OF_SYMBOLS_OFFSET: usize = 0x0C;
const SIZE_OF_OPTIONAL_HEADER_OFFSET: usize = 0x10;
const CHARACTERISTICS_OFFSET: usize = 0x12;

/// A live window onto the 20-byte COFF File Header.
#[derive(Debug, Clone)]
pub struct FileHeader {
    buffer: ByteView,
    offset: usize,
}

impl FileHeader {
    pub(crate) fn new(buffer: ByteView, offset: usize) -> Self {
        Self { buffer, offset }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn machine(&self) -> Result<Machine> {
        Ok(Machine::from_u16(
            self.buffer.read_u16(self.offset + MACHINE_OFFSET)?,
        ))
    }

    pub fn set_machine(&self, value: Machine) -> Result<()> {
        self.buffer
            .write_u16(self.offset + MACHINE_OFFSET, value.to_u16())
    }

    pub fn number_of_sections(&self) -> Result<u16> {
        self.buffer
            .read_u16(self.offset + NUMBER_OF_SECTIONS_OFFSET)
    }

    pub fn set_number_of_sections(&self, value: u16) -> Result<()> {
        self.buffer
            .write_u16(self.offset + NUMBER_OF_SECTIONS_OFFSET, value)
    }

    pub fn time_date_stamp(&self) -> Result<u32> {
        self.buffer.read_u32(self.offset + TIME_DATE_STAMP_OFFSET)
    }

    pub fn set_time_date_stamp(&self, value: u32) -> Result<()> {
        self.buffer
            .write_u32(self.offset + TIME_DATE_STAMP_OFFSET, value)
    }

    /// Decodes `time_date_stamp` to a UTC timestamp for display. The raw
    /// `u32` remains the source of truth for round-tripping.
    pub fn time_date_stamp_utc(&self) -> Result<Option<DateTime<Utc>>> {
        let raw = self.time_date_stamp()?;
        Ok(DateTime::from_timestamp(raw as i64, 0))
    }

    pub fn pointer_to_symbol_table(&self) -> Result<u32> {
        self.buffer
            .read_u32(self.offset + POINTER_TO_SYMBOL_TABLE_OFFSET)
    }

    pub fn set_pointer_to_symbol_table(&self, value: u32) -> Result<()> {
        self.buffer
            .write_u32(self.offset + POINTER_TO_SYMBOL_TABLE_OFFSET, value)
    }

    pub fn number_of_symbols(&self) -> Result<u32> {
        self.buffer.read_u32(self.offset + NUMBER_OF_SYMBOLS_OFFSET)
    }

    pub fn set_number_of_symbols(&self, value: u32) -> Result<()> {
        self.buffer
            .write_u32(self.offset + NUMBER_OF_SYMBOLS_OFFSET, value)
    }

    pub fn size_of_optional_header(&self) -> Result<u16> {
        self.buffer
            .read_u16(self.offset + SIZE_OF_OPTIONAL_HEADER_OFFSET)
    }

    pub fn set_size_of_optional_header(&self, value: u16) -> Result<()> {
        self.buffer
            .write_u16(self.offset + SIZE_OF_OPTIONAL_HEADER_OFFSET, value)
    }

    pub fn characteristics(&self) -> Result<FileCharacteristics> {
        let bits = self.buffer.read_u16(self.offset + CHARACTERISTICS_OFFSET)?;
        Ok(FileCharacteristics::from_bits_retain(bits))
    }

    pub fn set_characteristics(&self, value: FileCharacteristics) -> Result<()> {
        self.buffer
            .write_u16(self.offset + CHARACTERISTICS_OFFSET, value.bits())
    }

    pub fn is_exe(&self) -> Result<bool> {
        Ok(self
            .characteristics()?
            .contains(FileCharacteristics::EXECUTABLE_IMAGE))
    }

    pub fn is_dll(&self) -> Result<bool> {
        Ok(self.characteristics()?.contains(FileCharacteristics::DLL))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer() -> ByteView {
        ByteView::new(vec![0u8; FILE_HEADER_SIZE])
    }

    #[test]
    fn machine_and_characteristics_round_trip() {
        let header = FileHeader::new(buffer(), 0);
        header.set_machine(Machine::Amd64).unwrap();
        header
            .set_characteristics(
                FileCharacteristics::EXECUTABLE_IMAGE | FileCharacteristics::LARGE_ADDRESS_AWARE,
            )
            .unwrap();
        assert_eq!(header.machine().unwrap(), Machine::Amd64);
        assert!(header.is_exe().unwrap());
        assert!(!header.is_dll().unwrap());
    }

    #[test]
    fn dll_flag_is_independent_of_exe_flag() {
        let header = FileHeader::new(buffer(), 0);
        header
            .set_characteristics(FileCharacteristics::DLL | FileCharacteristics::EXECUTABLE_IMAGE)
            .unwrap();
        assert!(header.is_exe().unwrap());
        assert!(header.is_dll().unwrap());
    }
}
