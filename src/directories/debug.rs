//! Debug Directory: an array of fixed records, plus the CodeView (RSDS) and
//! Extended DLL Characteristics subrecords, per spec.md §4.12.

use crate::byteview::ByteView;
use crate::enums::{DebugType, DllCharacteristics};
use crate::error::{Error, Result};
use crate::headers::section_header::SectionTable;
use crate::rva::resolve_rva;

pub const DEBUG_DIRECTORY_ENTRY_SIZE: usize = 28;
const RSDS_SIGNATURE: u32 = 0x5344_5352;

const CHARACTERISTICS_OFFSET: usize = 0x00;
const TIME_DATE_STAMP_OFFSET: usize = 0x04;
const MAJOR_VERSION_OFFSET: usize = 0x08;
const MINOR_VERSION_OFFSET: usize = 0x0A;
const TYPE_OFFSET: usize = 0x0C;
const SIZE_OF_DATA_OFFSET: usize = 0x10;
const ADDRESS_OF_RAW_DATA_OFFSET: usize = 0x14;
const POINTER_TO_RAW_DATA_OFFSET: usize = 0x18;

/// The CodeView v7 PDB subrecord ("RSDS"): a debug-record's `PointerToRawData`
/// for a [`DebugType::CodeView`] entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeViewRecord {
    pub signature: u32,
    pub guid: [u8; 16],
    pub age: u32,
    pub pdb_path: String,
}

/// A live window onto one 28-byte Debug Directory record.
#[derive(Debug, Clone)]
pub struct DebugDirectoryEntry {
    buffer: ByteView,
    offset: usize,
    sections: SectionTable,
}

impl DebugDirectoryEntry {
    pub fn characteristics(&self) -> Result<u32> {
        self.buffer.read_u32(self.offset + CHARACTERISTICS_OFFSET)
    }

    pub fn time_date_stamp(&self) -> Result<u32> {
        self.buffer.read_u32(self.offset + TIME_DATE_STAMP_OFFSET)
    }

    pub fn major_version(&self) -> Result<u16> {
        self.buffer.read_u16(self.offset + MAJOR_VERSION_OFFSET)
    }

    pub fn minor_version(&self) -> Result<u16> {
        self.buffer.read_u16(self.offset + MINOR_VERSION_OFFSET)
    }

    pub fn debug_type(&self) -> Result<DebugType> {
        Ok(DebugType::from_u32(
            self.buffer.read_u32(self.offset + TYPE_OFFSET)?,
        ))
    }

    pub fn size_of_data(&self) -> Result<u32> {
        self.buffer.read_u32(self.offset + SIZE_OF_DATA_OFFSET)
    }

    pub fn address_of_raw_data(&self) -> Result<u32> {
        self.buffer
            .read_u32(self.offset + ADDRESS_OF_RAW_DATA_OFFSET)
    }

    pub fn pointer_to_raw_data(&self) -> Result<u32> {
        self.buffer
            .read_u32(self.offset + POINTER_TO_RAW_DATA_OFFSET)
    }

    /// Parses the CodeView (RSDS) subrecord. Only meaningful when
    /// `debug_type() == DebugType::CodeView`; fails with **invalid-data** if
    /// the signature does not match "RSDS".
    pub fn code_view_record(&self) -> Result<CodeViewRecord> {
        let base = self.pointer_to_raw_data()? as usize;
        let signature = self.buffer.read_u32(base)?;
        if signature != RSDS_SIGNATURE {
            return Err(Error::invalid_data(
                "CodeView subrecord signature is not \"RSDS\"",
            ));
        }
        let mut guid = [0u8; 16];
        guid.copy_from_slice(&self.buffer.read_bytes(base + 4, 16)?);
        let age = self.buffer.read_u32(base + 20)?;
        let pdb_path = self.buffer.read_ascii_cstring(base + 24)?;
        Ok(CodeViewRecord {
            signature,
            guid,
            age,
            pdb_path,
        })
    }

    /// Parses the Extended DLL Characteristics subrecord: a single `u32`
    /// bit-flag set at `PointerToRawData`.
    pub fn extended_dll_characteristics(&self) -> Result<DllCharacteristics> {
        let base = self.pointer_to_raw_data()? as usize;
        let bits = self.buffer.read_u32(base)?;
        Ok(DllCharacteristics::from_bits_retain(bits as u16))
    }

    /// Resolves `AddressOfRawData` to a file offset, for callers that prefer
    /// to read via the RVA rather than `PointerToRawData` directly.
    pub fn resolve_raw_data_rva(&self) -> Result<usize> {
        resolve_rva(self.address_of_raw_data()?, &self.sections)
    }
}

/// A live window onto the whole Debug Directory: an array of 28-byte
/// records, count = `directory_size / 28`.
#[derive(Debug, Clone)]
pub struct DebugDirectory {
    buffer: ByteView,
    offset: usize,
    directory_size: u32,
    sections: SectionTable,
}

impl DebugDirectory {
    pub(crate) fn new(
        buffer: ByteView,
        offset: usize,
        directory_size: u32,
        sections: SectionTable,
    ) -> Self {
        Self {
            buffer,
            offset,
            directory_size,
            sections,
        }
    }

    pub fn count(&self) -> usize {
        self.directory_size as usize / DEBUG_DIRECTORY_ENTRY_SIZE
    }

    pub fn entries(&self) -> Vec<DebugDirectoryEntry> {
        (0..self.count())
            .map(|i| DebugDirectoryEntry {
                buffer: self.buffer.clone(),
                offset: self.offset + i * DEBUG_DIRECTORY_ENTRY_SIZE,
                sections: self.sections.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(directory_size: u32) -> DebugDirectoryEntry {
        let buffer = ByteView::new(vec![0u8; 0x200]);
        let directory = DebugDirectory::new(buffer, 0, directory_size, Vec::new());
        directory.entries().into_iter().next().unwrap()
    }

    #[test]
    fn count_is_directory_size_divided_by_record_size() {
        let buffer = ByteView::new(vec![0u8; 0x100]);
        let directory = DebugDirectory::new(buffer, 0, DEBUG_DIRECTORY_ENTRY_SIZE as u32 * 2, Vec::new());
        assert_eq!(directory.count(), 2);
        assert_eq!(directory.entries().len(), 2);
    }

    #[test]
    fn code_view_record_parses_rsds_subrecord() {
        let record = entry(DEBUG_DIRECTORY_ENTRY_SIZE as u32);
        record.buffer.write_u32(TYPE_OFFSET, DebugType::CodeView.to_u32()).unwrap();
        record.buffer.write_u32(POINTER_TO_RAW_DATA_OFFSET, 0x80).unwrap();

        record.buffer.write_u32(0x80, RSDS_SIGNATURE).unwrap();
        record.buffer.write_bytes(0x84, &[0xAAu8; 16]).unwrap();
        record.buffer.write_u32(0x94, 3).unwrap();
        let mut path = b"C:\\build\\app.pdb".to_vec();
        path.push(0);
        record.buffer.write_bytes(0x98, &path).unwrap();

        assert_eq!(record.debug_type().unwrap(), DebugType::CodeView);
        let cv = record.code_view_record().unwrap();
        assert_eq!(cv.age, 3);
        assert_eq!(cv.pdb_path, "C:\\build\\app.pdb");
        assert_eq!(cv.guid, [0xAAu8; 16]);
    }

    #[test]
    fn wrong_signature_is_invalid_data() {
        let record = entry(DEBUG_DIRECTORY_ENTRY_SIZE as u32);
        record.buffer.write_u32(POINTER_TO_RAW_DATA_OFFSET, 0x80).unwrap();
        record.buffer.write_u32(0x80, 0xDEAD_BEEF).unwrap();
        assert!(matches!(
            record.code_view_record(),
            Err(Error::InvalidData { .. })
        ));
    }

    #[test]
    fn extended_dll_characteristics_reads_bitflags() {
        let record = entry(DEBUG_DIRECTORY_ENTRY_SIZE as u32);
        record.buffer.write_u32(POINTER_TO_RAW_DATA_OFFSET, 0x80).unwrap();
        record
            .buffer
            .write_u32(0x80, DllCharacteristics::NX_COMPAT.bits() as u32)
            .unwrap();
        assert!(record
            .extended_dll_characteristics()
            .unwrap()
            .contains(DllCharacteristics::NX_COMPAT));
    }
}
