//! Import Directory and its delay-import variant, per spec.md §4.6.

use crate::byteview::ByteView;
use crate::error::Result;
use crate::headers::section_header::SectionTable;
use crate::rva::resolve_rva;

pub const IMPORT_DESCRIPTOR_SIZE: usize = 20;

const IMPORT_LOOKUP_TABLE_OFFSET: usize = 0x00;
const TIME_DATE_STAMP_OFFSET: usize = 0x04;
const FORWARDER_CHAIN_OFFSET: usize = 0x08;
const NAME_OFFSET: usize = 0x0C;
const IMPORT_ADDRESS_TABLE_OFFSET: usize = 0x10;

const ORDINAL_FLAG_32: u32 = 0x8000_0000;
const ORDINAL_FLAG_64: u64 = 0x8000_0000_0000_0000;

/// One imported function, resolved either by ordinal or by hint/name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportFunction {
    pub dll_name: String,
    pub name: String,
    pub hint: u16,
    pub ordinal: u32,
    /// `ImportAddressTable + index * W − IAT_directory_virtual_size`, per
    /// spec.md §4.6 — the slot's position relative to the IAT data-directory
    /// window rather than an absolute RVA.
    pub iat_slot_offset: i64,
}

/// A live window onto one 20-byte import descriptor.
#[derive(Debug, Clone)]
pub struct ImportDescriptor {
    buffer: ByteView,
    offset: usize,
    is_64bit: bool,
    iat_directory_size: u32,
    sections: SectionTable,
}

impl ImportDescriptor {
    pub(crate) fn new(
        buffer: ByteView,
        offset: usize,
        is_64bit: bool,
        iat_directory_size: u32,
        sections: SectionTable,
    ) -> Self {
        Self {
            buffer,
            offset,
            is_64bit,
            iat_directory_size,
            sections,
        }
    }

    pub fn import_lookup_table_rva(&self) -> Result<u32> {
        self.buffer
            .read_u32(self.offset + IMPORT_LOOKUP_TABLE_OFFSET)
    }

    pub fn time_date_stamp(&self) -> Result<u32> {
        self.buffer.read_u32(self.offset + TIME_DATE_STAMP_OFFSET)
    }

    pub fn forwarder_chain(&self) -> Result<u32> {
        self.buffer.read_u32(self.offset + FORWARDER_CHAIN_OFFSET)
    }

    pub fn name_rva(&self) -> Result<u32> {
        self.buffer.read_u32(self.offset + NAME_OFFSET)
    }

    pub fn import_address_table_rva(&self) -> Result<u32> {
        self.buffer
            .read_u32(self.offset + IMPORT_ADDRESS_TABLE_OFFSET)
    }

    pub fn dll_name(&self) -> Result<String> {
        let file_offset = resolve_rva(self.name_rva()?, &self.sections)?;
        self.buffer.read_ascii_cstring(file_offset)
    }

    /// True when all four RVA fields (ILT, ForwarderChain, Name, IAT) are
    /// zero — the descriptor marking the end of the table. `TimeDateStamp`
    /// is deliberately excluded from this check.
    pub fn is_terminator(&self) -> Result<bool> {
        Ok(self.import_lookup_table_rva()? == 0
            && self.forwarder_chain()? == 0
            && self.name_rva()? == 0
            && self.import_address_table_rva()? == 0)
    }

    /// Walks the lookup-table thunks (falling back to the address table if
    /// no lookup table is present), stopping at the first zero thunk.
    pub fn functions(&self) -> Result<Vec<ImportFunction>> {
        let thunk_width: usize = if self.is_64bit { 8 } else { 4 };
        let lookup_rva = self.import_lookup_table_rva()?;
        let thunk_table_rva = if lookup_rva != 0 {
            lookup_rva
        } else {
            self.import_address_table_rva()?
        };
        if thunk_table_rva == 0 {
            return Ok(Vec::new());
        }

        let dll_name = self.dll_name()?;
        let iat_rva = self.import_address_table_rva()?;
        let thunk_table_offset = resolve_rva(thunk_table_rva, &self.sections)?;

        let mut functions = Vec::new();
        let mut index: u32 = 0;
        loop {
            let thunk_offset = thunk_table_offset + index as usize * thunk_width;
            let value = if self.is_64bit {
                self.buffer.read_u64(thunk_offset)?
            } else {
                self.buffer.read_u32(thunk_offset)? as u64
            };
            if value == 0 {
                break;
            }

            let iat_slot_offset = iat_rva as i64 + (index as i64 * thunk_width as i64)
                - self.iat_directory_size as i64;

            let is_ordinal = if self.is_64bit {
                value & ORDINAL_FLAG_64 != 0
            } else {
                value & ORDINAL_FLAG_32 as u64 != 0
            };

            if is_ordinal {
                let mask = if self.is_64bit {
                    0x7FFF_FFFF_FFFF_FFFFu64
                } else {
                    0x7FFF_FFFFu64
                };
                functions.push(ImportFunction {
                    dll_name: dll_name.clone(),
                    name: String::new(),
                    hint: 0,
                    ordinal: (value & mask) as u32,
                    iat_slot_offset,
                });
            } else {
                let hint_name_rva = value as u32;
                let hint_name_offset = resolve_rva(hint_name_rva, &self.sections)?;
                let hint = self.buffer.read_u16(hint_name_offset)?;
                let name = self.buffer.read_ascii_cstring(hint_name_offset + 2)?;
                functions.push(ImportFunction {
                    dll_name: dll_name.clone(),
                    name,
                    hint,
                    ordinal: 0,
                    iat_slot_offset,
                });
            }

            index += 1;
        }

        Ok(functions)
    }
}

/// Walks the import descriptor table starting at `offset`, stopping at the
/// first terminator descriptor.
pub(crate) fn read_import_descriptors(
    buffer: &ByteView,
    offset: usize,
    is_64bit: bool,
    iat_directory_size: u32,
    sections: &SectionTable,
) -> Result<Vec<ImportDescriptor>> {
    let mut descriptors = Vec::new();
    let mut current = offset;
    loop {
        let descriptor = ImportDescriptor::new(
            buffer.clone(),
            current,
            is_64bit,
            iat_directory_size,
            sections.clone(),
        );
        if descriptor.is_terminator()? {
            break;
        }
        descriptors.push(descriptor);
        current += IMPORT_DESCRIPTOR_SIZE;
    }
    Ok(descriptors)
}

pub const DELAY_IMPORT_DESCRIPTOR_SIZE: usize = 32;

const ATTRIBUTES_OFFSET: usize = 0x00;
const DLL_NAME_RVA_OFFSET: usize = 0x04;
const MODULE_HANDLE_RVA_OFFSET: usize = 0x08;
const DELAY_IAT_RVA_OFFSET: usize = 0x0C;
const DELAY_INT_RVA_OFFSET: usize = 0x10;
const BOUND_IAT_RVA_OFFSET: usize = 0x14;
const UNLOAD_IAT_RVA_OFFSET: usize = 0x18;
const DELAY_TIME_DATE_STAMP_OFFSET: usize = 0x1C;

/// A live window onto one 32-byte delay-import descriptor.
#[derive(Debug, Clone)]
pub struct DelayImportDescriptor {
    buffer: ByteView,
    offset: usize,
}

impl DelayImportDescriptor {
    pub(crate) fn new(buffer: ByteView, offset: usize) -> Self {
        Self { buffer, offset }
    }

    pub fn attributes(&self) -> Result<u32> {
        self.buffer.read_u32(self.offset + ATTRIBUTES_OFFSET)
    }

    pub fn dll_name_rva(&self) -> Result<u32> {
        self.buffer.read_u32(self.offset + DLL_NAME_RVA_OFFSET)
    }

    pub fn module_handle_rva(&self) -> Result<u32> {
        self.buffer.read_u32(self.offset + MODULE_HANDLE_RVA_OFFSET)
    }

    pub fn import_address_table_rva(&self) -> Result<u32> {
        self.buffer.read_u32(self.offset + DELAY_IAT_RVA_OFFSET)
    }

    pub fn import_name_table_rva(&self) -> Result<u32> {
        self.buffer.read_u32(self.offset + DELAY_INT_RVA_OFFSET)
    }

    pub fn bound_import_address_table_rva(&self) -> Result<u32> {
        self.buffer.read_u32(self.offset + BOUND_IAT_RVA_OFFSET)
    }

    pub fn unload_information_table_rva(&self) -> Result<u32> {
        self.buffer.read_u32(self.offset + UNLOAD_IAT_RVA_OFFSET)
    }

    pub fn time_date_stamp(&self) -> Result<u32> {
        self.buffer
            .read_u32(self.offset + DELAY_TIME_DATE_STAMP_OFFSET)
    }

    /// Mirrors the import-table termination convention (spec.md §9's open
    /// question): a record whose six RVA fields are all zero ends the list.
    pub fn is_terminator(&self) -> Result<bool> {
        Ok(self.dll_name_rva()? == 0
            && self.module_handle_rva()? == 0
            && self.import_address_table_rva()? == 0
            && self.import_name_table_rva()? == 0
            && self.bound_import_address_table_rva()? == 0
            && self.unload_information_table_rva()? == 0)
    }
}

pub(crate) fn read_delay_import_descriptors(
    buffer: &ByteView,
    offset: usize,
) -> Result<Vec<DelayImportDescriptor>> {
    let mut descriptors = Vec::new();
    let mut current = offset;
    loop {
        let descriptor = DelayImportDescriptor::new(buffer.clone(), current);
        if descriptor.is_terminator()? {
            break;
        }
        descriptors.push(descriptor);
        current += DELAY_IMPORT_DESCRIPTOR_SIZE;
    }
    Ok(descriptors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headers::section_header::SectionHeader;

    fn one_section(buffer: &ByteView) -> SectionTable {
        let header_offset = buffer.len();
        buffer.append(&[0u8; 40]);
        let header = SectionHeader::new(buffer.clone(), header_offset, 0);
        header.set_virtual_address(0).unwrap();
        header.set_virtual_size(0x10000).unwrap();
        header.set_pointer_to_raw_data(0).unwrap();
        vec![header]
    }

    fn write_cstring(buffer: &ByteView, offset: usize, s: &str) {
        let mut bytes = s.as_bytes().to_vec();
        bytes.push(0);
        buffer.write_bytes(offset, &bytes).unwrap();
    }

    #[test]
    fn scenario_c_import_enumeration() {
        let buffer = ByteView::new(vec![0u8; 0x4000]);
        let sections = one_section(&buffer);

        write_cstring(&buffer, 0x2000, "kernel32.dll");

        buffer.write_u32(0x3000, ORDINAL_FLAG_32 | 1).unwrap();
        buffer.write_u32(0x3004, 0x3040).unwrap();
        buffer.write_u32(0x3008, 0).unwrap(); // terminator thunk

        buffer.write_u16(0x3040, 2).unwrap();
        write_cstring(&buffer, 0x3042, "GetModuleHandleA");

        let descriptor_offset = 0x1000;
        buffer
            .write_u32(descriptor_offset + IMPORT_LOOKUP_TABLE_OFFSET, 0x3000)
            .unwrap();
        buffer
            .write_u32(descriptor_offset + NAME_OFFSET, 0x2000)
            .unwrap();
        buffer
            .write_u32(descriptor_offset + IMPORT_ADDRESS_TABLE_OFFSET, 0x3000)
            .unwrap();

        let descriptor = ImportDescriptor::new(buffer, descriptor_offset, false, 0, sections);
        assert!(!descriptor.is_terminator().unwrap());
        assert_eq!(descriptor.dll_name().unwrap(), "kernel32.dll");

        let functions = descriptor.functions().unwrap();
        assert_eq!(functions.len(), 2);
        assert_eq!(functions[0].ordinal, 1);
        assert_eq!(functions[0].name, "");
        assert_eq!(functions[1].name, "GetModuleHandleA");
        assert_eq!(functions[1].hint, 2);
    }

    #[test]
    fn descriptor_with_all_zero_rvas_terminates() {
        let buffer = ByteView::new(vec![0u8; IMPORT_DESCRIPTOR_SIZE]);
        let sections = one_section(&buffer);
        let descriptor = ImportDescriptor::new(buffer, 0, false, 0, sections);
        assert!(descriptor.is_terminator().unwrap());
    }

    #[test]
    fn read_import_descriptors_stops_at_terminator() {
        let buffer = ByteView::new(vec![0u8; 0x1000]);
        let sections = one_section(&buffer);

        buffer.write_u32(IMPORT_ADDRESS_TABLE_OFFSET, 0x10).unwrap();
        buffer
            .write_u32(IMPORT_DESCRIPTOR_SIZE as u32 as usize + IMPORT_ADDRESS_TABLE_OFFSET, 0)
            .unwrap();

        let descriptors =
            read_import_descriptors(&buffer, 0, false, 0, &sections).unwrap();
        assert_eq!(descriptors.len(), 1);
    }

    #[test]
    fn delay_import_terminator_detection() {
        let buffer = ByteView::new(vec![0u8; DELAY_IMPORT_DESCRIPTOR_SIZE * 2]);
        buffer
            .write_u32(DELAY_IMPORT_DESCRIPTOR_SIZE + DLL_NAME_RVA_OFFSET, 0x100)
            .unwrap();

        let descriptors = read_delay_import_descriptors(&buffer, 0).unwrap();
        // First record is all zero: terminator immediately.
        assert!(descriptors.is_empty());
    }
}
