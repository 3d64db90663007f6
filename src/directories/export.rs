//! Export Directory: the table of functions, names, and ordinals a DLL
//! exposes, per spec.md §4.5.

use crate::byteview::ByteView;
use crate::error::Result;
use crate::headers::section_header::SectionTable;
use crate::rva::resolve_rva;

const CHARACTERISTICS_OFFSET: usize = 0x00;
const TIME_DATE_STAMP_OFFSET: usize = 0x04;
const MAJOR_VERSION_OFFSET: usize = 0x08;
const MINOR_VERSION_OFFSET: usize = 0x0A;
const NAME_OFFSET: usize = 0x0C;
const BASE_OFFSET: usize = 0x10;
const NUMBER_OF_FUNCTIONS_OFFSET: usize = 0x14;
const NUMBER_OF_NAMES_OFFSET: usize = 0x18;
const ADDRESS_OF_FUNCTIONS_OFFSET: usize = 0x1C;
const ADDRESS_OF_NAMES_OFFSET: usize = 0x20;
const ADDRESS_OF_NAME_ORDINALS_OFFSET: usize = 0x24;

/// One exported function. `name` is empty when the export has no entry in
/// the name table (export-by-ordinal only). `forwarded_name` is set when
/// `rva` points inside the Export Directory's own RVA range — such an RVA
/// names `OtherDll.Function` as ASCII text instead of code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFunction {
    pub name: String,
    pub rva: u32,
    pub ordinal: u32,
    pub forwarded_name: Option<String>,
}

/// A live window onto the Export Directory header.
#[derive(Debug, Clone)]
pub struct ExportDirectory {
    buffer: ByteView,
    offset: usize,
    directory_rva: u32,
    directory_size: u32,
    sections: SectionTable,
}

impl ExportDirectory {
    pub(crate) fn new(
        buffer: ByteView,
        offset: usize,
        directory_rva: u32,
        directory_size: u32,
        sections: SectionTable,
    ) -> Self {
        Self {
            buffer,
            offset,
            directory_rva,
            directory_size,
            sections,
        }
    }

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

    pub fn name_rva(&self) -> Result<u32> {
        self.buffer.read_u32(self.offset + NAME_OFFSET)
    }

    pub fn name(&self) -> Result<String> {
        let file_offset = resolve_rva(self.name_rva()?, &self.sections)?;
        self.buffer.read_ascii_cstring(file_offset)
    }

    pub fn base(&self) -> Result<u32> {
        self.buffer.read_u32(self.offset + BASE_OFFSET)
    }

    pub fn number_of_functions(&self) -> Result<u32> {
        self.buffer.read_u32(self.offset + NUMBER_OF_FUNCTIONS_OFFSET)
    }

    pub fn number_of_names(&self) -> Result<u32> {
        self.buffer.read_u32(self.offset + NUMBER_OF_NAMES_OFFSET)
    }

    pub fn address_of_functions(&self) -> Result<u32> {
        self.buffer
            .read_u32(self.offset + ADDRESS_OF_FUNCTIONS_OFFSET)
    }

    pub fn address_of_names(&self) -> Result<u32> {
        self.buffer.read_u32(self.offset + ADDRESS_OF_NAMES_OFFSET)
    }

    pub fn address_of_name_ordinals(&self) -> Result<u32> {
        self.buffer
            .read_u32(self.offset + ADDRESS_OF_NAME_ORDINALS_OFFSET)
    }

    fn rva_is_forwarded(&self, rva: u32) -> bool {
        self.directory_size > 0
            && rva >= self.directory_rva
            && (rva as u64) < self.directory_rva as u64 + self.directory_size as u64
    }

    /// Walks the function, name, and ordinal tables per spec.md §4.5's
    /// algorithm: functions first (placeholder empty names), then names
    /// upgraded in place via the ordinal-index table.
    pub fn functions(&self) -> Result<Vec<ExportFunction>> {
        let address_of_functions = self.address_of_functions()?;
        if address_of_functions == 0 {
            log::debug!("export directory at {:#x}: no functions table", self.offset);
            return Ok(Vec::new());
        }

        let base = self.base()?;
        let number_of_functions = self.number_of_functions()?;
        let number_of_names = self.number_of_names()?;
        let functions_offset = resolve_rva(address_of_functions, &self.sections)?;

        let mut functions = Vec::with_capacity(number_of_functions as usize);
        for i in 0..number_of_functions {
            let rva = self.buffer.read_u32(functions_offset + 4 * i as usize)?;
            functions.push(ExportFunction {
                name: String::new(),
                rva,
                ordinal: base + i,
                forwarded_name: None,
            });
        }

        if number_of_names > 0 {
            let names_offset = resolve_rva(self.address_of_names()?, &self.sections)?;
            let ordinals_offset = resolve_rva(self.address_of_name_ordinals()?, &self.sections)?;

            for j in 0..number_of_names {
                let name_ptr = self.buffer.read_u32(names_offset + 4 * j as usize)?;
                let name_file_offset = resolve_rva(name_ptr, &self.sections)?;
                let name = self.buffer.read_ascii_cstring(name_file_offset)?;
                let ord_index = self.buffer.read_u16(ordinals_offset + 2 * j as usize)? as usize;

                if let Some(function) = functions.get_mut(ord_index) {
                    function.name = name;
                    if self.rva_is_forwarded(function.rva) {
                        let forwarded_offset = resolve_rva(function.rva, &self.sections)?;
                        function.forwarded_name =
                            Some(self.buffer.read_ascii_cstring(forwarded_offset)?);
                    }
                }
            }
        }

        Ok(functions)
    }
}
