//! The 16-slot Data Directory table embedded at the tail of the Optional
//! Header. Each slot is an `(RVA, size)` pair; a slot is *present* iff both
//! fields are non-zero.

use crate::byteview::ByteView;
use crate::enums::{DataDirectoryKind, DATA_DIRECTORY_COUNT};
use crate::error::Result;

pub const DATA_DIRECTORY_ENTRY_SIZE: usize = 8;

/// One `(RVA, size)` slot.
#[derive(Debug, Clone)]
pub struct DataDirectoryEntry {
    buffer: ByteView,
    offset: usize,
    kind: DataDirectoryKind,
}

impl DataDirectoryEntry {
    pub fn kind(&self) -> DataDirectoryKind {
        self.kind
    }

    pub fn virtual_address(&self) -> Result<u32> {
        self.buffer.read_u32(self.offset)
    }

    pub fn set_virtual_address(&self, value: u32) -> Result<()> {
        self.buffer.write_u32(self.offset, value)
    }

    pub fn size(&self) -> Result<u32> {
        self.buffer.read_u32(self.offset + 4)
    }

    pub fn set_size(&self, value: u32) -> Result<()> {
        self.buffer.write_u32(self.offset + 4, value)
    }

    /// A slot is present iff both fields are non-zero.
    pub fn is_present(&self) -> Result<bool> {
        Ok(self.virtual_address()? != 0 && self.size()? != 0)
    }
}

/// A live window onto the 16-entry Data Directory table.
#[derive(Debug, Clone)]
pub struct DataDirectoryTable {
    buffer: ByteView,
    base_offset: usize,
}

impl DataDirectoryTable {
    pub(crate) fn new(buffer: ByteView, base_offset: usize) -> Self {
        Self { buffer, base_offset }
    }

    pub fn entry(&self, kind: DataDirectoryKind) -> DataDirectoryEntry {
        let index = kind.index();
        DataDirectoryEntry {
            buffer: self.buffer.clone(),
            offset: self.base_offset + index * DATA_DIRECTORY_ENTRY_SIZE,
            kind,
        }
    }

    /// Iterates the full table, slot 0 first. Beyond the declared
    /// `NumberOfRvaAndSizes`, reads fall back to zero rather than erroring,
    /// per spec.md §8's boundary requirement — slots must always be exposed.
    pub fn entries(&self) -> [DataDirectoryEntry; DATA_DIRECTORY_COUNT] {
        std::array::from_fn(|i| self.entry(crate::enums::data_directory_kind::DATA_DIRECTORY_KINDS[i]))
    }
}
