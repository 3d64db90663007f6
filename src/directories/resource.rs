//! Resource Directory: the three-level Type → Name/ID → Language tree, per
//! spec.md §4.7.

use crate::byteview::ByteView;
use crate::enums::resolve_resource_id;
use crate::error::Result;

const CHARACTERISTICS_OFFSET: usize = 0x00;
const TIME_DATE_STAMP_OFFSET: usize = 0x04;
const MAJOR_VERSION_OFFSET: usize = 0x08;
const MINOR_VERSION_OFFSET: usize = 0x0A;
const NUMBER_OF_NAME_ENTRIES_OFFSET: usize = 0x0C;
const NUMBER_OF_ID_ENTRIES_OFFSET: usize = 0x0E;
const ENTRIES_OFFSET: usize = 0x10;
const ENTRY_SIZE: usize = 8;

const HIGH_BIT_32: u32 = 0x8000_0000;
const LOW_31_MASK: u32 = 0x7FFF_FFFF;

/// An entry is named (high bit of `name_or_id` set, pointing at a
/// length-prefixed UTF-16LE string) or identified by a plain integer ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceIdentifier {
    Name(String),
    Id(u32),
}

impl ResourceIdentifier {
    /// Looks up the well-known label for an `Id`, per spec.md §4.7's table.
    /// Returns `None` for named entries and for unrecognized IDs.
    pub fn well_known_label(&self) -> Option<&'static str> {
        match self {
            ResourceIdentifier::Id(id) => resolve_resource_id(*id),
            ResourceIdentifier::Name(_) => None,
        }
    }
}

/// A leaf `IMAGE_RESOURCE_DATA_ENTRY`: the RVA, size, and code page of the
/// raw resource payload. Decoded payload contents (icons, strings, dialog
/// templates, ...) are out of scope — the library describes, not decodes,
/// leaf data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceDataEntry {
    pub data_rva: u32,
    pub size: u32,
    pub code_page: u32,
}

/// One entry in a resource directory level: an identifier plus either a
/// pointer to a nested sub-directory or to a data leaf.
#[derive(Debug, Clone)]
pub struct ResourceEntry {
    buffer: ByteView,
    root_offset: usize,
    directory_size: usize,
    identifier: ResourceIdentifier,
    target_relative_offset: u32,
    target_is_directory: bool,
}

impl ResourceEntry {
    pub fn identifier(&self) -> &ResourceIdentifier {
        &self.identifier
    }

    pub fn is_directory(&self) -> bool {
        self.target_is_directory
    }

    /// Descends into the sub-directory this entry points to, if any.
    pub fn as_directory(&self) -> Option<ResourceDirectory> {
        if !self.target_is_directory {
            return None;
        }
        Some(ResourceDirectory {
            buffer: self.buffer.clone(),
            root_offset: self.root_offset,
            offset: self.root_offset + self.target_relative_offset as usize,
            size: self.directory_size,
        })
    }

    /// Reads the data leaf this entry points to, if any.
    pub fn as_data(&self) -> Option<Result<ResourceDataEntry>> {
        if self.target_is_directory {
            return None;
        }
        let offset = self.root_offset + self.target_relative_offset as usize;
        Some((|| {
            Ok(ResourceDataEntry {
                data_rva: self.buffer.read_u32(offset)?,
                size: self.buffer.read_u32(offset + 4)?,
                code_page: self.buffer.read_u32(offset + 8)?,
            })
        })())
    }
}

/// A live window onto one level of the resource tree. `root_offset` is the
/// Resource Directory's own base (RVA 0 of the `.rsrc`-backed region); every
/// name and sub-directory offset inside the tree is relative to it, per
/// spec.md §9's "tree with back references by offset" design note.
#[derive(Debug, Clone)]
pub struct ResourceDirectory {
    buffer: ByteView,
    root_offset: usize,
    offset: usize,
    size: usize,
}

impl ResourceDirectory {
    pub(crate) fn new(buffer: ByteView, root_offset: usize, size: usize) -> Self {
        Self {
            buffer,
            root_offset,
            offset: root_offset,
            size,
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

    pub fn number_of_name_entries(&self) -> Result<u16> {
        self.buffer
            .read_u16(self.offset + NUMBER_OF_NAME_ENTRIES_OFFSET)
    }

    pub fn number_of_id_entries(&self) -> Result<u16> {
        self.buffer
            .read_u16(self.offset + NUMBER_OF_ID_ENTRIES_OFFSET)
    }

    fn resolve_name(&self, relative_offset: u32) -> Result<String> {
        let offset = self.root_offset + relative_offset as usize;
        let char_count = self.buffer.read_u16(offset)? as usize;
        self.buffer.read_utf16le_string(offset + 2, char_count)
    }

    /// Builds this level's entry list, applying the mandatory sanity checks
    /// from spec.md §4.7 before any recursion. A directory-wide check
    /// (declared entry count too large for the directory) yields an empty
    /// list outright; a per-entry check failing stops the scan at that
    /// entry, so a first-entry failure also yields an empty list.
    pub fn entries(&self) -> Result<Vec<ResourceEntry>> {
        let name_count = self.number_of_name_entries()? as usize;
        let id_count = self.number_of_id_entries()? as usize;
        let total = name_count + id_count;

        if total * 10 > self.size {
            log::debug!(
                "resource directory at {:#x}: declared entry count overflows directory length, rejecting",
                self.offset
            );
            return Ok(Vec::new());
        }

        let mut entries = Vec::with_capacity(total);
        for i in 0..total {
            let entry_offset = self.offset + ENTRIES_OFFSET + i * ENTRY_SIZE;
            let name_or_id = self.buffer.read_u32(entry_offset)?;
            let offset_to_data = self.buffer.read_u32(entry_offset + 4)?;

            let identifier = if name_or_id & HIGH_BIT_32 != 0 {
                match self.resolve_name(name_or_id & LOW_31_MASK) {
                    Ok(name) if !name.is_empty() => ResourceIdentifier::Name(name),
                    _ => {
                        log::debug!(
                            "resource directory at {:#x}: entry {} has empty/unresolvable name, stopping",
                            self.offset,
                            i
                        );
                        break;
                    }
                }
            } else if name_or_id == u32::MAX {
                log::debug!(
                    "resource directory at {:#x}: entry {} is the unknown-ID sentinel, stopping",
                    self.offset,
                    i
                );
                break;
            } else {
                ResourceIdentifier::Id(name_or_id)
            };

            let target_is_directory = offset_to_data & HIGH_BIT_32 != 0;
            let target_relative_offset = offset_to_data & LOW_31_MASK;

            if target_is_directory && target_relative_offset as usize > self.size {
                log::debug!(
                    "resource directory at {:#x}: entry {} sub-directory offset exceeds declared length, stopping",
                    self.offset,
                    i
                );
                break;
            }

            entries.push(ResourceEntry {
                buffer: self.buffer.clone(),
                root_offset: self.root_offset,
                directory_size: self.size,
                identifier,
                target_relative_offset,
                target_is_directory,
            });
        }

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_e_resource_tree() {
        // Root directory (Type level) at offset 0: one ID entry (16 =
        // Version) pointing at a sub-directory at offset 0x20, which
        // itself has one ID entry (1) pointing at a data leaf at 0x50.
        let buffer = ByteView::new(vec![0u8; 0x80]);
        let size = buffer.len();

        buffer.write_u16(NUMBER_OF_ID_ENTRIES_OFFSET, 1).unwrap();
        buffer
            .write_u32(ENTRIES_OFFSET, 16)
            .unwrap();
        buffer
            .write_u32(ENTRIES_OFFSET + 4, HIGH_BIT_32 | 0x20)
            .unwrap();

        buffer
            .write_u16(0x20 + NUMBER_OF_ID_ENTRIES_OFFSET, 1)
            .unwrap();
        buffer.write_u32(0x20 + ENTRIES_OFFSET, 1).unwrap();
        buffer
            .write_u32(0x20 + ENTRIES_OFFSET + 4, 0x50)
            .unwrap();

        buffer.write_u32(0x50, 0x4000).unwrap(); // data rva
        buffer.write_u32(0x54, 0x100).unwrap(); // size
        buffer.write_u32(0x58, 0).unwrap(); // code page

        let root = ResourceDirectory::new(buffer, 0, size);
        let type_entries = root.entries().unwrap();
        assert_eq!(type_entries.len(), 1);
        assert_eq!(
            type_entries[0].identifier().well_known_label(),
            Some("Version")
        );
        assert!(type_entries[0].is_directory());

        let name_dir = type_entries[0].as_directory().unwrap();
        let name_entries = name_dir.entries().unwrap();
        assert_eq!(name_entries.len(), 1);
        assert_eq!(
            *name_entries[0].identifier(),
            ResourceIdentifier::Id(1)
        );
        assert!(!name_entries[0].is_directory());

        let leaf = name_entries[0].as_data().unwrap().unwrap();
        assert_eq!(leaf.data_rva, 0x4000);
        assert_eq!(leaf.size, 0x100);
    }

    #[test]
    fn oversized_entry_count_rejects_whole_level() {
        let buffer = ByteView::new(vec![0u8; 0x20]);
        let size = buffer.len();
        buffer.write_u16(NUMBER_OF_ID_ENTRIES_OFFSET, 100).unwrap();
        let directory = ResourceDirectory::new(buffer, 0, size);
        assert!(directory.entries().unwrap().is_empty());
    }

    #[test]
    fn named_entry_with_unresolvable_name_stops_the_scan() {
        let buffer = ByteView::new(vec![0u8; 0x40]);
        let size = buffer.len();
        buffer.write_u16(NUMBER_OF_NAME_ENTRIES_OFFSET, 1).unwrap();
        // Name offset points past the buffer entirely.
        buffer
            .write_u32(ENTRIES_OFFSET, HIGH_BIT_32 | 0x1000)
            .unwrap();
        let directory = ResourceDirectory::new(buffer, 0, size);
        assert!(directory.entries().unwrap().is_empty());
    }
}
