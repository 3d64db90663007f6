//! Base Relocation Directory: a sequence of per-page relocation blocks, per
//! spec.md §4.11.

use crate::enums::RelocationType;
use crate::byteview::ByteView;
use crate::error::{Error, Result};

const BLOCK_HEADER_SIZE: usize = 8;

/// One type/offset entry within a relocation block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelocationEntry {
    pub relocation_type: RelocationType,
    /// 12-bit offset from the block's `VirtualAddress`.
    pub offset: u16,
}

/// A live window onto one relocation block: `VirtualAddress`, `SizeOfBlock`,
/// then `(SizeOfBlock - 8) / 2` packed type/offset `u16` entries.
#[derive(Debug, Clone)]
pub struct RelocationBlock {
    buffer: ByteView,
    offset: usize,
}

impl RelocationBlock {
    pub fn virtual_address(&self) -> Result<u32> {
        self.buffer.read_u32(self.offset)
    }

    pub fn size_of_block(&self) -> Result<u32> {
        self.buffer.read_u32(self.offset + 4)
    }

    pub fn entry_count(&self) -> Result<usize> {
        Ok((self.size_of_block()? as usize).saturating_sub(BLOCK_HEADER_SIZE) / 2)
    }

    pub fn entries(&self) -> Result<Vec<RelocationEntry>> {
        let count = self.entry_count()?;
        let mut entries = Vec::with_capacity(count);
        for i in 0..count {
            let raw = self
                .buffer
                .read_u16(self.offset + BLOCK_HEADER_SIZE + i * 2)?;
            entries.push(RelocationEntry {
                relocation_type: RelocationType::from_u8((raw >> 12) as u8),
                offset: raw & 0x0FFF,
            });
        }
        Ok(entries)
    }
}

/// A live window onto the whole Base Relocation directory: a sequence of
/// [`RelocationBlock`]s spanning `directory_size` bytes.
#[derive(Debug, Clone)]
pub struct BaseRelocationDirectory {
    buffer: ByteView,
    offset: usize,
    directory_size: u32,
}

impl BaseRelocationDirectory {
    pub(crate) fn new(buffer: ByteView, offset: usize, directory_size: u32) -> Self {
        Self {
            buffer,
            offset,
            directory_size,
        }
    }

    /// Walks blocks until the directory is exhausted. Each block's
    /// `SizeOfBlock` must be at least 8 and must not exceed the remaining
    /// directory size, or the walk fails with **invalid-data**. A block
    /// whose `VirtualAddress` and `SizeOfBlock` are both zero also
    /// terminates the walk, per spec.md §4.11.
    pub fn blocks(&self) -> Result<Vec<RelocationBlock>> {
        let directory_end = self.offset + self.directory_size as usize;
        let mut blocks = Vec::new();
        let mut current = self.offset;

        while current + BLOCK_HEADER_SIZE < directory_end {
            let virtual_address = self.buffer.read_u32(current)?;
            let size_of_block = self.buffer.read_u32(current + 4)?;

            if virtual_address == 0 && size_of_block == 0 {
                break;
            }

            if size_of_block < BLOCK_HEADER_SIZE as u32 {
                return Err(Error::invalid_data(
                    "relocation block SizeOfBlock is smaller than the 8-byte block header",
                ));
            }
            if (current - self.offset) as u64 + size_of_block as u64 > self.directory_size as u64
            {
                return Err(Error::invalid_data(
                    "relocation block SizeOfBlock extends past the declared directory size",
                ));
            }

            blocks.push(RelocationBlock {
                buffer: self.buffer.clone(),
                offset: current,
            });
            current += size_of_block as usize;
        }

        Ok(blocks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_d_relocation_block() {
        let buffer = ByteView::new(vec![0u8; 0x20]);
        buffer.write_u32(0x00, 0x1000).unwrap();
        buffer.write_u32(0x04, 0x10).unwrap();
        buffer.write_u16(0x08, 0x3012).unwrap();
        buffer.write_u16(0x0A, 0xA020).unwrap();
        buffer.write_u16(0x0C, 0x0000).unwrap();
        buffer.write_u16(0x0E, 0x0000).unwrap();

        let directory = BaseRelocationDirectory::new(buffer, 0, 0x10);
        let blocks = directory.blocks().unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].virtual_address().unwrap(), 0x1000);

        let entries = blocks[0].entries().unwrap();
        assert_eq!(entries.len(), 4);
        assert_eq!(entries[0].relocation_type, RelocationType::HighLow);
        assert_eq!(entries[0].offset, 0x012);
        assert_eq!(entries[1].relocation_type, RelocationType::Dir64);
        assert_eq!(entries[1].offset, 0x020);
        assert_eq!(entries[2].relocation_type, RelocationType::Absolute);
        assert_eq!(entries[3].relocation_type, RelocationType::Absolute);
    }

    #[test]
    fn block_smaller_than_header_is_invalid_data() {
        let buffer = ByteView::new(vec![0u8; 0x10]);
        buffer.write_u32(0x00, 0x1000).unwrap();
        buffer.write_u32(0x04, 4).unwrap();

        let directory = BaseRelocationDirectory::new(buffer, 0, 0x10);
        assert!(matches!(
            directory.blocks(),
            Err(Error::InvalidData { .. })
        ));
    }

    #[test]
    fn all_zero_block_terminates_walk() {
        let buffer = ByteView::new(vec![0u8; 0x20]);
        // First block is the zero sentinel.
        let directory = BaseRelocationDirectory::new(buffer, 0, 0x10);
        assert!(directory.blocks().unwrap().is_empty());
    }
}
