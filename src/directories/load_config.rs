//! Load Config Directory, per spec.md §4.10 and SPEC_FULL.md §4's
//! POEX-sourced field-ordering supplement.
//!
//! The first six fields (`Size` through `CriticalSectionDefaultTimeout`) are
//! a fixed, bitness-independent 0x18-byte prefix. Every field after that is
//! pointer-sized (4 bytes on PE32, 8 on PE32+) and laid out sequentially in
//! the order given below — mirroring `ImageLoadConfigDirectory.h`'s
//! bitness-polymorphic tail.

use crate::byteview::ByteView;
use crate::error::Result;

const PREFIX_SIZE: usize = 0x18;

const SIZE_OFFSET: usize = 0x00;
const TIME_DATE_STAMP_OFFSET: usize = 0x04;
const MAJOR_VERSION_OFFSET: usize = 0x08;
const MINOR_VERSION_OFFSET: usize = 0x0A;
const GLOBAL_FLAGS_CLEAR_OFFSET: usize = 0x0C;
const GLOBAL_FLAGS_SET_OFFSET: usize = 0x10;
const CRITICAL_SECTION_DEFAULT_TIMEOUT_OFFSET: usize = 0x14;

/// Index, within the pointer-sized tail, of each bitness-dependent field —
/// in declaration order.
#[derive(Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
enum TailField {
    DeCommitFreeBlockThreshold,
    DeCommitTotalFreeThreshold,
    LockPrefixTable,
    MaximumAllocationSize,
    VirtualMemoryThreshold,
    ProcessAffinityMask,
    ProcessHeapFlags,
    CsdVersion,
    Reserved1,
    EditList,
    SecurityCookie,
    SeHandlerTable,
    SeHandlerCount,
    GuardCfCheckFunctionPointer,
    Reserved2,
    GuardCfFunctionTable,
    GuardCfFunctionCount,
    GuardFlags,
}

impl TailField {
    fn index(self) -> usize {
        self as usize
    }
}

/// A live window onto the Load Config directory.
#[derive(Debug, Clone)]
pub struct LoadConfigDirectory {
    buffer: ByteView,
    offset: usize,
    is_64bit: bool,
}

impl LoadConfigDirectory {
    pub(crate) fn new(buffer: ByteView, offset: usize, is_64bit: bool) -> Self {
        Self {
            buffer,
            offset,
            is_64bit,
        }
    }

    fn word_width(&self) -> usize {
        if self.is_64bit {
            8
        } else {
            4
        }
    }

    fn tail_offset(&self, field: TailField) -> usize {
        self.offset + PREFIX_SIZE + field.index() * self.word_width()
    }

    fn read_tail(&self, field: TailField) -> Result<u64> {
        self.buffer
            .read_uint(self.tail_offset(field), self.is_64bit)
    }

    pub fn size(&self) -> Result<u32> {
        self.buffer.read_u32(self.offset + SIZE_OFFSET)
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

    pub fn global_flags_clear(&self) -> Result<u32> {
        self.buffer
            .read_u32(self.offset + GLOBAL_FLAGS_CLEAR_OFFSET)
    }

    pub fn global_flags_set(&self) -> Result<u32> {
        self.buffer.read_u32(self.offset + GLOBAL_FLAGS_SET_OFFSET)
    }

    pub fn critical_section_default_timeout(&self) -> Result<u32> {
        self.buffer
            .read_u32(self.offset + CRITICAL_SECTION_DEFAULT_TIMEOUT_OFFSET)
    }

    pub fn decommit_free_block_threshold(&self) -> Result<u64> {
        self.read_tail(TailField::DeCommitFreeBlockThreshold)
    }

    pub fn decommit_total_free_threshold(&self) -> Result<u64> {
        self.read_tail(TailField::DeCommitTotalFreeThreshold)
    }

    pub fn lock_prefix_table(&self) -> Result<u64> {
        self.read_tail(TailField::LockPrefixTable)
    }

    pub fn maximum_allocation_size(&self) -> Result<u64> {
        self.read_tail(TailField::MaximumAllocationSize)
    }

    pub fn virtual_memory_threshold(&self) -> Result<u64> {
        self.read_tail(TailField::VirtualMemoryThreshold)
    }

    pub fn process_affinity_mask(&self) -> Result<u64> {
        self.read_tail(TailField::ProcessAffinityMask)
    }

    pub fn process_heap_flags(&self) -> Result<u64> {
        self.read_tail(TailField::ProcessHeapFlags)
    }

    pub fn csd_version(&self) -> Result<u64> {
        self.read_tail(TailField::CsdVersion)
    }

    pub fn edit_list(&self) -> Result<u64> {
        self.read_tail(TailField::EditList)
    }

    pub fn security_cookie(&self) -> Result<u64> {
        self.read_tail(TailField::SecurityCookie)
    }

    pub fn se_handler_table(&self) -> Result<u64> {
        self.read_tail(TailField::SeHandlerTable)
    }

    pub fn se_handler_count(&self) -> Result<u64> {
        self.read_tail(TailField::SeHandlerCount)
    }

    pub fn guard_cf_check_function_pointer(&self) -> Result<u64> {
        self.read_tail(TailField::GuardCfCheckFunctionPointer)
    }

    pub fn guard_cf_function_table(&self) -> Result<u64> {
        self.read_tail(TailField::GuardCfFunctionTable)
    }

    pub fn guard_cf_function_count(&self) -> Result<u64> {
        self.read_tail(TailField::GuardCfFunctionCount)
    }

    pub fn guard_flags(&self) -> Result<u64> {
        self.read_tail(TailField::GuardFlags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_fixed_prefix() {
        let buffer = ByteView::new(vec![0u8; 0x200]);
        buffer.write_u32(SIZE_OFFSET, 0xA8).unwrap();
        buffer.write_u16(MAJOR_VERSION_OFFSET, 1).unwrap();
        buffer.write_u32(CRITICAL_SECTION_DEFAULT_TIMEOUT_OFFSET, 0x1000).unwrap();

        let directory = LoadConfigDirectory::new(buffer, 0, true);
        assert_eq!(directory.size().unwrap(), 0xA8);
        assert_eq!(directory.major_version().unwrap(), 1);
        assert_eq!(directory.critical_section_default_timeout().unwrap(), 0x1000);
    }

    #[test]
    fn tail_fields_use_bitness_dependent_stride() {
        let buffer = ByteView::new(vec![0u8; 0x200]);
        // PE32+: stride 8, SecurityCookie is tail index 10.
        let security_cookie_offset = PREFIX_SIZE + TailField::SecurityCookie.index() * 8;
        buffer
            .write_u64(security_cookie_offset, 0xDEAD_BEEF_0000_1234)
            .unwrap();
        let directory64 = LoadConfigDirectory::new(buffer.clone(), 0, true);
        assert_eq!(
            directory64.security_cookie().unwrap(),
            0xDEAD_BEEF_0000_1234
        );

        // PE32: stride 4, same field at a different byte offset.
        let buffer32 = ByteView::new(vec![0u8; 0x200]);
        let offset32 = PREFIX_SIZE + TailField::SecurityCookie.index() * 4;
        buffer32.write_u32(offset32, 0x1234_5678).unwrap();
        let directory32 = LoadConfigDirectory::new(buffer32, 0, false);
        assert_eq!(directory32.security_cookie().unwrap(), 0x1234_5678);
    }
}
