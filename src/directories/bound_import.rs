//! Bound-Import Directory, per spec.md §4.13 and SPEC_FULL.md §4's
//! forwarder-ref supplement from `ImageBoundImport.h`/`.cpp`.

use crate::byteview::ByteView;
use crate::error::Result;

pub const BOUND_IMPORT_DESCRIPTOR_SIZE: usize = 8;
const FORWARDER_REF_SIZE: usize = 8;

const TIME_DATE_STAMP_OFFSET: usize = 0x00;
const OFFSET_MODULE_NAME_OFFSET: usize = 0x04;
const NUMBER_OF_MODULE_FORWARDER_REFS_OFFSET: usize = 0x06;

/// One forwarder-ref record immediately following a bound-import
/// descriptor that declares `NumberOfModuleForwarderRefs > 0`.
#[derive(Debug, Clone)]
pub struct ForwarderRef {
    buffer: ByteView,
    offset: usize,
}

impl ForwarderRef {
    pub fn time_date_stamp(&self) -> Result<u32> {
        self.buffer.read_u32(self.offset)
    }

    pub fn offset_module_name(&self) -> Result<u16> {
        self.buffer.read_u16(self.offset + 4)
    }
}

/// A live window onto one 8-byte bound-import descriptor.
#[derive(Debug, Clone)]
pub struct BoundImportDescriptor {
    buffer: ByteView,
    offset: usize,
}

impl BoundImportDescriptor {
    pub(crate) fn new(buffer: ByteView, offset: usize) -> Self {
        Self { buffer, offset }
    }

    pub fn time_date_stamp(&self) -> Result<u32> {
        self.buffer.read_u32(self.offset + TIME_DATE_STAMP_OFFSET)
    }

    pub fn offset_module_name(&self) -> Result<u16> {
        self.buffer
            .read_u16(self.offset + OFFSET_MODULE_NAME_OFFSET)
    }

    pub fn number_of_module_forwarder_refs(&self) -> Result<u16> {
        self.buffer
            .read_u16(self.offset + NUMBER_OF_MODULE_FORWARDER_REFS_OFFSET)
    }

    /// True when both `TimeDateStamp` and `OffsetModuleName` are zero — the
    /// terminator convention SPEC_FULL mirrors from the import/delay-import
    /// tables, since the source left this unspecified.
    pub fn is_terminator(&self) -> Result<bool> {
        Ok(self.time_date_stamp()? == 0 && self.offset_module_name()? == 0)
    }

    /// The forwarder-ref sub-sequence immediately following this
    /// descriptor, `number_of_module_forwarder_refs()` records long.
    pub fn forwarder_refs(&self) -> Result<Vec<ForwarderRef>> {
        let count = self.number_of_module_forwarder_refs()? as usize;
        let base = self.offset + BOUND_IMPORT_DESCRIPTOR_SIZE;
        Ok((0..count)
            .map(|i| ForwarderRef {
                buffer: self.buffer.clone(),
                offset: base + i * FORWARDER_REF_SIZE,
            })
            .collect())
    }
}

/// Walks the bound-import descriptor list, each descriptor followed in-line
/// by its own forwarder-ref records, stopping at the first zero descriptor.
pub(crate) fn read_bound_import_descriptors(
    buffer: &ByteView,
    offset: usize,
) -> Result<Vec<BoundImportDescriptor>> {
    let mut descriptors = Vec::new();
    let mut current = offset;
    loop {
        let descriptor = BoundImportDescriptor::new(buffer.clone(), current);
        if descriptor.is_terminator()? {
            break;
        }
        let forwarder_count = descriptor.number_of_module_forwarder_refs()? as usize;
        current += BOUND_IMPORT_DESCRIPTOR_SIZE + forwarder_count * FORWARDER_REF_SIZE;
        descriptors.push(descriptor);
    }
    Ok(descriptors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forwarder_refs_follow_their_descriptor() {
        let buffer = ByteView::new(vec![0u8; 0x40]);
        buffer.write_u32(TIME_DATE_STAMP_OFFSET, 0x1111_1111).unwrap();
        buffer.write_u16(OFFSET_MODULE_NAME_OFFSET, 8).unwrap();
        buffer
            .write_u16(NUMBER_OF_MODULE_FORWARDER_REFS_OFFSET, 2)
            .unwrap();

        buffer
            .write_u32(BOUND_IMPORT_DESCRIPTOR_SIZE, 0x2222_2222)
            .unwrap();
        buffer
            .write_u16(BOUND_IMPORT_DESCRIPTOR_SIZE + 4, 16)
            .unwrap();
        buffer
            .write_u32(BOUND_IMPORT_DESCRIPTOR_SIZE + FORWARDER_REF_SIZE, 0x3333_3333)
            .unwrap();
        buffer
            .write_u16(BOUND_IMPORT_DESCRIPTOR_SIZE + FORWARDER_REF_SIZE + 4, 24)
            .unwrap();

        let descriptor = BoundImportDescriptor::new(buffer, 0);
        let refs = descriptor.forwarder_refs().unwrap();
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].time_date_stamp().unwrap(), 0x2222_2222);
        assert_eq!(refs[1].offset_module_name().unwrap(), 24);
    }

    #[test]
    fn zero_descriptor_terminates_list() {
        let buffer = ByteView::new(vec![0u8; BOUND_IMPORT_DESCRIPTOR_SIZE]);
        let descriptors = read_bound_import_descriptors(&buffer, 0).unwrap();
        assert!(descriptors.is_empty());
    }

    #[test]
    fn read_descriptor_list_skips_past_forwarder_refs() {
        let buffer = ByteView::new(vec![0u8; 0x40]);
        buffer.write_u32(TIME_DATE_STAMP_OFFSET, 1).unwrap();
        buffer.write_u16(OFFSET_MODULE_NAME_OFFSET, 4).unwrap();
        buffer
            .write_u16(NUMBER_OF_MODULE_FORWARDER_REFS_OFFSET, 1)
            .unwrap();
        // Next descriptor, after one forwarder-ref record, is all zero.
        let descriptors = read_bound_import_descriptors(&buffer, 0).unwrap();
        assert_eq!(descriptors.len(), 1);
    }
}
