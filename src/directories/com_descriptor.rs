//! COM+ (CLI) Header, per spec.md §4.13: the 72-byte `IMAGE_COR20_HEADER`
//! anchored by the ComDescriptor data-directory slot.

use crate::byteview::ByteView;
use crate::enums::ComImageFlags;
use crate::error::Result;

pub const COM_DESCRIPTOR_SIZE: usize = 72;

const CB_OFFSET: usize = 0x00;
const MAJOR_RUNTIME_VERSION_OFFSET: usize = 0x04;
const MINOR_RUNTIME_VERSION_OFFSET: usize = 0x06;
const META_DATA_OFFSET: usize = 0x08;
const FLAGS_OFFSET: usize = 0x10;
const ENTRY_POINT_OFFSET: usize = 0x14;
const RESOURCES_OFFSET: usize = 0x18;
const STRONG_NAME_SIGNATURE_OFFSET: usize = 0x20;
const CODE_MANAGER_TABLE_OFFSET: usize = 0x28;
const VTABLE_FIXUPS_OFFSET: usize = 0x30;
const EXPORT_ADDRESS_TABLE_JUMPS_OFFSET: usize = 0x38;
const MANAGED_NATIVE_HEADER_OFFSET: usize = 0x40;

/// A nested `(RVA, size)` sub-directory within the COM+ header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComSubDirectory {
    pub virtual_address: u32,
    pub size: u32,
}

/// A live window onto the 72-byte COM+/CLI header.
#[derive(Debug, Clone)]
pub struct ComDescriptor {
    buffer: ByteView,
    offset: usize,
}

impl ComDescriptor {
    pub(crate) fn new(buffer: ByteView, offset: usize) -> Self {
        Self { buffer, offset }
    }

    pub fn cb(&self) -> Result<u32> {
        self.buffer.read_u32(self.offset + CB_OFFSET)
    }

    pub fn major_runtime_version(&self) -> Result<u16> {
        self.buffer
            .read_u16(self.offset + MAJOR_RUNTIME_VERSION_OFFSET)
    }

    pub fn minor_runtime_version(&self) -> Result<u16> {
        self.buffer
            .read_u16(self.offset + MINOR_RUNTIME_VERSION_OFFSET)
    }

    fn sub_directory(&self, field_offset: usize) -> Result<ComSubDirectory> {
        Ok(ComSubDirectory {
            virtual_address: self.buffer.read_u32(self.offset + field_offset)?,
            size: self.buffer.read_u32(self.offset + field_offset + 4)?,
        })
    }

    pub fn meta_data(&self) -> Result<ComSubDirectory> {
        self.sub_directory(META_DATA_OFFSET)
    }

    pub fn resources(&self) -> Result<ComSubDirectory> {
        self.sub_directory(RESOURCES_OFFSET)
    }

    pub fn strong_name_signature(&self) -> Result<ComSubDirectory> {
        self.sub_directory(STRONG_NAME_SIGNATURE_OFFSET)
    }

    pub fn code_manager_table(&self) -> Result<ComSubDirectory> {
        self.sub_directory(CODE_MANAGER_TABLE_OFFSET)
    }

    pub fn vtable_fixups(&self) -> Result<ComSubDirectory> {
        self.sub_directory(VTABLE_FIXUPS_OFFSET)
    }

    pub fn export_address_table_jumps(&self) -> Result<ComSubDirectory> {
        self.sub_directory(EXPORT_ADDRESS_TABLE_JUMPS_OFFSET)
    }

    pub fn managed_native_header(&self) -> Result<ComSubDirectory> {
        self.sub_directory(MANAGED_NATIVE_HEADER_OFFSET)
    }

    pub fn flags(&self) -> Result<ComImageFlags> {
        let bits = self.buffer.read_u32(self.offset + FLAGS_OFFSET)?;
        Ok(ComImageFlags::from_bits_retain(bits))
    }

    /// The union field: an entry-point metadata token when
    /// `ComImageFlags::NATIVE_ENTRYPOINT` is clear, or a raw RVA when set.
    pub fn entry_point_token(&self) -> Result<u32> {
        self.buffer.read_u32(self.offset + ENTRY_POINT_OFFSET)
    }

    pub fn entry_point_rva(&self) -> Result<u32> {
        self.entry_point_token()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_header_and_sub_directories() {
        let buffer = ByteView::new(vec![0u8; COM_DESCRIPTOR_SIZE]);
        buffer.write_u32(CB_OFFSET, COM_DESCRIPTOR_SIZE as u32).unwrap();
        buffer.write_u16(MAJOR_RUNTIME_VERSION_OFFSET, 2).unwrap();
        buffer.write_u16(MINOR_RUNTIME_VERSION_OFFSET, 5).unwrap();
        buffer.write_u32(META_DATA_OFFSET, 0x2000).unwrap();
        buffer.write_u32(META_DATA_OFFSET + 4, 0x400).unwrap();
        buffer
            .write_u32(FLAGS_OFFSET, ComImageFlags::ILONLY.bits())
            .unwrap();

        let descriptor = ComDescriptor::new(buffer, 0);
        assert_eq!(descriptor.major_runtime_version().unwrap(), 2);
        assert_eq!(
            descriptor.meta_data().unwrap(),
            ComSubDirectory {
                virtual_address: 0x2000,
                size: 0x400
            }
        );
        assert!(descriptor.flags().unwrap().contains(ComImageFlags::ILONLY));
    }
}
