//! The `Image` facade: a single entry object owning the shared [`ByteView`]
//! and exposing every directory, bitness predicate, and save operation, per
//! spec.md §4.14.

use std::fs;
use std::path::{Path, PathBuf};

use crate::byteview::ByteView;
use crate::directories::base_relocation::BaseRelocationDirectory;
use crate::directories::bound_import::{self, BoundImportDescriptor};
use crate::directories::certificate::CertificateDirectory;
use crate::directories::com_descriptor::ComDescriptor;
use crate::directories::debug::DebugDirectory;
use crate::directories::exception::ExceptionDirectory;
use crate::directories::export::ExportDirectory;
use crate::directories::import::{self, DelayImportDescriptor, ImportDescriptor};
use crate::directories::load_config::LoadConfigDirectory;
use crate::directories::resource::ResourceDirectory;
use crate::directories::tls::TlsDirectory;
use crate::enums::{DataDirectoryKind, FileCharacteristics, Machine};
use crate::error::{Error, Result};
use crate::headers::dos::DosHeader;
use crate::headers::file_header::FileHeader;
use crate::headers::nt::NtHeaders;
use crate::headers::optional_header::OptionalHeader;
use crate::headers::section_header::{read_section_table, SectionTable};
use crate::rva::resolve_rva;

/// Owns the shared mutable buffer backing every view derived from it.
/// Constructed from an in-memory byte sequence or a filesystem path; mutated
/// in place through the header/directory accessors' setters; serialized
/// back verbatim with `save`/`save_to`.
#[derive(Debug, Clone)]
pub struct Image {
    buffer: ByteView,
    path: Option<PathBuf>,
}

impl Image {
    /// Reads the entire file at `path` into memory and parses it.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let mut image = Self::from_bytes(bytes)?;
        image.path = Some(path.to_path_buf());
        Ok(image)
    }

    /// Wraps an already in-memory byte sequence. Fails with
    /// **invalid-data** if `bytes` is empty.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        if bytes.is_empty() {
            return Err(Error::invalid_data("cannot parse an empty byte sequence as a PE image"));
        }
        Ok(Self {
            buffer: ByteView::new(bytes),
            path: None,
        })
    }

    pub fn dos_header(&self) -> DosHeader {
        DosHeader::new(self.buffer.clone(), 0)
    }

    pub fn nt_headers(&self) -> Result<NtHeaders> {
        let lfanew = self.dos_header().e_lfanew()? as usize;
        NtHeaders::new(self.buffer.clone(), lfanew)
    }

    pub fn file_header(&self) -> Result<FileHeader> {
        Ok(self.nt_headers()?.file_header())
    }

    pub fn optional_header(&self) -> Result<OptionalHeader> {
        self.nt_headers()?.optional_header()
    }

    pub fn sections(&self) -> Result<SectionTable> {
        let nt = self.nt_headers()?;
        let count = nt.file_header().number_of_sections()?;
        let image_base = nt.optional_header()?.image_base()?;
        read_section_table(&self.buffer, nt.section_table_offset()?, count, image_base)
    }

    pub fn is_32bit(&self) -> Result<bool> {
        Ok(!self.optional_header()?.is_64bit())
    }

    pub fn is_64bit(&self) -> Result<bool> {
        Ok(self.optional_header()?.is_64bit())
    }

    pub fn is_exe(&self) -> Result<bool> {
        Ok(self
            .file_header()?
            .characteristics()?
            .contains(FileCharacteristics::EXECUTABLE_IMAGE))
    }

    pub fn is_dll(&self) -> Result<bool> {
        Ok(self
            .file_header()?
            .characteristics()?
            .contains(FileCharacteristics::DLL))
    }

    pub fn machine(&self) -> Result<Machine> {
        self.file_header()?.machine()
    }

    /// Resolves a data-directory slot to a `(file offset, declared size)`
    /// pair. Returns `Ok(None)` — not an error — whenever the slot is empty
    /// or its RVA cannot be resolved against the section table; per
    /// spec.md §4.14, only corrupt field reads produce an error here.
    fn directory_location(&self, kind: DataDirectoryKind) -> Result<Option<(usize, u32)>> {
        let optional_header = self.optional_header()?;
        let entry = optional_header.data_directory().entry(kind);
        if !entry.is_present()? {
            log::debug!("data directory {:?} is absent", kind);
            return Ok(None);
        }
        let rva = entry.virtual_address()?;
        let size = entry.size()?;
        let sections = self.sections()?;
        match resolve_rva(rva, &sections) {
            Ok(offset) => Ok(Some((offset, size))),
            Err(Error::Resolution { .. }) => {
                log::debug!(
                    "data directory {:?} rva {:#x} did not resolve against any section",
                    kind,
                    rva
                );
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    pub fn export_directory(&self) -> Result<Option<ExportDirectory>> {
        let Some((offset, _size)) = self.directory_location(DataDirectoryKind::Export)? else {
            return Ok(None);
        };
        let entry = self
            .optional_header()?
            .data_directory()
            .entry(DataDirectoryKind::Export);
        Ok(Some(ExportDirectory::new(
            self.buffer.clone(),
            offset,
            entry.virtual_address()?,
            entry.size()?,
            self.sections()?,
        )))
    }

    /// Walks the Import Directory's descriptor table to its terminator.
    pub fn import_descriptors(&self) -> Result<Vec<ImportDescriptor>> {
        let Some((offset, _size)) = self.directory_location(DataDirectoryKind::Import)? else {
            return Ok(Vec::new());
        };
        let is_64bit = self.is_64bit()?;
        let iat_size = self
            .optional_header()?
            .data_directory()
            .entry(DataDirectoryKind::Iat)
            .size()
            .unwrap_or(0);
        import::read_import_descriptors(&self.buffer, offset, is_64bit, iat_size, &self.sections()?)
    }

    pub fn delay_import_descriptors(&self) -> Result<Vec<DelayImportDescriptor>> {
        let Some((offset, _size)) = self.directory_location(DataDirectoryKind::DelayImport)? else {
            return Ok(Vec::new());
        };
        import::read_delay_import_descriptors(&self.buffer, offset)
    }

    pub fn resource_directory(&self) -> Result<Option<ResourceDirectory>> {
        let Some((offset, size)) = self.directory_location(DataDirectoryKind::Resource)? else {
            return Ok(None);
        };
        Ok(Some(ResourceDirectory::new(
            self.buffer.clone(),
            offset,
            size as usize,
        )))
    }

    /// Empty on machines without an Exception Directory (32-bit targets),
    /// per spec.md §4.8.
    pub fn exception_directory(&self) -> Result<Option<ExceptionDirectory>> {
        if !self.machine()?.has_exception_directory() {
            return Ok(None);
        }
        let Some((offset, size)) = self.directory_location(DataDirectoryKind::Exception)? else {
            return Ok(None);
        };
        Ok(Some(ExceptionDirectory::new(self.buffer.clone(), offset, size)))
    }

    pub fn tls_directory(&self) -> Result<Option<TlsDirectory>> {
        let Some((offset, _size)) = self.directory_location(DataDirectoryKind::Tls)? else {
            return Ok(None);
        };
        Ok(Some(TlsDirectory::new(
            self.buffer.clone(),
            offset,
            self.is_64bit()?,
            self.sections()?,
        )))
    }

    pub fn load_config_directory(&self) -> Result<Option<LoadConfigDirectory>> {
        let Some((offset, _size)) = self.directory_location(DataDirectoryKind::LoadConfig)? else {
            return Ok(None);
        };
        Ok(Some(LoadConfigDirectory::new(
            self.buffer.clone(),
            offset,
            self.is_64bit()?,
        )))
    }

    pub fn base_relocation_directory(&self) -> Result<Option<BaseRelocationDirectory>> {
        let Some((offset, size)) = self.directory_location(DataDirectoryKind::BaseRelocation)? else {
            return Ok(None);
        };
        Ok(Some(BaseRelocationDirectory::new(self.buffer.clone(), offset, size)))
    }

    pub fn debug_directory(&self) -> Result<Option<DebugDirectory>> {
        let Some((offset, size)) = self.directory_location(DataDirectoryKind::Debug)? else {
            return Ok(None);
        };
        Ok(Some(DebugDirectory::new(
            self.buffer.clone(),
            offset,
            size,
            self.sections()?,
        )))
    }

    pub fn bound_import_descriptors(&self) -> Result<Vec<BoundImportDescriptor>> {
        let Some((offset, _size)) = self.directory_location(DataDirectoryKind::BoundImport)? else {
            return Ok(Vec::new());
        };
        bound_import::read_bound_import_descriptors(&self.buffer, offset)
    }

    /// The Security Data Directory's `VirtualAddress` is a raw file offset,
    /// not an RVA — it is read directly rather than through
    /// [`Self::directory_location`], which assumes RVA semantics.
    pub fn certificate_directory(&self) -> Result<Option<CertificateDirectory>> {
        let entry = self
            .optional_header()?
            .data_directory()
            .entry(DataDirectoryKind::Security);
        if !entry.is_present()? {
            return Ok(None);
        }
        Ok(Some(CertificateDirectory::new(
            self.buffer.clone(),
            entry.virtual_address()? as usize,
            entry.size()?,
        )))
    }

    pub fn com_descriptor(&self) -> Result<Option<ComDescriptor>> {
        let Some((offset, _size)) = self.directory_location(DataDirectoryKind::ComDescriptor)? else {
            return Ok(None);
        };
        Ok(Some(ComDescriptor::new(self.buffer.clone(), offset)))
    }

    /// Serializes the current buffer to the path this image was opened
    /// from. Fails with **invalid-operation** if this image was constructed
    /// from bytes and never given a path.
    pub fn save(&self) -> Result<()> {
        let path = self
            .path
            .as_ref()
            .ok_or_else(|| Error::invalid_operation("image has no associated path; use save_to"))?;
        self.save_to(path)
    }

    /// Serializes the current buffer to `path`, truncating any existing
    /// file, without requiring a previously stored path.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, self.buffer.snapshot())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headers::optional_header::MAGIC_PE32_PLUS;

    fn minimal_pe32plus_image() -> Vec<u8> {
        let lfanew = 0x80usize;
        let optional_header_offset = lfanew + 0x18;
        let data_directory_offset = optional_header_offset + 0x70;
        let section_table_offset = optional_header_offset + 0xF0;
        let mut bytes = vec![0u8; section_table_offset + 40];

        bytes[0..2].copy_from_slice(&0x5A4Du16.to_le_bytes());
        bytes[0x3C..0x40].copy_from_slice(&(lfanew as u32).to_le_bytes());

        bytes[lfanew..lfanew + 4].copy_from_slice(&0x0000_4550u32.to_le_bytes());
        // File header
        bytes[lfanew + 4..lfanew + 6].copy_from_slice(&0x8664u16.to_le_bytes()); // Amd64
        bytes[lfanew + 6..lfanew + 8].copy_from_slice(&1u16.to_le_bytes()); // NumberOfSections
        bytes[lfanew + 0x14..lfanew + 0x16].copy_from_slice(&0xF0u16.to_le_bytes()); // SizeOfOptionalHeader
        bytes[lfanew + 0x16..lfanew + 0x18]
            .copy_from_slice(&(FileCharacteristics::EXECUTABLE_IMAGE.bits()).to_le_bytes());

        // Optional header
        bytes[optional_header_offset..optional_header_offset + 2]
            .copy_from_slice(&MAGIC_PE32_PLUS.to_le_bytes());
        bytes[optional_header_offset + 0x10..optional_header_offset + 0x14]
            .copy_from_slice(&0x1234u32.to_le_bytes()); // AddressOfEntryPoint
        bytes[optional_header_offset + 0x18..optional_header_offset + 0x20]
            .copy_from_slice(&0x1_4000_0000u64.to_le_bytes()); // ImageBase

        let _ = data_directory_offset;
        bytes
    }

    #[test]
    fn scenario_a_bitness_probe_and_entry_point() {
        let image = Image::from_bytes(minimal_pe32plus_image()).unwrap();
        assert!(image.is_64bit().unwrap());
        assert!(!image.is_32bit().unwrap());
        assert_eq!(
            image.optional_header().unwrap().address_of_entry_point().unwrap(),
            0x1234
        );
        assert!(image.is_exe().unwrap());
        assert!(!image.is_dll().unwrap());
    }

    #[test]
    fn empty_bytes_is_invalid_data() {
        assert!(matches!(
            Image::from_bytes(Vec::new()),
            Err(Error::InvalidData { .. })
        ));
    }

    #[test]
    fn absent_export_directory_is_none_not_error() {
        let image = Image::from_bytes(minimal_pe32plus_image()).unwrap();
        assert!(image.export_directory().unwrap().is_none());
        assert!(image.tls_directory().unwrap().is_none());
        assert!(image.load_config_directory().unwrap().is_none());
    }

    #[test]
    fn scenario_f_round_trip_under_checksum_mutation() {
        let bytes = minimal_pe32plus_image();
        let image = Image::from_bytes(bytes.clone()).unwrap();
        let optional_header = image.optional_header().unwrap();
        let original = optional_header.check_sum().unwrap();
        optional_header.set_check_sum(original + 1).unwrap();

        let dir = tempfile_path();
        image.save_to(&dir).unwrap();
        let saved = std::fs::read(&dir).unwrap();
        std::fs::remove_file(&dir).ok();

        assert_eq!(saved.len(), bytes.len());
        let checksum_offset = 0x80 + 0x18 + 0x40;
        for i in 0..saved.len() {
            if i < checksum_offset || i >= checksum_offset + 4 {
                assert_eq!(saved[i], bytes[i], "byte {} should be unchanged", i);
            }
        }
        assert_eq!(
            u32::from_le_bytes(saved[checksum_offset..checksum_offset + 4].try_into().unwrap()),
            original + 1
        );
    }

    fn tempfile_path() -> PathBuf {
        use std::sync::atomic::{AtomicU32, Ordering};
        static COUNTER: AtomicU32 = AtomicU32::new(0);
        let mut path = std::env::temp_dir();
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        path.push(format!("pexp-test-{}-{}.bin", std::process::id(), n));
        path
    }
}
