//! Certificate ("Security") Directory, per spec.md §4.13 and SPEC_FULL.md
//! §4's supplement: the original POEX sources treat this directory as an
//! iterable sequence of attribute-certificate records, not a single one.
//!
//! Unlike every other directory, the Security Data Directory's
//! `VirtualAddress` is a raw file offset, not an RVA — no section lookup is
//! involved.

use crate::byteview::ByteView;
use crate::enums::CertificateType;
use crate::error::Result;

const HEADER_SIZE: usize = 8;

const LENGTH_OFFSET: usize = 0x00;
const REVISION_OFFSET: usize = 0x04;
const CERTIFICATE_TYPE_OFFSET: usize = 0x06;

/// One `WIN_CERTIFICATE` record: length-prefixed metadata plus opaque
/// signature bytes. ASN.1/PKCS decoding of those bytes is out of scope —
/// this crate hands back the raw slice.
#[derive(Debug, Clone)]
pub struct CertificateEntry {
    pub length: u32,
    pub revision: u16,
    pub certificate_type: CertificateType,
    pub data: Vec<u8>,
}

/// Iterates consecutive, 8-byte-aligned certificate records starting at
/// `offset` until `directory_size` bytes have been consumed.
pub struct CertificateEntries<'a> {
    buffer: &'a ByteView,
    cursor: usize,
    end: usize,
}

impl<'a> Iterator for CertificateEntries<'a> {
    type Item = Result<CertificateEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor + HEADER_SIZE > self.end {
            return None;
        }

        let length = match self.buffer.read_u32(self.cursor + LENGTH_OFFSET) {
            Ok(v) => v,
            Err(e) => return Some(Err(e)),
        };
        let revision = match self.buffer.read_u16(self.cursor + REVISION_OFFSET) {
            Ok(v) => v,
            Err(e) => return Some(Err(e)),
        };
        let certificate_type = match self.buffer.read_u16(self.cursor + CERTIFICATE_TYPE_OFFSET) {
            Ok(v) => CertificateType::from_u16(v),
            Err(e) => return Some(Err(e)),
        };

        let data_len = (length as usize).saturating_sub(HEADER_SIZE);
        let data = match self.buffer.read_bytes(self.cursor + HEADER_SIZE, data_len) {
            Ok(v) => v,
            Err(e) => return Some(Err(e)),
        };

        // Records are 8-byte aligned; advance by the padded length.
        let padded_length = (length as usize + 7) & !7;
        self.cursor += padded_length.max(HEADER_SIZE);

        Some(Ok(CertificateEntry {
            length,
            revision,
            certificate_type,
            data,
        }))
    }
}

/// A live window onto the Certificate Directory.
#[derive(Debug, Clone)]
pub struct CertificateDirectory {
    buffer: ByteView,
    offset: usize,
    directory_size: u32,
}

impl CertificateDirectory {
    pub(crate) fn new(buffer: ByteView, offset: usize, directory_size: u32) -> Self {
        Self {
            buffer,
            offset,
            directory_size,
        }
    }

    pub fn entries(&self) -> CertificateEntries<'_> {
        CertificateEntries {
            buffer: &self.buffer,
            cursor: self.offset,
            end: self.offset + self.directory_size as usize,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn iterates_two_aligned_entries() {
        let buffer = ByteView::new(vec![0u8; 0x40]);
        // First entry: length 10 (8 header + 2 data), padded to 16.
        buffer.write_u32(0x00, 10).unwrap();
        buffer.write_u16(0x04, 0x0200).unwrap();
        buffer.write_u16(0x06, 0x0001).unwrap();
        buffer.write_bytes(0x08, &[0xAA, 0xBB]).unwrap();

        // Second entry starts at the 8-byte-aligned offset 0x10.
        buffer.write_u32(0x10, 8).unwrap();
        buffer.write_u16(0x14, 0x0200).unwrap();
        buffer.write_u16(0x16, 0x0002).unwrap();

        let directory = CertificateDirectory::new(buffer, 0, 0x18);
        let entries: Result<Vec<_>> = directory.entries().collect();
        let entries = entries.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].data, vec![0xAA, 0xBB]);
        assert_eq!(entries[0].certificate_type, CertificateType::X509);
        assert_eq!(entries[1].certificate_type, CertificateType::PkcsSignedData);
    }

    #[test]
    fn declared_length_past_buffer_fails_bounds() {
        let buffer = ByteView::new(vec![0u8; 0x10]);
        buffer.write_u32(0x00, 0x1000).unwrap();
        let directory = CertificateDirectory::new(buffer, 0, 0x1000);
        let first = directory.entries().next().unwrap();
        assert!(matches!(first, Err(Error::Bounds { .. })));
    }
}
