//! The MS-DOS stub header (`IMAGE_DOS_HEADER`), anchored at file offset 0.
//!
//! Field layout and names are carried over from the original POEX
//! `ImageDosHeader.h`/`.cpp` sources: beyond `e_magic` and `e_lfanew`, the
//! legacy MS-DOS loader fields are exposed individually rather than folded
//! into an opaque padding blob.

use crate::byteview::ByteView;
use crate::error::{Error, Result};

pub const DOS_HEADER_SIZE: usize = 0x40;
pub const MZ_MAGIC: u16 = 0x5A4D;

const E_MAGIC: usize = 0x00;
const E_CBLP: usize = 0x02;
const E_CP: usize = 0x04;
const E_CRLC: usize = 0x06;
const E_CPARHDR: usize = 0x08;
const E_MINALLOC: usize = 0x0A;
const E_MAXALLOC: usize = 0x0C;
const E_SS: usize = 0x0E;
const E_SP: usize = 0x10;
const E_CSUM: usize = 0x12;
const E_IP: usize = 0x14;
const E_CS: usize = 0x16;
const E_LFARLC: usize = 0x18;
const E_OVNO: usize = 0x1A;
const E_RES: usize = 0x1C; // 4 x u16
const E_OEMID: usize = 0x24;
const E_OEMINFO: usize = 0x26;
const E_RES2: usize = 0x28; // 10 x u16
const E_LFANEW: usize = 0x3C;

/// A live window onto the 64-byte MS-DOS header.
#[derive(Debug, Clone)]
pub struct DosHeader {
    buffer: ByteView,
    offset: usize,
}

impl DosHeader {
    pub(crate) fn new(buffer: ByteView, offset: usize) -> Self {
        Self { buffer, offset }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn e_magic(&self) -> Result<u16> {
        self.buffer.read_u16(self.offset + E_MAGIC)
    }

    pub fn set_e_magic(&self, value: u16) -> Result<()> {
        self.buffer.write_u16(self.offset + E_MAGIC, value)
    }

    pub fn is_mz(&self) -> Result<bool> {
        Ok(self.e_magic()? == MZ_MAGIC)
    }

    pub fn e_cblp(&self) -> Result<u16> {
        self.buffer.read_u16(self.offset + E_CBLP)
    }
    pub fn set_e_cblp(&self, value: u16) -> Result<()> {
        self.buffer.write_u16(self.offset + E_CBLP, value)
    }

    pub fn e_cp(&self) -> Result<u16> {
        self.buffer.read_u16(self.offset + E_CP)
    }
    pub fn set_e_cp(&self, value: u16) -> Result<()> {
        self.buffer.write_u16(self.offset + E_CP, value)
    }

    pub fn e_crlc(&self) -> Result<u16> {
        self.buffer.read_u16(self.offset + E_CRLC)
    }
    pub fn set_e_crlc(&self, value: u16) -> Result<()> {
        self.buffer.write_u16(self.offset + E_CRLC, value)
    }

    pub fn e_cparhdr(&self) -> Result<u16> {
        self.buffer.read_u16(self.offset + E_CPARHDR)
    }
    pub fn set_e_cparhdr(&self, value: u16) -> Result<()> {
        self.buffer.write_u16(self.offset + E_CPARHDR, value)
    }

    pub fn e_minalloc(&self) -> Result<u16> {
        self.buffer.read_u16(self.offset + E_MINALLOC)
    }
    pub fn set_e_minalloc(&self, value: u16) -> Result<()> {
        self.buffer.write_u16(self.offset + E_MINALLOC, value)
    }

    pub fn e_maxalloc(&self) -> Result<u16> {
        self.buffer.read_u16(self.offset + E_MAXALLOC)
    }
    pub fn set_e_maxalloc(&self, value: u16) -> Result<()> {
        self.buffer.write_u16(self.offset + E_MAXALLOC, value)
    }

    pub fn e_ss(&self) -> Result<u16> {
        self.buffer.read_u16(self.offset + E_SS)
    }
    pub fn set_e_ss(&self, value: u16) -> Result<()> {
        self.buffer.write_u16(self.offset + E_SS, value)
    }

    pub fn e_sp(&self) -> Result<u16> {
        self.buffer.read_u16(self.offset + E_SP)
    }
    pub fn set_e_sp(&self, value: u16) -> Result<()> {
        self.buffer.write_u16(self.offset + E_SP, value)
    }

    pub fn e_csum(&self) -> Result<u16> {
        self.buffer.read_u16(self.offset + E_CSUM)
    }
    pub fn set_e_csum(&self, value: u16) -> Result<()> {
        self.buffer.write_u16(self.offset + E_CSUM, value)
    }

    pub fn e_ip(&self) -> Result<u16> {
        self.buffer.read_u16(self.offset + E_IP)
    }
    pub fn set_e_ip(&self, value: u16) -> Result<()> {
        self.buffer.write_u16(self.offset + E_IP, value)
    }

    pub fn e_cs(&self) -> Result<u16> {
        self.buffer.read_u16(self.offset + E_CS)
    }
    pub fn set_e_cs(&self, value: u16) -> Result<()> {
        self.buffer.write_u16(self.offset + E_CS, value)
    }

    pub fn e_lfarlc(&self) -> Result<u16> {
        self.buffer.read_u16(self.offset + E_LFARLC)
    }
    pub fn set_e_lfarlc(&self, value: u16) -> Result<()> {
        self.buffer.write_u16(self.offset + E_LFARLC, value)
    }

    pub fn e_ovno(&self) -> Result<u16> {
        self.buffer.read_u16(self.offset + E_OVNO)
    }
    pub fn set_e_ovno(&self, value: u16) -> Result<()> {
        self.buffer.write_u16(self.offset + E_OVNO, value)
    }

    /// The first reserved array: 4 words.
    pub fn e_res(&self) -> Result<[u16; 4]> {
        let mut out = [0u16; 4];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = self.buffer.read_u16(self.offset + E_RES + i * 2)?;
        }
        Ok(out)
    }

    pub fn e_oemid(&self) -> Result<u16> {
        self.buffer.read_u16(self.offset + E_OEMID)
    }
    pub fn set_e_oemid(&self, value: u16) -> Result<()> {
        self.buffer.write_u16(self.offset + E_OEMID, value)
    }

    pub fn e_oeminfo(&self) -> Result<u16> {
        self.buffer.read_u16(self.offset + E_OEMINFO)
    }
    pub fn set_e_oeminfo(&self, value: u16) -> Result<()> {
        self.buffer.write_u16(self.offset + E_OEMINFO, value)
    }

    /// The second reserved array: 10 words.
    pub fn e_res2(&self) -> Result<[u16; 10]> {
        let mut out = [0u16; 10];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = self.buffer.read_u16(self.offset + E_RES2 + i * 2)?;
        }
        Ok(out)
    }

    /// The file offset of the NT header.
    pub fn e_lfanew(&self) -> Result<u32> {
        self.buffer.read_u32(self.offset + E_LFANEW)
    }

    pub fn set_e_lfanew(&self, value: u32) -> Result<()> {
        if (value as usize) < self.offset + DOS_HEADER_SIZE {
            return Err(Error::invalid_argument(
                "e_lfanew cannot point inside the DOS header itself",
            ));
        }
        self.buffer.write_u32(self.offset + E_LFANEW, value)
    }
}
