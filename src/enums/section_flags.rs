//! Section header `Characteristics` bit-flags.

use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct SectionCharacteristics: u32 {
        /// The section should not be padded to the next boundary. Valid only for object files.
        const TYPE_NO_PAD = 0x0000_0008;
        /// The section contains executable code.
        const CNT_CODE = 0x0000_0020;
        /// The section contains initialized data.
        const CNT_INITIALIZED_DATA = 0x0000_0040;
        /// The section contains uninitialized data.
        const CNT_UNINITIALIZED_DATA = 0x0000_0080;
        /// Reserved for future use.
        const LNK_OTHER = 0x0000_0100;
        /// The section contains comments or other information. Object files only.
        const LNK_INFO = 0x0000_0200;
        /// The section will not become part of the image. Object files only.
        const LNK_REMOVE = 0x0000_0800;
        /// The section contains COMDAT data. Object files only.
        const LNK_COMDAT = 0x0000_1000;
        /// The section contains data referenced through the global pointer (GP).
        const GPREL = 0x0000_8000;
        /// Align data on a 1-byte boundary. Object files only.
        const ALIGN_1BYTES = 0x0010_0000;
        /// Align data on a 2-byte boundary. Object files only.
        const ALIGN_2BYTES = 0x0020_0000;
        /// Align data on a 4-byte boundary. Object files only.
        const ALIGN_4BYTES = 0x0030_0000;
        /// Align data on an 8-byte boundary. Object files only.
        const ALIGN_8BYTES = 0x0040_0000;
        /// Align data on a 16-byte boundary. Object files only.
        const ALIGN_16BYTES = 0x0050_0000;
        /// Align data on a 32-byte boundary. Object files only.
        const ALIGN_32BYTES = 0x0060_0000;
        /// Align data on a 64-byte boundary. Object files only.
        const ALIGN_64BYTES = 0x0070_0000;
        /// Align data on a 128-byte boundary. Object files only.
        const ALIGN_128BYTES = 0x0080_0000;
        /// Align data on a 256-byte boundary. Object files only.
        const ALIGN_256BYTES = 0x0090_0000;
        /// Align data on a 512-byte boundary. Object files only.
        const ALIGN_512BYTES = 0x00A0_0000;
        /// Align data on a 1024-byte boundary. Object files only.
        const ALIGN_1024BYTES = 0x00B0_0000;
        /// Align data on a 2048-byte boundary. Object files only.
        const ALIGN_2048BYTES = 0x00C0_0000;
        /// Align data on a 4096-byte boundary. Object files only.
        const ALIGN_4096BYTES = 0x00D0_0000;
        /// Align data on an 8192-byte boundary. Object files only.
        const ALIGN_8192BYTES = 0x00E0_0000;
        /// The section contains extended relocations.
        const LNK_NRELOC_OVFL = 0x0100_0000;
        /// The section can be discarded as needed.
        const MEM_DISCARDABLE = 0x0200_0000;
        /// The section cannot be cached.
        const MEM_NOT_CACHED = 0x0400_0000;
        /// The section is not pageable.
        const MEM_NOT_PAGED = 0x0800_0000;
        /// The section can be shared in memory.
        const MEM_SHARED = 0x1000_0000;
        /// The section can be executed as code.
        const MEM_EXECUTE = 0x2000_0000;
        /// The section can be read.
        const MEM_READ = 0x4000_0000;
        /// The section can be written to.
        const MEM_WRITE = 0x8000_0000;
    }
}
