//! COFF File Header `Characteristics` bit-flags.

use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct FileCharacteristics: u16 {
        /// Image only. The file does not contain base relocations and must be loaded
        /// at its preferred base address.
        const RELOCS_STRIPPED = 0x0001;
        /// Image only. The image file is valid and can be run.
        const EXECUTABLE_IMAGE = 0x0002;
        /// COFF line numbers have been removed. Deprecated, should be zero.
        const LINE_NUMS_STRIPPED = 0x0004;
        /// COFF symbol table entries for local symbols have been removed. Deprecated.
        const LOCAL_SYMS_STRIPPED = 0x0008;
        /// Obsolete. Aggressively trim working set.
        const AGGRESSIVE_WS_TRIM = 0x0010;
        /// Application can handle > 2-GB addresses.
        const LARGE_ADDRESS_AWARE = 0x0020;
        /// Reserved for future use.
        const RESERVED = 0x0040;
        /// Little endian. Deprecated, should be zero.
        const BYTES_REVERSED_LO = 0x0080;
        /// Machine is based on a 32-bit-word architecture.
        const MACHINE_32BIT = 0x0100;
        /// Debugging information is removed from the image file.
        const DEBUG_STRIPPED = 0x0200;
        /// If the image is on removable media, fully load it and copy it to the swap file.
        const REMOVABLE_RUN_FROM_SWAP = 0x0400;
        /// If the image is on network media, fully load it and copy it to the swap file.
        const NET_RUN_FROM_SWAP = 0x0800;
        /// The image file is a system file, not a user program.
        const SYSTEM = 0x1000;
        /// The image file is a dynamic-link library (DLL).
        const DLL = 0x2000;
        /// The file should be run only on a uniprocessor machine.
        const UP_SYSTEM_ONLY = 0x4000;
        /// Big endian. Deprecated, should be zero.
        const BYTES_REVERSED_HI = 0x8000;
    }
}
