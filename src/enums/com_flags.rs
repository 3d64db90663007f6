//! COM+ (CLI) header `Flags` bit-flags.

use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct ComImageFlags: u32 {
        const ILONLY = 0x0000_0001;
        const BIT32_REQUIRED = 0x0000_0002;
        const IL_LIBRARY = 0x0000_0004;
        const STRONG_NAME_SIGNED = 0x0000_0008;
        const NATIVE_ENTRYPOINT = 0x0000_0010;
        const TRACK_DEBUG_DATA = 0x0001_0000;
        const BIT32_PREFERRED = 0x0002_0000;
    }
}
