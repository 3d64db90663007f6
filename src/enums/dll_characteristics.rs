//! Optional Header `DllCharacteristics` bit-flags.

use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct DllCharacteristics: u16 {
        /// Image can handle a high entropy 64-bit virtual address space.
        const HIGH_ENTROPY_VA = 0x0020;
        /// DLL can be relocated at load time.
        const DYNAMIC_BASE = 0x0040;
        /// Code Integrity checks are enforced.
        const FORCE_INTEGRITY = 0x0080;
        /// Image is NX compatible.
        const NX_COMPAT = 0x0100;
        /// Isolation aware, but do not isolate the image.
        const NO_ISOLATION = 0x0200;
        /// Does not use structured exception (SE) handling.
        const NO_SEH = 0x0400;
        /// Do not bind the image.
        const NO_BIND = 0x0800;
        /// Image must execute in an AppContainer.
        const APPCONTAINER = 0x1000;
        /// A WDM driver.
        const WDM_DRIVER = 0x2000;
        /// Image supports Control Flow Guard.
        const GUARD_CF = 0x4000;
        /// Terminal Server aware.
        const TERMINAL_SERVER_AWARE = 0x8000;
    }
}
