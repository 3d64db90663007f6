//! The `Machine` field of the COFF File Header identifies the CPU type an
//! image targets. An image file can run only on the specified machine, or
//! on a system that emulates it.

/// Identifies the type of target machine.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Machine {
    #[default]
    Unknown,
    Alpha,
    Alpha64,
    Am33,
    Amd64,
    Arm,
    Arm64,
    ArmNt,
    Ebc,
    I386,
    Ia64,
    LoongArch32,
    LoongArch64,
    M32R,
    Mips16,
    MipsFpu,
    MipsFpu16,
    PowerPc,
    PowerPcFp,
    R4000,
    RiscV32,
    RiscV64,
    RiscV128,
    Sh3,
    Sh4,
    Sh5,
    Thumb,
    WceMipsV2,
    /// Any machine type this crate does not name explicitly.
    Other(u16),
}

impl Machine {
    pub fn from_u16(value: u16) -> Self {
        match value {
            0x0000 => Self::Unknown,
            0x0184 => Self::Alpha,
            0x0284 => Self::Alpha64,
            0x01d3 => Self::Am33,
            0x8664 => Self::Amd64,
            0x01c0 => Self::Arm,
            0xaa64 => Self::Arm64,
            0x01c4 => Self::ArmNt,
            0x0ebc => Self::Ebc,
            0x014c => Self::I386,
            0x0200 => Self::Ia64,
            0x6232 => Self::LoongArch32,
            0x6264 => Self::LoongArch64,
            0x9041 => Self::M32R,
            0x0266 => Self::Mips16,
            0x0366 => Self::MipsFpu,
            0x0466 => Self::MipsFpu16,
            0x01f0 => Self::PowerPc,
            0x01f1 => Self::PowerPcFp,
            0x0166 => Self::R4000,
            0x5032 => Self::RiscV32,
            0x5064 => Self::RiscV64,
            0x5128 => Self::RiscV128,
            0x01a2 => Self::Sh3,
            0x01a6 => Self::Sh4,
            0x01a8 => Self::Sh5,
            0x01c2 => Self::Thumb,
            0x0169 => Self::WceMipsV2,
            other => Self::Other(other),
        }
    }

    pub fn to_u16(self) -> u16 {
        match self {
            Self::Unknown => 0x0000,
            Self::Alpha => 0x0184,
            Self::Alpha64 => 0x0284,
            Self::Am33 => 0x01d3,
            Self::Amd64 => 0x8664,
            Self::Arm => 0x01c0,
            Self::Arm64 => 0xaa64,
            Self::ArmNt => 0x01c4,
            Self::Ebc => 0x0ebc,
            Self::I386 => 0x014c,
            Self::Ia64 => 0x0200,
            Self::LoongArch32 => 0x6232,
            Self::LoongArch64 => 0x6264,
            Self::M32R => 0x9041,
            Self::Mips16 => 0x0266,
            Self::MipsFpu => 0x0366,
            Self::MipsFpu16 => 0x0466,
            Self::PowerPc => 0x01f0,
            Self::PowerPcFp => 0x01f1,
            Self::R4000 => 0x0166,
            Self::RiscV32 => 0x5032,
            Self::RiscV64 => 0x5064,
            Self::RiscV128 => 0x5128,
            Self::Sh3 => 0x01a2,
            Self::Sh4 => 0x01a6,
            Self::Sh5 => 0x01a8,
            Self::Thumb => 0x01c2,
            Self::WceMipsV2 => 0x0169,
            Self::Other(n) => n,
        }
    }

    /// amd64, arm64: targets where the Exception Directory is populated.
    pub fn has_exception_directory(self) -> bool {
        matches!(self, Self::Amd64 | Self::Arm64 | Self::Arm | Self::ArmNt)
    }
}
