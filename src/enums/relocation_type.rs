//! Base Relocation block entry `Type` (high 4 bits of each 16-bit entry).

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelocationType {
    Absolute,
    High,
    Low,
    HighLow,
    HighAdj,
    MachineSpecific5,
    Reserved6,
    MachineSpecific7,
    MachineSpecific8,
    MachineSpecific9,
    Dir64,
    Unknown(u8),
}

impl RelocationType {
    pub fn from_u8(value: u8) -> Self {
        match value & 0x0F {
            0 => Self::Absolute,
            1 => Self::High,
            2 => Self::Low,
            3 => Self::HighLow,
            4 => Self::HighAdj,
            5 => Self::MachineSpecific5,
            6 => Self::Reserved6,
            7 => Self::MachineSpecific7,
            8 => Self::MachineSpecific8,
            9 => Self::MachineSpecific9,
            10 => Self::Dir64,
            other => Self::Unknown(other),
        }
    }
}
