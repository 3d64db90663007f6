//! Debug Directory record `Type` field.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DebugType {
    Unknown,
    Coff,
    CodeView,
    Fpo,
    Misc,
    Exception,
    Fixup,
    OmapToSrc,
    OmapFromSrc,
    Borland,
    Reserved10,
    Clsid,
    VcFeature,
    Pogo,
    Iltcg,
    Mpx,
    Repro,
    ExtendedDllCharacteristics,
    Other(u32),
}

impl DebugType {
    pub fn from_u32(value: u32) -> Self {
        match value {
            0 => Self::Unknown,
            1 => Self::Coff,
            2 => Self::CodeView,
            3 => Self::Fpo,
            4 => Self::Misc,
            5 => Self::Exception,
            6 => Self::Fixup,
            7 => Self::OmapToSrc,
            8 => Self::OmapFromSrc,
            9 => Self::Borland,
            10 => Self::Reserved10,
            11 => Self::Clsid,
            12 => Self::VcFeature,
            13 => Self::Pogo,
            14 => Self::Iltcg,
            15 => Self::Mpx,
            16 => Self::Repro,
            20 => Self::ExtendedDllCharacteristics,
            other => Self::Other(other),
        }
    }

    pub fn to_u32(self) -> u32 {
        match self {
            Self::Unknown => 0,
            Self::Coff => 1,
            Self::CodeView => 2,
            Self::Fpo => 3,
            Self::Misc => 4,
            Self::Exception => 5,
            Self::Fixup => 6,
            Self::OmapToSrc => 7,
            Self::OmapFromSrc => 8,
            Self::Borland => 9,
            Self::Reserved10 => 10,
            Self::Clsid => 11,
            Self::VcFeature => 12,
            Self::Pogo => 13,
            Self::Iltcg => 14,
            Self::Mpx => 15,
            Self::Repro => 16,
            Self::ExtendedDllCharacteristics => 20,
            Self::Other(n) => n,
        }
    }
}
