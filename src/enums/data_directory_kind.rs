//! Names the 16 slots of the Optional Header's Data Directory table, in
//! declaration order.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataDirectoryKind {
    Export,
    Import,
    Resource,
    Exception,
    Security,
    BaseRelocation,
    Debug,
    Architecture,
    GlobalPtr,
    Tls,
    LoadConfig,
    BoundImport,
    Iat,
    DelayImport,
    ComDescriptor,
    Reserved,
}

pub const DATA_DIRECTORY_COUNT: usize = 16;

pub const DATA_DIRECTORY_KINDS: [DataDirectoryKind; DATA_DIRECTORY_COUNT] = [
    DataDirectoryKind::Export,
    DataDirectoryKind::Import,
    DataDirectoryKind::Resource,
    DataDirectoryKind::Exception,
    DataDirectoryKind::Security,
    DataDirectoryKind::BaseRelocation,
    DataDirectoryKind::Debug,
    DataDirectoryKind::Architecture,
    DataDirectoryKind::GlobalPtr,
    DataDirectoryKind::Tls,
    DataDirectoryKind::LoadConfig,
    DataDirectoryKind::BoundImport,
    DataDirectoryKind::Iat,
    DataDirectoryKind::DelayImport,
    DataDirectoryKind::ComDescriptor,
    DataDirectoryKind::Reserved,
];

impl DataDirectoryKind {
    pub fn index(self) -> usize {
        DATA_DIRECTORY_KINDS
            .iter()
            .position(|&k| k == self)
            .expect("every DataDirectoryKind variant appears in DATA_DIRECTORY_KINDS")
    }
}
