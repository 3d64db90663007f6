//! Named integer domains used throughout the PE format: machine types, flag
//! sets, and the small closed taxonomies (data-directory kind, debug-record
//! type, relocation type, certificate type, well-known resource IDs).

pub mod certificate_type;
pub mod characteristics;
pub mod com_flags;
pub mod data_directory_kind;
pub mod debug_type;
pub mod dll_characteristics;
pub mod machine;
pub mod relocation_type;
pub mod resource_id;
pub mod section_flags;
pub mod subsystem;

pub use certificate_type::CertificateType;
pub use characteristics::FileCharacteristics;
pub use com_flags::ComImageFlags;
pub use data_directory_kind::{DataDirectoryKind, DATA_DIRECTORY_COUNT};
pub use debug_type::DebugType;
pub use dll_characteristics::DllCharacteristics;
pub use machine::Machine;
pub use relocation_type::RelocationType;
pub use resource_id::resolve_resource_id;
pub use section_flags::SectionCharacteristics;
pub use subsystem::Subsystem;
