//! The fixed-position header structures: DOS header, NT headers (signature,
//! File Header, Optional Header), Data Directory, and Section Header table.

pub mod data_directory;
pub mod dos;
pub mod file_header;
pub mod nt;
pub mod optional_header;
pub mod section_header;

pub use data_directory::{DataDirectoryEntry, DataDirectoryTable};
pub use dos::DosHeader;
pub use file_header::FileHeader;
pub use nt::NtHeaders;
pub use optional_header::OptionalHeader;
pub use section_header::{SectionHeader, SectionTable};
