//! The Data Directory-addressed structures: imports, exports, resources,
//! exceptions, TLS, load config, base relocations, debug info, delay
//! imports, bound imports, certificates, and the COM+/CLI header.

pub mod base_relocation;
pub mod bound_import;
pub mod certificate;
pub mod com_descriptor;
pub mod debug;
pub mod exception;
pub mod export;
pub mod import;
pub mod load_config;
pub mod resource;
pub mod tls;

pub use base_relocation::{BaseRelocationDirectory, RelocationBlock, RelocationEntry};
pub use bound_import::{BoundImportDescriptor, ForwarderRef};
pub use certificate::{CertificateDirectory, CertificateEntries, CertificateEntry};
pub use com_descriptor::{ComDescriptor, ComSubDirectory};
pub use debug::{CodeViewRecord, DebugDirectory, DebugDirectoryEntry};
pub use exception::{ExceptionDirectory, RuntimeFunction};
pub use export::{ExportDirectory, ExportFunction};
pub use import::{DelayImportDescriptor, ImportDescriptor, ImportFunction};
pub use load_config::LoadConfigDirectory;
pub use resource::{ResourceDataEntry, ResourceDirectory, ResourceEntry, ResourceIdentifier};
pub use tls::TlsDirectory;
