//! The complete set of error kinds a `pexp` accessor can return.
//!
//! These map one-to-one onto the error taxonomy used throughout the crate:
//! a read or write outside the buffer is [`Error::Bounds`], a caller-supplied
//! argument that can never be valid is [`Error::InvalidArgument`], an
//! operation that is well-formed but forbidden on this particular image is
//! [`Error::InvalidOperation`], a structural inconsistency discovered while
//! walking a directory is [`Error::InvalidData`], an RVA no section claims
//! is [`Error::Resolution`], and an underlying file operation failure is
//! [`Error::Io`].

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("read/write of {len} byte(s) at offset {offset} is out of bounds (buffer is {buffer_len} byte(s))")]
    Bounds {
        offset: usize,
        len: usize,
        buffer_len: usize,
    },

    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("invalid operation: {message}")]
    InvalidOperation { message: String },

    #[error("invalid data: {message}")]
    InvalidData { message: String },

    #[error("RVA 0x{rva:08x} is not contained in any section")]
    Resolution { rva: u32 },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn bounds(offset: usize, len: usize, buffer_len: usize) -> Self {
        Error::Bounds {
            offset,
            len,
            buffer_len,
        }
    }

    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Error::InvalidArgument {
            message: message.into(),
        }
    }

    pub(crate) fn invalid_operation(message: impl Into<String>) -> Self {
        Error::InvalidOperation {
            message: message.into(),
        }
    }

    pub(crate) fn invalid_data(message: impl Into<String>) -> Self {
        Error::InvalidData {
            message: message.into(),
        }
    }

    pub(crate) fn resolution(rva: u32) -> Self {
        Error::Resolution { rva }
    }
}
