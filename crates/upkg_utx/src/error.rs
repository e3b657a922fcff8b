//! Error types that can be emitted from this library

use std::{collections::TryReserveError, path::PathBuf};

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent warpper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Transparent warpper for [`binrw::Error`]
    #[error(transparent)]
    BinRWError(#[from] binrw::Error),

    /// unable to open {path}
    #[error("unable to open {}", path.display())]
    CouldNotOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// file has an invalid package header
    #[error("file has an invalid package header")]
    #[diagnostic(help("the file is not an Unreal package or its tables are corrupt"))]
    InvalidHeader(#[from] InvalidHeaderError),

    /// no target to load the package into
    #[error("no target to load the package into")]
    IllegalOperation,

    /// unable to allocate a table
    #[error("unable to allocate a table")]
    AllocationFailure(#[from] TryReserveError),

    /// {0}
    #[error("{0}")]
    CustomError(String),
}

impl Error {
    /// Folds a raw stream failure raised while reading a table into [`Error::InvalidHeader`]
    pub(crate) fn into_invalid_header(self) -> Self {
        match self {
            Error::IOError(e) => InvalidHeaderError::Stream(binrw::Error::Io(e)).into(),
            Error::BinRWError(e) => InvalidHeaderError::Stream(e).into(),
            other => other,
        }
    }
}

/// Error type to provide further information on why a package was rejected
#[derive(Error, Diagnostic, Debug)]
pub enum InvalidHeaderError {
    /// signature {0:#010x} is not an unreal package
    #[error("signature {0:#010x} is not an unreal package")]
    Signature(u32),

    /// unsupported package version {0}
    #[error("unsupported package version {0}")]
    Version(u16),

    /// name {index} is not terminated within 256 bytes
    #[error("name {index} is not terminated within 256 bytes")]
    UnterminatedName { index: usize },

    /// name index {index} is outside of the name table ({len} entries)
    #[error("name index {index} is outside of the name table ({len} entries)")]
    NameIndex { index: i32, len: usize },

    /// stream ended or could not be read
    #[error(transparent)]
    Stream(binrw::Error),
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
