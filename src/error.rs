// src/error.rs

//! Defines the result kinds shared by every bitmap and blit operation.
//!
//! The error set is deliberately small: each variant names a condition a
//! caller can act on. The first failing call aborts the surrounding
//! operation and is returned to the caller unchanged, with no wrapping and
//! no retry. Bulk operations (`fill`, `copy_to`) offer no partial-success
//! reporting: pixels written before a failure stay written.
//!
//! Out-of-bounds coordinates are never errors; reads return the default
//! (all-zero) pixel and writes are silent no-ops. See `Bitmap` and
//! `LargeBitmap` for the exact rules.

use std::fmt;

/// Failure conditions reported by bitmap and blit operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlitError {
    /// The bitmap has no backing buffer, or a segment allocation failed.
    OutOfMemory,
    /// A required output location was not supplied by the caller.
    InvalidArgument,
    /// Pixel conversion between these channel sets is undefined.
    InvalidFormat,
    /// Alpha compositing was requested but the destination cannot accept it.
    NotSupported,
    /// The destination device is unavailable or not ready.
    DeviceError,
}

impl fmt::Display for BlitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlitError::OutOfMemory => write!(f, "no backing buffer or allocation failed"),
            BlitError::InvalidArgument => write!(f, "required output location missing"),
            BlitError::InvalidFormat => write!(f, "pixel conversion undefined between formats"),
            BlitError::NotSupported => write!(f, "destination cannot accept composited pixels"),
            BlitError::DeviceError => write!(f, "destination device unavailable"),
        }
    }
}

impl std::error::Error for BlitError {}

/// Result alias used throughout the crate.
pub type BlitResult<T> = Result<T, BlitError>;
