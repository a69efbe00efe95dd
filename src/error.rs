// Copyright (c) 2026 Exveria
// SPDX-License-Identifier: MIT OR Apache-2.0

use thiserror::Error;

use crate::hresult::HResult;

pub type ComResult<T = ()> = Result<T, ComError>;

/// Recoverable failures of the COM layer.
///
/// Dispatching through a released handle is not represented here: it panics.
#[derive(Clone, Copy, Debug, Error, Eq, PartialEq)]
#[non_exhaustive]
pub enum ComError {
    /// A native entry point or interface method returned a failure status.
    #[error("COM call failed with {0}")]
    Native(HResult),

    /// The native call reported success but wrote no interface pointer.
    ///
    /// [`ComError::hresult`] reports it as `E_POINTER`.
    #[error("COM call succeeded without returning an interface pointer")]
    NullPointer,

    /// The releaser already ran its bulk release; the handle was released on arrival.
    #[error("releaser has already released its objects")]
    ReleaserClosed,
}

impl ComError {
    /// The native status behind this error, if any.
    pub const fn hresult(&self) -> Option<HResult> {
        match self {
            ComError::Native(hr) => Some(*hr),
            ComError::NullPointer => Some(HResult::POINTER),
            ComError::ReleaserClosed => None,
        }
    }
}

impl From<HResult> for ComError {
    #[inline]
    fn from(value: HResult) -> Self {
        ComError::Native(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn native_error_displays_status() {
        let err = ComError::from(HResult::CLASS_NOT_REGISTERED);
        assert_eq!(
            err.to_string(),
            "COM call failed with 0x80040154 (REGDB_E_CLASSNOTREG)"
        );
        assert_eq!(err.hresult(), Some(HResult::CLASS_NOT_REGISTERED));
        assert_eq!(ComError::NullPointer.hresult(), Some(HResult::POINTER));
        assert_eq!(ComError::ReleaserClosed.hresult(), None);
    }
}
