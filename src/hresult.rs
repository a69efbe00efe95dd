// Copyright (c) 2026 Exveria
// SPDX-License-Identifier: MIT OR Apache-2.0

use core::fmt;

pub type HRESULT = i32;

pub const S_OK: HRESULT = 0;
pub const S_FALSE: HRESULT = 1;
pub const E_NOTIMPL: HRESULT = 0x8000_4001u32 as i32;
pub const E_NOINTERFACE: HRESULT = 0x8000_4002u32 as i32;
pub const E_POINTER: HRESULT = 0x8000_4003u32 as i32;
pub const E_ABORT: HRESULT = 0x8000_4004u32 as i32;
pub const E_FAIL: HRESULT = 0x8000_4005u32 as i32;
pub const E_UNEXPECTED: HRESULT = 0x8000_FFFFu32 as i32;
pub const E_ACCESSDENIED: HRESULT = 0x8007_0005u32 as i32;
pub const E_OUTOFMEMORY: HRESULT = 0x8007_000Eu32 as i32;
pub const E_INVALIDARG: HRESULT = 0x8007_0057u32 as i32;
pub const CLASS_E_NOAGGREGATION: HRESULT = 0x8004_0110u32 as i32;
pub const REGDB_E_CLASSNOTREG: HRESULT = 0x8004_0154u32 as i32;
pub const CO_E_NOTINITIALIZED: HRESULT = 0x8004_01F0u32 as i32;
pub const CO_E_CLASSSTRING: HRESULT = 0x8004_01F3u32 as i32;
pub const RPC_E_CHANGED_MODE: HRESULT = 0x8001_0106u32 as i32;

/// Status code returned by COM entry points and interface methods.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Ord, PartialOrd)]
pub struct HResult(pub HRESULT);

impl HResult {
    pub const OK: HResult = HResult(S_OK);
    pub const FALSE: HResult = HResult(S_FALSE);
    pub const NOTIMPL: HResult = HResult(E_NOTIMPL);
    pub const NOINTERFACE: HResult = HResult(E_NOINTERFACE);
    pub const POINTER: HResult = HResult(E_POINTER);
    pub const FAIL: HResult = HResult(E_FAIL);
    pub const UNEXPECTED: HResult = HResult(E_UNEXPECTED);
    pub const OUTOFMEMORY: HResult = HResult(E_OUTOFMEMORY);
    pub const INVALIDARG: HResult = HResult(E_INVALIDARG);
    pub const CLASS_NOAGGREGATION: HResult = HResult(CLASS_E_NOAGGREGATION);
    pub const CLASS_NOT_REGISTERED: HResult = HResult(REGDB_E_CLASSNOTREG);
    pub const NOT_INITIALIZED: HResult = HResult(CO_E_NOTINITIALIZED);
    pub const INVALID_CLASS_STRING: HResult = HResult(CO_E_CLASSSTRING);
    pub const CHANGED_MODE: HResult = HResult(RPC_E_CHANGED_MODE);

    #[inline]
    pub const fn from_raw(raw: HRESULT) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn into_raw(self) -> HRESULT {
        self.0
    }

    /// `SUCCEEDED(hr)`: the severity bit is clear.
    #[inline]
    pub const fn is_success(self) -> bool {
        self.0 >= 0
    }

    #[inline]
    pub const fn is_error(self) -> bool {
        self.0 < 0
    }

    #[inline]
    pub fn ok(self) -> Result<(), HResult> {
        if self.is_success() {
            Ok(())
        } else {
            Err(self)
        }
    }

    /// Symbolic name of well-known codes.
    pub const fn name(self) -> Option<&'static str> {
        Some(match self.0 {
            S_OK => "S_OK",
            S_FALSE => "S_FALSE",
            E_NOTIMPL => "E_NOTIMPL",
            E_NOINTERFACE => "E_NOINTERFACE",
            E_POINTER => "E_POINTER",
            E_ABORT => "E_ABORT",
            E_FAIL => "E_FAIL",
            E_UNEXPECTED => "E_UNEXPECTED",
            E_ACCESSDENIED => "E_ACCESSDENIED",
            E_OUTOFMEMORY => "E_OUTOFMEMORY",
            E_INVALIDARG => "E_INVALIDARG",
            CLASS_E_NOAGGREGATION => "CLASS_E_NOAGGREGATION",
            REGDB_E_CLASSNOTREG => "REGDB_E_CLASSNOTREG",
            CO_E_NOTINITIALIZED => "CO_E_NOTINITIALIZED",
            CO_E_CLASSSTRING => "CO_E_CLASSSTRING",
            RPC_E_CHANGED_MODE => "RPC_E_CHANGED_MODE",
            _ => return None,
        })
    }
}

impl fmt::Display for HResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010X}", self.0 as u32)?;
        if let Some(name) = self.name() {
            write!(f, " ({name})")?;
        }
        Ok(())
    }
}

impl From<HRESULT> for HResult {
    #[inline]
    fn from(value: HRESULT) -> Self {
        HResult(value)
    }
}

impl From<HResult> for HRESULT {
    #[inline]
    fn from(value: HResult) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn severity_bit_decides_success() {
        assert!(HResult::OK.is_success());
        assert!(HResult::FALSE.is_success());
        assert!(HResult::FAIL.is_error());
        assert_eq!(HResult::FALSE.ok(), Ok(()));
        assert_eq!(HResult::NOINTERFACE.ok(), Err(HResult::NOINTERFACE));
    }

    #[test]
    fn display_includes_known_names() {
        assert_eq!(HResult::FAIL.to_string(), "0x80004005 (E_FAIL)");
        assert_eq!(HResult(0x8000_1234u32 as i32).to_string(), "0x80001234");
        assert_eq!(HResult::CLASS_NOT_REGISTERED.name(), Some("REGDB_E_CLASSNOTREG"));
    }
}
