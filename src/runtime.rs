// Copyright (c) 2026 Exveria
// SPDX-License-Identifier: MIT OR Apache-2.0

use core::ffi::c_void;
use core::ops::{BitOr, BitOrAssign};

#[cfg(windows)]
use alloc::vec::Vec;

#[cfg(windows)]
use crate::error::ComError;
use crate::error::ComResult;
#[cfg(windows)]
use crate::guid::GUID;
use crate::guid::{CLSID, IID};
use crate::hresult::HResult;

/// `CLSCTX` activation context bitmask.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct ClsCtx(pub u32);

impl ClsCtx {
    pub const INPROC_SERVER: ClsCtx = ClsCtx(0x1);
    pub const INPROC_HANDLER: ClsCtx = ClsCtx(0x2);
    pub const LOCAL_SERVER: ClsCtx = ClsCtx(0x4);
    pub const REMOTE_SERVER: ClsCtx = ClsCtx(0x10);
    pub const SERVER: ClsCtx = ClsCtx(0x1 | 0x4 | 0x10);
    pub const ALL: ClsCtx = ClsCtx(0x1 | 0x2 | 0x4 | 0x10);

    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn contains(self, other: ClsCtx) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for ClsCtx {
    type Output = ClsCtx;

    #[inline]
    fn bitor(self, rhs: ClsCtx) -> ClsCtx {
        ClsCtx(self.0 | rhs.0)
    }
}

impl BitOrAssign for ClsCtx {
    #[inline]
    fn bitor_assign(&mut self, rhs: ClsCtx) {
        self.0 |= rhs.0;
    }
}

/// `COINIT` apartment flags for [`ComRuntime::initialize`].
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct CoInit(pub u32);

impl CoInit {
    pub const MULTITHREADED: CoInit = CoInit(0x0);
    pub const APARTMENTTHREADED: CoInit = CoInit(0x2);
    pub const DISABLE_OLE1DDE: CoInit = CoInit(0x4);
    pub const SPEED_OVER_MEMORY: CoInit = CoInit(0x8);

    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }
}

impl BitOr for CoInit {
    type Output = CoInit;

    #[inline]
    fn bitor(self, rhs: CoInit) -> CoInit {
        CoInit(self.0 | rhs.0)
    }
}

/// The native COM runtime entry points this crate calls into.
///
/// [`Ole32`] forwards to the system library; tests substitute a scripted
/// runtime.
pub trait ComRuntime {
    /// `CoCreateInstance`. On success `*out` holds a counted pointer to an
    /// object implementing `iid`.
    ///
    /// `outer` is null, or a slot for the outer unknown when aggregation is
    /// requested. The slot is null on entry.
    ///
    /// # Safety
    /// `out` must be valid for writes; a non-null `outer` must be valid for
    /// reads and writes.
    unsafe fn create_instance(
        &self,
        clsid: &CLSID,
        outer: *mut *mut c_void,
        context: ClsCtx,
        iid: &IID,
        out: *mut *mut c_void,
    ) -> HResult;

    /// `CLSIDFromProgID`: resolves a programmatic identifier such as
    /// `"Excel.Application"` to its class identifier.
    ///
    /// Unknown or malformed identifiers fail with `CO_E_CLASSSTRING`.
    fn clsid_from_prog_id(&self, prog_id: &str) -> ComResult<CLSID>;

    /// `CoInitializeEx` for the calling thread.
    fn initialize(&self, coinit: CoInit) -> HResult;

    /// `CoUninitialize` for the calling thread.
    fn uninitialize(&self);
}

/// The system COM runtime in `ole32.dll`.
#[cfg(windows)]
#[derive(Clone, Copy, Debug, Default)]
pub struct Ole32;

#[cfg(windows)]
mod ffi {
    use core::ffi::c_void;

    use crate::guid::GUID;
    use crate::hresult::HRESULT;

    #[link(name = "ole32")]
    extern "system" {
        pub fn CoCreateInstance(
            rclsid: *const GUID,
            punkouter: *mut c_void,
            dwclscontext: u32,
            riid: *const GUID,
            ppv: *mut *mut c_void,
        ) -> HRESULT;
        pub fn CLSIDFromProgID(lpszprogid: *const u16, lpclsid: *mut GUID) -> HRESULT;
        pub fn CoInitializeEx(pvreserved: *const c_void, dwcoinit: u32) -> HRESULT;
        pub fn CoUninitialize();
    }
}

#[cfg(windows)]
impl ComRuntime for Ole32 {
    unsafe fn create_instance(
        &self,
        clsid: &CLSID,
        outer: *mut *mut c_void,
        context: ClsCtx,
        iid: &IID,
        out: *mut *mut c_void,
    ) -> HResult {
        let outer_unknown = if outer.is_null() {
            core::ptr::null_mut()
        } else {
            unsafe { *outer }
        };
        HResult(unsafe { ffi::CoCreateInstance(clsid, outer_unknown, context.bits(), iid, out) })
    }

    fn clsid_from_prog_id(&self, prog_id: &str) -> ComResult<CLSID> {
        crate::ensure!(
            !prog_id.contains('\0'),
            ComError::Native(HResult::INVALID_CLASS_STRING)
        );
        let wide: Vec<u16> = prog_id.encode_utf16().chain(core::iter::once(0)).collect();
        let mut clsid = GUID::zeroed();
        let hr = HResult(unsafe { ffi::CLSIDFromProgID(wide.as_ptr(), &mut clsid) });
        if hr.is_error() {
            tracing::warn!(prog_id, status = %hr, "CLSIDFromProgID failed");
            return Err(ComError::Native(hr));
        }
        Ok(clsid)
    }

    fn initialize(&self, coinit: CoInit) -> HResult {
        HResult(unsafe { ffi::CoInitializeEx(core::ptr::null(), coinit.bits()) })
    }

    fn uninitialize(&self) {
        unsafe { ffi::CoUninitialize() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_flags_combine() {
        let mut ctx = ClsCtx::INPROC_SERVER;
        ctx |= ClsCtx::LOCAL_SERVER;
        assert_eq!(ctx, ClsCtx(0x5));
        assert!(ClsCtx::ALL.contains(ClsCtx::INPROC_HANDLER));
        assert!(ClsCtx::SERVER.contains(ctx));
        assert!(!ClsCtx::SERVER.contains(ClsCtx::INPROC_HANDLER));
    }

    #[test]
    fn coinit_flags_combine() {
        let flags = CoInit::APARTMENTTHREADED | CoInit::DISABLE_OLE1DDE;
        assert_eq!(flags.bits(), 0x6);
    }
}
