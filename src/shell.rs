// Copyright (c) 2026 Exveria
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shell interfaces.

use core::ffi::c_void;

use crate::error::ComResult;
use crate::guid::{CLSID, GUID};
use crate::hresult::{HResult, HRESULT};

/// Window handle.
pub type HWND = *mut c_void;

pub const CLSID_TASKBAR_LIST: CLSID = GUID::from_u128(0x56FD_F344_FD6D_11D0_958A_0060_97C9_A090);

crate::declare_com_ptr! {
    /// [`ITaskbarList`](https://learn.microsoft.com/en-us/windows/win32/api/shobjidl_core/nn-shobjidl_core-itaskbarlist)
    /// COM interface.
    ///
    /// Call [`hr_init`](Self::hr_init) once before the other methods.
    pub struct ITaskbarList: IUnknown {
        const IID: GUID = GUID::from_u128(0x56FD_F342_FD6D_11D0_958A_0060_97C9_A090);

        fn HrInit() -> HRESULT;
        fn AddTab(hwnd: HWND) -> HRESULT;
        fn DeleteTab(hwnd: HWND) -> HRESULT;
        fn ActivateTab(hwnd: HWND) -> HRESULT;
        fn SetActiveAlt(hwnd: HWND) -> HRESULT;
    }
}

impl ITaskbarList {
    pub fn hr_init(&self) -> ComResult {
        let hr = unsafe { (self.vtbl().HrInit)(self.ppvt()) };
        check(hr)
    }

    pub fn add_tab(&self, hwnd: HWND) -> ComResult {
        let hr = unsafe { (self.vtbl().AddTab)(self.ppvt(), hwnd) };
        check(hr)
    }

    pub fn delete_tab(&self, hwnd: HWND) -> ComResult {
        let hr = unsafe { (self.vtbl().DeleteTab)(self.ppvt(), hwnd) };
        check(hr)
    }

    pub fn activate_tab(&self, hwnd: HWND) -> ComResult {
        let hr = unsafe { (self.vtbl().ActivateTab)(self.ppvt(), hwnd) };
        check(hr)
    }

    pub fn set_active_alt(&self, hwnd: HWND) -> ComResult {
        let hr = unsafe { (self.vtbl().SetActiveAlt)(self.ppvt(), hwnd) };
        check(hr)
    }
}

#[inline]
fn check(hr: HRESULT) -> ComResult {
    let hr = HResult(hr);
    if hr.is_error() {
        tracing::warn!(status = %hr, "ITaskbarList call failed");
    }
    Ok(hr.ok()?)
}
