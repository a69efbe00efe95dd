// Copyright (c) 2026 Exveria
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Calls through a COM object's virtual table.
//!
//! A COM pointer (`ppvt`) points at an object whose first word is a pointer
//! to an array of function pointers. Every interface starts with the three
//! `IUnknown` slots. Nothing here interprets return values.
//!
//! Dispatching through a null object or a null vtable is a contract violation
//! and panics.

use core::ffi::c_void;

use crate::guid::GUID;
use crate::hresult::HRESULT;

pub const SLOT_QUERY_INTERFACE: usize = 0;
pub const SLOT_ADD_REF: usize = 1;
pub const SLOT_RELEASE: usize = 2;

/// Most arguments [`invoke`] forwards, not counting `this`.
pub const MAX_INVOKE_ARGS: usize = 6;

#[repr(C)]
#[derive(Clone, Copy)]
#[allow(non_snake_case)]
pub struct IUnknownVtbl {
    pub QueryInterface:
        unsafe extern "system" fn(*mut c_void, *const GUID, *mut *mut c_void) -> HRESULT,
    pub AddRef: unsafe extern "system" fn(*mut c_void) -> u32,
    pub Release: unsafe extern "system" fn(*mut c_void) -> u32,
}

/// A vtable struct whose first three slots are `IUnknown`'s.
///
/// # Safety
/// The struct must be `#[repr(C)]`, begin with [`IUnknownVtbl`] (directly or
/// through its parent vtable) and match the native interface layout.
pub unsafe trait InterfaceVtable: Sized + 'static {}

unsafe impl InterfaceVtable for IUnknownVtbl {}

#[cold]
#[inline(never)]
#[track_caller]
fn null_dispatch(what: &str) -> ! {
    panic!("COM dispatch through a null {what}: the interface was released or never created");
}

/// Returns the vtable of `ppvt` viewed as `V`.
///
/// # Panics
/// When `ppvt` or its vtable pointer is null.
///
/// # Safety
/// A non-null `ppvt` must point to a live COM object implementing `V`, and the
/// object must stay alive for `'a`.
#[inline]
#[track_caller]
pub unsafe fn vtbl<'a, V: InterfaceVtable>(ppvt: *mut c_void) -> &'a V {
    if ppvt.is_null() {
        null_dispatch("object pointer");
    }
    let table = unsafe { *(ppvt as *const *const V) };
    if table.is_null() {
        null_dispatch("vtable pointer");
    }
    unsafe { &*table }
}

/// Reads the raw function pointer stored in `slot`.
///
/// # Safety
/// Same as [`vtbl`]; additionally `slot` must be inside the object's vtable.
#[inline]
#[track_caller]
pub unsafe fn slot(ppvt: *mut c_void, slot: usize) -> *const c_void {
    if ppvt.is_null() {
        null_dispatch("object pointer");
    }
    let table = unsafe { *(ppvt as *const *const *const c_void) };
    if table.is_null() {
        null_dispatch("vtable pointer");
    }
    unsafe { *table.add(slot) }
}

/// Calls vtable `slot` with `this = ppvt` followed by `args`, returning the raw word.
///
/// # Panics
/// When `ppvt` or its vtable is null, or when more than [`MAX_INVOKE_ARGS`]
/// arguments are given.
///
/// # Safety
/// The function in `slot` must use the `system` calling convention, take
/// exactly `args.len()` pointer-sized arguments after `this` and return a
/// value no wider than a pointer.
#[track_caller]
pub unsafe fn invoke(ppvt: *mut c_void, index: usize, args: &[usize]) -> usize {
    type F0 = unsafe extern "system" fn(*mut c_void) -> usize;
    type F1 = unsafe extern "system" fn(*mut c_void, usize) -> usize;
    type F2 = unsafe extern "system" fn(*mut c_void, usize, usize) -> usize;
    type F3 = unsafe extern "system" fn(*mut c_void, usize, usize, usize) -> usize;
    type F4 = unsafe extern "system" fn(*mut c_void, usize, usize, usize, usize) -> usize;
    type F5 = unsafe extern "system" fn(*mut c_void, usize, usize, usize, usize, usize) -> usize;
    type F6 =
        unsafe extern "system" fn(*mut c_void, usize, usize, usize, usize, usize, usize) -> usize;

    assert!(
        args.len() <= MAX_INVOKE_ARGS,
        "vtable invoke supports at most {MAX_INVOKE_ARGS} arguments, got {}",
        args.len()
    );

    let f = unsafe { slot(ppvt, index) };
    if f.is_null() {
        null_dispatch("vtable slot");
    }

    unsafe {
        match *args {
            [] => core::mem::transmute::<*const c_void, F0>(f)(ppvt),
            [a] => core::mem::transmute::<*const c_void, F1>(f)(ppvt, a),
            [a, b] => core::mem::transmute::<*const c_void, F2>(f)(ppvt, a, b),
            [a, b, c] => core::mem::transmute::<*const c_void, F3>(f)(ppvt, a, b, c),
            [a, b, c, d] => core::mem::transmute::<*const c_void, F4>(f)(ppvt, a, b, c, d),
            [a, b, c, d, e] => {
                core::mem::transmute::<*const c_void, F5>(f)(ppvt, a, b, c, d, e)
            }
            [a, b, c, d, e, g] => {
                core::mem::transmute::<*const c_void, F6>(f)(ppvt, a, b, c, d, e, g)
            }
            _ => unreachable!(),
        }
    }
}

/// # Safety
/// `ppvt` must be null or a live COM pointer.
#[inline]
#[track_caller]
pub unsafe fn add_ref(ppvt: *mut c_void) -> u32 {
    let vt = unsafe { vtbl::<IUnknownVtbl>(ppvt) };
    unsafe { (vt.AddRef)(ppvt) }
}

/// # Safety
/// `ppvt` must be null or a live COM pointer; the caller gives up one reference.
#[inline]
#[track_caller]
pub unsafe fn release(ppvt: *mut c_void) -> u32 {
    let vt = unsafe { vtbl::<IUnknownVtbl>(ppvt) };
    unsafe { (vt.Release)(ppvt) }
}

/// # Safety
/// `ppvt` must be null or a live COM pointer; `out` must be valid for writes.
#[inline]
#[track_caller]
pub unsafe fn query_interface(ppvt: *mut c_void, iid: &GUID, out: *mut *mut c_void) -> HRESULT {
    let vt = unsafe { vtbl::<IUnknownVtbl>(ppvt) };
    unsafe { (vt.QueryInterface)(ppvt, iid, out) }
}
