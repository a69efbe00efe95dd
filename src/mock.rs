// Copyright (c) 2026 Exveria
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process fake COM objects and runtime for exercising handles without
//! a native COM installation.
//!
//! A [`MockObject`] keeps its memory alive until the `MockObject` itself is
//! dropped, so an extra `Release` shows up as an underflow instead of a
//! use-after-free. Declare the mock before the handles that point into it.

use alloc::borrow::ToOwned;
use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::ffi::c_void;
use core::sync::atomic::{AtomicI32, AtomicU32, Ordering};

use crate::error::{ComError, ComResult};
use crate::guid::{CLSID, GUID, IID, IID_IUNKNOWN};
use crate::hresult::{
    HResult, E_NOINTERFACE, E_POINTER, HRESULT, REGDB_E_CLASSNOTREG, S_OK,
};
use crate::runtime::{ClsCtx, CoInit, ComRuntime};
use crate::vtable::{IUnknownVtbl, InterfaceVtable};

/// `IUnknown` slots backed by [`MockState`] counters. Embed it as the first
/// field of custom mock vtables.
pub const MOCK_UNKNOWN_VTBL: IUnknownVtbl = IUnknownVtbl {
    QueryInterface: MockState::shim_query_interface,
    AddRef: MockState::shim_add_ref,
    Release: MockState::shim_release,
};

static UNKNOWN_ONLY: IUnknownVtbl = MOCK_UNKNOWN_VTBL;

/// Shared state behind a mock COM pointer. The vtable pointer is the first
/// field, so `&MockState` is a valid COM pointer.
#[repr(C)]
pub struct MockState {
    vtbl: *const c_void,
    ref_count: AtomicU32,
    add_ref_calls: AtomicU32,
    release_calls: AtomicU32,
    query_calls: AtomicU32,
    underflows: AtomicU32,
    method_status: AtomicI32,
    interfaces: Vec<IID>,
    calls: RefCell<Vec<(&'static str, Vec<usize>)>>,
}

impl MockState {
    /// # Safety
    /// `this` must come from [`MockObject::ppvt`] and the mock must be alive.
    #[inline]
    pub unsafe fn from_this<'a>(this: *mut c_void) -> &'a MockState {
        unsafe { &*(this as *const MockState) }
    }

    /// Logs a custom method call and returns the scripted method status.
    pub fn record(&self, method: &'static str, args: &[usize]) -> HRESULT {
        self.calls.borrow_mut().push((method, args.to_vec()));
        self.method_status.load(Ordering::Relaxed)
    }

    unsafe extern "system" fn shim_add_ref(this: *mut c_void) -> u32 {
        let state = unsafe { Self::from_this(this) };
        state.add_ref_calls.fetch_add(1, Ordering::Relaxed);
        state.ref_count.fetch_add(1, Ordering::Relaxed) + 1
    }

    unsafe extern "system" fn shim_release(this: *mut c_void) -> u32 {
        let state = unsafe { Self::from_this(this) };
        state.release_calls.fetch_add(1, Ordering::Relaxed);
        match state
            .ref_count
            .fetch_update(Ordering::Release, Ordering::Relaxed, |curr| curr.checked_sub(1))
        {
            Ok(prev) => prev - 1,
            Err(_) => {
                state.underflows.fetch_add(1, Ordering::Relaxed);
                0
            }
        }
    }

    unsafe extern "system" fn shim_query_interface(
        this: *mut c_void,
        riid: *const GUID,
        ppv: *mut *mut c_void,
    ) -> HRESULT {
        let state = unsafe { Self::from_this(this) };
        state.query_calls.fetch_add(1, Ordering::Relaxed);
        if ppv.is_null() || riid.is_null() {
            return E_POINTER;
        }
        let riid = unsafe { &*riid };
        if *riid == IID_IUNKNOWN || state.interfaces.contains(riid) {
            state.ref_count.fetch_add(1, Ordering::Relaxed);
            unsafe { *ppv = this };
            S_OK
        } else {
            unsafe { *ppv = core::ptr::null_mut() };
            E_NOINTERFACE
        }
    }
}

/// A fake COM object with observable reference counting.
pub struct MockObject {
    state: Box<MockState>,
}

impl MockObject {
    /// An object answering only `IUnknown`, holding no references.
    pub fn new() -> Self {
        Self::with_interfaces(&[])
    }

    /// An object that also answers `QueryInterface` for `interfaces`.
    pub fn with_interfaces(interfaces: &[IID]) -> Self {
        Self::build(&UNKNOWN_ONLY as *const IUnknownVtbl as *const c_void, interfaces)
    }

    /// An object dispatching through a custom vtable whose `IUnknown` part is
    /// [`MOCK_UNKNOWN_VTBL`].
    pub fn with_vtable<V: InterfaceVtable>(vtbl: &'static V, interfaces: &[IID]) -> Self {
        Self::build(vtbl as *const V as *const c_void, interfaces)
    }

    fn build(vtbl: *const c_void, interfaces: &[IID]) -> Self {
        Self {
            state: Box::new(MockState {
                vtbl,
                ref_count: AtomicU32::new(0),
                add_ref_calls: AtomicU32::new(0),
                release_calls: AtomicU32::new(0),
                query_calls: AtomicU32::new(0),
                underflows: AtomicU32::new(0),
                method_status: AtomicI32::new(S_OK),
                interfaces: interfaces.to_vec(),
                calls: RefCell::new(Vec::new()),
            }),
        }
    }

    /// The COM pointer of this object; carries no reference.
    #[inline]
    pub fn ppvt(&self) -> *mut c_void {
        &*self.state as *const MockState as *mut c_void
    }

    /// Hands out a fresh reference, as a native factory would.
    pub fn new_ref(&self) -> *mut c_void {
        self.state.ref_count.fetch_add(1, Ordering::Relaxed);
        self.ppvt()
    }

    pub fn state(&self) -> &MockState {
        &self.state
    }

    pub fn ref_count(&self) -> u32 {
        self.state.ref_count.load(Ordering::Relaxed)
    }

    pub fn add_ref_calls(&self) -> u32 {
        self.state.add_ref_calls.load(Ordering::Relaxed)
    }

    pub fn release_calls(&self) -> u32 {
        self.state.release_calls.load(Ordering::Relaxed)
    }

    pub fn query_calls(&self) -> u32 {
        self.state.query_calls.load(Ordering::Relaxed)
    }

    /// `Release` calls that arrived with the count already at zero.
    pub fn underflows(&self) -> u32 {
        self.state.underflows.load(Ordering::Relaxed)
    }

    /// Status returned by custom methods that call [`MockState::record`].
    pub fn set_method_status(&self, status: HRESULT) {
        self.state.method_status.store(status, Ordering::Relaxed);
    }

    pub fn calls(&self) -> Vec<(&'static str, Vec<usize>)> {
        self.state.calls.borrow().clone()
    }
}

impl Default for MockObject {
    fn default() -> Self {
        Self::new()
    }
}

/// One `create_instance` request seen by [`MockRuntime`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CreateCall {
    pub clsid: CLSID,
    pub iid: IID,
    pub context: ClsCtx,
    pub outer_requested: bool,
}

#[derive(Clone, Copy, Debug)]
enum Script {
    Registry,
    Fail(HRESULT),
    SucceedWithNull,
}

/// Scripted stand-in for the native COM runtime.
///
/// By default `create_instance` looks up the class in the objects registered
/// with [`register`](Self::register) and answers like `CoCreateInstance`.
pub struct MockRuntime {
    classes: RefCell<Vec<(CLSID, *mut c_void)>>,
    prog_ids: RefCell<Vec<(String, CLSID)>>,
    outer_reply: Cell<*mut c_void>,
    script: Cell<Script>,
    init_status: Cell<HRESULT>,
    creates: RefCell<Vec<CreateCall>>,
    init_calls: RefCell<Vec<CoInit>>,
    uninit_calls: Cell<u32>,
}

/// Written to the out slot on scripted failures; never a valid object.
pub const GARBAGE_PTR: *mut c_void = 0xDEAD_BEE0usize as *mut c_void;

impl MockRuntime {
    pub fn new() -> Self {
        Self {
            classes: RefCell::new(Vec::new()),
            prog_ids: RefCell::new(Vec::new()),
            outer_reply: Cell::new(core::ptr::null_mut()),
            script: Cell::new(Script::Registry),
            init_status: Cell::new(S_OK),
            creates: RefCell::new(Vec::new()),
            init_calls: RefCell::new(Vec::new()),
            uninit_calls: Cell::new(0),
        }
    }

    /// Makes `clsid` creatable; each creation hands out a new reference to `object`.
    /// `object` must outlive every handle created from it.
    pub fn register(&self, clsid: CLSID, object: &MockObject) {
        self.classes.borrow_mut().push((clsid, object.ppvt()));
    }

    /// Makes `prog_id` resolve to `clsid` in
    /// [`clsid_from_prog_id`](ComRuntime::clsid_from_prog_id).
    pub fn register_prog_id(&self, prog_id: &str, clsid: CLSID) {
        self.prog_ids.borrow_mut().push((prog_id.to_owned(), clsid));
    }

    /// Aggregated creations write a new reference to `object` into the outer
    /// slot before the scripted outcome is applied.
    pub fn hand_back_outer(&self, object: &MockObject) {
        self.outer_reply.set(object.ppvt());
    }

    /// Every creation fails with `status` and scribbles [`GARBAGE_PTR`] into the out slot.
    pub fn fail_with(&self, status: HRESULT) {
        self.script.set(Script::Fail(status));
    }

    /// Every creation reports `S_OK` but returns no object.
    pub fn succeed_with_null(&self) {
        self.script.set(Script::SucceedWithNull);
    }

    pub fn set_init_status(&self, status: HRESULT) {
        self.init_status.set(status);
    }

    pub fn creates(&self) -> Vec<CreateCall> {
        self.creates.borrow().clone()
    }

    pub fn init_calls(&self) -> Vec<CoInit> {
        self.init_calls.borrow().clone()
    }

    pub fn uninit_calls(&self) -> u32 {
        self.uninit_calls.get()
    }
}

impl Default for MockRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl ComRuntime for MockRuntime {
    unsafe fn create_instance(
        &self,
        clsid: &CLSID,
        outer: *mut *mut c_void,
        context: ClsCtx,
        iid: &IID,
        out: *mut *mut c_void,
    ) -> HResult {
        self.creates.borrow_mut().push(CreateCall {
            clsid: *clsid,
            iid: *iid,
            context,
            outer_requested: !outer.is_null(),
        });
        if out.is_null() {
            return HResult(E_POINTER);
        }

        let reply = self.outer_reply.get();
        if !outer.is_null() && !reply.is_null() {
            unsafe {
                crate::vtable::add_ref(reply);
                *outer = reply;
            }
        }

        match self.script.get() {
            Script::Fail(status) => {
                unsafe { *out = GARBAGE_PTR };
                return HResult(status);
            }
            Script::SucceedWithNull => {
                unsafe { *out = core::ptr::null_mut() };
                return HResult(S_OK);
            }
            Script::Registry => {}
        }

        let found = self
            .classes
            .borrow()
            .iter()
            .find(|(registered, _)| registered == clsid)
            .map(|&(_, ppvt)| ppvt);
        match found {
            Some(ppvt) => unsafe { crate::vtable::query_interface(ppvt, iid, out).into() },
            None => {
                unsafe { *out = core::ptr::null_mut() };
                HResult(REGDB_E_CLASSNOTREG)
            }
        }
    }

    fn clsid_from_prog_id(&self, prog_id: &str) -> ComResult<CLSID> {
        self.prog_ids
            .borrow()
            .iter()
            .find(|(registered, _)| registered == prog_id)
            .map(|&(_, clsid)| clsid)
            .ok_or(ComError::Native(HResult::INVALID_CLASS_STRING))
    }

    fn initialize(&self, coinit: CoInit) -> HResult {
        self.init_calls.borrow_mut().push(coinit);
        HResult(self.init_status.get())
    }

    fn uninitialize(&self) {
        self.uninit_calls.set(self.uninit_calls.get() + 1);
    }
}
