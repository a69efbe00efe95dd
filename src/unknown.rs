// Copyright (c) 2026 Exveria
// SPDX-License-Identifier: MIT OR Apache-2.0

use core::cell::Cell;
use core::ffi::c_void;
use core::fmt;
use core::marker::PhantomData;

use crate::error::{ComError, ComResult};
use crate::guid::{GUID, IID_IUNKNOWN};
use crate::hresult::HResult;
use crate::vtable::{self, IUnknownVtbl, InterfaceVtable};

/// An object whose release obligation can be handed to a [`Releaser`](crate::Releaser).
pub trait Releasable {
    /// Frees the resource now. Must be safe to call any number of times.
    fn release(&self) -> u32;

    /// `true` once there is nothing left to release.
    fn is_released(&self) -> bool;
}

/// Capability set shared by every interface handle.
///
/// Handles are built by composition: each interface wraps exactly one
/// [`IUnknown`] and forwards to it. Use [`declare_com_ptr!`](crate::declare_com_ptr)
/// rather than implementing this by hand.
pub trait ComPtr: Releasable + Sized + 'static {
    /// Interface identifier of the static type.
    const IID: GUID;

    /// Same as [`Self::IID`]; valid on released handles too.
    #[inline]
    fn iid(&self) -> GUID {
        Self::IID
    }

    /// The base handle this interface is composed over.
    fn as_unknown(&self) -> &IUnknown;

    /// The current object pointer, null once released.
    ///
    /// The returned pointer is borrowed: it carries no reference of its own.
    #[inline]
    fn ppvt(&self) -> *mut c_void {
        self.as_unknown().ppvt()
    }

    #[inline]
    fn is_null(&self) -> bool {
        self.ppvt().is_null()
    }

    /// Releases the current object, then adopts `ppvt` (null simply clears).
    ///
    /// # Safety
    /// A non-null `ppvt` must be a live pointer implementing this interface
    /// whose reference is handed over to the handle.
    #[inline]
    unsafe fn set(&self, ppvt: *mut c_void) {
        unsafe { self.as_unknown().set(ppvt) }
    }

    /// Wraps an already counted pointer. Used by the factory operations.
    ///
    /// # Safety
    /// `ppvt` must be null or a live pointer implementing this interface
    /// whose reference is handed over to the handle.
    unsafe fn from_raw(ppvt: *mut c_void) -> Self;
}

/// Base COM handle, owning at most one reference.
///
/// The pointer becomes null after [`release`](Releasable::release); any
/// further method call through the handle panics instead of touching freed
/// memory.
///
/// # Thread Safety
/// Handles are neither `Send` nor `Sync`: objects created in a single-threaded
/// apartment must only be called from the thread that created them.
pub struct IUnknown {
    ppvt: Cell<*mut c_void>,
    _not_send: PhantomData<*mut ()>,
}

impl IUnknown {
    /// A handle holding nothing. Releasing it is a no-op.
    pub const fn null() -> Self {
        Self {
            ppvt: Cell::new(core::ptr::null_mut()),
            _not_send: PhantomData,
        }
    }

    #[inline]
    pub fn ppvt(&self) -> *mut c_void {
        self.ppvt.get()
    }

    /// # Safety
    /// See [`ComPtr::set`].
    pub unsafe fn set(&self, ppvt: *mut c_void) {
        self.release();
        self.ppvt.set(ppvt);
    }

    /// The vtable of the held object viewed as `V`.
    ///
    /// # Panics
    /// When the handle was released.
    ///
    /// # Safety
    /// The held object must implement the interface described by `V`.
    #[inline]
    #[track_caller]
    pub unsafe fn vtbl<V: InterfaceVtable>(&self) -> &V {
        unsafe { vtable::vtbl::<V>(self.ppvt()) }
    }

    /// Asks the object for another interface, returning a handle that owns
    /// the new reference.
    ///
    /// # Panics
    /// When the handle was released.
    #[track_caller]
    pub fn query_interface<T: ComPtr>(&self) -> ComResult<T> {
        let mut out: *mut c_void = core::ptr::null_mut();
        let hr = HResult(unsafe { vtable::query_interface(self.ppvt(), &T::IID, &mut out) });
        if hr.is_error() {
            tracing::warn!(iid = %T::IID, status = %hr, "QueryInterface failed");
            return Err(ComError::Native(hr));
        }
        if out.is_null() {
            return Err(ComError::NullPointer);
        }
        Ok(unsafe { T::from_raw(out) })
    }

    /// Adds a reference and returns it as a separate handle of the same type.
    #[track_caller]
    pub fn add_ref(&self) -> IUnknown {
        let ppvt = self.ppvt();
        if ppvt.is_null() {
            return IUnknown::null();
        }
        unsafe { vtable::add_ref(ppvt) };
        unsafe { IUnknown::from_raw(ppvt) }
    }
}

impl Releasable for IUnknown {
    fn release(&self) -> u32 {
        let ppvt = self.ppvt.replace(core::ptr::null_mut());
        if ppvt.is_null() {
            return 0;
        }
        let count = unsafe { (vtable::vtbl::<IUnknownVtbl>(ppvt).Release)(ppvt) };
        tracing::trace!(object = ?ppvt, remaining = count, "COM object released");
        count
    }

    #[inline]
    fn is_released(&self) -> bool {
        self.ppvt().is_null()
    }
}

impl ComPtr for IUnknown {
    const IID: GUID = IID_IUNKNOWN;

    #[inline]
    fn as_unknown(&self) -> &IUnknown {
        self
    }

    unsafe fn from_raw(ppvt: *mut c_void) -> Self {
        Self {
            ppvt: Cell::new(ppvt),
            _not_send: PhantomData,
        }
    }
}

impl Default for IUnknown {
    fn default() -> Self {
        Self::null()
    }
}

/// `AddRef`s before aliasing; a released handle clones into a null one.
impl Clone for IUnknown {
    fn clone(&self) -> Self {
        self.add_ref()
    }
}

impl Drop for IUnknown {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for IUnknown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IUnknown").field("ppvt", &self.ppvt()).finish()
    }
}
