// Copyright (c) 2026 Exveria
// SPDX-License-Identifier: MIT OR Apache-2.0

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;
use core::marker::PhantomData;

use crate::error::{ComError, ComResult};
use crate::factory;
use crate::guid::CLSID;
use crate::runtime::{ClsCtx, ComRuntime};
use crate::unknown::{ComPtr, IUnknown, Releasable};

/// Order in which [`Releaser::release_all`] visits tracked objects.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ReleaseOrder {
    /// Last tracked, first released.
    #[default]
    Lifo,
    /// Registration order.
    Fifo,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReleaserState {
    Empty,
    Tracking,
    /// Terminal. Objects handed over afterwards are released on arrival.
    Released,
}

/// Owns the release obligation of every object handed to it and discharges
/// them all exactly once when it goes out of scope.
///
/// Tracked objects are borrowed back for the lifetime of the releaser, so a
/// scope can create several COM objects without releasing each one by hand:
///
/// ```
/// # #[cfg(feature = "test-support")]
/// # fn main() -> Result<(), comrel::ComError> {
/// use comrel::mock::{MockObject, MockRuntime};
/// use comrel::{ClsCtx, IUnknown, Releaser, GUID};
///
/// let object = MockObject::new();
/// let runtime = MockRuntime::new();
/// runtime.register(GUID::from_u128(1), &object);
///
/// {
///     let rel = Releaser::new();
///     let a: &IUnknown = rel.create(&runtime, &GUID::from_u128(1), ClsCtx::ALL)?;
///     let _b: &IUnknown = rel.query(a)?;
///     assert_eq!(object.ref_count(), 2);
/// }
/// assert_eq!(object.ref_count(), 0);
/// # Ok(())
/// # }
/// # #[cfg(not(feature = "test-support"))]
/// # fn main() {}
/// ```
///
/// After [`release_all`](Self::release_all) every borrowed handle is null and
/// calling a method on it panics.
///
/// # Thread Safety
/// A releaser is single-owner and not synchronized; it is neither `Send` nor
/// `Sync`.
pub struct Releaser {
    objects: RefCell<Vec<Box<dyn Releasable>>>,
    released: Cell<bool>,
    order: ReleaseOrder,
    _not_send: PhantomData<*mut ()>,
}

impl Releaser {
    pub fn new() -> Self {
        Self::with_order(ReleaseOrder::default())
    }

    pub fn with_order(order: ReleaseOrder) -> Self {
        Self {
            objects: RefCell::new(Vec::new()),
            released: Cell::new(false),
            order,
            _not_send: PhantomData,
        }
    }

    pub fn order(&self) -> ReleaseOrder {
        self.order
    }

    pub fn state(&self) -> ReleaserState {
        if self.released.get() {
            ReleaserState::Released
        } else if self.objects.borrow().is_empty() {
            ReleaserState::Empty
        } else {
            ReleaserState::Tracking
        }
    }

    /// Number of tracked objects, released or not.
    pub fn len(&self) -> usize {
        self.objects.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Takes over the release obligation of `object` and lends it back.
    ///
    /// Once the releaser is [`Released`](ReleaserState::Released), `object`
    /// is released immediately and [`ComError::ReleaserClosed`] is returned.
    pub fn track<T: Releasable + 'static>(&self, object: T) -> ComResult<&T> {
        if self.released.get() {
            object.release();
            tracing::warn!("object handed to a releaser after release_all; released immediately");
            return Err(ComError::ReleaserClosed);
        }

        let boxed = Box::new(object);
        let ptr: *const T = &*boxed;
        self.objects.borrow_mut().push(boxed);
        // SAFETY: the box is never dropped or moved out before `self` is
        // dropped, and its heap allocation does not move when the vector
        // grows. Release goes through `&self`, so shared borrows stay valid.
        Ok(unsafe { &*ptr })
    }

    /// [`co_create_instance`](factory::co_create_instance) without an outer
    /// object, tracking the result.
    pub fn create<T, R>(&self, runtime: &R, clsid: &CLSID, context: ClsCtx) -> ComResult<&T>
    where
        T: ComPtr,
        R: ComRuntime + ?Sized,
    {
        self.ensure_open()?;
        let object = factory::co_create_instance::<T, R>(runtime, clsid, None, context)?;
        self.track(object)
    }

    /// [`co_create_instance`](factory::co_create_instance) with an aggregating
    /// outer object, tracking the result.
    pub fn create_aggregated<T, R>(
        &self,
        runtime: &R,
        clsid: &CLSID,
        outer: &IUnknown,
        context: ClsCtx,
    ) -> ComResult<&T>
    where
        T: ComPtr,
        R: ComRuntime + ?Sized,
    {
        self.ensure_open()?;
        let object = factory::co_create_instance::<T, R>(runtime, clsid, Some(outer), context)?;
        self.track(object)
    }

    /// Queries `from` for interface `T`, tracking the new reference.
    #[track_caller]
    pub fn query<T: ComPtr, F: ComPtr>(&self, from: &F) -> ComResult<&T> {
        self.ensure_open()?;
        let object = factory::query_interface::<T, F>(from)?;
        self.track(object)
    }

    /// Releases every tracked object and enters the terminal state.
    ///
    /// Returns how many objects still held a reference. Calling it again is a
    /// no-op that returns 0.
    pub fn release_all(&self) -> usize {
        self.released.set(true);
        let objects = self.objects.borrow();
        let mut released = 0;
        let mut release_one = |object: &Box<dyn Releasable>| {
            if !object.is_released() {
                object.release();
                released += 1;
            }
        };
        match self.order {
            ReleaseOrder::Lifo => objects.iter().rev().for_each(&mut release_one),
            ReleaseOrder::Fifo => objects.iter().for_each(&mut release_one),
        }
        if released > 0 {
            tracing::trace!(released, tracked = objects.len(), "releaser released its objects");
        }
        released
    }

    fn ensure_open(&self) -> ComResult {
        crate::ensure!(!self.released.get(), ComError::ReleaserClosed);
        Ok(())
    }
}

impl Default for Releaser {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Releaser {
    fn drop(&mut self) {
        self.release_all();
    }
}

impl fmt::Debug for Releaser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Releaser")
            .field("state", &self.state())
            .field("tracked", &self.len())
            .field("order", &self.order)
            .finish()
    }
}
