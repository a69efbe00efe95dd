// Copyright (c) 2026 Exveria
// SPDX-License-Identifier: MIT OR Apache-2.0

//! COM pointer lifetime management.
//!
//! * [`vtable`] calls slots of a native virtual table.
//! * [`IUnknown`] and the [`ComPtr`] capability set own one reference each and
//!   release it idempotently; interfaces are declared with [`declare_com_ptr!`].
//! * [`co_create_instance`] and [`IUnknown::query_interface`] produce typed
//!   handles or a [`ComError`], never a half-initialized handle.
//! * [`Releaser`] releases everything it tracks exactly once at scope end.
//! * [`ComApartment`] pairs COM initialization with teardown.

#![no_std]

extern crate alloc;

#[cfg(test)]
extern crate std;

pub mod apartment;
pub mod error;
pub mod factory;
pub mod guid;
pub mod hresult;
pub mod macros;
#[cfg(any(test, feature = "test-support"))]
pub mod mock;
pub mod releaser;
pub mod runtime;
pub mod shell;
pub mod unknown;
pub mod vtable;

#[doc(hidden)]
pub use paste;

pub use apartment::ComApartment;
pub use error::{ComError, ComResult};
pub use factory::{co_create_instance, query_interface};
pub use guid::{GuidParseError, CLSID, GUID, IID, IID_IUNKNOWN};
pub use hresult::{HResult, HRESULT, S_FALSE, S_OK};
pub use releaser::{ReleaseOrder, Releaser, ReleaserState};
#[cfg(windows)]
pub use runtime::Ole32;
pub use runtime::{ClsCtx, CoInit, ComRuntime};
pub use unknown::{ComPtr, IUnknown, Releasable};
pub use vtable::{IUnknownVtbl, InterfaceVtable};
