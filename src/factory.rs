// Copyright (c) 2026 Exveria
// SPDX-License-Identifier: MIT OR Apache-2.0

use core::ffi::c_void;

use crate::error::{ComError, ComResult};
use crate::guid::CLSID;
use crate::runtime::{ClsCtx, ComRuntime};
use crate::unknown::{ComPtr, IUnknown, Releasable};

/// Creates a COM object of class `clsid` and returns it as interface `T`.
///
/// When `outer` is given, its current reference is released first and its
/// slot is offered to the runtime for the aggregating outer unknown; whatever
/// the runtime stores there is adopted by `outer`, even when creation fails.
///
/// Failures are returned, never a half-built handle: a failed status yields
/// [`ComError::Native`] and no `Release` is issued for the out pointer, and a
/// success without an object yields [`ComError::NullPointer`].
///
/// Example:
///
/// ```no_run
/// # #[cfg(windows)]
/// # fn main() -> comrel::ComResult<()> {
/// use comrel::shell::{ITaskbarList, CLSID_TASKBAR_LIST};
/// use comrel::{co_create_instance, ClsCtx, Ole32};
///
/// let taskbar: ITaskbarList =
///     co_create_instance(&Ole32, &CLSID_TASKBAR_LIST, None, ClsCtx::INPROC_SERVER)?;
/// taskbar.hr_init()?;
/// # Ok(())
/// # }
/// # #[cfg(not(windows))]
/// # fn main() {}
/// ```
pub fn co_create_instance<T, R>(
    runtime: &R,
    clsid: &CLSID,
    outer: Option<&IUnknown>,
    context: ClsCtx,
) -> ComResult<T>
where
    T: ComPtr,
    R: ComRuntime + ?Sized,
{
    let mut outer_slot: *mut c_void = core::ptr::null_mut();
    let outer_arg: *mut *mut c_void = match outer {
        Some(unknown) => {
            unknown.release();
            &mut outer_slot as *mut *mut c_void
        }
        None => core::ptr::null_mut(),
    };

    let mut out: *mut c_void = core::ptr::null_mut();
    let hr = unsafe { runtime.create_instance(clsid, outer_arg, context, &T::IID, &mut out) };

    // The outer handle owns whatever landed in its slot, whatever the status.
    if let Some(unknown) = outer {
        if !outer_slot.is_null() {
            unsafe { unknown.set(outer_slot) };
        }
    }

    if hr.is_error() {
        tracing::warn!(clsid = %clsid, iid = %T::IID, status = %hr, "CoCreateInstance failed");
        return Err(ComError::Native(hr));
    }
    if out.is_null() {
        tracing::warn!(clsid = %clsid, iid = %T::IID, "CoCreateInstance returned no object");
        return Err(ComError::NullPointer);
    }

    tracing::debug!(clsid = %clsid, iid = %T::IID, object = ?out, "COM object created");
    Ok(unsafe { T::from_raw(out) })
}

/// Asks `from` for interface `T`. See [`IUnknown::query_interface`].
#[inline]
#[track_caller]
pub fn query_interface<T: ComPtr, F: ComPtr>(from: &F) -> ComResult<T> {
    from.as_unknown().query_interface::<T>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guid::{GUID, IID_IUNKNOWN};
    use crate::hresult::{HResult, E_OUTOFMEMORY};
    use crate::mock::{MockObject, MockRuntime};

    const CLSID_THING: GUID = GUID::from_u128(0x10);

    #[test]
    fn creation_wraps_returned_pointer() {
        let obj = MockObject::new();
        let runtime = MockRuntime::new();
        runtime.register(CLSID_THING, &obj);

        let unk: IUnknown =
            co_create_instance(&runtime, &CLSID_THING, None, ClsCtx::INPROC_SERVER).unwrap();
        assert_eq!(unk.ppvt(), obj.ppvt());
        assert_eq!(obj.ref_count(), 1);

        let calls = runtime.creates();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].iid, IID_IUNKNOWN);
        assert_eq!(calls[0].context, ClsCtx::INPROC_SERVER);
        assert!(!calls[0].outer_requested);
    }

    #[test]
    fn failure_yields_error_and_no_release() {
        let obj = MockObject::new();
        let runtime = MockRuntime::new();
        runtime.register(CLSID_THING, &obj);
        runtime.fail_with(E_OUTOFMEMORY);

        let err = co_create_instance::<IUnknown, _>(&runtime, &CLSID_THING, None, ClsCtx::ALL)
            .unwrap_err();
        assert_eq!(err, ComError::Native(HResult::OUTOFMEMORY));
        assert_eq!(obj.release_calls(), 0);
    }

    #[test]
    fn success_without_object_is_an_error() {
        let runtime = MockRuntime::new();
        runtime.succeed_with_null();
        let err = co_create_instance::<IUnknown, _>(&runtime, &CLSID_THING, None, ClsCtx::ALL)
            .unwrap_err();
        assert_eq!(err, ComError::NullPointer);
    }

    #[test]
    fn outer_reference_is_released_before_creation() {
        let outer_obj = MockObject::new();
        let obj = MockObject::new();
        let runtime = MockRuntime::new();
        runtime.register(CLSID_THING, &obj);

        let outer = unsafe { IUnknown::from_raw(outer_obj.new_ref()) };
        let _unk: IUnknown =
            co_create_instance(&runtime, &CLSID_THING, Some(&outer), ClsCtx::ALL).unwrap();

        assert!(outer.is_null());
        assert_eq!(outer_obj.release_calls(), 1);
        assert!(runtime.creates()[0].outer_requested);
    }

    #[test]
    fn outer_written_by_failed_creation_is_owned_by_caller() {
        let outer_obj = MockObject::new();
        let runtime = MockRuntime::new();
        runtime.hand_back_outer(&outer_obj);
        runtime.fail_with(E_OUTOFMEMORY);

        let outer = IUnknown::null();
        let err = co_create_instance::<IUnknown, _>(&runtime, &CLSID_THING, Some(&outer), ClsCtx::ALL)
            .unwrap_err();
        assert_eq!(err, ComError::Native(HResult::OUTOFMEMORY));
        assert_eq!(outer.ppvt(), outer_obj.ppvt());
        assert_eq!(outer_obj.ref_count(), 1);

        drop(outer);
        assert_eq!(outer_obj.ref_count(), 0);
        assert_eq!(outer_obj.underflows(), 0);
    }

    #[test]
    fn outer_written_by_null_success_is_owned_by_caller() {
        let outer_obj = MockObject::new();
        let runtime = MockRuntime::new();
        runtime.hand_back_outer(&outer_obj);
        runtime.succeed_with_null();

        let outer = unsafe { IUnknown::from_raw(outer_obj.new_ref()) };
        let err = co_create_instance::<IUnknown, _>(&runtime, &CLSID_THING, Some(&outer), ClsCtx::ALL)
            .unwrap_err();
        assert_eq!(err, ComError::NullPointer);
        assert_eq!(outer_obj.release_calls(), 1);
        assert_eq!(outer_obj.ref_count(), 1);

        outer.release();
        assert_eq!(outer_obj.ref_count(), 0);
    }
}
