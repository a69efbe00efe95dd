// Copyright (c) 2026 Exveria
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scoped COM initialization for the calling thread.

use core::fmt;
use core::marker::PhantomData;

use crate::error::{ComError, ComResult};
use crate::runtime::{CoInit, ComRuntime};

/// Drop guard pairing a successful `CoInitializeEx` with `CoUninitialize`.
///
/// Create it at the top of the thread's COM scope and let every COM handle
/// and [`Releaser`](crate::Releaser) be dropped before it.
///
/// # Thread Safety
/// COM initialization is per thread, so the guard is neither `Send` nor
/// `Sync` and must be dropped on the thread that created it.
pub struct ComApartment<'rt, R: ComRuntime + ?Sized> {
    runtime: &'rt R,
    coinit: CoInit,
    _not_send: PhantomData<*mut ()>,
}

impl<'rt, R: ComRuntime + ?Sized> ComApartment<'rt, R> {
    /// Initializes COM on this thread.
    ///
    /// `S_OK` and `S_FALSE` (already initialized with the same model) both
    /// succeed and are balanced on drop. Any other status, including
    /// `RPC_E_CHANGED_MODE`, is an error and nothing is balanced.
    pub fn initialize(runtime: &'rt R, coinit: CoInit) -> ComResult<Self> {
        let hr = runtime.initialize(coinit);
        if hr.is_error() {
            tracing::error!(status = %hr, coinit = coinit.bits(), "COM initialization failed");
            return Err(ComError::Native(hr));
        }
        tracing::debug!(status = %hr, coinit = coinit.bits(), "COM initialized");
        Ok(Self {
            runtime,
            coinit,
            _not_send: PhantomData,
        })
    }

    /// Single-threaded apartment, the usual choice for UI threads.
    pub fn sta(runtime: &'rt R) -> ComResult<Self> {
        Self::initialize(runtime, CoInit::APARTMENTTHREADED)
    }

    /// Multi-threaded apartment, for worker threads.
    pub fn mta(runtime: &'rt R) -> ComResult<Self> {
        Self::initialize(runtime, CoInit::MULTITHREADED)
    }

    pub fn coinit(&self) -> CoInit {
        self.coinit
    }
}

impl<R: ComRuntime + ?Sized> Drop for ComApartment<'_, R> {
    fn drop(&mut self) {
        tracing::debug!(coinit = self.coinit.bits(), "COM uninitialized");
        self.runtime.uninitialize();
    }
}

impl<R: ComRuntime + ?Sized> fmt::Debug for ComApartment<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComApartment").field("coinit", &self.coinit).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hresult::{HResult, RPC_E_CHANGED_MODE, S_FALSE};
    use crate::mock::MockRuntime;

    #[test]
    fn guard_balances_initialize() {
        let runtime = MockRuntime::new();
        {
            let apartment = ComApartment::sta(&runtime).unwrap();
            assert_eq!(apartment.coinit(), CoInit::APARTMENTTHREADED);
            assert_eq!(runtime.uninit_calls(), 0);
        }
        assert_eq!(runtime.init_calls(), [CoInit::APARTMENTTHREADED]);
        assert_eq!(runtime.uninit_calls(), 1);
    }

    #[test]
    fn already_initialized_is_still_balanced() {
        let runtime = MockRuntime::new();
        runtime.set_init_status(S_FALSE);
        drop(ComApartment::mta(&runtime).unwrap());
        assert_eq!(runtime.uninit_calls(), 1);
    }

    #[test]
    fn changed_mode_is_an_error_without_uninitialize() {
        let runtime = MockRuntime::new();
        runtime.set_init_status(RPC_E_CHANGED_MODE);
        let err = ComApartment::sta(&runtime).unwrap_err();
        assert_eq!(err, ComError::Native(HResult::CHANGED_MODE));
        assert_eq!(runtime.uninit_calls(), 0);
    }
}
