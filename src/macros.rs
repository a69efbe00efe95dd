// Copyright (c) 2026 Exveria
// SPDX-License-Identifier: MIT OR Apache-2.0

#[macro_export]
/// Returns early with `Err(err.into())` when `cond` is false.
macro_rules! ensure {
    ($cond:expr, $err:expr $(,)?) => {
        if !$cond {
            return ::core::result::Result::Err(::core::convert::From::from($err));
        }
    };
}

#[macro_export]
/// Declares a COM interface handle and its vtable layout.
///
/// The handle is a `#[repr(transparent)]` wrapper around its parent handle
/// (ultimately [`IUnknown`](crate::IUnknown)) and forwards release and raw
/// access to it; `Deref` exposes the parent's methods. The vtable struct is
/// named `<Name>Vtbl`, starts with the parent vtable in a field named
/// `parent` and lists the new slots in declaration order.
///
/// When the parent is not `IUnknown`, both `Parent` and `ParentVtbl` must be
/// in scope.
///
/// ```
/// use comrel::{declare_com_ptr, ComResult, GUID, HResult, HRESULT};
///
/// declare_com_ptr! {
///     /// Example interface.
///     pub struct IExample: IUnknown {
///         const IID: GUID = GUID::from_u128(0x1234_5678_9ABC_DEF0_1234_5678_9ABC_DEF0);
///
///         fn Ping(value: u32) -> HRESULT;
///     }
/// }
///
/// impl IExample {
///     pub fn ping(&self, value: u32) -> ComResult<()> {
///         let hr = unsafe { (self.vtbl().Ping)(self.ppvt(), value) };
///         Ok(HResult(hr).ok()?)
///     }
/// }
/// ```
macro_rules! declare_com_ptr {
    (
        $(#[$attr:meta])*
        $vis:vis struct $name:ident: IUnknown {
            const IID: $iid_ty:ty = $iid:expr;
            $($slots:tt)*
        }
    ) => {
        $crate::__comrel_define_ptr! {
            attrs [$(#[$attr])*],
            vis ($vis),
            name $name,
            parent ($crate::IUnknown),
            parent_vtable ($crate::IUnknownVtbl),
            iid ($iid),
            slots { $($slots)* }
        }
    };
    (
        $(#[$attr:meta])*
        $vis:vis struct $name:ident: $parent:ident {
            const IID: $iid_ty:ty = $iid:expr;
            $($slots:tt)*
        }
    ) => {
        $crate::paste::paste! {
            $crate::__comrel_define_ptr! {
                attrs [$(#[$attr])*],
                vis ($vis),
                name $name,
                parent ($parent),
                parent_vtable ([<$parent Vtbl>]),
                iid ($iid),
                slots { $($slots)* }
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __comrel_define_ptr {
    (
        attrs [$($attrs:tt)*],
        vis ($vis:vis),
        name $name:ident,
        parent ($parent:ty),
        parent_vtable ($parent_vtable:ty),
        iid ($iid:expr),
        slots {
            $(
                $(#[$slot_attr:meta])*
                fn $slot:ident($($arg:ident: $arg_ty:ty),* $(,)?) $(-> $ret:ty)?;
            )*
        }
    ) => {
        $crate::paste::paste! {
            #[repr(C)]
            #[derive(Clone, Copy)]
            #[allow(non_snake_case)]
            $vis struct [<$name Vtbl>] {
                pub parent: $parent_vtable,
                $(
                    $(#[$slot_attr])*
                    pub $slot: unsafe extern "system" fn(
                        this: *mut ::core::ffi::c_void
                        $(, $arg: $arg_ty)*
                    ) $(-> $ret)?,
                )*
            }

            unsafe impl $crate::vtable::InterfaceVtable for [<$name Vtbl>] {}

            $($attrs)*
            #[repr(transparent)]
            $vis struct $name($parent);

            impl $name {
                /// The interface vtable.
                ///
                /// # Panics
                /// When the handle was released.
                #[inline]
                #[track_caller]
                #[allow(dead_code)]
                pub fn vtbl(&self) -> &[<$name Vtbl>] {
                    // SAFETY: handles only come from `from_raw`, whose caller
                    // vouches that the object implements this interface.
                    unsafe { $crate::ComPtr::as_unknown(self).vtbl::<[<$name Vtbl>]>() }
                }
            }
        }

        impl $crate::Releasable for $name {
            #[inline]
            fn release(&self) -> u32 {
                $crate::Releasable::release(&self.0)
            }

            #[inline]
            fn is_released(&self) -> bool {
                $crate::Releasable::is_released(&self.0)
            }
        }

        impl $crate::ComPtr for $name {
            const IID: $crate::GUID = $iid;

            #[inline]
            fn as_unknown(&self) -> &$crate::IUnknown {
                $crate::ComPtr::as_unknown(&self.0)
            }

            #[inline]
            unsafe fn from_raw(ppvt: *mut ::core::ffi::c_void) -> Self {
                Self(unsafe { <$parent as $crate::ComPtr>::from_raw(ppvt) })
            }
        }

        impl ::core::ops::Deref for $name {
            type Target = $parent;

            #[inline]
            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl ::core::clone::Clone for $name {
            #[inline]
            fn clone(&self) -> Self {
                Self(::core::clone::Clone::clone(&self.0))
            }
        }

        impl ::core::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.debug_struct(stringify!($name))
                    .field("ppvt", &$crate::ComPtr::ppvt(self))
                    .finish()
            }
        }
    };
}
