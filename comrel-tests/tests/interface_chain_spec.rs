use core::ffi::c_void;

use comrel::mock::{MockObject, MockState, MOCK_UNKNOWN_VTBL};
use comrel::vtable::{self, IUnknownVtbl, SLOT_RELEASE};
use comrel::{declare_com_ptr, ComPtr, HResult, Releasable, Releaser, GUID, HRESULT};
use comrel_tests::{IScenario, IScenarioVtbl, IID_SCENARIO};

const IID_DERIVED: GUID = GUID::from_u128(0x0000_0000_0000_0000_0000_0000_0000_0003);

declare_com_ptr! {
    pub struct IDerived: IScenario {
        const IID: GUID = IID_DERIVED;

        fn Add(a: usize, b: usize, out: *mut usize) -> HRESULT;
    }
}

impl IDerived {
    fn add(&self, a: usize, b: usize) -> Result<usize, HResult> {
        let mut out = 0;
        let hr = unsafe { (self.vtbl().Add)(self.ppvt(), a, b, &mut out) };
        HResult(hr).ok().map(|()| out)
    }
}

unsafe extern "system" fn add(this: *mut c_void, a: usize, b: usize, out: *mut usize) -> HRESULT {
    let status = unsafe { MockState::from_this(this) }.record("Add", &[a, b]);
    unsafe { *out = a + b };
    status
}

static DERIVED_VTBL: IDerivedVtbl = IDerivedVtbl {
    parent: IScenarioVtbl {
        parent: MOCK_UNKNOWN_VTBL,
    },
    Add: add,
};

fn derived_object() -> MockObject {
    MockObject::with_vtable(&DERIVED_VTBL, &[IID_SCENARIO, IID_DERIVED])
}

#[test]
fn derived_interface_calls_its_own_slot() {
    let object = derived_object();
    let derived = unsafe { IDerived::from_raw(object.new_ref()) };

    assert_eq!(derived.add(40, 2), Ok(42));
    assert_eq!(object.calls(), [("Add", vec![40, 2])]);
}

#[test]
fn raw_invoke_reaches_the_same_slot() {
    let object = derived_object();
    let derived = unsafe { IDerived::from_raw(object.new_ref()) };

    let mut out = 0usize;
    let slot = core::mem::size_of::<IUnknownVtbl>() / core::mem::size_of::<usize>();
    let raw = unsafe { vtable::invoke(derived.ppvt(), slot, &[1, 2, &mut out as *mut usize as usize]) };
    assert_eq!(raw as HRESULT, 0);
    assert_eq!(out, 3);
}

#[test]
fn raw_release_slot_matches_handle_release() {
    let object = derived_object();
    let derived = unsafe { IDerived::from_raw(object.new_ref()) };
    let extra = object.new_ref();

    let remaining = unsafe { vtable::invoke(extra, SLOT_RELEASE, &[]) } as u32;
    assert_eq!(remaining, 1);
    assert_eq!(derived.release(), 0);
    assert_eq!(object.release_calls(), 2);
}

#[test]
fn upcast_to_parent_is_a_borrow_and_downcast_a_query() {
    let object = derived_object();
    let rel = Releaser::new();
    let derived: &IDerived = rel
        .track(unsafe { IDerived::from_raw(object.new_ref()) })
        .unwrap();

    let parent: &IScenario = derived;
    assert_eq!(parent.ppvt(), derived.ppvt());
    assert_eq!(IScenario::IID, IID_SCENARIO);

    let down: &IDerived = rel.query(parent).unwrap();
    assert_eq!(down.add(1, 1), Ok(2));
    drop(rel);
    assert_eq!(object.ref_count(), 0);
}
