use comrel::mock::{MockObject, MockRuntime};
use comrel::{ClsCtx, ComPtr, IUnknown, Releasable, ReleaseOrder, Releaser, ReleaserState};
use comrel_tests::{IScenario, CLSID_SCENARIO, IID_SCENARIO};

#[test]
fn every_handle_is_released_once_regardless_of_manual_releases() {
    for manual in 0..6 {
        for tracked in 0..6 {
            let object = MockObject::new();
            {
                let rel = Releaser::new();
                for _ in 0..tracked {
                    let handle = rel
                        .track(unsafe { IUnknown::from_raw(object.new_ref()) })
                        .unwrap();
                    for _ in 0..manual {
                        handle.release();
                    }
                }
            }
            assert_eq!(object.release_calls(), tracked, "manual={manual} tracked={tracked}");
            assert_eq!(object.ref_count(), 0);
            assert_eq!(object.underflows(), 0);
        }
    }
}

#[test]
fn second_release_all_is_a_no_op() {
    let object = MockObject::new();
    let rel = Releaser::new();
    rel.track(unsafe { IUnknown::from_raw(object.new_ref()) }).unwrap();

    assert_eq!(rel.release_all(), 1);
    assert_eq!(rel.state(), ReleaserState::Released);
    assert_eq!(rel.release_all(), 0);
    drop(rel);
    assert_eq!(object.release_calls(), 1);
}

#[test]
fn two_references_to_one_class_release_twice() {
    let object = MockObject::with_interfaces(&[IID_SCENARIO]);
    let runtime = MockRuntime::new();
    runtime.register(CLSID_SCENARIO, &object);

    let rel = Releaser::new();
    let first: &IScenario = rel.create(&runtime, &CLSID_SCENARIO, ClsCtx::ALL).unwrap();
    let second: &IScenario = rel.create(&runtime, &CLSID_SCENARIO, ClsCtx::ALL).unwrap();
    assert_eq!(first.ppvt(), second.ppvt());
    assert_eq!(object.ref_count(), 2);

    rel.release_all();
    assert_eq!(object.release_calls(), 2);
    assert_eq!(object.ref_count(), 0);
    assert!(first.is_null());
    assert!(second.is_null());

    drop(rel);
    assert_eq!(object.release_calls(), 2);
}

#[test]
fn queried_interfaces_are_tracked_alongside_created_ones() {
    let object = MockObject::with_interfaces(&[IID_SCENARIO]);
    let runtime = MockRuntime::new();
    runtime.register(CLSID_SCENARIO, &object);

    {
        let rel = Releaser::with_order(ReleaseOrder::Fifo);
        let unknown: &IUnknown = rel.create(&runtime, &CLSID_SCENARIO, ClsCtx::ALL).unwrap();
        let scenario: &IScenario = rel.query(unknown).unwrap();
        let back: &IUnknown = rel.query(scenario).unwrap();
        assert_eq!(back.ppvt(), unknown.ppvt());
        assert_eq!(rel.len(), 3);
        assert_eq!(object.ref_count(), 3);
    }
    assert_eq!(object.ref_count(), 0);
    assert_eq!(object.release_calls(), 3);
}

#[test]
fn explicit_clone_is_an_independent_obligation() {
    let object = MockObject::new();
    let rel = Releaser::new();
    let handle = rel.track(unsafe { IUnknown::from_raw(object.new_ref()) }).unwrap();
    let alias = rel.track(handle.clone()).unwrap();

    assert_eq!(object.add_ref_calls(), 1);
    alias.release();
    assert_eq!(object.ref_count(), 1);
    drop(rel);
    assert_eq!(object.ref_count(), 0);
    assert_eq!(object.underflows(), 0);
}
