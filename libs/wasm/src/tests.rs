//! Tests for the id-based entry points used by the JavaScript surface.

use super::*;

fn session_with_cubes(n: usize) -> (CsgSession, Vec<SolidHandle>) {
    let session = CsgSession::default();
    let cubes = (0..n)
        .map(|i| {
            let cube = session.cube(1.0, 1.0, 1.0, false).unwrap();
            session.translate(&cube, 2.0 * i as f64, 0.0, 0.0).unwrap()
        })
        .collect();
    (session, cubes)
}

/// Union by id copies its inputs; they stay usable afterwards.
#[test]
fn union_many_ids_keeps_inputs() {
    let (session, cubes) = session_with_cubes(3);
    let ids: Vec<u64> = cubes.iter().map(SolidHandle::id).collect();
    let union = session.union_many_ids(&ids).unwrap();
    assert!((session.volume(&union).unwrap() - 3.0).abs() < 1e-6);
    for cube in &cubes {
        assert!(!session.is_released(cube));
        assert!((session.volume(cube).unwrap() - 1.0).abs() < 1e-9);
    }
}

/// Hull by id consumes every listed handle.
#[test]
fn hull_ids_donates_inputs() {
    let (session, cubes) = session_with_cubes(2);
    let ids: Vec<u64> = cubes.iter().map(SolidHandle::id).collect();
    let hull = session.hull_ids(&ids).unwrap();
    assert!((session.volume(&hull).unwrap() - 3.0).abs() < 1e-6);
    for cube in &cubes {
        assert!(session.is_released(cube));
        assert_eq!(session.volume(cube).unwrap_err().kind(), "ReleasedHandle");
    }
}

/// Listing one handle twice donates it once and still succeeds.
#[test]
fn hull_ids_tolerates_aliasing() {
    let (session, cubes) = session_with_cubes(1);
    let id = cubes[0].id();
    let hull = session.hull_ids(&[id, id, id]).unwrap();
    assert!((session.volume(&hull).unwrap() - 1.0).abs() < 1e-6);
    assert!(session.is_released(&cubes[0]));
    // the untranslated temporary, then the donated cube
    assert_eq!(session.stats().handles.released, 2);
}

/// A stale id anywhere in the list fails the hull before anything is donated.
#[test]
fn hull_ids_validates_before_donating() {
    let (session, cubes) = session_with_cubes(2);
    session.release(&cubes[1]).unwrap();
    let err = session.hull_ids(&[cubes[0].id(), cubes[1].id()]).unwrap_err();
    assert_eq!(err.kind(), "ReleasedHandle");
    assert!(!session.is_released(&cubes[0]));
}

/// Ids that were never issued are reported as released handles.
#[test]
fn unknown_id_is_released_handle() {
    let session = CsgSession::default();
    let err = session.union_many_ids(&[u64::MAX]).unwrap_err();
    assert_eq!(err.kind(), "ReleasedHandle");
}

/// An empty batch produces an empty solid rather than an error.
#[test]
fn empty_batches_are_empty_solids() {
    let session = CsgSession::default();
    let union = session.union_many_ids(&[]).unwrap();
    let hull = session.hull_ids(&[]).unwrap();
    assert!(session.is_empty(&union).unwrap());
    assert!(session.is_empty(&hull).unwrap());
}
