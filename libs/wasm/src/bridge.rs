//! # Callback Bridge
//!
//! Re-enters the host once per vertex during a warp.
//!
//! A host function is bound for the duration of one warp and yields a
//! [`CallbackToken`]. The kernel drives the token synchronously, one vertex at
//! a time, on the calling thread. Dropping the token unbinds it, so the
//! binding is released on every exit path, including kernel errors and host
//! failures. While a token is bound, a second warp is refused: the bridge is
//! re-entrant for ordinary calls but not for nested warps.

use std::cell::Cell;

use csg_kernel::Manifold;
use glam::DVec3;
use tracing::{trace, warn};

use crate::error::{CsgError, CsgResult};

/// A host function `(x, y, z) -> (x', y', z')`.
///
/// `Err` carries the host's failure message. `Ok` carries whatever numbers
/// the host returned; the bridge checks there are exactly three, all finite.
pub trait VertexFunction {
    /// Call the host once.
    fn call(&mut self, x: f64, y: f64, z: f64) -> Result<Vec<f64>, String>;
}

impl<F> VertexFunction for F
where
    F: FnMut(f64, f64, f64) -> Result<Vec<f64>, String>,
{
    fn call(&mut self, x: f64, y: f64, z: f64) -> Result<Vec<f64>, String> {
        self(x, y, z)
    }
}

/// Pin a closure's signature so it can be passed where a
/// [`VertexFunction`] is expected.
pub fn vertex_fn<F>(f: F) -> F
where
    F: FnMut(f64, f64, f64) -> Result<Vec<f64>, String>,
{
    f
}

/// Tracks the warp in flight, if any.
#[derive(Debug, Default)]
pub struct CallbackBridge {
    in_flight: Cell<bool>,
    bound: Cell<usize>,
}

impl CallbackBridge {
    /// Idle bridge.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a host function. Fails while another binding is live.
    pub fn bind<F: VertexFunction>(&self, function: F) -> CsgResult<CallbackToken<'_, F>> {
        if self.in_flight.replace(true) {
            warn!("warp rejected: started from inside a warp callback");
            return Err(CsgError::Callback(
                "warp cannot be started from inside a warp callback".to_string(),
            ));
        }
        self.bound.set(self.bound.get() + 1);
        Ok(CallbackToken {
            bridge: self,
            function,
            calls: 0,
        })
    }

    /// Deform `solid` by calling `function` once per vertex, in vertex order.
    ///
    /// The first host failure aborts the whole warp; no coordinate is ever
    /// substituted.
    pub fn warp<F: VertexFunction>(&self, solid: &Manifold, function: F) -> CsgResult<Manifold> {
        let mut token = self.bind(function)?;
        let result = solid.try_warp(|p| token.invoke(p));
        trace!(calls = token.calls(), ok = result.is_ok(), "warp finished");
        result
    }

    /// Number of tokens currently bound (zero or one).
    pub fn bound_tokens(&self) -> usize {
        self.bound.get()
    }

    /// True while a warp is running.
    pub fn is_busy(&self) -> bool {
        self.in_flight.get()
    }
}

/// A bound host function. Unbinds when dropped.
pub struct CallbackToken<'b, F> {
    bridge: &'b CallbackBridge,
    function: F,
    calls: u64,
}

impl<F: VertexFunction> CallbackToken<'_, F> {
    /// Pass one vertex to the host and read back exactly three finite
    /// numbers.
    pub fn invoke(&mut self, p: DVec3) -> CsgResult<DVec3> {
        self.calls += 1;
        let values = self.function.call(p.x, p.y, p.z).map_err(|message| {
            warn!(vertex_call = self.calls, %message, "warp callback failed");
            CsgError::Callback(message)
        })?;
        match values[..] {
            [x, y, z] if x.is_finite() && y.is_finite() && z.is_finite() => Ok(DVec3::new(x, y, z)),
            [_, _, _] => Err(CsgError::Callback(
                "warp function returned a non-finite coordinate".to_string(),
            )),
            _ => Err(CsgError::Callback(format!(
                "warp function must return three numbers, got {}",
                values.len()
            ))),
        }
    }

    /// Calls made so far.
    pub fn calls(&self) -> u64 {
        self.calls
    }

    /// Release the binding now rather than at end of scope.
    pub fn unbind(self) {}
}

impl<F> Drop for CallbackToken<'_, F> {
    fn drop(&mut self) {
        self.bridge.bound.set(self.bridge.bound.get().saturating_sub(1));
        self.bridge.in_flight.set(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_cube() -> Manifold {
        Manifold::cube(DVec3::ONE, false)
    }

    #[test]
    fn test_shear_preserves_volume() {
        let bridge = CallbackBridge::new();
        let sheared = bridge
            .warp(&unit_cube(), vertex_fn(|x, y, z| Ok(vec![x, y, z + x])))
            .unwrap();
        assert_relative_eq!(sheared.volume(), 1.0, epsilon = 1e-6);
        assert_eq!(bridge.bound_tokens(), 0);
    }

    #[test]
    fn test_called_once_per_vertex_in_order() {
        let bridge = CallbackBridge::new();
        let cube = unit_cube();
        let mut seen = Vec::new();
        bridge
            .warp(
                &cube,
                vertex_fn(|x, y, z| {
                    seen.push(DVec3::new(x, y, z));
                    Ok(vec![x, y, z])
                }),
            )
            .unwrap();
        let expected: Vec<DVec3> = cube.mesh().positions().collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_host_failure_aborts_and_unbinds() {
        let bridge = CallbackBridge::new();
        let mut calls = 0;
        let err = bridge
            .warp(
                &unit_cube(),
                vertex_fn(|x, y, z| {
                    calls += 1;
                    if calls == 3 {
                        Err("boom".to_string())
                    } else {
                        Ok(vec![x, y, z])
                    }
                }),
            )
            .unwrap_err();
        assert_eq!(err, CsgError::Callback("boom".to_string()));
        assert_eq!(calls, 3);
        assert_eq!(bridge.bound_tokens(), 0);
        assert!(!bridge.is_busy());

        let next = bridge.warp(&unit_cube(), vertex_fn(|x, y, z| Ok(vec![x, y, z])));
        assert!(next.is_ok());
    }

    #[test]
    fn test_wrong_arity_is_callback_failure() {
        let bridge = CallbackBridge::new();
        let err = bridge
            .warp(&unit_cube(), vertex_fn(|x, y, _z| Ok(vec![x, y])))
            .unwrap_err();
        assert_eq!(err.kind(), "CallbackFailure");
        assert!(err.to_string().contains("got 2"));

        let err = bridge
            .warp(&unit_cube(), vertex_fn(|_, _, _| Ok(vec![f64::NAN, 0.0, 0.0])))
            .unwrap_err();
        assert!(err.to_string().contains("non-finite"));
    }

    #[test]
    fn test_nested_bind_rejected() {
        let bridge = CallbackBridge::new();
        let token = bridge
            .bind(vertex_fn(|x, y, z| Ok(vec![x, y, z])))
            .unwrap();
        assert!(bridge.is_busy());
        let nested = bridge.bind(vertex_fn(|x, y, z| Ok(vec![x, y, z])));
        assert_eq!(nested.err().map(|e| e.kind()), Some("CallbackFailure"));
        token.unbind();
        assert!(!bridge.is_busy());
        assert_eq!(bridge.bound_tokens(), 0);
    }

    #[test]
    fn test_warp_of_empty_solid_never_calls_host() {
        let bridge = CallbackBridge::new();
        let result = bridge
            .warp(&Manifold::empty(), vertex_fn(|_, _, _| Err("unreachable".to_string())))
            .unwrap();
        assert!(result.is_empty());
    }
}
