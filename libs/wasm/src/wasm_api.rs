//! `#[wasm_bindgen]` surface.
//!
//! Only compiled for `wasm32`. Every function converts JS arguments, calls
//! the session living in this thread and converts the result back. Solids
//! cross the boundary as [`Solid`] objects; freeing one (explicitly or via
//! the JS finalizer) releases the native solid.

use js_sys::{Array, Function, Reflect};
use serde::de::DeserializeOwned;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::bridge::VertexFunction;
use crate::codec::HostFace;
use crate::dispatch::CsgSession;
use crate::error::{CsgError, CsgResult};
use crate::handle::SolidHandle;
use crate::value::{HostPoint2, HostPoint3};

// One session per JS realm; wasm is single-threaded here.
thread_local! {
    static SESSION: CsgSession = CsgSession::default();
}

fn with_session<T>(f: impl FnOnce(&CsgSession) -> CsgResult<T>) -> Result<T, JsValue> {
    SESSION.with(f).map_err(JsValue::from)
}

impl From<CsgError> for JsValue {
    fn from(err: CsgError) -> Self {
        let js = js_sys::Error::new(&err.to_string());
        js.set_name(err.kind());
        js.into()
    }
}

/// Installs a panic hook that forwards Rust panics to the browser console.
#[wasm_bindgen]
pub fn init_panic_hook() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// A native solid owned by JavaScript.
///
/// ```javascript
/// const a = csg.box(2, 2, 2, true);
/// const b = csg.sphere(1.3, 48);
/// const cut = csg.difference(a, b);
/// a.free(); b.free();
/// ```
#[wasm_bindgen]
pub struct Solid {
    handle: SolidHandle,
}

impl From<SolidHandle> for Solid {
    fn from(handle: SolidHandle) -> Self {
        Self { handle }
    }
}

#[wasm_bindgen]
impl Solid {
    /// Opaque handle id (a BigInt).
    #[wasm_bindgen(getter)]
    pub fn id(&self) -> u64 {
        self.handle.id()
    }

    /// Destroy the native solid now. Calling it again does nothing.
    pub fn release(&self) -> Result<bool, JsValue> {
        with_session(|s| s.release(&self.handle))
    }

    /// True after `release`, after donation to `hull`, or once the session
    /// no longer knows the solid.
    #[wasm_bindgen(getter, js_name = "isReleased")]
    pub fn is_released(&self) -> bool {
        SESSION.with(|s| s.is_released(&self.handle))
    }
}

fn solid(handle: SolidHandle) -> Solid {
    handle.into()
}

fn solid_array(handles: impl IntoIterator<Item = SolidHandle>) -> Array {
    handles.into_iter().map(|h| JsValue::from(solid(h))).collect()
}

fn from_js<T: DeserializeOwned>(name: &str, value: JsValue) -> CsgResult<T> {
    serde_wasm_bindgen::from_value(value)
        .map_err(|err| CsgError::argument(format!("{name}: {err}")))
}

/// Handle ids of an array of `Solid`s, read through each element's `id`.
fn solid_ids(list: &Array) -> CsgResult<Vec<u64>> {
    list.iter()
        .enumerate()
        .map(|(i, item)| {
            Reflect::get(&item, &JsValue::from_str("id"))
                .ok()
                .and_then(|id| u64::try_from(id).ok())
                .ok_or_else(|| CsgError::argument(format!("element {} is not a Solid", i + 1)))
        })
        .collect()
}

// =============================================================================
// PRIMITIVES
// =============================================================================

/// Box with extents `x`, `y`, `z`; centered on the origin when `centered`
/// is truthy.
#[wasm_bindgen(js_name = "box")]
pub fn make_box(x: f64, y: f64, z: f64, centered: JsValue) -> Result<Solid, JsValue> {
    with_session(|s| s.cube(x, y, z, centered.is_truthy())).map(solid)
}

/// Alias of `box`.
#[wasm_bindgen]
pub fn cube(x: f64, y: f64, z: f64, centered: JsValue) -> Result<Solid, JsValue> {
    make_box(x, y, z, centered)
}

#[wasm_bindgen]
pub fn cylinder(
    height: f64,
    r_bottom: f64,
    r_top: f64,
    segments: Option<f64>,
    centered: JsValue,
) -> Result<Solid, JsValue> {
    with_session(|s| s.cylinder(height, r_bottom, r_top, segments, centered.is_truthy()))
        .map(solid)
}

#[wasm_bindgen]
pub fn sphere(radius: f64, segments: Option<f64>) -> Result<Solid, JsValue> {
    with_session(|s| s.sphere(radius, segments)).map(solid)
}

#[wasm_bindgen]
pub fn tetrahedron() -> Solid {
    SESSION.with(|s| solid(s.tetrahedron()))
}

#[wasm_bindgen]
pub fn torus(
    major_radius: f64,
    minor_radius: f64,
    major_segments: Option<f64>,
    minor_segments: Option<f64>,
) -> Result<Solid, JsValue> {
    with_session(|s| s.torus(major_radius, minor_radius, major_segments, minor_segments))
        .map(solid)
}

// =============================================================================
// COMBINATORS
// =============================================================================

#[wasm_bindgen]
pub fn union(a: &Solid, b: &Solid) -> Result<Solid, JsValue> {
    with_session(|s| s.union(&a.handle, &b.handle)).map(solid)
}

#[wasm_bindgen]
pub fn difference(a: &Solid, b: &Solid) -> Result<Solid, JsValue> {
    with_session(|s| s.difference(&a.handle, &b.handle)).map(solid)
}

#[wasm_bindgen]
pub fn intersection(a: &Solid, b: &Solid) -> Result<Solid, JsValue> {
    with_session(|s| s.intersection(&a.handle, &b.handle)).map(solid)
}

/// Union of an array of solids. The inputs stay valid.
#[wasm_bindgen(js_name = "unionMany")]
pub fn union_many(solids: &Array) -> Result<Solid, JsValue> {
    with_session(|s| s.union_many_ids(&solid_ids(solids)?)).map(solid)
}

/// Convex hull of an array of solids. Every input is consumed and reports
/// `isReleased` afterwards.
#[wasm_bindgen]
pub fn hull(solids: &Array) -> Result<Solid, JsValue> {
    with_session(|s| s.hull_ids(&solid_ids(solids)?)).map(solid)
}

#[wasm_bindgen(js_name = "minkowskiSum")]
pub fn minkowski_sum(a: &Solid, b: &Solid) -> Result<Solid, JsValue> {
    with_session(|s| s.minkowski_sum(&a.handle, &b.handle)).map(solid)
}

// =============================================================================
// SWEEPS
// =============================================================================

/// Extrude an outline of `[x, y]` or `{x, y}` points along +Z.
#[wasm_bindgen]
pub fn extrude(
    polygon: JsValue,
    height: f64,
    slices: Option<f64>,
    twist_degrees: Option<f64>,
    scale_x: Option<f64>,
    scale_y: Option<f64>,
) -> Result<Solid, JsValue> {
    with_session(|s| {
        let points: Vec<HostPoint2> = from_js("polygon", polygon)?;
        s.extrude(&points, height, slices, twist_degrees, scale_x, scale_y)
    })
    .map(solid)
}

#[wasm_bindgen]
pub fn revolve(
    polygon: JsValue,
    segments: Option<f64>,
    degrees: Option<f64>,
) -> Result<Solid, JsValue> {
    with_session(|s| {
        let points: Vec<HostPoint2> = from_js("polygon", polygon)?;
        s.revolve(&points, segments, degrees)
    })
    .map(solid)
}

// =============================================================================
// TRANSFORMS
// =============================================================================

#[wasm_bindgen]
pub fn translate(solid_ref: &Solid, x: f64, y: f64, z: f64) -> Result<Solid, JsValue> {
    with_session(|s| s.translate(&solid_ref.handle, x, y, z)).map(solid)
}

/// Euler angles in degrees.
#[wasm_bindgen]
pub fn rotate(solid_ref: &Solid, x: f64, y: f64, z: f64) -> Result<Solid, JsValue> {
    with_session(|s| s.rotate(&solid_ref.handle, x, y, z)).map(solid)
}

#[wasm_bindgen]
pub fn scale(solid_ref: &Solid, x: f64, y: f64, z: f64) -> Result<Solid, JsValue> {
    with_session(|s| s.scale(&solid_ref.handle, x, y, z)).map(solid)
}

#[wasm_bindgen]
pub fn mirror(solid_ref: &Solid, nx: f64, ny: f64, nz: f64) -> Result<Solid, JsValue> {
    with_session(|s| s.mirror(&solid_ref.handle, nx, ny, nz)).map(solid)
}

struct JsVertexFunction<'f>(&'f Function);

impl VertexFunction for JsVertexFunction<'_> {
    fn call(&mut self, x: f64, y: f64, z: f64) -> Result<Vec<f64>, String> {
        let out = self
            .0
            .call3(&JsValue::NULL, &x.into(), &y.into(), &z.into())
            .map_err(|thrown| describe_thrown(&thrown))?;
        if !Array::is_array(&out) {
            return Err("warp function must return an array of three numbers".to_string());
        }
        Array::from(&out)
            .iter()
            .map(|v| {
                v.as_f64()
                    .ok_or_else(|| "warp function returned a non-number".to_string())
            })
            .collect()
    }
}

fn describe_thrown(thrown: &JsValue) -> String {
    thrown
        .dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .or_else(|| thrown.as_string())
        .unwrap_or_else(|| "warp function threw".to_string())
}

/// Copy of `solid` with each vertex replaced by `f(x, y, z)`, which must
/// return `[x, y, z]`. An exception from `f` aborts the warp.
#[wasm_bindgen]
pub fn warp(solid_ref: &Solid, f: JsValue) -> Result<Solid, JsValue> {
    with_session(|s| {
        let function = f
            .dyn_ref::<Function>()
            .ok_or_else(|| CsgError::argument("warp expects a function"))?;
        s.warp(&solid_ref.handle, JsVertexFunction(function))
    })
    .map(solid)
}

// =============================================================================
// PLANE OPERATIONS
// =============================================================================

#[wasm_bindgen(js_name = "trimByPlane")]
pub fn trim_by_plane(
    solid_ref: &Solid,
    nx: f64,
    ny: f64,
    nz: f64,
    offset: Option<f64>,
) -> Result<Solid, JsValue> {
    with_session(|s| s.trim_by_plane(&solid_ref.handle, nx, ny, nz, offset)).map(solid)
}

/// `[kept, removed]`.
#[wasm_bindgen(js_name = "splitByPlane")]
pub fn split_by_plane(
    solid_ref: &Solid,
    nx: f64,
    ny: f64,
    nz: f64,
    offset: Option<f64>,
) -> Result<Array, JsValue> {
    let (kept, removed) =
        with_session(|s| s.split_by_plane(&solid_ref.handle, nx, ny, nz, offset))?;
    Ok(solid_array([kept, removed]))
}

#[wasm_bindgen]
pub fn decompose(solid_ref: &Solid) -> Result<Array, JsValue> {
    with_session(|s| s.decompose(&solid_ref.handle)).map(solid_array)
}

// =============================================================================
// PROPERTIES
// =============================================================================

#[wasm_bindgen]
pub fn volume(solid_ref: &Solid) -> Result<f64, JsValue> {
    with_session(|s| s.volume(&solid_ref.handle))
}

#[wasm_bindgen(js_name = "surfaceArea")]
pub fn surface_area(solid_ref: &Solid) -> Result<f64, JsValue> {
    with_session(|s| s.surface_area(&solid_ref.handle))
}

/// `[[minX, minY, minZ], [maxX, maxY, maxZ]]`, or `null` when empty.
#[wasm_bindgen(js_name = "boundingBox")]
pub fn bounding_box(solid_ref: &Solid) -> Result<JsValue, JsValue> {
    match with_session(|s| s.bounding_box(&solid_ref.handle))? {
        Some(bounds) => Ok(serde_wasm_bindgen::to_value(&bounds)?),
        None => Ok(JsValue::NULL),
    }
}

#[wasm_bindgen(js_name = "numVert")]
pub fn num_vert(solid_ref: &Solid) -> Result<usize, JsValue> {
    with_session(|s| s.num_vert(&solid_ref.handle))
}

#[wasm_bindgen(js_name = "numTri")]
pub fn num_tri(solid_ref: &Solid) -> Result<usize, JsValue> {
    with_session(|s| s.num_tri(&solid_ref.handle))
}

#[wasm_bindgen(js_name = "isEmpty")]
pub fn is_empty(solid_ref: &Solid) -> Result<bool, JsValue> {
    with_session(|s| s.is_empty(&solid_ref.handle))
}

// =============================================================================
// MESH I/O AND LIFETIME
// =============================================================================

/// `{verts: [{x, y, z}], faces: [{i, j, k}]}` with 1-based faces.
#[wasm_bindgen(js_name = "toMesh")]
pub fn to_mesh(solid_ref: &Solid) -> Result<JsValue, JsValue> {
    let mesh = with_session(|s| s.to_mesh(&solid_ref.handle))?;
    Ok(serde_wasm_bindgen::to_value(&mesh)?)
}

/// Solid from vertex and 1-based face lists.
#[wasm_bindgen(js_name = "fromMesh")]
pub fn from_mesh(verts: JsValue, faces: JsValue) -> Result<Solid, JsValue> {
    with_session(|s| {
        let verts: Vec<HostPoint3> = from_js("verts", verts)?;
        let faces: Vec<HostFace> = from_js("faces", faces)?;
        s.from_mesh(&verts, &faces)
    })
    .map(solid)
}

/// Binary STL as a `Uint8Array`.
#[wasm_bindgen(js_name = "toStl")]
pub fn to_stl(solid_ref: &Solid) -> Result<Vec<u8>, JsValue> {
    with_session(|s| s.to_stl(&solid_ref.handle))
}

#[wasm_bindgen]
pub fn copy(solid_ref: &Solid) -> Result<Solid, JsValue> {
    with_session(|s| s.copy(&solid_ref.handle)).map(solid)
}

/// `{handles: {live, wrapped, released}, bound_tokens}`.
#[wasm_bindgen(js_name = "sessionStats")]
pub fn session_stats() -> Result<JsValue, JsValue> {
    let stats = SESSION.with(|s| s.stats());
    Ok(serde_wasm_bindgen::to_value(&stats)?)
}
