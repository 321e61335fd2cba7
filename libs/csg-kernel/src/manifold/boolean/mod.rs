//! # Boolean Operations
//!
//! Union, difference and intersection of closed meshes.
//!
//! ## Algorithm
//!
//! ```text
//! 1. Build a BSP tree from each operand's faces
//! 2. Partition each operand's faces with the other operand's tree
//! 3. Classify every fragment against the other operand (in parallel)
//! 4. Keep fragments by the table below, flipping B's for difference
//! 5. Merge coplanar fragments and weld vertices
//! ```
//!
//! | Operation | Keep from A | Keep from B |
//! |-----------|-------------|-------------|
//! | Union | outside, coplanar-same | outside |
//! | Intersection | inside, coplanar-same | inside |
//! | Difference | outside, coplanar-opposite | inside (flipped) |
//!
//! Operands whose bounding boxes do not overlap skip the BSP path entirely.

mod bsp;
pub(crate) mod geometry;
mod polygon;


use config::constants::PLANE_EPSILON;
use rayon::prelude::*;
use tracing::{debug, instrument};

use self::bsp::BspNode;
use self::geometry::{Containment, SolidClassifier};
use self::polygon::{mesh_to_polygons, polygons_to_mesh, BspPolygon};
use super::Manifold;
use crate::error::KernelResult;
use crate::mesh::MeshBuffers;

/// Kind of boolean operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpType {
    /// A ∪ B
    Add,
    /// A − B
    Subtract,
    /// A ∩ B
    Intersect,
}

impl Manifold {
    /// Boolean union.
    pub fn union(&self, other: &Manifold) -> KernelResult<Manifold> {
        self.boolean(other, OpType::Add)
    }

    /// Boolean difference, `self` minus `other`.
    pub fn difference(&self, other: &Manifold) -> KernelResult<Manifold> {
        self.boolean(other, OpType::Subtract)
    }

    /// Boolean intersection.
    pub fn intersection(&self, other: &Manifold) -> KernelResult<Manifold> {
        self.boolean(other, OpType::Intersect)
    }

    /// Apply `op` to `self` and `other`. Neither input is modified.
    #[instrument(skip_all, fields(op = ?op, a_tris = self.num_tri(), b_tris = other.num_tri()))]
    pub fn boolean(&self, other: &Manifold, op: OpType) -> KernelResult<Manifold> {
        let (a, b) = (self.mesh(), other.mesh());
        let mesh = match (a.is_empty(), b.is_empty(), op) {
            (true, _, OpType::Add) => b.clone(),
            (_, true, OpType::Add | OpType::Subtract) => a.clone(),
            (true, _, _) | (_, true, OpType::Intersect) => MeshBuffers::new(),
            _ if !bounds_overlap(a, b) => {
                debug!("bounding boxes disjoint, skipping partition");
                match op {
                    OpType::Add => {
                        let mut merged = a.clone();
                        merged.merge(b);
                        merged
                    }
                    OpType::Subtract => a.clone(),
                    OpType::Intersect => MeshBuffers::new(),
                }
            }
            _ => bsp_boolean(a, b, op),
        };
        Ok(Manifold::from_buffers(mesh))
    }

    /// Union of any number of solids. Inputs are borrowed and left intact.
    pub fn batch_union(solids: &[Manifold]) -> KernelResult<Manifold> {
        let mut iter = solids.iter();
        let Some(first) = iter.next() else {
            return Ok(Manifold::empty());
        };
        iter.try_fold(first.clone(), |acc, solid| acc.union(solid))
    }
}

fn bounds_overlap(a: &MeshBuffers, b: &MeshBuffers) -> bool {
    match (a.bounding_box(), b.bounding_box()) {
        (Some(ba), Some(bb)) => ba.overlaps(&bb, PLANE_EPSILON),
        _ => false,
    }
}

fn bsp_boolean(a: &MeshBuffers, b: &MeshBuffers, op: OpType) -> MeshBuffers {
    let polys_a = mesh_to_polygons(a);
    let polys_b = mesh_to_polygons(b);

    let (tree_a, tree_b) = rayon::join(
        || BspNode::build(polys_a.clone()),
        || BspNode::build(polys_b.clone()),
    );
    debug!(a_depth = tree_a.depth(), b_depth = tree_b.depth(), "built partition trees");

    let (fragments_a, fragments_b) =
        rayon::join(|| tree_b.partition(polys_a), || tree_a.partition(polys_b));
    debug!(
        a_fragments = fragments_a.len(),
        b_fragments = fragments_b.len(),
        "partitioned operands"
    );

    let classifier_a = SolidClassifier::new(a);
    let classifier_b = SolidClassifier::new(b);

    let mut kept = select(fragments_a, &classifier_b, |c| keep_from_a(op, c));
    let mut kept_b = select(fragments_b, &classifier_a, |c| keep_from_b(op, c));
    if op == OpType::Subtract {
        kept_b.iter_mut().for_each(BspPolygon::flip);
    }
    kept.append(&mut kept_b);

    polygons_to_mesh(kept)
}

fn select(
    fragments: Vec<BspPolygon>,
    classifier: &SolidClassifier,
    keep: impl Fn(Containment) -> bool + Sync,
) -> Vec<BspPolygon> {
    fragments
        .into_par_iter()
        .filter(|poly| keep(classifier.classify(poly)))
        .collect()
}

fn keep_from_a(op: OpType, c: Containment) -> bool {
    match op {
        OpType::Add => matches!(c, Containment::Outside | Containment::CoplanarSame),
        OpType::Intersect => matches!(c, Containment::Inside | Containment::CoplanarSame),
        OpType::Subtract => matches!(c, Containment::Outside | Containment::CoplanarOpposite),
    }
}

fn keep_from_b(op: OpType, c: Containment) -> bool {
    match op {
        OpType::Add => c == Containment::Outside,
        OpType::Intersect | OpType::Subtract => c == Containment::Inside,
    }
}
