//! # BSP Tree
//!
//! Binary Space Partitioning tree built from one solid's faces and used to
//! cut the other solid's faces into fragments. After partitioning, every
//! fragment lies entirely on one side of the solid's surface (or on it), so
//! a single point classification per fragment decides whether it is kept.
//!
//! ## References
//!
//! - Naylor, B. (1990). "Binary Space Partitioning Trees"
//! - Thibault, W. C., & Naylor, B. F. (1987). "Set operations on polyhedra using BSP trees"

use super::polygon::{split_polygon, BspPolygon, Plane, PolygonClassification};

/// BSP tree node.
///
/// ```text
///           [Plane]
///          /       \
///      Front       Back
///     (+ side)   (- side)
/// ```
#[derive(Debug, Default)]
pub struct BspNode {
    plane: Option<Plane>,
    front: Option<Box<BspNode>>,
    back: Option<Box<BspNode>>,
}

impl BspNode {
    /// Build a tree from polygons, using each node's first polygon as its
    /// splitting plane. Coplanar polygons are absorbed by the node.
    pub fn build(polygons: Vec<BspPolygon>) -> Self {
        let mut node = Self::default();
        let Some(first) = polygons.first() else {
            return node;
        };
        let plane = Plane::from_polygon(first);
        node.plane = Some(plane);

        let mut front_polys = Vec::new();
        let mut back_polys = Vec::new();
        for poly in polygons {
            match split_polygon(&poly, &plane) {
                (PolygonClassification::Coplanar, _, _) => {}
                (PolygonClassification::Front, _, _) => front_polys.push(poly),
                (PolygonClassification::Back, _, _) => back_polys.push(poly),
                (PolygonClassification::Spanning, front, back) => {
                    front_polys.extend(front);
                    back_polys.extend(back);
                }
            }
        }

        if !front_polys.is_empty() {
            node.front = Some(Box::new(Self::build(front_polys)));
        }
        if !back_polys.is_empty() {
            node.back = Some(Box::new(Self::build(back_polys)));
        }
        node
    }

    /// Cut polygons along every plane they cross on their way to a leaf.
    ///
    /// Polygons lying in a node's plane are cut by both subtrees, so they end
    /// up split along the outline of the face they lie on.
    pub fn partition(&self, polygons: Vec<BspPolygon>) -> Vec<BspPolygon> {
        let Some(plane) = self.plane else {
            return polygons;
        };

        let mut front_polys = Vec::new();
        let mut back_polys = Vec::new();
        let mut coplanar_polys = Vec::new();
        for poly in polygons {
            match split_polygon(&poly, &plane) {
                (PolygonClassification::Coplanar, _, _) => coplanar_polys.push(poly),
                (PolygonClassification::Front, _, _) => front_polys.push(poly),
                (PolygonClassification::Back, _, _) => back_polys.push(poly),
                (PolygonClassification::Spanning, front, back) => {
                    front_polys.extend(front);
                    back_polys.extend(back);
                }
            }
        }

        let mut result = Self::partition_subtree(&self.front, front_polys);
        result.extend(Self::partition_subtree(&self.back, back_polys));
        let coplanar_polys = Self::partition_subtree(&self.front, coplanar_polys);
        result.extend(Self::partition_subtree(&self.back, coplanar_polys));
        result
    }

    fn partition_subtree(subtree: &Option<Box<BspNode>>, polygons: Vec<BspPolygon>) -> Vec<BspPolygon> {
        match subtree {
            Some(node) if !polygons.is_empty() => node.partition(polygons),
            _ => polygons,
        }
    }

    /// Depth of the deepest leaf.
    pub fn depth(&self) -> usize {
        let front = self.front.as_ref().map_or(0, |n| n.depth());
        let back = self.back.as_ref().map_or(0, |n| n.depth());
        usize::from(self.plane.is_some()) + front.max(back)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;

    fn square_at(z: f64) -> BspPolygon {
        BspPolygon::new(vec![
            DVec3::new(-1.0, -1.0, z),
            DVec3::new(1.0, -1.0, z),
            DVec3::new(1.0, 1.0, z),
            DVec3::new(-1.0, 1.0, z),
        ])
        .unwrap()
    }

    #[test]
    fn test_build_empty() {
        let node = BspNode::build(vec![]);
        assert!(node.plane.is_none());
        assert_eq!(node.depth(), 0);
    }

    #[test]
    fn test_build_stacks_parallel_planes() {
        let node = BspNode::build(vec![square_at(0.0), square_at(1.0), square_at(-1.0)]);
        assert_eq!(node.depth(), 2);
    }

    #[test]
    fn test_partition_cuts_spanning_polygon() {
        let tree = BspNode::build(vec![square_at(0.0)]);
        let wall = BspPolygon::new(vec![
            DVec3::new(0.0, -1.0, -1.0),
            DVec3::new(0.0, 1.0, -1.0),
            DVec3::new(0.0, 1.0, 1.0),
            DVec3::new(0.0, -1.0, 1.0),
        ])
        .unwrap();
        let fragments = tree.partition(vec![wall]);
        assert_eq!(fragments.len(), 2);
    }
}
