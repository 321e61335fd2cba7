//! Ear-clipping triangulation of a simple counter-clockwise outline.

use config::constants::EPSILON;
use glam::DVec2;

use crate::error::{KernelError, KernelResult};

/// Triangles as index triples into `points`, counter-clockwise.
///
/// Collinear runs are clipped last as zero-area triangles so every outline
/// edge still belongs to exactly one triangle.
pub fn triangulate(points: &[DVec2]) -> KernelResult<Vec<[usize; 3]>> {
    let n = points.len();
    if n < 3 {
        return Ok(Vec::new());
    }
    let extent = points
        .iter()
        .fold(1.0_f64, |m, p| m.max(p.abs().max_element()));
    let eps = EPSILON * extent * extent;

    let mut remaining: Vec<usize> = (0..n).collect();
    let mut triangles = Vec::with_capacity(n - 2);
    while remaining.len() > 3 {
        let m = remaining.len();
        let corner = |k: usize| {
            (
                remaining[(k + m - 1) % m],
                remaining[k],
                remaining[(k + 1) % m],
            )
        };

        let ear = (0..m).find(|&k| {
            let (a, b, c) = corner(k);
            turn(points[a], points[b], points[c]) > eps
                && !remaining.iter().any(|&v| {
                    v != a && v != b && v != c && inside_or_on(points[v], points[a], points[b], points[c], eps)
                })
        });
        let k = match ear {
            Some(k) => k,
            None => (0..m)
                .find(|&k| {
                    let (a, b, c) = corner(k);
                    turn(points[a], points[b], points[c]).abs() <= eps
                })
                .ok_or_else(|| {
                    KernelError::Triangulation(format!(
                        "no ear among {m} remaining vertices; outline may self-intersect"
                    ))
                })?,
        };
        let (a, b, c) = corner(k);
        triangles.push([a, b, c]);
        remaining.remove(k);
    }
    triangles.push([remaining[0], remaining[1], remaining[2]]);
    Ok(triangles)
}

fn turn(a: DVec2, b: DVec2, c: DVec2) -> f64 {
    (b - a).perp_dot(c - b)
}

fn inside_or_on(p: DVec2, a: DVec2, b: DVec2, c: DVec2, eps: f64) -> bool {
    if p == a || p == b || p == c {
        return false;
    }
    (b - a).perp_dot(p - a) >= -eps && (c - b).perp_dot(p - b) >= -eps && (a - c).perp_dot(p - c) >= -eps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cross_section::signed_area;
    use approx::assert_relative_eq;

    fn total_area(points: &[DVec2], tris: &[[usize; 3]]) -> f64 {
        tris.iter()
            .map(|t| signed_area(&[points[t[0]], points[t[1]], points[t[2]]]))
            .sum()
    }

    #[test]
    fn test_square() {
        let pts = [DVec2::ZERO, DVec2::X, DVec2::ONE, DVec2::Y];
        let tris = triangulate(&pts).unwrap();
        assert_eq!(tris.len(), 2);
        assert_relative_eq!(total_area(&pts, &tris), 1.0);
    }

    #[test]
    fn test_concave_outline() {
        // U shape opening upward
        let pts = [
            DVec2::new(0.0, 0.0),
            DVec2::new(3.0, 0.0),
            DVec2::new(3.0, 3.0),
            DVec2::new(2.0, 3.0),
            DVec2::new(2.0, 1.0),
            DVec2::new(1.0, 1.0),
            DVec2::new(1.0, 3.0),
            DVec2::new(0.0, 3.0),
        ];
        let tris = triangulate(&pts).unwrap();
        assert_eq!(tris.len(), 6);
        assert_relative_eq!(total_area(&pts, &tris), 7.0, epsilon = 1e-12);
        for t in &tris {
            assert!(signed_area(&[pts[t[0]], pts[t[1]], pts[t[2]]]) >= -1e-12);
        }
    }

    #[test]
    fn test_collinear_point_is_kept() {
        let pts = [DVec2::ZERO, DVec2::new(1.0, 0.0), DVec2::new(2.0, 0.0), DVec2::new(1.0, 1.0)];
        let tris = triangulate(&pts).unwrap();
        assert_eq!(tris.len(), 2);
        assert_relative_eq!(total_area(&pts, &tris), 1.0, epsilon = 1e-12);
    }
}
