//! Procedural triangle soups.
//!
//! Stand-ins for tessellator output. Every shape is returned unwelded, one
//! [`SoupTriangle`] per triangle, so shared corners appear several times and
//! exercise the vertex store. Closed shapes are wound outward.

use std::f64::consts::{PI, TAU};

use nalgebra::Point3;

use crate::batch::SoupTriangle;

/// Regular tetrahedron inscribed in the cube `[-1, 1]^3`, one face id per side.
pub fn tetrahedron() -> Vec<SoupTriangle> {
    let a = Point3::new(1.0, 1.0, 1.0);
    let b = Point3::new(1.0, -1.0, -1.0);
    let c = Point3::new(-1.0, 1.0, -1.0);
    let d = Point3::new(-1.0, -1.0, 1.0);
    vec![
        SoupTriangle::new(a, b, c, 0),
        SoupTriangle::new(a, d, b, 1),
        SoupTriangle::new(b, d, c, 2),
        SoupTriangle::new(c, d, a, 3),
    ]
}

/// Axis-aligned cube of edge length `size` centred on the origin.
///
/// Two triangles per side; sides get face ids `0..6` in the order
/// -x, +x, -y, +y, -z, +z.
pub fn cube(size: f64) -> Vec<SoupTriangle> {
    let h = size / 2.0;
    // corner i has +x when bit 0 is set, +y for bit 1, +z for bit 2
    let corner = |i: usize| {
        Point3::new(
            if i & 1 != 0 { h } else { -h },
            if i & 2 != 0 { h } else { -h },
            if i & 4 != 0 { h } else { -h },
        )
    };
    let sides: [[usize; 4]; 6] = [
        [0, 4, 6, 2],
        [1, 3, 7, 5],
        [0, 1, 5, 4],
        [2, 6, 7, 3],
        [0, 2, 3, 1],
        [4, 5, 7, 6],
    ];

    let mut soup = Vec::with_capacity(12);
    for (face_id, [a, b, c, d]) in sides.into_iter().enumerate() {
        let face_id = face_id as i32;
        soup.push(SoupTriangle::new(corner(a), corner(b), corner(c), face_id));
        soup.push(SoupTriangle::new(corner(a), corner(c), corner(d), face_id));
    }
    soup
}

/// Upper half of a sphere of `radius` centred on the origin, open at the equator.
///
/// `segments` divisions around the z axis (at least 3) and `rings` from pole
/// to equator (at least 1). All triangles share face id 0.
pub fn uv_hemisphere(radius: f64, segments: usize, rings: usize) -> Vec<SoupTriangle> {
    let segments = segments.max(3);
    let rings = rings.max(1);
    let point = |ring: usize, segment: usize| {
        let theta = ring as f64 / rings as f64 * PI / 2.0;
        let phi = (segment % segments) as f64 / segments as f64 * TAU;
        Point3::new(
            radius * theta.sin() * phi.cos(),
            radius * theta.sin() * phi.sin(),
            radius * theta.cos(),
        )
    };

    let pole = Point3::new(0.0, 0.0, radius);
    let mut soup = Vec::with_capacity(segments * (2 * rings - 1));
    for j in 0..segments {
        soup.push(SoupTriangle::new(pole, point(1, j), point(1, j + 1), 0));
    }
    for i in 1..rings {
        for j in 0..segments {
            let a = point(i, j);
            let b = point(i, j + 1);
            let c = point(i + 1, j + 1);
            let d = point(i + 1, j);
            soup.push(SoupTriangle::new(a, d, c, 0));
            soup.push(SoupTriangle::new(a, c, b, 0));
        }
    }
    soup
}

/// Flat `n` by `n` grid of unit quads in the z = 0 plane, facing +z.
pub fn grid(n: usize) -> Vec<SoupTriangle> {
    let p = |x: usize, y: usize| Point3::new(x as f64, y as f64, 0.0);
    let mut soup = Vec::with_capacity(2 * n * n);
    for y in 0..n {
        for x in 0..n {
            soup.push(SoupTriangle::new(p(x, y), p(x + 1, y), p(x + 1, y + 1), 0));
            soup.push(SoupTriangle::new(p(x, y), p(x + 1, y + 1), p(x, y + 1), 0));
        }
    }
    soup
}

/// A Möbius strip of `segments` quads (at least 4).
///
/// The strip is non-orientable, so unification always runs into at least one
/// conflicting edge.
pub fn mobius_strip(segments: usize) -> Vec<SoupTriangle> {
    const RADIUS: f64 = 2.0;
    const HALF_WIDTH: f64 = 0.25;

    let segments = segments.max(4);
    let point = |i: usize, s: f64| {
        let u = i as f64 / segments as f64 * TAU;
        let r = RADIUS + s * (u / 2.0).cos();
        Point3::new(r * u.cos(), r * u.sin(), s * (u / 2.0).sin())
    };

    let mut soup = Vec::with_capacity(2 * segments);
    for i in 0..segments {
        let bottom = point(i, -HALF_WIDTH);
        let top = point(i, HALF_WIDTH);
        // the last column joins the first with its sides swapped
        let (next_bottom, next_top) = if i + 1 == segments {
            (point(0, HALF_WIDTH), point(0, -HALF_WIDTH))
        } else {
            (point(i + 1, -HALF_WIDTH), point(i + 1, HALF_WIDTH))
        };
        soup.push(SoupTriangle::new(bottom, next_bottom, next_top, 0));
        soup.push(SoupTriangle::new(bottom, next_top, top, 0));
    }
    soup
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normal(t: &SoupTriangle) -> nalgebra::Vector3<f64> {
        let [a, b, c] = t.points;
        (b - a).cross(&(c - a))
    }

    fn centre(t: &SoupTriangle) -> nalgebra::Vector3<f64> {
        let [a, b, c] = t.points;
        (a.coords + b.coords + c.coords) / 3.0
    }

    #[test]
    fn test_closed_shapes_face_outward() {
        for soup in [tetrahedron(), cube(2.0)] {
            for t in &soup {
                assert!(normal(t).dot(&centre(t)) > 0.0, "{:?}", t);
            }
        }
    }

    #[test]
    fn test_hemisphere_faces_outward() {
        let soup = uv_hemisphere(1.0, 12, 4);
        assert_eq!(soup.len(), 12 * 7);
        for t in &soup {
            assert!(normal(t).dot(&centre(t)) > 0.0);
        }
    }

    #[test]
    fn test_counts() {
        assert_eq!(tetrahedron().len(), 4);
        assert_eq!(cube(1.0).len(), 12);
        assert_eq!(grid(3).len(), 18);
        assert_eq!(mobius_strip(2).len(), 8);
        assert!(grid(0).is_empty());
    }
}
