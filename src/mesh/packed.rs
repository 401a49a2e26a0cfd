//! Two-byte quantised unit normals.
//!
//! A normal is encoded as a pair of bytes `(u, v)` on a longitude/latitude
//! grid: `u` is the azimuth `atan2(y, x)` over `[0, 2π)` and `v` the polar
//! angle `acos(z)` over `[0, π]`, both scaled to [`PACK_SIZE`] steps. All
//! normals at a pole share `u == 0`. The pair `(255, 255)` is reserved for
//! [`PackedNormal::MIXED`], which no real direction quantises to.

use std::f64::consts::{PI, TAU};
use std::fmt;

use nalgebra::Vector3;

/// Number of quantisation steps per axis.
pub const PACK_SIZE: u8 = 252;

/// A unit normal quantised into two bytes.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PackedNormal {
    u: u8,
    v: u8,
}

impl PackedNormal {
    /// Sentinel for triangles whose corners disagree or that have no usable normal.
    pub const MIXED: PackedNormal = PackedNormal { u: 255, v: 255 };

    /// Quantise a direction. Zero-length or non-finite input yields [`Self::MIXED`].
    pub fn new(normal: &Vector3<f64>) -> Self {
        let Some(n) = normal.try_normalize(f64::EPSILON) else {
            return Self::MIXED;
        };
        if !(n.x.is_finite() && n.y.is_finite() && n.z.is_finite()) {
            return Self::MIXED;
        }

        let steps = PACK_SIZE as f64;
        let mut lon = n.y.atan2(n.x);
        if lon < 0.0 {
            lon += TAU;
        }
        let lat = n.z.clamp(-1.0, 1.0).acos();

        let mut u = (lon / TAU * steps).round() as u8;
        let v = (lat / PI * steps).round() as u8;
        if u == PACK_SIZE {
            u = 0;
        }
        if v == 0 || v == PACK_SIZE {
            u = 0;
        }
        Self { u, v }
    }

    /// Quantise an optional normal; `None` maps to [`Self::MIXED`].
    pub fn from_option(normal: Option<&Vector3<f64>>) -> Self {
        normal.map_or(Self::MIXED, Self::new)
    }

    /// Build from raw bytes.
    pub const fn from_bytes(u: u8, v: u8) -> Self {
        Self { u, v }
    }

    /// Azimuth byte.
    #[inline]
    pub fn u(self) -> u8 {
        self.u
    }

    /// Polar byte.
    #[inline]
    pub fn v(self) -> u8 {
        self.v
    }

    /// Whether this is the mixed/unusable sentinel.
    #[inline]
    pub fn is_mixed(self) -> bool {
        self == Self::MIXED
    }

    /// Pack into a single `u16` key, `u` in the high byte.
    #[inline]
    pub fn to_u16(self) -> u16 {
        ((self.u as u16) << 8) | self.v as u16
    }

    /// Inverse of [`to_u16`](Self::to_u16).
    #[inline]
    pub fn from_u16(packed: u16) -> Self {
        Self {
            u: (packed >> 8) as u8,
            v: packed as u8,
        }
    }

    /// Decode to the unit vector at the cell centre; `None` for the sentinel
    /// and for bytes outside the encoding range.
    pub fn to_vector(self) -> Option<Vector3<f64>> {
        if self.u >= PACK_SIZE || self.v > PACK_SIZE {
            return None;
        }
        let steps = PACK_SIZE as f64;
        let lon = self.u as f64 / steps * TAU;
        let lat = self.v as f64 / steps * PI;
        Some(Vector3::new(
            lat.sin() * lon.cos(),
            lat.sin() * lon.sin(),
            lat.cos(),
        ))
    }
}

impl fmt::Debug for PackedNormal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_mixed() {
            write!(f, "PackedNormal(MIXED)")
        } else {
            write!(f, "PackedNormal({}, {})", self.u, self.v)
        }
    }
}
