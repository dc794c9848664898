//! Photon records

use core::geometry::*;
use core::kd_tree::KdTreePoint;
use core::pbrt::*;
use core::spectrum::Spectrum;

/// Cosine of the widest angle two surface normals may subtend and still be
/// treated as the same surface orientation during photon lookups (30 degrees).
pub const MAX_NORMAL_DEVIATION_COS: Float = 0.87;

/// Sine of the same angle; bounds how far a photon may sit off a lookup
/// point's tangent plane.
pub const MAX_NORMAL_DEVIATION_SIN: Float = 0.493;

/// Photon categories, by bounce history.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PhotonCategory {
    /// Deposited at the first intersection of a path, on a surface with a
    /// non-specular scattering component.
    Direct = 0,

    /// Deposited after one or more purely specular bounces, on a surface
    /// with a non-specular scattering component.
    Caustic = 1,

    /// Everything else, including first-bounce photons on purely specular
    /// surfaces; these seed final gathering and irradiance estimation.
    Indirect = 2,
}

impl PhotonCategory {
    /// All categories in storage order.
    pub const ALL: [PhotonCategory; 3] = [
        PhotonCategory::Direct,
        PhotonCategory::Caustic,
        PhotonCategory::Indirect,
    ];
}

/// A stored photon: power arriving at a surface point from a direction.
#[derive(Copy, Clone)]
pub struct Photon {
    /// The surface point.
    pub p: Point3f,

    /// The carried power.
    pub weight: Spectrum,

    /// Direction the photon arrived from (pointing away from the surface).
    pub wi: CompressedDirection,

    /// Geometric surface normal at the point.
    pub n: CompressedDirection,
}

impl Photon {
    /// Create a new `Photon`.
    ///
    /// * `p`      - The surface point.
    /// * `weight` - The carried power.
    /// * `wi`     - Direction the photon arrived from.
    /// * `n`      - Geometric surface normal at the point.
    pub fn new(p: Point3f, weight: Spectrum, wi: CompressedDirection, n: CompressedDirection) -> Self {
        Self { p, weight, wi, n }
    }
}

impl KdTreePoint for Photon {
    fn position(&self) -> Point3f {
        self.p
    }
}

/// A precomputed irradiance estimate at a surface point, holding both sides
/// of the surface so gather rays arriving from either side can terminate
/// here.
#[derive(Copy, Clone)]
pub struct IrradiancePhoton {
    /// The surface point.
    pub p: Point3f,

    /// Irradiance arriving on the side the normal points towards.
    pub front: Spectrum,

    /// Irradiance arriving on the opposite side.
    pub back: Spectrum,

    /// Surface normal at the point.
    pub n: CompressedDirection,
}

impl IrradiancePhoton {
    /// Create a new `IrradiancePhoton` with no irradiance estimated yet.
    ///
    /// * `p` - The surface point.
    /// * `n` - Surface normal at the point.
    pub fn new(p: Point3f, n: CompressedDirection) -> Self {
        Self {
            p,
            front: Spectrum::ZERO,
            back: Spectrum::ZERO,
            n,
        }
    }
}

impl KdTreePoint for IrradiancePhoton {
    fn position(&self) -> Point3f {
        self.p
    }
}

/// Returns true when a photon at `p_photon` with surface normal `n_photon`
/// belongs to the same surface orientation as a lookup at `p` with normal
/// `n`: the normals subtend at most 30 degrees and the photon sits close to
/// the lookup point's tangent plane.
///
/// * `p_photon` - The photon's position.
/// * `n_photon` - The photon's surface normal.
/// * `p`        - The lookup position.
/// * `n`        - The lookup surface normal.
pub fn compatible_normal(p_photon: &Point3f, n_photon: &Vector3f, p: &Point3f, n: &Vector3f) -> bool {
    if n_photon.dot(n) < MAX_NORMAL_DEVIATION_COS {
        return false;
    }
    in_tangent_plane(p_photon, p, n)
}

/// The two-sided variant of [`compatible_normal`]: accepts photons whose
/// normal points either way along the lookup normal. Used for irradiance
/// photons, which store estimates for both sides of their surface.
///
/// * `p_photon` - The photon's position.
/// * `n_photon` - The photon's surface normal.
/// * `p`        - The lookup position.
/// * `n`        - The lookup surface normal.
pub fn compatible_plane(p_photon: &Point3f, n_photon: &Vector3f, p: &Point3f, n: &Vector3f) -> bool {
    if abs(n_photon.dot(n)) < MAX_NORMAL_DEVIATION_COS {
        return false;
    }
    in_tangent_plane(p_photon, p, n)
}

/// Plane half of the compatibility test: the photon must lie within the
/// 30 degree cone of the lookup point's tangent plane.
fn in_tangent_plane(p_photon: &Point3f, p: &Point3f, n: &Vector3f) -> bool {
    let d = *p_photon - *p;
    let dist_sq = d.length_squared();
    if dist_sq == 0.0 {
        return true;
    }
    abs(d.dot(n)) < MAX_NORMAL_DEVIATION_SIN * dist_sq.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normals_beyond_the_cone_are_rejected() {
        let p = Point3f::ZERO;
        let n = Vector3f::new(0.0, 0.0, 1.0);
        let tilted = Vector3f::new(0.6, 0.0, 0.8);
        assert!(compatible_normal(&p, &n, &p, &n));
        assert!(!compatible_normal(&p, &tilted, &p, &n));
        // A 10 degree tilt stays well inside the 30 degree cone.
        let slight = Vector3f::new(0.1736, 0.0, 0.9848);
        assert!(compatible_normal(&p, &slight, &p, &n));
    }

    #[test]
    fn photons_off_the_tangent_plane_are_rejected() {
        let n = Vector3f::new(0.0, 0.0, 1.0);
        let p = Point3f::ZERO;
        // In-plane photon passes, one straight above the plane fails.
        assert!(compatible_normal(&Point3f::new(0.5, 0.0, 0.0), &n, &p, &n));
        assert!(!compatible_normal(&Point3f::new(0.0, 0.0, 0.5), &n, &p, &n));
    }

    #[test]
    fn two_sided_test_accepts_opposed_normals() {
        let p = Point3f::ZERO;
        let n = Vector3f::new(0.0, 0.0, 1.0);
        let flipped = Vector3f::new(0.0, 0.0, -1.0);
        assert!(!compatible_normal(&p, &flipped, &p, &n));
        assert!(compatible_plane(&p, &flipped, &p, &n));
    }
}
