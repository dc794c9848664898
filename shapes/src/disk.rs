//! Disks

use core::geometry::*;
use core::pbrt::*;
use core::sampling::concentric_sample_disk;

/// A flat circular disk, defined in world space by its center, unit normal
/// and radius.
#[derive(Clone)]
pub struct Disk {
    /// Center of the disk.
    center: Point3f,

    /// Unit normal of the disk's plane.
    normal: Normal3f,

    /// Radius of the disk.
    radius: Float,

    /// Tangent frame spanning the disk's plane.
    ss: Vector3f,
    ts: Vector3f,
}

impl Disk {
    /// Create a new `Disk`.
    ///
    /// * `center` - Center of the disk.
    /// * `normal` - Normal of the disk's plane; normalized here.
    /// * `radius` - Radius of the disk.
    pub fn new(center: Point3f, normal: Normal3f, radius: Float) -> Self {
        let normal = normal.normalize();
        let (ss, ts) = coordinate_system(&Vector3f::from(normal));
        Self { center, normal, radius, ss, ts }
    }
}

impl Shape for Disk {
    /// Returns a bounding box in world space.
    fn world_bound(&self) -> Bounds3f {
        let r = Vector3f::new(self.radius, self.radius, self.radius);
        Bounds3f::new(self.center - r, self.center + r)
    }

    /// Returns geometric details if the ray intersects the disk.
    ///
    /// * `ray` - The ray.
    fn intersect(&self, ray: &Ray) -> Option<ShapeHit> {
        let denom = ray.d.dot(&self.normal);
        if denom == 0.0 {
            return None;
        }

        let t = (self.center - ray.o).dot(&self.normal) / denom;
        if t <= 0.0 || t >= ray.t_max {
            return None;
        }

        let p = ray.at(t);
        if p.distance_squared(&self.center) > self.radius * self.radius {
            return None;
        }

        Some(ShapeHit { t, p, n: self.normal })
    }

    /// Returns the surface area of the disk.
    fn area(&self) -> Float {
        PI * self.radius * self.radius
    }

    /// Samples a point on the disk, uniform over area.
    ///
    /// * `u` - Uniform random sample in `[0, 1)^2`.
    fn sample_area(&self, u: &Point2f) -> (Point3f, Normal3f) {
        let d = concentric_sample_disk(u);
        let p = self.center + (d.x * self.ss + d.y * self.ts) * self.radius;
        (p, self.normal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_disk() -> Disk {
        Disk::new(Point3f::ZERO, Normal3f::new(0.0, 0.0, 1.0), 1.0)
    }

    #[test]
    fn ray_hits_disk_inside_radius() {
        let disk = unit_disk();
        let ray = Ray::new(Point3f::new(0.5, 0.0, 2.0), Vector3f::new(0.0, 0.0, -1.0), INFINITY);
        let sh = disk.intersect(&ray).unwrap();
        assert_eq!(sh.t, 2.0);
        assert_eq!(sh.p, Point3f::new(0.5, 0.0, 0.0));
    }

    #[test]
    fn ray_misses_disk_outside_radius() {
        let disk = unit_disk();
        let ray = Ray::new(Point3f::new(1.5, 0.0, 2.0), Vector3f::new(0.0, 0.0, -1.0), INFINITY);
        assert!(disk.intersect(&ray).is_none());
    }

    #[test]
    fn parallel_ray_misses() {
        let disk = unit_disk();
        let ray = Ray::new(Point3f::new(-2.0, 0.0, 0.5), Vector3f::new(1.0, 0.0, 0.0), INFINITY);
        assert!(disk.intersect(&ray).is_none());
    }

    #[test]
    fn sampled_points_lie_on_disk() {
        let disk = Disk::new(Point3f::new(1.0, 2.0, 3.0), Normal3f::new(0.0, 1.0, 0.0), 2.0);
        for i in 0..10 {
            for j in 0..10 {
                let u = Point2f::new((i as Float + 0.5) / 10.0, (j as Float + 0.5) / 10.0);
                let (p, n) = disk.sample_area(&u);
                assert_eq!(n, Normal3f::new(0.0, 1.0, 0.0));
                assert!((p.y - 2.0).abs() < 1e-5);
                assert!(p.distance(&Point3f::new(1.0, 2.0, 3.0)) <= 2.0 + 1e-5);
            }
        }
    }
}
