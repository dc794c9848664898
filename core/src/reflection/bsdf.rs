//! BSDF

use super::*;
use crate::geometry::*;
use crate::pbrt::*;
use crate::spectrum::*;

/// Collection of BRDFs and BTDFs at a surface point, with the shading
/// coordinate frame used to evaluate them. The component BxDFs live in a
/// chunk-scoped arena; the BSDF only borrows them.
pub struct BSDF<'arena> {
    /// Relative index of refraction over the boundary.
    pub eta: Float,

    /// Shading normal.
    ns: Normal3f,

    /// Geometric normal.
    ng: Normal3f,

    /// Primary tangent.
    ss: Vector3f,

    /// Secondary tangent.
    ts: Vector3f,

    /// The component reflection models.
    bxdfs: Vec<&'arena BxDF>,
}

impl<'arena> BSDF<'arena> {
    /// Create a new `BSDF` with no components.
    ///
    /// * `ng`  - Geometric normal.
    /// * `ns`  - Shading normal.
    /// * `eta` - Relative index of refraction over the boundary.
    pub fn new(ng: Normal3f, ns: Normal3f, eta: Float) -> Self {
        let ns = ns.normalize();
        let (ss, ts) = coordinate_system(&Vector3f::from(ns));
        Self {
            eta,
            ns,
            ng,
            ss,
            ts,
            bxdfs: Vec::with_capacity(2),
        }
    }

    /// Adds a component reflection model.
    ///
    /// * `bxdf` - The arena-allocated component.
    pub fn add(&mut self, bxdf: &'arena BxDF) {
        self.bxdfs.push(bxdf);
    }

    /// Returns the number of components matching the given flags.
    ///
    /// * `flags` - The reflection models to match.
    pub fn num_components(&self, flags: BxDFType) -> usize {
        self.bxdfs.iter().filter(|b| b.matches_flags(flags)).count()
    }

    /// Returns the shading normal.
    pub fn shading_normal(&self) -> Normal3f {
        self.ns
    }

    /// Transforms a direction from world space to the shading space.
    ///
    /// * `v` - The direction.
    pub fn world_to_local(&self, v: &Vector3f) -> Vector3f {
        Vector3f::new(v.dot(&self.ss), v.dot(&self.ts), v.dot(&self.ns))
    }

    /// Transforms a direction from the shading space to world space.
    ///
    /// * `v` - The direction.
    pub fn local_to_world(&self, v: &Vector3f) -> Vector3f {
        Vector3f::new(
            self.ss.x * v.x + self.ts.x * v.y + self.ns.x * v.z,
            self.ss.y * v.x + self.ts.y * v.y + self.ns.y * v.z,
            self.ss.z * v.x + self.ts.z * v.y + self.ns.z * v.z,
        )
    }

    /// Returns the value of the distribution function for the given pair of
    /// world-space directions.
    ///
    /// * `wo_w`  - Outgoing direction.
    /// * `wi_w`  - Incident direction.
    /// * `flags` - The reflection models to evaluate.
    pub fn f(&self, wo_w: &Vector3f, wi_w: &Vector3f, flags: BxDFType) -> Spectrum {
        let wo = self.world_to_local(wo_w);
        if wo.z == 0.0 {
            return Spectrum::ZERO;
        }
        let wi = self.world_to_local(wi_w);

        // The geometric normal decides whether a direction pair reflects or
        // transmits; shading normals would leak light.
        let reflect = wi_w.dot(&self.ng) * wo_w.dot(&self.ng) > 0.0;

        let mut f = Spectrum::ZERO;
        for bxdf in self.bxdfs.iter() {
            let t = bxdf.get_type();
            if bxdf.matches_flags(flags)
                && ((reflect && t.matches(BSDF_REFLECTION)) || (!reflect && t.matches(BSDF_TRANSMISSION)))
            {
                f += bxdf.f(&wo, &wi);
            }
        }
        f
    }

    /// Samples an incident direction, choosing uniformly among the matching
    /// components and remapping the sample.
    ///
    /// * `wo_w`  - World-space outgoing direction.
    /// * `u`     - The 2D uniform random values.
    /// * `flags` - The reflection models to sample.
    pub fn sample_f(&self, wo_w: &Vector3f, u: &Point2f, flags: BxDFType) -> BxDFSample {
        // Choose which BxDF to sample.
        let matching = self.num_components(flags);
        if matching == 0 {
            return BxDFSample::from(BxDFType::from(BSDF_NONE));
        }
        let comp = min((u[0] * matching as Float) as usize, matching - 1);
        let bxdf = match self.bxdfs.iter().filter(|b| b.matches_flags(flags)).nth(comp) {
            Some(b) => *b,
            None => return BxDFSample::from(BxDFType::from(BSDF_NONE)),
        };

        // Remap the sample to [0, 1)^2.
        let u_remapped = Point2f::new(
            min(u[0] * matching as Float - comp as Float, crate::rng::ONE_MINUS_EPSILON),
            u[1],
        );

        // Sample the chosen BxDF.
        let wo = self.world_to_local(wo_w);
        if wo.z == 0.0 {
            return BxDFSample::from(bxdf.get_type());
        }
        let sample = bxdf.sample_f(&wo, &u_remapped);
        if sample.pdf == 0.0 {
            return BxDFSample::from(sample.bxdf_type);
        }
        let wi = sample.wi;
        let wi_w = self.local_to_world(&wi);

        // Compute the overall PDF with the other matching BxDFs.
        let mut pdf = sample.pdf;
        let is_specular = bxdf.get_type().matches(BSDF_SPECULAR);
        if !is_specular && matching > 1 {
            for other in self.bxdfs.iter() {
                if !std::ptr::eq(*other, bxdf) && other.matches_flags(flags) {
                    pdf += other.pdf(&wo, &wi);
                }
            }
        }
        if matching > 1 {
            pdf /= matching as Float;
        }

        // Compute the value of the BSDF for the sampled direction.
        let f = if !is_specular {
            self.f(wo_w, &wi_w, flags)
        } else {
            sample.f
        };

        BxDFSample::new(f, pdf, wi_w, sample.bxdf_type)
    }

    /// Evaluates the PDF for sampling the given pair of world-space
    /// directions.
    ///
    /// * `wo_w`  - Outgoing direction.
    /// * `wi_w`  - Incident direction.
    /// * `flags` - The reflection models to evaluate.
    pub fn pdf(&self, wo_w: &Vector3f, wi_w: &Vector3f, flags: BxDFType) -> Float {
        if self.bxdfs.is_empty() {
            return 0.0;
        }
        let wo = self.world_to_local(wo_w);
        if wo.z == 0.0 {
            return 0.0;
        }
        let wi = self.world_to_local(wi_w);

        let mut pdf = 0.0;
        let mut matching = 0;
        for bxdf in self.bxdfs.iter() {
            if bxdf.matches_flags(flags) {
                matching += 1;
                pdf += bxdf.pdf(&wo, &wi);
            }
        }
        if matching > 0 {
            pdf / matching as Float
        } else {
            0.0
        }
    }

    /// Computes the hemispherical-directional reflectance function ρ over
    /// the matching components.
    ///
    /// * `wo_w`  - World-space outgoing direction.
    /// * `flags` - The reflection models to include.
    pub fn rho_hd(&self, wo_w: &Vector3f, flags: BxDFType) -> Spectrum {
        let wo = self.world_to_local(wo_w);
        self.bxdfs
            .iter()
            .filter(|b| b.matches_flags(flags))
            .map(|b| b.rho_hd(&wo))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bumpalo::Bump;

    fn diffuse_bsdf(arena: &Bump) -> BSDF<'_> {
        let n = Normal3f::new(0.0, 0.0, 1.0);
        let mut bsdf = BSDF::new(n, n, 1.0);
        bsdf.add(arena.alloc(BxDF::LambertianReflection(LambertianReflection::new(Spectrum::new(0.5)))));
        bsdf
    }

    #[test]
    fn lambertian_f_is_reflectance_over_pi() {
        let arena = Bump::new();
        let bsdf = diffuse_bsdf(&arena);
        let wo = Vector3f::new(0.0, 0.0, 1.0);
        let wi = Vector3f::new(0.5, 0.0, 0.5).normalize();
        let f = bsdf.f(&wo, &wi, BxDFType::from(BSDF_ALL));
        assert_eq!(f, Spectrum::new(0.5) * INV_PI);
    }

    #[test]
    fn sample_f_stays_in_upper_hemisphere_for_reflection() {
        let arena = Bump::new();
        let bsdf = diffuse_bsdf(&arena);
        let wo = Vector3f::new(0.3, 0.2, 0.8).normalize();
        let sample = bsdf.sample_f(&wo, &Point2f::new(0.3, 0.7), BxDFType::from(BSDF_ALL));
        assert!(sample.pdf > 0.0);
        assert!(sample.wi.dot(&Normal3f::new(0.0, 0.0, 1.0)) > 0.0);
    }

    #[test]
    fn specular_component_samples_mirror_direction() {
        let arena = Bump::new();
        let n = Normal3f::new(0.0, 0.0, 1.0);
        let mut bsdf = BSDF::new(n, n, 1.0);
        bsdf.add(arena.alloc(BxDF::SpecularReflection(SpecularReflection::new(
            Spectrum::new(1.0),
            Fresnel::NoOp,
        ))));

        let wo = Vector3f::new(0.5, 0.0, 0.5).normalize();
        let sample = bsdf.sample_f(&wo, &Point2f::new(0.5, 0.5), BxDFType::from(BSDF_ALL));
        assert_eq!(sample.pdf, 1.0);
        let expected = Vector3f::new(-wo.x, -wo.y, wo.z);
        assert!((sample.wi - expected).length() < 1e-5);
        assert!(sample.bxdf_type.matches(BSDF_SPECULAR));
    }

    #[test]
    fn num_components_filters_by_flags() {
        let arena = Bump::new();
        let n = Normal3f::new(0.0, 0.0, 1.0);
        let mut bsdf = BSDF::new(n, n, 1.5);
        bsdf.add(arena.alloc(BxDF::LambertianReflection(LambertianReflection::new(Spectrum::new(0.5)))));
        bsdf.add(arena.alloc(BxDF::SpecularReflection(SpecularReflection::new(
            Spectrum::new(1.0),
            Fresnel::NoOp,
        ))));

        assert_eq!(bsdf.num_components(BxDFType::from(BSDF_ALL)), 2);
        assert_eq!(bsdf.num_components(BxDFType::from(BSDF_ALL & !BSDF_SPECULAR)), 1);
        assert_eq!(bsdf.num_components(BxDFType::from(BSDF_SPECULAR | BSDF_REFLECTION)), 1);
    }
}
