//! Photon Mapping Integrator

use bumpalo::Bump;
use core::geometry::*;
use core::integrator::uniform_sample_one_light;
use core::interaction::SurfaceInteraction;
use core::light_distrib::PowerLightDistribution;
use core::material::TransportMode;
use core::pbrt::*;
use core::reflection::*;
use core::rng::RNG;
use core::sampling::*;
use core::scene::Scene;
use core::spectrum::Spectrum;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;
use std::time::Instant;

mod irradiance;
mod maps;
mod photon;
mod pipeline;

// Re-export.
pub use maps::{PhotonMap, PhotonMaps, MAX_PHOTONS_IN_MAP};
pub use photon::*;
pub use pipeline::{MAX_PIPELINE_TOKENS, PATHS_PER_CHUNK};

use irradiance::{build_irradiance_map, IrradianceMap};

/// Hard upper bound on the specular recursion depth.
const MAX_SPECULAR_DEPTH: usize = 50;

/// Number of indirect photons guiding the photon-sampling gather strategy.
const GATHER_GUIDE_PHOTONS: usize = 32;

/// Cosine of the half-angle of the gather sampling cone (10 degrees).
const COS_GATHER_ANGLE: Float = 0.9848;

/// Configuration for `PhotonMapper`.
#[derive(Copy, Clone, Debug)]
pub struct PhotonMapperParams {
    /// Light samples per direct-lighting estimate.
    pub direct_light_samples: usize,

    /// Photons gathered per caustic estimate.
    pub caustic_lookup_photons: usize,

    /// Maximum caustic lookup distance; non-positive means unbounded.
    pub max_caustic_lookup_dist: Float,

    /// Final gather rays per shading point, split evenly between the two
    /// sampling strategies.
    pub gather_samples: usize,

    /// Maximum depth of the specular recursion and of specular photon
    /// bounces.
    pub max_specular_depth: usize,

    /// Direct photon map quota.
    pub direct_photons: usize,

    /// Caustic photon map quota.
    pub caustic_photons: usize,

    /// Indirect photon map quota.
    pub indirect_photons: usize,

    /// Worker thread count; 0 picks the number of logical CPUs.
    pub n_threads: usize,

    /// Safety valve: hard bound on paths issued per shoot; 0 derives a
    /// default from the quotas and the requested path count.
    pub max_total_paths: usize,

    /// Photon paths per pipeline chunk; 0 picks the default.
    pub paths_per_chunk: usize,

    /// Chunks circulating through the pipeline; 0 picks the default.
    pub tokens: usize,

    /// Request lower priority for the shooting threads. There is no portable
    /// way to lower thread priority, so the hint is logged and ignored.
    pub low_priority: bool,
}

impl Default for PhotonMapperParams {
    fn default() -> Self {
        Self {
            direct_light_samples: 1,
            caustic_lookup_photons: 60,
            max_caustic_lookup_dist: 0.25,
            gather_samples: 16,
            max_specular_depth: 6,
            direct_photons: 100_000,
            caustic_photons: 100_000,
            indirect_photons: 100_000,
            n_threads: 0,
            max_total_paths: 0,
            paths_per_chunk: 0,
            tokens: 0,
            low_priority: false,
        }
    }
}

impl PhotonMapperParams {
    /// Returns the parameters with out-of-range values clamped, warning
    /// about every adjustment.
    pub fn validated(mut self) -> Self {
        if self.caustic_lookup_photons > u16::MAX as usize {
            warn!(
                "caustic_lookup_photons {} clamped to {}",
                self.caustic_lookup_photons,
                u16::MAX
            );
            self.caustic_lookup_photons = u16::MAX as usize;
        }
        if self.caustic_lookup_photons == 0 {
            warn!("caustic_lookup_photons is 0; caustic radiance will be black");
        }
        if self.max_caustic_lookup_dist <= 0.0 {
            warn!("non-positive max_caustic_lookup_dist; caustic lookups are unbounded");
            self.max_caustic_lookup_dist = INFINITY;
        }
        if self.gather_samples % 2 != 0 {
            warn!(
                "gather_samples {} rounded up to {} for an even strategy split",
                self.gather_samples,
                self.gather_samples + 1
            );
            self.gather_samples += 1;
        }
        if self.max_specular_depth > MAX_SPECULAR_DEPTH {
            warn!(
                "max_specular_depth {} clamped to {}",
                self.max_specular_depth, MAX_SPECULAR_DEPTH
            );
            self.max_specular_depth = MAX_SPECULAR_DEPTH;
        }
        if self.low_priority {
            info!("low priority shooting requested; not supported, ignoring");
        }
        self
    }

    /// Returns the effective worker thread count.
    pub fn threads(&self) -> usize {
        if self.n_threads == 0 {
            num_cpus::get()
        } else {
            self.n_threads
        }
    }

    /// Returns the effective pipeline token count.
    pub(super) fn tokens(&self) -> usize {
        if self.tokens == 0 {
            MAX_PIPELINE_TOKENS
        } else {
            self.tokens
        }
    }

    /// Returns the effective chunk size.
    pub(super) fn paths_per_chunk(&self) -> usize {
        if self.paths_per_chunk == 0 {
            PATHS_PER_CHUNK
        } else {
            self.paths_per_chunk
        }
    }

    /// Returns the effective safety-valve path bound for a shoot of the
    /// given size.
    ///
    /// * `requested` - The requested photon path count.
    pub(super) fn max_total_paths(&self, requested: usize) -> usize {
        if self.max_total_paths > 0 {
            self.max_total_paths
        } else {
            let quota = self.direct_photons + self.caustic_photons + self.indirect_photons;
            20 * max(quota, requested)
        }
    }
}

/// State swapped in atomically when a shoot completes.
struct ShotData {
    /// The photon maps of the last completed shoot.
    maps: PhotonMaps,

    /// Power-proportional light distribution captured at shoot time.
    lights: Option<PowerLightDistribution>,
}

/// The photon mapping integrator: shoots photons from the lights into
/// per-category maps, then answers per-ray radiance queries by combining
/// direct lighting, a caustic density estimate, and final gathering over
/// precomputed irradiance.
pub struct PhotonMapper {
    /// Validated configuration.
    params: PhotonMapperParams,

    /// Results of the last completed shoot.
    shot: RwLock<ShotData>,

    /// True while a shoot is running.
    in_progress: AtomicBool,

    /// Cooperative cancellation flag for the running shoot.
    stop: AtomicBool,
}

impl PhotonMapper {
    /// Creates a new `PhotonMapper`.
    ///
    /// * `params` - The configuration; out-of-range values are clamped with
    ///              warnings.
    pub fn new(params: PhotonMapperParams) -> Self {
        Self {
            params: params.validated(),
            shot: RwLock::new(ShotData {
                maps: PhotonMaps::new([0, 0, 0]),
                lights: None,
            }),
            in_progress: AtomicBool::new(false),
            stop: AtomicBool::new(false),
        }
    }

    /// Returns true while a shoot is running.
    pub fn in_progress(&self) -> bool {
        self.in_progress.load(Ordering::Acquire)
    }

    /// Requests cancellation of the running shoot. Returns `true` when the
    /// request was accepted, `false` when no shoot is running or a stop was
    /// already requested. Dispatched work still completes, so the shoot ends
    /// within about one chunk of tracing.
    pub fn stop_shooting(&self) -> bool {
        if !self.in_progress() {
            warn!("no photon shooting in progress; stop request ignored");
            return false;
        }
        if self.stop.swap(true, Ordering::AcqRel) {
            warn!("photon shooting stop already requested");
            false
        } else {
            info!("photon shooting stop requested");
            true
        }
    }

    /// Shoots photon paths from the scene lights into fresh maps, builds the
    /// irradiance map, and swaps the results in. Blocks until the pipeline
    /// drains or a stop request takes effect. Earlier maps stay queryable
    /// until the swap.
    ///
    /// * `scene`      - The scene.
    /// * `path_count` - Number of photon paths to trace.
    pub fn shoot_photons(&self, scene: &Scene, path_count: usize) {
        if scene.lights.is_empty() {
            warn!("no lights in the scene; skipping photon shooting");
            return;
        }
        if path_count == 0 {
            warn!("photon path count is 0; skipping photon shooting");
            return;
        }
        if self.in_progress.swap(true, Ordering::AcqRel) {
            warn!("photon shooting already in progress");
            return;
        }
        self.stop.store(false, Ordering::Release);
        let start = Instant::now();

        let lights = PowerLightDistribution::new(&scene.lights);
        let mut maps = PhotonMaps::new([
            self.params.direct_photons,
            self.params.caustic_photons,
            self.params.indirect_photons,
        ]);

        let issued = pipeline::shoot(scene, &lights, &mut maps, &self.params, path_count, &self.stop);
        maps.build();
        for cat in PhotonCategory::ALL {
            debug!(
                "{:?} map: {} photons from {} paths",
                cat,
                maps.map(cat).len(),
                maps.paths(cat)
            );
        }

        if let Some(irradiance) = build_irradiance_map(&maps, scene.total_area(), self.params.threads()) {
            debug!("irradiance map: {} photons", irradiance.size());
            maps.set_irradiance(irradiance);
        }

        let data = ShotData {
            maps,
            lights: Some(lights),
        };
        match self.shot.write() {
            Ok(mut guard) => *guard = data,
            Err(poisoned) => *poisoned.into_inner() = data,
        }

        self.in_progress.store(false, Ordering::Release);
        info!(
            "photon shooting complete in {} ms ({} paths)",
            start.elapsed().as_millis(),
            issued
        );
    }

    /// Returns the number of distinct photons stored for a category by the
    /// last completed shoot.
    ///
    /// * `cat` - The category.
    pub fn photon_count(&self, cat: PhotonCategory) -> usize {
        self.read_shot(|shot| shot.maps.map(cat).len())
    }

    /// Returns the number of photon paths that contributed to a category in
    /// the last completed shoot.
    ///
    /// * `cat` - The category.
    pub fn photon_paths(&self, cat: PhotonCategory) -> usize {
        self.read_shot(|shot| shot.maps.paths(cat))
    }

    /// Computes the incident radiance along a camera ray.
    ///
    /// * `scene` - The scene.
    /// * `ray`   - The camera ray.
    /// * `rng`   - Random number generator.
    pub fn li(&self, scene: &Scene, ray: Ray, rng: &mut RNG) -> Spectrum {
        let arena = Bump::new();
        let mut ray = ray;
        self.read_shot(|shot| self.li_internal(scene, &mut ray, rng, &arena, shot, 0))
    }

    fn read_shot<R>(&self, f: impl FnOnce(&ShotData) -> R) -> R {
        match self.shot.read() {
            Ok(guard) => f(&guard),
            Err(poisoned) => f(&poisoned.into_inner()),
        }
    }

    fn li_internal<'arena>(
        &self,
        scene: &Scene,
        ray: &mut Ray,
        rng: &mut RNG,
        arena: &'arena Bump,
        shot: &ShotData,
        depth: usize,
    ) -> Spectrum {
        let mut si = match scene.intersect(ray) {
            Some(si) => si,
            None => return scene.infinite_lights.iter().map(|light| light.le(ray)).sum(),
        };
        let wo = si.hit.wo;
        let mut l = si.le(&wo);

        let material = si.primitive.as_ref().and_then(|p| p.get_material());
        let material = match material {
            Some(material) => material,
            None => {
                let mut passed = si.hit.spawn_ray(&ray.d);
                return l + self.li_internal(scene, &mut passed, rng, arena, shot, depth);
            }
        };
        material.compute_scattering_functions(arena, &mut si, TransportMode::Radiance);
        if si.bsdf.is_none() {
            let mut passed = si.hit.spawn_ray(&ray.d);
            return l + self.li_internal(scene, &mut passed, rng, arena, shot, depth);
        }

        let non_specular = si
            .bsdf
            .as_ref()
            .map(|b| b.num_components(BxDFType::from(BSDF_ALL & !BSDF_SPECULAR)) > 0)
            .unwrap_or(false);
        if non_specular {
            if let Some(lights) = shot.lights.as_ref() {
                let n = self.params.direct_light_samples;
                if n > 0 {
                    let mut ld = Spectrum::ZERO;
                    for _ in 0..n {
                        ld += uniform_sample_one_light(&si, scene, lights, rng);
                    }
                    l += ld / n as Float;
                }
            }
            l += self.caustic_radiance(&si, &wo, &shot.maps);
            l += self.final_gather(scene, &si, &wo, rng, arena, &shot.maps);
        }

        if depth < self.params.max_specular_depth {
            l += self.specular_bounce(scene, &si, rng, arena, shot, depth, BSDF_SPECULAR | BSDF_REFLECTION);
            l += self.specular_bounce(scene, &si, rng, arena, shot, depth, BSDF_SPECULAR | BSDF_TRANSMISSION);
        }
        l
    }

    /// Traces one perfectly specular bounce and recurses.
    #[allow(clippy::too_many_arguments)]
    fn specular_bounce<'arena>(
        &self,
        scene: &Scene,
        si: &SurfaceInteraction,
        rng: &mut RNG,
        arena: &'arena Bump,
        shot: &ShotData,
        depth: usize,
        flags: u8,
    ) -> Spectrum {
        let bsdf = match si.bsdf.as_ref() {
            Some(bsdf) => bsdf,
            None => return Spectrum::ZERO,
        };
        let u = Point2f::new(rng.uniform_float(), rng.uniform_float());
        let sample = bsdf.sample_f(&si.hit.wo, &u, BxDFType::from(flags));
        if sample.pdf == 0.0 || sample.f.is_black() {
            return Spectrum::ZERO;
        }
        let cos_theta = sample.wi.abs_dot(&si.shading.n);
        if cos_theta == 0.0 {
            return Spectrum::ZERO;
        }

        let mut ray = si.hit.spawn_ray(&sample.wi);
        let li = self.li_internal(scene, &mut ray, rng, arena, shot, depth + 1);
        sample.f * li * cos_theta / sample.pdf
    }

    /// Density estimate over the caustic map with a Simpson kernel.
    fn caustic_radiance(&self, si: &SurfaceInteraction, wo: &Vector3f, maps: &PhotonMaps) -> Spectrum {
        let k = self.params.caustic_lookup_photons;
        if k == 0 {
            return Spectrum::ZERO;
        }
        let paths = maps.paths(PhotonCategory::Caustic);
        let tree = match maps.map(PhotonCategory::Caustic).tree() {
            Some(tree) if paths > 0 => tree,
            _ => return Spectrum::ZERO,
        };
        let bsdf = match si.bsdf.as_ref() {
            Some(bsdf) => bsdf,
            None => return Spectrum::ZERO,
        };

        let n = Vector3f::from(si.hit.n);
        let max_dist_sq = self.params.max_caustic_lookup_dist * self.params.max_caustic_lookup_dist;
        let (found, r_sq) = tree.lookup(&si.hit.p, k, max_dist_sq, |ph| {
            compatible_normal(&ph.p, &ph.n.vector(), &si.hit.p, &n)
        });
        let n_found = found.len();
        if n_found == 0 {
            return Spectrum::ZERO;
        }

        // Small-sample disc correction only once the search shrank to the
        // farthest of k photons.
        let r_corr = if n_found == k {
            r_sq * n_found as Float / (n_found as Float - 0.5)
        } else {
            r_sq
        };

        let flags = BxDFType::from(BSDF_ALL & !BSDF_SPECULAR);
        let mut l = Spectrum::ZERO;
        for (i, d_sq) in found {
            let ph = tree.point(i);
            let f = bsdf.f(wo, &ph.wi.vector(), flags);
            l += simpson_kernel(d_sq, r_corr) * f * ph.weight;
        }
        l / (paths as Float * r_corr)
    }

    /// Final gathering: estimates indirect radiance by tracing gather rays
    /// sampled half from the BSDF and half from cones around nearby indirect
    /// photons, terminating each ray at the nearest irradiance photon.
    fn final_gather(
        &self,
        scene: &Scene,
        si: &SurfaceInteraction,
        wo: &Vector3f,
        rng: &mut RNG,
        arena: &Bump,
        maps: &PhotonMaps,
    ) -> Spectrum {
        let gather_samples = self.params.gather_samples;
        if gather_samples == 0 {
            return Spectrum::ZERO;
        }
        let irradiance = match maps.irradiance() {
            Some(map) if map.size() > 0 => map,
            _ => return Spectrum::ZERO,
        };
        let tree = match maps.map(PhotonCategory::Indirect).tree() {
            Some(tree) if tree.size() > 0 => tree,
            _ => return Spectrum::ZERO,
        };
        let bsdf = match si.bsdf.as_ref() {
            Some(bsdf) => bsdf,
            None => return Spectrum::ZERO,
        };

        // Directions of nearby indirect photons guide the second strategy.
        let (guides, _) = tree.lookup(&si.hit.p, GATHER_GUIDE_PHOTONS, INFINITY, |_| true);
        if guides.is_empty() {
            return Spectrum::ZERO;
        }
        let guide_dirs: Vec<Vector3f> = guides.iter().map(|&(i, _)| tree.point(i).wi.vector()).collect();

        let half = gather_samples / 2;
        let flags = BxDFType::from(BSDF_ALL & !BSDF_SPECULAR);
        let mut l = Spectrum::ZERO;

        // Strategy 1: sample the BSDF.
        for u in stratified_sample_2d(rng, half, 1, true) {
            let sample = bsdf.sample_f(wo, &u, flags);
            if sample.pdf == 0.0 || sample.f.is_black() {
                continue;
            }
            let photon_pdf = photon_cone_pdf(&guide_dirs, &sample.wi, None);
            let weight = power_heuristic(half as Int, sample.pdf, half as Int, photon_pdf);
            let f = sample.f * sample.wi.abs_dot(&si.shading.n);
            l += self.gather_ray_radiance(scene, si, &sample.wi, arena, irradiance) * f * weight / sample.pdf;
        }

        // Strategy 2: sample cones around the guide photons' incident
        // directions.
        for u in stratified_sample_2d(rng, half, 1, true) {
            let idx = rng.bounded_uniform_u32(0, guide_dirs.len() as u32) as usize;
            let axis = guide_dirs[idx];
            let (vx, vy) = coordinate_system(&axis);
            let wi = uniform_sample_cone_coordinate_system(&u, COS_GATHER_ANGLE, &vx, &vy, &axis);

            let photon_pdf = photon_cone_pdf(&guide_dirs, &wi, Some(idx));
            if photon_pdf == 0.0 {
                continue;
            }
            let f = bsdf.f(wo, &wi, flags) * wi.abs_dot(&si.shading.n);
            if f.is_black() {
                continue;
            }
            let bsdf_pdf = bsdf.pdf(wo, &wi, flags);
            let weight = power_heuristic(half as Int, photon_pdf, half as Int, bsdf_pdf);
            l += self.gather_ray_radiance(scene, si, &wi, arena, irradiance) * f * weight / photon_pdf;
        }

        l / gather_samples as Float
    }

    /// Radiance returned along a single gather ray: the nearest irradiance
    /// photon at the hit, weighted by the hit surface's hemispherical
    /// reflectances for the two sides.
    fn gather_ray_radiance(
        &self,
        scene: &Scene,
        si: &SurfaceInteraction,
        wi: &Vector3f,
        arena: &Bump,
        irradiance: &IrradianceMap,
    ) -> Spectrum {
        let mut ray = si.hit.spawn_ray(wi);
        let mut gsi = match scene.intersect(&mut ray) {
            Some(gsi) => gsi,
            None => return Spectrum::ZERO,
        };
        let material = match gsi.primitive.as_ref().and_then(|p| p.get_material()) {
            Some(material) => material,
            None => return Spectrum::ZERO,
        };
        material.compute_scattering_functions(arena, &mut gsi, TransportMode::Radiance);
        let bsdf = match gsi.bsdf.as_ref() {
            Some(bsdf) => bsdf,
            None => return Spectrum::ZERO,
        };

        let ns = Vector3f::from(bsdf.shading_normal());
        let ph = match irradiance.nearest(&gsi.hit.p, &ns) {
            Some(ph) => ph,
            None => return Spectrum::ZERO,
        };

        // Irradiance on the shading-normal side of the surface, accounting
        // for the stored photon's own orientation.
        let (e_front, e_back) = if ph.n.vector().dot(&ns) > 0.0 {
            (ph.front, ph.back)
        } else {
            (ph.back, ph.front)
        };
        // The viewer side reflects, the far side transmits through.
        let (e_view, e_far) = if gsi.hit.wo.dot(&ns) > 0.0 {
            (e_front, e_back)
        } else {
            (e_back, e_front)
        };

        let wo_g = gsi.hit.wo;
        let rho_reflect = bsdf.rho_hd(&wo_g, BxDFType::from(BSDF_ALL & !BSDF_SPECULAR & !BSDF_TRANSMISSION));
        let rho_transmit = bsdf.rho_hd(&wo_g, BxDFType::from(BSDF_ALL & !BSDF_SPECULAR & !BSDF_REFLECTION));
        (e_view * rho_reflect + e_far * rho_transmit) * INV_PI
    }
}

/// Simpson's kernel over a disc of squared radius `r_sq`.
///
/// * `d_sq` - Squared distance from the disc center.
/// * `r_sq` - Squared disc radius.
fn simpson_kernel(d_sq: Float, r_sq: Float) -> Float {
    let t = 1.0 - d_sq / r_sq;
    3.0 * INV_PI * t * t
}

/// Probability density of sampling direction `w` under the photon-guided
/// cone strategy: the average of the cone pdfs of every guide whose cone
/// contains `w`.
///
/// * `guides` - Incident directions of the guide photons.
/// * `w`      - The sampled direction.
/// * `forced` - Index of the guide `w` was sampled from, if any; its cone
///              counts even under numerical error at the cone boundary.
fn photon_cone_pdf(guides: &[Vector3f], w: &Vector3f, forced: Option<usize>) -> Float {
    let cone_pdf = uniform_cone_pdf(COS_GATHER_ANGLE);
    let mut sum = 0.0;
    for (i, dir) in guides.iter().enumerate() {
        if Some(i) == forced || dir.dot(w) > COS_GATHER_ANGLE {
            sum += cone_pdf;
        }
    }
    sum / guides.len() as Float
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::light::ArcLight;
    use core::material::MatteMaterial;
    use core::primitive::ArcPrimitive;
    use core::primitives::{GeometricPrimitive, PrimitiveList};
    use float_cmp::assert_approx_eq;
    use lights::DiffuseAreaLight;
    use proptest::prelude::*;
    use shapes::Quad;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    /// A large matte floor at z = 0 under a unit-area light at z = 2
    /// emitting downwards.
    fn floor_and_area_light(l_emit: Float) -> Scene {
        let floor = Quad::new(
            Point3f::new(-10.0, -10.0, 0.0),
            Vector3f::new(20.0, 0.0, 0.0),
            Vector3f::new(0.0, 20.0, 0.0),
        );
        let floor_prim =
            GeometricPrimitive::new(Arc::new(floor), Some(Arc::new(MatteMaterial::new(Spectrum::new(0.5)))), None);

        // e1 x e2 points down so the light emits towards the floor.
        let panel = Arc::new(Quad::new(
            Point3f::new(-0.5, 0.5, 2.0),
            Vector3f::new(1.0, 0.0, 0.0),
            Vector3f::new(0.0, -1.0, 0.0),
        ));
        let light: ArcLight = Arc::new(DiffuseAreaLight::new(Spectrum::new(l_emit), panel.clone()));
        let panel_prim = GeometricPrimitive::new(panel, None, Some(Arc::clone(&light)));

        let aggregate: ArcPrimitive =
            Arc::new(PrimitiveList::new(vec![Arc::new(floor_prim), Arc::new(panel_prim)]));
        Scene::new(aggregate, vec![light])
    }

    fn quick_params() -> PhotonMapperParams {
        PhotonMapperParams {
            direct_photons: 10_000,
            caustic_photons: 0,
            indirect_photons: 0,
            n_threads: 2,
            ..PhotonMapperParams::default()
        }
    }

    #[test]
    fn validation_clamps_out_of_range_parameters() {
        let params = PhotonMapperParams {
            caustic_lookup_photons: 1_000_000,
            max_caustic_lookup_dist: -1.0,
            gather_samples: 7,
            max_specular_depth: 200,
            ..PhotonMapperParams::default()
        }
        .validated();

        assert_eq!(params.caustic_lookup_photons, u16::MAX as usize);
        assert_eq!(params.max_caustic_lookup_dist, INFINITY);
        assert_eq!(params.gather_samples, 8);
        assert_eq!(params.max_specular_depth, MAX_SPECULAR_DEPTH);
    }

    #[test]
    fn shooting_fills_the_direct_map_within_quota() {
        let _ = env_logger::builder().is_test(true).try_init();
        let scene = floor_and_area_light(1.0);
        let mapper = PhotonMapper::new(quick_params());

        mapper.shoot_photons(&scene, 100_000);
        assert!(!mapper.in_progress());

        let stored = mapper.photon_count(PhotonCategory::Direct);
        assert!(stored > 0);
        assert!(stored <= 10_000);
        assert!(mapper.photon_paths(PhotonCategory::Direct) <= 100_000);
    }

    #[test]
    fn deposited_direct_power_matches_light_power() {
        let scene = floor_and_area_light(1.0);
        let lights = PowerLightDistribution::new(&scene.lights);
        let params = quick_params().validated();
        let mut maps = PhotonMaps::new([1_000_000, 0, 0]);
        let stop = AtomicBool::new(false);

        pipeline::shoot(&scene, &lights, &mut maps, &params, 100_000, &stop);

        let direct = maps.map(PhotonCategory::Direct);
        assert!(!direct.is_empty());
        for ph in direct.photons() {
            // All photons land on the floor, arriving from above.
            assert!(ph.p.z.abs() < 1e-3);
            assert!(ph.wi.vector().z > 0.0);
        }

        // Average deposited weight per path approximates the emitted power
        // since nearly every path reaches the floor. Power of a unit-area
        // one-sided diffuse emitter is pi * L.
        let paths = maps.paths(PhotonCategory::Direct) as Float;
        let avg = direct.total_weight().y() / paths;
        assert_approx_eq!(Float, avg, PI, epsilon = 0.1 * PI);
    }

    #[test]
    fn stop_requests_are_idempotent() {
        let _ = env_logger::builder().is_test(true).try_init();
        let scene = floor_and_area_light(1.0);

        // Nothing in progress: a stop request is refused.
        let mapper = PhotonMapper::new(quick_params());
        assert!(!mapper.stop_shooting());

        // Shooting to completion leaves nothing to stop either.
        mapper.shoot_photons(&scene, 50_000);
        assert!(!mapper.stop_shooting());
        let stored = mapper.photon_count(PhotonCategory::Direct);

        // A refused stop changes nothing.
        assert_eq!(mapper.photon_count(PhotonCategory::Direct), stored);
    }

    #[test]
    fn mid_shoot_stop_cuts_the_path_count_short() {
        let scene = floor_and_area_light(1.0);
        let params = PhotonMapperParams {
            direct_photons: MAX_PHOTONS_IN_MAP,
            caustic_photons: 0,
            indirect_photons: 0,
            n_threads: 2,
            ..PhotonMapperParams::default()
        };
        let mapper = PhotonMapper::new(params);
        let requested = 200_000_000;

        thread::scope(|scope| {
            scope.spawn(|| {
                while !mapper.in_progress() {
                    thread::sleep(Duration::from_millis(1));
                }
                thread::sleep(Duration::from_millis(20));
                // Either we stop it, or it finished already; both leave the
                // second request refused below.
                mapper.stop_shooting();
            });
            mapper.shoot_photons(&scene, requested);
        });

        assert!(!mapper.in_progress());
        assert!(!mapper.stop_shooting());
        assert!(mapper.photon_paths(PhotonCategory::Direct) < requested);
    }

    #[test]
    fn shooting_without_lights_is_a_no_op() {
        let aggregate: ArcPrimitive = Arc::new(PrimitiveList::new(vec![]));
        let scene = Scene::new(aggregate, vec![]);
        let mapper = PhotonMapper::new(quick_params());

        mapper.shoot_photons(&scene, 10_000);
        assert!(!mapper.in_progress());
        assert_eq!(mapper.photon_count(PhotonCategory::Direct), 0);
    }

    #[test]
    fn li_sees_area_light_emission_and_bounce() {
        let scene = floor_and_area_light(2.0);
        let mapper = PhotonMapper::new(quick_params());
        mapper.shoot_photons(&scene, 20_000);

        // A ray straight up into the emitting panel.
        let mut rng = RNG::new(7);
        let ray = Ray::new(Point3f::new(0.0, 0.0, 1.0), Vector3f::new(0.0, 0.0, 1.0), INFINITY);
        let l = mapper.li(&scene, ray, &mut rng);
        assert_approx_eq!(Float, l.y(), Spectrum::new(2.0).y(), epsilon = 1e-4);

        // A ray at the lit floor returns non-black reflected radiance.
        let ray = Ray::new(Point3f::new(0.1, 0.1, 1.0), Vector3f::new(0.0, 0.0, -1.0), INFINITY);
        let l = mapper.li(&scene, ray, &mut rng);
        assert!(!l.is_black());

        // A ray escaping the scene sees nothing.
        let ray = Ray::new(Point3f::new(0.0, 0.0, 5.0), Vector3f::new(0.0, 0.0, 1.0), INFINITY);
        assert!(mapper.li(&scene, ray, &mut rng).is_black());
    }

    #[test]
    fn simpson_kernel_peaks_at_center_and_vanishes_at_rim() {
        assert_approx_eq!(Float, simpson_kernel(0.0, 1.0), 3.0 * INV_PI, epsilon = 1e-6);
        assert_approx_eq!(Float, simpson_kernel(1.0, 1.0), 0.0, epsilon = 1e-6);
        assert!(simpson_kernel(0.25, 1.0) > simpson_kernel(0.75, 1.0));
    }

    #[test]
    fn photon_cone_pdf_averages_matching_cones() {
        let z = Vector3f::new(0.0, 0.0, 1.0);
        let x = Vector3f::new(1.0, 0.0, 0.0);
        let cone = uniform_cone_pdf(COS_GATHER_ANGLE);

        // Both guides contain the direction.
        assert_approx_eq!(Float, photon_cone_pdf(&[z, z], &z, None), cone, epsilon = 1e-5);
        // One of two guides contains it.
        assert_approx_eq!(Float, photon_cone_pdf(&[z, x], &z, None), cone / 2.0, epsilon = 1e-5);
        // None contains it, but the sampled guide always counts.
        assert_eq!(photon_cone_pdf(&[x], &z, None), 0.0);
        assert_approx_eq!(Float, photon_cone_pdf(&[x], &z, Some(0)), cone, epsilon = 1e-5);
    }

    proptest! {
        #[test]
        fn simpson_kernel_is_bounded(d_sq in 0.0f32..1.0, r_sq in 1.0f32..100.0) {
            let k = simpson_kernel(d_sq, r_sq);
            prop_assert!(k >= 0.0);
            prop_assert!(k <= 3.0 * INV_PI + 1e-6);
        }
    }
}
