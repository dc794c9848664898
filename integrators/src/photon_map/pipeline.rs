//! Photon shooting pipeline

use super::maps::PhotonMaps;
use super::photon::*;
use super::PhotonMapperParams;
use bumpalo::Bump;
use core::geometry::*;
use core::light::Le;
use core::light_distrib::PowerLightDistribution;
use core::low_discrepency::radical_inverse;
use core::material::TransportMode;
use core::pbrt::*;
use core::reflection::*;
use core::rng::RNG;
use core::scene::Scene;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;

/// Default number of chunks circulating through the pipeline.
pub const MAX_PIPELINE_TOKENS: usize = 64;

/// Default number of photon paths traced per chunk.
pub const PATHS_PER_CHUNK: usize = 4096;

/// Extra bounces allowed beyond the specular depth limit before a path is
/// cut off outright.
const DEPTH_SLACK: usize = 8;

/// Category completion flags shared between the input stage and the merge
/// stage. Workers never read them directly; each chunk carries a snapshot.
struct ShootingStats {
    done: [AtomicBool; 3],
}

impl ShootingStats {
    fn new() -> Self {
        Self {
            done: [AtomicBool::new(false), AtomicBool::new(false), AtomicBool::new(false)],
        }
    }

    fn snapshot(&self) -> [bool; 3] {
        [
            self.done[0].load(Ordering::Acquire),
            self.done[1].load(Ordering::Acquire),
            self.done[2].load(Ordering::Acquire),
        ]
    }

    fn set_done(&self, cat: PhotonCategory) {
        self.done[cat as usize].store(true, Ordering::Release);
    }

    fn all_done(&self) -> bool {
        self.snapshot().iter().all(|&d| d)
    }
}

/// A unit of pipeline work: a range of photon path indices plus the buffers
/// and per-chunk scratch used to trace them. Chunks are owned by exactly one
/// stage at a time and circulate through the channels.
struct PhotonChunk {
    /// Global index of the first path in the range.
    first_path: usize,

    /// Number of paths in the range.
    n_paths: usize,

    /// Category completion snapshot taken when the chunk was issued.
    done: [bool; 3],

    /// Per-category photon buffers filled by tracing.
    photons: [Vec<Photon>; 3],

    /// Scratch arena for BSDF allocations, reset after every path.
    arena: Bump,

    /// Chunk-private random number generator.
    rng: RNG,
}

impl PhotonChunk {
    fn new() -> Self {
        Self {
            first_path: 0,
            n_paths: 0,
            done: [false; 3],
            photons: [Vec::new(), Vec::new(), Vec::new()],
            arena: Bump::new(),
            rng: RNG::new(0),
        }
    }

    /// Prepares the chunk for a new range of paths.
    ///
    /// * `first_path` - Global index of the first path.
    /// * `n_paths`    - Number of paths.
    /// * `done`       - Current category completion snapshot.
    fn assign(&mut self, first_path: usize, n_paths: usize, done: [bool; 3]) {
        self.first_path = first_path;
        self.n_paths = n_paths;
        self.done = done;
        for buf in self.photons.iter_mut() {
            buf.clear();
        }
        self.rng.set_sequence(first_path as u64);
    }
}

/// Runs the three-stage shooting pipeline until the requested path count is
/// traced, every category map fills, the safety valve trips, or a stop is
/// requested. Returns the number of paths issued.
///
/// * `scene`      - The scene.
/// * `lights`     - Power-proportional distribution over the scene lights.
/// * `maps`       - The category maps receiving the photons.
/// * `params`     - Validated integrator parameters.
/// * `path_count` - Number of photon paths requested.
/// * `stop`       - Cooperative cancellation flag.
pub(super) fn shoot(
    scene: &Scene,
    lights: &PowerLightDistribution,
    maps: &mut PhotonMaps,
    params: &PhotonMapperParams,
    path_count: usize,
    stop: &AtomicBool,
) -> usize {
    let n_threads = params.threads();
    let tokens = params.tokens();
    let paths_per_chunk = params.paths_per_chunk();
    let max_total_paths = params.max_total_paths(path_count);

    let stats = ShootingStats::new();
    for cat in PhotonCategory::ALL {
        // Zero-quota categories are done before we start.
        if maps.map(cat).is_full() {
            stats.set_done(cat);
        }
    }

    let progress = create_progress_bar(path_count as u64);
    let issued = AtomicUsize::new(0);

    thread::scope(|scope| {
        let (tx_work, rx_work) = crossbeam_channel::bounded::<PhotonChunk>(tokens);
        let (tx_done, rx_done) = crossbeam_channel::bounded::<PhotonChunk>(tokens);
        let (tx_free, rx_free) = crossbeam_channel::bounded::<PhotonChunk>(tokens);

        for _ in 0..tokens {
            if tx_free.send(PhotonChunk::new()).is_err() {
                return;
            }
        }

        // Stage A: hand out path ranges to drained chunks.
        let stats_ref = &stats;
        let issued_ref = &issued;
        scope.spawn(move || {
            let mut next_path = 0;
            while next_path < path_count {
                if stop.load(Ordering::Acquire) || stats_ref.all_done() {
                    break;
                }
                if next_path >= max_total_paths {
                    warn!(
                        "photon shooting safety valve tripped after {} paths",
                        next_path
                    );
                    break;
                }
                let mut chunk = match rx_free.recv() {
                    Ok(chunk) => chunk,
                    Err(_) => break,
                };
                let n = paths_per_chunk.min(path_count - next_path);
                chunk.assign(next_path, n, stats_ref.snapshot());
                next_path += n;
                if tx_work.send(chunk).is_err() {
                    break;
                }
            }
            issued_ref.store(next_path, Ordering::Release);
        });

        // Stage B: trace chunks in parallel.
        for _ in 0..n_threads {
            let rx_work = rx_work.clone();
            let tx_done = tx_done.clone();
            scope.spawn(move || {
                for mut chunk in rx_work.iter() {
                    trace_chunk(scene, lights, params, &mut chunk);
                    if tx_done.send(chunk).is_err() {
                        break;
                    }
                }
            });
        }
        drop(rx_work); // Drop extras since we've cloned one for each worker.
        drop(tx_done);

        // Stage C: merge finished chunks sequentially on this thread.
        for chunk in rx_done.iter() {
            for cat in PhotonCategory::ALL {
                let i = cat as usize;
                if chunk.done[i] {
                    continue;
                }
                maps.map_mut(cat).merge(&chunk.photons[i]);
                maps.add_paths(cat, chunk.n_paths);
                if maps.map(cat).is_full() {
                    stats.set_done(cat);
                }
            }
            progress.inc(chunk.n_paths as u64);
            // The input stage may already have exited.
            tx_free.send(chunk).ok();
        }
    });

    progress.finish_and_clear();
    issued.load(Ordering::Acquire)
}

/// Traces every path in the chunk's range into its local buffers.
fn trace_chunk(scene: &Scene, lights: &PowerLightDistribution, params: &PhotonMapperParams, chunk: &mut PhotonChunk) {
    let PhotonChunk {
        first_path,
        n_paths,
        done,
        photons,
        arena,
        rng,
    } = chunk;

    for i in 0..*n_paths {
        trace_path(scene, lights, params, *first_path + i, *done, photons, &*arena, rng);
        arena.reset();
    }
}

/// Traces a single photon path, depositing classified photons into the
/// chunk-local buffers.
///
/// * `scene`      - The scene.
/// * `lights`     - Power-proportional distribution over the scene lights.
/// * `params`     - Validated integrator parameters.
/// * `path_index` - Global index of the path.
/// * `done`       - Category completion snapshot.
/// * `photons`    - Chunk-local photon buffers.
/// * `arena`      - Scratch arena for BSDF allocations.
/// * `rng`        - Chunk-private random number generator.
#[allow(clippy::too_many_arguments)]
fn trace_path(
    scene: &Scene,
    lights: &PowerLightDistribution,
    params: &PhotonMapperParams,
    path_index: usize,
    done: [bool; 3],
    photons: &mut [Vec<Photon>; 3],
    arena: &Bump,
    rng: &mut RNG,
) {
    let halton_index = path_index as u64;

    // Low-discrepancy samples drive the emission and the first bounce.
    let u_light_pos = Point2f::new(radical_inverse(0, halton_index), radical_inverse(1, halton_index));
    let u_light_dir = Point2f::new(radical_inverse(2, halton_index), radical_inverse(3, halton_index));
    let light_sample = radical_inverse(4, halton_index);

    let (light, _, light_pdf) = match lights.sample(light_sample) {
        Some(sampled) => sampled,
        None => return,
    };
    if light_pdf == 0.0 {
        return;
    }

    // Generate the photon ray and its initial weight.
    let Le {
        ray,
        n_light,
        pdf_pos,
        pdf_dir,
        value: le,
    } = light.sample_le(&u_light_pos, &u_light_dir);
    if pdf_pos == 0.0 || pdf_dir == 0.0 || le.is_black() {
        return;
    }
    let mut beta = (n_light.abs_dot(&ray.d) * le) / (light_pdf * pdf_pos * pdf_dir);
    if beta.is_black() {
        return;
    }
    let mut ray = ray;

    let max_depth = params.max_specular_depth + DEPTH_SLACK;
    let mut all_specular = true;
    let mut depth = 0;
    while depth < max_depth {
        let mut si = match scene.intersect(&mut ray) {
            Some(si) => si,
            None => break,
        };

        let material = si.primitive.as_ref().and_then(|p| p.get_material());
        let material = match material {
            Some(material) => material,
            None => {
                // Boundary surfaces without scattering pass the photon
                // through unchanged.
                ray = si.hit.spawn_ray(&ray.d);
                continue;
            }
        };
        material.compute_scattering_functions(arena, &mut si, TransportMode::Importance);
        let bsdf = match si.bsdf.as_ref() {
            Some(bsdf) => bsdf,
            None => {
                ray = si.hit.spawn_ray(&ray.d);
                continue;
            }
        };

        // Classify and deposit the photon.
        let non_specular = bsdf.num_components(BxDFType::from(BSDF_ALL & !BSDF_SPECULAR)) > 0;
        let category = if depth == 0 && non_specular {
            PhotonCategory::Direct
        } else if depth > 0 && all_specular && non_specular {
            PhotonCategory::Caustic
        } else {
            PhotonCategory::Indirect
        };
        if !done[category as usize] {
            photons[category as usize].push(Photon::new(
                si.hit.p,
                beta,
                CompressedDirection::new(-ray.d),
                CompressedDirection::new(Vector3f::from(si.hit.n)),
            ));
        }

        // Once the path has gone non-specular only the indirect map can
        // still profit from it.
        if !all_specular && done[PhotonCategory::Indirect as usize] {
            break;
        }

        // Sample the continuation direction.
        let u_scatter = if depth == 0 {
            Point2f::new(radical_inverse(5, halton_index), radical_inverse(6, halton_index))
        } else {
            Point2f::new(rng.uniform_float(), rng.uniform_float())
        };
        let wo = -ray.d;
        let sample = bsdf.sample_f(&wo, &u_scatter, BxDFType::from(BSDF_ALL));
        if sample.f.is_black() || sample.pdf == 0.0 {
            break;
        }
        let bnew = beta * sample.f * sample.wi.abs_dot(&si.shading.n) / sample.pdf;

        // Russian roulette on the luminance ratio.
        let q = min(1.0, bnew.y() / beta.y());
        let u_rr = if depth == 0 {
            radical_inverse(7, halton_index)
        } else {
            rng.uniform_float()
        };
        if u_rr >= q {
            break;
        }
        beta = bnew / q;

        all_specular = all_specular && sample.bxdf_type.matches(BSDF_SPECULAR);
        ray = si.hit.spawn_ray(&sample.wi);
        depth += 1;
    }
}

/// Returns a progress bar for the given work count.
///
/// * `len` - The work count.
pub(super) fn create_progress_bar(len: u64) -> ProgressBar {
    let progress = ProgressBar::new(len);
    progress.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    progress
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::light::ArcLight;
    use core::material::MatteMaterial;
    use core::primitive::ArcPrimitive;
    use core::primitives::{GeometricPrimitive, PrimitiveList};
    use core::spectrum::Spectrum;
    use lights::PointLight;
    use shapes::Quad;
    use std::sync::Arc;

    /// A matte floor quad lit by a point light above it.
    fn floor_scene() -> Scene {
        let floor = Quad::new(
            Point3f::new(-5.0, -5.0, 0.0),
            Vector3f::new(10.0, 0.0, 0.0),
            Vector3f::new(0.0, 10.0, 0.0),
        );
        let matte = MatteMaterial::new(Spectrum::new(0.5));
        let prim = GeometricPrimitive::new(Arc::new(floor), Some(Arc::new(matte)), None);
        let light: ArcLight = Arc::new(PointLight::new(Point3f::new(0.0, 0.0, 3.0), Spectrum::new(10.0)));
        let aggregate: ArcPrimitive = Arc::new(PrimitiveList::new(vec![Arc::new(prim)]));
        Scene::new(aggregate, vec![light])
    }

    fn test_params(quotas: [usize; 3]) -> PhotonMapperParams {
        PhotonMapperParams {
            direct_photons: quotas[0],
            caustic_photons: quotas[1],
            indirect_photons: quotas[2],
            n_threads: 2,
            ..PhotonMapperParams::default()
        }
        .validated()
    }

    #[test]
    fn direct_photons_land_on_the_floor() {
        let scene = floor_scene();
        let lights = PowerLightDistribution::new(&scene.lights);
        let params = test_params([5000, 0, 0]);
        let mut maps = PhotonMaps::new([5000, 0, 0]);
        let stop = AtomicBool::new(false);

        let issued = shoot(&scene, &lights, &mut maps, &params, 50_000, &stop);
        assert!(issued > 0);

        let direct = maps.map(PhotonCategory::Direct);
        assert!(!direct.is_empty());
        assert!(direct.len() <= 5000);
        for ph in direct.photons() {
            // On the floor plane, arriving from above.
            assert!(ph.p.z.abs() < 1e-3);
            assert!(ph.wi.vector().z > 0.0);
        }
    }

    #[test]
    fn path_counters_track_issued_chunks() {
        let scene = floor_scene();
        let lights = PowerLightDistribution::new(&scene.lights);
        let params = test_params([1_000_000, 1_000_000, 1_000_000]);
        let mut maps = PhotonMaps::new([1_000_000, 1_000_000, 1_000_000]);
        let stop = AtomicBool::new(false);

        let issued = shoot(&scene, &lights, &mut maps, &params, 10_000, &stop);
        assert_eq!(issued, 10_000);
        // No category filled, so every chunk contributed to every counter.
        for cat in PhotonCategory::ALL {
            assert_eq!(maps.paths(cat), 10_000);
        }
    }

    #[test]
    fn stop_flag_cuts_shooting_short() {
        let scene = floor_scene();
        let lights = PowerLightDistribution::new(&scene.lights);
        let params = test_params([1_000_000, 1_000_000, 1_000_000]);
        let mut maps = PhotonMaps::new([1_000_000, 1_000_000, 1_000_000]);

        // Pre-set stop: Stage A checks it before issuing any chunk.
        let stop = AtomicBool::new(true);
        let issued = shoot(&scene, &lights, &mut maps, &params, 1_000_000, &stop);
        assert_eq!(issued, 0);
        assert!(maps.map(PhotonCategory::Direct).is_empty());
    }

    #[test]
    fn first_bounce_samples_are_deterministic() {
        // The emission sample vector depends only on the path index.
        let a = radical_inverse(0, 42);
        let b = radical_inverse(0, 42);
        assert_eq!(a, b);
        assert_ne!(radical_inverse(0, 42), radical_inverse(0, 43));
    }
}
