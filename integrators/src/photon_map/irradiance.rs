//! Irradiance photon precomputation

use super::maps::PhotonMaps;
use super::photon::*;
use core::geometry::*;
use core::kd_tree::KdTree;
use core::pbrt::*;
use core::spectrum::Spectrum;
use itertools::Itertools;
use std::thread;

/// Every n-th indirect photon seeds an irradiance photon.
const IRRADIANCE_PHOTON_STRIDE: usize = 10;

/// Photons gathered per category for each irradiance estimate.
const IRRADIANCE_LOOKUP_PHOTONS: usize = 100;

/// Every n-th indirect photon probes its nearest irradiance photon when
/// deriving the shading-time lookup distance bound.
const LOOKUP_DIST_PROBE_STRIDE: usize = 11;

/// Precomputed irradiance estimates over the scene surfaces, queried during
/// final gathering to terminate gather rays.
pub struct IrradianceMap {
    /// The estimates.
    tree: KdTree<IrradiancePhoton>,

    /// Squared distance bound for shading-time lookups.
    max_lookup_dist_sq: Float,
}

impl IrradianceMap {
    /// Returns the number of stored irradiance photons.
    pub fn size(&self) -> usize {
        self.tree.size()
    }

    /// Returns the nearest irradiance photon on the same surface plane as
    /// the lookup point, within the map's lookup distance bound.
    ///
    /// * `p` - The lookup position.
    /// * `n` - The lookup surface normal.
    pub fn nearest(&self, p: &Point3f, n: &Vector3f) -> Option<&IrradiancePhoton> {
        self.tree
            .nearest(p, self.max_lookup_dist_sq, |ph| {
                compatible_plane(&ph.p, &ph.n.vector(), p, n)
            })
            .map(|(i, _)| self.tree.point(i))
    }
}

/// Builds the irradiance map from the frozen category maps: seeds an
/// irradiance photon at every 10th indirect photon, estimates both-sided
/// irradiance at each seed in parallel, and freezes the result. Returns
/// `None` when there are no indirect photons to seed from.
///
/// * `maps`       - The frozen category maps.
/// * `scene_area` - Total scene surface area, for the analytic lookup radii.
/// * `n_threads`  - Worker thread count for the estimation pass.
pub(super) fn build_irradiance_map(maps: &PhotonMaps, scene_area: Float, n_threads: usize) -> Option<IrradianceMap> {
    let indirect = maps.map(PhotonCategory::Indirect).photons();
    if indirect.is_empty() {
        return None;
    }

    let mut seeds: Vec<IrradiancePhoton> = indirect
        .iter()
        .step_by(IRRADIANCE_PHOTON_STRIDE)
        .map(|ph| IrradiancePhoton::new(ph.p, ph.n))
        .collect();
    debug!("estimating irradiance at {} photons", seeds.len());

    // Analytic per-category lookup radii from the stored photon densities.
    let direct_r_sq = lookup_radius_sq(scene_area, maps.map(PhotonCategory::Direct).len());
    let indirect_r_sq = lookup_radius_sq(scene_area, maps.map(PhotonCategory::Indirect).len());
    let radii_sq = [direct_r_sq, max(direct_r_sq, indirect_r_sq), indirect_r_sq];

    let block = max(seeds.len() / (n_threads * 8), 32);
    thread::scope(|scope| {
        let (tx, rx) = crossbeam_channel::bounded::<&mut [IrradiancePhoton]>(n_threads * 2);

        for _ in 0..n_threads {
            let rx = rx.clone();
            scope.spawn(move || {
                for slice in rx.iter() {
                    for seed in slice.iter_mut() {
                        estimate_irradiance(seed, maps, &radii_sq);
                    }
                }
            });
        }
        drop(rx); // Drop extra since we've cloned one for each worker.

        for slice in seeds.chunks_mut(block) {
            if tx.send(slice).is_err() {
                break;
            }
        }
    });

    let tree = KdTree::new(seeds);
    let max_lookup_dist_sq = lookup_dist_bound(&tree, indirect);
    Some(IrradianceMap { tree, max_lookup_dist_sq })
}

/// Squared lookup radius that covers the expected gather count for a map's
/// photon density over the scene area.
///
/// * `scene_area` - Total scene surface area.
/// * `count`      - Stored photon count.
fn lookup_radius_sq(scene_area: Float, count: usize) -> Float {
    if count == 0 {
        0.0
    } else {
        scene_area / count as Float * IRRADIANCE_LOOKUP_PHOTONS as Float * INV_PI
    }
}

/// Fills in one seed's front and back irradiance from all three category
/// maps.
///
/// * `seed`     - The seed to estimate at.
/// * `maps`     - The frozen category maps.
/// * `radii_sq` - Squared per-category lookup radii.
fn estimate_irradiance(seed: &mut IrradiancePhoton, maps: &PhotonMaps, radii_sq: &[Float; 3]) {
    let n_seed = seed.n.vector();

    for cat in PhotonCategory::ALL {
        let radius_sq = radii_sq[cat as usize];
        let paths = maps.paths(cat);
        if radius_sq <= 0.0 || paths == 0 {
            continue;
        }
        let tree = match maps.map(cat).tree() {
            Some(tree) => tree,
            None => continue,
        };

        let (found, r_sq) = tree.lookup(&seed.p, IRRADIANCE_LOOKUP_PHOTONS, radius_sq, |ph| {
            compatible_normal(&ph.p, &ph.n.vector(), &seed.p, &n_seed)
        });
        let n_found = found.len();
        if n_found == 0 {
            continue;
        }

        let mut front = Spectrum::ZERO;
        let mut back = Spectrum::ZERO;
        for (i, _) in found {
            let ph = tree.point(i);
            if ph.wi.vector().dot(&n_seed) > 0.0 {
                front += ph.weight;
            } else {
                back += ph.weight;
            }
        }

        // Disc-area normalization with the small-sample correction folded
        // into the squared radius.
        let r_corr = r_sq * n_found as Float / (n_found as Float - 0.5);
        let inv = 1.0 / (PI * r_corr * paths as Float);
        seed.front += front * inv;
        seed.back += back * inv;
    }
}

/// Derives the shading-time lookup distance bound: probes every 11th
/// indirect photon for its nearest irradiance photon and takes roughly the
/// 99.9th percentile of the distances.
///
/// * `tree`     - The frozen irradiance photons.
/// * `indirect` - The indirect photons to probe from.
fn lookup_dist_bound(tree: &KdTree<IrradiancePhoton>, indirect: &[Photon]) -> Float {
    let dists_sq: Vec<Float> = indirect
        .iter()
        .step_by(LOOKUP_DIST_PROBE_STRIDE)
        .filter_map(|ph| tree.nearest(&ph.p, INFINITY, |_| true).map(|(_, d_sq)| d_sq))
        .sorted_by(|a, b| b.total_cmp(a))
        .collect();
    if dists_sq.is_empty() {
        return INFINITY;
    }

    let k = max(dists_sq.len() / 1000, 1);
    dists_sq[k - 1]
}
