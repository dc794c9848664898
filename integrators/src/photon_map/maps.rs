//! Per-category photon maps

use super::irradiance::IrradianceMap;
use super::photon::*;
use core::kd_tree::KdTree;
use core::pbrt::*;
use core::spectrum::Spectrum;

/// Hard ceiling on the number of distinct photons a single map may store.
pub const MAX_PHOTONS_IN_MAP: usize = 40_000_000;

/// Photon storage for one category. Grows as a plain vector until the quota
/// is reached, then freezes into a k-d tree.
enum Store {
    Growing(Vec<Photon>),
    Frozen(KdTree<Photon>),
}

/// A single category's photon map.
pub struct PhotonMap {
    /// Current storage state.
    store: Store,

    /// Maximum number of distinct stored photons.
    quota: usize,
}

impl PhotonMap {
    /// Creates an empty map with the given photon quota, clamped to the
    /// global ceiling.
    ///
    /// * `quota` - Maximum number of distinct stored photons.
    pub fn new(quota: usize) -> Self {
        let quota = if quota > MAX_PHOTONS_IN_MAP {
            warn!(
                "photon quota {} exceeds the map ceiling; clamping to {}",
                quota, MAX_PHOTONS_IN_MAP
            );
            MAX_PHOTONS_IN_MAP
        } else {
            quota
        };
        Self {
            store: Store::Growing(Vec::new()),
            quota,
        }
    }

    /// Returns the number of distinct stored photons.
    pub fn len(&self) -> usize {
        match &self.store {
            Store::Growing(v) => v.len(),
            Store::Frozen(t) => t.size(),
        }
    }

    /// Returns true if no photons are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true once the quota has been reached.
    pub fn is_full(&self) -> bool {
        self.len() >= self.quota
    }

    /// Returns the frozen k-d tree, or `None` while the map is still
    /// growing.
    pub fn tree(&self) -> Option<&KdTree<Photon>> {
        match &self.store {
            Store::Growing(_) => None,
            Store::Frozen(t) => Some(t),
        }
    }

    /// Returns all stored photons regardless of storage state.
    pub fn photons(&self) -> &[Photon] {
        match &self.store {
            Store::Growing(v) => v,
            Store::Frozen(t) => t.points(),
        }
    }

    /// Returns the sum of all stored photon weights.
    pub fn total_weight(&self) -> Spectrum {
        self.photons().iter().map(|ph| ph.weight).sum()
    }

    /// Merges a batch of photons into the map. While growing, photons are
    /// appended until the quota is reached, at which point the map freezes.
    /// After freezing, each photon's weight is accumulated onto the nearest
    /// stored photon with a compatible normal; photons with no compatible
    /// neighbor are dropped.
    ///
    /// * `photons` - The batch to merge.
    pub fn merge(&mut self, photons: &[Photon]) {
        let mut next = 0;

        if let Store::Growing(v) = &mut self.store {
            let room = self.quota - v.len();
            next = photons.len().min(room);
            v.extend_from_slice(&photons[..next]);
            if v.len() >= self.quota {
                self.freeze();
            }
        }

        for ph in &photons[next..] {
            self.merge_into_frozen(ph);
        }
    }

    /// Freezes all remaining growth storage into a k-d tree. Called after
    /// the shooting pipeline drains so every category is searchable.
    pub fn build(&mut self) {
        if matches!(self.store, Store::Growing(_)) {
            self.freeze();
        }
    }

    fn freeze(&mut self) {
        let store = std::mem::replace(&mut self.store, Store::Growing(Vec::new()));
        if let Store::Growing(v) = store {
            debug!("freezing photon map with {} photons", v.len());
            self.store = Store::Frozen(KdTree::new(v));
        } else {
            self.store = store;
        }
    }

    fn merge_into_frozen(&mut self, ph: &Photon) {
        let n = ph.n.vector();
        let found = match &self.store {
            Store::Frozen(t) => t.nearest(&ph.p, INFINITY, |rec| {
                compatible_normal(&rec.p, &rec.n.vector(), &ph.p, &n)
            }),
            Store::Growing(_) => None,
        };
        if let (Some((i, _)), Store::Frozen(t)) = (found, &mut self.store) {
            t.point_mut(i).weight += ph.weight;
        }
    }
}

/// The manager owning the three category maps, their path counters, and the
/// irradiance map built from them.
pub struct PhotonMaps {
    /// One map per category, indexed by `PhotonCategory`.
    maps: [PhotonMap; 3],

    /// Number of photon paths that contributed to each category.
    paths: [usize; 3],

    /// The precomputed irradiance estimates, built after shooting.
    irradiance: Option<IrradianceMap>,
}

impl PhotonMaps {
    /// Creates empty maps with the given per-category photon quotas.
    ///
    /// * `quotas` - Photon quotas indexed by `PhotonCategory`.
    pub fn new(quotas: [usize; 3]) -> Self {
        let [q0, q1, q2] = quotas;
        Self {
            maps: [PhotonMap::new(q0), PhotonMap::new(q1), PhotonMap::new(q2)],
            paths: [0; 3],
            irradiance: None,
        }
    }

    /// Returns the map for a category.
    pub fn map(&self, cat: PhotonCategory) -> &PhotonMap {
        &self.maps[cat as usize]
    }

    /// Returns a mutable reference to the map for a category.
    pub fn map_mut(&mut self, cat: PhotonCategory) -> &mut PhotonMap {
        &mut self.maps[cat as usize]
    }

    /// Returns the number of photon paths that contributed to a category.
    pub fn paths(&self, cat: PhotonCategory) -> usize {
        self.paths[cat as usize]
    }

    /// Adds to a category's path counter.
    ///
    /// * `cat` - The category.
    /// * `n`   - Number of paths to add.
    pub fn add_paths(&mut self, cat: PhotonCategory, n: usize) {
        self.paths[cat as usize] += n;
    }

    /// Returns the irradiance map, if built.
    pub fn irradiance(&self) -> Option<&IrradianceMap> {
        self.irradiance.as_ref()
    }

    /// Installs the irradiance map.
    pub fn set_irradiance(&mut self, map: IrradianceMap) {
        self.irradiance = Some(map);
    }

    /// Freezes every category map so all of them are searchable.
    pub fn build(&mut self) {
        for map in self.maps.iter_mut() {
            map.build();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::geometry::*;
    use float_cmp::assert_approx_eq;

    fn plane_photon(x: Float, y: Float, w: Float) -> Photon {
        Photon::new(
            Point3f::new(x, y, 0.0),
            Spectrum::new(w),
            CompressedDirection::new(Vector3f::new(0.0, 0.0, 1.0)),
            CompressedDirection::new(Vector3f::new(0.0, 0.0, 1.0)),
        )
    }

    #[test]
    fn quota_bounds_distinct_points() {
        let mut map = PhotonMap::new(10);
        let photons: Vec<Photon> = (0..25).map(|i| plane_photon(i as Float, 0.0, 1.0)).collect();
        map.merge(&photons);
        assert_eq!(map.len(), 10);
        assert!(map.is_full());
        assert!(map.tree().is_some());
    }

    #[test]
    fn merge_conserves_weight_of_compatible_photons() {
        let mut map = PhotonMap::new(4);
        let photons: Vec<Photon> = (0..4).map(|i| plane_photon(i as Float, 0.0, 1.0)).collect();
        map.merge(&photons);
        assert!(map.is_full());

        // Post-freeze photons with a compatible normal fold their weight
        // into the nearest stored photon.
        map.merge(&[plane_photon(0.1, 0.0, 2.0), plane_photon(2.9, 0.0, 3.0)]);
        assert_eq!(map.len(), 4);
        assert_approx_eq!(Float, map.total_weight().y(), 9.0, epsilon = 1e-4);
    }

    #[test]
    fn incompatible_photons_are_dropped_after_freeze() {
        let mut map = PhotonMap::new(2);
        map.merge(&[plane_photon(0.0, 0.0, 1.0), plane_photon(1.0, 0.0, 1.0)]);
        assert!(map.is_full());

        // Opposing normal fails the compatibility filter.
        let dropped = Photon::new(
            Point3f::new(0.5, 0.0, 0.0),
            Spectrum::new(5.0),
            CompressedDirection::new(Vector3f::new(0.0, 0.0, -1.0)),
            CompressedDirection::new(Vector3f::new(0.0, 0.0, -1.0)),
        );
        map.merge(&[dropped]);
        assert_eq!(map.len(), 2);
        assert_approx_eq!(Float, map.total_weight().y(), 2.0, epsilon = 1e-4);
    }

    #[test]
    fn build_freezes_an_unfilled_map() {
        let mut map = PhotonMap::new(100);
        map.merge(&[plane_photon(0.0, 0.0, 1.0)]);
        assert!(map.tree().is_none());
        map.build();
        assert!(map.tree().is_some());
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn quota_is_clamped_to_the_ceiling() {
        let map = PhotonMap::new(usize::MAX);
        assert_eq!(map.quota, MAX_PHOTONS_IN_MAP);
    }
}
