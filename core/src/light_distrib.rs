//! Power-proportional light sampling.

use crate::light::{ArcLight, LightType};
use crate::pbrt::*;
use std::sync::Arc;

/// A discrete distribution over the scene's lights, proportional to each
/// light's emitted power (luminance). Lights are reordered delta first, then
/// infinite, then area, keeping the relative order within each class.
pub struct PowerLightDistribution {
    /// The lights in sampling order.
    lights: Vec<ArcLight>,

    /// Cumulative distribution, one entry per light; the last entry is
    /// exactly 1.0.
    cdf: Vec<Float>,

    /// Selection probability per light.
    pdfs: Vec<Float>,
}

impl PowerLightDistribution {
    /// Create a new `PowerLightDistribution` from the scene's lights.
    ///
    /// * `lights` - The lights, in scene order.
    pub fn new(lights: &[ArcLight]) -> Self {
        // Reorder delta, infinite, area; stable within each class.
        let mut ordered: Vec<ArcLight> = Vec::with_capacity(lights.len());
        ordered.extend(lights.iter().filter(|l| l.is_delta_light()).map(Arc::clone));
        ordered.extend(
            lights
                .iter()
                .filter(|l| !l.is_delta_light() && l.get_type().intersects(LightType::INFINITE))
                .map(Arc::clone),
        );
        ordered.extend(
            lights
                .iter()
                .filter(|l| !l.is_delta_light() && !l.get_type().intersects(LightType::INFINITE))
                .map(Arc::clone),
        );

        let powers: Vec<Float> = ordered.iter().map(|l| l.power().y()).collect();
        let total: Float = powers.iter().sum();

        let n = ordered.len();
        let mut cdf = Vec::with_capacity(n);
        let mut pdfs = Vec::with_capacity(n);
        if total > 0.0 {
            let mut running = 0.0;
            for p in powers.iter() {
                running += p / total;
                cdf.push(running);
                pdfs.push(p / total);
            }
            // Absorb accumulated rounding error.
            if let Some(last) = cdf.last_mut() {
                *last = 1.0;
            }
        } else if n > 0 {
            warn!("all {} lights have zero power; sampling collapses to the last light", n);
            cdf.resize(n - 1, 0.0);
            cdf.push(1.0);
            pdfs.resize(n - 1, 0.0);
            pdfs.push(1.0);
        }

        Self { lights: ordered, cdf, pdfs }
    }

    /// Returns the number of lights.
    pub fn len(&self) -> usize {
        self.lights.len()
    }

    /// Returns true if there are no lights.
    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    /// Returns the lights in sampling order.
    pub fn lights(&self) -> &[ArcLight] {
        &self.lights
    }

    /// Returns the cumulative distribution.
    pub fn cdf(&self) -> &[Float] {
        &self.cdf
    }

    /// Samples a light proportional to power. Returns the light, its index
    /// and its selection probability.
    ///
    /// * `u` - Uniform random sample in `[0, 1)`.
    pub fn sample(&self, u: Float) -> Option<(ArcLight, usize, Float)> {
        if self.lights.is_empty() {
            return None;
        }

        // Largest index whose CDF entry does not exceed `u`, then step past
        // it; zero-power lights have zero-width CDF intervals and are
        // stepped over.
        let i = find_interval(self.cdf.len(), |i| self.cdf[i] <= u);
        let idx = if self.cdf[i] <= u { min(i + 1, self.lights.len() - 1) } else { i };

        Some((Arc::clone(&self.lights[idx]), idx, self.pdfs[idx]))
    }

    /// Returns the selection probability of the light at the given index.
    ///
    /// * `idx` - The light index.
    pub fn pdf(&self, idx: usize) -> Float {
        self.pdfs[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::*;
    use crate::interaction::Hit;
    use crate::light::{Le, Li, Light};
    use crate::spectrum::Spectrum;

    struct FakeLight {
        light_type: LightType,
        power: Float,
    }

    impl Light for FakeLight {
        fn get_type(&self) -> LightType {
            self.light_type
        }

        fn power(&self) -> Spectrum {
            Spectrum::new(self.power)
        }

        fn sample_li(&self, _hit: &Hit, _u: &Point2f) -> Li {
            Li::new(Vector3f::ZERO, 0.0, None, Spectrum::ZERO)
        }

        fn pdf_li(&self, _hit: &Hit, _wi: &Vector3f) -> Float {
            0.0
        }

        fn sample_le(&self, _u1: &Point2f, _u2: &Point2f) -> Le {
            Le::new(Ray::default(), Normal3f::ZERO, 0.0, 0.0, Spectrum::ZERO)
        }
    }

    fn fake(light_type: LightType, power: Float) -> ArcLight {
        Arc::new(FakeLight { light_type, power })
    }

    #[test]
    fn lights_are_reordered_delta_infinite_area() {
        let lights = vec![
            fake(LightType::AREA, 1.0),
            fake(LightType::INFINITE, 1.0),
            fake(LightType::DELTA_POSITION, 1.0),
        ];
        let distrib = PowerLightDistribution::new(&lights);
        let types: Vec<LightType> = distrib.lights().iter().map(|l| l.get_type()).collect();
        assert_eq!(types, vec![LightType::DELTA_POSITION, LightType::INFINITE, LightType::AREA]);
    }

    #[test]
    fn cdf_is_well_formed() {
        let lights = vec![
            fake(LightType::DELTA_POSITION, 3.0),
            fake(LightType::AREA, 1.0),
            fake(LightType::AREA, 0.0),
            fake(LightType::AREA, 4.0),
        ];
        let distrib = PowerLightDistribution::new(&lights);
        let cdf = distrib.cdf();
        assert_eq!(*cdf.last().unwrap(), 1.0);
        for w in cdf.windows(2) {
            assert!(w[0] <= w[1]);
        }
        for &v in cdf {
            assert!((0.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn sampling_is_proportional_to_power() {
        let lights = vec![fake(LightType::DELTA_POSITION, 3.0), fake(LightType::AREA, 1.0)];
        let distrib = PowerLightDistribution::new(&lights);

        let (_, idx, pdf) = distrib.sample(0.5).unwrap();
        assert_eq!(idx, 0);
        assert_eq!(pdf, 0.75);

        let (_, idx, pdf) = distrib.sample(0.9).unwrap();
        assert_eq!(idx, 1);
        assert_eq!(pdf, 0.25);
    }

    #[test]
    fn zero_power_light_is_never_sampled() {
        let lights = vec![
            fake(LightType::DELTA_POSITION, 1.0),
            fake(LightType::AREA, 0.0),
            fake(LightType::AREA, 1.0),
        ];
        let distrib = PowerLightDistribution::new(&lights);
        for i in 0..100 {
            let u = i as Float / 100.0;
            let (_, idx, pdf) = distrib.sample(u).unwrap();
            assert!(pdf > 0.0, "picked zero-power light at u={}", u);
            assert_ne!(idx, 1);
        }
    }

    #[test]
    fn all_zero_powers_pick_the_last_light() {
        let lights = vec![fake(LightType::DELTA_POSITION, 0.0), fake(LightType::AREA, 0.0)];
        let distrib = PowerLightDistribution::new(&lights);
        for i in 0..10 {
            let u = i as Float / 10.0;
            let (_, idx, pdf) = distrib.sample(u).unwrap();
            assert_eq!(idx, 1);
            assert_eq!(pdf, 1.0);
        }
    }

    #[test]
    fn empty_light_set_yields_none() {
        let distrib = PowerLightDistribution::new(&[]);
        assert!(distrib.is_empty());
        assert!(distrib.sample(0.5).is_none());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn cdf_well_formed_for_arbitrary_powers(powers in prop::collection::vec(0.0f32..1e6, 1..32)) {
                let lights: Vec<ArcLight> = powers.iter().map(|&p| fake(LightType::AREA, p)).collect();
                let distrib = PowerLightDistribution::new(&lights);
                let cdf = distrib.cdf();
                prop_assert_eq!(cdf.len(), powers.len());
                prop_assert_eq!(*cdf.last().unwrap(), 1.0);
                for w in cdf.windows(2) {
                    prop_assert!(w[0] <= w[1] + 1e-6);
                }
            }

            #[test]
            fn any_unit_sample_yields_valid_index(
                powers in prop::collection::vec(0.0f32..1e3, 1..16),
                u in 0.0f32..1.0,
            ) {
                let lights: Vec<ArcLight> = powers.iter().map(|&p| fake(LightType::AREA, p)).collect();
                let distrib = PowerLightDistribution::new(&lights);
                let (_, idx, _) = distrib.sample(u).unwrap();
                prop_assert!(idx < powers.len());
            }
        }
    }
}
