//! Direct lighting helpers shared by integrators.

use crate::geometry::*;
use crate::interaction::SurfaceInteraction;
use crate::light::*;
use crate::light_distrib::PowerLightDistribution;
use crate::pbrt::*;
use crate::reflection::*;
use crate::rng::RNG;
use crate::sampling::power_heuristic;
use crate::scene::Scene;
use crate::spectrum::Spectrum;
use std::sync::Arc;

/// Samples one light chosen proportional to power and returns its direct
/// lighting contribution, divided by the light's selection probability to
/// keep the estimate unbiased.
///
/// * `si`            - The surface interaction being shaded.
/// * `scene`         - The scene.
/// * `light_distrib` - Power-proportional distribution over the lights.
/// * `rng`           - Random number generator.
pub fn uniform_sample_one_light(
    si: &SurfaceInteraction,
    scene: &Scene,
    light_distrib: &PowerLightDistribution,
    rng: &mut RNG,
) -> Spectrum {
    let (light, _, light_pdf) = match light_distrib.sample(rng.uniform_float()) {
        Some(sampled) => sampled,
        None => return Spectrum::ZERO,
    };
    if light_pdf == 0.0 {
        return Spectrum::ZERO;
    }

    let u_light = Point2f::new(rng.uniform_float(), rng.uniform_float());
    let u_scattering = Point2f::new(rng.uniform_float(), rng.uniform_float());
    estimate_direct(si, &u_scattering, light, &u_light, scene) / light_pdf
}

/// Computes a direct lighting estimate for a single light by applying
/// multiple importance sampling over the light- and BSDF-sampling
/// strategies. Perfectly specular lobes are excluded.
///
/// * `si`           - The surface interaction being shaded.
/// * `u_scattering` - Scattering sample.
/// * `light`        - The light.
/// * `u_light`      - Light sample.
/// * `scene`        - The scene.
pub fn estimate_direct(
    si: &SurfaceInteraction,
    u_scattering: &Point2f,
    light: ArcLight,
    u_light: &Point2f,
    scene: &Scene,
) -> Spectrum {
    let bsdf = match si.bsdf.as_ref() {
        Some(bsdf) => bsdf,
        None => return Spectrum::ZERO,
    };
    let bsdf_flags = BxDFType::from(BSDF_ALL & !BSDF_SPECULAR);
    let mut ld = Spectrum::ZERO;
    let hit = &si.hit;

    // Sample the light source with multiple importance sampling.
    let Li {
        wi,
        pdf: light_pdf,
        visibility,
        value: mut li,
    } = light.sample_li(hit, u_light);
    if light_pdf > 0.0 && !li.is_black() {
        // Evaluate BSDF for the light sampling strategy.
        let f = bsdf.f(&hit.wo, &wi, bsdf_flags) * wi.abs_dot(&si.shading.n);
        let scattering_pdf = bsdf.pdf(&hit.wo, &wi, bsdf_flags);

        if !f.is_black() {
            // Compute the effect of visibility for the light source sample.
            if let Some(vis) = visibility {
                if !vis.unoccluded(scene) {
                    li = Spectrum::ZERO;
                }
            }

            // Add the light's contribution to the reflected radiance.
            if !li.is_black() {
                if light.is_delta_light() {
                    ld += f * li / light_pdf;
                } else {
                    let weight = power_heuristic(1, light_pdf, 1, scattering_pdf);
                    ld += f * li * weight / light_pdf;
                }
            }
        }
    }

    // Sample the BSDF with multiple importance sampling.
    if !light.is_delta_light() {
        let sample = bsdf.sample_f(&hit.wo, u_scattering, bsdf_flags);
        let f = sample.f * sample.wi.abs_dot(&si.shading.n);
        let scattering_pdf = sample.pdf;

        if !f.is_black() && scattering_pdf > 0.0 {
            // Account for light contributions along the sampled direction.
            let light_pdf = light.pdf_li(hit, &sample.wi);
            if light_pdf == 0.0 {
                return ld;
            }
            let weight = power_heuristic(1, scattering_pdf, 1, light_pdf);

            let mut ray = hit.spawn_ray(&sample.wi);
            let li = match scene.intersect(&mut ray) {
                Some(light_si) => {
                    // Only count emission if the sampled direction actually
                    // hit this light's geometry.
                    let hit_this_light = light_si
                        .primitive
                        .as_ref()
                        .and_then(|p| p.get_area_light())
                        .map(|area_light| Arc::ptr_eq(&area_light, &light))
                        .unwrap_or(false);
                    if hit_this_light {
                        light_si.le(&(-sample.wi))
                    } else {
                        Spectrum::ZERO
                    }
                }
                None => light.le(&ray),
            };

            if !li.is_black() {
                ld += f * li * weight / scattering_pdf;
            }
        }
    }

    ld
}
