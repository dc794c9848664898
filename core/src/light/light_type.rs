//! Light Type

use bitflags::bitflags;

bitflags! {
    /// Categories of lights; resolved once when the scene is assembled.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct LightType: u8 {
        /// Light at a single point in space.
        const DELTA_POSITION = 1;

        /// Light radiating from a single direction.
        const DELTA_DIRECTION = 2;

        /// Light emitted from a surface.
        const AREA = 4;

        /// Light at infinity surrounding the scene.
        const INFINITE = 8;
    }
}

impl LightType {
    /// Returns true if the light type is a delta distribution in position or
    /// direction.
    pub fn is_delta(&self) -> bool {
        self.intersects(LightType::DELTA_POSITION | LightType::DELTA_DIRECTION)
    }
}
