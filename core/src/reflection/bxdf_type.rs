//! BxDF Type

/// Types of BSDF models.
pub const BSDF_NONE: u8 = 0b00000000;
pub const BSDF_REFLECTION: u8 = 0b00000001;
pub const BSDF_TRANSMISSION: u8 = 0b00000010;
pub const BSDF_DIFFUSE: u8 = 0b00000100;
pub const BSDF_GLOSSY: u8 = 0b00001000;
pub const BSDF_SPECULAR: u8 = 0b00010000;
pub const BSDF_ALL: u8 = 0b00011111;

/// Stores combinations of reflection models.
#[repr(C)]
#[derive(Copy, Clone, Default, Debug)]
pub struct BxDFType {
    t: u8,
}

impl BxDFType {
    /// Tests type flags and returns whether any of them is set.
    ///
    /// * `flag` - Combination of `BSDF_*` flags.
    pub fn matches(&self, flag: u8) -> bool {
        self.t & flag > 0
    }
}

impl PartialEq for BxDFType {
    /// Returns true if this reflection model is contained in the other.
    ///
    /// * `other` - The reflection model to compare.
    fn eq(&self, other: &Self) -> bool {
        self.t & other.t == self.t
    }
}

impl From<u8> for BxDFType {
    /// Convert a `u8` value to `BxDFType`.
    ///
    /// * `t` - A `u8` value containing a combination of `BSDF_*` flags.
    fn from(t: u8) -> Self {
        assert!(t <= BSDF_ALL, "Invalid BxDF flags {}=({:#08b})", t, t);
        Self { t }
    }
}
