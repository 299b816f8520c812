//! Constants shared across the tiling engine and the matting losses.

/// Number of channels in a tiling source array: R, G, B and the trimap.
pub const SOURCE_CHANNELS: usize = 4;

/// Default patch edge length, matching the network input size.
pub const DEFAULT_PATCH_SIZE: usize = 320;

/// Default (height, width) a crop is resized to.
pub const DEFAULT_CROP_SIZE: (usize, usize) = (320, 320);

/// Trimap value marking the unknown region.
pub const UNKNOWN_CODE: u8 = 128;

/// Smoothing term of the Charbonnier-style losses.
pub const EPSILON: f32 = 1e-6;

/// Default weight of the alpha prediction loss in the overall loss.
pub const DEFAULT_ALPHA_WEIGHT: f32 = 0.5;

/// SAD is reported in thousands.
pub const SAD_SCALE: f32 = 1000.0;

/// Work item count at or below which operations run sequentially.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 4;

/// Channel layout of ground-truth loss tensors: `[alpha, mask, image(3), fg(3), bg(3)]`.
pub mod gt_channels {
    /// Ground-truth alpha.
    pub const ALPHA: usize = 0;
    /// Loss mask (unknown region).
    pub const MASK: usize = 1;
    /// First channel of the composited RGB image.
    pub const IMAGE: usize = 2;
    /// First channel of the RGB foreground.
    pub const FOREGROUND: usize = 5;
    /// First channel of the RGB background.
    pub const BACKGROUND: usize = 8;
    /// Total channel count needed by the compositional loss.
    pub const COUNT: usize = 11;
}
