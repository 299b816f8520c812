//! Configured entry point running both tiling directions.

use std::path::Path;

use ndarray::{Array2, Array4, ArrayBase, Data, Ix3};
use tracing::debug;

use super::assembler::{PixelCast, assemble_patches_with_dims};
use super::grid::{GridDims, patch_dims};
use super::tiler::create_patches_with_policy;
use crate::core::{ConfigValidator, TileResult, TilingConfig};

/// Tiles sources and assembles predictions with a validated [`TilingConfig`].
///
/// # Example
///
/// ```
/// use matte_tile::core::TilingConfig;
/// use matte_tile::tiling::PatchTiler;
/// use ndarray::Array3;
///
/// let tiler = PatchTiler::new(TilingConfig::new(4))?;
/// let patches = tiler.create_patches(&Array3::<f32>::zeros((10, 10, 4)))?;
/// assert_eq!(patches.shape(), &[9, 4, 4, 4]);
/// # Ok::<(), matte_tile::core::TileError>(())
/// ```
#[derive(Debug, Clone)]
pub struct PatchTiler {
    config: TilingConfig,
}

impl PatchTiler {
    /// Creates a tiler after validating `config`.
    pub fn new(config: TilingConfig) -> TileResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Creates a tiler from a JSON configuration file.
    ///
    /// # Errors
    ///
    /// * [`TileError::Io`](crate::core::TileError::Io) if the file cannot be read
    /// * [`TileError::Config`](crate::core::TileError::Config) if it does not parse or validate
    pub fn from_config_file(path: impl AsRef<Path>) -> TileResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = TilingConfig::from_json_str(&json)?;
        debug!("Loaded tiling config from {}: {:?}", path.display(), config);
        Self::new(config)
    }

    /// The configuration in use.
    pub fn config(&self) -> &TilingConfig {
        &self.config
    }

    /// Patch edge length.
    pub fn patch_size(&self) -> usize {
        self.config.patch_size
    }

    /// Grid covering `extent = (height, width)`.
    pub fn grid_for(&self, extent: (usize, usize)) -> TileResult<GridDims> {
        patch_dims(extent, self.config.patch_size)
    }

    /// Splits `source` (H, W, 4) into patches; see [`create_patches`](super::create_patches).
    pub fn create_patches<S>(&self, source: &ArrayBase<S, Ix3>) -> TileResult<Array4<f32>>
    where
        S: Data<Elem = f32>,
    {
        create_patches_with_policy(source, self.config.patch_size, &self.config.parallel)
    }

    /// Reassembles predictions for an image of `mat_size`; see
    /// [`assemble_patches`](super::assemble_patches).
    pub fn assemble_patches<S, T>(
        &self,
        pred_patches: &ArrayBase<S, Ix3>,
        mat_size: (usize, usize),
    ) -> TileResult<Array2<u8>>
    where
        S: Data<Elem = T>,
        T: PixelCast + Sync,
    {
        let dims = self.grid_for(mat_size)?;
        assemble_patches_with_dims(
            pred_patches,
            dims,
            self.config.patch_size,
            &self.config.parallel,
        )
    }
}
