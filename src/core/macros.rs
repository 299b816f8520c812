//! Macros for the tiling engine.
//!
//! This module provides utility macros to reduce repetition in precondition checks
//! and in the numeric conversion impls.

/// Returns a [`TileError::ShapeMismatch`](crate::core::TileError::ShapeMismatch)
/// from the enclosing function when `$cond` does not hold.
///
/// # Usage
///
/// ```rust,no_run
/// // ensure_shape!(source.ndim() == 3, "create_patches", "(H, W, 4)", source.shape());
/// ```
#[doc(hidden)]
#[macro_export]
macro_rules! ensure_shape {
    ($cond:expr, $operation:expr, $expected:expr, $actual:expr) => {
        if !$cond {
            return Err($crate::core::TileError::shape_mismatch(
                $operation, $expected, $actual,
            ));
        }
    };
}

/// Implements [`PixelCast`](crate::tiling::PixelCast) for primitive numeric types
/// using `as` conversion.
#[doc(hidden)]
#[macro_export]
macro_rules! impl_pixel_cast {
    ($($ty:ty),* $(,)?) => {
        $(
            impl $crate::tiling::PixelCast for $ty {
                #[inline]
                fn to_u8(self) -> u8 {
                    self as u8
                }
            }
        )*
    };
}
