//! Pixel recoloring transforms
//!
//! Pure functions over tightly packed RGBA8 buffers, applied after decode
//! and before texture upload. No backend involvement, trivially testable.

/// Recolor every visible pixel to opaque white.
///
/// Pixels with zero alpha become fully transparent (all channels zeroed);
/// every other pixel becomes `(255, 255, 255, 255)`. This is how "flash"
/// sprite variants are produced from the regular art without a second
/// asset on disk.
pub fn recolor_to_white(pixels: &mut [u8]) {
    debug_assert!(pixels.len() % 4 == 0, "RGBA8 buffer length must be a multiple of 4");
    for pixel in pixels.chunks_exact_mut(4) {
        if pixel[3] == 0 {
            pixel.copy_from_slice(&[0, 0, 0, 0]);
        } else {
            pixel.copy_from_slice(&[255, 255, 255, 255]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_pixels_become_opaque_white() {
        let mut pixels = vec![
            10, 20, 30, 255, // opaque color
            1, 2, 3, 1, // barely visible still counts
            200, 100, 50, 128, // semi-transparent
        ];
        recolor_to_white(&mut pixels);
        assert_eq!(
            pixels,
            vec![255, 255, 255, 255, 255, 255, 255, 255, 255, 255, 255, 255]
        );
    }

    #[test]
    fn test_transparent_pixels_stay_transparent() {
        let mut pixels = vec![90, 80, 70, 0, 255, 255, 255, 0];
        recolor_to_white(&mut pixels);
        assert_eq!(pixels, vec![0, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_empty_buffer_is_fine() {
        let mut pixels: Vec<u8> = Vec::new();
        recolor_to_white(&mut pixels);
        assert!(pixels.is_empty());
    }
}
