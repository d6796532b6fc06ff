use glam::Vec3;

/// Decodes a `0xRRGGBB` sRGB hex color into linear RGB.
pub fn linear_from_hex(hex: u32) -> Vec3 {
    let r = ((hex >> 16) & 0xff) as f32 / 255.0;
    let g = ((hex >> 8) & 0xff) as f32 / 255.0;
    let b = (hex & 0xff) as f32 / 255.0;

    Vec3::new(srgb_to_linear(r), srgb_to_linear(g), srgb_to_linear(b))
}

pub fn srgb_to_linear(c: f32) -> f32 {
    if c < 0.04045 {
        c * 0.0773993808
    } else {
        (c * 0.9478672986 + 0.0521327014).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_extremes() {
        assert_eq!(linear_from_hex(0x000000), Vec3::ZERO);
        assert!(linear_from_hex(0xffffff).abs_diff_eq(Vec3::ONE, 1e-5));
    }

    #[test]
    fn channels_are_in_order() {
        let color = linear_from_hex(0xff0056);
        assert!((color.x - 1.0).abs() < 1e-5);
        assert_eq!(color.y, 0.0);
        assert!(color.z > 0.0 && color.z < 0.2);
    }
}
