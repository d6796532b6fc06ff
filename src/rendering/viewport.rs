use glam::{Mat4, Vec4};

use crate::page::ui::Rect;

/// Rectangle in physical pixels, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl PixelRect {
    pub fn from_logical(rect: Rect, scale_factor: f32) -> Self {
        Self {
            x: rect.min.x * scale_factor,
            y: rect.min.y * scale_factor,
            width: rect.size.x * scale_factor,
            height: rect.size.y * scale_factor,
        }
    }

    /// The whole-pixel part of this rect that lies on a `width x height`
    /// target, or `None` if nothing does.
    pub fn clip_to(&self, width: u32, height: u32) -> Option<PixelRect> {
        let left = self.x.max(0.0).floor();
        let top = self.y.max(0.0).floor();
        let right = (self.x + self.width).min(width as f32).ceil();
        let bottom = (self.y + self.height).min(height as f32).ceil();

        if right <= left || bottom <= top {
            return None;
        }

        Some(PixelRect {
            x: left,
            y: top,
            width: right - left,
            height: bottom - top,
        })
    }
}

/// Maps clip space of a projection made for `full` onto the `visible` part of
/// it, so that drawing into `visible` shows exactly that slice of the image.
pub fn crop_matrix(full: PixelRect, visible: PixelRect) -> Mat4 {
    let scale_x = full.width / visible.width;
    let scale_y = full.height / visible.height;
    let offset_x = (2.0 * (full.x - visible.x) + full.width) / visible.width - 1.0;
    let offset_y = 1.0 - (2.0 * (full.y - visible.y) + full.height) / visible.height;

    Mat4::from_cols(
        Vec4::new(scale_x, 0.0, 0.0, 0.0),
        Vec4::new(0.0, scale_y, 0.0, 0.0),
        Vec4::Z,
        Vec4::new(offset_x, offset_y, 0.0, 1.0),
    )
}

#[cfg(test)]
mod tests {
    use glam::{Vec2, Vec3};

    use super::*;

    fn rect(x: f32, y: f32, width: f32, height: f32) -> PixelRect {
        PixelRect {
            x,
            y,
            width,
            height,
        }
    }

    /// Pixel position of an NDC point drawn into `viewport`.
    fn to_pixels(ndc: Vec3, viewport: PixelRect) -> Vec2 {
        Vec2::new(
            viewport.x + (ndc.x + 1.0) * 0.5 * viewport.width,
            viewport.y + (1.0 - ndc.y) * 0.5 * viewport.height,
        )
    }

    #[test]
    fn logical_rect_scales_to_physical() {
        let logical = Rect {
            min: Vec2::new(10.0, 20.0),
            size: Vec2::new(300.0, 200.0),
        };
        assert_eq!(PixelRect::from_logical(logical, 2.0), rect(20.0, 40.0, 600.0, 400.0));
    }

    #[test]
    fn clipping_keeps_the_on_screen_part() {
        let container = rect(100.0, -150.0, 400.0, 300.0);

        assert_eq!(container.clip_to(800, 600), Some(rect(100.0, 0.0, 400.0, 150.0)));
        assert_eq!(rect(0.0, 700.0, 100.0, 100.0).clip_to(800, 600), None);
    }

    #[test]
    fn crop_of_unclipped_rect_is_identity() {
        let full = rect(50.0, 60.0, 400.0, 300.0);
        assert!(crop_matrix(full, full).abs_diff_eq(Mat4::IDENTITY, 1e-6));
    }

    #[test]
    fn cropped_points_land_on_the_same_pixels() {
        let full = rect(100.0, -150.0, 400.0, 300.0);
        let visible = full.clip_to(800, 600).unwrap();
        let crop = crop_matrix(full, visible);

        for ndc in [Vec3::new(0.0, 0.0, 0.5), Vec3::new(0.5, -0.75, 0.2), Vec3::new(-1.0, -1.0, 0.0)] {
            let expected = to_pixels(ndc, full);
            let cropped = crop.project_point3(ndc);
            let actual = to_pixels(cropped, visible);

            assert!(actual.abs_diff_eq(expected, 1e-3), "{actual} != {expected}");
        }
    }
}
