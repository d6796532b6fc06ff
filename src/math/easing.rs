use glam::Vec2;

/// One step of exponential smoothing: `current + (target - current) * factor`.
pub fn ease_toward(current: f32, target: f32, factor: f32) -> f32 {
    current + (target - current) * factor
}

pub fn ease_toward_vec2(current: Vec2, target: Vec2, factor: f32) -> Vec2 {
    current + (target - current) * factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approaches_target_monotonically() {
        let target: f32 = 0.5;
        let mut position: f32 = -3.0;
        let mut distance = (target - position).abs();

        for _ in 0..400 {
            position = ease_toward(position, target, 0.05);
            let next_distance = (target - position).abs();
            assert!(next_distance <= distance);
            distance = next_distance;
        }

        assert!(distance < 1e-4, "did not converge: {distance}");
    }

    #[test]
    fn never_overshoots() {
        let mut position = Vec2::new(1.0, -1.0);
        let target = Vec2::new(-0.25, 0.5);

        for _ in 0..100 {
            position = ease_toward_vec2(position, target, 0.05);
            assert!(position.x >= target.x);
            assert!(position.y <= target.y);
        }
    }
}
