use std::time::Duration;

use crate::page::navigation::SectionBounds;

/// Part of the page a section can be seen through.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub scroll_y: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(scroll_y: f32, height: f32) -> Self {
        Self { scroll_y, height }
    }

    /// Pulls the bottom edge up by `margin`.
    pub fn shrink_bottom(self, margin: f32) -> Self {
        Self {
            scroll_y: self.scroll_y,
            height: (self.height - margin).max(0.0),
        }
    }

    pub fn bottom(&self) -> f32 {
        self.scroll_y + self.height
    }
}

/// Fraction of `section` inside `viewport`, from 0 to 1.
pub fn visible_ratio(section: SectionBounds, viewport: Viewport) -> f32 {
    if section.height <= 0.0 {
        let inside = section.top >= viewport.scroll_y && section.top <= viewport.bottom();
        return if inside { 1.0 } else { 0.0 };
    }

    let visible_top = section.top.max(viewport.scroll_y);
    let visible_bottom = section.bottom().min(viewport.bottom());

    ((visible_bottom - visible_top) / section.height).clamp(0.0, 1.0)
}

/// Latches the first time a target crosses its visibility threshold.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reveal {
    revealed_at: Option<Duration>,
}

impl Reveal {
    pub fn is_revealed(&self) -> bool {
        self.revealed_at.is_some()
    }

    /// Returns true only on the observation that reveals the target.
    pub fn observe(&mut self, ratio: f32, threshold: f32, now: Duration) -> bool {
        if self.is_revealed() || ratio <= 0.0 || ratio < threshold {
            return false;
        }

        self.revealed_at = Some(now);
        true
    }

    /// Opacity of the fade-in, 0 until revealed.
    pub fn opacity(&self, now: Duration, fade: Duration) -> f32 {
        let Some(revealed_at) = self.revealed_at else {
            return 0.0;
        };

        if fade.is_zero() {
            return 1.0;
        }

        let elapsed = now.saturating_sub(revealed_at);
        (elapsed.as_secs_f32() / fade.as_secs_f32()).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn ratio_of_partially_visible_section() {
        let section = SectionBounds::new(900.0, 400.0);
        let viewport = Viewport::new(0.0, 1000.0);

        assert!((visible_ratio(section, viewport) - 0.25).abs() < 1e-6);
        assert_eq!(visible_ratio(section, Viewport::new(900.0, 1000.0)), 1.0);
        assert_eq!(visible_ratio(section, Viewport::new(2000.0, 1000.0)), 0.0);
    }

    #[test]
    fn bottom_margin_delays_reveal() {
        let section = SectionBounds::new(960.0, 400.0);
        let viewport = Viewport::new(0.0, 1000.0);

        // 40 px of 400 is exactly 10%
        assert!((visible_ratio(section, viewport) - 0.1).abs() < 1e-6);
        assert_eq!(visible_ratio(section, viewport.shrink_bottom(50.0)), 0.0);
    }

    #[test]
    fn reveal_latches_once() {
        let mut reveal = Reveal::default();

        assert!(!reveal.observe(0.05, 0.1, ms(0)));
        assert!(!reveal.is_revealed());

        assert!(reveal.observe(0.1, 0.1, ms(100)));
        assert!(reveal.is_revealed());

        // Scrolling away never hides it again
        assert!(!reveal.observe(0.0, 0.1, ms(200)));
        assert!(reveal.is_revealed());
    }

    #[test]
    fn zero_threshold_needs_some_overlap() {
        let mut reveal = Reveal::default();
        assert!(!reveal.observe(0.0, 0.0, ms(0)));
        assert!(reveal.observe(0.01, 0.0, ms(0)));
    }

    #[test]
    fn fades_in_over_duration() {
        let mut reveal = Reveal::default();
        let fade = ms(600);
        assert_eq!(reveal.opacity(ms(1000), fade), 0.0);

        reveal.observe(1.0, 0.1, ms(1000));
        assert_eq!(reveal.opacity(ms(1000), fade), 0.0);
        assert!((reveal.opacity(ms(1300), fade) - 0.5).abs() < 1e-6);
        assert_eq!(reveal.opacity(ms(5000), fade), 1.0);
    }
}
