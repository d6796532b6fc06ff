//! Nav link behavior: smooth scrolling, scroll spy and the mobile menu.

/// Vertical extent of a section in page coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SectionBounds {
    pub top: f32,
    pub height: f32,
}

impl SectionBounds {
    pub fn new(top: f32, height: f32) -> Self {
        Self { top, height }
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }
}

const SNAP_DISTANCE: f32 = 0.5;

/// Eases the scroll position toward a target picked by a nav link.
#[derive(Debug, Clone)]
pub struct SmoothScroll {
    target: Option<f32>,
    easing: f32,
}

impl SmoothScroll {
    pub fn new(easing: f32) -> Self {
        Self {
            target: None,
            easing: easing.clamp(0.0, 1.0),
        }
    }

    pub fn target(&self) -> Option<f32> {
        self.target
    }

    pub fn is_scrolling(&self) -> bool {
        self.target.is_some()
    }

    /// Scrolls so the section lands just below the fixed navbar.
    pub fn scroll_to_section(&mut self, section: SectionBounds, navbar_offset: f32, max_scroll: f32) {
        let target = (section.top - navbar_offset).clamp(0.0, max_scroll.max(0.0));
        self.target = Some(target);
    }

    pub fn cancel(&mut self) {
        self.target = None;
    }

    /// Returns the scroll position to apply this frame, if a scroll is in progress.
    pub fn step(&mut self, current: f32) -> Option<f32> {
        let target = self.target?;
        let next = crate::math::easing::ease_toward(current, target, self.easing);

        if (target - next).abs() < SNAP_DISTANCE {
            self.target = None;
            return Some(target);
        }

        Some(next)
    }
}

/// The section whose link is highlighted: the last one whose span, moved up
/// by `offset`, contains the scroll position.
pub fn active_section(sections: &[SectionBounds], scroll_y: f32, offset: f32) -> Option<usize> {
    sections
        .iter()
        .enumerate()
        .filter(|(_, section)| {
            let top = section.top - offset;
            scroll_y >= top && scroll_y < top + section.height
        })
        .map(|(index, _)| index)
        .last()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MobileMenu {
    active: bool,
}

impl MobileMenu {
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn toggle(&mut self) {
        self.active = !self.active;
    }

    pub fn close(&mut self) {
        self.active = false;
    }
}

pub fn is_mobile_layout(width: f32, breakpoint: f32) -> bool {
    width < breakpoint
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sections() -> Vec<SectionBounds> {
        vec![
            SectionBounds::new(0.0, 600.0),
            SectionBounds::new(600.0, 400.0),
            SectionBounds::new(1000.0, 800.0),
        ]
    }

    #[test]
    fn scroll_target_leaves_room_for_navbar() {
        let mut scroll = SmoothScroll::new(0.15);
        scroll.scroll_to_section(SectionBounds::new(600.0, 400.0), 70.0, 5000.0);
        assert_eq!(scroll.target(), Some(530.0));
    }

    #[test]
    fn scroll_target_is_clamped_to_page() {
        let mut scroll = SmoothScroll::new(0.15);

        scroll.scroll_to_section(SectionBounds::new(20.0, 400.0), 70.0, 5000.0);
        assert_eq!(scroll.target(), Some(0.0));

        scroll.scroll_to_section(SectionBounds::new(9000.0, 400.0), 70.0, 5000.0);
        assert_eq!(scroll.target(), Some(5000.0));
    }

    #[test]
    fn smooth_scroll_converges_and_snaps() {
        let mut scroll = SmoothScroll::new(0.15);
        scroll.scroll_to_section(SectionBounds::new(1000.0, 800.0), 70.0, 5000.0);

        let mut position = 0.0;
        let mut frames = 0;
        while let Some(next) = scroll.step(position) {
            assert!(next >= position);
            position = next;
            frames += 1;
            assert!(frames < 500, "scroll never settled");
        }

        assert_eq!(position, 930.0);
        assert!(!scroll.is_scrolling());
    }

    #[test]
    fn idle_scroll_does_nothing() {
        let mut scroll = SmoothScroll::new(0.15);
        assert_eq!(scroll.step(123.0), None);
    }

    #[test]
    fn active_section_is_last_one_scrolled_past() {
        let sections = sections();

        assert_eq!(active_section(&sections, 0.0, 100.0), Some(0));
        assert_eq!(active_section(&sections, 499.0, 100.0), Some(0));
        assert_eq!(active_section(&sections, 500.0, 100.0), Some(1));
        assert_eq!(active_section(&sections, 950.0, 100.0), Some(2));
    }

    #[test]
    fn no_active_section_above_the_first() {
        let sections = [SectionBounds::new(300.0, 100.0)];
        assert_eq!(active_section(&sections, 0.0, 100.0), None);
        assert_eq!(active_section(&[], 0.0, 100.0), None);
    }

    #[test]
    fn no_active_section_past_the_last() {
        let sections = sections();
        assert_eq!(active_section(&sections, 1699.0, 100.0), Some(2));
        assert_eq!(active_section(&sections, 1700.0, 100.0), None);
    }

    #[test]
    fn menu_toggles_and_closes() {
        let mut menu = MobileMenu::default();
        assert!(!menu.is_active());

        menu.toggle();
        assert!(menu.is_active());

        menu.toggle();
        assert!(!menu.is_active());

        menu.toggle();
        menu.close();
        assert!(!menu.is_active());

        menu.close();
        assert!(!menu.is_active());
    }

    #[test]
    fn mobile_layout_below_breakpoint() {
        assert!(is_mobile_layout(767.0, 768.0));
        assert!(!is_mobile_layout(768.0, 768.0));
    }
}
