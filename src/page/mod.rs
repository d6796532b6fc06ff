//! Page interactivity: everything the overlay needs to remember between frames.

pub mod content;
pub mod counter;
pub mod navigation;
pub mod reveal;
pub mod timer;
pub mod typewriter;
pub mod ui;

use std::time::Duration;

use crate::config::PageConfig;

use self::{
    content::{SectionContent, SectionKind, HERO_TITLE, SECTIONS, STATS},
    counter::Counter,
    navigation::{active_section, MobileMenu, SectionBounds, SmoothScroll},
    reveal::{visible_ratio, Reveal, Viewport},
    typewriter::Typewriter,
};

const BODY_FADE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct Section {
    pub content: SectionContent,
    pub bounds: SectionBounds,
    pub reveal: Reveal,
}

pub struct Page {
    config: PageConfig,
    pub sections: Vec<Section>,
    pub counters: Vec<Counter>,
    pub menu: MobileMenu,
    pub typewriter: Typewriter,
    stats_bounds: SectionBounds,
    stats_reveal: Reveal,
    scroll: SmoothScroll,
    active_section: Option<usize>,
    loaded_at: Duration,
}

impl Page {
    pub fn new(config: PageConfig, now: Duration) -> Self {
        let sections = SECTIONS
            .iter()
            .map(|&content| Section {
                content,
                bounds: SectionBounds::default(),
                reveal: Reveal::default(),
            })
            .collect();

        let counters = STATS
            .iter()
            .map(|&(label, text)| Counter::new(label, text, config.counter_suffix))
            .collect();

        let typewriter = Typewriter::new(
            HERO_TITLE,
            now,
            Duration::from_millis(config.typewriter_delay_ms),
            Duration::from_millis(config.typewriter_char_ms),
        );

        Self {
            scroll: SmoothScroll::new(config.scroll_easing),
            config,
            sections,
            counters,
            menu: MobileMenu::default(),
            typewriter,
            stats_bounds: SectionBounds::default(),
            stats_reveal: Reveal::default(),
            active_section: None,
            loaded_at: now,
        }
    }

    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    pub fn active_section(&self) -> Option<usize> {
        self.active_section
    }

    pub fn section_index(&self, kind: SectionKind) -> Option<usize> {
        self.sections
            .iter()
            .position(|section| section.content.kind == kind)
    }

    /// Starts a smooth scroll to the section and closes the mobile menu.
    pub fn navigate_to(&mut self, index: usize, max_scroll: f32) {
        let Some(section) = self.sections.get(index) else {
            log::warn!("No section at index {index}");
            return;
        };

        self.scroll
            .scroll_to_section(section.bounds, self.config.navbar_offset, max_scroll);
        self.menu.close();
    }

    pub fn is_scrolling(&self) -> bool {
        self.scroll.is_scrolling()
    }

    /// Scroll position to apply this frame while a nav scroll is running.
    pub fn scroll_step(&mut self, current: f32) -> Option<f32> {
        self.scroll.step(current)
    }

    pub fn set_section_bounds(&mut self, index: usize, bounds: SectionBounds) {
        if let Some(section) = self.sections.get_mut(index) {
            section.bounds = bounds;
        }
    }

    pub fn set_stats_bounds(&mut self, bounds: SectionBounds) {
        self.stats_bounds = bounds;
    }

    /// Runs scroll spy, reveal checks and timed animations against the
    /// layout measured this frame.
    pub fn advance(&mut self, now: Duration, viewport: Viewport) {
        let bounds = self
            .sections
            .iter()
            .map(|section| section.bounds)
            .collect::<Vec<_>>();
        self.active_section =
            active_section(&bounds, viewport.scroll_y, self.config.active_link_offset);

        let reveal_viewport = viewport.shrink_bottom(self.config.reveal_bottom_margin);
        for section in &mut self.sections {
            let ratio = visible_ratio(section.bounds, reveal_viewport);
            if section.reveal.observe(ratio, self.config.reveal_threshold, now) {
                log::debug!("Revealed section {}", section.content.title);
            }
        }

        let stats_ratio = visible_ratio(self.stats_bounds, viewport);
        if self
            .stats_reveal
            .observe(stats_ratio, self.config.stats_threshold, now)
        {
            let duration = Duration::from_millis(self.config.counter_duration_ms);
            let tick = Duration::from_millis(self.config.counter_tick_ms);

            for counter in &mut self.counters {
                counter.start(now, duration, tick);
            }
        }

        for counter in self.counters.iter_mut().filter(|counter| counter.is_running()) {
            counter.advance(now);
        }

        if !self.typewriter.is_done() {
            self.typewriter.advance(now);
        }
    }

    pub fn section_opacity(&self, index: usize, now: Duration) -> f32 {
        let fade = Duration::from_secs_f32(self.config.fade_in_secs.max(0.0));

        self.sections
            .get(index)
            .map_or(1.0, |section| section.reveal.opacity(now, fade))
    }

    /// Opacity of the whole page while it fades in after startup.
    pub fn body_opacity(&self, now: Duration) -> f32 {
        let elapsed = now.saturating_sub(self.loaded_at);
        (elapsed.as_secs_f32() / BODY_FADE.as_secs_f32()).clamp(0.0, 1.0)
    }
}
