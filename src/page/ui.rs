use std::time::Duration;

use glam::Vec2;
use imgui::{Condition, StyleColor, StyleVar, WindowFlags};

use crate::page::{
    content::{self, SectionKind, PROJECTS},
    navigation::{is_mobile_layout, SectionBounds},
    reveal::Viewport,
    Page,
};

const ACCENT: [f32; 4] = [1.0, 0.0, 0.337, 1.0];
const MUTED: [f32; 4] = [0.72, 0.72, 0.78, 1.0];
const CARD_BACKGROUND: [f32; 4] = [0.1, 0.1, 0.14, 0.85];
const CONTAINER_BORDER: [f32; 4] = [1.0, 1.0, 1.0, 0.15];

const SECTION_SPACING: f32 = 96.0;
const CARD_WIDTH: f32 = 560.0;
const CARD_HEIGHT: f32 = 96.0;
const CARD_LIFT: f32 = 10.0;
const CARD_HOVER_SCALE: f32 = 1.02;
const CARD_PADDING: [f32; 2] = [16.0, 12.0];
const MODEL_CONTAINER_HEIGHT: f32 = 420.0;

/// Rectangle in logical pixels, relative to the window.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub size: Vec2,
}

/// What the page layout hands back to the renderer each frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageFrame {
    pub model_container: Option<Rect>,
    /// Pointer movement while the model container is being dragged.
    pub orbit_drag: Vec2,
}

/// Lays out the page for this frame and runs its animations.
pub fn draw_page(ui: &imgui::Ui, page: &mut Page, now: Duration, show_loading: bool) -> PageFrame {
    let [width, height] = ui.io().display_size;
    let navbar_height = page.config().navbar_offset;
    let body_alpha = page.body_opacity(now);
    let _body_fade = ui.push_style_var(StyleVar::Alpha(body_alpha));

    let mut frame = PageFrame::default();
    let mut max_scroll = 0.0;

    // The content scrolls underneath the fixed navbar, like a fixed header on a web page
    ui.window("##page")
        .position([0.0, 0.0], Condition::Always)
        .size([width, height], Condition::Always)
        .flags(
            WindowFlags::NO_TITLE_BAR
                | WindowFlags::NO_RESIZE
                | WindowFlags::NO_MOVE
                | WindowFlags::NO_COLLAPSE
                | WindowFlags::NO_SAVED_SETTINGS
                | WindowFlags::NO_BACKGROUND
                | WindowFlags::NO_BRING_TO_FRONT_ON_FOCUS,
        )
        .build(|| {
            if let Some(scroll_y) = page.scroll_step(ui.scroll_y()) {
                ui.set_scroll_y(scroll_y);
            }

            let scroll_y = ui.scroll_y();
            max_scroll = ui.scroll_max_y();

            for index in 0..page.sections.len() {
                let top = ui.cursor_pos()[1];
                let alpha = body_alpha * page.section_opacity(index, now);
                let kind = page.sections[index].content.kind;

                {
                    let _section_fade = ui.push_style_var(StyleVar::Alpha(alpha));

                    match kind {
                        SectionKind::Hero => draw_hero(ui, page, navbar_height, max_scroll),
                        SectionKind::About => draw_about(ui, page),
                        SectionKind::Projects => draw_projects(ui),
                        SectionKind::Model => {
                            frame = draw_model_container(ui, show_loading);
                        }
                        SectionKind::Contact => draw_contact(ui),
                    }

                    ui.dummy([0.0, SECTION_SPACING]);
                }

                let bottom = ui.cursor_pos()[1];
                page.set_section_bounds(index, SectionBounds::new(top, bottom - top));
            }

            page.advance(now, Viewport::new(scroll_y, height));
        });

    let mobile = is_mobile_layout(width, page.config().mobile_breakpoint);

    ui.window("##navbar")
        .position([0.0, 0.0], Condition::Always)
        .size([width, navbar_height], Condition::Always)
        .bg_alpha(0.9)
        .flags(
            WindowFlags::NO_TITLE_BAR
                | WindowFlags::NO_RESIZE
                | WindowFlags::NO_MOVE
                | WindowFlags::NO_COLLAPSE
                | WindowFlags::NO_SCROLLBAR
                | WindowFlags::NO_SAVED_SETTINGS,
        )
        .build(|| {
            ui.set_window_font_scale(1.4);
            ui.text_colored(ACCENT, content::BRAND);
            ui.set_window_font_scale(1.0);

            if mobile {
                ui.same_line_with_pos(width - 72.0);
                if ui.button("Menu") {
                    page.menu.toggle();
                }
            } else {
                draw_nav_links(ui, page, true, max_scroll);
            }
        });

    if mobile && page.menu.is_active() {
        ui.window("##menu")
            .position([0.0, navbar_height], Condition::Always)
            .size([width, 0.0], Condition::Always)
            .bg_alpha(0.95)
            .flags(
                WindowFlags::NO_TITLE_BAR
                    | WindowFlags::NO_RESIZE
                    | WindowFlags::NO_MOVE
                    | WindowFlags::NO_COLLAPSE
                    | WindowFlags::NO_SAVED_SETTINGS,
            )
            .build(|| draw_nav_links(ui, page, false, max_scroll));
    }

    frame
}

fn draw_nav_links(ui: &imgui::Ui, page: &mut Page, horizontal: bool, max_scroll: f32) {
    let mut clicked = None;

    for (index, section) in page.sections.iter().enumerate() {
        if horizontal {
            ui.same_line();
        }

        let _active_color = (page.active_section() == Some(index))
            .then(|| ui.push_style_color(StyleColor::Text, ACCENT));

        if ui.button(section.content.title) {
            clicked = Some(index);
        }
    }

    if let Some(index) = clicked {
        page.navigate_to(index, max_scroll);
    }
}

fn draw_hero(ui: &imgui::Ui, page: &mut Page, navbar_height: f32, max_scroll: f32) {
    ui.dummy([0.0, navbar_height + 80.0]);

    // Keep the line height while the title is still empty
    ui.set_window_font_scale(2.2);
    ui.text_colored(ACCENT, format!("{} ", page.typewriter.text()));
    ui.set_window_font_scale(1.0);

    ui.text_colored(MUTED, content::HERO_SUBTITLE);
    ui.dummy([0.0, 16.0]);

    if ui.button("View my work") {
        if let Some(projects) = page.section_index(SectionKind::Projects) {
            page.navigate_to(projects, max_scroll);
        }
    }
}

fn draw_heading(ui: &imgui::Ui, title: &str) {
    ui.set_window_font_scale(1.6);
    ui.text(title);
    ui.set_window_font_scale(1.0);
    ui.separator();
}

fn draw_about(ui: &imgui::Ui, page: &mut Page) {
    draw_heading(ui, "About me");
    ui.text_wrapped(content::ABOUT_TEXT);
    ui.dummy([0.0, 24.0]);

    let stats_top = ui.cursor_pos()[1];
    let column_width = 200.0;
    let left = ui.cursor_pos()[0];

    for (index, counter) in page.counters.iter().enumerate() {
        if index > 0 {
            ui.same_line_with_pos(left + index as f32 * column_width);
        }

        ui.group(|| {
            ui.set_window_font_scale(2.0);
            ui.text_colored(ACCENT, counter.text());
            ui.set_window_font_scale(1.0);
            ui.text_colored(MUTED, counter.label);
        });
    }

    let stats_bottom = ui.cursor_pos()[1];
    page.set_stats_bounds(SectionBounds::new(stats_top, stats_bottom - stats_top));
}

fn draw_projects(ui: &imgui::Ui) {
    draw_heading(ui, "Projects");
    ui.dummy([0.0, 8.0]);

    let card_width = ui.content_region_avail()[0].min(CARD_WIDTH);

    for (index, project) in PROJECTS.iter().enumerate() {
        let start = ui.cursor_pos();
        ui.invisible_button(format!("##project-{index}"), [card_width, CARD_HEIGHT]);
        let hovered = ui.is_item_hovered();
        let lift = if hovered { CARD_LIFT } else { 0.0 };
        let end = ui.cursor_pos();

        let (card_min, card_max) = card_rect(
            Vec2::from(ui.item_rect_min()),
            Vec2::from(ui.item_rect_max()),
            hovered,
        );
        ui.get_window_draw_list()
            .add_rect(Into::<[f32; 2]>::into(card_min), Into::<[f32; 2]>::into(card_max), CARD_BACKGROUND)
            .filled(true)
            .rounding(8.0)
            .build();

        ui.set_cursor_pos([start[0] + CARD_PADDING[0], start[1] + CARD_PADDING[1] - lift]);
        ui.text_colored(ACCENT, project.title);
        ui.set_cursor_pos([start[0] + CARD_PADDING[0], ui.cursor_pos()[1]]);
        ui.text(project.description);
        ui.set_cursor_pos([start[0] + CARD_PADDING[0], ui.cursor_pos()[1]]);
        ui.text_colored(MUTED, project.tags.join(" / "));

        ui.set_cursor_pos(end);
        ui.dummy([0.0, 12.0]);
    }
}

/// Corners of a project card, lifted and slightly enlarged around its center
/// while hovered.
fn card_rect(min: Vec2, max: Vec2, hovered: bool) -> (Vec2, Vec2) {
    if !hovered {
        return (min, max);
    }

    let center = (min + max) * 0.5 - Vec2::new(0.0, CARD_LIFT);
    let half_size = (max - min) * 0.5 * CARD_HOVER_SCALE;
    (center - half_size, center + half_size)
}

/// Reserves the rectangle the model viewer renders into.
fn draw_model_container(ui: &imgui::Ui, show_loading: bool) -> PageFrame {
    draw_heading(ui, "Showcase");
    ui.text_colored(MUTED, content::MODEL_CAPTION);
    ui.dummy([0.0, 8.0]);

    let width = ui.content_region_avail()[0];
    ui.invisible_button("##model-container", [width, MODEL_CONTAINER_HEIGHT]);

    let orbit_drag = if ui.is_item_active() {
        Vec2::from(ui.io().mouse_delta)
    } else {
        Vec2::ZERO
    };

    let min = Vec2::from(ui.item_rect_min());
    let max = Vec2::from(ui.item_rect_max());

    let draw_list = ui.get_window_draw_list();
    draw_list
        .add_rect(Into::<[f32; 2]>::into(min), Into::<[f32; 2]>::into(max), CONTAINER_BORDER)
        .rounding(8.0)
        .build();

    if show_loading {
        let text_size = Vec2::from(ui.calc_text_size(content::LOADING_TEXT));
        let position = min + ((max - min) - text_size) * 0.5;
        draw_list.add_text(Into::<[f32; 2]>::into(position), MUTED, content::LOADING_TEXT);
    }

    PageFrame {
        model_container: Some(Rect {
            min,
            size: max - min,
        }),
        orbit_drag,
    }
}

fn draw_contact(ui: &imgui::Ui) {
    draw_heading(ui, "Contact");
    ui.text_wrapped(content::CONTACT_TEXT);
    ui.text_colored(ACCENT, content::CONTACT_EMAIL);
}
