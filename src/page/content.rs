//! Static copy shown on the page.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Hero,
    About,
    Projects,
    Model,
    Contact,
}

#[derive(Debug, Clone, Copy)]
pub struct SectionContent {
    pub kind: SectionKind,
    /// Link label in the navbar.
    pub title: &'static str,
}

pub const BRAND: &str = "Portfolio";

pub const SECTIONS: &[SectionContent] = &[
    SectionContent {
        kind: SectionKind::Hero,
        title: "Home",
    },
    SectionContent {
        kind: SectionKind::About,
        title: "About",
    },
    SectionContent {
        kind: SectionKind::Projects,
        title: "Projects",
    },
    SectionContent {
        kind: SectionKind::Model,
        title: "Showcase",
    },
    SectionContent {
        kind: SectionKind::Contact,
        title: "Contact",
    },
];

pub const HERO_TITLE: &str = "Hi, I build things for the web.";
pub const HERO_SUBTITLE: &str = "Developer working on interactive graphics and fast, friendly tools.";

pub const ABOUT_TEXT: &str = "I enjoy turning rough ideas into polished software. Most of my \
work sits somewhere between rendering, tooling and user interfaces, and I like it best when \
all three meet.";

/// Label and initial text of each stat counter.
pub const STATS: &[(&str, &str)] = &[
    ("Projects Completed", "50+"),
    ("Years Experience", "5+"),
    ("Technologies", "20+"),
];

#[derive(Debug, Clone, Copy)]
pub struct Project {
    pub title: &'static str,
    pub description: &'static str,
    pub tags: &'static [&'static str],
}

pub const PROJECTS: &[Project] = &[
    Project {
        title: "Particle Playground",
        description: "A drifting field of particles that follows the pointer.",
        tags: &["wgpu", "WGSL"],
    },
    Project {
        title: "Model Showcase",
        description: "Loads OBJ/MTL assets and spins them under soft shadows.",
        tags: &["3D", "Shadows"],
    },
    Project {
        title: "Live Shader Lab",
        description: "Edit shaders and see them reload without restarting.",
        tags: &["Tooling", "Hot reload"],
    },
];

pub const MODEL_CAPTION: &str = "Drag sideways to look around.";
pub const LOADING_TEXT: &str = "Loading model...";

pub const CONTACT_TEXT: &str = "Want to work together? Drop me a line.";
pub const CONTACT_EMAIL: &str = "hello@example.com";
