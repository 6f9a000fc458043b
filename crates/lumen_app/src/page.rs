//! Page composition
//!
//! Builds the element tree of a marketing page (hero, anchor navigation and
//! content sections) and mounts the motion primitives on it:
//!
//! - canvas background behind the hero, variant chosen per page kind
//! - hero entrance: label and subtitle sequence, word reveal on the title
//! - scroll reveals for every `.animate-on-scroll` item in the sections
//! - smooth scrolling and the custom cursor, when enabled

use std::fmt;
use std::str::FromStr;

use lumen_animation::presets::SECTION_ITEM;
use lumen_animation::{AnimationContext, Position, Sequence, StyleProps, TweenId, TweenOptions};
use lumen_canvas::{CanvasBackground, CanvasOptions, CanvasVariant};
use lumen_core::{CoreError, Document, ElementId, Rect, SharedSurface};
use lumen_layout::{
    BindingId, CursorOptions, CustomCursor, RevealOptions, ScrollRevealEngine, SmoothScroll,
    SmoothScrollOptions, SplitType, TextRevealOptions, TextSplitReveal, TriggerStart,
    SECTION_ITEM_DELAY,
};

use crate::config::SiteConfig;
use crate::error::{ConfigError, Result};
use crate::runtime::MotionRuntime;

/// Class that marks section items for scroll reveals
pub const ANIMATE_ON_SCROLL: &str = "animate-on-scroll";

const NAV_HEIGHT: f32 = 80.0;
const SECTION_HEIGHT: f32 = 900.0;
const ITEM_HEIGHT: f32 = 160.0;
const ITEM_GAP: f32 = 40.0;
const TITLE_FONT_SIZE: f32 = 64.0;

// =============================================================================
// Page kinds
// =============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PageKind {
    #[default]
    Home,
    About,
    Services,
    Projects,
    Careers,
    Contact,
}

impl PageKind {
    pub const ALL: [PageKind; 6] = [
        PageKind::Home,
        PageKind::About,
        PageKind::Services,
        PageKind::Projects,
        PageKind::Careers,
        PageKind::Contact,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PageKind::Home => "home",
            PageKind::About => "about",
            PageKind::Services => "services",
            PageKind::Projects => "projects",
            PageKind::Careers => "careers",
            PageKind::Contact => "contact",
        }
    }

    /// Background painted behind this page's hero
    pub fn canvas_variant(&self) -> CanvasVariant {
        match self {
            PageKind::Services => CanvasVariant::Grid,
            PageKind::Projects => CanvasVariant::Particles,
            _ => CanvasVariant::Gradient,
        }
    }
}

impl FromStr for PageKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        PageKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| format!("unknown page {s:?}"))
    }
}

impl fmt::Display for PageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Page outline and tree
// =============================================================================

/// Text content of a page
#[derive(Clone, Debug, PartialEq)]
pub struct PageOutline {
    pub kind: PageKind,
    pub label: String,
    pub title: String,
    pub subtitle: String,
    pub sections: Vec<SectionOutline>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SectionOutline {
    /// DOM id, the target of `#id` anchor links
    pub id: String,
    pub heading: String,
    pub items: Vec<String>,
}

impl PageOutline {
    /// Placeholder content with three sections of three items each
    pub fn demo(kind: PageKind) -> Self {
        let section = |id: &str, heading: &str| SectionOutline {
            id: id.to_string(),
            heading: heading.to_string(),
            items: (1..=3).map(|n| format!("{heading} {n}")).collect(),
        };
        Self {
            kind,
            label: kind.name().to_uppercase(),
            title: "We build digital products that move people".to_string(),
            subtitle: "Strategy, design and engineering under one roof".to_string(),
            sections: vec![
                section("work", "Selected work"),
                section("approach", "Approach"),
                section("contact", "Get in touch"),
            ],
        }
    }
}

/// Handles to the elements `build_page` created
#[derive(Clone, Debug, PartialEq)]
pub struct PageElements {
    pub nav_links: Vec<ElementId>,
    pub hero: ElementId,
    pub label: ElementId,
    pub title: ElementId,
    pub subtitle: ElementId,
    pub sections: Vec<ElementId>,
    /// `.animate-on-scroll` items, grouped per section
    pub items: Vec<Vec<ElementId>>,
}

impl PageElements {
    pub fn item_count(&self) -> usize {
        self.items.iter().map(Vec::len).sum()
    }
}

/// Append the page described by `outline` to the document root and lay it
/// out in a single column
pub fn build_page(doc: &mut Document, outline: &PageOutline) -> std::result::Result<PageElements, CoreError> {
    let width = doc.viewport.size.width;
    let hero_height = doc.viewport.size.height;
    let tree = &mut doc.tree;
    let root = tree.root();

    let nav = tree.append_element(root, "nav")?;
    tree.set_bounds(nav, Rect::new(0.0, 0.0, width, NAV_HEIGHT));
    let mut nav_links = Vec::with_capacity(outline.sections.len());
    for (index, section) in outline.sections.iter().enumerate() {
        let link = tree.append_element(nav, "a")?;
        tree.set_attribute(link, "href", format!("#{}", section.id));
        tree.append_text(link, section.heading.clone())?;
        tree.set_bounds(link, Rect::new(width - 160.0 * (index + 1) as f32, 24.0, 140.0, 32.0));
        nav_links.push(link);
    }

    let hero = tree.append_element(root, "section")?;
    tree.add_class(hero, "page-hero");
    tree.add_class(hero, &format!("page-hero--{}", outline.kind));
    tree.set_bounds(hero, Rect::new(0.0, 0.0, width, hero_height));

    let label = tree.append_element(hero, "span")?;
    tree.add_class(label, "page-hero__label");
    tree.append_text(label, outline.label.clone())?;
    tree.set_bounds(label, Rect::new(64.0, hero_height * 0.3, width - 128.0, 24.0));

    let title = tree.append_element(hero, "h1")?;
    tree.add_class(title, "page-hero__title");
    tree.append_text(title, outline.title.clone())?;
    if let Some(element) = tree.get_mut(title) {
        element.font_size = TITLE_FONT_SIZE;
    }
    tree.set_bounds(
        title,
        Rect::new(64.0, hero_height * 0.3 + 40.0, width - 128.0, TITLE_FONT_SIZE * 2.4),
    );

    let subtitle = tree.append_element(hero, "p")?;
    tree.add_class(subtitle, "page-hero__subtitle");
    tree.append_text(subtitle, outline.subtitle.clone())?;
    tree.set_bounds(
        subtitle,
        Rect::new(64.0, hero_height * 0.3 + 220.0, width - 128.0, 32.0),
    );

    let mut sections = Vec::with_capacity(outline.sections.len());
    let mut items = Vec::with_capacity(outline.sections.len());
    for (index, section) in outline.sections.iter().enumerate() {
        let top = hero_height + index as f32 * SECTION_HEIGHT;
        let element = tree.append_element(root, "section")?;
        tree.set_attribute(element, "id", section.id.clone());
        tree.set_bounds(element, Rect::new(0.0, top, width, SECTION_HEIGHT));

        let heading = tree.append_element(element, "h2")?;
        tree.append_text(heading, section.heading.clone())?;
        tree.set_bounds(heading, Rect::new(64.0, top + 80.0, width - 128.0, 48.0));

        let mut section_items = Vec::with_capacity(section.items.len());
        for (row, text) in section.items.iter().enumerate() {
            let item = tree.append_element(element, "div")?;
            tree.add_class(item, ANIMATE_ON_SCROLL);
            tree.append_text(item, text.clone())?;
            let y = top + 200.0 + row as f32 * (ITEM_HEIGHT + ITEM_GAP);
            tree.set_bounds(item, Rect::new(64.0, y, width - 128.0, ITEM_HEIGHT));
            section_items.push(item);
        }
        sections.push(element);
        items.push(section_items);
    }

    Ok(PageElements {
        nav_links,
        hero,
        label,
        title,
        subtitle,
        sections,
        items,
    })
}

// =============================================================================
// Motion
// =============================================================================

/// Everything `PageMotion::mount` needs besides the tree
#[derive(Clone, Debug, PartialEq)]
pub struct PageOptions {
    pub canvas: CanvasOptions,
    pub trigger_start: TriggerStart,
    /// `None` leaves scrolling to the host
    pub smooth_scroll: Option<SmoothScrollOptions>,
    /// `None` keeps the system cursor
    pub cursor: Option<CursorOptions>,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            canvas: CanvasOptions::default(),
            trigger_start: TriggerStart::DEFAULT,
            smooth_scroll: Some(SmoothScrollOptions::default()),
            cursor: Some(CursorOptions::default()),
        }
    }
}

impl PageOptions {
    pub fn from_config(config: &SiteConfig) -> std::result::Result<Self, ConfigError> {
        Ok(Self {
            canvas: config.canvas_options()?,
            trigger_start: config.trigger_start()?,
            smooth_scroll: config
                .smooth_scroll
                .enabled
                .then(|| config.smooth_scroll_options()),
            cursor: config.cursor.enabled.then(|| config.cursor_options()),
        })
    }

    pub fn with_canvas_variant(mut self, variant: CanvasVariant) -> Self {
        self.canvas.variant = variant;
        self
    }
}

/// Label and subtitle entrance
fn hero_sequence(label: ElementId, subtitle: ElementId) -> Sequence {
    let hidden = StyleProps::new().opacity(0.0).y(20.0);
    let shown = StyleProps::new().opacity(1.0).y(0.0);
    Sequence::new()
        .delay(0.3)
        .then(
            &[label],
            hidden,
            shown,
            TweenOptions::default().with_duration(0.5),
            Position::End,
        )
        .then(
            &[subtitle],
            hidden,
            shown,
            TweenOptions::default().with_duration(0.6),
            Position::Overlap(0.2),
        )
}

fn title_reveal_options() -> TextRevealOptions {
    TextRevealOptions::default()
        .with_split(SplitType::Words)
        .with_stagger(0.04)
        .with_duration(0.7)
        .with_delay(0.4)
        .untriggered()
}

/// All motion mounted on one page
pub struct PageMotion {
    hero: AnimationContext,
    hero_tweens: Vec<TweenId>,
    title: TextSplitReveal,
    canvas: CanvasBackground,
    reveals: ScrollRevealEngine,
    bindings: Vec<BindingId>,
    smooth_scroll: Option<SmoothScroll>,
    cursor: Option<CustomCursor>,
}

impl PageMotion {
    pub fn mount(
        runtime: &MotionRuntime,
        page: &PageElements,
        surface: SharedSurface,
        options: PageOptions,
    ) -> Result<Self> {
        let document = runtime.document();
        let scheduler = runtime.scheduler();
        let events = runtime.events();
        let observer = runtime.observer();
        let reduced_motion = runtime.reduced_motion();

        let canvas = CanvasBackground::mount(
            document.clone(),
            scheduler,
            events,
            surface,
            Some(page.hero),
            options.canvas,
        );

        let hero = AnimationContext::new(document.clone(), scheduler);
        let hero_tweens = if reduced_motion {
            hero.set(&[page.label, page.subtitle], StyleProps::new().opacity(1.0).y(0.0));
            Vec::new()
        } else {
            hero_sequence(page.label, page.subtitle).play(&hero)
        };

        let title = TextSplitReveal::mount(
            document.clone(),
            scheduler,
            &observer,
            page.title,
            title_reveal_options(),
        );

        let reveals = ScrollRevealEngine::new(document.clone(), scheduler, observer.clone());
        let mut bindings = Vec::with_capacity(page.item_count());
        for items in &page.items {
            for (index, &item) in items.iter().enumerate() {
                let id = reveals.bind(
                    &[item],
                    &SECTION_ITEM,
                    RevealOptions::default()
                        .with_start(options.trigger_start)
                        .with_delay(index as f32 * SECTION_ITEM_DELAY),
                )?;
                bindings.push(id);
            }
        }

        let smooth_scroll = options.smooth_scroll.map(|scroll| {
            SmoothScroll::mount(document.clone(), scheduler, events, &observer, scroll)
        });
        let cursor = options
            .cursor
            .and_then(|cursor| CustomCursor::mount(document.clone(), scheduler, events, cursor));

        tracing::debug!(
            variant = %options.canvas.variant,
            bindings = bindings.len(),
            reduced_motion,
            smooth_scroll = smooth_scroll.is_some(),
            cursor = cursor.is_some(),
            "page motion mounted"
        );

        Ok(Self {
            hero,
            hero_tweens,
            title,
            canvas,
            reveals,
            bindings,
            smooth_scroll,
            cursor,
        })
    }

    pub fn canvas(&self) -> &CanvasBackground {
        &self.canvas
    }

    pub fn title(&self) -> &TextSplitReveal {
        &self.title
    }

    pub fn reveals(&self) -> &ScrollRevealEngine {
        &self.reveals
    }

    pub fn smooth_scroll(&self) -> Option<&SmoothScroll> {
        self.smooth_scroll.as_ref()
    }

    pub fn cursor(&self) -> Option<&CustomCursor> {
        self.cursor.as_ref()
    }

    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    pub fn fired_count(&self) -> usize {
        self.bindings
            .iter()
            .filter(|&&id| self.reveals.is_fired(id))
            .count()
    }

    /// Hero label and subtitle have finished (or never needed to) animate
    pub fn hero_settled(&self) -> bool {
        self.hero_tweens.iter().all(|&id| !self.hero.is_active(id))
    }

    /// Stop every primitive; the tree keeps its current styles
    pub fn unmount(&self) {
        self.hero.kill_all();
        self.title.unmount();
        self.canvas.unmount();
        self.reveals.teardown();
        if let Some(scroll) = &self.smooth_scroll {
            scroll.destroy();
        }
        if let Some(cursor) = &self.cursor {
            cursor.unmount();
        }
        tracing::debug!("page motion unmounted");
    }
}

/// Build the demo page for `kind` and mount its motion
pub fn mount_demo_page(
    runtime: &MotionRuntime,
    kind: PageKind,
    surface: SharedSurface,
    options: PageOptions,
) -> Result<(PageElements, PageMotion)> {
    let outline = PageOutline::demo(kind);
    let page = {
        let document = runtime.document();
        let mut doc = document.borrow_mut();
        build_page(&mut doc, &outline)?
    };
    let motion = PageMotion::mount(runtime, &page, surface, options)?;
    Ok((page, motion))
}
