//! Page-level tests for lumen_app
//!
//! Each test builds the demo page in a headless runtime and drives it with
//! simulated frames and input, checking the styles the host would render.

use std::cell::RefCell;
use std::rc::Rc;

use lumen_canvas::CanvasVariant;
use lumen_core::{ElementId, MotionPreferences, RecordingContext, SharedSurface, Size, Viewport};
use lumen_layout::{TextRevealOptions, TextSplitReveal};

use crate::config::SiteConfig;
use crate::page::{mount_demo_page, PageElements, PageKind, PageMotion, PageOptions};
use crate::runtime::MotionRuntime;

fn runtime(preferences: MotionPreferences) -> MotionRuntime {
    MotionRuntime::new(
        Viewport {
            size: Size::new(1280.0, 720.0),
            device_pixel_ratio: 2.0,
        },
        preferences,
    )
}

fn surface() -> (Rc<RefCell<RecordingContext>>, SharedSurface) {
    let recording = RecordingContext::shared(Size::new(1280.0, 720.0));
    let surface: SharedSurface = recording.clone();
    (recording, surface)
}

fn options(kind: PageKind) -> PageOptions {
    let mut options = PageOptions::default().with_canvas_variant(kind.canvas_variant());
    options.canvas.seed = Some(7);
    options
}

fn mount(runtime: &MotionRuntime, kind: PageKind) -> (PageElements, PageMotion, Rc<RefCell<RecordingContext>>) {
    let (recording, surface) = surface();
    let (page, motion) = mount_demo_page(runtime, kind, surface, options(kind)).unwrap();
    (page, motion, recording)
}

fn opacity(runtime: &MotionRuntime, id: ElementId) -> f32 {
    runtime.document().borrow().tree.style(id).unwrap().opacity
}

fn translate_y(runtime: &MotionRuntime, id: ElementId) -> f32 {
    runtime.document().borrow().tree.style(id).unwrap().translate_y
}

fn all_items(page: &PageElements) -> Vec<ElementId> {
    page.items.iter().flatten().copied().collect()
}

#[test]
fn test_page_kind_picks_canvas() {
    assert_eq!(PageKind::Services.canvas_variant(), CanvasVariant::Grid);
    assert_eq!(PageKind::Projects.canvas_variant(), CanvasVariant::Particles);
    assert_eq!(PageKind::About.canvas_variant(), CanvasVariant::Gradient);
    assert_eq!("careers".parse::<PageKind>().unwrap(), PageKind::Careers);
    assert!("blog".parse::<PageKind>().is_err());
}

#[test]
fn test_full_page_plays_through() {
    let mut runtime = runtime(MotionPreferences::default());
    let (page, motion, recording) = mount(&runtime, PageKind::Home);

    assert_eq!(motion.binding_count(), 9);
    assert_eq!(opacity(&runtime, page.label), 0.0);
    for item in all_items(&page) {
        assert_eq!(opacity(&runtime, item), 0.0);
        assert_eq!(translate_y(&runtime, item), 50.0);
    }

    // Hero entrance and title reveal settle within two seconds
    runtime.run_frames(150);
    assert!(motion.hero_settled());
    assert_eq!(opacity(&runtime, page.label), 1.0);
    assert_eq!(opacity(&runtime, page.subtitle), 1.0);
    assert!(motion.title().has_played());
    for word in motion.title().units() {
        assert_eq!(opacity(&runtime, word), 1.0);
    }
    assert!(recording.borrow().draw_call_count() > 0);

    // Nothing below the fold has fired yet
    assert_eq!(motion.fired_count(), 0);

    // Host scroll to 2000: items whose top is above 2000 + 612 fire
    runtime.scroll(2000.0);
    assert_eq!(motion.fired_count(), 6);

    runtime.scroll(10_000.0);
    assert_eq!(motion.fired_count(), 9);

    runtime.run_frames(90);
    for item in all_items(&page) {
        assert_eq!(opacity(&runtime, item), 1.0);
        assert_eq!(translate_y(&runtime, item), 0.0);
    }
    assert_eq!(motion.reveals().active_tweens(), 0);
}

#[test]
fn test_reduced_motion_page_is_static() {
    let runtime = runtime(MotionPreferences {
        reduced_motion: true,
        touch_device: false,
    });
    let (page, motion, _recording) = mount(&runtime, PageKind::Services);

    // Everything is final before the first frame
    assert!(motion.hero_settled());
    assert_eq!(opacity(&runtime, page.label), 1.0);
    assert_eq!(opacity(&runtime, page.subtitle), 1.0);
    assert_eq!(opacity(&runtime, page.title), 1.0);
    assert!(!motion.title().is_split());
    assert_eq!(motion.fired_count(), motion.binding_count());
    for item in all_items(&page) {
        assert_eq!(opacity(&runtime, item), 1.0);
        assert_eq!(translate_y(&runtime, item), 0.0);
    }
    assert_eq!(motion.reveals().active_tweens(), 0);
}

#[test]
fn test_reduced_motion_three_words_need_no_frames() {
    let runtime = runtime(MotionPreferences {
        reduced_motion: true,
        touch_device: false,
    });
    let heading = {
        let document = runtime.document();
        let mut doc = document.borrow_mut();
        let root = doc.tree.root();
        let heading = doc.tree.append_element(root, "h2").unwrap();
        doc.tree.append_text(heading, "one two three").unwrap();
        heading
    };

    let reveal = TextSplitReveal::mount(
        runtime.document(),
        runtime.scheduler(),
        &runtime.observer(),
        heading,
        TextRevealOptions::default(),
    );

    assert_eq!(runtime.frame_count(), 0);
    assert!(!reveal.is_animating());
    assert!(reveal.units().is_empty());
    assert_eq!(opacity(&runtime, heading), 1.0);
    assert_eq!(runtime.document().borrow().tree.text_content(heading), "one two three");
}

#[test]
fn test_wheel_scroll_reveals_first_section() {
    let mut runtime = runtime(MotionPreferences::default());
    let (_page, motion, _recording) = mount(&runtime, PageKind::Projects);

    runtime.run_frames(10);
    runtime.wheel(1200.0);
    runtime.run_frames(120);

    assert!((runtime.scroll_y() - 1200.0).abs() < 0.5);
    // Items of the first section sit at 920, 1120 and 1320
    assert_eq!(motion.fired_count(), 3);
}

#[test]
fn test_anchor_link_scrolls_below_header() {
    let mut runtime = runtime(MotionPreferences::default());
    let (page, _motion, _recording) = mount(&runtime, PageKind::About);

    runtime.run_frames(10);
    runtime.click(page.nav_links[1]);
    runtime.run_frames(120);

    // Second section starts at 720 + 900
    assert!((runtime.scroll_y() - 1520.0).abs() < 0.5);
}

#[test]
fn test_touch_device_keeps_system_cursor() {
    let runtime = runtime(MotionPreferences {
        reduced_motion: false,
        touch_device: true,
    });
    let (_page, motion, _recording) = mount(&runtime, PageKind::Home);
    assert!(motion.cursor().is_none());
    assert!(motion.smooth_scroll().is_some());
}

#[test]
fn test_config_disables_optional_primitives() {
    let config = SiteConfig::from_toml_str(
        r#"
        [smooth_scroll]
        enabled = false

        [cursor]
        enabled = false

        [canvas]
        variant = "grid"
        particle_count = 10
        "#,
    )
    .unwrap();
    let options = PageOptions::from_config(&config).unwrap();
    assert!(options.smooth_scroll.is_none());
    assert!(options.cursor.is_none());

    let runtime = runtime(MotionPreferences::default());
    let (_recording, surface) = surface();
    let (_page, motion) = mount_demo_page(&runtime, PageKind::Home, surface, options).unwrap();
    assert!(motion.smooth_scroll().is_none());
    assert!(motion.cursor().is_none());
    assert_eq!(motion.canvas().variant(), CanvasVariant::Grid);
}

#[test]
fn test_unmount_releases_everything() {
    let mut runtime = runtime(MotionPreferences::default());
    let observer_listeners = runtime.events().total_listeners();
    let (_page, motion, recording) = mount(&runtime, PageKind::Projects);
    assert!(runtime.events().total_listeners() > observer_listeners);

    runtime.run_frames(30);
    motion.unmount();
    drop(motion);

    let draws = recording.borrow().draw_call_count();
    runtime.run_frames(30);
    assert_eq!(recording.borrow().draw_call_count(), draws);
    assert_eq!(runtime.events().total_listeners(), observer_listeners);
    assert_eq!(runtime.scheduler().task_count(), 0);
}
