//! Document: the element tree plus the host environment it is shown in
//!
//! The host keeps the viewport, device pixel ratio, scroll offset and user
//! preferences up to date; motion primitives read them through a
//! `SharedDocument` handle at the moment they need them, never from a copy
//! cached at mount time.

use std::cell::RefCell;
use std::rc::Rc;

use crate::geometry::{Rect, Size};
use crate::tree::{ElementId, ElementTree};

/// Visible area of the document
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    /// Size in layout units
    pub size: Size,
    /// Physical pixels per layout unit
    pub device_pixel_ratio: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            size: Size::new(1280.0, 720.0),
            device_pixel_ratio: 1.0,
        }
    }
}

/// User and device preferences that change how motion is played
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MotionPreferences {
    /// The system asks for reduced motion
    pub reduced_motion: bool,
    /// The primary pointer is a touch screen
    pub touch_device: bool,
}

/// The element tree together with its viewport and scroll state
#[derive(Debug, Default)]
pub struct Document {
    pub tree: ElementTree,
    pub viewport: Viewport,
    pub preferences: MotionPreferences,
    scroll_y: f32,
}

/// Single-threaded shared handle to a document
pub type SharedDocument = Rc<RefCell<Document>>;

impl Document {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            tree: ElementTree::new(),
            viewport,
            preferences: MotionPreferences::default(),
            scroll_y: 0.0,
        }
    }

    /// Wrap into a shared handle
    pub fn into_shared(self) -> SharedDocument {
        Rc::new(RefCell::new(self))
    }

    pub fn prefers_reduced_motion(&self) -> bool {
        self.preferences.reduced_motion
    }

    pub fn scroll_y(&self) -> f32 {
        self.scroll_y
    }

    /// Set the vertical scroll offset, clamped to the scrollable range
    pub fn set_scroll_y(&mut self, scroll_y: f32) -> f32 {
        self.scroll_y = scroll_y.clamp(0.0, self.max_scroll());
        self.scroll_y
    }

    /// Height of the laid-out content
    pub fn content_height(&self) -> f32 {
        let root = self.tree.root();
        self.tree
            .descendants(root)
            .into_iter()
            .filter_map(|id| self.tree.bounds(id))
            .map(|b| b.bottom())
            .fold(0.0, f32::max)
    }

    /// Largest valid scroll offset
    pub fn max_scroll(&self) -> f32 {
        (self.content_height() - self.viewport.size.height).max(0.0)
    }

    /// Element box relative to the top-left of the viewport
    ///
    /// `None` when the element is gone or no longer connected.
    pub fn viewport_rect(&self, id: ElementId) -> Option<Rect> {
        if !self.tree.is_connected(id) {
            return None;
        }
        self.tree.bounds(id).map(|b| b.offset(0.0, -self.scroll_y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document_with_sections() -> (Document, ElementId) {
        let mut doc = Document::new(Viewport {
            size: Size::new(800.0, 600.0),
            device_pixel_ratio: 2.0,
        });
        let root = doc.tree.root();
        let first = doc.tree.append_element(root, "section").unwrap();
        doc.tree.set_bounds(first, Rect::new(0.0, 0.0, 800.0, 600.0));
        let second = doc.tree.append_element(root, "section").unwrap();
        doc.tree.set_bounds(second, Rect::new(0.0, 600.0, 800.0, 1000.0));
        (doc, second)
    }

    #[test]
    fn test_scroll_clamped_to_content() {
        let (mut doc, _) = document_with_sections();
        assert_eq!(doc.content_height(), 1600.0);
        assert_eq!(doc.max_scroll(), 1000.0);
        assert_eq!(doc.set_scroll_y(5000.0), 1000.0);
        assert_eq!(doc.set_scroll_y(-20.0), 0.0);
    }

    #[test]
    fn test_viewport_rect_tracks_scroll() {
        let (mut doc, second) = document_with_sections();
        doc.set_scroll_y(100.0);
        let rect = doc.viewport_rect(second).unwrap();
        assert_eq!(rect.top(), 500.0);

        doc.tree.remove(second);
        assert!(doc.viewport_rect(second).is_none());
    }
}
