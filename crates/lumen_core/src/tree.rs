//! Element tree
//!
//! A slotmap-backed arena of elements and text nodes. Motion primitives hold
//! `ElementId` handles collected when they are constructed instead of querying
//! markup by selector; a handle whose element has been removed simply stops
//! resolving, which is how "target unmounted mid-flight" is detected.
//!
//! Detached subtrees are allowed: an element may live in the arena without a
//! parent. Text splitting relies on this to park the original text nodes while
//! the split wrappers are mounted.

use rustc_hash::FxHashMap;
use slotmap::{new_key_type, Key, SlotMap};
use smallvec::SmallVec;

use crate::error::{CoreError, Result};
use crate::geometry::Rect;

new_key_type! {
    /// Handle to an element or text node in an `ElementTree`
    pub struct ElementId;
}

impl ElementId {
    /// Convert to a raw u64 representation
    pub fn to_raw(self) -> u64 {
        self.data().as_ffi()
    }
}

/// CSS-like display mode
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Display {
    #[default]
    Block,
    Inline,
    InlineBlock,
    None,
}

/// Overflow handling for an element's box
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Overflow {
    #[default]
    Visible,
    Hidden,
}

/// Resolved visual style of an element
///
/// Only the properties motion primitives touch are modelled. Translations
/// are in layout units; the percentage variants are relative to the
/// element's own box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Style {
    pub opacity: f32,
    pub translate_x: f32,
    pub translate_y: f32,
    pub x_percent: f32,
    pub y_percent: f32,
    pub scale: f32,
    pub skew_y: f32,
    pub display: Display,
    pub overflow: Overflow,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            translate_x: 0.0,
            translate_y: 0.0,
            x_percent: 0.0,
            y_percent: 0.0,
            scale: 1.0,
            skew_y: 0.0,
            display: Display::Block,
            overflow: Overflow::Visible,
        }
    }
}

/// What an arena slot holds
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    Element { tag: String },
    Text(String),
}

/// A node in the element tree
#[derive(Clone, Debug)]
pub struct Element {
    pub kind: NodeKind,
    pub style: Style,
    /// Layout box in document coordinates
    pub bounds: Rect,
    pub font_size: f32,
    parent: Option<ElementId>,
    children: SmallVec<[ElementId; 4]>,
    attributes: FxHashMap<String, String>,
}

impl Element {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            style: Style::default(),
            bounds: Rect::ZERO,
            font_size: 16.0,
            parent: None,
            children: SmallVec::new(),
            attributes: FxHashMap::default(),
        }
    }

    pub fn tag(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Element { tag } => Some(tag),
            NodeKind::Text(_) => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, NodeKind::Text(_))
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attribute("class")
            .map(|classes| classes.split_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }
}

/// Arena of elements rooted at a `body` element
#[derive(Debug)]
pub struct ElementTree {
    nodes: SlotMap<ElementId, Element>,
    root: ElementId,
}

impl Default for ElementTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ElementTree {
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Element::new(NodeKind::Element {
            tag: "body".to_string(),
        }));
        Self { nodes, root }
    }

    pub fn root(&self) -> ElementId {
        self.root
    }

    /// Number of live nodes, detached ones included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Whether `id` is live and reachable from the root
    pub fn is_connected(&self, id: ElementId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == self.root {
                return true;
            }
            current = self.nodes.get(node).and_then(|e| e.parent);
        }
        false
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.nodes.get(id)
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.nodes.get_mut(id)
    }

    pub fn style(&self, id: ElementId) -> Option<&Style> {
        self.nodes.get(id).map(|e| &e.style)
    }

    pub fn style_mut(&mut self, id: ElementId) -> Option<&mut Style> {
        self.nodes.get_mut(id).map(|e| &mut e.style)
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.nodes.get(id).and_then(|e| e.parent)
    }

    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.nodes.get(id).map(|e| e.children()).unwrap_or(&[])
    }

    // =========================================================================
    // Construction
    // =========================================================================

    /// Create a detached element
    pub fn create_element(&mut self, tag: impl Into<String>) -> ElementId {
        self.nodes
            .insert(Element::new(NodeKind::Element { tag: tag.into() }))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, text: impl Into<String>) -> ElementId {
        let mut node = Element::new(NodeKind::Text(text.into()));
        node.style.display = Display::Inline;
        self.nodes.insert(node)
    }

    /// Create an element and append it to `parent`
    pub fn append_element(&mut self, parent: ElementId, tag: impl Into<String>) -> Result<ElementId> {
        let id = self.create_element(tag);
        self.append_child(parent, id)?;
        Ok(id)
    }

    /// Create a text node and append it to `parent`
    pub fn append_text(&mut self, parent: ElementId, text: impl Into<String>) -> Result<ElementId> {
        let id = self.create_text(text);
        self.append_child(parent, id)?;
        Ok(id)
    }

    pub fn append_child(&mut self, parent: ElementId, child: ElementId) -> Result<()> {
        let index = self.children(parent).len();
        self.insert_child(parent, index, child)
    }

    /// Insert `child` at `index` under `parent`, detaching it from any
    /// previous parent first
    pub fn insert_child(&mut self, parent: ElementId, index: usize, child: ElementId) -> Result<()> {
        self.check_live(parent)?;
        self.check_live(child)?;

        if self.nodes[parent].is_text() {
            return Err(CoreError::InvalidTree(
                "text nodes cannot have children".to_string(),
            ));
        }
        if child == self.root || self.is_ancestor(child, parent) {
            return Err(CoreError::InvalidTree(
                "insertion would create a cycle".to_string(),
            ));
        }

        self.detach(child)?;
        let siblings = &mut self.nodes[parent].children;
        let index = index.min(siblings.len());
        siblings.insert(index, child);
        self.nodes[child].parent = Some(parent);
        Ok(())
    }

    /// Unlink `id` from its parent, keeping the subtree alive in the arena
    pub fn detach(&mut self, id: ElementId) -> Result<()> {
        self.check_live(id)?;
        if let Some(parent) = self.nodes[id].parent.take() {
            if let Some(p) = self.nodes.get_mut(parent) {
                p.children.retain(|c| *c != id);
            }
        }
        Ok(())
    }

    /// Remove `id` and its whole subtree from the arena
    ///
    /// Returns the number of nodes removed; removing a missing node is a no-op.
    pub fn remove(&mut self, id: ElementId) -> usize {
        if id == self.root || !self.contains(id) {
            return 0;
        }
        let _ = self.detach(id);

        let mut removed = 0;
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            if let Some(element) = self.nodes.remove(node) {
                stack.extend(element.children.iter().copied());
                removed += 1;
            }
        }
        removed
    }

    /// Replace all children of `id` with a single text node
    pub fn set_text(&mut self, id: ElementId, text: impl Into<String>) -> Result<()> {
        self.check_live(id)?;
        let text = text.into();
        if let NodeKind::Text(existing) = &mut self.nodes[id].kind {
            *existing = text;
            return Ok(());
        }
        let children: Vec<_> = self.nodes[id].children.to_vec();
        for child in children {
            self.remove(child);
        }
        self.append_text(id, text)?;
        Ok(())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Concatenated text of every text node under `id`, in document order
    pub fn text_content(&self, id: ElementId) -> String {
        let mut out = String::new();
        for node in self.descendants(id) {
            if let Some(NodeKind::Text(text)) = self.nodes.get(node).map(|e| &e.kind) {
                out.push_str(text);
            }
        }
        out
    }

    /// `id` and all of its descendants in pre-order
    pub fn descendants(&self, id: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        if !self.contains(id) {
            return out;
        }
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.nodes[node].children.iter().rev().copied());
        }
        out
    }

    /// Nearest ancestor-or-self matching `predicate`
    pub fn closest<F>(&self, id: ElementId, predicate: F) -> Option<ElementId>
    where
        F: Fn(&Element) -> bool,
    {
        let mut current = Some(id);
        while let Some(node) = current {
            let element = self.nodes.get(node)?;
            if predicate(element) {
                return Some(node);
            }
            current = element.parent;
        }
        None
    }

    /// Connected element whose `id` attribute equals `dom_id`
    pub fn find_by_dom_id(&self, dom_id: &str) -> Option<ElementId> {
        self.descendants(self.root)
            .into_iter()
            .find(|node| self.nodes[*node].attribute("id") == Some(dom_id))
    }

    fn is_ancestor(&self, ancestor: ElementId, node: ElementId) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.nodes.get(n).and_then(|e| e.parent);
        }
        false
    }

    fn check_live(&self, id: ElementId) -> Result<()> {
        if self.nodes.contains_key(id) {
            Ok(())
        } else {
            Err(CoreError::MissingElement(id))
        }
    }

    // =========================================================================
    // Attributes
    // =========================================================================

    pub fn set_attribute(&mut self, id: ElementId, name: impl Into<String>, value: impl Into<String>) {
        if let Some(element) = self.nodes.get_mut(id) {
            element.attributes.insert(name.into(), value.into());
        }
    }

    pub fn remove_attribute(&mut self, id: ElementId, name: &str) -> Option<String> {
        self.nodes
            .get_mut(id)
            .and_then(|e| e.attributes.remove(name))
    }

    pub fn attribute(&self, id: ElementId, name: &str) -> Option<&str> {
        self.nodes.get(id).and_then(|e| e.attribute(name))
    }

    pub fn add_class(&mut self, id: ElementId, class: &str) {
        let Some(element) = self.nodes.get_mut(id) else {
            return;
        };
        if element.has_class(class) {
            return;
        }
        let classes = element.attributes.entry("class".to_string()).or_default();
        if !classes.is_empty() {
            classes.push(' ');
        }
        classes.push_str(class);
    }

    pub fn remove_class(&mut self, id: ElementId, class: &str) {
        let Some(element) = self.nodes.get_mut(id) else {
            return;
        };
        if let Some(classes) = element.attributes.get_mut("class") {
            let kept: Vec<&str> = classes.split_whitespace().filter(|c| *c != class).collect();
            *classes = kept.join(" ");
        }
    }

    pub fn has_class(&self, id: ElementId, class: &str) -> bool {
        self.nodes.get(id).map(|e| e.has_class(class)).unwrap_or(false)
    }

    pub fn set_bounds(&mut self, id: ElementId, bounds: Rect) {
        if let Some(element) = self.nodes.get_mut(id) {
            element.bounds = bounds;
        }
    }

    pub fn bounds(&self, id: ElementId) -> Option<Rect> {
        self.nodes.get(id).map(|e| e.bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paragraph(tree: &mut ElementTree, text: &str) -> ElementId {
        let root = tree.root();
        let p = tree.append_element(root, "p").unwrap();
        tree.append_text(p, text).unwrap();
        p
    }

    #[test]
    fn test_text_content_in_document_order() {
        let mut tree = ElementTree::new();
        let p = paragraph(&mut tree, "Hello ");
        let em = tree.append_element(p, "em").unwrap();
        tree.append_text(em, "big").unwrap();
        tree.append_text(p, " world").unwrap();
        assert_eq!(tree.text_content(p), "Hello big world");
    }

    #[test]
    fn test_remove_drops_subtree() {
        let mut tree = ElementTree::new();
        let p = paragraph(&mut tree, "gone");
        let before = tree.len();
        assert_eq!(tree.remove(p), 2);
        assert_eq!(tree.len(), before - 2);
        assert!(!tree.contains(p));
        assert!(tree.children(tree.root()).is_empty());
        // Removing twice is harmless
        assert_eq!(tree.remove(p), 0);
    }

    #[test]
    fn test_detach_keeps_node_alive() {
        let mut tree = ElementTree::new();
        let p = paragraph(&mut tree, "parked");
        tree.detach(p).unwrap();
        assert!(tree.contains(p));
        assert!(!tree.is_connected(p));
        tree.append_child(tree.root(), p).unwrap();
        assert!(tree.is_connected(p));
    }

    #[test]
    fn test_insert_rejects_cycles_and_text_parents() {
        let mut tree = ElementTree::new();
        let outer = tree.append_element(tree.root(), "div").unwrap();
        let inner = tree.append_element(outer, "div").unwrap();
        assert!(tree.append_child(inner, outer).is_err());

        let text = tree.append_text(inner, "x").unwrap();
        let span = tree.create_element("span");
        assert!(tree.append_child(text, span).is_err());
    }

    #[test]
    fn test_classes_and_closest() {
        let mut tree = ElementTree::new();
        let link = tree.append_element(tree.root(), "a").unwrap();
        tree.set_attribute(link, "data-cursor-text", "View");
        let label = tree.append_element(link, "span").unwrap();

        tree.add_class(label, "label");
        tree.add_class(label, "label");
        tree.add_class(label, "muted");
        assert_eq!(tree.attribute(label, "class"), Some("label muted"));
        tree.remove_class(label, "label");
        assert!(!tree.has_class(label, "label"));
        assert!(tree.has_class(label, "muted"));

        let found = tree.closest(label, |e| e.tag() == Some("a"));
        assert_eq!(found, Some(link));
    }

    #[test]
    fn test_find_by_dom_id_ignores_detached() {
        let mut tree = ElementTree::new();
        let section = tree.append_element(tree.root(), "section").unwrap();
        tree.set_attribute(section, "id", "solutions");
        assert_eq!(tree.find_by_dom_id("solutions"), Some(section));
        tree.detach(section).unwrap();
        assert_eq!(tree.find_by_dom_id("solutions"), None);
    }
}
