//! In-memory hosting document.
//!
//! [`Document`] is a small element arena standing in for the page the
//! consent dialog lives in. It only models what the dialog consumes:
//! ids, classes, attributes, inline styles, text, form values, the tree
//! shape in document order, and a single active (focused) element.

use std::collections::BTreeMap;
use std::fmt;

/// Handle to an element inside a [`Document`].
///
/// Handles are plain indices. Holding one never keeps an element alive or
/// attached; use [`Document::is_connected`] before acting on a stale one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Body,
    Main,
    Section,
    Div,
    Heading,
    Paragraph,
    Span,
    Label,
    Form,
    Button,
    Input,
    Select,
    Textarea,
    Anchor,
}

impl Tag {
    /// Tags whose value is reset by a form reset.
    pub const fn is_form_control(self) -> bool {
        matches!(self, Self::Input | Self::Select | Self::Textarea)
    }
}

/// A single element. Built with the `with_*` methods and inserted through
/// [`Document::append`].
#[derive(Debug, Clone)]
pub struct Element {
    tag: Tag,
    id: Option<String>,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    styles: BTreeMap<String, String>,
    text: String,
    value: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Element {
    pub const fn new(tag: Tag) -> Self {
        Self {
            tag,
            id: None,
            classes: Vec::new(),
            attributes: BTreeMap::new(),
            styles: BTreeMap::new(),
            text: String::new(),
            value: String::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        let class = class.into();
        if !self.classes.contains(&class) {
            self.classes.push(class);
        }
        self
    }

    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub const fn tag(&self) -> Tag {
        self.tag
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn style(&self, property: &str) -> Option<&str> {
        self.styles.get(property).map(String::as_str)
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }
}

/// The hosting document.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Element>,
    body: NodeId,
    active: Option<NodeId>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            nodes: vec![Element::new(Tag::Body)],
            body: NodeId(0),
            active: None,
        }
    }

    pub const fn body(&self) -> NodeId {
        self.body
    }

    /// Inserts `element` as the last child of `parent`.
    pub fn append(&mut self, parent: NodeId, mut element: Element) -> NodeId {
        let node = NodeId(self.nodes.len());
        element.parent = Some(parent);
        element.children.clear();
        self.nodes.push(element);
        self.nodes[parent.0].children.push(node);
        node
    }

    /// Detaches `node` (and its subtree) from its parent.
    ///
    /// The element keeps existing in the arena, so outstanding handles stay
    /// valid but report as disconnected. If focus was inside the removed
    /// subtree it is dropped, as a browser would.
    pub fn remove(&mut self, node: NodeId) {
        if node == self.body {
            return;
        }
        if let Some(parent) = self.nodes[node.0].parent.take() {
            self.nodes[parent.0].children.retain(|child| *child != node);
        }
        if self.active.is_some_and(|active| self.contains(node, active)) {
            self.active = None;
        }
    }

    pub fn get(&self, node: NodeId) -> &Element {
        &self.nodes[node.0]
    }

    fn get_mut(&mut self, node: NodeId) -> &mut Element {
        &mut self.nodes[node.0]
    }

    /// Returns whether `node` is still attached to the body.
    pub fn is_connected(&self, node: NodeId) -> bool {
        self.ancestors(node).any(|ancestor| ancestor == self.body)
    }

    /// Iterates `node` and then its ancestors up to the root it hangs from.
    pub fn ancestors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(node), |current| self.nodes[current.0].parent)
    }

    /// Returns whether `node` is `ancestor` or lies inside its subtree.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.ancestors(node).any(|current| current == ancestor)
    }

    /// Nearest inclusive ancestor carrying the attribute `name`.
    pub fn closest_with_attribute(&self, node: NodeId, name: &str) -> Option<NodeId> {
        self.ancestors(node)
            .find(|current| self.nodes[current.0].has_attribute(name))
    }

    /// Nearest inclusive ancestor with the given tag.
    pub fn closest_tag(&self, node: NodeId, tag: Tag) -> Option<NodeId> {
        self.ancestors(node)
            .find(|current| self.nodes[current.0].tag == tag)
    }

    /// All elements below `root` (excluding `root`) in document order.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.nodes[root.0].children.iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.nodes[node.0].children.iter().rev().copied());
        }
        out
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        std::iter::once(self.body)
            .chain(self.descendants(self.body))
            .find(|node| self.nodes[node.0].id.as_deref() == Some(id))
    }

    /// Connected elements carrying the attribute `name`, in document order.
    pub fn query_attribute(&self, name: &str) -> Vec<NodeId> {
        self.descendants(self.body)
            .into_iter()
            .filter(|node| self.nodes[node.0].has_attribute(name))
            .collect()
    }

    pub fn next_element_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.nodes[node.0].parent?;
        let siblings = &self.nodes[parent.0].children;
        let position = siblings.iter().position(|sibling| *sibling == node)?;
        siblings.get(position + 1).copied()
    }

    pub fn add_class(&mut self, node: NodeId, class: &str) {
        let element = self.get_mut(node);
        if !element.has_class(class) {
            element.classes.push(class.to_string());
        }
    }

    pub fn remove_class(&mut self, node: NodeId, class: &str) {
        self.get_mut(node).classes.retain(|c| c != class);
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.get(node).has_class(class)
    }

    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: impl Into<String>) {
        self.get_mut(node)
            .attributes
            .insert(name.to_string(), value.into());
    }

    pub fn remove_attribute(&mut self, node: NodeId, name: &str) {
        self.get_mut(node).attributes.remove(name);
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.get(node).attribute(name)
    }

    pub fn set_style(&mut self, node: NodeId, property: &str, value: impl Into<String>) {
        self.get_mut(node)
            .styles
            .insert(property.to_string(), value.into());
    }

    pub fn remove_style(&mut self, node: NodeId, property: &str) {
        self.get_mut(node).styles.remove(property);
    }

    pub fn set_id(&mut self, node: NodeId, id: impl Into<String>) {
        self.get_mut(node).id = Some(id.into());
    }

    pub fn set_text(&mut self, node: NodeId, text: impl Into<String>) {
        self.get_mut(node).text = text.into();
    }

    pub fn value(&self, node: NodeId) -> &str {
        &self.get(node).value
    }

    pub fn set_value(&mut self, node: NodeId, value: impl Into<String>) {
        self.get_mut(node).value = value.into();
    }

    pub fn value_mut(&mut self, node: NodeId) -> &mut String {
        &mut self.get_mut(node).value
    }

    pub const fn active_element(&self) -> Option<NodeId> {
        self.active
    }

    /// Moves focus to `node`.
    ///
    /// Returns the element that lost focus, if focus actually changed.
    /// Disconnected elements cannot take focus.
    pub fn focus(&mut self, node: NodeId) -> Option<NodeId> {
        if !self.is_connected(node) || self.active == Some(node) {
            return None;
        }
        self.active.replace(node)
    }

    /// Drops focus back to the document. Returns the element that lost it.
    pub const fn blur(&mut self) -> Option<NodeId> {
        self.active.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Document, NodeId, NodeId, NodeId, NodeId) {
        let mut doc = Document::new();
        let body = doc.body();
        let main = doc.append(body, Element::new(Tag::Main).with_id("main"));
        let first = doc.append(main, Element::new(Tag::Button).with_text("one"));
        let section = doc.append(main, Element::new(Tag::Section));
        let nested = doc.append(section, Element::new(Tag::Input).with_id("nested"));
        (doc, main, first, section, nested)
    }

    #[test]
    fn test_descendants_are_in_document_order() {
        let (doc, main, first, section, nested) = sample();
        assert_eq!(doc.descendants(doc.body()), vec![main, first, section, nested]);
        assert_eq!(doc.descendants(section), vec![nested]);
    }

    #[test]
    fn test_lookup_by_id_skips_detached_elements() {
        let (mut doc, _, _, section, nested) = sample();
        assert_eq!(doc.get_element_by_id("nested"), Some(nested));
        doc.remove(section);
        assert_eq!(doc.get_element_by_id("nested"), None);
        assert!(!doc.is_connected(nested));
    }

    #[test]
    fn test_focus_reports_previous_element() {
        let (mut doc, _, first, _, nested) = sample();
        assert_eq!(doc.focus(first), None);
        assert_eq!(doc.focus(first), None);
        assert_eq!(doc.focus(nested), Some(first));
        assert_eq!(doc.active_element(), Some(nested));
        assert_eq!(doc.blur(), Some(nested));
        assert_eq!(doc.active_element(), None);
    }

    #[test]
    fn test_removing_focused_subtree_drops_focus() {
        let (mut doc, _, _, section, nested) = sample();
        doc.focus(nested);
        doc.remove(section);
        assert_eq!(doc.active_element(), None);
        assert_eq!(doc.focus(nested), None);
        assert_eq!(doc.active_element(), None);
    }

    #[test]
    fn test_next_element_sibling() {
        let (doc, main, first, section, _) = sample();
        assert_eq!(doc.next_element_sibling(first), Some(section));
        assert_eq!(doc.next_element_sibling(section), None);
        assert_eq!(doc.next_element_sibling(main), None);
    }

    #[test]
    fn test_class_and_attribute_toggles() {
        let (mut doc, main, first, _, _) = sample();
        doc.add_class(main, "is-open");
        doc.add_class(main, "is-open");
        assert!(doc.has_class(main, "is-open"));
        doc.remove_class(main, "is-open");
        assert!(!doc.has_class(main, "is-open"));

        doc.set_attribute(first, "data-trigger", "");
        assert_eq!(doc.query_attribute("data-trigger"), vec![first]);
        assert_eq!(doc.closest_with_attribute(first, "data-trigger"), Some(first));
        doc.remove_attribute(first, "data-trigger");
        assert!(doc.query_attribute("data-trigger").is_empty());
    }
}
