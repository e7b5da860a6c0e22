//! Tab-reachable elements inside the dialog and the wrap-around trap.

use tracing::debug;

use crate::dom::{Document, NodeId, Tag};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabDirection {
    Forward,
    Backward,
}

/// Whether `node` matches the focusable contract: enabled buttons, inputs,
/// selects and textareas, links with a destination, and anything with a
/// non-negative explicit tab index.
///
/// Elements inside a `hidden` subtree are never reachable, nor are hidden
/// inputs.
pub fn is_focusable(doc: &Document, node: NodeId) -> bool {
    let element = doc.get(node);
    let matches_contract = match element.tag() {
        Tag::Button | Tag::Select | Tag::Textarea => !element.has_attribute("disabled"),
        Tag::Input => {
            !element.has_attribute("disabled") && element.attribute("type") != Some("hidden")
        }
        Tag::Anchor => element.has_attribute("href"),
        _ => false,
    } || tab_index(doc, node).is_some_and(|index| index >= 0);

    matches_contract && !doc.ancestors(node).any(|n| doc.get(n).has_attribute("hidden"))
}

fn tab_index(doc: &Document, node: NodeId) -> Option<i32> {
    doc.attribute(node, "tabindex")?.trim().parse().ok()
}

/// Ordered tab-reachable elements of one subtree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FocusSet {
    elements: Vec<NodeId>,
}

impl FocusSet {
    /// Collects the focusable elements below `root` in document order.
    pub fn collect(doc: &Document, root: NodeId) -> Self {
        let elements: Vec<NodeId> = doc
            .descendants(root)
            .into_iter()
            .filter(|node| is_focusable(doc, *node))
            .collect();
        debug!(count = elements.len(), "Recomputed focus set");
        Self { elements }
    }

    /// Keeps only the elements for which `keep` returns true.
    pub fn retain(&mut self, keep: impl FnMut(&NodeId) -> bool) {
        self.elements.retain(keep);
    }

    pub fn first(&self) -> Option<NodeId> {
        self.elements.first().copied()
    }

    pub fn last(&self) -> Option<NodeId> {
        self.elements.last().copied()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.elements.contains(&node)
    }

    pub fn as_slice(&self) -> &[NodeId] {
        &self.elements
    }

    /// Where the trap sends focus when tabbing from `active`.
    ///
    /// Only the boundaries wrap: forward from the last element goes to the
    /// first, backward from the first goes to the last. Anything else is
    /// left to the native tab order.
    pub fn wrap_target(&self, active: Option<NodeId>, direction: TabDirection) -> Option<NodeId> {
        let (first, last) = (self.first()?, self.last()?);
        match direction {
            TabDirection::Forward if active == Some(last) => Some(first),
            TabDirection::Backward if active == Some(first) => Some(last),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Element;
    use proptest::prelude::*;

    #[test]
    fn test_collect_follows_focusable_contract() {
        let mut doc = Document::new();
        let root = doc.append(doc.body(), Element::new(Tag::Div));
        let button = doc.append(root, Element::new(Tag::Button));
        doc.append(root, Element::new(Tag::Button).with_attr("disabled", ""));
        let input = doc.append(root, Element::new(Tag::Input).with_attr("type", "tel"));
        doc.append(root, Element::new(Tag::Input).with_attr("type", "hidden"));
        doc.append(root, Element::new(Tag::Anchor));
        let link = doc.append(root, Element::new(Tag::Anchor).with_attr("href", "/terms"));
        let tabbable = doc.append(root, Element::new(Tag::Div).with_attr("tabindex", "0"));
        doc.append(root, Element::new(Tag::Div).with_attr("tabindex", "-1"));
        doc.append(root, Element::new(Tag::Paragraph));
        let select = doc.append(root, Element::new(Tag::Select));
        let textarea = doc.append(root, Element::new(Tag::Textarea));

        let set = FocusSet::collect(&doc, root);
        assert_eq!(set.as_slice(), &[button, input, link, tabbable, select, textarea]);
        assert_eq!(set.first(), Some(button));
        assert_eq!(set.last(), Some(textarea));
    }

    #[test]
    fn test_hidden_subtree_is_unreachable() {
        let mut doc = Document::new();
        let root = doc.append(doc.body(), Element::new(Tag::Div));
        let hidden = doc.append(root, Element::new(Tag::Div).with_attr("hidden", ""));
        doc.append(hidden, Element::new(Tag::Button));
        let visible = doc.append(root, Element::new(Tag::Button));

        assert_eq!(FocusSet::collect(&doc, root).as_slice(), &[visible]);
    }

    #[test]
    fn test_empty_set_never_wraps() {
        let set = FocusSet::default();
        assert_eq!(set.wrap_target(None, TabDirection::Forward), None);
        assert_eq!(set.wrap_target(None, TabDirection::Backward), None);
    }

    #[test]
    fn test_middle_elements_are_left_to_native_order() {
        let mut doc = Document::new();
        let root = doc.append(doc.body(), Element::new(Tag::Div));
        let nodes: Vec<_> = (0..3)
            .map(|_| doc.append(root, Element::new(Tag::Button)))
            .collect();
        let set = FocusSet::collect(&doc, root);

        assert_eq!(set.wrap_target(Some(nodes[1]), TabDirection::Forward), None);
        assert_eq!(set.wrap_target(Some(nodes[1]), TabDirection::Backward), None);
        assert_eq!(set.wrap_target(Some(nodes[0]), TabDirection::Forward), None);
        assert_eq!(set.wrap_target(None, TabDirection::Forward), None);
    }

    proptest! {
        #[test]
        fn boundaries_wrap_for_any_size(size in 1usize..24) {
            let mut doc = Document::new();
            let root = doc.append(doc.body(), Element::new(Tag::Div));
            for _ in 0..size {
                doc.append(root, Element::new(Tag::Input));
            }
            let set = FocusSet::collect(&doc, root);
            let (first, last) = (set.first().unwrap(), set.last().unwrap());

            prop_assert_eq!(set.len(), size);
            prop_assert_eq!(set.wrap_target(Some(last), TabDirection::Forward), Some(first));
            prop_assert_eq!(set.wrap_target(Some(first), TabDirection::Backward), Some(last));
        }
    }
}
