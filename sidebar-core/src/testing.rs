//! In-memory host document and view used by unit and integration tests.
//!
//! `FakeDocument` models just enough of the page: a body with a task list
//! under it, popovers attached to the body, a disclosure control that can
//! stage a popover to appear a few polls after it is clicked, and the
//! sidebar panel itself.

use crate::host::HostDocument;
use crate::host::Location;
use crate::view::RenderModel;
use crate::view::View;
use std::cell::Cell;
use std::cell::RefCell;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FakeNode(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Body,
    List,
    Element,
    Overlay,
    Control,
    Disclosure,
    Row,
    Header,
    Fragment,
    Panel,
}

#[derive(Debug)]
struct NodeData {
    kind: Kind,
    text: String,
    parent: Option<FakeNode>,
    children: Vec<FakeNode>,
    hidden: bool,
}

#[derive(Debug)]
struct StagedOverlay {
    marker: Option<String>,
    controls: Vec<String>,
    /// Calls to `overlays()` left before the popover attaches, once armed.
    remaining_polls: usize,
    armed: bool,
}

#[derive(Debug)]
struct Inner {
    location: Location,
    nodes: Vec<NodeData>,
    staged: Option<StagedOverlay>,
    disclosure_activations: usize,
    control_activations: Vec<String>,
}

const BODY: FakeNode = FakeNode(0);
const LIST: FakeNode = FakeNode(1);

#[derive(Debug)]
pub struct FakeDocument {
    inner: RefCell<Inner>,
}

impl FakeDocument {
    pub fn new(location: Location) -> Self {
        let body = NodeData {
            kind: Kind::Body,
            text: String::new(),
            parent: None,
            children: vec![LIST],
            hidden: false,
        };
        let list = NodeData {
            kind: Kind::List,
            text: String::new(),
            parent: Some(BODY),
            children: Vec::new(),
            hidden: false,
        };
        Self {
            inner: RefCell::new(Inner {
                location,
                nodes: vec![body, list],
                staged: None,
                disclosure_activations: 0,
                control_activations: Vec::new(),
            }),
        }
    }

    pub fn on_codex() -> Self {
        Self::new(Location::from_parts(
            "https://chatgpt.com/codex",
            "https://chatgpt.com",
            "/codex",
        ))
    }

    pub fn set_location(&self, location: Location) {
        self.inner.borrow_mut().location = location;
    }

    pub fn body(&self) -> FakeNode {
        BODY
    }

    /// Container the task rows and section headers live in.
    pub fn list(&self) -> FakeNode {
        LIST
    }

    pub fn add_disclosure(&self, label: &str) -> FakeNode {
        self.append(BODY, Kind::Disclosure, label)
    }

    /// Attaches an already open popover.
    pub fn open_overlay(&self, marker: Option<&str>, controls: &[&str]) -> FakeNode {
        let overlay = self.append(BODY, Kind::Overlay, "");
        if let Some(marker) = marker {
            self.append(overlay, Kind::Element, marker);
        }
        for label in controls {
            self.append(overlay, Kind::Control, label);
        }
        overlay
    }

    /// The next disclosure click attaches this popover after `delay_polls`
    /// further calls to `overlays()`.
    pub fn stage_overlay(&self, marker: Option<&str>, controls: &[&str], delay_polls: usize) {
        self.inner.borrow_mut().staged = Some(StagedOverlay {
            marker: marker.map(str::to_string),
            controls: controls.iter().map(|c| c.to_string()).collect(),
            remaining_polls: delay_polls,
            armed: false,
        });
    }

    pub fn close_overlays(&self) {
        for overlay in self.attached_of(Kind::Overlay) {
            self.remove(overlay);
        }
    }

    pub fn add_row(&self, fragments: &[&str]) -> FakeNode {
        self.append_row(LIST, fragments)
    }

    /// A wrapper element holding several rows, as the host renders some
    /// sections.
    pub fn add_group(&self, rows: &[&[&str]]) -> FakeNode {
        let group = self.append(LIST, Kind::Element, "");
        for fragments in rows {
            self.append_row(group, fragments);
        }
        group
    }

    pub fn add_header(&self, text: &str) -> FakeNode {
        self.append(LIST, Kind::Header, text)
    }

    pub fn add_panel(&self) -> FakeNode {
        self.append(BODY, Kind::Panel, "")
    }

    pub fn add_child(&self, parent: FakeNode) -> FakeNode {
        self.append(parent, Kind::Element, "")
    }

    /// Detaches `node` and its subtree from the document.
    pub fn remove(&self, node: FakeNode) {
        let mut inner = self.inner.borrow_mut();
        let Some(parent) = inner.nodes[node.0].parent.take() else {
            return;
        };
        inner.nodes[parent.0].children.retain(|child| *child != node);
    }

    pub fn set_row_hidden(&self, row: FakeNode, hidden: bool) {
        self.set_hidden(&row, hidden);
    }

    /// Effective visibility of every attached row, in document order.
    pub fn row_visibility(&self) -> Vec<bool> {
        self.rows().iter().map(|row| !self.is_hidden(row)).collect()
    }

    pub fn disclosure_activations(&self) -> usize {
        self.inner.borrow().disclosure_activations
    }

    pub fn control_activations(&self) -> Vec<String> {
        self.inner.borrow().control_activations.clone()
    }

    fn append(&self, parent: FakeNode, kind: Kind, text: &str) -> FakeNode {
        let mut inner = self.inner.borrow_mut();
        let node = FakeNode(inner.nodes.len());
        inner.nodes.push(NodeData {
            kind,
            text: text.to_string(),
            parent: Some(parent),
            children: Vec::new(),
            hidden: false,
        });
        inner.nodes[parent.0].children.push(node);
        node
    }

    fn append_row(&self, parent: FakeNode, fragments: &[&str]) -> FakeNode {
        let row = self.append(parent, Kind::Row, "");
        for fragment in fragments {
            self.append(row, Kind::Fragment, fragment);
        }
        row
    }

    fn kind(&self, node: FakeNode) -> Kind {
        self.inner.borrow().nodes[node.0].kind
    }

    /// `root` followed by its descendants, depth first.
    fn subtree(&self, root: FakeNode) -> Vec<FakeNode> {
        let inner = self.inner.borrow();
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(inner.nodes[node.0].children.iter().rev().copied());
        }
        out
    }

    fn descendants_of(&self, root: FakeNode, kind: Kind) -> Vec<FakeNode> {
        self.subtree(root)
            .into_iter()
            .skip(1)
            .filter(|node| self.kind(*node) == kind)
            .collect()
    }

    fn attached_of(&self, kind: Kind) -> Vec<FakeNode> {
        self.descendants_of(BODY, kind)
    }

    fn attach_staged_overlay(&self) {
        let ready = {
            let mut inner = self.inner.borrow_mut();
            let due = match inner.staged.as_mut() {
                Some(staged) if staged.armed => {
                    if staged.remaining_polls == 0 {
                        true
                    } else {
                        staged.remaining_polls -= 1;
                        false
                    }
                }
                _ => false,
            };
            if due { inner.staged.take() } else { None }
        };
        if let Some(staged) = ready {
            let controls: Vec<&str> = staged.controls.iter().map(String::as_str).collect();
            self.open_overlay(staged.marker.as_deref(), &controls);
        }
    }
}

impl HostDocument for FakeDocument {
    type Node = FakeNode;

    fn location(&self) -> Location {
        self.inner.borrow().location.clone()
    }

    fn disclosure_control(&self) -> Option<FakeNode> {
        self.attached_of(Kind::Disclosure).into_iter().next()
    }

    fn overlays(&self) -> Vec<FakeNode> {
        self.attach_staged_overlay();
        self.attached_of(Kind::Overlay)
    }

    fn subtree_texts(&self, root: &FakeNode) -> Vec<String> {
        self.subtree(*root)
            .iter()
            .map(|node| self.text(node))
            .collect()
    }

    fn controls_within(&self, root: &FakeNode) -> Vec<FakeNode> {
        self.descendants_of(*root, Kind::Control)
    }

    fn text(&self, node: &FakeNode) -> String {
        let inner = self.inner.borrow();
        self.subtree(*node)
            .iter()
            .map(|n| inner.nodes[n.0].text.as_str())
            .collect()
    }

    fn activate(&self, node: &FakeNode) {
        match self.kind(*node) {
            Kind::Disclosure => {
                let mut inner = self.inner.borrow_mut();
                inner.disclosure_activations += 1;
                if let Some(staged) = inner.staged.as_mut() {
                    staged.armed = true;
                }
            }
            Kind::Control => {
                let label = self.text(node);
                self.inner.borrow_mut().control_activations.push(label);
                let overlay = self
                    .attached_of(Kind::Overlay)
                    .into_iter()
                    .find(|overlay| self.contains(overlay, node));
                if let Some(overlay) = overlay {
                    self.remove(overlay);
                }
            }
            _ => {}
        }
    }

    fn rows(&self) -> Vec<FakeNode> {
        self.attached_of(Kind::Row)
    }

    fn row_fragments(&self, row: &FakeNode) -> Vec<String> {
        self.descendants_of(*row, Kind::Fragment)
            .iter()
            .map(|fragment| self.text(fragment))
            .collect()
    }

    fn headers(&self) -> Vec<FakeNode> {
        self.attached_of(Kind::Header)
    }

    fn next_sibling(&self, node: &FakeNode) -> Option<FakeNode> {
        let inner = self.inner.borrow();
        let parent = inner.nodes[node.0].parent?;
        let siblings = &inner.nodes[parent.0].children;
        let index = siblings.iter().position(|child| child == node)?;
        siblings.get(index + 1).copied()
    }

    fn is_header(&self, node: &FakeNode) -> bool {
        self.kind(*node) == Kind::Header
    }

    fn is_row(&self, node: &FakeNode) -> bool {
        self.kind(*node) == Kind::Row
    }

    fn rows_within(&self, node: &FakeNode) -> Vec<FakeNode> {
        self.descendants_of(*node, Kind::Row)
    }

    fn is_hidden(&self, node: &FakeNode) -> bool {
        let inner = self.inner.borrow();
        let mut cursor = Some(*node);
        while let Some(current) = cursor {
            let data = &inner.nodes[current.0];
            if data.hidden {
                return true;
            }
            cursor = data.parent;
        }
        false
    }

    fn set_hidden(&self, node: &FakeNode, hidden: bool) {
        self.inner.borrow_mut().nodes[node.0].hidden = hidden;
    }

    fn contains(&self, ancestor: &FakeNode, node: &FakeNode) -> bool {
        let inner = self.inner.borrow();
        let mut cursor = Some(*node);
        while let Some(current) = cursor {
            if current == *ancestor {
                return true;
            }
            cursor = inner.nodes[current.0].parent;
        }
        false
    }
}

/// A view that remembers what it was asked to do.
#[derive(Debug, Default)]
pub struct RecordingView {
    panel: Option<FakeNode>,
    renders: RefCell<Vec<RenderModel>>,
    visible: Cell<bool>,
    mounts: Cell<usize>,
}

impl RecordingView {
    /// `panel` is reported as the view's owned root.
    pub fn new(panel: FakeNode) -> Self {
        Self {
            panel: Some(panel),
            ..Self::default()
        }
    }

    pub fn renders(&self) -> Vec<RenderModel> {
        self.renders.borrow().clone()
    }

    pub fn last_render(&self) -> Option<RenderModel> {
        self.renders.borrow().last().cloned()
    }

    pub fn render_count(&self) -> usize {
        self.renders.borrow().len()
    }

    pub fn is_visible(&self) -> bool {
        self.visible.get()
    }

    pub fn mount_count(&self) -> usize {
        self.mounts.get()
    }
}

impl View for RecordingView {
    type Node = FakeNode;

    fn mount(&self) {
        self.mounts.set(self.mounts.get() + 1);
    }

    fn set_visible(&self, visible: bool) {
        self.visible.set(visible);
    }

    fn render(&self, model: &RenderModel) {
        self.renders.borrow_mut().push(model.clone());
    }

    fn owned_roots(&self) -> Vec<FakeNode> {
        self.panel.into_iter().collect()
    }
}
