//! The page the widget is embedded in, as the controller sees it.

use std::time::Duration;

use thiserror::Error;

use super::ControlMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Style,
    Div,
    Iframe,
    Button,
}

impl ElementKind {
    pub fn tag_name(&self) -> &'static str {
        match self {
            ElementKind::Style => "style",
            ElementKind::Div => "div",
            ElementKind::Iframe => "iframe",
            ElementKind::Button => "button",
        }
    }
}

/// A `<script>` element as far as self-configuration cares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptTag {
    pub src: String,
    /// Carries the `data-auto-init` attribute.
    pub auto_init: bool,
}

impl ScriptTag {
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            auto_init: false,
        }
    }

    pub fn auto_init(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            auto_init: true,
        }
    }
}

/// Where a node is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parent {
    Head,
    Body,
    Node(NodeId),
}

/// Event subscriptions the controller holds on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listener {
    /// Clicks on the toggle button; the host calls `on_toggle_click`.
    ToggleClick(NodeId),
    /// Window `message` events; the host calls `on_message`.
    WindowMessage,
    /// Iframe `load`; the host calls `on_frame_load`.
    FrameLoad(NodeId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageTarget {
    /// The content window of an iframe element.
    Frame(NodeId),
    /// `window.parent`.
    Parent,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("[E6101] Node {0:?} does not exist")]
    NodeMissing(NodeId),

    #[error("[E6102] Frame window is not accessible: {0}")]
    FrameUnavailable(String),

    #[error("[E6103] DOM operation failed: {0}")]
    Dom(String),
}

/// Document and window operations the controller needs. An implementation
/// binds these to a real browser; [`super::MemoryHost`] keeps them in memory.
///
/// Events flow the other way: the host calls the controller's `on_*`
/// methods for the listeners it has registered.
pub trait WidgetHost {
    /// `window.location.href`.
    fn page_url(&self) -> String;

    /// Every `<script>` in the document, in order.
    fn scripts(&self) -> Vec<ScriptTag>;

    fn create_element(&mut self, kind: ElementKind) -> Result<NodeId, HostError>;

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), HostError>;

    fn set_class_name(&mut self, node: NodeId, class_name: &str) -> Result<(), HostError>;

    fn add_class(&mut self, node: NodeId, class: &str) -> Result<(), HostError>;

    fn remove_class(&mut self, node: NodeId, class: &str) -> Result<(), HostError>;

    fn set_style(&mut self, node: NodeId, property: &str, value: &str) -> Result<(), HostError>;

    fn set_text(&mut self, node: NodeId, text: &str) -> Result<(), HostError>;

    fn append_child(&mut self, parent: Parent, child: NodeId) -> Result<(), HostError>;

    /// Detach `node` and drop it with its descendants.
    fn remove_node(&mut self, node: NodeId) -> Result<(), HostError>;

    fn add_listener(&mut self, listener: Listener);

    fn remove_listener(&mut self, listener: Listener);

    /// `postMessage(message, target_origin)` on the target window.
    fn post_message(
        &mut self,
        target: MessageTarget,
        message: &ControlMessage,
        target_origin: &str,
    ) -> Result<(), HostError>;

    /// Schedule a one-shot timer; the host calls `on_timer(id)` when it fires.
    fn set_timeout(&mut self, delay: Duration) -> TimerId;

    fn clear_timeout(&mut self, id: TimerId);
}
