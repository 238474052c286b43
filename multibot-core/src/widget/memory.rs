//! Headless [`WidgetHost`] that keeps the document in memory and records
//! outbound messages, listeners and timers.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use super::host::{
    ElementKind, HostError, Listener, MessageTarget, NodeId, Parent, ScriptTag, TimerId,
    WidgetHost,
};
use super::ControlMessage;

#[derive(Debug, Clone, PartialEq)]
pub struct MemoryNode {
    pub kind: ElementKind,
    pub attributes: BTreeMap<String, String>,
    pub classes: Vec<String>,
    pub styles: BTreeMap<String, String>,
    pub text: String,
    pub children: Vec<NodeId>,
    pub parent: Option<Parent>,
}

impl MemoryNode {
    fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            attributes: BTreeMap::new(),
            classes: Vec::new(),
            styles: BTreeMap::new(),
            text: String::new(),
            children: Vec::new(),
            parent: None,
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn style(&self, property: &str) -> Option<&str> {
        self.styles.get(property).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PostedMessage {
    pub target: MessageTarget,
    pub message: ControlMessage,
    pub target_origin: String,
}

#[derive(Debug, Default)]
pub struct MemoryHost {
    page_url: String,
    scripts: Vec<ScriptTag>,
    nodes: BTreeMap<NodeId, MemoryNode>,
    head: Vec<NodeId>,
    body: Vec<NodeId>,
    listeners: Vec<Listener>,
    timers: BTreeMap<TimerId, Duration>,
    posted: Vec<PostedMessage>,
    next_id: u64,
    frame_unavailable: bool,
}

impl MemoryHost {
    pub fn new(page_url: impl Into<String>) -> Self {
        Self {
            page_url: page_url.into(),
            ..Default::default()
        }
    }

    pub fn with_script(mut self, src: impl Into<String>) -> Self {
        self.scripts.push(ScriptTag::new(src));
        self
    }

    /// Add a script tag carrying `data-auto-init`.
    pub fn with_auto_init_script(mut self, src: impl Into<String>) -> Self {
        self.scripts.push(ScriptTag::auto_init(src));
        self
    }

    /// Make every frame `post_message` fail, as when the iframe has not
    /// navigated yet.
    pub fn set_frame_unavailable(&mut self, unavailable: bool) {
        self.frame_unavailable = unavailable;
    }

    pub fn node(&self, id: NodeId) -> Option<&MemoryNode> {
        self.nodes.get(&id)
    }

    pub fn head(&self) -> &[NodeId] {
        &self.head
    }

    pub fn body(&self) -> &[NodeId] {
        &self.body
    }

    /// Attached nodes carrying `class`, in document order.
    pub fn query_class(&self, class: &str) -> Vec<NodeId> {
        let mut found = Vec::new();
        for root in self.head.iter().chain(self.body.iter()) {
            self.collect(*root, &mut |id, node| {
                if node.has_class(class) {
                    found.push(id);
                }
            });
        }
        found
    }

    /// Attached nodes carrying attribute `name`, in document order.
    pub fn query_attribute(&self, name: &str) -> Vec<NodeId> {
        let mut found = Vec::new();
        for root in self.head.iter().chain(self.body.iter()) {
            self.collect(*root, &mut |id, node| {
                if node.attributes.contains_key(name) {
                    found.push(id);
                }
            });
        }
        found
    }

    fn collect(&self, id: NodeId, visit: &mut dyn FnMut(NodeId, &MemoryNode)) {
        if let Some(node) = self.nodes.get(&id) {
            visit(id, node);
            for child in &node.children {
                self.collect(*child, visit);
            }
        }
    }

    pub fn posted(&self) -> &[PostedMessage] {
        &self.posted
    }

    pub fn take_posted(&mut self) -> Vec<PostedMessage> {
        std::mem::take(&mut self.posted)
    }

    pub fn listeners(&self) -> &[Listener] {
        &self.listeners
    }

    pub fn pending_timers(&self) -> Vec<TimerId> {
        self.timers.keys().copied().collect()
    }

    pub fn timer_delay(&self, id: TimerId) -> Option<Duration> {
        self.timers.get(&id).copied()
    }

    /// Remove a timer so the caller can deliver it with `on_timer`.
    pub fn fire_timer(&mut self, id: TimerId) -> bool {
        self.timers.remove(&id).is_some()
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut MemoryNode, HostError> {
        self.nodes.get_mut(&id).ok_or(HostError::NodeMissing(id))
    }

    fn detach(&mut self, id: NodeId) {
        let parent = self.nodes.get(&id).and_then(|n| n.parent);
        match parent {
            Some(Parent::Head) => self.head.retain(|n| *n != id),
            Some(Parent::Body) => self.body.retain(|n| *n != id),
            Some(Parent::Node(p)) => {
                if let Some(parent) = self.nodes.get_mut(&p) {
                    parent.children.retain(|n| *n != id);
                }
            }
            None => {}
        }
        if let Some(node) = self.nodes.get_mut(&id) {
            node.parent = None;
        }
    }

    fn drop_subtree(&mut self, id: NodeId) {
        if let Some(node) = self.nodes.remove(&id) {
            for child in node.children {
                self.drop_subtree(child);
            }
        }
    }
}

impl WidgetHost for MemoryHost {
    fn page_url(&self) -> String {
        self.page_url.clone()
    }

    fn scripts(&self) -> Vec<ScriptTag> {
        self.scripts.clone()
    }

    fn create_element(&mut self, kind: ElementKind) -> Result<NodeId, HostError> {
        self.next_id += 1;
        let id = NodeId(self.next_id);
        self.nodes.insert(id, MemoryNode::new(kind));
        Ok(id)
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), HostError> {
        self.node_mut(node)?
            .attributes
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn set_class_name(&mut self, node: NodeId, class_name: &str) -> Result<(), HostError> {
        self.node_mut(node)?.classes = class_name.split_whitespace().map(str::to_string).collect();
        Ok(())
    }

    fn add_class(&mut self, node: NodeId, class: &str) -> Result<(), HostError> {
        let node = self.node_mut(node)?;
        if !node.has_class(class) {
            node.classes.push(class.to_string());
        }
        Ok(())
    }

    fn remove_class(&mut self, node: NodeId, class: &str) -> Result<(), HostError> {
        self.node_mut(node)?.classes.retain(|c| c != class);
        Ok(())
    }

    fn set_style(&mut self, node: NodeId, property: &str, value: &str) -> Result<(), HostError> {
        self.node_mut(node)?
            .styles
            .insert(property.to_string(), value.to_string());
        Ok(())
    }

    fn set_text(&mut self, node: NodeId, text: &str) -> Result<(), HostError> {
        self.node_mut(node)?.text = text.to_string();
        Ok(())
    }

    fn append_child(&mut self, parent: Parent, child: NodeId) -> Result<(), HostError> {
        if !self.nodes.contains_key(&child) {
            return Err(HostError::NodeMissing(child));
        }
        if let Parent::Node(p) = parent {
            if p == child {
                return Err(HostError::Dom("cannot append a node to itself".to_string()));
            }
            self.node_mut(p)?;
        }

        self.detach(child);
        match parent {
            Parent::Head => self.head.push(child),
            Parent::Body => self.body.push(child),
            Parent::Node(p) => self.node_mut(p)?.children.push(child),
        }
        self.node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    fn remove_node(&mut self, node: NodeId) -> Result<(), HostError> {
        if !self.nodes.contains_key(&node) {
            return Err(HostError::NodeMissing(node));
        }
        self.detach(node);
        self.drop_subtree(node);
        Ok(())
    }

    fn add_listener(&mut self, listener: Listener) {
        self.listeners.push(listener);
    }

    fn remove_listener(&mut self, listener: Listener) {
        self.listeners.retain(|l| *l != listener);
    }

    fn post_message(
        &mut self,
        target: MessageTarget,
        message: &ControlMessage,
        target_origin: &str,
    ) -> Result<(), HostError> {
        if let MessageTarget::Frame(frame) = target {
            if !self.nodes.contains_key(&frame) {
                return Err(HostError::NodeMissing(frame));
            }
            if self.frame_unavailable {
                return Err(HostError::FrameUnavailable(
                    "contentWindow is null".to_string(),
                ));
            }
        }

        self.posted.push(PostedMessage {
            target,
            message: message.clone(),
            target_origin: target_origin.to_string(),
        });
        Ok(())
    }

    fn set_timeout(&mut self, delay: Duration) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.timers.insert(id, delay);
        id
    }

    fn clear_timeout(&mut self, id: TimerId) {
        self.timers.remove(&id);
    }
}
