use serde_json::Value;
use tracing::{debug, error, info, warn};

use super::host::{ElementKind, HostError, Listener, MessageTarget, NodeId, Parent, TimerId};
use super::resolve::{find_widget_script, page_origin, resolve_target, ResolvedTarget};
use super::styles::{
    stylesheet, BUTTON_CLASS, CONTAINER_CLASS, HIDDEN_CLASS, IFRAME_CLASS, MINIMIZED_CLASS,
    STYLE_MARKER,
};
use super::{
    is_configuration_error, ControlMessage, Lifecycle, OriginPolicy, ToggleBehavior,
    WidgetConfig, WidgetConfigOverrides, WidgetError, WidgetEvent, WidgetHost, WidgetState,
    TRANSITION_DELAY,
};

const CLOSED_LABEL: &str = "💬";
const CLOSED_TITLE: &str = "Chat with us";
const OPEN_LABEL: &str = "−";
const OPEN_TITLE: &str = "Minimize chat";
const MINIMIZED_TITLE: &str = "Open chat";

/// Nodes and routing owned by a mounted widget.
#[derive(Debug)]
struct Mounted {
    container: NodeId,
    iframe: NodeId,
    button: NodeId,
    stylesheet: Option<NodeId>,
    target: ResolvedTarget,
    frame_origin: Option<String>,
}

/// One widget instance on one host page.
pub struct WidgetController<H: WidgetHost> {
    host: H,
    config: WidgetConfig,
    toggle_behavior: ToggleBehavior,
    lifecycle: Lifecycle,
    mounted: Option<Mounted>,
    pending_hide: Option<TimerId>,
    frame_ready: bool,
    last_frame_error: Option<String>,
}

impl<H: WidgetHost> WidgetController<H> {
    pub fn new(host: H) -> Self {
        Self::with_toggle_behavior(host, ToggleBehavior::default())
    }

    pub fn with_toggle_behavior(host: H, toggle_behavior: ToggleBehavior) -> Self {
        Self {
            host,
            config: WidgetConfig::default(),
            toggle_behavior,
            lifecycle: Lifecycle::Closed,
            mounted: None,
            pending_hide: None,
            frame_ready: false,
            last_frame_error: None,
        }
    }

    /// Merge `overrides` over the current config, resolve the bot and frame
    /// from the page's script tags if needed, and mount the widget.
    ///
    /// A second call while mounted does nothing; call [`Self::destroy`] first.
    pub fn init(&mut self, overrides: WidgetConfigOverrides) {
        if self.mounted.is_some() {
            warn!(
                error_code = WidgetError::AlreadyInitialized.error_code(),
                "Chatbot Widget: {}",
                WidgetError::AlreadyInitialized
            );
            return;
        }

        if let Err(e) = self.try_init(overrides) {
            error!(error_code = e.error_code(), "Chatbot Widget: {}", e);
        }
    }

    fn try_init(&mut self, overrides: WidgetConfigOverrides) -> Result<(), WidgetError> {
        self.config.merge(overrides);

        let page_url = self.host.page_url();
        let scripts = if self.config.bot_id.is_none() || self.config.iframe_url.is_none() {
            self.host.scripts()
        } else {
            Vec::new()
        };

        let target = resolve_target(
            self.config.bot_id.as_deref(),
            self.config.iframe_url.as_deref(),
            &scripts,
            &page_url,
        )?;
        self.config.bot_id = Some(target.bot_id.clone());
        self.config.iframe_url = Some(target.iframe_url.clone());

        info!(
            bot_id = %target.bot_id,
            iframe_url = %target.iframe_url,
            position = %self.config.position,
            "Chatbot Widget: Initializing"
        );

        let frame_origin = target.frame_origin(&page_url);
        if frame_origin.is_none() {
            warn!(
                "Chatbot Widget: could not determine the frame origin of '{}'; messages to the frame will be dropped",
                target.iframe_url
            );
        }

        let mounted = mount(&mut self.host, &self.config, target, frame_origin)?;

        self.host.add_listener(Listener::ToggleClick(mounted.button));
        self.host.add_listener(Listener::WindowMessage);
        self.host.add_listener(Listener::FrameLoad(mounted.iframe));

        self.mounted = Some(mounted);
        self.lifecycle = Lifecycle::Closed;
        self.frame_ready = false;
        self.last_frame_error = None;
        Ok(())
    }

    /// Mounted and the iframe exists. Says nothing about whether the frame
    /// has loaded its bot; poll with a [`super::ReadinessPolicy`] or watch
    /// [`Self::is_frame_ready`].
    pub fn is_ready(&self) -> bool {
        self.mounted.is_some()
    }

    /// The frame has announced `CHATBOT_READY`.
    pub fn is_frame_ready(&self) -> bool {
        self.frame_ready
    }

    pub fn last_frame_error(&self) -> Option<&str> {
        self.last_frame_error.as_deref()
    }

    pub fn open(&mut self) {
        self.handle(WidgetEvent::Open);
    }

    pub fn close(&mut self) {
        self.handle(WidgetEvent::Close);
    }

    pub fn minimize(&mut self) {
        self.handle(WidgetEvent::Minimize);
    }

    pub fn toggle(&mut self) {
        self.handle(WidgetEvent::Toggle);
    }

    /// Inject `text` into the chat. Only delivered while open.
    pub fn send_message(&mut self, text: impl Into<String>) {
        if self.mounted.is_none() || self.lifecycle != Lifecycle::Open {
            error!(
                error_code = WidgetError::NotOpen.error_code(),
                "Chatbot Widget: {}",
                WidgetError::NotOpen
            );
            return;
        }

        self.post_to_frame(ControlMessage::SendMessage {
            message: text.into(),
        });
    }

    /// Merge `overrides` into the live config. A mounted widget gets a
    /// fresh stylesheet; the container is reused.
    ///
    /// `bot_id` and `iframe_url` only take effect at `init`; while mounted
    /// they are dropped so `config()` keeps describing the live frame.
    pub fn update_config(&mut self, mut overrides: WidgetConfigOverrides) {
        if self.mounted.is_some() {
            if let Some(bot_id) = overrides.bot_id.take() {
                debug!(bot_id = %bot_id, "Chatbot Widget: ignoring bot_id change while mounted");
            }
            if let Some(iframe_url) = overrides.iframe_url.take() {
                debug!(iframe_url = %iframe_url, "Chatbot Widget: ignoring iframe_url change while mounted");
            }
        }
        self.config.merge(overrides);

        let Some(mounted) = self.mounted.as_mut() else {
            return;
        };

        if let Some(old) = mounted.stylesheet.take() {
            if let Err(e) = self.host.remove_node(old) {
                debug!("Chatbot Widget: stale stylesheet already gone: {}", e);
            }
        }

        match inject_stylesheet(&mut self.host, &self.config) {
            Ok(node) => mounted.stylesheet = Some(node),
            Err(e) => error!("Chatbot Widget: failed to re-apply styles: {}", e),
        }

        let restyle = apply_layout(&mut self.host, &self.config, mounted);
        if let Err(e) = restyle {
            error!("Chatbot Widget: failed to apply layout: {}", e);
        }
    }

    /// Unmount, detach listeners and cancel timers. Safe to call at any time.
    pub fn destroy(&mut self) {
        self.cancel_pending_hide();

        match self.mounted.take() {
            Some(mounted) => {
                self.host.remove_listener(Listener::ToggleClick(mounted.button));
                self.host.remove_listener(Listener::WindowMessage);
                self.host.remove_listener(Listener::FrameLoad(mounted.iframe));

                if let Err(e) = self.host.remove_node(mounted.container) {
                    debug!("Chatbot Widget: container already removed: {}", e);
                }
                if let Some(style) = mounted.stylesheet {
                    if let Err(e) = self.host.remove_node(style) {
                        debug!("Chatbot Widget: stylesheet already removed: {}", e);
                    }
                }

                info!("Chatbot widget destroyed");
            }
            None => debug!("Chatbot Widget: destroy() on a widget that is not mounted"),
        }

        self.lifecycle = Lifecycle::Closed;
        self.frame_ready = false;
        self.last_frame_error = None;
    }

    pub fn state(&self) -> WidgetState {
        WidgetState::new(self.lifecycle, self.mounted.is_some())
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    pub fn toggle_behavior(&self) -> ToggleBehavior {
        self.toggle_behavior
    }

    pub fn target(&self) -> Option<&ResolvedTarget> {
        self.mounted.as_ref().map(|m| &m.target)
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    // ------------------------------------------------------------------
    // Host event entry points
    // ------------------------------------------------------------------

    /// `DOMContentLoaded` fired. Self-initializes when the widget's own
    /// script tag carries `data-auto-init`; otherwise the page calls `init`.
    pub fn on_dom_content_loaded(&mut self) {
        let scripts = self.host.scripts();
        match find_widget_script(&scripts) {
            Some(tag) if tag.auto_init => {
                debug!(src = %tag.src, "Chatbot Widget: auto-initializing");
                self.init(WidgetConfigOverrides::default());
            }
            _ => debug!("Chatbot Widget: no data-auto-init; waiting for init()"),
        }
    }

    pub fn on_toggle_click(&mut self) {
        self.toggle();
    }

    /// The iframe finished navigating.
    pub fn on_frame_load(&mut self) {
        if self.mounted.is_none() {
            return;
        }

        let Some(origin) = page_origin(&self.host.page_url()) else {
            warn!("Chatbot Widget: page has no origin; not announcing frame load");
            return;
        };

        if let Err(e) = self
            .host
            .post_message(MessageTarget::Parent, &ControlMessage::Ready, &origin)
        {
            error!("Chatbot Widget: error announcing frame load: {}", e);
        }
    }

    /// A timer scheduled through the host fired.
    pub fn on_timer(&mut self, id: TimerId) {
        if self.pending_hide != Some(id) {
            debug!(?id, "Chatbot Widget: ignoring stale timer");
            return;
        }
        self.pending_hide = None;

        let Some(iframe) = self.mounted.as_ref().map(|m| m.iframe) else {
            return;
        };
        if self.lifecycle == Lifecycle::Open {
            return;
        }

        self.dom("hide iframe", |host| {
            host.set_style(iframe, "display", "none")?;
            host.add_class(iframe, HIDDEN_CLASS)
        });
    }

    /// A window `message` event arrived from `origin`.
    pub fn on_message(&mut self, origin: &str, data: &Value) {
        if self.mounted.is_none() {
            return;
        }

        if !self.accepts_origin(origin) {
            debug!(origin, "Chatbot Widget: ignoring message from unexpected origin");
            return;
        }

        let Some(message) = ControlMessage::from_value(data) else {
            debug!(origin, "Chatbot Widget: ignoring unrecognised message");
            return;
        };

        match message {
            ControlMessage::Ready => {
                info!("Chatbot iframe is ready");
                self.frame_ready = true;
            }
            ControlMessage::MessageSent { message } => {
                info!("Message sent: {}", message);
            }
            ControlMessage::Error { error } => {
                error!("Chatbot error: {}", error);
                if is_configuration_error(&error) {
                    error!("Bot configuration error. Please check the bot ID.");
                }
                self.last_frame_error = Some(error);
            }
            other => {
                debug!(
                    message_type = other.type_name(),
                    "Chatbot Widget: ignoring frame-bound message type"
                );
            }
        }
    }

    fn accepts_origin(&self, origin: &str) -> bool {
        match &self.config.origin_policy {
            OriginPolicy::SamePage => {
                page_origin(&self.host.page_url()).as_deref() == Some(origin)
            }
            OriginPolicy::FrameOrigin => self
                .mounted
                .as_ref()
                .and_then(|m| m.frame_origin.as_deref())
                == Some(origin),
            OriginPolicy::AllowList(origins) => origins.iter().any(|o| o == origin),
        }
    }

    fn handle(&mut self, event: WidgetEvent) {
        if self.mounted.is_none() {
            error!(
                error_code = WidgetError::NotInitialized.error_code(),
                "Chatbot Widget: {}",
                WidgetError::NotInitialized
            );
            return;
        }

        match self.lifecycle.transition(event, self.toggle_behavior) {
            Some(next) => {
                debug!(?event, from = ?self.lifecycle, to = ?next, "Chatbot Widget: transition");
                self.lifecycle = next;
                self.enter(next);
            }
            None => debug!(?event, state = ?self.lifecycle, "Chatbot Widget: no-op"),
        }
    }

    fn enter(&mut self, next: Lifecycle) {
        let Some((iframe, button)) = self.mounted.as_ref().map(|m| (m.iframe, m.button)) else {
            return;
        };

        match next {
            Lifecycle::Open => {
                self.cancel_pending_hide();
                self.dom("show iframe", |host| {
                    host.set_style(iframe, "display", "block")?;
                    host.remove_class(iframe, MINIMIZED_CLASS)?;
                    host.remove_class(iframe, HIDDEN_CLASS)
                });
                self.dom("update toggle button", |host| {
                    host.set_text(button, OPEN_LABEL)?;
                    host.set_attribute(button, "title", OPEN_TITLE)?;
                    host.remove_class(button, MINIMIZED_CLASS)
                });
                self.post_to_frame(ControlMessage::Open);
            }
            Lifecycle::Closed => {
                self.dom("update toggle button", |host| {
                    host.set_text(button, CLOSED_LABEL)?;
                    host.set_attribute(button, "title", CLOSED_TITLE)?;
                    host.remove_class(button, MINIMIZED_CLASS)
                });
                self.schedule_hide();
                self.post_to_frame(ControlMessage::Close);
            }
            Lifecycle::Minimized => {
                self.dom("minimize iframe", |host| {
                    host.add_class(iframe, MINIMIZED_CLASS)
                });
                self.dom("update toggle button", |host| {
                    host.set_text(button, CLOSED_LABEL)?;
                    host.set_attribute(button, "title", MINIMIZED_TITLE)?;
                    host.add_class(button, MINIMIZED_CLASS)
                });
                self.schedule_hide();
                self.post_to_frame(ControlMessage::Minimize);
            }
        }
    }

    fn schedule_hide(&mut self) {
        self.cancel_pending_hide();
        self.pending_hide = Some(self.host.set_timeout(TRANSITION_DELAY));
    }

    fn cancel_pending_hide(&mut self) {
        if let Some(id) = self.pending_hide.take() {
            self.host.clear_timeout(id);
        }
    }

    fn post_to_frame(&mut self, message: ControlMessage) {
        let Some(mounted) = self.mounted.as_ref() else {
            return;
        };
        let iframe = mounted.iframe;
        let Some(origin) = mounted.frame_origin.clone() else {
            warn!(
                message_type = message.type_name(),
                "Chatbot Widget: no frame origin, message dropped"
            );
            return;
        };

        match self
            .host
            .post_message(MessageTarget::Frame(iframe), &message, &origin)
        {
            Ok(()) => debug!(message_type = message.type_name(), "Posted to frame"),
            Err(e) => error!("Error sending message to iframe: {}", e),
        }
    }

    fn dom<F>(&mut self, what: &str, op: F)
    where
        F: FnOnce(&mut H) -> Result<(), HostError>,
    {
        if let Err(e) = op(&mut self.host) {
            error!("Chatbot Widget: failed to {}: {}", what, e);
        }
    }
}

fn container_class(config: &WidgetConfig) -> String {
    format!("{} {}", CONTAINER_CLASS, config.position.as_class())
}

fn inject_stylesheet<H: WidgetHost>(host: &mut H, config: &WidgetConfig) -> Result<NodeId, HostError> {
    let style = host.create_element(ElementKind::Style)?;
    let result = host
        .set_attribute(style, STYLE_MARKER, "")
        .and_then(|_| host.set_text(style, &stylesheet(config)))
        .and_then(|_| host.append_child(Parent::Head, style));

    match result {
        Ok(()) => Ok(style),
        Err(e) => {
            let _ = host.remove_node(style);
            Err(e)
        }
    }
}

fn apply_layout<H: WidgetHost>(
    host: &mut H,
    config: &WidgetConfig,
    mounted: &Mounted,
) -> Result<(), HostError> {
    host.set_class_name(mounted.container, &container_class(config))?;
    host.set_style(mounted.iframe, "width", &config.width)?;
    host.set_style(mounted.iframe, "height", &config.height)
}

/// Build stylesheet, container, iframe and button. On failure every node
/// created so far is removed again.
fn mount<H: WidgetHost>(
    host: &mut H,
    config: &WidgetConfig,
    target: ResolvedTarget,
    frame_origin: Option<String>,
) -> Result<Mounted, HostError> {
    let stylesheet = inject_stylesheet(host, config)?;
    let mut created = vec![stylesheet];

    let result = build_nodes(host, config, &target, &mut created);
    match result {
        Ok((container, iframe, button)) => Ok(Mounted {
            container,
            iframe,
            button,
            stylesheet: Some(stylesheet),
            target,
            frame_origin,
        }),
        Err(e) => {
            for node in created.into_iter().rev() {
                let _ = host.remove_node(node);
            }
            Err(e)
        }
    }
}

fn build_nodes<H: WidgetHost>(
    host: &mut H,
    config: &WidgetConfig,
    target: &ResolvedTarget,
    created: &mut Vec<NodeId>,
) -> Result<(NodeId, NodeId, NodeId), HostError> {
    let container = host.create_element(ElementKind::Div)?;
    created.push(container);
    host.set_class_name(container, &container_class(config))?;

    let iframe = host.create_element(ElementKind::Iframe)?;
    created.push(iframe);
    let src = target.frame_src();
    debug!("Chatbot Widget: Creating iframe with URL: {}", src);
    host.set_attribute(iframe, "src", &src)?;
    host.set_class_name(iframe, IFRAME_CLASS)?;
    host.set_style(iframe, "width", &config.width)?;
    host.set_style(iframe, "height", &config.height)?;
    host.set_style(iframe, "display", "none")?;
    host.add_class(iframe, HIDDEN_CLASS)?;

    let button = host.create_element(ElementKind::Button)?;
    created.push(button);
    host.set_class_name(button, BUTTON_CLASS)?;
    host.set_text(button, CLOSED_LABEL)?;
    host.set_attribute(button, "title", CLOSED_TITLE)?;

    host.append_child(Parent::Node(container), iframe)?;
    host.append_child(Parent::Node(container), button)?;
    host.append_child(Parent::Body, container)?;

    Ok((container, iframe, button))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::{MemoryHost, PostedMessage, ScriptTag};
    use serde_json::json;
    use std::time::Duration;

    const PAGE: &str = "https://shop.test/checkout";
    const SCRIPT: &str = "https://bots.test/chatbot-widget.js?bot-id=abc123";

    fn mounted() -> WidgetController<MemoryHost> {
        let mut widget = WidgetController::new(MemoryHost::new(PAGE).with_script(SCRIPT));
        widget.init(WidgetConfigOverrides::default());
        assert!(widget.is_ready());
        widget
    }

    fn iframe(widget: &WidgetController<MemoryHost>) -> NodeId {
        widget.host().query_class(IFRAME_CLASS)[0]
    }

    fn button(widget: &WidgetController<MemoryHost>) -> NodeId {
        widget.host().query_class(BUTTON_CLASS)[0]
    }

    fn posted_types(widget: &mut WidgetController<MemoryHost>) -> Vec<&'static str> {
        widget
            .host_mut()
            .take_posted()
            .into_iter()
            .map(|p| p.message.type_name())
            .collect()
    }

    #[test]
    fn test_hide_is_deferred_until_timer_fires() {
        let mut widget = mounted();
        widget.open();
        widget.close();

        let frame = iframe(&widget);
        assert_eq!(widget.host().node(frame).unwrap().style("display"), Some("block"));

        let timers = widget.host().pending_timers();
        assert_eq!(timers.len(), 1);
        assert_eq!(widget.host().timer_delay(timers[0]), Some(TRANSITION_DELAY));

        assert!(widget.host_mut().fire_timer(timers[0]));
        widget.on_timer(timers[0]);

        let node = widget.host().node(frame).unwrap();
        assert_eq!(node.style("display"), Some("none"));
        assert!(node.has_class(HIDDEN_CLASS));
    }

    #[test]
    fn test_reopen_cancels_pending_hide() {
        let mut widget = mounted();
        widget.open();
        widget.minimize();
        let stale = widget.host().pending_timers()[0];

        widget.open();
        assert!(widget.host().pending_timers().is_empty());

        // A host that delivers the timer anyway must not hide an open frame.
        widget.on_timer(stale);
        let node = widget.host().node(iframe(&widget)).unwrap();
        assert_eq!(node.style("display"), Some("block"));
        assert!(!node.has_class(HIDDEN_CLASS));
    }

    #[test]
    fn test_destroy_clears_timers_and_listeners() {
        let mut widget = mounted();
        widget.open();
        widget.close();
        assert_eq!(widget.host().pending_timers().len(), 1);
        assert_eq!(widget.host().listeners().len(), 3);

        widget.destroy();
        assert!(widget.host().pending_timers().is_empty());
        assert!(widget.host().listeners().is_empty());
        assert!(widget.host().body().is_empty());
        assert!(widget.host().head().is_empty());
    }

    #[test]
    fn test_button_labels_follow_state() {
        let mut widget = mounted();
        let btn = button(&widget);

        widget.open();
        let node = widget.host().node(btn).unwrap();
        assert_eq!(node.text, "−");
        assert_eq!(node.attribute("title"), Some("Minimize chat"));

        widget.minimize();
        let node = widget.host().node(btn).unwrap();
        assert_eq!(node.text, "💬");
        assert_eq!(node.attribute("title"), Some("Open chat"));
        assert!(node.has_class(MINIMIZED_CLASS));

        widget.close();
        let node = widget.host().node(btn).unwrap();
        assert_eq!(node.attribute("title"), Some("Chat with us"));
        assert!(!node.has_class(MINIMIZED_CLASS));
    }

    #[test]
    fn test_outbound_messages_scoped_to_frame_origin() {
        let mut widget = mounted();
        widget.open();
        widget.send_message("hi");

        let posted = widget.host_mut().take_posted();
        assert_eq!(posted.len(), 2);
        for PostedMessage { target_origin, .. } in &posted {
            assert_eq!(target_origin, "https://bots.test");
            assert_ne!(target_origin, "*");
        }
        assert_eq!(
            posted[1].message,
            ControlMessage::SendMessage {
                message: "hi".to_string()
            }
        );
    }

    #[test]
    fn test_toggle_close_variant() {
        let mut widget = WidgetController::with_toggle_behavior(
            MemoryHost::new(PAGE).with_script(SCRIPT),
            ToggleBehavior::Close,
        );
        widget.init(WidgetConfigOverrides::default());

        widget.on_toggle_click();
        assert_eq!(widget.lifecycle(), Lifecycle::Open);
        widget.on_toggle_click();
        assert_eq!(widget.lifecycle(), Lifecycle::Closed);
        assert_eq!(posted_types(&mut widget), vec!["CHATBOT_OPEN", "CHATBOT_CLOSE"]);
    }

    #[test]
    fn test_post_failure_is_swallowed() {
        let mut widget = mounted();
        widget.host_mut().set_frame_unavailable(true);

        widget.open();
        assert_eq!(widget.lifecycle(), Lifecycle::Open);
        assert!(widget.host().posted().is_empty());
    }

    #[test]
    fn test_frame_load_announces_ready_to_parent() {
        let mut widget = mounted();
        widget.on_frame_load();

        let posted = widget.host().posted();
        assert_eq!(posted.len(), 1);
        assert_eq!(posted[0].target, MessageTarget::Parent);
        assert_eq!(posted[0].message, ControlMessage::Ready);
        assert_eq!(posted[0].target_origin, "https://shop.test");
    }

    #[test]
    fn test_frame_origin_policy() {
        let mut widget = mounted();

        widget.on_message("https://shop.test", &json!({ "type": "CHATBOT_READY" }));
        assert!(!widget.is_frame_ready());

        widget.on_message("https://bots.test", &json!({ "type": "CHATBOT_READY" }));
        assert!(widget.is_frame_ready());
    }

    #[test]
    fn test_same_page_policy_drops_cross_origin_frame() {
        let mut widget = WidgetController::new(MemoryHost::new(PAGE).with_script(SCRIPT));
        widget.init(WidgetConfigOverrides::default().with_origin_policy(OriginPolicy::SamePage));

        widget.on_message("https://bots.test", &json!({ "type": "CHATBOT_READY" }));
        assert!(!widget.is_frame_ready());

        widget.on_message("https://shop.test", &json!({ "type": "CHATBOT_READY" }));
        assert!(widget.is_frame_ready());
    }

    #[test]
    fn test_allow_list_policy() {
        let mut widget = WidgetController::new(MemoryHost::new(PAGE).with_script(SCRIPT));
        widget.init(WidgetConfigOverrides::default().with_origin_policy(
            OriginPolicy::AllowList(vec!["https://cdn.bots.test".to_string()]),
        ));

        widget.on_message("https://bots.test", &json!({ "type": "CHATBOT_READY" }));
        assert!(!widget.is_frame_ready());
        widget.on_message("https://cdn.bots.test", &json!({ "type": "CHATBOT_READY" }));
        assert!(widget.is_frame_ready());
    }

    #[test]
    fn test_inbound_error_is_recorded() {
        let mut widget = mounted();
        widget.on_message(
            "https://bots.test",
            &json!({ "type": "CHATBOT_ERROR", "error": "Bot not found. Please check your bot ID." }),
        );
        assert_eq!(
            widget.last_frame_error(),
            Some("Bot not found. Please check your bot ID.")
        );

        widget.on_message("https://bots.test", &json!({ "garbage": true }));
        widget.on_message("https://bots.test", &json!(42));
        assert_eq!(widget.state(), WidgetState::new(Lifecycle::Closed, true));
    }

    #[test]
    fn test_double_init_is_noop() {
        let mut widget = mounted();
        widget.init(WidgetConfigOverrides::bot("other"));

        assert_eq!(widget.host().query_class(CONTAINER_CLASS).len(), 1);
        assert_eq!(widget.host().query_attribute(STYLE_MARKER).len(), 1);
        assert_eq!(widget.config().bot_id.as_deref(), Some("abc123"));
    }

    #[test]
    fn test_update_config_keeps_target_while_mounted() {
        let mut widget = mounted();
        widget.update_config(WidgetConfigOverrides {
            bot_id: Some("other".to_string()),
            iframe_url: Some("https://elsewhere.test/embed".to_string()),
            primary_color: Some("#000000".to_string()),
            ..Default::default()
        });

        let target = widget.target().unwrap().clone();
        assert_eq!(widget.config().bot_id.as_deref(), Some(target.bot_id.as_str()));
        assert_eq!(widget.config().iframe_url.as_deref(), Some(target.iframe_url.as_str()));
        assert_eq!(target.bot_id, "abc123");
        assert_eq!(widget.config().primary_color, "#000000");
    }

    #[test]
    fn test_update_config_before_init_sets_target() {
        let mut widget = WidgetController::new(MemoryHost::new(PAGE).with_script(SCRIPT));
        widget.update_config(WidgetConfigOverrides::bot("early"));
        widget.init(WidgetConfigOverrides::default());

        assert_eq!(widget.target().unwrap().bot_id, "early");
    }

    #[test]
    fn test_dom_content_loaded_honours_own_tag_only() {
        let host = MemoryHost::new(PAGE)
            .with_auto_init_script("https://cdn.test/other.js")
            .with_script(SCRIPT);
        let mut widget = WidgetController::new(host);
        widget.on_dom_content_loaded();
        assert!(!widget.is_ready());

        let host = MemoryHost::new(PAGE).with_auto_init_script(SCRIPT);
        let mut widget = WidgetController::new(host);
        widget.on_dom_content_loaded();
        assert!(widget.is_ready());
        assert!(widget.host().scripts().iter().all(|t: &ScriptTag| t.auto_init));
    }

    #[test]
    fn test_reinit_after_destroy() {
        let mut widget = mounted();
        widget.destroy();
        widget.init(WidgetConfigOverrides::default());

        assert!(widget.is_ready());
        assert_eq!(widget.host().query_class(CONTAINER_CLASS).len(), 1);
    }

    /// Fails whenever a toggle button is created.
    struct NoButtons(MemoryHost);

    impl WidgetHost for NoButtons {
        fn page_url(&self) -> String {
            self.0.page_url()
        }
        fn scripts(&self) -> Vec<ScriptTag> {
            self.0.scripts()
        }
        fn create_element(&mut self, kind: ElementKind) -> Result<NodeId, HostError> {
            if kind == ElementKind::Button {
                return Err(HostError::Dom("buttons are disabled".to_string()));
            }
            self.0.create_element(kind)
        }
        fn set_attribute(&mut self, n: NodeId, k: &str, v: &str) -> Result<(), HostError> {
            self.0.set_attribute(n, k, v)
        }
        fn set_class_name(&mut self, n: NodeId, c: &str) -> Result<(), HostError> {
            self.0.set_class_name(n, c)
        }
        fn add_class(&mut self, n: NodeId, c: &str) -> Result<(), HostError> {
            self.0.add_class(n, c)
        }
        fn remove_class(&mut self, n: NodeId, c: &str) -> Result<(), HostError> {
            self.0.remove_class(n, c)
        }
        fn set_style(&mut self, n: NodeId, p: &str, v: &str) -> Result<(), HostError> {
            self.0.set_style(n, p, v)
        }
        fn set_text(&mut self, n: NodeId, t: &str) -> Result<(), HostError> {
            self.0.set_text(n, t)
        }
        fn append_child(&mut self, p: Parent, c: NodeId) -> Result<(), HostError> {
            self.0.append_child(p, c)
        }
        fn remove_node(&mut self, n: NodeId) -> Result<(), HostError> {
            self.0.remove_node(n)
        }
        fn add_listener(&mut self, l: Listener) {
            self.0.add_listener(l)
        }
        fn remove_listener(&mut self, l: Listener) {
            self.0.remove_listener(l)
        }
        fn post_message(
            &mut self,
            t: MessageTarget,
            m: &ControlMessage,
            o: &str,
        ) -> Result<(), HostError> {
            self.0.post_message(t, m, o)
        }
        fn set_timeout(&mut self, d: Duration) -> TimerId {
            self.0.set_timeout(d)
        }
        fn clear_timeout(&mut self, id: TimerId) {
            self.0.clear_timeout(id)
        }
    }

    #[test]
    fn test_failed_mount_rolls_back() {
        let mut widget =
            WidgetController::new(NoButtons(MemoryHost::new(PAGE).with_script(SCRIPT)));
        widget.init(WidgetConfigOverrides::default());

        assert!(!widget.is_ready());
        assert!(!widget.state().is_initialized);
        let host = &widget.host().0;
        assert!(host.body().is_empty());
        assert!(host.head().is_empty());
        assert!(host.listeners().is_empty());

        widget.open();
        assert!(widget.host().0.posted().is_empty());
    }
}
