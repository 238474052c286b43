//! The embeddable chat widget's controller and its cross-document protocol.
//!
//! A [`WidgetController`] owns one widget instance on a host page: it
//! resolves which bot and frame origin to use from its own script tag,
//! mounts the container, iframe and toggle button through a
//! [`WidgetHost`], drives the open/close/minimize lifecycle, and exchanges
//! [`ControlMessage`]s with the embedded chat frame.
//!
//! Nothing here returns errors to host-page code. Failures are logged
//! through `tracing` and the operation becomes a no-op.

mod config;
mod controller;
mod host;
mod memory;
mod protocol;
mod readiness;
mod resolve;
mod state;
mod styles;

use std::time::Duration;

use thiserror::Error;

pub use config::{OriginPolicy, Position, Theme, WidgetConfig, WidgetConfigOverrides};
pub use controller::WidgetController;
pub use host::{
    ElementKind, HostError, Listener, MessageTarget, NodeId, Parent, ScriptTag, TimerId,
    WidgetHost,
};
pub use memory::{MemoryHost, MemoryNode, PostedMessage};
pub use protocol::{is_configuration_error, ControlMessage};
pub use readiness::ReadinessPolicy;
pub use resolve::{
    find_widget_script, page_origin, parse_script_src, resolve_target, ResolvedTarget,
    ScriptParams, EMBED_PATH, WIDGET_SCRIPT_NAME,
};
pub use state::{Lifecycle, ToggleBehavior, WidgetEvent, WidgetState};
pub use styles::{
    stylesheet, BUTTON_CLASS, CONTAINER_CLASS, HIDDEN_CLASS, IFRAME_CLASS, MINIMIZED_CLASS,
    STYLE_MARKER,
};

/// How long hides wait for the CSS transition before applying `display: none`.
pub const TRANSITION_DELAY: Duration = Duration::from_millis(300);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WidgetError {
    #[error("[E6001] Bot ID not specified. Please provide a bot-id parameter in the script URL.")]
    MissingBotId,

    #[error("[E6002] Could not determine iframe URL. Please check the script src.")]
    UnresolvedFrameUrl,

    #[error("[E6003] Widget not fully initialized yet")]
    NotInitialized,

    #[error("[E6004] Widget already initialized; call destroy() first")]
    AlreadyInitialized,

    #[error("[E6005] Cannot send message - widget not ready, iframe not ready, or chat not open")]
    NotOpen,

    #[error("[E6006] Embedded frame not ready after {attempts} attempts")]
    ReadinessTimeout { attempts: u32 },

    #[error(transparent)]
    Host(#[from] HostError),
}

impl WidgetError {
    pub fn error_code(&self) -> &'static str {
        match self {
            WidgetError::MissingBotId => "E6001",
            WidgetError::UnresolvedFrameUrl => "E6002",
            WidgetError::NotInitialized => "E6003",
            WidgetError::AlreadyInitialized => "E6004",
            WidgetError::NotOpen => "E6005",
            WidgetError::ReadinessTimeout { .. } => "E6006",
            WidgetError::Host(HostError::NodeMissing(_)) => "E6101",
            WidgetError::Host(HostError::FrameUnavailable(_)) => "E6102",
            WidgetError::Host(HostError::Dom(_)) => "E6103",
        }
    }

    /// Configuration problems a site owner has to fix in the embed snippet.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            WidgetError::MissingBotId | WidgetError::UnresolvedFrameUrl
        )
    }
}
