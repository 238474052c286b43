use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Position {
    #[default]
    BottomRight,
    BottomLeft,
    TopRight,
    TopLeft,
}

impl Position {
    /// CSS class applied to the container alongside `chatbot-widget-container`.
    pub fn as_class(&self) -> &'static str {
        match self {
            Position::BottomRight => "bottom-right",
            Position::BottomLeft => "bottom-left",
            Position::TopRight => "top-right",
            Position::TopLeft => "top-left",
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_class())
    }
}

impl std::str::FromStr for Position {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bottom-right" => Ok(Position::BottomRight),
            "bottom-left" => Ok(Position::BottomLeft),
            "top-right" => Ok(Position::TopRight),
            "top-left" => Ok(Position::TopLeft),
            other => Err(format!("unknown widget position: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// Which origins the controller accepts inbound frame messages from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "mode", content = "origins")]
pub enum OriginPolicy {
    /// Only the host page's own origin. Drops messages from a cross-origin
    /// frame, so `CHATBOT_READY` and `CHATBOT_ERROR` only arrive when the
    /// widget is served from the page's origin.
    SamePage,
    /// Only the origin of the resolved iframe URL.
    #[default]
    FrameOrigin,
    /// Exactly these origins.
    AllowList(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetConfig {
    pub iframe_url: Option<String>,
    pub position: Position,
    pub width: String,
    pub height: String,
    pub z_index: i64,
    pub primary_color: String,
    pub secondary_color: String,
    pub bot_id: Option<String>,
    pub theme: Theme,
    pub origin_policy: OriginPolicy,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            iframe_url: None,
            position: Position::default(),
            width: "400px".to_string(),
            height: "600px".to_string(),
            z_index: 999_999,
            primary_color: "#2563eb".to_string(),
            secondary_color: "#1e40af".to_string(),
            bot_id: None,
            theme: Theme::default(),
            origin_policy: OriginPolicy::default(),
        }
    }
}

impl WidgetConfig {
    /// Overlay every field `overrides` sets. Caller-supplied values win.
    pub fn merge(&mut self, overrides: WidgetConfigOverrides) {
        if let Some(iframe_url) = overrides.iframe_url {
            self.iframe_url = Some(iframe_url);
        }
        if let Some(position) = overrides.position {
            self.position = position;
        }
        if let Some(width) = overrides.width {
            self.width = width;
        }
        if let Some(height) = overrides.height {
            self.height = height;
        }
        if let Some(z_index) = overrides.z_index {
            self.z_index = z_index;
        }
        if let Some(primary_color) = overrides.primary_color {
            self.primary_color = primary_color;
        }
        if let Some(secondary_color) = overrides.secondary_color {
            self.secondary_color = secondary_color;
        }
        if let Some(bot_id) = overrides.bot_id {
            self.bot_id = Some(bot_id);
        }
        if let Some(theme) = overrides.theme {
            self.theme = theme;
        }
        if let Some(origin_policy) = overrides.origin_policy {
            self.origin_policy = origin_policy;
        }
    }
}

/// Partial configuration as a host page passes it to `init` or
/// `update_config`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WidgetConfigOverrides {
    pub iframe_url: Option<String>,
    pub position: Option<Position>,
    pub width: Option<String>,
    pub height: Option<String>,
    pub z_index: Option<i64>,
    pub primary_color: Option<String>,
    pub secondary_color: Option<String>,
    pub bot_id: Option<String>,
    pub theme: Option<Theme>,
    pub origin_policy: Option<OriginPolicy>,
}

impl WidgetConfigOverrides {
    pub fn bot(bot_id: impl Into<String>) -> Self {
        Self {
            bot_id: Some(bot_id.into()),
            ..Default::default()
        }
    }

    pub fn with_iframe_url(mut self, iframe_url: impl Into<String>) -> Self {
        self.iframe_url = Some(iframe_url.into());
        self
    }

    pub fn with_primary_color(mut self, color: impl Into<String>) -> Self {
        self.primary_color = Some(color.into());
        self
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_origin_policy(mut self, policy: OriginPolicy) -> Self {
        self.origin_policy = Some(policy);
        self
    }
}
