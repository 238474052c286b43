use super::{Theme, WidgetConfig, TRANSITION_DELAY};

/// Marker attribute on the injected `<style>` element.
pub const STYLE_MARKER: &str = "data-chatbot";

pub const CONTAINER_CLASS: &str = "chatbot-widget-container";
pub const IFRAME_CLASS: &str = "chatbot-iframe";
pub const BUTTON_CLASS: &str = "chatbot-toggle-button";
pub const MINIMIZED_CLASS: &str = "minimized";
pub const HIDDEN_CLASS: &str = "hidden";

/// Stylesheet text for `config`. The transition length is derived from
/// [`TRANSITION_DELAY`] so deferred hides land after the animation.
pub fn stylesheet(config: &WidgetConfig) -> String {
    let transition = format!("{}ms", TRANSITION_DELAY.as_millis());
    let frame_background = match config.theme {
        Theme::Light => "white",
        Theme::Dark => "#111827",
    };

    format!(
        r#"
.{container} {{
  position: fixed;
  z-index: {z_index};
  font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
  background: transparent;
  border-radius: 12px;
  overflow: hidden;
}}
.{container}.bottom-right {{ bottom: 20px; right: 20px; }}
.{container}.bottom-left {{ bottom: 20px; left: 20px; }}
.{container}.top-right {{ top: 20px; right: 20px; }}
.{container}.top-left {{ top: 20px; left: 20px; }}
.{button} {{
  width: 60px;
  height: 60px;
  border-radius: 50%;
  background: {primary};
  border: none;
  cursor: pointer;
  box-shadow: 0 4px 12px rgba(0, 0, 0, 0.15);
  transition: all {transition} ease;
  display: flex;
  align-items: center;
  justify-content: center;
  color: white;
  font-size: 24px;
}}
.{button}:hover {{
  background: {secondary};
  transform: scale(1.1);
  box-shadow: 0 6px 20px rgba(0, 0, 0, 0.2);
}}
.{button}.{minimized} {{ background: {secondary}; }}
.{iframe} {{
  border: none;
  border-radius: 12px;
  box-shadow: 0 8px 32px rgba(0, 0, 0, 0.12);
  background: {frame_background};
  margin-bottom: 20px;
  transition: all {transition} ease;
  display: block;
  width: 100%;
  height: 100%;
}}
.{iframe}.{minimized} {{ transform: scale(0.8); opacity: 0; pointer-events: none; }}
.{iframe}.{hidden} {{ display: none; }}
@media (max-width: 768px) {{
  .{container} {{
    bottom: 0 !important; right: 0 !important; left: 0 !important; top: 0 !important;
    width: 100vw !important; height: 100vh !important; border-radius: 0 !important;
  }}
  .{iframe} {{ width: 100% !important; height: 100% !important; margin-bottom: 0 !important; border-radius: 0 !important; }}
  .{button} {{ bottom: 20px !important; right: 20px !important; position: fixed !important; }}
}}
"#,
        container = CONTAINER_CLASS,
        button = BUTTON_CLASS,
        iframe = IFRAME_CLASS,
        minimized = MINIMIZED_CLASS,
        hidden = HIDDEN_CLASS,
        z_index = config.z_index,
        primary = config.primary_color,
        secondary = config.secondary_color,
        frame_background = frame_background,
        transition = transition,
    )
}
