//! Self-configuration from the `<script>` tag that loaded the widget.

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;
use url::Url;

use super::{ScriptTag, WidgetError};

/// File name the controller is served under; used to find its own tag.
pub const WIDGET_SCRIPT_NAME: &str = "chatbot-widget.js";

/// Path of the chat page on the frame origin.
pub const EMBED_PATH: &str = "/embed";

/// What could be read off one script `src`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptParams {
    pub bot_id: Option<String>,
    pub origin: Option<String>,
}

/// The bot and frame location a widget instance is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub bot_id: String,
    pub iframe_url: String,
}

impl ResolvedTarget {
    /// `src` for the iframe element.
    pub fn frame_src(&self) -> String {
        let separator = if self.iframe_url.contains('?') { '&' } else { '?' };
        let bot_id: String = url::form_urlencoded::byte_serialize(self.bot_id.as_bytes()).collect();
        format!("{}{}bot-id={}", self.iframe_url, separator, bot_id)
    }

    /// Origin outbound messages are scoped to. Relative iframe URLs are
    /// resolved against the page.
    pub fn frame_origin(&self, page_url: &str) -> Option<String> {
        let url = Url::parse(&self.iframe_url)
            .or_else(|_| Url::parse(page_url).and_then(|base| base.join(&self.iframe_url)))
            .ok()?;
        origin_of(&url)
    }
}

fn bot_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"[?&]bot-id=([^&#]*)").expect("bot-id pattern should compile")
    })
}

fn origin_of(url: &Url) -> Option<String> {
    if !url.origin().is_tuple() {
        return None;
    }
    Some(url.origin().ascii_serialization())
}

pub fn page_origin(page_url: &str) -> Option<String> {
    Url::parse(page_url).ok().as_ref().and_then(origin_of)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Percent- and plus-decode a raw `bot-id` value the same way `query_pairs` does.
fn decode_bot_id(raw: &str) -> Option<String> {
    url::form_urlencoded::parse(format!("bot-id={}", raw).as_bytes())
        .next()
        .map(|(_, value)| value.into_owned())
}

/// Parse a script `src`: absolute first, then relative to the page, then
/// a regex pull of `bot-id` with the page origin as base.
pub fn parse_script_src(src: &str, page_url: &str) -> ScriptParams {
    let parsed = Url::parse(src)
        .or_else(|_| Url::parse(page_url).and_then(|base| base.join(src)));

    match parsed {
        Ok(url) => ScriptParams {
            bot_id: non_empty(
                url.query_pairs()
                    .find(|(key, _)| key == "bot-id")
                    .map(|(_, value)| value.into_owned()),
            ),
            origin: origin_of(&url),
        },
        Err(e) => {
            debug!("Script src '{}' did not parse ({}), falling back to pattern match", src, e);
            ScriptParams {
                bot_id: non_empty(
                    bot_id_pattern()
                        .captures(src)
                        .and_then(|c| c.get(1))
                        .and_then(|m| decode_bot_id(m.as_str())),
                ),
                origin: page_origin(page_url),
            }
        }
    }
}

/// Find the first script whose `src` names the widget file.
pub fn find_widget_script(scripts: &[ScriptTag]) -> Option<&ScriptTag> {
    scripts
        .iter()
        .find(|tag| tag.src.contains(WIDGET_SCRIPT_NAME))
}

/// Fill a missing bot id and iframe URL from the page's script tags.
/// Supplied values are never overwritten, and scanning is skipped when
/// both are supplied.
pub fn resolve_target(
    bot_id: Option<&str>,
    iframe_url: Option<&str>,
    scripts: &[ScriptTag],
    page_url: &str,
) -> Result<ResolvedTarget, WidgetError> {
    let mut bot_id = bot_id.filter(|v| !v.is_empty()).map(str::to_string);
    let mut iframe_url = iframe_url.filter(|v| !v.is_empty()).map(str::to_string);

    if bot_id.is_none() || iframe_url.is_none() {
        let params = find_widget_script(scripts)
            .map(|tag| parse_script_src(&tag.src, page_url))
            .unwrap_or_default();

        if bot_id.is_none() {
            bot_id = params.bot_id;
        }
        if iframe_url.is_none() {
            iframe_url = params.origin.map(|origin| format!("{}{}", origin, EMBED_PATH));
        }
    }

    let bot_id = bot_id.ok_or(WidgetError::MissingBotId)?;
    let iframe_url = iframe_url.ok_or(WidgetError::UnresolvedFrameUrl)?;

    Ok(ResolvedTarget { bot_id, iframe_url })
}
