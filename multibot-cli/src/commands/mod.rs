pub mod bots;
pub mod serve;
pub mod snippet;

pub use bots::{handle_bots_command, BotsCommand};
pub use serve::{handle_serve_command, ServeArgs};
pub use snippet::{handle_snippet_command, SnippetArgs};
