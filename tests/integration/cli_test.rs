#![allow(dead_code, unused_imports)]

use std::path::PathBuf;
use std::process::{Command, Output};

fn multibot_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_multibot"))
}

fn run_multibot(args: &[&str]) -> Output {
    Command::new(multibot_binary())
        .args(args)
        .env("RUST_LOG", "error")
        .output()
        .expect("Failed to execute multibot command")
}

fn output_to_string(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr_to_string(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

mod version_command_tests {
    use super::*;

    #[test]
    fn test_version_command_basic() {
        let output = run_multibot(&["version"]);
        let stdout = output_to_string(&output);

        assert!(output.status.success(), "version command should succeed");
        assert!(stdout.contains("multibot"));
        assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn test_version_command_detailed() {
        let output = run_multibot(&["version", "--detailed"]);
        let stdout = output_to_string(&output);

        assert!(output.status.success());
        assert!(stdout.contains("Version"));
        assert!(stdout.contains("Apache-2.0"));
        assert!(stdout.contains("chatbot-widget.js"));
    }
}

mod snippet_command_tests {
    use super::*;

    #[test]
    fn test_snippet_with_origin() {
        let output = run_multibot(&["snippet", "abc123", "--origin", "https://bots.example.com"]);
        let stdout = output_to_string(&output);

        assert!(output.status.success(), "stderr: {}", stderr_to_string(&output));
        assert!(stdout.contains(
            r#"<script src="https://bots.example.com/chatbot-widget.js?bot-id=abc123" data-auto-init></script>"#
        ));
        assert!(stdout.contains("https://bots.example.com/embed?bot-id=abc123"));
    }

    #[test]
    fn test_snippet_requires_bot_id() {
        let output = run_multibot(&["snippet"]);
        assert!(!output.status.success());
    }
}

mod help_tests {
    use super::*;

    #[test]
    fn test_help_lists_commands() {
        let output = run_multibot(&["--help"]);
        let stdout = output_to_string(&output);

        assert!(output.status.success());
        for command in ["serve", "init", "bots", "snippet", "version"] {
            assert!(stdout.contains(command), "help should mention {}", command);
        }
    }

    #[test]
    fn test_unknown_command_fails() {
        let output = run_multibot(&["frobnicate"]);
        assert!(!output.status.success());
        assert!(stderr_to_string(&output).contains("frobnicate"));
    }
}

mod snippet_check_tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn run_async(args: Vec<String>) -> Output {
        tokio::task::spawn_blocking(move || {
            let args: Vec<&str> = args.iter().map(String::as_str).collect();
            run_multibot(&args)
        })
        .await
        .unwrap()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_snippet_check_live_bot() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/bots/abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "abc123",
                "name": "Acme Helper",
                "systemPrompt": "Be helpful.",
                "isActive": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let output = run_async(vec![
            "snippet".to_string(),
            "abc123".to_string(),
            "--origin".to_string(),
            server.uri(),
            "--check".to_string(),
        ])
        .await;

        assert!(output.status.success(), "stderr: {}", stderr_to_string(&output));
        assert!(output_to_string(&output).contains("Bot 'Acme Helper' is live"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_snippet_check_missing_bot_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/bots/gone"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "error": "Bot not found" })))
            .mount(&server)
            .await;

        let output = run_async(vec![
            "snippet".to_string(),
            "gone".to_string(),
            "--origin".to_string(),
            server.uri(),
            "--check".to_string(),
        ])
        .await;

        assert!(!output.status.success());
        assert!(output_to_string(&output).contains("Bot not found. Please check your bot ID."));
    }
}
