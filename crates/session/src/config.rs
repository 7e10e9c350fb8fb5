use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_RESPONSE_DELAY_MS: u64 = 1_500;
pub const MAX_RESPONSE_DELAY_MS: u64 = 60_000;
pub const DEFAULT_CANNED_REPLY: &str =
    "This is a reply from the AI assistant. I'm ready to help you with any questions!";
pub const DEFAULT_SESSION_TITLE: &str = "New chat";

/// Which session receives a simulated reply once it lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryPolicy {
    /// The session that was active when the prompt was sent.
    #[default]
    OriginSession,
    /// Whatever session is active when the delay elapses.
    ActiveSession,
}

/// Chat behaviour knobs persisted alongside the UI settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatConfig {
    #[serde(default = "default_response_delay_ms")]
    pub response_delay_ms: u64,
    #[serde(default = "default_canned_reply")]
    pub canned_reply: String,
    #[serde(default = "default_session_title")]
    pub default_session_title: String,
    #[serde(default = "default_seed_demo_sessions")]
    pub seed_demo_sessions: bool,
    #[serde(default)]
    pub delivery_policy: DeliveryPolicy,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            response_delay_ms: default_response_delay_ms(),
            canned_reply: default_canned_reply(),
            default_session_title: default_session_title(),
            seed_demo_sessions: default_seed_demo_sessions(),
            delivery_policy: DeliveryPolicy::default(),
        }
    }
}

impl ChatConfig {
    pub fn response_delay(&self) -> Duration {
        Duration::from_millis(self.response_delay_ms)
    }

    pub fn normalized(mut self) -> Self {
        self.response_delay_ms = self.response_delay_ms.min(MAX_RESPONSE_DELAY_MS);

        self.canned_reply = self.canned_reply.trim().to_string();
        if self.canned_reply.is_empty() {
            self.canned_reply = default_canned_reply();
        }

        self.default_session_title = self.default_session_title.trim().to_string();
        if self.default_session_title.is_empty() {
            self.default_session_title = default_session_title();
        }

        self
    }
}

fn default_response_delay_ms() -> u64 {
    DEFAULT_RESPONSE_DELAY_MS
}

fn default_canned_reply() -> String {
    DEFAULT_CANNED_REPLY.to_string()
}

fn default_session_title() -> String {
    DEFAULT_SESSION_TITLE.to_string()
}

fn default_seed_demo_sessions() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_restores_blank_strings_and_caps_delay() {
        let config = ChatConfig {
            response_delay_ms: 10 * MAX_RESPONSE_DELAY_MS,
            canned_reply: "   ".to_string(),
            default_session_title: "\t".to_string(),
            seed_demo_sessions: false,
            delivery_policy: DeliveryPolicy::ActiveSession,
        }
        .normalized();

        assert_eq!(config.response_delay_ms, MAX_RESPONSE_DELAY_MS);
        assert_eq!(config.canned_reply, DEFAULT_CANNED_REPLY);
        assert_eq!(config.default_session_title, DEFAULT_SESSION_TITLE);
        assert!(!config.seed_demo_sessions);
        assert_eq!(config.delivery_policy, DeliveryPolicy::ActiveSession);
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let raw = r#"{ "response_delay_ms": 250, "delivery_policy": "active_session" }"#;
        let config: ChatConfig = serde_json::from_str(raw).expect("partial config should parse");

        assert_eq!(config.response_delay(), Duration::from_millis(250));
        assert_eq!(config.canned_reply, DEFAULT_CANNED_REPLY);
        assert!(config.seed_demo_sessions);
        assert_eq!(config.delivery_policy, DeliveryPolicy::ActiveSession);
    }

    #[test]
    fn default_delay_matches_the_simulated_latency() {
        assert_eq!(
            ChatConfig::default().response_delay(),
            Duration::from_millis(1_500)
        );
    }
}
