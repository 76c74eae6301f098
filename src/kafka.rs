//! Kafka consumer properties.
//!
//! The broker client itself lives outside this crate. What it needs from us
//! is a librdkafka-style property map built from the resolved
//! [`KafkaSettings`], plus the topic names to subscribe to.
//!
//! # Example
//!
//! ```rust
//! use std::collections::HashMap;
//! use port_agent::config::Settings;
//!
//! let env: HashMap<String, String> = [
//!     ("STREAMER_NAME", "KAFKA"),
//!     ("PORT_ORG_ID", "org_1"),
//!     ("KAFKA_CONSUMER_AUTHENTICATION_MECHANISM", "SCRAM-SHA-512"),
//!     ("KAFKA_CONSUMER_USERNAME", "agent"),
//!     ("KAFKA_CONSUMER_PASSWORD", "secret"),
//! ]
//! .into_iter()
//! .map(|(k, v)| (k.to_string(), v.to_string()))
//! .collect();
//!
//! let settings = Settings::resolve(&env).unwrap();
//! let props = settings.kafka.consumer_properties();
//!
//! assert_eq!(props["sasl.mechanism"], "SCRAM-SHA-512");
//! assert_eq!(props["sasl.username"], "agent");
//! ```

use crate::config::KafkaSettings;
use std::collections::BTreeMap;

/// Client id reported to the brokers
pub const CLIENT_ID: &str = "port-agent";

/// Authentication mechanism value that disables SASL
pub const NO_AUTHENTICATION: &str = "none";

impl KafkaSettings {
    /// Whether SASL credentials should be sent
    pub fn uses_authentication(&self) -> bool {
        !self
            .authentication_mechanism
            .eq_ignore_ascii_case(NO_AUTHENTICATION)
    }

    /// Build the consumer property map
    ///
    /// Offsets are committed by the consumer after an event is handled, so
    /// auto commit is always off. `group.id` is only set when configured, and
    /// SASL properties only when an authentication mechanism is selected.
    pub fn consumer_properties(&self) -> BTreeMap<&'static str, String> {
        let mut props = BTreeMap::new();

        props.insert("bootstrap.servers", self.brokers.clone());
        props.insert("client.id", CLIENT_ID.to_string());
        props.insert("security.protocol", self.security_protocol.clone());
        props.insert("session.timeout.ms", self.session_timeout_ms.to_string());
        props.insert("auto.offset.reset", self.auto_offset_reset.clone());
        props.insert("enable.auto.commit", "false".to_string());

        if !self.group_id.is_empty() {
            props.insert("group.id", self.group_id.clone());
        }

        if self.uses_authentication() {
            props.insert("sasl.mechanism", self.authentication_mechanism.clone());
            props.insert("sasl.username", self.username.clone());
            props.insert("sasl.password", self.password.clone());
        }

        props
    }
}

#[cfg(test)]
mod tests {
    use crate::config::env_vars::*;
    use crate::config::Settings;
    use crate::test_utils::env_map;

    fn settings(extra: &[(&str, &str)]) -> Settings {
        let mut pairs = vec![(STREAMER_NAME, "KAFKA"), (PORT_ORG_ID, "org_abc")];
        pairs.extend_from_slice(extra);
        Settings::resolve(&env_map(&pairs)).unwrap()
    }

    #[test]
    fn test_default_properties() {
        let props = settings(&[]).kafka.consumer_properties();

        assert_eq!(props["bootstrap.servers"], "localhost:9092");
        assert_eq!(props["client.id"], "port-agent");
        assert_eq!(props["security.protocol"], "plaintext");
        assert_eq!(props["session.timeout.ms"], "45000");
        assert_eq!(props["auto.offset.reset"], "earliest");
        assert_eq!(props["enable.auto.commit"], "false");
        assert!(!props.contains_key("group.id"));
        assert!(!props.contains_key("sasl.mechanism"));
        assert!(!props.contains_key("sasl.password"));
    }

    #[test]
    fn test_sasl_properties_when_mechanism_set() {
        let props = settings(&[
            (KAFKA_CONSUMER_SECURITY_PROTOCOL, "SASL_SSL"),
            (KAFKA_CONSUMER_AUTHENTICATION_MECHANISM, "SCRAM-SHA-512"),
            (KAFKA_CONSUMER_USERNAME, "agent"),
            (KAFKA_CONSUMER_PASSWORD, "secret"),
            (KAFKA_CONSUMER_GROUP_ID, "org_abc.agent"),
        ])
        .kafka
        .consumer_properties();

        assert_eq!(props["security.protocol"], "SASL_SSL");
        assert_eq!(props["sasl.mechanism"], "SCRAM-SHA-512");
        assert_eq!(props["sasl.username"], "agent");
        assert_eq!(props["sasl.password"], "secret");
        assert_eq!(props["group.id"], "org_abc.agent");
    }

    #[test]
    fn test_none_mechanism_is_case_insensitive() {
        let kafka = settings(&[(KAFKA_CONSUMER_AUTHENTICATION_MECHANISM, "NONE")]).kafka;

        assert!(!kafka.uses_authentication());
        assert!(!kafka.consumer_properties().contains_key("sasl.username"));
    }

    #[test]
    fn test_topics_order() {
        let kafka = settings(&[]).kafka;
        assert_eq!(kafka.topics(), ["org_abc.runs", "org_abc.change.log"]);
    }
}
