//! Per-variant protocol policy.
//!
//! The defer and subscription protocols share one parsing algorithm (see
//! [`ProtocolSpec::parse`]). What differs between them is captured here:
//! the negotiation token, the heartbeat literal, and where the payload lives
//! inside a part.
//!
//! | Variant | Token | Payload |
//! |---------|-------|---------|
//! | [`ProtocolSpec::DEFER`] | `deferSpec=20220824` | the part itself, when it carries `data` or `incremental` |
//! | [`ProtocolSpec::SUBSCRIPTION`] | `subscriptionSpec=1.0` | the value under `payload` |

use super::constants::{keys, specs, HEARTBEAT};
use serde_json::{Map, Value};

/// Where the payload of a JSON part is found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadRule {
    /// The payload is nested under a single key. GraphQL `errors` next to it
    /// are always fatal.
    Nested {
        /// Key holding the payload
        key: &'static str,
    },
    /// The part is itself the payload, recognized by the presence of any of
    /// `keys`. GraphQL `errors` travel inside the payload and are only fatal
    /// when no payload is present.
    Envelope {
        /// Keys marking a part as carrying data
        keys: &'static [&'static str],
    },
}

/// Result of looking up the payload of a JSON part.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Payload<'a> {
    /// No payload key at all
    Missing,
    /// Payload explicitly null, or a part that only signals stream state
    Null,
    /// Payload object to forward
    Object(&'a Map<String, Value>),
    /// Payload present but not a JSON object
    Invalid,
}

/// Policy record of one multipart protocol variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolSpec {
    token: &'static str,
    heartbeat: &'static str,
    payload: PayloadRule,
}

impl ProtocolSpec {
    /// `@defer` incremental delivery.
    pub const DEFER: ProtocolSpec = ProtocolSpec {
        token: specs::DEFER,
        heartbeat: HEARTBEAT,
        payload: PayloadRule::Envelope {
            keys: &[keys::DATA, keys::INCREMENTAL],
        },
    };

    /// Subscriptions over HTTP.
    pub const SUBSCRIPTION: ProtocolSpec = ProtocolSpec {
        token: specs::SUBSCRIPTION,
        heartbeat: HEARTBEAT,
        payload: PayloadRule::Nested {
            key: keys::PAYLOAD,
        },
    };

    /// Create a custom variant using the default heartbeat literal.
    ///
    /// # Examples
    ///
    /// ```
    /// use graphql_multipart::protocol::{PayloadRule, ProtocolSpec};
    ///
    /// let spec = ProtocolSpec::new("eventSpec=2.0", PayloadRule::Nested { key: "event" });
    /// assert_eq!(spec.token(), "eventSpec=2.0");
    /// assert_eq!(spec.heartbeat(), "{}");
    /// ```
    pub const fn new(token: &'static str, payload: PayloadRule) -> Self {
        ProtocolSpec {
            token,
            heartbeat: HEARTBEAT,
            payload,
        }
    }

    /// Replace the heartbeat literal.
    pub const fn with_heartbeat(mut self, heartbeat: &'static str) -> Self {
        self.heartbeat = heartbeat;
        self
    }

    /// Negotiation token, e.g. `subscriptionSpec=1.0`.
    pub fn token(&self) -> &'static str {
        self.token
    }

    /// Heartbeat literal.
    pub fn heartbeat(&self) -> &'static str {
        self.heartbeat
    }

    /// Payload rule.
    pub fn payload_rule(&self) -> PayloadRule {
        self.payload
    }

    /// Whether a non-empty `errors` array aborts the chunk, given the payload
    /// lookup result for the same part.
    pub(crate) fn errors_are_fatal(&self, payload: &Payload<'_>) -> bool {
        match self.payload {
            PayloadRule::Nested { .. } => true,
            PayloadRule::Envelope { .. } => !matches!(payload, Payload::Object(_)),
        }
    }

    /// Locate the payload of `object`.
    pub(crate) fn payload<'a>(&self, object: &'a Map<String, Value>) -> Payload<'a> {
        match self.payload {
            PayloadRule::Nested { key } => match object.get(key) {
                None => Payload::Missing,
                Some(Value::Null) => Payload::Null,
                Some(Value::Object(payload)) => Payload::Object(payload),
                Some(_) => Payload::Invalid,
            },
            PayloadRule::Envelope { keys: data_keys } => {
                let mut seen = false;
                for key in data_keys {
                    match object.get(*key) {
                        Some(Value::Null) => seen = true,
                        Some(_) => return Payload::Object(object),
                        None => {}
                    }
                }
                if seen || (!object.is_empty() && object.keys().all(|k| is_state_key(k))) {
                    Payload::Null
                } else {
                    Payload::Missing
                }
            }
        }
    }
}

/// Keys an envelope part may carry without any data.
fn is_state_key(key: &str) -> bool {
    matches!(key, keys::HAS_NEXT | keys::EXTENSIONS | keys::ERRORS)
}
