//! Session type definitions.
//!
//! Defines [`Role`] (who authored a message), [`Message`], the append-only
//! [`Conversation`] container, and [`Session`] (the persisted unit of
//! conversational state for one workspace).

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Author of a conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::System => "system",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejected role string on append.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid role `{0}`: must be one of user, assistant, system")]
pub struct InvalidRole(pub String);

impl std::str::FromStr for Role {
    type Err = InvalidRole;

    /// Case-insensitive, surrounding whitespace ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            "system" => Ok(Self::System),
            _ => Err(InvalidRole(s.to_string())),
        }
    }
}

/// A single conversation turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    /// Per-message keys written by other tools (e.g. `ts`), kept as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            extra: Map::new(),
        }
    }
}

/// Chronological, insertion-ordered message log.
///
/// Messages can only be appended at the end or split off from the front, so
/// position always reflects age.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conversation(Vec<Message>);

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.0.push(message);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Message] {
        &self.0
    }

    /// Remove and return everything except the newest `keep` messages.
    ///
    /// Returns an empty vec when the conversation already fits.
    pub fn drain_oldest(&mut self, keep: usize) -> Vec<Message> {
        let split = self.0.len().saturating_sub(keep);
        let recent = self.0.split_off(split);
        std::mem::replace(&mut self.0, recent)
    }
}

impl FromIterator<Message> for Conversation {
    fn from_iter<I: IntoIterator<Item = Message>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Conversation {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Active conversational state, matching `sessions/active_session.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque identifier. Defaults to `<YYYY-MM-DD>-default`.
    #[serde(default = "default_session_id")]
    pub session_id: String,
    /// Refreshed on every save. Missing, null, or unparseable values decode
    /// as the Unix epoch; timestamps without an offset are read as UTC.
    #[serde(default = "epoch", deserialize_with = "lenient_timestamp")]
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub conversation: Conversation,
    /// Cumulative digest of rotated-out messages. Only ever grows.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub summary: String,
    /// Keys written by other tools, kept as-is across round trips.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Session {
    /// Fresh session with an empty conversation and summary.
    pub fn new(session_id: Option<&str>) -> Self {
        let session_id = match session_id.map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => default_session_id(),
        };
        Self {
            session_id,
            last_updated: Utc::now(),
            conversation: Conversation::new(),
            summary: String::new(),
            extra: Map::new(),
        }
    }
}

pub fn default_session_id() -> String {
    Utc::now().format("%Y-%m-%d-default").to_string()
}

fn epoch() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_str().and_then(parse_timestamp).unwrap_or_else(epoch))
}

/// RFC 3339 with any offset, or a naive ISO-8601 date-time taken as UTC.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn role_parsing_is_case_insensitive() {
        assert_eq!(" User ".parse::<Role>().unwrap(), Role::User);
        assert_eq!("ASSISTANT".parse::<Role>().unwrap(), Role::Assistant);
        assert_eq!("system".parse::<Role>().unwrap(), Role::System);
    }

    #[test]
    fn unknown_role_is_rejected() {
        let err = "tool".parse::<Role>().unwrap_err();
        assert_eq!(err, InvalidRole("tool".into()));
        assert!(err.to_string().contains("user, assistant, system"));
    }

    #[test]
    fn drain_oldest_keeps_newest_in_order() {
        let mut conv: Conversation = (0..5)
            .map(|i| Message::new(Role::User, format!("m{i}")))
            .collect();

        let old = conv.drain_oldest(2);

        let old: Vec<&str> = old.iter().map(|m| m.content.as_str()).collect();
        let kept: Vec<&str> = conv.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(old, vec!["m0", "m1", "m2"]);
        assert_eq!(kept, vec!["m3", "m4"]);
    }

    #[test]
    fn drain_oldest_noop_when_short() {
        let mut conv: Conversation = (0..2)
            .map(|i| Message::new(Role::User, format!("m{i}")))
            .collect();
        assert!(conv.drain_oldest(10).is_empty());
        assert_eq!(conv.len(), 2);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let session: Session = serde_json::from_str(r#"{"session_id": "abc"}"#).unwrap();
        assert_eq!(session.session_id, "abc");
        assert!(session.conversation.is_empty());
        assert!(session.summary.is_empty());
        assert_eq!(session.last_updated, DateTime::<Utc>::UNIX_EPOCH);
    }

    #[test]
    fn parses_offset_timestamps_and_keeps_unknown_keys() {
        let json = r#"{
            "session_id": "s1",
            "last_updated": "2025-01-02T03:04:05.123456+00:00",
            "conversation": [{"role": "user", "content": "hi"}],
            "summary": "",
            "server_id": "box-1"
        }"#;
        let session: Session = serde_json::from_str(json).unwrap();
        assert_eq!(session.conversation.len(), 1);
        assert_eq!(session.extra["server_id"], "box-1");

        let back = serde_json::to_value(&session).unwrap();
        assert_eq!(back["server_id"], "box-1");
        assert_eq!(back["conversation"][0]["role"], "user");
    }

    #[test]
    fn null_summary_and_naive_timestamp_decode() {
        let json = r#"{
            "session_id": "s",
            "last_updated": "2025-01-02T03:04:05",
            "conversation": [],
            "summary": null
        }"#;
        let session: Session = serde_json::from_str(json).unwrap();
        assert!(session.summary.is_empty());
        assert_eq!(
            session.last_updated,
            Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap()
        );
    }

    #[test]
    fn unusable_timestamp_falls_back_to_epoch() {
        for raw in ["null", "\"yesterday\"", "17"] {
            let json = format!(r#"{{"session_id": "s", "last_updated": {raw}}}"#);
            let session: Session = serde_json::from_str(&json).unwrap();
            assert_eq!(session.last_updated, DateTime::<Utc>::UNIX_EPOCH, "input {raw}");
        }
    }

    #[test]
    fn offset_timestamp_is_normalized_to_utc() {
        let json = r#"{"session_id": "s", "last_updated": "2025-01-02T05:04:05+02:00"}"#;
        let session: Session = serde_json::from_str(json).unwrap();
        assert_eq!(
            session.last_updated,
            Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap()
        );
    }

    #[test]
    fn message_keeps_unknown_keys() {
        let json = r#"{"role": "user", "content": "hi", "ts": 1700000000}"#;
        let message: Message = serde_json::from_str(json).unwrap();
        assert_eq!(message.extra["ts"], 1700000000);

        let back = serde_json::to_value(&message).unwrap();
        assert_eq!(back["ts"], 1700000000);
        assert_eq!(back["role"], "user");
    }

    #[test]
    fn blank_session_id_falls_back_to_default() {
        let session = Session::new(Some("   "));
        assert!(session.session_id.ends_with("-default"));
        assert_eq!(Session::new(Some("work")).session_id, "work");
    }
}
