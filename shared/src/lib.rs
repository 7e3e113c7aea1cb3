use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

pub mod protocol;

// =========================================================
// 常量定义 (Constants)
// =========================================================

pub const DEFAULT_API_BASE: &str = "/api";
pub const TOKEN_STORAGE_KEY: &str = "authToken";
pub const HEADER_AUTHORIZATION: &str = "Authorization";
pub const HEADER_CONTENT_TYPE: &str = "Content-Type";
pub const CONTENT_TYPE_JSON: &str = "application/json";

// =========================================================
// 标识符 (Identifiers)
// =========================================================

/// Everything but RFC 3986 unreserved characters is escaped inside a segment.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

fn encode_segment(raw: &str) -> String {
    utf8_percent_encode(raw, PATH_SEGMENT).to_string()
}

/// Notification identifier.
///
/// Kept in the form the backend sent, number or string, so ids echoed back
/// in paths and request bodies match what the server issued.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NotificationId {
    Number(i64),
    Text(String),
}

impl NotificationId {
    /// The id as one percent-encoded URL path segment.
    pub fn path_segment(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => encode_segment(s),
        }
    }
}

impl Default for NotificationId {
    fn default() -> Self {
        Self::Number(0)
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for NotificationId {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for NotificationId {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for NotificationId {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// Device identifier.
///
/// The backend is not consistent about sending ids as numbers or strings, so
/// both are accepted and normalized to a string key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The id as one percent-encoded URL path segment.
    pub fn path_segment(&self) -> String {
        encode_segment(&self.0)
    }

    /// Reverses [`DeviceId::path_segment`]. `None` if the decoded bytes are
    /// not UTF-8.
    pub fn from_path_segment(segment: &str) -> Option<Self> {
        percent_decode_str(segment)
            .decode_utf8()
            .ok()
            .map(|id| Self(id.into_owned()))
    }
}

impl<'de> Deserialize<'de> for DeviceId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Signed(i64),
            Unsigned(u64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => Self(s),
            Raw::Signed(n) => Self(n.to_string()),
            Raw::Unsigned(n) => Self(n.to_string()),
        })
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for DeviceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<i64> for DeviceId {
    fn from(n: i64) -> Self {
        Self(n.to_string())
    }
}

// =========================================================
// 领域模型 (Domain Models)
// =========================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserProfile {
    /// Best label for the header bar: name, then username, then email.
    pub fn display_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .or(self.username.as_deref())
            .or(self.email.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Device {
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(self.id.as_str())
    }
}

/// Latest telemetry reading of a device, kept as the raw JSON document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TelemetrySnapshot(pub Value);

impl TelemetrySnapshot {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Scalar fields as `(key, rendered value)` pairs, for tabular display.
    pub fn scalar_fields(&self) -> Vec<(String, String)> {
        let Some(object) = self.0.as_object() else {
            return Vec::new();
        };
        object
            .iter()
            .filter(|(_, v)| !v.is_object() && !v.is_array())
            .map(|(k, v)| {
                let rendered = match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (k.clone(), rendered)
            })
            .collect()
    }
}

/// One point of a device's location history, kept as the raw JSON document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationPoint(pub Value);

impl LocationPoint {
    /// `(latitude, longitude)` if the point carries both under a known key.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        let lat = ["latitude", "lat"]
            .iter()
            .find_map(|k| self.0.get(*k).and_then(as_f64))?;
        let lng = ["longitude", "lng", "lon"]
            .iter()
            .find_map(|k| self.0.get(*k).and_then(as_f64))?;
        Some((lat, lng))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}

// Coordinates sometimes arrive as decimal strings.
fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    #[serde(default)]
    pub device_id: DeviceId,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_data_id: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Notification {
    pub fn new(id: NotificationId, status: impl Into<String>) -> Self {
        Self {
            id,
            device_id: DeviceId::default(),
            kind: String::new(),
            message: String::new(),
            status: status.into(),
            asset_data_id: None,
            extra: Map::new(),
        }
    }
}

// =========================================================
// 请求与响应载荷 (Payloads)
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub user: Option<UserProfile>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateNotificationRequest {
    pub device_id: DeviceId,
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_data_id: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchAcknowledgeRequest {
    pub notification_ids: Vec<NotificationId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchAcknowledgeResponse {
    #[serde(default)]
    pub notifications: Vec<Notification>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateNotificationRequest {
    #[serde(skip)]
    pub id: NotificationId,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Body of a non-2xx response. Only `message` is read.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn device_id_accepts_numbers_and_strings() {
        let a: DeviceId = serde_json::from_value(json!(42)).unwrap();
        let b: DeviceId = serde_json::from_value(json!("42")).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "42");
    }

    #[test]
    fn path_segments_escape_reserved_characters() {
        let id = DeviceId::from("rack 3/unit?7#a");
        assert_eq!(id.path_segment(), "rack%203%2Funit%3F7%23a");
        assert_eq!(DeviceId::from_path_segment(&id.path_segment()), Some(id));
        assert_eq!(DeviceId::from("dev-9_a.b~c").path_segment(), "dev-9_a.b~c");
        assert_eq!(NotificationId::from("a/b").path_segment(), "a%2Fb");
        assert_eq!(DeviceId::from_path_segment("%FF"), None);
    }

    #[test]
    fn partial_notification_decodes_with_defaults() {
        let n: Notification = serde_json::from_value(json!({ "id": 1, "status": "ack" })).unwrap();
        assert_eq!(n.id, NotificationId::Number(1));
        assert_eq!(n.status, "ack");
        assert!(n.message.is_empty());
        assert!(n.asset_data_id.is_none());
    }

    #[test]
    fn notification_keeps_unknown_fields() {
        let raw = json!({
            "id": 7,
            "device_id": 3,
            "type": "alert",
            "message": "door open",
            "status": "pending",
            "created_at": "2024-05-01T10:00:00Z"
        });
        let n: Notification = serde_json::from_value(raw).unwrap();
        assert_eq!(n.kind, "alert");
        assert_eq!(n.device_id, DeviceId::from(3i64));
        assert_eq!(n.extra.get("created_at"), Some(&json!("2024-05-01T10:00:00Z")));

        let back = serde_json::to_value(&n).unwrap();
        assert_eq!(back["type"], json!("alert"));
        assert_eq!(back["created_at"], json!("2024-05-01T10:00:00Z"));
    }

    #[test]
    fn create_request_omits_missing_asset_id() {
        let req = CreateNotificationRequest {
            device_id: "d1".into(),
            kind: "manual".into(),
            message: "check battery".into(),
            asset_data_id: None,
        };
        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(
            body,
            json!({ "device_id": "d1", "type": "manual", "message": "check battery" })
        );
    }

    #[test]
    fn location_point_reads_short_and_string_keys() {
        let p = LocationPoint(json!({ "lat": "52.5", "lng": 13.4 }));
        assert_eq!(p.coordinates(), Some((52.5, 13.4)));
        assert_eq!(LocationPoint(json!({ "lat": 1.0 })).coordinates(), None);
    }

    #[test]
    fn user_display_name_prefers_name() {
        let mut user = UserProfile {
            name: Some("Jane Doe".into()),
            username: Some("jdoe".into()),
            email: Some("j@example.com".into()),
            ..Default::default()
        };
        assert_eq!(user.display_name(), Some("Jane Doe"));

        user.name = None;
        assert_eq!(user.display_name(), Some("jdoe"));
        user.username = None;
        assert_eq!(user.display_name(), Some("j@example.com"));
    }

    #[test]
    fn notification_ids_keep_their_wire_form() {
        let numeric: Notification = serde_json::from_value(json!({ "id": 5 })).unwrap();
        let text: Notification =
            serde_json::from_value(json!({ "id": "9b2f-41c0" })).unwrap();
        assert_eq!(numeric.id, NotificationId::Number(5));
        assert_eq!(text.id, NotificationId::from("9b2f-41c0"));
        assert_eq!(text.id.to_string(), "9b2f-41c0");

        let body = serde_json::to_value(BatchAcknowledgeRequest {
            notification_ids: vec![numeric.id, text.id],
        })
        .unwrap();
        assert_eq!(body, json!({ "notification_ids": [5, "9b2f-41c0"] }));
    }

    #[test]
    fn login_response_without_user_decodes() {
        let resp: LoginResponse = serde_json::from_value(json!({ "token": "abc" })).unwrap();
        assert_eq!(resp.token, "abc");
        assert!(resp.user.is_none());
    }
}
