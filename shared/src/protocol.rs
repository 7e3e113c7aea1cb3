use crate::{
    BatchAcknowledgeRequest, BatchAcknowledgeResponse, CreateNotificationRequest, Credentials,
    Device, DeviceId, LocationPoint, LoginResponse, Notification, NotificationId,
    TelemetrySnapshot, UpdateNotificationRequest,
};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// HTTP Methods for API Requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// A trait that defines the request-response relationship and metadata for an API endpoint.
///
/// Paths are relative to the API base (`/api` by default).
pub trait ApiRequest {
    /// The response type returned by this request.
    type Response: DeserializeOwned;
    /// The HTTP method.
    const METHOD: HttpMethod;
    /// Whether the call carries the bearer token.
    const AUTHENTICATED: bool = true;

    /// The URL path, with parameters filled in.
    fn path(&self) -> String;

    /// The JSON body, if the endpoint takes one.
    fn body(&self) -> serde_json::Result<Option<Value>> {
        Ok(None)
    }
}

// =========================================================
// Session
// =========================================================

impl ApiRequest for Credentials {
    type Response = LoginResponse;
    const METHOD: HttpMethod = HttpMethod::Post;
    const AUTHENTICATED: bool = false;

    fn path(&self) -> String {
        "/login".to_string()
    }

    fn body(&self) -> serde_json::Result<Option<Value>> {
        serde_json::to_value(self).map(Some)
    }
}

// =========================================================
// Devices
// =========================================================

/// List all devices
#[derive(Debug, Clone, Default)]
pub struct ListDevicesRequest;

impl ApiRequest for ListDevicesRequest {
    type Response = Vec<Device>;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        "/devices".to_string()
    }
}

#[derive(Debug, Clone)]
pub struct DeviceLastDataRequest {
    pub device_id: DeviceId,
}

impl ApiRequest for DeviceLastDataRequest {
    type Response = TelemetrySnapshot;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        format!("/devices/{}/last-data", self.device_id.path_segment())
    }
}

#[derive(Debug, Clone)]
pub struct DeviceLocationsRequest {
    pub device_id: DeviceId,
}

impl ApiRequest for DeviceLocationsRequest {
    type Response = Vec<LocationPoint>;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        format!("/devices/{}/locations", self.device_id.path_segment())
    }
}

#[derive(Debug, Clone)]
pub struct DeviceNotificationsRequest {
    pub device_id: DeviceId,
}

impl ApiRequest for DeviceNotificationsRequest {
    type Response = Vec<Notification>;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        format!("/devices/{}/notifications", self.device_id.path_segment())
    }
}

// =========================================================
// Notifications
// =========================================================

#[derive(Debug, Clone, Default)]
pub struct PendingNotificationsRequest;

impl ApiRequest for PendingNotificationsRequest {
    type Response = Vec<Notification>;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        "/notifications/pending".to_string()
    }
}

impl ApiRequest for CreateNotificationRequest {
    type Response = Notification;
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        "/notifications".to_string()
    }

    fn body(&self) -> serde_json::Result<Option<Value>> {
        serde_json::to_value(self).map(Some)
    }
}

#[derive(Debug, Clone)]
pub struct AcknowledgeNotificationRequest {
    pub id: NotificationId,
}

impl ApiRequest for AcknowledgeNotificationRequest {
    type Response = Notification;
    const METHOD: HttpMethod = HttpMethod::Put;

    fn path(&self) -> String {
        format!("/notifications/{}/acknowledge", self.id.path_segment())
    }

    // The endpoint expects an empty JSON object rather than no body.
    fn body(&self) -> serde_json::Result<Option<Value>> {
        Ok(Some(json!({})))
    }
}

impl ApiRequest for BatchAcknowledgeRequest {
    type Response = BatchAcknowledgeResponse;
    const METHOD: HttpMethod = HttpMethod::Put;

    fn path(&self) -> String {
        "/notifications/batch/acknowledge".to_string()
    }

    fn body(&self) -> serde_json::Result<Option<Value>> {
        serde_json::to_value(self).map(Some)
    }
}

impl ApiRequest for UpdateNotificationRequest {
    type Response = Notification;
    const METHOD: HttpMethod = HttpMethod::Put;

    fn path(&self) -> String {
        format!("/notifications/{}", self.id.path_segment())
    }

    fn body(&self) -> serde_json::Result<Option<Value>> {
        serde_json::to_value(self).map(Some)
    }
}

#[derive(Debug, Clone)]
pub struct DeleteNotificationRequest {
    pub id: NotificationId,
}

impl ApiRequest for DeleteNotificationRequest {
    // Whatever the server sends back (empty, a message, `true`) is skipped.
    type Response = IgnoredAny;
    const METHOD: HttpMethod = HttpMethod::Delete;

    fn path(&self) -> String {
        format!("/notifications/{}", self.id.path_segment())
    }
}
