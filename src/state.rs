//! Dashboard state and its transitions.
//!
//! `DashState` only changes through [`DashState::apply`], one [`Mutation`] at
//! a time. Every mutation is total: it never fails and never panics.

use std::collections::HashMap;

use devboard_shared::{
    Device, DeviceId, LocationPoint, Notification, NotificationId, TelemetrySnapshot, UserProfile,
};

/// The closed set of state transitions.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    SetUser(Option<UserProfile>),
    /// The committing store also persists or removes the token.
    SetToken(Option<String>),
    SetError(Option<String>),
    SetLoading(bool),
    SetDevices(Vec<Device>),
    SetDeviceLastData {
        device_id: DeviceId,
        data: TelemetrySnapshot,
    },
    SetDeviceLocations {
        device_id: DeviceId,
        locations: Vec<LocationPoint>,
    },
    SetNotifications(Vec<Notification>),
    SetPendingNotifications(Vec<Notification>),
    AddNotification(Notification),
    UpdateNotification(Notification),
    RemoveNotification(NotificationId),
}

impl Mutation {
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::SetUser(_) => "set_user",
            Mutation::SetToken(_) => "set_token",
            Mutation::SetError(_) => "set_error",
            Mutation::SetLoading(_) => "set_loading",
            Mutation::SetDevices(_) => "set_devices",
            Mutation::SetDeviceLastData { .. } => "set_device_last_data",
            Mutation::SetDeviceLocations { .. } => "set_device_locations",
            Mutation::SetNotifications(_) => "set_notifications",
            Mutation::SetPendingNotifications(_) => "set_pending_notifications",
            Mutation::AddNotification(_) => "add_notification",
            Mutation::UpdateNotification(_) => "update_notification",
            Mutation::RemoveNotification(_) => "remove_notification",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashState {
    user: Option<UserProfile>,
    token: Option<String>,
    error: Option<String>,
    loading: bool,
    devices: Vec<Device>,
    device_last_data: HashMap<DeviceId, TelemetrySnapshot>,
    device_locations: HashMap<DeviceId, Vec<LocationPoint>>,
    notifications: Vec<Notification>,
    pending_notifications: Vec<Notification>,
}

impl DashState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, mutation: Mutation) {
        match mutation {
            Mutation::SetUser(user) => self.user = user,
            Mutation::SetToken(token) => self.token = token,
            Mutation::SetError(error) => self.error = error,
            Mutation::SetLoading(loading) => self.loading = loading,
            Mutation::SetDevices(devices) => self.devices = devices,
            Mutation::SetDeviceLastData { device_id, data } => {
                self.device_last_data.insert(device_id, data);
            }
            Mutation::SetDeviceLocations {
                device_id,
                locations,
            } => {
                self.device_locations.insert(device_id, locations);
            }
            Mutation::SetNotifications(list) => self.notifications = list,
            Mutation::SetPendingNotifications(list) => self.pending_notifications = list,
            Mutation::AddNotification(notification) => self.notifications.push(notification),
            Mutation::UpdateNotification(updated) => {
                if let Some(slot) = self.notifications.iter_mut().find(|n| n.id == updated.id) {
                    *slot = updated;
                }
            }
            Mutation::RemoveNotification(id) => self.notifications.retain(|n| n.id != id),
        }
    }

    // ---------------------------------------------------------
    // Read side
    // ---------------------------------------------------------

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn device_last_data(&self, device_id: &DeviceId) -> Option<&TelemetrySnapshot> {
        self.device_last_data.get(device_id)
    }

    pub fn device_locations(&self, device_id: &DeviceId) -> Option<&[LocationPoint]> {
        self.device_locations.get(device_id).map(Vec::as_slice)
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn pending_notifications(&self) -> &[Notification] {
        &self.pending_notifications
    }

    pub fn notification_by_id(&self, id: &NotificationId) -> Option<&Notification> {
        self.notifications.iter().find(|n| &n.id == id)
    }
}
