//! Domain state store.
//!
//! Views read through the accessors and call the async actions. Every action
//! follows the same protocol:
//!
//! 1. `loading = true`, `error = None`
//! 2. require a session token (all actions except `login`)
//! 3. call the gateway with the bearer token
//! 4. on success commit the mutations derived from the payload and return it
//! 5. on failure commit the error message and return the error
//! 6. `loading = false`, whatever happened
//!
//! `loading` and `error` are shared by all actions. Two overlapping actions
//! race on them and the last writer wins.

use std::cell::{Ref, RefCell};

use devboard_shared::protocol::{
    AcknowledgeNotificationRequest, ApiRequest, DeleteNotificationRequest,
    DeviceLastDataRequest, DeviceLocationsRequest, DeviceNotificationsRequest,
    ListDevicesRequest, PendingNotificationsRequest,
};
use devboard_shared::{
    BatchAcknowledgeRequest, BatchAcknowledgeResponse, CreateNotificationRequest, Credentials,
    Device, DeviceId, LocationPoint, LoginResponse, Notification, NotificationId,
    TelemetrySnapshot, UpdateNotificationRequest, UserProfile,
};

use crate::error::{StoreError, StoreResult};
use crate::gateway::GatewayClient;
use crate::request::HttpClient;
use crate::session::TokenStore;
use crate::state::{DashState, Mutation};

#[cfg(test)]
mod tests;

// =========================================================
// Actions
// =========================================================

/// Store actions that go through the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Login,
    FetchDevices,
    FetchDeviceLastData,
    FetchDeviceLocations,
    FetchDeviceNotifications,
    FetchPendingNotifications,
    CreateNotification,
    AcknowledgeNotification,
    BatchAcknowledgeNotifications,
    UpdateNotificationStatus,
    DeleteNotification,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Login => "login",
            Action::FetchDevices => "fetch_devices",
            Action::FetchDeviceLastData => "fetch_device_last_data",
            Action::FetchDeviceLocations => "fetch_device_locations",
            Action::FetchDeviceNotifications => "fetch_device_notifications",
            Action::FetchPendingNotifications => "fetch_pending_notifications",
            Action::CreateNotification => "create_notification",
            Action::AcknowledgeNotification => "acknowledge_notification",
            Action::BatchAcknowledgeNotifications => "batch_acknowledge_notifications",
            Action::UpdateNotificationStatus => "update_notification_status",
            Action::DeleteNotification => "delete_notification",
        }
    }

    /// Message committed to `error` when the failure carries none.
    pub fn failure_message(&self) -> &'static str {
        match self {
            Action::Login => "Login failed",
            Action::FetchDevices => "Failed to fetch devices",
            Action::FetchDeviceLastData => "Failed to fetch device last data",
            Action::FetchDeviceLocations => "Failed to fetch device locations",
            Action::FetchDeviceNotifications => "Failed to fetch notifications",
            Action::FetchPendingNotifications => "Failed to fetch pending notifications",
            Action::CreateNotification => "Failed to create notification",
            Action::AcknowledgeNotification => "Failed to acknowledge notification",
            Action::BatchAcknowledgeNotifications => "Failed to acknowledge notifications",
            Action::UpdateNotificationStatus => "Failed to update notification",
            Action::DeleteNotification => "Failed to delete notification",
        }
    }

    pub fn requires_token(&self) -> bool {
        !matches!(self, Action::Login)
    }
}

// =========================================================
// Store
// =========================================================

pub type Subscriber = Box<dyn Fn(&Mutation, &DashState)>;

pub struct Store<C: HttpClient, T: TokenStore> {
    gateway: GatewayClient<C>,
    tokens: T,
    state: RefCell<DashState>,
    subscribers: RefCell<Vec<Subscriber>>,
}

/// Resets `loading` when the action ends, including on early return.
struct LoadingGuard<'a, C: HttpClient, T: TokenStore> {
    store: &'a Store<C, T>,
}

impl<'a, C: HttpClient, T: TokenStore> LoadingGuard<'a, C, T> {
    fn begin(store: &'a Store<C, T>) -> Self {
        store.commit(Mutation::SetLoading(true));
        Self { store }
    }
}

impl<C: HttpClient, T: TokenStore> Drop for LoadingGuard<'_, C, T> {
    fn drop(&mut self) {
        self.store.commit(Mutation::SetLoading(false));
    }
}

impl<C: HttpClient, T: TokenStore> Store<C, T> {
    /// Creates the store, picking up a token left in `tokens` by a previous run.
    pub fn new(gateway: GatewayClient<C>, tokens: T) -> Self {
        let mut state = DashState::new();
        if let Some(token) = tokens.load() {
            log::debug!("store: restored persisted session token");
            state.apply(Mutation::SetToken(Some(token)));
        }
        Self {
            gateway,
            tokens,
            state: RefCell::new(state),
            subscribers: RefCell::new(Vec::new()),
        }
    }

    pub fn gateway(&self) -> &GatewayClient<C> {
        &self.gateway
    }

    /// Applies one mutation and notifies subscribers.
    ///
    /// `SetToken` also writes the token slot: `Some` saves, `None` removes.
    pub fn commit(&self, mutation: Mutation) {
        match &mutation {
            Mutation::SetToken(Some(token)) => self.tokens.save(token),
            Mutation::SetToken(None) => self.tokens.clear(),
            _ => {}
        }
        log::trace!("store: commit {}", mutation.name());

        let subscribers = self.subscribers.borrow();
        if subscribers.is_empty() {
            self.state.borrow_mut().apply(mutation);
            return;
        }
        self.state.borrow_mut().apply(mutation.clone());
        let state = self.state.borrow();
        for subscriber in subscribers.iter() {
            subscriber(&mutation, &state);
        }
    }

    /// Registers a listener called after every commit.
    ///
    /// Listeners must not commit or subscribe from inside the callback.
    pub fn subscribe<F>(&self, listener: F)
    where
        F: Fn(&Mutation, &DashState) + 'static,
    {
        self.subscribers.borrow_mut().push(Box::new(listener));
    }

    /// Borrows the current state. Do not hold the borrow across an `.await`.
    pub fn state(&self) -> Ref<'_, DashState> {
        self.state.borrow()
    }

    pub fn snapshot(&self) -> DashState {
        self.state.borrow().clone()
    }

    // ---------------------------------------------------------
    // Read side
    // ---------------------------------------------------------

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.state.borrow().user().cloned()
    }

    pub fn error(&self) -> Option<String> {
        self.state.borrow().error().map(str::to_string)
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading()
    }

    pub fn token(&self) -> Option<String> {
        self.state.borrow().token().map(str::to_string)
    }

    pub fn devices(&self) -> Vec<Device> {
        self.state.borrow().devices().to_vec()
    }

    pub fn device_last_data(&self, device_id: &DeviceId) -> Option<TelemetrySnapshot> {
        self.state.borrow().device_last_data(device_id).cloned()
    }

    pub fn device_locations(&self, device_id: &DeviceId) -> Option<Vec<LocationPoint>> {
        self.state
            .borrow()
            .device_locations(device_id)
            .map(<[LocationPoint]>::to_vec)
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.state.borrow().notifications().to_vec()
    }

    pub fn pending_notifications(&self) -> Vec<Notification> {
        self.state.borrow().pending_notifications().to_vec()
    }

    pub fn notification_by_id(&self, id: &NotificationId) -> Option<Notification> {
        self.state.borrow().notification_by_id(id).cloned()
    }

    // ---------------------------------------------------------
    // Action plumbing
    // ---------------------------------------------------------

    fn require_token(&self, action: Action) -> StoreResult<String> {
        self.token()
            .ok_or_else(|| StoreError::unauthenticated(action))
    }

    async fn call<R: ApiRequest>(&self, action: Action, request: &R) -> StoreResult<R::Response> {
        let token = if action.requires_token() {
            Some(self.require_token(action)?)
        } else {
            None
        };
        self.gateway
            .send(request, token.as_deref())
            .await
            .map_err(|e| StoreError::from_gateway(action, e))
    }

    async fn dispatch<R, F>(
        &self,
        action: Action,
        request: &R,
        to_mutations: F,
    ) -> StoreResult<R::Response>
    where
        R: ApiRequest,
        F: FnOnce(&R::Response) -> Vec<Mutation>,
    {
        let _loading = LoadingGuard::begin(self);
        self.commit(Mutation::SetError(None));

        match self.call(action, request).await {
            Ok(response) => {
                for mutation in to_mutations(&response) {
                    self.commit(mutation);
                }
                Ok(response)
            }
            Err(err) => {
                log::error!("{} error: {}", action.name(), err);
                self.commit(Mutation::SetError(Some(err.message().to_string())));
                Err(err)
            }
        }
    }

    // ---------------------------------------------------------
    // Session actions
    // ---------------------------------------------------------

    pub async fn login(&self, credentials: Credentials) -> StoreResult<LoginResponse> {
        let response = self
            .dispatch(Action::Login, &credentials, |resp| {
                vec![
                    Mutation::SetUser(resp.user.clone()),
                    Mutation::SetToken(Some(resp.token.clone())),
                ]
            })
            .await?;
        log::info!("login succeeded for {}", credentials.username);
        Ok(response)
    }

    /// Clears the session locally. No network call.
    pub fn logout(&self) {
        self.commit(Mutation::SetUser(None));
        self.commit(Mutation::SetToken(None));
        log::info!("logged out");
    }

    // ---------------------------------------------------------
    // Device actions
    // ---------------------------------------------------------

    pub async fn fetch_devices(&self) -> StoreResult<Vec<Device>> {
        self.dispatch(Action::FetchDevices, &ListDevicesRequest, |devices| {
            vec![Mutation::SetDevices(devices.clone())]
        })
        .await
    }

    pub async fn fetch_device_last_data(
        &self,
        device_id: &DeviceId,
    ) -> StoreResult<TelemetrySnapshot> {
        let request = DeviceLastDataRequest {
            device_id: device_id.clone(),
        };
        self.dispatch(Action::FetchDeviceLastData, &request, |data| {
            vec![Mutation::SetDeviceLastData {
                device_id: device_id.clone(),
                data: data.clone(),
            }]
        })
        .await
    }

    pub async fn fetch_device_locations(
        &self,
        device_id: &DeviceId,
    ) -> StoreResult<Vec<LocationPoint>> {
        let request = DeviceLocationsRequest {
            device_id: device_id.clone(),
        };
        self.dispatch(Action::FetchDeviceLocations, &request, |locations| {
            vec![Mutation::SetDeviceLocations {
                device_id: device_id.clone(),
                locations: locations.clone(),
            }]
        })
        .await
    }

    // ---------------------------------------------------------
    // Notification actions
    // ---------------------------------------------------------

    pub async fn fetch_device_notifications(
        &self,
        device_id: &DeviceId,
    ) -> StoreResult<Vec<Notification>> {
        let request = DeviceNotificationsRequest {
            device_id: device_id.clone(),
        };
        self.dispatch(Action::FetchDeviceNotifications, &request, |list| {
            vec![Mutation::SetNotifications(list.clone())]
        })
        .await
    }

    pub async fn fetch_pending_notifications(&self) -> StoreResult<Vec<Notification>> {
        self.dispatch(
            Action::FetchPendingNotifications,
            &PendingNotificationsRequest,
            |list| vec![Mutation::SetPendingNotifications(list.clone())],
        )
        .await
    }

    pub async fn create_notification(
        &self,
        request: CreateNotificationRequest,
    ) -> StoreResult<Notification> {
        self.dispatch(Action::CreateNotification, &request, |created| {
            vec![Mutation::AddNotification(created.clone())]
        })
        .await
    }

    pub async fn acknowledge_notification(&self, id: NotificationId) -> StoreResult<Notification> {
        let request = AcknowledgeNotificationRequest { id };
        self.dispatch(Action::AcknowledgeNotification, &request, |updated| {
            vec![Mutation::UpdateNotification(updated.clone())]
        })
        .await
    }

    /// Acknowledges several notifications in one call and updates each
    /// returned notification individually.
    pub async fn batch_acknowledge_notifications(
        &self,
        ids: Vec<NotificationId>,
    ) -> StoreResult<BatchAcknowledgeResponse> {
        let request = BatchAcknowledgeRequest {
            notification_ids: ids,
        };
        self.dispatch(Action::BatchAcknowledgeNotifications, &request, |resp| {
            resp.notifications
                .iter()
                .cloned()
                .map(Mutation::UpdateNotification)
                .collect()
        })
        .await
    }

    pub async fn update_notification_status(
        &self,
        request: UpdateNotificationRequest,
    ) -> StoreResult<Notification> {
        self.dispatch(Action::UpdateNotificationStatus, &request, |updated| {
            vec![Mutation::UpdateNotification(updated.clone())]
        })
        .await
    }

    /// Deletes remotely, then drops the local entry. The response body is
    /// not inspected.
    pub async fn delete_notification(&self, id: NotificationId) -> StoreResult<()> {
        let request = DeleteNotificationRequest { id: id.clone() };
        self.dispatch(Action::DeleteNotification, &request, |_| {
            vec![Mutation::RemoveNotification(id)]
        })
        .await
        .map(|_| ())
    }
}
