//! devboard 核心
//!
//! Platform-neutral core of the device/notification dashboard:
//! - `request`: HTTP transport abstraction (`HttpClient`)
//! - `gateway`: backend API client under a fixed base path
//! - `session`: persisted token slot
//! - `state`: dashboard state and its mutations
//! - `store`: async actions orchestrating gateway calls and mutations
//! - `gate` / `navigator`: route authorization
//!
//! The browser app lives in `frontend/` and plugs its own `fetch` transport
//! and `localStorage` token slot into the same store.

pub mod config;
pub mod error;
pub mod gate;
pub mod gateway;
pub mod navigator;
pub mod request;
pub mod session;
pub mod state;
pub mod store;

pub use devboard_shared as shared;

pub use config::ClientConfig;
pub use error::{GatewayError, StoreError, StoreErrorKind, StoreResult};
pub use gate::{AppRoute, GateDecision};
pub use gateway::GatewayClient;
pub use navigator::{Navigation, Navigator};
pub use request::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use session::{FileTokenStore, MemoryTokenStore, TokenStore};
pub use state::{DashState, Mutation};
pub use store::{Action, Store};

#[cfg(feature = "reqwest-client")]
pub use request::ReqwestHttpClient;

/// Store wired to the native `reqwest` transport.
#[cfg(feature = "reqwest-client")]
pub type NativeStore<T> = Store<ReqwestHttpClient, T>;

/// Builds a native store from configuration.
#[cfg(feature = "reqwest-client")]
pub fn native_store<T: TokenStore>(config: &ClientConfig, tokens: T) -> NativeStore<T> {
    let gateway = GatewayClient::from_config(ReqwestHttpClient::new(), config);
    Store::new(gateway, tokens)
}
