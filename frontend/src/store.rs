//! 状态存储上下文
//!
//! 核心库的 [`devboard::Store`] 不是 `Send`，因此放在本地存储的
//! `StoredValue` 中；每次提交后把状态快照同步到一个信号里供视图订阅。
//! 路由服务只通过注入的认证信号读取状态，两者互不依赖。

use std::rc::Rc;

use devboard::config::{ENV_API_BASE, ENV_TOKEN_KEY};
use devboard::{ClientConfig, DashState, GatewayClient};
use leptos::prelude::*;

use crate::web::{BrowserTokenStore, FetchHttpClient};

pub type DashStore = devboard::Store<FetchHttpClient, BrowserTokenStore>;

/// 构建期配置：`DEVBOARD_API_BASE` / `DEVBOARD_TOKEN_KEY` 在编译时读取
pub fn build_config() -> ClientConfig {
    ClientConfig::from_lookup(|key| match key {
        ENV_API_BASE => option_env!("DEVBOARD_API_BASE").map(str::to_string),
        ENV_TOKEN_KEY => option_env!("DEVBOARD_TOKEN_KEY").map(str::to_string),
        _ => None,
    })
}

#[derive(Clone, Copy)]
pub struct StoreContext {
    store: StoredValue<Rc<DashStore>, LocalStorage>,
    /// 最近一次提交后的状态快照
    pub state: ReadSignal<DashState>,
}

impl StoreContext {
    pub fn new(config: &ClientConfig) -> Self {
        let gateway = GatewayClient::from_config(FetchHttpClient, config);
        let store = Rc::new(DashStore::new(
            gateway,
            BrowserTokenStore::new(config.token_storage_key.clone()),
        ));

        let (state, set_state) = signal(store.snapshot());
        store.subscribe(move |mutation, next| {
            log::debug!("[store] {}", mutation.name());
            set_state.set(next.clone());
        });

        Self {
            store: StoredValue::new_local(store),
            state,
        }
    }

    pub fn store(&self) -> Rc<DashStore> {
        self.store.get_value()
    }

    /// 获取认证状态信号（用于路由服务注入）
    pub fn is_authenticated_signal(&self) -> Signal<bool> {
        let state = self.state;
        Signal::derive(move || state.with(DashState::is_authenticated))
    }

    pub fn is_loading_signal(&self) -> Signal<bool> {
        let state = self.state;
        Signal::derive(move || state.with(DashState::is_loading))
    }

    pub fn error_signal(&self) -> Signal<Option<String>> {
        let state = self.state;
        Signal::derive(move || state.with(|s| s.error().map(str::to_string)))
    }
}

/// 从 Context 获取状态存储
pub fn use_store() -> StoreContext {
    use_context::<StoreContext>().expect("StoreContext should be provided")
}
