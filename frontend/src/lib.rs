//! 设备面板前端应用
//!
//! 采用 Context-Driven 的高内聚低耦合架构：
//! - `store`: 核心状态存储的信号镜像
//! - `web::router`: 路由服务（守卫由核心库的 `Navigator` 决定）
//! - `components`: UI 组件层

mod components {
    pub mod device;
    pub mod home;
    pub mod layout;
    pub mod login;
}
mod store;

use devboard::AppRoute;
use leptos::prelude::*;

use crate::components::device::DevicePage;
use crate::components::home::HomePage;
use crate::components::login::LoginPage;
use crate::store::{StoreContext, build_config};

// 原生 Web API 封装模块
// 此模块提供对浏览器原生 API 的轻量级封装，替代 gloo-* 系列 crate，
// 以减小 WASM 二进制体积。
pub(crate) mod web {
    mod http;
    pub mod router;
    mod storage;

    pub use http::FetchHttpClient;
    pub use storage::BrowserTokenStore;
}

use web::router::{Link, Router, RouterOutlet};

/// 路由匹配函数
///
/// 根据 AppRoute 枚举返回对应的视图组件。
fn route_matcher(route: AppRoute) -> AnyView {
    match route {
        AppRoute::Login => view! { <LoginPage /> }.into_any(),
        AppRoute::Home => view! { <HomePage /> }.into_any(),
        AppRoute::Device { id } => view! { <DevicePage id=id /> }.into_any(),
        AppRoute::NotFound { path } => view! {
            <div class="flex items-center justify-center min-h-screen bg-base-200">
                <div class="text-center">
                    <h1 class="text-6xl font-bold text-error">"404"</h1>
                    <p class="text-xl mt-4">"Page not found"</p>
                    <p class="font-mono text-sm opacity-60 mt-2">{path}</p>
                    <Link to="/" class="btn btn-primary mt-6">"Back to dashboard"</Link>
                </div>
            </div>
        }
        .into_any(),
    }
}

#[component]
pub fn App() -> impl IntoView {
    // 1. 创建状态存储（构造时从 LocalStorage 恢复令牌）
    let config = build_config();
    log::info!("[app] api base {}", config.api_base_url);
    let store_ctx = StoreContext::new(&config);
    provide_context(store_ctx);

    // 2. 认证状态信号注入路由服务
    let is_authenticated = store_ctx.is_authenticated_signal();

    view! {
        <Router is_authenticated=is_authenticated>
            <RouterOutlet matcher=route_matcher />
        </Router>
    }
}
