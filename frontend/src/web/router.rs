//! 路由服务模块 - 核心引擎
//!
//! 封装了 web_sys 的 History API，所有对 window.history 的操作都集中在此模块。
//! 守卫判断交给核心库的 [`Navigator`]，这里只负责浏览器状态与信号。
//! 流程：监听 -> 验证 -> 处理 -> 加载

use devboard::{AppRoute, Navigation, Navigator};
use leptos::prelude::*;
use wasm_bindgen::prelude::*;

/// 获取当前浏览器路径
fn current_path() -> String {
    web_sys::window()
        .and_then(|w| w.location().pathname().ok())
        .unwrap_or_else(|| "/".to_string())
}

/// 推送 History 状态
fn push_history_state(path: &str) {
    if let Some(window) = web_sys::window() {
        if let Ok(history) = window.history() {
            let _ = history.push_state_with_url(&JsValue::NULL, "", Some(path));
        }
    }
}

/// 替换 History 状态（用于重定向）
fn replace_history_state(path: &str) {
    if let Some(window) = web_sys::window() {
        if let Ok(history) = window.history() {
            let _ = history.replace_state_with_url(&JsValue::NULL, "", Some(path));
        }
    }
}

/// 路由器服务
///
/// 通过 Signal 驱动界面更新，通过注入的认证信号与状态存储解耦。
#[derive(Clone, Copy)]
pub struct RouterService {
    current_route: ReadSignal<AppRoute>,
    set_route: WriteSignal<AppRoute>,
    /// 守卫状态（上一个路由）
    navigator: StoredValue<Navigator>,
    is_authenticated: Signal<bool>,
}

impl RouterService {
    fn new(is_authenticated: Signal<bool>) -> Self {
        // 初始加载同样经过守卫，来源为空
        let mut navigator = Navigator::new();
        let initial = navigator.navigate(&current_path(), is_authenticated.get_untracked());
        if initial.redirected {
            replace_history_state(&initial.route.to_path());
        }
        log::info!("[router] initial route {}", initial.route);

        let (current_route, set_route) = signal(initial.route);

        Self {
            current_route,
            set_route,
            navigator: StoredValue::new(navigator),
            is_authenticated,
        }
    }

    pub fn current_route(&self) -> ReadSignal<AppRoute> {
        self.current_route
    }

    /// **核心方法：导航与守卫**
    pub fn navigate(&self, path: &str) {
        self.navigate_to_route(AppRoute::from_path(path));
    }

    pub fn navigate_to_route(&self, target: AppRoute) {
        let is_auth = self.is_authenticated.get_untracked();
        let navigation = self
            .navigator
            .try_update_value(|nav| nav.navigate_to(target, is_auth));

        if let Some(navigation) = navigation {
            self.load(navigation);
        }
    }

    /// 推入 History 并更新 UI
    fn load(&self, navigation: Navigation) {
        push_history_state(&navigation.route.to_path());
        self.set_route.set(navigation.route);
    }

    /// 浏览器后退/前进按钮：地址栏已变化，只在被重定向时改写
    fn init_popstate_listener(&self) {
        let set_route = self.set_route;
        let navigator = self.navigator;
        let is_authenticated = self.is_authenticated;

        let closure = Closure::<dyn Fn()>::new(move || {
            let is_auth = is_authenticated.get_untracked();
            let path = current_path();
            let Some(navigation) = navigator.try_update_value(|nav| nav.navigate(&path, is_auth))
            else {
                return;
            };

            if navigation.redirected {
                replace_history_state(&navigation.route.to_path());
            }
            set_route.set(navigation.route);
        });

        if let Some(window) = web_sys::window() {
            let _ = window
                .add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref());
        }

        // 泄漏闭包以保持监听器存活
        closure.forget();
    }

    /// 认证状态变化时重新检查当前路由
    fn setup_auth_redirect(&self) {
        let router = *self;

        Effect::new(move |_| {
            let is_auth = router.is_authenticated.get();
            let navigation = router
                .navigator
                .try_update_value(|nav| nav.reconcile(is_auth))
                .flatten();

            if let Some(navigation) = navigation {
                log::info!(
                    "[router] auth state changed, redirecting to {}",
                    navigation.route
                );
                router.load(navigation);
            }
        });
    }
}

/// 提供路由服务到 Context 并初始化
fn provide_router(is_authenticated: Signal<bool>) -> RouterService {
    let router = RouterService::new(is_authenticated);

    router.init_popstate_listener();
    router.setup_auth_redirect();

    provide_context(router);
    router
}

/// 从 Context 获取路由服务
pub fn use_router() -> RouterService {
    use_context::<RouterService>()
        .expect("RouterService not found in context. Ensure Router is provided.")
}

// ============================================================================
// UI 组件
// ============================================================================

/// 路由器根组件，应在 App 根部使用
#[component]
pub fn Router(
    /// 认证状态信号
    is_authenticated: Signal<bool>,
    children: Children,
) -> impl IntoView {
    provide_router(is_authenticated);

    children()
}

/// 路由出口组件，根据当前路由渲染对应视图
#[component]
pub fn RouterOutlet(
    /// 路由匹配函数：接收当前路由，返回对应视图
    matcher: fn(AppRoute) -> AnyView,
) -> impl IntoView {
    let router = use_router();

    move || {
        let current = router.current_route().get();
        matcher(current)
    }
}

/// 应用内链接，点击时走路由守卫而不是整页跳转
#[component]
pub fn Link(
    #[prop(into)] to: String,
    #[prop(optional, into)] class: String,
    children: Children,
) -> impl IntoView {
    let router = use_router();

    let target = to.clone();
    let on_click = move |ev: leptos::ev::MouseEvent| {
        ev.prevent_default();
        router.navigate(&target);
    };

    view! {
        <a href=to class=class on:click=on_click>
            {children()}
        </a>
    }
}
