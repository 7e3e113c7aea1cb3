use leptos::prelude::*;

use crate::store::use_store;
use crate::web::router::Link;

/// 顶部导航栏：当前用户与退出按钮
#[component]
pub fn NavBar() -> impl IntoView {
    let ctx = use_store();
    let state = ctx.state;

    let user_label = move || {
        state.with(|s| {
            s.user()
                .and_then(|u| u.display_name())
                .unwrap_or("Signed in")
                .to_string()
        })
    };

    // 路由服务监听认证信号，退出后会自动跳转到登录页
    let on_logout = move |_| ctx.store().logout();

    view! {
        <div class="navbar bg-base-100 rounded-box shadow-xl">
            <div class="flex-1 gap-2">
                <Link to="/" class="btn btn-ghost text-xl">"Device Dashboard"</Link>
                <Show when=move || state.with(|s| s.is_loading())>
                    <span class="loading loading-spinner loading-sm text-primary"></span>
                </Show>
            </div>
            <div class="flex-none gap-2">
                <span class="badge badge-neutral hidden md:inline-flex">{user_label}</span>
                <button on:click=on_logout class="btn btn-outline btn-error">"Sign out"</button>
            </div>
        </div>
    }
}

/// 最近一次失败动作的错误信息
#[component]
pub fn ErrorBanner() -> impl IntoView {
    let error = use_store().error_signal();

    view! {
        <Show when=move || error.get().is_some()>
            <div role="alert" class="alert alert-error shadow">
                <span>{move || error.get().unwrap_or_default()}</span>
            </div>
        </Show>
    }
}

/// 通知状态徽章
#[component]
pub fn StatusBadge(#[prop(into)] status: String) -> impl IntoView {
    let class = match status.as_str() {
        "pending" => "badge badge-warning",
        "acknowledged" => "badge badge-info",
        "resolved" => "badge badge-success",
        _ => "badge badge-ghost",
    };

    view! { <span class=class>{status}</span> }
}
