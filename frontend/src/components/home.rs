use devboard::AppRoute;
use devboard_shared::{Device, Notification, NotificationId};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::components::layout::{ErrorBanner, NavBar, StatusBadge};
use crate::store::use_store;
use crate::web::router::use_router;

#[component]
pub fn HomePage() -> impl IntoView {
    let ctx = use_store();
    let router = use_router();
    let state = ctx.state;

    let load = move || {
        let store = ctx.store();
        spawn_local(async move {
            // 两个请求互不依赖，失败信息各自写入状态
            let _ = store.fetch_devices().await;
            let _ = store.fetch_pending_notifications().await;
        });
    };

    // 初始加载
    load();

    let acknowledge = move |id: NotificationId| {
        let store = ctx.store();
        spawn_local(async move {
            if store.acknowledge_notification(id).await.is_ok() {
                let _ = store.fetch_pending_notifications().await;
            }
        });
    };

    let acknowledge_all = move |_| {
        let ids: Vec<NotificationId> =
            state.with_untracked(|s| s.pending_notifications().iter().map(|n| n.id.clone()).collect());
        if ids.is_empty() {
            return;
        }
        let store = ctx.store();
        spawn_local(async move {
            if store.batch_acknowledge_notifications(ids).await.is_ok() {
                let _ = store.fetch_pending_notifications().await;
            }
        });
    };

    let devices = move || state.with(|s| s.devices().to_vec());
    let pending = move || state.with(|s| s.pending_notifications().to_vec());
    let device_count = move || state.with(|s| s.devices().len());
    let pending_count = move || state.with(|s| s.pending_notifications().len());

    view! {
        <div class="min-h-screen bg-base-200 p-4 md:p-8 font-sans">
            <div class="max-w-7xl mx-auto space-y-8">
                <NavBar />
                <ErrorBanner />

                <div class="stats shadow w-full stats-vertical md:stats-horizontal bg-base-100">
                    <div class="stat">
                        <div class="stat-title">"Devices"</div>
                        <div class="stat-value text-primary">{device_count}</div>
                    </div>
                    <div class="stat">
                        <div class="stat-title">"Pending notifications"</div>
                        <div class="stat-value text-warning">{pending_count}</div>
                    </div>
                </div>

                <div class="card bg-base-100 shadow-xl">
                    <div class="card-body p-0">
                        <div class="flex items-center justify-between p-6 pb-2">
                            <h3 class="card-title">"Devices"</h3>
                            <button on:click=move |_| load() class="btn btn-ghost btn-sm">"Refresh"</button>
                        </div>
                        <div class="overflow-x-auto w-full">
                            <table class="table table-zebra w-full">
                                <thead>
                                    <tr>
                                        <th>"Name"</th>
                                        <th>"ID"</th>
                                        <th></th>
                                    </tr>
                                </thead>
                                <tbody>
                                    <Show when=move || device_count() == 0>
                                        <tr>
                                            <td colspan="3" class="text-center py-8 text-base-content/50">
                                                "No devices."
                                            </td>
                                        </tr>
                                    </Show>
                                    <For
                                        each=devices
                                        key=|d: &Device| d.id.clone()
                                        children=move |device: Device| {
                                            let path = AppRoute::Device { id: device.id.clone() }.to_path();
                                            view! {
                                                <tr>
                                                    <td class="font-bold">{device.label().to_string()}</td>
                                                    <td class="font-mono text-sm opacity-70">{device.id.to_string()}</td>
                                                    <td>
                                                        <button
                                                            class="btn btn-primary btn-sm"
                                                            on:click=move |_| router.navigate(&path)
                                                        >
                                                            "Details"
                                                        </button>
                                                    </td>
                                                </tr>
                                            }
                                        }
                                    />
                                </tbody>
                            </table>
                        </div>
                    </div>
                </div>

                <div class="card bg-base-100 shadow-xl">
                    <div class="card-body p-0">
                        <div class="flex items-center justify-between p-6 pb-2">
                            <h3 class="card-title">"Pending notifications"</h3>
                            <button
                                on:click=acknowledge_all
                                disabled=move || pending_count() == 0
                                class="btn btn-outline btn-sm"
                            >
                                "Acknowledge all"
                            </button>
                        </div>
                        <div class="overflow-x-auto w-full">
                            <table class="table w-full">
                                <thead>
                                    <tr>
                                        <th>"Device"</th>
                                        <th>"Type"</th>
                                        <th>"Message"</th>
                                        <th>"Status"</th>
                                        <th></th>
                                    </tr>
                                </thead>
                                <tbody>
                                    <For
                                        each=pending
                                        key=|n: &Notification| (n.id.clone(), n.status.clone())
                                        children=move |notification: Notification| {
                                            let id = notification.id;
                                            view! {
                                                <tr>
                                                    <td class="font-mono text-sm">{notification.device_id.to_string()}</td>
                                                    <td>{notification.kind}</td>
                                                    <td>{notification.message}</td>
                                                    <td><StatusBadge status=notification.status /></td>
                                                    <td>
                                                        <button
                                                            class="btn btn-ghost btn-sm"
                                                            on:click=move |_| acknowledge(id.clone())
                                                        >
                                                            "Acknowledge"
                                                        </button>
                                                    </td>
                                                </tr>
                                            }
                                        }
                                    />
                                </tbody>
                            </table>
                        </div>
                    </div>
                </div>
            </div>
        </div>
    }
}
