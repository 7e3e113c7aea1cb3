use devboard_shared::{
    CreateNotificationRequest, DeviceId, LocationPoint, Notification, NotificationId,
    UpdateNotificationRequest,
};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::components::layout::{ErrorBanner, NavBar, StatusBadge};
use crate::store::use_store;
use crate::web::router::use_router;

const NOTIFICATION_TYPES: [&str; 3] = ["alert", "maintenance", "info"];

#[component]
pub fn DevicePage(id: DeviceId) -> impl IntoView {
    let ctx = use_store();
    let router = use_router();
    let state = ctx.state;

    {
        let store = ctx.store();
        let id = id.clone();
        spawn_local(async move {
            let (_, _, _) = futures::join!(
                store.fetch_device_last_data(&id),
                store.fetch_device_locations(&id),
                store.fetch_device_notifications(&id),
            );
        });
    }

    let telemetry = {
        let id = id.clone();
        move || {
            state.with(|s| {
                s.device_last_data(&id)
                    .map(|data| data.scalar_fields())
                    .unwrap_or_default()
            })
        }
    };
    let locations = {
        let id = id.clone();
        move || {
            state.with(|s| {
                s.device_locations(&id)
                    .map(<[LocationPoint]>::to_vec)
                    .unwrap_or_default()
            })
        }
    };
    let notifications = move || state.with(|s| s.notifications().to_vec());

    let acknowledge = move |nid: NotificationId| {
        let store = ctx.store();
        spawn_local(async move {
            let _ = store.acknowledge_notification(nid).await;
        });
    };
    let resolve = move |nid: NotificationId| {
        let store = ctx.store();
        spawn_local(async move {
            let request = UpdateNotificationRequest {
                id: nid,
                status: "resolved".to_string(),
                message: None,
            };
            let _ = store.update_notification_status(request).await;
        });
    };
    let remove = move |nid: NotificationId| {
        let store = ctx.store();
        spawn_local(async move {
            let _ = store.delete_notification(nid).await;
        });
    };

    let (kind, set_kind) = signal(NOTIFICATION_TYPES[0].to_string());
    let (message, set_message) = signal(String::new());
    let on_create = {
        let id = id.clone();
        move |ev: leptos::ev::SubmitEvent| {
            ev.prevent_default();
            let text = message.get_untracked();
            if text.trim().is_empty() {
                return;
            }
            let request = CreateNotificationRequest {
                device_id: id.clone(),
                kind: kind.get_untracked(),
                message: text,
                asset_data_id: None,
            };
            let store = ctx.store();
            spawn_local(async move {
                if store.create_notification(request).await.is_ok() {
                    set_message.set(String::new());
                }
            });
        }
    };

    let title = id.to_string();

    view! {
        <div class="min-h-screen bg-base-200 p-4 md:p-8 font-sans">
            <div class="max-w-7xl mx-auto space-y-8">
                <NavBar />
                <ErrorBanner />

                <div class="flex items-center gap-4">
                    <button class="btn btn-ghost btn-sm" on:click=move |_| router.navigate("/")>
                        "Back"
                    </button>
                    <h2 class="text-2xl font-bold font-mono">"Device " {title}</h2>
                </div>

                <div class="grid gap-8 md:grid-cols-2">
                    <div class="card bg-base-100 shadow-xl">
                        <div class="card-body">
                            <h3 class="card-title">"Latest data"</h3>
                            <table class="table table-sm">
                                <tbody>
                                    <For
                                        each=telemetry
                                        key=|(k, v): &(String, String)| (k.clone(), v.clone())
                                        children=|(k, v): (String, String)| {
                                            view! {
                                                <tr>
                                                    <th class="font-mono">{k}</th>
                                                    <td>{v}</td>
                                                </tr>
                                            }
                                        }
                                    />
                                </tbody>
                            </table>
                        </div>
                    </div>

                    <div class="card bg-base-100 shadow-xl">
                        <div class="card-body">
                            <h3 class="card-title">"Locations"</h3>
                            <ul class="font-mono text-sm space-y-1 max-h-64 overflow-y-auto">
                                {move || {
                                    locations()
                                        .into_iter()
                                        .map(|point| {
                                            let text = match point.coordinates() {
                                                Some((lat, lng)) => format!("{:.5}, {:.5}", lat, lng),
                                                None => point.0.to_string(),
                                            };
                                            view! { <li>{text}</li> }
                                        })
                                        .collect_view()
                                }}
                            </ul>
                        </div>
                    </div>
                </div>

                <div class="card bg-base-100 shadow-xl">
                    <div class="card-body">
                        <h3 class="card-title">"Notifications"</h3>

                        <form class="flex flex-wrap gap-2 items-end" on:submit=on_create>
                            <select
                                class="select select-bordered select-sm"
                                on:change=move |ev| set_kind.set(event_target_value(&ev))
                                prop:value=kind
                            >
                                {NOTIFICATION_TYPES
                                    .iter()
                                    .map(|t| view! { <option value=*t>{*t}</option> })
                                    .collect_view()}
                            </select>
                            <input
                                type="text"
                                placeholder="Message"
                                class="input input-bordered input-sm flex-1"
                                on:input=move |ev| set_message.set(event_target_value(&ev))
                                prop:value=message
                            />
                            <button class="btn btn-primary btn-sm">"Create"</button>
                        </form>

                        <table class="table w-full">
                            <thead>
                                <tr>
                                    <th>"Type"</th>
                                    <th>"Message"</th>
                                    <th>"Status"</th>
                                    <th></th>
                                </tr>
                            </thead>
                            <tbody>
                                <For
                                    each=notifications
                                    key=|n: &Notification| (n.id.clone(), n.status.clone(), n.message.clone())
                                    children=move |notification: Notification| {
                                        let ack_id = notification.id.clone();
                                        let resolve_id = notification.id.clone();
                                        let remove_id = notification.id;
                                        view! {
                                            <tr>
                                                <td>{notification.kind}</td>
                                                <td>{notification.message}</td>
                                                <td><StatusBadge status=notification.status /></td>
                                                <td class="flex gap-1">
                                                    <button class="btn btn-ghost btn-xs" on:click=move |_| acknowledge(ack_id.clone())>
                                                        "Acknowledge"
                                                    </button>
                                                    <button class="btn btn-ghost btn-xs" on:click=move |_| resolve(resolve_id.clone())>
                                                        "Resolve"
                                                    </button>
                                                    <button class="btn btn-ghost btn-xs text-error" on:click=move |_| remove(remove_id.clone())>
                                                        "Delete"
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
    }
}
