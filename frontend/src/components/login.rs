use devboard_shared::Credentials;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::store::use_store;
use crate::web::router::use_router;

#[component]
pub fn LoginPage() -> impl IntoView {
    let ctx = use_store();
    let router = use_router();

    let (username, set_username) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (form_error, set_form_error) = signal(Option::<String>::None);

    let is_loading = ctx.is_loading_signal();
    let store_error = ctx.error_signal();
    let shown_error = move || form_error.get().or_else(|| store_error.get());

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let credentials = Credentials {
            username: username.get_untracked(),
            password: password.get_untracked(),
        };
        if credentials.username.trim().is_empty() || credentials.password.is_empty() {
            set_form_error.set(Some("Please fill in all fields".to_string()));
            return;
        }
        set_form_error.set(None);

        let store = ctx.store();
        spawn_local(async move {
            // 失败信息已写入状态，由 store_error 展示
            if store.login(credentials).await.is_ok() {
                set_password.set(String::new());
                router.navigate("/");
            }
        });
    };

    view! {
        <div class="hero min-h-screen bg-base-200">
            <div class="hero-content flex-col w-full max-w-md">
                <div class="text-center mb-4">
                    <h1 class="text-3xl font-bold">"Device Dashboard"</h1>
                    <p class="text-base-content/70">"Sign in to continue"</p>
                </div>

                <div class="card shrink-0 w-full shadow-2xl bg-base-100">
                    <form class="card-body" on:submit=on_submit>
                        <Show when=move || shown_error().is_some()>
                            <div role="alert" class="alert alert-error text-sm py-2">
                                <span>{move || shown_error().unwrap_or_default()}</span>
                            </div>
                        </Show>

                        <div class="form-control">
                            <label class="label" for="username">
                                <span class="label-text">"Username"</span>
                            </label>
                            <input
                                id="username"
                                type="text"
                                autocomplete="username"
                                on:input=move |ev| set_username.set(event_target_value(&ev))
                                prop:value=username
                                class="input input-bordered"
                                required
                            />
                        </div>
                        <div class="form-control">
                            <label class="label" for="password">
                                <span class="label-text">"Password"</span>
                            </label>
                            <input
                                id="password"
                                type="password"
                                autocomplete="current-password"
                                placeholder="••••••••"
                                on:input=move |ev| set_password.set(event_target_value(&ev))
                                prop:value=password
                                class="input input-bordered"
                                required
                            />
                        </div>
                        <div class="form-control mt-6">
                            <button class="btn btn-primary" disabled=move || is_loading.get()>
                                {move || if is_loading.get() {
                                    view! { <span class="loading loading-spinner"></span> "Signing in..." }.into_any()
                                } else {
                                    "Sign in".into_any()
                                }}
                            </button>
                        </div>
                    </form>
                </div>
            </div>
        </div>
    }
}
