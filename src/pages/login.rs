//! Login View

use gloo_timers::future::TimeoutFuture;
use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::context::use_services;
use crate::models::{Credentials, Role};
use crate::navigator::Route;
use crate::session::REMEMBERED_USERNAME_KEY;
use crate::validation::{validate_login, validate_login_field, LoginField};

const ROLES: [Role; 3] = [Role::Teacher, Role::Researcher, Role::Operator];

#[component]
pub fn LoginPage() -> impl IntoView {
    let services = use_services();
    let auth = services.auth();

    let username = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let role = RwSignal::new(Role::Teacher);
    let remember = RwSignal::new(false);
    let username_error = RwSignal::new(None::<&'static str>);
    let password_error = RwSignal::new(None::<&'static str>);
    let general_error = RwSignal::new(None::<String>);
    let loading = RwSignal::new(false);

    let delay = services.config().login_redirect_delay_ms;
    let redirect_after_delay = move |target: Route| {
        spawn_local(async move {
            TimeoutFuture::new(delay).await;
            services.navigator().go(target);
        });
    };

    if let Some(target) = auth.resume_route() {
        log::info!("[LOGIN] already signed in, going to {}", target.path());
        redirect_after_delay(target);
    } else if let Some(saved) = services.session().get_string(REMEMBERED_USERNAME_KEY) {
        username.set(saved);
        remember.set(true);
    }

    let on_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        if loading.get_untracked() {
            return;
        }
        let name = username.get_untracked().trim().to_string();
        let pass = password.get_untracked();
        let (user_err, pass_err) = validate_login(&name, &pass);
        username_error.set(user_err);
        password_error.set(pass_err);
        if user_err.is_some() || pass_err.is_some() {
            return;
        }
        general_error.set(None);
        loading.set(true);

        let credentials = Credentials {
            username: name,
            password: pass,
            role: role.get_untracked(),
            remember_me: remember.get_untracked(),
        };
        spawn_local(async move {
            let result = services.auth().login(&credentials).await;
            loading.set(false);
            match result {
                Ok(_) => {
                    let session = services.session();
                    if credentials.remember_me {
                        session.set_storage(REMEMBERED_USERNAME_KEY, &credentials.username, true);
                    } else {
                        session.remove_storage(REMEMBERED_USERNAME_KEY);
                    }
                    redirect_after_delay(Route::for_role(credentials.role));
                }
                Err(e) => {
                    log::warn!("[LOGIN] login failed: {}", e);
                    let msg = e.to_string();
                    general_error.set(Some(if msg.is_empty() {
                        "登录失败，请检查用户名和密码".to_string()
                    } else {
                        msg
                    }));
                }
            }
        });
    };

    view! {
        <div class="login-container">
            <form class="login-form" on:submit=on_submit>
                <h1>"教务运营平台"</h1>

                <div class="form-group">
                    <label for="username">"用户名"</label>
                    <input
                        id="username"
                        type="text"
                        class="form-control"
                        autocomplete="username"
                        prop:value=move || username.get()
                        on:input=move |ev| {
                            username.set(event_target_value(&ev));
                            username_error.set(None);
                        }
                        on:blur=move |_| {
                            username_error.set(validate_login_field(LoginField::Username, &username.get_untracked()))
                        }
                    />
                    <div class="field-error">{move || username_error.get()}</div>
                </div>

                <div class="form-group">
                    <label for="password">"密码"</label>
                    <input
                        id="password"
                        type="password"
                        class="form-control"
                        autocomplete="current-password"
                        prop:value=move || password.get()
                        on:input=move |ev| {
                            password.set(event_target_value(&ev));
                            password_error.set(None);
                        }
                        on:blur=move |_| {
                            password_error.set(validate_login_field(LoginField::Password, &password.get_untracked()))
                        }
                    />
                    <div class="field-error">{move || password_error.get()}</div>
                </div>

                <div class="form-group role-group">
                    {ROLES
                        .into_iter()
                        .map(|r| {
                            view! {
                                <label class="role-option">
                                    <input
                                        type="radio"
                                        name="role"
                                        value=r.as_str()
                                        prop:checked=move || role.get() == r
                                        on:change=move |_| {
                                            log::info!("[LOGIN] role selected: {}", r.as_str());
                                            role.set(r);
                                        }
                                    />
                                    {r.label()}
                                </label>
                            }
                        })
                        .collect_view()}
                </div>

                <label class="remember-me">
                    <input
                        type="checkbox"
                        prop:checked=move || remember.get()
                        on:change=move |ev| remember.set(event_target_checked(&ev))
                    />
                    "记住我"
                </label>

                <Show when=move || general_error.get().is_some()>
                    <div class="general-error show">{move || general_error.get()}</div>
                </Show>

                <button
                    type="submit"
                    class="btn btn-primary login-btn"
                    class:loading=move || loading.get()
                    disabled=move || loading.get()
                >
                    {move || if loading.get() { "登录中..." } else { "登录" }}
                </button>
            </form>
        </div>
    }
}
