use crate::components::ui::{
    Alert, AlertDescription, Button, Card, CardContent, CardDescription, CardFooter, CardHeader,
    CardTitle, Input, Label, Spinner,
};
use crate::editor::BentoGrid;
use crate::state::block_sync::BlockSyncController;
use crate::state::AppContext;
use crate::storage::save_user_to_storage;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_params_map;

#[component]
pub fn LoginPage() -> impl IntoView {
    let email: RwSignal<String> = RwSignal::new(String::new());
    let password: RwSignal<String> = RwSignal::new(String::new());
    let error: RwSignal<Option<String>> = RwSignal::new(None);
    let loading: RwSignal<bool> = RwSignal::new(false);

    let app_state = expect_context::<AppContext>();

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();

        let email_val = email.get();
        let password_val = password.get();
        let mut api_client = app_state.0.api_client.get_untracked();

        loading.set(true);
        error.set(None);

        spawn_local(async move {
            match api_client.login(&email_val, &password_val).await {
                Ok(response) => {
                    api_client.set_token(response.token);
                    api_client.save_to_storage();
                    save_user_to_storage(&response.user);
                    let username = response.user.username.clone();
                    app_state.0.api_client.set(api_client);
                    app_state.0.current_user.set(Some(response.user));
                    let _ = window().location().set_href(&format!("/{username}"));
                }
                Err(e) => {
                    error.set(Some(e.to_string()));
                }
            }
            loading.set(false);
        });
    };

    view! {
        <div class="min-h-screen bg-background">
            <div class="mx-auto flex min-h-screen w-full max-w-md flex-col justify-center px-4 py-12">
                <div class="mb-6">
                    <a href="/" class="text-sm font-medium text-foreground">"Bentoit"</a>
                    <div class="text-xs text-muted-foreground">"Your page, one grid."</div>
                </div>

                <Card>
                    <CardHeader>
                        <CardTitle class="text-xl">"Sign in"</CardTitle>
                        <CardDescription>
                            "Welcome back. Sign in to edit your page."
                        </CardDescription>
                    </CardHeader>

                    <CardContent>
                        <form class="flex flex-col gap-4" on:submit=on_submit>
                            <div class="flex flex-col gap-2">
                                <Label html_for="email">"Email"</Label>
                                <Input
                                    id="email"
                                    r#type="email"
                                    placeholder="you@example.com"
                                    bind_value=email
                                    required=true
                                />
                            </div>

                            <div class="flex flex-col gap-2">
                                <Label html_for="password">"Password"</Label>
                                <Input
                                    id="password"
                                    r#type="password"
                                    placeholder="••••••••"
                                    bind_value=password
                                    required=true
                                />
                            </div>

                            <Show when=move || error.get().is_some() fallback=|| ().into_view()>
                                {move || {
                                    error.get().map(|e| view! {
                                        <Alert class="border-destructive/30">
                                            <AlertDescription class="text-destructive">{e}</AlertDescription>
                                        </Alert>
                                    })
                                }}
                            </Show>

                            <Button class="w-full" attr:disabled=move || loading.get()>
                                <span class="inline-flex items-center gap-2">
                                    <Show when=move || loading.get() fallback=|| ().into_view()>
                                        <Spinner />
                                    </Show>
                                    {move || if loading.get() { "Signing in..." } else { "Sign in" }}
                                </span>
                            </Button>
                        </form>
                    </CardContent>

                    <CardFooter class="justify-between">
                        <div class="text-xs text-muted-foreground">
                            "No account? "
                            <a class="text-primary underline underline-offset-4" href="/signup">"Create one"</a>
                        </div>
                    </CardFooter>
                </Card>
            </div>
        </div>
    }
}

#[component]
pub fn SignupPage() -> impl IntoView {
    let email: RwSignal<String> = RwSignal::new(String::new());
    let username: RwSignal<String> = RwSignal::new(String::new());
    let password: RwSignal<String> = RwSignal::new(String::new());
    let confirm_password: RwSignal<String> = RwSignal::new(String::new());
    let error: RwSignal<Option<String>> = RwSignal::new(None);
    let loading: RwSignal<bool> = RwSignal::new(false);
    let success: RwSignal<bool> = RwSignal::new(false);

    let app_state = expect_context::<AppContext>();

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();

        let email_val = email.get();
        let username_val = username.get();
        let password_val = password.get();
        let confirm_password_val = confirm_password.get();
        let api_client = app_state.0.api_client.get_untracked();

        if password_val != confirm_password_val {
            error.set(Some("Passwords do not match".to_string()));
            return;
        }

        if password_val.len() < 6 {
            error.set(Some("Password must be at least 6 characters".to_string()));
            return;
        }

        if username_val.trim().is_empty() {
            error.set(Some("Username is required".to_string()));
            return;
        }

        loading.set(true);
        error.set(None);

        spawn_local(async move {
            match api_client
                .signup(&email_val, &username_val, &password_val)
                .await
            {
                Ok(_response) => {
                    // Backend returns a token on signup; we keep UX simple and ask user to sign in.
                    success.set(true);
                }
                Err(e) => {
                    error.set(Some(e.to_string()));
                }
            }
            loading.set(false);
        });
    };

    view! {
        <div class="min-h-screen bg-background">
            <div class="mx-auto flex min-h-screen w-full max-w-md flex-col justify-center px-4 py-12">
                <div class="mb-6">
                    <a href="/" class="text-sm font-medium text-foreground">"Bentoit"</a>
                    <div class="text-xs text-muted-foreground">"Create your page."</div>
                </div>

                <Card>
                    <CardHeader>
                        <CardTitle class="text-xl">"Create account"</CardTitle>
                        <CardDescription>
                            "Pick a username; it becomes your page URL."
                        </CardDescription>
                    </CardHeader>

                    <CardContent>
                        <Show
                            when=move || !success.get()
                            fallback=move || view! {
                                <Alert>
                                    <AlertDescription>
                                        "Account created. You can now "
                                        <a class="text-primary underline underline-offset-4" href="/login">"sign in"</a>
                                        "."
                                    </AlertDescription>
                                </Alert>
                            }
                        >
                            <form class="flex flex-col gap-4" on:submit=on_submit>
                                <div class="flex flex-col gap-2">
                                    <Label html_for="username">"Username"</Label>
                                    <Input
                                        id="username"
                                        r#type="text"
                                        placeholder="yourname"
                                        bind_value=username
                                        required=true
                                    />
                                </div>

                                <div class="flex flex-col gap-2">
                                    <Label html_for="email">"Email"</Label>
                                    <Input
                                        id="email"
                                        r#type="email"
                                        placeholder="you@example.com"
                                        bind_value=email
                                        required=true
                                    />
                                </div>

                                <div class="flex flex-col gap-2">
                                    <Label html_for="password">"Password"</Label>
                                    <Input
                                        id="password"
                                        r#type="password"
                                        placeholder="••••••••"
                                        bind_value=password
                                        required=true
                                    />
                                </div>

                                <div class="flex flex-col gap-2">
                                    <Label html_for="confirm_password">"Confirm password"</Label>
                                    <Input
                                        id="confirm_password"
                                        r#type="password"
                                        placeholder="••••••••"
                                        bind_value=confirm_password
                                        required=true
                                    />
                                </div>

                                <Show when=move || error.get().is_some() fallback=|| ().into_view()>
                                    {move || {
                                        error.get().map(|e| view! {
                                            <Alert class="border-destructive/30">
                                                <AlertDescription class="text-destructive">{e}</AlertDescription>
                                            </Alert>
                                        })
                                    }}
                                </Show>

                                <Button class="w-full" attr:disabled=move || loading.get()>
                                    <span class="inline-flex items-center gap-2">
                                        <Show when=move || loading.get() fallback=|| ().into_view()>
                                            <Spinner />
                                        </Show>
                                        {move || if loading.get() { "Creating..." } else { "Create account" }}
                                    </span>
                                </Button>
                            </form>
                        </Show>
                    </CardContent>

                    <CardFooter class="justify-between">
                        <div class="text-xs text-muted-foreground">
                            "Already have an account? "
                            <a class="text-primary underline underline-offset-4" href="/login">"Sign in"</a>
                        </div>
                    </CardFooter>
                </Card>
            </div>
        </div>
    }
}

/// A user's public page at `/:username`. Owners edit in place; everyone
/// else gets the read-only grid.
#[component]
pub fn ProfilePage() -> impl IntoView {
    let params = use_params_map();
    let username = move || params.read().get("username").unwrap_or_default();

    // Remount the grid (and its sync controller) when the route's
    // username changes.
    view! {
        {move || {
            let owner = username();
            view! { <ProfileGrid owner=owner /> }
        }}
    }
}

#[component]
fn ProfileGrid(owner: String) -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let controller = BlockSyncController::new(app_state, owner.clone());
    controller.load();

    let loading = controller.loading;
    let notice = controller.notice;
    let owner_for_title = owner.clone();
    let owner_for_edit = owner.clone();

    let editable = Signal::derive(move || {
        app_state
            .0
            .current_user
            .get()
            .map(|u| u.username == owner_for_edit)
            .unwrap_or(false)
    });

    let on_logout = move |_| {
        let mut api_client = app_state.0.api_client.get_untracked();
        api_client.logout();
        app_state.0.api_client.set(api_client);
        app_state.0.current_user.set(None);
        let _ = window().location().set_href("/login");
    };

    view! {
        <div class="min-h-screen bg-background">
            <div class="mx-auto w-full max-w-[1320px] px-4 py-6">
                <div class="mb-4 flex items-center justify-between">
                    <div class="space-y-1">
                        <h1 class="text-xl font-semibold">{owner_for_title}</h1>
                        <p class="text-xs text-muted-foreground">
                            {move || if editable.get() { "Editing your page" } else { "bentoit.page" }}
                        </p>
                    </div>

                    <div class="flex items-center gap-2">
                        <Show when=move || loading.get() fallback=|| ().into_view()>
                            <Spinner />
                        </Show>
                        {move || {
                            if app_state.0.current_user.get().is_some() {
                                view! {
                                    <Button
                                        class="bg-transparent border border-input text-muted-foreground hover:bg-accent hover:text-accent-foreground"
                                        on:click=on_logout
                                    >
                                        "Sign out"
                                    </Button>
                                }
                                .into_any()
                            } else {
                                view! {
                                    <a class="text-sm text-primary underline underline-offset-4" href="/login">
                                        "Sign in"
                                    </a>
                                }
                                .into_any()
                            }
                        }}
                    </div>
                </div>

                <Show when=move || notice.get().is_some() fallback=|| ().into_view()>
                    {move || {
                        notice.get().map(|e| view! {
                            <Alert class="mb-4 border-destructive/30">
                                <AlertDescription class="text-destructive">{e}</AlertDescription>
                            </Alert>
                        })
                    }}
                </Show>

                <BentoGrid controller=controller editable=editable />
            </div>
        </div>
    }
}

/// `/` routes the signed-in user to their own page; visitors get the
/// login form.
#[component]
pub fn RootPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();

    view! {
        {move || {
            if let Some(user) = app_state.0.current_user.get() {
                let _ = window().location().set_href(&format!("/{}", user.username));
                ().into_view().into_any()
            } else {
                view! { <LoginPage /> }.into_any()
            }
        }}
    }
}
