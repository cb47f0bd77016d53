use leptos::ev::SubmitEvent;
#[cfg(feature = "hydrate")]
use leptos::logging::error;
use leptos::prelude::*;
#[cfg(feature = "hydrate")]
use leptos::task::spawn_local;
use leptos_meta::{provide_meta_context, MetaTags, Stylesheet, Title};
use leptos_router::{
    components::{Route, Router, Routes},
    path,
};

#[cfg(feature = "hydrate")]
use gloo_timers::future::TimeoutFuture;

#[cfg(feature = "hydrate")]
use crate::api::{browser, ApiError};
#[cfg(feature = "hydrate")]
use crate::model::MESSAGE_TIMEOUT_MS;
use crate::model::{validate_signup, Catalog, StatusBanner, StatusKind};

pub fn shell(options: LeptosOptions) -> impl IntoView {
    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8" />
                <meta name="viewport" content="width=device-width, initial-scale=1" />
                <AutoReload options=options.clone() />
                <HydrationScripts options />
                <MetaTags />
            </head>
            <body>
                <App />
            </body>
        </html>
    }
}

#[component]
pub fn App() -> impl IntoView {
    // Provides context that manages stylesheets, titles, meta tags, etc.
    provide_meta_context();

    view! {
        // injects a stylesheet into the document <head>
        // id=leptos means cargo-leptos will hot-reload this stylesheet
        <Stylesheet id="leptos" href="/pkg/activity-signup.css" />

        // sets the document title
        <Title text="Mergington High School Activities" />

        <Router>
            <main>
                <Routes fallback=|| "Page not found.".into_view()>
                    <Route path=path!("/") view=ActivitiesPage />
                </Routes>
            </main>
        </Router>
    }
}

/// One activity shaped for display: everything a card shows, precomputed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityCard {
    pub name: String,
    pub description: String,
    pub schedule: String,
    pub availability: String,
}

/// Projects the catalog into the card list and the selector options, both in
/// server order.
pub fn catalog_view(catalog: &Catalog) -> (Vec<ActivityCard>, Vec<String>) {
    let cards = catalog
        .iter()
        .map(|(name, activity)| ActivityCard {
            name: name.clone(),
            description: activity.description.clone(),
            schedule: activity.schedule.clone(),
            availability: format!("{} spots left", activity.spots_left()),
        })
        .collect();
    let options = catalog.iter().map(|(name, _)| name.clone()).collect();
    (cards, options)
}

/// Text shown for a refused signup: the service's own explanation when the
/// response carried one, a generic notice otherwise.
pub fn refusal_message(detail: Option<String>) -> String {
    detail.unwrap_or_else(|| "An error occurred".to_string())
}

/// Clears the banner once the display window elapses, unless a newer message
/// has replaced it in the meantime.
fn schedule_dismissal(banner: RwSignal<StatusBanner>, generation: u64) {
    #[cfg(feature = "hydrate")]
    spawn_local(async move {
        TimeoutFuture::new(MESSAGE_TIMEOUT_MS).await;
        banner.update(|b| b.dismiss(generation));
    });
    #[cfg(not(feature = "hydrate"))]
    let _ = (banner, generation);
}

#[component]
fn ActivitiesPage() -> impl IntoView {
    // The catalog is only ever replaced wholesale by a successful fetch.
    let catalog = RwSignal::new(Catalog::new());
    let load_failed = RwSignal::new(false);
    let banner = RwSignal::new(StatusBanner::default());

    // Form state.
    let selected_activity = RwSignal::new(String::new());
    let email = RwSignal::new(String::new());
    let submitting = RwSignal::new(false);

    let show_message = move |kind: StatusKind, text: String| {
        let generation = banner
            .try_update(|b| b.show(kind, text))
            .unwrap_or_default();
        schedule_dismissal(banner, generation);
    };

    let refresh_activities = move || {
        #[cfg(feature = "hydrate")]
        spawn_local(async move {
            match browser::fetch_activities().await {
                Ok(fresh) => {
                    catalog.set(fresh);
                    load_failed.set(false);
                }
                Err(e) => {
                    error!("Error fetching activities: {}", e);
                    load_failed.set(true);
                    // Placeholder-only selector: a stale selection must not
                    // outlive the list it came from.
                    selected_activity.set(String::new());
                }
            }
        });
    };

    // Initial load. Effects run only in the browser, so the server renders the
    // empty shell and the hydrated client fills it in.
    Effect::new(move || {
        refresh_activities();
    });

    // A handler for the signup form. Validates locally against the cached
    // catalog, and only on success sends the request. Any outcome surfaces as
    // a banner message that hides itself after a few seconds.
    let submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        if submitting.get() {
            return;
        }
        let request =
            match catalog.with(|c| validate_signup(c, &selected_activity.get(), &email.get())) {
                Ok(request) => request,
                Err(e) => {
                    show_message(StatusKind::Error, e.to_string());
                    return;
                }
            };
        submitting.set(true);
        #[cfg(feature = "hydrate")]
        spawn_local(async move {
            match browser::submit_signup(&request.activity, &request.email).await {
                Ok(receipt) => {
                    show_message(StatusKind::Success, receipt.message);
                    selected_activity.set(String::new());
                    email.set(String::new());
                    refresh_activities();
                }
                Err(ApiError::Status { detail, .. }) => {
                    show_message(StatusKind::Error, refusal_message(detail));
                }
                Err(e) => {
                    error!("Error signing up: {}", e);
                    show_message(
                        StatusKind::Error,
                        "Failed to sign up. Please try again.".to_string(),
                    );
                }
            }
            submitting.set(false);
        });
        #[cfg(not(feature = "hydrate"))]
        let _ = request;
    };

    view! {
        <div class="container">
            <h1>"Mergington High School Activities"</h1>

            <section class="activities-section">
                <h2>"Available Activities"</h2>
                <div class="activities-list">
                    {move || {
                        if load_failed.get() {
                            view! { <p>"Failed to load activities. Please try again later."</p> }
                                .into_any()
                        } else {
                            catalog
                                .with(|c| {
                                    let (cards, _) = catalog_view(c);
                                    cards
                                        .into_iter()
                                        .map(|card| {
                                            view! {
                                                <div class="activity-card">
                                                    <h4>{card.name}</h4>
                                                    <p>{card.description}</p>
                                                    <p>
                                                        <strong>"Schedule: "</strong>
                                                        {card.schedule}
                                                    </p>
                                                    <p>
                                                        <strong>"Availability: "</strong>
                                                        {card.availability}
                                                    </p>
                                                </div>
                                            }
                                        })
                                        .collect_view()
                                        .into_any()
                                })
                        }
                    }}
                </div>
            </section>

            <section class="signup-section">
                <h2>"Sign Up for an Activity"</h2>
                <form on:submit=submit>
                    <label>
                        "Email: "
                        <input
                            type="email"
                            placeholder="your-email@mergington.edu"
                            prop:value=move || email.get()
                            on:input=move |ev| email.set(event_target_value(&ev))
                        />
                    </label>
                    <label>
                        "Activity: "
                        <select
                            prop:value=move || selected_activity.get()
                            on:change=move |ev| selected_activity.set(event_target_value(&ev))
                        >
                            <option value="">"-- Select an activity --"</option>
                            {move || {
                                if load_failed.get() {
                                    view! {}.into_any()
                                } else {
                                    catalog
                                        .with(|c| {
                                            let (_, options) = catalog_view(c);
                                            options
                                                .into_iter()
                                                .map(|name| {
                                                    let value = name.clone();
                                                    view! { <option value=value>{name}</option> }
                                                })
                                                .collect_view()
                                                .into_any()
                                        })
                                }
                            }}
                        </select>
                    </label>
                    <button type="submit" prop:disabled=move || submitting.get()>
                        "Sign Up"
                    </button>
                </form>
                {move || {
                    banner
                        .with(|b| {
                            b.visible()
                                .map(|(kind, text)| {
                                    let class = match kind {
                                        StatusKind::Success => "success",
                                        StatusKind::Error => "error",
                                    };
                                    view! { <p class=class>{text.to_string()}</p> }
                                })
                        })
                }}
            </section>
        </div>
    }
}
