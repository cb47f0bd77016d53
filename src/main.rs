#[cfg(feature = "ssr")]
#[tokio::main]
async fn main() {
    use activity_signup::app::*;
    use activity_signup::{api_router, ActivityStore};
    use axum::Router;
    use leptos::logging::log;
    use leptos::prelude::*;
    use leptos_axum::{generate_route_list, LeptosRoutes};

    let conf = get_configuration(None).unwrap();
    let addr = conf.leptos_options.site_addr;
    let leptos_options = conf.leptos_options;
    // Generate the list of routes in your Leptos App
    let routes = generate_route_list(App);

    let store = ActivityStore::seeded();

    let leptos_options_clone = leptos_options.clone();
    let app = Router::new()
        .leptos_routes(&leptos_options, routes, move || {
            shell(leptos_options_clone.clone())
        })
        // The activities service the hydrated client talks to.
        .merge(api_router(store))
        // Use shell for fallback.
        .fallback(leptos_axum::file_and_error_handler(shell))
        .with_state(leptos_options.clone());

    // run our app with hyper
    // `axum::Server` is a re-export of `hyper::Server`
    log!("listening on http://{}", &addr);
    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, app.into_make_service())
        .await
        .unwrap();
}

#[cfg(not(feature = "ssr"))]
pub fn main() {
    // no client-side main function
    // unless we want this to work with e.g., Trunk for pure client-side testing
    // see lib.rs for hydration function instead
}
