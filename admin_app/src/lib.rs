use leptos::*;
use leptos_router::*;

pub mod api;
pub mod router;
pub mod views;

use api::HttpRequestClient;
use router::{routes, RouteTable};

/// Origin of the page the app is served from, e.g. `http://127.0.0.1:3000`.
pub fn browser_origin() -> String {
    web_sys::window()
        .and_then(|w| w.location().origin().ok())
        .unwrap_or_default()
}

#[component]
pub fn App(cx: Scope, client: HttpRequestClient) -> impl IntoView {
    provide_context(cx, client);

    view! { cx,
        <Router>
            <nav>
                {routes().into_iter().map(|r| view! { cx,
                    <span class="nav-item" data-icon=r.meta.icon>
                        <A href=r.path>{r.meta.title}</A>
                    </span>
                }).collect::<Vec<_>>()}
            </nav>
            <main>
                <RouteTable/>
            </main>
        </Router>
    }
}
