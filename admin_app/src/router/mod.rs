//! Route table and its registration with `leptos_router`.

use leptos::*;
use leptos_router::{use_location, Route, RouteProps, Routes, RoutesProps};

pub mod routes;

/// Deferred view reference. Only called when its route is activated.
pub type LazyView = fn(Scope) -> View;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RouteMeta {
    pub title: &'static str,
    pub icon: &'static str,
}

#[derive(Clone, Copy, Debug)]
pub struct RouteRecord {
    pub path: &'static str,
    pub name: &'static str,
    pub meta: RouteMeta,
    pub component: LazyView,
}

/// Every registered route, in module order.
pub fn routes() -> Vec<RouteRecord> {
    let mut all = Vec::new();
    all.extend(routes::infra::routes());
    all
}

fn set_document_title(title: &str) {
    if let Some(document) = web_sys::window().and_then(|w| w.document()) {
        document.set_title(title);
    }
}

#[component]
fn NotFound(cx: Scope) -> impl IntoView {
    let location = use_location(cx);
    view! { cx, <p class="not-found">"Page not found: " {move || location.pathname.get()}</p> }
}

/// Registers one `Route` per record, plus a not-found catch-all.
/// A record's view factory runs in the route's own scope, only once it matches.
#[component]
pub fn RouteTable(cx: Scope) -> impl IntoView {
    let children: Children = Box::new(|cx| {
        let mut views: Vec<View> = routes()
            .into_iter()
            .map(|record| {
                let activate = move |cx: Scope| {
                    tracing::debug!(name = record.name, path = record.path, "activating route");
                    set_document_title(record.meta.title);
                    (record.component)(cx)
                };
                Route(cx, RouteProps::builder().path(record.path).view(activate).build()).into_view(cx)
            })
            .collect();
        let not_found = |cx: Scope| view! { cx, <NotFound/> };
        views.push(Route(cx, RouteProps::builder().path("/*any").view(not_found).build()).into_view(cx));
        Fragment::new(views)
    });

    Routes(cx, RoutesProps::builder().children(children).build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_collects_module_routes() {
        let all = routes();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].path, "/infra/demo-crud");
        assert_eq!(all[0].name, "InfraDemoCrud");
    }

    #[test]
    fn route_names_and_paths_are_unique() {
        let all = routes();
        for (i, a) in all.iter().enumerate() {
            assert!(all[i + 1..].iter().all(|b| a.name != b.name && a.path != b.path));
        }
    }

    #[test]
    fn paths_are_absolute_without_trailing_slash() {
        for record in routes() {
            assert!(record.path.starts_with('/'), "{}", record.path);
            assert!(!record.path.ends_with('/'), "{}", record.path);
        }
    }
}
