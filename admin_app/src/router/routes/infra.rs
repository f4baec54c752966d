use leptos::*;

use crate::router::{RouteMeta, RouteRecord};
use crate::views::infra::demo_crud::DemoCrudView;

pub const DEMO_CRUD_PATH: &str = "/infra/demo-crud";

fn demo_crud_view(cx: Scope) -> View {
    view! { cx, <DemoCrudView/> }.into_view(cx)
}

pub fn routes() -> Vec<RouteRecord> {
    vec![RouteRecord {
        path: DEMO_CRUD_PATH,
        name: "InfraDemoCrud",
        meta: RouteMeta {
            title: "CRUD Demo",
            icon: "mdi:database",
        },
        component: demo_crud_view,
    }]
}
