use admin_app::api::HttpRequestClient;
use admin_app::{browser_origin, App};
use leptos::*;

fn main() {
    let client = HttpRequestClient::new(&browser_origin());
    mount_to_body(move |cx| {
        view! { cx, <App client=client/> }
    });
}
