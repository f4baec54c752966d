use leptos::*;
use wasm_bindgen_futures::spawn_local;

use crate::api::infra::demo_crud::{
    create_demo, delete_demo, get_demo, page_demo, update_demo, Item, PageParams, PageResult,
};
use crate::api::{ApiError, HttpRequestClient, RequestClient};

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn page_count(total: u64, page_size: u32) -> u64 {
    total.div_ceil(u64::from(page_size.max(1))).max(1)
}

fn clamp_page(page: u32, total: u64, page_size: u32) -> u32 {
    let last = page_count(total, page_size).min(u64::from(u32::MAX)) as u32;
    page.clamp(1, last)
}

/// Fetches `params.page`, retrying once on the last page when the requested
/// one is past the end (e.g. after deleting the only row on the last page).
async fn fetch_clamped<C: RequestClient>(
    client: &C,
    mut params: PageParams,
) -> Result<(u32, PageResult<Item>), ApiError> {
    let result = page_demo(client, &params).await?;
    let last = clamp_page(params.page, result.total, params.page_size);
    if last == params.page {
        return Ok((params.page, result));
    }
    params.page = last;
    let result = page_demo(client, &params).await?;
    Ok((last, result))
}

#[component]
pub fn DemoCrudView(cx: Scope) -> impl IntoView {
    let client = use_context::<HttpRequestClient>(cx)
        .unwrap_or_else(|| HttpRequestClient::new(&crate::browser_origin()));
    let client = store_value(cx, client);

    let (items, set_items) = create_signal(cx, Vec::<Item>::new());
    let (total, set_total) = create_signal(cx, 0u64);
    let (page, set_page) = create_signal(cx, 1u32);
    let (editing, set_editing) = create_signal(cx, None::<i64>);
    let (error, set_error) = create_signal(cx, None::<String>);
    let name = create_node_ref::<html::Input>(cx);
    let desc = create_node_ref::<html::Input>(cx);
    let filter = create_node_ref::<html::Input>(cx);

    let report = move |context: &str, err: String| {
        let msg = format!("{context}: {err}");
        gloo::console::error!(msg.clone());
        set_error.set(Some(msg));
    };

    let load = move || {
        let params = PageParams {
            page: page.get_untracked(),
            name: filter.get_untracked().and_then(|el| non_empty(el.value())),
            ..PageParams::default()
        };
        let client = client.get_value();
        spawn_local(async move {
            match fetch_clamped(&client, params).await {
                Ok((current, result)) => {
                    set_page.set(current);
                    set_total.set(result.total);
                    set_items.set(result.items);
                    set_error.set(None);
                }
                Err(err) => report("load failed", err.to_string()),
            }
        });
    };

    let reset_form = move || {
        if let Some(el) = name.get_untracked() {
            el.set_value("");
        }
        if let Some(el) = desc.get_untracked() {
            el.set_value("");
        }
        set_editing.set(None);
    };

    let save = move |_: ev::MouseEvent| {
        let item = Item {
            id: editing.get_untracked(),
            name: name.get_untracked().and_then(|el| non_empty(el.value())),
            desc: desc.get_untracked().and_then(|el| non_empty(el.value())),
        };
        let client = client.get_value();
        spawn_local(async move {
            let result = match item.id {
                Some(_) => update_demo(&client, &item).await,
                None => create_demo(&client, &item).await,
            };
            match result {
                Ok(_) => {
                    reset_form();
                    load();
                }
                Err(err) => report("save failed", err.to_string()),
            }
        });
    };

    let edit = move |id: i64| {
        let client = client.get_value();
        spawn_local(async move {
            match get_demo(&client, id).await {
                Ok(item) => {
                    if let Some(el) = name.get_untracked() {
                        el.set_value(item.name.as_deref().unwrap_or_default());
                    }
                    if let Some(el) = desc.get_untracked() {
                        el.set_value(item.desc.as_deref().unwrap_or_default());
                    }
                    set_editing.set(item.id);
                }
                Err(err) => report("load item failed", err.to_string()),
            }
        });
    };

    let remove = move |id: i64| {
        let client = client.get_value();
        spawn_local(async move {
            match delete_demo(&client, id).await {
                Ok(_) => {
                    if editing.get_untracked() == Some(id) {
                        reset_form();
                    }
                    load();
                }
                Err(err) => report("delete failed", err.to_string()),
            }
        });
    };

    let pages = move || page_count(total.get(), PageParams::default().page_size);
    let go_to = move |target: u32| {
        set_page.set(target);
        load();
    };

    // initial load
    load();

    view! { cx,
        <div class="demo-crud">
            <h2>"CRUD Demo"</h2>

            <div class="toolbar">
                <input node_ref=filter placeholder="Filter by name"/>
                <button on:click=move |_| go_to(1)>"Search"</button>
            </div>

            <div class="form">
                <input node_ref=name placeholder="Name"/>
                <input node_ref=desc placeholder="Description"/>
                <button on:click=save>
                    {move || if editing.get().is_some() { "Save" } else { "Add" }}
                </button>
                <Show when=move || editing.get().is_some() fallback=|_| ()>
                    <button on:click=move |_| reset_form()>"Cancel"</button>
                </Show>
            </div>

            {move || error.get().map(|msg| view! { cx, <p class="error">{msg}</p> })}

            <table>
                <tr><th>"ID"</th><th>"Name"</th><th>"Desc"</th><th>"Action"</th></tr>
                {move || {
                    items.get().into_iter().map(|it| {
                        let id = it.id.unwrap_or_default();
                        view! { cx,
                            <tr>
                                <td>{id}</td>
                                <td>{it.name.unwrap_or_default()}</td>
                                <td>{it.desc.unwrap_or_default()}</td>
                                <td>
                                    <button on:click=move |_| edit(id)>"Edit"</button>
                                    <button on:click=move |_| remove(id)>"Delete"</button>
                                </td>
                            </tr>
                        }.into_view(cx)
                    }).collect::<Vec<_>>()
                }}
            </table>

            <div class="pager">
                <button
                    disabled=move || page.get() <= 1
                    on:click=move |_| go_to(page.get_untracked().saturating_sub(1).max(1))
                >"Prev"</button>
                <span>{move || format!("Page {} of {} ({} items)", page.get(), pages(), total.get())}</span>
                <button
                    disabled=move || u64::from(page.get()) >= pages()
                    on:click=move |_| go_to(page.get_untracked() + 1)
                >"Next"</button>
            </div>
        </div>
    }
}
