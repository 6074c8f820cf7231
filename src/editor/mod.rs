use crate::components::ui::{Button, ButtonSize, ButtonVariant, Input, Label, Textarea};
use crate::grid::{cell_occupancy, GRID_HEIGHT, GRID_WIDTH};
use crate::models::{Block, BlockKind};
use crate::state::block_sync::BlockSyncController;
use crate::state::AppContext;
use icons::X;
use leptos::ev;
use leptos::prelude::*;
use leptos_dom::helpers::window_event_listener;
use wasm_bindgen::JsCast;

/// Background colors the toolbar droplet toggles between.
const BG_DARK: &str = "rgb(23, 23, 23)";
const BG_LIGHT: &str = "rgb(38, 38, 38)";

/// The 6x4 block grid. Read-only for visitors; the owner gets drag,
/// resize, add, and edit affordances.
#[component]
pub fn BentoGrid(
    controller: BlockSyncController,
    #[prop(into)] editable: Signal<bool>,
) -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let ctrl = StoredValue::new(controller);

    let hovered_block_id: RwSignal<Option<String>> = RwSignal::new(None);
    let hovered_empty_cell: RwSignal<Option<(i32, i32)>> = RwSignal::new(None);
    let type_list_for: RwSignal<Option<String>> = RwSignal::new(None);
    let overlay_for: RwSignal<Option<String>> = RwSignal::new(None);

    let acting = move || {
        app_state
            .0
            .current_user
            .get_untracked()
            .map(|u| u.username)
    };

    // Resize tracking is window-level: the pointer routinely leaves the
    // handle mid-drag.
    let mousemove = window_event_listener(ev::mousemove, move |ev: web_sys::MouseEvent| {
        if let Some(user) = acting() {
            ctrl.get_value()
                .resize_move(&user, ev.client_x() as f64, ev.client_y() as f64);
        }
    });
    let mouseup = window_event_listener(ev::mouseup, move |_ev: web_sys::MouseEvent| {
        ctrl.get_value().resize_end();
    });

    on_cleanup(move || {
        mousemove.remove();
        mouseup.remove();
        ctrl.get_value().teardown();
    });

    view! {
        <div class="flex flex-col items-center w-full">
            <div
                class="grid gap-4 w-[90vw] max-w-[1280px] rounded-lg p-4"
                style="display: grid; grid-template-columns: repeat(6, minmax(0, 200px)); grid-template-rows: repeat(4, 200px); background-color: rgb(23, 23, 23);"
            >
                {move || {
                    ctrl.get_value()
                        .shown_blocks()
                        .into_iter()
                        .map(|block| {
                            view! {
                                <BlockCell
                                    block=block
                                    editable=editable.get()
                                    ctrl=ctrl
                                    hovered_block_id=hovered_block_id
                                    type_list_for=type_list_for
                                    overlay_for=overlay_for
                                />
                            }
                        })
                        .collect_view()
                }}

                {move || {
                    if !editable.get() {
                        return ().into_view().into_any();
                    }
                    let occupancy = cell_occupancy(&ctrl.get_value().shown_blocks());
                    (0..GRID_HEIGHT)
                        .flat_map(|y| (0..GRID_WIDTH).map(move |x| (x, y)))
                        .filter(|&(x, y)| !occupancy[y as usize][x as usize])
                        .map(|(x, y)| {
                            view! {
                                <EmptyCell
                                    x=x
                                    y=y
                                    ctrl=ctrl
                                    hovered_empty_cell=hovered_empty_cell
                                />
                            }
                        })
                        .collect_view()
                        .into_any()
                }}
            </div>

            {move || {
                overlay_for.get().and_then(|id| {
                    ctrl.get_value()
                        .shown_blocks()
                        .into_iter()
                        .find(|b| b.id == id)
                        .map(|block| view! { <BlockOverlay block=block ctrl=ctrl overlay_for=overlay_for /> })
                })
            }}
        </div>
    }
}

/// One placed block plus its owner-only chrome (toolbar, resize handle).
#[component]
fn BlockCell(
    block: Block,
    editable: bool,
    ctrl: StoredValue<BlockSyncController>,
    hovered_block_id: RwSignal<Option<String>>,
    type_list_for: RwSignal<Option<String>>,
    overlay_for: RwSignal<Option<String>>,
) -> impl IntoView {
    let id_sv = StoredValue::new(block.id.clone());
    let is_center = block.is_center;
    let draggable = editable && !is_center;
    let p = block.position;

    let cell_style = format!(
        "grid-column: {} / span {}; grid-row: {} / span {};",
        p.x + 1,
        p.w,
        p.y + 1,
        p.h
    );

    let show_toolbar = move || {
        editable && !is_center && hovered_block_id.get().as_deref() == Some(id_sv.get_value().as_str())
    };

    let toolbar = {
        let block_for_toolbar = block.clone();
        move || {
            if !show_toolbar() {
                return ().into_view().into_any();
            }
            let b = block_for_toolbar.clone();
            view! {
                <BlockToolbar
                    block=b
                    ctrl=ctrl
                    type_list_for=type_list_for
                    overlay_for=overlay_for
                />
            }
            .into_any()
        }
    };

    let block_for_view = block.clone();

    view! {
        <div
            class=move || {
                if draggable { "relative group cursor-move" } else { "relative group" }
            }
            style=cell_style
            on:mouseenter=move |_| hovered_block_id.set(Some(id_sv.get_value()))
            on:mouseleave=move |_| {
                if hovered_block_id.get_untracked().as_deref() == Some(id_sv.get_value().as_str()) {
                    hovered_block_id.set(None);
                }
            }
            draggable=draggable.to_string()
            on:dragstart=move |ev: web_sys::DragEvent| {
                if !draggable {
                    ev.prevent_default();
                    return;
                }
                if let Some(dt) = ev.data_transfer() {
                    let _ = dt.set_data("text/plain", &id_sv.get_value());
                    dt.set_drop_effect("move");
                }
                ctrl.get_value().begin_drag();
            }
            on:dragend=move |_ev: web_sys::DragEvent| {
                ctrl.get_value().end_drag();
            }
        >
            <BlockContent block=block_for_view editable=editable />

            {toolbar}

            {move || {
                if editable && !is_center {
                    let on_down = Callback::new(move |ev: web_sys::MouseEvent| {
                        ev.stop_propagation();
                        ev.prevent_default();
                        ctrl.get_value().resize_start(
                            &id_sv.get_value(),
                            ev.client_x() as f64,
                            ev.client_y() as f64,
                        );
                    });
                    view! { <ResizeHandle on_mousedown=on_down /> }.into_any()
                } else {
                    ().into_view().into_any()
                }
            }}
        </div>
    }
}

/// Type-dispatched block body.
#[component]
fn BlockContent(block: Block, editable: bool) -> impl IntoView {
    let bg = block.style.background_color.clone().unwrap_or_default();
    let fg = block.style.text_color.clone().unwrap_or_default();
    let container_style = format!("background-color: {bg}; color: {fg};");

    let inner = match block.kind {
        BlockKind::Image => {
            if block.content.is_empty() {
                view! { <div class="flex items-center justify-center h-full">"Drop image here"</div> }
                    .into_any()
            } else {
                view! { <img src=block.content class="w-full h-full object-cover rounded-lg" /> }
                    .into_any()
            }
        }
        BlockKind::Video => {
            if block.content.is_empty() {
                view! { <div class="flex items-center justify-center h-full">"Add video URL"</div> }
                    .into_any()
            } else {
                view! {
                    <iframe
                        src=block.content
                        class="w-full h-full rounded-lg"
                        allowfullscreen=true
                    ></iframe>
                }
                .into_any()
            }
        }
        BlockKind::Link => {
            let label = if block.content.is_empty() {
                "Add link URL".to_string()
            } else {
                block.content.clone()
            };
            view! {
                <a
                    href=block.content
                    target="_blank"
                    rel="noopener noreferrer"
                    class="flex items-center justify-center h-full underline-offset-4 hover:underline"
                >
                    {label}
                </a>
            }
            .into_any()
        }
        BlockKind::Text => {
            let text = if block.content.is_empty() {
                "Add text here".to_string()
            } else {
                block.content.clone()
            };
            view! { <div class="h-full p-4 whitespace-pre-wrap">{text}</div> }.into_any()
        }
    };

    view! {
        <div
            class=move || {
                if editable {
                    "w-full h-full rounded-lg border border-neutral-800 overflow-hidden cursor-pointer"
                } else {
                    "w-full h-full rounded-lg border border-neutral-800 overflow-hidden"
                }
            }
            style=container_style
        >
            {inner}
        </div>
    }
}

/// Hover toolbar: type picker, background toggle, edit overlay, delete.
#[component]
fn BlockToolbar(
    block: Block,
    ctrl: StoredValue<BlockSyncController>,
    type_list_for: RwSignal<Option<String>>,
    overlay_for: RwSignal<Option<String>>,
) -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let id_sv = StoredValue::new(block.id.clone());
    let current_kind = block.kind;
    let current_bg = block.style.background_color.clone();
    let style_sv = StoredValue::new(block.style.clone());

    let acting = move || {
        app_state
            .0
            .current_user
            .get_untracked()
            .map(|u| u.username)
    };

    let type_list_open =
        move || type_list_for.get().as_deref() == Some(id_sv.get_value().as_str());

    view! {
        <div class="absolute -bottom-3 left-1/2 -translate-x-1/2 flex items-center gap-1 px-2 py-1 bg-neutral-800 rounded-lg shadow-lg z-10">
            <div class="relative">
                <button
                    class="p-1.5 rounded hover:bg-neutral-700 text-white/80 text-xs"
                    on:click=move |ev: web_sys::MouseEvent| {
                        ev.stop_propagation();
                        if type_list_open() {
                            type_list_for.set(None);
                        } else {
                            type_list_for.set(Some(id_sv.get_value()));
                        }
                    }
                >
                    "Aa"
                </button>

                {move || {
                    if !type_list_open() {
                        return ().into_view().into_any();
                    }
                    view! {
                        <div class="absolute bottom-full left-1/2 -translate-x-1/2 mb-2 bg-neutral-800 rounded-lg shadow-lg">
                            {BlockKind::ALL
                                .into_iter()
                                .map(|kind| {
                                    let selected = kind == current_kind;
                                    view! {
                                        <button
                                            class=move || {
                                                if selected {
                                                    "block w-full px-4 py-2 text-sm text-left hover:bg-neutral-700 text-blue-400"
                                                } else {
                                                    "block w-full px-4 py-2 text-sm text-left hover:bg-neutral-700 text-white/80"
                                                }
                                            }
                                            on:click=move |ev: web_sys::MouseEvent| {
                                                ev.stop_propagation();
                                                if let Some(user) = acting() {
                                                    ctrl.get_value().update_kind(&user, &id_sv.get_value(), kind);
                                                }
                                                type_list_for.set(None);
                                            }
                                        >
                                            {kind.to_string()}
                                        </button>
                                    }
                                })
                                .collect_view()}
                        </div>
                    }
                    .into_any()
                }}
            </div>

            <button
                class="p-1.5 rounded hover:bg-neutral-700 text-white/80 text-xs"
                title="Toggle background"
                on:click=move |ev: web_sys::MouseEvent| {
                    ev.stop_propagation();
                    let mut style = style_sv.get_value();
                    style.background_color = Some(
                        if current_bg.as_deref() == Some(BG_DARK) { BG_LIGHT } else { BG_DARK }
                            .to_string(),
                    );
                    if let Some(user) = acting() {
                        ctrl.get_value().update_style(&user, &id_sv.get_value(), style);
                    }
                }
            >
                "◧"
            </button>

            <button
                class="p-1.5 rounded hover:bg-neutral-700 text-white/80 text-xs"
                title="Edit block"
                on:click=move |ev: web_sys::MouseEvent| {
                    ev.stop_propagation();
                    overlay_for.set(Some(id_sv.get_value()));
                }
            >
                "✎"
            </button>

            <button
                class="p-1.5 rounded hover:bg-neutral-700 text-red-400"
                title="Delete block"
                on:click=move |ev: web_sys::MouseEvent| {
                    ev.stop_propagation();
                    if let Some(user) = acting() {
                        ctrl.get_value().delete_block(&user, &id_sv.get_value());
                    }
                }
            >
                <X class="size-3.5" />
            </button>
        </div>
    }
}

/// An unoccupied cell: click to add a block, or a drop target while a
/// drag is in flight. Drag-over only highlights; the drop commits.
#[component]
fn EmptyCell(
    x: i32,
    y: i32,
    ctrl: StoredValue<BlockSyncController>,
    hovered_empty_cell: RwSignal<Option<(i32, i32)>>,
) -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let cell_style = format!("grid-column: {}; grid-row: {};", x + 1, y + 1);

    let acting = move || {
        app_state
            .0
            .current_user
            .get_untracked()
            .map(|u| u.username)
    };

    let dragging = move || ctrl.get_value().drag_in_progress.get();
    let hovered = move || hovered_empty_cell.get() == Some((x, y));

    view! {
        <div
            class=move || {
                if dragging() {
                    "relative transition-all duration-150 border-2 border-dashed border-neutral-700 cursor-pointer"
                } else {
                    "relative transition-all duration-150 cursor-pointer"
                }
            }
            style=cell_style
            on:mouseenter=move |_| {
                if !dragging() {
                    hovered_empty_cell.set(Some((x, y)));
                }
            }
            on:mouseleave=move |_| {
                if hovered_empty_cell.get_untracked() == Some((x, y)) {
                    hovered_empty_cell.set(None);
                }
            }
            on:click=move |ev: web_sys::MouseEvent| {
                ev.stop_propagation();
                if dragging() {
                    return;
                }
                if let Some(user) = acting() {
                    ctrl.get_value().add_block(&user, x, y);
                }
            }
            on:dragover=move |ev: web_sys::DragEvent| {
                ev.prevent_default();
                if let Some(dt) = ev.data_transfer() {
                    dt.set_drop_effect("move");
                }
                hovered_empty_cell.set(Some((x, y)));
            }
            on:drop=move |ev: web_sys::DragEvent| {
                ev.prevent_default();
                let dragged_id = ev
                    .data_transfer()
                    .and_then(|dt| dt.get_data("text/plain").ok())
                    .unwrap_or_default();
                hovered_empty_cell.set(None);
                if dragged_id.trim().is_empty() {
                    return;
                }
                if let Some(user) = acting() {
                    ctrl.get_value().drop_block(&user, &dragged_id, x, y);
                }
            }
        >
            {move || {
                if !dragging() && hovered() {
                    view! {
                        <div class="absolute inset-0 flex items-center justify-center text-4xl text-white/50 hover:text-white/80 select-none">
                            "+"
                        </div>
                    }
                    .into_any()
                } else {
                    ().into_view().into_any()
                }
            }}
        </div>
    }
}

/// Bottom-right grab corner for discrete resize.
#[component]
fn ResizeHandle(on_mousedown: Callback<web_sys::MouseEvent>) -> impl IntoView {
    view! {
        <div
            class="absolute bottom-1 right-1 w-6 h-6 cursor-se-resize opacity-0 group-hover:opacity-100 transition-opacity duration-200"
            on:mousedown=move |ev: web_sys::MouseEvent| on_mousedown.run(ev)
        >
            <svg width="24" height="24" viewBox="0 0 15 15" fill="none" xmlns="http://www.w3.org/2000/svg">
                <path
                    d="M11.5 3a.5.5 0 0 0-.5.5v1.6c0 2.26-.004 3.55-.053 4.19-.104 1.27-.945 2.11-2.21 2.21-.642.05-1.93.053-4.19.053H3.5a.5.5 0 0 0 0 1h1.6c2.2 0 3.92 0 4.67-.056 1.4-.114 2.77-1.49 2.88-2.88.057-.754.056-2.47.056-4.67V3.5a.5.5 0 0 0-.5-.5Z"
                    fill="#888888"
                />
            </svg>
        </div>
    }
}

/// Full-screen editor for a single block: kind, content, colors, delete.
#[component]
fn BlockOverlay(
    block: Block,
    ctrl: StoredValue<BlockSyncController>,
    overlay_for: RwSignal<Option<String>>,
) -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let id_sv = StoredValue::new(block.id.clone());
    let is_center = block.is_center;
    let kind = block.kind;
    let content: RwSignal<String> = RwSignal::new(block.content.clone());
    let style_sv = StoredValue::new(block.style.clone());

    let acting = move || {
        app_state
            .0
            .current_user
            .get_untracked()
            .map(|u| u.username)
    };

    let commit_content = move || {
        if let Some(user) = acting() {
            ctrl.get_value()
                .update_content(&user, &id_sv.get_value(), content.get_untracked());
        }
    };

    let set_color = move |field_is_bg: bool, value: String| {
        let mut style = style_sv.get_value();
        if field_is_bg {
            style.background_color = Some(value);
        } else {
            style.text_color = Some(value);
        }
        style_sv.set_value(style.clone());
        if let Some(user) = acting() {
            ctrl.get_value().update_style(&user, &id_sv.get_value(), style);
        }
    };

    view! {
        <div
            class="fixed inset-0 bg-black/50 flex items-center justify-center z-50"
            on:click=move |_| overlay_for.set(None)
        >
            <div
                class="bg-neutral-900 text-white p-6 rounded-lg w-[500px] flex flex-col gap-4"
                on:click=move |ev: web_sys::MouseEvent| ev.stop_propagation()
            >
                <h3 class="text-xl">"Edit Block"</h3>

                <div class="flex flex-col gap-2">
                    <Label>"Type"</Label>
                    <div class="flex gap-2">
                        {BlockKind::ALL
                            .into_iter()
                            .map(|k| {
                                let selected = k == kind;
                                view! {
                                    <Button
                                        variant=if selected { ButtonVariant::Default } else { ButtonVariant::Outline }
                                        size=ButtonSize::Sm
                                        attr:disabled=is_center
                                        on:click=move |_| {
                                            if let Some(user) = acting() {
                                                ctrl.get_value().update_kind(&user, &id_sv.get_value(), k);
                                            }
                                        }
                                    >
                                        {k.to_string()}
                                    </Button>
                                }
                            })
                            .collect_view()}
                    </div>
                </div>

                <div class="flex flex-col gap-2">
                    <Label>"Content"</Label>
                    {move || {
                        if kind == BlockKind::Text {
                            view! {
                                <Textarea
                                    class="bg-neutral-800 border-neutral-700"
                                    bind_value=content
                                />
                            }
                            .into_any()
                        } else {
                            view! {
                                <Input
                                    class="bg-neutral-800 border-neutral-700"
                                    placeholder=format!("Enter {} URL", kind)
                                    bind_value=content
                                />
                            }
                            .into_any()
                        }
                    }}
                </div>

                <div class="grid grid-cols-2 gap-4">
                    <div class="flex flex-col gap-2">
                        <Label>"Background Color"</Label>
                        <input
                            type="color"
                            class="w-full h-10 bg-neutral-800 rounded"
                            on:change=move |ev: web_sys::Event| {
                                if let Some(input) = ev
                                    .target()
                                    .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok())
                                {
                                    set_color(true, input.value());
                                }
                            }
                        />
                    </div>
                    <div class="flex flex-col gap-2">
                        <Label>"Text Color"</Label>
                        <input
                            type="color"
                            class="w-full h-10 bg-neutral-800 rounded"
                            on:change=move |ev: web_sys::Event| {
                                if let Some(input) = ev
                                    .target()
                                    .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok())
                                {
                                    set_color(false, input.value());
                                }
                            }
                        />
                    </div>
                </div>

                <div class="flex justify-between pt-2">
                    <Button
                        variant=ButtonVariant::Outline
                        on:click=move |_| {
                            commit_content();
                            overlay_for.set(None);
                        }
                    >
                        "Done"
                    </Button>
                    {(!is_center)
                        .then(|| {
                            view! {
                                <Button
                                    variant=ButtonVariant::Destructive
                                    on:click=move |_| {
                                        if let Some(user) = acting() {
                                            ctrl.get_value().delete_block(&user, &id_sv.get_value());
                                        }
                                        overlay_for.set(None);
                                    }
                                >
                                    "Delete Block"
                                </Button>
                            }
                        })}
                </div>
            </div>
        </div>
    }
}
