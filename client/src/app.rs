use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;

use crate::chart_view::ChartView;
use crate::loader::{self, LoadStatus};

thread_local! {
    static CHART_VIEW: RefCell<Option<Rc<ChartView>>> = const { RefCell::new(None) };
}

#[component]
pub fn App() -> impl IntoView {
    let chart_ref = NodeRef::<leptos::html::Div>::new();
    let status: RwSignal<LoadStatus> = RwSignal::new(LoadStatus::Loading(loader::FIRST_STEP));
    let load_started = Rc::new(Cell::new(false));

    // Load once the chart container is in the DOM.
    Effect::new(move || {
        if load_started.get() {
            return;
        }
        let Some(container) = chart_ref.get() else {
            return;
        };
        load_started.set(true);
        let mount: web_sys::Element = container.into();

        wasm_bindgen_futures::spawn_local(async move {
            match loader::load(mount, status).await {
                Ok(view) => CHART_VIEW.with(|slot| {
                    *slot.borrow_mut() = Some(view);
                }),
                Err(e) => {
                    web_sys::console::warn_1(&format!("World map failed to load: {e}").into());
                    status.set(LoadStatus::Failed(e));
                }
            }
        });
    });

    view! {
        <div class="worldmap">
            <div class="chart" node_ref=chart_ref></div>
            <p
                class="load-status"
                class:hidden=move || status.get() == LoadStatus::Ready
            >
                {move || status.get().message()}
            </p>
        </div>
    }
}
