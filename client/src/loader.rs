use std::rc::Rc;

use leptos::prelude::*;
use worldmap_shared::RenderState;

use crate::api;
use crate::chart_view::ChartView;
use crate::config::MORPH_DURATION_MS;

#[derive(Debug, Clone, PartialEq)]
pub enum LoadStatus {
    Loading(&'static str),
    Ready,
    Failed(String),
}

impl LoadStatus {
    pub fn message(&self) -> String {
        match self {
            LoadStatus::Loading(step) => format!("Loading {step}..."),
            LoadStatus::Ready => String::new(),
            LoadStatus::Failed(e) => format!("Map unavailable: {e}"),
        }
    }
}

pub const FIRST_STEP: &str = "country outlines";

/// Fetch the world outlines, the visit counts and the tile grid one after another,
/// then draw the chart into `mount`.
pub async fn load(
    mount: web_sys::Element,
    status: RwSignal<LoadStatus>,
) -> Result<Rc<ChartView>, String> {
    status.set(LoadStatus::Loading(FIRST_STEP));
    let world = api::fetch_world().await?;
    for reason in &world.skipped {
        web_sys::console::log_1(&format!("Skipped country outline: {reason}").into());
    }

    status.set(LoadStatus::Loading("visit counts"));
    let visits = api::fetch_visits().await?;

    status.set(LoadStatus::Loading("tile grid"));
    let grid = api::fetch_tile_grid().await?;

    let view = ChartView::create(&mount, world, grid, MORPH_DURATION_MS)?;
    let surface = view.update(RenderState::visits(api::visit_rows(&visits)))?;
    surface
        .set_attribute("aria-label", "World map of visited countries")
        .map_err(|e| format!("{e:?}"))?;
    status.set(LoadStatus::Ready);
    Ok(view)
}
