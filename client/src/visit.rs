use std::cell::Cell;
use std::rc::Rc;

use worldmap_shared::{RenderState, backend_country_name};

use crate::api;
use crate::chart_view::ChartView;
use crate::config::UNIQUE_COUNT_SELECTOR;

/// Page-wide lock so only one visit pipeline runs at a time.
#[derive(Debug, Clone, Default)]
pub struct InFlightGuard {
    busy: Rc<Cell<bool>>,
}

impl InFlightGuard {
    /// `None` while another ticket is alive.
    pub fn try_acquire(&self) -> Option<InFlightTicket> {
        if self.busy.replace(true) {
            return None;
        }
        Some(InFlightTicket {
            busy: Rc::clone(&self.busy),
        })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.get()
    }
}

/// Releases the guard when dropped.
#[derive(Debug)]
pub struct InFlightTicket {
    busy: Rc<Cell<bool>>,
}

impl Drop for InFlightTicket {
    fn drop(&mut self) {
        self.busy.set(false);
    }
}

/// Record a visit for the clicked feature and refresh the map and counter.
/// Clicks arriving while a previous visit is still in flight are ignored.
pub async fn record_click(view: Rc<ChartView>, feature: usize) {
    let Some(_ticket) = view.visit_guard().try_acquire() else {
        web_sys::console::info_1(&"Visit already in progress, click ignored".into());
        return;
    };
    let Some(display_name) = view.feature_name(feature) else {
        return;
    };
    let country = backend_country_name(&display_name);

    if let Err(e) = visit_pipeline(&view, &country).await {
        web_sys::console::warn_1(&format!("Visit to {country} failed: {e}").into());
    }
}

/// Record, then refetch visits, then refetch the unique count, strictly in that order.
async fn visit_pipeline(view: &Rc<ChartView>, country: &str) -> Result<(), String> {
    api::record_visit(country).await?;
    let visits = api::fetch_visits().await?;
    let unique = api::fetch_unique_visits().await?;
    view.update(RenderState::visits(api::visit_rows(&visits)))?;
    set_unique_count(unique.count);
    Ok(())
}

fn set_unique_count(count: u64) {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    if let Ok(Some(el)) = document.query_selector(UNIQUE_COUNT_SELECTOR) {
        el.set_text_content(Some(&count.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::InFlightGuard;

    #[test]
    fn second_acquire_is_rejected_while_ticket_alive() {
        let guard = InFlightGuard::default();
        let ticket = guard.try_acquire();
        assert!(ticket.is_some());
        assert!(guard.is_busy());
        assert!(guard.try_acquire().is_none());
    }

    #[test]
    fn dropping_ticket_releases_guard() {
        let guard = InFlightGuard::default();
        drop(guard.try_acquire());
        assert!(!guard.is_busy());
        assert!(guard.try_acquire().is_some());
    }

    #[test]
    fn clones_share_one_lock() {
        let guard = InFlightGuard::default();
        let other = guard.clone();
        let _ticket = guard.try_acquire();
        assert!(other.try_acquire().is_none());
    }
}
