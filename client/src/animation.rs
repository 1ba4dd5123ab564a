use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::prelude::*;

/// Eased progress of the outline-to-tile morph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MorphTransition {
    pub start_time: f64,
    pub duration: f64, // milliseconds
}

impl MorphTransition {
    pub fn new(start_time: f64, duration: f64) -> Self {
        Self {
            start_time,
            duration,
        }
    }

    /// Eased progress in `[0, 1]` at `now`; a non-positive duration is already finished.
    pub fn progress(&self, now: f64) -> f64 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        let elapsed = (now - self.start_time).max(0.0);
        if elapsed >= self.duration {
            return 1.0;
        }
        cubic_ease_out(elapsed / self.duration)
    }

    pub fn is_finished(&self, now: f64) -> bool {
        self.progress(now) >= 1.0
    }
}

/// Cubic ease-out: decelerating to zero velocity.
pub fn cubic_ease_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0) - 1.0;
    t * t * t + 1.0
}

/// Drives a per-frame callback through `requestAnimationFrame`.
///
/// The callback receives the frame timestamp and returns `true` while it needs
/// another frame. `start()` is a no-op while frames are already scheduled.
pub struct FrameLoop {
    inner: Rc<Inner>,
}

struct Inner {
    window: Option<web_sys::Window>,
    scheduled: Cell<bool>,
    raf_id: Cell<Option<i32>>,
    callback: RefCell<Option<Closure<dyn FnMut(f64)>>>,
}

impl Inner {
    fn request_frame(&self) {
        let cb_ref = self.callback.borrow();
        let (Some(cb), Some(window)) = (cb_ref.as_ref(), self.window.as_ref()) else {
            self.scheduled.set(false);
            return;
        };
        match window.request_animation_frame(cb.as_ref().unchecked_ref()) {
            Ok(id) => {
                self.scheduled.set(true);
                self.raf_id.set(Some(id));
            }
            Err(_) => self.scheduled.set(false),
        }
    }
}

impl FrameLoop {
    pub fn new(mut frame_fn: impl FnMut(f64) -> bool + 'static) -> Self {
        let inner = Rc::new(Inner {
            window: web_sys::window(),
            scheduled: Cell::new(false),
            raf_id: Cell::new(None),
            callback: RefCell::new(None),
        });

        let weak = Rc::downgrade(&inner);
        let cb = Closure::<dyn FnMut(f64)>::new(move |timestamp: f64| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            inner.scheduled.set(false);
            inner.raf_id.set(None);
            if frame_fn(timestamp) {
                inner.request_frame();
            }
        });
        *inner.callback.borrow_mut() = Some(cb);

        Self { inner }
    }

    pub fn start(&self) {
        if !self.inner.scheduled.get() {
            self.inner.request_frame();
        }
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        if let Some(raf_id) = self.inner.raf_id.replace(None)
            && let Some(window) = self.inner.window.as_ref()
        {
            let _ = window.cancel_animation_frame(raf_id);
        }
        self.inner.scheduled.set(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ease_out_hits_endpoints() {
        assert_eq!(cubic_ease_out(0.0), 0.0);
        assert_eq!(cubic_ease_out(1.0), 1.0);
        assert_eq!(cubic_ease_out(-2.0), 0.0);
        assert_eq!(cubic_ease_out(3.0), 1.0);
    }

    #[test]
    fn ease_out_front_loads_progress() {
        assert!(cubic_ease_out(0.5) > 0.5);
        let samples: Vec<f64> = (0..=10).map(|i| cubic_ease_out(i as f64 / 10.0)).collect();
        assert!(samples.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn transition_progress_over_time() {
        let transition = MorphTransition::new(1_000.0, 750.0);
        assert_eq!(transition.progress(500.0), 0.0);
        assert_eq!(transition.progress(1_000.0), 0.0);
        let mid = transition.progress(1_375.0);
        assert!(mid > 0.5 && mid < 1.0, "{mid}");
        assert_eq!(transition.progress(1_750.0), 1.0);
        assert!(transition.is_finished(2_000.0));
        assert!(!transition.is_finished(1_100.0));
    }

    #[test]
    fn zero_duration_snaps_to_end() {
        let transition = MorphTransition::new(1_000.0, 0.0);
        assert_eq!(transition.progress(1_000.0), 1.0);
        assert!(transition.is_finished(0.0));
    }
}
