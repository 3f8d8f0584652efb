use crate::config::RuntimeConfig;
use crate::logging::Logger;
use crate::page::Page;
use serde_json::json;
use std::cell::Cell;
use std::rc::Rc;

/// Quadratic ease-in-out: `start` at `elapsed = 0`, `start + distance` at
/// `elapsed = duration`.
pub fn ease_in_out_quad(elapsed: f64, start: f64, distance: f64, duration: f64) -> f64 {
    let mut t = elapsed / (duration / 2.0);
    if t < 1.0 {
        return distance / 2.0 * t * t + start;
    }
    t -= 1.0;
    -distance / 2.0 * (t * (t - 2.0) - 1.0) + start
}

pub struct SmoothScroller<P: Page> {
    page: Rc<P>,
    logger: Logger,
    clearance: f64,
    duration_ms: f64,
}

struct ScrollAnimation {
    start: f64,
    distance: f64,
    duration_ms: f64,
    started_at: Cell<Option<f64>>,
}

impl<P: Page> SmoothScroller<P> {
    pub fn new(page: Rc<P>, config: &RuntimeConfig, logger: Logger) -> Rc<Self> {
        Rc::new(Self {
            page,
            logger,
            clearance: config.nav_clearance,
            duration_ms: f64::from(config.scroll_duration_ms),
        })
    }

    /// Animates the viewport so `selector` sits just below the fixed nav.
    /// Returns `false` when nothing matches.
    pub fn scroll_to(&self, selector: &str) -> bool {
        let Some(target) = self.page.query(selector) else {
            self.logger
                .debug("scroll_target_missing", json!({ "selector": selector }));
            return false;
        };

        let start = self.page.scroll_y();
        let destination = self.page.offset_top(&target) - self.clearance;
        let animation = Rc::new(ScrollAnimation {
            start,
            distance: destination - start,
            duration_ms: self.duration_ms,
            started_at: Cell::new(None),
        });

        schedule_frame(Rc::clone(&self.page), animation);
        true
    }
}

fn schedule_frame<P: Page>(page: Rc<P>, animation: Rc<ScrollAnimation>) {
    let frame_page = Rc::clone(&page);
    page.request_animation_frame(Box::new(move |timestamp| {
        let started_at = animation.started_at.get().unwrap_or(timestamp);
        animation.started_at.set(Some(started_at));

        let elapsed = (timestamp - started_at).min(animation.duration_ms);
        frame_page.scroll_to(ease_in_out_quad(
            elapsed,
            animation.start,
            animation.distance,
            animation.duration_ms,
        ));

        if elapsed < animation.duration_ms {
            schedule_frame(frame_page, animation);
        }
    }));
}
