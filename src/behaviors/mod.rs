//! Behavior runner: ordered, time-bounded page mutations that surface
//! content hidden behind overlays, tabs, carousels, and lazy/infinite
//! scrolling before the capture pipeline reads the page.
//!
//! Every behavior runs through [`run_js`], which swallows evaluation errors
//! into a zero-effect count rather than propagating them — behaviors never
//! fail the capture, per the contract in the capture pipeline.

pub mod click_tabs;
pub mod dismiss_overlays;
pub mod expand_comments;
pub mod expand_content;
pub mod infinite_scroll;
pub mod navigate_carousels;
pub mod scroll_to_load;

use std::time::{Duration, Instant};

use chromiumoxide::Page;
use serde::Serialize;
use tracing::warn;

/// Per-behavior effect count plus whether it was cut short by its deadline.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct BehaviorOutcome {
    pub effects: u32,
    pub timed_out: bool,
}

/// Aggregate statistics for one behavior-runner pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BehaviorReport {
    pub dismiss_overlays: BehaviorOutcome,
    pub scroll_to_load: BehaviorOutcome,
    pub expand_content: BehaviorOutcome,
    pub click_tabs: BehaviorOutcome,
    pub navigate_carousels: BehaviorOutcome,
    pub expand_comments: BehaviorOutcome,
    pub infinite_scroll: BehaviorOutcome,
    pub elapsed_ms: u64,
}

impl BehaviorReport {
    #[must_use]
    pub fn total_effects(&self) -> u32 {
        self.dismiss_overlays.effects
            + self.scroll_to_load.effects
            + self.expand_content.effects
            + self.click_tabs.effects
            + self.navigate_carousels.effects
            + self.expand_comments.effects
            + self.infinite_scroll.effects
    }
}

/// Run every behavior in the fixed order the spec defines, each bounded by
/// `per_behavior_timeout`, the whole pass bounded by `overall_timeout`.
pub async fn run_all(
    page: &Page,
    per_behavior_timeout: Duration,
    overall_timeout: Duration,
) -> BehaviorReport {
    let start = Instant::now();
    let mut report = BehaviorReport::default();

    macro_rules! step {
        ($field:ident, $func:path) => {
            if start.elapsed() >= overall_timeout {
                report.$field.timed_out = true;
            } else {
                report.$field = bounded(per_behavior_timeout, $func(page)).await;
            }
        };
    }

    step!(dismiss_overlays, dismiss_overlays::run);
    step!(scroll_to_load, scroll_to_load::run);
    step!(expand_content, expand_content::run);
    step!(click_tabs, click_tabs::run);
    step!(navigate_carousels, navigate_carousels::run);
    step!(expand_comments, expand_comments::run);
    step!(infinite_scroll, infinite_scroll::run);

    report.elapsed_ms = start.elapsed().as_millis() as u64;
    report
}

async fn bounded<Fut>(timeout: Duration, fut: Fut) -> BehaviorOutcome
where
    Fut: std::future::Future<Output = u32>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(effects) => BehaviorOutcome {
            effects,
            timed_out: false,
        },
        Err(_) => BehaviorOutcome {
            effects: 0,
            timed_out: true,
        },
    }
}

/// Evaluate `script` on `page`, returning the JS number it produces as an
/// effect count. Any evaluation error (detached page, JS exception) is
/// swallowed to zero, matching the "behaviors never raise" contract.
pub(crate) async fn run_js_count(page: &Page, script: &str) -> u32 {
    match page.evaluate(script).await {
        Ok(result) => result.into_value::<u32>().unwrap_or(0),
        Err(err) => {
            warn!(error = %err, "behavior script evaluation failed");
            0
        }
    }
}
