//! Scroll in viewport-height increments until `document.scrollHeight`
//! stabilizes across consecutive passes, then restore the original scroll
//! position so later behaviors and artifact capture see the page at rest.

use chromiumoxide::Page;

use super::run_js_count;

const STABLE_PASSES: u32 = 2;
const STEP_CAP: u32 = 40;

const SCRIPT: &str = r#"(async () => {
    const stablePasses = 2;
    const stepCap = 40;
    const startY = window.scrollY;
    let lastHeight = document.documentElement.scrollHeight;
    let stable = 0;
    let steps = 0;

    while (stable < stablePasses && steps < stepCap) {
        window.scrollBy(0, window.innerHeight);
        await new Promise((r) => setTimeout(r, 150));
        const height = document.documentElement.scrollHeight;
        if (height === lastHeight) {
            stable += 1;
        } else {
            stable = 0;
            lastHeight = height;
        }
        steps += 1;
    }

    window.scrollTo(0, startY);
    return steps;
})()"#;

pub async fn run(page: &Page) -> u32 {
    let steps = run_js_count(page, SCRIPT).await;
    steps.min(STEP_CAP + STABLE_PASSES)
}
