//! For each recognized carousel/slider widget, click its "next" control up
//! to a per-carousel cap, so slides beyond the first become part of the DOM
//! snapshot the pipeline captures.

use chromiumoxide::Page;

use super::run_js_count;

const SCRIPT: &str = r#"(() => {
    const perCarouselCap = 8;
    let effects = 0;
    const carousels = document.querySelectorAll(
        '[class*="carousel" i], [class*="slider" i], [role="region"][aria-roledescription="carousel"]'
    );

    for (const carousel of carousels) {
        const next = carousel.querySelector(
            '[aria-label="Next" i], [class*="next" i], button[class*="arrow-right" i]'
        );
        if (!next) continue;
        for (let i = 0; i < perCarouselCap; i += 1) {
            const rect = next.getBoundingClientRect();
            if (rect.width === 0 || rect.height === 0) break;
            if (next.disabled || next.getAttribute('aria-disabled') === 'true') break;
            next.click();
            effects += 1;
        }
    }

    return effects;
})()"#;

pub async fn run(page: &Page) -> u32 {
    run_js_count(page, SCRIPT).await
}
