//! Scroll-and-wait cycles for pages that load additional content as the
//! user approaches the bottom, capped by a page count rather than a height
//! check (unlike [`super::scroll_to_load`], growth here may never stabilize).

use chromiumoxide::Page;

use super::run_js_count;

const SCRIPT: &str = r#"(async () => {
    const pageCap = 15;
    let pages = 0;

    for (let i = 0; i < pageCap; i += 1) {
        const before = document.documentElement.scrollHeight;
        window.scrollTo(0, document.documentElement.scrollHeight);
        await new Promise((r) => setTimeout(r, 250));
        const after = document.documentElement.scrollHeight;
        pages += 1;
        if (after <= before) break;
    }

    return pages;
})()"#;

pub async fn run(page: &Page) -> u32 {
    run_js_count(page, SCRIPT).await
}
