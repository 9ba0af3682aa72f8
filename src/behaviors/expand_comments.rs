//! Site-agnostic pass that clicks "load more comments"-style controls,
//! repeating until no further control is found or a step cap is reached.

use chromiumoxide::Page;

use super::run_js_count;

const SCRIPT: &str = r#"(async () => {
    const stepCap = 20;
    const phrases = ['load more comments', 'show more comments', 'view more comments', 'more replies'];
    let effects = 0;

    for (let i = 0; i < stepCap; i += 1) {
        const candidates = document.querySelectorAll('button, a, span');
        let clicked = false;
        for (const el of candidates) {
            const text = (el.innerText || '').trim().toLowerCase();
            if (text.length === 0 || text.length > 40) continue;
            if (phrases.some((p) => text.includes(p))) {
                const rect = el.getBoundingClientRect();
                if (rect.width > 0 && rect.height > 0) {
                    el.click();
                    effects += 1;
                    clicked = true;
                    break;
                }
            }
        }
        if (!clicked) break;
        await new Promise((r) => setTimeout(r, 200));
    }

    return effects;
})()"#;

pub async fn run(page: &Page) -> u32 {
    run_js_count(page, SCRIPT).await
}
