//! Open collapsed disclosure elements (`<details>`) and click elements whose
//! visible text matches a small set of "read more"-style phrases.

use chromiumoxide::Page;

use super::run_js_count;

const SCRIPT: &str = r#"(() => {
    const phrases = ['read more', 'show more', 'see more', 'view more', 'expand'];
    let effects = 0;

    for (const details of document.querySelectorAll('details:not([open])')) {
        details.open = true;
        effects += 1;
    }

    const candidates = document.querySelectorAll('button, a, span, div');
    for (const el of candidates) {
        const text = (el.innerText || '').trim().toLowerCase();
        if (text.length === 0 || text.length > 30) continue;
        if (phrases.some((p) => text === p || text.includes(p))) {
            const rect = el.getBoundingClientRect();
            if (rect.width > 0 && rect.height > 0) {
                el.click();
                effects += 1;
            }
        }
    }

    return effects;
})()"#;

pub async fn run(page: &Page) -> u32 {
    run_js_count(page, SCRIPT).await
}
