//! Dismiss cookie-consent banners, modal overlays, and any element that
//! looks like a close control, then synthesize an Escape keydown as a
//! fallback for overlays (native `<dialog>` elements, some cookie banners)
//! that don't expose a clickable close control.

use chromiumoxide::Page;

use super::run_js_count;

const SCRIPT: &str = r#"(() => {
    const selectors = [
        '[aria-label="Close" i]', '[aria-label="Dismiss" i]',
        'button[class*="close" i]', 'button[class*="dismiss" i]',
        '[id*="cookie" i] button', '[class*="cookie" i] button',
        '[class*="consent" i] button', '[class*="modal" i] [class*="close" i]',
        '[class*="overlay" i] [class*="close" i]',
    ];
    let clicked = 0;
    for (const selector of selectors) {
        for (const el of document.querySelectorAll(selector)) {
            const rect = el.getBoundingClientRect();
            if (rect.width > 0 && rect.height > 0) {
                el.click();
                clicked += 1;
            }
        }
    }
    document.dispatchEvent(new KeyboardEvent('keydown', { key: 'Escape', bubbles: true }));
    return clicked;
})()"#;

pub async fn run(page: &Page) -> u32 {
    run_js_count(page, SCRIPT).await
}
