//! Within each recognized tab container (ARIA `tablist` or a common tab
//! widget class), click every tab not currently selected, in document order.

use chromiumoxide::Page;

use super::run_js_count;

const SCRIPT: &str = r#"(() => {
    let effects = 0;
    const containers = document.querySelectorAll('[role="tablist"], [class*="tabs" i]');

    for (const container of containers) {
        const tabs = container.querySelectorAll('[role="tab"], [class*="tab" i]:not([class*="tabs" i])');
        for (const tab of tabs) {
            const selected = tab.getAttribute('aria-selected') === 'true'
                || tab.classList.contains('active')
                || tab.classList.contains('selected');
            if (selected) continue;
            const rect = tab.getBoundingClientRect();
            if (rect.width > 0 && rect.height > 0) {
                tab.click();
                effects += 1;
            }
        }
    }

    return effects;
})()"#;

pub async fn run(page: &Page) -> u32 {
    run_js_count(page, SCRIPT).await
}
