//! Inline stealth-mode JavaScript injected into a page right after
//! navigation begins, when a [`Configuration`](crate::store::Configuration)
//! has `stealth` enabled.
//!
//! Folded into one script run once per page rather than the file-per-evasion
//! layout of a larger stealth toolkit, since this system needs a fixed,
//! small set of evasions rather than a pluggable library of them.

use chromiumoxide::Page;

use crate::utils::CHROME_USER_AGENT;

const SCRIPT_TEMPLATE: &str = r#"(() => {
    Object.defineProperty(navigator, 'webdriver', { get: () => false });
    Object.defineProperty(navigator, 'userAgent', { value: '__USER_AGENT__' });
    Object.defineProperty(navigator, 'languages', { get: () => ['en-US', 'en'] });

    if (!window.chrome) window.chrome = {};
    if (!window.chrome.runtime) {
        window.chrome.runtime = {
            connect: () => ({
                onMessage: { addListener: () => {}, removeListener: () => {} },
                postMessage: () => {},
            }),
        };
    }

    if (window.WebGLRenderingContext) {
        const getParameter = WebGLRenderingContext.prototype.getParameter;
        WebGLRenderingContext.prototype.getParameter = new Proxy(getParameter, {
            apply(target, ctx, args) {
                if (args[0] === 37445) return 'Intel Inc.';
                if (args[0] === 37446) return 'Intel Iris OpenGL Engine';
                return Reflect.apply(target, ctx, args);
            },
        });
    }
})()"#;

/// Apply the stealth evasions to `page`. Best-effort: a failure here should
/// not fail the capture, since a page that cannot be scripted was already
/// going to fail navigation or validation for the same underlying reason.
pub async fn apply(page: &Page, user_agent: &str) -> anyhow::Result<()> {
    let script = SCRIPT_TEMPLATE.replace(
        "__USER_AGENT__",
        user_agent.replace('\'', "\\'").as_str(),
    );
    page.evaluate(script.as_str()).await?;
    Ok(())
}

/// The user agent string used when a configuration does not specify one.
#[must_use]
pub fn default_user_agent() -> &'static str {
    CHROME_USER_AGENT
}
