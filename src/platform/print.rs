//! Document rendering
//!
//! The printable report is produced by the browser's print dialog. The
//! session only decides when; the renderer does the work.

/// Produces the printable report
pub trait DocumentRenderer {
    /// Switch the page to its print layout
    fn prepare(&mut self);
    /// Open the print dialog and restore the normal layout
    fn print(&mut self);
}

/// Browser print via `window.print()` (WASM only)
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default)]
pub struct BrowserPrint;

#[cfg(target_arch = "wasm32")]
impl BrowserPrint {
    const PRINTING_CLASS: &'static str = "printing";

    fn body() -> Option<web_sys::HtmlElement> {
        web_sys::window()?.document()?.body()
    }
}

#[cfg(target_arch = "wasm32")]
impl DocumentRenderer for BrowserPrint {
    fn prepare(&mut self) {
        if let Some(body) = Self::body() {
            let _ = body.class_list().add_1(Self::PRINTING_CLASS);
        }
    }

    fn print(&mut self) {
        if let Some(window) = web_sys::window() {
            if let Err(e) = window.print() {
                log::warn!("Print failed: {:?}", e);
            }
        }
        if let Some(body) = Self::body() {
            let _ = body.class_list().remove_1(Self::PRINTING_CLASS);
        }
    }
}

/// Renderer for native runs: logs instead of printing
#[derive(Debug, Default)]
pub struct NoopRenderer;

impl DocumentRenderer for NoopRenderer {
    fn prepare(&mut self) {
        log::debug!("Print layout requested (no renderer on this platform)");
    }

    fn print(&mut self) {
        log::info!("Print requested (no renderer on this platform)");
    }
}
