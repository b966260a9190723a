//! Render-and-parse entry point.

use std::future::Future;

use tracing::debug;

use crate::browser::{
    probe, RenderOptions, RenderOutput, Renderer, DEFAULT_PROBE_TIMEOUT, DEFAULT_RENDERER,
};
use crate::dom::{self, Document};
use crate::page::Page;
use crate::{PhandomError, Result};

/// A page plus the renderer that turns it into a [`Document`].
///
/// ```no_run
/// use phandom_lib::{Page, Phandom};
///
/// let dom = Phandom::new(Page::text("<html><body><p>hi</p></body></html>"))
///     .dom_blocking()?;
/// assert_eq!(dom.count("/html/body/p"), 1);
/// # Ok::<(), phandom_lib::PhandomError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Phandom {
    page: Page,
    renderer: Renderer,
}

impl Phandom {
    pub fn new(page: Page) -> Self {
        Self::with_options(page, RenderOptions::default())
    }

    pub fn with_options(page: Page, options: RenderOptions) -> Self {
        Self {
            page,
            renderer: Renderer::new(options),
        }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn options(&self) -> &RenderOptions {
        self.renderer.options()
    }

    /// Runs the renderer without interpreting its output.
    pub async fn render(&self) -> Result<RenderOutput> {
        self.renderer.render(&self.page).await
    }

    /// Renders the page and parses the resulting DOM.
    pub async fn dom(&self) -> Result<Document> {
        let output = self.render().await?;
        document(&output)
    }

    /// Blocking variant of [`Phandom::dom`].
    ///
    /// Drives its own single-threaded runtime; called from inside an async
    /// context it fails with [`PhandomError::BlockingInRuntime`].
    pub fn dom_blocking(&self) -> Result<Document> {
        block_on(self.dom())?
    }

    /// Whether the default renderer answers `--version`.
    pub async fn is_installed() -> bool {
        probe::is_available(DEFAULT_RENDERER, DEFAULT_PROBE_TIMEOUT).await
    }

    /// Blocking variant of [`Phandom::is_installed`]; never fails, and
    /// reports `false` when called from inside an async context.
    pub fn is_installed_blocking() -> bool {
        block_on(Self::is_installed()).unwrap_or(false)
    }
}

impl From<Page> for Phandom {
    fn from(page: Page) -> Self {
        Phandom::new(page)
    }
}

/// Turns renderer output into a document.
///
/// A non-zero exit is a failure even when stdout holds well-formed XML;
/// the bundled driver exits non-zero when page scripts throw.
pub fn document(output: &RenderOutput) -> Result<Document> {
    if !output.success() {
        debug!(code = ?output.code, "renderer reported failure");
        return Err(PhandomError::RendererFailed {
            code: output.code,
            stderr: output.stderr.trim().to_string(),
        });
    }
    dom::parse(&output.stdout)
}

fn block_on<F: Future>(future: F) -> Result<F::Output> {
    if tokio::runtime::Handle::try_current().is_ok() {
        return Err(PhandomError::BlockingInRuntime);
    }
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    Ok(runtime.block_on(future))
}
