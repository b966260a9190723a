//! Phandom Library
//!
//! Renders HTML/XML through an external headless browser (PhantomJS by
//! default) and returns the resulting DOM as an owned, queryable tree.
//! Intended mostly for test assertions about what a browser makes of markup
//! after error recovery and script execution.
//!
//! # Module Overview
//!
//! - [`page`] - What to render: inline markup or a URI
//! - [`browser`] - Renderer process invocation and availability probe
//! - [`dom`] - Parsing renderer output into a [`Document`]
//! - [`config`] - Configuration file support
//! - [`output`] - JSON output schemas for the CLI
//!
//! # Example
//!
//! ```no_run
//! use phandom_lib::{Page, Phandom};
//!
//! # async fn example() -> phandom_lib::Result<()> {
//! if !Phandom::is_installed().await {
//!     return Ok(());
//! }
//! let dom = Phandom::new(Page::text("<html>\nbroken")).dom().await?;
//! assert_eq!(dom.count("/html/head"), 1);
//! assert_eq!(dom.count("/html/body"), 1);
//! # Ok(())
//! # }
//! ```

pub mod browser;
pub mod config;
pub mod dom;
pub mod error;
pub mod output;
pub mod page;
mod phandom;
pub mod temp;

pub use browser::{
    DriverScript, RenderOptions, RenderOutput, Renderer, DEFAULT_PROBE_TIMEOUT,
    DEFAULT_PROCESS_TIMEOUT, DEFAULT_RENDERER,
};
pub use config::Config;
pub use dom::{Document, Element, Node};
pub use error::{ErrorCategory, ErrorPayload, PhandomError, Result};
pub use output::{CheckOutput, ErrorOutput, PhandomOutput, RenderReport, Selection};
pub use page::{Page, ResolvedPage};
pub use phandom::{document, Phandom};
