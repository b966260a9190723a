//! Headless rendering through an external browser process.
//!
//! # Module Structure
//!
//! - [`process`] - Renderer invocation with timeout and concurrent output draining
//! - [`driver`] - The script the renderer executes
//! - [`probe`] - `--version` availability checks
//!
//! # Example
//!
//! ```no_run
//! use phandom_lib::{Page, Renderer, RenderOptions};
//!
//! # async fn example() -> phandom_lib::Result<()> {
//! let renderer = Renderer::new(RenderOptions::default());
//! let output = renderer.render(&Page::text("<p>hi</p>")).await?;
//! println!("exit {:?}, {} bytes of DOM", output.code, output.stdout.len());
//! # Ok(())
//! # }
//! ```

mod driver;
pub mod probe;
mod process;

pub use driver::DriverScript;
pub use process::{
    RenderOptions, RenderOutput, Renderer, DEFAULT_PROBE_TIMEOUT, DEFAULT_PROCESS_TIMEOUT,
    DEFAULT_RENDERER,
};
