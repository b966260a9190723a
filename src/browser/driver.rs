//! Driver script executed by the renderer.

use std::io;

use crate::temp::TempResource;

/// Bundled PhantomJS script: loads a URI and prints the DOM as XML on stdout.
pub(crate) const BUNDLED_DRIVER: &str = include_str!("../../resources/dom.js");

/// Script passed to the renderer ahead of the page URI.
///
/// The script receives the URI as its only argument and must write the
/// rendered document to stdout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DriverScript {
    #[default]
    Bundled,
    Custom(String),
}

impl DriverScript {
    pub fn source(&self) -> &str {
        match self {
            DriverScript::Bundled => BUNDLED_DRIVER,
            DriverScript::Custom(source) => source,
        }
    }

    pub(crate) fn materialize(&self) -> io::Result<TempResource> {
        TempResource::create(self.source().as_bytes(), ".js")
    }
}
