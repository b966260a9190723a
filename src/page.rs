//! Pages that can be handed to the renderer.

use std::fmt;
use std::io::Read;
use std::path::Path;

use tracing::debug;
use url::Url;

use crate::temp::TempResource;
use crate::{PhandomError, Result};

/// What to render: inline markup or an addressable resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Page {
    /// Markup held in memory, written to a `.html` temp file on resolution.
    Text(String),
    /// A local file or remote URL passed to the renderer unchanged.
    Web(Url),
}

impl Page {
    pub fn text(content: impl Into<String>) -> Self {
        Page::Text(content.into())
    }

    /// Reads UTF-8 markup from a stream.
    pub fn from_reader(mut reader: impl Read) -> Result<Self> {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;
        Ok(Page::Text(content))
    }

    pub fn web(url: Url) -> Self {
        Page::Web(url)
    }

    pub fn parse_uri(uri: &str) -> Result<Self> {
        Ok(Page::Web(Url::parse(uri)?))
    }

    /// References a file on disk by its absolute `file://` URL.
    pub fn file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let absolute = path.canonicalize().map_err(|e| {
            PhandomError::InvalidPath(format!("{}: {}", path.display(), e))
        })?;
        let url = Url::from_file_path(&absolute)
            .map_err(|_| PhandomError::InvalidPath(absolute.display().to_string()))?;
        Ok(Page::Web(url))
    }

    /// Produces the URI the renderer should load.
    ///
    /// Text pages get a new temp file on every call; the file lives as long
    /// as the returned [`ResolvedPage`].
    pub fn resolve(&self) -> Result<ResolvedPage> {
        match self {
            Page::Text(html) => {
                let temp = TempResource::create(html.as_bytes(), ".html")?;
                let uri = temp.url()?;
                debug!(path = %temp.path().display(), bytes = html.len(), "materialized text page");
                Ok(ResolvedPage {
                    uri,
                    _temp: Some(temp),
                })
            }
            Page::Web(url) => Ok(ResolvedPage {
                uri: url.clone(),
                _temp: None,
            }),
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Page::Text(html) => write!(f, "text page ({} bytes)", html.len()),
            Page::Web(url) => write!(f, "{url}"),
        }
    }
}

/// A page turned into a loadable URI, keeping any backing temp file alive.
#[derive(Debug)]
pub struct ResolvedPage {
    uri: Url,
    _temp: Option<TempResource>,
}

impl ResolvedPage {
    pub fn uri(&self) -> &Url {
        &self.uri
    }
}
