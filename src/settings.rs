use std::fs;
use std::io::{self, IsTerminal};
use std::path::Path;
use std::time::Duration;

use phandom_lib::{Config, Page, PhandomError, RenderOptions};
use tracing::debug;

use crate::cli::InputType;

/// Load config from a TOML file or return defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config, PhandomError> {
    let config = Config::load(path)?;
    debug!(
        source = %path.map(|p| p.display().to_string()).unwrap_or_else(|| "defaults".to_string()),
        renderer = %config.renderer.command,
        process_timeout = ?config.timeouts.process,
        "effective config"
    );
    Ok(config)
}

/// Merge CLI flags into the config-derived render options, preferring CLI values.
pub fn resolve_render_options(
    config: &Config,
    cli_renderer: Option<String>,
    cli_timeout: Option<u64>,
) -> Result<RenderOptions, PhandomError> {
    let mut options = config.render_options()?;
    if let Some(renderer) = cli_renderer {
        options.command = renderer;
    }
    if let Some(secs) = cli_timeout {
        if secs == 0 {
            return Err(PhandomError::config("--timeout must be greater than zero"));
        }
        options.process_timeout = Duration::from_secs(secs);
    }
    Ok(options)
}

/// Turn the positional input into a page.
pub fn resolve_page(input: &str, input_type: InputType) -> Result<Page, PhandomError> {
    match input_type {
        InputType::Text if input == "-" => read_stdin_page(),
        InputType::Text => Ok(Page::text(input)),
        InputType::File => Page::file(input),
        InputType::Url => Page::parse_uri(input),
        InputType::Auto => detect_page(input),
    }
}

fn detect_page(input: &str) -> Result<Page, PhandomError> {
    if input == "-" {
        return read_stdin_page();
    }
    let lower = input.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("file://")
    {
        return Page::parse_uri(input);
    }
    if !input.trim_start().starts_with('<') && looks_like_file(input) {
        return Page::file(input);
    }
    Ok(Page::text(input))
}

fn looks_like_file(input: &str) -> bool {
    fs::metadata(input).map(|m| m.is_file()).unwrap_or(false)
}

fn read_stdin_page() -> Result<Page, PhandomError> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Err(PhandomError::config(
            "'-' reads markup from stdin, but stdin is a terminal",
        ));
    }
    Page::from_reader(stdin.lock())
}

#[cfg(test)]
mod tests {
    use super::*;
    use phandom_lib::config::{RendererConfig, Timeouts};
    use tempfile::TempDir;

    #[test]
    fn resolve_render_options_prefers_config_when_flags_absent() {
        let cfg = Config {
            renderer: RendererConfig {
                command: "/opt/phantomjs".to_string(),
                args: vec!["--load-images=false".to_string()],
                driver: None,
            },
            timeouts: Timeouts {
                process: Duration::from_secs(7),
                probe: Duration::from_secs(2),
            },
        };

        let opts = resolve_render_options(&cfg, None, None).unwrap();
        assert_eq!(opts.command, "/opt/phantomjs");
        assert_eq!(opts.extra_args, vec!["--load-images=false"]);
        assert_eq!(opts.process_timeout, Duration::from_secs(7));
        assert_eq!(opts.probe_timeout, Duration::from_secs(2));
    }

    #[test]
    fn resolve_render_options_prefers_cli_when_flags_present() {
        let cfg = Config::default();
        let opts = resolve_render_options(&cfg, Some("sh".to_string()), Some(3)).unwrap();
        assert_eq!(opts.command, "sh");
        assert_eq!(opts.process_timeout, Duration::from_secs(3));
    }

    #[test]
    fn resolve_render_options_rejects_zero_timeout() {
        let err = resolve_render_options(&Config::default(), None, Some(0)).unwrap_err();
        assert!(err.to_string().contains("--timeout"));
    }

    #[test]
    fn auto_detects_urls() {
        let page = resolve_page("https://example.com/", InputType::Auto).unwrap();
        assert_eq!(page, Page::parse_uri("https://example.com/").unwrap());
    }

    #[test]
    fn auto_detects_existing_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.html");
        fs::write(&path, "<html><p>hi!</p></html>").unwrap();
        let page = resolve_page(path.to_str().unwrap(), InputType::Auto).unwrap();
        assert!(matches!(page, Page::Web(url) if url.scheme() == "file"));
    }

    #[test]
    fn auto_falls_back_to_markup() {
        let page = resolve_page("<html>\nbroken", InputType::Auto).unwrap();
        assert_eq!(page, Page::text("<html>\nbroken"));
        let page = resolve_page("plain words", InputType::Auto).unwrap();
        assert_eq!(page, Page::text("plain words"));
    }

    #[test]
    fn explicit_types_skip_detection() {
        let page = resolve_page("https://example.com/", InputType::Text).unwrap();
        assert_eq!(page, Page::text("https://example.com/"));
        assert!(resolve_page("/definitely/missing.html", InputType::File).is_err());
        assert!(resolve_page("not a url", InputType::Url).is_err());
    }
}
