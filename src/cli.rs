use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "phandom")]
#[command(
    version,
    about = "Render HTML through a headless browser and print the resulting DOM",
    long_about = "Phandom\n\nModes:\n- render: load markup, a file or a URL in the headless renderer and print the DOM it ends up with.\n- check: report whether the renderer binary is installed.\n\nUse --help on any subcommand for details."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, help = "Enable verbose output (debug logs on stderr)")]
    pub verbose: bool,

    #[arg(
        long,
        global = true,
        value_name = "PATH",
        help = "Optional config file (TOML) with renderer command/args/driver and timeouts; CLI flags override config"
    )]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render a page and print its DOM
    Render {
        #[arg(help = "Markup, a local file, a URL, or '-' to read markup from stdin")]
        input: String,

        #[arg(long, value_enum, default_value = "auto", help = "Override input type detection")]
        input_type: InputType,

        #[arg(long, value_enum, default_value = "xml", help = "Output format")]
        format: OutputFormat,

        #[arg(long, value_name = "SECS", help = "Renderer process timeout in seconds")]
        timeout: Option<u64>,

        #[arg(long, value_name = "CMD", help = "Renderer command (default: phantomjs)")]
        renderer: Option<String>,

        #[arg(
            long,
            value_name = "PATH",
            help = "Only print elements matching a path (/html/body/p, //div, //body/*)"
        )]
        select: Option<String>,

        #[arg(long, short, help = "Output file path (stdout if omitted)")]
        output: Option<PathBuf>,
    },
    /// Check whether the renderer is installed
    Check {
        #[arg(long, value_name = "CMD", help = "Renderer command (default: phantomjs)")]
        renderer: Option<String>,

        #[arg(long, value_enum, default_value = "pretty", help = "Output format")]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Default)]
pub enum InputType {
    #[default]
    Auto,
    Text,
    File,
    Url,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Xml,
    Json,
    Pretty,
}

pub fn parse() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::{Cli, Commands, InputType, OutputFormat};
    use clap::Parser;

    #[test]
    fn render_command_uses_defaults() {
        let cli = Cli::parse_from(["phandom", "render", "<p>hi</p>"]);

        assert!(!cli.verbose);
        assert!(cli.config.is_none());
        match cli.command {
            Commands::Render {
                input,
                input_type,
                format,
                timeout,
                renderer,
                select,
                output,
            } => {
                assert_eq!(input, "<p>hi</p>");
                assert_eq!(input_type, InputType::Auto);
                assert_eq!(format, OutputFormat::Xml);
                assert!(timeout.is_none());
                assert!(renderer.is_none());
                assert!(select.is_none());
                assert!(output.is_none());
            }
            _ => panic!("expected render command"),
        }
    }

    #[test]
    fn render_command_accepts_overrides() {
        let cli = Cli::parse_from([
            "phandom",
            "--verbose",
            "render",
            "page.html",
            "--input-type",
            "file",
            "--format",
            "json",
            "--timeout",
            "5",
            "--renderer",
            "/opt/phantomjs",
            "--select",
            "//div",
            "-o",
            "dom.json",
            "--config",
            "phandom.toml",
        ]);

        assert!(cli.verbose);
        assert_eq!(
            cli.config.as_deref().map(|p| p.to_string_lossy().to_string()),
            Some("phandom.toml".to_string())
        );
        match cli.command {
            Commands::Render {
                input_type,
                format,
                timeout,
                renderer,
                select,
                output,
                ..
            } => {
                assert_eq!(input_type, InputType::File);
                assert_eq!(format, OutputFormat::Json);
                assert_eq!(timeout, Some(5));
                assert_eq!(renderer.as_deref(), Some("/opt/phantomjs"));
                assert_eq!(select.as_deref(), Some("//div"));
                assert!(output.is_some());
            }
            _ => panic!("expected render command"),
        }
    }

    #[test]
    fn check_command_defaults_to_pretty() {
        let cli = Cli::parse_from(["phandom", "check"]);
        match cli.command {
            Commands::Check { renderer, format } => {
                assert!(renderer.is_none());
                assert_eq!(format, OutputFormat::Pretty);
            }
            _ => panic!("expected check command"),
        }
    }
}
