use std::fmt::Write as FmtWrite;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use phandom_lib::output::PHANDOM_OUTPUT_VERSION;
use phandom_lib::{Element, ErrorOutput, PhandomError, PhandomOutput};

use crate::cli::OutputFormat;

/// Write output in the requested format.
pub fn write_output(
    body: &PhandomOutput,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let content = match format {
        OutputFormat::Json => serde_json::to_string(body)?,
        OutputFormat::Xml => format_xml(body),
        OutputFormat::Pretty => {
            let colorize = output.is_none() && io::stdout().is_terminal();
            format_pretty(body, colorize)
        }
    };
    write_content(&content, output.as_deref())?;
    Ok(())
}

/// Render an error and return the appropriate exit code.
pub fn render_error(err: PhandomError, format: OutputFormat, output: Option<PathBuf>) -> ExitCode {
    let payload = PhandomOutput::Error(ErrorOutput {
        version: PHANDOM_OUTPUT_VERSION.to_string(),
        error: err.to_payload(),
    });

    match format {
        OutputFormat::Json => {
            let content =
                serde_json::to_string(&payload).unwrap_or_else(|_| "{\"mode\":\"error\"}".into());
            if let Some(path) = output {
                if let Err(write_err) = std::fs::write(&path, &content) {
                    eprintln!("Failed to write error output: {}", write_err);
                    println!("{content}");
                }
            } else {
                println!("{content}");
            }
        }
        // Errors never go into an XML/pretty output file; stdout may be piped into a parser.
        OutputFormat::Xml | OutputFormat::Pretty => {
            eprint!("{}", format_pretty(&payload, io::stderr().is_terminal()));
        }
    };

    // Reserve exit code 2 for fatal errors; "not available" from check uses 1.
    ExitCode::from(2)
}

fn write_content(content: &str, output: Option<&Path>) -> io::Result<()> {
    if let Some(path) = output {
        std::fs::write(path, content)
    } else {
        println!("{content}");
        Ok(())
    }
}

/// Serialized markup: the whole document, or one selected element per line.
pub fn format_xml(body: &PhandomOutput) -> String {
    match body {
        PhandomOutput::Render(out) => {
            if let Some(selection) = &out.selection {
                selection
                    .elements
                    .iter()
                    .map(Element::to_xml)
                    .collect::<Vec<_>>()
                    .join("\n")
            } else {
                out.document
                    .as_ref()
                    .map(|doc| doc.to_xml())
                    .unwrap_or_default()
            }
        }
        other => format_pretty(other, false),
    }
}

/// Format output for human consumption in a terminal.
pub fn format_pretty(body: &PhandomOutput, colorize: bool) -> String {
    match body {
        PhandomOutput::Render(out) => {
            let mut buf = String::new();
            let header = color("[RENDER]", "36", colorize);
            writeln!(
                buf,
                "{} {} via {} in {}ms",
                header, out.page, out.renderer, out.elapsed_ms
            )
            .ok();
            if let Some(selection) = &out.selection {
                writeln!(buf, "Matches for {}: {}", selection.path, selection.count).ok();
                for element in &selection.elements {
                    outline(&mut buf, element, 1);
                }
            } else if let Some(doc) = &out.document {
                outline(&mut buf, doc.root(), 0);
            }
            buf
        }
        PhandomOutput::Check(out) => {
            let mut buf = String::new();
            let (label, code) = if out.available {
                ("[OK]", "32")
            } else {
                ("[MISSING]", "31")
            };
            let header = color(label, code, colorize);
            match &out.renderer_version {
                Some(version) => writeln!(buf, "{} {} {}", header, out.renderer, version).ok(),
                None => writeln!(buf, "{} {} is not available", header, out.renderer).ok(),
            };
            buf
        }
        PhandomOutput::Error(out) => {
            let mut buf = String::new();
            let header = color("[ERROR]", "31", colorize);
            writeln!(buf, "{} {}", header, out.error.message).ok();
            if let Some(remediation) = &out.error.remediation {
                writeln!(buf, "Hint: {}", remediation).ok();
            }
            buf
        }
    }
}

/// Indented tag outline, with a short text preview for leaf elements.
fn outline(buf: &mut String, element: &Element, depth: usize) {
    let indent = "  ".repeat(depth);
    let mut line = format!("{indent}<{}", element.name());
    for (name, value) in element.attributes() {
        write!(line, " {name}=\"{value}\"").ok();
    }
    line.push('>');
    if element.elements().next().is_none() {
        let text = element.text();
        let text = text.trim();
        if !text.is_empty() {
            let preview: String = text.chars().take(60).collect();
            write!(line, " {preview}").ok();
            if text.chars().count() > 60 {
                line.push('\u{2026}');
            }
        }
    }
    writeln!(buf, "{line}").ok();
    for child in element.elements() {
        outline(buf, child, depth + 1);
    }
}

/// Apply ANSI color codes when enabled.
fn color(text: &str, code: &str, colorize: bool) -> String {
    if colorize {
        format!("\x1b[{}m{}\x1b[0m", code, text)
    } else {
        text.to_string()
    }
}
