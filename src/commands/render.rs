use std::path::PathBuf;
use std::process::ExitCode;

use phandom_lib::output::{RenderReport, Selection, PHANDOM_OUTPUT_VERSION};
use phandom_lib::{document, Phandom, PhandomError, PhandomOutput};
use tracing::info;

use crate::cli::{InputType, OutputFormat};
use crate::formatting::{render_error, write_output};
use crate::settings::{load_config, resolve_page, resolve_render_options};

/// Run the render command.
#[allow(clippy::too_many_arguments)]
pub async fn run_render(
    config_path: Option<PathBuf>,
    input: String,
    input_type: InputType,
    format: OutputFormat,
    timeout: Option<u64>,
    renderer: Option<String>,
    select: Option<String>,
    output: Option<PathBuf>,
) -> ExitCode {
    let config = match load_config(config_path.as_deref()) {
        Ok(cfg) => cfg,
        Err(err) => return render_error(err, format, output),
    };
    let options = match resolve_render_options(&config, renderer, timeout) {
        Ok(opts) => opts,
        Err(err) => return render_error(err, format, output),
    };
    let page = match resolve_page(&input, input_type) {
        Ok(page) => page,
        Err(err) => return render_error(err, format, output),
    };

    info!(page = %page, renderer = %options.command, "rendering");
    let phandom = Phandom::with_options(page, options);
    let rendered = match phandom.render().await {
        Ok(rendered) => rendered,
        Err(err) => return render_error(err, format, output),
    };
    let doc = match document(&rendered) {
        Ok(doc) => doc,
        Err(err) => return render_error(err, format, output),
    };

    let selection = select.map(|path| Selection::from_document(&doc, &path));
    let body = PhandomOutput::Render(RenderReport {
        version: PHANDOM_OUTPUT_VERSION.to_string(),
        page: phandom.page().to_string(),
        renderer: phandom.options().command.clone(),
        elapsed_ms: rendered.elapsed.as_millis() as u64,
        document: if selection.is_none() { Some(doc) } else { None },
        selection,
    });

    if let Err(err) = write_output(&body, format, output.clone()) {
        return render_error(PhandomError::config(err.to_string()), format, output);
    }
    ExitCode::SUCCESS
}
