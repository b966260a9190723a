use std::path::PathBuf;
use std::process::ExitCode;

use phandom_lib::browser::probe;
use phandom_lib::output::{CheckOutput, PHANDOM_OUTPUT_VERSION};
use phandom_lib::{PhandomError, PhandomOutput};

use crate::cli::OutputFormat;
use crate::formatting::{render_error, write_output};
use crate::settings::{load_config, resolve_render_options};

/// Run the check command. Exits 1 when the renderer is not available.
pub async fn run_check(
    config_path: Option<PathBuf>,
    renderer: Option<String>,
    format: OutputFormat,
) -> ExitCode {
    let config = match load_config(config_path.as_deref()) {
        Ok(cfg) => cfg,
        Err(err) => return render_error(err, format, None),
    };
    let options = match resolve_render_options(&config, renderer, None) {
        Ok(opts) => opts,
        Err(err) => return render_error(err, format, None),
    };

    let version = probe::version(&options.command, options.probe_timeout).await;
    let available = version.is_some();
    let body = PhandomOutput::Check(CheckOutput {
        version: PHANDOM_OUTPUT_VERSION.to_string(),
        renderer: options.command,
        available,
        renderer_version: version,
    });

    if let Err(err) = write_output(&body, format, None) {
        return render_error(PhandomError::config(err.to_string()), format, None);
    }
    if available {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}
