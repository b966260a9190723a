mod cli;
mod commands;
mod formatting;
mod logging;
mod settings;

use std::process::ExitCode;

use cli::Commands;
use commands::{run_check, run_render};

#[tokio::main]
async fn main() -> ExitCode {
    run().await
}

async fn run() -> ExitCode {
    let args = cli::parse();
    logging::initialize_logging(args.verbose);

    match args.command {
        Commands::Render {
            input,
            input_type,
            format,
            timeout,
            renderer,
            select,
            output,
        } => {
            run_render(
                args.config,
                input,
                input_type,
                format,
                timeout,
                renderer,
                select,
                output,
            )
            .await
        }
        Commands::Check { renderer, format } => run_check(args.config, renderer, format).await,
    }
}
