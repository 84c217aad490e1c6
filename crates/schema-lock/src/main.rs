//! schema-lock CLI
//!
//! Binary name: `schema-lock`

use std::process;

use schema_lock::cli::{
    build_cli,
    handlers::{dispatch, format_error},
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let matches = match build_cli().try_get_matches() {
        Ok(matches) => matches,
        Err(err) => {
            // help and version go to stdout and are not failures
            let code = i32::from(err.use_stderr());
            if let Err(print_err) = err.print() {
                tracing::error!(error = %print_err, "failed to print usage");
            }
            #[allow(clippy::exit)]
            process::exit(code);
        }
    };

    let code = match dispatch(&matches).await {
        Ok(code) => code,
        Err(err) => {
            #[allow(clippy::print_stderr)]
            {
                eprintln!("Error: {}", format_error(&err));
            }
            err.downcast_ref::<schema_lock_core::Error>()
                .map_or(1, schema_lock_core::Error::exit_code)
        }
    };

    #[allow(clippy::exit)]
    process::exit(code);
}
