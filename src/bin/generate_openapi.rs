//! Prints the fan telemetry OpenAPI document.
//!
//!   generate_openapi                  # JSON on stdout
//!   generate_openapi --output FILE    # JSON written to FILE

use std::{fs, io::Write, path::PathBuf, process::ExitCode};

use fan_telemetry_service::api::handlers::ApiDoc;
use utoipa::OpenApi;

fn main() -> ExitCode {
    match run(std::env::args().skip(1)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("generate_openapi: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(mut args: impl Iterator<Item = String>) -> anyhow::Result<()> {
    let mut output: Option<PathBuf> = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--output" | "-o" => {
                let path = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("{arg} needs a file path"))?;
                output = Some(PathBuf::from(path));
            }
            other => anyhow::bail!("unexpected argument: {other}"),
        }
    }

    let doc = ApiDoc::openapi().to_pretty_json()?;
    match output {
        Some(path) => {
            fs::write(&path, doc)
                .map_err(|e| anyhow::anyhow!("cannot write {}: {e}", path.display()))?;
            eprintln!("wrote {}", path.display());
        }
        None => std::io::stdout().lock().write_all(doc.as_bytes())?,
    }
    Ok(())
}
