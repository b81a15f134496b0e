use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;

use docxide_build::{BuildRequest, Error, build_document_with_template};

#[derive(Parser)]
#[command(name = "docxide-build")]
#[command(version)]
#[command(about = "Lay out styled content blocks, tables and pictures into a DOCX package", long_about = None)]
struct Cli {
    /// Build request (JSON)
    #[arg(value_name = "REQUEST")]
    request: PathBuf,

    /// Output file (defaults to the request's docxFileName)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Directory of pictures referenced as ${name} in the content
    #[arg(short, long, value_name = "DIR")]
    pictures: Option<PathBuf>,

    /// Base .docx whose styles are carried into the output
    #[arg(short, long, value_name = "FILE")]
    template: Option<PathBuf>,
}

fn load_pictures(dir: &Path) -> Result<HashMap<String, Vec<u8>>, Error> {
    let mut pictures = HashMap::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            log::warn!("Skipping picture with non UTF-8 name: {:?}", entry.path());
            continue;
        };
        pictures.insert(name, std::fs::read(entry.path())?);
    }
    log::debug!("Loaded {} pictures from {}", pictures.len(), dir.display());
    Ok(pictures)
}

fn run(cli: Cli) -> Result<(), Error> {
    let json = std::fs::read_to_string(&cli.request)?;
    let mut request = BuildRequest::from_json(&json)?;
    if let Some(dir) = &cli.pictures {
        request.pictures = load_pictures(dir)?;
    }
    let template = cli.template.as_deref().map(std::fs::read).transpose()?;

    let doc = build_document_with_template(&request, template.as_deref())?;
    for warning in &doc.warnings {
        eprintln!("warning: {warning}");
    }

    let output = cli.output.unwrap_or_else(|| PathBuf::from(&doc.file_name));
    std::fs::write(&output, &doc.bytes)?;
    log::info!("Wrote {} ({} bytes)", output.display(), doc.bytes.len());
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
