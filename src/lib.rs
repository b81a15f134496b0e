pub mod builder;
pub mod docx;
mod error;
pub mod model;

pub use error::Error;
pub use model::{BuildRequest, BuildWarning, ContentBlock, Style, TableRegion};

use std::time::Instant;

use builder::DocumentBuilder;
use docx::{DocumentModel, DocxPackage, Template};

/// A serialized package ready to be stored or sent.
#[derive(Debug)]
pub struct BuiltDocument {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub warnings: Vec<BuildWarning>,
}

pub fn build_document(request: &BuildRequest) -> Result<BuiltDocument, Error> {
    build_document_with_template(request, None)
}

/// Builds on top of a base `.docx`. An unreadable template is replaced by an
/// empty document and reported as a warning.
pub fn build_document_with_template(
    request: &BuildRequest,
    template: Option<&[u8]>,
) -> Result<BuiltDocument, Error> {
    let t0 = Instant::now();

    let mut warnings = Vec::new();
    let package = match template.map(Template::read) {
        None => DocxPackage::new(),
        Some(Ok(template)) => DocxPackage::with_template(template),
        Some(Err(e)) => {
            log::warn!("Failed to read template, using an empty document: {e}");
            warnings.push(BuildWarning::TemplateUnreadable {
                reason: e.to_string(),
            });
            DocxPackage::new()
        }
    };
    let t_template = t0.elapsed();

    let (package, build_warnings) = DocumentBuilder::new(request, package)?.build()?;
    warnings.extend(build_warnings);
    let t_layout = t0.elapsed();

    let bytes = package.serialize()?;
    let t_total = t0.elapsed();

    log::info!(
        "Timing: template={:.1}ms, layout={:.1}ms, serialize={:.1}ms, total={:.1}ms (output {} bytes, {} warnings)",
        t_template.as_secs_f64() * 1000.0,
        (t_layout - t_template).as_secs_f64() * 1000.0,
        (t_total - t_layout).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        bytes.len(),
        warnings.len(),
    );

    Ok(BuiltDocument {
        file_name: request.docx_file_name.clone(),
        bytes,
        warnings,
    })
}
