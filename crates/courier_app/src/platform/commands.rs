use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::bail;
use courier_core::{CatalogStatus, UploadResult};
use courier_logging::courier_info;

use super::app::Session;
use super::picker::collect_files;
use super::render::{render_add_report, render_catalog, render_result};

/// Inputs of a one-shot `process` run.
#[derive(Debug, Clone)]
pub struct ProcessRequest {
    pub actions: Vec<String>,
    pub paths: Vec<PathBuf>,
    pub recursive: bool,
}

/// Load the catalog and print it. Fails when the catalog could not be loaded.
pub fn list_actions(
    session: &mut Session,
    timeout: Option<Duration>,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    open_catalog(session, timeout)?;
    write!(out, "{}", render_catalog(&session.view()))?;
    Ok(())
}

/// Run one batch to completion and print where the result was saved.
pub fn process(
    session: &mut Session,
    request: &ProcessRequest,
    catalog_timeout: Option<Duration>,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    open_catalog(session, catalog_timeout)?;

    let picked = collect_files(&request.paths, request.recursive);
    if picked.files.is_empty() {
        bail!("no input files found");
    }
    session.add_files(picked.files);
    if let Some(line) = render_add_report(&session.view()) {
        writeln!(out, "{line}")?;
    }

    for id in &request.actions {
        session.select_action(id)?;
    }

    if !session.state().can_submit() {
        bail!("nothing to submit");
    }
    session.submit();
    courier_info!("waiting for the processed result");
    session.wait_for_idle(None);

    match session.state().last_result() {
        Some(UploadResult::Delivered { location, .. }) => {
            writeln!(out, "{location}")?;
            Ok(())
        }
        Some(result) => bail!("upload {}", render_result(result)),
        None => bail!("upload did not finish"),
    }
}

fn open_catalog(session: &mut Session, timeout: Option<Duration>) -> anyhow::Result<()> {
    if !session.open(timeout) {
        bail!("timed out loading available actions");
    }
    match session.state().catalog_status() {
        CatalogStatus::Loaded => Ok(()),
        CatalogStatus::Failed { reason } => bail!("could not load available actions: {reason}"),
        other => bail!("catalog in unexpected state {other:?}"),
    }
}
