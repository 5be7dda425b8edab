//! In-place replacement for `--replace`

use anyhow::{Context, Result};
use std::path::Path;
use tms_common::search::replace_in_source;
use tracing::info;

use crate::FindRequest;

/// Replace the first match (or every match with `all`) in the file at `path`
///
/// Only the matched text changes; blank lines, spacing around speakers and
/// line endings are kept as they are. The file is not rewritten when nothing
/// matches. Returns the number of replacements.
pub async fn replace_in_file(
    path: &Path,
    request: &FindRequest,
    replacement: &str,
    all: bool,
) -> Result<usize> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let (updated, count) = replace_in_source(
        &content,
        &request.query,
        replacement,
        &request.options,
        all,
    )?;

    if count > 0 {
        tokio::fs::write(path, updated)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    info!("Replaced {} match(es) in {}", count, path.display());
    Ok(count)
}
