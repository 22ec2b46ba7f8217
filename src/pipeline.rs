//! End-to-end fetch, archive and search run.
//!
//! A run authenticates once, then walks `scripts` followed by `policies`.
//! For every listed resource it:
//!
//! 1. fetches the detail document,
//! 2. archives it under `{output_dir}/{scripts|policies}/{name}_{id}.xml`,
//! 3. re-reads and parses the archived file,
//! 4. dispatches on the root tag to the script or policy matcher.
//!
//! A document that fails to parse in step 3 is skipped and the run moves
//! on. Every other failure aborts the run.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::archive;
use crate::auth::obtain_session;
use crate::client::JamfClient;
use crate::error::{JamfError, Result};
use crate::resources::{ResourceKind, fetch_resource, list_resources};
use crate::search::{MatchRecord, SearchOptions, search_policy, search_script};
use crate::xml::{self, Element};

/// Everything a run needs, collected once at startup.
pub struct SearchJob {
    /// Server URL, with or without a trailing slash.
    pub base_url: String,
    /// API account name.
    pub user: String,
    /// API account password. Never logged or persisted.
    pub password: String,
    /// Keyword and case rule.
    pub options: SearchOptions,
    /// Root directory for archived documents.
    pub output_dir: PathBuf,
}

/// Per-collection counters, logged when the collection is done.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CollectionSummary {
    /// Resources fetched and archived.
    pub archived: usize,
    /// Archived documents that did not parse and were not searched.
    pub skipped: usize,
    /// Resources that produced a match report.
    pub matched: usize,
}

/// Authenticates and processes both collections, writing progress and
/// match reports to `out`.
pub async fn run<W: Write>(job: &SearchJob, out: &mut W) -> Result<()> {
    let session = obtain_session(&job.base_url, &job.user, &job.password).await?;
    let client = JamfClient::new(&job.base_url, &session)?;

    for kind in ResourceKind::ALL {
        process_resources(&client, kind, &job.options, &job.output_dir, out).await?;
    }
    Ok(())
}

/// Lists, fetches, archives and searches every resource of one kind.
///
/// Resources are handled one at a time in listing order.
pub async fn process_resources<W: Write>(
    client: &JamfClient,
    kind: ResourceKind,
    options: &SearchOptions,
    output_dir: &Path,
    out: &mut W,
) -> Result<CollectionSummary> {
    let endpoint = kind.endpoint();
    writeln!(out, "Fetching {endpoint}...").map_err(console_error)?;

    let directory = output_dir.join(kind.subdirectory());
    let mut summary = CollectionSummary::default();

    for entry in list_resources(client, endpoint).await? {
        let document = fetch_resource(client, endpoint, &entry.id).await?;
        let path = archive::save(&directory, &entry.logical_name(), &document)?;
        summary.archived += 1;

        let root = match load_archived(&path)? {
            Some(root) => root,
            None => {
                summary.skipped += 1;
                continue;
            }
        };

        if let Some(record) = search_document(&root, options, client.base_url()) {
            write!(out, "{}", record.report(options.keyword())).map_err(console_error)?;
            summary.matched += 1;
        }
    }

    tracing::info!(
        endpoint,
        archived = summary.archived,
        skipped = summary.skipped,
        matched = summary.matched,
        "collection processed"
    );
    Ok(summary)
}

/// Routes a parsed document to the matcher for its root tag. Unknown root
/// tags produce no record.
pub fn search_document(
    root: &Element,
    options: &SearchOptions,
    base_url: &str,
) -> Option<MatchRecord> {
    match ResourceKind::from_root_tag(root.name())? {
        ResourceKind::Scripts => search_script(root, options, base_url).map(MatchRecord::Script),
        ResourceKind::Policies => search_policy(root, options, base_url).map(MatchRecord::Policy),
    }
}

/// Reads back an archived document. `Ok(None)` means it is not well-formed
/// XML and should be skipped; a failed read is fatal.
fn load_archived(path: &Path) -> Result<Option<Element>> {
    let content = fs::read_to_string(path).map_err(|source| JamfError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    match xml::parse(&content) {
        Ok(root) => Ok(Some(root)),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "skipping unparsable document");
            Ok(None)
        }
    }
}

fn console_error(source: std::io::Error) -> JamfError {
    JamfError::Io {
        path: PathBuf::from("<stdout>"),
        source,
    }
}
