//! Writing a complete document to its output file.
use std::io::{BufWriter, Write};

use camino::{Utf8Path, Utf8PathBuf};
use log::info;
use tempfile::NamedTempFile;
use thiserror::Error;

use osm_export_core::{DocumentHeader, ExportError, ExportSummary, RowSource, serialize_document};

/// Errors raised while exporting to a file.
#[derive(Debug, Error)]
pub enum ExportFileError {
    /// The destination directory could not be prepared.
    #[error("failed to prepare output directory for {path}")]
    Prepare {
        /// Destination path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Serialisation failed; nothing was written to `path`.
    #[error("failed to export {path}")]
    Export {
        /// Destination path.
        path: Utf8PathBuf,
        /// Export failure.
        #[source]
        source: ExportError,
    },
    /// The finished document could not be moved into place.
    #[error("failed to persist {path}")]
    Persist {
        /// Destination path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Serialise `source` into the file at `path`.
///
/// The document is staged in a temporary file beside `path` and renamed over
/// it only once complete, so a failed export leaves any previous file
/// untouched and never leaves a partial one.
///
/// # Examples
/// ```
/// use camino::Utf8PathBuf;
/// use osm_export_core::{DocumentHeader, PointRecord, test_support::MemoryRowSource};
/// use osm_export_data::export_document_to_path;
///
/// let dir = tempfile::tempdir().expect("temp dir");
/// let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 path");
/// let path = root.join("gis/public.parks.osm");
/// let source = MemoryRowSource::default()
///     .with_point(PointRecord::new(1, "modify", 51.5, -0.1, Vec::new()));
///
/// let summary =
///     export_document_to_path(&DocumentHeader::default(), &source, &path).expect("export");
/// assert_eq!(summary.nodes, 1);
/// assert!(std::fs::read_to_string(&path).expect("read").ends_with("</osm>\n"));
/// ```
pub fn export_document_to_path<S>(
    header: &DocumentHeader,
    source: &S,
    path: &Utf8Path,
) -> Result<ExportSummary, ExportFileError>
where
    S: RowSource + ?Sized,
{
    let prepare = |source| ExportFileError::Prepare {
        path: path.to_path_buf(),
        source,
    };
    osm_export_fs::ensure_parent_dir(path).map_err(prepare)?;
    let directory = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let mut staged = NamedTempFile::new_in(directory).map_err(prepare)?;

    let summary = {
        let mut writer = BufWriter::new(staged.as_file_mut());
        let summary =
            serialize_document(header, source, &mut writer).map_err(|source| {
                ExportFileError::Export {
                    path: path.to_path_buf(),
                    source,
                }
            })?;
        writer.flush().map_err(|err| ExportFileError::Export {
            path: path.to_path_buf(),
            source: ExportError::Sink(err),
        })?;
        summary
    };

    staged
        .persist(path)
        .map_err(|err| ExportFileError::Persist {
            path: path.to_path_buf(),
            source: err.error,
        })?;
    info!("Wrote {path}");
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use osm_export_core::{PointRecord, RecordKind, test_support::MemoryRowSource};
    use rstest::{fixture, rstest};
    use std::fs;
    use tempfile::TempDir;

    #[fixture]
    fn output() -> (TempDir, Utf8PathBuf) {
        let dir = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 temp dir");
        (dir, root)
    }

    fn entries(dir: &Utf8Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .expect("list dir")
            .map(|entry| {
                entry
                    .expect("dir entry")
                    .file_name()
                    .to_string_lossy()
                    .into_owned()
            })
            .collect();
        names.sort();
        names
    }

    #[rstest]
    fn writes_complete_documents(output: (TempDir, Utf8PathBuf)) {
        let (_guard, root) = output;
        let path = root.join("gis/public.parks.osm");
        let source = MemoryRowSource::default()
            .with_point(PointRecord::new(1, "modify", 51.5, -0.1, Vec::new()));

        let summary =
            export_document_to_path(&DocumentHeader::default(), &source, &path).expect("export");

        assert_eq!(summary.nodes, 1);
        let document = fs::read_to_string(&path).expect("read document");
        assert!(document.starts_with("<?xml version='1.0' encoding='UTF-8'?>\n"));
        assert!(document.contains("  <node id='1' action='modify' lat='51.5' lon='-0.1' />\n"));
        assert!(document.ends_with("</osm>\n"));
        assert_eq!(entries(&root.join("gis")), vec!["public.parks.osm"]);
    }

    #[rstest]
    fn failed_exports_leave_no_file(output: (TempDir, Utf8PathBuf)) {
        let (_guard, root) = output;
        let path = root.join("gis/public.parks.osm");
        let source = MemoryRowSource::default().with_failure(RecordKind::Way, "connection lost");

        let err = export_document_to_path(&DocumentHeader::default(), &source, &path)
            .expect_err("upstream failure");

        assert!(matches!(
            err,
            ExportFileError::Export {
                source: ExportError::Upstream {
                    kind: RecordKind::Way,
                    ..
                },
                ..
            }
        ));
        assert!(entries(&root.join("gis")).is_empty());
    }

    #[rstest]
    fn failed_exports_keep_the_previous_file(output: (TempDir, Utf8PathBuf)) {
        let (_guard, root) = output;
        let path = root.join("public.parks.osm");
        fs::write(&path, "previous").expect("seed file");
        let source = MemoryRowSource::default().with_failure(RecordKind::Node, "boom");

        export_document_to_path(&DocumentHeader::default(), &source, &path)
            .expect_err("upstream failure");

        assert_eq!(fs::read_to_string(&path).expect("read file"), "previous");
    }
}
