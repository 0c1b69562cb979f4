//! Aggregate file rendering.
//!
//! An aggregate file is a plain text translation unit made of one
//! `#include "<path>"` line per member source, in member order.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Escape a path for use inside a quoted `#include` directive.
///
/// Backslashes are doubled so Windows paths survive the preprocessor.
/// Non-UTF-8 bytes are replaced with U+FFFD; [`write_aggregate`] rejects
/// such paths before rendering.
pub fn escape_include_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "\\\\")
}

/// Render the contents of an aggregate file.
///
/// No header or footer, no de-duplication; every line ends in `\n`.
pub fn render_aggregate<P: AsRef<Path>>(sources: &[P]) -> String {
    let mut out = String::new();
    for source in sources {
        out.push_str("#include \"");
        out.push_str(&escape_include_path(source.as_ref()));
        out.push_str("\"\n");
    }
    out
}

/// Error writing an aggregate file.
#[derive(Debug, thiserror::Error)]
pub enum AggregateError {
    /// The directory for the aggregate could not be created
    #[error("Failed to create cache directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The aggregate file could not be written
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// A member path is not valid UTF-8 and cannot be spelled in an `#include`
    #[error("Cannot include non-UTF-8 path {}", path.display())]
    NonUtf8Path { path: PathBuf },
}

impl AggregateError {
    /// The underlying I/O error, if any.
    pub fn io_error(&self) -> Option<&io::Error> {
        match self {
            AggregateError::CreateDir { source, .. } | AggregateError::Write { source, .. } => {
                Some(source)
            }
            AggregateError::NonUtf8Path { .. } => None,
        }
    }

    /// The path that could not be created, written or included.
    pub fn path(&self) -> &Path {
        match self {
            AggregateError::CreateDir { path, .. }
            | AggregateError::Write { path, .. }
            | AggregateError::NonUtf8Path { path } => path,
        }
    }
}

/// Write an aggregate file for `sources` at `dest`.
///
/// Missing parent directories are created. Any existing file is replaced;
/// regeneration is unconditional. Fails without writing anything if a
/// source path is not valid UTF-8.
pub fn write_aggregate<P: AsRef<Path>>(sources: &[P], dest: &Path) -> Result<(), AggregateError> {
    for source in sources {
        let path: &Path = source.as_ref();
        if path.to_str().is_none() {
            return Err(AggregateError::NonUtf8Path { path: path.to_path_buf() });
        }
    }

    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|source| AggregateError::CreateDir { path: parent.to_path_buf(), source })?;
    }

    tracing::info!("Generating {} from {} source files.", dest.display(), sources.len());

    fs::write(dest, render_aggregate(sources))
        .map_err(|source| AggregateError::Write { path: dest.to_path_buf(), source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::test_utils::capture_info;
    use tempfile::TempDir;

    #[test]
    fn test_render_two_sources() {
        let rendered = render_aggregate(&["x.cpp", "y.cpp"]);
        assert_eq!(rendered, "#include \"x.cpp\"\n#include \"y.cpp\"\n");
        assert_eq!(rendered.lines().count(), 2);
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render_aggregate::<&str>(&[]), "");
    }

    #[test]
    fn test_render_keeps_duplicates() {
        let rendered = render_aggregate(&["a.cpp", "a.cpp"]);
        assert_eq!(rendered, "#include \"a.cpp\"\n#include \"a.cpp\"\n");
    }

    #[test]
    fn test_escape_backslashes() {
        assert_eq!(escape_include_path(Path::new(r"C:\src\main.cpp")), r"C:\\src\\main.cpp");
        assert_eq!(escape_include_path(Path::new("/src/main.cpp")), "/src/main.cpp");
    }

    #[test]
    fn test_write_creates_cache_dir() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("build").join("unity").join("t_0.cpp");

        write_aggregate(&["x.cpp", "y.cpp"], &dest).unwrap();

        let contents = fs::read_to_string(&dest).unwrap();
        assert_eq!(contents, "#include \"x.cpp\"\n#include \"y.cpp\"\n");
    }

    #[test]
    fn test_write_overwrites_and_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("t_0.cpp");
        fs::write(&dest, "stale contents that are much longer than the new ones\n").unwrap();

        write_aggregate(&["a.cpp"], &dest).unwrap();
        let first = fs::read(&dest).unwrap();
        write_aggregate(&["a.cpp"], &dest).unwrap();
        let second = fs::read(&dest).unwrap();

        assert_eq!(first, b"#include \"a.cpp\"\n");
        assert_eq!(first, second);
    }

    #[test]
    fn test_write_reports_path_on_failure() {
        let temp = TempDir::new().unwrap();
        // A regular file where the cache directory should be.
        let blocker = temp.path().join("cache");
        fs::write(&blocker, "").unwrap();
        let dest = blocker.join("t_0.cpp");

        let err = write_aggregate(&["a.cpp"], &dest).unwrap_err();
        assert!(matches!(err, AggregateError::CreateDir { .. }));
        assert_eq!(err.path(), blocker.as_path());
        assert!(err.io_error().is_some());
    }

    #[cfg(unix)]
    #[test]
    fn test_write_rejects_non_utf8_path() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("t_0.cpp");
        let bad = Path::new(OsStr::from_bytes(b"/src/caf\xe9.cpp"));

        let err = write_aggregate(&[Path::new("/src/a.cpp"), bad], &dest).unwrap_err();
        assert!(matches!(err, AggregateError::NonUtf8Path { .. }));
        assert_eq!(err.path(), bad);
        assert!(err.io_error().is_none());
        assert!(!dest.exists());
    }

    #[test]
    fn test_write_logs_destination_and_count() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("t_0.cpp");

        let (_, lines) = capture_info(|| write_aggregate(&["a.cpp", "b.cpp"], &dest).unwrap());
        assert_eq!(lines, vec![format!("Generating {} from 2 source files.", dest.display())]);
    }
}
