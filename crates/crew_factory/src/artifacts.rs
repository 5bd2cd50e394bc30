//! Task artifact writer

use std::fs;
use std::path::{Path, PathBuf};

use contracts::ContractError;
use tracing::{debug, instrument};

/// Write `text` to `path`, relative paths resolved under `base_dir`
///
/// Parent directories are created. Returns the path written.
#[instrument(name = "write_artifact", skip(text), fields(bytes = text.len()))]
pub fn write_artifact(base_dir: &Path, path: &Path, text: &str) -> Result<PathBuf, ContractError> {
    let target = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    };

    if let Some(parent) = target.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(&target, text.as_bytes())?;
    debug!(path = %target.display(), "artifact written");
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let written =
            write_artifact(dir.path(), Path::new("reports/marketing_report.md"), "# Report").unwrap();
        assert_eq!(written, dir.path().join("reports/marketing_report.md"));
        assert_eq!(fs::read_to_string(written).unwrap(), "# Report");
    }

    #[test]
    fn test_absolute_path_kept() {
        let dir = tempfile::tempdir().unwrap();
        let absolute = dir.path().join("venue_details.json");
        let written = write_artifact(Path::new("/nonexistent"), &absolute, "{}").unwrap();
        assert_eq!(written, absolute);
    }

    #[test]
    fn test_overwrites_existing() {
        let dir = tempfile::tempdir().unwrap();
        write_artifact(dir.path(), Path::new("out.md"), "first").unwrap();
        let written = write_artifact(dir.path(), Path::new("out.md"), "second").unwrap();
        assert_eq!(fs::read_to_string(written).unwrap(), "second");
    }
}
