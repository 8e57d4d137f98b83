//! Diagnostic listing of the packaging output directory.

use crate::error::Result;
use crate::pipeline::{Step, StepCompletion, StepContext, StepId};
use async_trait::async_trait;
use std::path::Path;

/// Enumerates the output directory for the run log
pub struct ListOutputStep;

#[async_trait]
impl Step for ListOutputStep {
    fn id(&self) -> StepId {
        StepId::ListOutput
    }

    async fn run(&self, ctx: &mut StepContext<'_>) -> Result<StepCompletion> {
        let dist = ctx.resolve(&ctx.config.dist_dir)?;
        let entries = list_dir(&dist)?;
        for line in &entries {
            log::info!("{}", line);
        }
        if entries.is_empty() {
            return Ok(StepCompletion::no_op(format!("{} is empty", dist.display())));
        }
        Ok(StepCompletion::with_details(entries))
    }
}

/// One line per entry below `dir`: relative path and size for files
pub fn list_dir(dir: &Path) -> Result<Vec<String>> {
    let mut lines = Vec::new();
    let walker = walkdir::WalkDir::new(dir)
        .min_depth(1)
        .sort_by_file_name();
    for entry in walker {
        let entry = entry.map_err(|e| std::io::Error::other(e.to_string()))?;
        let relative = entry.path().strip_prefix(dir).unwrap_or(entry.path());
        if entry.file_type().is_dir() {
            lines.push(format!("{}/", relative.display()));
        } else {
            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            lines.push(format!("{} ({} bytes)", relative.display(), size));
        }
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_list_dir_sorted_with_sizes() {
        let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        fs::write(dir.path().join("b.txt"), b"12345").expect("write");
        fs::write(dir.path().join("a.exe"), b"MZ").expect("write");
        fs::create_dir(dir.path().join("c")).expect("mkdir");

        let lines = list_dir(dir.path()).expect("list");
        assert_eq!(lines, vec!["a.exe (2 bytes)", "b.txt (5 bytes)", "c/"]);
    }

    #[test]
    fn test_list_missing_dir_is_an_error() {
        let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        assert!(list_dir(&dir.path().join("dist")).is_err());
    }
}
