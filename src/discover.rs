// src/discover.rs

use anyhow::{Context, Result};
use glob::glob;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::normalize::{round_from_path, team_from_path};

/// A workbook found under the input directory, with the team and round its path encodes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SourceFile {
    pub path: PathBuf,
    pub team: String,
    pub round: String,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        SourceFile {
            team: team_from_path(&path),
            round: round_from_path(&path),
            path,
        }
    }
}

/// Recursively find workbooks under `input_dir` with any of `extensions`,
/// sorted by path so every run sees them in the same order.
pub fn discover(input_dir: &Path, extensions: &[String]) -> Result<Vec<SourceFile>> {
    let mut paths = BTreeSet::new();
    for ext in extensions {
        let pattern = format!("{}/**/*.{}", input_dir.display(), ext.trim_start_matches('.'));
        for entry in
            glob(&pattern).with_context(|| format!("Failed to read glob pattern '{}'", pattern))?
        {
            match entry {
                Ok(p) if p.is_file() && !is_lock_file(&p) => {
                    paths.insert(p);
                }
                Ok(_) => {}
                Err(e) => warn!("cannot read glob entry: {:?}", e),
            }
        }
    }
    Ok(paths.into_iter().map(SourceFile::new).collect())
}

/// Office leaves `~$name.xlsx` lock files next to open workbooks.
fn is_lock_file(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().starts_with("~$"))
        .unwrap_or(false)
}

/// Team and round labels a set of input files should produce.
pub fn expected_labels(files: &[SourceFile]) -> (BTreeSet<String>, BTreeSet<String>) {
    let teams = files.iter().map(|f| f.team.clone()).collect();
    let rounds = files.iter().map(|f| f.round.clone()).collect();
    (teams, rounds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::fs;

    #[test]
    fn finds_workbooks_recursively_in_order() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let root = dir.path();
        fs::create_dir_all(root.join("Round2"))?;
        fs::create_dir_all(root.join("Round1"))?;
        fs::write(root.join("Round2/02Owls.xlsx"), b"")?;
        fs::write(root.join("Round1/01Hawks.xlsx"), b"")?;
        fs::write(root.join("Round1/02Owls.xls"), b"")?;
        fs::write(root.join("Round1/~$01Hawks.xlsx"), b"")?;
        fs::write(root.join("Round1/notes.txt"), b"")?;

        let files = discover(root, &["xlsx".to_string(), ".xls".to_string()])?;
        let labels: Vec<(String, String)> = files
            .iter()
            .map(|f| (f.round.clone(), f.team.clone()))
            .collect();
        assert_eq!(
            labels,
            vec![
                ("Round1".to_string(), "Hawks".to_string()),
                ("Round1".to_string(), "Owls".to_string()),
                ("Round2".to_string(), "Owls".to_string()),
            ]
        );

        let (teams, rounds) = expected_labels(&files);
        assert_eq!(teams.len(), 2);
        assert_eq!(rounds.len(), 2);
        Ok(())
    }

    #[test]
    fn empty_input_dir_finds_nothing() -> Result<()> {
        let dir = tempfile::tempdir()?;
        assert!(discover(dir.path(), &["xlsx".to_string()])?.is_empty());
        Ok(())
    }
}
