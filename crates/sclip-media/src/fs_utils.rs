//! Output directory bookkeeping.
//!
//! Clips in an output directory are numbered (`3_clip.mp4`, `3_final.mp4`,
//! `3.json`, ...). Numbering avoids collisions by scanning existing files
//! before writing, an at-most-once naming discipline rather than a lock.

use std::collections::HashSet;
use std::path::Path;

use crate::error::MediaResult;

/// Find the first clip index with no files in `dir`.
///
/// Any file whose name is `<index>_...` or `<index>.<ext>` claims that
/// index. The directory is created if missing.
pub fn next_clip_index(dir: &Path) -> MediaResult<u32> {
    std::fs::create_dir_all(dir)?;

    let mut taken: HashSet<u32> = HashSet::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };

        let prefix: String = name.chars().take_while(|c| c.is_ascii_digit()).collect();
        if prefix.is_empty() {
            continue;
        }
        let rest = &name[prefix.len()..];
        if rest.starts_with('_') || rest.starts_with('.') {
            if let Ok(index) = prefix.parse::<u32>() {
                taken.insert(index);
            }
        }
    }

    let mut index = 0;
    while taken.contains(&index) {
        index += 1;
    }
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_dir_starts_at_zero() {
        let dir = TempDir::new().unwrap();
        assert_eq!(next_clip_index(dir.path()).unwrap(), 0);
    }

    #[test]
    fn test_skips_taken_indices() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("0_final.mp4"), b"x").unwrap();
        std::fs::write(dir.path().join("1.json"), b"x").unwrap();
        assert_eq!(next_clip_index(dir.path()).unwrap(), 2);
    }

    #[test]
    fn test_fills_gaps() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("0_clip.mp4"), b"x").unwrap();
        std::fs::write(dir.path().join("2_clip.mp4"), b"x").unwrap();
        assert_eq!(next_clip_index(dir.path()).unwrap(), 1);
    }

    #[test]
    fn test_ignores_unrelated_files() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        std::fs::write(dir.path().join("0trailer.mp4"), b"x").unwrap();
        assert_eq!(next_clip_index(dir.path()).unwrap(), 0);
    }

    #[test]
    fn test_creates_missing_dir() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("out");
        assert_eq!(next_clip_index(&nested).unwrap(), 0);
        assert!(nested.is_dir());
    }
}
