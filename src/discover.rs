//! Chapter file discovery and ordering.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};

/// Extension of annotated chapter files.
pub const CHAPTER_EXTENSION: &str = ".xml";

/// `<prefix>-<number>(-<suffix>)?.xml`, anchored at the start only.
static PART_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.*?)-([0-9]+)(-[^0-9]+)?\.xml").expect("part pattern is a valid regex")
});

/// A chapter file selected for merging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterFile {
    pub path: PathBuf,
    pub file_name: String,
    /// Numeric part parsed from the file name, if it matches the pattern.
    pub part: Option<u64>,
}

impl ChapterFile {
    pub fn new(dir: &Path, file_name: impl Into<String>) -> Self {
        let file_name = file_name.into();
        Self {
            path: dir.join(&file_name),
            part: part_number(&file_name),
            file_name,
        }
    }
}

impl Ord for ChapterFile {
    /// Unnumbered files first, then by part number, then by file name.
    fn cmp(&self, other: &Self) -> Ordering {
        self.part
            .cmp(&other.part)
            .then_with(|| self.file_name.cmp(&other.file_name))
            .then_with(|| self.path.cmp(&other.path))
    }
}

impl PartialOrd for ChapterFile {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Parse the part number out of a chapter file name.
///
/// Numbers too large for `u64` saturate.
pub fn part_number(file_name: &str) -> Option<u64> {
    let caps = PART_PATTERN.captures(file_name)?;
    let digits = caps.get(2)?.as_str();
    Some(digits.parse::<u64>().unwrap_or(u64::MAX))
}

/// List the `.xml` files directly inside `dir`, in merge order.
pub fn list_chapter_files(dir: &Path) -> Result<Vec<ChapterFile>> {
    let entries = std::fs::read_dir(dir).map_err(|e| Error::io(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::io(dir, e))?;
        let file_type = entry.file_type().map_err(|e| Error::io(entry.path(), e))?;
        if file_type.is_dir() {
            continue;
        }

        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            tracing::warn!(path = %entry.path().display(), "skipping non UTF-8 file name");
            continue;
        };
        if name.ends_with(CHAPTER_EXTENSION) {
            files.push(ChapterFile::new(dir, name));
        }
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_part_number() {
        assert_eq!(part_number("emma-1.xml"), Some(1));
        assert_eq!(part_number("emma-012.xml"), Some(12));
        assert_eq!(part_number("emma-3-annotated.xml"), Some(3));
        assert_eq!(part_number("vol-2-ch-3.xml"), Some(3));
        assert_eq!(part_number("emma-3-v2.xml"), None);
        assert_eq!(part_number("emma.xml"), None);
        assert_eq!(part_number("-5.xml"), Some(5));
        assert_eq!(part_number("a-99999999999999999999999.xml"), Some(u64::MAX));
    }

    #[test]
    fn test_numeric_not_lexicographic_order() {
        let dir = Path::new("in");
        let mut files: Vec<_> = ["a-2.xml", "a-10.xml", "a-1.xml"]
            .into_iter()
            .map(|n| ChapterFile::new(dir, n))
            .collect();
        files.sort();
        let names: Vec<_> = files.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(names, vec!["a-1.xml", "a-2.xml", "a-10.xml"]);
    }

    #[test]
    fn test_unnumbered_first_and_ties_by_name() {
        let dir = Path::new("in");
        let mut files: Vec<_> = ["b-1.xml", "zeta.xml", "a-1.xml", "alpha.xml"]
            .into_iter()
            .map(|n| ChapterFile::new(dir, n))
            .collect();
        files.sort();
        let names: Vec<_> = files.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(names, vec!["alpha.xml", "zeta.xml", "a-1.xml", "b-1.xml"]);
    }

    #[test]
    fn test_list_chapter_files() {
        let dir = tempfile::TempDir::new().unwrap();
        for name in ["c-10.xml", "c-9.xml", "notes.txt", "c-1.xml.bak", "front.xml"] {
            std::fs::write(dir.path().join(name), "<doc/>").unwrap();
        }
        std::fs::create_dir(dir.path().join("sub.xml")).unwrap();

        let files = list_chapter_files(dir.path()).unwrap();
        let names: Vec<_> = files.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(names, vec!["front.xml", "c-9.xml", "c-10.xml"]);
        assert_eq!(files[1].path, dir.path().join("c-9.xml"));
    }

    #[test]
    fn test_list_missing_dir() {
        let err = list_chapter_files(Path::new("/definitely/not/here")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    proptest! {
        #[test]
        fn prop_sorted_parts_are_monotonic(parts in prop::collection::vec(0u64..10_000, 0..20)) {
            let dir = Path::new("in");
            let mut files: Vec<_> = parts
                .iter()
                .map(|p| ChapterFile::new(dir, format!("ch-{p}.xml")))
                .collect();
            files.sort();
            for pair in files.windows(2) {
                prop_assert!(pair[0].part <= pair[1].part);
            }
        }
    }
}
