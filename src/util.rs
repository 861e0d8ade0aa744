//! Utility functions used in all other qflow modules: file name checks and sequence file lookup.

use std::fs;
use std::path::{Component, Path, PathBuf};

use log::{debug, warn};

use crate::error::{QflowError, Result};
use crate::table::Area;

/// Marker for phase images, which must follow the sequence number in a file name.
pub const PHASE_MARKER: &str = "ph";

/// Extension of gzip compressed NIfTI files.
pub const NIFTI_GZ_EXTENSION: &str = ".nii.gz";

/// Check whether the file extension ends with ".gz".
pub fn is_gz_file<P>(path: P) -> bool
where
    P: AsRef<Path>,
{
    path.as_ref()
        .file_name()
        .map(|a| a.to_string_lossy().ends_with(".gz"))
        .unwrap_or(false)
}


/// Check whether a file name belongs to the phase image of the given sequence.
///
/// The test is an unanchored, case-sensitive search: the name must contain the decimal
/// sequence number, followed somewhere after it by `ph`, followed somewhere after that by `.nii.gz`.
/// This is the regular expression `<sequence>.*ph.*\.nii\.gz` applied anywhere in the name.
///
/// # Examples
///
/// ```
/// use qflow::matches_sequence_pattern;
/// assert!(matches_sequence_pattern("s12_qflow_ph.nii.gz", 12));
/// assert!(!matches_sequence_pattern("s12_qflow_mag.nii.gz", 12));
/// ```
pub fn matches_sequence_pattern(name: &str, sequence: i64) -> bool {
    let seq = sequence.to_string();
    // Taking the leftmost occurrence of each part leaves the longest tail for the next one.
    let after_seq = match name.find(&seq) {
        Some(start) => &name[start + seq.len()..],
        None => return false,
    };
    let after_phase = match after_seq.find(PHASE_MARKER) {
        Some(start) => &after_seq[start + PHASE_MARKER.len()..],
        None => return false,
    };
    after_phase.contains(NIFTI_GZ_EXTENSION)
}


/// Find the phase image file of a sequence in a subject directory.
///
/// Entries are visited in directory iteration order and the first one whose name satisfies
/// [`matches_sequence_pattern`] is returned. Entries after it cannot make the lookup fail;
/// further matches among them are ignored, but reported with a warning.
///
/// # Errors
///
/// * [`QflowError::NoMatchingFile`] if no entry matches.
/// * [`QflowError::Io`] if the directory, or an entry before the first match, cannot be read.
pub fn find_sequence_file<P: AsRef<Path>>(dir: P, sequence: i64, area: Area) -> Result<PathBuf> {
    let dir = dir.as_ref();
    let mut entries = fs::read_dir(dir)?;

    let mut first: Option<PathBuf> = None;
    for entry in entries.by_ref() {
        let entry = entry?;
        if matches_sequence_pattern(&entry.file_name().to_string_lossy(), sequence) {
            first = Some(entry.path());
            break;
        }
    }
    let first = match first {
        Some(first) => first,
        None => return Err(QflowError::NoMatchingFile(area, sequence, dir.to_path_buf())),
    };

    let ignored: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| matches_sequence_pattern(&entry.file_name().to_string_lossy(), sequence))
        .map(|entry| entry.path())
        .collect();
    if !ignored.is_empty() {
        warn!("Several {} files match sequence {}, using '{}' and ignoring {:?}.", area, sequence, first.display(), ignored);
    }
    debug!("Resolved {} sequence {} to '{}'.", area, sequence, first.display());
    Ok(first)
}


/// The name of a subject, i.e., the last component of its directory path.
///
/// A trailing `..` is kept as the name, a path ending in the root or `.` has the empty name.
pub fn subject_name<P: AsRef<Path>>(path: P) -> String {
    match path.as_ref().components().next_back() {
        Some(Component::Normal(name)) => name.to_string_lossy().into_owned(),
        Some(Component::ParentDir) => String::from(".."),
        _ => String::new(),
    }
}


#[cfg(test)]
mod test {
    use super::*;
    use std::fs::File;
    use tempfile::tempdir;

    #[test]
    fn sequence_pattern_requires_number_phase_and_extension_in_order() {
        assert!(matches_sequence_pattern("12ph.nii.gz", 12));
        assert!(matches_sequence_pattern("sub01_s12_qflow_ph_x.nii.gz", 12));
        assert!(matches_sequence_pattern("0012_ph.nii.gz.bak", 12));
        assert!(matches_sequence_pattern("112_phase.nii.gz", 12));

        assert!(!matches_sequence_pattern("ph_12.nii.gz", 12));
        assert!(!matches_sequence_pattern("12_mag.nii.gz", 12));
        assert!(!matches_sequence_pattern("12_ph.nii", 12));
        assert!(!matches_sequence_pattern("12.nii.gz_ph", 12));
        assert!(!matches_sequence_pattern("13_ph.nii.gz", 12));
    }

    #[test]
    fn sequence_pattern_is_case_sensitive() {
        assert!(!matches_sequence_pattern("12_PH.nii.gz", 12));
        assert!(!matches_sequence_pattern("12_ph.NII.GZ", 12));
    }

    #[test]
    fn sequence_pattern_ignores_text_before_the_number() {
        assert!(matches_sequence_pattern("ph.nii.gz_12_ph.nii.gz", 12));
        assert!(!matches_sequence_pattern("ph.nii.gz_12", 12));
    }

    #[test]
    fn sequence_file_is_found_in_directory() {
        let dir = tempdir().unwrap();
        File::create(dir.path().join("s7_mag.nii.gz")).unwrap();
        File::create(dir.path().join("s7_ph.nii.gz")).unwrap();
        File::create(dir.path().join("s8_ph.nii.gz")).unwrap();

        let found = find_sequence_file(dir.path(), 7, Area::Heart).unwrap();
        assert_eq!(found, dir.path().join("s7_ph.nii.gz"));
    }

    #[test]
    fn the_first_matching_entry_wins() {
        let dir = tempdir().unwrap();
        File::create(dir.path().join("s7_ph.nii.gz")).unwrap();
        File::create(dir.path().join("s7_phase_b.nii.gz")).unwrap();
        File::create(dir.path().join("s7_mag.nii.gz")).unwrap();

        let expected = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap())
            .find(|entry| matches_sequence_pattern(&entry.file_name().to_string_lossy(), 7))
            .unwrap()
            .path();

        let found = find_sequence_file(dir.path(), 7, Area::Heart).unwrap();
        assert_eq!(expected, found);
        assert_eq!(found, find_sequence_file(dir.path(), 7, Area::Heart).unwrap());
    }

    #[test]
    fn negative_and_large_sequence_numbers_are_matched_as_text() {
        assert!(matches_sequence_pattern("s-3_ph.nii.gz", -3));
        assert!(!matches_sequence_pattern("s3_ph.nii.gz", -3));
        assert!(matches_sequence_pattern("s5000000000_ph.nii.gz", 5_000_000_000));

        let dir = tempdir().unwrap();
        File::create(dir.path().join("s-3_ph.nii.gz")).unwrap();
        let found = find_sequence_file(dir.path(), -3, Area::Brain).unwrap();
        assert_eq!(dir.path().join("s-3_ph.nii.gz"), found);
    }

    #[test]
    fn missing_sequence_file_is_reported() {
        let dir = tempdir().unwrap();
        File::create(dir.path().join("s8_ph.nii.gz")).unwrap();

        let err = find_sequence_file(dir.path(), 7, Area::Brain).unwrap_err();
        match err {
            QflowError::NoMatchingFile(area, sequence, path) => {
                assert_eq!(Area::Brain, area);
                assert_eq!(7, sequence);
                assert_eq!(dir.path(), path.as_path());
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn unreadable_directory_is_an_io_error() {
        let dir = tempdir().unwrap();
        let err = find_sequence_file(dir.path().join("does_not_exist"), 7, Area::Heart).unwrap_err();
        assert!(matches!(err, QflowError::Io(_)));
    }

    #[test]
    fn gz_files_are_detected() {
        assert!(is_gz_file("/tmp/s12_ph.nii.gz"));
        assert!(!is_gz_file("/tmp/s12_ph.nii"));
    }

    #[test]
    fn subject_name_is_last_path_component() {
        assert_eq!("subject1", subject_name("/data/cohort/subject1"));
        assert_eq!("subject1", subject_name("/data/cohort/subject1/"));
        assert_eq!("", subject_name("/"));
        assert_eq!("", subject_name("."));
        assert_eq!("..", subject_name("/data/cohort/.."));
    }
}
