//! A subject with a cardiac and a cerebral qflow acquisition, and the plotting of both.
//!
//! A [`Subject`] only stores where its images live and which voxels to sample. Nothing is read
//! before [`Subject::plot_qflow`] or [`Subject::qflow_table`] is called.

use log::{debug, info};

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::plot::{render_facets, Figure, PlotStyle};
use crate::table::{Area, QflowTable};
use crate::util::{find_sequence_file, subject_name};
use crate::volume::QflowVolume;

/// Voxel coordinates (row, column) within the first slice of a volume.
pub type VoxelCoords = (usize, usize);

/// Models an imaging subject. All fields are optional, plotting needs all of them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Subject {
    pub path: Option<PathBuf>,
    pub heart_seq: Option<i64>,
    pub heart_coords: Option<VoxelCoords>,
    pub brain_seq: Option<i64>,
    pub brain_coords: Option<VoxelCoords>,
}

/// The outcome of [`Subject::plot_qflow`] for a complete subject.
#[derive(Debug, Clone, PartialEq)]
pub enum QflowPlot {
    /// The figure was written to this PNG file and released.
    Saved(PathBuf),
    /// The figure was not written anywhere and is handed to the caller.
    Open(Figure),
}

impl Subject {

    /// An empty subject, nothing set.
    pub fn new() -> Subject {
        Subject::default()
    }

    /// Start building a subject located in directory `path`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// let subject = qflow::Subject::builder("/path/to/subject1")
    ///     .set_heart(12, (64, 80))
    ///     .set_brain(15, (120, 96))
    ///     .build();
    /// subject.plot_qflow(Some(std::path::Path::new("/path/to/plots"))).unwrap();
    /// ```
    pub fn builder<P: Into<PathBuf>>(path: P) -> SubjectBuilder {
        let mut builder = SubjectBuilder::new();
        builder.set_path(path);
        builder
    }

    /// The subject name, i.e., the name of its directory.
    pub fn name(&self) -> Option<String> {
        self.path.as_ref().map(subject_name)
    }

    /// Names of the fields that are required for plotting but not set.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing: Vec<&'static str> = Vec::new();
        if self.path.is_none() { missing.push("path"); }
        if self.heart_seq.is_none() { missing.push("heart_seq"); }
        if self.heart_coords.is_none() { missing.push("heart_coords"); }
        if self.brain_seq.is_none() { missing.push("brain_seq"); }
        if self.brain_coords.is_none() { missing.push("brain_coords"); }
        missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Locate the heart and brain phase files, sample both at their voxel and melt the
    /// two time-series into a table.
    ///
    /// Returns `Ok(None)` without touching the filesystem if the subject is incomplete.
    ///
    /// # Errors
    ///
    /// * [`crate::QflowError::NoMatchingFile`] if a sequence has no phase file in the subject directory.
    /// * [`crate::QflowError::Io`] if the subject directory cannot be listed.
    /// * Any error from reading the volumes or sampling them.
    pub fn qflow_table(&self) -> Result<Option<QflowTable>> {
        let (Some(path), Some(heart_seq), Some(heart_coords), Some(brain_seq), Some(brain_coords)) =
            (&self.path, self.heart_seq, self.heart_coords, self.brain_seq, self.brain_coords)
        else {
            debug!("Subject {:?} is missing {:?}, nothing to do.", self.path, self.missing_fields());
            return Ok(None);
        };

        let heart_file = find_sequence_file(path, heart_seq, Area::Heart)?;
        let brain_file = find_sequence_file(path, brain_seq, Area::Brain)?;

        let heart = QflowVolume::from_file(&heart_file)?.time_series(heart_coords.0, heart_coords.1)?;
        let brain = QflowVolume::from_file(&brain_file)?.time_series(brain_coords.0, brain_coords.1)?;

        Ok(Some(QflowTable::from_series(&heart, &brain)?))
    }

    /// Plot the heart and brain qflow time-series of this subject side by side, see [`Subject::plot_qflow_with_style`].
    pub fn plot_qflow(&self, output: Option<&Path>) -> Result<Option<QflowPlot>> {
        self.plot_qflow_with_style(output, &PlotStyle::default())
    }

    /// Plot the heart and brain qflow time-series of this subject side by side.
    ///
    /// Does nothing and returns `Ok(None)` if any of the subject's fields is unset. Otherwise the figure,
    /// titled `"<subject name> qflow"`, is saved as `<subject name>.png` in `output` if given, or
    /// returned open if not.
    ///
    /// # Errors
    ///
    /// The errors of [`Subject::qflow_table`], plus failures to render or write the figure.
    pub fn plot_qflow_with_style(&self, output: Option<&Path>, style: &PlotStyle) -> Result<Option<QflowPlot>> {
        let table = match self.qflow_table()? {
            Some(table) => table,
            None => return Ok(None),
        };

        let name = self.name().unwrap_or_default();
        let figure = render_facets(&table, &format!("{} qflow", name), style)?;

        match output {
            Some(dir) => {
                let file = dir.join(format!("{}.png", name));
                figure.save(&file)?;
                info!("Saved qflow plot of subject '{}' to '{}'.", name, file.display());
                Ok(Some(QflowPlot::Saved(file)))
            }
            None => Ok(Some(QflowPlot::Open(figure))),
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "Subject at '{}'", path.display()),
            None => write!(f, "Subject without path"),
        }
    }
}


/// Incremental construction of a [`Subject`]. Completeness is not enforced.
#[derive(Debug, Clone, Default)]
pub struct SubjectBuilder {
    subject: Subject,
}

impl SubjectBuilder {

    /// A builder for a subject with nothing set, not even the path.
    pub fn new() -> SubjectBuilder {
        SubjectBuilder::default()
    }

    pub fn set_path<P: Into<PathBuf>>(&mut self, path: P) -> &mut SubjectBuilder {
        self.subject.path = Some(path.into());
        self
    }

    /// Set the heart sequence number and the voxel to sample in it.
    pub fn set_heart(&mut self, sequence: i64, coords: VoxelCoords) -> &mut SubjectBuilder {
        self.subject.heart_seq = Some(sequence);
        self.subject.heart_coords = Some(coords);
        self
    }

    /// Set the brain sequence number and the voxel to sample in it.
    pub fn set_brain(&mut self, sequence: i64, coords: VoxelCoords) -> &mut SubjectBuilder {
        self.subject.brain_seq = Some(sequence);
        self.subject.brain_coords = Some(coords);
        self
    }

    /// Get the subject. Prints a note to stdout if the path or a sequence is missing, but always returns the subject.
    pub fn build(&self) -> Subject {
        for line in self.warnings() {
            println!("{}", line);
        }
        self.subject.clone()
    }

    fn warnings(&self) -> Vec<String> {
        let mut lines: Vec<String> = Vec::new();
        if self.subject.path.is_none() {
            lines.push(String::from("Missing path for subject"));
        }
        if self.subject.heart_seq.is_none() || self.subject.brain_seq.is_none() {
            let path = match &self.subject.path {
                Some(path) => path.display().to_string(),
                None => String::from("None"),
            };
            lines.push(format!("Missing sequence for subject {}", path));
        }
        lines
    }
}
