//! Locate, sample and plot phase-contrast ("qflow") MRI acquisitions of an imaging subject.
//!
//! A [`Subject`] names a directory with NIfTI phase images, one heart and one brain sequence number,
//! and the voxel to sample in each of them. [`Subject::plot_qflow`] draws both voxel time-series
//! side by side.

pub mod error;
pub mod plot;
pub mod subject;
pub mod table;
pub mod util;
pub mod volume;

pub use error::{QflowError, Result};
pub use plot::{render_facets, Figure, PlotStyle};
pub use subject::{QflowPlot, Subject, SubjectBuilder, VoxelCoords};
pub use table::{Area, QflowSample, QflowTable};
pub use util::{find_sequence_file, is_gz_file, matches_sequence_pattern};
pub use volume::{read_qflow_volume, QflowVolume};
