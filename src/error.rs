use quick_error::quick_error;
use std::io::Error as IOError;
use std::path::PathBuf;

use plotters::drawing::DrawingAreaErrorKind;

use crate::table::Area;

quick_error! {
    /// Error type for all error variants originated by this crate.
    #[derive(Debug)]
    pub enum QflowError {
        /// No entry of the subject directory matches the sequence file pattern.
        NoMatchingFile(area: Area, sequence: i64, dir: PathBuf) {
            display("No match found for {} sequence {} in '{}'", area, sequence, dir.display())
        }

        /// The volume has fewer than 4 dimensions, or an empty trailing dimension.
        InvalidVolumeShape(shape: Vec<usize>) {
            display("Expected a volume with at least 4 dimensions (x, y, z, t), got shape {:?}", shape)
        }

        VoxelOutOfBounds(row: usize, col: usize, shape: Vec<usize>) {
            display("Voxel ({}, {}, 0) is outside of volume with spatial shape {:?}", row, col, shape)
        }

        /// Heart and brain series differ in length.
        TimePointMismatch(heart: usize, brain: usize) {
            display("Heart series has {} time points, brain series has {}", heart, brain)
        }

        Plot(msg: String) {
            display("Failed to render plot: {}", msg)
        }

        Shape(err: ndarray::ShapeError) {
            from()
            source(err)
            display("Invalid array shape: {}", err)
        }

        Nifti(err: nifti::NiftiError) {
            from()
            source(err)
            display("NIfTI error: {}", err)
        }

        Image(err: image::ImageError) {
            from()
            source(err)
            display("Image encoding error: {}", err)
        }

        /// I/O Error
        Io(err: IOError) {
            from()
            source(err)
            display("I/O error: {}", err)
        }
    }
}

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for QflowError {
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        QflowError::Plot(format!("{:?}", err))
    }
}

/// Alias type for results originated from this crate.
pub type Result<T> = ::std::result::Result<T, QflowError>;
