//! Functions for loading qflow phase volumes from NIfTI files and sampling voxel time-series.


use log::info;
use ndarray::{s, Array1, Array4, ArrayD, Axis, Ix4};
use nifti::{IntoNdArray, NiftiObject, ReaderOptions};

use std::fmt;
use std::path::Path;

use crate::error::{QflowError, Result};
use crate::util::is_gz_file;

/// A 4-D phase volume with axes (x, y, z, t).
///
/// Volumes with more than 4 dimensions are reduced to their first entry along every trailing axis.
#[derive(Debug, Clone, PartialEq)]
pub struct QflowVolume {
    pub data: Array4<f64>,
}

impl QflowVolume {

    /// Read a volume from a NIfTI file. Files ending with ".gz" are decompressed.
    /// Intensity scaling from the header is applied to the values.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<QflowVolume> {
        let path = path.as_ref();
        let obj = ReaderOptions::new().read_file(path)?;
        let data: ArrayD<f64> = obj.into_volume().into_ndarray::<f64>()?;
        let vol = QflowVolume::from_array(data)?;
        let kind = if is_gz_file(path) { "compressed" } else { "uncompressed" };
        info!("Loaded {} volume '{}' with shape {:?}.", kind, path.display(), vol.data.shape());
        Ok(vol)
    }

    /// Wrap an array of at least 4 dimensions.
    pub fn from_array(data: ArrayD<f64>) -> Result<QflowVolume> {
        let shape = data.shape().to_vec();
        if shape.len() < 4 || shape[4..].iter().any(|&len| len == 0) {
            return Err(QflowError::InvalidVolumeShape(shape));
        }

        let mut data = data;
        while data.ndim() > 4 {
            let last = data.ndim() - 1;
            data = data.index_axis_move(Axis(last), 0);
        }

        Ok(QflowVolume { data: data.into_dimensionality::<Ix4>()? })
    }

    /// The spatial extent (x, y, z) of the volume.
    pub fn spatial_shape(&self) -> [usize; 3] {
        let (nx, ny, nz, _) = self.data.dim();
        [nx, ny, nz]
    }

    pub fn num_time_points(&self) -> usize {
        self.data.len_of(Axis(3))
    }

    /// Get the time-series of the voxel at (`row`, `col`) in the first slice, i.e., with z fixed at 0.
    ///
    /// # Errors
    ///
    /// [`QflowError::VoxelOutOfBounds`] if the voxel is not part of the volume.
    pub fn time_series(&self, row: usize, col: usize) -> Result<Array1<f64>> {
        let [nx, ny, nz] = self.spatial_shape();
        if row >= nx || col >= ny || nz == 0 {
            return Err(QflowError::VoxelOutOfBounds(row, col, vec![nx, ny, nz]));
        }
        Ok(self.data.slice(s![row, col, 0, ..]).to_owned())
    }
}

impl fmt::Display for QflowVolume {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let [nx, ny, nz] = self.spatial_shape();
        write!(f, "Volume of {}x{}x{} voxels with {} time points.", nx, ny, nz, self.num_time_points())
    }
}


/// Read a qflow phase volume from a NIfTI file.
///
/// # Examples
///
/// ```no_run
/// let vol = qflow::read_qflow_volume("/path/to/subject1/s12_qflow_ph.nii.gz").unwrap();
/// let series = vol.time_series(64, 80).unwrap();
/// println!("Sampled {} time points.", series.len());
/// ```
pub fn read_qflow_volume<P: AsRef<Path>>(path: P) -> Result<QflowVolume> {
    QflowVolume::from_file(path)
}


#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{Array, IxDyn};
    use nifti::writer::WriterOptions;
    use tempfile::tempdir;

    fn demo_value(x: usize, y: usize, z: usize, t: usize) -> f32 {
        (1000 * z + 100 * x + 10 * y) as f32 + 0.5 * t as f32
    }

    #[test]
    fn the_time_series_is_taken_from_the_first_slice() {
        let data = Array::from_shape_fn(IxDyn(&[4, 3, 2, 5]), |ix| demo_value(ix[0], ix[1], ix[2], ix[3]) as f64);
        let vol = QflowVolume::from_array(data).unwrap();

        assert_eq!([4, 3, 2], vol.spatial_shape());
        assert_eq!(5, vol.num_time_points());

        let series = vol.time_series(2, 1).unwrap();
        assert_eq!(5, series.len());
        assert_abs_diff_eq!(210.0, series[0]);
        assert_abs_diff_eq!(212.0, series[4]);
    }

    #[test]
    fn voxels_outside_the_volume_are_rejected() {
        let vol = QflowVolume::from_array(ArrayD::zeros(IxDyn(&[4, 3, 2, 5]))).unwrap();
        assert!(matches!(vol.time_series(4, 0), Err(QflowError::VoxelOutOfBounds(4, 0, _))));
        assert!(matches!(vol.time_series(0, 3), Err(QflowError::VoxelOutOfBounds(0, 3, _))));
    }

    #[test]
    fn volumes_with_less_than_four_dimensions_are_rejected() {
        let err = QflowVolume::from_array(ArrayD::zeros(IxDyn(&[4, 3, 2]))).unwrap_err();
        assert!(matches!(err, QflowError::InvalidVolumeShape(_)));
    }

    #[test]
    fn trailing_dimensions_are_fixed_at_zero() {
        let data = Array::from_shape_fn(IxDyn(&[2, 2, 1, 3, 2]), |ix| (ix[3] + 10 * ix[4]) as f64);
        let vol = QflowVolume::from_array(data).unwrap();
        assert_eq!(3, vol.num_time_points());
        assert_eq!(vec![0.0, 1.0, 2.0], vol.time_series(1, 1).unwrap().to_vec());
    }

    #[test]
    fn a_compressed_nifti_file_can_be_read() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("s12_qflow_ph.nii.gz");
        let data = Array::from_shape_fn((4, 3, 2, 6), |(x, y, z, t)| demo_value(x, y, z, t));
        WriterOptions::new(&file).write_nifti(&data).unwrap();

        let vol = read_qflow_volume(&file).unwrap();
        assert_eq!([4, 3, 2], vol.spatial_shape());
        assert_eq!(6, vol.num_time_points());

        let series = vol.time_series(3, 2).unwrap();
        for (t, value) in series.iter().enumerate() {
            assert_abs_diff_eq!(demo_value(3, 2, 0, t) as f64, *value, epsilon = 1e-6);
        }
    }

    #[test]
    fn a_missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(read_qflow_volume(dir.path().join("nope.nii.gz")).is_err());
    }
}
