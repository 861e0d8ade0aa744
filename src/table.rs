//! The long-form table of qflow samples, one row per (area, time point) pair.

use ndarray::Array1;

use std::fmt;

use crate::error::{QflowError, Result};

/// The anatomical region a qflow sequence was acquired for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Area {
    Heart,
    Brain,
}

impl Area {
    /// The category label used in tables and plot captions.
    pub fn label(&self) -> &'static str {
        match self {
            Area::Heart => "heart",
            Area::Brain => "brain",
        }
    }
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}


/// A single row of a [`QflowTable`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QflowSample {
    pub area: Area,
    pub value: f64,
}


/// Long-form table with an `area` and a `value` column.
///
/// Rows are grouped by area, heart rows first, and keep the time order of their series within each group.
#[derive(Debug, Clone, PartialEq)]
pub struct QflowTable {
    rows: Vec<QflowSample>,
}

impl QflowTable {

    /// Melt a heart and a brain time-series into a long-form table.
    ///
    /// # Errors
    ///
    /// [`QflowError::TimePointMismatch`] if the two series differ in length.
    pub fn from_series(heart: &Array1<f64>, brain: &Array1<f64>) -> Result<QflowTable> {
        if heart.len() != brain.len() {
            return Err(QflowError::TimePointMismatch(heart.len(), brain.len()));
        }

        let mut rows: Vec<QflowSample> = Vec::with_capacity(heart.len() + brain.len());
        for (area, series) in [(Area::Heart, heart), (Area::Brain, brain)] {
            rows.extend(series.iter().map(|&value| QflowSample { area, value }));
        }
        Ok(QflowTable { rows })
    }

    pub fn rows(&self) -> &[QflowSample] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The distinct areas in order of first appearance.
    pub fn areas(&self) -> Vec<Area> {
        let mut areas: Vec<Area> = Vec::new();
        for row in self.rows.iter() {
            if !areas.contains(&row.area) {
                areas.push(row.area);
            }
        }
        areas
    }

    /// The values of one area, in time order.
    pub fn series(&self, area: Area) -> Vec<f64> {
        self.rows
            .iter()
            .filter(|row| row.area == area)
            .map(|row| row.value)
            .collect()
    }
}

impl fmt::Display for QflowTable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "qflow table with {} samples for {} areas.", self.len(), self.areas().len())
    }
}
