use crate::error::{PlotError, Result};
use crate::io::{GroupSource, RecordingStore};
use crate::options::PlotConfig;
use crate::recording::{Recording, ViewType};
use ndarray::{Array2, Array3, Axis};
use std::path::{Path, PathBuf};

/// Largest per-sample difference (ms) tolerated between participant time axes.
const TIME_AXIS_TOLERANCE_MS: f64 = 1e-6;

/// Extracted views of every participant, stacked as (row, sample, participant).
#[derive(Debug, Clone)]
pub struct GroupDataset {
    pub data: Array3<f64>,
    pub times: Vec<f64>,
    /// Channel labels, electrode label or instance name, one per row
    pub rows: Vec<String>,
    pub files: Vec<PathBuf>,
}

impl GroupDataset {
    pub fn participants(&self) -> usize {
        self.data.len_of(Axis(2))
    }
}

/// Load every participant in `source` and extract the view `config` selects.
pub fn load_group(
    config: &PlotConfig,
    store: &dyn RecordingStore,
    source: &GroupSource,
) -> Result<GroupDataset> {
    if source.is_empty() {
        return Err(PlotError::EmptyGroup {
            dir: source.dir.clone(),
        });
    }
    let mut slices: Vec<Array2<f64>> = Vec::with_capacity(source.len());
    let mut rows = Vec::new();
    let mut reference: Option<(PathBuf, usize)> = None;
    let mut first_times: Option<Vec<f64>> = None;
    let mut times = Vec::new();

    for path in &source.paths {
        let recording = store.open(path).map_err(|reason| PlotError::Io {
            path: path.clone(),
            reason,
        })?;
        let (slice, slice_rows, slice_times) = extract(config, &recording, path)?;

        if config.is_butterfly() {
            match &reference {
                None => reference = Some((path.clone(), slice.nrows())),
                Some((_, expected)) if *expected != slice.nrows() => {
                    return Err(PlotError::ChannelCountMismatch {
                        path: path.clone(),
                        expected: *expected,
                        actual: slice.nrows(),
                    })
                }
                Some(_) => {}
            }
        }
        match &first_times {
            None => first_times = Some(slice_times.clone()),
            Some(expected) if !same_axis(expected, &slice_times) => {
                return Err(PlotError::TimeAxisMismatch { path: path.clone() })
            }
            Some(_) => {}
        }
        log::debug!(
            "loaded {} ({} rows x {} samples)",
            path.display(),
            slice.nrows(),
            slice.ncols()
        );
        rows = slice_rows;
        times = slice_times;
        slices.push(slice);
    }

    let (n_rows, n_samples) = slices[0].dim();
    let mut data = Array3::<f64>::zeros((n_rows, n_samples, slices.len()));
    for (idx, slice) in slices.iter().enumerate() {
        data.index_axis_mut(Axis(2), idx).assign(slice);
    }
    Ok(GroupDataset {
        data,
        times,
        rows,
        files: source.paths.clone(),
    })
}

fn same_axis(a: &[f64], b: &[f64]) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .zip(b)
            .all(|(x, y)| (x - y).abs() <= TIME_AXIS_TOLERANCE_MS)
}

type Extracted = (Array2<f64>, Vec<String>, Vec<f64>);

fn extract(config: &PlotConfig, recording: &Recording, path: &Path) -> Result<Extracted> {
    let malformed = |reason: String| PlotError::Malformed {
        path: path.to_path_buf(),
        reason,
    };
    match config.view {
        ViewType::Data => {
            let n_samples = recording.sample_count();
            if recording
                .data
                .iter()
                .any(|channel| channel.len() != n_samples)
            {
                return Err(malformed(format!(
                    "channel data does not match the {n_samples}-sample time axis"
                )));
            }
            let channels: Vec<usize> = match &config.electrode {
                Some(electrode) => {
                    let idx = recording.channel_index(electrode).ok_or_else(|| {
                        PlotError::ElectrodeNotFound {
                            electrode: electrode.clone(),
                            path: path.to_path_buf(),
                        }
                    })?;
                    vec![idx]
                }
                None => (0..recording.channel_count()).collect(),
            };
            let mut slice = Array2::<f64>::zeros((channels.len(), n_samples));
            let mut labels = Vec::with_capacity(channels.len());
            for (row, &channel) in channels.iter().enumerate() {
                let mean = recording
                    .trial_mean(channel)
                    .ok_or_else(|| malformed(format!("channel {channel} has no trials")))?;
                slice.row_mut(row).assign(&ndarray::Array1::from(mean));
                labels.push(
                    recording
                        .labels
                        .get(channel)
                        .cloned()
                        .unwrap_or_else(|| format!("ch{}", channel + 1)),
                );
            }
            Ok((slice, labels, recording.times.clone()))
        }
        ViewType::Roi | ViewType::Gmfa => {
            let view = config.view.as_str();
            let name = config.name.as_deref().unwrap_or_default();
            let instances = recording
                .derived(config.view)
                .filter(|instances| !instances.is_empty())
                .ok_or_else(|| PlotError::missing(view, Some(path)))?;
            let series = instances
                .get(name)
                .ok_or_else(|| PlotError::not_found(view, name, Some(path)))?;
            if series.summary.len() != series.times.len() {
                return Err(malformed(format!(
                    "{view} '{name}' has {} values for {} time samples",
                    series.summary.len(),
                    series.times.len()
                )));
            }
            let slice = Array2::from_shape_vec((1, series.summary.len()), series.summary.clone())
                .map_err(|err| malformed(err.to_string()))?;
            Ok((slice, vec![name.to_string()], series.times.clone()))
        }
    }
}
