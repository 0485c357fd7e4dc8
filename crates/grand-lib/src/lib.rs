pub mod error;
pub mod group;
pub mod io;
pub mod options;
pub mod plot;
pub mod recording;
pub mod stats;

pub use error::{PlotError, Result};
pub use group::{load_group, GroupDataset};
pub use io::{GroupSource, JsonStore, MemoryStore, RecordingStore};
pub use options::{resolve, OptionValue, PlotConfig};
pub use plot::{figure_from_group, Figure, PlotBackend};
pub use recording::{DerivedSeries, Recording, ViewType};
pub use stats::{summarize, GroupSummary};

use serde::Serialize;
use std::path::{Path, PathBuf};

/// What one invocation drew.
#[derive(Debug, Clone, Serialize)]
pub struct GroupPlot {
    pub config: PlotConfig,
    pub participants: usize,
    pub files: Vec<PathBuf>,
    pub figure: Figure,
}

/// Resolve options against `base`, average the group and draw it on `backend`.
///
/// `source` defaults to every recording in the base recording's directory.
pub fn plot_group_average(
    base: &Path,
    overrides: &[OptionValue],
    store: &dyn RecordingStore,
    source: Option<GroupSource>,
    backend: &mut dyn PlotBackend,
) -> Result<GroupPlot> {
    let recording = store.open(base).map_err(|reason| PlotError::Io {
        path: base.to_path_buf(),
        reason,
    })?;
    if recording.times.is_empty() {
        return Err(PlotError::Malformed {
            path: base.to_path_buf(),
            reason: "empty time axis".into(),
        });
    }
    let config = resolve(&recording, overrides)?;
    let source = match source {
        Some(source) => source,
        None => GroupSource::discover(base).map_err(|reason| PlotError::Io {
            path: base.to_path_buf(),
            reason,
        })?,
    };
    let group = load_group(&config, store, &source)?;
    let summary = summarize(&group, config.ci);
    let fig = figure_from_group(&group, &summary, &config);
    backend.draw(&fig).map_err(PlotError::Render)?;
    log::info!(
        "plotted {} ({}) averaged over {} participants",
        config.view,
        config.selection(),
        group.participants()
    );
    Ok(GroupPlot {
        config,
        participants: group.participants(),
        files: group.files,
        figure: fig,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plot::Series;
    use std::collections::BTreeMap;

    #[derive(Default)]
    struct CapturingBackend {
        drawn: Vec<Figure>,
    }

    impl PlotBackend for CapturingBackend {
        fn draw(&mut self, fig: &Figure) -> anyhow::Result<()> {
            self.drawn.push(fig.clone());
            Ok(())
        }
    }

    fn participant(scale: f64) -> Recording {
        let times = vec![-500.0, 0.0, 400.0, 800.0];
        let series = |offset: f64| DerivedSeries {
            times: times.clone(),
            summary: times.iter().map(|t| offset + scale * t / 100.0).collect(),
        };
        let mut roi = BTreeMap::new();
        roi.insert("R1".to_string(), series(0.0));
        roi.insert("R2".to_string(), series(1.0));
        let mut gmfa = BTreeMap::new();
        gmfa.insert("all".to_string(), series(2.0));
        Recording {
            data: vec![times
                .iter()
                .map(|t| vec![scale * t, scale * t])
                .collect::<Vec<_>>()],
            times,
            labels: vec!["Cz".into()],
            roi,
            gmfa,
        }
    }

    fn group(scales: &[f64]) -> (MemoryStore, GroupSource) {
        let mut store = MemoryStore::new();
        let paths: Vec<PathBuf> = scales
            .iter()
            .enumerate()
            .map(|(idx, scale)| {
                let path = PathBuf::from(format!("study/sub-{:02}.erp", idx + 1));
                store.insert(path.clone(), participant(*scale));
                path
            })
            .collect();
        (store, GroupSource::from_paths("study", paths))
    }

    fn kv(pairs: &[(&str, OptionValue)]) -> Vec<OptionValue> {
        pairs
            .iter()
            .flat_map(|(k, v)| [OptionValue::from(*k), v.clone()])
            .collect()
    }

    #[test]
    fn roi_scenario_needs_name_then_titles_it() {
        let (store, source) = group(&[1.0, 2.0, 3.0]);
        let base = source.paths[0].clone();
        let mut backend = CapturingBackend::default();

        let err = plot_group_average(
            &base,
            &kv(&[("type", "ROI".into())]),
            &store,
            Some(source.clone()),
            &mut backend,
        )
        .unwrap_err();
        assert!(matches!(err, PlotError::Ambiguous { .. }));
        assert!(backend.drawn.is_empty());

        let fig = plot_group_average(
            &base,
            &kv(&[("type", "ROI".into()), ("name", "R2".into())]),
            &store,
            Some(source),
            &mut backend,
        )
        .unwrap()
        .figure;
        assert_eq!(
            fig.title.as_deref(),
            Some("Region of interest (R2) - average of n = 3")
        );
        assert_eq!(backend.drawn.len(), 1);
    }

    #[test]
    fn identical_group_reproduces_single_trace() {
        let (store, source) = group(&[1.5, 1.5, 1.5, 1.5]);
        let base = source.paths[0].clone();
        let mut backend = CapturingBackend::default();
        let fig = plot_group_average(
            &base,
            &kv(&[("type", "GMFA".into()), ("ci", "on".into())]),
            &store,
            Some(source),
            &mut backend,
        )
        .unwrap()
        .figure;
        let single = participant(1.5).gmfa["all"].summary.clone();
        for series in &fig.series {
            match series {
                Series::Line(line) => {
                    let ys: Vec<f64> = line.points.iter().map(|p| p[1]).collect();
                    assert_eq!(ys, single);
                }
                Series::Band(band) => {
                    for (lower, upper) in band.lower.iter().zip(&band.upper) {
                        assert_eq!(lower[1], upper[1]);
                    }
                }
                Series::Marker(_) => {}
            }
        }
    }

    #[test]
    fn xlim_is_clipped_as_requested() {
        let (store, source) = group(&[1.0, 2.0]);
        let base = source.paths[0].clone();
        let mut backend = CapturingBackend::default();
        let fig = plot_group_average(
            &base,
            &kv(&[("xlim", [-100.0, 500.0].into()), ("electrode", "cz".into())]),
            &store,
            Some(source),
            &mut backend,
        )
        .unwrap();
        assert_eq!(fig.participants, 2);
        let fig = fig.figure;
        assert_eq!(fig.x.range, (-100.0, 500.0));
        assert_eq!(fig.title.as_deref(), Some("Electrode (cz) - average of n = 2"));
    }

    #[test]
    fn validation_runs_before_loading() {
        let (store, _) = group(&[1.0]);
        // a source full of missing files is never touched when validation fails
        let source = GroupSource::from_paths("study", vec![PathBuf::from("study/ghost.erp")]);
        let mut backend = CapturingBackend::default();
        let err = plot_group_average(
            Path::new("study/sub-01.erp"),
            &kv(&[("xlim", [-1000.0, 500.0].into())]),
            &store,
            Some(source),
            &mut backend,
        )
        .unwrap_err();
        assert!(matches!(err, PlotError::OutOfRange { .. }));
    }

    #[test]
    fn empty_base_time_axis_names_the_file() {
        let mut store = MemoryStore::new();
        let mut empty = participant(1.0);
        empty.times.clear();
        store.insert("study/sub-01.erp", empty);
        let mut backend = CapturingBackend::default();
        let err = plot_group_average(
            Path::new("study/sub-01.erp"),
            &[],
            &store,
            Some(GroupSource::from_paths("study", Vec::new())),
            &mut backend,
        )
        .unwrap_err();
        assert!(matches!(err, PlotError::Malformed { .. }));
        assert_eq!(err.to_string(), "study/sub-01.erp: empty time axis");
    }
}
