use crate::group::GroupDataset;
use crate::options::PlotConfig;
use crate::recording::ViewType;
use crate::stats::GroupSummary;
use serde::{Deserialize, Serialize};

/// Opacity of the shaded confidence band.
pub const BAND_OPACITY: f32 = 0.3;

const PALETTE: [u32; 8] = [
    0x1F77B4, 0xFF7F0E, 0x2CA02C, 0xD62728, 0x9467BD, 0x8C564B, 0xE377C2, 0x17BECF,
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Axis {
    pub label: Option<String>,
    pub range: (f64, f64),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Style {
    pub width: f32,
    pub dash: Option<[f32; 2]>,
    pub color: Color,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color(pub u32);

impl Color {
    pub fn rgb(&self) -> (u8, u8, u8) {
        (
            ((self.0 >> 16) & 0xFF) as u8,
            ((self.0 >> 8) & 0xFF) as u8,
            (self.0 & 0xFF) as u8,
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineSeries {
    pub name: String,
    pub points: Vec<[f64; 2]>,
    pub style: Style,
}

/// Filled region between two curves sharing x values. Drawn without a border.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BandSeries {
    pub name: String,
    pub lower: Vec<[f64; 2]>,
    pub upper: Vec<[f64; 2]>,
    pub color: Color,
    pub opacity: f32,
}

impl BandSeries {
    /// Closed outline: upper edge left to right, lower edge back.
    pub fn outline(&self) -> Vec<[f64; 2]> {
        self.upper
            .iter()
            .chain(self.lower.iter().rev())
            .copied()
            .collect()
    }
}

/// Vertical line at `x` from `y_from` to `y_to`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkerLine {
    pub x: f64,
    pub y_from: f64,
    pub y_to: f64,
    pub style: Style,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Series {
    Line(LineSeries),
    Band(BandSeries),
    Marker(MarkerLine),
}

/// Backend-independent description of one chart. Series are drawn in order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Figure {
    pub title: Option<String>,
    pub x: Axis,
    pub y: Axis,
    pub series: Vec<Series>,
}

impl Figure {
    pub fn new(title: impl Into<Option<String>>) -> Self {
        Self {
            title: title.into(),
            x: Axis {
                label: None,
                range: (0.0, 1.0),
            },
            y: Axis {
                label: None,
                range: (0.0, 1.0),
            },
            series: Vec::new(),
        }
    }

    pub fn add_series(&mut self, series: Series) {
        self.series.push(series);
    }
}

pub trait PlotBackend {
    fn draw(&mut self, fig: &Figure) -> anyhow::Result<()>;
}

/// `"<view> (<selection>) - average of n = <participants>"`.
pub fn group_title(config: &PlotConfig, participants: usize) -> String {
    let view = match config.view {
        ViewType::Data => "Electrode",
        ViewType::Roi => "Region of interest",
        ViewType::Gmfa => "GMFA",
    };
    format!(
        "{view} ({}) - average of n = {participants}",
        config.selection()
    )
}

fn y_label(view: ViewType) -> &'static str {
    match view {
        ViewType::Gmfa => "GMFA",
        ViewType::Data | ViewType::Roi => "Amplitude (µV)",
    }
}

/// Pad a data range by 10%, or by 0.5 when it is flat.
fn padded_range(min: f64, max: f64) -> (f64, f64) {
    if !min.is_finite() || !max.is_finite() {
        return (-1.0, 1.0);
    }
    let span = max - min;
    let pad = if span.abs() < 1e-9 { 0.5 } else { span * 0.1 };
    (min - pad, max + pad)
}

/// Lay out the mean traces, CI band and stimulus marker for one group.
pub fn figure_from_group(
    group: &GroupDataset,
    summary: &GroupSummary,
    config: &PlotConfig,
) -> Figure {
    let mut fig = Figure::new(Some(group_title(config, group.participants())));
    fig.x = Axis {
        label: Some("Time (ms)".into()),
        range: config.xlim,
    };

    let (x_min, x_max) = config.xlim;
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    let mut visible = |t: f64, value: f64| {
        if t >= x_min && t <= x_max && value.is_finite() {
            lo = lo.min(value);
            hi = hi.max(value);
        }
    };

    if let Some(half_width) = &summary.ci_half_width {
        let rows = summary.mean.rows().into_iter().zip(half_width.rows());
        for (row, (mean, hw)) in rows.enumerate() {
            let lower: Vec<[f64; 2]> = group
                .times
                .iter()
                .zip(mean.iter().zip(hw.iter()))
                .map(|(t, (m, h))| [*t, m - h])
                .collect();
            let upper: Vec<[f64; 2]> = group
                .times
                .iter()
                .zip(mean.iter().zip(hw.iter()))
                .map(|(t, (m, h))| [*t, m + h])
                .collect();
            for p in lower.iter().chain(upper.iter()) {
                visible(p[0], p[1]);
            }
            fig.add_series(Series::Band(BandSeries {
                name: format!("{} 95% CI", label_for(group, row)),
                lower,
                upper,
                color: Color(PALETTE[row % PALETTE.len()]),
                opacity: BAND_OPACITY,
            }));
        }
    }

    for (row, mean) in summary.mean.rows().into_iter().enumerate() {
        let points: Vec<[f64; 2]> = group
            .times
            .iter()
            .zip(mean.iter())
            .map(|(t, value)| [*t, *value])
            .collect();
        for p in &points {
            visible(p[0], p[1]);
        }
        fig.add_series(Series::Line(LineSeries {
            name: label_for(group, row),
            points,
            style: Style {
                width: if config.is_butterfly() { 1.0 } else { 2.0 },
                dash: None,
                color: Color(PALETTE[row % PALETTE.len()]),
            },
        }));
    }

    let y_range = config.ylim.unwrap_or_else(|| padded_range(lo, hi));
    fig.y = Axis {
        label: Some(y_label(config.view).into()),
        range: y_range,
    };
    fig.add_series(Series::Marker(MarkerLine {
        x: 0.0,
        y_from: y_range.0,
        y_to: y_range.1,
        style: Style {
            width: 1.0,
            dash: Some([6.0, 4.0]),
            color: Color(0x000000),
        },
    }));
    fig
}

fn label_for(group: &GroupDataset, row: usize) -> String {
    group
        .rows
        .get(row)
        .cloned()
        .unwrap_or_else(|| format!("row {}", row + 1))
}
