use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Upstream-derived time series (one ROI or GMFA instance).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DerivedSeries {
    /// Time axis in milliseconds
    pub times: Vec<f64>,
    /// One value per time sample
    pub summary: Vec<f64>,
}

/// Which slice of a recording is averaged across the group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewType {
    #[serde(rename = "data")]
    Data,
    #[serde(rename = "ROI")]
    Roi,
    #[serde(rename = "GMFA")]
    Gmfa,
}

impl ViewType {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "data" => Some(Self::Data),
            "roi" => Some(Self::Roi),
            "gmfa" => Some(Self::Gmfa),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Data => "data",
            Self::Roi => "ROI",
            Self::Gmfa => "GMFA",
        }
    }
}

impl std::fmt::Display for ViewType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One participant's processed session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recording {
    /// Time axis in milliseconds, shared by every channel
    pub times: Vec<f64>,
    /// Channel labels, one per row of `data`
    pub labels: Vec<String>,
    /// channel -> sample -> trial
    pub data: Vec<Vec<Vec<f64>>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub roi: BTreeMap<String, DerivedSeries>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub gmfa: BTreeMap<String, DerivedSeries>,
}

impl Recording {
    pub fn channel_count(&self) -> usize {
        self.data.len()
    }

    pub fn sample_count(&self) -> usize {
        self.times.len()
    }

    pub fn trial_count(&self) -> usize {
        self.data
            .first()
            .and_then(|channel| channel.first())
            .map(|sample| sample.len())
            .unwrap_or(0)
    }

    /// First and last time stamp, `None` for an empty recording.
    pub fn time_range(&self) -> Option<(f64, f64)> {
        Some((*self.times.first()?, *self.times.last()?))
    }

    /// Case-insensitive exact match against the channel labels.
    pub fn channel_index(&self, electrode: &str) -> Option<usize> {
        self.labels
            .iter()
            .position(|label| label.eq_ignore_ascii_case(electrode))
    }

    /// Named ROI/GMFA instances, `None` for the raw data view.
    pub fn derived(&self, view: ViewType) -> Option<&BTreeMap<String, DerivedSeries>> {
        match view {
            ViewType::Data => None,
            ViewType::Roi => Some(&self.roi),
            ViewType::Gmfa => Some(&self.gmfa),
        }
    }

    /// Trial-averaged trace of one channel, `None` when any sample has no trials.
    pub fn trial_mean(&self, channel: usize) -> Option<Vec<f64>> {
        self.data
            .get(channel)?
            .iter()
            .map(|trials| {
                (!trials.is_empty()).then(|| trials.iter().sum::<f64>() / trials.len() as f64)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Recording {
        Recording {
            times: vec![-10.0, 0.0, 10.0],
            labels: vec!["Fz".into(), "Cz".into()],
            data: vec![
                vec![vec![1.0, 3.0], vec![2.0, 4.0], vec![0.0, 0.0]],
                vec![vec![5.0, 5.0], vec![6.0, 8.0], vec![-1.0, 1.0]],
            ],
            roi: BTreeMap::new(),
            gmfa: BTreeMap::new(),
        }
    }

    #[test]
    fn averages_trials_per_sample() {
        let rec = sample();
        assert_eq!(rec.trial_mean(0), Some(vec![2.0, 3.0, 0.0]));
        assert_eq!(rec.trial_mean(1), Some(vec![5.0, 7.0, 0.0]));
        assert_eq!(rec.trial_mean(2), None);
        assert_eq!(rec.trial_count(), 2);
    }

    #[test]
    fn trial_mean_needs_trials_at_every_sample() {
        let mut rec = sample();
        rec.data[1][2].clear();
        assert_eq!(rec.trial_mean(1), None);
        assert!(rec.trial_mean(0).is_some());
    }

    #[test]
    fn electrode_lookup_ignores_case() {
        let rec = sample();
        assert_eq!(rec.channel_index("cz"), Some(1));
        assert_eq!(rec.channel_index("CZ"), Some(1));
        assert_eq!(rec.channel_index("C"), None);
    }

    #[test]
    fn view_type_parses_case_insensitively() {
        assert_eq!(ViewType::parse("roi"), Some(ViewType::Roi));
        assert_eq!(ViewType::parse("GMFA"), Some(ViewType::Gmfa));
        assert_eq!(ViewType::parse("Data"), Some(ViewType::Data));
        assert_eq!(ViewType::parse("erp"), None);
    }
}
