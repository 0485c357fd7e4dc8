use crate::error::{PlotError, Result};
use crate::recording::{Recording, ViewType};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One element of the flat `key, value, key, value, ...` override list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Numbers(Vec<f64>),
    Text(String),
}

impl OptionValue {
    /// Comma-separated numbers become `Numbers`, anything else stays text.
    pub fn parse(raw: &str) -> Self {
        let parts: Option<Vec<f64>> = raw
            .split(',')
            .map(|part| part.trim().parse::<f64>().ok())
            .collect();
        match parts {
            Some(values) if raw.contains(',') => Self::Numbers(values),
            _ => Self::Text(raw.to_string()),
        }
    }

    /// Parse a raw `key value key value ...` list. Only `xlim`/`ylim` values are read as
    /// numbers, so names such as `1,2` stay text.
    pub fn parse_pairs<S: AsRef<str>>(raw: &[S]) -> Vec<Self> {
        let mut out = Vec::with_capacity(raw.len());
        for (idx, item) in raw.iter().enumerate() {
            let item = item.as_ref();
            let is_bounds = idx % 2 == 1
                && matches!(
                    raw[idx - 1].as_ref().to_ascii_lowercase().as_str(),
                    "xlim" | "ylim"
                );
            out.push(if is_bounds {
                Self::parse(item)
            } else {
                Self::Text(item.to_string())
            });
        }
        out
    }

    fn as_text(&self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text.clone()),
            Self::Numbers(values) if values.len() == 1 => Some(values[0].to_string()),
            Self::Numbers(_) => None,
        }
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<[f64; 2]> for OptionValue {
    fn from(value: [f64; 2]) -> Self {
        Self::Numbers(value.to_vec())
    }
}

impl From<Vec<f64>> for OptionValue {
    fn from(value: Vec<f64>) -> Self {
        Self::Numbers(value)
    }
}

/// Validated plotting options. Never mutated after `resolve`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotConfig {
    pub xlim: (f64, f64),
    pub ylim: Option<(f64, f64)>,
    pub electrode: Option<String>,
    pub ci: bool,
    pub view: ViewType,
    pub name: Option<String>,
}

impl PlotConfig {
    /// Butterfly mode: every electrode overlaid.
    pub fn is_butterfly(&self) -> bool {
        self.view == ViewType::Data && self.electrode.is_none()
    }

    /// Electrode, instance name or "all electrodes".
    pub fn selection(&self) -> &str {
        match self.view {
            ViewType::Data => self.electrode.as_deref().unwrap_or("all electrodes"),
            ViewType::Roi | ViewType::Gmfa => self.name.as_deref().unwrap_or_default(),
        }
    }
}

#[derive(Default)]
struct RawOptions {
    xlim: Option<OptionValue>,
    ylim: Option<OptionValue>,
    electrode: Option<OptionValue>,
    ci: Option<OptionValue>,
    view: Option<OptionValue>,
    name: Option<OptionValue>,
}

impl RawOptions {
    fn collect(args: &[OptionValue]) -> Result<Self> {
        if args.len() % 2 != 0 {
            return Err(PlotError::ArgumentShape(
                "key/value pairs required: odd number of option arguments".into(),
            ));
        }
        let mut raw = Self::default();
        for pair in args.chunks(2) {
            let key = match &pair[0] {
                OptionValue::Text(key) => key,
                other => {
                    return Err(PlotError::ArgumentShape(format!(
                        "option keys must be text, got {other:?}"
                    )))
                }
            };
            let value = Some(pair[1].clone());
            match key.to_ascii_lowercase().as_str() {
                "xlim" => raw.xlim = value,
                "ylim" => raw.ylim = value,
                "electrode" => raw.electrode = value,
                "ci" => raw.ci = value,
                "type" => raw.view = value,
                "name" => raw.name = value,
                _ => return Err(PlotError::UnknownOption(key.clone())),
            }
        }
        Ok(raw)
    }
}

fn bounds(key: &str, value: &OptionValue) -> Result<(f64, f64)> {
    let shape_error = || PlotError::ArgumentShape(format!("{key} must be a [min, max] pair"));
    match value {
        OptionValue::Numbers(values) if values.len() == 2 => {
            let (min, max) = (values[0], values[1]);
            if !min.is_finite() || !max.is_finite() || min >= max {
                return Err(PlotError::ArgumentShape(format!(
                    "{key} must satisfy min < max, got [{min}, {max}]"
                )));
            }
            Ok((min, max))
        }
        _ => Err(shape_error()),
    }
}

fn text(key: &'static str, value: &OptionValue, expected: &'static str) -> Result<String> {
    value.as_text().ok_or_else(|| PlotError::InvalidValue {
        key,
        value: format!("{value:?}"),
        expected,
    })
}

/// Merge `args` over the defaults and validate against the base recording.
pub fn resolve(base: &Recording, args: &[OptionValue]) -> Result<PlotConfig> {
    let raw = RawOptions::collect(args)?;
    let (lo, hi) = base.time_range().ok_or_else(|| PlotError::Malformed {
        path: PathBuf::from("base recording"),
        reason: "empty time axis".into(),
    })?;

    let xlim = match &raw.xlim {
        Some(value) => {
            let (min, max) = bounds("xlim", value)?;
            if min < lo || max > hi {
                return Err(PlotError::OutOfRange { min, max, lo, hi });
            }
            (min, max)
        }
        None => (lo, hi),
    };
    let ylim = raw
        .ylim
        .as_ref()
        .map(|value| bounds("ylim", value))
        .transpose()?;

    let ci = match &raw.ci {
        Some(value) => {
            let flag = text("ci", value, "'on' or 'off'")?;
            match flag.to_ascii_lowercase().as_str() {
                "on" => true,
                "off" => false,
                _ => {
                    return Err(PlotError::InvalidValue {
                        key: "ci",
                        value: flag,
                        expected: "'on' or 'off'",
                    })
                }
            }
        }
        None => false,
    };

    let view = match &raw.view {
        Some(value) => {
            let name = text("type", value, "data, ROI or GMFA")?;
            ViewType::parse(&name).ok_or(PlotError::InvalidValue {
                key: "type",
                value: name,
                expected: "data, ROI or GMFA",
            })?
        }
        None => ViewType::Data,
    };

    let electrode = raw
        .electrode
        .as_ref()
        .map(|value| text("electrode", value, "an electrode label"))
        .transpose()?;
    let requested_name = raw
        .name
        .as_ref()
        .map(|value| text("name", value, "an instance name"))
        .transpose()?;

    if ci && view == ViewType::Data && electrode.is_none() {
        return Err(PlotError::MutuallyExclusive(
            "ci cannot be shown on a butterfly plot; select an electrode".into(),
        ));
    }

    let name = match base.derived(view) {
        None => {
            if let Some(name) = requested_name {
                return Err(PlotError::MutuallyExclusive(format!(
                    "name '{name}' requires type ROI or GMFA"
                )));
            }
            None
        }
        Some(instances) => {
            if electrode.is_some() {
                log::warn!("electrode is ignored for {view} views");
            }
            if instances.is_empty() {
                return Err(PlotError::missing(view.as_str(), None));
            }
            match requested_name {
                Some(name) if instances.contains_key(&name) => Some(name),
                Some(name) => return Err(PlotError::not_found(view.as_str(), &name, None)),
                None if instances.len() == 1 => instances.keys().next().cloned(),
                None => {
                    return Err(PlotError::Ambiguous {
                        view: view.as_str(),
                        available: instances.keys().cloned().collect::<Vec<_>>().join(", "),
                    })
                }
            }
        }
    };

    Ok(PlotConfig {
        xlim,
        ylim,
        electrode: if view == ViewType::Data { electrode } else { None },
        ci,
        view,
        name,
    })
}
