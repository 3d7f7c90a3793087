use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::json;

use crate::benchmarks::{BenchmarkError, ComparisonRow, Implementation, Label};
use crate::util::is_js_identifier;

/// Candidate ratios above this are drawn at this value so that one outlier
/// does not stretch the axis shared by every row.
pub const RATIO_CEILING: f64 = 250.0;

/// The reference implementation's ratio: every row is relative to it.
pub const REFERENCE_RATIO: f64 = 100.0;

/// Visible range of the percentage axis.
pub const AXIS_RANGE: (f64, f64) = (0.0, 200.0);

/// Opacity of the bar fill colors.
const FILL_ALPHA: f32 = 0.75;

/// An RGB color, written and read as `#rrggbb`.
///
/// ```rust
/// use sitetags::benchmarks::Rgb;
///
/// let color: Rgb = "#e6550d".parse().unwrap();
/// assert_eq!(color, Rgb(0xe6, 0x55, 0x0d));
/// assert_eq!(color.to_string(), "#e6550d");
/// assert!("#e655".parse::<Rgb>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// The theme color pair: the candidate's bars use `highlight_color` and the
/// reference's bars `contrast_color`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct Theme {
    pub highlight_color: Rgb,
    pub contrast_color: Rgb,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub label: String,
    pub data: Vec<f64>,
    /// CSS `rgba(..)` fill color.
    pub color: String,
}

/// Everything a client-side renderer needs to draw a comparison as a
/// horizontal bar chart: one label per row, the candidate and reference
/// series (in that order), and a tooltip for every bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub labels: Vec<Label>,
    pub series: [Series; 2],
    /// Tooltip text indexed by `[series][row]`.
    pub tooltips: [Vec<String>; 2],
    pub axis: (f64, f64),
}

impl Rgb {
    pub fn from_hex(hex: &str) -> Result<Rgb, BenchmarkError> {
        let invalid = || BenchmarkError::InvalidColor(hex.to_string());
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let value = u32::from_str_radix(digits, 16).map_err(|_| invalid())?;
        Ok(Rgb((value >> 16) as u8, (value >> 8) as u8, value as u8))
    }

    pub fn rgba(&self, alpha: f32) -> String {
        format!("rgba({}, {}, {}, {alpha})", self.0, self.1, self.2)
    }
}

impl FromStr for Rgb {
    type Err = BenchmarkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rgb::from_hex(s)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Rgb::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}

fn mega(samples_per_second: f64) -> f64 {
    samples_per_second / 1e6
}

impl ChartSpec {
    /// Builds the chart for `rows`, which are expected in display order.
    pub fn build(
        rows: &[ComparisonRow],
        theme: &Theme,
        candidate: &Implementation,
        reference: &Implementation,
    ) -> ChartSpec {
        let candidate_series = Series {
            label: candidate.label.clone(),
            data: rows.iter().map(|row| row.ratio.min(RATIO_CEILING)).collect(),
            color: theme.highlight_color.rgba(FILL_ALPHA),
        };

        let reference_series = Series {
            label: reference.label.clone(),
            data: vec![REFERENCE_RATIO; rows.len()],
            color: theme.contrast_color.rgba(FILL_ALPHA),
        };

        let candidate_tooltips = rows.iter()
            .map(|row| format!(
                "{}: {:.1}%, μ {:.2} MS/s, σ {:.2} MS/s",
                candidate.label,
                row.ratio,
                mega(row.candidate.samples_per_second),
                mega(row.candidate.samples_per_second_stdev),
            ))
            .collect();

        let reference_tooltips = rows.iter()
            .map(|row| format!(
                "{}: {:.1}%, μ {:.2} MS/s, σ {:.2} MS/s",
                reference.label,
                REFERENCE_RATIO,
                mega(row.reference.samples_per_second),
                mega(row.reference.samples_per_second_stdev),
            ))
            .collect();

        ChartSpec {
            labels: rows.iter().map(|row| row.label.clone()).collect(),
            series: [candidate_series, reference_series],
            tooltips: [candidate_tooltips, reference_tooltips],
            axis: AXIS_RANGE,
        }
    }

    /// The chart as a Chart.js (v2) `horizontalBar` configuration. The
    /// tooltip label callback is left empty; see [`ChartSpec::to_script()`].
    pub fn chartjs_config(&self, title: Option<&str>) -> serde_json::Value {
        let datasets: Vec<_> = self.series.iter()
            .map(|series| json!({
                "data": series.data,
                "label": series.label,
                "backgroundColor": series.color,
            }))
            .collect();

        let mut config = json!({
            "type": "horizontalBar",
            "data": {
                "labels": self.labels,
                "datasets": datasets,
            },
            "options": {
                "scales": {
                    "xAxes": [{
                        "type": "linear",
                        "ticks": { "min": self.axis.0, "max": self.axis.1 },
                        "scaleLabel": { "labelString": "Percent", "display": true },
                        "position": "top",
                    }],
                },
                "tooltips": { "mode": "label", "callbacks": {} },
                "legend": { "position": "top" },
                "isFixedWidth": false,
            },
        });

        if let Some(title) = title {
            config["options"]["title"] = json!({ "display": true, "text": title });
        }

        config
    }

    /// Client-side script that draws the chart into the canvas element with
    /// id `element_id`. The id doubles as the prefix of the script's global
    /// variables, so it must be a JavaScript identifier.
    pub fn to_script(&self, element_id: &str, title: Option<&str>) -> Result<String, BenchmarkError> {
        if !is_js_identifier(element_id) {
            return Err(BenchmarkError::InvalidElementId(element_id.to_string()));
        }

        let id = element_id;
        let config = script_json(&self.chartjs_config(title));
        let tooltips = script_json(&json!(self.tooltips));
        Ok(format!(
            "var {id}_data = {config};\n\
             var {id}_tooltips = {tooltips};\n\
             {id}_data['options']['tooltips']['callbacks']['label'] = function (tooltipItem, data) \
             {{ return {id}_tooltips[tooltipItem['datasetIndex']][tooltipItem['index']] }};\n\
             new Chart(document.getElementById(\"{id}\"), {id}_data);"
        ))
    }
}

/// JSON that is safe to place inside a `<script>` element.
fn script_json(value: &serde_json::Value) -> String {
    value.to_string().replace("</", "<\\/")
}
