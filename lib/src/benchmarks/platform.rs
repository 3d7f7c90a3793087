use std::fmt::Write;

use pulldown_cmark_escape::escape_html;
use serde::Serialize;

use crate::benchmarks::{BenchmarkDocument, Implementation};

/// Width of the label column in [`PlatformSummary::to_html()`].
const LABEL_WIDTH: usize = 22;

/// Labeled platform attributes, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformSummary {
    pub entries: Vec<(String, String)>,
}

impl PlatformSummary {
    pub fn get(&self, label: &str) -> Option<&str> {
        self.entries.iter()
            .find(|(key, _)| key == label)
            .map(|(_, value)| value.as_str())
    }

    /// Renders the summary as a `<pre class="benchmark-platform">` block, one
    /// bold label per line followed by its value in an aligned column.
    pub fn to_html(&self) -> String {
        let mut html = String::from("<pre class=\"benchmark-platform\">\n");
        for (label, value) in &self.entries {
            let padding = LABEL_WIDTH.saturating_sub(label.chars().count()).max(1);
            html.push_str("<b>");
            let _ = escape_html(&mut html, label);
            let _ = write!(html, "</b>{:padding$}", "");
            let _ = escape_html(&mut html, value);
            html.push('\n');
        }

        html.push_str("</pre>");
        html
    }
}

/// Summarizes the platform the benchmarks ran on. Versions come from both
/// documents; everything else from the candidate's.
pub fn summarize(
    candidate: &BenchmarkDocument,
    reference: &BenchmarkDocument,
    candidate_impl: &Implementation,
    reference_impl: &Implementation,
) -> PlatformSummary {
    let platform = &candidate.platform;
    let features = platform.features.enabled().collect::<Vec<_>>().join(", ");

    let entries = vec![
        (format!("{} version", candidate_impl.label), candidate.version.clone()),
        (format!("{} version", reference_impl.label), reference.version.clone()),
        ("CPU model".into(), platform.cpu_model.clone()),
        ("CPU count".into(), platform.cpu_count.to_string()),
        ("Architecture".into(), platform.arch.clone()),
        ("Operating System".into(), platform.os.clone()),
        (format!("{} features", candidate_impl.label), features),
    ];

    PlatformSummary { entries }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate() -> BenchmarkDocument {
        let json = r#"{
            "version": "0.9.1",
            "platform": {
                "cpu_count": 8,
                "cpu_model": "ARMv7 Processor rev 4 (v7l)",
                "arch": "arm",
                "os": "Linux",
                "features": { "liquid": true, "volk": true, "fftw3f": false }
            },
            "benchmarks": []
        }"#;

        BenchmarkDocument::parse("benchmarks.rpi.luaradio.json", json).unwrap()
    }

    fn reference() -> BenchmarkDocument {
        let json = r#"{
            "version": "3.7.10",
            "platform": { "cpu_count": 1, "cpu_model": "other", "arch": "x86_64", "os": "FreeBSD", "features": { "volk": true } },
            "benchmarks": []
        }"#;
        BenchmarkDocument::parse("benchmarks.rpi.gnuradio.json", json).unwrap()
    }

    #[test]
    fn entries_in_display_order() {
        let summary = summarize(
            &candidate(),
            &reference(),
            &Implementation::default_candidate(),
            &Implementation::default_reference(),
        );

        let labels: Vec<_> = summary.entries.iter().map(|(label, _)| label.as_str()).collect();
        assert_eq!(labels, [
            "LuaRadio version",
            "GNU Radio version",
            "CPU model",
            "CPU count",
            "Architecture",
            "Operating System",
            "LuaRadio features",
        ]);

        assert_eq!(summary.get("LuaRadio version"), Some("0.9.1"));
        assert_eq!(summary.get("GNU Radio version"), Some("3.7.10"));
        assert_eq!(summary.get("CPU count"), Some("8"));
        assert_eq!(summary.get("LuaRadio features"), Some("liquid, volk"));
    }

    #[test]
    fn renders_aligned_html() {
        let summary = summarize(
            &candidate(),
            &reference(),
            &Implementation::default_candidate(),
            &Implementation::default_reference(),
        );

        let html = summary.to_html();
        let lines: Vec<_> = html.lines().collect();
        assert_eq!(lines.first(), Some(&"<pre class=\"benchmark-platform\">"));
        assert_eq!(lines[1], "<b>LuaRadio version</b>      0.9.1");
        assert_eq!(lines[2], "<b>GNU Radio version</b>     3.7.10");
        assert_eq!(lines[3], "<b>CPU model</b>             ARMv7 Processor rev 4 (v7l)");
        assert_eq!(lines[6], "<b>Operating System</b>      Linux");
        assert_eq!(lines.last(), Some(&"</pre>"));
    }

    #[test]
    fn values_are_escaped() {
        let summary = PlatformSummary {
            entries: vec![("CPU model".into(), "<script>".into())],
        };

        assert!(summary.to_html().contains("<b>CPU model</b>             &lt;script&gt;\n"));

        let summary = PlatformSummary {
            entries: vec![("A & B".into(), "\"x86\" <64>".into())],
        };

        let html = summary.to_html();
        assert!(html.contains("<b>A &amp; B</b>"));
        assert!(html.contains("&quot;x86&quot; &lt;64&gt;\n"));
    }

    #[test]
    fn platform_comes_from_candidate() {
        let summary = summarize(
            &reference(),
            &candidate(),
            &Implementation::new("gr", "GR"),
            &Implementation::new("lr", "LR"),
        );

        assert_eq!(summary.get("GR version"), Some("3.7.10"));
        assert_eq!(summary.get("LR version"), Some("0.9.1"));
        assert_eq!(summary.get("Operating System"), Some("FreeBSD"));
        assert_eq!(summary.get("GR features"), Some("volk"));
    }
}
