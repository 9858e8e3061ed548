//! Prometheus text exposition format (version 0.0.4).

use std::fmt::Write as _;

use waveplus_domain::metrics::MetricFamily;

/// `Content-Type` of a text-format scrape response.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Render a family as `# HELP` / `# TYPE` headers followed by one line per
/// sample.
#[must_use]
pub fn render(family: &MetricFamily) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(out, "# HELP {} {}", family.name, escape_help(family.help));
    let _ = writeln!(out, "# TYPE {} {}", family.name, family.kind.as_str());
    for sample in &family.samples {
        let _ = writeln!(out, "{} {}", sample.name, format_value(sample.value));
    }
    out
}

/// Format a sample value the way scrapers expect it.
///
/// Whole numbers keep one decimal (`25.0`); non-finite values use the
/// format's `NaN`, `+Inf` and `-Inf` spellings.
#[must_use]
pub fn format_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_owned()
    } else if value.is_infinite() {
        if value.is_sign_positive() {
            "+Inf".to_owned()
        } else {
            "-Inf".to_owned()
        }
    } else if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

fn escape_help(help: &str) -> String {
    help.replace('\\', "\\\\").replace('\n', "\\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_render_family_with_headers() {
        let family = MetricFamily::gauge("waveplus", "airthings waveplus sensor values")
            .with_sample("humidity_percent", 65.0)
            .with_sample("pressure_pascal", 1209.0 / 50.0);

        assert_eq!(
            render(&family),
            "# HELP waveplus airthings waveplus sensor values\n\
             # TYPE waveplus gauge\n\
             humidity_percent 65.0\n\
             pressure_pascal 24.18\n"
        );
    }

    #[test]
    fn should_format_whole_numbers_with_decimal_point() {
        assert_eq!(format_value(0.0), "0.0");
        assert_eq!(format_value(16383.0), "16383.0");
        assert_eq!(format_value(-3.0), "-3.0");
    }

    #[test]
    fn should_format_fractions_without_padding() {
        assert_eq!(format_value(21.37), "21.37");
        assert_eq!(format_value(45.5), "45.5");
    }

    #[test]
    fn should_format_non_finite_values() {
        assert_eq!(format_value(f64::NAN), "NaN");
        assert_eq!(format_value(f64::INFINITY), "+Inf");
        assert_eq!(format_value(f64::NEG_INFINITY), "-Inf");
    }

    #[test]
    fn should_escape_help_text() {
        assert_eq!(escape_help("a\\b\nc"), "a\\\\b\\nc");
    }
}
