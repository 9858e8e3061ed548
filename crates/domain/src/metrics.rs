//! Metric families handed to the exposition layer.

/// Kind of a metric family, as declared in the `# TYPE` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    /// A value that can go up and down.
    Gauge,
}

impl MetricKind {
    /// Exposition-format keyword.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gauge => "gauge",
        }
    }
}

/// One unlabeled sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Sample name, written verbatim in the exposition output.
    pub name: &'static str,
    /// Sample value; `NaN` marks a value the sensor reported as unavailable.
    pub value: f64,
}

/// A named group of samples produced by one acquisition cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricFamily {
    /// Family name.
    pub name: &'static str,
    /// Help text.
    pub help: &'static str,
    /// Family kind.
    pub kind: MetricKind,
    /// Samples in insertion order.
    pub samples: Vec<Sample>,
}

impl MetricFamily {
    /// Create an empty gauge family.
    #[must_use]
    pub fn gauge(name: &'static str, help: &'static str) -> Self {
        Self {
            name,
            help,
            kind: MetricKind::Gauge,
            samples: Vec::new(),
        }
    }

    /// Append a sample.
    #[must_use]
    pub fn with_sample(mut self, name: &'static str, value: f64) -> Self {
        self.samples.push(Sample { name, value });
        self
    }

    /// Look up a sample value by name.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<f64> {
        self.samples
            .iter()
            .find(|sample| sample.name == name)
            .map(|sample| sample.value)
    }
}
