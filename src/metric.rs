use crate::data::RegionRecord;
use clap::ValueEnum;

/// The two numeric measures the map can be shaded by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum)]
pub enum Metric {
    /// Primary energy, MJ per kWh
    #[default]
    Energy,
    /// Abiotic depletion potential (elements), kg Sb-eq per kWh
    Impact,
}

impl Metric {
    pub fn other(self) -> Self {
        match self {
            Metric::Energy => Metric::Impact,
            Metric::Impact => Metric::Energy,
        }
    }

    /// Short code used in tooltips and the legend
    pub fn code(self) -> &'static str {
        match self {
            Metric::Energy => "PE",
            Metric::Impact => "ADPe",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Metric::Energy => "Primary energy",
            Metric::Impact => "Abiotic depletion",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Metric::Energy => "MJ/kWh",
            Metric::Impact => "kg Sb-eq/kWh",
        }
    }

    pub fn value_of(self, record: &RegionRecord) -> f64 {
        match self {
            Metric::Energy => record.primary_energy,
            Metric::Impact => record.depletion_impact,
        }
    }

    /// Number only: fixed point for energy, scientific for impact
    pub fn format_number(self, value: f64) -> String {
        match self {
            Metric::Energy => format!("{value:.2}"),
            Metric::Impact => format!("{value:.3e}"),
        }
    }

    /// "PE: 12.00 MJ/kWh"
    pub fn describe(self, value: f64) -> String {
        let number = self.format_number(value);
        format!("{}: {number} {}", self.code(), self.unit())
    }
}

/// Holds which metric is on display. Records are never touched by a switch;
/// callers re-render when `set_metric` reports a change.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricSelector {
    current: Metric,
}

impl MetricSelector {
    pub fn new(initial: Metric) -> Self {
        Self { current: initial }
    }

    pub fn current(&self) -> Metric {
        self.current
    }

    /// Returns true if the metric changed
    pub fn set_metric(&mut self, metric: Metric) -> bool {
        let changed = self.current != metric;
        self.current = metric;
        changed
    }

    pub fn toggle(&mut self) -> Metric {
        self.current = self.current.other();
        self.current
    }
}
