//! Static metric registry: ids, display labels, and categories.
//!
//! Metric ids are the raw column names of the source sheet (unit suffix
//! included), so the loader, the export, and this catalog stay trivially in
//! sync. Collaborator-facing text always goes through the display labels.

use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Column names
// ---------------------------------------------------------------------------

/// Structural columns of the source table.
pub const COUNTRY_NAME: &str = "country_name";
pub const YEAR: &str = "year";

/// Metric column ids.
pub const FDI: &str = "foreign_direct_investment (US$)";
pub const NONPERFORMING_LOANS: &str = "nonperforming_loans (%)";
pub const EXPORTS: &str = "exports (%)";
pub const GDP_PER_CAPITA: &str = "gdp_per_capita (US$)";
pub const HIGH_TECH_EXPORTS: &str = "high_tech_exports (%)";
pub const INFLATION: &str = "inflation_annual (%)";
pub const NET_CAPITAL: &str = "net_capital (US$)";
pub const POPULATION: &str = "population_total";
pub const TAX_REVENUE: &str = "tax_revenue (%)";
pub const UNEMPLOYMENT: &str = "unemployment_rate (%)";

// ---------------------------------------------------------------------------
// Descriptors
// ---------------------------------------------------------------------------

/// Broad grouping used by the map view's metric picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MetricCategory {
    Economic,
    Social,
}

impl fmt::Display for MetricCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricCategory::Economic => write!(f, "Economic"),
            MetricCategory::Social => write!(f, "Social"),
        }
    }
}

/// One entry of the metric registry. Static, never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricDescriptor {
    pub id: &'static str,
    pub label: &'static str,
    pub category: MetricCategory,
}

/// Every metric the dashboard knows about, in display order.
pub const METRICS: &[MetricDescriptor] = &[
    MetricDescriptor {
        id: FDI,
        label: "FDI (US$)",
        category: MetricCategory::Economic,
    },
    MetricDescriptor {
        id: NONPERFORMING_LOANS,
        label: "Nonperforming Loans (%)",
        category: MetricCategory::Social,
    },
    MetricDescriptor {
        id: EXPORTS,
        label: "Exports (%)",
        category: MetricCategory::Economic,
    },
    MetricDescriptor {
        id: GDP_PER_CAPITA,
        label: "GDP Per Capita (US$)",
        category: MetricCategory::Economic,
    },
    MetricDescriptor {
        id: HIGH_TECH_EXPORTS,
        label: "High Tech Exports (%)",
        category: MetricCategory::Economic,
    },
    MetricDescriptor {
        id: INFLATION,
        label: "Inflation Annual (%)",
        category: MetricCategory::Social,
    },
    MetricDescriptor {
        id: NET_CAPITAL,
        label: "Net Capital (US$)",
        category: MetricCategory::Economic,
    },
    MetricDescriptor {
        id: POPULATION,
        label: "Population Total",
        category: MetricCategory::Social,
    },
    MetricDescriptor {
        id: TAX_REVENUE,
        label: "Tax Revenue (%)",
        category: MetricCategory::Economic,
    },
    MetricDescriptor {
        id: UNEMPLOYMENT,
        label: "Unemployment Rate (%)",
        category: MetricCategory::Social,
    },
];

/// Look up the descriptor for a metric id.
pub fn descriptor(id: &str) -> Option<&'static MetricDescriptor> {
    METRICS.iter().find(|m| m.id == id)
}

/// Whether the id names a registered metric.
pub fn is_known(id: &str) -> bool {
    descriptor(id).is_some()
}

/// Display label for a metric id; unknown columns fall back to the id
/// itself.
pub fn label_for(id: &str) -> &str {
    descriptor(id).map(|m| m.label).unwrap_or(id)
}

/// Metrics offered for one map category, in display order.
pub fn metrics_in_category(
    category: MetricCategory,
) -> impl Iterator<Item = &'static MetricDescriptor> {
    METRICS.iter().filter(move |m| m.category == category)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_lookup() {
        let desc = descriptor(GDP_PER_CAPITA).unwrap();
        assert_eq!(desc.label, "GDP Per Capita (US$)");
        assert_eq!(desc.category, MetricCategory::Economic);
        assert!(descriptor("not_a_metric").is_none());
    }

    #[test]
    fn label_falls_back_to_id() {
        assert_eq!(label_for(UNEMPLOYMENT), "Unemployment Rate (%)");
        assert_eq!(label_for("mystery_column"), "mystery_column");
    }

    #[test]
    fn categories_partition_the_registry() {
        let economic = metrics_in_category(MetricCategory::Economic).count();
        let social = metrics_in_category(MetricCategory::Social).count();
        assert_eq!(economic + social, METRICS.len());
        assert!(metrics_in_category(MetricCategory::Social)
            .any(|m| m.id == POPULATION));
    }
}
