// src/dataset/types.rs

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt;

/// Metadata columns of the disaster-frequency table; everything else is a
/// year column.
pub const DISASTER_METADATA_COLUMNS: &[&str] =
    &["Country", "ISO2", "ISO3", "Indicator", "Unit", "Source"];

/// The forest-and-carbon table carries a slimmer metadata set than the
/// disaster table does.
pub const CARBON_METADATA_COLUMNS: &[&str] = &["Country", "ISO2", "ISO3"];

/// A fixed, ordered family of indicators extracted from one source table.
///
/// `pattern` is matched as a substring against the decorated `Indicator`
/// labels in the source; `label` is the canonical short name used in output.
pub trait IndicatorKind:
    Copy + Eq + fmt::Debug + Serialize + DeserializeOwned + 'static
{
    fn all() -> &'static [Self];
    fn pattern(&self) -> &'static str;
    fn label(&self) -> &'static str;
    fn metadata_columns() -> &'static [&'static str];
}

/// Disaster-frequency indicators, in presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DisasterKind {
    Drought,
    ExtremeTemperature,
    Flood,
    Landslide,
    Storm,
    Total,
    Wildfire,
}

impl IndicatorKind for DisasterKind {
    fn all() -> &'static [Self] {
        use DisasterKind::*;
        &[
            Drought,
            ExtremeTemperature,
            Flood,
            Landslide,
            Storm,
            Total,
            Wildfire,
        ]
    }

    fn pattern(&self) -> &'static str {
        match self {
            DisasterKind::Drought => "Drought",
            DisasterKind::ExtremeTemperature => "Extreme temperature",
            DisasterKind::Flood => "Flood",
            DisasterKind::Landslide => "Landslide",
            DisasterKind::Storm => "Storm",
            DisasterKind::Total => "TOTAL",
            DisasterKind::Wildfire => "Wildfire",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            DisasterKind::Drought => "Drought",
            DisasterKind::ExtremeTemperature => "Extreme temperature",
            DisasterKind::Flood => "Flood",
            DisasterKind::Landslide => "Landslide",
            DisasterKind::Storm => "Storm",
            DisasterKind::Total => "TOTAL",
            DisasterKind::Wildfire => "Wildfire",
        }
    }

    fn metadata_columns() -> &'static [&'static str] {
        DISASTER_METADATA_COLUMNS
    }
}

/// Forest-and-carbon indicators, in presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CarbonKind {
    CarbonStocks,
    ForestArea,
    CarbonStockIndex,
    ForestExtentIndex,
    LandArea,
    ForestShare,
}

impl IndicatorKind for CarbonKind {
    fn all() -> &'static [Self] {
        use CarbonKind::*;
        &[
            CarbonStocks,
            ForestArea,
            CarbonStockIndex,
            ForestExtentIndex,
            LandArea,
            ForestShare,
        ]
    }

    fn pattern(&self) -> &'static str {
        match self {
            CarbonKind::CarbonStocks => "Carbon stocks",
            CarbonKind::ForestArea => "Forest area",
            CarbonKind::CarbonStockIndex => "Index of carbon stocks in forests",
            CarbonKind::ForestExtentIndex => "Index of forest extent",
            CarbonKind::LandArea => "Land area",
            CarbonKind::ForestShare => "Share of forest area",
        }
    }

    fn label(&self) -> &'static str {
        self.pattern()
    }

    fn metadata_columns() -> &'static [&'static str] {
        CARBON_METADATA_COLUMNS
    }
}

/// One parsed yearly reading. Unparseable source cells land here as 0.0, so
/// a value is always finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearValue {
    pub year: i32,
    pub value: f64,
}

/// Yearly values for one indicator of one country, ascending by year.
///
/// A series always exists for every kind, with an empty `yearly_values` when
/// the source had no matching row. Consumers rely on that to skip null-checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSeries<K> {
    pub kind: K,
    pub yearly_values: Vec<YearValue>,
}

impl<K: IndicatorKind> IndicatorSeries<K> {
    pub fn empty(kind: K) -> Self {
        IndicatorSeries {
            kind,
            yearly_values: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.yearly_values.is_empty()
    }
}

/// Per-country record: one `IndicatorSeries` per kind, in kind order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryRecord<K> {
    pub country: String,
    pub iso3: String,
    pub indicators: Vec<IndicatorSeries<K>>,
}

impl<K: IndicatorKind> CountryRecord<K> {
    pub fn indicator(&self, kind: K) -> Option<&IndicatorSeries<K>> {
        self.indicators.iter().find(|s| s.kind == kind)
    }
}

/// The derived collections consumed by every view, logically keyed by ISO3.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub disasters: Vec<CountryRecord<DisasterKind>>,
    pub carbon: Vec<CountryRecord<CarbonKind>>,
}

impl Dataset {
    pub fn disaster_record(&self, iso3: &str) -> Option<&CountryRecord<DisasterKind>> {
        self.disasters.iter().find(|r| r.iso3 == iso3)
    }

    pub fn carbon_record(&self, iso3: &str) -> Option<&CountryRecord<CarbonKind>> {
        self.carbon.iter().find(|r| r.iso3 == iso3)
    }
}
