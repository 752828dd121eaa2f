//! Derived metrics over a snapshot.
//!
//! Everything here is a pure function of the records passed in, recomputed on
//! every read. Empty input never faults: averages fall back to 0 and extrema
//! to `None`.

use std::fmt;

use super::sensor::{SensorRecord, SensorStatus};

/// Water-quality band for a turbidity reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TurbidityLevel {
    Excellent,
    Good,
    Moderate,
    Poor,
    VeryPoor,
}

impl TurbidityLevel {
    /// All levels, cleanest first.
    pub const ALL: [TurbidityLevel; 5] = [
        TurbidityLevel::Excellent,
        TurbidityLevel::Good,
        TurbidityLevel::Moderate,
        TurbidityLevel::Poor,
        TurbidityLevel::VeryPoor,
    ];

    /// Kebab-case identifier ("very-poor").
    pub fn slug(&self) -> &'static str {
        match self {
            TurbidityLevel::Excellent => "excellent",
            TurbidityLevel::Good => "good",
            TurbidityLevel::Moderate => "moderate",
            TurbidityLevel::Poor => "poor",
            TurbidityLevel::VeryPoor => "very-poor",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TurbidityLevel::Excellent => "Excellent",
            TurbidityLevel::Good => "Good",
            TurbidityLevel::Moderate => "Moderate",
            TurbidityLevel::Poor => "Poor",
            TurbidityLevel::VeryPoor => "Very Poor",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            TurbidityLevel::Excellent => "Crystal clear water",
            TurbidityLevel::Good => "Clear water with minimal particles",
            TurbidityLevel::Moderate => "Slightly cloudy water",
            TurbidityLevel::Poor => "Cloudy water with visible particles",
            TurbidityLevel::VeryPoor => "Highly turbid water",
        }
    }

    /// NTU range covered by this level, for legends.
    pub fn range(&self) -> &'static str {
        match self {
            TurbidityLevel::Excellent => "0-4 NTU",
            TurbidityLevel::Good => "4-10 NTU",
            TurbidityLevel::Moderate => "10-25 NTU",
            TurbidityLevel::Poor => "25-50 NTU",
            TurbidityLevel::VeryPoor => "50+ NTU",
        }
    }

    pub fn color(&self) -> Rgb {
        color_for(*self)
    }
}

impl fmt::Display for TurbidityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Classify a turbidity reading. Boundary values belong to the cleaner level.
pub fn classify(turbidity: f64) -> TurbidityLevel {
    if turbidity <= 4.0 {
        TurbidityLevel::Excellent
    } else if turbidity <= 10.0 {
        TurbidityLevel::Good
    } else if turbidity <= 25.0 {
        TurbidityLevel::Moderate
    } else if turbidity <= 50.0 {
        TurbidityLevel::Poor
    } else {
        TurbidityLevel::VeryPoor
    }
}

/// An sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Uppercase hex notation, e.g. `#10B981`.
    pub fn hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }

    /// Linear blend towards `other`; `t` is clamped to 0..=1.
    pub fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Rgb(mix(self.0, other.0), mix(self.1, other.1), mix(self.2, other.2))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hex())
    }
}

/// Fixed badge/marker color for each level.
pub fn color_for(level: TurbidityLevel) -> Rgb {
    match level {
        TurbidityLevel::Excellent => Rgb(0x10, 0xB9, 0x81),
        TurbidityLevel::Good => Rgb(0x22, 0xC5, 0x5E),
        TurbidityLevel::Moderate => Rgb(0xF5, 0x9E, 0x0B),
        TurbidityLevel::Poor => Rgb(0xEF, 0x44, 0x44),
        TurbidityLevel::VeryPoor => Rgb(0xDC, 0x26, 0x26),
    }
}

/// Numeric field of a record that aggregates can run over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Turbidity,
    WaterTemperature,
    BatteryLevel,
}

impl Field {
    /// Value of this field, if the record has one.
    pub fn value(&self, record: &SensorRecord) -> Option<f64> {
        match self {
            Field::Turbidity => Some(record.turbidity),
            Field::WaterTemperature => Some(record.water_temperature),
            Field::BatteryLevel => record.battery_level.map(f64::from),
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Field::Turbidity => "NTU",
            Field::WaterTemperature => "°C",
            Field::BatteryLevel => "%",
        }
    }
}

/// Which end of the range [`extremum`] looks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Max,
    Min,
}

/// Mean of `field` over online records; 0 when there are none.
pub fn average(records: &[SensorRecord], field: Field) -> f64 {
    let (sum, count) = records
        .iter()
        .filter(|r| r.is_online())
        .filter_map(|r| field.value(r))
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));

    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// The record with the largest or smallest `field`.
///
/// Ties resolve to the first record in store order. Records without a value
/// for `field` are skipped.
pub fn extremum(records: &[SensorRecord], field: Field, direction: Direction) -> Option<&SensorRecord> {
    let mut best: Option<(&SensorRecord, f64)> = None;

    for record in records {
        let Some(value) = field.value(record) else {
            continue;
        };
        let better = match best {
            None => true,
            Some((_, current)) => match direction {
                Direction::Max => value > current,
                Direction::Min => value < current,
            },
        };
        if better {
            best = Some((record, value));
        }
    }

    best.map(|(record, _)| record)
}

/// Overall water-quality score: `100 - 2 × avg`, clamped to 0..=100.
pub fn quality_score(avg_turbidity: f64) -> f64 {
    (100.0 - avg_turbidity * 2.0).clamp(0.0, 100.0)
}

/// Turbidity score: `100 - avg`, clamped to 0..=100.
pub fn turbidity_score(avg_turbidity: f64) -> f64 {
    (100.0 - avg_turbidity).clamp(0.0, 100.0)
}

/// Green end of the map legend.
pub const LEGEND_LOW: Rgb = Rgb(16, 185, 129);
/// Middle of the map legend.
pub const LEGEND_MID: Rgb = Rgb(250, 204, 21);
/// Red end of the map legend.
pub const LEGEND_HIGH: Rgb = Rgb(220, 38, 38);

/// Two-segment color scale (green, yellow, red) for the map legend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegendScale {
    pub min: f64,
    pub max: f64,
}

impl LegendScale {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Scale spanning the turbidity values present; 0..100 when empty.
    pub fn from_records(records: &[SensorRecord]) -> Self {
        let min = extremum(records, Field::Turbidity, Direction::Min).map(|r| r.turbidity);
        let max = extremum(records, Field::Turbidity, Direction::Max).map(|r| r.turbidity);
        Self {
            min: min.unwrap_or(0.0),
            max: max.unwrap_or(100.0),
        }
    }

    /// Position of `turbidity` on the scale, 0..=1.
    pub fn ratio(&self, turbidity: f64) -> f64 {
        if self.is_degenerate() {
            return 0.0;
        }
        ((turbidity - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
    }

    /// True when the scale has no width.
    pub fn is_degenerate(&self) -> bool {
        self.max == self.min
    }

    /// Interpolated color for `turbidity`.
    pub fn color_at(&self, turbidity: f64) -> Rgb {
        if self.is_degenerate() {
            return LEGEND_LOW;
        }
        let ratio = self.ratio(turbidity);
        if ratio < 0.5 {
            LEGEND_LOW.lerp(LEGEND_MID, ratio * 2.0)
        } else {
            LEGEND_MID.lerp(LEGEND_HIGH, (ratio - 0.5) * 2.0)
        }
    }
}

/// Temperature band shown on the info page and in the detail overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TemperatureBand {
    VeryCold,
    Cold,
    Optimal,
    Warm,
    Hot,
}

impl TemperatureBand {
    pub const ALL: [TemperatureBand; 5] = [
        TemperatureBand::VeryCold,
        TemperatureBand::Cold,
        TemperatureBand::Optimal,
        TemperatureBand::Warm,
        TemperatureBand::Hot,
    ];

    pub fn classify(celsius: f64) -> Self {
        if celsius <= 4.0 {
            TemperatureBand::VeryCold
        } else if celsius <= 15.0 {
            TemperatureBand::Cold
        } else if celsius <= 25.0 {
            TemperatureBand::Optimal
        } else if celsius <= 30.0 {
            TemperatureBand::Warm
        } else {
            TemperatureBand::Hot
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TemperatureBand::VeryCold => "Very Cold",
            TemperatureBand::Cold => "Cold",
            TemperatureBand::Optimal => "Optimal",
            TemperatureBand::Warm => "Warm",
            TemperatureBand::Hot => "Hot",
        }
    }

    pub fn range(&self) -> &'static str {
        match self {
            TemperatureBand::VeryCold => "0-4°C",
            TemperatureBand::Cold => "4-15°C",
            TemperatureBand::Optimal => "15-25°C",
            TemperatureBand::Warm => "25-30°C",
            TemperatureBand::Hot => "30+°C",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            TemperatureBand::VeryCold => "Near freezing, low biological activity",
            TemperatureBand::Cold => "Cool water, moderate biological activity",
            TemperatureBand::Optimal => "Ideal temperature range for most aquatic life",
            TemperatureBand::Warm => "Warm water, increased biological activity",
            TemperatureBand::Hot => "High temperature, potential stress on aquatic life",
        }
    }
}

/// Fleet-wide aggregates for headers, dashboard cards and the export panel.
#[derive(Debug, Clone, PartialEq)]
pub struct FleetSummary {
    pub total: usize,
    pub online: usize,
    pub offline: usize,
    pub maintenance: usize,
    pub avg_turbidity: f64,
    pub avg_temperature: f64,
    pub avg_battery: f64,
    /// Index into the snapshot of the most turbid sensor.
    pub most_turbid: Option<usize>,
    /// Index into the snapshot of the warmest sensor.
    pub warmest: Option<usize>,
    /// Sensors per level, in [`TurbidityLevel::ALL`] order.
    pub level_counts: [usize; 5],
}

impl FleetSummary {
    pub fn from_records(records: &[SensorRecord]) -> Self {
        let count = |status: SensorStatus| records.iter().filter(|r| r.status == status).count();

        let mut level_counts = [0usize; 5];
        for record in records {
            let level = classify(record.turbidity);
            if let Some(slot) = TurbidityLevel::ALL.iter().position(|l| *l == level) {
                level_counts[slot] += 1;
            }
        }

        let index_of = |found: Option<&SensorRecord>| {
            found.and_then(|f| records.iter().position(|r| std::ptr::eq(r, f)))
        };

        Self {
            total: records.len(),
            online: count(SensorStatus::Online),
            offline: count(SensorStatus::Offline),
            maintenance: count(SensorStatus::Maintenance),
            avg_turbidity: average(records, Field::Turbidity),
            avg_temperature: average(records, Field::WaterTemperature),
            avg_battery: average(records, Field::BatteryLevel),
            most_turbid: index_of(extremum(records, Field::Turbidity, Direction::Max)),
            warmest: index_of(extremum(records, Field::WaterTemperature, Direction::Max)),
            level_counts,
        }
    }

    /// Quality score derived from the online average.
    pub fn quality_score(&self) -> f64 {
        quality_score(self.avg_turbidity)
    }

    /// Sensors currently at `level`.
    pub fn count_at(&self, level: TurbidityLevel) -> usize {
        TurbidityLevel::ALL
            .iter()
            .position(|l| *l == level)
            .map(|i| self.level_counts[i])
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sensor::Coordinate;
    use chrono::Utc;

    fn record(id: &str, turbidity: f64, status: SensorStatus) -> SensorRecord {
        SensorRecord::new(
            id,
            id,
            Coordinate::new(52.2, 0.12),
            turbidity,
            17.0,
            status,
            Utc::now(),
        )
    }

    #[test]
    fn test_classify_boundaries() {
        assert_eq!(classify(0.0), TurbidityLevel::Excellent);
        assert_eq!(classify(4.0), TurbidityLevel::Excellent);
        assert_eq!(classify(4.01), TurbidityLevel::Good);
        assert_eq!(classify(10.0), TurbidityLevel::Good);
        assert_eq!(classify(25.0), TurbidityLevel::Moderate);
        assert_eq!(classify(25.5), TurbidityLevel::Poor);
        assert_eq!(classify(50.0), TurbidityLevel::Poor);
        assert_eq!(classify(50.01), TurbidityLevel::VeryPoor);
    }

    #[test]
    fn test_color_for_levels() {
        assert_eq!(color_for(TurbidityLevel::Excellent).hex(), "#10B981");
        assert_eq!(color_for(TurbidityLevel::Good).hex(), "#22C55E");
        assert_eq!(color_for(TurbidityLevel::Moderate).hex(), "#F59E0B");
        assert_eq!(color_for(TurbidityLevel::Poor).hex(), "#EF4444");
        assert_eq!(TurbidityLevel::VeryPoor.color().to_string(), "#DC2626");
    }

    #[test]
    fn test_average_of_empty_is_zero() {
        assert_eq!(average(&[], Field::Turbidity), 0.0);
    }

    #[test]
    fn test_average_counts_online_only() {
        let records = vec![
            record("a", 10.0, SensorStatus::Online),
            record("b", 20.0, SensorStatus::Online),
            record("c", 90.0, SensorStatus::Offline),
            record("d", 70.0, SensorStatus::Maintenance),
        ];
        assert_eq!(average(&records, Field::Turbidity), 15.0);

        let offline_only = vec![record("c", 90.0, SensorStatus::Offline)];
        assert_eq!(average(&offline_only, Field::Turbidity), 0.0);
    }

    #[test]
    fn test_average_skips_missing_battery() {
        let records = vec![
            record("a", 1.0, SensorStatus::Online).with_battery(80),
            record("b", 1.0, SensorStatus::Online),
            record("c", 1.0, SensorStatus::Online).with_battery(60),
        ];
        assert_eq!(average(&records, Field::BatteryLevel), 70.0);
    }

    #[test]
    fn test_extremum_of_empty_is_none() {
        assert!(extremum(&[], Field::Turbidity, Direction::Max).is_none());
        assert!(extremum(&[], Field::Turbidity, Direction::Min).is_none());
    }

    #[test]
    fn test_extremum_ties_resolve_to_first() {
        let records = vec![
            record("a", 5.0, SensorStatus::Online),
            record("b", 20.0, SensorStatus::Online),
            record("c", 20.0, SensorStatus::Online),
        ];
        let max = extremum(&records, Field::Turbidity, Direction::Max).unwrap();
        assert_eq!(max.id, "b");

        let min = extremum(&records, Field::Turbidity, Direction::Min).unwrap();
        assert_eq!(min.id, "a");
    }

    #[test]
    fn test_extremum_includes_every_status() {
        let records = vec![
            record("a", 5.0, SensorStatus::Online),
            record("b", 72.0, SensorStatus::Maintenance),
        ];
        let max = extremum(&records, Field::Turbidity, Direction::Max).unwrap();
        assert_eq!(max.id, "b");
    }

    #[test]
    fn test_legend_degenerates_to_constant() {
        let scale = LegendScale::new(12.0, 12.0);
        assert_eq!(scale.color_at(12.0), LEGEND_LOW);
        assert_eq!(scale.color_at(99.0), LEGEND_LOW);
    }

    #[test]
    fn test_legend_endpoints_and_midpoint() {
        let scale = LegendScale::new(0.0, 100.0);
        assert_eq!(scale.color_at(0.0), LEGEND_LOW);
        assert_eq!(scale.color_at(50.0), LEGEND_MID);
        assert_eq!(scale.color_at(100.0), LEGEND_HIGH);
        // Values outside the range clamp to the ends
        assert_eq!(scale.color_at(-10.0), LEGEND_LOW);
        assert_eq!(scale.color_at(250.0), LEGEND_HIGH);
    }

    #[test]
    fn test_legend_quarter_point() {
        let scale = LegendScale::new(0.0, 100.0);
        // Halfway between green and yellow
        assert_eq!(scale.color_at(25.0), Rgb(133, 195, 75));
    }

    #[test]
    fn test_legend_from_records() {
        let records = vec![
            record("a", 38.0, SensorStatus::Online),
            record("b", 72.0, SensorStatus::Offline),
            record("c", 45.0, SensorStatus::Online),
        ];
        let scale = LegendScale::from_records(&records);
        assert_eq!(scale, LegendScale::new(38.0, 72.0));

        assert_eq!(LegendScale::from_records(&[]), LegendScale::new(0.0, 100.0));
    }

    #[test]
    fn test_scores_clamp() {
        assert_eq!(quality_score(15.0), 70.0);
        assert_eq!(quality_score(80.0), 0.0);
        assert_eq!(turbidity_score(25.0), 75.0);
        assert_eq!(turbidity_score(-5.0), 100.0);
    }

    #[test]
    fn test_temperature_bands() {
        assert_eq!(TemperatureBand::classify(4.0), TemperatureBand::VeryCold);
        assert_eq!(TemperatureBand::classify(15.0), TemperatureBand::Cold);
        assert_eq!(TemperatureBand::classify(18.5), TemperatureBand::Optimal);
        assert_eq!(TemperatureBand::classify(26.0), TemperatureBand::Warm);
        assert_eq!(TemperatureBand::classify(31.0), TemperatureBand::Hot);
    }

    #[test]
    fn test_fleet_summary() {
        let records = vec![
            record("a", 3.0, SensorStatus::Online),
            record("b", 60.0, SensorStatus::Online),
            record("c", 72.0, SensorStatus::Maintenance),
            record("d", 20.0, SensorStatus::Offline),
        ];
        let summary = FleetSummary::from_records(&records);

        assert_eq!(summary.total, 4);
        assert_eq!(summary.online, 2);
        assert_eq!(summary.offline, 1);
        assert_eq!(summary.maintenance, 1);
        assert_eq!(summary.avg_turbidity, 31.5);
        assert_eq!(summary.most_turbid, Some(2));
        assert_eq!(summary.warmest, Some(0));
        assert_eq!(summary.count_at(TurbidityLevel::Excellent), 1);
        assert_eq!(summary.count_at(TurbidityLevel::Moderate), 1);
        assert_eq!(summary.count_at(TurbidityLevel::VeryPoor), 2);
        assert_eq!(summary.quality_score(), 37.0);
    }

    #[test]
    fn test_fleet_summary_of_empty() {
        let summary = FleetSummary::from_records(&[]);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.avg_turbidity, 0.0);
        assert!(summary.most_turbid.is_none());
        assert!(summary.warmest.is_none());
    }
}
