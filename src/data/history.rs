//! Historical turbidity tracking for sparklines and trend arrows.

use std::collections::{HashMap, VecDeque};

use super::sensor::SensorRecord;

/// Maximum number of readings kept per sensor.
const MAX_HISTORY_SIZE: usize = 60;

/// Direction a sensor's turbidity moved between the last two readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Rising,
    Falling,
    Steady,
}

impl Trend {
    pub fn symbol(&self) -> &'static str {
        match self {
            Trend::Rising => "↑",
            Trend::Falling => "↓",
            Trend::Steady => "→",
        }
    }
}

/// Per-sensor turbidity history.
///
/// Only readings that carry a new `last_updated` timestamp are recorded, so
/// re-polling an unchanged snapshot does not flatten the sparkline.
#[derive(Debug, Clone, Default)]
pub struct History {
    /// Turbidity readings per sensor id, oldest first.
    pub turbidity: HashMap<String, VecDeque<f64>>,
    /// Timestamp of the last recorded reading per sensor id.
    last_seen: HashMap<String, chrono::DateTime<chrono::Utc>>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the readings of a snapshot.
    pub fn record(&mut self, records: &[SensorRecord]) {
        for record in records {
            if self.last_seen.get(&record.id) == Some(&record.last_updated) {
                continue;
            }
            self.last_seen.insert(record.id.clone(), record.last_updated);

            let readings = self.turbidity.entry(record.id.clone()).or_default();
            readings.push_back(record.turbidity);
            if readings.len() > MAX_HISTORY_SIZE {
                readings.pop_front();
            }
        }
    }

    /// Number of readings held for a sensor.
    pub fn len(&self, sensor_id: &str) -> usize {
        self.turbidity.get(sensor_id).map_or(0, VecDeque::len)
    }

    /// Sparkline levels (0-7) over the recorded turbidity values.
    ///
    /// Returns an empty Vec if there's not enough history.
    pub fn sparkline(&self, sensor_id: &str) -> Vec<u8> {
        let Some(values) = self.turbidity.get(sensor_id) else {
            return Vec::new();
        };

        if values.len() < 2 {
            return Vec::new();
        }

        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let range = max - min;

        values
            .iter()
            .map(|&v| {
                if range <= f64::EPSILON {
                    return 3;
                }
                let normalized = ((v - min) / range * 7.0).round() as u8;
                normalized.min(7)
            })
            .collect()
    }

    /// Trend between the last two readings of a sensor.
    pub fn trend(&self, sensor_id: &str) -> Option<Trend> {
        let values = self.turbidity.get(sensor_id)?;
        if values.len() < 2 {
            return None;
        }
        let current = *values.back()?;
        let previous = *values.get(values.len() - 2)?;
        let delta = current - previous;

        Some(if delta > 0.05 {
            Trend::Rising
        } else if delta < -0.05 {
            Trend::Falling
        } else {
            Trend::Steady
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sensor::{Coordinate, SensorStatus};
    use chrono::{TimeDelta, Utc};

    fn reading(turbidity: f64, offset_secs: i64) -> SensorRecord {
        SensorRecord::new(
            "s1",
            "Sensor 1",
            Coordinate::new(52.2, 0.12),
            turbidity,
            17.0,
            SensorStatus::Online,
            Utc::now() + TimeDelta::seconds(offset_secs),
        )
    }

    #[test]
    fn test_record_skips_unchanged_timestamps() {
        let mut history = History::new();
        let first = reading(10.0, 0);
        history.record(std::slice::from_ref(&first));
        history.record(std::slice::from_ref(&first));
        assert_eq!(history.len("s1"), 1);

        history.record(&[reading(11.0, 5)]);
        assert_eq!(history.len("s1"), 2);
    }

    #[test]
    fn test_history_is_bounded() {
        let mut history = History::new();
        for i in 0..(MAX_HISTORY_SIZE as i64 + 10) {
            history.record(&[reading(i as f64, i)]);
        }
        assert_eq!(history.len("s1"), MAX_HISTORY_SIZE);
    }

    #[test]
    fn test_sparkline_needs_two_points() {
        let mut history = History::new();
        assert!(history.sparkline("s1").is_empty());
        history.record(&[reading(10.0, 0)]);
        assert!(history.sparkline("s1").is_empty());
    }

    #[test]
    fn test_sparkline_normalizes() {
        let mut history = History::new();
        history.record(&[reading(10.0, 0)]);
        history.record(&[reading(12.0, 5)]);
        history.record(&[reading(14.0, 10)]);
        assert_eq!(history.sparkline("s1"), vec![0, 4, 7]);
    }

    #[test]
    fn test_trend() {
        let mut history = History::new();
        history.record(&[reading(10.0, 0)]);
        assert_eq!(history.trend("s1"), None);

        history.record(&[reading(10.4, 5)]);
        assert_eq!(history.trend("s1"), Some(Trend::Rising));

        history.record(&[reading(10.0, 10)]);
        assert_eq!(history.trend("s1"), Some(Trend::Falling));

        history.record(&[reading(10.0, 15)]);
        assert_eq!(history.trend("s1"), Some(Trend::Steady));
    }
}
