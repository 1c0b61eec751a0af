//! Turns raw provider records into a deduplicated, ordered list of outages.

use chrono::{DateTime, FixedOffset};
use std::collections::HashMap;
use tracing::debug;

use crate::error::ValidationResult;
use crate::models::{Outage, OutageAddress, OutageDescription, OutagePeriod};

/// One outage row as reported by the provider, after JSON normalization but
/// before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutageRecord {
    pub id: i64,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    pub city: String,
    pub street_id: i64,
    pub street_name: String,
    pub buildings: Vec<String>,
    pub comment: String,
}

impl OutageRecord {
    /// Validate the record into a domain outage.
    pub fn into_outage(self) -> ValidationResult<Outage> {
        let period = OutagePeriod::new(self.start, self.end)?;
        let city = if self.city.is_empty() { None } else { Some(self.city) };
        let address = OutageAddress::new(self.street_id, self.street_name, self.buildings, city)?;

        Ok(Outage::new(
            self.id,
            period,
            address,
            OutageDescription::new(self.comment),
        ))
    }
}

/// Two records with the same key describe the same logical event.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct DedupKey {
    street_id: i64,
    buildings: String,
    start: i64,
    end: i64,
}

impl DedupKey {
    fn of(outage: &Outage) -> Self {
        Self {
            street_id: outage.address.street_id(),
            buildings: outage.address.buildings().join(","),
            start: outage.period.start().timestamp(),
            end: outage.period.end().timestamp(),
        }
    }
}

/// Validate and deduplicate provider records.
///
/// Invalid records are dropped before deduplication, so they never claim or
/// overwrite a slot. A repeated key keeps the slot of its first occurrence but
/// takes the content (id, description, names) of the last one.
pub fn ingest<I>(records: I) -> Vec<Outage>
where
    I: IntoIterator<Item = OutageRecord>,
{
    let mut outages: Vec<Outage> = Vec::new();
    let mut seen: HashMap<DedupKey, usize> = HashMap::new();

    for record in records {
        let record_id = record.id;
        let outage = match record.into_outage() {
            Ok(outage) => outage,
            Err(e) => {
                debug!(outage_id = record_id, error = %e, "Dropping invalid outage record");
                continue;
            }
        };

        let key = DedupKey::of(&outage);
        match seen.get(&key) {
            Some(&index) => outages[index] = outage,
            None => {
                seen.insert(key, outages.len());
                outages.push(outage);
            }
        }
    }

    outages
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn ts(hour: u32) -> DateTime<FixedOffset> {
        Utc.with_ymd_and_hms(2024, 1, 1, hour, 0, 0).unwrap().fixed_offset()
    }

    fn record(id: i64, street_id: i64, buildings: &[&str], comment: &str) -> OutageRecord {
        OutageRecord {
            id,
            start: ts(8),
            end: ts(16),
            city: "Львів".to_string(),
            street_id,
            street_name: format!("S{street_id}"),
            buildings: buildings.iter().map(|b| b.to_string()).collect(),
            comment: comment.to_string(),
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(ingest(Vec::new()).is_empty());
    }

    #[test]
    fn test_duplicate_keeps_first_position_with_last_content() {
        let outages = ingest(vec![
            record(1, 1, &["10"], "a"),
            record(2, 2, &["10"], "b"),
            record(3, 1, &["10"], "c"),
        ]);

        assert_eq!(outages.len(), 2);
        assert_eq!(outages[0].id, 3);
        assert_eq!(outages[0].description.as_str(), "c");
        assert_eq!(outages[0].address.street_name(), "S1");
        assert_eq!(outages[1].id, 2);
        assert_eq!(outages[1].description.as_str(), "b");
    }

    #[test]
    fn test_building_order_is_part_of_the_key() {
        let outages = ingest(vec![
            record(1, 1, &["10", "12"], "a"),
            record(2, 1, &["12", "10"], "b"),
        ]);
        assert_eq!(outages.len(), 2);
    }

    #[test]
    fn test_key_uses_whole_seconds() {
        let mut later = record(2, 1, &["10"], "b");
        later.start = ts(8) + chrono::Duration::milliseconds(250);

        let outages = ingest(vec![record(1, 1, &["10"], "a"), later]);
        assert_eq!(outages.len(), 1);
        assert_eq!(outages[0].id, 2);
    }

    #[test]
    fn test_different_period_is_a_different_outage() {
        let mut later = record(2, 1, &["10"], "b");
        later.end = ts(18);

        let outages = ingest(vec![record(1, 1, &["10"], "a"), later]);
        assert_eq!(outages.len(), 2);
    }

    #[test]
    fn test_invalid_records_are_dropped() {
        let mut inverted = record(1, 1, &["10"], "inverted");
        inverted.start = ts(20);

        let outages = ingest(vec![
            inverted,
            record(2, 0, &["10"], "no street id"),
            record(3, 1, &[], "no buildings"),
            OutageRecord {
                street_name: "  ".to_string(),
                ..record(4, 1, &["10"], "blank street name")
            },
            record(5, 1, &["10"], "valid"),
        ]);

        assert_eq!(outages.len(), 1);
        assert_eq!(outages[0].id, 5);
    }

    // Validation runs first: a broken re-report of a known event is dropped on
    // its own instead of replacing the valid occurrence and losing the event.
    #[test]
    fn test_invalid_repeat_does_not_overwrite_valid_slot() {
        let mut invalid_repeat = record(2, 1, &["10"], "broken");
        invalid_repeat.street_name = String::new();

        let outages = ingest(vec![record(1, 1, &["10"], "valid"), invalid_repeat]);
        assert_eq!(outages.len(), 1);
        assert_eq!(outages[0].id, 1);
    }

    #[test]
    fn test_empty_city_becomes_none() {
        let mut rec = record(1, 1, &["10"], "x");
        rec.city = String::new();
        let outage = rec.into_outage().unwrap();
        assert_eq!(outage.address.city(), None);
    }
}
