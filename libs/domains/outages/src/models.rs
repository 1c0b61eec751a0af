//! Outage value objects and entities.

use chrono::{DateTime, FixedOffset};
use std::fmt;

use crate::error::{ValidationError, ValidationResult};
use crate::user::UserAddress;

/// Time span of an outage.
///
/// Equality is evaluated at one-second granularity on the absolute instant, so
/// two periods written with different offsets (or differing only in
/// sub-second precision) compare equal.
#[derive(Debug, Clone, Copy)]
pub struct OutagePeriod {
    start: DateTime<FixedOffset>,
    end: DateTime<FixedOffset>,
}

impl OutagePeriod {
    /// Create a period; fails when `start` is after `end`.
    pub fn new(start: DateTime<FixedOffset>, end: DateTime<FixedOffset>) -> ValidationResult<Self> {
        if start > end {
            return Err(ValidationError::InvalidPeriod { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> DateTime<FixedOffset> {
        self.start
    }

    pub fn end(&self) -> DateTime<FixedOffset> {
        self.end
    }
}

impl PartialEq for OutagePeriod {
    fn eq(&self, other: &Self) -> bool {
        self.start.timestamp() == other.start.timestamp()
            && self.end.timestamp() == other.end.timestamp()
    }
}

impl Eq for OutagePeriod {}

/// Free-form comment attached to an outage. Compared exactly (case-sensitive).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct OutageDescription(String);

impl OutageDescription {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for OutageDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Geographic scope of one outage: a street and the affected buildings on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutageAddress {
    street_id: i64,
    street_name: String,
    buildings: Vec<String>,
    city: Option<String>,
}

impl OutageAddress {
    pub fn new(
        street_id: i64,
        street_name: impl Into<String>,
        buildings: Vec<String>,
        city: Option<String>,
    ) -> ValidationResult<Self> {
        let street_name = street_name.into();

        if street_id <= 0 {
            return Err(ValidationError::InvalidStreetId(street_id));
        }
        if street_name.trim().is_empty() {
            return Err(ValidationError::EmptyStreetName);
        }
        if buildings.is_empty() || buildings.iter().any(|b| b.trim().is_empty()) {
            return Err(ValidationError::EmptyBuildings);
        }

        Ok(Self {
            street_id,
            street_name,
            buildings,
            city: city.filter(|c| !c.trim().is_empty()),
        })
    }

    pub fn street_id(&self) -> i64 {
        self.street_id
    }

    pub fn street_name(&self) -> &str {
        &self.street_name
    }

    /// Buildings in the order the provider listed them.
    pub fn buildings(&self) -> &[String] {
        &self.buildings
    }

    pub fn city(&self) -> Option<&str> {
        self.city.as_deref()
    }

    /// Exact street-id match and exact membership of the user's building.
    /// City is not compared.
    pub fn covers_user_address(&self, address: &UserAddress) -> bool {
        self.street_id == address.street_id()
            && self.buildings.iter().any(|b| b == address.building())
    }
}

/// Pure coverage check between an outage scope and a subscriber address.
pub fn covers(outage_address: &OutageAddress, user_address: &UserAddress) -> bool {
    outage_address.covers_user_address(user_address)
}

/// One reported power interruption, valid for a single dispatch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outage {
    pub id: i64,
    pub period: OutagePeriod,
    pub address: OutageAddress,
    pub description: OutageDescription,
}

impl Outage {
    pub fn new(
        id: i64,
        period: OutagePeriod,
        address: OutageAddress,
        description: OutageDescription,
    ) -> Self {
        Self {
            id,
            period,
            address,
            description,
        }
    }

    pub fn affects(&self, address: &UserAddress) -> bool {
        self.address.covers_user_address(address)
    }

    /// The marker stored on a subscriber once they are told about this outage.
    pub fn info(&self) -> OutageInfo {
        OutageInfo::new(self.period, self.description.clone())
    }
}

/// "Last notified about" marker: period plus description.
///
/// Equality ignores outage identity on purpose: a re-issued outage with the
/// same period and comment counts as already notified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutageInfo {
    pub period: OutagePeriod,
    pub description: OutageDescription,
}

impl OutageInfo {
    pub fn new(period: OutagePeriod, description: OutageDescription) -> Self {
        Self {
            period,
            description,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn ts(hour: u32) -> DateTime<FixedOffset> {
        Utc.with_ymd_and_hms(2024, 1, 1, hour, 0, 0)
            .unwrap()
            .fixed_offset()
    }

    fn period(start: u32, end: u32) -> OutagePeriod {
        OutagePeriod::new(ts(start), ts(end)).unwrap()
    }

    fn buildings(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_period_rejects_start_after_end() {
        let result = OutagePeriod::new(ts(16), ts(8));
        assert!(matches!(result, Err(ValidationError::InvalidPeriod { .. })));
    }

    #[test]
    fn test_period_allows_zero_length() {
        let p = OutagePeriod::new(ts(8), ts(8)).unwrap();
        assert_eq!(p.start(), p.end());
    }

    #[test]
    fn test_period_equality_ignores_subseconds_and_offset() {
        let a = period(8, 16);

        let shifted = OutagePeriod::new(
            ts(8) + Duration::milliseconds(400),
            ts(16) + Duration::milliseconds(999),
        )
        .unwrap();
        assert_eq!(a, shifted);

        let kyiv = FixedOffset::east_opt(2 * 3600).unwrap();
        let same_instant =
            OutagePeriod::new(ts(8).with_timezone(&kyiv), ts(16).with_timezone(&kyiv)).unwrap();
        assert_eq!(a, same_instant);

        assert_ne!(a, OutagePeriod::new(ts(8) + Duration::seconds(1), ts(16)).unwrap());
    }

    #[test]
    fn test_outage_address_validation() {
        assert_eq!(
            OutageAddress::new(0, "Стрийська", buildings(&["10"]), None),
            Err(ValidationError::InvalidStreetId(0))
        );
        assert_eq!(
            OutageAddress::new(1, "   ", buildings(&["10"]), None),
            Err(ValidationError::EmptyStreetName)
        );
        assert_eq!(
            OutageAddress::new(1, "Стрийська", vec![], None),
            Err(ValidationError::EmptyBuildings)
        );
        assert_eq!(
            OutageAddress::new(1, "Стрийська", buildings(&["10", " "]), None),
            Err(ValidationError::EmptyBuildings)
        );

        let addr = OutageAddress::new(1, "Стрийська", buildings(&["10", "12"]), Some(String::new()))
            .unwrap();
        assert_eq!(addr.city(), None);
        assert_eq!(addr.buildings(), &["10".to_string(), "12".to_string()]);
    }

    #[test]
    fn test_covers_requires_street_and_exact_building() {
        let outage = OutageAddress::new(
            1,
            "Стрийська",
            buildings(&["10", "12-А"]),
            Some("Львів".to_string()),
        )
        .unwrap();

        let at_10 = UserAddress::new(1, "Стрийська", "10").unwrap();
        let at_12a = UserAddress::new(1, "Стрийська", "12-А").unwrap();
        let at_10a = UserAddress::new(1, "Стрийська", "10-А").unwrap();
        let other_street = UserAddress::new(2, "Стрийська", "10").unwrap();

        assert!(covers(&outage, &at_10));
        assert!(covers(&outage, &at_12a));
        assert!(!covers(&outage, &at_10a));
        assert!(!covers(&outage, &other_street));
    }

    #[test]
    fn test_covers_ignores_street_name() {
        let outage = OutageAddress::new(7, "вул. Зелена", buildings(&["3"]), None).unwrap();
        let user = UserAddress::new(7, "Зелена", "3").unwrap();
        assert!(covers(&outage, &user));
    }

    #[test]
    fn test_outage_info_equality() {
        let a = OutageInfo::new(period(8, 16), OutageDescription::new("test"));
        let b = OutageInfo::new(period(8, 16), OutageDescription::new("test"));

        assert_eq!(a, a.clone());
        assert_eq!(a, b);
        assert_eq!(b, a);

        let other_case = OutageInfo::new(period(8, 16), OutageDescription::new("Test"));
        assert_ne!(a, other_case);

        let other_period = OutageInfo::new(period(8, 17), OutageDescription::new("test"));
        assert_ne!(a, other_period);
    }

    #[test]
    fn test_outage_info_ignores_identity() {
        let address = OutageAddress::new(1, "S", buildings(&["10"]), None).unwrap();
        let first = Outage::new(1, period(8, 16), address.clone(), OutageDescription::new("x"));
        let reissued = Outage::new(99, period(8, 16), address, OutageDescription::new("x"));
        assert_eq!(first.info(), reissued.info());
    }
}
