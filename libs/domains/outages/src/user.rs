//! Subscriber address and the subscriber entity.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{ValidationError, ValidationResult};
use crate::models::{Outage, OutageInfo};

/// Telegram chat id of a subscriber.
pub type ChatId = i64;

/// Digits, optionally followed by a dash and one uppercase Latin or Ukrainian letter.
static BUILDING_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9]+(-[A-ZА-ЯІЇЄҐ])?$").expect("building pattern is a valid regex")
});

/// A subscriber's street address, validated at subscription time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAddress {
    street_id: i64,
    street_name: String,
    building: String,
}

impl UserAddress {
    pub fn new(
        street_id: i64,
        street_name: impl Into<String>,
        building: impl Into<String>,
    ) -> ValidationResult<Self> {
        let street_name = street_name.into();
        let building = building.into();

        if street_id <= 0 {
            return Err(ValidationError::InvalidStreetId(street_id));
        }
        if street_name.trim().is_empty() {
            return Err(ValidationError::EmptyStreetName);
        }
        if building.trim().is_empty() {
            return Err(ValidationError::EmptyBuilding);
        }
        if !BUILDING_PATTERN.is_match(&building) {
            return Err(ValidationError::InvalidBuildingFormat(building));
        }

        Ok(Self {
            street_id,
            street_name,
            building,
        })
    }

    pub fn street_id(&self) -> i64 {
        self.street_id
    }

    pub fn street_name(&self) -> &str {
        &self.street_name
    }

    pub fn building(&self) -> &str {
        &self.building
    }
}

/// A subscriber and the last outage they were told about.
///
/// Values are snapshots: notifying a user produces a new `User` that the
/// caller hands back to the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: ChatId,
    pub address: UserAddress,
    pub outage_info: Option<OutageInfo>,
}

impl User {
    /// A fresh subscription that has never been notified.
    pub fn new(id: ChatId, address: UserAddress) -> Self {
        Self {
            id,
            address,
            outage_info: None,
        }
    }

    pub fn with_outage_info(mut self, info: Option<OutageInfo>) -> Self {
        self.outage_info = info;
        self
    }

    /// Copy of this user marked as notified about `outage`.
    pub fn with_notified_outage(&self, outage: &Outage) -> Self {
        Self {
            id: self.id,
            address: self.address.clone(),
            outage_info: Some(outage.info()),
        }
    }

    /// True only when a stored marker exists and equals `info`.
    pub fn is_already_notified_about(&self, info: &OutageInfo) -> bool {
        self.outage_info.as_ref() == Some(info)
    }
}

/// Free-function form of [`User::is_already_notified_about`].
pub fn already_notified(user: &User, info: &OutageInfo) -> bool {
    user.is_already_notified_about(info)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{OutageAddress, OutageDescription, OutagePeriod};
    use chrono::{TimeZone, Utc};

    fn info(comment: &str) -> OutageInfo {
        let start = Utc.with_ymd_and_hms(2024, 3, 15, 8, 0, 0).unwrap().fixed_offset();
        let end = Utc.with_ymd_and_hms(2024, 3, 15, 16, 0, 0).unwrap().fixed_offset();
        OutageInfo::new(
            OutagePeriod::new(start, end).unwrap(),
            OutageDescription::new(comment),
        )
    }

    #[test]
    fn test_user_address_accepts_valid_buildings() {
        for building in ["1", "13", "105", "13-А", "7-B", "2-Ї", "4-Ґ", "9-Є", "3-І"] {
            assert!(
                UserAddress::new(1, "Стрийська", building).is_ok(),
                "building {building} should be valid"
            );
        }
    }

    #[test]
    fn test_user_address_rejects_invalid_buildings() {
        for building in ["13а", "13-а", "13/2", "13-АБ", "А", "13 А", "-1", "13-"] {
            assert_eq!(
                UserAddress::new(1, "Стрийська", building),
                Err(ValidationError::InvalidBuildingFormat(building.to_string())),
                "building {building} should be rejected"
            );
        }
        assert_eq!(
            UserAddress::new(1, "Стрийська", "  "),
            Err(ValidationError::EmptyBuilding)
        );
    }

    #[test]
    fn test_user_address_rejects_bad_street() {
        assert_eq!(
            UserAddress::new(-5, "Стрийська", "10"),
            Err(ValidationError::InvalidStreetId(-5))
        );
        assert_eq!(
            UserAddress::new(1, "", "10"),
            Err(ValidationError::EmptyStreetName)
        );
    }

    #[test]
    fn test_never_notified_user_is_not_already_notified() {
        let user = User::new(1, UserAddress::new(1, "S", "10").unwrap());
        assert!(!user.is_already_notified_about(&info("test")));
    }

    #[test]
    fn test_already_notified_compares_period_and_description() {
        let user = User::new(1, UserAddress::new(1, "S", "10").unwrap())
            .with_outage_info(Some(info("test")));

        assert!(already_notified(&user, &info("test")));
        assert!(!already_notified(&user, &info("test updated")));
    }

    #[test]
    fn test_with_notified_outage_returns_new_value() {
        let user = User::new(42, UserAddress::new(1, "S", "10").unwrap());
        let marker = info("planned works");
        let outage = Outage::new(
            5,
            marker.period,
            OutageAddress::new(1, "S", vec!["10".to_string()], None).unwrap(),
            marker.description.clone(),
        );

        let notified = user.with_notified_outage(&outage);

        assert_eq!(user.outage_info, None);
        assert_eq!(notified.id, 42);
        assert_eq!(notified.address, user.address);
        assert_eq!(notified.outage_info, Some(marker));
    }
}
