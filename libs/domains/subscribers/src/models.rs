//! Street directory entry and the on-disk subscriber record.

use chrono::{DateTime, SecondsFormat};
use domain_outages::{ChatId, OutageDescription, OutageInfo, OutagePeriod, User, UserAddress};
use serde::{Deserialize, Serialize};

/// A street from the city directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Street {
    pub id: i64,
    pub name: String,
}

impl Street {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Case-insensitive substring match; `query` must already be lowercase.
    pub fn name_contains(&self, query: &str) -> bool {
        self.name.to_lowercase().contains(query)
    }

    /// Case-insensitive equality; `query` must already be lowercase.
    pub fn name_equals(&self, query: &str) -> bool {
        self.name.to_lowercase() == query
    }
}

/// Serialized form of one subscriber.
///
/// The notification marker is stored only when both dates are present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub street_id: i64,
    pub street_name: String,
    pub building: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl From<&User> for UserRecord {
    fn from(user: &User) -> Self {
        let mut record = UserRecord {
            street_id: user.address.street_id(),
            street_name: user.address.street_name().to_string(),
            building: user.address.building().to_string(),
            ..Default::default()
        };

        if let Some(info) = &user.outage_info {
            record.start_date = Some(
                info.period
                    .start()
                    .to_rfc3339_opts(SecondsFormat::Secs, true),
            );
            record.end_date = Some(info.period.end().to_rfc3339_opts(SecondsFormat::Secs, true));
            record.comment = Some(info.description.as_str().to_string())
                .filter(|comment| !comment.is_empty());
        }

        record
    }
}

impl UserRecord {
    /// Rebuild a domain user, validating the address and the stored period.
    pub fn into_user(self, id: ChatId) -> Result<User, String> {
        let address = UserAddress::new(self.street_id, self.street_name, self.building)
            .map_err(|e| format!("invalid address: {e}"))?;

        let start = self.start_date.filter(|s| !s.is_empty());
        let end = self.end_date.filter(|s| !s.is_empty());

        let outage_info = match (start, end) {
            (Some(start), Some(end)) => {
                let start = DateTime::parse_from_rfc3339(&start)
                    .map_err(|e| format!("invalid start_date: {e}"))?;
                let end = DateTime::parse_from_rfc3339(&end)
                    .map_err(|e| format!("invalid end_date: {e}"))?;
                let period = OutagePeriod::new(start, end)
                    .map_err(|e| format!("invalid outage period: {e}"))?;
                Some(OutageInfo::new(
                    period,
                    OutageDescription::new(self.comment.unwrap_or_default()),
                ))
            }
            _ => None,
        };

        Ok(User::new(id, address).with_outage_info(outage_info))
    }

    /// Parse the old line based `key: value` format.
    pub fn parse_legacy(content: &str) -> Result<Self, String> {
        let mut record = UserRecord::default();

        for line in content.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let Some((key, value)) = line.split_once(": ") else {
                continue;
            };
            match key {
                "street_id" => {
                    record.street_id = value
                        .parse()
                        .map_err(|e| format!("invalid street_id: {e}"))?;
                }
                "street_name" => record.street_name = value.to_string(),
                "building" => record.building = value.to_string(),
                "start_date" => record.start_date = Some(value.to_string()),
                "end_date" => record.end_date = Some(value.to_string()),
                "comment" => record.comment = Some(value.to_string()),
                _ => {}
            }
        }

        if record.street_id <= 0 || record.street_name.is_empty() || record.building.is_empty() {
            return Err("missing required fields (street_id, street_name, building)".to_string());
        }

        Ok(record)
    }
}
