//! Operator-facing tables for the `outages` and `users` commands.

use chrono::{DateTime, FixedOffset};
use comfy_table::{Table, presets::UTF8_FULL};
use domain_notifications::{ChatDirectory, ChatInfo};
use domain_outages::{Outage, User};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

const DATE_TIME_FORMAT: &str = "%d.%m.%Y %H:%M";
const TIME_FORMAT: &str = "%H:%M";

/// Unicode format characters and the Hangul filler, used to fake blank names.
static INVISIBLE_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\p{Cf}\x{3164}]").expect("invisible char pattern is a valid regex"));

/// `DD.MM.YYYY HH:MM - HH:MM` within one day, full end date otherwise.
pub fn format_period(start: DateTime<FixedOffset>, end: DateTime<FixedOffset>) -> String {
    if start.date_naive() == end.date_naive() {
        format!("{} - {}", start.format(DATE_TIME_FORMAT), end.format(TIME_FORMAT))
    } else {
        format!("{} - {}", start.format(DATE_TIME_FORMAT), end.format(DATE_TIME_FORMAT))
    }
}

/// Strip invisible characters; blank results become `-`.
pub fn sanitize(value: &str) -> String {
    let cleaned = INVISIBLE_CHARS.replace_all(value, "");
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        "-".to_string()
    } else {
        trimmed.to_string()
    }
}

fn or_dash(value: &str) -> String {
    if value.is_empty() {
        "-".to_string()
    } else {
        value.to_string()
    }
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(header);
    table
}

pub fn render_outages(outages: &[Outage]) -> String {
    if outages.is_empty() {
        return "No outages found.".to_string();
    }

    let mut table = new_table(vec!["StreetID", "Street", "Buildings", "Period", "Comment"]);
    for outage in outages {
        table.add_row(vec![
            outage.address.street_id().to_string(),
            outage.address.street_name().to_string(),
            outage.address.buildings().join(", "),
            format_period(outage.period.start(), outage.period.end()),
            outage.description.to_string(),
        ]);
    }
    table.to_string()
}

fn user_row(user: &User, info: &ChatInfo) -> Vec<String> {
    let username = info
        .username
        .as_deref()
        .filter(|u| !u.is_empty())
        .map(|u| format!("@{u}"))
        .unwrap_or_else(|| "-".to_string());

    let (outage, comment) = match &user.outage_info {
        Some(marker) => (
            format_period(marker.period.start(), marker.period.end()),
            or_dash(marker.description.as_str()),
        ),
        None => ("-".to_string(), "-".to_string()),
    };

    vec![
        info.chat_id.to_string(),
        username,
        sanitize(info.first_name.as_deref().unwrap_or_default()),
        sanitize(info.last_name.as_deref().unwrap_or_default()),
        user.address.street_name().to_string(),
        user.address.building().to_string(),
        outage,
        comment,
    ]
}

/// Table of `users` (already ordered) enriched with chat profiles.
///
/// Chats whose profile cannot be fetched are logged and left out.
pub async fn render_users<D: ChatDirectory>(users: &[User], directory: &D) -> String {
    if users.is_empty() {
        return "No users found.".to_string();
    }

    let mut table = new_table(vec![
        "Chat ID",
        "Username",
        "First Name",
        "Last Name",
        "Street",
        "Building",
        "Outage",
        "Comment",
    ]);

    let mut listed = 0;
    for user in users {
        match directory.chat_info(user.id).await {
            Ok(info) => {
                table.add_row(user_row(user, &info));
                listed += 1;
            }
            Err(e) => warn!(chat_id = user.id, error = %e, "Failed to get chat info"),
        }
    }

    format!("{table}\n\nTotal Users: {listed}")
}
