//! Selection of the outage a subscriber should hear about in this run.

use crate::models::Outage;
use crate::user::User;

/// Find the outage to notify `user` about.
///
/// Only the first outage (in list order) that covers the user's address is
/// considered. If the user was already notified about that one, the scan
/// stops and nothing is returned, even when a later outage would also match.
pub fn find_outage_for_notification<'a>(user: &User, outages: &'a [Outage]) -> Option<&'a Outage> {
    let outage = outages.iter().find(|o| o.affects(&user.address))?;

    if user.is_already_notified_about(&outage.info()) {
        return None;
    }

    Some(outage)
}
