//! Message rendering for outage notifications.
//!
//! Handlebars-based rendering into Telegram's HTML parse mode. The period is
//! bold; every provider-supplied value goes through Handlebars' HTML escaping.

use crate::error::{NotificationError, NotificationResult};
use crate::models::OutageNotification;
use handlebars::Handlebars;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

const OUTAGE_HTML: &str = "outage_html";

/// Values substituted into the outage message.
#[derive(Debug, Serialize)]
struct OutageMessageData<'a> {
    city: &'a str,
    street: &'a str,
    start: String,
    end: String,
    comment: &'a str,
    buildings: String,
}

impl<'a> From<&'a OutageNotification> for OutageMessageData<'a> {
    fn from(notification: &'a OutageNotification) -> Self {
        Self {
            city: notification.city.as_deref().unwrap_or_default(),
            street: &notification.street_name,
            start: notification.start.format(DATE_FORMAT).to_string(),
            end: notification.end.format(DATE_FORMAT).to_string(),
            comment: &notification.comment,
            buildings: notification.buildings.join(", "),
        }
    }
}

/// Template engine for subscriber messages.
#[derive(Clone)]
pub struct TemplateEngine {
    handlebars: Arc<Handlebars<'static>>,
}

impl TemplateEngine {
    /// Create a new template engine with all templates registered.
    pub fn new() -> NotificationResult<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);

        handlebars
            .register_template_string(OUTAGE_HTML, OUTAGE_HTML_TEMPLATE)
            .map_err(|e| {
                NotificationError::Template(format!("Failed to register {OUTAGE_HTML}: {e}"))
            })?;

        Ok(Self {
            handlebars: Arc::new(handlebars),
        })
    }

    /// Render the message body sent to a subscriber.
    pub fn render_outage(&self, notification: &OutageNotification) -> NotificationResult<String> {
        debug!(chat_id = notification.chat_id, "Rendering outage message");

        let data = OutageMessageData::from(notification);
        Ok(self.handlebars.render(OUTAGE_HTML, &data)?)
    }
}

const OUTAGE_HTML_TEMPLATE: &str = "Поточні відключення:
Місто: {{city}}
Вулиця: {{street}}
<b>{{start}} – {{end}}</b>
Коментар: {{comment}}
Будинки: {{buildings}}";

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};

    fn notification() -> OutageNotification {
        let kyiv = FixedOffset::east_opt(2 * 3600).unwrap();
        OutageNotification {
            chat_id: 1,
            city: Some("Львів".to_string()),
            street_name: "Стрийська".to_string(),
            buildings: vec!["10".to_string(), "12-А".to_string()],
            start: kyiv.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap(),
            end: kyiv.with_ymd_and_hms(2024, 1, 15, 16, 30, 0).unwrap(),
            comment: "Планові роботи".to_string(),
        }
    }

    #[test]
    fn test_template_engine_creation() {
        assert!(TemplateEngine::new().is_ok());
    }

    #[test]
    fn test_render_message() {
        let engine = TemplateEngine::new().unwrap();
        assert_eq!(
            engine.render_outage(&notification()).unwrap(),
            "Поточні відключення:\nМісто: Львів\nВулиця: Стрийська\n<b>2024-01-15 08:00 – 2024-01-15 16:30</b>\nКоментар: Планові роботи\nБудинки: 10, 12-А"
        );
    }

    #[test]
    fn test_render_without_city() {
        let engine = TemplateEngine::new().unwrap();
        let mut n = notification();
        n.city = None;
        assert!(engine.render_outage(&n).unwrap().contains("Місто: \n"));
    }

    #[test]
    fn test_provider_text_is_escaped() {
        let engine = TemplateEngine::new().unwrap();
        let mut n = notification();
        n.comment = "<script> & more".to_string();
        n.street_name = "вул. \"Нова\"".to_string();

        let message = engine.render_outage(&n).unwrap();

        assert!(message.contains("Коментар: &lt;script&gt; &amp; more"));
        assert!(message.contains("Вулиця: вул. &quot;Нова&quot;"));
        assert!(message.contains("<b>"));
        assert!(!message.contains("<script>"));
    }
}
