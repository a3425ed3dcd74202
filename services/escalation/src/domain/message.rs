use chrono::{DateTime, Utc};

use crate::domain::types::CheckIn;

/// Alert content sent to every contact of an escalated check-in.
///
/// Parameterized by owner name, check-in title and scheduled time only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertMessage {
    pub sms_text: String,
    pub email_subject: String,
    pub email_body: String,
}

impl AlertMessage {
    pub fn for_check_in(check_in: &CheckIn) -> Self {
        Self::render(&check_in.owner_name, &check_in.title, check_in.scheduled_time)
    }

    pub fn render(owner_name: &str, title: &str, scheduled_time: DateTime<Utc>) -> Self {
        let when = scheduled_time.format("%Y-%m-%d %H:%M UTC");
        Self {
            sms_text: format!(
                "SAFETY ALERT: {owner_name} did not check in after \"{title}\" \
                 (scheduled {when}). You are listed as an emergency contact. \
                 Please try to reach them."
            ),
            email_subject: format!("Safety alert: {owner_name} missed a check-in"),
            email_body: format!(
                "Hello,\n\n\
                 {owner_name} scheduled a safety check-in \"{title}\" for {when} \
                 and did not confirm they were safe before the deadline.\n\n\
                 You are listed as one of their emergency contacts. Please try to \
                 reach them, and contact local emergency services if you believe \
                 they are in danger.\n"
            ),
        }
    }
}
