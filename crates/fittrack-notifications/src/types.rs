use serde::{Deserialize, Serialize};

/// Channel carrying ready-made notifications.
pub const NOTIFICATION_CHANNEL: &str = "notifications";

/// Channel carrying water-intake progress updates.
pub const WATER_INTAKE_CHANNEL: &str = "water-intake";

pub const WATER_GOAL_TITLE: &str = "Water goal reached";
pub const WATER_GOAL_MESSAGE: &str =
    "Congratulations! You have reached your daily water intake goal.";
pub const WATER_KIND: &str = "water";

/// Kind used when a queued notification does not name one.
pub const DEFAULT_KIND: &str = "info";

fn default_kind() -> String {
    DEFAULT_KIND.to_string()
}

/// A notification to persist for a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewNotification {
    pub user_id: String,
    pub title: String,
    pub message: String,
    pub kind: String,
}

/// Entry on the notification channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationEnvelope {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub notification: Option<NotificationBody>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationBody {
    pub title: String,
    pub message: String,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
}

/// Entry on the water-intake channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaterIntakeUpdate {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub intake: Option<f64>,
    #[serde(default)]
    pub target_intake: Option<f64>,
}

impl WaterIntakeUpdate {
    /// `true` when the update reports a reached goal. Zero or missing
    /// amounts never qualify.
    pub fn goal_reached(&self) -> bool {
        match (self.intake, self.target_intake) {
            (Some(intake), Some(target)) if intake != 0.0 && target != 0.0 => intake >= target,
            _ => false,
        }
    }
}
