use std::time::Duration;

use crate::cooldown::DEFAULT_RESEND_COOLDOWN_SECS;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntrySettings {
    /// Seconds the resend action stays locked after mount and after every
    /// confirmed resend.
    pub resend_cooldown_secs: u32,
    /// Wall-clock length of one cooldown step.
    pub tick_period: Duration,
}

impl Default for EntrySettings {
    fn default() -> Self {
        Self {
            resend_cooldown_secs: DEFAULT_RESEND_COOLDOWN_SECS,
            tick_period: Duration::from_secs(1),
        }
    }
}
