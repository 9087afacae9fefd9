//! The single explicit application context.
//!
//! Everything the tick and the request handlers mutate lives here and is
//! owned by one task.  Components receive the pieces they need by
//! reference; there are no globals.

use crate::alerts::AlertEvaluator;
use crate::config::MonitorConfig;
use crate::dispatcher::NotificationDispatcher;
use crate::model::{Reading, Settings};
use crate::session::SessionAuthority;

pub struct AppContext {
    /// Latest value per channel, overwritten in place by the sampler.
    pub reading: Reading,
    /// In-memory alert settings, loaded once at startup.
    pub settings: Settings,
    pub session: Box<dyn SessionAuthority + Send>,
    pub dispatcher: NotificationDispatcher,
    pub alerts: AlertEvaluator,
}

impl AppContext {
    pub fn new(
        config: &MonitorConfig,
        settings: Settings,
        session: Box<dyn SessionAuthority + Send>,
    ) -> Self {
        Self {
            reading: Reading::default(),
            settings,
            session,
            dispatcher: NotificationDispatcher::new(
                config.modem.step_delay_ms,
                config.modem.send_wait_ms,
            ),
            alerts: AlertEvaluator::new(config.timing.alert_cooldown_ms),
        }
    }
}
