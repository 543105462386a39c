//! In-process quest scheduler.
//!
//! Optional alternative to the external cron caller: when `DAILY_CRON` or
//! `WEEKLY_CRON` is set, a task per class sleeps until the next fire time
//! and runs a quest cycle. Both paths share the same [`QuestCycle`].
//!
//! [`QuestCycle`]: crate::cycle::QuestCycle

use std::str::FromStr;
use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use cron::Schedule;
use tracing::{info, warn};

use usquest_core::config::CronConfig;
use usquest_core::Frequency;

use crate::state::AppState;

/// Parse and spawn a scheduler task for every configured schedule.
///
/// An invalid expression fails startup rather than silently never firing.
pub fn spawn_quest_schedulers(state: Arc<AppState>, cron: &CronConfig) -> anyhow::Result<()> {
    let configured = [
        (Frequency::Daily, cron.daily_schedule.as_deref()),
        (Frequency::Weekly, cron.weekly_schedule.as_deref()),
    ];

    for (frequency, expr) in configured {
        let Some(expr) = expr else {
            info!(%frequency, "scheduler: no schedule configured — waiting for external triggers");
            continue;
        };
        let schedule = parse_cron(expr)
            .with_context(|| format!("invalid {frequency} cron expression '{expr}'"))?;
        tokio::spawn(run_quest_scheduler(state.clone(), frequency, schedule));
    }

    Ok(())
}

/// Fire a quest cycle at every upcoming time of `schedule`.
pub async fn run_quest_scheduler(state: Arc<AppState>, frequency: Frequency, schedule: Schedule) {
    loop {
        let Some(next_fire) = schedule.upcoming(Utc).next() else {
            warn!(%frequency, "scheduler: schedule has no upcoming fire time — stopping");
            return;
        };
        info!(%frequency, next_fire = %next_fire, "scheduler: next quest cycle scheduled");

        let wait = (next_fire - Utc::now()).to_std().unwrap_or_default();
        tokio::time::sleep(wait).await;

        match state.cycle.run(frequency).await {
            Ok(report) => info!(
                %frequency,
                trigger = "scheduled",
                quest_id = %report.assignment.record.quest_id,
                "scheduler: quest cycle finished"
            ),
            Err(e) => warn!(
                %frequency,
                trigger = "scheduled",
                error = %e,
                "scheduler: quest cycle failed"
            ),
        }
    }
}

/// Parse a cron expression, accepting both 5-field and 6-field formats.
///
/// The `cron` crate expects 6 fields (sec min hour dom month dow).
/// Standard crontab uses 5 fields (min hour dom month dow), so a seconds
/// field of `0` is prepended when 5 fields are given.
pub fn parse_cron(expr: &str) -> Result<Schedule, cron::error::Error> {
    let parts: Vec<&str> = expr.split_whitespace().collect();
    if parts.len() == 5 {
        let six_field = format!("0 {}", expr);
        Schedule::from_str(&six_field)
    } else {
        Schedule::from_str(expr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_parse_cron_five_field_auto_prefix() {
        // Daily at 09:00
        let schedule = parse_cron("0 9 * * *").unwrap();
        let next = schedule.upcoming(Utc).next().unwrap();
        assert_eq!((next.hour(), next.minute(), next.second()), (9, 0, 0));
    }

    #[test]
    fn test_parse_cron_six_field() {
        let schedule = parse_cron("0 0 12 * * Mon").unwrap();
        assert!(schedule.upcoming(Utc).next().is_some());
    }

    #[test]
    fn test_parse_cron_invalid() {
        assert!(parse_cron("not a cron").is_err());
    }
}
