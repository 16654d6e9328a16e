//! S4: notification-driven regulation of the archival cadence.

use crate::prelude::{write_config, ConfigOptions};
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use strata_core::{FakeClock, Level, Topology};
use strata_engine::{Context, NotificationRule};

#[test]
fn a_single_event_halves_the_interval_for_one_minute() {
    let dir = tempfile::tempdir().unwrap();
    // Keep the lower tiers quiet so only regulation is observable.
    let config = write_config(
        dir.path(),
        &ConfigOptions {
            intervals: [1000, 1000, 1000, 30],
            ..ConfigOptions::default()
        },
    );
    let clock = FakeClock::new();
    let mut context =
        Context::init_with_clock(&config, Topology::solo(), None, Arc::new(clock.clone()))
            .unwrap();
    context.set_notification_rules(vec![NotificationRule {
        component: 1,
        event: 54,
        min_count: 0,
        target: Level::L4,
        freq_multiplier: 2,
        duration_minutes: 1,
    }]);

    // Minutes 1..=9 pass without events.
    for _ in 1..=9 {
        clock.advance(Duration::from_secs(60));
        context.snapshot().unwrap();
    }
    assert_eq!(context.current_interval(Level::L4), 30);

    // The event source reports an L2-cache correctable burst before
    // minute 10 ticks.
    let mut log = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.path().join("notifications.log"))
        .unwrap();
    writeln!(log, "1438713560|154000|CPU:L2DCE correctable burst").unwrap();
    drop(log);

    clock.advance(Duration::from_secs(60));
    context.snapshot().unwrap();
    assert_eq!(context.ckpt_count(), 10);
    assert_eq!(context.current_interval(Level::L4), 15);

    // One minute later the window closes and the base cadence returns.
    clock.advance(Duration::from_secs(60));
    context.snapshot().unwrap();
    assert_eq!(context.ckpt_count(), 11);
    assert_eq!(context.current_interval(Level::L4), 30);
}
