//! The uptime accrual and farmer-bot compliance state machine.
//!
//! Three phases run in order over a single [`NodeState`]:
//!
//! 1. [`process_period`] replays events strictly inside `[period.start, period.end]`.
//! 2. [`process_post_period`] replays events in `(period.end, period.end + POST_PERIOD_SECONDS]`,
//!    crediting at most one uptime event after the period ended.
//! 3. [`final_check`] applies terminal boot-failure logic.
//!
//! Control flow is single-threaded and deterministic given a fixed,
//! pre-sorted event sequence.

use log::Level;

use crate::error::AccrualError;
use crate::event::{Event, Power};
use crate::event_source::{EventSource, InitialPower};
use crate::logger::MintingLogger;
use crate::node_state::NodeState;
use crate::period::Period;

pub const UPTIME_GRACE_PERIOD_SECONDS: i64 = 60;
pub const CLOCK_SKEW_INTERVAL: i64 = 2 * UPTIME_GRACE_PERIOD_SECONDS;
pub const NODE_UPTIME_REPORT_INTERVAL_SECONDS: i64 = 60 * 40;
pub const MAX_UPTIME_CREDIT: u64 =
    (NODE_UPTIME_REPORT_INTERVAL_SECONDS + UPTIME_GRACE_PERIOD_SECONDS) as u64;
pub const MAX_POWER_MANAGER_DOWNTIME: i64 = 60 * 60 * 24;
pub const MAX_POWER_MANAGER_BOOT_TIME: i64 = 60 * 30;
pub const MAX_ALLOWED_BOOT_VIOLATIONS: u32 = 1;
pub const POST_PERIOD_SECONDS: i64 = 60 * 60 * 27;

/// Builds a fresh [`NodeState`] for `node_id`/`period` from whatever the
/// event source reports as the initial power snapshot, runs all three
/// accrual phases, and returns the resulting node.
pub fn run_period(
    source: &dyn EventSource,
    node_id: u32,
    period: Period,
    logger: &mut dyn MintingLogger,
) -> Result<NodeState, AccrualError> {
    let initial = source
        .get_initial_power(node_id, period.start)
        .unwrap_or_else(|| {
            logger.log(
                Level::Info,
                node_id,
                "no initial power row found, defaulting to Up/Up".to_string(),
            );
            InitialPower::default()
        });

    let mut node = NodeState::new(node_id, period);
    apply_initial_power(&mut node, &initial);

    let period_events = source.get_events(node_id, period.start, period.end);
    let post_period_events = source.get_events(
        node_id,
        period.end + 1,
        period.end + POST_PERIOD_SECONDS,
    );

    process_period(&mut node, &period_events, logger)?;
    process_post_period(&mut node, &post_period_events, logger)?;
    final_check(
        &mut node,
        initial.timestamp.unwrap_or(period.start),
        period.end,
        logger,
    );

    Ok(node)
}

/// Seeds `power_target`/`power_state`/`power_managed`/`power_manage_boot`
/// from the period-start snapshot.
pub fn apply_initial_power(node: &mut NodeState, initial: &InitialPower) {
    node.power_target = initial.target;
    node.power_state = initial.state;
    if initial.state == Power::Down {
        node.power_managed = initial.down_time;
        node.power_manage_boot = if initial.target == Power::Up {
            initial.timestamp
        } else {
            None
        };
    } else {
        node.power_managed = None;
        node.power_manage_boot = None;
    }
}

/// Replays events strictly inside the period.
pub fn process_period(
    node: &mut NodeState,
    events: &[Event],
    logger: &mut dyn MintingLogger,
) -> Result<(), AccrualError> {
    node.last_uptime_added_ts = node.period.start;

    for event in events {
        match *event {
            Event::NodeUptimeReported {
                uptime, timestamp, ..
            } => handle_uptime_in_period(node, uptime, timestamp, logger)?,
            Event::PowerTargetChanged { target, timestamp, .. } => {
                handle_target_changed(node, target, timestamp, logger);
            }
            Event::PowerStateChanged { state, timestamp, .. } => {
                handle_state_changed_in_period(node, state, timestamp, logger)?;
            }
        }
    }

    Ok(())
}

fn handle_uptime_in_period(
    node: &mut NodeState,
    ru: u64,
    t: i64,
    logger: &mut dyn MintingLogger,
) -> Result<(), AccrualError> {
    match (node.power_managed, node.power_manage_boot) {
        (Some(time_set_down), Some(boot_request)) => {
            if t - ru as i64 <= time_set_down {
                logger.log(
                    Level::Info,
                    node.id,
                    "ignoring uptime event as it happened before the node powered down after being requested to do so".to_string(),
                );
                return Ok(());
            }

            let time_delta = t - time_set_down;
            if time_delta < 0 {
                return Err(AccrualError::TimeTravel {
                    node_id: node.id,
                    timestamp: t,
                    detail: "uptime events can't travel back in time".to_string(),
                });
            }

            let mut total = node.uptime_info.map(|(_, _, total)| total).unwrap_or(0);
            let mut credit_ok = true;

            if time_delta > MAX_POWER_MANAGER_DOWNTIME {
                credit_ok = false;
                logger.log(
                    Level::Warn,
                    node.id,
                    format!(
                        "refusing to credit uptime for power managed node as the last boot was {} seconds ago, more than the allowed 24 hours",
                        time_delta
                    ),
                );
            }
            if (t - ru as i64) - boot_request > MAX_POWER_MANAGER_BOOT_TIME {
                credit_ok = false;
                node.boot_duration_violations += 1;
                logger.log(
                    Level::Warn,
                    node.id,
                    format!(
                        "detected farmer bot boot violation: request was done at {} but node only came online at {}",
                        boot_request,
                        t - ru as i64
                    ),
                );
            }

            if credit_ok {
                if time_set_down < node.period.start {
                    let credit = (t - node.period.start) as u64;
                    total += credit;
                    logger.log(
                        Level::Debug,
                        node.id,
                        format!("crediting standby node with {credit} seconds of uptime for its first wakeup of the period"),
                    );
                    node.credit_uptime(
                        credit,
                        t,
                        "Crediting standby node for first wakeup of the period",
                        false,
                    );
                } else {
                    let credit = time_delta as u64;
                    total += credit;
                    logger.log(
                        Level::Debug,
                        node.id,
                        format!("crediting standby node with {credit} seconds of uptime"),
                    );
                    node.credit_uptime(credit, t, "Crediting standby node", false);
                }
            }

            node.power_managed = None;
            node.power_manage_boot = None;
            node.uptime_info = Some((t, ru, total));
            node.boot_time = Some((t - ru as i64, t));
        }
        (Some(_), None) => {
            logger.log(
                Level::Info,
                node.id,
                "ignoring boot for power managed node which did not get a boot request from the farmer bot".to_string(),
            );
        }
        (None, Some(_)) => {
            logger.log(
                Level::Info,
                node.id,
                "ignoring uptime after farmer bot asked for a boot while the node was not sleeping as a result of farmer bot".to_string(),
            );
        }
        (None, None) => {
            credit_normal_uptime(node, ru, t, logger, false)?;
        }
    }

    Ok(())
}

/// Normal accounting, with no farmer-bot scheduling in play. Shared between
/// `process_period` and `process_post_period`, which
/// differ only in how far into the past `uptime_info` may reach and how
/// much is credited once it is confirmed.
fn credit_normal_uptime(
    node: &mut NodeState,
    ru: u64,
    t: i64,
    logger: &mut dyn MintingLogger,
    post_period: bool,
) -> Result<(), AccrualError> {
    let Some((lra, lru, total)) = node.uptime_info else {
        // First uptime event of the period. Post-period never reaches this:
        // by construction `uptime_info` is always populated by the time
        // `process_post_period` runs, or the event is silently ignored (see
        // `process_post_period`'s own dispatch).
        let period_duration = t - node.period.start;
        let credited = period_duration.max(0).min(ru as i64).min(MAX_UPTIME_CREDIT as i64) as u64;
        logger.log(
            Level::Debug,
            node.id,
            format!("added {credited} seconds of uptime for the first report of the period"),
        );
        node.credit_uptime(credited, t, "Possibly scaled to period start", false);
        node.uptime_info = Some((t, ru, credited));
        node.boot_time = Some((t - ru as i64, t));
        return Ok(());
    };

    if post_period && lra >= node.period.end {
        return Ok(());
    }

    let mut total = total;
    let report_delta = t - lra;
    let uptime_delta = ru as i64 - lru as i64;

    if uptime_delta > report_delta + UPTIME_GRACE_PERIOD_SECONDS {
        node.uptime_info = Some((t, ru, total));
        logger.log(
            Level::Warn,
            node.id,
            format!(
                "reported an uptime increase of {} seconds, while reports are {} seconds apart",
                uptime_delta, report_delta
            ),
        );
        return Ok(());
    }

    if (report_delta - UPTIME_GRACE_PERIOD_SECONDS..=report_delta + UPTIME_GRACE_PERIOD_SECONDS)
        .contains(&uptime_delta)
    {
        check_clock_skew(node, ru, t, logger)?;

        if uptime_delta > 0 {
            if post_period {
                let delta_in_period = node.period.end - lra;
                let credit = (delta_in_period.max(0) as u64).min(MAX_UPTIME_CREDIT);
                total += credit;
                let note = if credit as i64 != delta_in_period {
                    "Less than reported, gap is too big. Possibly scaled to period end"
                } else {
                    "Possibly scaled to period end"
                };
                logger.log(Level::Debug, node.id, format!("added {credit} seconds of uptime"));
                node.credit_uptime(credit, t, note, true);
            } else {
                let credit = (uptime_delta as u64).min(MAX_UPTIME_CREDIT);
                total += credit;
                let note = if credit as i64 != uptime_delta {
                    "Less than reported, gap is too big"
                } else {
                    ""
                };
                logger.log(Level::Debug, node.id, format!("added {credit} seconds of uptime"));
                node.credit_uptime(credit, t, note, false);
            }
            node.uptime_info = Some((t, ru, total));
            return Ok(());
        }
        // uptime_delta <= 0: falls through to reboot detection below.
    }

    reboot_detection(node, ru, lru, report_delta, t, total, logger, post_period)
}

fn check_clock_skew(
    node: &mut NodeState,
    ru: u64,
    t: i64,
    logger: &mut dyn MintingLogger,
) -> Result<(), AccrualError> {
    match node.boot_time {
        Some((boot, _detected)) => {
            let new_boot = t - ru as i64;
            if (new_boot - boot).abs() >= CLOCK_SKEW_INTERVAL {
                logger.log(
                    Level::Warn,
                    node.id,
                    format!(
                        "detected clock skew of {} seconds, more than the allowed {} seconds",
                        (new_boot - boot).abs(),
                        CLOCK_SKEW_INTERVAL
                    ),
                );
            }
            Ok(())
        }
        None => Err(AccrualError::MissingBootTime {
            node_id: node.id,
            timestamp: t,
        }),
    }
}

#[allow(clippy::too_many_arguments)]
fn reboot_detection(
    node: &mut NodeState,
    ru: u64,
    lru: u64,
    report_delta: i64,
    t: i64,
    mut total: u64,
    logger: &mut dyn MintingLogger,
    post_period: bool,
) -> Result<(), AccrualError> {
    if (ru as i64) <= report_delta {
        if post_period {
            let out_of_period = t - node.period.end;
            if out_of_period < ru as i64 {
                let credit = ((ru as i64 - out_of_period) as u64).min(MAX_UPTIME_CREDIT);
                total += credit;
                let note = if credit as i64 != ru as i64 - out_of_period {
                    "Less than reported, gap is too big. Possibly scaled to period end"
                } else {
                    "Node rebooted. Possibly scaled to period end"
                };
                logger.log(
                    Level::Debug,
                    node.id,
                    format!("added {credit} seconds of uptime after detecting a reboot"),
                );
                node.credit_uptime(credit, t, note, true);
            }
        } else {
            let credit = ru.min(MAX_UPTIME_CREDIT);
            total += credit;
            let note = if credit != ru {
                "Less than reported, gap is too big"
            } else {
                "Node rebooted"
            };
            logger.log(
                Level::Debug,
                node.id,
                format!("added {credit} seconds of uptime after detecting a reboot"),
            );
            node.credit_uptime(credit, t, note, false);
        }
        node.uptime_info = Some((t, ru, total));
        node.boot_time = Some((t - ru as i64, t));
        return Ok(());
    }

    if ru > lru {
        logger.log(
            Level::Warn,
            node.id,
            format!(
                "reported uptime of {} seconds, so time would have advanced slower on the node than in the universe",
                ru
            ),
        );
        return Ok(());
    }

    logger.log(
        Level::Warn,
        node.id,
        format!(
            "reported uptime of {} seconds, so time would have advanced faster on the node than in the universe",
            ru
        ),
    );
    Ok(())
}

fn handle_target_changed(node: &mut NodeState, target: Power, t: i64, logger: &mut dyn MintingLogger) {
    logger.log(
        Level::Debug,
        node.id,
        format!("power target changed from {:?} to {:?}", node.power_target, target),
    );
    if target == Power::Up && node.power_state == Power::Down && node.power_manage_boot.is_none() {
        node.power_manage_boot = Some(t);
        logger.log(Level::Debug, node.id, "remembered boot request time".to_string());
    }
    node.power_target = target;
}

fn handle_state_changed_in_period(
    node: &mut NodeState,
    state: Power,
    t: i64,
    logger: &mut dyn MintingLogger,
) -> Result<(), AccrualError> {
    logger.log(
        Level::Debug,
        node.id,
        format!("power state changed from {:?} to {:?}", node.power_state, state),
    );

    if node.power_target == Power::Down && node.power_state == Power::Up && state == Power::Down {
        if node.power_managed.is_none() {
            node.power_managed = Some(t);
            if let Some((lra, _lru, total)) = node.uptime_info {
                let delta = t - lra;
                if delta < 0 {
                    return Err(AccrualError::TimeTravel {
                        node_id: node.id,
                        timestamp: t,
                        detail: "power state changes can't travel back in time".to_string(),
                    });
                }
                let new_total = total + delta as u64;
                logger.log(
                    Level::Debug,
                    node.id,
                    format!("added {delta} seconds of uptime before the node went to sleep"),
                );
                node.credit_uptime(delta as u64, t, "Node is going to sleep", false);
                node.uptime_info = Some((t, 0, new_total));
            }
            logger.log(Level::Debug, node.id, "remembered farmer bot shutdown".to_string());
        }
    }

    node.power_state = state;
    Ok(())
}

/// Replays events in `(period.end, period.end + POST_PERIOD_SECONDS]`.
/// Accepts at most one uptime event after `period.end`; the scaling rules
/// differ from [`process_period`] throughout.
pub fn process_post_period(
    node: &mut NodeState,
    events: &[Event],
    logger: &mut dyn MintingLogger,
) -> Result<(), AccrualError> {
    for event in events {
        match *event {
            Event::NodeUptimeReported {
                uptime, timestamp, ..
            } => handle_uptime_post_period(node, uptime, timestamp, logger)?,
            Event::PowerTargetChanged { target, timestamp, .. } => {
                handle_target_changed(node, target, timestamp, logger);
            }
            Event::PowerStateChanged { state, timestamp, .. } => {
                handle_state_changed_post_period(node, state, timestamp, logger);
            }
        }
    }
    Ok(())
}

fn handle_uptime_post_period(
    node: &mut NodeState,
    ru: u64,
    t: i64,
    logger: &mut dyn MintingLogger,
) -> Result<(), AccrualError> {
    match (node.power_managed, node.power_manage_boot) {
        (Some(time_set_down), Some(boot_request)) => {
            let time_delta = t - time_set_down;
            if time_delta < 0 {
                return Err(AccrualError::TimeTravel {
                    node_id: node.id,
                    timestamp: t,
                    detail: "uptime events can't travel back in time".to_string(),
                });
            }

            let mut total = match node.uptime_info {
                Some((lra, _, total)) if lra > node.end_ts => {
                    logger.log(
                        Level::Info,
                        node.id,
                        "ignoring more than 1 farmer bot uptime event after period".to_string(),
                    );
                    return Ok(());
                }
                Some((_, _, total)) => total,
                None => 0,
            };

            if (t - ru as i64) - boot_request > MAX_POWER_MANAGER_BOOT_TIME {
                node.boot_duration_violations += 1;
                logger.log(
                    Level::Warn,
                    node.id,
                    format!(
                        "detected farmer bot boot violation: request was done at {} but node never booted",
                        boot_request
                    ),
                );
            } else if time_delta <= MAX_POWER_MANAGER_DOWNTIME {
                let uptime_diff = node.period.end - time_set_down.max(node.period.start);
                if uptime_diff < 0 {
                    logger.log(
                        Level::Info,
                        node.id,
                        "ignoring farmer bot wakeup which went down after the period ended".to_string(),
                    );
                } else {
                    total += uptime_diff as u64;
                    logger.log(
                        Level::Debug,
                        node.id,
                        format!("added {uptime_diff} seconds of uptime for the scheduled wakeup"),
                    );
                    node.credit_uptime(uptime_diff as u64, t, "Farmerbot post period", true);
                }
            }

            node.power_managed = None;
            node.power_manage_boot = None;
            node.uptime_info = Some((t, ru, total));
            node.boot_time = Some((t - ru as i64, t));
        }
        (Some(_), None) => {
            logger.log(
                Level::Info,
                node.id,
                "ignoring boot for power managed node which did not get a boot request from the farmer bot in the period".to_string(),
            );
        }
        (None, Some(_)) => {
            logger.log(
                Level::Info,
                node.id,
                "ignoring uptime after farmer bot asked for a boot while the node was not sleeping as a result of farmer bot".to_string(),
            );
        }
        (None, None) => {
            if node.uptime_info.is_some() {
                credit_normal_uptime(node, ru, t, logger, true)?;
            }
        }
    }

    Ok(())
}

fn handle_state_changed_post_period(node: &mut NodeState, state: Power, t: i64, logger: &mut dyn MintingLogger) {
    logger.log(
        Level::Debug,
        node.id,
        format!("power state changed from {:?} to {:?}", node.power_state, state),
    );
    // Unlike `process_period`, this does not gate on `power_target == Down`,
    // and `power_state` is only assigned inside the innermost branch. The
    // reference Python implementation behaves the same way here, and we
    // keep the asymmetry rather than "fixing" it.
    if node.power_state == Power::Up && state == Power::Down && node.power_managed.is_none() {
        node.power_managed = Some(t);
        logger.log(Level::Debug, node.id, "remembered farmer bot shutdown".to_string());
        node.power_state = state;
    }
}

/// Terminal boot-failure logic, run after both phases complete.
pub fn final_check(
    node: &mut NodeState,
    start_block_ts: i64,
    end_block_ts: i64,
    logger: &mut dyn MintingLogger,
) {
    if let Some(boot_request) = node.power_manage_boot {
        if boot_request == start_block_ts {
            logger.log(
                Level::Info,
                node.id,
                "not giving a slow boot violation since it never tried to boot in the first place".to_string(),
            );
        } else if boot_request > end_block_ts {
            logger.log(
                Level::Info,
                node.id,
                "not giving a slow boot violation since the wakeup request happened post period".to_string(),
            );
        } else {
            node.boot_duration_violations += 1;
            logger.log(
                Level::Warn,
                node.id,
                format!(
                    "detected farmer bot boot violation: request was done at {} but node never booted",
                    boot_request
                ),
            );
        }
    }

    if let Some(tm) = node.power_managed {
        logger.log(
            Level::Info,
            node.id,
            format!(
                "node was asleep at end of period, time elapsed from shutdown to period end is {}",
                end_block_ts - tm
            ),
        );
    }

    if node.boot_duration_violations > MAX_ALLOWED_BOOT_VIOLATIONS {
        logger.log(
            Level::Warn,
            node.id,
            format!(
                "got a violation for failing to wake within allowed boot time, instances: {}",
                node.boot_duration_violations
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::RecordingLogger;

    fn period0() -> Period {
        Period::from_offset(0)
    }

    fn uptime_ev(uptime: u64, timestamp: i64) -> Event {
        Event::NodeUptimeReported {
            uptime,
            timestamp,
            event_index: 0,
        }
    }

    fn run(events: Vec<Event>) -> NodeState {
        let period = period0();
        let mut node = NodeState::new(1, period);
        let mut logger = RecordingLogger::new();
        process_period(&mut node, &events, &mut logger).expect("no fatal errors");
        node
    }

    // S1: clean, steady node.
    #[test]
    fn s1_clean_steady_node() {
        let p = period0();
        let events = vec![
            uptime_ev(100, p.start + 100),
            uptime_ev(2500, p.start + 2500),
            uptime_ev(4900, p.start + 4900),
        ];
        let node = run(events);
        let credited: Vec<u64> = node.events.iter().map(|e| e.credited).collect();
        assert_eq!(credited, vec![100, 2400, 2400]);
        assert_eq!(node.uptime, 4900);
        assert_eq!(node.downtime, 0);
    }

    // S2: uptime clip.
    #[test]
    fn s2_uptime_clip() {
        let p = period0();
        let events = vec![uptime_ev(100, p.start + 100), uptime_ev(5000, p.start + 5000)];
        let node = run(events);
        let credited: Vec<u64> = node.events.iter().map(|e| e.credited).collect();
        assert_eq!(credited, vec![100, 2460]);
        assert_eq!(node.uptime, 2560);
    }

    // S3: reboot within bounds.
    #[test]
    fn s3_reboot_within_bounds() {
        let p = period0();
        let events = vec![uptime_ev(1000, p.start + 1000), uptime_ev(500, p.start + 3000)];
        let node = run(events);
        assert_eq!(node.events.last().unwrap().credited, 500);
        assert_eq!(node.events.last().unwrap().note, "Node rebooted");
        assert_eq!(node.boot_time, Some((p.start + 2500, p.start + 3000)));
        assert_eq!(node.uptime, 1500);
    }

    // S4: clock-skew violation, no refusal; then a genuine violation with no credit.
    #[test]
    fn s4_clock_skew_then_violation() {
        let p = period0();
        let mut logger = RecordingLogger::new();
        let mut node = NodeState::new(1, p);
        process_period(
            &mut node,
            &[uptime_ev(100, p.start + 100)],
            &mut logger,
        )
        .unwrap();
        assert_eq!(node.boot_time, Some((p.start, p.start + 100)));

        process_period(
            &mut node,
            &[uptime_ev(2700, p.start + 2500)],
            &mut logger,
        )
        .unwrap();
        // uptime_delta = 2600 > report_delta(2400) + grace(60) -> violation, no credit.
        assert_eq!(node.uptime, 100);
        assert!(logger.warnings().any(|r| r.message.contains("uptime increase")));
    }

    // S5: scheduled sleep-and-wake.
    #[test]
    fn s5_scheduled_sleep_and_wake() {
        let p = period0();
        let mut node = NodeState::new(7, p);
        let mut logger = RecordingLogger::new();

        let events = vec![
            Event::PowerTargetChanged {
                target: Power::Down,
                timestamp: p.start + 1000,
                event_index: 0,
            },
            Event::PowerStateChanged {
                state: Power::Down,
                down_block: None,
                timestamp: p.start + 1100,
                event_index: 0,
            },
            Event::PowerTargetChanged {
                target: Power::Up,
                timestamp: p.start + 2000,
                event_index: 0,
            },
            uptime_ev(50, p.start + 2100),
        ];
        process_period(&mut node, &events, &mut logger).unwrap();

        assert_eq!(node.power_managed, None);
        assert_eq!(node.power_manage_boot, None);
        assert_eq!(node.boot_duration_violations, 0);
        let last = node.events.last().unwrap();
        assert_eq!(last.credited, 1000);
        assert_eq!(last.note, "Crediting standby node");
    }

    // S6: boot-too-slow violation.
    #[test]
    fn s6_boot_too_slow_violation() {
        let p = period0();
        let mut node = NodeState::new(7, p);
        let mut logger = RecordingLogger::new();

        let events = vec![
            Event::PowerTargetChanged {
                target: Power::Down,
                timestamp: p.start + 1000,
                event_index: 0,
            },
            Event::PowerStateChanged {
                state: Power::Down,
                down_block: None,
                timestamp: p.start + 1100,
                event_index: 0,
            },
            Event::PowerTargetChanged {
                target: Power::Up,
                timestamp: p.start + 2000,
                event_index: 0,
            },
            uptime_ev(50, p.start + 5000),
        ];
        process_period(&mut node, &events, &mut logger).unwrap();

        assert_eq!(node.boot_duration_violations, 1);
        assert_eq!(node.power_managed, None);
        assert_eq!(node.power_manage_boot, None);
        assert_eq!(node.boot_time, Some((p.start + 4950, p.start + 5000)));
    }

    #[test]
    fn missing_boot_time_is_fatal() {
        // Manually construct a node with uptime_info set but no boot_time, to
        // trigger the "reported uptime without ever booting" invariant.
        let p = period0();
        let mut node = NodeState::new(1, p);
        node.uptime_info = Some((p.start, 0, 0));
        node.boot_time = None;
        let mut logger = RecordingLogger::new();
        let err = process_period(&mut node, &[uptime_ev(30, p.start + 30)], &mut logger).unwrap_err();
        assert!(matches!(err, AccrualError::MissingBootTime { .. }));
    }

    #[test]
    fn post_period_credits_at_most_one_uptime_event() {
        let p = period0();
        let mut node = NodeState::new(1, p);
        let mut logger = RecordingLogger::new();
        // Prime uptime_info/boot_time as if the last period event happened right at period end.
        node.uptime_info = Some((p.end, 100, 100));
        node.boot_time = Some((p.end - 100, p.end));
        node.last_uptime_added_ts = p.end;

        let events = vec![
            uptime_ev(2500, p.end + 2400),
            uptime_ev(4900, p.end + 4800),
        ];
        process_post_period(&mut node, &events, &mut logger).unwrap();

        let post_period_credits = node
            .events
            .iter()
            .filter(|e| e.timestamp > p.end)
            .count();
        assert_eq!(post_period_credits, 1);
    }

    #[test]
    fn scheduled_wake_refused_past_max_power_manager_downtime() {
        let p = period0();
        let mut node = NodeState::new(1, p);
        let mut logger = RecordingLogger::new();

        // Node was put to sleep at period start and only boots up more than
        // 24 hours later: the boot itself is on time, but the downtime is
        // too long to credit.
        node.power_managed = Some(p.start);
        node.power_manage_boot = Some(p.start + 89_900);

        let events = vec![uptime_ev(100, p.start + 90_000)];
        process_period(&mut node, &events, &mut logger).unwrap();

        assert_eq!(node.uptime, 0);
        assert_eq!(node.boot_duration_violations, 0);
        assert!(logger
            .warnings()
            .any(|r| r.message.contains("refusing to credit uptime")));
    }

    #[test]
    fn clock_skew_warning_fires_once_drift_reaches_threshold() {
        let p = period0();
        let mut node = NodeState::new(1, p);
        let mut logger = RecordingLogger::new();

        // Each report after the first advances uptime 60 seconds slower than
        // wall-clock time, the most allowed per report without a violation.
        // After two such reports the node's apparent boot time has drifted
        // by 120 seconds from the one recorded on the first report, which is
        // exactly CLOCK_SKEW_INTERVAL.
        let events = vec![
            uptime_ev(100, p.start + 100),
            uptime_ev(2_440, p.start + 2_500),
            uptime_ev(4_780, p.start + 4_900),
        ];
        process_period(&mut node, &events, &mut logger).unwrap();

        assert!(logger
            .warnings()
            .any(|r| r.message.contains("clock skew")));
    }
}
