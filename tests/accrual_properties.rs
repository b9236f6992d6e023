//! Integration tests exercising the full `run_period` pipeline and the
//! universal invariants (P1-P7) against synthetic event streams.

use tfgrid_minting::accrual::{run_period, MAX_UPTIME_CREDIT};
use tfgrid_minting::event::{Event, Power};
use tfgrid_minting::event_source::InMemoryEventSource;
use tfgrid_minting::logger::RecordingLogger;
use tfgrid_minting::period::Period;

fn uptime(uptime: u64, timestamp: i64) -> Event {
    Event::NodeUptimeReported {
        uptime,
        timestamp,
        event_index: 0,
    }
}

#[test]
fn p1_uptime_plus_downtime_equals_sum_of_elapsed() {
    let period = Period::from_offset(100);
    let mut source = InMemoryEventSource::new();
    source.push_events(
        1,
        vec![
            uptime(100, period.start + 100),
            uptime(2500, period.start + 2500),
            uptime(5000, period.start + 5000),
            uptime(400, period.start + 5400),
        ],
    );

    let mut logger = RecordingLogger::new();
    let node = run_period(&source, 1, period, &mut logger).unwrap();

    let elapsed_sum: i64 = node.events.iter().map(|e| e.elapsed).sum();
    assert_eq!(node.uptime as i64 + node.downtime, elapsed_sum);
}

#[test]
fn p2_every_credit_bounded_by_max_uptime_credit() {
    let period = Period::from_offset(101);
    let mut source = InMemoryEventSource::new();
    source.push_events(
        1,
        vec![
            uptime(100, period.start + 100),
            uptime(10_000, period.start + 10_000),
            uptime(500, period.start + 10_200),
        ],
    );

    let mut logger = RecordingLogger::new();
    let node = run_period(&source, 1, period, &mut logger).unwrap();

    for record in &node.events {
        assert!(record.credited <= MAX_UPTIME_CREDIT);
    }
}

#[test]
fn p4_last_uptime_added_ts_is_monotone() {
    let period = Period::from_offset(102);
    let mut source = InMemoryEventSource::new();
    source.push_events(
        1,
        vec![
            uptime(100, period.start + 100),
            uptime(2500, period.start + 2500),
            uptime(500, period.start + 4000),
            uptime(3000, period.start + 7000),
        ],
    );

    let mut logger = RecordingLogger::new();
    let node = run_period(&source, 1, period, &mut logger).unwrap();

    let mut prev = i64::MIN;
    for record in &node.events {
        assert!(record.timestamp >= prev);
        prev = record.timestamp;
    }
}

#[test]
fn p5_at_most_one_credit_after_period_end() {
    let period = Period::from_offset(103);
    let mut source = InMemoryEventSource::new();
    source.push_events(
        1,
        vec![
            uptime(100, period.start + 100),
            uptime(2500, period.start + 2500),
            // Two reports land after period.end; only the first should credit.
            uptime(5000, period.end + 2400),
            uptime(7500, period.end + 4800),
        ],
    );

    let mut logger = RecordingLogger::new();
    let node = run_period(&source, 1, period, &mut logger).unwrap();

    let post_period_credits = node.events.iter().filter(|e| e.timestamp > period.end).count();
    assert!(post_period_credits <= 1);
}

#[test]
fn p6_boot_violations_are_monotone_non_decreasing() {
    let period = Period::from_offset(104);
    let mut source = InMemoryEventSource::new();
    source.push_events(
        1,
        vec![
            Event::PowerTargetChanged {
                target: Power::Down,
                timestamp: period.start + 100,
                event_index: 0,
            },
            Event::PowerStateChanged {
                state: Power::Down,
                down_block: None,
                timestamp: period.start + 200,
                event_index: 1,
            },
            Event::PowerTargetChanged {
                target: Power::Up,
                timestamp: period.start + 300,
                event_index: 2,
            },
        ],
    );
    // The node never reports uptime after the wakeup request, so
    // power_manage_boot survives to final_check and should count exactly one
    // violation (the request happened strictly inside the period).

    let mut logger = RecordingLogger::new();
    let node = run_period(&source, 1, period, &mut logger).unwrap();
    assert_eq!(node.boot_duration_violations, 1);
}

#[test]
fn p7_steady_forty_minute_reports_credit_linearly() {
    let period = Period::from_offset(105);
    let mut source = InMemoryEventSource::new();
    let mut events = Vec::new();
    let mut ru = 100u64;
    let mut ts = period.start + 100;
    events.push(uptime(ru, ts));
    for _ in 0..5 {
        ru += 2400;
        ts += 2400;
        events.push(uptime(ru, ts));
    }
    source.push_events(1, events);

    let mut logger = RecordingLogger::new();
    let node = run_period(&source, 1, period, &mut logger).unwrap();

    // initial credit (100) + 5 * 2400 perfectly-timed reports.
    assert_eq!(node.uptime, 100 + 5 * 2400);
}

#[test]
fn full_pipeline_defaults_missing_initial_power_row() {
    let period = Period::from_offset(106);
    let source = InMemoryEventSource::new();
    let mut logger = RecordingLogger::new();
    let node = run_period(&source, 42, period, &mut logger).unwrap();

    assert_eq!(node.power_target, Power::Up);
    assert_eq!(node.power_state, Power::Up);
    assert_eq!(node.uptime, 0);
    assert!(logger
        .records
        .iter()
        .any(|r| r.message.contains("no initial power row found")));
}
