//! MonitorService integration tests: sampling, alerting and the SMS
//! dialogue driven tick by tick against mock hardware.

use hivewatch::alerts::AlertEvaluator;
use hivewatch::app::events::AppEvent;
use hivewatch::app::service::MonitorService;
use hivewatch::config::MonitorConfig;
use hivewatch::error::SensorError;
use hivewatch::fsm::StateId;
use hivewatch::model::{Reading, Settings};
use hivewatch::sensors::Channel;
use hivewatch::session::MarkerSession;

use super::mock_hw::{ManualClock, MockHardware, RecordingSink};

const TICK_MS: u64 = 50;

fn make_service(phone: &str) -> MonitorService {
    let config = MonitorConfig::default();
    let settings = Settings::new(phone, 40.0, 80.0, 100.0, 400).unwrap();
    let session = MarkerSession::new("admin", "beehive", config.auth.session_timeout_ms);
    MonitorService::new(&config, settings, Box::new(session))
}

/// Tick every 50 ms over `[from, until)`.
fn run(
    svc: &mut MonitorService,
    hw: &mut MockHardware,
    clock: &ManualClock,
    sink: &mut RecordingSink,
    from: u64,
    until: u64,
) {
    let mut now = from;
    while now < until {
        clock.set(now);
        svc.tick(now, hw, clock, sink);
        now += TICK_MS;
    }
}

// ── Alert evaluation ──────────────────────────────────────────

#[test]
fn high_temperature_message_carries_value() {
    let mut eval = AlertEvaluator::new(300_000);
    let reading = Reading {
        temperature: 42.0,
        humidity: 50.0,
        weight: 40.0,
        air_quality: 100,
        ..Reading::default()
    };
    let alert = eval.evaluate(&reading, &Settings::default(), 0).unwrap();
    assert!(alert.text.contains("High Temperature"));
    assert!(alert.text.contains("42.0"));
}

#[test]
fn breaches_inside_cooldown_create_one_job() {
    let mut eval = AlertEvaluator::new(300_000);
    let reading = Reading {
        temperature: 42.0,
        ..Reading::default()
    };
    let settings = Settings::default();
    let jobs = [0_u64, 1_000]
        .iter()
        .filter_map(|&t| eval.evaluate(&reading, &settings, t))
        .count();
    assert_eq!(jobs, 1);
}

// ── Full cycle ────────────────────────────────────────────────

#[test]
fn breach_sends_one_sms_through_the_modem() {
    let mut svc = make_service("+254711111111");
    let mut hw = MockHardware::calm().with_temperature(42.0);
    let clock = ManualClock::new();
    let mut sink = RecordingSink::new();

    run(&mut svc, &mut hw, &clock, &mut sink, 0, 5_000);

    assert_eq!(
        hw.transcript(),
        vec![
            "AT+CMGF=1\r\n".to_string(),
            "AT+CMGS=\"+254711111111\"\r\n".to_string(),
            "ALERT! High Temperature: 42.0C\u{1a}".to_string(),
        ]
    );
    assert_eq!(svc.dispatcher().state(), StateId::Idle);
    assert_eq!(svc.dispatcher().sent(), 1);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::AlertRaised { .. })), 1);
    assert_eq!(sink.count(|e| *e == AppEvent::NotificationCompleted), 1);
}

#[test]
fn sustained_breach_realerts_only_after_cooldown() {
    let mut svc = make_service("+254711111111");
    let mut hw = MockHardware::calm().with_temperature(42.0);
    let clock = ManualClock::new();
    let mut sink = RecordingSink::new();

    run(&mut svc, &mut hw, &clock, &mut sink, 0, 299_950);
    assert_eq!(hw.bodies_sent(), 1);

    run(&mut svc, &mut hw, &clock, &mut sink, 299_950, 310_000);
    assert_eq!(hw.bodies_sent(), 2);
}

#[test]
fn calm_hive_sends_nothing() {
    let mut svc = make_service("+254711111111");
    let mut hw = MockHardware::calm();
    let clock = ManualClock::new();
    let mut sink = RecordingSink::new();

    run(&mut svc, &mut hw, &clock, &mut sink, 0, 20_000);

    assert!(hw.writes.is_empty());
    assert_eq!(svc.sampler().samples(), 10);
    assert_eq!(svc.reading().weight, 42.0);
}

#[test]
fn unconfigured_recipient_raises_alert_but_queues_nothing() {
    let mut svc = make_service("");
    let mut hw = MockHardware::calm().with_temperature(42.0);
    let clock = ManualClock::new();
    let mut sink = RecordingSink::new();

    run(&mut svc, &mut hw, &clock, &mut sink, 0, 5_000);

    assert_eq!(sink.count(|e| matches!(e, AppEvent::AlertRaised { .. })), 1);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::NotificationQueued { .. })),
        0
    );
    assert!(hw.writes.is_empty());
}

#[test]
fn modem_failure_still_frees_the_slot() {
    let mut svc = make_service("+254711111111");
    let mut hw = MockHardware::calm().with_temperature(42.0);
    hw.fail_writes = true;
    let clock = ManualClock::new();
    let mut sink = RecordingSink::new();

    run(&mut svc, &mut hw, &clock, &mut sink, 0, 5_000);

    assert!(!svc.dispatcher().is_busy());
    assert_eq!(svc.dispatcher().state(), StateId::Idle);
}

// ── Sampling ──────────────────────────────────────────────────

#[test]
fn failed_channel_keeps_last_value() {
    let mut svc = make_service("");
    let mut hw = MockHardware::calm();
    let clock = ManualClock::new();
    let mut sink = RecordingSink::new();

    run(&mut svc, &mut hw, &clock, &mut sink, 0, 50);
    assert_eq!(svc.reading().humidity, 55.0);

    hw.humidity = Err(SensorError::NotReady);
    hw.temperature = Ok(31.5);
    run(&mut svc, &mut hw, &clock, &mut sink, 2_000, 2_050);

    assert_eq!(svc.reading().humidity, 55.0);
    assert_eq!(svc.reading().temperature, 31.5);
    assert_eq!(svc.sampler().misses(Channel::Humidity), 1);
    assert!(sink.events.contains(&AppEvent::ChannelStale {
        channel: Channel::Humidity,
        error: SensorError::NotReady,
    }));
}

// ── Persistence gating ────────────────────────────────────────

#[test]
fn persist_waits_for_the_dialogue_to_finish() {
    let mut svc = make_service("+254711111111");
    let mut hw = MockHardware::calm().with_temperature(42.0);
    let clock = ManualClock::new();
    let mut sink = RecordingSink::new();

    let mut first_persist = None;
    let mut now = 0;
    while now < 10_000 && first_persist.is_none() {
        clock.set(now);
        if svc.tick(now, &mut hw, &clock, &mut sink).persist.is_some() {
            first_persist = Some(now);
        }
        now += TICK_MS;
    }

    let at = first_persist.expect("persist never ran");
    assert!(at > 0);
    assert!(!svc.dispatcher().is_busy());
    assert!(sink.events.contains(&AppEvent::PersistDeferred));
}

// ── Network ───────────────────────────────────────────────────

#[test]
fn reconnect_is_attempted_every_interval_while_down() {
    let mut svc = make_service("");
    let mut hw = MockHardware::calm();
    hw.connected = false;
    let clock = ManualClock::new();
    let mut sink = RecordingSink::new();

    run(&mut svc, &mut hw, &clock, &mut sink, 0, 30_000);
    assert_eq!(hw.reconnects, 3);
    assert!(sink.events.contains(&AppEvent::LinkDown { attempt: 3 }));

    hw.connected = true;
    run(&mut svc, &mut hw, &clock, &mut sink, 30_000, 30_050);
    assert!(sink.events.contains(&AppEvent::LinkRestored));
}
