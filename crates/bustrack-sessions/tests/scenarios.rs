// End-to-end presence scenarios driven through the lifecycle controller,
// the same entry points the WebSocket gateway uses.

use std::sync::Arc;

use bustrack_core::config::default_publishers;
use bustrack_protocol::events::{DriverLocation, DriverStart};
use bustrack_sessions::hub::EventReceiver;
use bustrack_sessions::{
    BroadcastEvent, BroadcastHub, ConnectionLifecycleController, PublisherRegistry, SessionManager,
};

fn controller() -> ConnectionLifecycleController {
    let registry = Arc::new(PublisherRegistry::from_config(&default_publishers()).unwrap());
    let hub = Arc::new(BroadcastHub::new(64));
    let sessions = Arc::new(SessionManager::new(registry, Arc::clone(&hub)));
    ConnectionLifecycleController::new(sessions, hub)
}

fn drain(rx: &mut EventReceiver) -> Vec<BroadcastEvent> {
    std::iter::from_fn(|| rx.try_recv().ok())
        .map(|ev| (*ev).clone())
        .collect()
}

fn start(bus_id: &str, token: &str) -> DriverStart {
    DriverStart {
        bus_id: bus_id.into(),
        token: token.into(),
    }
}

fn location(bus_id: &str, token: &str, speed: Option<f64>) -> DriverLocation {
    DriverLocation {
        bus_id: bus_id.into(),
        token: token.into(),
        lat: 25.7439,
        lng: 89.2752,
        speed,
        heading: Some(270.0),
        accuracy: Some(12.0),
    }
}

fn deactivations(events: &[BroadcastEvent]) -> usize {
    events
        .iter()
        .filter(|ev| matches!(ev, BroadcastEvent::PublisherDeactivated { .. }))
        .count()
}

#[test]
fn driver_start_confirms_requester_and_activates_for_everyone() {
    let ctl = controller();
    let (_student, mut student_rx) = ctl.connect();
    let (mut driver, mut driver_rx) = ctl.connect();

    let confirmed = ctl
        .driver_start(&mut driver, &start("BUS-01", "TOKEN-BUS01-SECRET"))
        .unwrap();
    assert_eq!(confirmed.bus_id, "BUS-01");
    assert_eq!(confirmed.name, "Bus 1");

    let expected = BroadcastEvent::PublisherActivated {
        id: "BUS-01".into(),
        name: "Bus 1".into(),
        route: "BRUR → Modern More → Station".into(),
        color: "#e74c3c".into(),
    };
    assert_eq!(drain(&mut student_rx), vec![expected.clone()]);
    assert_eq!(drain(&mut driver_rx), vec![expected]);

    let session = &ctl.sessions().sessions()[0];
    assert!(session.position.is_none());
}

#[test]
fn invalid_token_reaches_only_the_requester() {
    let ctl = controller();
    let (_student, mut student_rx) = ctl.connect();
    let (mut driver, mut driver_rx) = ctl.connect();

    let err = ctl
        .driver_start(&mut driver, &start("BUS-01", "TOKEN-BUS02-SECRET"))
        .unwrap_err();
    assert_eq!(err.code(), "INVALID_TOKEN");
    assert!(drain(&mut student_rx).is_empty());
    assert!(drain(&mut driver_rx).is_empty());
    assert_eq!(ctl.sessions().active_count(), 0);
}

#[test]
fn reading_at_ten_mps_broadcasts_36_kmh() {
    let ctl = controller();
    let (_student, mut student_rx) = ctl.connect();
    let (mut driver, _driver_rx) = ctl.connect();
    ctl.driver_start(&mut driver, &start("BUS-01", "TOKEN-BUS01-SECRET"))
        .unwrap();
    drain(&mut student_rx);

    assert!(ctl.driver_location(&driver, &location("BUS-01", "TOKEN-BUS01-SECRET", Some(10.0))));
    assert_eq!(
        drain(&mut student_rx),
        vec![BroadcastEvent::PositionUpdated {
            id: "BUS-01".into(),
            lat: 25.7439,
            lng: 89.2752,
            speed: 36,
            heading: 270.0,
        }]
    );
}

#[test]
fn mismatched_location_token_is_silently_dropped() {
    let ctl = controller();
    let (_student, mut student_rx) = ctl.connect();
    let (mut driver, mut driver_rx) = ctl.connect();
    ctl.driver_start(&mut driver, &start("BUS-01", "TOKEN-BUS01-SECRET"))
        .unwrap();
    drain(&mut student_rx);
    drain(&mut driver_rx);

    // BUS-02's token claiming to be BUS-01
    assert!(!ctl.driver_location(&driver, &location("BUS-01", "TOKEN-BUS02-SECRET", Some(3.0))));
    assert!(drain(&mut student_rx).is_empty());
    assert!(drain(&mut driver_rx).is_empty());
}

#[test]
fn snapshot_is_empty_until_first_fix() {
    let ctl = controller();
    let (mut driver, _driver_rx) = ctl.connect();
    ctl.driver_start(&mut driver, &start("BUS-02", "TOKEN-BUS02-SECRET"))
        .unwrap();

    let (student, _student_rx) = ctl.connect();
    assert!(ctl.active_buses(&student).is_empty());

    ctl.driver_location(&driver, &location("BUS-02", "TOKEN-BUS02-SECRET", None));
    let snapshot = ctl.active_buses(&student);
    assert_eq!(snapshot.len(), 1);
    assert!(matches!(
        &snapshot[0].1,
        BroadcastEvent::PositionUpdated { speed: 0, .. }
    ));
}

#[test]
fn snapshot_request_is_not_broadcast() {
    let ctl = controller();
    let (mut driver, mut driver_rx) = ctl.connect();
    ctl.driver_start(&mut driver, &start("BUS-02", "TOKEN-BUS02-SECRET"))
        .unwrap();
    ctl.driver_location(&driver, &location("BUS-02", "TOKEN-BUS02-SECRET", Some(1.0)));
    drain(&mut driver_rx);

    let (student, _student_rx) = ctl.connect();
    assert_eq!(ctl.active_buses(&student).len(), 1);
    assert!(drain(&mut driver_rx).is_empty());
}

#[test]
fn publisher_disconnect_emits_exactly_one_deactivation() {
    let ctl = controller();
    let (_student, mut student_rx) = ctl.connect();
    let (mut driver, _driver_rx) = ctl.connect();
    ctl.driver_start(&mut driver, &start("BUS-03", "TOKEN-BUS03-SECRET"))
        .unwrap();

    ctl.disconnect(driver);
    let events = drain(&mut student_rx);
    assert_eq!(deactivations(&events), 1);
    assert_eq!(
        events.last(),
        Some(&BroadcastEvent::PublisherDeactivated { id: "BUS-03".into() })
    );
    assert!(!ctl.sessions().is_active("BUS-03"));
}

#[test]
fn replaced_session_orphan_disconnects_first() {
    let ctl = controller();
    let (_student, mut student_rx) = ctl.connect();
    let (mut first, _rx1) = ctl.connect();
    let (mut second, _rx2) = ctl.connect();
    ctl.driver_start(&mut first, &start("BUS-04", "TOKEN-BUS04-SECRET"))
        .unwrap();
    ctl.driver_start(&mut second, &start("BUS-04", "TOKEN-BUS04-SECRET"))
        .unwrap();
    assert_eq!(ctl.sessions().active_count(), 1);

    // the orphan leaving does not take the live session down
    ctl.disconnect(first);
    assert_eq!(deactivations(&drain(&mut student_rx)), 0);
    assert!(ctl.sessions().is_active("BUS-04"));

    ctl.disconnect(second);
    assert_eq!(deactivations(&drain(&mut student_rx)), 1);
    assert_eq!(ctl.sessions().active_count(), 0);
}

#[test]
fn replaced_session_live_disconnects_first() {
    let ctl = controller();
    let (_student, mut student_rx) = ctl.connect();
    let (mut first, _rx1) = ctl.connect();
    let (mut second, _rx2) = ctl.connect();
    ctl.driver_start(&mut first, &start("BUS-04", "TOKEN-BUS04-SECRET"))
        .unwrap();
    ctl.driver_start(&mut second, &start("BUS-04", "TOKEN-BUS04-SECRET"))
        .unwrap();

    ctl.disconnect(second);
    assert_eq!(deactivations(&drain(&mut student_rx)), 1);

    ctl.disconnect(first);
    assert_eq!(deactivations(&drain(&mut student_rx)), 0);
}

#[test]
fn orphaned_connection_cannot_push_positions() {
    let ctl = controller();
    let (_student, mut student_rx) = ctl.connect();
    let (mut first, _rx1) = ctl.connect();
    let (mut second, _rx2) = ctl.connect();
    ctl.driver_start(&mut first, &start("BUS-05", "TOKEN-BUS05-SECRET"))
        .unwrap();
    ctl.driver_start(&mut second, &start("BUS-05", "TOKEN-BUS05-SECRET"))
        .unwrap();
    drain(&mut student_rx);

    assert!(!ctl.driver_location(&first, &location("BUS-05", "TOKEN-BUS05-SECRET", Some(2.0))));
    assert!(ctl.driver_location(&second, &location("BUS-05", "TOKEN-BUS05-SECRET", Some(2.0))));
    assert_eq!(drain(&mut student_rx).len(), 1);
}

#[test]
fn reconnect_requires_fresh_credentials() {
    let ctl = controller();
    let (mut driver, _rx) = ctl.connect();
    ctl.driver_start(&mut driver, &start("BUS-01", "TOKEN-BUS01-SECRET"))
        .unwrap();
    ctl.disconnect(driver);

    // a new transport connection has no session until driver:start again
    let (mut again, _rx) = ctl.connect();
    assert!(!ctl.driver_location(&again, &location("BUS-01", "TOKEN-BUS01-SECRET", Some(1.0))));
    ctl.driver_start(&mut again, &start("BUS-01", "TOKEN-BUS01-SECRET"))
        .unwrap();
    assert!(ctl.driver_location(&again, &location("BUS-01", "TOKEN-BUS01-SECRET", Some(1.0))));
}
