use std::thread;
use std::time::Duration;

use gridmap::geojson_io::{read_scene, scene_to_geojson, write_scene};
use gridmap::render::{grid_lines, Layer, Primitive};
use gridmap::sensor::{self, ReplayProvider, TimedEvent};
use gridmap::{map_for_state, sync_map, AppState, Canvas, Coordinate, EventLoop, FieldForm,
              Gesture, MapConfig, MapEvent, Rgb, SensorConfig, SensorEvent, Surface, Viewport};

fn krakow_form() -> FieldForm {
    let mut form = FieldForm::from_state(&AppState::empty());
    form.fill_from_transcript("50.0653 19.94544, 50.0635 19.94544, 50.0653 19.94376, \
                               50.0635 19.94376")
        .unwrap();
    form
}

#[test]
fn entered_field_yields_expected_corners() {
    let state = krakow_form().submit(&AppState::empty()).unwrap();
    assert_eq!(state.sw_corner(), Coordinate::new(50.0635, 19.94376));
    assert_eq!(state.ne_corner(), Coordinate::new(50.0653, 19.94544));
    for c in state.field_coords() {
        assert!(state.corners().contains(c));
    }
}

#[test]
fn rejected_input_keeps_previous_store() {
    let state = AppState::default();
    let mut form = FieldForm::from_state(&state);
    form.set(0, gridmap::error::Axis::Latitude, "fifty");
    assert!(form.submit(&state).is_err());
    assert_eq!(state.sw_corner(), Coordinate::default());
}

#[test]
fn outline_surrounds_user_inside_field() {
    let state = krakow_form().submit(&AppState::default()).unwrap();
    let mut map = map_for_state(&state, MapConfig::default());
    let (events, tx) = EventLoop::new();
    tx.send(MapEvent::Sensor(SensorEvent::Position {
            latitude: 50.0644,
            longitude: 19.9446,
        }))
        .unwrap();
    tx.send(MapEvent::Sensor(SensorEvent::Magnetometer { x: 0.0, y: 1.0 })).unwrap();
    drop(tx);
    let mut canvas = Canvas::new(400, 800);
    assert_eq!(events.run(&mut map, Some(&mut canvas)), 2);

    let frame = map.frame(canvas.viewport());
    let outline = match frame.layer(Layer::Outline).next() {
        Some(&Primitive::Path { ref points, closed, .. }) => {
            assert!(closed);
            points.clone()
        }
        other => panic!("unexpected {:?}", other),
    };
    let min_x = outline.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
    let max_x = outline.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
    let min_y = outline.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
    let max_y = outline.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);
    assert!(min_x < 200.0 && 200.0 < max_x);
    assert!(min_y < 400.0 && 400.0 < max_y);
    // 0.00168 degrees of longitude at 1000 px per degree.
    assert!((max_x - min_x - 1.68).abs() < 1e-6);

    assert_eq!(canvas.pixel(200, 400), Some(Rgb::BLACK));
    assert_eq!(frame.count(Layer::Heading), 1);
}

#[test]
fn zoom_floor_and_pan_through_event_stream() {
    let mut map = map_for_state(&AppState::default(), MapConfig::default());
    let (events, tx) = EventLoop::new();
    for g in vec![Gesture::Pinch { scale: 0.01 },
                  Gesture::Pan { dx: Some(30.0), dy: None },
                  Gesture::Pan { dx: Some(20.0), dy: Some(50.0) }] {
        tx.send(g.into()).unwrap();
    }
    drop(tx);
    events.run(&mut map, None);
    assert_eq!(map.view().scale(), 0.1);
    assert_eq!((map.view().offset_x, map.view().offset_y), (20.0, 50.0));
}

#[test]
fn grid_periodic_through_map() {
    let viewport = Viewport::new(400.0, 800.0);
    let mut a = map_for_state(&AppState::default(), MapConfig::default());
    let mut b = map_for_state(&AppState::default(), MapConfig::default());
    a.on_pinch(1.5);
    b.on_pinch(1.5);
    let spacing = 50.0 * 1.5;
    a.on_pan(Some(17.0), Some(-3.0));
    b.on_pan(Some(17.0 + spacing), Some(-3.0 - spacing));
    let grid = |m: &gridmap::GridMap| -> Vec<Primitive> {
        m.frame(viewport).layer(Layer::Grid).cloned().collect()
    };
    assert_eq!(grid(&a), grid(&b));
    assert_eq!(grid_lines(400.0, spacing, 17.0)[0], 58.0);
}

#[test]
fn permission_denied_renders_without_user() {
    let mut map = map_for_state(&AppState::default(), MapConfig::default());
    let (events, tx) = EventLoop::new();
    let (stx, bridge) = EventLoop::sensor_bridge(tx);
    let mut provider = ReplayProvider::denied();
    assert!(sensor::start(&mut provider, &SensorConfig::default(), stx).is_none());
    bridge.join().unwrap();
    let mut canvas = Canvas::new(100, 100);
    assert_eq!(events.run(&mut map, Some(&mut canvas)), 0);
    assert!(map.user_location().is_none());
    assert!(map.render(Some(&mut canvas)));
}

#[test]
fn replayed_session_feeds_map_in_background() {
    let trace: Vec<TimedEvent> = serde_json::from_str(r#"[
        {"t": 0,    "kind": "position", "latitude": 50.0640, "longitude": 19.9440},
        {"t": 0,    "kind": "magnetometer", "x": 1.0, "y": 0.0},
        {"t": 250,  "kind": "magnetometer", "x": 0.0, "y": 1.0},
        {"t": 600,  "kind": "magnetometer", "x": -1.0, "y": 0.0},
        {"t": 1200, "kind": "position", "latitude": 50.0645, "longitude": 19.9445}
    ]"#)
        .unwrap();
    let mut map = map_for_state(&AppState::default(), MapConfig::default());
    let (events, tx) = EventLoop::new();
    let (stx, bridge) = EventLoop::sensor_bridge(tx);
    let mut provider = ReplayProvider::new(trace);
    let subscription = sensor::start(&mut provider, &SensorConfig::default(), stx).unwrap();
    let mut canvas = Canvas::new(200, 200);
    let processed = events.run(&mut map, Some(&mut canvas));
    assert!(subscription.is_active());
    subscription.remove();
    bridge.join().unwrap();
    assert_eq!(processed, 4);
    let u = map.user_location().unwrap();
    assert_eq!((u.latitude, u.longitude), (50.0645, 19.9445));
    assert!((u.heading - 180.0).abs() < 1e-9);
}

#[test]
fn unmount_stops_sensor_feed() {
    let trace: Vec<TimedEvent> = (0..5)
        .map(|i| {
            TimedEvent {
                t: i * 2000,
                event: SensorEvent::Position {
                    latitude: 50.0 + i as f64 * 0.01,
                    longitude: 19.9,
                },
            }
        })
        .collect();
    let (events, tx) = EventLoop::new();
    let (stx, bridge) = EventLoop::sensor_bridge(tx);
    let mut provider = ReplayProvider::new(trace).with_pace(0.05);
    let subscription = sensor::start(&mut provider, &SensorConfig::default(), stx).unwrap();
    let screen = thread::spawn(move || {
        let mut map = map_for_state(&AppState::default(), MapConfig::default());
        let processed = events.run(&mut map, None);
        (processed, map.user_location().cloned())
    });
    thread::sleep(Duration::from_millis(150));
    drop(subscription);
    let (processed, user) = screen.join().unwrap();
    bridge.join().unwrap();
    assert!(processed >= 1 && processed < 5, "processed {}", processed);
    assert!(user.unwrap().latitude < 50.04);
}

#[test]
fn store_update_reaches_mounted_map() {
    let mut map = map_for_state(&AppState::default(), MapConfig::default());
    let mut canvas = Canvas::new(50, 50);
    assert!(map.render(Some(&mut canvas)));
    let state = AppState::default().set_points_of_interest(vec![Coordinate::new(0.0, 0.0),
                                                                Coordinate::new(0.001, 0.0)]);
    sync_map(&mut map, &state);
    assert!(map.is_dirty());
    assert!(map.render(Some(&mut canvas)));
    assert_eq!(map.frame(canvas.viewport()).count(Layer::Points), 2);
}

#[test]
fn session_outputs_written() {
    let dir = std::env::temp_dir().join(format!("gridmap-test-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let state = krakow_form().submit(&AppState::default()).unwrap();
    let mut map = map_for_state(&state, MapConfig::default());
    let mut canvas = Canvas::new(64, 48);
    map.render(Some(&mut canvas));

    let png = dir.join("frame.png");
    canvas.save(&png).unwrap();
    assert!(std::fs::metadata(&png).unwrap().len() > 0);

    let scene_path = dir.join("scene.geojson");
    let file = std::fs::File::create(&scene_path).unwrap();
    write_scene(file, &scene_to_geojson(&state, map.user_location())).unwrap();
    let scene = read_scene(std::fs::File::open(&scene_path).unwrap()).unwrap();
    assert_eq!(scene.field, state.field_coords());
    std::fs::remove_dir_all(&dir).unwrap();
}
