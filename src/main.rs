use std::env;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::process;
use std::thread;

use log::{error, info, warn};
use serde_derive::Deserialize;
use stopwatch::Stopwatch;

use gridmap::error::{Error, Result};
use gridmap::geojson_io::{apply_scene, read_scene, scene_to_geojson, write_scene};
use gridmap::sensor::{self, Permission, ReplayProvider, TimedEvent};
use gridmap::transcript::VoiceSession;
use gridmap::{map_for_state, AppState, Canvas, Config, EventLoop, FieldForm, Gesture, MapEvent,
              Surface};

/// A recorded field session.
#[derive(Debug, Deserialize)]
#[serde(default)]
struct Trace {
    permission: Permission,
    /// Recogniser candidates for a dictated field, best first.
    speech: Vec<String>,
    sensors: Vec<TimedEvent>,
    /// Wall-clock milliseconds per recorded millisecond when replaying sensors.
    pace: f64,
    gestures: Vec<Gesture>,
}

impl Default for Trace {
    fn default() -> Self {
        Trace {
            permission: Permission::Granted,
            speech: Vec::new(),
            sensors: Vec::new(),
            pace: 0.0,
            gestures: Vec::new(),
        }
    }
}

fn usage() -> ! {
    eprintln!("usage: gridmap <trace.json> <out.png> [scene.geojson]");
    eprintln!("  GRIDMAP_CONFIG  JSON config file");
    eprintln!("  GRIDMAP_SCENE   GeoJSON with points of interest and field boundary");
    process::exit(2)
}

fn load_state() -> Result<AppState> {
    let state = AppState::default();
    match env::var_os("GRIDMAP_SCENE") {
        Some(path) => {
            let scene = read_scene(BufReader::new(File::open(&path)?))?;
            info!("scene: {} points of interest, {} field points",
                  scene.points.len(),
                  scene.field.len());
            Ok(apply_scene(state, scene))
        }
        None => Ok(state),
    }
}

fn run(trace_path: &str, out_path: &str, geojson_path: Option<&str>) -> Result<()> {
    let config = Config::load(env::var_os("GRIDMAP_CONFIG"))?;
    let trace: Trace = serde_json::from_reader(BufReader::new(File::open(trace_path)?))?;

    let mut state = load_state()?;
    let mut form = FieldForm::from_state(&state);
    if !trace.speech.is_empty() {
        let mut voice = VoiceSession::default();
        voice.start();
        if let Some(text) = voice.on_results(&trace.speech) {
            form.fill_from_transcript(text)?;
        }
        voice.destroy();
    }
    state = form.submit(&state)?;
    let corners = state.corners();
    info!("field corners sw {:?} ne {:?}", corners.sw_corner, corners.ne_corner);

    let mut map = map_for_state(&state, config.map.clone());
    let viewport = config.map.viewport;
    let mut canvas = Canvas::new(viewport.width.round() as usize, viewport.height.round() as usize);

    let mut sw = Stopwatch::start_new();
    let (events, tx) = EventLoop::new();
    let (sensor_tx, bridge) = EventLoop::sensor_bridge(tx.clone());
    let mut provider = match trace.permission {
        Permission::Granted => ReplayProvider::new(trace.sensors).with_pace(trace.pace),
        Permission::Denied => ReplayProvider::denied(),
    };
    // Mounted: the feed runs until the replay ends or the subscription is dropped.
    let subscription = sensor::start(&mut provider, &config.sensors, sensor_tx);
    let gestures = trace.gestures;
    let touch = thread::spawn(move || {
        for g in gestures {
            if tx.send(MapEvent::Gesture(g)).is_err() {
                break;
            }
        }
    });
    let processed = events.run(&mut map, Some(&mut canvas));
    drop(subscription);
    for handle in vec![touch, bridge] {
        if handle.join().is_err() {
            warn!("event producer panicked");
        }
    }
    info!("{} events, {} redraws took {} ms",
          processed,
          map.redraws(),
          sw.elapsed_ms());

    // Paint at least once even when nothing happened.
    map.render(Some(&mut canvas));
    let visible = map.projection(canvas.viewport()).visible_bounds();
    info!("visible sw {:?} ne {:?}", visible.sw_corner, visible.ne_corner);
    match map.user_location() {
        Some(u) => info!("user at ({}, {}), heading {:.1}", u.latitude, u.longitude, u.heading),
        None => info!("no user location"),
    }

    sw.restart();
    canvas.save(out_path)?;
    info!("wrote {} in {} ms", out_path, sw.elapsed_ms());

    if let Some(path) = geojson_path {
        let json = scene_to_geojson(&state, map.user_location());
        write_scene(BufWriter::new(File::create(path)?), &json)?;
        info!("wrote {}", path);
    }
    Ok(())
}

fn main() {
    env_logger::init();
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 || args.len() > 4 {
        usage();
    }
    if let Err(e) = run(&args[1], &args[2], args.get(3).map(|s| s.as_str())) {
        error!("{}", e);
        eprintln!("gridmap: {}", e);
        let code = match e {
            Error::Input(_) | Error::Config(_) => 2,
            _ => 1,
        };
        process::exit(code);
    }
}
