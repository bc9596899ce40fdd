use std::sync::Arc;
use std::time::{Duration, Instant};

use megaoperation::config::{Config, ZoneIndex, parse_config};
use megaoperation::core::effect::SoundPolicy;
use megaoperation::core::scheduler::ZoneState;
use megaoperation::core::{Core, CoreParams};
use megaoperation::io::fakes::{RecordingPlayer, ScriptedButton, ScriptedSensor};
use megaoperation::io::signals::{SignalMessage, SignalState};
use megaoperation::strip::{LedDriver, MemorySink};

const BUTTERFLIES: &str = r#"
[strip]
channel = 1

[zones.Butterflies]
sensor = 3
led_start = 10
led_length = 2
led_on_time = 2
led_color = "red"
"#;

const TWO_ZONES_WITH_NOSE: &str = r#"
[strip]
channel = 1

[zones.Brain]
sensor = 0
led_start = 4
led_length = 3
led_on_time = 0.5
led_color = "green"
music_fnpath = "/sounds/brain.wav"

[zones.Heart]
sensor = 1
led_start = 7
led_length = 2
led_on_time = 0.8
led_color = "blue"
music_fnpath = "/sounds/heart.wav"

[zones.Nose]
sensor = "nose"
led_start = 0
led_length = 2
led_on_time = 1
led_color = "red"
"#;

// Test fixture wiring a core to in-memory hardware
struct Rig {
    core: Core,
    config_zones: Vec<String>,
    sink: MemorySink,
    sensor: ScriptedSensor,
    button: ScriptedButton,
    player: RecordingPlayer,
    shutdown: std::sync::mpsc::Sender<SignalMessage>,
}

impl Rig {
    fn zone(&self, id: &str) -> ZoneIndex {
        self.config_zones
            .iter()
            .position(|zone| zone == id)
            .expect("zone exists")
    }

    /// Tick until `zone` is idle again or the timeout passes.
    fn tick_until_idle(&mut self, zone: ZoneIndex, timeout: Duration) {
        let start = Instant::now();
        while self.core.zone_state(zone) == ZoneState::Running {
            assert!(start.elapsed() < timeout, "zone never finished");
            self.core.tick();
            std::thread::sleep(Duration::from_millis(10));
        }
        self.core.tick();
    }
}

fn rig(toml: &str, sound: SoundPolicy) -> Rig {
    rig_with(toml, sound, |_, _| {})
}

fn rig_with(
    toml: &str,
    sound: SoundPolicy,
    before_start: impl FnOnce(&ScriptedSensor, &ScriptedButton),
) -> Rig {
    let config: Config = parse_config(toml).unwrap();
    let config_zones = config
        .zones
        .zones()
        .iter()
        .map(|zone| zone.id.clone())
        .collect();

    let sink = MemorySink::new();
    let sensor = ScriptedSensor::new();
    let button = ScriptedButton::new();
    let player = RecordingPlayer::new();
    before_start(&sensor, &button);

    let signal_state = SignalState::detached();
    let shutdown = signal_state.signal_sender.clone();

    let core = Core::new(CoreParams {
        zones: config.zones,
        driver: Arc::new(LedDriver::new(config.strip.channel, Box::new(sink.clone()))),
        sensor: Box::new(sensor.clone()),
        button: Box::new(button.clone()),
        player: Arc::new(player.clone()),
        sound,
        signal_state,
        tick_interval: Duration::from_millis(10),
    })
    .unwrap();

    Rig {
        core,
        config_zones,
        sink,
        sensor,
        button,
        player,
        shutdown,
    }
}

fn position(lines: &[String], wanted: &str) -> usize {
    lines
        .iter()
        .position(|line| line == wanted)
        .unwrap_or_else(|| panic!("'{wanted}' not sent; got {lines:?}"))
}

#[test]
fn test_touch_lights_segment_for_its_duration() {
    let mut rig = rig(BUTTERFLIES, SoundPolicy::default());
    let butterflies = rig.zone("Butterflies");

    rig.sensor.touch(3);
    let summary = rig.core.tick();
    assert_eq!(summary.dispatched, vec![butterflies]);
    assert!(summary.any_running);

    rig.tick_until_idle(butterflies, Duration::from_secs(5));

    let commands = rig.sink.commands();
    let lines: Vec<&str> = commands.iter().map(|command| command.line.as_str()).collect();
    assert_eq!(
        lines,
        vec![
            "fill 1,FF0000,10,2",
            "render 1",
            "fill 1,000000,10,2",
            "render 1"
        ]
    );

    let held = commands[2].at.duration_since(commands[1].at);
    assert!(held >= Duration::from_secs(2), "held only {held:?}");
    assert!(held < Duration::from_millis(2500), "held {held:?}");
}

#[test]
fn test_touch_on_busy_zone_is_dropped() {
    let mut rig = rig(BUTTERFLIES, SoundPolicy::default());
    let butterflies = rig.zone("Butterflies");

    rig.sensor.touch(3);
    assert_eq!(rig.core.tick().dispatched, vec![butterflies]);

    // Release and touch again while the first run is still holding
    rig.sensor.release(3);
    let summary = rig.core.tick();
    assert_eq!(summary.edges.released, vec![butterflies]);
    assert_eq!(rig.core.zone_state(butterflies), ZoneState::Running);

    rig.sensor.touch(3);
    let summary = rig.core.tick();
    assert_eq!(summary.edges.touched, vec![butterflies]);
    assert!(summary.dispatched.is_empty());

    rig.tick_until_idle(butterflies, Duration::from_secs(5));
    let fills = rig
        .sink
        .lines()
        .iter()
        .filter(|line| line.starts_with("fill 1,FF0000"))
        .count();
    assert_eq!(fills, 1);
}

#[test]
fn test_held_touch_at_startup_is_not_an_edge() {
    let mut rig = rig_with(BUTTERFLIES, SoundPolicy::default(), |sensor, _| {
        sensor.touch(3);
    });

    let summary = rig.core.tick();
    assert!(summary.edges.touched.is_empty());
    assert!(summary.dispatched.is_empty());
    assert!(rig.sink.lines().is_empty());

    // A fresh touch after letting go does count
    rig.sensor.release(3);
    rig.core.tick();
    rig.sensor.touch(3);
    assert_eq!(rig.core.tick().dispatched.len(), 1);
}

#[test]
fn test_sensor_failure_keeps_last_state() {
    let mut rig = rig(BUTTERFLIES, SoundPolicy::default());

    rig.sensor.touch(3);
    rig.sensor.set_failing(true);
    let summary = rig.core.tick();
    assert!(summary.edges.touched.is_empty());
    assert!(summary.dispatched.is_empty());

    rig.sensor.set_failing(false);
    assert_eq!(rig.core.tick().dispatched.len(), 1);
}

#[test]
fn test_indicator_follows_button_and_activity() {
    let mut rig = rig(TWO_ZONES_WITH_NOSE, SoundPolicy::default());
    let brain = rig.zone("Brain");

    // Button up: indicator comes on once
    let summary = rig.core.tick();
    assert!(summary.indicator_rendered);
    assert!(rig.core.indicator_on());
    assert!(!rig.core.tick().indicator_rendered);
    assert_eq!(rig.sink.lines(), vec!["fill 1,FF0000,0,2", "render 1"]);

    // Button down with nothing running: off once
    rig.button.press();
    assert!(rig.core.tick().indicator_rendered);
    assert!(!rig.core.indicator_on());
    assert!(!rig.core.tick().indicator_rendered);

    // A running zone lights it even while the button is held
    rig.sink.clear();
    rig.sensor.touch(0);
    let summary = rig.core.tick();
    assert_eq!(summary.dispatched, vec![brain]);
    assert!(summary.indicator_rendered);
    assert!(rig.core.indicator_on());

    rig.tick_until_idle(brain, Duration::from_secs(5));
    assert!(!rig.core.indicator_on());

    let lines = rig.sink.lines();
    let on = position(&lines, "fill 1,FF0000,0,2");
    let off = position(&lines, "fill 1,000000,0,2");
    assert!(on < off);

    // Button back up
    rig.button.release();
    assert!(rig.core.tick().indicator_rendered);
    assert!(rig.core.indicator_on());
}

#[test]
fn test_unbound_channels_are_ignored() {
    let mut rig = rig(TWO_ZONES_WITH_NOSE, SoundPolicy::default());
    rig.core.tick();
    rig.sink.clear();

    // Only channels 0 and 1 are bound; the indicator zone has no channel
    rig.sensor.set(0b1111_1111_1100);
    let summary = rig.core.tick();
    assert!(summary.edges.touched.is_empty());
    assert!(rig.sink.lines().is_empty());
}

#[test]
fn test_second_sound_is_suppressed_while_one_plays() {
    let mut rig = rig(TWO_ZONES_WITH_NOSE, SoundPolicy::default());

    rig.sensor.touch(0);
    rig.core.tick();
    // Let the first effect start its sound before reporting playback
    std::thread::sleep(Duration::from_millis(100));
    rig.player.set_playing(true);

    rig.sensor.touch(1);
    let summary = rig.core.tick();
    assert_eq!(summary.dispatched, vec![rig.zone("Heart")]);

    rig.core.shutdown();
    assert_eq!(
        rig.player.played(),
        vec![std::path::PathBuf::from("/sounds/brain.wav")]
    );

    // The light cycle still ran for the zone whose sound was skipped
    assert!(rig.sink.lines().contains(&"fill 1,0000FF,7,2".to_string()));
}

#[test]
fn test_overlapping_sounds_when_allowed() {
    let mut rig = rig(
        TWO_ZONES_WITH_NOSE,
        SoundPolicy {
            enabled: true,
            allow_overlap: true,
        },
    );
    rig.player.set_playing(true);

    rig.sensor.set(0b11);
    assert_eq!(rig.core.tick().dispatched.len(), 2);
    rig.core.shutdown();

    let mut played = rig.player.played();
    played.sort();
    assert_eq!(
        played,
        vec![
            std::path::PathBuf::from("/sounds/brain.wav"),
            std::path::PathBuf::from("/sounds/heart.wav")
        ]
    );
}

#[test]
fn test_sound_disabled_never_plays() {
    let mut rig = rig(
        TWO_ZONES_WITH_NOSE,
        SoundPolicy {
            enabled: false,
            allow_overlap: false,
        },
    );

    rig.sensor.touch(0);
    rig.core.tick();
    rig.core.shutdown();

    assert!(rig.player.played().is_empty());
}

#[test]
fn test_shutdown_blanks_strip_then_waits_for_effects() {
    let mut rig = rig(TWO_ZONES_WITH_NOSE, SoundPolicy::default());

    rig.sensor.set(0b11);
    assert_eq!(rig.core.tick().dispatched.len(), 2);
    std::thread::sleep(Duration::from_millis(100));

    let started = Instant::now();
    rig.shutdown.send(SignalMessage::Shutdown).unwrap();
    let Rig { core, sink, .. } = rig;
    core.execute().unwrap();

    // Returns only after the longest hold has completed
    assert!(started.elapsed() >= Duration::from_millis(600));

    let lines = sink.lines();
    let brain_on = position(&lines, "fill 1,00FF00,4,3");
    let heart_on = position(&lines, "fill 1,0000FF,7,2");
    let blank = position(&lines, "fill 1,000000");
    let brain_off = position(&lines, "fill 1,000000,4,3");
    let heart_off = position(&lines, "fill 1,000000,7,2");

    assert!(brain_on < blank && heart_on < blank);
    assert!(blank < brain_off && blank < heart_off);
    assert_eq!(lines[blank + 1], "render 1");
}
