//! perfseq CLI: translate a performance and print the plugin event stream.
//!
//! Usage:
//!   perfseq path/to/performance.ron
//!   perfseq path/to/performance.ron --config plugin.ron --until 4000000 -v

use std::collections::BTreeMap;
use std::path::Path;
use std::{env, process};

use log::LevelFilter;
use ps_ir::ControlIdx;
use ps_master::{load_playback_data, open_session, SequencerConfig, StreamEvent};
use simple_logger::SimpleLogger;

/// Used without `--config`: every known control maps to a parameter with
/// the same number, and dynamics drive expression.
fn default_config() -> SequencerConfig {
    let mapping: BTreeMap<u16, u32> = [
        ControlIdx::MOD_WHEEL,
        ControlIdx::SUSTAIN,
        ControlIdx::SOSTENUTO,
        ControlIdx::PITCH_BEND,
    ]
    .iter()
    .map(|control| (control.0, control.0 as u32))
    .collect();

    SequencerConfig {
        use_dynamic_events: true,
        mapping,
    }
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let path = args.get(1).unwrap_or_else(|| {
        eprintln!("Usage: perfseq <performance.ron> [--config plugin.ron] [--until micros] [-v]");
        process::exit(1);
    });

    let flag_value = |flag: &str| {
        args.iter()
            .position(|a| a == flag)
            .and_then(|i| args.get(i + 1))
            .cloned()
    };

    let level = if args.iter().any(|a| a == "-v") {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    if let Err(e) = SimpleLogger::new().with_level(level).init() {
        eprintln!("Failed to install logger: {}", e);
    }

    let config = match flag_value("--config") {
        Some(config_path) => SequencerConfig::load(Path::new(&config_path)).unwrap_or_else(|e| {
            eprintln!("{}", e);
            process::exit(1);
        }),
        None => default_config(),
    };

    let until = match flag_value("--until") {
        Some(value) => value.parse::<i64>().unwrap_or_else(|e| {
            eprintln!("Invalid --until value {}: {}", value, e);
            process::exit(1);
        }),
        None => i64::MAX - 1,
    };

    let data = load_playback_data(Path::new(path)).unwrap_or_else(|e| {
        eprintln!("{}", e);
        process::exit(1);
    });

    let (mut session, mut reader) = open_session(&config, data);

    let mut count = 0;
    reader.render_until(until, |event| {
        if let StreamEvent::Event(timestamp, event) = event {
            println!("{:>12}  {}", timestamp, event);
            count += 1;
        }
    });

    println!("Events:   {}", count);
    println!("End gain: {:.2}", session.current_gain());
}
