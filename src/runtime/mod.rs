use std::env;
use std::sync::Arc;
use std::sync::mpsc;
use std::time::Duration;

use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

use crate::audio::{AnalyserConfig, RodioBackend};
use crate::engine::{Engine, FrameClock};
use crate::mpris::ControlCmd;
use crate::playlist::{HttpTrackSource, LoadOutcome};

mod event_loop;
mod mpris_sync;
mod settings;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let mut settings = settings::load_settings();
    if let Some(base_url) = env::args().nth(1) {
        settings.playlist.base_url = base_url;
    }

    let source = HttpTrackSource::new(&settings.playlist)?;
    log::info!("track index at {}", source.endpoint());

    let backend = RodioBackend::new(AnalyserConfig::from(&settings.analysis));
    let clock = FrameClock::Realtime(Duration::from_millis(settings.analysis.frame_interval_ms.max(1)));
    let engine = Engine::new(settings.clone(), Box::new(backend), Arc::new(source), clock);

    match engine.init_store() {
        Some(LoadOutcome::Loaded { added, .. }) => log::info!("loaded {added} tracks"),
        Some(LoadOutcome::Failed) => log::warn!("could not load tracks, retry with next"),
        _ => {}
    }

    let (control_tx, control_rx) = mpsc::channel::<ControlCmd>();
    let mpris = crate::mpris::spawn_mpris(control_tx);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();

    let run_result: Result<(), Box<dyn std::error::Error>> = (|| {
        let mut state = event_loop::EventLoopState::default();
        event_loop::run(&mut stdout, &settings, &engine, &mpris, &control_rx, &mut state)
    })();

    engine.dispose();
    disable_raw_mode()?;
    execute!(stdout, crossterm::style::Print("\r\n"))?;

    run_result
}
