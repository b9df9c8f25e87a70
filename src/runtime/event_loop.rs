use std::io::Write;
use std::sync::mpsc;
use std::time::Duration;

use crossterm::cursor::MoveToColumn;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::queue;
use crossterm::style::Print;
use crossterm::terminal::{Clear, ClearType};

use crate::config;
use crate::engine::Engine;
use crate::mpris::{ControlCmd, MprisHandle};
use crate::runtime::mpris_sync::{MprisView, update_mpris};
use crate::state::PlaybackState;

const METER_WIDTH: usize = 16;

/// State tracked by the runtime event loop across iterations.
#[derive(Default)]
pub struct EventLoopState {
    /// Last engine view published to MPRIS.
    pub last_mpris: Option<MprisView>,
    /// Last status line drawn, to skip redundant redraws.
    last_line: String,
}

/// Main terminal event loop: handles keys and MPRIS commands, redraws the
/// status line and keeps MPRIS in sync. Returns `Ok(())` when shutdown is requested.
pub fn run(
    out: &mut impl Write,
    settings: &config::Settings,
    engine: &Engine,
    mpris: &MprisHandle,
    control_rx: &mpsc::Receiver<ControlCmd>,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        let snapshot = engine.snapshot();
        update_mpris(mpris, &snapshot, &mut state.last_mpris);

        let line = status_line(&snapshot);
        if line != state.last_line {
            queue!(out, MoveToColumn(0), Clear(ClearType::CurrentLine), Print(&line))?;
            out.flush()?;
            state.last_line = line;
        }

        while let Ok(cmd) = control_rx.try_recv() {
            if handle_control_cmd(cmd, engine) {
                return Ok(());
            }
        }

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, settings, engine) {
                    break;
                }
            }
        }
    }

    Ok(())
}

fn handle_control_cmd(cmd: ControlCmd, engine: &Engine) -> bool {
    let playing = engine.snapshot().is_playing;
    match cmd {
        ControlCmd::Quit => return true,
        ControlCmd::Play => {
            if !playing {
                engine.toggle_play();
            }
        }
        ControlCmd::Pause => {
            if playing {
                engine.toggle_play();
            }
        }
        ControlCmd::PlayPause => {
            engine.toggle_play();
        }
        ControlCmd::Stop => {
            if playing {
                engine.toggle_play();
            }
            engine.seek(0.0);
        }
        ControlCmd::Next => {
            engine.next_track();
        }
        ControlCmd::Prev => {
            engine.prev_track();
        }
    }
    false
}

fn handle_key_event(key: KeyEvent, settings: &config::Settings, engine: &Engine) -> bool {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return true,
        KeyCode::Char('p') | KeyCode::Char(' ') => {
            engine.toggle_play();
        }
        KeyCode::Char('l') | KeyCode::Char('n') => {
            engine.next_track();
        }
        KeyCode::Char('h') | KeyCode::Char('b') => {
            engine.prev_track();
        }
        KeyCode::Char('r') => {
            engine.toggle_repeat();
        }
        KeyCode::Char('f') => {
            if let Some(track) = engine.current_track() {
                engine.toggle_favorite(&track.id);
            }
        }
        KeyCode::Char('+') | KeyCode::Char('=') => {
            let volume = i32::from(engine.snapshot().volume);
            engine.set_volume(volume + 5);
        }
        KeyCode::Char('-') => {
            let volume = i32::from(engine.snapshot().volume);
            engine.set_volume(volume - 5);
        }
        KeyCode::Right | KeyCode::Left => {
            let scrub = settings.audio.scrub_seconds as f64;
            let now = engine.snapshot().current_time;
            let target = if key.code == KeyCode::Right {
                now + scrub
            } else {
                now - scrub
            };
            engine.seek(target);
        }
        _ => {}
    }
    false
}

fn format_time(secs: f64) -> String {
    let total = if secs.is_finite() { secs.max(0.0) as u64 } else { 0 };
    format!("{:02}:{:02}", total / 60, total % 60)
}

fn meter(level: f32) -> String {
    let filled = ((level.clamp(0.0, 1.0) * METER_WIDTH as f32).round() as usize).min(METER_WIDTH);
    format!("{}{}", "#".repeat(filled), ".".repeat(METER_WIDTH - filled))
}

/// One-line readout of transport, track and spectral state.
pub fn status_line(s: &PlaybackState) -> String {
    let transport = if s.is_playing { ">" } else { "||" };
    let title = match s.current_track() {
        Some(track) => {
            let star = if s.is_favorite(&track.id) { "*" } else { "" };
            format!("{star}{}", track.display())
        }
        None if s.is_loading_more => "loading...".to_string(),
        None => "no tracks".to_string(),
    };
    let position = format!(
        "{}/{}",
        format_time(s.current_time),
        format_time(s.duration)
    );
    let volume = if s.is_muted {
        "muted".to_string()
    } else {
        format!("vol {}", s.volume)
    };
    let beat = if s.beat_detected { "!" } else { " " };

    format!(
        "{transport} [{}/{}] {title} {position} {volume} rpt {:?} bass {} mid {} {beat}",
        (s.current_track_index + 1).min(s.track_list.len()),
        s.track_list.len(),
        s.repeat_mode,
        meter(s.bass_intensity),
        meter(s.mid_intensity),
    )
}
