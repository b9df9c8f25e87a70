use super::source::endpoint_url;
use super::*;
use crate::library::{RawId, RawTrack};
use crate::state::{PlaybackState, RepeatMode, StateHandle};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

fn raw(id: usize) -> RawTrack {
    RawTrack {
        id: RawId::Number(id as i64),
        title: format!("Track {id}"),
        artist: None,
        audio_source: format!("/music/{id}.mp3"),
        cover: None,
    }
}

fn page(ids: std::ops::Range<usize>) -> PageResponse {
    PageResponse {
        results: ids.map(raw).collect(),
        next_offset: None,
        total: None,
    }
}

/// Serves scripted results in order and records every request.
struct ScriptedSource {
    script: Mutex<VecDeque<Result<PageResponse, FetchError>>>,
    requests: Mutex<Vec<PageRequest>>,
}

impl ScriptedSource {
    fn new(script: Vec<Result<PageResponse, FetchError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<PageRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl TrackSource for ScriptedSource {
    fn fetch_page(&self, request: &PageRequest) -> Result<PageResponse, FetchError> {
        self.requests.lock().unwrap().push(*request);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(page(0..0)))
    }
}

/// Blocks inside `fetch_page` until released, so tests can overlap calls.
struct GatedSource {
    calls: AtomicUsize,
    entered: Mutex<mpsc::Sender<()>>,
    release: Mutex<mpsc::Receiver<()>>,
}

impl TrackSource for GatedSource {
    fn fetch_page(&self, request: &PageRequest) -> Result<PageResponse, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let _ = self.entered.lock().unwrap().send(());
        let _ = self.release.lock().unwrap().recv();
        Ok(page(request.offset..request.offset + request.limit))
    }
}

fn state() -> StateHandle {
    PlaybackState::new(64, 50, RepeatMode::Off).into_handle()
}

fn loader(source: Arc<dyn TrackSource>, state: &StateHandle) -> PlaylistLoader {
    PlaylistLoader::new(source, state.clone(), 3, "https://cdn.test", CancelToken::new())
}

#[test]
fn load_more_appends_pages_and_advances_the_cursor() {
    let source = ScriptedSource::new(vec![Ok(page(0..3)), Ok(page(3..6))]);
    let st = state();
    let l = loader(source.clone(), &st);

    assert_eq!(l.load_more(), LoadOutcome::Loaded { added: 3, exhausted: false });
    assert_eq!(l.load_more(), LoadOutcome::Loaded { added: 3, exhausted: false });

    let reqs = source.requests();
    assert_eq!(reqs, vec![
        PageRequest { offset: 0, limit: 3 },
        PageRequest { offset: 3, limit: 3 },
    ]);

    let s = st.lock().unwrap();
    assert_eq!(s.track_list.len(), 6);
    assert_eq!(s.cursor, 6);
    assert_eq!(s.pages_loaded, 2);
    assert!(s.has_more);
    assert!(!s.is_loading_more);
    assert_eq!(s.track_list[4].id, "4");
    assert_eq!(s.track_list[4].src, "https://cdn.test/music/4.mp3");
    assert_eq!(s.track_list[4].artist, "Unknown");
}

#[test]
fn short_page_exhausts_permanently() {
    let source = ScriptedSource::new(vec![Ok(page(0..2)), Ok(page(2..5))]);
    let st = state();
    let l = loader(source.clone(), &st);

    assert_eq!(l.load_more(), LoadOutcome::Loaded { added: 2, exhausted: true });
    assert!(!st.lock().unwrap().has_more);

    // Idle calls afterwards never reach the source and never reset the flag.
    assert_eq!(l.load_more(), LoadOutcome::Skipped);
    assert_eq!(l.load_more(), LoadOutcome::Skipped);
    assert_eq!(source.requests().len(), 1);
    assert!(!st.lock().unwrap().has_more);
}

#[test]
fn failure_keeps_has_more_and_allows_retry() {
    let source = ScriptedSource::new(vec![
        Err(FetchError::Status(503)),
        Err(FetchError::Status(500)),
        Ok(page(0..3)),
    ]);
    let st = state();
    let l = loader(source.clone(), &st);

    assert_eq!(l.load_more(), LoadOutcome::Failed);
    {
        let s = st.lock().unwrap();
        assert!(s.has_more);
        assert!(!s.is_loading_more);
        assert!(s.track_list.is_empty());
        assert_eq!(s.cursor, 0);
    }
    assert_eq!(l.load_more(), LoadOutcome::Failed);
    assert_eq!(l.load_more(), LoadOutcome::Loaded { added: 3, exhausted: false });
    assert_eq!(source.requests().len(), 3);
    assert!(source.requests().iter().all(|r| r.offset == 0));
}

#[test]
fn unsuccessful_page_ends_the_list() {
    let source = ScriptedSource::new(vec![
        PageBody::parse(r#"{"success": false, "message": "no more"}"#),
        Ok(page(0..3)),
    ]);
    let st = state();
    let l = loader(source.clone(), &st);

    assert_eq!(l.load_more(), LoadOutcome::Loaded { added: 0, exhausted: true });
    assert!(!st.lock().unwrap().has_more);
    assert_eq!(l.load_more(), LoadOutcome::Skipped);
    assert_eq!(source.requests().len(), 1);
}

#[test]
fn load_more_is_a_no_op_while_a_load_is_flagged() {
    let source = ScriptedSource::new(vec![Ok(page(0..3))]);
    let st = state();
    st.lock().unwrap().is_loading_more = true;
    let l = loader(source.clone(), &st);

    assert_eq!(l.load_more(), LoadOutcome::Skipped);
    assert!(source.requests().is_empty());
    assert!(st.lock().unwrap().is_loading_more);
}

#[test]
fn overlapping_calls_issue_exactly_one_request() {
    let (entered_tx, entered_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let source = Arc::new(GatedSource {
        calls: AtomicUsize::new(0),
        entered: Mutex::new(entered_tx),
        release: Mutex::new(release_rx),
    });
    let st = state();
    let l = Arc::new(loader(source.clone(), &st));

    let first = {
        let l = l.clone();
        thread::spawn(move || l.load_more())
    };
    entered_rx.recv_timeout(Duration::from_secs(5)).unwrap();

    assert!(st.lock().unwrap().is_loading_more);
    assert_eq!(l.load_more(), LoadOutcome::Skipped);

    release_tx.send(()).unwrap();
    assert_eq!(
        first.join().unwrap(),
        LoadOutcome::Loaded { added: 3, exhausted: false }
    );
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    assert_eq!(st.lock().unwrap().track_list.len(), 3);
}

#[test]
fn server_cursor_wins_over_list_length() {
    let mut first = page(0..3);
    first.next_offset = Some(10);
    let source = ScriptedSource::new(vec![Ok(first), Ok(page(10..13))]);
    let st = state();
    let l = loader(source.clone(), &st);

    l.load_more();
    l.load_more();
    assert_eq!(source.requests()[1].offset, 10);
    assert_eq!(st.lock().unwrap().cursor, 13);
}

#[test]
fn external_add_tracks_does_not_shift_the_cursor() {
    let source = ScriptedSource::new(vec![Ok(page(0..3)), Ok(page(3..6))]);
    let st = state();
    let l = loader(source.clone(), &st);

    l.load_more();
    st.lock().unwrap().add_tracks(vec![crate::library::track_from_raw(raw(99), "")]);
    l.load_more();
    assert_eq!(source.requests()[1].offset, 3);
}

#[test]
fn cancelled_token_discards_in_flight_results() {
    let (entered_tx, entered_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let source = Arc::new(GatedSource {
        calls: AtomicUsize::new(0),
        entered: Mutex::new(entered_tx),
        release: Mutex::new(release_rx),
    });
    let st = state();
    let token = CancelToken::new();
    let l = Arc::new(PlaylistLoader::new(source, st.clone(), 3, "", token.clone()));

    let worker = {
        let l = l.clone();
        thread::spawn(move || l.load_more())
    };
    entered_rx.recv_timeout(Duration::from_secs(5)).unwrap();
    token.cancel();
    release_tx.send(()).unwrap();

    assert_eq!(worker.join().unwrap(), LoadOutcome::Discarded);
    let s = st.lock().unwrap();
    assert!(s.track_list.is_empty());
    assert!(!s.is_loading_more);
    drop(s);
    assert_eq!(l.load_more(), LoadOutcome::Skipped);
}

#[test]
fn page_body_parses_success_and_empties_unsuccessful_pages() {
    let ok = PageBody::parse(
        r#"{"success": true, "count": 40, "results": [
            {"id": 1, "title": "A", "artist": "X", "audio_source": "a.mp3", "cover": null},
            {"id": "2", "title": "B", "audio_file": "b.mp3"}
        ]}"#,
    )
    .unwrap();
    assert_eq!(ok.results.len(), 2);
    assert_eq!(ok.total, Some(40));
    assert_eq!(ok.next_offset, None);

    let rejected = PageBody::parse(
        r#"{"success": false, "message": "nope", "results": [
            {"id": 3, "title": "C", "audio_source": "c.mp3"}
        ]}"#,
    )
    .unwrap();
    assert!(rejected.results.is_empty());
    assert_eq!(rejected.next_offset, None);

    assert!(matches!(PageBody::parse("<html>"), Err(FetchError::Decode(_))));
}

#[test]
fn endpoint_url_joins_without_double_slashes() {
    assert_eq!(endpoint_url("http://h/api/v1/", "/music"), "http://h/api/v1/music");
    assert_eq!(endpoint_url("http://h/api/v1", "music"), "http://h/api/v1/music");
    assert_eq!(endpoint_url("http://h/api", ""), "http://h/api");
}
