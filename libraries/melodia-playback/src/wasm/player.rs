//! WASM-compatible PlaybackController wrapper

use super::bridge::{media_error_from_js, DateClock, JsHistorySink, JsMediaHandle, MediaBridge};
use crate::{
    LoadGeneration, MediaEvent, MediaEventKind, MediaState, PlaybackConfig, PlaybackController,
    RecentPlay, RepeatMode, SharedSession, Track,
};
use js_sys::Function;
use wasm_bindgen::prelude::*;

/// WASM-compatible player
///
/// Wraps the core controller with a JavaScript-friendly API. Queued
/// playback events are delivered to the `onEvent` callback after every call.
#[wasm_bindgen]
pub struct WasmPlayer {
    inner: PlaybackController<JsMediaHandle>,
    history: JsHistorySink,
    session: SharedSession,

    // Event callback
    on_event: Option<Function>,
}

#[wasm_bindgen]
impl WasmPlayer {
    /// Create a player bound to a media bridge
    ///
    /// `config` is an optional `PlaybackConfig`-shaped object.
    #[wasm_bindgen(constructor)]
    pub fn new(bridge: MediaBridge, config: JsValue) -> Result<WasmPlayer, JsValue> {
        console_error_panic_hook::set_once();

        let config: PlaybackConfig = if config.is_undefined() || config.is_null() {
            PlaybackConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsValue::from_str(&format!("Invalid config: {}", e)))?
        };
        config.validate().map_err(|e| JsValue::from_str(&e.to_string()))?;

        let history = JsHistorySink::new();
        let session = SharedSession::new();
        let inner = PlaybackController::new(
            config,
            JsMediaHandle::new(bridge),
            history.clone(),
            session.clone(),
        )
        .with_clock(DateClock);

        Ok(Self {
            inner,
            history,
            session,
            on_event: None,
        })
    }

    // ===== Playback Control =====

    /// Play `track` from `list` starting at `index`
    pub fn play(&mut self, track: JsValue, list: JsValue, index: usize) -> Result<(), JsValue> {
        let track: Option<Track> = serde_wasm_bindgen::from_value(track)
            .map_err(|e| JsValue::from_str(&format!("Failed to parse track: {}", e)))?;
        // Anything that is not a track array becomes an empty queue
        let list: Vec<Track> = serde_wasm_bindgen::from_value(list).unwrap_or_default();

        self.inner.play(track, list, index);
        self.flush_events();
        Ok(())
    }

    pub fn next(&mut self) -> bool {
        let moved = self.inner.next();
        self.flush_events();
        moved
    }

    pub fn previous(&mut self) -> bool {
        let moved = self.inner.previous();
        self.flush_events();
        moved
    }

    pub fn stop(&mut self) {
        self.inner.stop();
        self.flush_events();
    }

    #[wasm_bindgen(js_name = togglePlayPause)]
    pub fn toggle_play_pause(&mut self) {
        self.inner.toggle_play_pause();
        self.flush_events();
    }

    /// Seek to position in seconds
    pub fn seek(&mut self, position_secs: f64) {
        self.inner.seek(position_secs);
        self.flush_events();
    }

    // ===== Volume Control =====

    /// Set volume (clamped to 0-100)
    #[wasm_bindgen(js_name = setVolume)]
    pub fn set_volume(&mut self, level: i32) {
        self.inner.set_volume(level);
        self.flush_events();
    }

    #[wasm_bindgen(js_name = toggleMute)]
    pub fn toggle_mute(&mut self) {
        self.inner.toggle_mute();
        self.flush_events();
    }

    // ===== Shuffle & Repeat =====

    #[wasm_bindgen(js_name = toggleRepeat)]
    pub fn toggle_repeat(&mut self) {
        self.inner.toggle_repeat();
        self.flush_events();
    }

    /// Set repeat mode ("off" | "all" | "one")
    #[wasm_bindgen(js_name = setRepeat)]
    pub fn set_repeat(&mut self, mode: &str) -> Result<(), JsValue> {
        let repeat: RepeatMode = mode
            .parse()
            .map_err(|e: crate::PlaybackError| JsValue::from_str(&e.to_string()))?;
        self.inner.set_repeat(repeat);
        self.flush_events();
        Ok(())
    }

    #[wasm_bindgen(js_name = toggleShuffle)]
    pub fn toggle_shuffle(&mut self) {
        self.inner.toggle_shuffle();
        self.flush_events();
    }

    // ===== Queue Management =====

    #[wasm_bindgen(js_name = addToQueue)]
    pub fn add_to_queue(&mut self, track: JsValue) -> Result<(), JsValue> {
        let track: Track = serde_wasm_bindgen::from_value(track)
            .map_err(|e| JsValue::from_str(&format!("Failed to parse track: {}", e)))?;
        self.inner.add_to_queue(track);
        self.flush_events();
        Ok(())
    }

    #[wasm_bindgen(js_name = clearQueue)]
    pub fn clear_queue(&mut self) {
        self.inner.clear_queue();
        self.flush_events();
    }

    // ===== Session & History =====

    #[wasm_bindgen(js_name = signIn)]
    pub fn sign_in(&self, user_id: String) {
        self.session.sign_in(user_id);
    }

    #[wasm_bindgen(js_name = signOut)]
    pub fn sign_out(&self) {
        self.session.sign_out();
    }

    /// Register the `(userId, trackId)` play recorder
    #[wasm_bindgen(js_name = onPlayRecorded)]
    pub fn on_play_recorded(&mut self, callback: Option<Function>) {
        self.history.set_callback(callback);
    }

    // ===== Media Events =====

    /// Report an `<audio>` element event for the load tagged `generation`
    ///
    /// `kind` is one of `loadstart`, `loadedmetadata`, `canplay`,
    /// `timeupdate`, `playresolved`, `playrejected`, `error`, `ended`.
    /// `value` carries the duration, position or error where relevant.
    #[wasm_bindgen(js_name = onMediaEvent)]
    pub fn on_media_event(&mut self, kind: &str, generation: f64, value: JsValue) {
        let kind = match kind {
            "loadstart" => MediaEventKind::LoadStarted,
            "loadedmetadata" | "durationchange" => MediaEventKind::MetadataLoaded {
                duration_secs: value.as_f64().unwrap_or(f64::NAN),
            },
            "canplay" => MediaEventKind::Ready,
            "timeupdate" => MediaEventKind::TimeUpdate {
                position_secs: value.as_f64().unwrap_or(f64::NAN),
            },
            "playresolved" => MediaEventKind::PlayResolved,
            "playrejected" => MediaEventKind::PlayRejected(media_error_from_js(&value)),
            "error" => MediaEventKind::Failed(media_error_from_js(&value)),
            "ended" => MediaEventKind::Ended,
            _ => return,
        };

        let generation = LoadGeneration(generation.max(0.0) as u64);
        self.inner.handle_media_event(MediaEvent::new(generation, kind));
        self.flush_events();
    }

    /// Check for a stalled load; call from a timer
    pub fn poll(&mut self) {
        self.inner.poll();
        self.flush_events();
    }

    // ===== State Queries =====

    /// Full player runtime state as an object
    #[wasm_bindgen(js_name = getPlayerState)]
    pub fn get_player_state(&self) -> JsValue {
        serde_wasm_bindgen::to_value(self.inner.get_player()).unwrap_or(JsValue::NULL)
    }

    #[wasm_bindgen(js_name = getQueue)]
    pub fn get_queue(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.inner.queue_view()).unwrap_or(JsValue::NULL)
    }

    #[wasm_bindgen(js_name = getRecentlyPlayed)]
    pub fn get_recently_played(&self) -> JsValue {
        let recent: Vec<&RecentPlay> = self.inner.recently_played().iter().collect();
        serde_wasm_bindgen::to_value(&recent).unwrap_or(JsValue::NULL)
    }

    /// Media lifecycle state ("idle" | "loading" | "ready" | "playing" | "paused" | "error")
    #[wasm_bindgen(js_name = getMediaState)]
    pub fn get_media_state(&self) -> String {
        match self.inner.get_media_state() {
            MediaState::Idle => "idle".to_string(),
            MediaState::Loading => "loading".to_string(),
            MediaState::Ready => "ready".to_string(),
            MediaState::Playing => "playing".to_string(),
            MediaState::Paused => "paused".to_string(),
            MediaState::Error => "error".to_string(),
        }
    }

    #[wasm_bindgen(js_name = getRepeat)]
    pub fn get_repeat(&self) -> String {
        self.inner.get_repeat().to_string()
    }

    #[wasm_bindgen(js_name = isShuffled)]
    pub fn is_shuffled(&self) -> bool {
        self.inner.is_shuffled()
    }

    #[wasm_bindgen(js_name = isPlaying)]
    pub fn is_playing(&self) -> bool {
        self.inner.is_playing()
    }

    #[wasm_bindgen(js_name = getVolume)]
    pub fn get_volume(&self) -> u8 {
        self.inner.get_volume()
    }

    // ===== Event Listeners =====

    /// Register the playback event callback
    #[wasm_bindgen(js_name = onEvent)]
    pub fn on_event(&mut self, callback: Option<Function>) {
        self.on_event = callback;
    }

    fn flush_events(&mut self) {
        let events = self.inner.drain_events();
        let Some(ref cb) = self.on_event else {
            return;
        };
        for event in events {
            if let Ok(js_event) = serde_wasm_bindgen::to_value(&event) {
                cb.call1(&JsValue::NULL, &js_event).ok();
            }
        }
    }
}
