//! JavaScript-backed collaborators

use crate::clock::Clock;
use crate::error::MediaError;
use crate::media::{LoadGeneration, LoadRequest, MediaHandle};
use crate::sink::{HistorySink, HistorySinkError};
use js_sys::{Function, Reflect};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    /// Page-side wrapper around one `<audio>` element
    ///
    /// `load` and `play` report their outcome asynchronously through
    /// `WasmPlayer.onMediaEvent`, tagged with the generation they were given.
    pub type MediaBridge;

    #[wasm_bindgen(method, catch)]
    fn load(this: &MediaBridge, generation: f64, url: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch)]
    fn play(this: &MediaBridge, generation: f64) -> Result<(), JsValue>;

    #[wasm_bindgen(method)]
    fn pause(this: &MediaBridge);

    #[wasm_bindgen(method)]
    fn reset(this: &MediaBridge);

    #[wasm_bindgen(method)]
    fn seek(this: &MediaBridge, position_secs: f64);

    #[wasm_bindgen(method, js_name = setVolume)]
    fn set_volume(this: &MediaBridge, fraction: f32);

    #[wasm_bindgen(method, js_name = setMuted)]
    fn set_muted(this: &MediaBridge, muted: bool);

    #[wasm_bindgen(method, js_name = setLooping)]
    fn set_looping(this: &MediaBridge, looping: bool);
}

/// [`MediaHandle`] forwarding to a [`MediaBridge`]
pub struct JsMediaHandle {
    bridge: MediaBridge,
}

impl JsMediaHandle {
    pub fn new(bridge: MediaBridge) -> Self {
        Self { bridge }
    }
}

impl MediaHandle for JsMediaHandle {
    fn load(&mut self, request: LoadRequest) -> Result<(), MediaError> {
        self.bridge
            .load(request.generation.0 as f64, &request.url)
            .map_err(|e| media_error_from_js(&e))
    }

    fn play(&mut self, generation: LoadGeneration) -> Result<(), MediaError> {
        self.bridge
            .play(generation.0 as f64)
            .map_err(|e| media_error_from_js(&e))
    }

    fn pause(&mut self) {
        self.bridge.pause();
    }

    fn reset(&mut self) {
        self.bridge.reset();
    }

    fn seek(&mut self, position_secs: f64) {
        self.bridge.seek(position_secs);
    }

    fn set_volume(&mut self, fraction: f32) {
        self.bridge.set_volume(fraction);
    }

    fn set_muted(&mut self, muted: bool) {
        self.bridge.set_muted(muted);
    }

    fn set_looping(&mut self, looping: bool) {
        self.bridge.set_looping(looping);
    }
}

/// Classify a thrown value or rejection reason (usually a `DOMException`)
pub fn media_error_from_js(value: &JsValue) -> MediaError {
    let read = |key: &str| {
        Reflect::get(value, &JsValue::from_str(key))
            .ok()
            .and_then(|v| v.as_string())
            .unwrap_or_default()
    };

    let name = read("name");
    let mut message = read("message");
    if message.is_empty() {
        message = value.as_string().unwrap_or_else(|| "media error".to_string());
    }
    MediaError::from_dom_name(&name, message)
}

/// History sink calling a page callback `(userId, trackId)`
///
/// The callback is swappable after construction; clones share it.
#[derive(Clone, Default)]
pub struct JsHistorySink {
    callback: Rc<RefCell<Option<Function>>>,
}

impl JsHistorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_callback(&self, callback: Option<Function>) {
        *self.callback.borrow_mut() = callback;
    }
}

impl HistorySink for JsHistorySink {
    fn record_play(&self, user_id: &str, track_id: &str) -> Result<(), HistorySinkError> {
        let callback = self.callback.borrow();
        let Some(callback) = callback.as_ref() else {
            return Ok(());
        };
        callback
            .call2(
                &JsValue::NULL,
                &JsValue::from_str(user_id),
                &JsValue::from_str(track_id),
            )
            .map(|_| ())
            .map_err(|e| HistorySinkError(media_error_from_js(&e).message))
    }
}

/// Wall clock from `Date.now()`
#[derive(Debug, Clone, Copy, Default)]
pub struct DateClock;

impl Clock for DateClock {
    fn now(&self) -> Duration {
        Duration::from_secs_f64(js_sys::Date::now().max(0.0) / 1000.0)
    }
}
