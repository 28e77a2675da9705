//! WASM bindings for melodia-playback
//!
//! Drives the playback controller from a web page: media commands go to a
//! JavaScript bridge object wrapping an `<audio>` element, and the page
//! reports the element's events back through [`WasmPlayer::on_media_event`].

pub mod bridge;
pub mod player;

pub use bridge::{JsHistorySink, JsMediaHandle, MediaBridge};
pub use player::WasmPlayer;
