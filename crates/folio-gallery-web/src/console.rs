#![forbid(unsafe_code)]

//! Browser console plumbing: panic hook and a `tracing` writer.

use std::fmt;
use std::io;
use std::panic::Location;
use std::sync::Once;

use tracing_subscriber::fmt::MakeWriter;
use wasm_bindgen::JsValue;

/// Console text for one panic, tagged like the `folio.web` target.
fn panic_line(location: Option<&Location<'_>>, message: &dyn fmt::Display) -> String {
    let at = location
        .map(|loc| format!(" ({}:{})", loc.file(), loc.line()))
        .unwrap_or_default();
    format!("[folio.web] gallery panicked{at}: {message}")
}

/// Route Rust panics to `console.error`.
///
/// Safe to call on every mount; the hook is installed once.
pub(crate) fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            let line = panic_line(info.location(), info);
            web_sys::console::error_1(&JsValue::from_str(&line));
        }));
    });
}

/// Buffers one formatted event and logs it when dropped.
pub(crate) struct ConsoleLine {
    buf: Vec<u8>,
}

impl io::Write for ConsoleLine {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleLine {
    fn drop(&mut self) {
        let text = String::from_utf8_lossy(&self.buf);
        let line = text.trim_end();
        if !line.is_empty() {
            web_sys::console::log_1(&JsValue::from_str(line));
        }
    }
}

pub(crate) struct ConsoleMakeWriter;

impl<'a> MakeWriter<'a> for ConsoleMakeWriter {
    type Writer = ConsoleLine;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleLine { buf: Vec::new() }
    }
}

/// Install the console subscriber. A second call (or a subscriber installed
/// by the embedding app) is left in place.
pub(crate) fn init_tracing(level: tracing::Level) {
    let installed = tracing_subscriber::fmt()
        .with_writer(ConsoleMakeWriter)
        .without_time()
        .with_target(true)
        .with_max_level(level)
        .try_init();
    if installed.is_err() {
        tracing::debug!(target: "folio.web", "tracing subscriber already installed");
    }
}
