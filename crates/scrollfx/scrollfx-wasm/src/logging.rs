//! `log` backend that writes to the browser console.
use log::{Level, LevelFilter, Log, Metadata, Record};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console, js_name = debug)]
    fn console_debug(s: &str);
    #[wasm_bindgen(js_namespace = console, js_name = log)]
    fn console_log(s: &str);
    #[wasm_bindgen(js_namespace = console, js_name = warn)]
    fn console_warn(s: &str);
    #[wasm_bindgen(js_namespace = console, js_name = error)]
    fn console_error(s: &str);
}

struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!("[{}] {}", record.target(), record.args());
        match record.level() {
            Level::Error => console_error(&line),
            Level::Warn => console_warn(&line),
            Level::Info => console_log(&line),
            Level::Debug | Level::Trace => console_debug(&line),
        }
    }

    fn flush(&self) {}
}

/// Route engine logs to the console. `level` is one of `off`, `error`,
/// `warn` (default), `info`, `debug`, `trace`. Calling again only changes
/// the level.
///
/// # Example
///
/// ```javascript
/// import { init_logging } from "./pkg/scrollfx_wasm.js";
/// init_logging("debug");
/// ```
#[wasm_bindgen]
pub fn init_logging(level: Option<String>) -> Result<(), JsError> {
    let filter = match level.as_deref() {
        None => LevelFilter::Warn,
        Some(name) => name
            .parse::<LevelFilter>()
            .map_err(|_| JsError::new(&format!("unknown log level {name:?}")))?,
    };
    // Already installed on repeat calls; only the level changes then.
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(filter);
    Ok(())
}
