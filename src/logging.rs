use serde_json::{Map, Value};

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum LogLevel {
    Debug,
    Info,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            _ => None,
        }
    }
}

pub trait LogSettings {
    fn log_level(&self) -> LogLevel;

    fn logs_at(&self, level: LogLevel) -> bool {
        level >= self.log_level()
    }
}

/// Writes `event` as one JSON line when `config` lets `level` through.
pub fn log_event<C>(config: &C, level: LogLevel, event: &str, fields: Value)
where
    C: LogSettings + ?Sized,
{
    if config.logs_at(level) {
        emit(&event_line(level, event, fields, now_unix_seconds()));
    }
}

fn event_line(level: LogLevel, event: &str, fields: Value, ts: u64) -> String {
    let mut line = Map::new();
    line.insert("ts".into(), Value::from(ts));
    line.insert("level".into(), Value::from(level.as_str()));
    line.insert("event".into(), Value::from(event));
    if let Value::Object(extra) = fields {
        line.extend(extra);
    }
    Value::Object(line).to_string()
}

#[cfg(not(target_arch = "wasm32"))]
fn emit(line: &str) {
    println!("{line}");
}

#[cfg(target_arch = "wasm32")]
fn emit(line: &str) {
    web_sys::console::log_1(&wasm_bindgen::JsValue::from_str(line));
}

#[cfg(not(target_arch = "wasm32"))]
fn now_unix_seconds() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_secs())
}

#[cfg(target_arch = "wasm32")]
fn now_unix_seconds() -> u64 {
    (js_sys::Date::now() / 1_000.0) as u64
}
