use serde::Serialize;
use serde_json::{Map, Number, Value};
use std::cmp::Ordering;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
}

impl PartialOrd for LogLevel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LogLevel {
    fn cmp(&self, other: &Self) -> Ordering {
        fn rank(level: LogLevel) -> u8 {
            match level {
                LogLevel::Debug => 0,
                LogLevel::Info => 1,
            }
        }

        rank(*self).cmp(&rank(*other))
    }
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            _ => None,
        }
    }
}

/// Writes one JSON object per event: `{"ts", "level", "event", ...fields}`.
#[derive(Clone, Copy, Debug)]
pub struct Logger {
    min_level: LogLevel,
}

impl Logger {
    pub fn new(min_level: LogLevel) -> Self {
        Self { min_level }
    }

    pub fn debug(&self, event: &str, fields: Value) {
        self.event(LogLevel::Debug, event, fields);
    }

    pub fn info(&self, event: &str, fields: Value) {
        self.event(LogLevel::Info, event, fields);
    }

    pub fn event(&self, level: LogLevel, event: &str, fields: Value) {
        if let Some(line) = self.format(level, event, fields) {
            emit(&line);
        }
    }

    fn format(&self, level: LogLevel, event: &str, fields: Value) -> Option<String> {
        if level < self.min_level {
            return None;
        }

        let mut payload = Map::new();
        payload.insert(
            "ts".to_string(),
            Number::from_f64(now_unix_millis())
                .map(Value::Number)
                .unwrap_or(Value::Null),
        );
        payload.insert("level".to_string(), Value::String(level.as_str().to_string()));
        payload.insert("event".to_string(), Value::String(event.to_string()));

        if let Value::Object(extra) = fields {
            for (key, value) in extra {
                payload.insert(key, value);
            }
        }

        Some(Value::Object(payload).to_string())
    }
}

#[cfg(target_arch = "wasm32")]
fn emit(line: &str) {
    web_sys::console::log_1(&wasm_bindgen::JsValue::from_str(line));
}

#[cfg(not(target_arch = "wasm32"))]
fn emit(line: &str) {
    println!("{line}");
}

#[cfg(target_arch = "wasm32")]
fn now_unix_millis() -> f64 {
    js_sys::Date::now()
}

#[cfg(not(target_arch = "wasm32"))]
fn now_unix_millis() -> f64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|value| value.as_millis() as f64)
        .unwrap_or(0.0)
}
