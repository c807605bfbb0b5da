//! The shared rendering context.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Local, Timelike};
use minijinja::value::{from_args, Enumerator, Object, Value};
use minijinja::{Error, ErrorKind, State};

use crate::data::DataMap;

/// Data exposed to every template in a build.
///
/// Built once per run and never mutated; every render job sees the same
/// instance.
#[derive(Debug, Clone)]
pub struct RenderContext {
    /// Site configuration (`site`)
    pub site: DataMap,
    /// Timeline entries (`timeline_data`)
    pub timeline_data: DataMap,
    /// Fixed tag line (`tags_text`)
    pub tags_text: String,
    /// Document language code (`lang`)
    pub lang: String,
    /// Build timestamp (`now`)
    pub now: BuildTimestamp,
}

impl RenderContext {
    /// The context as named template globals.
    pub fn globals(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("site", Value::from_serialize(&self.site)),
            ("timeline_data", Value::from_serialize(&self.timeline_data)),
            ("tags_text", Value::from(self.tags_text.clone())),
            ("lang", Value::from(self.lang.clone())),
            ("now", Value::from_object(self.now.clone())),
        ]
    }
}

/// The moment a build started, as seen by templates.
///
/// Renders as `YYYY-MM-DD HH:MM:SS[.ffffff]` and exposes the date parts as
/// attributes, plus `isoformat` and a `strftime(fmt)` method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildTimestamp(DateTime<Local>);

impl BuildTimestamp {
    pub fn now() -> Self {
        Self(Local::now())
    }

    pub fn at(time: DateTime<Local>) -> Self {
        Self(time)
    }

    pub fn isoformat(&self) -> String {
        self.with_separator('T')
    }

    /// Date and time joined by `sep`; microseconds only when non-zero.
    fn with_separator(&self, sep: char) -> String {
        let date = self.0.format("%Y-%m-%d");
        if self.0.nanosecond() / 1000 == 0 {
            format!("{date}{sep}{}", self.0.format("%H:%M:%S"))
        } else {
            format!("{date}{sep}{}", self.0.format("%H:%M:%S%.6f"))
        }
    }
}

impl fmt::Display for BuildTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.with_separator(' '))
    }
}

const FIELDS: &[&str] = &["year", "month", "day", "hour", "minute", "second", "isoformat"];

impl Object for BuildTimestamp {
    fn get_value(self: &Arc<Self>, key: &Value) -> Option<Value> {
        let t = &self.0;
        Some(match key.as_str()? {
            "year" => Value::from(t.year()),
            "month" => Value::from(t.month()),
            "day" => Value::from(t.day()),
            "hour" => Value::from(t.hour()),
            "minute" => Value::from(t.minute()),
            "second" => Value::from(t.second()),
            "isoformat" => Value::from(self.isoformat()),
            _ => return None,
        })
    }

    fn enumerate(self: &Arc<Self>) -> Enumerator {
        Enumerator::Str(FIELDS)
    }

    fn call_method(
        self: &Arc<Self>,
        _state: &State<'_, '_>,
        method: &str,
        args: &[Value],
    ) -> Result<Value, Error> {
        match method {
            "strftime" => {
                let (format,): (&str,) = from_args(args)?;
                let mut out = String::new();
                // chrono reports bad specifiers as a fmt::Error
                fmt::write(&mut out, format_args!("{}", self.0.format(format))).map_err(|_| {
                    Error::new(
                        ErrorKind::InvalidOperation,
                        format!("invalid strftime format: {format}"),
                    )
                })?;
                Ok(Value::from(out))
            }
            "isoformat" => Ok(Value::from(self.isoformat())),
            _ => Err(Error::from(ErrorKind::UnknownMethod)),
        }
    }

    fn render(self: &Arc<Self>, f: &mut fmt::Formatter<'_>) -> fmt::Result
    where
        Self: Sized + 'static,
    {
        fmt::Display::fmt(self.as_ref(), f)
    }
}
