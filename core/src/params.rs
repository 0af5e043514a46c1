//! Request parameter sets.
//!
//! # Design
//! `Params` keeps insertion order so encoded queries are deterministic, and
//! treats keys like a map: setting an existing key replaces its value in
//! place. Values are text, an ordered list of text (encoded as one pair per
//! element), or an image source that an upload operation turns into base64
//! text before encoding.

use std::fmt;
use std::io::Read;
use std::path::PathBuf;

use chrono::{DateTime, SecondsFormat, TimeZone};

/// Where the bytes of an `image` parameter come from.
pub enum ImageSource {
    /// Read from a file when the request is built.
    Path(PathBuf),
    /// Bytes already in memory.
    Bytes(Vec<u8>),
    /// An open stream, read to the end when the request is built.
    Reader(Box<dyn Read + Send>),
}

impl fmt::Debug for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageSource::Path(path) => f.debug_tuple("Path").field(path).finish(),
            ImageSource::Bytes(bytes) => write!(f, "Bytes({} bytes)", bytes.len()),
            ImageSource::Reader(_) => f.write_str("Reader(..)"),
        }
    }
}

/// A single parameter value.
#[derive(Debug)]
pub enum ParamValue {
    Text(String),
    List(Vec<String>),
    Image(ImageSource),
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_owned())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        ParamValue::Text(value.clone())
    }
}

macro_rules! text_from_display {
    ($($ty:ty),+) => {
        $(
            impl From<$ty> for ParamValue {
                fn from(value: $ty) -> Self {
                    ParamValue::Text(value.to_string())
                }
            }
        )+
    };
}

text_from_display!(i32, i64, u32, u64, usize, bool);

/// Date-times are sent as RFC 3339 with whole seconds, e.g.
/// `2007-08-09T12:34:56+09:00`.
impl<Tz: TimeZone> From<DateTime<Tz>> for ParamValue
where
    Tz::Offset: fmt::Display,
{
    fn from(value: DateTime<Tz>) -> Self {
        ParamValue::Text(value.to_rfc3339_opts(SecondsFormat::Secs, false))
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(values: Vec<String>) -> Self {
        ParamValue::List(values)
    }
}

impl From<Vec<&str>> for ParamValue {
    fn from(values: Vec<&str>) -> Self {
        ParamValue::List(values.into_iter().map(str::to_owned).collect())
    }
}

impl<const N: usize> From<[&str; N]> for ParamValue {
    fn from(values: [&str; N]) -> Self {
        ParamValue::List(values.iter().map(|v| (*v).to_owned()).collect())
    }
}

impl From<ImageSource> for ParamValue {
    fn from(source: ImageSource) -> Self {
        ParamValue::Image(source)
    }
}

/// Ordered set of request parameters.
#[derive(Debug, Default)]
pub struct Params {
    entries: Vec<(String, ParamValue)>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Params::set`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Set `key`, replacing any previous value while keeping its position.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut ParamValue)> {
        self.entries.iter_mut().map(|(k, v)| (k.as_str(), v))
    }
}
