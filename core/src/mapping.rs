//! Declarative XML-to-struct mapping.
//!
//! # Design
//! Every mapped type owns a [`Schema`]: a table from source element name to
//! an [`Attribute`] describing the target field, its value type, whether it
//! repeats, and how to assign it. Schemas are built once per type on first
//! use and shared afterwards.
//!
//! Population walks the *immediate* children of an element and looks each
//! tag name up in the schema. Unknown elements are skipped so new server
//! fields never break old clients. After the walk, the schema's optional
//! finishing hook runs (used by search responses to flatten their `result`
//! wrapper).
//!
//! Derived schemas are composed with [`Schema::merge`]: the envelope schema
//! declares `status`, and each response merges its own declarations over it.
//!
//! Field types and their coercions:
//!
//! | value type | source text | on failure |
//! |---|---|---|
//! | `String` | verbatim, `<a/>` gives `""` | n/a |
//! | `Integer` | leading sign and digits | `0` (lenient) or [`ApiError::MalformedNumber`] (strict) |
//! | `Date` | `2007-08-08` or a full date-time | [`ApiError::MalformedDate`] |
//! | `DateTime` | `2007-08-08T12:34:56+09:00` | [`ApiError::MalformedDate`] |
//! | `Mapped` | nested element, recursively populated | propagated |

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{ApiError, Result};
use crate::xml::Element;

/// How `integer` fields treat text that is not a number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Coercion {
    /// Parse the leading digits and fall back to `0`. Matches what the
    /// service's other clients do with evolving fields.
    #[default]
    Lenient,
    /// Reject anything that is not a complete base-10 integer.
    Strict,
}

/// Declared type of an attribute, kept for introspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    String,
    Integer,
    Date,
    DateTime,
    /// A nested mapped type, identified by its Rust type name.
    Mapped(&'static str),
}

type Assign<T> = Box<dyn Fn(&mut T, &Element, Coercion) -> Result<()> + Send + Sync>;

/// One `path -> field` declaration.
pub struct Attribute<T> {
    path: &'static str,
    field: &'static str,
    value_type: ValueType,
    array: bool,
    subnode: Option<&'static str>,
    private: bool,
    assign: Assign<T>,
}

impl<T> Attribute<T> {
    /// Source element name.
    pub fn path(&self) -> &'static str {
        self.path
    }

    /// Target field name.
    pub fn field(&self) -> &'static str {
        self.field
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    pub fn is_array(&self) -> bool {
        self.array
    }

    pub fn subnode(&self) -> Option<&'static str> {
        self.subnode
    }

    /// Private attributes are assigned like any other but are not part of the
    /// type's public API.
    pub fn is_private(&self) -> bool {
        self.private
    }
}

impl<T> fmt::Debug for Attribute<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attribute")
            .field("path", &self.path)
            .field("field", &self.field)
            .field("value_type", &self.value_type)
            .field("array", &self.array)
            .field("subnode", &self.subnode)
            .field("private", &self.private)
            .finish_non_exhaustive()
    }
}

/// The attribute table of one mapped type plus its finishing hook.
pub struct Schema<T> {
    attributes: HashMap<&'static str, Attribute<T>>,
    finish: Option<fn(&mut T)>,
}

impl<T> Default for Schema<T> {
    fn default() -> Self {
        Self {
            attributes: HashMap::new(),
            finish: None,
        }
    }
}

impl<T> fmt::Debug for Schema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut attributes: Vec<_> = self.attributes.values().collect();
        attributes.sort_by_key(|a| a.path);
        f.debug_struct("Schema")
            .field("attributes", &attributes)
            .field("finish", &self.finish.is_some())
            .finish()
    }
}

impl<T: 'static> Schema<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `attribute`. A later declaration for the same path replaces
    /// the earlier one.
    pub fn declare(mut self, attribute: Attribute<T>) -> Self {
        self.attributes.insert(attribute.path, attribute);
        self
    }

    /// Compose `overrides` over `self`: paths declared in both take the
    /// override, new paths are added. An override finishing hook replaces
    /// the base one.
    pub fn merge(mut self, overrides: Schema<T>) -> Self {
        self.attributes.extend(overrides.attributes);
        if overrides.finish.is_some() {
            self.finish = overrides.finish;
        }
        self
    }

    /// Attach the hook that runs once all children have been assigned.
    pub fn finish_with(mut self, finish: fn(&mut T)) -> Self {
        self.finish = Some(finish);
        self
    }

    /// Mark the declaration at `path` as private.
    pub fn private(mut self, path: &str) -> Self {
        if let Some(attribute) = self.attributes.get_mut(path) {
            attribute.private = true;
        }
        self
    }

    pub fn string(self, path: &'static str, field: &'static str, set: fn(&mut T, String)) -> Self {
        self.scalar(path, field, ValueType::String, move |target, element, _| {
            set(target, element.text().to_owned());
            Ok(())
        })
    }

    pub fn integer(self, path: &'static str, field: &'static str, set: fn(&mut T, i64)) -> Self {
        self.scalar(path, field, ValueType::Integer, move |target, element, coercion| {
            set(target, coerce_integer(element, coercion)?);
            Ok(())
        })
    }

    pub fn date(self, path: &'static str, field: &'static str, set: fn(&mut T, NaiveDate)) -> Self {
        self.scalar(path, field, ValueType::Date, move |target, element, _| {
            set(target, coerce_date(element)?);
            Ok(())
        })
    }

    pub fn datetime(
        self,
        path: &'static str,
        field: &'static str,
        set: fn(&mut T, DateTime<FixedOffset>),
    ) -> Self {
        self.scalar(path, field, ValueType::DateTime, move |target, element, _| {
            set(target, coerce_datetime(element)?);
            Ok(())
        })
    }

    /// A nested mapped value. With a `subnode`, the value is populated from
    /// the first descendant at that path and is `None` when there is none.
    pub fn nested<U: Mapped>(
        self,
        path: &'static str,
        field: &'static str,
        subnode: Option<&'static str>,
        set: fn(&mut T, Option<U>),
    ) -> Self {
        let assign = move |target: &mut T, element: &Element, coercion: Coercion| -> Result<()> {
            let source = match subnode {
                Some(subnode) => element.find(subnode),
                None => Some(element),
            };
            let value = source
                .map(|source| U::unmarshal_with(source, coercion))
                .transpose()?;
            set(target, value);
            Ok(())
        };
        self.declare(Attribute {
            path,
            field,
            value_type: ValueType::Mapped(std::any::type_name::<U>()),
            array: false,
            subnode,
            private: false,
            assign: Box::new(assign),
        })
    }

    /// Repeated text elements at `subnode`, e.g. `<related_links><url>..</url></related_links>`.
    pub fn strings(
        self,
        path: &'static str,
        field: &'static str,
        subnode: &'static str,
        set: fn(&mut T, Vec<String>),
    ) -> Self {
        let assign = move |target: &mut T, element: &Element, _: Coercion| -> Result<()> {
            let values = element
                .find_all(subnode)
                .into_iter()
                .map(|item| item.text().to_owned())
                .collect();
            set(target, values);
            Ok(())
        };
        self.declare(Attribute {
            path,
            field,
            value_type: ValueType::String,
            array: true,
            subnode: Some(subnode),
            private: false,
            assign: Box::new(assign),
        })
    }

    /// Repeated mapped elements at `subnode`. A present parent with no
    /// matches yields an empty list.
    pub fn array<U: Mapped>(
        self,
        path: &'static str,
        field: &'static str,
        subnode: &'static str,
        set: fn(&mut T, Vec<U>),
    ) -> Self {
        let assign = move |target: &mut T, element: &Element, coercion: Coercion| -> Result<()> {
            let values = element
                .find_all(subnode)
                .into_iter()
                .map(|item| U::unmarshal_with(item, coercion))
                .collect::<Result<Vec<U>>>()?;
            set(target, values);
            Ok(())
        };
        self.declare(Attribute {
            path,
            field,
            value_type: ValueType::Mapped(std::any::type_name::<U>()),
            array: true,
            subnode: Some(subnode),
            private: false,
            assign: Box::new(assign),
        })
    }

    pub fn get(&self, path: &str) -> Option<&Attribute<T>> {
        self.attributes.get(path)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn attributes(&self) -> impl Iterator<Item = &Attribute<T>> {
        self.attributes.values()
    }

    pub fn has_finish(&self) -> bool {
        self.finish.is_some()
    }

    fn scalar(
        self,
        path: &'static str,
        field: &'static str,
        value_type: ValueType,
        assign: impl Fn(&mut T, &Element, Coercion) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.declare(Attribute {
            path,
            field,
            value_type,
            array: false,
            subnode: None,
            private: false,
            assign: Box::new(assign),
        })
    }
}

/// A type populated from XML through its [`Schema`].
pub trait Mapped: Default + Sized + 'static {
    fn schema() -> &'static Schema<Self>;

    fn unmarshal(element: &Element) -> Result<Self> {
        Self::unmarshal_with(element, Coercion::Lenient)
    }

    fn unmarshal_with(element: &Element, coercion: Coercion) -> Result<Self> {
        populate(element, Self::schema(), coercion)
    }
}

/// Build a `T` from the immediate children of `element`.
pub fn populate<T: Default + 'static>(
    element: &Element,
    schema: &Schema<T>,
    coercion: Coercion,
) -> Result<T> {
    let mut target = T::default();
    for child in element.children() {
        match schema.get(child.name()) {
            Some(attribute) => (attribute.assign)(&mut target, child, coercion)?,
            None => trace!(parent = element.name(), element = child.name(), "skipping unmapped element"),
        }
    }
    if let Some(finish) = schema.finish {
        finish(&mut target);
    }
    Ok(target)
}

fn coerce_integer(element: &Element, coercion: Coercion) -> Result<i64> {
    let text = element.text();
    match coercion {
        Coercion::Strict => text.trim().parse().map_err(|_| ApiError::MalformedNumber {
            field: element.name().to_owned(),
            value: text.to_owned(),
        }),
        Coercion::Lenient => {
            let value = parse_leading_integer(text);
            if value.is_none() {
                trace!(element = element.name(), text, "non-numeric integer field coerced to 0");
            }
            Ok(value.unwrap_or(0))
        }
    }
}

/// Leading `[+-]?[0-9]+` of `text` after whitespace; saturates on overflow.
fn parse_leading_integer(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let magnitude = digits[..end].bytes().fold(0i64, |acc, b| {
        acc.saturating_mul(10).saturating_add(i64::from(b - b'0'))
    });
    Some(if negative { -magnitude } else { magnitude })
}

fn coerce_date(element: &Element) -> Result<NaiveDate> {
    let text = element.text().trim();
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_datetime(text).map(|dt| dt.date_naive()))
        .ok_or_else(|| malformed_date(element))
}

fn coerce_datetime(element: &Element) -> Result<DateTime<FixedOffset>> {
    parse_datetime(element.text().trim()).ok_or_else(|| malformed_date(element))
}

fn parse_datetime(text: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(text)
        .or_else(|_| DateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%z"))
        .ok()
}

fn malformed_date(element: &Element) -> ApiError {
    ApiError::MalformedDate {
        field: element.name().to_owned(),
        value: element.text().to_owned(),
    }
}
