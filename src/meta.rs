use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

/// A JSON number that keeps the integer/float distinction for stable re-serialization.
/// The editing surfaces render numbers as text, so formatting must be deterministic.
#[derive(Debug, Clone, PartialEq)]
pub enum MetaNumber {
    Int(i64),
    Float(f64),
}

impl MetaNumber {
    fn write(&self, out: &mut String) {
        match self {
            MetaNumber::Int(v) => out.push_str(&v.to_string()),
            MetaNumber::Float(v) => {
                if v.is_finite() {
                    let mut buf = ryu::Buffer::new();
                    out.push_str(buf.format(*v));
                } else {
                    // Strict JSON has no NaN/Infinity; the wire never carries them.
                    out.push_str("null");
                }
            }
        }
    }
}

impl Serialize for MetaNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MetaNumber::Int(v) => serializer.serialize_i64(*v),
            MetaNumber::Float(v) => serializer.serialize_f64(*v),
        }
    }
}

/// A JSON document as held by the editing surfaces. Object keys keep their
/// insertion order, which the merge logic and the row editor both rely on.
#[derive(Debug, Clone, PartialEq)]
pub enum MetaValue {
    Null,
    Bool(bool),
    Number(MetaNumber),
    String(String),
    Array(Vec<MetaValue>),
    Object(IndexMap<String, MetaValue>),
}

impl MetaValue {
    pub fn parse_json(text: &str) -> anyhow::Result<MetaValue> {
        Ok(serde_json::from_str::<MetaValue>(text)?)
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, MetaValue>> {
        match self {
            MetaValue::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[MetaValue]> {
        match self {
            MetaValue::Array(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetaValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.as_object().and_then(|m| m.get(key))
    }

    pub fn is_empty_container(&self) -> bool {
        match self {
            MetaValue::Object(map) => map.is_empty(),
            MetaValue::Array(values) => values.is_empty(),
            _ => false,
        }
    }

    /// Two-space indented rendering. This is the display/interchange format for
    /// everything the console writes or shows (detail files, content panes).
    pub fn to_pretty(&self) -> String {
        let mut out = String::new();
        self.write_json(&mut out, 0, true);
        out
    }

    pub fn to_compact(&self) -> String {
        let mut out = String::new();
        self.write_json(&mut out, 0, false);
        out
    }

    /// The text an editable row shows for this value: strings verbatim,
    /// other scalars as their literal, containers pretty-printed.
    /// Type information does not survive this rendering (a numeric 5 and a
    /// string "5" come back identical); that loss is accepted for the wire
    /// format, which is textual.
    pub fn display_string(&self) -> String {
        match self {
            MetaValue::String(s) => s.clone(),
            MetaValue::Array(_) | MetaValue::Object(_) => self.to_pretty(),
            other => other.to_compact(),
        }
    }

    fn write_json(&self, out: &mut String, indent: usize, pretty: bool) {
        match self {
            MetaValue::Null => out.push_str("null"),
            MetaValue::Bool(v) => out.push_str(if *v { "true" } else { "false" }),
            MetaValue::Number(n) => n.write(out),
            MetaValue::String(s) => write_escaped_string(out, s),
            MetaValue::Array(values) => {
                out.push('[');
                if pretty && !values.is_empty() {
                    out.push('\n');
                }
                for (i, v) in values.iter().enumerate() {
                    if pretty {
                        out.push_str(&" ".repeat(indent + 2));
                    }
                    v.write_json(out, indent + 2, pretty);
                    if i + 1 != values.len() {
                        out.push(',');
                    }
                    if pretty {
                        out.push('\n');
                    }
                }
                if pretty && !values.is_empty() {
                    out.push_str(&" ".repeat(indent));
                }
                out.push(']');
            }
            MetaValue::Object(map) => {
                out.push('{');
                if pretty && !map.is_empty() {
                    out.push('\n');
                }
                for (i, (k, v)) in map.iter().enumerate() {
                    if pretty {
                        out.push_str(&" ".repeat(indent + 2));
                    }
                    write_escaped_string(out, k);
                    out.push(':');
                    if pretty {
                        out.push(' ');
                    }
                    v.write_json(out, indent + 2, pretty);
                    if i + 1 != map.len() {
                        out.push(',');
                    }
                    if pretty {
                        out.push('\n');
                    }
                }
                if pretty && !map.is_empty() {
                    out.push_str(&" ".repeat(indent));
                }
                out.push('}');
            }
        }
    }
}

fn write_escaped_string(out: &mut String, s: &str) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                use std::fmt::Write as _;
                write!(out, "\\u{:04x}", c as u32).ok();
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

/// Does this text look like a JSON object or array? Used to decide whether a
/// row value gets a parse attempt on save. Deliberately shallow: matching
/// outer brackets only, no validation.
pub fn looks_like_json(text: &str) -> bool {
    let trimmed = text.trim();
    (trimmed.starts_with('{') && trimmed.ends_with('}'))
        || (trimmed.starts_with('[') && trimmed.ends_with(']'))
}

/// Opportunistic recovery of structure from row text: values that look like
/// JSON and parse cleanly come back structured; anything else stays the
/// literal string. A failed parse is not an error here.
pub fn recover_json(text: &str) -> MetaValue {
    if looks_like_json(text)
        && let Ok(parsed) = MetaValue::parse_json(text.trim())
    {
        return parsed;
    }
    MetaValue::String(text.to_string())
}

/// A metadata payload as stored remotely: either structured JSON or free
/// text. Classified once at the repository boundary so the rest of the
/// console never re-guesses.
#[derive(Debug, Clone, PartialEq)]
pub enum MetaBlob {
    Json(MetaValue),
    Text(String),
}

impl MetaBlob {
    /// Classify raw stored text. Only object/array shapes count as JSON;
    /// a bare quoted string or number is treated as text, matching how the
    /// service stores plain-text metadata.
    pub fn classify(raw: &str) -> MetaBlob {
        if looks_like_json(raw)
            && let Ok(parsed) = MetaValue::parse_json(raw.trim())
        {
            return MetaBlob::Json(parsed);
        }
        MetaBlob::Text(raw.to_string())
    }

    pub fn as_json(&self) -> Option<&MetaValue> {
        match self {
            MetaBlob::Json(v) => Some(v),
            MetaBlob::Text(_) => None,
        }
    }

    /// Rendering for read-only panes: JSON pretty-printed, text verbatim.
    pub fn display(&self) -> String {
        match self {
            MetaBlob::Json(v) => v.to_pretty(),
            MetaBlob::Text(s) => s.clone(),
        }
    }
}

impl Serialize for MetaValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MetaValue::Null => serializer.serialize_unit(),
            MetaValue::Bool(v) => serializer.serialize_bool(*v),
            MetaValue::Number(n) => n.serialize(serializer),
            MetaValue::String(s) => serializer.serialize_str(s),
            MetaValue::Array(values) => values.serialize(serializer),
            MetaValue::Object(map) => map.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for MetaValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ValueVisitor;

        impl<'de> de::Visitor<'de> for ValueVisitor {
            type Value = MetaValue;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a JSON value")
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(MetaValue::Null)
            }

            fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(MetaValue::Null)
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
                Ok(MetaValue::Bool(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(MetaValue::Number(MetaNumber::Int(v)))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                match i64::try_from(v) {
                    Ok(v) => Ok(MetaValue::Number(MetaNumber::Int(v))),
                    Err(_) => Ok(MetaValue::Number(MetaNumber::Float(v as f64))),
                }
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
                Ok(MetaValue::Number(MetaNumber::Float(v)))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(MetaValue::String(v.to_owned()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
                Ok(MetaValue::String(v))
            }

            fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let mut values = Vec::new();
                while let Some(value) = seq.next_element::<MetaValue>()? {
                    values.push(value);
                }
                Ok(MetaValue::Array(values))
            }

            fn visit_map<A: de::MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut values = IndexMap::new();
                while let Some((key, value)) = map.next_entry::<String, MetaValue>()? {
                    values.insert(key, value);
                }
                Ok(MetaValue::Object(values))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}
