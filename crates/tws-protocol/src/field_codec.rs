//! Legacy text layout.
//!
//! A legacy payload is a run of NUL-terminated ASCII fields:
//!
//! ```text
//! "62\0" "1\0" "9001\0" "All\0" "NetLiquidation\0"
//!  id     ver   reqId    group   tags
//! ```
//!
//! Outgoing requests are described as a [`RequestLayout`]: an ordered list
//! of `(Gate, Field)` pairs plus the capabilities the caller's arguments
//! need. One walk over the list, driven only by the negotiated version,
//! produces the bytes. Fields whose gate does not admit the version are
//! left out entirely; the field count is what older terminals parse by.

use tws_core::server_versions::supports;

use crate::wire_types::{validate_ascii, ProtocolError, FIELD_SEP};

// ============================================================================
// Fields
// ============================================================================

/// One encodable value.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    /// Sent as an empty field ("not set").
    Unset,
}

impl Field {
    fn encode(&self, out: &mut Vec<u8>) -> Result<(), ProtocolError> {
        match self {
            Field::Int(v) => out.extend_from_slice(v.to_string().as_bytes()),
            Field::Float(v) => out.extend_from_slice(v.to_string().as_bytes()),
            Field::Bool(v) => out.push(if *v { b'1' } else { b'0' }),
            Field::Str(s) => {
                validate_ascii(s)?;
                out.extend_from_slice(s.as_bytes());
            }
            Field::Unset => {}
        }
        out.push(FIELD_SEP);
        Ok(())
    }
}

impl From<i32> for Field {
    fn from(v: i32) -> Self {
        Field::Int(v as i64)
    }
}

impl From<i64> for Field {
    fn from(v: i64) -> Self {
        Field::Int(v)
    }
}

impl From<usize> for Field {
    fn from(v: usize) -> Self {
        Field::Int(v as i64)
    }
}

impl From<f64> for Field {
    fn from(v: f64) -> Self {
        Field::Float(v)
    }
}

impl From<bool> for Field {
    fn from(v: bool) -> Self {
        Field::Bool(v)
    }
}

impl From<&str> for Field {
    fn from(v: &str) -> Self {
        Field::Str(v.to_string())
    }
}

impl From<String> for Field {
    fn from(v: String) -> Self {
        Field::Str(v)
    }
}

impl From<&String> for Field {
    fn from(v: &String) -> Self {
        Field::Str(v.clone())
    }
}

impl<T: Into<Field>> From<Option<T>> for Field {
    fn from(v: Option<T>) -> Self {
        v.map_or(Field::Unset, Into::into)
    }
}

// ============================================================================
// Version gates
// ============================================================================

/// Which negotiated versions carry a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Always,
    /// Introduced at this version.
    Since(i32),
    /// Removed at this version.
    Until(i32),
    /// `[from, until)`
    Between(i32, i32),
}

impl Gate {
    pub fn admits(self, server_version: i32) -> bool {
        match self {
            Gate::Always => true,
            Gate::Since(v) => supports(server_version, v),
            Gate::Until(v) => !supports(server_version, v),
            Gate::Between(from, until) => {
                supports(server_version, from) && !supports(server_version, until)
            }
        }
    }
}

// ============================================================================
// Request layouts
// ============================================================================

#[derive(Debug, Clone)]
struct Requirement {
    min_version: i32,
    what: &'static str,
}

/// Ordered description of one outgoing legacy message.
#[derive(Debug, Clone)]
pub struct RequestLayout {
    message_id: i32,
    requirements: Vec<Requirement>,
    fields: Vec<(Gate, Field)>,
}

impl RequestLayout {
    pub fn new(message_id: i32) -> Self {
        Self {
            message_id,
            requirements: Vec::new(),
            fields: Vec::with_capacity(16),
        }
    }

    pub fn message_id(&self) -> i32 {
        self.message_id
    }

    /// Abort the whole request when `requested` is set and the negotiated
    /// version is below `min_version`.
    pub fn require(mut self, min_version: i32, requested: bool, what: &'static str) -> Self {
        if requested {
            self.requirements.push(Requirement { min_version, what });
        }
        self
    }

    pub fn field(self, value: impl Into<Field>) -> Self {
        self.gated(Gate::Always, value)
    }

    /// Best-effort field: omitted below `version`.
    pub fn since(self, version: i32, value: impl Into<Field>) -> Self {
        self.gated(Gate::Since(version), value)
    }

    /// Field dropped from `version` on.
    pub fn until(self, version: i32, value: impl Into<Field>) -> Self {
        self.gated(Gate::Until(version), value)
    }

    pub fn between(self, from: i32, until: i32, value: impl Into<Field>) -> Self {
        self.gated(Gate::Between(from, until), value)
    }

    pub fn gated(mut self, gate: Gate, value: impl Into<Field>) -> Self {
        self.fields.push((gate, value.into()));
        self
    }

    /// Append a run of fields sharing one gate.
    pub fn extend<I, F>(mut self, gate: Gate, values: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<Field>,
    {
        self.fields
            .extend(values.into_iter().map(|v| (gate, v.into())));
        self
    }

    /// Apply `build` only when `cond` holds. Keeps call sites chainable.
    pub fn when(self, cond: bool, build: impl FnOnce(Self) -> Self) -> Self {
        if cond {
            build(self)
        } else {
            self
        }
    }

    /// Field bytes (no message id) as seen by `server_version`.
    ///
    /// Requirements are checked before any field is written, so an
    /// aborted request never yields partial output.
    pub fn encode_fields(&self, server_version: i32) -> Result<Vec<u8>, ProtocolError> {
        if let Some(req) = self
            .requirements
            .iter()
            .find(|r| !supports(server_version, r.min_version))
        {
            return Err(ProtocolError::UpdateRequired(req.what));
        }

        let mut out = Vec::with_capacity(self.fields.len() * 8);
        for (gate, field) in &self.fields {
            if gate.admits(server_version) {
                field.encode(&mut out)?;
            }
        }
        Ok(out)
    }
}

// ============================================================================
// Decoding
// ============================================================================

/// Split a legacy payload on NUL. The terminator of the last field does not
/// produce an extra empty field.
pub fn read_fields(payload: &[u8]) -> Vec<String> {
    if payload.is_empty() {
        return Vec::new();
    }
    let body = payload.strip_suffix(&[FIELD_SEP]).unwrap_or(payload);
    body.split(|b| *b == FIELD_SEP)
        .map(|f| String::from_utf8_lossy(f).into_owned())
        .collect()
}

/// Sequential typed access to decoded fields.
///
/// Empty numeric fields read as zero, matching what the terminal sends for
/// "not set".
#[derive(Debug)]
pub struct FieldReader<'a> {
    fields: &'a [String],
    pos: usize,
}

impl<'a> FieldReader<'a> {
    pub fn new(fields: &'a [String]) -> Self {
        Self { fields, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.fields.len().saturating_sub(self.pos)
    }

    fn next(&mut self) -> Result<&'a str, ProtocolError> {
        let f = self.fields.get(self.pos).ok_or(ProtocolError::Truncated)?;
        self.pos += 1;
        Ok(f.as_str())
    }

    pub fn skip(&mut self) -> Result<(), ProtocolError> {
        self.next().map(|_| ())
    }

    pub fn read_str(&mut self) -> Result<String, ProtocolError> {
        self.next().map(str::to_string)
    }

    pub fn read_int(&mut self) -> Result<i32, ProtocolError> {
        parse_or_zero(self.next()?, "int")
    }

    pub fn read_long(&mut self) -> Result<i64, ProtocolError> {
        parse_or_zero(self.next()?, "long")
    }

    pub fn read_double(&mut self) -> Result<f64, ProtocolError> {
        parse_or_zero(self.next()?, "double")
    }

    pub fn read_bool(&mut self) -> Result<bool, ProtocolError> {
        Ok(self.read_int()? != 0)
    }
}

fn parse_or_zero<T>(raw: &str, kind: &'static str) -> Result<T, ProtocolError>
where
    T: std::str::FromStr + Default,
{
    if raw.is_empty() {
        return Ok(T::default());
    }
    raw.parse::<T>()
        .map_err(|_| ProtocolError::InvalidField(kind))
}
