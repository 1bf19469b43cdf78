//! The datum type table: which Go types can cross the PostgreSQL boundary
//! and how each one is spelled in SQL.
//!
//! This table is the only authority on representability. Lookups are exact
//! string matches on the Go spelling; nothing is coerced or inferred.

use std::fmt;

use serde::{Deserialize, Serialize};

/// SQL suffix for array forms.
pub const ARRAY_SUFFIX: &str = "[]";

/// A scalar descriptor from the type table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Datum {
    Error,
    String,
    Bytes,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Int64,
    Int,
    Uint,
    Float32,
    Float64,
    Time,
    Bool,
    /// The opaque row handed back by trigger functions.
    TriggerRow,
}

impl Datum {
    /// Every descriptor, in table order.
    pub const ALL: [Datum; 15] = [
        Datum::Error,
        Datum::String,
        Datum::Bytes,
        Datum::Int16,
        Datum::Uint16,
        Datum::Int32,
        Datum::Uint32,
        Datum::Int64,
        Datum::Int,
        Datum::Uint,
        Datum::Float32,
        Datum::Float64,
        Datum::Time,
        Datum::Bool,
        Datum::TriggerRow,
    ];

    /// Go spelling of the descriptor.
    pub fn go_type(self) -> &'static str {
        match self {
            Datum::Error => "error",
            Datum::String => "string",
            Datum::Bytes => "[]byte",
            Datum::Int16 => "int16",
            Datum::Uint16 => "uint16",
            Datum::Int32 => "int32",
            Datum::Uint32 => "uint32",
            Datum::Int64 => "int64",
            Datum::Int => "int",
            Datum::Uint => "uint",
            Datum::Float32 => "float32",
            Datum::Float64 => "float64",
            Datum::Time => "time.Time",
            Datum::Bool => "bool",
            Datum::TriggerRow => "TriggerRow",
        }
    }

    /// PostgreSQL column type.
    pub fn sql_type(self) -> &'static str {
        match self {
            Datum::Error | Datum::String => "text",
            Datum::Bytes => "bytea",
            Datum::Int16 | Datum::Uint16 => "smallint",
            Datum::Int32 | Datum::Uint32 => "integer",
            Datum::Int64 | Datum::Int | Datum::Uint => "bigint",
            Datum::Float32 => "real",
            Datum::Float64 => "double precision",
            Datum::Time => "timestamptz",
            Datum::Bool => "boolean",
            Datum::TriggerRow => "trigger",
        }
    }

    /// Whether `[]T` is part of the table.
    pub fn allows_array(self) -> bool {
        !matches!(self, Datum::Error | Datum::Bytes | Datum::TriggerRow)
    }

    /// Package a qualified descriptor comes from, which generated glue must import.
    pub fn namespace(self) -> Option<&'static str> {
        self.go_type()
            .split_once('.')
            .map(|(package, _)| package)
    }

    /// Exact-match lookup of a scalar spelling.
    pub fn lookup(go_type: &str) -> Option<Datum> {
        Datum::ALL.into_iter().find(|d| d.go_type() == go_type)
    }
}

impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.go_type())
    }
}

/// A parameter or return type: a [`Datum`] or an array of one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeTag {
    pub datum: Datum,
    pub array: bool,
}

impl TypeTag {
    pub fn scalar(datum: Datum) -> Self {
        Self {
            datum,
            array: false,
        }
    }

    /// `[]datum`, if the table has an array form for it.
    pub fn array_of(datum: Datum) -> Option<Self> {
        datum.allows_array().then_some(Self { datum, array: true })
    }

    /// Look up a full Go spelling such as `int64`, `[]string` or `[]byte`.
    pub fn lookup(go_type: &str) -> Option<Self> {
        if let Some(datum) = Datum::lookup(go_type) {
            return Some(Self::scalar(datum));
        }
        let elem = go_type.strip_prefix(ARRAY_SUFFIX)?;
        Self::array_of(Datum::lookup(elem)?)
    }

    /// PostgreSQL spelling, with the array suffix when needed.
    pub fn sql_type(&self) -> String {
        if self.array {
            format!("{}{ARRAY_SUFFIX}", self.datum.sql_type())
        } else {
            self.datum.sql_type().to_string()
        }
    }

    /// Go spelling used for locals in generated glue.
    pub fn host_type(&self) -> String {
        if self.array {
            format!("{ARRAY_SUFFIX}{}", self.datum.go_type())
        } else {
            self.datum.go_type().to_string()
        }
    }

    pub fn namespace(&self) -> Option<&'static str> {
        self.datum.namespace()
    }

    pub fn is_trigger_row(&self) -> bool {
        self.datum == Datum::TriggerRow
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.host_type())
    }
}
