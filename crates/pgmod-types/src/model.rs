//! The function model: what classification learned about each exported
//! function, and what code generation produces from it.
//!
//! Entries are built once per compile and never mutated afterwards.

use serde::{Deserialize, Serialize};

use crate::names;
use crate::TypeTag;

/// One SQL-visible parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub ty: TypeTag,
    /// Declared as `*T`: the routine must accept NULL input, and the local
    /// is forwarded by address.
    pub nullable: bool,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: TypeTag) -> Self {
        Self {
            name: name.into(),
            ty,
            nullable: false,
        }
    }

    pub fn nullable(name: impl Into<String>, ty: TypeTag) -> Self {
        Self {
            nullable: true,
            ..Self::new(name, ty)
        }
    }
}

/// Parts every function kind shares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    /// Exported Go name, which is also the C symbol.
    pub name: String,
    /// SQL parameters in declaration order (never the trigger context).
    pub params: Vec<Param>,
    pub doc: Option<String>,
}

impl Signature {
    pub fn new(name: impl Into<String>, params: Vec<Param>) -> Self {
        Self {
            name: name.into(),
            params,
            doc: None,
        }
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Name of the user's implementation after rewriting.
    pub fn internal_name(&self) -> String {
        names::internal_name(&self.name)
    }

    /// Routine name in the catalog.
    pub fn sql_name(&self) -> String {
        names::sql_name(&self.name)
    }

    pub fn has_nullable_param(&self) -> bool {
        self.params.iter().any(|p| p.nullable)
    }
}

/// A classified exported function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Function {
    /// No return value; SQL `RETURNS VOID`.
    Void(Signature),
    /// Returns one datum. `optional` means the Go result was `*T`, and a nil
    /// pointer becomes SQL NULL.
    Scalar {
        #[serde(flatten)]
        sig: Signature,
        returns: TypeTag,
        optional: bool,
    },
    /// `func(td *TriggerData, ...) *TriggerRow`; the context parameter is
    /// not part of `params`.
    Trigger(Signature),
}

impl Function {
    pub fn signature(&self) -> &Signature {
        match self {
            Function::Void(sig) | Function::Trigger(sig) => sig,
            Function::Scalar { sig, .. } => sig,
        }
    }

    pub fn name(&self) -> &str {
        &self.signature().name
    }

    pub fn params(&self) -> &[Param] {
        &self.signature().params
    }

    pub fn kind(&self) -> FunctionKind {
        match self {
            Function::Void(_) => FunctionKind::Void,
            Function::Scalar { .. } => FunctionKind::Scalar,
            Function::Trigger(_) => FunctionKind::Trigger,
        }
    }

    /// `PG_FUNCTION_INFO_V1(Name);`, needed once per export at module scope.
    pub fn func_dec(&self) -> String {
        format!("PG_FUNCTION_INFO_V1({});", self.name())
    }
}

/// The bare discriminant of [`Function`], for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionKind {
    Void,
    Scalar,
    Trigger,
}

/// Everything generated for one function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArtifact {
    pub func_dec: String,
    /// cgo wrapper function.
    pub glue: String,
    /// `CREATE OR REPLACE FUNCTION ...;`
    pub ddl: String,
    /// `COMMENT ON FUNCTION ...;`, only for documented functions.
    pub comment: Option<String>,
}
