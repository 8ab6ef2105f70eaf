use kvgraph_core::{Def, Shape};

/// Errors that prevent a model from being built at all.
///
/// Problems with individual paths are never errors: those paths are
/// skipped and reported through [`BuildReport`](crate::BuildReport).
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ModelError {
    /// The requested model type cannot be instantiated as a root object.
    UnsupportedTarget {
        /// The model type, as displayed by its shape.
        type_identifier: String,
        /// Why it is unsupported.
        reason: UnsupportedReason,
    },
}

/// Why a type cannot be used as a model root.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnsupportedReason {
    /// Only structs can be roots.
    NotAStruct {
        /// Category of the type, e.g. `"list"`.
        kind: &'static str,
    },
    /// The struct was declared with `#[model(no_default)]` or has no way to
    /// construct a default instance.
    Abstract,
    /// The constructor produced a value of another type.
    WrongShape,
}

impl ModelError {
    pub(crate) fn unsupported(shape: &Shape, reason: UnsupportedReason) -> Self {
        ModelError::UnsupportedTarget {
            type_identifier: shape.to_string(),
            reason,
        }
    }

    /// Checks that `shape` describes a struct that can be a model root.
    pub(crate) fn check_root(shape: &Shape) -> Result<(), Self> {
        match shape.def {
            Def::Struct(def) if def.kind.is_abstract() => {
                Err(Self::unsupported(shape, UnsupportedReason::Abstract))
            }
            Def::Struct(_) => Ok(()),
            other => Err(Self::unsupported(
                shape,
                UnsupportedReason::NotAStruct { kind: other.kind() },
            )),
        }
    }
}

impl core::fmt::Display for ModelError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ModelError::UnsupportedTarget {
                type_identifier,
                reason,
            } => {
                write!(f, "Unsupported model type {type_identifier}: ")?;
                match reason {
                    UnsupportedReason::NotAStruct { kind } => {
                        write!(f, "expected a struct, found {kind}")
                    }
                    UnsupportedReason::Abstract => write!(f, "it cannot be instantiated"),
                    UnsupportedReason::WrongShape => {
                        write!(f, "its constructor produced a value of another type")
                    }
                }
            }
        }
    }
}

impl core::error::Error for ModelError {}
