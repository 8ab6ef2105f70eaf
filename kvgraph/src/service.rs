use core::borrow::Borrow;

use kvgraph_core::{Model, RawValue};
use tracing::{debug, trace};

use crate::{
    BuilderChain, CancellationToken, GraphBuilder, KeyPath, ModelError, PathSkip,
    UnsupportedReason, ValueBuilder,
};

/// A path that was abandoned while building a model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedPath {
    /// The key as given.
    pub path: String,
    /// Why it was abandoned.
    pub reason: PathSkip,
}

/// A built model, with everything that did not make it in.
#[derive(Debug)]
pub struct BuildReport<T> {
    /// The model; `None` when there were no pairs at all.
    pub model: Option<T>,
    /// Paths that were abandoned, in input order.
    pub skipped: Vec<SkippedPath>,
    /// Whether the build stopped early because of cancellation. Paths after
    /// the cancellation point are neither applied nor listed in `skipped`.
    pub cancelled: bool,
}

/// Builds model instances from key/value pairs.
///
/// The service owns a [`BuilderChain`] and can be shared between builds.
#[derive(Debug, Default)]
pub struct ModelService {
    chain: BuilderChain,
}

impl ModelService {
    /// A service using the default builder chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// A service running `builders` in order. An empty list gives the
    /// default chain.
    pub fn with_builders<I>(builders: I) -> Self
    where
        I: IntoIterator<Item = Box<dyn ValueBuilder>>,
    {
        Self {
            chain: BuilderChain::new(builders),
        }
    }

    /// The builder chain used for every terminal value.
    pub fn chain(&self) -> &BuilderChain {
        &self.chain
    }

    /// Builds a `T` by assigning `value` at the path named by every key.
    ///
    /// Only the keys of `pairs` are used: every path receives the same
    /// `value`. Use [`build_model_from_pairs`](Self::build_model_from_pairs)
    /// to give each path its own value.
    ///
    /// Returns `Ok(None)` when `pairs` is empty. Paths that cannot be
    /// resolved and values that cannot be converted are skipped.
    ///
    /// # Errors
    ///
    /// [`ModelError::UnsupportedTarget`] when `T` is not a struct or cannot
    /// be instantiated.
    pub fn build_model<T, I, K, V>(
        &self,
        pairs: I,
        value: impl Into<RawValue>,
    ) -> Result<Option<T>, ModelError>
    where
        T: Model,
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
    {
        let report =
            self.build_model_with_report(pairs, value, &CancellationToken::new())?;
        Ok(report.model)
    }

    /// Like [`build_model`](Self::build_model), but cancellable and reporting
    /// the skipped paths.
    ///
    /// `cancel` is checked before each path. Once it is cancelled, the
    /// remaining paths are left alone and the partially built model is
    /// returned.
    pub fn build_model_with_report<T, I, K, V>(
        &self,
        pairs: I,
        value: impl Into<RawValue>,
        cancel: &CancellationToken,
    ) -> Result<BuildReport<T>, ModelError>
    where
        T: Model,
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
    {
        let value = value.into();
        let keys = pairs.into_iter().map(|(key, _)| (key, &value));
        self.build(keys, cancel)
    }

    /// Builds a `T` from pairs that each carry their own value.
    ///
    /// # Errors
    ///
    /// Same as [`build_model`](Self::build_model).
    pub fn build_model_from_pairs<T, I, K, V>(&self, pairs: I) -> Result<Option<T>, ModelError>
    where
        T: Model,
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<RawValue>,
    {
        let pairs = pairs.into_iter().map(|(key, value)| (key, value.into()));
        let report = self.build(pairs, &CancellationToken::new())?;
        Ok(report.model)
    }

    fn build<T, K, R>(
        &self,
        pairs: impl Iterator<Item = (K, R)>,
        cancel: &CancellationToken,
    ) -> Result<BuildReport<T>, ModelError>
    where
        T: Model,
        K: AsRef<str>,
        R: Borrow<RawValue>,
    {
        let shape = T::shape();
        ModelError::check_root(&shape)?;
        let mut root = shape
            .construct()
            .ok_or_else(|| ModelError::unsupported(&shape, UnsupportedReason::Abstract))?;

        let mut pairs = pairs.peekable();
        if pairs.peek().is_none() {
            debug!(model = %shape, "no pairs, nothing to build");
            return Ok(BuildReport {
                model: None,
                skipped: Vec::new(),
                cancelled: false,
            });
        }

        let graph = GraphBuilder::new(&self.chain, cancel);
        let mut skipped = Vec::new();
        let mut cancelled = false;
        let mut applied = 0usize;

        for (key, raw) in pairs {
            if cancel.is_cancelled() {
                debug!(model = %shape, applied, "build cancelled");
                cancelled = true;
                break;
            }
            let key = key.as_ref();
            let outcome = match KeyPath::parse(key) {
                Some(path) => {
                    let raw: &RawValue = raw.borrow();
                    graph.apply(&mut *root, shape, &path, raw)
                }
                None => Err(PathSkip::EmptyPath),
            };
            match outcome {
                Ok(()) => {
                    trace!(key, "applied");
                    applied += 1;
                }
                Err(reason) => {
                    debug!(key, %reason, "path skipped");
                    skipped.push(SkippedPath {
                        path: key.to_owned(),
                        reason,
                    });
                }
            }
        }

        let model = root
            .downcast::<T>()
            .map_err(|_| ModelError::unsupported(&shape, UnsupportedReason::WrongShape))?;
        debug!(model = %shape, applied, skipped = skipped.len(), "model built");

        Ok(BuildReport {
            model: Some(*model),
            skipped,
            cancelled,
        })
    }
}

#[cfg(test)]
mod tests {
    use kvgraph_core::model;

    use super::*;

    model! {
        #[derive(Debug, Default, PartialEq)]
        struct Settings {
            name: String,
            retries: u8,
        }
    }

    #[test]
    fn test_blank_keys_are_reported() {
        kvgraph_testhelpers::setup();
        let service = ModelService::new();
        let report = service
            .build_model_with_report::<Settings, _, _, _>(
                [("  ", ()), (":", ()), ("Name", ())],
                "primary",
                &CancellationToken::new(),
            )
            .unwrap();
        assert_eq!(report.model.unwrap().name, "primary");
        let reasons: Vec<_> = report.skipped.iter().map(|s| &s.reason).collect();
        assert_eq!(reasons, [&PathSkip::EmptyPath, &PathSkip::EmptyPath]);
        assert!(!report.cancelled);
    }

    #[test]
    fn test_cancelled_before_first_path() {
        kvgraph_testhelpers::setup();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let report = ModelService::new()
            .build_model_with_report::<Settings, _, _, _>([("Retries", ())], 3, &cancel)
            .unwrap();
        assert!(report.cancelled);
        assert!(report.skipped.is_empty());
        assert_eq!(report.model, Some(Settings::default()));
    }

    #[test]
    fn test_empty_pairs() {
        kvgraph_testhelpers::setup();
        let pairs: [(&str, ()); 0] = [];
        let settings = ModelService::new()
            .build_model::<Settings, _, _, _>(pairs, "x")
            .unwrap();
        assert_eq!(settings, None);
    }
}
