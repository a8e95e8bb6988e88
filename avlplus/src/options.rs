use avlplus_core::proof::{ProofLimits, DEFAULT_MAX_DEPTH};

/// Options when creating a [`crate::Verifier`] instance.
#[derive(Debug, Clone)]
pub struct Options {
    /// If set, all keys must have exactly this length.
    pub(crate) key_length: Option<usize>,
    /// If set, all values must have exactly this length.
    pub(crate) value_length: Option<usize>,
    /// The maximum number of internal nodes along a proof path.
    pub(crate) max_depth: usize,
    /// Enable or disable metrics collection.
    pub(crate) metrics: bool,
}

impl Options {
    /// Create a new `Options` instance with the default values.
    pub fn new() -> Self {
        Self {
            key_length: None,
            value_length: None,
            max_depth: DEFAULT_MAX_DEPTH,
            metrics: false,
        }
    }

    /// Require all keys, including the sentinel keys, to have this length.
    ///
    /// Default: variable length.
    pub fn key_length(&mut self, key_length: Option<usize>) {
        self.key_length = key_length;
    }

    /// Require all values to have this length.
    ///
    /// Default: variable length.
    pub fn value_length(&mut self, value_length: Option<usize>) {
        self.value_length = value_length;
    }

    /// Set the maximum number of internal nodes along a proof path. Longer proofs are rejected
    /// before they are fully decoded.
    ///
    /// Must be more than 0.
    ///
    /// Default: 128.
    pub fn max_depth(&mut self, max_depth: usize) {
        assert!(max_depth > 0);
        self.max_depth = max_depth;
    }

    /// Set metrics collection on or off.
    ///
    /// Default: off.
    pub fn metrics(&mut self, metrics: bool) {
        self.metrics = metrics;
    }

    pub(crate) fn limits(&self) -> ProofLimits {
        ProofLimits {
            key_length: self.key_length,
            value_length: self.value_length,
            max_depth: self.max_depth,
        }
    }
}

impl Default for Options {
    fn default() -> Self {
        Self::new()
    }
}

#[test]
fn default_limits_match_core() {
    assert_eq!(Options::new().limits(), ProofLimits::default());
}
