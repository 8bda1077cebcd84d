//! Protocol constants and network selection.

/// Minimum distance, in blocks, between the chain tip and the automatically
/// selected sync checkpoint.
pub const CHECKPOINT_SPAN: u64 = 5000;

/// Version of the compiled-in checkpoint asset format this build understands.
pub const CHECKPOINT_ASSET_VERSION: u32 = 1;

/// Network type: Mainnet, Testnet, or Regtest.
///
/// Selects which compiled-in checkpoint table a node enforces. Passed
/// explicitly to every caller instead of living in process-wide state.
///
/// # Examples
///
/// ```
/// use keel_core::constants::NetworkType;
/// let net = NetworkType::default();
/// assert_eq!(net, NetworkType::Mainnet);
/// assert!(!net.uses_test_checkpoints());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NetworkType {
    /// Production network.
    #[default]
    Mainnet,
    /// Public test network.
    Testnet,
    /// Local regression-test network.
    Regtest,
}

impl NetworkType {
    /// Whether this network enforces the test checkpoint table.
    ///
    /// Testnet and regtest share one table, which currently carries no
    /// entries.
    ///
    /// # Examples
    ///
    /// ```
    /// use keel_core::constants::NetworkType;
    /// assert!(NetworkType::Testnet.uses_test_checkpoints());
    /// assert!(NetworkType::Regtest.uses_test_checkpoints());
    /// ```
    pub fn uses_test_checkpoints(&self) -> bool {
        !matches!(self, Self::Mainnet)
    }

    /// Lowercase network name, as written in checkpoint assets.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
            Self::Regtest => "regtest",
        }
    }
}

impl std::fmt::Display for NetworkType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_is_five_thousand() {
        assert_eq!(CHECKPOINT_SPAN, 5000);
    }

    #[test]
    fn network_type_default_is_mainnet() {
        assert_eq!(NetworkType::default(), NetworkType::Mainnet);
    }

    #[test]
    fn only_mainnet_uses_production_checkpoints() {
        assert!(!NetworkType::Mainnet.uses_test_checkpoints());
        assert!(NetworkType::Testnet.uses_test_checkpoints());
        assert!(NetworkType::Regtest.uses_test_checkpoints());
    }

    #[test]
    fn network_names_distinct() {
        let names = [
            NetworkType::Mainnet.name(),
            NetworkType::Testnet.name(),
            NetworkType::Regtest.name(),
        ];
        assert_ne!(names[0], names[1]);
        assert_ne!(names[0], names[2]);
        assert_ne!(names[1], names[2]);
        assert_eq!(NetworkType::Testnet.to_string(), "testnet");
    }
}
