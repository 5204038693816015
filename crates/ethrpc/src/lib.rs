pub mod alloy;

use {
    ::alloy::{
        network::{Ethereum, EthereumWallet, NetworkWallet},
        primitives::Address,
        providers::DynProvider,
        signers::local::PrivateKeySigner,
    },
    url::Url,
};

pub type AlloyProvider = DynProvider;

/// Bundles the provider used to talk to the node with the wallet that signs
/// every transaction submitted through that provider.
#[derive(Debug, Clone)]
pub struct Web3 {
    pub provider: AlloyProvider,
    pub wallet: EthereumWallet,
}

impl Web3 {
    /// Connects to the node at `url`. RPC requests are logged under `label`.
    pub fn new(url: &Url, label: &str, signer: PrivateKeySigner) -> Self {
        let wallet = EthereumWallet::new(signer);
        let provider = crate::alloy::provider_with_wallet(url, label, wallet.clone());
        Self { provider, wallet }
    }

    /// Address transactions are sent from unless a request specifies another
    /// registered signer.
    pub fn default_signer_address(&self) -> Address {
        <EthereumWallet as NetworkWallet<Ethereum>>::default_signer_address(&self.wallet)
    }
}
