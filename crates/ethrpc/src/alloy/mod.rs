pub mod errors;
mod instrumentation;

use {
    crate::AlloyProvider,
    alloy::{
        network::EthereumWallet,
        providers::{Provider, ProviderBuilder},
        rpc::client::{ClientBuilder, RpcClient},
    },
    instrumentation::InstrumentationLayer,
    url::Url,
};

/// Read-only provider. Requests are logged under `label`.
pub fn provider(url: &Url, label: &str) -> AlloyProvider {
    ProviderBuilder::new()
        .connect_client(rpc_client(url, label))
        .erased()
}

/// Provider that fills in nonce, gas and chain id and signs transactions
/// with `wallet` before submitting them.
pub fn provider_with_wallet(url: &Url, label: &str, wallet: EthereumWallet) -> AlloyProvider {
    ProviderBuilder::new()
        .wallet(wallet)
        .connect_client(rpc_client(url, label))
        .erased()
}

fn rpc_client(url: &Url, label: &str) -> RpcClient {
    ClientBuilder::default()
        .layer(InstrumentationLayer::new(label))
        .http(url.clone())
}
