//! The JSON-RPC calls the deployer issues, behind a trait so the procedure can
//! be tested without a running chain.

use {
    alloy::{
        network::TransactionBuilder,
        primitives::{Address, B256, Bytes, U256},
        providers::Provider,
        rpc::types::{TransactionReceipt, TransactionRequest},
        transports::TransportError,
    },
    anyhow::{Context, Result, anyhow},
    ethrpc::{Web3, alloy::errors::RpcErrorExt},
};

/// The parts of a transaction receipt the deployer cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub transaction_hash: B256,
    pub block_number: u64,
    pub contract_address: Option<Address>,
    pub gas_used: u64,
    /// `false` if the transaction reverted.
    pub status: bool,
}

impl TryFrom<TransactionReceipt> for Receipt {
    type Error = anyhow::Error;

    fn try_from(receipt: TransactionReceipt) -> Result<Self> {
        Ok(Self {
            transaction_hash: receipt.transaction_hash,
            block_number: receipt
                .block_number
                .context("receipt of a pending transaction")?,
            contract_address: receipt.contract_address,
            gas_used: receipt.gas_used,
            status: receipt.status(),
        })
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Node: Send + Sync {
    /// Account that signs transactions submitted with
    /// [`Node::send_transaction`].
    fn signer_address(&self) -> Address;

    async fn chain_id(&self) -> Result<u64>;

    async fn balance(&self, address: Address) -> Result<U256>;

    /// Number of transactions `address` sent that are included in the latest
    /// block, i.e. the nonce of its next transaction.
    async fn transaction_count(&self, address: Address) -> Result<u64>;

    async fn block_number(&self) -> Result<u64>;

    /// Fills in nonce, gas and chain id, signs the request with the node's
    /// wallet and submits it. Returns the transaction hash.
    async fn send_transaction(&self, request: TransactionRequest) -> Result<B256>;

    /// Submits an already signed transaction. Returns the transaction hash
    /// reported by the node.
    async fn send_raw_transaction(&self, encoded: Bytes) -> Result<B256>;

    /// `None` while the transaction is not mined yet.
    async fn transaction_receipt(&self, hash: B256) -> Result<Option<Receipt>>;

    /// Executes a read-only call against the latest block.
    async fn call(&self, to: Address, input: Bytes) -> Result<Bytes>;
}

/// [`Node`] talking to a JSON-RPC endpoint through alloy.
pub struct AlloyNode {
    web3: Web3,
}

impl AlloyNode {
    pub fn new(web3: Web3) -> Self {
        Self { web3 }
    }
}

#[async_trait::async_trait]
impl Node for AlloyNode {
    fn signer_address(&self) -> Address {
        self.web3.default_signer_address()
    }

    async fn chain_id(&self) -> Result<u64> {
        self.web3
            .provider
            .get_chain_id()
            .await
            .context("eth_chainId")
    }

    async fn balance(&self, address: Address) -> Result<U256> {
        self.web3
            .provider
            .get_balance(address)
            .await
            .context("eth_getBalance")
    }

    async fn transaction_count(&self, address: Address) -> Result<u64> {
        self.web3
            .provider
            .get_transaction_count(address)
            .await
            .context("eth_getTransactionCount")
    }

    async fn block_number(&self) -> Result<u64> {
        self.web3
            .provider
            .get_block_number()
            .await
            .context("eth_blockNumber")
    }

    async fn send_transaction(&self, request: TransactionRequest) -> Result<B256> {
        let request = request.with_from(self.signer_address());
        let pending = self
            .web3
            .provider
            .send_transaction(request)
            .await
            .map_err(revert_aware("send transaction"))?;
        Ok(*pending.tx_hash())
    }

    async fn send_raw_transaction(&self, encoded: Bytes) -> Result<B256> {
        let pending = self
            .web3
            .provider
            .send_raw_transaction(&encoded)
            .await
            .map_err(revert_aware("eth_sendRawTransaction"))?;
        Ok(*pending.tx_hash())
    }

    async fn transaction_receipt(&self, hash: B256) -> Result<Option<Receipt>> {
        self.web3
            .provider
            .get_transaction_receipt(hash)
            .await
            .context("eth_getTransactionReceipt")?
            .map(Receipt::try_from)
            .transpose()
    }

    async fn call(&self, to: Address, input: Bytes) -> Result<Bytes> {
        let request = TransactionRequest::default()
            .with_from(self.signer_address())
            .with_to(to)
            .with_input(input);
        self.web3
            .provider
            .call(request)
            .await
            .map_err(revert_aware("eth_call"))
    }
}

/// Distinguishes EVM reverts from other node errors in the error message.
fn revert_aware(method: &'static str) -> impl FnOnce(TransportError) -> anyhow::Error {
    move |err| {
        if let Some(data) = err.revert_data() {
            anyhow!(err).context(format!("{method} reverted with data {data}"))
        } else if err.is_revert() {
            anyhow!(err).context(format!("{method} reverted"))
        } else {
            anyhow!(err).context(method)
        }
    }
}
