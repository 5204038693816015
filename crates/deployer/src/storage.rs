//! ABI aware access to the deployed storage contract: a read accessor that
//! returns a single unsigned integer and a setter taking one.

use {
    crate::{
        artifact::Artifact,
        confirmation::{self, Confirmations},
        node::{Node, Receipt},
    },
    alloy::{
        dyn_abi::{DynSolValue, FunctionExt, JsonAbiExt},
        json_abi::Function,
        network::TransactionBuilder,
        primitives::{Address, Bytes, U256},
        rpc::types::TransactionRequest,
    },
    anyhow::{Context, Result, bail},
};

#[derive(Debug, Clone)]
pub struct StorageContract {
    pub address: Address,
    read: Function,
    write: Function,
}

impl StorageContract {
    /// Binds the contract at `address` using the named accessor functions of
    /// `artifact`.
    pub fn new(address: Address, artifact: &Artifact, read: &str, write: &str) -> Result<Self> {
        Ok(Self {
            address,
            read: artifact.function(read)?.clone(),
            write: artifact.function(write)?.clone(),
        })
    }

    pub fn read_calldata(&self) -> Result<Bytes> {
        encode(&self.read, &[])
    }

    pub fn write_calldata(&self, value: U256) -> Result<Bytes> {
        encode(&self.write, &[DynSolValue::Uint(value, 256)])
    }

    pub fn decode_read(&self, output: &[u8]) -> Result<U256> {
        let values = self
            .read
            .abi_decode_output(output)
            .with_context(|| format!("decode output of {}", self.read.signature()))?;
        match values.as_slice() {
            [value] => value
                .as_uint()
                .map(|(value, _)| value)
                .with_context(|| format!("{} does not return an integer", self.read.signature())),
            _ => bail!(
                "{} returns {} values, expected one",
                self.read.signature(),
                values.len()
            ),
        }
    }

    /// Calls the read accessor with `eth_call`.
    pub async fn retrieve<N>(&self, node: &N) -> Result<U256>
    where
        N: Node + ?Sized,
    {
        let output = node
            .call(self.address, self.read_calldata()?)
            .await
            .with_context(|| format!("call {}", self.read.signature()))?;
        self.decode_read(&output)
    }

    /// Sends a transaction invoking the setter and waits until it is
    /// confirmed.
    pub async fn store<N>(
        &self,
        node: &N,
        value: U256,
        confirmations: &Confirmations,
    ) -> Result<Receipt>
    where
        N: Node + ?Sized,
    {
        let request = TransactionRequest::default()
            .with_to(self.address)
            .with_input(self.write_calldata(value)?);
        let hash = node
            .send_transaction(request)
            .await
            .with_context(|| format!("send {}", self.write.signature()))?;
        tracing::debug!(?hash, %value, function = %self.write.signature(), "sent transaction");
        confirmation::wait_for_receipt(node, hash, confirmations).await
    }
}

fn encode(function: &Function, args: &[DynSolValue]) -> Result<Bytes> {
    function
        .abi_encode_input(args)
        .map(Bytes::from)
        .with_context(|| format!("encode call to {}", function.signature()))
}
