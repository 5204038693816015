//! Hand built legacy transactions that are signed locally and submitted with
//! `eth_sendRawTransaction`, bypassing the wallet's nonce and gas fillers.

use {
    alloy::{
        consensus::{SignableTransaction, TxEnvelope, TxLegacy},
        eips::eip2718::Encodable2718,
        network::TxSignerSync,
        primitives::{Address, B256, Bytes, TxKind, U256},
        signers::local::PrivateKeySigner,
    },
    anyhow::{Context, Result},
};

/// Gas limit of the default ganache block.
pub const DEFAULT_GAS_LIMIT: u64 = 6_721_975;
/// Gas price ganache charges by default (20 gwei).
pub const DEFAULT_GAS_PRICE: u128 = 20_000_000_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTransaction {
    pub nonce: u64,
    pub gas_limit: u64,
    pub gas_price: u128,
    /// `None` creates a contract from `data`.
    pub to: Option<Address>,
    pub value: U256,
    pub data: Bytes,
    pub chain_id: u64,
}

/// A signed transaction ready to be broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub hash: B256,
    /// EIP-2718 encoding, the payload of `eth_sendRawTransaction`.
    pub encoded: Bytes,
}

impl RawTransaction {
    pub fn into_legacy(self) -> TxLegacy {
        TxLegacy {
            chain_id: Some(self.chain_id),
            nonce: self.nonce,
            gas_price: self.gas_price,
            gas_limit: self.gas_limit,
            to: match self.to {
                Some(to) => TxKind::Call(to),
                None => TxKind::Create,
            },
            value: self.value,
            input: self.data,
        }
    }

    pub fn sign(self, signer: &PrivateKeySigner) -> Result<SignedTransaction> {
        let mut tx = self.into_legacy();
        let signature = signer
            .sign_transaction_sync(&mut tx)
            .context("sign raw transaction")?;
        let envelope = TxEnvelope::from(tx.into_signed(signature));
        Ok(SignedTransaction {
            hash: *envelope.tx_hash(),
            encoded: envelope.encoded_2718().into(),
        })
    }
}
