//! The deployment procedure: deploy the artifact, send one hand built
//! transaction and exercise the deployed contract, one awaited step at a time.

use {
    crate::{
        artifact::Artifact,
        confirmation::{Confirmations, wait_for_receipt},
        node::{Node, Receipt},
        storage::StorageContract,
        transaction::RawTransaction,
    },
    alloy::{
        network::TransactionBuilder,
        primitives::{Address, B256, Bytes, U256},
        rpc::types::TransactionRequest,
        signers::local::PrivateKeySigner,
    },
    anyhow::{Context, Result, ensure},
};

/// Fields of the hand built transaction that are not looked up on chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTransactionSettings {
    pub gas_limit: u64,
    pub gas_price: u128,
    pub to: Option<Address>,
    pub value: U256,
    /// Defaults to the artifact's bytecode.
    pub data: Option<Bytes>,
}

#[derive(Debug, Clone)]
pub struct Settings {
    /// Label of the network in logs.
    pub network: String,
    pub chain_id: u64,
    pub confirmations: Confirmations,
    pub raw_transaction: RawTransactionSettings,
    pub read_function: String,
    pub write_function: String,
    pub store_value: U256,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deployment {
    pub address: Address,
    pub transaction_hash: B256,
    pub receipt: Receipt,
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub deployment: Deployment,
    pub raw_transaction: Receipt,
    pub initial_value: U256,
    pub store_receipt: Receipt,
    pub updated_value: U256,
}

pub struct Runbook {
    settings: Settings,
    artifact: Artifact,
    signer: PrivateKeySigner,
}

impl Runbook {
    /// `signer` signs the hand built transaction. It has to be the same key
    /// the node's wallet signs with.
    pub fn new(settings: Settings, artifact: Artifact, signer: PrivateKeySigner) -> Self {
        Self {
            settings,
            artifact,
            signer,
        }
    }

    pub async fn run<N>(&self, node: &N) -> Result<Report>
    where
        N: Node + ?Sized,
    {
        let account = node.signer_address();
        ensure!(
            account == self.signer.address(),
            "node signs as {account} but raw transactions are signed by {}",
            self.signer.address()
        );
        self.check_chain_id(node).await?;
        let balance = node.balance(account).await?;
        tracing::info!(network = %self.settings.network, %account, %balance, "using account");

        tracing::info!("deploying, please wait...");
        let deployment = self.deploy(node).await?;
        tracing::info!(
            address = %deployment.address,
            hash = ?deployment.transaction_hash,
            block = deployment.receipt.block_number,
            gas_used = deployment.receipt.gas_used,
            "contract deployed"
        );

        tracing::info!("sending hand built transaction");
        let raw_transaction = self.send_raw_transaction(node).await?;
        tracing::info!(receipt = ?raw_transaction, "hand built transaction mined");

        let contract = StorageContract::new(
            deployment.address,
            &self.artifact,
            &self.settings.read_function,
            &self.settings.write_function,
        )?;
        let initial_value = contract.retrieve(node).await?;
        tracing::info!(%initial_value, "read value before update");

        let store_receipt = contract
            .store(node, self.settings.store_value, &self.settings.confirmations)
            .await?;
        tracing::info!(
            receipt = ?store_receipt,
            value = %self.settings.store_value,
            "value stored"
        );

        let updated_value = contract.retrieve(node).await?;
        tracing::info!(%updated_value, "read value after update");

        Ok(Report {
            deployment,
            raw_transaction,
            initial_value,
            store_receipt,
            updated_value,
        })
    }

    async fn check_chain_id<N>(&self, node: &N) -> Result<()>
    where
        N: Node + ?Sized,
    {
        let chain_id = node.chain_id().await?;
        ensure!(
            chain_id == self.settings.chain_id,
            "connected to chain {chain_id} but {} is configured",
            self.settings.chain_id
        );
        Ok(())
    }

    /// Deploys the artifact with a transaction signed by the node's wallet.
    async fn deploy<N>(&self, node: &N) -> Result<Deployment>
    where
        N: Node + ?Sized,
    {
        let account = node.signer_address();
        let nonce = node.transaction_count(account).await?;
        let expected_address = account.create(nonce);

        let request =
            TransactionRequest::default().with_deploy_code(self.artifact.bytecode.clone());
        let transaction_hash = node
            .send_transaction(request)
            .await
            .context("send deployment transaction")?;
        tracing::info!(
            address = %expected_address,
            hash = ?transaction_hash,
            nonce,
            "deployment transaction sent"
        );

        let receipt = wait_for_receipt(node, transaction_hash, &self.settings.confirmations)
            .await
            .context("confirm deployment")?;
        let address = receipt
            .contract_address
            .context("deployment receipt has no contract address")?;
        if address != expected_address {
            tracing::warn!(
                %expected_address,
                %address,
                "contract deployed at an unexpected address"
            );
        }
        Ok(Deployment {
            address,
            transaction_hash,
            receipt,
        })
    }

    /// Builds, signs and submits a transaction without the wallet's help.
    async fn send_raw_transaction<N>(&self, node: &N) -> Result<Receipt>
    where
        N: Node + ?Sized,
    {
        let settings = &self.settings.raw_transaction;
        let nonce = node.transaction_count(self.signer.address()).await?;
        let tx = RawTransaction {
            nonce,
            gas_limit: settings.gas_limit,
            gas_price: settings.gas_price,
            to: settings.to,
            value: settings.value,
            data: settings
                .data
                .clone()
                .unwrap_or_else(|| self.artifact.bytecode.clone()),
            chain_id: self.settings.chain_id,
        };
        tracing::debug!(?tx, "built transaction");

        let signed = tx.sign(&self.signer)?;
        tracing::info!(hash = ?signed.hash, raw = %signed.encoded, "signed transaction");

        let hash = node
            .send_raw_transaction(signed.encoded)
            .await
            .context("send hand built transaction")?;
        if hash != signed.hash {
            tracing::warn!(
                expected = ?signed.hash,
                reported = ?hash,
                "node reported a different transaction hash"
            );
        }

        wait_for_receipt(node, hash, &self.settings.confirmations)
            .await
            .context("confirm hand built transaction")
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            artifact::parse_bytecode,
            node::MockNode,
            transaction::{DEFAULT_GAS_LIMIT, DEFAULT_GAS_PRICE},
        },
        alloy::{
            consensus::TxEnvelope,
            eips::eip2718::Decodable2718,
            primitives::TxKind,
        },
        std::{
            sync::{Arc, Mutex},
            time::Duration,
        },
    };

    const DEPLOY_HASH: B256 = B256::new([1; 32]);
    const STORE_HASH: B256 = B256::new([3; 32]);

    fn artifact() -> Artifact {
        Artifact {
            abi: serde_json::from_str(include_str!(
                "../artifacts/SimpleStorage_sol_SimpleStorage.abi"
            ))
            .unwrap(),
            bytecode: parse_bytecode(include_str!(
                "../artifacts/SimpleStorage_sol_SimpleStorage.bin"
            ))
            .unwrap(),
        }
    }

    fn settings() -> Settings {
        Settings {
            network: "ganache".to_string(),
            chain_id: 1337,
            confirmations: Confirmations {
                count: 1,
                poll_interval: Duration::ZERO,
                timeout: Duration::from_secs(5),
            },
            raw_transaction: RawTransactionSettings {
                gas_limit: DEFAULT_GAS_LIMIT,
                gas_price: DEFAULT_GAS_PRICE,
                to: None,
                value: U256::ZERO,
                data: None,
            },
            read_function: "retrieve".to_string(),
            write_function: "store".to_string(),
            store_value: U256::from(10),
        }
    }

    fn receipt(hash: B256, block_number: u64, contract_address: Option<Address>) -> Receipt {
        Receipt {
            transaction_hash: hash,
            block_number,
            contract_address,
            gas_used: 100_000,
            status: true,
        }
    }

    /// Ways a node may disagree with what the deployer computes locally.
    #[derive(Default)]
    struct Quirks {
        /// Contract address reported by the deployment receipt.
        deployed_at: Option<Address>,
        /// Hash reported for raw transactions.
        raw_hash: Option<B256>,
    }

    /// A node that mines every transaction in its own block, like ganache
    /// does by default, and stores the value written to the contract.
    fn automining_node(
        signer: &PrivateKeySigner,
        quirks: Quirks,
    ) -> (MockNode, Arc<Mutex<Vec<Bytes>>>) {
        let account = signer.address();
        let contract = quirks.deployed_at.unwrap_or(account.create(0));
        let raw_hash = quirks.raw_hash;
        let raw_transactions = Arc::new(Mutex::new(Vec::new()));
        let stored = Arc::new(Mutex::new(U256::ZERO));

        let mut node = MockNode::new();
        node.expect_signer_address().return_const(account);
        node.expect_chain_id().returning(|| Ok(1337));
        node.expect_balance()
            .returning(|_| Ok(U256::from(100_000_000_000_000_000_000u128)));

        let nonce = Arc::new(Mutex::new(0u64));
        node.expect_transaction_count().returning({
            let nonce = nonce.clone();
            move |address| {
                assert_eq!(address, account);
                Ok(*nonce.lock().unwrap())
            }
        });
        node.expect_send_transaction().returning({
            let nonce = nonce.clone();
            let stored = stored.clone();
            move |request| {
                let mut nonce = nonce.lock().unwrap();
                *nonce += 1;
                match request.to {
                    Some(TxKind::Create) => {
                        let code = request.input.input().unwrap();
                        assert_eq!(*code, artifact().bytecode);
                        Ok(DEPLOY_HASH)
                    }
                    Some(TxKind::Call(to)) => {
                        assert_eq!(to, contract);
                        let input = request.input.input().unwrap();
                        *stored.lock().unwrap() = U256::from_be_slice(&input[4..]);
                        Ok(STORE_HASH)
                    }
                    None => panic!("transaction without recipient kind"),
                }
            }
        });
        node.expect_send_raw_transaction().returning({
            let nonce = nonce.clone();
            let raw_transactions = raw_transactions.clone();
            move |encoded| {
                *nonce.lock().unwrap() += 1;
                let envelope = TxEnvelope::decode_2718(&mut encoded.as_ref()).unwrap();
                raw_transactions.lock().unwrap().push(encoded);
                Ok(raw_hash.unwrap_or(*envelope.tx_hash()))
            }
        });
        node.expect_transaction_receipt().returning(move |hash| {
            Ok(Some(if hash == DEPLOY_HASH {
                receipt(hash, 1, Some(contract))
            } else if hash == STORE_HASH {
                receipt(hash, 3, None)
            } else {
                receipt(hash, 2, Some(account.create(1)))
            }))
        });
        node.expect_block_number().returning(|| Ok(3));
        node.expect_call().returning({
            let stored = stored.clone();
            move |to, input| {
                assert_eq!(to, contract);
                assert_eq!(input[..], [0x2e, 0x64, 0xce, 0xc1]);
                Ok(stored.lock().unwrap().to_be_bytes::<32>().into())
            }
        });

        (node, raw_transactions)
    }

    #[tokio::test]
    async fn deploys_sends_raw_transaction_and_updates_value() {
        let signer = PrivateKeySigner::random();
        let (node, raw_transactions) = automining_node(&signer, Quirks::default());
        let runbook = Runbook::new(settings(), artifact(), signer.clone());

        let report = runbook.run(&node).await.unwrap();

        assert_eq!(report.deployment.address, signer.address().create(0));
        assert_eq!(report.deployment.transaction_hash, DEPLOY_HASH);
        assert_eq!(report.initial_value, U256::ZERO);
        assert_eq!(report.updated_value, U256::from(10));
        assert_eq!(report.store_receipt.transaction_hash, STORE_HASH);
        assert!(report.raw_transaction.status);

        let raw_transactions = raw_transactions.lock().unwrap();
        let [encoded] = raw_transactions.as_slice() else {
            panic!("expected exactly one raw transaction");
        };
        let TxEnvelope::Legacy(tx) = TxEnvelope::decode_2718(&mut encoded.as_ref()).unwrap()
        else {
            panic!("expected a legacy transaction");
        };
        assert_eq!(tx.recover_signer().unwrap(), signer.address());
        assert_eq!(tx.tx().nonce, 1);
        assert_eq!(tx.tx().chain_id, Some(1337));
        assert_eq!(tx.tx().gas_limit, DEFAULT_GAS_LIMIT);
        assert_eq!(tx.tx().gas_price, DEFAULT_GAS_PRICE);
        assert_eq!(tx.tx().to, TxKind::Create);
        assert_eq!(tx.tx().input, artifact().bytecode);
    }

    #[tokio::test]
    async fn raw_transaction_uses_configured_fields() {
        let signer = PrivateKeySigner::random();
        let (node, raw_transactions) = automining_node(&signer, Quirks::default());
        let recipient = Address::repeat_byte(0x11);
        let mut settings = settings();
        settings.raw_transaction = RawTransactionSettings {
            gas_limit: 21_000,
            gas_price: 1_000_000_000,
            to: Some(recipient),
            value: U256::from(5),
            data: Some(Bytes::new()),
        };

        Runbook::new(settings, artifact(), signer)
            .run(&node)
            .await
            .unwrap();

        let raw_transactions = raw_transactions.lock().unwrap();
        let TxEnvelope::Legacy(tx) =
            TxEnvelope::decode_2718(&mut raw_transactions[0].as_ref()).unwrap()
        else {
            panic!("expected a legacy transaction");
        };
        assert_eq!(tx.tx().to, TxKind::Call(recipient));
        assert_eq!(tx.tx().value, U256::from(5));
        assert_eq!(tx.tx().gas_limit, 21_000);
        assert_eq!(tx.tx().gas_price, 1_000_000_000);
        assert!(tx.tx().input.is_empty());
    }

    #[tokio::test]
    async fn receipt_decides_contract_address() {
        let signer = PrivateKeySigner::random();
        let deployed_at = Address::repeat_byte(0x33);
        let (node, _) = automining_node(
            &signer,
            Quirks {
                deployed_at: Some(deployed_at),
                ..Default::default()
            },
        );

        let report = Runbook::new(settings(), artifact(), signer)
            .run(&node)
            .await
            .unwrap();

        assert_eq!(report.deployment.address, deployed_at);
        assert_eq!(report.updated_value, U256::from(10));
    }

    #[tokio::test]
    async fn waits_for_hash_reported_by_node() {
        let signer = PrivateKeySigner::random();
        let reported = B256::repeat_byte(0x44);
        let (node, raw_transactions) = automining_node(
            &signer,
            Quirks {
                raw_hash: Some(reported),
                ..Default::default()
            },
        );

        let report = Runbook::new(settings(), artifact(), signer)
            .run(&node)
            .await
            .unwrap();

        assert_eq!(report.raw_transaction.transaction_hash, reported);
        let encoded = raw_transactions.lock().unwrap()[0].clone();
        let local = *TxEnvelope::decode_2718(&mut encoded.as_ref())
            .unwrap()
            .tx_hash();
        assert_ne!(local, reported);
    }

    #[tokio::test]
    async fn wrong_chain_is_fatal() {
        let signer = PrivateKeySigner::random();
        let mut node = MockNode::new();
        node.expect_signer_address().return_const(signer.address());
        node.expect_chain_id().returning(|| Ok(1));
        node.expect_send_transaction().never();
        node.expect_send_raw_transaction().never();

        let err = Runbook::new(settings(), artifact(), signer)
            .run(&node)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("connected to chain 1"));
    }

    #[tokio::test]
    async fn signer_mismatch_is_fatal() {
        let mut node = MockNode::new();
        node.expect_signer_address()
            .return_const(Address::repeat_byte(0x22));
        node.expect_chain_id().never();

        let result = Runbook::new(settings(), artifact(), PrivateKeySigner::random())
            .run(&node)
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn reverted_deployment_stops_the_run() {
        let signer = PrivateKeySigner::random();
        let mut node = MockNode::new();
        node.expect_signer_address().return_const(signer.address());
        node.expect_chain_id().returning(|| Ok(1337));
        node.expect_balance().returning(|_| Ok(U256::ZERO));
        node.expect_transaction_count().returning(|_| Ok(0));
        node.expect_send_transaction()
            .times(1)
            .returning(|_| Ok(DEPLOY_HASH));
        node.expect_transaction_receipt().returning(|hash| {
            Ok(Some(Receipt {
                status: false,
                ..receipt(hash, 1, None)
            }))
        });
        node.expect_block_number().returning(|| Ok(1));
        node.expect_send_raw_transaction().never();
        node.expect_call().never();

        let err = Runbook::new(settings(), artifact(), signer)
            .run(&node)
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("reverted"));
    }
}
