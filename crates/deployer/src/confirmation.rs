use {
    crate::node::{Node, Receipt},
    alloy::primitives::B256,
    anyhow::{Result, bail, ensure},
    std::time::Duration,
    tokio::time::Instant,
};

/// How long to wait for a transaction and how deep it has to be buried before
/// it counts as confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Confirmations {
    /// Number of blocks including the one the transaction was mined in.
    pub count: u64,
    pub poll_interval: Duration,
    pub timeout: Duration,
}

/// Polls the node until the transaction is mined and has the requested number
/// of confirmations. Reverted transactions are errors.
pub async fn wait_for_receipt<N>(
    node: &N,
    hash: B256,
    confirmations: &Confirmations,
) -> Result<Receipt>
where
    N: Node + ?Sized,
{
    // A receipt only exists once the transaction is in a block, so that is
    // the least we can wait for.
    let required = confirmations.count.max(1);
    let deadline = Instant::now() + confirmations.timeout;
    loop {
        if let Some(receipt) = node.transaction_receipt(hash).await? {
            ensure!(
                receipt.status,
                "transaction {hash} reverted in block {}",
                receipt.block_number
            );
            let latest = node.block_number().await?;
            let depth = (latest + 1).saturating_sub(receipt.block_number);
            if depth >= required {
                tracing::debug!(
                    ?hash,
                    block = receipt.block_number,
                    depth,
                    "transaction confirmed"
                );
                return Ok(receipt);
            }
            tracing::trace!(?hash, depth, required, "waiting for more confirmations");
        }
        if Instant::now() >= deadline {
            bail!(
                "transaction {hash} not confirmed after {:?}",
                confirmations.timeout
            );
        }
        tokio::time::sleep(confirmations.poll_interval).await;
    }
}
