use alloy::{
    primitives::Bytes,
    transports::{RpcError, TransportError},
};

pub trait RpcErrorExt {
    /// Returns the data the EVM reverted with if the node rejected the request
    /// because of a revert.
    fn revert_data(&self) -> Option<Bytes>;

    /// Returns whether the node rejected the request because the EVM
    /// execution reverted. Unlike [`RpcErrorExt::revert_data`] this also
    /// covers reverts without any data.
    fn is_revert(&self) -> bool;
}

impl RpcErrorExt for TransportError {
    fn revert_data(&self) -> Option<Bytes> {
        match self {
            RpcError::ErrorResp(err) => err.as_revert_data(),
            _ => None,
        }
    }

    fn is_revert(&self) -> bool {
        match self {
            RpcError::ErrorResp(err) => {
                // Nodes disagree on how a revert is reported. Geth and anvil
                // return "execution reverted", ganache returns "VM Exception
                // while processing transaction: revert". Some of them omit the
                // data entirely when the contract reverts without a reason.
                let has_revert_data = err.as_revert_data().is_some();
                tracing::debug!(?err, %has_revert_data, "node error response");
                has_revert_data || err.message.contains("revert")
            }
            _ => false,
        }
    }
}
