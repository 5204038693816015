pub mod arguments;
pub mod artifact;
pub mod confirmation;
pub mod node;
pub mod runbook;
pub mod storage;
pub mod transaction;

use {
    anyhow::{Context, Result},
    artifact::Artifact,
    ethrpc::Web3,
    node::AlloyNode,
    runbook::{Report, Runbook},
};

pub async fn run(args: arguments::Arguments) -> Result<Report> {
    let artifact = Artifact::load(&args.abi_path, &args.bytecode_path)
        .context("load contract artifact")?;
    let node = AlloyNode::new(Web3::new(
        &args.node_url,
        "deployer",
        args.private_key.clone(),
    ));
    Runbook::new(args.settings(), artifact, args.private_key)
        .run(&node)
        .await
}
