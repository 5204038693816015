use {
    crate::{
        confirmation::Confirmations,
        runbook::{RawTransactionSettings, Settings},
        transaction::{DEFAULT_GAS_LIMIT, DEFAULT_GAS_PRICE},
    },
    alloy::{
        primitives::{Address, Bytes, U256},
        signers::local::PrivateKeySigner,
    },
    std::{path::PathBuf, time::Duration},
    tracing::level_filters::LevelFilter,
    url::Url,
};

#[derive(clap::Parser)]
pub struct LoggingArguments {
    #[clap(long, env, default_value = "warn,deployer=debug,ethrpc=debug")]
    pub log_filter: String,

    #[clap(long, env, default_value = "error")]
    pub log_stderr_threshold: LevelFilter,

    /// Output log events as JSON.
    #[clap(long, env, action = clap::ArgAction::Set, default_value = "false")]
    pub use_json_logs: bool,
}

#[derive(clap::Parser)]
pub struct Arguments {
    #[clap(flatten)]
    pub logging: LoggingArguments,

    /// The Ethereum node URL to connect to.
    #[clap(long, env, default_value = "http://127.0.0.1:7545")]
    pub node_url: Url,

    /// Hex encoded private key of the account that deploys and calls the
    /// contract.
    #[clap(long, env, hide_env_values = true)]
    pub private_key: PrivateKeySigner,

    /// The chain ID the node is expected to run. The run is aborted if the
    /// node reports a different one.
    #[clap(long, env, default_value = "1337")]
    pub chain_id: u64,

    /// Name of the network, only used in logs.
    #[clap(long, env, default_value = "ganache")]
    pub network_name: String,

    /// ABI of the contract as written by `solc --abi`.
    #[clap(long, env, default_value = "./SimpleStorage_sol_SimpleStorage.abi")]
    pub abi_path: PathBuf,

    /// Creation bytecode of the contract as written by `solc --bin`.
    #[clap(long, env, default_value = "./SimpleStorage_sol_SimpleStorage.bin")]
    pub bytecode_path: PathBuf,

    /// Number of blocks, including the one it was mined in, a transaction
    /// needs before it is considered confirmed.
    #[clap(long, env, default_value = "1")]
    pub confirmations: u64,

    /// How long to wait for a transaction to be confirmed.
    #[clap(
        long,
        env,
        default_value = "2m",
        value_parser = humantime::parse_duration,
    )]
    pub confirmation_timeout: Duration,

    /// How often to ask the node for the receipt of a pending transaction.
    #[clap(
        long,
        env,
        default_value = "250ms",
        value_parser = humantime::parse_duration,
    )]
    pub poll_interval: Duration,

    /// Gas limit of the hand built transaction.
    #[clap(long, env, default_value_t = DEFAULT_GAS_LIMIT)]
    pub gas_limit: u64,

    /// Gas price in wei of the hand built transaction.
    #[clap(long, env, default_value_t = DEFAULT_GAS_PRICE)]
    pub gas_price: u128,

    /// Recipient of the hand built transaction. Creates a contract if unset.
    #[clap(long, env)]
    pub raw_tx_to: Option<Address>,

    /// Value in wei sent with the hand built transaction.
    #[clap(long, env, default_value = "0")]
    pub raw_tx_value: U256,

    /// Hex encoded payload of the hand built transaction. Defaults to the
    /// contract's creation bytecode.
    #[clap(long, env)]
    pub raw_tx_data: Option<Bytes>,

    /// Function that reads the stored value.
    #[clap(long, env, default_value = "retrieve")]
    pub read_function: String,

    /// Function that stores a new value.
    #[clap(long, env, default_value = "store")]
    pub write_function: String,

    /// Value written to the contract.
    #[clap(long, env, default_value = "10")]
    pub store_value: U256,
}

impl Arguments {
    pub fn settings(&self) -> Settings {
        Settings {
            network: self.network_name.clone(),
            chain_id: self.chain_id,
            confirmations: Confirmations {
                count: self.confirmations,
                poll_interval: self.poll_interval,
                timeout: self.confirmation_timeout,
            },
            raw_transaction: RawTransactionSettings {
                gas_limit: self.gas_limit,
                gas_price: self.gas_price,
                to: self.raw_tx_to,
                value: self.raw_tx_value,
                data: self.raw_tx_data.clone(),
            },
            read_function: self.read_function.clone(),
            write_function: self.write_function.clone(),
            store_value: self.store_value,
        }
    }
}

impl std::fmt::Display for Arguments {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Self {
            logging,
            node_url,
            private_key,
            chain_id,
            network_name,
            abi_path,
            bytecode_path,
            confirmations,
            confirmation_timeout,
            poll_interval,
            gas_limit,
            gas_price,
            raw_tx_to,
            raw_tx_value,
            raw_tx_data,
            read_function,
            write_function,
            store_value,
        } = self;

        writeln!(f, "log_filter: {}", logging.log_filter)?;
        writeln!(f, "log_stderr_threshold: {}", logging.log_stderr_threshold)?;
        writeln!(f, "use_json_logs: {}", logging.use_json_logs)?;
        writeln!(f, "node_url: {node_url}")?;
        writeln!(f, "private_key: SECRET")?;
        writeln!(f, "account: {}", private_key.address())?;
        writeln!(f, "chain_id: {chain_id}")?;
        writeln!(f, "network_name: {network_name}")?;
        writeln!(f, "abi_path: {}", abi_path.display())?;
        writeln!(f, "bytecode_path: {}", bytecode_path.display())?;
        writeln!(f, "confirmations: {confirmations}")?;
        writeln!(f, "confirmation_timeout: {confirmation_timeout:?}")?;
        writeln!(f, "poll_interval: {poll_interval:?}")?;
        writeln!(f, "gas_limit: {gas_limit}")?;
        writeln!(f, "gas_price: {gas_price}")?;
        writeln!(f, "raw_tx_to: {raw_tx_to:?}")?;
        writeln!(f, "raw_tx_value: {raw_tx_value}")?;
        writeln!(f, "raw_tx_data: {raw_tx_data:?}")?;
        writeln!(f, "read_function: {read_function}")?;
        writeln!(f, "write_function: {write_function}")?;
        writeln!(f, "store_value: {store_value}")?;
        Ok(())
    }
}
