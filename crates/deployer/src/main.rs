use clap::Parser;

#[tokio::main]
async fn main() {
    let args = deployer::arguments::Arguments::parse();
    let config = observe::Config::new(
        &args.logging.log_filter,
        args.logging.log_stderr_threshold.into_level(),
        args.logging.use_json_logs,
    );
    observe::tracing::initialize(&config);
    tracing::info!("running deployer with validated arguments:\n{}", args);

    match deployer::run(args).await {
        Ok(report) => tracing::info!(
            address = %report.deployment.address,
            initial_value = %report.initial_value,
            updated_value = %report.updated_value,
            "finished"
        ),
        Err(err) => {
            tracing::error!(?err, "deployment failed");
            std::process::exit(1);
        }
    }
}
