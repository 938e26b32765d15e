use pooled_dispatch::{dispatch, BufferPools, Config, Runner, Scenario, Strategy};
use std::sync::Arc;
use tokio::runtime::Builder;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const CALLS: usize = 100;


fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let rt = match Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(err) => {
            error!(error = %err, "failed to build runtime");
            std::process::exit(1);
        }
    };

    rt.block_on(async {
        let pools = BufferPools::new();
        let config = Config::default();
        info!(workers = config.workers, queue = config.queue_capacity(), calls = CALLS, "starting");

        for scenario in Scenario::ALL {
            let runner = Arc::new(Runner::new(pools.get(scenario.size), scenario.weight.job()));
            for strategy in Strategy::all(&config) {
                let report = dispatch(Arc::clone(&runner), CALLS, strategy).await;
                if let Some(err) = &report.first_error {
                    error!(scenario = %scenario.name(), strategy = report.strategy, error = %err, "run failed");
                }
                info!(
                    scenario = %scenario.name(),
                    strategy = report.strategy,
                    completed = report.completed,
                    failed = report.failed,
                    elapsed = ?report.elapsed,
                    "throughput: {:.0} calls/s",
                    report.throughput()
                );
            }
            let metrics = runner.pool().metrics();
            info!(
                scenario = %scenario.name(),
                allocated = metrics.allocated,
                cached = metrics.cached,
                "reuse: {:.1}%",
                metrics.reuse_rate() * 100.0
            );
        }
    });
}
