use clap::Parser;
use nsq_shipper::config::{pub_addr_for, LOG_TOPIC};
use nsq_shipper::{Level, LogShipper, LoggerConfig, Result};
use std::time::Duration;
use tokio::io::{stdin, AsyncBufReadExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Parser, Debug)]
#[command(name = "nsq-shipper")]
#[command(about = "Ships stdin lines to an NSQ topic as structured log records", long_about = None)]
struct Args {
    #[arg(short, long, default_value = "", help = "Prefix stamped into every record")]
    prefix: String,

    #[arg(short, long, default_value = "info", help = "Severity assigned to shipped lines")]
    level: Level,

    #[arg(long, value_name = "URL", help = "Broker base address, overrides NSQD_HOST")]
    nsqd_host: Option<String>,

    #[arg(long, default_value_t = 5, help = "Seconds to wait for the queue to drain on exit")]
    drain_secs: u64,

    #[arg(short, long, help = "Enable JSON output for logs")]
    json_logs: bool,

    #[arg(short, long, help = "Verbose logging")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.json_logs, args.verbose);

    info!("Starting nsq-shipper");

    let mut config = LoggerConfig::from_env();
    config.prefix = args.prefix;
    if let Some(host) = &args.nsqd_host {
        config.pub_addr = pub_addr_for(host, LOG_TOPIC);
    }

    info!(
        pub_addr = %config.pub_addr,
        capacity = config.capacity,
        level = %args.level,
        "Configuration summary"
    );

    let (shipper, worker) = LogShipper::start(config)?;

    let mut lines = BufReader::new(stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => shipper.log(args.level, line).await,
            Ok(None) => break,
            Err(e) => {
                error!("Failed to read stdin: {}", e);
                break;
            }
        }
    }

    worker.shutdown(Duration::from_secs(args.drain_secs)).await?;

    let metrics = shipper.metrics();
    info!(
        enqueued = metrics.enqueued,
        delivered = metrics.delivered,
        failed = metrics.failed,
        dropped = metrics.dropped,
        "Shipping summary"
    );

    Ok(())
}

fn init_logging(json: bool, verbose: bool) {
    let env_filter = if verbose {
        EnvFilter::new("nsq_shipper=debug,info")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("nsq_shipper=info,warn"))
    };

    let fmt_layer = if json {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(false)
            .with_span_list(false)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}
