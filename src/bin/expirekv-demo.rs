//! EXPIREKV Demo
//!
//! Walks a store through puts, reads, expiry and deletion.

use clap::Parser;
use expirekv::{BackendKind, ExpiringStore, StoreConfig};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// EXPIREKV Demo - TTL store walkthrough
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Keep entries in memory instead of on disk
    #[arg(long)]
    memory: bool,

    /// Database file
    #[arg(short, long, default_value = "my.redb")]
    path: PathBuf,

    /// Bucket entries are stored under
    #[arg(short, long, default_value = "MyBucket")]
    bucket: String,

    /// Seconds to wait before the second round of reads
    #[arg(long, default_value_t = 4)]
    sleep_secs: u64,
}

fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("expirekv=info".parse()?))
        .init();

    let args = Args::parse();

    let backend = if args.memory {
        BackendKind::Memory
    } else {
        BackendKind::Durable
    };
    let config = StoreConfig::default()
        .with_backend(backend)
        .with_path(&args.path)
        .with_bucket(&args.bucket);

    let store = ExpiringStore::open(&config)?;
    info!(backend = store.backend().name(), "Store opened");

    store.put("name1", "john", 3)?;
    store.put("name2", "alice", 5)?;
    store.put("name3", "bob", 7)?;

    for key in ["name1", "name2", "name3"] {
        report_get(&store, key);
    }

    info!("Sleeping {}s", args.sleep_secs);
    thread::sleep(Duration::from_secs(args.sleep_secs));

    report_get(&store, "name1");
    report_get(&store, "name3");

    match store.delete("name3") {
        Ok(()) => println!("DELETE name3 ok"),
        Err(e) => println!("DELETE name3 {}", e),
    }
    report_get(&store, "name3");

    println!("{}", store.stats().summary());
    Ok(())
}

fn report_get<B: expirekv::Backend>(store: &ExpiringStore<B>, key: &str) {
    match store.get(key) {
        Ok(value) => println!("GET {} {}", key, value),
        Err(e) => println!("GET {} {}", key, e),
    }
}
