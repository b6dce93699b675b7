mod dlq;
mod domain;
mod engine;
mod ingestion;
mod notify;
mod store;

use std::{env, fs::File, path::Path};

use crate::dlq::StdErrDLQ;
use crate::engine::EscrowEngine;
use crate::ingestion::CsvReader;
use crate::notify::LogNotifier;
use crate::store::MemoryStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so the flushed summary on stdout stays parseable.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut args = env::args();
    let file_path = args.nth(1).expect("usage: escrow_engine <commands.csv>");
    let file = File::open(Path::new(&file_path))?;

    let mut ingestion = CsvReader::new(file)?;
    let admin_secret = env::var("ESCROW_ADMIN_SECRET").ok();

    let engine = EscrowEngine::new(MemoryStore::new(), LogNotifier::default(), admin_secret);
    engine.process(&mut ingestion, &StdErrDLQ::default()).await?;
    engine.flush();

    Ok(())
}
