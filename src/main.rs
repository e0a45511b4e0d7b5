// ABOUTME: Entry point for the gymstore binary.
// ABOUTME: Initializes tracing, opens the configured backend, and prints every collection as YAML.

mod config;

use gym_store::RecordStore;

use crate::config::GymConfig;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("gymstore=info,gym_store=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = GymConfig::from_env()?;
    tracing::info!(
        "opening {:?} backend under {}",
        config.backend,
        config.home.display()
    );

    let store = RecordStore::new(config.open_backend()?);
    let dump = store.dump()?;
    for (collection, records) in &dump {
        tracing::info!("{}: {} records", collection, records.len());
    }

    print!("{}", serde_yaml::to_string(&dump)?);
    Ok(())
}
