use anyhow::{Context, Result};
use flightdb::{
    logging,
    schema::{default_specs, load_manifest},
    sink::{self, redact, Backend},
    Config, Importer,
};
use tracing::info;

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    logging::init();

    // ─── 2) resolve config; a missing DATABASE_URL stops us here ─────
    let config = Config::from_env()?;
    let backend = Backend::parse(&config.database_url)?;
    info!(
        backend = backend.name(),
        url = %redact(&config.database_url),
        data_dir = %config.data_dir.display(),
        "startup"
    );

    // ─── 3) file specs: manifest if given, else the built-in five ────
    let specs = match &config.manifest {
        Some(path) => {
            let specs = load_manifest(path)?;
            info!(manifest = %path.display(), files = specs.len(), "loaded manifest");
            specs
        }
        None => default_specs(),
    };

    // ─── 4) one connection for the whole run ─────────────────────────
    let sink = sink::connect(&backend)
        .with_context(|| format!("connecting to {}", redact(&config.database_url)))?;

    // ─── 5) import ───────────────────────────────────────────────────
    let mut importer = Importer::new(specs, &config.data_dir, sink)?;
    importer.run()?;
    Ok(())
}
