use std::path::Path;

use anyhow::bail;
use lfg_core::SimConfig;
use tracing::info;

pub fn init(path: &str, force: bool) -> anyhow::Result<()> {
    let output = Path::new(path).join("lfg.toml");
    if output.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", output.display());
    }

    std::fs::write(&output, SimConfig::scaffold().to_toml_string()?)?;
    info!(path = %output.display(), overwrite = force, "scaffold config written");
    println!("✓ Generated {}", output.display());
    Ok(())
}
