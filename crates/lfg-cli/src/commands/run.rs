use std::path::PathBuf;

use anyhow::bail;
use clap::Args;
use lfg_core::SimConfig;
use lfg_scheduler::{Orchestrator, PartyMatchmaker};
use tracing::info;

use crate::report;

/// Simulation parameters. Every flag is optional and overrides the base config.
#[derive(Debug, Default, Args)]
pub struct SimArgs {
    /// Path to an lfg.toml to start from
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Maximum number of concurrent dungeon instances (>= 1)
    #[arg(short = 'n', long)]
    pub instances: Option<u32>,
    /// Tank players in queue
    #[arg(short, long)]
    pub tanks: Option<u32>,
    /// Healer players in queue
    #[arg(long)]
    pub healers: Option<u32>,
    /// DPS players in queue
    #[arg(short, long)]
    pub dps: Option<u32>,
    /// Minimum dungeon time in seconds (>= 1)
    #[arg(long)]
    pub min_time: Option<u32>,
    /// Maximum dungeon time in seconds (min..=15)
    #[arg(long)]
    pub max_time: Option<u32>,
    /// Overall deadline in seconds
    #[arg(long)]
    pub deadline: Option<u64>,
    /// Real milliseconds per simulated second
    #[arg(long)]
    pub tick_ms: Option<u64>,
    /// RNG seed for reproducible dungeon times
    #[arg(long)]
    pub seed: Option<u64>,
}

impl SimArgs {
    /// Resolve the effective config: file (or scaffold), then flag overrides.
    pub fn resolve(&self) -> anyhow::Result<SimConfig> {
        let mut config = match &self.config {
            Some(path) => SimConfig::from_file(path)?,
            None => SimConfig::scaffold(),
        };

        if let Some(v) = self.instances {
            config.instances = v;
        }
        if let Some(v) = self.tanks {
            config.tanks = v;
        }
        if let Some(v) = self.healers {
            config.healers = v;
        }
        if let Some(v) = self.dps {
            config.dps = v;
        }
        if let Some(v) = self.min_time {
            config.min_duration_secs = v;
        }
        if let Some(v) = self.max_time {
            config.max_duration_secs = v;
        }
        if let Some(v) = self.deadline {
            config.deadline_secs = v;
        }
        if let Some(v) = self.tick_ms {
            config.tick_millis = v;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }

        config.validate()?;
        info!(
            source = %self.config.as_ref().map_or("scaffold".into(), |p| p.display().to_string()),
            instances = config.instances,
            tanks = config.tanks,
            healers = config.healers,
            dps = config.dps,
            "config resolved"
        );
        Ok(config)
    }
}

pub async fn run(sim: &SimArgs, format: &str, live: bool, clear: bool) -> anyhow::Result<()> {
    if !matches!(format, "text" | "json") {
        bail!("unknown output format '{format}' (expected text or json)");
    }
    let config = sim.resolve()?;
    let orchestrator = Orchestrator::from_config(&config)?;
    let matchmaker = PartyMatchmaker::from_counts(config.tanks, config.healers, config.dps);

    let printer = if live {
        let mut updates = orchestrator.pool().subscribe();
        let summary = report::format_input_summary(&config);
        Some(tokio::spawn(async move {
            while let Some(snapshot) = updates.recv().await {
                if clear {
                    print!("{}", report::CLEAR_SCREEN);
                }
                println!("{summary}");
                println!("{}", report::format_snapshot(&snapshot));
            }
        }))
    } else {
        None
    };

    let final_report = orchestrator.run(matchmaker).await?;

    // Dropping the pool closes the update stream and lets the printer drain.
    drop(orchestrator);
    if let Some(printer) = printer {
        printer.await?;
    }

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&final_report)?);
        }
        "text" => {
            println!("{}", report::format_final_report(&config, &final_report));
        }
        other => bail!("unknown output format '{other}'"),
    }

    Ok(())
}
