//! Affixforge - Command line driver
//!
//! Exports the default config and runs rolls or resolutions against it,
//! for balance checks without a game server.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use affixforge::data::{default_config_path, export_default_config, load_config_or_default, ItemizationConfig};
use affixforge::items::{Archetype, ItemizedStat, Rarity, RollSource};
use affixforge::resolve::resolve_stack;
use affixforge::rolls::{create_crafted_item, roll_if_eligible, roll_stat_pool, GenerationContext, GenerationDiagnostics};
use affixforge::ItemStack;

/// Item affix rolling and stat resolution tools
#[derive(Parser)]
#[command(name = "affixforge")]
#[command(about = "Roll and resolve itemized gear against a config", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (defaults to the platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write the default config as RON
    ExportConfig {
        /// Output path (defaults to the config path)
        path: Option<PathBuf>,
    },

    /// Roll instances and print the rarity spread
    Roll {
        item_id: String,
        #[arg(default_value_t = 1000)]
        count: u32,
        #[arg(value_parser = parse_source)]
        source: Option<RollSource>,
    },

    /// Roll one instance and print its stats
    Resolve {
        item_id: String,
        #[arg(value_parser = parse_rarity)]
        rarity: Option<Rarity>,
    },
}

fn parse_source(raw: &str) -> Result<RollSource, String> {
    RollSource::from_id(raw).ok_or_else(|| format!("unknown source '{}'", raw))
}

fn parse_rarity(raw: &str) -> Result<Rarity, String> {
    Rarity::from_id(raw).ok_or_else(|| format!("unknown rarity '{}'", raw))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(default_config_path);

    match cli.command {
        Command::ExportConfig { path } => {
            let path = path.unwrap_or(config_path);
            export_default_config(&path).with_context(|| format!("exporting config to {}", path.display()))?;
            println!("Wrote default config to {}", path.display());
        }
        Command::Roll { item_id, count, source } => {
            let config = load_config_or_default(&config_path);
            run_roll(&config, &item_id, count, source.unwrap_or(RollSource::Crafted))?;
        }
        Command::Resolve { item_id, rarity } => {
            let config = load_config_or_default(&config_path);
            run_resolve(&config, &item_id, rarity)?;
        }
    }

    Ok(())
}

fn run_roll(config: &ItemizationConfig, item_id: &str, count: u32, source: RollSource) -> Result<()> {
    let diagnostics = GenerationDiagnostics::new();
    let context = GenerationContext::new("cli_roll");
    let mut rng = rand::thread_rng();
    let mut counts = [0u32; Rarity::COUNT];

    for _ in 0..count {
        let stack = roll_if_eligible(ItemStack::new(item_id, 1), source, &context, config, &diagnostics, &mut rng);
        match stack.metadata {
            Some(metadata) => counts[metadata.rarity.index()] += 1,
            None => bail!("'{}' is not eligible for itemization", item_id),
        }
    }

    println!("{} x{} ({})", item_id, count, source.id());
    for rarity in Rarity::ALL {
        let n = counts[rarity.index()];
        let share = if count > 0 { f64::from(n) / f64::from(count) * 100.0 } else { 0.0 };
        println!("  {:<10} {:>7} {:>6.2}%", rarity.name(), n, share);
    }
    println!("{}", serde_json::to_string_pretty(&diagnostics.snapshot())?);
    Ok(())
}

fn run_resolve(config: &ItemizationConfig, item_id: &str, rarity: Option<Rarity>) -> Result<()> {
    let diagnostics = GenerationDiagnostics::new();
    let mut rng = rand::thread_rng();

    let mut stack = create_crafted_item(item_id, 1, config, &diagnostics, &mut rng);
    let Some(mut metadata) = stack.metadata.take() else {
        bail!("'{}' is not eligible for itemization", item_id);
    };

    if let Some(rarity) = rarity.filter(|r| *r != metadata.rarity) {
        let pool = roll_stat_pool(
            &config.stats,
            item_id,
            Archetype::resolve(item_id),
            &metadata.prefix,
            metadata.catalyst,
            config.stats.stats_for_rarity(rarity),
            &mut rng,
        );
        metadata.rarity = rarity;
        metadata.flat_rolls = pool.flat;
        metadata.percent_rolls = pool.percent;
        metadata.set_socket_capacity(affixforge::crafting::sockets_for_rarity(&config.gem_sockets, rarity));
    }

    let stack = stack.with_metadata(metadata);
    let resolution = resolve_stack(Some(&stack), config);

    println!(
        "{} [{}] {} tier x{:.2}",
        item_id,
        resolution.archetype.id(),
        resolution.rarity,
        resolution.tier_scalar
    );
    if let Some(metadata) = &stack.metadata {
        if !metadata.prefix.is_empty() {
            println!("  prefix: {}", metadata.prefix);
        }
        println!("  sockets: {}", metadata.socket_capacity());
    }
    for stat in ItemizedStat::ALL {
        let value = resolution.resolved.get(stat);
        if value > 0.0 {
            println!(
                "  {:<22} {:>9.4}  (flat {:.4}, pct {:.4})",
                stat.id(),
                value,
                stack.metadata.as_ref().map_or(0.0, |m| m.flat_rolls.get(stat)),
                stack.metadata.as_ref().map_or(0.0, |m| m.percent_rolls.get(stat))
            );
        }
    }
    let s = resolution.summary;
    println!(
        "  summary: damage {:.2} defence {:.2} healing {:.2} utility {:.2}",
        s.damage, s.defence, s.healing, s.utility
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_roll_defaults() {
        let cli = Cli::try_parse_from(["affixforge", "roll", "weapon_sword_iron"]).unwrap();
        assert!(cli.config.is_none());
        match cli.command {
            Command::Roll { item_id, count, source } => {
                assert_eq!(item_id, "weapon_sword_iron");
                assert_eq!(count, 1000);
                assert!(source.is_none());
            }
            _ => panic!("expected roll"),
        }
    }

    #[test]
    fn test_config_is_global() {
        let cli = Cli::try_parse_from(["affixforge", "resolve", "armor_iron_chest", "epic", "--config", "x.ron"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("x.ron")));
        match cli.command {
            Command::Resolve { rarity, .. } => assert_eq!(rarity, Some(Rarity::Epic)),
            _ => panic!("expected resolve"),
        }
    }

    #[test]
    fn test_bad_arguments_are_rejected() {
        assert!(Cli::try_parse_from(["affixforge", "roll", "weapon_sword_iron", "--config"]).is_err());
        assert!(Cli::try_parse_from(["affixforge", "roll", "weapon_sword_iron", "10", "alchemy"]).is_err());
        assert!(Cli::try_parse_from(["affixforge", "roll", "weapon_sword_iron", "lots"]).is_err());

        let cli = Cli::try_parse_from(["affixforge", "roll", "weapon_sword_iron", "10", "Monster_Drop"]).unwrap();
        assert!(matches!(cli.command, Command::Roll { source: Some(RollSource::MonsterDrop), .. }));
    }
}
