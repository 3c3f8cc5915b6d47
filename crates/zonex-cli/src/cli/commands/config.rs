//! `zonex config` - CLI configuration management.

use anyhow::Result;
use colored::Colorize;

use super::Context;
use crate::cli::args::{ConfigArgs, ConfigCommands};
use crate::config::Config;
use crate::output::OutputFormat;

pub async fn execute(ctx: Context, args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommands::Show => show_config(&ctx),
        ConfigCommands::Set { key, value } => set_config(&ctx, &key, &value),
        ConfigCommands::Path => {
            println!("{}", ctx.config_path.display());
            Ok(())
        }
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    let config = &ctx.config;

    match ctx.output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(config)?);
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(config)?);
        }
        _ => {
            println!("{}", "Current Configuration:".bold());
            println!();

            println!(
                "  {} {}",
                "output_format:".bold(),
                config.output_format.unwrap_or_default()
            );
            println!("  {} {}", "output_dir:".bold(), config.output_dir().display());

            let scan = &config.scan;
            let proxy = scan
                .proxy
                .clone()
                .unwrap_or_else(|| "(not set)".dimmed().to_string());
            println!("  {} {}", "proxy:".bold(), proxy);
            println!("  {} {}", "walk:".bold(), scan.walk);
            println!("  {} {}", "snoop:".bold(), scan.snoop);
            println!(
                "  {} {} ({}-{}ms)",
                "jitter:".bold(),
                scan.pacing.enabled,
                scan.pacing.min_delay_ms,
                scan.pacing.max_delay_ms
            );
            println!("  {} {}", "max_hops:".bold(), scan.max_hops);

            let resolvers = if scan.resolvers.is_empty() {
                "(system)".dimmed().to_string()
            } else {
                scan.resolvers
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            println!("  {} {}", "resolvers:".bold(), resolvers);
        }
    }

    Ok(())
}

fn set_config(ctx: &Context, key: &str, value: &str) -> Result<()> {
    let mut config: Config = ctx.config.clone();
    config.set(key, value)?;
    config.save(&ctx.config_path)?;

    println!(
        "{} {} set to {}.",
        "Success:".green().bold(),
        key,
        value.cyan()
    );
    Ok(())
}
