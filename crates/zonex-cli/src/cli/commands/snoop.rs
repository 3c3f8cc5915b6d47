//! `zonex snoop` - Cache snooping against one server.

use anyhow::Result;
use colored::Colorize;

use super::{abortable, Context};
use crate::cli::args::SnoopArgs;
use crate::output::{self, OutputFormat};

pub async fn execute(ctx: Context, args: SnoopArgs) -> Result<()> {
    let mut config = ctx.scan_config(&args.network);
    if !args.targets.is_empty() {
        config.snoop_targets.clone_from(&args.targets);
    }
    let targets = config.snoop_targets.len();
    let scanner = ctx.scanner(config)?;

    let spinner = output::spinner(
        format!("Snooping {} for {targets} domains", args.nameserver),
        ctx.is_pretty(),
    );
    let findings = abortable(scanner.snoop(args.nameserver)).await?;
    spinner.finish_and_clear();

    match ctx.output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&findings)?);
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(&findings)?);
        }
        OutputFormat::Csv => {
            output::print_csv(&findings)?;
        }
        OutputFormat::Pretty => {
            println!("{} {}", "Server:".bold(), args.nameserver.to_string().cyan());
            println!();
            if findings.is_empty() {
                println!("No cached entries found among {targets} probed domains.");
            } else {
                println!("{}", output::findings_table(&findings));
            }
        }
    }

    Ok(())
}
