//! `zonex nameservers` - Authoritative nameservers and their serials.

use anyhow::Result;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use super::{abortable, Context};
use crate::cli::args::NameserversArgs;
use crate::output::{self, OutputFormat};

#[derive(Tabled)]
struct NameserverRow {
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "SOA Serial")]
    serial: String,
}

pub async fn execute(ctx: Context, args: NameserversArgs) -> Result<()> {
    let scanner = ctx.scanner(ctx.scan_config(&args.network))?;

    let spinner = output::spinner(
        format!("Enumerating nameservers of {}", args.domain),
        ctx.is_pretty(),
    );
    let nameservers = abortable(scanner.nameservers(&args.domain)).await??;
    spinner.finish_and_clear();

    match ctx.output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&nameservers)?);
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(&nameservers)?);
        }
        OutputFormat::Csv => {
            output::print_csv(&nameservers)?;
        }
        OutputFormat::Pretty => {
            println!("{} {}", "Domain:".bold(), args.domain.cyan());
            println!();

            if nameservers.is_empty() {
                println!("{}", "No nameservers found.".yellow());
                return Ok(());
            }

            let rows: Vec<NameserverRow> = nameservers
                .iter()
                .map(|ns| NameserverRow {
                    address: ns.address.to_string(),
                    serial: ns
                        .serial
                        .map_or_else(|| "-".to_string(), |serial| serial.to_string()),
                })
                .collect();
            println!("{}", Table::new(rows).with(Style::rounded()));
        }
    }

    Ok(())
}
