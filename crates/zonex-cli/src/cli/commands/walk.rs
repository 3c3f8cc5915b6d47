//! `zonex walk` - NSEC walk against one nameserver.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use std::net::IpAddr;
use zonex::{DnsRecord, WalkEnd};

use super::{abortable, Context};
use crate::cli::args::WalkArgs;
use crate::output::{self, OutputFormat};

#[derive(Debug, Serialize)]
struct WalkSummary {
    domain: String,
    nameserver: IpAddr,
    hops: usize,
    end: Option<WalkEnd>,
    records: Vec<DnsRecord>,
}

pub async fn execute(ctx: Context, args: WalkArgs) -> Result<()> {
    let mut config = ctx.scan_config(&args.network);
    if let Some(max_hops) = args.max_hops {
        config.max_hops = max_hops;
    }
    let scanner = ctx.scanner(config)?;

    let spinner = output::spinner(
        format!("Walking {} on {}", args.domain, args.nameserver),
        ctx.is_pretty(),
    );
    let walk = abortable(scanner.walk(&args.domain, args.nameserver)).await??;
    spinner.finish_and_clear();

    let summary = WalkSummary {
        domain: args.domain.clone(),
        nameserver: args.nameserver,
        hops: walk.hops(),
        end: walk.end(),
        records: walk.into_records(),
    };

    match ctx.output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(&summary)?);
        }
        OutputFormat::Csv => {
            output::print_csv(&summary.records)?;
        }
        OutputFormat::Pretty => {
            let end = summary
                .end
                .map_or_else(|| "unfinished".to_string(), |end| end.to_string());
            println!(
                "{} {} names in {} hops ({})",
                "Walked:".bold(),
                summary.records.len().to_string().green(),
                summary.hops,
                end.dimmed()
            );
            if !summary.records.is_empty() {
                println!();
                println!("{}", output::records_table(&summary.records));
            }
        }
    }

    Ok(())
}
