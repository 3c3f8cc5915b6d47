//! `zonex scan` - Full reconnaissance of one domain.

use anyhow::{Context as _, Result};
use colored::Colorize;
use serde::Serialize;
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use zonex::intel::{CtClient, Exporter, IntelAnalyzer, TakeoverHunter, TopologyGraph};
use zonex::recon::{display_name, parse_domain};
use zonex::{dedup_records, DnsRecord, Finding, ScanOutcome, ZoneScanner, ZoneSource};

use super::{abortable, Context};
use crate::cli::args::ScanArgs;
use crate::output::{self, OutputFormat};

/// What a scan produced once every enabled module has run.
#[derive(Debug, Serialize)]
struct ScanSummary {
    domain: String,
    outcome: ScanOutcome,
    source: Option<ZoneSource>,
    nameservers: Vec<IpAddr>,
    nameserver_records: Vec<DnsRecord>,
    records: Vec<DnsRecord>,
    findings: Vec<Finding>,
    exports: Vec<PathBuf>,
    duration_ms: i64,
}

pub async fn execute(ctx: Context, args: ScanArgs) -> Result<()> {
    let mut config = ctx.scan_config(&args.network);
    config.walk |= args.walk();
    config.snoop |= args.snoop();
    if let Some(max_hops) = args.max_hops {
        config.max_hops = max_hops;
    }
    let scanner = ctx.scanner(config)?;

    let zone = parse_domain(&args.domain)?;
    let domain = display_name(&zone);

    let summary = abortable(run_scan(&ctx, &args, &scanner, &domain)).await??;

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
        OutputFormat::Pretty => print_summary(&summary),
    }

    Ok(())
}

async fn run_scan(
    ctx: &Context,
    args: &ScanArgs,
    scanner: &ZoneScanner,
    domain: &str,
) -> Result<ScanSummary> {
    let spinner = output::spinner(format!("Scanning {domain}"), ctx.is_pretty());

    // 1. Passive recon
    let mut records = Vec::new();
    if args.passive() {
        spinner.set_message("Running passive OSINT (crt.sh)...");
        records.extend(CtClient::new()?.harvest(domain).await);
    }

    // 2. Enumeration and the transfer/walk chain
    spinner.set_message("Engaging active strategies (AXFR/IXFR/NSEC)...");
    let report = scanner.scan(domain).await?;
    records.extend(report.records.iter().cloned());
    let records = dedup_records(records);

    // 3. Analysis
    let mut findings = report.findings.clone();
    if args.cloud() {
        spinner.set_message("Hunting for subdomain takeovers...");
        findings.extend(TakeoverHunter::new()?.check(&records).await);
    }
    findings.extend(IntelAnalyzer::new(&records).run());

    // 4. Export
    spinner.set_message("Finalizing report...");
    let out_dir = args
        .out_dir
        .clone()
        .unwrap_or_else(|| ctx.config.output_dir());
    let mut exports = Vec::new();
    if !args.no_export {
        let exporter = Exporter::new(&out_dir, domain)
            .with_context(|| format!("cannot create {}", out_dir.display()))?;
        exports.push(exporter.to_json(&records)?);
        exports.extend(exporter.to_csv(&records)?);
    }
    if args.graph() && !records.is_empty() {
        std::fs::create_dir_all(&out_dir)?;
        let path = out_dir.join(format!("{domain}.dot"));
        TopologyGraph::build(domain, &records).write(&path)?;
        exports.push(path);
    }
    spinner.finish_and_clear();

    info!(
        domain,
        outcome = %report.outcome,
        records = records.len(),
        findings = findings.len(),
        "scan complete"
    );

    Ok(ScanSummary {
        domain: report.domain.clone(),
        outcome: report.outcome,
        source: report.source,
        nameservers: report.nameservers.clone(),
        nameserver_records: report.nameserver_records.clone(),
        duration_ms: report.duration().num_milliseconds(),
        records,
        findings,
        exports,
    })
}

fn print_summary(summary: &ScanSummary) {
    println!("{} {}", "Target:".bold(), summary.domain.cyan().bold());

    let outcome = summary.outcome.to_string();
    let outcome = if summary.outcome == ScanOutcome::ZoneObtained {
        outcome.green().bold()
    } else {
        outcome.yellow().bold()
    };
    println!("{} {}", "Status:".bold(), outcome);

    if !summary.nameservers.is_empty() {
        let addresses: Vec<String> = summary.nameservers.iter().map(ToString::to_string).collect();
        println!("{} {}", "Nameservers:".bold(), addresses.join(", "));
    }
    if let Some(source) = &summary.source {
        println!(
            "{} {} via {}",
            "Zone source:".bold(),
            source.nameserver.to_string().cyan(),
            source.technique.to_string().green()
        );
    }
    println!(
        "{} {} in {:.1}s",
        "Records:".bold(),
        summary.records.len(),
        Duration::from_millis(u64::try_from(summary.duration_ms).unwrap_or(0)).as_secs_f64()
    );
    println!();

    if !summary.records.is_empty() {
        println!("{}", "Zone Records:".bold().underline());
        println!("{}", output::records_table(&summary.records));
        println!();
    }

    if summary.findings.is_empty() {
        println!("{}", "System clean: no obvious vulnerabilities found.".green());
    } else {
        println!("{}", "VULNERABILITY REPORT".red().bold());
        println!("{}", output::findings_table(&summary.findings));
    }

    if !summary.exports.is_empty() {
        println!();
        for path in &summary.exports {
            println!("  {} {}", "Saved:".dimmed(), path.display());
        }
    }
}
