//! zonex - DNS zone reconnaissance CLI
//!
//! Discovers a domain's nameservers and pulls its zone by transfer or NSEC
//! walking.

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    zonex_cli::run().await
}
