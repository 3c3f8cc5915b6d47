//! Zone topology as a Graphviz DOT document.

use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::path::Path;
use tracing::info;
use zonex_core::{DnsRecord, Result};

/// Directed graph of a zone: the domain points at every in-zone name, and
/// CNAME/MX/NS names point at their targets.
#[derive(Debug, Default)]
pub struct TopologyGraph {
    domain: String,
    subdomains: BTreeSet<(String, String)>,
    externals: BTreeSet<String>,
    edges: BTreeSet<(String, String)>,
}

impl TopologyGraph {
    /// Build the graph of `records` rooted at `domain`
    #[must_use]
    pub fn build(domain: &str, records: &[DnsRecord]) -> Self {
        let mut graph = Self {
            domain: domain.to_string(),
            ..Self::default()
        };

        for record in records.iter().filter(|r| r.name.ends_with(domain)) {
            graph
                .edges
                .insert((domain.to_string(), record.name.clone()));
            graph
                .subdomains
                .insert((record.name.clone(), record.record_type.to_string()));

            if record.record_type.is_alias_like() {
                let target = record.target().to_string();
                graph.edges.insert((record.name.clone(), target.clone()));
                graph.externals.insert(target);
            }
        }
        graph
    }

    /// Number of edges
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Render as DOT
    #[must_use]
    pub fn to_dot(&self) -> String {
        let mut dot = String::from("digraph zone {\n    rankdir=LR;\n");
        let _ = writeln!(dot, "    {} [type=root, color=red];", quote(&self.domain));
        for (name, kind) in &self.subdomains {
            if name == &self.domain {
                continue;
            }
            let _ = writeln!(
                dot,
                "    {} [type=subdomain, label={}];",
                quote(name),
                quote(&format!("{name}\n({kind})"))
            );
        }
        for external in &self.externals {
            let _ = writeln!(dot, "    {} [type=external, color=grey];", quote(external));
        }
        for (from, to) in &self.edges {
            let _ = writeln!(dot, "    {} -> {};", quote(from), quote(to));
        }
        dot.push_str("}\n");
        dot
    }

    /// Write the DOT document to `path`
    pub fn write(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_dot())?;
        info!(path = %path.display(), "graph saved");
        Ok(())
    }
}

fn quote(id: &str) -> String {
    let escaped = id
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n");
    format!("\"{escaped}\"")
}
