//! Exit tree replay tool
//!
//! Rebuilds an exit tree from an ordered leaf log and prints its root, the
//! same way a node recovers its accumulators after a restart:
//! - Reads `EXIT_TREE_LEAF_LOG` (JSON array of `{ "index", "leaf" }`)
//! - Replays the leaves in order into a tree of `EXIT_TREE_HEIGHT`
//! - Optionally proves `EXIT_TREE_PROVE_INDEX` and checks the proof

use std::{fs, path::Path};

use anyhow::{Context, Result, bail};
use serde::Serialize;
use tracing::info;
use xlayer_exit_tree::{
    ExitTree, ExitTreeConfig, Hash, LeafLogEntry, MerkleProof, format_hash_hex,
};

/// Printed summary of the rebuilt tree
#[derive(Debug, Serialize)]
struct Report {
    height: u8,
    leaf_count: usize,
    root: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    proof: Option<ProofReport>,
}

#[derive(Debug, Serialize)]
struct ProofReport {
    index: u64,
    leaf: String,
    siblings: Vec<String>,
}

impl ProofReport {
    fn new(leaf: &Hash, proof: &MerkleProof) -> Self {
        Self {
            index: proof.index,
            leaf: format_hash_hex(leaf),
            siblings: proof.siblings.iter().map(format_hash_hex).collect(),
        }
    }
}

fn load_leaf_log(path: &Path) -> Result<Vec<LeafLogEntry>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read leaf log {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse leaf log {}", path.display()))
}

fn run(config: &ExitTreeConfig) -> Result<Report> {
    config.validate()?;

    let entries = match &config.leaf_log {
        Some(path) => load_leaf_log(path)?,
        None => Vec::new(),
    };
    info!("Replaying {} leaves into tree of height {}", entries.len(), config.height);

    let mut tree = ExitTree::replay(config.height, entries).context("failed to replay leaf log")?;
    let root = tree.root();
    info!("Rebuilt exit tree: {} leaves, root {}", tree.len(), format_hash_hex(&root));

    let proof = match config.prove_index {
        Some(index) => {
            let leaf = tree.leaf(index)?;
            let proof = tree.proof_by_index(index)?;
            if !proof.verify(&leaf, &root) {
                bail!("proof for index {} does not verify against root", index);
            }
            info!("Proof for index {} verified", index);
            Some(ProofReport::new(&leaf, &proof))
        }
        None => None,
    };

    Ok(Report {
        height: tree.height(),
        leaf_count: tree.len(),
        root: format_hash_hex(&root),
        proof,
    })
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = ExitTreeConfig::from_env().context("failed to load exit tree config")?;
    info!("Starting exit tree replay...");
    info!("  Height: {}", config.height);
    info!("  Leaf log: {:?}", config.leaf_log);

    let report = run(&config)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
