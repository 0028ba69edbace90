use std::process::Command;

use anyhow::{Context, Result};

/// `profilelink-common` tiers, each of which must build on its own.
const FEATURE_COMBINATIONS: &[&[&str]] = &[
    &[], // default
    &["foundation"],
    &["observability"],
    &["runtime"],
    &["platform"],
    &["test-utils"],
];

/// Check that every feature tier of `profilelink-common` compiles.
pub fn test_feature_matrix() -> Result<()> {
    println!("Testing {} profilelink-common feature tiers...", FEATURE_COMBINATIONS.len());

    for (index, features) in FEATURE_COMBINATIONS.iter().enumerate() {
        let joined = features.join(",");
        let label = if features.is_empty() { "default" } else { joined.as_str() };

        println!("\n[{}/{}] cargo check -p profilelink-common ({label})", index + 1, FEATURE_COMBINATIONS.len());

        let mut command = Command::new("cargo");
        command.args(["check", "-p", "profilelink-common", "--no-default-features"]);
        if !features.is_empty() {
            command.arg("--features").arg(&joined);
        }

        let status = command
            .status()
            .with_context(|| format!("Failed to run cargo check for '{label}'"))?;
        if !status.success() {
            anyhow::bail!("Feature tier '{label}' failed to compile");
        }

        println!("✅ '{label}' compiled");
    }

    println!("\n✅ All {} feature tiers compile", FEATURE_COMBINATIONS.len());
    Ok(())
}
