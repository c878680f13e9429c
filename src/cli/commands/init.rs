//! Init command implementation
//!
//! Handles `docgate init` for project scaffolding.

use anyhow::{Context, Result};

use docgate_config::Config;
use docgate_utils::paths::ensure_dir_all;

/// Starter context map written by `docgate init`. Empty membership, so
/// a check right after init passes; the commented block shows the shape.
const STARTER_CONTEXT_MAP: &str = r#"# Corpus membership list for docgate.
# Every document the gates should see needs an entry here, for example:
#
# contextMap:
#   - category: Guides
#     entries:
#       - path: docs/STRATEGY_OVERVIEW.mdc
#         description: Where this project is going and why
contextMap: []
"#;

/// Execute the init command: scaffold config and context map.
///
/// Existing files are left alone and reported, never overwritten.
pub fn execute_init_command(config: &Config) -> Result<()> {
    println!("Initializing docgate project: {}", config.root);

    let docgate_dir = config.root.join(".docgate");
    let config_path = docgate_dir.join("config.toml");
    let map_path = config.root.join(&config.context_map);

    ensure_dir_all(docgate_dir.as_std_path())
        .with_context(|| format!("Failed to create directory: {docgate_dir}"))?;

    if config_path.exists() {
        println!("  Config file already exists: {config_path}");
    } else {
        std::fs::write(&config_path, starter_config(config))
            .with_context(|| format!("Failed to write config file: {config_path}"))?;
        println!("  ✓ Created config file: {config_path}");
    }

    if map_path.exists() {
        println!("  Context map already exists: {map_path}");
    } else {
        if let Some(parent) = map_path.parent() {
            ensure_dir_all(parent.as_std_path())
                .with_context(|| format!("Failed to create directory: {parent}"))?;
        }
        std::fs::write(&map_path, STARTER_CONTEXT_MAP)
            .with_context(|| format!("Failed to write context map: {map_path}"))?;
        println!("  ✓ Created context map: {map_path}");
    }

    println!("\nNext steps:");
    println!("  1. List your documents in {}", config.context_map);
    println!("  2. Run 'docgate check' to see where the corpus stands");
    println!("  3. Run 'docgate fix --dry-run' to preview automatic repairs");
    Ok(())
}

/// Starter config named after the effective context map, defaults spelled
/// out so they are easy to edit.
fn starter_config(config: &Config) -> String {
    format!(
        r#"# docgate configuration.
# Values here override the built-in defaults; CLI flags override both.

[corpus]
context_map = "{map}"
test_roots = ["tests", "src/__tests__"]
valid_layers = ["STRATEGY", "REQUIREMENTS", "ARCHITECTURE", "IMPLEMENTATION", "OPERATIONS"]
exclude = ["**/node_modules/**", "**/dist/**"]

[history]
limit = 20
"#,
        map = config.context_map
    )
}
