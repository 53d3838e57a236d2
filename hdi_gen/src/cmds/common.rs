/* Common utilities shared between the analyze, codegen and fragment commands */

use anyhow::Context;
use hdi_gen::codegen::Protocol;
use hdi_types::TypesFile;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/* Read and parse one declaration file */
pub fn load_types_file(path: &Path) -> anyhow::Result<TypesFile> {
  let content = std::fs::read_to_string(path)
    .with_context(|| format!("failed to read {}", path.display()))?;
  TypesFile::from_yaml_str(&content)
    .with_context(|| format!("failed to parse declarations in {}", path.display()))
}

/* Default tokens, optionally overridden by a YAML file */
pub fn load_protocol(config: Option<&PathBuf>) -> anyhow::Result<Protocol> {
  match config {
    Some(path) => {
      let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
      Protocol::from_yaml_str(&content)
        .with_context(|| format!("failed to parse protocol tokens in {}", path.display()))
    }
    None => Ok(Protocol::default()),
  }
}

/* Declaration names must be unique within a package */
pub fn check_declarations(file: &TypesFile, verbose: bool) -> anyhow::Result<()> {
  let mut seen = HashSet::new();
  let mut duplicates = Vec::new();
  for (name, _) in file.declarations() {
    if !seen.insert(name) {
      duplicates.push(name.to_string());
    }
  }

  if verbose || !duplicates.is_empty() {
    println!("\n[~] Declarations in package '{}':", file.package);
    for (name, ty) in file.declarations() {
      println!("  - {} ({})", name, ty.classify());
    }
  }

  if duplicates.is_empty() {
    if verbose {
      println!("[✓] No duplicate declarations");
    }
    Ok(())
  } else {
    println!("[✗] {} duplicate declaration(s):", duplicates.len());
    for name in &duplicates {
      println!("  [!] {}", name);
    }
    anyhow::bail!("package '{}' declares duplicate types", file.package);
  }
}
