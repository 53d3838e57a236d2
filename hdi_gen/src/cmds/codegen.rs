/* Codegen command - generate declarations and block functions per package */

use super::common::{check_declarations, load_protocol, load_types_file};
use anyhow::Context;
use hdi_gen::codegen::{CodeGenerator, CodegenOptions, Dialect, Language};
use std::path::PathBuf;

/* Execute the codegen command */
pub fn run(
  files: Vec<PathBuf>,
  language: Language,
  kernel: bool,
  output_dir: PathBuf,
  config: Option<PathBuf>,
  verbose: bool,
) -> anyhow::Result<()> {
  if kernel && language != Language::C {
    anyhow::bail!("--kernel only applies to C output, not {}", language);
  }
  let dialect = Dialect::from_kernel_flag(kernel);

  if verbose {
    println!("HDI Generator - Code Generation Tool");
    println!("====================================\n");
    println!("[~] Configuration:");
    println!("  Language: {}", language);
    println!("  Dialect: {:?}", dialect);
    println!("  Output directory: {}", output_dir.display());
    println!("  Input files: {}", files.len());
    for file in &files {
      println!("    - {}", file.display());
    }
    if let Some(config) = &config {
      println!("  Protocol tokens: {}", config.display());
    }
    println!();
  }

  let protocol = load_protocol(config.as_ref())?;
  let generator = CodeGenerator::new(CodegenOptions {
    output_dir: output_dir.to_string_lossy().to_string(),
    language,
    dialect,
    protocol,
  });

  let mut written = Vec::new();
  for file in &files {
    let types_file = load_types_file(file)?;
    check_declarations(&types_file, verbose)?;

    if verbose {
      println!(
        "[~] Generating code for package '{}' in {}/{}",
        types_file.package,
        output_dir.display(),
        types_file.package.replace('.', "/")
      );
    }
    let paths = generator
      .emit_code(&types_file)
      .with_context(|| format!("code generation failed for {}", file.display()))?;
    written.extend(paths);
  }

  if verbose {
    println!("[✓] Generated {} code:", language);
    for path in &written {
      println!("    - {}", path.display());
    }
  }

  Ok(())
}
