/* Fragment command - print one emission for a single inline type */

use super::common::load_protocol;
use anyhow::Context;
use hdi_gen::codegen::shared::{CleanupStack, Site};
use hdi_gen::codegen::{Dialect, EmitContext, Family, Language, TypeEmitter};
use hdi_types::type_from_yaml_str;
use std::path::PathBuf;

pub struct FragmentRequest {
    pub type_yaml: String,
    pub family: Family,
    pub name: String,
    pub language: Language,
    pub kernel: bool,
    pub parcel: String,
    pub config: Option<PathBuf>,
}

/* Execute the fragment command */
pub fn run(request: FragmentRequest) -> anyhow::Result<()> {
    let ty = type_from_yaml_str(&request.type_yaml)
        .with_context(|| format!("failed to parse type '{}'", request.type_yaml))?;
    let protocol = load_protocol(request.config.as_ref())?;
    let cx = EmitContext::new(&protocol, Dialect::from_kernel_flag(request.kernel))
        .with_parcel(&request.parcel);
    let emitter = TypeEmitter::new(request.language, cx);

    let mut output = String::new();
    let releases = emitter
        .emit(
            &ty,
            request.family,
            &Site::new(request.name.clone()),
            &CleanupStack::new(),
            &mut output,
        )
        .with_context(|| {
            format!(
                "cannot emit {} for {} in {}",
                request.family,
                ty.describe(),
                request.language
            )
        })?;

    print!("{}", output);
    if !releases.is_empty() {
        println!("\n[~] Releases still owned by {}:", request.name);
        for release in releases.iter() {
            for line in release.lines() {
                println!("    {}", line);
            }
        }
    }

    Ok(())
}
