/* Analyze command - per-declaration type report */

use super::common::{check_declarations, load_types_file};
use clap::ValueEnum;
use hdi_gen::codegen::shared::native_type;
use hdi_gen::codegen::Language;
use hdi_gen::wire::c_layout;
use hdi_types::{Type, TypeMode};
use indexmap::IndexMap;
use serde_derive::Serialize;
use std::path::PathBuf;

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum ReportFormat {
    Text,
    Json,
}

#[derive(Debug, Serialize)]
pub struct TypeReport {
    pub name: String,
    pub kind: String,
    pub description: String,
    pub c_size: usize,
    pub c_align: usize,
    /* language -> mode -> spelling */
    pub spellings: IndexMap<String, IndexMap<String, String>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<TypeReport>,
}

pub fn report(name: &str, ty: &Type) -> TypeReport {
    let mut spellings = IndexMap::new();
    for language in Language::ALL {
        let mut by_mode = IndexMap::new();
        for mode in TypeMode::ALL {
            let spelling = match native_type(ty, language, mode) {
                Ok(spelling) => spelling,
                Err(err) => format!("<{}>", err),
            };
            by_mode.insert(format!("{:?}", mode), spelling);
        }
        spellings.insert(language.to_string(), by_mode);
    }

    let fields = match ty {
        Type::Struct(s) => s
            .fields
            .iter()
            .map(|field| report(&field.name, &field.field_type))
            .collect(),
        Type::Union(u) => u
            .fields
            .iter()
            .map(|field| report(&field.name, &field.field_type))
            .collect(),
        _ => Vec::new(),
    };

    let layout = c_layout(ty);
    TypeReport {
        name: name.to_string(),
        kind: ty.classify().to_string(),
        description: ty.describe(),
        c_size: layout.size,
        c_align: layout.align,
        spellings,
        fields,
    }
}

/* Execute the analyze command */
pub fn run(files: Vec<PathBuf>, format: ReportFormat) -> anyhow::Result<()> {
    let mut packages: IndexMap<String, Vec<TypeReport>> = IndexMap::new();
    for file in &files {
        let types_file = load_types_file(file)?;
        check_declarations(&types_file, false)?;
        let reports = types_file
            .declarations()
            .map(|(name, ty)| report(name, ty))
            .collect();
        packages.insert(types_file.package.clone(), reports);
    }

    match format {
        ReportFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&packages)?);
        }
        ReportFormat::Text => {
            println!("HDI Generator - Type Analysis Tool");
            println!("=================================\n");
            for (package, reports) in &packages {
                println!("[~] Package {}", package);
                for type_report in reports {
                    print_report(type_report, 1);
                }
                println!();
            }
        }
    }

    Ok(())
}

fn print_report(report: &TypeReport, level: usize) {
    let indent = "  ".repeat(level);
    println!(
        "{}- {} ({}): {}, size {} align {}",
        indent, report.name, report.kind, report.description, report.c_size, report.c_align
    );
    for (language, by_mode) in &report.spellings {
        let spellings: Vec<String> = by_mode
            .iter()
            .map(|(mode, spelling)| format!("{}={}", mode, spelling))
            .collect();
        println!("{}    {}: {}", indent, language, spellings.join(", "));
    }
    for field in &report.fields {
        print_report(field, level + 1);
    }
}
