use clap::{Parser, Subcommand, ValueEnum};
use cmds::analyze::ReportFormat;
use hdi_gen::codegen::{Family, Language};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod cmds;

#[derive(Parser)]
#[command(name = "hdi-gen")]
#[command(about = "HDI binding generator for C, C++ and Java", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /* Generate type declarations and block functions */
    Codegen {
        /* Input YAML files containing type declarations */
        #[arg(short = 'f', long = "files", value_name = "FILE", required = true)]
        files: Vec<PathBuf>,

        /* Target language for code generation */
        #[arg(short = 'l', long = "language", value_enum)]
        language: LanguageArg,

        /* Emit kernel-space C */
        #[arg(long = "kernel")]
        kernel: bool,

        /* Output directory for generated code */
        #[arg(
            short = 'o',
            long = "output",
            value_name = "DIR",
            default_value = "generated"
        )]
        output_dir: PathBuf,

        /* YAML file overriding protocol tokens */
        #[arg(long = "config", value_name = "FILE")]
        config: Option<PathBuf>,

        /* Enable verbose output */
        #[arg(short = 'v', long = "verbose")]
        verbose: bool,
    },

    /* Show kind, description and native spellings of every declaration */
    Analyze {
        /* Input YAML files containing type declarations */
        #[arg(short = 'f', long = "files", value_name = "FILE", required = true)]
        files: Vec<PathBuf>,

        #[arg(long = "format", value_enum, default_value = "text")]
        format: ReportFormat,
    },

    /* Print the fragment one emission family produces for a single type */
    Fragment {
        /* Inline YAML type, e.g. "list: {element-type: uint}" */
        #[arg(short = 't', long = "type", value_name = "YAML")]
        type_yaml: String,

        #[arg(long = "family", value_enum)]
        family: FamilyArg,

        /* Value expression the fragment operates on */
        #[arg(short = 'n', long = "name", default_value = "value")]
        name: String,

        #[arg(short = 'l', long = "language", value_enum, default_value = "c")]
        language: LanguageArg,

        #[arg(long = "kernel")]
        kernel: bool,

        /* Parcel handle expression */
        #[arg(long = "parcel", default_value = "data")]
        parcel: String,

        #[arg(long = "config", value_name = "FILE")]
        config: Option<PathBuf>,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum LanguageArg {
    /* Manual-memory C (.h and .c files) */
    C,
    /* C++ (.h and .cpp files) */
    Cpp,
    /* Java fragments */
    Java,
}

impl From<LanguageArg> for Language {
    fn from(lang: LanguageArg) -> Self {
        match lang {
            LanguageArg::C => Language::C,
            LanguageArg::Cpp => Language::Cpp,
            LanguageArg::Java => Language::Java,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum FamilyArg {
    WriteVar,
    ProxyWriteOutVar,
    ProxyReadVar,
    StubReadVar,
    ProxyReadOutVar,
    StubReadOutVar,
    Marshal,
    Unmarshal,
    MemoryRecycle,
    ClientMemoryRecycle,
}

impl From<FamilyArg> for Family {
    fn from(family: FamilyArg) -> Self {
        match family {
            FamilyArg::WriteVar => Family::WriteVar,
            FamilyArg::ProxyWriteOutVar => Family::ProxyWriteOutVar,
            FamilyArg::ProxyReadVar => Family::ProxyReadVar,
            FamilyArg::StubReadVar => Family::StubReadVar,
            FamilyArg::ProxyReadOutVar => Family::ProxyReadOutVar,
            FamilyArg::StubReadOutVar => Family::StubReadOutVar,
            FamilyArg::Marshal => Family::Marshal,
            FamilyArg::Unmarshal => Family::Unmarshal,
            FamilyArg::MemoryRecycle => Family::MemoryRecycle { client: false },
            FamilyArg::ClientMemoryRecycle => Family::MemoryRecycle { client: true },
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Codegen {
            files,
            language,
            kernel,
            output_dir,
            config,
            verbose,
        } => {
            init_tracing(verbose);
            cmds::codegen::run(files, language.into(), kernel, output_dir, config, verbose)?;
        }

        Commands::Analyze { files, format } => {
            init_tracing(false);
            cmds::analyze::run(files, format)?;
        }

        Commands::Fragment {
            type_yaml,
            family,
            name,
            language,
            kernel,
            parcel,
            config,
        } => {
            init_tracing(false);
            cmds::fragment::run(cmds::fragment::FragmentRequest {
                type_yaml,
                family: family.into(),
                name,
                language: language.into(),
                kernel,
                parcel,
                config,
            })?;
        }
    }

    Ok(())
}
