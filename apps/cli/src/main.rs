use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use fhirdecl_codegen::generators::{GeneratorConfig, OutputTarget};
use fhirdecl_codegen::parser::ChoicePolicy;
use fhirdecl_codegen::{compile_declarations_with, CompileOptions, DEFAULT_FHIR_VERSION};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "fhirdecl",
    about = "Compile FHIR StructureDefinitions into type and enum declarations",
    version,
    arg_required_else_help = true
)]
struct Cli {
    /// Log level used when RUST_LOG is not set (error, warn, info, debug, trace).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile every StructureDefinition matching a glob into one declarations module.
    Compile {
        /// Glob pattern selecting StructureDefinition JSON files (quote it to keep the shell away).
        glob: String,
        /// Output directory for the generated module.
        #[arg(short, long, value_name = "DIR", default_value = "generated")]
        output: PathBuf,
        /// FHIR version the definitions are compiled for.
        #[arg(short = 'v', long, default_value = DEFAULT_FHIR_VERSION)]
        fhir_version: String,
        /// Target language: typescript or rust.
        #[arg(long, default_value_t = OutputTarget::TypeScript)]
        target: OutputTarget,
        /// Generate documentation comments.
        #[arg(long, default_value_t = true, action = ArgAction::Set)]
        docs: bool,
        /// Generate serde derive/attributes (rust target).
        #[arg(long, default_value_t = true, action = ArgAction::Set)]
        serde: bool,
        /// Module the primitive types are imported from (typescript target).
        #[arg(long, value_name = "PATH", default_value = "./primitives")]
        primitives_module: String,
        /// Make every alternative of a choice element optional.
        #[arg(long, action = ArgAction::SetTrue)]
        optional_choices: bool,
    },

    /// Print CLI version.
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    match cli.command {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Compile {
            glob,
            output,
            fhir_version,
            target,
            docs,
            serde,
            primitives_module,
            optional_choices,
        } => {
            let options = CompileOptions {
                fhir_version,
                target,
                choice_policy: if optional_choices {
                    ChoicePolicy::Optional
                } else {
                    ChoicePolicy::InheritCardinality
                },
                generator: GeneratorConfig {
                    generate_docs: docs,
                    generate_serde: serde,
                    primitives_module,
                },
            };
            run_compile(&glob, &output, &options)?;
        }
    }

    Ok(())
}

fn run_compile(glob: &str, output: &Path, options: &CompileOptions) -> Result<()> {
    let inputs = compile_declarations_with(glob, output, options)
        .with_context(|| format!("Failed to compile StructureDefinitions matching '{glob}'"))?;

    for input in &inputs {
        println!("processed {}", input.display());
    }
    println!(
        "Generated {} from {} StructureDefinitions",
        output.join(options.target.file_name()).display(),
        inputs.len()
    );

    Ok(())
}

/// Install a stderr subscriber; RUST_LOG takes precedence over `--log-level`.
fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .with_context(|| format!("Invalid log level '{level}'"))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_compile_defaults() {
        let cli = Cli::try_parse_from(["fhirdecl", "compile", "defs/*.json"]).unwrap();
        assert_eq!(cli.log_level, "warn");
        match cli.command {
            Commands::Compile {
                glob,
                output,
                fhir_version,
                target,
                docs,
                optional_choices,
                ..
            } => {
                assert_eq!(glob, "defs/*.json");
                assert_eq!(output, PathBuf::from("generated"));
                assert_eq!(fhir_version, "3.0.1");
                assert_eq!(target, OutputTarget::TypeScript);
                assert!(docs);
                assert!(!optional_choices);
            }
            Commands::Version => panic!("expected compile"),
        }
    }

    #[test]
    fn test_compile_flags() {
        let cli = Cli::try_parse_from([
            "fhirdecl",
            "compile",
            "defs/*.json",
            "-o",
            "out",
            "-v",
            "4.0.1",
            "--target",
            "rust",
            "--docs",
            "false",
            "--optional-choices",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(cli.log_level, "debug");
        match cli.command {
            Commands::Compile {
                output,
                fhir_version,
                target,
                docs,
                optional_choices,
                ..
            } => {
                assert_eq!(output, PathBuf::from("out"));
                assert_eq!(fhir_version, "4.0.1");
                assert_eq!(target, OutputTarget::Rust);
                assert!(!docs);
                assert!(optional_choices);
            }
            Commands::Version => panic!("expected compile"),
        }
    }
}
