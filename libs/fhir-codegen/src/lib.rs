//! FHIR Declaration Compiler
//!
//! This library compiles FHIR StructureDefinitions into typed declarations
//! (interfaces and enums) for a target language. A glob of StructureDefinition
//! JSON files goes in, exactly one module `declarations.<ext>` comes out.
//!
//! ## Architecture
//!
//! The compiler uses a three-stage pipeline:
//! 1. **Parser**: Groups snapshot elements by parent path, expands choice
//!    elements and extracts inline enumerations from the differential
//! 2. **IR (Intermediate Representation)**: Language-agnostic declarations
//! 3. **Generators**: Language-specific rendering of the IR
//!
//! ```no_run
//! use fhirdecl_codegen::{compile_declarations, DEFAULT_FHIR_VERSION};
//! use std::path::Path;
//!
//! let inputs = compile_declarations(
//!     "definitions/*.json",
//!     Path::new("generated"),
//!     DEFAULT_FHIR_VERSION,
//! )?;
//! println!("compiled {} StructureDefinitions", inputs.len());
//! # Ok::<(), fhirdecl_codegen::Error>(())
//! ```

pub mod error;
pub mod generators;
pub mod ir;
pub mod loader;
pub mod naming;
pub mod parser;
pub mod utils;

pub use error::{Error, Result};

use fhirdecl_models::StructureDefinition;
use generators::{GeneratedModule, Generator, GeneratorConfig, OutputTarget};
use ir::DeclarationSet;
use parser::{ChoicePolicy, ParseOptions};
use std::path::{Path, PathBuf};
use tracing::info;

/// FHIR version assumed when the caller does not name one
pub const DEFAULT_FHIR_VERSION: &str = "3.0.1";

/// Options for one compile invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// FHIR version the inputs are compiled for; must be a semver version
    pub fhir_version: String,
    pub target: OutputTarget,
    pub choice_policy: ChoicePolicy,
    pub generator: GeneratorConfig,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            fhir_version: DEFAULT_FHIR_VERSION.to_string(),
            target: OutputTarget::default(),
            choice_policy: ChoicePolicy::default(),
            generator: GeneratorConfig::default(),
        }
    }
}

impl CompileOptions {
    fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            choice_policy: self.choice_policy,
        }
    }
}

/// Main entry point for in-memory compilation
pub struct CodeGenerator {
    declarations: DeclarationSet,
}

impl CodeGenerator {
    /// Compile already-loaded StructureDefinitions, in the given order
    pub fn from_structure_definitions(
        definitions: &[(PathBuf, StructureDefinition)],
        options: &CompileOptions,
    ) -> Result<Self> {
        validate_fhir_version(&options.fhir_version)?;
        let declarations = parser::parse_batch(
            definitions.iter().map(|(_, sd)| sd),
            &options.fhir_version,
            options.parse_options(),
        )?;
        Ok(Self { declarations })
    }

    /// Get the compiled declarations
    pub fn declarations(&self) -> &DeclarationSet {
        &self.declarations
    }

    /// Generate code for a specific language
    pub fn generate<G: Generator + ?Sized>(&self, generator: &G) -> Result<GeneratedModule> {
        generator.generate(&self.declarations)
    }
}

/// Compile every StructureDefinition matching `glob_pattern` into
/// `<output_dir>/declarations.ts`.
///
/// Returns the processed input paths in the order they were compiled.
pub fn compile_declarations(
    glob_pattern: &str,
    output_dir: &Path,
    fhir_version: &str,
) -> Result<Vec<PathBuf>> {
    let options = CompileOptions {
        fhir_version: fhir_version.to_string(),
        ..Default::default()
    };
    compile_declarations_with(glob_pattern, output_dir, &options)
}

/// Compile with full configuration.
///
/// Every input is loaded and compiled before anything is written, so a
/// failure leaves a previously generated module untouched.
pub fn compile_declarations_with(
    glob_pattern: &str,
    output_dir: &Path,
    options: &CompileOptions,
) -> Result<Vec<PathBuf>> {
    validate_fhir_version(&options.fhir_version)?;

    let definitions = loader::load_all(glob_pattern)?;
    info!(
        pattern = glob_pattern,
        inputs = definitions.len(),
        "resolved StructureDefinitions"
    );

    let codegen = CodeGenerator::from_structure_definitions(&definitions, options)?;
    let generator = options.target.generator(options.generator.clone());
    let module = codegen.generate(generator.as_ref())?;

    let path = utils::write_module(output_dir, &module)?;
    info!(
        path = %path.display(),
        types = codegen.declarations().types().len(),
        enums = codegen.declarations().enums().len(),
        "wrote declarations"
    );

    Ok(definitions.into_iter().map(|(path, _)| path).collect())
}

fn validate_fhir_version(version: &str) -> Result<()> {
    semver::Version::parse(version)
        .map(|_| ())
        .map_err(|e| Error::InvalidFhirVersion(format!("{version}: {e}")))
}
