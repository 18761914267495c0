// Generation driver
//
// Runs the three phases in order: types, functions, manifest. Each phase
// consumes the output of the previous one, so functions can only be rendered
// once every type is registered, and the manifest only after every function.

pub mod context;

pub use context::{GenerationContext, Registration};

use crate::catalog::{Catalog, TypeCatalog};
use crate::error::{Error, Result};
use crate::model::{Function, FunctionGroup, ValueType};
use crate::naming::upper_camel_case;
use crate::output::TemplateEngine;
use indexmap::IndexSet;
use serde::Serialize;
use std::path::PathBuf;
use tera::Context;
use tracing::{debug, info};

/// Template used when a function has no hand-authored primary template
pub const GENERIC_FUNCTION_TEMPLATE: &str = "functions/function.h";
pub const FUNCTION_BENCHMARK_TEMPLATE: &str = "functions/benchmarks/benchmarkFunction.cpp";
pub const FUNCTION_BINDING_TEMPLATE: &str = "python/functions/bindFunction.cpp";
pub const MANIFEST_TEMPLATE: &str = "python/module.cpp";

/// What an artifact is, relative to the entity it was rendered for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ArtifactKind {
    TypeDeclaration,
    TypeTest,
    TypeBinding,
    TypeBindingTest,
    FunctionDeclaration,
    FunctionTest,
    FunctionBenchmark,
    FunctionBinding,
    FunctionBindingTest,
    Manifest,
}

/// A rendered file, not yet written anywhere
#[derive(Debug, Clone)]
pub struct Artifact {
    pub kind: ArtifactKind,
    /// Template the text was rendered from
    pub template: String,
    /// Output path relative to the output root
    pub output: PathBuf,
    pub text: String,
}

/// Result of the types phase; the only way into the functions phase
#[derive(Debug)]
pub struct TypePhaseOutput {
    context: GenerationContext,
    artifacts: Vec<Artifact>,
}

impl TypePhaseOutput {
    pub fn context(&self) -> &GenerationContext {
        &self.context
    }

    pub fn artifacts(&self) -> &[Artifact] {
        &self.artifacts
    }
}

/// Result of the functions phase; the only way into the manifest phase
#[derive(Debug)]
pub struct FunctionPhaseOutput {
    context: GenerationContext,
    artifacts: Vec<Artifact>,
}

impl FunctionPhaseOutput {
    pub fn context(&self) -> &GenerationContext {
        &self.context
    }

    pub fn artifacts(&self) -> &[Artifact] {
        &self.artifacts
    }
}

/// Everything one run produced
#[derive(Debug)]
pub struct Generation {
    pub context: GenerationContext,
    pub artifacts: Vec<Artifact>,
}

impl Generation {
    /// Artifacts of one kind, in emission order
    pub fn artifacts_of(&self, kind: ArtifactKind) -> impl Iterator<Item = &Artifact> {
        self.artifacts.iter().filter(move |a| a.kind == kind)
    }

    /// The manifest artifact, always emitted last
    pub fn manifest(&self) -> Option<&Artifact> {
        self.artifacts
            .last()
            .filter(|a| a.kind == ArtifactKind::Manifest)
    }
}

/// Renders every artifact for a declaration set
pub struct Driver {
    engine: TemplateEngine,
}

impl Driver {
    pub fn new(engine: TemplateEngine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &TemplateEngine {
        &self.engine
    }

    /// Run all three phases against a catalog
    pub fn run(&mut self, catalog: &Catalog) -> Result<Generation> {
        let types = self.generate_types(&catalog.types)?;
        let functions = self.generate_functions(types, &catalog.groups)?;
        self.generate_manifest(functions)
    }

    /// Register and render every declared type.
    ///
    /// Vectors, ranges and arrays are emitted as they are registered. Composites
    /// are all registered first and emitted afterwards.
    pub fn generate_types(&mut self, catalog: &TypeCatalog) -> Result<TypePhaseOutput> {
        let mut context = GenerationContext::new();
        let mut artifacts = Vec::new();

        for ty in catalog.declared() {
            if ty.is_scalar() {
                continue;
            }
            if context.register_type(ty.clone())? == Registration::Added {
                self.render_type(ty, &mut artifacts)?;
            }
        }

        let mut composites = Vec::new();
        for composite in &catalog.composites {
            let ty = ValueType::composite(composite.clone());
            if context.register_type(ty.clone())? == Registration::Added {
                composites.push(ty);
            }
        }
        for ty in &composites {
            check_element_types(&context, ty)?;
        }
        for ty in &composites {
            self.render_type(ty, &mut artifacts)?;
        }

        info!(
            "Generated {} types ({} artifacts)",
            context.type_count(),
            artifacts.len()
        );
        Ok(TypePhaseOutput { context, artifacts })
    }

    /// Register and render every function of every group.
    ///
    /// All functions are registered before anything is rendered, so duplicate
    /// names across groups are reported together and no function artifact
    /// exists for a failed declaration set.
    pub fn generate_functions(
        &mut self,
        types: TypePhaseOutput,
        groups: &[FunctionGroup],
    ) -> Result<FunctionPhaseOutput> {
        let TypePhaseOutput {
            mut context,
            mut artifacts,
        } = types;

        let mut duplicates = Vec::new();
        for function in groups.iter().flat_map(FunctionGroup::functions) {
            match context.register_function(function.clone()) {
                Ok(()) => {}
                Err(Error::DuplicateFunction(name)) => {
                    if !duplicates.contains(&name) {
                        duplicates.push(name);
                    }
                }
                Err(e) => return Err(e),
            }
        }
        if !duplicates.is_empty() {
            return Err(Error::DuplicateFunctions(duplicates));
        }

        for function in context.functions() {
            check_type_references(&context, function)?;
        }

        let type_artifacts = artifacts.len();
        for function in context.functions() {
            self.render_function(function, &mut artifacts)?;
        }

        info!(
            "Generated {} functions ({} artifacts)",
            context.function_count(),
            artifacts.len() - type_artifacts
        );
        Ok(FunctionPhaseOutput { context, artifacts })
    }

    /// Render the module manifest over every registered type and function
    pub fn generate_manifest(&mut self, functions: FunctionPhaseOutput) -> Result<Generation> {
        let FunctionPhaseOutput {
            context,
            mut artifacts,
        } = functions;

        let types: Vec<&ValueType> = context.types().collect();
        let function_list: Vec<&Function> = context.functions().collect();

        let mut tera_context = Context::new();
        tera_context.insert("types", &types);
        tera_context.insert("functions", &function_list);

        let output = PathBuf::from(MANIFEST_TEMPLATE);
        let text = self
            .engine
            .render(MANIFEST_TEMPLATE, &output, &tera_context)?;
        artifacts.push(Artifact {
            kind: ArtifactKind::Manifest,
            template: MANIFEST_TEMPLATE.to_string(),
            output,
            text,
        });

        info!(
            "Generated manifest for {} types and {} functions",
            types.len(),
            function_list.len()
        );
        Ok(Generation { context, artifacts })
    }

    fn render_type(&mut self, ty: &ValueType, artifacts: &mut Vec<Artifact>) -> Result<()> {
        let header = ty.header_file_name().ok_or_else(|| {
            Error::declaration(format!("type {} has no header file", ty.class_name()))
        })?;
        let category = upper_camel_case(ty.category().as_str());
        let class_name = ty.class_name();
        debug!("Rendering type {}", class_name);

        let mut context = Context::new();
        context.insert("valueType", ty);

        let jobs = [
            (
                ArtifactKind::TypeDeclaration,
                format!("types/{}Type.h", ty.category().as_str()),
                format!("types/{}", header),
            ),
            (
                ArtifactKind::TypeTest,
                format!("types/tests/test{}Type.cpp", category),
                format!("types/tests/test{}.cpp", class_name),
            ),
            (
                ArtifactKind::TypeBinding,
                format!("python/types/bind{}Type.cpp", category),
                format!("python/types/bind{}.cpp", class_name),
            ),
            (
                ArtifactKind::TypeBindingTest,
                format!("python/types/tests/test{}Type.py", category),
                format!("python/types/tests/test{}.py", class_name),
            ),
        ];

        for (kind, template, output) in jobs {
            artifacts.push(self.render_artifact(kind, template, output, &context)?);
        }
        Ok(())
    }

    fn render_function(&mut self, function: &Function, artifacts: &mut Vec<Artifact>) -> Result<()> {
        let name = function.name();
        debug!(
            "Rendering function {} ({} overloads)",
            name,
            function.interfaces().len()
        );

        let mut context = Context::new();
        context.insert("function", function);

        let specific = format!("functions/{}", function.header_file_name());
        let primary = if self.engine.has_template(&specific) {
            specific
        } else {
            GENERIC_FUNCTION_TEMPLATE.to_string()
        };

        let mut jobs = vec![(
            ArtifactKind::FunctionDeclaration,
            primary,
            format!("functions/{}", function.header_file_name()),
        )];

        let test = format!("functions/tests/test{}.cpp", name);
        if self.engine.has_template(&test) {
            jobs.push((ArtifactKind::FunctionTest, test.clone(), test));
        } else {
            debug!("No test template for {}, skipping", name);
        }

        jobs.push((
            ArtifactKind::FunctionBenchmark,
            FUNCTION_BENCHMARK_TEMPLATE.to_string(),
            format!("functions/benchmarks/benchmark{}.cpp", name),
        ));
        jobs.push((
            ArtifactKind::FunctionBinding,
            FUNCTION_BINDING_TEMPLATE.to_string(),
            format!("python/functions/bind{}.cpp", name),
        ));

        let binding_test = format!("python/functions/tests/test{}.py", name);
        if self.engine.has_template(&binding_test) {
            jobs.push((
                ArtifactKind::FunctionBindingTest,
                binding_test.clone(),
                binding_test,
            ));
        }

        for (kind, template, output) in jobs {
            artifacts.push(self.render_artifact(kind, template, output, &context)?);
        }
        Ok(())
    }

    fn render_artifact(
        &mut self,
        kind: ArtifactKind,
        template: String,
        output: String,
        context: &Context,
    ) -> Result<Artifact> {
        let output = PathBuf::from(output);
        let text = self.engine.render(&template, &output, context)?;
        Ok(Artifact {
            kind,
            template,
            output,
            text,
        })
    }
}

/// Every non-scalar type a function touches must have been generated
fn check_type_references(context: &GenerationContext, function: &Function) -> Result<()> {
    for ty in function.types() {
        if !ty.is_scalar() && !context.contains_type(&ty) {
            return Err(Error::UnresolvedType {
                function: function.name(),
                type_name: ty.class_name(),
            });
        }
    }
    Ok(())
}

/// Every non-scalar element of a composite must be a registered type
fn check_element_types(context: &GenerationContext, composite: &ValueType) -> Result<()> {
    let mut types = IndexSet::new();
    composite.collect_types(&mut types);
    for ty in types.iter().skip(1) {
        if !ty.is_scalar() && !context.contains_type(ty) {
            return Err(Error::UnresolvedElement {
                composite: composite.class_name(),
                type_name: ty.class_name(),
            });
        }
    }
    Ok(())
}
