//! Form component synthesis.

pub mod ir;
pub mod template;

use std::fmt;

use thiserror::Error;

use crate::spec::FormDefinition;

pub use ir::ComponentIr;
pub use template::Renderer;

/// Shown in place of source text when the form has no fields.
pub const EMPTY_MESSAGE: &str = "Add elements to generate code";

/// Result of synthesizing a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Emission {
    Empty,
    Source(String),
}

impl Emission {
    pub fn source(&self) -> Option<&str> {
        match self {
            Emission::Empty => None,
            Emission::Source(source) => Some(source),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Emission::Empty)
    }
}

impl fmt::Display for Emission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Emission::Empty => f.write_str(EMPTY_MESSAGE),
            Emission::Source(source) => f.write_str(source),
        }
    }
}

#[derive(Debug, Error)]
pub enum EmitError {
    #[error("template `{name}` failed to compile: {source}")]
    Template {
        name: &'static str,
        #[source]
        source: Box<handlebars::TemplateError>,
    },
    #[error("template `{name}` failed to render: {source}")]
    Render {
        name: &'static str,
        #[source]
        source: handlebars::RenderError,
    },
}

/// Synthesizes the component source for a form.
pub fn emit(form: &FormDefinition) -> Result<Emission, EmitError> {
    emit_with(&Renderer::new()?, form)
}

/// Like [`emit`], reusing an already built renderer.
pub fn emit_with(renderer: &Renderer, form: &FormDefinition) -> Result<Emission, EmitError> {
    if form.fields.is_empty() {
        tracing::debug!(form = %form.name, "form has no fields, nothing to emit");
        return Ok(Emission::Empty);
    }
    let ir = ComponentIr::build(form);
    tracing::debug!(
        form = %form.name,
        fields = ir.fields.len(),
        imports = ir.imports.primitives().len(),
        "rendering component"
    );
    renderer.render(&ir).map(Emission::Source)
}
