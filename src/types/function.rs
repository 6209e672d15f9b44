//! Function signatures.
//!
//! The core does not evaluate functions; signatures exist so call sites can
//! be completed, hovered, and walked for parameter help. The table itself is
//! supplied by the embedder per analysis unit.

use std::sync::Arc;

use smol_str::SmolStr;

use super::Type;

/// A single function parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: SmolStr,
    pub ty: Type,
    pub description: Option<Arc<str>>,
}

impl Parameter {
    pub fn new(name: impl Into<SmolStr>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<Arc<str>>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Signature of a callable function known to an analysis unit.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSignature {
    pub params: Vec<Parameter>,
    /// Trailing variadic parameter, accepted zero or more times.
    pub var_param: Option<Parameter>,
    pub return_type: Type,
    pub description: Option<Arc<str>>,
    pub deprecated: bool,
}

impl FunctionSignature {
    pub fn new(params: Vec<Parameter>, return_type: Type) -> Self {
        Self {
            params,
            var_param: None,
            return_type,
            description: None,
            deprecated: false,
        }
    }

    pub fn with_var_param(mut self, param: Parameter) -> Self {
        self.var_param = Some(param);
        self
    }

    pub fn with_description(mut self, description: impl Into<Arc<str>>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Render `name(param, …) → type` the way hover and signature help show it.
    pub fn render(&self, name: &str) -> String {
        let mut parts: Vec<String> = self
            .params
            .iter()
            .map(|p| format!("{} {}", p.name, p.ty.friendly_name()))
            .collect();
        if let Some(ref vp) = self.var_param {
            parts.push(format!("…{} {}", vp.name, vp.ty.friendly_name()));
        }
        format!(
            "{}({}) → {}",
            name,
            parts.join(", "),
            self.return_type.friendly_name()
        )
    }

    /// The parameter at a call-site argument index, counting the variadic
    /// parameter for every trailing index.
    pub fn param_at(&self, index: usize) -> Option<&Parameter> {
        self.params
            .get(index)
            .or(if index >= self.params.len() {
                self.var_param.as_ref()
            } else {
                None
            })
    }
}
