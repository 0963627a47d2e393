//! Rendering type expressions back to Go source.

use std::collections::BTreeSet;

use tracing::debug;

use crate::ast::{ChanDir, Field, FuncType, InterfaceElem, TypeRef};

/// Stands in for any type whose package may not be imported by the stub.
pub const OPAQUE_TYPE: &str = "interface{}";

/// Replaces an embedded field whose type was erased. Declared once per stub file.
pub const EMBED_SENTINEL: &str = "Embedme";

/// Local package names a stub may keep referring to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportAllowSet {
    names: BTreeSet<String>,
}

impl ImportAllowSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a name; returns false if it was already present.
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        self.names.insert(name.into())
    }

    /// Whether references qualified by `name` are kept.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }
}

impl<S: Into<String>> FromIterator<S> for ImportAllowSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Formats [`TypeRef`]s, optionally erasing references to packages outside an allow-set.
#[derive(Debug, Clone, Copy)]
pub struct TypeFormatter<'a> {
    allowed: Option<&'a ImportAllowSet>,
}

impl<'a> TypeFormatter<'a> {
    /// Qualified references to packages not in `allowed` become [`OPAQUE_TYPE`]. Results are
    /// always parenthesized.
    pub fn erasing(allowed: &'a ImportAllowSet) -> Self {
        Self {
            allowed: Some(allowed),
        }
    }

    /// Render every type as written, with canonical result lists.
    pub fn verbatim() -> TypeFormatter<'static> {
        TypeFormatter { allowed: None }
    }

    /// Whether `ty` is replaced by the opaque placeholder as a whole. A type already written as
    /// `interface{}` is not erased.
    pub fn erases(&self, ty: &TypeRef) -> bool {
        self.allowed.is_some()
            && self.format(ty) == OPAQUE_TYPE
            && Self::verbatim().format(ty) != OPAQUE_TYPE
    }

    /// Render one type.
    pub fn format(&self, ty: &TypeRef) -> String {
        match ty {
            TypeRef::Ident(name) => name.clone(),
            TypeRef::Qualified { package, name } => match self.allowed {
                Some(allowed) if !allowed.contains(package) => OPAQUE_TYPE.to_string(),
                _ => format!("{package}.{name}"),
            },
            TypeRef::Pointer(inner) => {
                let inner = self.format(inner);
                if self.allowed.is_some() && inner == OPAQUE_TYPE {
                    inner
                } else {
                    format!("*{inner}")
                }
            }
            TypeRef::Array { len, elem } => {
                let len = len.as_deref().map(|l| self.format(l)).unwrap_or_default();
                format!("[{len}]{}", self.format(elem))
            }
            TypeRef::Ellipsis(elem) => format!("...{}", self.format(elem)),
            TypeRef::Func(sig) => format!("func{}", self.format_signature(sig)),
            TypeRef::Map { key, value } => {
                format!("map[{}]{}", self.format(key), self.format(value))
            }
            TypeRef::Chan { dir, elem } => {
                let inner = self.format(elem);
                match dir {
                    ChanDir::Send => format!("chan<- {inner}"),
                    ChanDir::Recv => format!("<-chan {inner}"),
                    ChanDir::Both if matches!(**elem, TypeRef::Chan { dir: ChanDir::Recv, .. }) => {
                        format!("chan ({inner})")
                    }
                    ChanDir::Both => format!("chan {inner}"),
                }
            }
            TypeRef::Literal(text) => text.clone(),
            TypeRef::Struct(fields) => {
                if fields.is_empty() {
                    "struct{}".to_string()
                } else {
                    format!("struct{{ {} }}", self.format_struct_fields(fields).join("; "))
                }
            }
            TypeRef::Interface(elems) => {
                let elems = self.format_interface_elems(elems);
                if elems.is_empty() {
                    OPAQUE_TYPE.to_string()
                } else {
                    format!("interface{{ {} }}", elems.join("; "))
                }
            }
            TypeRef::Instantiated { base, args } => {
                let base_text = self.format(base);
                if self.allowed.is_some() && base_text == OPAQUE_TYPE {
                    return base_text;
                }
                let args = args
                    .iter()
                    .map(|arg| self.format(arg))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{base_text}[{args}]")
            }
            TypeRef::Union(terms) => terms
                .iter()
                .map(|term| self.format(term))
                .collect::<Vec<_>>()
                .join(" | "),
            TypeRef::Tilde(inner) => format!("~{}", self.format(inner)),
            TypeRef::Unsupported(text) => match self.allowed {
                Some(_) => OPAQUE_TYPE.to_string(),
                None => text.clone(),
            },
        }
    }

    /// A parameter list without the enclosing parentheses: `a, b int, c string`.
    pub fn format_params(&self, fields: &[Field]) -> String {
        fields
            .iter()
            .map(|field| self.format_field(field))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// `[K, V comparable, T any]`, or nothing without type parameters.
    pub fn format_type_params(&self, fields: &[Field]) -> String {
        if fields.is_empty() {
            String::new()
        } else {
            format!("[{}]", self.format_params(fields))
        }
    }

    /// The result list including its leading space, or nothing without results.
    pub fn format_results(&self, results: Option<&[Field]>) -> String {
        match results {
            None => String::new(),
            Some([]) if self.allowed.is_none() => String::new(),
            Some([single]) if self.allowed.is_none() && single.names.is_empty() => {
                format!(" {}", self.format(&single.ty))
            }
            Some(fields) => format!(" ({})", self.format_params(fields)),
        }
    }

    /// `(params) results` of a signature; type parameters are rendered separately.
    pub fn format_signature(&self, sig: &FuncType) -> String {
        format!(
            "({}){}",
            self.format_params(&sig.params),
            self.format_results(sig.results.as_deref())
        )
    }

    /// One line per struct field. Under erasure an embedded field that erases becomes
    /// [`EMBED_SENTINEL`]; any further one is dropped since a struct cannot embed a type twice.
    pub fn format_struct_fields(&self, fields: &[Field]) -> Vec<String> {
        let mut sentinel_used = false;
        let mut lines = Vec::new();
        for field in fields {
            if field.is_embedded() && self.erases(&field.ty) {
                if sentinel_used {
                    debug!("dropping second erased embedded field {}", self.format(&field.ty));
                    continue;
                }
                sentinel_used = true;
                lines.push(EMBED_SENTINEL.to_string());
            } else {
                lines.push(self.format_field(field));
            }
        }
        lines
    }

    /// Interface entries as source lines. Under erasure only methods are kept.
    pub fn format_interface_elems(&self, elems: &[InterfaceElem]) -> Vec<String> {
        elems
            .iter()
            .filter_map(|elem| match elem {
                InterfaceElem::Method { name, signature } => {
                    Some(format!("{name}{}", self.format_signature(signature)))
                }
                InterfaceElem::Embedded(ty) if self.allowed.is_none() => Some(self.format(ty)),
                InterfaceElem::Embedded(ty) => {
                    debug!("dropping embedded interface element {}", self.format(ty));
                    None
                }
            })
            .collect()
    }

    fn format_field(&self, field: &Field) -> String {
        let ty = self.format(&field.ty);
        if field.names.is_empty() {
            ty
        } else {
            format!("{} {ty}", field.names.join(", "))
        }
    }
}
