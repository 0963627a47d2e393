//! Syntax model for the parts of a Go source file that a stub needs.
//!
//! Function bodies and initializer expressions are kept as raw text; everything that can appear
//! in a signature is modelled structurally through [`TypeRef`].

use crate::keywords::is_identifier;

/// A parsed Go source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Name from the `package` clause.
    pub package: String,
    /// Imports in source order.
    pub imports: Vec<Import>,
    /// Top-level declarations other than imports, in source order.
    pub decls: Vec<Decl>,
    /// True when a `// Code generated ... DO NOT EDIT.` line precedes the package clause.
    pub generated: bool,
}

/// A single import spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    /// Explicit name, including `.` and `_`.
    pub alias: Option<String>,
    /// Unquoted import path.
    pub path: String,
}

impl Import {
    /// The name this import binds in the importing file: the alias, else the last path
    /// element when it is an identifier, else the `goimports` guess. Blank and dot imports
    /// bind nothing.
    pub fn bound_name(&self) -> Option<String> {
        match self.alias.as_deref() {
            Some("_" | ".") => None,
            Some(alias) => Some(alias.to_string()),
            None => {
                let last = self.path.rsplit('/').next().unwrap_or(&self.path);
                if is_identifier(last) {
                    return Some(last.to_string());
                }
                Some(assumed_package_name(&self.path)).filter(|name| !name.is_empty())
            }
        }
    }
}

/// Guess the package name of an import path the way `goimports` does: the last path element,
/// skipping a trailing major-version element and stripping common `go-` decorations.
pub fn assumed_package_name(path: &str) -> String {
    let mut elems = path.rsplit('/');
    let mut last = elems.next().unwrap_or(path);
    if is_version_element(last)
        && let Some(previous) = elems.next()
    {
        last = previous;
    }
    let last = last.strip_prefix("go-").unwrap_or(last);
    let end = last
        .find(|c: char| !(c == '_' || c.is_alphanumeric()))
        .unwrap_or(last.len());
    last[..end].to_string()
}

fn is_version_element(elem: &str) -> bool {
    elem.strip_prefix('v')
        .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
}

/// A top-level declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decl {
    /// `const` declaration, possibly grouped.
    Const(Vec<ValueSpec>),
    /// `var` declaration, possibly grouped.
    Var(Vec<ValueSpec>),
    /// `type` declaration, possibly grouped.
    Type(Vec<TypeSpec>),
    /// Function or method.
    Func(FuncDecl),
}

/// One line of a const or var declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueSpec {
    /// Declared names, left to right.
    pub names: Vec<String>,
    /// Explicit type, if any.
    pub ty: Option<TypeRef>,
    /// Initializers; empty when there are none.
    pub values: Vec<Expr>,
}

/// An initializer expression, kept as source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expr {
    /// Source text.
    pub text: String,
    /// A basic literal, optionally a signed numeric one.
    pub literal: bool,
}

/// `type Name[Params] Type` or `type Name = Type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSpec {
    /// Declared name.
    pub name: String,
    /// Type parameters; empty for non-generic types.
    pub type_params: Vec<Field>,
    /// True for `type Name = Type`.
    pub alias: bool,
    /// The right-hand side.
    pub ty: TypeRef,
}

/// A function or method declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncDecl {
    /// Receiver fields; `None` for plain functions.
    pub recv: Option<Vec<Field>>,
    /// Function or method name.
    pub name: String,
    /// Type parameters, parameters and results.
    pub signature: FuncType,
    /// Text between the body braces, if there is a body.
    pub body: Option<String>,
}

/// A signature: type parameters (functions only), parameters and results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FuncType {
    /// Type parameters.
    pub type_params: Vec<Field>,
    /// Parameters, grouped as written.
    pub params: Vec<Field>,
    /// `None` when the signature declares no results at all.
    pub results: Option<Vec<Field>>,
}

/// A named or anonymous entry in a parameter list, struct or type parameter list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Empty for unnamed parameters and embedded struct fields.
    pub names: Vec<String>,
    /// Type of every name.
    pub ty: TypeRef,
}

impl Field {
    /// A field or parameter group sharing one type.
    pub fn new(names: Vec<String>, ty: TypeRef) -> Self {
        Self { names, ty }
    }

    /// An unnamed parameter or embedded field.
    pub fn anonymous(ty: TypeRef) -> Self {
        Self { names: Vec::new(), ty }
    }

    /// True for embedded fields and unnamed parameters.
    pub fn is_embedded(&self) -> bool {
        self.names.is_empty()
    }
}

/// An entry of an interface type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterfaceElem {
    /// A method with its signature.
    Method {
        /// Method name.
        name: String,
        /// Method signature.
        signature: FuncType,
    },
    /// Embedded interface or type-set term.
    Embedded(TypeRef),
}

/// Direction of a channel type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChanDir {
    /// `chan T`
    Both,
    /// `chan<- T`
    Send,
    /// `<-chan T`
    Recv,
}

/// A type expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    /// A predeclared or package-local type name.
    Ident(String),
    /// `package.Name`
    Qualified {
        /// Package qualifier.
        package: String,
        /// Type name.
        name: String,
    },
    /// `*T`
    Pointer(Box<TypeRef>),
    /// Array when `len` is present, slice otherwise.
    Array {
        /// Length expression.
        len: Option<Box<TypeRef>>,
        /// Element type.
        elem: Box<TypeRef>,
    },
    /// Variadic parameter type.
    Ellipsis(Box<TypeRef>),
    /// `func(...) ...`
    Func(FuncType),
    /// `map[K]V`
    Map {
        /// Key type.
        key: Box<TypeRef>,
        /// Value type.
        value: Box<TypeRef>,
    },
    /// Channel type.
    Chan {
        /// Direction.
        dir: ChanDir,
        /// Element type.
        elem: Box<TypeRef>,
    },
    /// Literal or constant expression text, such as an array length.
    Literal(String),
    /// Inline struct type.
    Struct(Vec<Field>),
    /// Inline interface type.
    Interface(Vec<InterfaceElem>),
    /// Generic instantiation, `Base[Args]`.
    Instantiated {
        /// Generic type.
        base: Box<TypeRef>,
        /// Type arguments.
        args: Vec<TypeRef>,
    },
    /// Type-set union in a constraint, `A | B`.
    Union(Vec<TypeRef>),
    /// Underlying-type term in a constraint, `~T`.
    Tilde(Box<TypeRef>),
    /// Source text of a shape the parser could not classify.
    Unsupported(String),
}

impl TypeRef {
    /// An unqualified type name.
    pub fn ident(name: impl Into<String>) -> Self {
        Self::Ident(name.into())
    }

    /// `package.name`
    pub fn qualified(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Qualified {
            package: package.into(),
            name: name.into(),
        }
    }

    /// `*inner`
    pub fn pointer(inner: Self) -> Self {
        Self::Pointer(Box::new(inner))
    }

    /// `[]elem`
    pub fn slice(elem: Self) -> Self {
        Self::Array {
            len: None,
            elem: Box::new(elem),
        }
    }

    /// The bare type name of a method receiver: `T`, `*T`, `T[K]` and `*T[K]` all yield `T`.
    pub fn receiver_base_name(&self) -> Option<&str> {
        match self {
            Self::Ident(name) => Some(name),
            Self::Pointer(inner) => inner.receiver_base_name(),
            Self::Instantiated { base, .. } => base.receiver_base_name(),
            _ => None,
        }
    }
}
