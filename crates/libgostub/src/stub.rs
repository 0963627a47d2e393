//! Turns parsed declarations into stub source text.

use tracing::{debug, trace};

use crate::ast::{Decl, FuncDecl, SourceFile, TypeRef, TypeSpec, ValueSpec};
use crate::error::{GostubError, Result};
use crate::format::{ImportAllowSet, TypeFormatter};
use crate::keywords::is_exported;
use crate::overrides::{FunctionBodies, OverrideKey};

/// Body of every function without an override.
pub const DEFAULT_BODY: &str = "panic(\"stub\")";

/// Renders the declarations of one package into a shared buffer.
pub struct Stubber<'a> {
    package: &'a str,
    formatter: TypeFormatter<'a>,
    bodies: &'a FunctionBodies,
}

impl<'a> Stubber<'a> {
    /// A stubber for `package` that keeps only references to `allowed` packages.
    pub fn new(package: &'a str, allowed: &'a ImportAllowSet, bodies: &'a FunctionBodies) -> Self {
        Self {
            package,
            formatter: TypeFormatter::erasing(allowed),
            bodies,
        }
    }

    /// Emit every const and var of `file` that keeps a literal value or a usable type.
    pub fn stub_values(&self, file: &SourceFile, out: &mut String) {
        for decl in &file.decls {
            match decl {
                Decl::Const(specs) => specs.iter().for_each(|s| self.stub_value("const", s, out)),
                Decl::Var(specs) => specs.iter().for_each(|s| self.stub_value("var", s, out)),
                _ => {}
            }
        }
    }

    fn stub_value(&self, keyword: &str, spec: &ValueSpec, out: &mut String) {
        let ty = spec.ty.as_ref();
        let kept_ty = ty.filter(|ty| !self.formatter.erases(ty));
        for (i, name) in spec.names.iter().enumerate() {
            trace!("stubbing {keyword} {name}");
            let value = if spec.values.len() == spec.names.len() {
                spec.values.get(i)
            } else {
                spec.values.first()
            };
            match (value, ty) {
                (Some(value), _) if value.literal => {
                    let ty = kept_ty
                        .map(|ty| format!(" {}", self.formatter.format(ty)))
                        .unwrap_or_default();
                    out.push_str(&format!("{keyword} {name}{ty} = {}\n\n", value.text));
                }
                (_, Some(ty)) if keyword == "var" => {
                    out.push_str(&format!("var {name} {}\n\n", self.formatter.format(ty)));
                }
                _ => debug!(
                    "omitting {keyword} {}.{name}: value is not a literal",
                    self.package
                ),
            }
        }
    }

    /// Emit type declarations in the order given.
    pub fn stub_types<'t>(&self, specs: impl IntoIterator<Item = &'t TypeSpec>, out: &mut String) {
        for spec in specs {
            self.stub_type(spec, out);
        }
    }

    fn stub_type(&self, spec: &TypeSpec, out: &mut String) {
        let name = &spec.name;
        let params = self.formatter.format_type_params(&spec.type_params);
        if spec.alias {
            trace!("stubbing alias {name}");
            out.push_str(&format!(
                "type {name}{params} = {}\n\n",
                self.formatter.format(&spec.ty)
            ));
            return;
        }
        match &spec.ty {
            TypeRef::Struct(fields) => {
                trace!("stubbing struct {name}");
                let lines = self.formatter.format_struct_fields(fields);
                out.push_str(&format!("type {name}{params} {}\n\n", block("struct", &lines)));
            }
            TypeRef::Interface(elems) => {
                trace!("stubbing interface {name}");
                let lines = self.formatter.format_interface_elems(elems);
                out.push_str(&format!("type {name}{params} {}\n\n", block("interface", &lines)));
            }
            ty => {
                trace!("stubbing type {name}");
                out.push_str(&format!(
                    "type {name}{params} {}\n\n",
                    self.formatter.format(ty)
                ));
            }
        }
    }

    /// Emit every exported function and method of `file`.
    pub fn stub_functions(&self, file: &SourceFile, out: &mut String) -> Result<()> {
        for decl in &file.decls {
            if let Decl::Func(func) = decl {
                self.stub_function(func, out)?;
            }
        }
        Ok(())
    }

    fn stub_function(&self, func: &FuncDecl, out: &mut String) -> Result<()> {
        let mut receiver = None;
        if let Some(recv) = &func.recv {
            let [field] = recv.as_slice() else {
                return Err(self.malformed(func, format!("{} receiver parameters", recv.len())));
            };
            match field.names.as_slice() {
                [] => {
                    debug!("skipping {}.{}: unnamed receiver", self.package, func.name);
                    return Ok(());
                }
                [_] => receiver = Some(field),
                names => {
                    return Err(self.malformed(func, format!("{} receiver names", names.len())));
                }
            }
        }
        if !is_exported(&func.name) {
            return Ok(());
        }

        let mut signature = String::from("func ");
        let mut key = OverrideKey::function(self.package, &func.name);
        if let Some(field) = receiver {
            signature.push_str(&format!(
                "({} {}) ",
                field.names.join(", "),
                self.formatter.format(&field.ty)
            ));
            key.receiver = field.ty.receiver_base_name().map(str::to_string);
        }
        signature.push_str(&func.name);
        signature.push_str(&self.formatter.format_type_params(&func.signature.type_params));
        signature.push_str(&self.formatter.format_signature(&func.signature));

        trace!("stubbing function {key}");
        let body = match self.bodies.get(&key) {
            Some(body) => {
                trace!("using stub body for {key}");
                body
            }
            None => DEFAULT_BODY,
        };
        out.push_str(&format!("{signature} {{\n{body}\n}}\n\n"));
        Ok(())
    }

    fn malformed(&self, func: &FuncDecl, message: String) -> GostubError {
        GostubError::MalformedReceiver {
            package: self.package.to_string(),
            function: func.name.clone(),
            message,
        }
    }
}

/// `struct {...}` or `interface {...}` with one entry per line; `struct{}` when empty.
fn block(keyword: &str, lines: &[String]) -> String {
    if lines.is_empty() {
        return format!("{keyword}{{}}");
    }
    let mut text = format!("{keyword} {{\n");
    for line in lines {
        text.push('\t');
        text.push_str(line);
        text.push('\n');
    }
    text.push('}');
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_file;
    use pretty_assertions::assert_eq;

    fn allowed() -> ImportAllowSet {
        ["io", "os"].into_iter().collect()
    }

    fn stub(src: &str, bodies: &FunctionBodies) -> Result<String> {
        let file = parse_file(src).unwrap();
        let allowed = allowed();
        let stubber = Stubber::new(&file.package, &allowed, bodies);
        let mut out = String::new();
        stubber.stub_values(&file, &mut out);
        let types = file.decls.iter().flat_map(|d| match d {
            Decl::Type(specs) => specs.iter().collect::<Vec<_>>(),
            _ => Vec::new(),
        });
        stubber.stub_types(types, &mut out);
        stubber.stub_functions(&file, &mut out)?;
        Ok(out)
    }

    #[test]
    fn test_values() {
        let out = stub(
            r#"package main
var (
	var1 = "somevalue"
	Var2 = "someOtherValue"
)
const Const1, const2 = 0, 1
const A, B = 7
var Count int
var Err = errors.New("x")
var Timeout time.Duration = 5
var Started time.Time
const Neg = -1
const Computed = 1 << 3
var Reader io.Reader
var Any interface{} = 5
"#,
            &FunctionBodies::new(),
        )
        .unwrap();
        assert_eq!(
            out,
            r#"var var1 = "somevalue"

var Var2 = "someOtherValue"

const Const1 = 0

const const2 = 1

const A = 7

const B = 7

var Count int

var Timeout = 5

var Started interface{}

const Neg = -1

var Reader io.Reader

var Any interface{} = 5

"#
        );
    }

    #[test]
    fn test_types() {
        let out = stub(
            r#"package types
type MyStruct struct {
	MyEmbeddedStruct
	corev1.PodSpec
	Name     string
	Pointer  *os.File
	Pod      corev1.Pod
}
type MyEmbeddedStruct struct{}
type MyInterface interface {
	io.Closer
	GetPodName(pod *corev1.Pod) string
}
type Empty interface{}
type List[T any] []T
type Reader = io.Reader
type External = corev1.Pod
"#,
            &FunctionBodies::new(),
        )
        .unwrap();
        assert_eq!(
            out,
            r#"type MyStruct struct {
	MyEmbeddedStruct
	Embedme
	Name string
	Pointer *os.File
	Pod interface{}
}

type MyEmbeddedStruct struct{}

type MyInterface interface {
	GetPodName(pod interface{}) (string)
}

type Empty interface{}

type List[T any] []T

type Reader = io.Reader

type External = interface{}

"#
        );
    }

    #[test]
    fn test_functions() {
        let bodies = FunctionBodies::from_pairs([
            ("funcs.Bar", r#"panic("i don't like generics")"#),
            ("funcs.(*S).Get", "return \"x\""),
        ])
        .unwrap();
        let out = stub(
            r#"package funcs
func foo(pod *corev1.Pod) string { return pod.Name }
func Bar[T1 any, T2 int](t1 []T1, t2 T2) T2 { return t2 }
func Baz(pod *corev1.Pod, writer io.Writer, str string) error { return nil }
func (s *S) Get() string { return s.v }
func (s *S) get() string { return s.v }
func (S) Unnamed() {}
func Variadic(prefix string, args ...interface{}) {}
"#,
            &bodies,
        )
        .unwrap();
        assert_eq!(
            out,
            r#"func Bar[T1 any, T2 int](t1 []T1, t2 T2) (T2) {
panic("i don't like generics")
}

func Baz(pod interface{}, writer io.Writer, str string) (error) {
panic("stub")
}

func (s *S) Get() (string) {
return "x"
}

func Variadic(prefix string, args ...interface{}) {
panic("stub")
}

"#
        );
    }

    #[test]
    fn test_malformed_receivers() {
        let bodies = FunctionBodies::new();
        let err = stub("package p\nfunc (a, b S) M() {}\n", &bodies).unwrap_err();
        assert!(matches!(err, GostubError::MalformedReceiver { .. }));
        let err = stub("package p\nfunc (a S, b T) M() {}\n", &bodies).unwrap_err();
        assert!(matches!(err, GostubError::MalformedReceiver { .. }));
    }
}
