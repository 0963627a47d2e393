//! Canonical, gofmt-style printing of a parsed file.
//!
//! Declarations are printed one per block with a blank line in between. Struct field names are
//! aligned across each run of named fields. Function bodies are not parsed; they are dedented
//! and re-indented by one tab.

use crate::ast::{Decl, Field, FuncDecl, Import, SourceFile, TypeRef, TypeSpec, ValueSpec};
use crate::format::TypeFormatter;

/// Whether an import path belongs to the standard library: its first element has no dot.
pub fn is_std_path(path: &str) -> bool {
    path != "C" && !path.split('/').next().unwrap_or(path).contains('.')
}

/// Print `file` canonically. Imports are printed in the order given, with a blank line wherever
/// the list switches between standard-library and other paths.
pub fn print_file(file: &SourceFile) -> String {
    let mut blocks = vec![format!("package {}", file.package)];
    if !file.imports.is_empty() {
        blocks.push(print_imports(&file.imports));
    }
    for decl in &file.decls {
        blocks.push(print_decl(decl));
    }
    let mut out = blocks.join("\n\n");
    out.push('\n');
    out
}

fn print_imports(imports: &[Import]) -> String {
    if let [import] = imports {
        return format!("import {}", print_import(import));
    }
    let mut out = String::from("import (\n");
    let mut previous: Option<bool> = None;
    for import in imports {
        let std = is_std_path(&import.path);
        if previous.is_some_and(|p| p != std) {
            out.push('\n');
        }
        previous = Some(std);
        out.push('\t');
        out.push_str(&print_import(import));
        out.push('\n');
    }
    out.push(')');
    out
}

fn print_import(import: &Import) -> String {
    match &import.alias {
        Some(alias) => format!("{alias} \"{}\"", import.path),
        None => format!("\"{}\"", import.path),
    }
}

fn print_decl(decl: &Decl) -> String {
    match decl {
        Decl::Const(specs) => print_group("const", specs, print_value_spec),
        Decl::Var(specs) => print_group("var", specs, print_value_spec),
        Decl::Type(specs) => print_group("type", specs, print_type_spec),
        Decl::Func(func) => print_func(func),
    }
}

fn print_group<T>(keyword: &str, specs: &[T], print: impl Fn(&T) -> String) -> String {
    if let [spec] = specs {
        return format!("{keyword} {}", print(spec));
    }
    let mut out = format!("{keyword} (\n");
    for spec in specs {
        out.push_str(&indent(&print(spec)));
        out.push('\n');
    }
    out.push(')');
    out
}

fn print_value_spec(spec: &ValueSpec) -> String {
    let f = TypeFormatter::verbatim();
    let mut out = spec.names.join(", ");
    if let Some(ty) = &spec.ty {
        out.push(' ');
        out.push_str(&print_type(&f, ty));
    }
    if !spec.values.is_empty() {
        let values: Vec<&str> = spec.values.iter().map(|v| v.text.as_str()).collect();
        out.push_str(" = ");
        out.push_str(&values.join(", "));
    }
    out
}

fn print_type_spec(spec: &TypeSpec) -> String {
    let f = TypeFormatter::verbatim();
    let assign = if spec.alias { " =" } else { "" };
    format!(
        "{}{}{assign} {}",
        spec.name,
        f.format_type_params(&spec.type_params),
        print_type(&f, &spec.ty)
    )
}

/// Top-level struct and interface bodies span several lines; every other type prints inline.
fn print_type(f: &TypeFormatter<'_>, ty: &TypeRef) -> String {
    match ty {
        TypeRef::Struct(fields) if !fields.is_empty() => {
            format!("struct {{\n{}}}", aligned_fields(f, fields))
        }
        TypeRef::Interface(elems) if !elems.is_empty() => {
            let mut out = String::from("interface {\n");
            for line in f.format_interface_elems(elems) {
                out.push('\t');
                out.push_str(&line);
                out.push('\n');
            }
            out.push('}');
            out
        }
        ty => f.format(ty),
    }
}

/// One tab-indented line per field; the type column is aligned within each run of named fields.
fn aligned_fields(f: &TypeFormatter<'_>, fields: &[Field]) -> String {
    let names: Vec<String> = fields.iter().map(|field| field.names.join(", ")).collect();
    let mut out = String::new();
    let mut i = 0;
    while i < fields.len() {
        if fields[i].is_embedded() {
            out.push_str(&format!("\t{}\n", f.format(&fields[i].ty)));
            i += 1;
            continue;
        }
        let run_end = (i..fields.len())
            .find(|&j| fields[j].is_embedded())
            .unwrap_or(fields.len());
        let width = names[i..run_end]
            .iter()
            .map(|n| n.chars().count())
            .max()
            .unwrap_or(0);
        for j in i..run_end {
            let pad = width + 1 - names[j].chars().count();
            out.push_str(&format!(
                "\t{}{}{}\n",
                names[j],
                " ".repeat(pad),
                f.format(&fields[j].ty)
            ));
        }
        i = run_end;
    }
    out
}

fn print_func(func: &FuncDecl) -> String {
    let f = TypeFormatter::verbatim();
    let mut out = String::from("func ");
    if let Some(recv) = &func.recv {
        out.push_str(&format!("({}) ", f.format_params(recv)));
    }
    out.push_str(&func.name);
    out.push_str(&f.format_type_params(&func.signature.type_params));
    out.push_str(&f.format_signature(&func.signature));
    if let Some(body) = &func.body {
        out.push(' ');
        out.push_str(&print_body(body));
    }
    out
}

/// Re-indent raw body text one tab deep, keeping relative indentation between lines.
fn print_body(body: &str) -> String {
    let lines: Vec<&str> = body.lines().map(str::trim_end).collect();
    let first = lines.iter().position(|l| !l.is_empty());
    let last = lines.iter().rposition(|l| !l.is_empty());
    let (Some(first), Some(last)) = (first, last) else {
        let empty = if body.contains('\n') { "{\n}" } else { "{}" };
        return empty.to_string();
    };
    let lines = &lines[first..=last];

    let common = lines
        .iter()
        .filter(|l| !l.is_empty())
        .map(|l| leading_whitespace(l))
        .reduce(common_prefix)
        .unwrap_or("");

    let mut out = String::from("{\n");
    for line in lines {
        if !line.is_empty() {
            out.push('\t');
            out.push_str(line.strip_prefix(common).unwrap_or(line));
        }
        out.push('\n');
    }
    out.push('}');
    out
}

fn leading_whitespace(line: &str) -> &str {
    let end = line.len() - line.trim_start_matches([' ', '\t']).len();
    &line[..end]
}

fn common_prefix<'a>(a: &'a str, b: &str) -> &'a str {
    let len = a
        .bytes()
        .zip(b.bytes())
        .take_while(|(x, y)| x == y)
        .count();
    &a[..len]
}

fn indent(text: &str) -> String {
    text.lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("\t{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
