// Dead code detection breaks here, because the integration test crates all use a disjoint set of
// the pub items.
#![allow(dead_code)]

use libgostub::Gostub;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Module path of the fixture module.
pub const TESTMOD: &str = "github.com/gostubpkg/testmod";

/// Module path of the scratch modules built from snippets.
pub const SCRATCH: &str = "example.com/scratch";

pub fn testmod_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/testdata/testmod")
}

/// Runs generation over the fixture module into a fresh output directory.
pub fn generate_testmod(patterns: &[&str], configure: impl FnOnce(Gostub) -> Gostub) -> TempDir {
    let out = TempDir::new().unwrap();
    let gostub = configure(Gostub::new(testmod_dir()).with_output_dir(out.path()));
    let patterns: Vec<String> = patterns.iter().map(|p| p.to_string()).collect();
    gostub.generate(&patterns).unwrap();
    out
}

/// Path of a generated file, relative to the fixture module's output root.
pub fn output_file(out: &TempDir, relative: &str) -> PathBuf {
    out.path().join(TESTMOD).join(relative)
}

pub fn exists(out: &TempDir, relative: &str) -> bool {
    output_file(out, relative).is_file()
}

pub fn read(out: &TempDir, relative: &str) -> String {
    fs::read_to_string(output_file(out, relative)).unwrap()
}

/// Trim every line and drop blank ones, so expectations can be indented freely.
fn normalize_whitespace(s: &str) -> String {
    s.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Drop the package clause and the trailing sentinel declaration every stub ends with.
fn strip_frame(s: &str) -> String {
    let lines: Vec<&str> = s.lines().filter(|line| !line.trim().is_empty()).collect();
    if lines.len() <= 2 {
        return String::new();
    }
    assert_eq!(lines[lines.len() - 1], "type Embedme interface{}");
    lines[1..lines.len() - 1].join("\n")
}

/// Writes `source` as the only file of a scratch module and returns the module directory.
pub fn scratch_module(source: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("go.mod"),
        format!("module {SCRATCH}\n\ngo 1.21\n"),
    )
    .unwrap();
    fs::write(dir.path().join("stub.go"), format!("package stub\n\n{source}")).unwrap();
    dir
}

/// Renders a snippet with the given generator settings.
pub fn render_with(configure: impl FnOnce(Gostub) -> Gostub, source: &str) -> libgostub::Result<String> {
    let dir = scratch_module(source);
    let gostub = configure(Gostub::new(dir.path()));
    let mut rendered = gostub.render(&[".".to_string()])?;
    assert_eq!(rendered.len(), 1);
    let (path, source) = rendered.remove(0);
    assert_eq!(path, SCRATCH);
    Ok(source)
}

pub fn render(configure: impl FnOnce(Gostub) -> Gostub, source: &str, expected_output: &str) {
    let rendered = render_with(configure, source).unwrap();
    assert!(rendered.starts_with("package stub\n"), "{rendered}");
    assert_eq!(
        normalize_whitespace(&strip_frame(&rendered)),
        normalize_whitespace(expected_output),
    );
}

pub fn render_err(configure: impl FnOnce(Gostub) -> Gostub, source: &str, expected_error: &str) {
    let result = render_with(configure, source);
    assert!(result.is_err(), "Expected an error, but rendering succeeded");
    let error_string = result.unwrap_err().to_string();
    assert!(
        error_string.contains(expected_error),
        "Error mismatch.\nExpected: {expected_error}\nGot: {error_string}"
    );
}

/// Stubbing leaves the snippet unchanged.
pub fn rt_idemp(source: &str) {
    render(|g| g, source, source);
}

/// Stub roundtrip with default settings.
pub fn rt(source: &str, expected_output: &str) {
    render(|g| g, source, expected_output);
}

#[macro_export]
macro_rules! gen_tests {
    ($prefix:ident, {
        $(idemp {
            $idemp_name:ident: $input:expr
        })*
        $(rt {
            $rt_name:ident: {
                input: $rt_input:expr,
                output: $rt_output:expr
            }
        })*
        $(rt_custom {
            $rt_custom_name:ident: {
                gostub: $rt_custom_gostub:expr,
                input: $rt_custom_input:expr,
                output: $rt_custom_output:expr
            }
        })*
        $(rt_err {
            $rt_err_name:ident: {
                gostub: $rt_err_gostub:expr,
                input: $rt_err_input:expr,
                error: $rt_err_error:expr
            }
        })*
    }) => {
        mod $prefix {
            use super::*;

            $(
                #[test]
                fn $idemp_name() {
                    rt_idemp($input);
                }
            )*

            $(
                #[test]
                fn $rt_name() {
                    rt($rt_input, $rt_output);
                }
            )*

            $(
                #[test]
                fn $rt_custom_name() {
                    render($rt_custom_gostub, $rt_custom_input, $rt_custom_output);
                }
            )*

            $(
                #[test]
                fn $rt_err_name() {
                    render_err($rt_err_gostub, $rt_err_input, $rt_err_error);
                }
            )*
        }
    };
}
