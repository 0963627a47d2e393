//! Go build constraints: `//go:build` expressions and `_GOOS_GOARCH` file-name suffixes.

use std::env::consts;

const KNOWN_OS: &[&str] = &[
    "aix", "android", "darwin", "dragonfly", "freebsd", "hurd", "illumos", "ios", "js", "linux",
    "nacl", "netbsd", "openbsd", "plan9", "solaris", "wasip1", "windows", "zos",
];

const KNOWN_ARCH: &[&str] = &[
    "386", "amd64", "amd64p32", "arm", "armbe", "arm64", "arm64be", "loong64", "mips", "mipsle",
    "mips64", "mips64le", "mips64p32", "mips64p32le", "ppc", "ppc64", "ppc64le", "riscv",
    "riscv64", "s390", "s390x", "sparc", "sparc64", "wasm",
];

const UNIX_OS: &[&str] = &[
    "aix", "android", "darwin", "dragonfly", "freebsd", "hurd", "illumos", "ios", "linux",
    "netbsd", "openbsd", "solaris",
];

/// The target a package is loaded for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildContext {
    /// `GOOS` value.
    pub goos: String,
    /// `GOARCH` value.
    pub goarch: String,
    /// Extra tags satisfied in `//go:build` lines.
    pub tags: Vec<String>,
}

impl Default for BuildContext {
    fn default() -> Self {
        Self::host()
    }
}

impl BuildContext {
    /// A context for `goos`/`goarch` with no extra tags.
    pub fn new(goos: impl Into<String>, goarch: impl Into<String>) -> Self {
        Self {
            goos: goos.into(),
            goarch: goarch.into(),
            tags: Vec::new(),
        }
    }

    /// The machine we are running on, spelled the way Go spells it.
    pub fn host() -> Self {
        let goos = match consts::OS {
            "macos" => "darwin",
            os => os,
        };
        let goarch = match consts::ARCH {
            "x86_64" => "amd64",
            "x86" => "386",
            "aarch64" => "arm64",
            "loongarch64" => "loong64",
            "powerpc64" => "ppc64",
            "wasm32" => "wasm",
            arch => arch,
        };
        Self::new(goos, goarch)
    }

    /// Adds build tags.
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Whether a single build tag holds for this context.
    pub fn matches_tag(&self, tag: &str) -> bool {
        if tag == self.goos || tag == self.goarch || self.tags.iter().any(|t| t == tag) {
            return true;
        }
        match tag {
            "gc" => true,
            "unix" => UNIX_OS.contains(&self.goos.as_str()),
            "linux" => self.goos == "android",
            "solaris" => self.goos == "illumos",
            "darwin" => self.goos == "ios",
            // Release tags: every go1.N is assumed to be satisfied.
            _ => tag
                .strip_prefix("go1.")
                .is_some_and(|minor| !minor.is_empty() && minor.bytes().all(|b| b.is_ascii_digit())),
        }
    }

    /// Apply the `name_GOOS_GOARCH.go` rules. Everything before the first `_` is ignored, and a
    /// trailing `_test` is stripped before the suffixes are examined.
    pub fn matches_file_name(&self, file_name: &str) -> bool {
        let stem = file_name.split('.').next().unwrap_or(file_name);
        let Some(underscore) = stem.find('_') else {
            return true;
        };
        let mut parts: Vec<&str> = stem[underscore..].split('_').collect();
        if parts.last() == Some(&"test") {
            parts.pop();
        }
        match parts.as_slice() {
            [.., os, arch] if KNOWN_OS.contains(os) && KNOWN_ARCH.contains(arch) => {
                self.matches_tag(os) && self.matches_tag(arch)
            }
            [.., last] if KNOWN_OS.contains(last) || KNOWN_ARCH.contains(last) => {
                self.matches_tag(last)
            }
            _ => true,
        }
    }

    /// Evaluate the `//go:build` line of a source file, if any. Only the header before the
    /// package clause is consulted.
    pub fn matches_source(&self, src: &str) -> Result<bool, String> {
        for line in src.lines() {
            let line = line.trim();
            if line.starts_with("package ") || line == "package" {
                break;
            }
            if let Some(expr) = line.strip_prefix("//go:build") {
                if !expr.is_empty() && !expr.starts_with([' ', '\t']) {
                    continue;
                }
                return self.eval(expr);
            }
        }
        Ok(true)
    }

    /// Evaluate a build constraint expression.
    pub fn eval(&self, expr: &str) -> Result<bool, String> {
        let tokens = tokens(expr)?;
        let mut parser = ExprParser {
            ctx: self,
            tokens: &tokens,
            pos: 0,
        };
        let value = parser.or()?;
        match tokens.get(parser.pos) {
            None => Ok(value),
            Some(token) => Err(format!("unexpected {token:?} in build constraint")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ExprToken<'a> {
    Tag(&'a str),
    Not,
    And,
    Or,
    Open,
    Close,
}

fn tokens(expr: &str) -> Result<Vec<ExprToken<'_>>, String> {
    let mut out = Vec::new();
    let mut rest = expr.trim_start();
    while !rest.is_empty() {
        let (token, len) = if rest.starts_with("&&") {
            (ExprToken::And, 2)
        } else if rest.starts_with("||") {
            (ExprToken::Or, 2)
        } else if rest.starts_with('!') {
            (ExprToken::Not, 1)
        } else if rest.starts_with('(') {
            (ExprToken::Open, 1)
        } else if rest.starts_with(')') {
            (ExprToken::Close, 1)
        } else {
            let len = rest
                .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '.'))
                .unwrap_or(rest.len());
            if len == 0 {
                return Err(format!("invalid character in build constraint: {rest:?}"));
            }
            (ExprToken::Tag(&rest[..len]), len)
        };
        out.push(token);
        rest = rest[len..].trim_start();
    }
    Ok(out)
}

struct ExprParser<'a, 'ctx> {
    ctx: &'ctx BuildContext,
    tokens: &'a [ExprToken<'a>],
    pos: usize,
}

impl ExprParser<'_, '_> {
    fn or(&mut self) -> Result<bool, String> {
        let mut value = self.and()?;
        while self.tokens.get(self.pos) == Some(&ExprToken::Or) {
            self.pos += 1;
            // Evaluate both sides so syntax errors on the right are still reported.
            let rhs = self.and()?;
            value = value || rhs;
        }
        Ok(value)
    }

    fn and(&mut self) -> Result<bool, String> {
        let mut value = self.not()?;
        while self.tokens.get(self.pos) == Some(&ExprToken::And) {
            self.pos += 1;
            let rhs = self.not()?;
            value = value && rhs;
        }
        Ok(value)
    }

    fn not(&mut self) -> Result<bool, String> {
        match self.tokens.get(self.pos) {
            Some(ExprToken::Not) => {
                self.pos += 1;
                Ok(!self.not()?)
            }
            Some(ExprToken::Open) => {
                self.pos += 1;
                let value = self.or()?;
                if self.tokens.get(self.pos) != Some(&ExprToken::Close) {
                    return Err("missing ')' in build constraint".to_string());
                }
                self.pos += 1;
                Ok(value)
            }
            Some(ExprToken::Tag(tag)) => {
                self.pos += 1;
                Ok(self.ctx.matches_tag(tag))
            }
            Some(token) => Err(format!("unexpected {token:?} in build constraint")),
            None => Err("unexpected end of build constraint".to_string()),
        }
    }
}
