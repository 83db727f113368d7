//! Function-call search by name glob.

use regex::Regex;
use serde::Serialize;

use crate::ast::*;
use crate::error::SqlResult;

/// Case-insensitive glob over dotted function names. `*` matches any run
/// of characters and `?` exactly one.
#[derive(Debug, Clone)]
pub struct FunctionPattern {
    glob: String,
    regex: Regex,
}

impl FunctionPattern {
    pub fn new(glob: &str) -> SqlResult<Self> {
        let mut pattern = String::from("(?i)^");
        for c in glob.chars() {
            match c {
                '*' => pattern.push_str(".*"),
                '?' => pattern.push('.'),
                c => pattern.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
            }
        }
        pattern.push('$');
        Ok(Self {
            glob: glob.to_string(),
            regex: Regex::new(&pattern)?,
        })
    }

    pub fn glob(&self) -> &str {
        &self.glob
    }

    pub fn matches(&self, name: &ObjectName) -> bool {
        self.regex.is_match(&dotted(name))
    }
}

/// A call whose name matched a [`FunctionPattern`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionMatch {
    /// Lower-cased dotted name.
    pub name: String,
    /// Argument count; `count(*)` counts as one.
    pub arguments: usize,
}

/// Every call in `script` matching `pattern`, in source order.
pub fn find_functions(script: &Script, pattern: &FunctionPattern) -> Vec<FunctionMatch> {
    let mut finder = FunctionFinder {
        pattern,
        found: Vec::new(),
    };
    script.visit(&mut finder);
    tracing::debug!(glob = pattern.glob(), found = finder.found.len(), "function search");
    finder.found
}

struct FunctionFinder<'p> {
    pattern: &'p FunctionPattern,
    found: Vec<FunctionMatch>,
}

impl<'ast> Visitor<'ast> for FunctionFinder<'_> {
    fn pre_visit(&mut self, node: Node<'ast>) {
        if let Node::Function(call) = node
            && self.pattern.matches(&call.name)
        {
            let arguments = match &call.args {
                FunctionArgs::Star => 1,
                FunctionArgs::List(args) => args.len(),
            };
            self.found.push(FunctionMatch {
                name: dotted(&call.name).to_lowercase(),
                arguments,
            });
        }
    }
}

/// Name parts joined by `.`, without identifier quotes.
fn dotted(name: &ObjectName) -> String {
    name.0
        .iter()
        .map(|i| i.value.as_str())
        .collect::<Vec<_>>()
        .join(".")
}
