//! Flattening dotted component names into identifiers of the generated code.
//!
//! A dotted path such as `body.v` becomes `body__v`. If the result would
//! shadow a builtin, keyword or name imported by the generated module, a
//! trailing `_` is appended until it no longer does.

use std::collections::HashSet;
use std::sync::LazyLock;

/// Replaces the `.` path separator.
pub const PATH_SEPARATOR: &str = "__";

/// Appended to identifiers that collide with a reserved name.
pub const COLLISION_MARKER: char = '_';

/// Names the generated module must not shadow: the Python builtins, the
/// language keywords, and the names the generated header imports.
pub const RESERVED_IDENTIFIERS: &[&str] = &[
    // builtin functions and types
    "abs",
    "aiter",
    "all",
    "anext",
    "any",
    "ascii",
    "bin",
    "bool",
    "breakpoint",
    "bytearray",
    "bytes",
    "callable",
    "chr",
    "classmethod",
    "compile",
    "complex",
    "copyright",
    "credits",
    "delattr",
    "dict",
    "dir",
    "divmod",
    "enumerate",
    "eval",
    "exec",
    "exit",
    "filter",
    "float",
    "format",
    "frozenset",
    "getattr",
    "globals",
    "hasattr",
    "hash",
    "help",
    "hex",
    "id",
    "input",
    "int",
    "isinstance",
    "issubclass",
    "iter",
    "len",
    "license",
    "list",
    "locals",
    "map",
    "max",
    "memoryview",
    "min",
    "next",
    "object",
    "oct",
    "open",
    "ord",
    "pow",
    "print",
    "property",
    "quit",
    "range",
    "repr",
    "reversed",
    "round",
    "set",
    "setattr",
    "slice",
    "sorted",
    "staticmethod",
    "str",
    "sum",
    "super",
    "tuple",
    "type",
    "vars",
    "zip",
    // builtin constants and module attributes
    "Ellipsis",
    "False",
    "None",
    "NotImplemented",
    "True",
    "__build_class__",
    "__debug__",
    "__doc__",
    "__import__",
    "__loader__",
    "__name__",
    "__package__",
    "__spec__",
    // builtin exceptions
    "ArithmeticError",
    "AssertionError",
    "AttributeError",
    "BaseException",
    "EOFError",
    "Exception",
    "FloatingPointError",
    "ImportError",
    "IndexError",
    "KeyError",
    "LookupError",
    "MemoryError",
    "NameError",
    "NotImplementedError",
    "OSError",
    "OverflowError",
    "RuntimeError",
    "StopIteration",
    "SyntaxError",
    "SystemError",
    "TypeError",
    "ValueError",
    "ZeroDivisionError",
    // keywords
    "and",
    "as",
    "assert",
    "async",
    "await",
    "break",
    "class",
    "continue",
    "def",
    "del",
    "elif",
    "else",
    "except",
    "finally",
    "for",
    "from",
    "global",
    "if",
    "import",
    "in",
    "is",
    "lambda",
    "nonlocal",
    "not",
    "or",
    "pass",
    "raise",
    "return",
    "try",
    "while",
    "with",
    "yield",
    // imported by the generated header
    "sympy",
    "mech",
    "OdeModel",
    "sin",
    "cos",
    "tan",
    "psi",
    "self",
];

static RESERVED: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| RESERVED_IDENTIFIERS.iter().copied().collect());

pub fn is_reserved(name: &str) -> bool {
    RESERVED.contains(name)
}

/// Map a dotted name to a flat identifier that does not shadow a reserved name.
pub fn sanitize(name: &str) -> String {
    let mut ident = name.replace('.', PATH_SEPARATOR);
    while is_reserved(&ident) {
        ident.push(COLLISION_MARKER);
    }
    ident
}

/// Display name of a sanitized identifier, with path separators restored.
pub fn display_name(ident: &str) -> String {
    ident.replace(PATH_SEPARATOR, ".")
}
