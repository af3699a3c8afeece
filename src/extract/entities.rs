//! Entity location: a single forward token scan over scrubbed text that
//! yields namespace, class-like, and free-function candidates.
//!
//! This is pattern classification, not parsing. Class and function bodies
//! are delimited with [`crate::scope::find_matching_close`] and skipped, so
//! statements inside them can never produce false candidates; namespace
//! bodies are transparent and scanned through. A candidate whose scope has
//! no matching close brace is dropped with a warning and the scan resumes
//! right after its open brace, which is what lets a well-formed entity later
//! in the same file survive an unterminated one before it.

use once_cell::sync::Lazy;
use std::collections::HashSet;
use tracing::warn;

use super::tokens::{
    find_matching_paren, ident_end, is_ident_char, is_ident_start, skip_angles, skip_ws,
};
use super::types::RecordKind;
use crate::error::Error;
use crate::scope::find_matching_close;

/// Control-flow and declaration keywords that can never head a function or
/// type candidate. `main` is not listed here: whether entry points are
/// recorded is a configuration policy, not a noise rule.
static RESERVED: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "if",
        "else",
        "for",
        "while",
        "do",
        "switch",
        "case",
        "default",
        "return",
        "goto",
        "break",
        "continue",
        "new",
        "delete",
        "sizeof",
        "throw",
        "try",
        "catch",
        "using",
        "typedef",
        "template",
        "typename",
        "operator",
        "namespace",
        "class",
        "struct",
        "union",
        "enum",
        "public",
        "private",
        "protected",
        "this",
        "decltype",
        "static_assert",
        "alignas",
        "alignof",
        "concept",
        "requires",
        "co_await",
        "co_return",
        "co_yield",
        "const_cast",
        "static_cast",
        "dynamic_cast",
        "reinterpret_cast",
    ]
    .into_iter()
    .collect()
});

/// Storage and linkage qualifiers stripped from captured return types.
const QUALIFIERS: [&str; 10] = [
    "static",
    "inline",
    "extern",
    "virtual",
    "explicit",
    "friend",
    "constexpr",
    "consteval",
    "constinit",
    "mutable",
];

const MAX_HEAD_TOKENS: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NamespaceCandidate {
    pub name: String,
    pub decl_offset: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ClassCandidate {
    pub kind: RecordKind,
    pub name: String,
    pub base_class: Option<String>,
    /// Offset of the `class`/`struct` keyword.
    pub decl_offset: usize,
    /// Offset of the opening `{`.
    pub body_start: usize,
    /// Offset just past the matching `}`.
    pub body_end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FunctionCandidate {
    pub name: String,
    pub return_type: String,
    pub decl_offset: usize,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct LocatedEntities {
    pub namespaces: Vec<NamespaceCandidate>,
    pub classes: Vec<ClassCandidate>,
    pub functions: Vec<FunctionCandidate>,
}

/// Scan a whole scrubbed unit for top-level entities.
pub(crate) fn locate(text: &str, include_entry_points: bool) -> LocatedEntities {
    let mut out = LocatedEntities::default();
    let bytes = text.as_bytes();
    let end = text.len();
    let mut i = 0;

    while i < end {
        if !is_ident_start(bytes[i]) {
            i += 1;
            continue;
        }
        if i > 0 && is_ident_char(bytes[i - 1]) {
            i = ident_end(bytes, i);
            continue;
        }
        let word_end = ident_end(bytes, i);
        let word = &text[i..word_end];

        match word {
            "namespace" => {
                if let Some((name, brace)) = parse_namespace_header(text, i, end) {
                    out.namespaces.push(NamespaceCandidate {
                        name,
                        decl_offset: i,
                    });
                    // Namespace bodies are transparent: keep scanning inside.
                    i = brace + 1;
                } else {
                    i = word_end;
                }
            }
            "class" | "struct" => {
                let kind = if word == "class" {
                    RecordKind::Class
                } else {
                    RecordKind::Struct
                };
                i = scan_class_at(text, i, word_end, end, kind, &mut out.classes);
            }
            _ if RESERVED.contains(word) => i = word_end,
            _ => match parse_function_head(text, i, end) {
                Some(head) => match find_matching_close(text, head.body_open) {
                    Some(close) if close < end => {
                        if include_entry_points || head.name != "main" {
                            out.functions.push(FunctionCandidate {
                                name: head.name,
                                return_type: head.return_type,
                                decl_offset: i,
                            });
                        }
                        i = close + 1;
                    }
                    _ => {
                        let err = Error::UnbalancedScope {
                            offset: head.body_open,
                        };
                        warn!("skipping function candidate `{}`: {}", head.name, err);
                        i = head.body_open + 1;
                    }
                },
                None => i = word_end,
            },
        }
    }

    out
}

/// Scan `[start, end)` for class-like candidates only. Used to find classes
/// nested inside an already-delimited class body.
pub(crate) fn scan_classes(text: &str, start: usize, end: usize) -> Vec<ClassCandidate> {
    let bytes = text.as_bytes();
    let mut out = Vec::new();
    let mut i = start;

    while i < end {
        if !is_ident_start(bytes[i]) {
            i += 1;
            continue;
        }
        if i > 0 && is_ident_char(bytes[i - 1]) {
            i = ident_end(bytes, i);
            continue;
        }
        let word_end = ident_end(bytes, i);
        match &text[i..word_end] {
            "class" => i = scan_class_at(text, i, word_end, end, RecordKind::Class, &mut out),
            "struct" => i = scan_class_at(text, i, word_end, end, RecordKind::Struct, &mut out),
            _ => i = word_end,
        }
    }

    out
}

/// Try to turn the `class`/`struct` keyword at `kw_offset` into a candidate.
/// Returns the offset scanning should resume from.
fn scan_class_at(
    text: &str,
    kw_offset: usize,
    word_end: usize,
    end: usize,
    kind: RecordKind,
    out: &mut Vec<ClassCandidate>,
) -> usize {
    let header = match parse_class_header(text, kw_offset, end) {
        Some(h) => h,
        None => return word_end,
    };
    match find_matching_close(text, header.brace_offset) {
        Some(close) if close < end => {
            out.push(ClassCandidate {
                kind,
                name: header.name,
                base_class: header.base_class,
                decl_offset: kw_offset,
                body_start: header.brace_offset,
                body_end: close + 1,
            });
            close + 1
        }
        _ => {
            let err = Error::UnbalancedScope {
                offset: header.brace_offset,
            };
            warn!("skipping class candidate `{}`: {}", header.name, err);
            header.brace_offset + 1
        }
    }
}

struct ClassHeader {
    name: String,
    base_class: Option<String>,
    brace_offset: usize,
}

/// `namespace <identifier> {`: name required, no base.
fn parse_namespace_header(text: &str, kw_offset: usize, limit: usize) -> Option<(String, usize)> {
    let bytes = text.as_bytes();
    let mut i = skip_ws(bytes, ident_end(bytes, kw_offset));
    if i >= limit || !is_ident_start(bytes[i]) {
        return None;
    }
    let name_end = ident_end(bytes, i);
    let name = text[i..name_end].to_string();
    i = skip_ws(bytes, name_end);
    if i < limit && bytes[i] == b'{' {
        Some((name, i))
    } else {
        None
    }
}

/// `class <identifier> [ : <base-list> ] {`. The base list is accepted as
/// text, but only its first non-specifier identifier is recorded.
fn parse_class_header(text: &str, kw_offset: usize, limit: usize) -> Option<ClassHeader> {
    let bytes = text.as_bytes();
    let mut i = skip_ws(bytes, ident_end(bytes, kw_offset));
    if i >= limit || !is_ident_start(bytes[i]) {
        return None;
    }
    let name_end = ident_end(bytes, i);
    let name = text[i..name_end].to_string();
    i = skip_ws(bytes, name_end);
    if i >= limit {
        return None;
    }

    match bytes[i] {
        b'{' => Some(ClassHeader {
            name,
            base_class: None,
            brace_offset: i,
        }),
        b':' if bytes.get(i + 1) != Some(&b':') => {
            let mut base_class: Option<String> = None;
            let mut j = i + 1;
            while j < limit {
                match bytes[j] {
                    b'{' => {
                        return Some(ClassHeader {
                            name,
                            base_class,
                            brace_offset: j,
                        })
                    }
                    b';' | b'}' => return None,
                    b if is_ident_start(b) && !is_ident_char(bytes[j - 1]) => {
                        let e = ident_end(bytes, j);
                        let word = &text[j..e];
                        if base_class.is_none()
                            && !matches!(word, "public" | "private" | "protected" | "virtual")
                        {
                            base_class = Some(word.to_string());
                        }
                        j = e;
                    }
                    _ => j += 1,
                }
            }
            None
        }
        _ => None,
    }
}

/// One element of a declaration head: an identifier with any `::` chain,
/// template arguments, and trailing pointer/reference marks absorbed.
#[derive(Debug, Clone, Copy)]
pub(super) struct HeadToken {
    pub start: usize,
    pub end: usize,
}

pub(super) struct DeclHead {
    pub tokens: Vec<HeadToken>,
    pub paren_open: usize,
}

pub(super) fn token_text<'t>(text: &'t str, token: &HeadToken) -> &'t str {
    text[token.start..token.end].trim_end()
}

pub(super) fn is_plain_ident(s: &str) -> bool {
    let bytes = s.as_bytes();
    !bytes.is_empty() && is_ident_start(bytes[0]) && bytes.iter().all(|&b| is_ident_char(b))
}

pub(super) fn is_reserved(word: &str) -> bool {
    RESERVED.contains(word)
}

/// Read `<tokens...> (`, the shared prefix of free-function and method
/// patterns. Fails fast on reserved keywords and on anything that is not a
/// plausible run of type/name tokens followed by an open paren.
pub(super) fn parse_decl_head(text: &str, start: usize, limit: usize) -> Option<DeclHead> {
    let bytes = text.as_bytes();
    let mut tokens: Vec<HeadToken> = Vec::new();
    let mut i = start;

    loop {
        i = skip_ws(bytes, i);
        if i >= limit {
            return None;
        }
        if bytes[i] == b'(' {
            if tokens.is_empty() {
                return None;
            }
            return Some(DeclHead {
                tokens,
                paren_open: i,
            });
        }
        if !is_ident_start(bytes[i]) {
            return None;
        }

        let tok_start = i;
        let mut j = ident_end(bytes, i);
        if RESERVED.contains(&text[tok_start..j]) {
            return None;
        }
        j = absorb_type_suffix(text, j, limit)?;
        tokens.push(HeadToken { start: tok_start, end: j });
        if tokens.len() > MAX_HEAD_TOKENS {
            return None;
        }
        i = j;
    }
}

/// Absorb `::name` chains, `<...>` template arguments, and `*`/`&` marks
/// following an identifier that ends at `j`. Returns the extended end.
pub(super) fn absorb_type_suffix(text: &str, mut j: usize, limit: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    loop {
        if j + 1 < limit && bytes[j] == b':' && bytes[j + 1] == b':' {
            let k = j + 2;
            if k < limit && is_ident_start(bytes[k]) {
                j = ident_end(bytes, k);
            } else {
                return None;
            }
        } else if j < limit && bytes[j] == b'<' {
            j = skip_angles(bytes, j, limit)?;
        } else {
            break;
        }
    }
    let mut k = skip_ws(bytes, j);
    while k < limit && (bytes[k] == b'*' || bytes[k] == b'&') {
        k += 1;
        j = k;
        k = skip_ws(bytes, k);
    }
    Some(j)
}

pub(super) fn join_type_tokens(text: &str, tokens: &[HeadToken]) -> String {
    tokens
        .iter()
        .map(|t| token_text(text, t))
        .filter(|t| !QUALIFIERS.contains(t))
        .collect::<Vec<_>>()
        .join(" ")
}

pub(super) struct FunctionHead {
    pub name: String,
    pub return_type: String,
    pub body_open: usize,
}

/// `[qualifiers] <type> <identifier> ( params ) {`. This matches a
/// definition, so the open brace is required; declarations ending in `;`
/// are not candidates.
fn parse_function_head(text: &str, start: usize, limit: usize) -> Option<FunctionHead> {
    let head = parse_decl_head(text, start, limit)?;
    if head.tokens.len() < 2 {
        return None;
    }
    let name_token = head.tokens.last()?;
    let name = token_text(text, name_token);
    if !is_plain_ident(name) {
        return None;
    }
    let return_type = join_type_tokens(text, &head.tokens[..head.tokens.len() - 1]);
    if return_type.is_empty() {
        return None;
    }

    let bytes = text.as_bytes();
    let close = find_matching_paren(bytes, head.paren_open)?;
    if close >= limit {
        return None;
    }
    let j = skip_ws(bytes, close + 1);
    if j < limit && bytes[j] == b'{' {
        Some(FunctionHead {
            name: name.to_string(),
            return_type,
            body_open: j,
        })
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrub::scrub;

    fn locate_all(src: &str) -> LocatedEntities {
        locate(&scrub(src), true)
    }

    #[test]
    fn test_namespace_and_class_candidates() {
        let found = locate_all("namespace util {\nclass Foo : public Bar { int x; };\n}\n");
        assert_eq!(found.namespaces.len(), 1);
        assert_eq!(found.namespaces[0].name, "util");
        assert_eq!(found.classes.len(), 1);
        let class = &found.classes[0];
        assert_eq!(class.name, "Foo");
        assert_eq!(class.base_class.as_deref(), Some("Bar"));
        assert_eq!(class.kind, RecordKind::Class);
    }

    #[test]
    fn test_multiple_inheritance_records_first_base_only() {
        let found = locate_all("class Foo : public Bar, private Baz { };");
        assert_eq!(found.classes[0].base_class.as_deref(), Some("Bar"));
    }

    #[test]
    fn test_unqualified_base_is_still_captured() {
        let found = locate_all("struct Foo : Bar { };");
        assert_eq!(found.classes[0].base_class.as_deref(), Some("Bar"));
        assert_eq!(found.classes[0].kind, RecordKind::Struct);
    }

    #[test]
    fn test_forward_declaration_is_not_a_candidate() {
        let found = locate_all("class Foo;\nclass Bar { };\n");
        assert_eq!(found.classes.len(), 1);
        assert_eq!(found.classes[0].name, "Bar");
    }

    #[test]
    fn test_unterminated_class_skipped_later_class_found() {
        let found = locate_all("class A {\n  int x;\nclass B { int y; };\n");
        // A has no matching close; B (textually inside A's unterminated
        // body) must still be located.
        assert_eq!(found.classes.len(), 1);
        assert_eq!(found.classes[0].name, "B");
    }

    #[test]
    fn test_free_function_candidates() {
        let found = locate_all("int add(int a, int b) {\n  return a + b;\n}\n");
        assert_eq!(found.functions.len(), 1);
        assert_eq!(found.functions[0].name, "add");
        assert_eq!(found.functions[0].return_type, "int");
    }

    #[test]
    fn test_statements_inside_bodies_are_not_candidates() {
        let src = "void run() {\n  if (ready) {\n    step(now);\n  }\n  while (more) { pump(); }\n}\n";
        let found = locate_all(src);
        assert_eq!(found.functions.len(), 1);
        assert_eq!(found.functions[0].name, "run");
    }

    #[test]
    fn test_control_keywords_never_match() {
        let found = locate_all("int x = 0;\nif (x) { }\nfor (;;) { }\nswitch (x) { }\n");
        assert!(found.functions.is_empty());
    }

    #[test]
    fn test_function_declaration_without_body_not_recorded() {
        let found = locate_all("int add(int a, int b);\nint sub(int a, int b) { return a - b; }\n");
        assert_eq!(found.functions.len(), 1);
        assert_eq!(found.functions[0].name, "sub");
    }

    #[test]
    fn test_out_of_line_method_definition_excluded() {
        let found = locate_all("void Widget::resize(int w) {\n  width = w;\n}\n");
        assert!(found.functions.is_empty());
    }

    #[test]
    fn test_entry_point_policy() {
        let src = "int main() { return 0; }\nint helper() { return 1; }\n";
        let scrubbed = scrub(src);

        let with_main = locate(&scrubbed, true);
        let names: Vec<_> = with_main.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["main", "helper"]);

        let without_main = locate(&scrubbed, false);
        let names: Vec<_> = without_main.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["helper"]);
    }

    #[test]
    fn test_functions_inside_namespace_are_located() {
        let found = locate_all("namespace math {\ndouble square(double v) { return v * v; }\n}\n");
        assert_eq!(found.functions.len(), 1);
        assert_eq!(found.functions[0].name, "square");
    }

    #[test]
    fn test_qualifiers_stripped_from_return_type() {
        let found = locate_all("static inline std::size_t hash(const Key& k) { return k.raw; }\n");
        assert_eq!(found.functions[0].return_type, "std::size_t");
    }

    #[test]
    fn test_template_function_located() {
        let found = locate_all("template <typename T>\nT biggest(T a, T b) { return a > b ? a : b; }\n");
        assert_eq!(found.functions.len(), 1);
        assert_eq!(found.functions[0].name, "biggest");
        assert_eq!(found.functions[0].return_type, "T");
    }

    #[test]
    fn test_braces_in_literals_do_not_break_delimiting() {
        let src = "class Quote {\n  const char* open = \"{\";\n};\nint after() { return 1; }\n";
        let found = locate_all(src);
        assert_eq!(found.classes.len(), 1);
        assert_eq!(found.functions.len(), 1);
    }

    #[test]
    fn test_scan_classes_finds_nested_candidates() {
        let src = "class Outer {\n  class Inner { int z; };\n  int y;\n};\n";
        let scrubbed = scrub(src);
        let top = locate(&scrubbed, true);
        assert_eq!(top.classes.len(), 1);
        let outer = &top.classes[0];
        let nested = scan_classes(&scrubbed, outer.body_start + 1, outer.body_end - 1);
        assert_eq!(nested.len(), 1);
        assert_eq!(nested[0].name, "Inner");
    }
}
