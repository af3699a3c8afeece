//! Member classification inside a class body.
//!
//! The body arrives scrubbed, with nested-class regions already masked out,
//! so every fact found here belongs to the owning class. Patterns are tried
//! at each statement head in a fixed priority order (destructor, then
//! constructor, then method, then field), which guarantees no span is ever
//! emitted under two member kinds.

use super::entities::{
    is_plain_ident, is_reserved, join_type_tokens, parse_decl_head, token_text,
};
use super::tokens::{
    contains_token, find_matching_paren, ident_at, ident_end, is_ident_char, is_ident_start,
    skip_ws,
};
use super::types::{
    AccessRegion, ConstructorFacts, DestructorFacts, FieldFacts, MethodFacts, Visibility,
};
use crate::scope::find_matching_close;

/// Lookahead window, in bytes, for the `const` qualifier after a method
/// name. The flag is a bounded heuristic, not full-statement parsing.
const CONST_WINDOW: usize = 100;

/// Declaration keywords that disqualify a span from being a data member.
const FIELD_HEAD_BLACKLIST: [&str; 4] = ["using", "typedef", "friend", "template"];

/// Storage qualifiers stripped from captured field types.
const FIELD_QUALIFIERS: [&str; 5] = ["static", "mutable", "inline", "constexpr", "volatile"];

/// Qualifier tokens that may precede a constructor or destructor.
const LEADING_QUALIFIERS: [&str; 7] = [
    "virtual",
    "inline",
    "explicit",
    "static",
    "friend",
    "constexpr",
    "mutable",
];

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct ClassifiedMembers {
    pub methods: Vec<MethodFacts>,
    pub constructors: Vec<ConstructorFacts>,
    pub destructors: Vec<DestructorFacts>,
    pub fields: Vec<FieldFacts>,
    pub access_regions: Vec<AccessRegion>,
}

/// Classify everything inside one class body. `owner` is the class name,
/// `default_access` the level in effect before any explicit specifier.
pub(crate) fn classify_members(
    body: &str,
    owner: &str,
    default_access: Visibility,
) -> ClassifiedMembers {
    let bytes = body.as_bytes();
    let access_regions = scan_access_regions(body);
    let mut out = ClassifiedMembers {
        access_regions: access_regions.clone(),
        ..ClassifiedMembers::default()
    };

    let mut i = 0;
    while i < bytes.len() {
        i = skip_ws(bytes, i);
        if i >= bytes.len() {
            break;
        }
        let head = i;
        let visibility = visibility_at(&access_regions, head, default_access);

        if bytes[i] == b'~' {
            if let Some(end) = match_destructor(body, i, owner) {
                out.destructors.push(DestructorFacts {
                    name: format!("~{owner}"),
                    visibility,
                });
                i = end;
                continue;
            }
            i += 1;
            continue;
        }

        if !is_ident_start(bytes[i]) {
            i += 1;
            continue;
        }

        if let Some(next) = match_access_label(body, i) {
            i = next;
            continue;
        }

        // Leading qualifiers are transparent for constructor/destructor
        // detection; `virtual ~Foo()` must still land in the `~` arm.
        let after_quals = skip_leading_qualifiers(body, i);
        if after_quals < bytes.len() && bytes[after_quals] == b'~' {
            if let Some(end) = match_destructor(body, after_quals, owner) {
                out.destructors.push(DestructorFacts {
                    name: format!("~{owner}"),
                    visibility,
                });
                i = end;
                continue;
            }
        }

        if let Some(end) = match_constructor(body, after_quals, owner) {
            out.constructors.push(ConstructorFacts {
                name: owner.to_string(),
                visibility,
            });
            i = end;
            continue;
        }

        if let Some((method, end)) = match_method(body, i, owner) {
            out.methods.push(MethodFacts {
                name: method.name,
                return_type: method.return_type,
                is_virtual: method.is_virtual,
                is_const: method.is_const,
                visibility,
            });
            i = end;
            continue;
        }

        if let Some((field, end)) = match_field(body, i) {
            out.fields.push(FieldFacts {
                name: field.name,
                type_name: field.type_name,
                visibility,
            });
            i = end;
            continue;
        }

        i = skip_statement(body, i);
    }

    out
}

/// Every `public:` / `private:` / `protected:` label, in offset order.
fn scan_access_regions(body: &str) -> Vec<AccessRegion> {
    let bytes = body.as_bytes();
    let mut regions = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if !is_ident_start(bytes[i]) {
            i += 1;
            continue;
        }
        if i > 0 && is_ident_char(bytes[i - 1]) {
            i = ident_end(bytes, i);
            continue;
        }
        let word_end = ident_end(bytes, i);
        let specifier = match &body[i..word_end] {
            "public" => Some(Visibility::Public),
            "private" => Some(Visibility::Private),
            "protected" => Some(Visibility::Protected),
            _ => None,
        };
        if let Some(specifier) = specifier {
            let colon = skip_ws(bytes, word_end);
            if bytes.get(colon) == Some(&b':') && bytes.get(colon + 1) != Some(&b':') {
                regions.push(AccessRegion {
                    specifier,
                    offset: i,
                });
                i = colon + 1;
                continue;
            }
        }
        i = word_end;
    }
    regions
}

/// The specifier governing `offset`: nearest preceding region, else the
/// class kind's default.
fn visibility_at(regions: &[AccessRegion], offset: usize, default_access: Visibility) -> Visibility {
    regions
        .iter()
        .rev()
        .find(|r| r.offset <= offset)
        .map(|r| r.specifier)
        .unwrap_or(default_access)
}

fn match_access_label(body: &str, i: usize) -> Option<usize> {
    let word = ident_at(body, i)?;
    if !matches!(word, "public" | "private" | "protected") {
        return None;
    }
    let bytes = body.as_bytes();
    let colon = skip_ws(bytes, i + word.len());
    if bytes.get(colon) == Some(&b':') && bytes.get(colon + 1) != Some(&b':') {
        Some(colon + 1)
    } else {
        None
    }
}

fn skip_leading_qualifiers(body: &str, mut i: usize) -> usize {
    let bytes = body.as_bytes();
    while let Some(word) = ident_at(body, i) {
        if !LEADING_QUALIFIERS.contains(&word) {
            break;
        }
        i = skip_ws(bytes, i + word.len());
    }
    i
}

/// `~<owner> ( params )` followed by a body or `;`.
fn match_destructor(body: &str, tilde: usize, owner: &str) -> Option<usize> {
    let bytes = body.as_bytes();
    if bytes.get(tilde) != Some(&b'~') {
        return None;
    }
    let name = ident_at(body, tilde + 1)?;
    if name != owner {
        return None;
    }
    let open = skip_ws(bytes, tilde + 1 + name.len());
    let close = find_matching_paren(bytes, open)?;
    Some(consume_trailer(body, close + 1))
}

/// `<owner> ( params ) [: initializer-list]` followed by a body or `;`.
fn match_constructor(body: &str, start: usize, owner: &str) -> Option<usize> {
    let bytes = body.as_bytes();
    let name = ident_at(body, start)?;
    if name != owner {
        return None;
    }
    let open = skip_ws(bytes, start + name.len());
    let close = find_matching_paren(bytes, open)?;
    Some(consume_trailer(body, close + 1))
}

struct MethodMatch {
    name: String,
    return_type: String,
    is_virtual: bool,
    is_const: bool,
}

/// `[virtual] <type> <name> ( params ) [const] [override] [= 0]` followed by
/// a body or `;`. The owner name and `operator` are never method names.
///
/// The virtual flag is a whole-body prefix search up to the name and the
/// const flag a bounded lookahead after it; both are heuristics, not
/// statement parsing.
fn match_method(body: &str, start: usize, owner: &str) -> Option<(MethodMatch, usize)> {
    let head = parse_decl_head(body, start, body.len())?;
    if head.tokens.len() < 2 {
        return None;
    }
    let name_token = head.tokens.last()?;
    let name = token_text(body, name_token);
    if !is_plain_ident(name) || name == owner {
        return None;
    }
    let return_type = join_type_tokens(body, &head.tokens[..head.tokens.len() - 1]);
    if return_type.is_empty() {
        return None;
    }

    let bytes = body.as_bytes();
    let close = find_matching_paren(bytes, head.paren_open)?;
    let is_virtual = contains_token(&body[..name_token.start], "virtual");
    let window_end = (name_token.end + CONST_WINDOW).min(body.len());
    let is_const = contains_token(&body[name_token.end..window_end], "const");
    let end = consume_trailer(body, close + 1);

    Some((
        MethodMatch {
            name: name.to_string(),
            return_type,
            is_virtual,
            is_const,
        },
        end,
    ))
}

struct FieldMatch {
    name: String,
    type_name: String,
}

/// `<type> <name> ;` with no parentheses before the terminator. Default
/// values (`= ...`), brace initializers, array suffixes and bitfield widths
/// are tolerated after the name.
fn match_field(body: &str, start: usize) -> Option<(FieldMatch, usize)> {
    let bytes = body.as_bytes();
    let mut tokens: Vec<(usize, usize)> = Vec::new();
    let mut i = start;

    let end = loop {
        i = skip_ws(bytes, i);
        if i >= bytes.len() {
            return None;
        }
        match bytes[i] {
            b';' => break i + 1,
            b'(' | b')' => return None,
            b'=' | b'[' | b'{' => break find_statement_end(body, i)?,
            b':' if bytes.get(i + 1) != Some(&b':') => break find_statement_end(body, i)?,
            b if is_ident_start(b) => {
                let tok_start = i;
                let j = super::entities::absorb_type_suffix(body, ident_end(bytes, i), body.len())?;
                tokens.push((tok_start, j));
                i = j;
            }
            _ => return None,
        }
    };

    if tokens.len() < 2 {
        return None;
    }
    let first = body[tokens[0].0..tokens[0].1].trim_end();
    if FIELD_HEAD_BLACKLIST.contains(&first) {
        return None;
    }
    if matches!(first, "enum" | "union" | "class" | "struct") && tokens.len() == 2 {
        // `enum Color { ... };` defines a type; `enum Color c;` is a field.
        return None;
    }

    let (name_start, name_end) = tokens[tokens.len() - 1];
    let name = body[name_start..name_end].trim_end();
    if !is_plain_ident(name) || is_reserved(name) {
        return None;
    }
    let type_name = tokens[..tokens.len() - 1]
        .iter()
        .map(|&(s, e)| body[s..e].trim_end())
        .filter(|t| !FIELD_QUALIFIERS.contains(t))
        .collect::<Vec<_>>()
        .join(" ");
    if type_name.is_empty() {
        return None;
    }

    Some((
        FieldMatch {
            name: name.to_string(),
            type_name,
        },
        end,
    ))
}

/// After a close paren: pass over trailing qualifiers and an optional
/// initializer list, then consume the body (delimited) or the `;`.
fn consume_trailer(body: &str, mut i: usize) -> usize {
    let bytes = body.as_bytes();
    let mut paren_depth = 0usize;
    while i < bytes.len() {
        match bytes[i] {
            b'(' => paren_depth += 1,
            b')' => paren_depth = paren_depth.saturating_sub(1),
            b'{' if paren_depth == 0 => {
                return match find_matching_close(body, i) {
                    Some(close) => close + 1,
                    None => bytes.len(),
                };
            }
            b';' if paren_depth == 0 => return i + 1,
            b'}' if paren_depth == 0 => return i,
            _ => {}
        }
        i += 1;
    }
    bytes.len()
}

/// Offset just past the `;` ending the statement at `i`, skipping balanced
/// brace groups (initializer lists) on the way.
fn find_statement_end(body: &str, mut i: usize) -> Option<usize> {
    let bytes = body.as_bytes();
    let mut paren_depth = 0usize;
    while i < bytes.len() {
        match bytes[i] {
            b'(' => paren_depth += 1,
            b')' => paren_depth = paren_depth.saturating_sub(1),
            b'{' if paren_depth == 0 => {
                i = match find_matching_close(body, i) {
                    Some(close) => close + 1,
                    None => return None,
                };
                continue;
            }
            b';' if paren_depth == 0 => return Some(i + 1),
            b'}' if paren_depth == 0 => return None,
            _ => {}
        }
        i += 1;
    }
    None
}

/// Advance past noise that matched nothing.
fn skip_statement(body: &str, i: usize) -> usize {
    find_statement_end(body, i).unwrap_or(body.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(body: &str, owner: &str) -> ClassifiedMembers {
        classify_members(body, owner, Visibility::Private)
    }

    #[test]
    fn test_full_class_body() {
        let body = " public: Foo(); ~Foo(); int getX() const; private: int x; ";
        let found = classify(body, "Foo");

        assert_eq!(found.constructors.len(), 1);
        assert_eq!(found.constructors[0].name, "Foo");
        assert_eq!(found.constructors[0].visibility, Visibility::Public);

        assert_eq!(found.destructors.len(), 1);
        assert_eq!(found.destructors[0].name, "~Foo");

        assert_eq!(found.methods.len(), 1);
        let method = &found.methods[0];
        assert_eq!(method.name, "getX");
        assert_eq!(method.return_type, "int");
        assert!(method.is_const);
        assert!(!method.is_virtual);

        assert_eq!(found.fields.len(), 1);
        assert_eq!(found.fields[0].name, "x");
        assert_eq!(found.fields[0].type_name, "int");
        assert_eq!(found.fields[0].visibility, Visibility::Private);

        let specs: Vec<_> = found.access_regions.iter().map(|r| r.specifier).collect();
        assert_eq!(specs, [Visibility::Public, Visibility::Private]);
    }

    #[test]
    fn test_no_span_is_classified_twice() {
        let body = " Foo(); ~Foo(); int getX() const; int x; ";
        let found = classify(body, "Foo");
        let total = found.constructors.len()
            + found.destructors.len()
            + found.methods.len()
            + found.fields.len();
        assert_eq!(total, 4);
        // The constructor must not also be counted as a method or field.
        assert!(found.methods.iter().all(|m| m.name != "Foo"));
        assert!(found.fields.iter().all(|f| f.name != "Foo"));
    }

    #[test]
    fn test_constructor_with_initializer_list_and_body() {
        let body = " Foo(int v) : x_(v), y_(0) { init(); } int x_; ";
        let found = classify(body, "Foo");
        assert_eq!(found.constructors.len(), 1);
        // Statements inside the constructor body are not fields.
        assert_eq!(found.fields.len(), 1);
        assert_eq!(found.fields[0].name, "x_");
    }

    #[test]
    fn test_constructor_declaration_without_body_recorded() {
        let found = classify(" explicit Foo(int v); ", "Foo");
        assert_eq!(found.constructors.len(), 1);
    }

    #[test]
    fn test_deleted_and_defaulted_constructors_recorded() {
        let body = " Foo(const Foo&) = delete; Foo() = default; ";
        let found = classify(body, "Foo");
        assert_eq!(found.constructors.len(), 2);
    }

    #[test]
    fn test_virtual_destructor() {
        let found = classify(" virtual ~Foo(); ", "Foo");
        assert_eq!(found.destructors.len(), 1);
        assert_eq!(found.destructors[0].name, "~Foo");
    }

    #[test]
    fn test_foreign_destructor_name_not_matched() {
        let found = classify(" ~Other(); ", "Foo");
        assert!(found.destructors.is_empty());
        assert!(found.constructors.is_empty());
    }

    #[test]
    fn test_virtual_token_earlier_in_body_marks_later_methods() {
        // The virtual flag is a whole-body prefix search, a documented
        // approximation: once `virtual` has appeared, later methods in the
        // same body report it too.
        let body = " virtual void draw(); void move(); ";
        let found = classify(body, "Shape");
        assert_eq!(found.methods.len(), 2);
        assert!(found.methods[0].is_virtual);
        assert!(found.methods[1].is_virtual);
    }

    #[test]
    fn test_const_window_is_bounded() {
        let padding = "int a; ".repeat(20);
        let body = format!(" void touch(); {padding} void scan() const; ");
        let found = classify(&body, "Foo");
        let touch = found.methods.iter().find(|m| m.name == "touch").unwrap();
        let scan = found.methods.iter().find(|m| m.name == "scan").unwrap();
        // `const` sits far beyond touch()'s lookahead window.
        assert!(!touch.is_const);
        assert!(scan.is_const);
    }

    #[test]
    fn test_pure_virtual_method_recorded_once() {
        let found = classify(" virtual int area() const = 0; ", "Shape");
        assert_eq!(found.methods.len(), 1);
        assert_eq!(found.methods[0].name, "area");
        assert!(found.methods[0].is_virtual);
        assert!(found.fields.is_empty());
    }

    #[test]
    fn test_inline_method_body_not_classified_as_fields() {
        let body = " int get() { int tmp = x; return tmp; } int x; ";
        let found = classify(body, "Foo");
        assert_eq!(found.methods.len(), 1);
        assert_eq!(found.fields.len(), 1);
        assert_eq!(found.fields[0].name, "x");
    }

    #[test]
    fn test_operator_overloads_are_not_methods() {
        let body = " bool operator==(const Foo& other) const; int x; ";
        let found = classify(body, "Foo");
        assert!(found.methods.is_empty());
        assert_eq!(found.fields.len(), 1);
    }

    #[test]
    fn test_owner_typed_field_is_a_field_not_a_constructor() {
        let found = classify(" Foo* next; ", "Foo");
        assert!(found.constructors.is_empty());
        assert_eq!(found.fields.len(), 1);
        assert_eq!(found.fields[0].name, "next");
        assert_eq!(found.fields[0].type_name, "Foo*");
    }

    #[test]
    fn test_field_variants() {
        let body = " int plain; std::vector<int> items; int arr[4]; int with_default = 7; static int counter; int bits : 3; ";
        let found = classify(body, "Foo");
        let names: Vec<_> = found.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            ["plain", "items", "arr", "with_default", "counter", "bits"]
        );
        let counter = found.fields.iter().find(|f| f.name == "counter").unwrap();
        assert_eq!(counter.type_name, "int");
        let items = found.fields.iter().find(|f| f.name == "items").unwrap();
        assert_eq!(items.type_name, "std::vector<int>");
    }

    #[test]
    fn test_enum_definition_is_not_a_field() {
        let body = " enum Color { RED, GREEN }; enum Color chosen; ";
        let found = classify(body, "Foo");
        assert_eq!(found.fields.len(), 1);
        assert_eq!(found.fields[0].name, "chosen");
        assert_eq!(found.fields[0].type_name, "enum Color");
    }

    #[test]
    fn test_friend_and_using_are_noise() {
        let body = " friend class Helper; using Ptr = Foo*; int x; ";
        let found = classify(body, "Foo");
        assert_eq!(found.fields.len(), 1);
        assert_eq!(found.fields[0].name, "x");
    }

    #[test]
    fn test_struct_default_access_is_public() {
        let found = classify_members(" int x; ", "Point", Visibility::Public);
        assert_eq!(found.fields[0].visibility, Visibility::Public);
    }

    #[test]
    fn test_access_region_offsets_are_ordered() {
        let body = " public: int a; protected: int b; private: int c; ";
        let found = classify(body, "Foo");
        let offsets: Vec<_> = found.access_regions.iter().map(|r| r.offset).collect();
        let mut sorted = offsets.clone();
        sorted.sort_unstable();
        assert_eq!(offsets, sorted);
        assert_eq!(found.fields[0].visibility, Visibility::Public);
        assert_eq!(found.fields[1].visibility, Visibility::Protected);
        assert_eq!(found.fields[2].visibility, Visibility::Private);
    }
}
