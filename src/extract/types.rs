//! Fact records produced by the extractor.
//!
//! All records are immutable values once produced and serialize with serde;
//! the rendering collaborator downstream decides the final output format.

use serde::{Deserialize, Serialize};

/// Access level attached to class members.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
    Protected,
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Visibility::Public => write!(f, "public"),
            Visibility::Private => write!(f, "private"),
            Visibility::Protected => write!(f, "protected"),
        }
    }
}

/// Which keyword opened a class-like scope.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Class,
    Struct,
}

impl RecordKind {
    /// Access level in effect before the first explicit specifier.
    pub fn default_access(self) -> Visibility {
        match self {
            RecordKind::Class => Visibility::Private,
            RecordKind::Struct => Visibility::Public,
        }
    }
}

/// An access-specifier label (`public:`, `private:`, `protected:`) inside a
/// class body. `offset` is the byte offset of the keyword within the scope
/// body; regions are recorded in offset order, and the specifier governing a
/// member is the nearest preceding region.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessRegion {
    pub specifier: Visibility,
    pub offset: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MethodFacts {
    pub name: String,
    pub return_type: String,
    pub is_virtual: bool,
    pub is_const: bool,
    pub visibility: Visibility,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConstructorFacts {
    pub name: String,
    pub visibility: Visibility,
}

/// Destructor names keep their leading `~`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DestructorFacts {
    pub name: String,
    pub visibility: Visibility,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldFacts {
    pub name: String,
    pub type_name: String,
    pub visibility: Visibility,
}

/// One class or struct definition with everything classified inside its body.
///
/// Nested classes are reported as separate `ClassFacts` entries; their
/// members are never attributed to the enclosing class.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClassFacts {
    /// Stable content-address id (md5 of file, name and position).
    pub id: String,
    pub name: String,
    pub kind: RecordKind,
    /// First direct base only; further bases in a multiple-inheritance list
    /// are accepted as text but not recorded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_class: Option<String>,
    /// 1-based line of the `class`/`struct` keyword.
    pub line: u32,
    pub methods: Vec<MethodFacts>,
    pub constructors: Vec<ConstructorFacts>,
    pub destructors: Vec<DestructorFacts>,
    pub members: Vec<FieldFacts>,
    pub access_regions: Vec<AccessRegion>,
}

/// A function defined at file or namespace scope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FreeFunctionFacts {
    pub id: String,
    pub name: String,
    pub return_type: String,
    /// 1-based line of the definition.
    pub line: u32,
}
