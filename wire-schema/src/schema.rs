//! Resolved type graph for a set of `.proto` files.
//!
//! Files own their declarations as a tree (top-level types holding nested
//! types). Fields never own the types they mention: a [`ProtoType::Named`]
//! holds the fully-qualified name of its target, and [`Schema`] keeps an
//! index from names to declarations. Reference cycles between messages are
//! therefore plain data and every traversal tracks names it has visited.

use std::collections::BTreeMap;
use std::fmt;

/// Where a declaration came from, for diagnostics and provenance headers
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Location {
    /// Search root the file was found under (empty for absolute paths)
    pub base: String,
    /// Path of the file relative to `base`
    pub path: String,
    pub line: u32,
    pub column: u32,
}

impl Location {
    pub fn new(base: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            path: path.into(),
            line: 0,
            column: 0,
        }
    }

    /// Same file, pointing at the given line and column
    pub fn at(&self, line: u32, column: u32) -> Self {
        Self {
            base: self.base.clone(),
            path: self.path.clone(),
            line,
            column,
        }
    }

    /// Drops the search root, keeping the relative path and position
    pub fn without_base(&self) -> Self {
        Self {
            base: String::new(),
            ..self.clone()
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.base.is_empty() {
            write!(f, "{}/", self.base.trim_end_matches('/'))?;
        }
        write!(f, "{}", self.path)?;
        if self.line != 0 {
            write!(f, " at {}:{}", self.line, self.column)?;
        }
        Ok(())
    }
}

/// Ordered option key/value pairs, as declared
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    entries: Vec<(String, String)>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Value of the last option with this name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Whether a file was named by the caller or only pulled in by an import
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileOrigin {
    Explicit,
    Imported,
}

/// A single `.proto` source unit
#[derive(Debug, Clone, PartialEq)]
pub struct ProtoFile {
    pub location: Location,
    pub package: Option<String>,
    pub imports: Vec<String>,
    pub types: Vec<Type>,
    pub options: Options,
    pub origin: FileOrigin,
}

impl ProtoFile {
    pub fn new(location: Location) -> Self {
        Self {
            location,
            package: None,
            imports: Vec::new(),
            types: Vec::new(),
            options: Options::new(),
            origin: FileOrigin::Explicit,
        }
    }

    /// Adds a top-level type to the file
    pub fn add_type(&mut self, ty: Type) {
        self.types.push(ty);
    }

    /// The file's path relative to its search root
    pub fn path(&self) -> &str {
        &self.location.path
    }
}

/// A message, enum, or enclosing shell
#[derive(Debug, Clone, PartialEq)]
pub struct Type {
    /// Fully-qualified name, e.g. `pkg.Outer.Inner`
    pub name: String,
    pub package: Option<String>,
    pub location: Location,
    pub documentation: String,
    pub nested_types: Vec<Type>,
    pub kind: TypeKind,
}

/// The variants a [`Type`] can take
#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    Message(MessageType),
    Enum(EnumType),
    /// A pruned-away type kept only as the namespace of retained nested types
    Enclosing,
}

impl Type {
    pub fn new(name: impl Into<String>, location: Location, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            package: None,
            location,
            documentation: String::new(),
            nested_types: Vec::new(),
            kind,
        }
    }

    /// The last component of the fully-qualified name
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    pub fn as_message(&self) -> Option<&MessageType> {
        match &self.kind {
            TypeKind::Message(message) => Some(message),
            TypeKind::Enum(_) | TypeKind::Enclosing => None,
        }
    }

    pub fn as_enum(&self) -> Option<&EnumType> {
        match &self.kind {
            TypeKind::Enum(enum_type) => Some(enum_type),
            TypeKind::Message(_) | TypeKind::Enclosing => None,
        }
    }

    /// Names of every type this one depends on: field targets and nested declarations
    pub fn dependencies(&self) -> Vec<&str> {
        let mut names = Vec::new();
        match &self.kind {
            TypeKind::Message(message) => {
                for field in &message.fields {
                    if let ProtoType::Named(target) = &field.ty {
                        names.push(target.as_str());
                    }
                }
            }
            TypeKind::Enum(_) | TypeKind::Enclosing => {}
        }
        names.extend(self.nested_types.iter().map(|nested| nested.name.as_str()));
        names
    }

    /// Name of a field or enum constant declared directly on this type
    pub fn has_member(&self, member: &str) -> bool {
        match &self.kind {
            TypeKind::Message(message) => message.field(member).is_some(),
            TypeKind::Enum(enum_type) => enum_type.constant(member).is_some(),
            TypeKind::Enclosing => false,
        }
    }
}

/// Body of a message declaration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageType {
    pub fields: Vec<Field>,
    pub options: Options,
}

impl MessageType {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_field(&mut self, field: Field) {
        self.fields.push(field);
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }
}

/// Field cardinality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    Optional,
    Required,
    Repeated,
}

impl Label {
    pub fn as_str(self) -> &'static str {
        match self {
            Label::Optional => "optional",
            Label::Required => "required",
            Label::Repeated => "repeated",
        }
    }
}

/// A message field
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub tag: u32,
    pub name: String,
    pub label: Label,
    pub ty: ProtoType,
    /// Literal text of the `[default = ...]` option, unquoted for strings
    pub default: Option<String>,
    pub documentation: String,
    pub options: Options,
    pub location: Location,
}

impl Field {
    pub fn new(tag: u32, name: impl Into<String>, label: Label, ty: ProtoType) -> Self {
        Self {
            tag,
            name: name.into(),
            label,
            ty,
            default: None,
            documentation: String::new(),
            options: Options::new(),
            location: Location::default(),
        }
    }

    pub fn is_repeated(&self) -> bool {
        self.label == Label::Repeated
    }

    pub fn is_required(&self) -> bool {
        self.label == Label::Required
    }

    pub fn is_packed(&self) -> bool {
        self.options.get("packed") == Some("true")
    }

    pub fn is_deprecated(&self) -> bool {
        self.options.get("deprecated") == Some("true")
    }
}

/// A field's declared type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProtoType {
    Scalar(ScalarType),
    /// Reference to a message or enum; fully-qualified once loaded
    Named(String),
}

impl fmt::Display for ProtoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtoType::Scalar(scalar) => f.write_str(scalar.name()),
            ProtoType::Named(name) => f.write_str(name),
        }
    }
}

/// The fifteen proto scalar value types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Double,
    Float,
    Int32,
    Int64,
    UInt32,
    UInt64,
    SInt32,
    SInt64,
    Fixed32,
    Fixed64,
    SFixed32,
    SFixed64,
    Bool,
    String,
    Bytes,
}

impl ScalarType {
    pub const ALL: [ScalarType; 15] = [
        ScalarType::Double,
        ScalarType::Float,
        ScalarType::Int32,
        ScalarType::Int64,
        ScalarType::UInt32,
        ScalarType::UInt64,
        ScalarType::SInt32,
        ScalarType::SInt64,
        ScalarType::Fixed32,
        ScalarType::Fixed64,
        ScalarType::SFixed32,
        ScalarType::SFixed64,
        ScalarType::Bool,
        ScalarType::String,
        ScalarType::Bytes,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|scalar| scalar.name() == name)
    }

    /// The keyword used in `.proto` files
    pub fn name(self) -> &'static str {
        match self {
            ScalarType::Double => "double",
            ScalarType::Float => "float",
            ScalarType::Int32 => "int32",
            ScalarType::Int64 => "int64",
            ScalarType::UInt32 => "uint32",
            ScalarType::UInt64 => "uint64",
            ScalarType::SInt32 => "sint32",
            ScalarType::SInt64 => "sint64",
            ScalarType::Fixed32 => "fixed32",
            ScalarType::Fixed64 => "fixed64",
            ScalarType::SFixed32 => "sfixed32",
            ScalarType::SFixed64 => "sfixed64",
            ScalarType::Bool => "bool",
            ScalarType::String => "string",
            ScalarType::Bytes => "bytes",
        }
    }

    /// Numeric scalars may use the packed repeated encoding
    pub fn is_packable(self) -> bool {
        !matches!(self, ScalarType::String | ScalarType::Bytes)
    }
}

/// Body of an enum declaration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnumType {
    pub constants: Vec<EnumConstant>,
    pub options: Options,
}

impl EnumType {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_constant(&mut self, constant: EnumConstant) {
        self.constants.push(constant);
    }

    pub fn constant(&self, name: &str) -> Option<&EnumConstant> {
        self.constants.iter().find(|constant| constant.name == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumConstant {
    pub name: String,
    pub value: i32,
    pub documentation: String,
    pub options: Options,
}

impl EnumConstant {
    pub fn new(name: impl Into<String>, value: i32) -> Self {
        Self {
            name: name.into(),
            value,
            documentation: String::new(),
            options: Options::new(),
        }
    }
}

/// Position of a declaration inside [`Schema::files`]
#[derive(Debug, Clone, PartialEq, Eq)]
struct TypeAddress {
    file: usize,
    path: Vec<usize>,
}

/// A loaded set of files with a name index over every declared type
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    files: Vec<ProtoFile>,
    index: BTreeMap<String, TypeAddress>,
}

impl Schema {
    /// Indexes the given files. Names are expected to be unique; the loader
    /// rejects duplicates before calling this.
    pub fn new(files: Vec<ProtoFile>) -> Self {
        let mut index = BTreeMap::new();
        for (file_index, file) in files.iter().enumerate() {
            let mut stack: Vec<(Vec<usize>, &Type)> = file
                .types
                .iter()
                .enumerate()
                .map(|(i, ty)| (vec![i], ty))
                .collect();
            while let Some((path, ty)) = stack.pop() {
                for (i, nested) in ty.nested_types.iter().enumerate() {
                    let mut nested_path = path.clone();
                    nested_path.push(i);
                    stack.push((nested_path, nested));
                }
                index.entry(ty.name.clone()).or_insert(TypeAddress {
                    file: file_index,
                    path,
                });
            }
        }
        Self { files, index }
    }

    pub fn files(&self) -> &[ProtoFile] {
        &self.files
    }

    /// Looks up a type by fully-qualified name
    pub fn get_type(&self, name: &str) -> Option<&Type> {
        let address = self.index.get(name)?;
        let file = self.files.get(address.file)?;
        let (first, rest) = address.path.split_first()?;
        let mut ty = file.types.get(*first)?;
        for i in rest {
            ty = ty.nested_types.get(*i)?;
        }
        Some(ty)
    }

    /// The file declaring the named type
    pub fn file_of(&self, name: &str) -> Option<&ProtoFile> {
        let address = self.index.get(name)?;
        self.files.get(address.file)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Every declared type, depth first in declaration order
    pub fn types(&self) -> impl Iterator<Item = &Type> {
        let mut out = Vec::new();
        for file in &self.files {
            collect_types(&file.types, &mut out);
        }
        out.into_iter()
    }

    /// Every declared type name, sorted
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.index.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

fn collect_types<'a>(types: &'a [Type], out: &mut Vec<&'a Type>) {
    for ty in types {
        out.push(ty);
        collect_types(&ty.nested_types, out);
    }
}
