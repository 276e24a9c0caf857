//! Loads `.proto` files from search roots into a linked [`Schema`].
//!
//! Loading is all-or-nothing: every requested file and every file they
//! import must be found, parsed and linked before a schema is returned.
//! Linking rewrites each field's type reference to a fully-qualified name and
//! validates tags, so consumers never see a dangling reference.

use std::collections::{BTreeMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::diagnostics::Diagnostics;
use crate::error::{SchemaError, SchemaResult};
use crate::parser::{DefaultParser, ProtoParser};
use crate::schema::{FileOrigin, Location, ProtoFile, ProtoType, Schema, Type, TypeKind};

/// Largest tag the wire format can carry
pub const MAX_TAG: u32 = (1 << 29) - 1;

/// Tags reserved for the protocol buffer implementation
pub const RESERVED_TAGS: std::ops::RangeInclusive<u32> = 19_000..=19_999;

/// Collects search roots and file names, then loads them in one pass
///
/// ```rust,no_run
/// use wire_schema::{Diagnostics, SchemaLoader};
///
/// let mut loader = SchemaLoader::new();
/// loader.add_source("protos").add_proto("squareup/person.proto");
/// let schema = loader.load(&mut Diagnostics::new())?;
/// # Ok::<(), wire_schema::SchemaError>(())
/// ```
#[derive(Debug, Clone)]
pub struct SchemaLoader<P = DefaultParser> {
    sources: Vec<PathBuf>,
    protos: Vec<String>,
    parser: P,
}

impl SchemaLoader<DefaultParser> {
    pub fn new() -> Self {
        Self::with_parser(DefaultParser)
    }
}

impl Default for SchemaLoader<DefaultParser> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: ProtoParser> SchemaLoader<P> {
    /// Creates a loader that parses with `parser`
    pub fn with_parser(parser: P) -> Self {
        Self {
            sources: Vec::new(),
            protos: Vec::new(),
            parser,
        }
    }

    /// Adds a search root. Roots are consulted in the order added.
    pub fn add_source(&mut self, root: impl Into<PathBuf>) -> &mut Self {
        self.sources.push(root.into());
        self
    }

    /// Adds a file to load, absolute or relative to a search root
    pub fn add_proto(&mut self, name: impl Into<String>) -> &mut Self {
        self.protos.push(normalize_proto_path(&name.into()));
        self
    }

    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    /// Loads the requested files and everything they import.
    ///
    /// With no files requested, every `.proto` file below every search root
    /// is loaded and counts as explicitly named.
    pub fn load(&self, diagnostics: &mut Diagnostics) -> SchemaResult<Schema> {
        let requested = if self.protos.is_empty() {
            self.discover()
        } else {
            self.protos.clone()
        };

        let mut queue: VecDeque<Pending> = requested
            .into_iter()
            .map(|name| Pending {
                name,
                origin: FileOrigin::Explicit,
                importer_root: None,
            })
            .collect();
        let mut seen: HashSet<String> = queue.iter().map(|pending| pending.name.clone()).collect();
        let mut files = Vec::new();

        while let Some(pending) = queue.pop_front() {
            let mut file = self.load_file(&pending.name, pending.importer_root.as_deref())?;
            file.origin = pending.origin;
            debug!(path = %file.location, types = file.types.len(), "loaded proto file");

            let root = root_of(&file.location);
            for import in &file.imports {
                let name = normalize_proto_path(import);
                if seen.insert(name.clone()) {
                    queue.push_back(Pending {
                        name,
                        origin: FileOrigin::Imported,
                        importer_root: Some(root.clone()),
                    });
                }
            }
            files.push(file);
        }

        let files = link(files)?;
        let schema = Schema::new(files);
        diagnostics.info(format!(
            "Loaded {} types from {} files.",
            schema.len(),
            schema.files().len()
        ));
        Ok(schema)
    }

    fn load_file(&self, name: &str, importer_root: Option<&Path>) -> SchemaResult<ProtoFile> {
        let (location, path) = self.locate(name, importer_root)?;
        let source = std::fs::read_to_string(&path).map_err(|source| SchemaError::Read {
            path: path.clone(),
            source,
        })?;
        self.parser.parse(&location, &source)
    }

    /// Search roots first, then the root the importing file was found under
    fn locate(
        &self,
        name: &str,
        importer_root: Option<&Path>,
    ) -> SchemaResult<(Location, PathBuf)> {
        let candidate = Path::new(name);
        if candidate.is_absolute() {
            return if candidate.is_file() {
                Ok((Location::new("", name), candidate.to_path_buf()))
            } else {
                Err(SchemaError::FileNotFound {
                    path: name.to_string(),
                    roots: Vec::new(),
                })
            };
        }

        let fallback = importer_root
            .filter(|root| !self.sources.iter().any(|source| source.as_path() == *root));
        for root in self.sources.iter().map(PathBuf::as_path).chain(fallback) {
            let path = root.join(candidate);
            if path.is_file() {
                return Ok((Location::new(root.display().to_string(), name), path));
            }
        }

        let mut roots = self.sources.clone();
        roots.extend(fallback.map(Path::to_path_buf));
        Err(SchemaError::FileNotFound {
            path: name.to_string(),
            roots,
        })
    }

    /// Every `.proto` file under the search roots, relative to its root
    fn discover(&self) -> Vec<String> {
        let mut names = Vec::new();
        for root in &self.sources {
            let mut found: Vec<String> = WalkDir::new(root)
                .into_iter()
                .filter_map(Result::ok)
                .filter(|entry| entry.file_type().is_file())
                .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "proto"))
                .filter_map(|entry| {
                    let relative = entry.path().strip_prefix(root).ok()?;
                    Some(relative.to_string_lossy().replace('\\', "/"))
                })
                .collect();
            found.sort();
            for name in found {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }
}

/// A file waiting to be loaded
struct Pending {
    name: String,
    origin: FileOrigin,
    /// Root of the file whose import queued this one
    importer_root: Option<PathBuf>,
}

/// Root a loaded file was found under; an absolute file's own directory
fn root_of(location: &Location) -> PathBuf {
    if location.base.is_empty() {
        Path::new(&location.path)
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    } else {
        PathBuf::from(&location.base)
    }
}

/// Canonical spelling of a relative proto path: `/` separators, no `.`
/// segments, `..` folded into its parent where one exists. Absolute paths
/// are returned unchanged.
pub fn normalize_proto_path(name: &str) -> String {
    if Path::new(name).is_absolute() {
        return name.to_string();
    }
    let mut segments: Vec<&str> = Vec::new();
    for segment in name.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." if segments.last().is_some_and(|last| *last != "..") => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// Resolves every field type to a fully-qualified name and validates tags
fn link(mut files: Vec<ProtoFile>) -> SchemaResult<Vec<ProtoFile>> {
    let mut declared: BTreeMap<String, Location> = BTreeMap::new();
    for file in &files {
        let mut stack: Vec<&Type> = file.types.iter().collect();
        while let Some(ty) = stack.pop() {
            if let Some(first) = declared.get(&ty.name) {
                return Err(SchemaError::DuplicateType {
                    name: ty.name.clone(),
                    first: first.clone(),
                    second: ty.location.clone(),
                });
            }
            declared.insert(ty.name.clone(), ty.location.clone());
            stack.extend(ty.nested_types.iter());
        }
    }

    for file in &mut files {
        for ty in &mut file.types {
            link_type(ty, &declared)?;
        }
    }
    Ok(files)
}

fn link_type(ty: &mut Type, declared: &BTreeMap<String, Location>) -> SchemaResult<()> {
    match &mut ty.kind {
        TypeKind::Message(message) => {
            let mut tags: BTreeMap<u32, &str> = BTreeMap::new();
            for field in &message.fields {
                if field.tag == 0 || field.tag > MAX_TAG || RESERVED_TAGS.contains(&field.tag) {
                    return Err(SchemaError::InvalidTag {
                        tag: u64::from(field.tag),
                        field: field.name.clone(),
                        message: ty.name.clone(),
                        location: field.location.clone(),
                    });
                }
                if let Some(first) = tags.insert(field.tag, &field.name) {
                    return Err(SchemaError::DuplicateTag {
                        tag: field.tag,
                        message: ty.name.clone(),
                        first: first.to_string(),
                        second: field.name.clone(),
                        location: field.location.clone(),
                    });
                }
            }

            for field in &mut message.fields {
                if let ProtoType::Named(written) = &field.ty {
                    let resolved = resolve(written, &ty.name, declared).ok_or_else(|| {
                        SchemaError::UnresolvedType {
                            type_name: written.clone(),
                            field: field.name.clone(),
                            owner: ty.name.clone(),
                            location: field.location.clone(),
                        }
                    })?;
                    field.ty = ProtoType::Named(resolved);
                }
            }
        }
        TypeKind::Enum(_) | TypeKind::Enclosing => {}
    }

    for nested in &mut ty.nested_types {
        link_type(nested, declared)?;
    }
    Ok(())
}

/// Proto scoping: a leading dot is absolute, otherwise search from the
/// innermost scope outward.
fn resolve(written: &str, scope: &str, declared: &BTreeMap<String, Location>) -> Option<String> {
    if let Some(absolute) = written.strip_prefix('.') {
        return declared.contains_key(absolute).then(|| absolute.to_string());
    }

    let mut scope = scope;
    loop {
        let candidate = if scope.is_empty() {
            written.to_string()
        } else {
            format!("{scope}.{written}")
        };
        if declared.contains_key(&candidate) {
            return Some(candidate);
        }
        if scope.is_empty() {
            return None;
        }
        scope = scope.rsplit_once('.').map_or("", |(parent, _)| parent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn declared(names: &[&str]) -> BTreeMap<String, Location> {
        names
            .iter()
            .map(|name| (name.to_string(), Location::default()))
            .collect()
    }

    #[test]
    fn test_resolve_innermost_scope_first() {
        let names = declared(&["pkg.A", "pkg.A.B", "pkg.B", "B"]);

        assert_eq!(resolve("B", "pkg.A", &names).as_deref(), Some("pkg.A.B"));
        assert_eq!(resolve("B", "pkg.C", &names).as_deref(), Some("pkg.B"));
        assert_eq!(resolve("B", "other.C", &names).as_deref(), Some("B"));
        assert_eq!(resolve("A.B", "pkg.X", &names).as_deref(), Some("pkg.A.B"));
    }

    #[test]
    fn test_normalize_proto_path() {
        assert_eq!(normalize_proto_path("a.proto"), "a.proto");
        assert_eq!(normalize_proto_path("./a.proto"), "a.proto");
        assert_eq!(normalize_proto_path("squareup//geo/./b.proto"), "squareup/geo/b.proto");
        assert_eq!(normalize_proto_path("squareup/geo/../c.proto"), "squareup/c.proto");
        assert_eq!(normalize_proto_path("../shared/d.proto"), "../shared/d.proto");
        assert_eq!(normalize_proto_path("squareup\\e.proto"), "squareup/e.proto");
    }

    #[test]
    fn test_absolute_file_root_is_its_directory() {
        let location = Location::new("", "/protos/squareup/person.proto");
        assert_eq!(root_of(&location), PathBuf::from("/protos/squareup"));
        let location = Location::new("protos", "squareup/person.proto");
        assert_eq!(root_of(&location), PathBuf::from("protos"));
    }

    #[test]
    fn test_resolve_absolute_and_missing() {
        let names = declared(&["pkg.A", "B"]);

        assert_eq!(resolve(".pkg.A", "other.Z", &names).as_deref(), Some("pkg.A"));
        assert_eq!(resolve(".A", "pkg.Z", &names), None);
        assert_eq!(resolve("Missing", "pkg.A", &names), None);
    }
}
