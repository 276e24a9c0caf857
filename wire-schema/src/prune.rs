//! Reduces a schema to the dependency closure of an [`IdentifierSet`].
//!
//! 1. Every type matched by an exclude rule forms the exclusion mask. Masked
//!    types are never retained and the closure never walks through them.
//! 2. Every type selected by an include rule seeds the frontier.
//! 3. The closure follows field type references and nested declarations,
//!    skipping masked and already visited types.
//! 4. The retained types are rebuilt in declaration order. A type that was
//!    not retained but encloses retained nested types becomes a
//!    [`TypeKind::Enclosing`] shell. Files left without types are dropped.
//!
//! Pruning never fails. Rules that matched nothing in the input are
//! reported in [`PruneReport`]. The input schema is never modified.

use std::collections::{BTreeSet, VecDeque};

use tracing::debug;

use crate::identifier_set::IdentifierSet;
use crate::schema::{ProtoFile, ProtoType, Schema, Type, TypeKind};

/// Rules that matched no declaration in the schema being pruned
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneReport {
    pub unused_includes: Vec<String>,
    pub unused_excludes: Vec<String>,
}

impl PruneReport {
    pub fn is_clean(&self) -> bool {
        self.unused_includes.is_empty() && self.unused_excludes.is_empty()
    }
}

/// A pruned schema plus its report
#[derive(Debug, Clone, PartialEq)]
pub struct Pruned {
    pub schema: Schema,
    pub report: PruneReport,
}

impl Schema {
    /// See [`prune`]
    pub fn prune(&self, identifier_set: &IdentifierSet) -> Pruned {
        prune(self, identifier_set)
    }
}

/// Returns the subset of `schema` reachable from the included types
pub fn prune(schema: &Schema, identifier_set: &IdentifierSet) -> Pruned {
    if identifier_set.is_empty() {
        return Pruned {
            schema: schema.clone(),
            report: PruneReport::default(),
        };
    }

    let excluded: BTreeSet<&str> = schema
        .type_names()
        .filter(|name| identifier_set.excludes_type(name))
        .collect();

    let mut frontier: VecDeque<&str> = schema
        .type_names()
        .filter(|name| identifier_set.includes_type(name))
        .collect();

    let mut retained: BTreeSet<&str> = BTreeSet::new();
    while let Some(name) = frontier.pop_front() {
        if excluded.contains(name) || retained.contains(name) {
            continue;
        }
        let Some(ty) = schema.get_type(name) else {
            continue;
        };
        retained.insert(name);
        frontier.extend(
            ty.dependencies()
                .into_iter()
                .filter(|dependency| !retained.contains(dependency)),
        );
    }
    debug!(
        retained = retained.len(),
        excluded = excluded.len(),
        "computed dependency closure"
    );

    let files = schema
        .files()
        .iter()
        .filter_map(|file| {
            let types = retain_types(&file.types, &retained);
            (!types.is_empty()).then(|| ProtoFile {
                types,
                ..file.clone()
            })
        })
        .collect();

    let report = PruneReport {
        unused_includes: identifier_set
            .includes()
            .iter()
            .filter(|rule| !rule.is_used_in(schema))
            .map(ToString::to_string)
            .collect(),
        unused_excludes: identifier_set
            .excludes()
            .iter()
            .filter(|rule| !rule.is_used_in(schema))
            .map(ToString::to_string)
            .collect(),
    };

    Pruned {
        schema: Schema::new(files),
        report,
    }
}

fn retain_types(types: &[Type], retained: &BTreeSet<&str>) -> Vec<Type> {
    types
        .iter()
        .filter_map(|ty| {
            let nested_types = retain_types(&ty.nested_types, retained);
            if retained.contains(ty.name.as_str()) {
                Some(Type {
                    nested_types,
                    kind: retain_fields(&ty.kind, retained),
                    ..ty.clone()
                })
            } else if !nested_types.is_empty() {
                Some(Type {
                    nested_types,
                    kind: TypeKind::Enclosing,
                    ..ty.clone()
                })
            } else {
                None
            }
        })
        .collect()
}

/// Drops fields whose type was masked out, so no reference dangles
fn retain_fields(kind: &TypeKind, retained: &BTreeSet<&str>) -> TypeKind {
    match kind {
        TypeKind::Message(message) => {
            let mut message = message.clone();
            message.fields.retain(|field| match &field.ty {
                ProtoType::Scalar(_) => true,
                ProtoType::Named(target) => retained.contains(target.as_str()),
            });
            TypeKind::Message(message)
        }
        TypeKind::Enum(_) | TypeKind::Enclosing => kind.clone(),
    }
}
