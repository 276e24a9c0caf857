//! Include/exclude rules selecting which types survive pruning.
//!
//! Rules take three forms:
//!
//! - `pkg.Type`: one type, by fully-qualified name
//! - `pkg.Type#member`: one field or enum constant of a type
//! - `pkg.*`: every type whose name starts with `pkg.`
//!
//! Excludes win over includes. The set is immutable once built; whether a
//! rule matched anything is reported by [`crate::prune`], not stored here.

use std::fmt;

use crate::schema::Schema;

/// What a single rule refers to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Target {
    Type(String),
    Member { type_name: String, member: String },
    Package(String),
}

/// One include or exclude rule, as written plus its parsed target
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rule {
    text: String,
    target: Target,
}

impl Rule {
    pub fn parse(text: &str) -> Self {
        let text = text.trim().to_string();
        let target = if let Some((type_name, member)) = text.split_once('#') {
            Target::Member {
                type_name: type_name.to_string(),
                member: member.to_string(),
            }
        } else if let Some(prefix) = text.strip_suffix(".*") {
            Target::Package(prefix.to_string())
        } else {
            Target::Type(text.clone())
        };
        Self { text, target }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    /// True if this rule names the type as a whole
    pub fn matches_type(&self, type_name: &str) -> bool {
        match &self.target {
            Target::Type(name) => name == type_name,
            Target::Member { .. } => false,
            Target::Package(prefix) => type_name
                .strip_prefix(prefix.as_str())
                .is_some_and(|rest| rest.starts_with('.')),
        }
    }

    /// The type this rule selects for seeding a closure, including the owner
    /// of a member rule
    pub fn selects_type(&self, type_name: &str) -> bool {
        match &self.target {
            Target::Member { type_name: owner, .. } => owner == type_name,
            Target::Type(_) | Target::Package(_) => self.matches_type(type_name),
        }
    }

    /// True if the rule refers to something declared in `schema`
    pub fn is_used_in(&self, schema: &Schema) -> bool {
        match &self.target {
            Target::Type(name) => schema.contains(name),
            Target::Member { type_name, member } => schema
                .get_type(type_name)
                .is_some_and(|ty| ty.has_member(member)),
            Target::Package(_) => schema.type_names().any(|name| self.matches_type(name)),
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Immutable include/exclude rule lists
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifierSet {
    includes: Vec<Rule>,
    excludes: Vec<Rule>,
}

impl IdentifierSet {
    pub fn builder() -> IdentifierSetBuilder {
        IdentifierSetBuilder::default()
    }

    /// No rules at all: pruning is skipped and everything loaded is emitted
    pub fn is_empty(&self) -> bool {
        self.includes.is_empty() && self.excludes.is_empty()
    }

    pub fn includes(&self) -> &[Rule] {
        &self.includes
    }

    pub fn excludes(&self) -> &[Rule] {
        &self.excludes
    }

    /// True if an include rule seeds the closure at this type
    pub fn includes_type(&self, type_name: &str) -> bool {
        self.includes.iter().any(|rule| rule.selects_type(type_name))
    }

    /// True if an exclude rule masks this whole type
    pub fn excludes_type(&self, type_name: &str) -> bool {
        self.excludes.iter().any(|rule| rule.matches_type(type_name))
    }
}

/// Accumulates rules for an [`IdentifierSet`]
#[derive(Debug, Clone, Default)]
pub struct IdentifierSetBuilder {
    includes: Vec<Rule>,
    excludes: Vec<Rule>,
}

impl IdentifierSetBuilder {
    pub fn include(mut self, identifier: &str) -> Self {
        push_rule(&mut self.includes, identifier);
        self
    }

    pub fn exclude(mut self, identifier: &str) -> Self {
        push_rule(&mut self.excludes, identifier);
        self
    }

    pub fn include_all<I, S>(self, identifiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        identifiers
            .into_iter()
            .fold(self, |builder, identifier| builder.include(identifier.as_ref()))
    }

    pub fn exclude_all<I, S>(self, identifiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        identifiers
            .into_iter()
            .fold(self, |builder, identifier| builder.exclude(identifier.as_ref()))
    }

    pub fn build(self) -> IdentifierSet {
        IdentifierSet {
            includes: self.includes,
            excludes: self.excludes,
        }
    }
}

// Blank entries come from trailing commas on the command line.
fn push_rule(rules: &mut Vec<Rule>, identifier: &str) {
    if identifier.trim().is_empty() {
        return;
    }
    let rule = Rule::parse(identifier);
    if !rules.contains(&rule) {
        rules.push(rule);
    }
}
