//! Position-ordered view over the attributes and blocks of a body.

use super::extent::{attribute_range, block_range, block_type_range};
use super::SourceFile;
use hcl_edit::structure::{Attribute, Block, Body, Structure};
use std::ops::Range;
use tracing::debug;

/// Whether a construct is an attribute or a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstructKind {
    /// `name = value`
    Attribute,
    /// `type labels... { ... }`
    Block,
}

/// Uniform view of an attribute or nested block.
#[derive(Debug, Clone)]
pub struct Construct<'b> {
    /// Attribute or block.
    pub kind: ConstructKind,
    /// Attribute key or block type.
    pub identifier: &'b str,
    /// Full extent of the construct.
    pub range: Range<usize>,
    /// Extent of the key or type keyword.
    pub ident_range: Range<usize>,
    /// Declaration index within the parent body.
    pub order: usize,
    /// The underlying structure.
    pub structure: &'b Structure,
}

impl<'b> Construct<'b> {
    /// The attribute, if this is one.
    #[must_use]
    pub fn as_attribute(&self) -> Option<&'b Attribute> {
        self.structure.as_attribute()
    }

    /// The block, if this is one.
    #[must_use]
    pub fn as_block(&self) -> Option<&'b Block> {
        self.structure.as_block()
    }

    /// Returns `true` for an attribute named `name`.
    #[must_use]
    pub fn is_attribute_named(&self, name: &str) -> bool {
        self.kind == ConstructKind::Attribute && self.identifier == name
    }
}

/// Result of a "members must come first" query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Misplaced {
    /// Index of the first non-member that precedes a member.
    pub offender: usize,
    /// Indices of every non-member preceding the furthest member, in order.
    pub offenders: Vec<usize>,
    /// Index of the furthest member.
    pub anchor_member: usize,
}

/// Merges the structures of `body` into one sequence ordered by start byte.
///
/// Structures without span information are skipped.
#[must_use]
pub fn enumerate<'b>(file: &SourceFile, body: &'b Body) -> Vec<Construct<'b>> {
    let mut constructs: Vec<Construct<'b>> = body
        .iter()
        .enumerate()
        .filter_map(|(order, structure)| match structure {
            Structure::Attribute(attr) => {
                let range = attribute_range(file, attr)?;
                let ident_range = attr.key.span_or(range.start);
                Some(Construct {
                    kind: ConstructKind::Attribute,
                    identifier: attr.key.as_str(),
                    range,
                    ident_range,
                    order,
                    structure,
                })
            }
            Structure::Block(block) => Some(Construct {
                kind: ConstructKind::Block,
                identifier: block.ident.as_str(),
                range: block_range(block)?,
                ident_range: block_type_range(block)?,
                order,
                structure,
            }),
        })
        .collect();

    constructs.sort_by_key(|c| c.range.start);
    if constructs
        .windows(2)
        .any(|pair| pair[0].range.start == pair[1].range.start)
    {
        debug!(
            "constructs sharing a start byte in {}",
            file.path().display()
        );
    }
    constructs
}

/// Returns `true` if any construct other than `target` starts after
/// `target` ends.
#[must_use]
pub fn has_construct_after(constructs: &[Construct<'_>], target: usize) -> bool {
    constructs_after(constructs, target).next().is_some()
}

/// Constructs starting after `target` ends.
pub fn constructs_after<'c, 'b>(
    constructs: &'c [Construct<'b>],
    target: usize,
) -> impl Iterator<Item = &'c Construct<'b>> + 'c {
    let end = constructs.get(target).map_or(usize::MAX, |t| t.range.end);
    constructs
        .iter()
        .enumerate()
        .filter(move |&(i, c)| i != target && c.range.start >= end)
        .map(|(_, c)| c)
}

/// Checks that every member appears before any non-member.
///
/// Returns `None` when there are no members or the members already lead
/// the sequence.
#[must_use]
pub fn first_misplaced<F>(constructs: &[Construct<'_>], is_member: F) -> Option<Misplaced>
where
    F: Fn(&Construct<'_>) -> bool,
{
    let anchor_member = constructs.iter().rposition(&is_member)?;
    let offenders: Vec<usize> = constructs[..anchor_member]
        .iter()
        .enumerate()
        .filter(|(_, c)| !is_member(c))
        .map(|(i, _)| i)
        .collect();

    let offender = *offenders.first()?;
    Some(Misplaced {
        offender,
        offenders,
        anchor_member,
    })
}

trait SpanOr {
    fn span_or(&self, at: usize) -> Range<usize>;
}

impl<T> SpanOr for T
where
    T: hcl_edit::Span,
{
    fn span_or(&self, at: usize) -> Range<usize> {
        self.span().unwrap_or(at..at)
    }
}
