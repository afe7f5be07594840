//! Clause tree built from a flat filter list.
//!
//! Grouping filters are matched with an explicit stack, so nesting depth is
//! unbounded and unbalanced input is reported instead of producing a
//! malformed query.

use super::{Filter, FilterType, JoinOperator};
use crate::error_handling::FilterError;

/// A filter or a parenthesized sequence of clauses.
#[derive(Debug, Clone, PartialEq)]
pub enum Clause<'a> {
    /// A single non-grouping filter
    Leaf(&'a Filter),
    /// Clauses between a `(` filter and its matching `)`
    Group {
        /// The `(` filter; its join operator joins the whole group
        opener: &'a Filter,
        /// Clauses inside the parentheses
        clauses: Vec<Clause<'a>>,
    },
}

impl<'a> Clause<'a> {
    /// Operator joining this clause to its preceding sibling.
    pub fn join_operator(&self) -> Option<JoinOperator> {
        match self {
            Clause::Leaf(filter) => filter.join_operator,
            Clause::Group { opener, .. } => opener.join_operator,
        }
    }

    /// Id of the filter that starts this clause.
    pub fn id(&self) -> &'a str {
        match self {
            Clause::Leaf(filter) => &filter.id,
            Clause::Group { opener, .. } => &opener.id,
        }
    }
}

type OpenGroup<'a> = (&'a Filter, Vec<Clause<'a>>);

fn innermost<'s, 'a>(
    open: &'s mut [OpenGroup<'a>],
    root: &'s mut Vec<Clause<'a>>,
) -> &'s mut Vec<Clause<'a>> {
    match open.last_mut() {
        Some((_, clauses)) => clauses,
        None => root,
    }
}

/// Builds the clause tree for a filter list.
///
/// # Errors
///
/// - `FilterError::InvalidGrouping` for a grouping filter whose value is not a parenthesis
/// - `FilterError::UnbalancedGrouping` for a `)` with no open group or a `(` never closed
pub fn build_tree(filters: &[Filter]) -> Result<Vec<Clause<'_>>, FilterError> {
    let mut root = Vec::new();
    let mut open: Vec<OpenGroup<'_>> = Vec::new();

    for filter in filters {
        if filter.kind != FilterType::Grouping {
            innermost(&mut open, &mut root).push(Clause::Leaf(filter));
        } else if filter.opens_group() {
            open.push((filter, Vec::new()));
        } else if filter.closes_group() {
            let (opener, clauses) =
                open.pop()
                    .ok_or_else(|| FilterError::UnbalancedGrouping {
                        id: filter.id.clone(),
                    })?;
            innermost(&mut open, &mut root).push(Clause::Group { opener, clauses });
        } else {
            return Err(FilterError::InvalidGrouping {
                id: filter.id.clone(),
                value: filter.value.clone(),
            });
        }
    }

    if let Some((opener, _)) = open.pop() {
        return Err(FilterError::UnbalancedGrouping {
            id: opener.id.clone(),
        });
    }

    Ok(root)
}
