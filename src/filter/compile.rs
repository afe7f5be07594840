//! Filter list → Solr query text.

use log::debug;

use super::clause::{build_tree, Clause};
use super::value::render_filter;
use super::{Filter, FilterType, JoinOperator};
use crate::config::FilterMode;
use crate::error_handling::FilterError;

/// Compiles a filter list into the text of the `q` parameter.
///
/// An empty list compiles to the empty string. The result is not checked
/// against the query grammar.
///
/// # Errors
///
/// In [`FilterMode::Structured`] every malformed filter is an error (see
/// [`FilterError`]). In [`FilterMode::Legacy`] only unparseable dates are; other
/// problems produce whatever text the datastore search UI would have produced.
pub fn compile(filters: &[Filter], mode: FilterMode) -> Result<String, FilterError> {
    match mode {
        FilterMode::Structured => compile_structured(filters),
        FilterMode::Legacy => compile_legacy(filters),
    }
}

fn compile_structured(filters: &[Filter]) -> Result<String, FilterError> {
    let tree = build_tree(filters)?;
    let mut query = String::new();
    render_sequence(&tree, &mut query)?;
    Ok(query)
}

fn render_sequence(clauses: &[Clause<'_>], query: &mut String) -> Result<(), FilterError> {
    for (index, clause) in clauses.iter().enumerate() {
        // first clause of a sequence is joined by its parent, or nothing
        if index > 0 {
            let id = || clause.id().to_string();
            match clause.join_operator() {
                Some(JoinOperator::Unrecognized) => {
                    return Err(FilterError::UnrecognizedJoinOperator { id: id() })
                }
                Some(join) => push_join(query, join),
                None => return Err(FilterError::MissingJoinOperator { id: id() }),
            }
        }

        match clause {
            Clause::Leaf(filter) => {
                let fragment =
                    render_filter(filter)?.ok_or_else(|| FilterError::UnsupportedOperator {
                        id: filter.id.clone(),
                        field: filter.field.clone(),
                    })?;
                query.push_str(&fragment);
            }
            Clause::Group { clauses, .. } => {
                query.push('(');
                render_sequence(clauses, query)?;
                query.push(')');
            }
        }
    }
    Ok(())
}

fn push_join(query: &mut String, join: JoinOperator) {
    query.push(' ');
    query.push_str(join.as_str());
    query.push(' ');
}

fn compile_legacy(filters: &[Filter]) -> Result<String, FilterError> {
    let mut query = String::new();

    for (index, filter) in filters.iter().enumerate() {
        if index > 0 && !filter_is_grouping(filters, &filter.id) {
            if filter.join_operator == Some(JoinOperator::Unrecognized) {
                debug!("Filter '{}' has an unrecognized join operator, using AND", filter.id);
            }
            push_join(&mut query, filter.join_operator.unwrap_or(JoinOperator::And));
        }

        match render_filter(filter)? {
            Some(fragment) => query.push_str(&fragment),
            None => debug!(
                "Dropping filter '{}' on '{}': operator not supported for its type",
                filter.id, filter.field
            ),
        }
    }

    Ok(query)
}

/// Positional grouping test of the datastore search UI.
///
/// Finds the filter just before the first occurrence of `filter_id` (looking from
/// position 1; position 1 itself when not found), then returns whether the first
/// filter that is either a `(` sharing that filter's id or a `)` sharing
/// `filter_id` is of type grouping. Only single-level groups come out right.
fn filter_is_grouping(filters: &[Filter], filter_id: &str) -> bool {
    if filters.len() <= 1 {
        return false;
    }

    let previous_index = filters
        .iter()
        .enumerate()
        .skip(1)
        .find(|(_, f)| f.id == filter_id)
        .map_or(1, |(i, _)| i - 1);
    let previous_id = &filters[previous_index].id;

    for f in filters {
        if f.value == "(" && &f.id == previous_id {
            return f.kind == FilterType::Grouping;
        }
        if f.value == ")" && f.id == filter_id {
            return f.kind == FilterType::Grouping;
        }
    }
    false
}
