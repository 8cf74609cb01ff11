//! Expression to iterator tree
//!
//! Rules:
//! - `Eq` / `Range` become labeled leaves over posting lists
//! - Negated operands of a composite become its excludes
//! - Double negation cancels
//! - A negation outside any composite becomes `And{[], [x]}`
//! - A composite with one positive operand and no negated ones collapses
//!
//! Assembly never initializes the tree; a purely negative expression
//! assembles fine and is rejected later if used as an enumeration root.

use serde_json::Value;

use crate::config::EvaluationConfig;
use crate::index::{DocId, IndexKey, PostingIndex};
use crate::nested::{NestedIterator, VecSource};
use crate::observability::{log_event, Event, Logger};

use super::errors::{AssemblyError, AssemblyResult};
use super::expr::QueryExpr;

/// Builds iterator trees over a posting index
pub struct TreeAssembler<'a> {
    index: &'a PostingIndex,
    logger: Logger,
}

impl<'a> TreeAssembler<'a> {
    /// Creates an assembler with the default config
    pub fn new(index: &'a PostingIndex) -> Self {
        Self::with_config(index, &EvaluationConfig::default())
    }

    /// Creates an assembler logging at the config's level
    pub fn with_config(index: &'a PostingIndex, config: &EvaluationConfig) -> Self {
        Self {
            index,
            logger: config.logger(),
        }
    }

    /// Builds an uninitialized tree for `expr`
    pub fn assemble(&self, expr: &QueryExpr) -> AssemblyResult<NestedIterator<DocId>> {
        let (negated, inner) = expr.strip_negation();
        let node = self.build(inner)?;
        let tree = if negated {
            NestedIterator::and(Vec::new(), vec![node])
        } else {
            node
        };

        let rendered = tree.to_string();
        let leaves = tree.leaves().len().to_string();
        log_event(
            &self.logger,
            Event::TreeAssembled,
            &[("leaves", leaves.as_str()), ("tree", rendered.as_str())],
        );
        Ok(tree)
    }

    /// Builds a non-negated expression
    fn build(&self, expr: &QueryExpr) -> AssemblyResult<NestedIterator<DocId>> {
        match expr {
            QueryExpr::Eq { field, value } => {
                ensure_scalar(field, value)?;
                let source = self
                    .index
                    .postings_eq(field, value)
                    .ok_or_else(|| AssemblyError::UnknownField(field.clone()))?;
                Ok(leaf(format!("{} == {}", field, value), source))
            }
            QueryExpr::Range { field, min, max } => {
                for bound in min.iter().chain(max.iter()) {
                    ensure_scalar(field, bound)?;
                }
                let source = self
                    .index
                    .postings_range(field, min.as_ref(), max.as_ref())
                    .ok_or_else(|| AssemblyError::UnknownField(field.clone()))?;
                let label = format!(
                    "{} in [{}, {}]",
                    field,
                    render_bound(min.as_ref(), "-inf"),
                    render_bound(max.as_ref(), "+inf")
                );
                Ok(leaf(label, source))
            }
            QueryExpr::And(operands) => {
                let (includes, excludes) = self.partition(operands, "and")?;
                Ok(collapse(includes, excludes, NestedIterator::and))
            }
            QueryExpr::Or(operands) => {
                let (includes, excludes) = self.partition(operands, "or")?;
                Ok(collapse(includes, excludes, NestedIterator::or))
            }
            QueryExpr::Not(_) => {
                let (negated, inner) = expr.strip_negation();
                let node = self.build(inner)?;
                Ok(if negated {
                    NestedIterator::and(Vec::new(), vec![node])
                } else {
                    node
                })
            }
        }
    }

    fn partition(
        &self,
        operands: &[QueryExpr],
        kind: &'static str,
    ) -> AssemblyResult<(Vec<NestedIterator<DocId>>, Vec<NestedIterator<DocId>>)> {
        if operands.is_empty() {
            return Err(AssemblyError::EmptyComposite(kind));
        }

        let mut includes = Vec::new();
        let mut excludes = Vec::new();
        for operand in operands {
            let (negated, inner) = operand.strip_negation();
            let node = self.build(inner)?;
            if negated {
                excludes.push(node);
            } else {
                includes.push(node);
            }
        }
        Ok((includes, excludes))
    }
}

fn leaf(label: String, source: VecSource<DocId>) -> NestedIterator<DocId> {
    NestedIterator::leaf_labeled(label, source)
}

fn collapse(
    mut includes: Vec<NestedIterator<DocId>>,
    excludes: Vec<NestedIterator<DocId>>,
    compose: fn(Vec<NestedIterator<DocId>>, Vec<NestedIterator<DocId>>) -> NestedIterator<DocId>,
) -> NestedIterator<DocId> {
    if includes.len() == 1 && excludes.is_empty() {
        if let Some(only) = includes.pop() {
            return only;
        }
    }
    compose(includes, excludes)
}

fn ensure_scalar(field: &str, value: &Value) -> AssemblyResult<()> {
    if IndexKey::from_json(value).is_none() {
        return Err(AssemblyError::UnsupportedValue {
            field: field.to_string(),
            value: value.to_string(),
        });
    }
    Ok(())
}

fn render_bound(bound: Option<&Value>, open: &str) -> String {
    bound.map_or_else(|| open.to_string(), Value::to_string)
}
