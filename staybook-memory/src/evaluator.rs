//! Query expression evaluation for in-memory document filtering.
//!
//! This module evaluates query expressions directly against stored BSON documents, following
//! MongoDB's semantics for the operators the services use: dotted paths reach into embedded
//! documents, numbers compare across integer and float representations, and a missing field
//! never matches a comparison.

use std::{cmp::Ordering, collections::HashMap};
use bson::{Bson, Document as BsonDocument, datetime::DateTime, oid::ObjectId};

use staybook_core::{
    query::{QueryVisitor, Expr, FieldOp},
    error::{DocumentStoreError, DocumentStoreResult},
};


/// Type-erased, comparable representation of BSON values.
///
/// Numeric types are normalized to f64 so `Int32(4)` equals `Double(4.0)`.
#[derive(Debug)]
pub(crate) enum Comparable<'a> {
    Null,
    Bool(bool),
    Number(f64),
    DateTime(DateTime),
    String(&'a str),
    ObjectId(ObjectId),
    Array(Vec<Comparable<'a>>),
    Map(HashMap<&'a str, Comparable<'a>>),
}

impl<'a> From<&'a Bson> for Comparable<'a> {
    fn from(bson: &'a Bson) -> Self {
        match bson {
            Bson::Null => Comparable::Null,
            Bson::Boolean(value) => Comparable::Bool(*value),
            Bson::Int32(value) => Comparable::Number(*value as f64),
            Bson::Int64(value) => Comparable::Number(*value as f64),
            Bson::Double(value) => Comparable::Number(*value),
            Bson::DateTime(value) => Comparable::DateTime(*value),
            Bson::String(value) => Comparable::String(value),
            Bson::ObjectId(value) => Comparable::ObjectId(*value),
            Bson::Array(arr) => Comparable::Array(
                arr
                    .iter()
                    .map(Comparable::from)
                    .collect::<Vec<_>>()
            ),
            Bson::Document(doc) => Comparable::Map(
                doc
                    .iter()
                    .map(|(k, v)| (k.as_str(), Comparable::from(v)))
                    .collect::<HashMap<_, _>>()
            ),
            _ => Comparable::Null,
        }
    }
}

impl<'a> PartialEq for Comparable<'a> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Comparable::Null, Comparable::Null) => true,
            (Comparable::Bool(a), Comparable::Bool(b)) => a == b,
            (Comparable::Number(a), Comparable::Number(b)) => a == b,
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a == b,
            (Comparable::String(a), Comparable::String(b)) => a == b,
            (Comparable::ObjectId(a), Comparable::ObjectId(b)) => a == b,
            (Comparable::Array(a), Comparable::Array(b)) => a == b,
            (Comparable::Map(a), Comparable::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl<'a> PartialOrd for Comparable<'a> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Comparable::Bool(a), Comparable::Bool(b)) => a.partial_cmp(b),
            (Comparable::Number(a), Comparable::Number(b)) => a.partial_cmp(b),
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a.partial_cmp(b),
            (Comparable::String(a), Comparable::String(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

/// Resolves a dotted field path (`loc.city`) inside a document.
pub(crate) fn lookup<'a>(document: &'a BsonDocument, path: &str) -> Option<&'a Bson> {
    let mut segments = path.split('.');
    let mut current = document.get(segments.next()?)?;

    for segment in segments {
        current = current.as_document()?.get(segment)?;
    }

    Some(current)
}


pub(crate) struct DocumentEvaluator<'a> {
    document: &'a BsonDocument,
}

impl<'a> DocumentEvaluator<'a> {
    pub fn new(document: &'a BsonDocument) -> Self {
        Self { document }
    }

    pub fn evaluate(&mut self, expr: &Expr) -> DocumentStoreResult<bool> {
        self.visit_expr(expr)
    }
}

impl<'a> QueryVisitor for DocumentEvaluator<'a> {
    type Output = bool;
    type Error = DocumentStoreError;

    fn visit_and(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        for expr in exprs {
            if !self.visit_expr(expr)? {
                return Ok(false);
            }
        }

        Ok(true)
    }

    fn visit_or(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        for expr in exprs {
            if self.visit_expr(expr)? {
                return Ok(true);
            }
        }

        Ok(false)
    }

    fn visit_field(&mut self, field: &str, op: &FieldOp, value: &Bson) -> Result<Self::Output, Self::Error> {
        let Some(field_value) = lookup(self.document, field) else {
            return Ok(matches!(op, FieldOp::Ne));
        };

        let left = Comparable::from(field_value);
        let right = Comparable::from(value);

        match op {
            FieldOp::Eq => Ok(left == right),
            FieldOp::Ne => Ok(left != right),
            FieldOp::Gt | FieldOp::Gte | FieldOp::Lt | FieldOp::Lte => Ok(
                match left.partial_cmp(&right) {
                    Some(ordering) => match op {
                        FieldOp::Gt => ordering == Ordering::Greater,
                        FieldOp::Gte => ordering != Ordering::Less,
                        FieldOp::Lt => ordering == Ordering::Less,
                        FieldOp::Lte => ordering != Ordering::Greater,
                        _ => unreachable!(),
                    },
                    None => false,
                }
            ),
            FieldOp::IContains => match (left, right) {
                (Comparable::String(haystack), Comparable::String(needle)) => Ok(
                    haystack
                        .to_lowercase()
                        .contains(&needle.to_lowercase())
                ),
                (_, Comparable::String(_)) => Ok(false),
                _ => Err(DocumentStoreError::InvalidDocument(
                    "IContains operator requires a string value".to_string(),
                )),
            },
            FieldOp::AnyOf => match (left, right) {
                (Comparable::Array(items), Comparable::Array(values)) => Ok(
                    items
                        .iter()
                        .any(|item| values.contains(item))
                ),
                (single_value, Comparable::Array(values)) => Ok(values.contains(&single_value)),
                _ => Err(DocumentStoreError::InvalidDocument(
                    "AnyOf operator requires an array value".to_string(),
                )),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use staybook_core::query::Filter;

    fn stay() -> BsonDocument {
        doc! {
            "_id": ObjectId::parse_str("5f1e9c8a2b3c4d5e6f708192").unwrap(),
            "type": "Beach House",
            "capacity": 4,
            "loc": { "country": "Portugal", "city": "Lisbon" },
        }
    }

    fn matches(expr: &Expr) -> bool {
        DocumentEvaluator::new(&stay()).evaluate(expr).unwrap()
    }

    #[test]
    fn dotted_path_reaches_embedded_fields() {
        assert!(matches(&Filter::eq("loc.city", "Lisbon")));
        assert!(!matches(&Filter::eq("loc.city", "Porto")));
        assert!(!matches(&Filter::eq("loc.street", "Any")));
    }

    #[test]
    fn icontains_ignores_case() {
        assert!(matches(&Filter::icontains("type", "beach")));
        assert!(matches(&Filter::icontains("loc.country", "TUG")));
        assert!(!matches(&Filter::icontains("type", "cabin")));
    }

    #[test]
    fn numbers_compare_across_representations() {
        assert!(matches(&Filter::gte("capacity", 4.0)));
        assert!(matches(&Filter::gte("capacity", 3_i64)));
        assert!(!matches(&Filter::gte("capacity", 5)));
        assert!(matches(&Expr::field("capacity".into(), FieldOp::Lt, 5.into())));
    }

    #[test]
    fn any_of_matches_object_ids() {
        let id = ObjectId::parse_str("5f1e9c8a2b3c4d5e6f708192").unwrap();
        let other = ObjectId::new();

        assert!(matches(&Filter::any_of("_id", vec![other, id])));
        assert!(!matches(&Filter::any_of("_id", vec![other])));
        assert!(!matches(&Filter::any_of("_id", Vec::<ObjectId>::new())));
    }

    #[test]
    fn or_and_compose() {
        let text = Filter::or([
            Filter::icontains("loc.country", "lis"),
            Filter::icontains("loc.city", "lis"),
        ]);

        assert!(matches(&text));
        assert!(matches(&Filter::and([text.clone(), Filter::gte("capacity", 2)])));
        assert!(!matches(&Filter::and([text, Filter::gte("capacity", 8)])));
        assert!(matches(&Filter::and([])));
    }
}
