//! Query translation from the staybook expression AST to MongoDB query syntax.

use bson::{Document, Bson, doc};

use staybook_core::{
    query::{QueryVisitor, Expr, FieldOp},
    mutation::Mutation,
    error::DocumentStoreError,
};


/// Translates query expressions into MongoDB query documents.
pub(crate) struct MongoQueryTranslator;

impl QueryVisitor for MongoQueryTranslator {
    type Output = Document;
    type Error = DocumentStoreError;

    fn visit_and(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        if exprs.is_empty() {
            return Ok(doc! {});
        }

        Ok(doc! {
            "$and": exprs
                .iter()
                .map(|expr| self.visit_expr(expr))
                .collect::<Result<Vec<_>, _>>()?,
        })
    }

    fn visit_or(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        Ok(doc! {
            "$or": exprs
                .iter()
                .map(|expr| self.visit_expr(expr))
                .collect::<Result<Vec<_>, _>>()?,
        })
    }

    fn visit_field(&mut self, field: &str, op: &FieldOp, value: &Bson) -> Result<Self::Output, Self::Error> {
        Ok(doc! {
            field: match op {
                FieldOp::Eq => doc! { "$eq": value },
                FieldOp::Ne => doc! { "$ne": value },
                FieldOp::Gt => doc! { "$gt": value },
                FieldOp::Gte => doc! { "$gte": value },
                FieldOp::Lt => doc! { "$lt": value },
                FieldOp::Lte => doc! { "$lte": value },
                FieldOp::IContains => match value {
                    Bson::String(s) => doc! { "$regex": regex::escape(s), "$options": "i" },
                    _ => return Err(DocumentStoreError::Backend("IContains operator requires a string value".to_string())),
                },
                FieldOp::AnyOf => match value {
                    Bson::Array(_) => doc! { "$in": value },
                    _ => return Err(DocumentStoreError::Backend("AnyOf operator requires an array value".to_string())),
                },
            }
        })
    }
}

/// Translates a mutation into a MongoDB update document.
pub(crate) fn update_document(mutation: Mutation) -> Document {
    match mutation {
        Mutation::Set(fields) => doc! { "$set": fields },
        Mutation::Push { field, value } => doc! { "$push": { field: value } },
        Mutation::Pull { field, matching } => doc! { "$pull": { field: matching } },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use staybook_core::query::Filter;

    #[test]
    fn icontains_escapes_pattern() {
        let translated = MongoQueryTranslator
            .visit_expr(&Filter::icontains("loc.city", "St. (Louis)"))
            .unwrap();

        assert_eq!(
            translated,
            doc! { "loc.city": { "$regex": r"St\. \(Louis\)", "$options": "i" } }
        );
    }

    #[test]
    fn nested_logic_translates() {
        let expr = Filter::and([
            Filter::or([
                Filter::icontains("loc.country", "pt"),
                Filter::icontains("loc.city", "pt"),
            ]),
            Filter::gte("capacity", 3),
        ]);

        let translated = MongoQueryTranslator.visit_expr(&expr).unwrap();

        assert_eq!(
            translated,
            doc! {
                "$and": [
                    { "$or": [
                        { "loc.country": { "$regex": "pt", "$options": "i" } },
                        { "loc.city": { "$regex": "pt", "$options": "i" } },
                    ] },
                    { "capacity": { "$gte": 3 } },
                ]
            }
        );
    }

    #[test]
    fn empty_and_matches_everything() {
        assert_eq!(MongoQueryTranslator.visit_expr(&Filter::and([])).unwrap(), doc! {});
    }

    #[test]
    fn mutations_map_to_update_operators() {
        assert_eq!(
            update_document(Mutation::set(doc! { "price": 200 })),
            doc! { "$set": { "price": 200 } }
        );
        assert_eq!(
            update_document(Mutation::pull("msgs", doc! { "id": "m1" })),
            doc! { "$pull": { "msgs": { "id": "m1" } } }
        );
        assert_eq!(
            update_document(Mutation::push("msgs", doc! { "id": "m2" })),
            doc! { "$push": { "msgs": { "id": "m2" } } }
        );
    }
}
