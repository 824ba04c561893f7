//! Filter expressions and query windows.
//!
//! A [`Query`] pairs an optional filter expression with an offset/limit window. Backends execute
//! queries by walking the expression with a [`QueryVisitor`]: the in-memory backend evaluates it
//! against each document, the MongoDB backend translates it into a BSON query document.
//!
//! ```ignore
//! use staybook_core::{page::PageRequest, query::{Query, Filter}};
//!
//! let second_page_of_big_stays = Query::builder()
//!     .filter(Filter::eq("hostId", "h1").and(Filter::gte("capacity", 4)))
//!     .page(PageRequest::new(1))
//!     .build();
//! ```
//!
//! [`Filter`] covers what the listings need: `eq`, `gte`, `icontains` for case-insensitive
//! substrings, `any_of` for set membership and the `and`/`or` combinators. Other comparisons are
//! built directly with [`Expr::field`].
//!
//! Field names may be dotted paths into embedded documents (`loc.city`).

use bson::Bson;

use crate::{error::DocumentStoreError, page::PageRequest};

/// How a field is compared against the value of an [`Expr::Field`].
#[derive(Debug, Clone, PartialEq)]
pub enum FieldOp {
    Eq,
    /// Also matches documents missing the field.
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    /// String field contains the value, ignoring case. The value is literal text, not a pattern.
    IContains,
    /// Field equals any of the values in the given array.
    AnyOf,
}

/// Predicate over stored documents.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Every child matches. An empty list matches everything.
    And(Vec<Expr>),
    /// At least one child matches.
    Or(Vec<Expr>),
    Field {
        /// Top-level name or dotted path.
        field: String,
        op: FieldOp,
        value: Bson,
    },
}

impl Expr {
    pub fn field(field: String, op: FieldOp, value: Bson) -> Self {
        Expr::Field { field, op, value }
    }

    /// Conjunction with `other`, appended in place when `self` is already an `And`.
    pub fn and(self, other: Expr) -> Self {
        match self {
            Expr::And(mut list) => {
                list.push(other);
                Expr::And(list)
            }
            _ => Expr::And(vec![self, other]),
        }
    }
}

/// A structured query: optional filter plus an offset/limit window.
///
/// Results come back in the backend's natural iteration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    /// `None` matches every document.
    pub filter: Option<Expr>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl Query {
    /// An unfiltered, unwindowed query.
    pub fn new() -> Self {
        Query::default()
    }

    pub fn builder() -> QueryBuilder {
        QueryBuilder::new()
    }
}

/// Constructors for [`Expr`] leaves and combinators.
pub struct Filter;

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Eq, value.into())
    }

    pub fn gte(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Gte, value.into())
    }

    /// Matches documents where the string field contains `text`, ignoring case.
    pub fn icontains(field: impl Into<String>, text: impl Into<String>) -> Expr {
        Expr::field(field.into(), FieldOp::IContains, Bson::String(text.into()))
    }

    /// Matches documents where the field equals one of `values`.
    pub fn any_of(field: impl Into<String>, values: impl IntoIterator<Item = impl Into<Bson>>) -> Expr {
        Expr::field(
            field.into(),
            FieldOp::AnyOf,
            Bson::Array(values.into_iter().map(Into::into).collect()),
        )
    }

    pub fn and(exprs: impl IntoIterator<Item = Expr>) -> Expr {
        Expr::And(exprs.into_iter().collect())
    }

    pub fn or(exprs: impl IntoIterator<Item = Expr>) -> Expr {
        Expr::Or(exprs.into_iter().collect())
    }
}

#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    query: Query,
}

impl QueryBuilder {
    pub fn new() -> Self {
        QueryBuilder { query: Query::default() }
    }

    pub fn filter(mut self, filter: Expr) -> Self {
        self.query.filter = Some(filter);
        self
    }

    /// Replaces the filter, clearing it when `filter` is `None`.
    pub fn filter_opt(mut self, filter: Option<Expr>) -> Self {
        self.query.filter = filter;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.query.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.query.offset = Some(offset);
        self
    }

    /// Restricts the query to one page of results.
    pub fn page(self, page: PageRequest) -> Self {
        self.offset(page.offset()).limit(page.page_size)
    }

    pub fn build(self) -> Query {
        self.query
    }
}

/// Walks an [`Expr`] tree. Backends implement this to evaluate or translate filters.
pub trait QueryVisitor {
    type Output;
    type Error: Into<DocumentStoreError>;

    fn visit_and(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error>;
    fn visit_or(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error>;
    fn visit_field(
        &mut self,
        field: &str,
        op: &FieldOp,
        value: &Bson,
    ) -> Result<Self::Output, Self::Error>;

    fn visit_expr(&mut self, expr: &Expr) -> Result<Self::Output, Self::Error> {
        match expr {
            Expr::And(exprs) => self.visit_and(exprs),
            Expr::Or(exprs) => self.visit_or(exprs),
            Expr::Field { field, op, value } => self.visit_field(field, op, value),
        }
    }
}
