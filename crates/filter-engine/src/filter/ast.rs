//! Filter tree model: leaf conditions and boolean combinators.

use std::cmp::Ordering;
use std::fmt;
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};

use super::error::FilterResult;
use super::value::Value;

/// Boolean test over a (normalized) record value.
pub type TestFn = Arc<dyn Fn(&Value) -> FilterResult<bool> + Send + Sync>;

/// Ordering between a record value and an operand.
///
/// `None` means the two values are incomparable: only `NE` matches them.
pub type CompareFn = Arc<dyn Fn(&Value, &Value) -> Option<Ordering> + Send + Sync>;

/// A field path within a record, e.g. `"status"` or `"owner.name"`.
///
/// Paths order lexically; the grouping engine sorts leaves by path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldPath(String);

impl FieldPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterates over the dot-separated segments of the path.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FieldPath {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for FieldPath {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Comparison operator of a leaf condition.
///
/// Symbols parse case-insensitively. An unrecognized symbol is kept as
/// [`OperatorKind::Unknown`] rather than rejected; such leaves match every
/// record and raise a diagnostic when resolved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OperatorKind {
    /// Equal.
    Eq,
    /// Not equal.
    Ne,
    /// Less than.
    Lt,
    /// Less than or equal.
    Le,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Ge,
    /// Between two bounds, both inclusive.
    Bt,
    /// String contains the operand.
    Contains,
    /// String starts with the operand.
    StartsWith,
    /// String ends with the operand.
    EndsWith,
    /// Any other symbol.
    Unknown(String),
}

impl OperatorKind {
    /// Returns the canonical symbol for this operator.
    pub fn symbol(&self) -> &str {
        match self {
            OperatorKind::Eq => "EQ",
            OperatorKind::Ne => "NE",
            OperatorKind::Lt => "LT",
            OperatorKind::Le => "LE",
            OperatorKind::Gt => "GT",
            OperatorKind::Ge => "GE",
            OperatorKind::Bt => "BT",
            OperatorKind::Contains => "Contains",
            OperatorKind::StartsWith => "StartsWith",
            OperatorKind::EndsWith => "EndsWith",
            OperatorKind::Unknown(symbol) => symbol,
        }
    }

    /// Returns true for operators that only apply to string values.
    pub fn is_string_operator(&self) -> bool {
        matches!(
            self,
            OperatorKind::Contains | OperatorKind::StartsWith | OperatorKind::EndsWith
        )
    }
}

impl From<&str> for OperatorKind {
    fn from(symbol: &str) -> Self {
        match symbol.trim().to_ascii_uppercase().as_str() {
            "EQ" => OperatorKind::Eq,
            "NE" => OperatorKind::Ne,
            "LT" => OperatorKind::Lt,
            "LE" => OperatorKind::Le,
            "GT" => OperatorKind::Gt,
            "GE" => OperatorKind::Ge,
            "BT" => OperatorKind::Bt,
            "CONTAINS" => OperatorKind::Contains,
            "STARTSWITH" => OperatorKind::StartsWith,
            "ENDSWITH" => OperatorKind::EndsWith,
            _ => OperatorKind::Unknown(symbol.to_string()),
        }
    }
}

impl From<String> for OperatorKind {
    fn from(symbol: String) -> Self {
        OperatorKind::from(symbol.as_str())
    }
}

impl From<OperatorKind> for String {
    fn from(op: OperatorKind) -> Self {
        op.symbol().to_string()
    }
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// How a combinator joins its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    And,
    Or,
}

/// A leaf condition: `path <operator> value1 [value2]`.
///
/// Nodes are immutable once built. The resolved test is computed on first
/// evaluation and memoized in a write-once cell for the life of the node.
#[derive(Clone)]
pub struct FilterNode {
    path: FieldPath,
    operator: OperatorKind,
    value1: Value,
    value2: Option<Value>,
    case_sensitive: Option<bool>,
    comparator: Option<CompareFn>,
    test: OnceLock<TestFn>,
}

impl FilterNode {
    /// Creates a leaf condition with a single operand.
    pub fn new(path: impl Into<FieldPath>, operator: OperatorKind, value: impl Into<Value>) -> Self {
        Self {
            path: path.into(),
            operator,
            value1: value.into(),
            value2: None,
            case_sensitive: None,
            comparator: None,
            test: OnceLock::new(),
        }
    }

    /// Creates an inclusive range condition (`BT`).
    pub fn between(
        path: impl Into<FieldPath>,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> Self {
        Self::new(path, OperatorKind::Bt, low).with_value2(high)
    }

    /// Sets the second operand used by range operators.
    pub fn with_value2(mut self, value: impl Into<Value>) -> Self {
        self.value2 = Some(value.into());
        self.test = OnceLock::new();
        self
    }

    /// Sets whether string comparisons respect case. Unset means
    /// case-insensitive.
    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = Some(case_sensitive);
        self.test = OnceLock::new();
        self
    }

    /// Uses `comparator` instead of the default ordering. Neither the record
    /// value nor the operands are normalized when a comparator is set.
    pub fn with_comparator(
        mut self,
        comparator: impl Fn(&Value, &Value) -> Option<Ordering> + Send + Sync + 'static,
    ) -> Self {
        self.comparator = Some(Arc::new(comparator));
        self.test = OnceLock::new();
        self
    }

    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    pub fn operator(&self) -> &OperatorKind {
        &self.operator
    }

    pub fn value1(&self) -> &Value {
        &self.value1
    }

    pub fn value2(&self) -> Option<&Value> {
        self.value2.as_ref()
    }

    /// Effective case sensitivity (defaults to insensitive).
    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive.unwrap_or(false)
    }

    pub fn comparator(&self) -> Option<&CompareFn> {
        self.comparator.as_ref()
    }

    pub(crate) fn cached_test(&self) -> &OnceLock<TestFn> {
        &self.test
    }
}

impl fmt::Debug for FilterNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterNode")
            .field("path", &self.path)
            .field("operator", &self.operator)
            .field("value1", &self.value1)
            .field("value2", &self.value2)
            .field("case_sensitive", &self.case_sensitive)
            .field("comparator", &self.comparator.as_ref().map(|_| "<fn>"))
            .field("resolved", &self.test.get().is_some())
            .finish()
    }
}

impl PartialEq for FilterNode {
    fn eq(&self, other: &Self) -> bool {
        let same_comparator = match (&self.comparator, &other.comparator) {
            (None, None) => true,
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        };
        self.path == other.path
            && self.operator == other.operator
            && self.value1 == other.value1
            && self.value2 == other.value2
            && self.case_sensitive == other.case_sensitive
            && same_comparator
    }
}

/// A leaf whose test is supplied verbatim by the caller.
///
/// The record value is handed to the test as fetched, without
/// normalization.
#[derive(Clone)]
pub struct CustomFilter {
    path: FieldPath,
    test: TestFn,
}

impl CustomFilter {
    /// Creates a custom leaf from an infallible predicate.
    pub fn new(
        path: impl Into<FieldPath>,
        test: impl Fn(&Value) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            path: path.into(),
            test: Arc::new(move |value: &Value| -> FilterResult<bool> { Ok(test(value)) }),
        }
    }

    /// Creates a custom leaf from a predicate that may fail.
    pub fn fallible(
        path: impl Into<FieldPath>,
        test: impl Fn(&Value) -> FilterResult<bool> + Send + Sync + 'static,
    ) -> Self {
        Self {
            path: path.into(),
            test: Arc::new(test),
        }
    }

    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    pub fn test(&self) -> &TestFn {
        &self.test
    }
}

impl fmt::Debug for CustomFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomFilter")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl PartialEq for CustomFilter {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path && Arc::ptr_eq(&self.test, &other.test)
    }
}

/// An AND/OR of child filters, evaluated in order.
#[derive(Debug, Clone, PartialEq)]
pub struct Combinator {
    pub mode: Mode,
    pub children: Vec<Filter>,
}

impl Combinator {
    pub fn new(mode: Mode, children: Vec<Filter>) -> Self {
        Self { mode, children }
    }

    pub fn and(children: Vec<Filter>) -> Self {
        Self::new(Mode::And, children)
    }

    pub fn or(children: Vec<Filter>) -> Self {
        Self::new(Mode::Or, children)
    }
}

/// A node of the filter tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Operator-based leaf condition.
    Leaf(FilterNode),
    /// Leaf with a caller-supplied test.
    Custom(CustomFilter),
    /// Boolean combination of children.
    Combinator(Combinator),
}

impl Filter {
    /// Returns the field path of a leaf, or `None` for a combinator.
    pub fn path(&self) -> Option<&FieldPath> {
        match self {
            Filter::Leaf(node) => Some(node.path()),
            Filter::Custom(custom) => Some(custom.path()),
            Filter::Combinator(_) => None,
        }
    }

    /// Creates an AND combinator of the given children.
    pub fn and(children: Vec<Filter>) -> Self {
        Filter::Combinator(Combinator::and(children))
    }

    /// Creates an OR combinator of the given children.
    pub fn or(children: Vec<Filter>) -> Self {
        Filter::Combinator(Combinator::or(children))
    }
}

impl From<FilterNode> for Filter {
    fn from(node: FilterNode) -> Self {
        Filter::Leaf(node)
    }
}

impl From<CustomFilter> for Filter {
    fn from(custom: CustomFilter) -> Self {
        Filter::Custom(custom)
    }
}

impl From<Combinator> for Filter {
    fn from(combinator: Combinator) -> Self {
        Filter::Combinator(combinator)
    }
}

/// A possibly absent filter tree. `None` matches every record.
pub type FilterTree = Option<Filter>;
