//! In-memory aggregation engine.
//!
//! Computes `count`, `avg`, `sum`, `min` and `max` over an already-retrieved
//! row set, with optional grouping, `distinct`, a post-aggregation `having`
//! filter, sorting by the aggregate value and a `first` limit.
//!
//! Grouping keeps first-seen group order, and sorting is stable, so equal
//! inputs always produce identical output. Numeric strings count as numbers.

use crate::arguments::{self, Arguments};
use datagate_policy::ToolError;
use serde_json::{Map, Number, Value};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// A single row: field name to value.
pub type Record = Map<String, Value>;

/// Supported aggregate functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateFunction {
    Count,
    Avg,
    Sum,
    Min,
    Max,
}

impl AggregateFunction {
    pub const ALL: [AggregateFunction; 5] = [
        AggregateFunction::Count,
        AggregateFunction::Avg,
        AggregateFunction::Sum,
        AggregateFunction::Min,
        AggregateFunction::Max,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            AggregateFunction::Count => "count",
            AggregateFunction::Avg => "avg",
            AggregateFunction::Sum => "sum",
            AggregateFunction::Min => "min",
            AggregateFunction::Max => "max",
        }
    }

    /// Parse a function name (case-insensitive).
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for AggregateFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort order for groups, by aggregate value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" => Some(SortDirection::Asc),
            "desc" => Some(SortDirection::Desc),
            _ => None,
        }
    }
}

/// A numeric `having` comparator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Gt,
    Gte,
    Lt,
    Lte,
    Eq,
    Neq,
}

impl Comparator {
    pub const ALL: [Comparator; 6] = [
        Comparator::Gt,
        Comparator::Gte,
        Comparator::Lt,
        Comparator::Lte,
        Comparator::Eq,
        Comparator::Neq,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Comparator::Gt => "gt",
            Comparator::Gte => "gte",
            Comparator::Lt => "lt",
            Comparator::Lte => "lte",
            Comparator::Eq => "eq",
            Comparator::Neq => "neq",
        }
    }

    pub fn parse(op: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == op)
    }

    /// `value <op> threshold`.
    pub fn holds(&self, value: f64, threshold: f64) -> bool {
        match self {
            Comparator::Gt => value > threshold,
            Comparator::Gte => value >= threshold,
            Comparator::Lt => value < threshold,
            Comparator::Lte => value <= threshold,
            Comparator::Eq => value == threshold,
            Comparator::Neq => value != threshold,
        }
    }
}

/// Post-aggregation group filter.
#[derive(Debug, Clone, PartialEq)]
pub enum HavingFilter {
    /// Every comparison must hold.
    Compare(Vec<(Comparator, f64)>),
    /// The aggregate value must equal one of the entries.
    InList(Vec<f64>),
}

impl HavingFilter {
    /// Whether a group's aggregate value passes. A null value never passes.
    pub fn matches(&self, value: Option<f64>) -> bool {
        let Some(value) = value else {
            return false;
        };
        match self {
            HavingFilter::Compare(conditions) => {
                conditions.iter().all(|(op, threshold)| op.holds(value, *threshold))
            }
            HavingFilter::InList(list) => list.iter().any(|v| *v == value),
        }
    }
}

/// The default result column name: `count` for `count(*)`, else `<function>_<field>`.
pub fn compute_alias(function: AggregateFunction, field: &str) -> String {
    if function == AggregateFunction::Count && field == "*" {
        "count".to_string()
    } else {
        format!("{}_{}", function, field)
    }
}

/// What to compute.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateSpec {
    pub function: AggregateFunction,
    /// Field to aggregate, or `*` for row counting.
    pub field: String,
    pub distinct: bool,
    pub group_by: Vec<String>,
    pub having: Option<HavingFilter>,
    pub sort: SortDirection,
    pub first: Option<usize>,
    /// Name of the result column.
    pub alias: String,
}

impl AggregateSpec {
    pub fn new(function: AggregateFunction, field: impl Into<String>) -> Self {
        let field = field.into();
        Self {
            alias: compute_alias(function, &field),
            function,
            field,
            distinct: false,
            group_by: Vec::new(),
            having: None,
            sort: SortDirection::default(),
            first: None,
        }
    }

    pub fn with_distinct(mut self, distinct: bool) -> Self {
        self.distinct = distinct;
        self
    }

    pub fn with_group_by<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group_by = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_having(mut self, having: HavingFilter) -> Self {
        self.having = Some(having);
        self
    }

    pub fn with_sort(mut self, sort: SortDirection) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_first(mut self, first: usize) -> Self {
        self.first = Some(first);
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = alias.into();
        self
    }

    fn counts_rows(&self) -> bool {
        self.field == "*"
    }
}

struct Group {
    key: Vec<Value>,
    values: Vec<Value>,
}

/// Interpret a value as a number. Numeric strings are accepted.
fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

fn dedupe(values: Vec<Value>) -> Vec<Value> {
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter(|v| {
            let key = match numeric(v) {
                // -0.0 + 0.0 is 0.0, so both zeros share a key.
                Some(n) => format!("n:{}", n + 0.0),
                None => format!("v:{}", v),
            };
            seen.insert(key)
        })
        .collect()
}

/// The aggregate value of one group, and its numeric form for having/sort.
fn apply(function: AggregateFunction, values: &[Value]) -> (Value, Option<f64>) {
    if function == AggregateFunction::Count {
        let count = values.len();
        return (Value::from(count), Some(count as f64));
    }

    let numbers: Vec<f64> = values.iter().filter_map(numeric).collect();
    if numbers.is_empty() {
        return (Value::Null, None);
    }

    let sum: f64 = numbers.iter().sum();
    let result = match function {
        AggregateFunction::Sum => sum,
        AggregateFunction::Avg => sum / numbers.len() as f64,
        AggregateFunction::Min => numbers.iter().copied().fold(f64::INFINITY, f64::min),
        AggregateFunction::Max => numbers.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        AggregateFunction::Count => numbers.len() as f64,
    };

    match Number::from_f64(result) {
        Some(n) => (Value::Number(n), Some(result)),
        None => (Value::Null, None),
    }
}

/// Nulls sort last in either direction.
fn compare(a: Option<f64>, b: Option<f64>, sort: SortDirection) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => match sort {
            SortDirection::Asc => a.total_cmp(&b),
            SortDirection::Desc => b.total_cmp(&a),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Aggregate records as described by an [`AggregateSpec`].
pub fn aggregate(records: &[Record], spec: &AggregateSpec) -> Vec<Record> {
    let mut groups: Vec<Group> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    if spec.group_by.is_empty() {
        groups.push(Group {
            key: Vec::new(),
            values: Vec::new(),
        });
        index.insert(String::new(), 0);
    }

    for record in records {
        let key: Vec<Value> = spec
            .group_by
            .iter()
            .map(|f| record.get(f).cloned().unwrap_or(Value::Null))
            .collect();
        let lookup = if spec.group_by.is_empty() {
            String::new()
        } else {
            Value::Array(key.clone()).to_string()
        };

        let slot = *index.entry(lookup).or_insert_with(|| {
            groups.push(Group {
                key,
                values: Vec::new(),
            });
            groups.len() - 1
        });

        let value = if spec.counts_rows() {
            Some(Value::Object(record.clone()))
        } else {
            record.get(&spec.field).filter(|v| !v.is_null()).cloned()
        };
        if let Some(value) = value {
            groups[slot].values.push(value);
        }
    }

    let mut rows: Vec<(Vec<Value>, Value, Option<f64>)> = groups
        .into_iter()
        .map(|group| {
            let values = if spec.distinct {
                dedupe(group.values)
            } else {
                group.values
            };
            let (value, number) = apply(spec.function, &values);
            (group.key, value, number)
        })
        .filter(|(_, _, number)| spec.having.as_ref().is_none_or(|h| h.matches(*number)))
        .collect();

    rows.sort_by(|a, b| compare(a.2, b.2, spec.sort));

    if let Some(first) = spec.first {
        rows.truncate(first);
    }

    tracing::debug!(
        function = %spec.function,
        field = %spec.field,
        input = records.len(),
        groups = rows.len(),
        "Aggregated records"
    );

    rows.into_iter()
        .map(|(key, value, _)| {
            let mut row: Record = spec.group_by.iter().cloned().zip(key).collect();
            row.insert(spec.alias.clone(), value);
            row
        })
        .collect()
}

/// A validated `aggregate_records` call.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRequest {
    pub entity: String,
    /// Equality filter applied before aggregation.
    pub filter: Arguments,
    pub spec: AggregateSpec,
}

impl AggregateRequest {
    /// Validate raw tool arguments.
    pub fn parse(args: &Arguments) -> Result<Self, ToolError> {
        let entity = arguments::required_str(args, "entity")?;
        let function_name = arguments::required_str(args, "function")?;
        let field = arguments::required_str(args, "field")?;

        let function = AggregateFunction::parse(function_name).ok_or_else(|| {
            ToolError::invalid_arguments(format!(
                "Unsupported aggregate function '{}'. Supported functions: count, avg, sum, min, max",
                function_name
            ))
        })?;

        if field == "*" && function != AggregateFunction::Count {
            return Err(ToolError::invalid_arguments(format!(
                "Field '*' can only be used with the count function, not '{}'",
                function
            )));
        }

        let mut spec = AggregateSpec::new(function, field)
            .with_distinct(arguments::flag(args, "distinct")?)
            .with_group_by(arguments::string_list(args, "groupby")?);

        if let Some(order) = arguments::optional_str(args, "orderby")? {
            spec.sort = SortDirection::parse(order).ok_or_else(|| {
                ToolError::invalid_arguments(format!(
                    "Invalid orderby value '{}'. Expected 'asc' or 'desc'",
                    order
                ))
            })?;
        }

        if let Some(having) = arguments::optional_object(args, "having")? {
            spec.having = parse_having(having)?;
        }

        spec.first = arguments::positive_int(args, "first")?;

        Ok(Self {
            entity: entity.to_string(),
            filter: arguments::optional_object(args, "filter")?
                .cloned()
                .unwrap_or_default(),
            spec,
        })
    }
}

fn parse_having(having: &Arguments) -> Result<Option<HavingFilter>, ToolError> {
    let mut conditions = Vec::new();
    let mut in_list = None;

    for (op, value) in having {
        if op == "in" {
            let list = value
                .as_array()
                .and_then(|items| items.iter().map(numeric).collect::<Option<Vec<f64>>>())
                .filter(|list| !list.is_empty())
                .ok_or_else(|| {
                    ToolError::invalid_arguments(
                        "Having operator 'in' requires a non-empty array of numbers",
                    )
                })?;
            in_list = Some(list);
            continue;
        }

        let comparator = Comparator::parse(op).ok_or_else(|| {
            ToolError::invalid_arguments(format!(
                "Unsupported having operator '{}'. Supported operators: gt, gte, lt, lte, eq, neq, in",
                op
            ))
        })?;
        let threshold = numeric(value).ok_or_else(|| {
            ToolError::invalid_arguments(format!(
                "Having operator '{}' requires a numeric value, got {}",
                op,
                arguments::type_name(value)
            ))
        })?;
        conditions.push((comparator, threshold));
    }

    match (in_list, conditions.is_empty()) {
        (Some(_), false) => Err(ToolError::invalid_arguments(
            "Having operator 'in' cannot be combined with comparison operators",
        )),
        (Some(list), true) => Ok(Some(HavingFilter::InList(list))),
        (None, false) => Ok(Some(HavingFilter::Compare(conditions))),
        (None, true) => Ok(None),
    }
}
