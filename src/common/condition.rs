use crate::common;
use crate::error::{Error, Result};

use aws_sdk_dynamodb::types;
use serde::Serialize;
use serde_dynamo::to_attribute_value;
use std::{collections, ops};

/// Logical operator for combining conditions.
#[derive(Clone, Debug, PartialEq)]
pub enum LogicalOperator {
    /// Logical AND - all conditions must be true.
    And,
    /// Logical OR - at least one condition must be true.
    Or,
}

impl ops::Deref for LogicalOperator {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        match self {
            Self::And => " and ",
            Self::Or => " or ",
        }
    }
}

/// Condition types for DynamoDB expressions.
///
/// Each variant carries exactly the values its operator needs, so a `between`
/// always has both bounds and `exists` never has a value.
///
/// ```rust
/// use dynamodb_facade::common::condition;
///
/// let eq = condition::Condition::Equals("value".to_string());
/// let gt = condition::Condition::GreaterThan(100);
/// let exists: condition::Condition<String> = condition::Condition::Exists;
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Condition<T> {
    /// Checks if an attribute begins with a specified prefix.
    BeginsWith(T),
    /// Checks if an attribute value is between two values (inclusive).
    Between(T, T),
    /// Checks if an attribute contains a specified value.
    Contains(T),
    /// Checks if an attribute value equals a specified value.
    Equals(T),
    /// Checks if an attribute exists.
    Exists,
    /// Checks if an attribute value is greater than a specified value.
    GreaterThan(T),
    /// Checks if an attribute value is greater than or equal to a specified value.
    GreaterThanOrEqual(T),
    /// Checks if an attribute value is in a non-empty list of specified values.
    In(Vec<T>),
    /// Checks if an attribute value is less than a specified value.
    LessThan(T),
    /// Checks if an attribute value is less than or equal to a specified value.
    LessThanOrEqual(T),
    /// Checks if an attribute value does not equal a specified value.
    NotEqual(T),
    /// Checks if an attribute does not exist.
    NotExists,
}

impl<T: Serialize> Condition<T> {
    fn comparison(
        name: &str,
        operator: &str,
        tag: &str,
        value: T,
        index: &mut usize,
        values: &mut collections::HashMap<String, types::AttributeValue>,
    ) -> Result<String> {
        let value = to_attribute_value(value)?;
        let placeholder = common::value_placeholder(name, tag, index);
        let expression = format!("{name} {operator} {placeholder}");
        values.insert(placeholder, value);
        Ok(expression)
    }

    fn function(
        name: &str,
        function: &str,
        value: T,
        index: &mut usize,
        values: &mut collections::HashMap<String, types::AttributeValue>,
    ) -> Result<String> {
        let value = to_attribute_value(value)?;
        let placeholder = common::value_placeholder(name, function, index);
        let expression = format!("{function}({name}, {placeholder})");
        values.insert(placeholder, value);
        Ok(expression)
    }

    pub(crate) fn get_expression(
        self,
        name: &str,
        index: &mut usize,
    ) -> Result<common::ExpressionInput> {
        let mut values = collections::HashMap::new();
        let expression = match self {
            Self::BeginsWith(prefix) => {
                Self::function(name, "begins_with", prefix, index, &mut values)?
            }
            Self::Between(start, end) => {
                let start = to_attribute_value(start)?;
                let end = to_attribute_value(end)?;
                let start_placeholder = common::value_placeholder(name, "start", index);
                let end_placeholder = common::value_placeholder(name, "end", index);
                let expression =
                    format!("{name} between {start_placeholder} and {end_placeholder}");
                values.insert(start_placeholder, start);
                values.insert(end_placeholder, end);
                expression
            }
            Self::Contains(value) => Self::function(name, "contains", value, index, &mut values)?,
            Self::Equals(value) => Self::comparison(name, "=", "eq", value, index, &mut values)?,
            Self::Exists => format!("attribute_exists({name})"),
            Self::GreaterThan(value) => {
                Self::comparison(name, ">", "gt", value, index, &mut values)?
            }
            Self::GreaterThanOrEqual(value) => {
                Self::comparison(name, ">=", "gte", value, index, &mut values)?
            }
            Self::In(list) => {
                if list.is_empty() {
                    return Err(Error::EmptyInList {
                        column: name.to_string(),
                    });
                }
                let mut placeholders = Vec::with_capacity(list.len());
                for value in list {
                    let value = to_attribute_value(value)?;
                    let placeholder = common::value_placeholder(name, "in", index);
                    values.insert(placeholder.clone(), value);
                    placeholders.push(placeholder);
                }
                format!("{name} in ({})", placeholders.join(","))
            }
            Self::LessThan(value) => Self::comparison(name, "<", "lt", value, index, &mut values)?,
            Self::LessThanOrEqual(value) => {
                Self::comparison(name, "<=", "lte", value, index, &mut values)?
            }
            Self::NotEqual(value) => {
                Self::comparison(name, "<>", "ne", value, index, &mut values)?
            }
            Self::NotExists => format!("attribute_not_exists({name})"),
        };
        Ok(common::ExpressionInput {
            expression,
            expression_attribute_values: values,
        })
    }
}

/// Condition applied to a named attribute.
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnCondition<T> {
    /// The condition to apply to the attribute.
    pub condition: Condition<T>,
    /// The name of the attribute to apply the condition to.
    pub name: String,
}

impl<T> ColumnCondition<T> {
    /// Apply `condition` to the attribute `name`.
    pub fn new(name: impl Into<String>, condition: Condition<T>) -> Self {
        Self {
            condition,
            name: name.into(),
        }
    }
}

/// Declarative filter: an AND group and an OR group of conditions.
///
/// The AND group is conjoined, the OR group is disjoined and parenthesized, and
/// the two groups are then conjoined: `<and> and (<or>)`. An empty filter
/// compiles to nothing. Nesting beyond these two groups is not supported.
///
/// ```rust
/// use dynamodb_facade::common::condition::{ColumnCondition, Condition, Filter};
///
/// let filter = Filter::default()
///     .and(ColumnCondition::new("plan", Condition::Equals("pro")))
///     .or(ColumnCondition::new("tier", Condition::Equals("gold")))
///     .or(ColumnCondition::new("tier", Condition::Equals("silver")));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Filter<T> {
    /// Conditions that must all hold.
    pub and: Vec<ColumnCondition<T>>,
    /// Conditions of which at least one must hold.
    pub or: Vec<ColumnCondition<T>>,
}

impl<T> Default for Filter<T> {
    fn default() -> Self {
        Self {
            and: Vec::new(),
            or: Vec::new(),
        }
    }
}

impl<T> Filter<T> {
    /// Add a condition to the AND group.
    pub fn and(mut self, condition: ColumnCondition<T>) -> Self {
        self.and.push(condition);
        self
    }

    /// Add a condition to the OR group.
    pub fn or(mut self, condition: ColumnCondition<T>) -> Self {
        self.or.push(condition);
        self
    }

    /// Whether the filter holds no conditions at all.
    pub fn is_empty(&self) -> bool {
        self.and.is_empty() && self.or.is_empty()
    }
}

impl<T: Serialize> Filter<T> {
    fn get_group_expression(
        conditions: Vec<ColumnCondition<T>>,
        operator: LogicalOperator,
        index: &mut usize,
    ) -> Result<common::ExpressionInput> {
        let mut operations = Vec::with_capacity(conditions.len());
        for column_condition in conditions {
            let operation = column_condition
                .condition
                .get_expression(&column_condition.name, index)?;
            operations.push(operation);
        }
        Ok(common::ExpressionInput::merge(&operator, operations))
    }

    pub(crate) fn get_expression_operation(
        self,
        index: &mut usize,
    ) -> Result<common::ExpressionInput> {
        let and_operation = Self::get_group_expression(self.and, LogicalOperator::And, index)?;
        let mut or_operation = Self::get_group_expression(self.or, LogicalOperator::Or, index)?;
        if !or_operation.expression.is_empty() {
            or_operation.expression = format!("({})", or_operation.expression);
        }
        Ok(common::ExpressionInput::merge(
            &LogicalOperator::And,
            vec![and_operation, or_operation],
        ))
    }
}

impl<T: Serialize> TryFrom<Filter<T>> for common::ExpressionInput {
    type Error = Error;

    fn try_from(filter: Filter<T>) -> Result<Self> {
        filter.get_expression_operation(&mut 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;
    use serde_json::Value;

    #[rstest]
    #[case::empty(
        Filter::default(),
        common::ExpressionInput::default()
    )]
    #[case::and_single_equals(
        Filter::default()
            .and(
                ColumnCondition::new(
                    "a",
                    Condition::Equals(
                        Value::Number(
                            1.into()
                        )
                    )
                )
            ),
        common::ExpressionInput {
            expression: "a = :a_eq0".to_string(),
            expression_attribute_values: collections::HashMap::from(
                [(
                    ":a_eq0".to_string(),
                    types::AttributeValue::N(
                        "1".to_string()
                    ),
                )]
            ),
        }
    )]
    #[case::and_group_is_not_parenthesized(
        Filter::default()
            .and(
                ColumnCondition::new(
                    "a",
                    Condition::NotEqual(
                        Value::String(
                            "b".to_string()
                        )
                    )
                )
            )
            .and(
                ColumnCondition::new(
                    "c",
                    Condition::LessThanOrEqual(
                        Value::Number(
                            2.into()
                        )
                    )
                )
            )
            .and(
                ColumnCondition::new(
                    "d",
                    Condition::GreaterThan(
                        Value::Number(
                            3.into()
                        )
                    )
                )
            ),
        common::ExpressionInput {
            expression: "a <> :a_ne0 and c <= :c_lte1 and d > :d_gt2".to_string(),
            expression_attribute_values: collections::HashMap::from(
                [
                    (
                        ":a_ne0".to_string(),
                        types::AttributeValue::S(
                            "b".to_string()
                        )
                    ),
                    (
                        ":c_lte1".to_string(),
                        types::AttributeValue::N(
                            "2".to_string()
                        )
                    ),
                    (
                        ":d_gt2".to_string(),
                        types::AttributeValue::N(
                            "3".to_string()
                        )
                    ),
                ]
            ),
        }
    )]
    #[case::or_only_is_parenthesized(
        Filter::default()
            .or(
                ColumnCondition::new(
                    "a",
                    Condition::LessThan(
                        Value::Number(
                            1.into()
                        )
                    )
                )
            )
            .or(
                ColumnCondition::new(
                    "a",
                    Condition::GreaterThanOrEqual(
                        Value::Number(
                            9.into()
                        )
                    )
                )
            ),
        common::ExpressionInput {
            expression: "(a < :a_lt0 or a >= :a_gte1)".to_string(),
            expression_attribute_values: collections::HashMap::from(
                [
                    (
                        ":a_lt0".to_string(),
                        types::AttributeValue::N(
                            "1".to_string()
                        )
                    ),
                    (
                        ":a_gte1".to_string(),
                        types::AttributeValue::N(
                            "9".to_string()
                        )
                    ),
                ]
            ),
        }
    )]
    #[case::and_with_or(
        Filter::default()
            .and(
                ColumnCondition::new(
                    "a",
                    Condition::Exists
                )
            )
            .or(
                ColumnCondition::new(
                    "b",
                    Condition::NotExists
                )
            )
            .or(
                ColumnCondition::new(
                    "b",
                    Condition::Equals(
                        Value::String(
                            "c".to_string()
                        )
                    )
                )
            ),
        common::ExpressionInput {
            expression: "attribute_exists(a) and (attribute_not_exists(b) or b = :b_eq0)".to_string(),
            expression_attribute_values: collections::HashMap::from(
                [(
                    ":b_eq0".to_string(),
                    types::AttributeValue::S(
                        "c".to_string()
                    ),
                )]
            ),
        }
    )]
    #[case::between(
        Filter::default()
            .and(
                ColumnCondition::new(
                    "age",
                    Condition::Between(
                        Value::Number(
                            5.into()
                        ),
                        Value::Number(
                            10.into()
                        ),
                    )
                )
            ),
        common::ExpressionInput {
            expression: "age between :age_start0 and :age_end1".to_string(),
            expression_attribute_values: collections::HashMap::from(
                [
                    (
                        ":age_start0".to_string(),
                        types::AttributeValue::N(
                            "5".to_string()
                        )
                    ),
                    (
                        ":age_end1".to_string(),
                        types::AttributeValue::N(
                            "10".to_string()
                        )
                    ),
                ]
            ),
        }
    )]
    #[case::two_betweens_do_not_collide(
        Filter::default()
            .and(
                ColumnCondition::new(
                    "a",
                    Condition::Between(
                        Value::Number(
                            1.into()
                        ),
                        Value::Number(
                            2.into()
                        ),
                    )
                )
            )
            .and(
                ColumnCondition::new(
                    "b",
                    Condition::Between(
                        Value::Number(
                            3.into()
                        ),
                        Value::Number(
                            4.into()
                        ),
                    )
                )
            ),
        common::ExpressionInput {
            expression: "a between :a_start0 and :a_end1 and b between :b_start2 and :b_end3".to_string(),
            expression_attribute_values: collections::HashMap::from(
                [
                    (
                        ":a_start0".to_string(),
                        types::AttributeValue::N(
                            "1".to_string()
                        )
                    ),
                    (
                        ":a_end1".to_string(),
                        types::AttributeValue::N(
                            "2".to_string()
                        )
                    ),
                    (
                        ":b_start2".to_string(),
                        types::AttributeValue::N(
                            "3".to_string()
                        )
                    ),
                    (
                        ":b_end3".to_string(),
                        types::AttributeValue::N(
                            "4".to_string()
                        )
                    ),
                ]
            ),
        }
    )]
    #[case::in_list(
        Filter::default()
            .and(
                ColumnCondition::new(
                    "status",
                    Condition::In(
                        vec![
                            Value::String(
                                "A".to_string()
                            ),
                            Value::String(
                                "B".to_string()
                            ),
                        ]
                    )
                )
            ),
        common::ExpressionInput {
            expression: "status in (:status_in0,:status_in1)".to_string(),
            expression_attribute_values: collections::HashMap::from(
                [
                    (
                        ":status_in0".to_string(),
                        types::AttributeValue::S(
                            "A".to_string()
                        )
                    ),
                    (
                        ":status_in1".to_string(),
                        types::AttributeValue::S(
                            "B".to_string()
                        )
                    ),
                ]
            ),
        }
    )]
    #[case::functions(
        Filter::default()
            .and(
                ColumnCondition::new(
                    "tags",
                    Condition::Contains(
                        Value::String(
                            "x".to_string()
                        )
                    )
                )
            )
            .and(
                ColumnCondition::new(
                    "sk",
                    Condition::BeginsWith(
                        Value::String(
                            "ORDER#".to_string()
                        )
                    )
                )
            ),
        common::ExpressionInput {
            expression: "contains(tags, :tags_contains0) and begins_with(sk, :sk_begins_with1)".to_string(),
            expression_attribute_values: collections::HashMap::from(
                [
                    (
                        ":tags_contains0".to_string(),
                        types::AttributeValue::S(
                            "x".to_string()
                        )
                    ),
                    (
                        ":sk_begins_with1".to_string(),
                        types::AttributeValue::S(
                            "ORDER#".to_string()
                        )
                    ),
                ]
            ),
        }
    )]
    #[case::same_column_in_both_groups(
        Filter::default()
            .and(
                ColumnCondition::new(
                    "a",
                    Condition::Equals(
                        Value::Number(
                            1.into()
                        )
                    )
                )
            )
            .or(
                ColumnCondition::new(
                    "a",
                    Condition::Equals(
                        Value::Number(
                            2.into()
                        )
                    )
                )
            ),
        common::ExpressionInput {
            expression: "a = :a_eq0 and (a = :a_eq1)".to_string(),
            expression_attribute_values: collections::HashMap::from(
                [
                    (
                        ":a_eq0".to_string(),
                        types::AttributeValue::N(
                            "1".to_string()
                        )
                    ),
                    (
                        ":a_eq1".to_string(),
                        types::AttributeValue::N(
                            "2".to_string()
                        )
                    ),
                ]
            ),
        }
    )]
    fn test_filter_to_expression_input(
        #[case] filter: Filter<Value>,
        #[case] expected: common::ExpressionInput,
    ) {
        let actual: common::ExpressionInput = filter.try_into().unwrap();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_empty_in_list_is_rejected() {
        let filter: Filter<Value> =
            Filter::default().and(ColumnCondition::new("status", Condition::In(vec![])));
        let actual: Result<common::ExpressionInput> = filter.try_into();
        assert!(matches!(actual, Err(Error::EmptyInList { column }) if column == "status"));
    }
}
