//! The condition-operator surface shared by raw and typed filter builders.

use fetchgraph_proto::{ConditionOperator, Value};

macro_rules! operator_methods {
    (
        none: [$($none:ident => $none_op:ident),* $(,)?],
        one: [$($one:ident => $one_op:ident),* $(,)?],
        count: [$($count:ident => $count_op:ident),* $(,)?],
        two: [$($two:ident => $two_op:ident),* $(,)?],
        many: [$($many:ident => $many_op:ident),* $(,)?] $(,)?
    ) => {
        $(
            #[doc = concat!("Add a `", stringify!($none_op), "` condition (no operand).")]
            fn $none(self, field: &str) -> Self {
                self.condition(field, ConditionOperator::$none_op, Vec::new())
            }
        )*
        $(
            #[doc = concat!("Add a `", stringify!($one_op), "` condition.")]
            fn $one(self, field: &str, value: impl Into<Value>) -> Self {
                self.condition(field, ConditionOperator::$one_op, vec![value.into()])
            }
        )*
        $(
            #[doc = concat!("Add a `", stringify!($count_op), "` condition over `count` units.")]
            fn $count(self, field: &str, count: i32) -> Self {
                self.condition(field, ConditionOperator::$count_op, vec![Value::Int32(count)])
            }
        )*
        $(
            #[doc = concat!("Add a `", stringify!($two_op), "` condition with two operands.")]
            fn $two(self, field: &str, first: impl Into<Value>, second: impl Into<Value>) -> Self {
                self.condition(
                    field,
                    ConditionOperator::$two_op,
                    vec![first.into(), second.into()],
                )
            }
        )*
        $(
            #[doc = concat!("Add a `", stringify!($many_op), "` condition over a set of operands.")]
            fn $many<I, V>(self, field: &str, values: I) -> Self
            where
                I: IntoIterator<Item = V>,
                V: Into<Value>,
            {
                self.condition(
                    field,
                    ConditionOperator::$many_op,
                    values.into_iter().map(Into::into).collect(),
                )
            }
        )*
    };
}

/// Leaf-condition construction, one method per backing-store operator.
///
/// Implementors supply [`condition`](Conditions::condition); every operator
/// method funnels into it with its own operator code. Field names are raw
/// columns for raw builders and metadata field names for typed builders.
pub trait Conditions: Sized {
    /// Append a condition with an explicit operator and operands.
    fn condition(self, field: &str, operator: ConditionOperator, values: Vec<Value>) -> Self;

    operator_methods! {
        none: [
            null => Null,
            not_null => NotNull,
            yesterday => Yesterday,
            today => Today,
            tomorrow => Tomorrow,
            last_7_days => Last7Days,
            next_7_days => Next7Days,
            last_week => LastWeek,
            this_week => ThisWeek,
            next_week => NextWeek,
            last_month => LastMonth,
            this_month => ThisMonth,
            next_month => NextMonth,
            last_year => LastYear,
            this_year => ThisYear,
            next_year => NextYear,
            equal_user_id => EqualUserId,
            not_equal_user_id => NotEqualUserId,
            equal_business_id => EqualBusinessId,
            not_equal_business_id => NotEqualBusinessId,
            equal_user_language => EqualUserLanguage,
            this_fiscal_year => ThisFiscalYear,
            this_fiscal_period => ThisFiscalPeriod,
            next_fiscal_year => NextFiscalYear,
            next_fiscal_period => NextFiscalPeriod,
            last_fiscal_year => LastFiscalYear,
            last_fiscal_period => LastFiscalPeriod,
            equal_user_teams => EqualUserTeams,
            equal_user_or_user_teams => EqualUserOrUserTeams,
            equal_user_or_user_hierarchy => EqualUserOrUserHierarchy,
            equal_user_or_user_hierarchy_and_teams => EqualUserOrUserHierarchyAndTeams,
            equal_role_business_id => EqualRoleBusinessId,
        ],
        one: [
            equal => Equal,
            not_equal => NotEqual,
            greater_than => GreaterThan,
            less_than => LessThan,
            greater_equal => GreaterEqual,
            less_equal => LessEqual,
            like => Like,
            not_like => NotLike,
            on => On,
            on_or_before => OnOrBefore,
            on_or_after => OnOrAfter,
            not_on => NotOn,
            child_of => ChildOf,
            mask => Mask,
            not_mask => NotMask,
            masks_select => MasksSelect,
            contains => Contains,
            does_not_contain => DoesNotContain,
            begins_with => BeginsWith,
            does_not_begin_with => DoesNotBeginWith,
            ends_with => EndsWith,
            does_not_end_with => DoesNotEndWith,
            under => Under,
            not_under => NotUnder,
            under_or_equal => UnderOrEqual,
            above => Above,
            above_or_equal => AboveOrEqual,
            in_fiscal_year => InFiscalYear,
            in_fiscal_period => InFiscalPeriod,
        ],
        count: [
            last_x_hours => LastXHours,
            next_x_hours => NextXHours,
            last_x_days => LastXDays,
            next_x_days => NextXDays,
            last_x_weeks => LastXWeeks,
            next_x_weeks => NextXWeeks,
            last_x_months => LastXMonths,
            next_x_months => NextXMonths,
            last_x_years => LastXYears,
            next_x_years => NextXYears,
            older_than_x_minutes => OlderThanXMinutes,
            older_than_x_hours => OlderThanXHours,
            older_than_x_days => OlderThanXDays,
            older_than_x_weeks => OlderThanXWeeks,
            older_than_x_months => OlderThanXMonths,
            older_than_x_years => OlderThanXYears,
            last_x_fiscal_years => LastXFiscalYears,
            last_x_fiscal_periods => LastXFiscalPeriods,
            next_x_fiscal_years => NextXFiscalYears,
            next_x_fiscal_periods => NextXFiscalPeriods,
        ],
        two: [
            between => Between,
            not_between => NotBetween,
            in_fiscal_period_and_year => InFiscalPeriodAndYear,
            in_or_before_fiscal_period_and_year => InOrBeforeFiscalPeriodAndYear,
            in_or_after_fiscal_period_and_year => InOrAfterFiscalPeriodAndYear,
        ],
        many: [
            is_in => In,
            not_in => NotIn,
            contain_values => ContainValues,
            not_contain_values => DoesNotContainValues,
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder(Vec<(String, ConditionOperator, Vec<Value>)>);

    impl Conditions for Recorder {
        fn condition(
            mut self,
            field: &str,
            operator: ConditionOperator,
            values: Vec<Value>,
        ) -> Self {
            self.0.push((field.to_string(), operator, values));
            self
        }
    }

    #[test]
    fn test_each_method_keeps_its_operator() {
        let recorded = Recorder::default()
            .equal("a", 1)
            .greater_than("b", 5)
            .not_null("c")
            .last_x_days("d", 7)
            .between("e", 1, 10)
            .is_in("f", vec!["x", "y"])
            .under_or_equal("g", [1u8; 16])
            .0;

        let operators: Vec<_> = recorded.iter().map(|(_, op, _)| *op).collect();
        assert_eq!(
            operators,
            vec![
                ConditionOperator::Equal,
                ConditionOperator::GreaterThan,
                ConditionOperator::NotNull,
                ConditionOperator::LastXDays,
                ConditionOperator::Between,
                ConditionOperator::In,
                ConditionOperator::UnderOrEqual,
            ]
        );
        assert!(recorded[2].2.is_empty());
        assert_eq!(recorded[3].2, vec![Value::Int32(7)]);
        assert_eq!(recorded[4].2.len(), 2);
        assert_eq!(
            recorded[5].2,
            vec![Value::String("x".into()), Value::String("y".into())]
        );
    }
}
