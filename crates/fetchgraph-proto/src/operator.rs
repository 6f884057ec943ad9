//! Operator vocabularies used by compiled query expressions.

use rkyv::{Archive, Deserialize, Serialize};
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

macro_rules! condition_operators {
    ($( $(#[$doc:meta])* $variant:ident = $code:literal, $name:literal; )+) => {
        /// Comparison operator of a leaf condition.
        ///
        /// Each variant maps 1:1 to an operator code of the backing store.
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, Archive, Serialize, Deserialize,
            SerdeSerialize, SerdeDeserialize,
        )]
        pub enum ConditionOperator {
            $( $(#[$doc])* $variant, )+
        }

        impl ConditionOperator {
            /// Every operator, ordered by code.
            pub const ALL: &'static [ConditionOperator] = &[$(ConditionOperator::$variant,)+];

            /// Numeric operator code understood by the backing store.
            pub fn code(self) -> i32 {
                match self {
                    $( ConditionOperator::$variant => $code, )+
                }
            }

            /// Textual operator name understood by the backing store.
            pub fn name(self) -> &'static str {
                match self {
                    $( ConditionOperator::$variant => $name, )+
                }
            }

            /// Look up an operator by its numeric code.
            pub fn from_code(code: i32) -> Option<Self> {
                match code {
                    $( $code => Some(ConditionOperator::$variant), )+
                    _ => None,
                }
            }

            /// Look up an operator by its textual name.
            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $( $name => Some(ConditionOperator::$variant), )+
                    _ => None,
                }
            }
        }
    };
}

condition_operators! {
    /// Attribute equals the operand.
    Equal = 0, "eq";
    NotEqual = 1, "ne";
    GreaterThan = 2, "gt";
    LessThan = 3, "lt";
    GreaterEqual = 4, "ge";
    LessEqual = 5, "le";
    /// SQL-style `%` wildcard match.
    Like = 6, "like";
    NotLike = 7, "not-like";
    In = 8, "in";
    NotIn = 9, "not-in";
    Between = 10, "between";
    NotBetween = 11, "not-between";
    Null = 12, "null";
    NotNull = 13, "not-null";
    Yesterday = 14, "yesterday";
    Today = 15, "today";
    Tomorrow = 16, "tomorrow";
    Last7Days = 17, "last-seven-days";
    Next7Days = 18, "next-seven-days";
    LastWeek = 19, "last-week";
    ThisWeek = 20, "this-week";
    NextWeek = 21, "next-week";
    LastMonth = 22, "last-month";
    ThisMonth = 23, "this-month";
    NextMonth = 24, "next-month";
    On = 25, "on";
    OnOrBefore = 26, "on-or-before";
    OnOrAfter = 27, "on-or-after";
    LastYear = 28, "last-year";
    ThisYear = 29, "this-year";
    NextYear = 30, "next-year";
    LastXHours = 31, "last-x-hours";
    NextXHours = 32, "next-x-hours";
    LastXDays = 33, "last-x-days";
    NextXDays = 34, "next-x-days";
    LastXWeeks = 35, "last-x-weeks";
    NextXWeeks = 36, "next-x-weeks";
    LastXMonths = 37, "last-x-months";
    NextXMonths = 38, "next-x-months";
    LastXYears = 39, "last-x-years";
    NextXYears = 40, "next-x-years";
    /// Attribute equals the calling user.
    EqualUserId = 41, "eq-userid";
    NotEqualUserId = 42, "ne-userid";
    /// Attribute equals the calling user's business unit.
    EqualBusinessId = 43, "eq-businessid";
    NotEqualBusinessId = 44, "ne-businessid";
    ChildOf = 45, "child-of";
    Mask = 46, "mask";
    NotMask = 47, "not-mask";
    MasksSelect = 48, "masks-select";
    Contains = 49, "contains";
    DoesNotContain = 50, "does-not-contain";
    EqualUserLanguage = 51, "eq-userlanguage";
    NotOn = 52, "not-on";
    OlderThanXMonths = 53, "olderthan-x-months";
    BeginsWith = 54, "begins-with";
    DoesNotBeginWith = 55, "not-begin-with";
    EndsWith = 56, "ends-with";
    DoesNotEndWith = 57, "not-end-with";
    ThisFiscalYear = 58, "this-fiscal-year";
    ThisFiscalPeriod = 59, "this-fiscal-period";
    NextFiscalYear = 60, "next-fiscal-year";
    NextFiscalPeriod = 61, "next-fiscal-period";
    LastFiscalYear = 62, "last-fiscal-year";
    LastFiscalPeriod = 63, "last-fiscal-period";
    LastXFiscalYears = 64, "last-x-fiscal-years";
    LastXFiscalPeriods = 65, "last-x-fiscal-periods";
    NextXFiscalYears = 66, "next-x-fiscal-years";
    NextXFiscalPeriods = 67, "next-x-fiscal-periods";
    InFiscalYear = 68, "in-fiscal-year";
    InFiscalPeriod = 69, "in-fiscal-period";
    InFiscalPeriodAndYear = 70, "in-fiscal-period-and-year";
    InOrBeforeFiscalPeriodAndYear = 71, "in-or-before-fiscal-period-and-year";
    InOrAfterFiscalPeriodAndYear = 72, "in-or-after-fiscal-period-and-year";
    EqualUserTeams = 73, "eq-userteams";
    EqualUserOrUserTeams = 74, "eq-useroruserteams";
    /// Record is below the operand in its hierarchy.
    Under = 75, "under";
    NotUnder = 76, "not-under";
    UnderOrEqual = 77, "eq-or-under";
    /// Record is above the operand in its hierarchy.
    Above = 78, "above";
    AboveOrEqual = 79, "eq-or-above";
    EqualUserOrUserHierarchy = 80, "eq-useroruserhierarchy";
    EqualUserOrUserHierarchyAndTeams = 81, "eq-useroruserhierarchyandteams";
    OlderThanXYears = 82, "olderthan-x-years";
    OlderThanXWeeks = 83, "olderthan-x-weeks";
    OlderThanXDays = 84, "olderthan-x-days";
    OlderThanXHours = 85, "olderthan-x-hours";
    OlderThanXMinutes = 86, "olderthan-x-minutes";
    ContainValues = 87, "contain-values";
    DoesNotContainValues = 88, "not-contain-values";
    EqualRoleBusinessId = 89, "eq-rolebusinessid";
}

/// How the conditions and child nodes of a filter node combine.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Archive, Serialize, Deserialize, SerdeSerialize,
    SerdeDeserialize,
)]
pub enum LogicalOperator {
    /// Every condition must hold.
    #[default]
    And,
    /// At least one condition must hold.
    Or,
}

/// Join semantics of a link entity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Archive, Serialize, Deserialize, SerdeSerialize,
    SerdeDeserialize,
)]
pub enum JoinOperator {
    /// Only parent rows with a matching child are returned.
    #[default]
    Inner,
    /// Parent rows are returned whether or not a child matches.
    LeftOuter,
    Natural,
    MatchFirstRowUsingCrossApply,
    In,
    Exists,
    Any,
    NotAny,
    All,
    NotAll,
}

impl JoinOperator {
    /// Textual link type understood by the backing store.
    pub fn name(self) -> &'static str {
        match self {
            JoinOperator::Inner => "inner",
            JoinOperator::LeftOuter => "outer",
            JoinOperator::Natural => "natural",
            JoinOperator::MatchFirstRowUsingCrossApply => "matchfirstrowusingcrossapply",
            JoinOperator::In => "in",
            JoinOperator::Exists => "exists",
            JoinOperator::Any => "any",
            JoinOperator::NotAny => "not any",
            JoinOperator::All => "all",
            JoinOperator::NotAll => "not all",
        }
    }

    /// Whether a parent row may come back without child attributes.
    pub fn allows_absent_child(self) -> bool {
        matches!(self, JoinOperator::LeftOuter)
    }
}

/// Sort direction of an order expression.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Archive, Serialize, Deserialize, SerdeSerialize,
    SerdeDeserialize,
)]
pub enum OrderType {
    #[default]
    Ascending,
    Descending,
}
