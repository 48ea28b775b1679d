//! The budget utilization calculator.
//!
//! Given a budget amount and the expense amounts charged against it, works
//! out how much was spent, what is left, and whether the budget was blown.
//! Pure arithmetic: no I/O, no rounding (presentation layers round).

use rust_decimal::Decimal;

/// The derived state of one budget: how much of it has been used.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetStatus {
    /// The summed expense amounts charged against the budget.
    pub actual_spent: Decimal,
    /// The budgeted amount minus the actual spend. Negative once the budget
    /// is exceeded.
    pub remaining: Decimal,
    /// The actual spend as a percentage of the budgeted amount, unrounded.
    /// Zero when the budgeted amount is zero.
    pub percentage_used: Decimal,
    /// Whether the actual spend strictly exceeds the budgeted amount.
    /// Spending the budget exactly is not over budget.
    pub is_over_budget: bool,
}

/// Compute the utilization of a budget of `budget_amount`.
///
/// `matching_expenses` must already be scoped by the caller to the budget's
/// user, category and calendar month, and contain expense amounts only.
pub fn utilization(budget_amount: Decimal, matching_expenses: &[Decimal]) -> BudgetStatus {
    let actual_spent: Decimal = matching_expenses.iter().sum();

    let percentage_used = if budget_amount.is_zero() {
        Decimal::ZERO
    } else {
        actual_spent / budget_amount * Decimal::ONE_HUNDRED
    };

    BudgetStatus {
        actual_spent,
        remaining: budget_amount - actual_spent,
        percentage_used,
        is_over_budget: actual_spent > budget_amount,
    }
}
