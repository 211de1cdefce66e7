//! Job effort estimation

use rust_decimal::Decimal;

/// Base hours for a job category; unknown categories take 6
pub fn base_hours(category: &str) -> Decimal {
    let hours = match category {
        "support" => 4,
        "research" => 8,
        "content" => 6,
        "code" => 10,
        "data" => 5,
        "analysis" => 8,
        _ => 6,
    };
    Decimal::from(hours)
}

/// Estimated hours for a job: category base, scaled up for larger budgets
/// (×1.5 above 100, ×1.2 above 50).
pub fn estimate_job_hours(category: &str, budget: Decimal) -> Decimal {
    let base = base_hours(category);
    if budget > Decimal::ONE_HUNDRED {
        base * Decimal::new(15, 1)
    } else if budget > Decimal::from(50) {
        base * Decimal::new(12, 1)
    } else {
        base
    }
}
