//! Terminal rendering for simulation runs

use agentjobs_core::ReputationSummary;
use agentjobs_market::FundsSnapshot;
use agentjobs_matching::MatchQuality;
use agentjobs_types::Decimal;
use colored::*;

const RULE_WIDTH: usize = 60;

/// Amounts are shown to the cent
pub fn money(amount: Decimal) -> String {
    format!("${:.2}", amount.round_dp(2))
}

pub fn heading(title: &str) {
    let rule = "━".repeat(RULE_WIDTH);
    println!();
    println!("{}", rule.bright_black());
    println!(" {}", title.bright_white().bold());
    println!("{}", rule.bright_black());
}

pub fn done(message: &str) {
    println!("  {} {}", "✓".bright_green(), message);
}

pub fn note(message: &str) {
    println!("  {} {}", "→".bright_blue(), message);
}

pub fn skipped(message: &str) {
    println!("  {} {}", "⚠".yellow(), message.yellow());
}

fn field(key: &str, value: &str) {
    println!("      {:<18}{}", format!("{}:", key), value.bright_cyan());
}

fn quality_label(quality: MatchQuality) -> ColoredString {
    let label = format!("{:?}", quality).to_lowercase();
    match quality {
        MatchQuality::Excellent | MatchQuality::Good => label.green(),
        MatchQuality::Moderate => label.yellow(),
        MatchQuality::Weak | MatchQuality::Poor => label.red(),
    }
}

/// One line for an approved job
pub fn job_completed(title: &str, agent: &str, quality: MatchQuality, net: Decimal, fee: Decimal) {
    done(&format!(
        "{} done by {} ({} match), paid {} after {} fee",
        title,
        agent,
        quality_label(quality),
        money(net),
        money(fee)
    ));
}

pub fn reputation(name: &str, summary: &ReputationSummary) {
    note(name);
    field("rating", &format!("{:.2}", summary.rating));
    field("trust", &summary.trust_level.to_string());
    field("jobs completed", &summary.jobs_completed.to_string());
    field("earned", &money(summary.total_earned));
    if !summary.badges.is_empty() {
        let badges: Vec<&str> = summary.badges.iter().map(|b| b.label()).collect();
        field("badges", &badges.join(", "));
    }
}

pub fn ledger(completed: usize, unfilled: usize, snapshot: &FundsSnapshot) {
    heading("Ledger");
    field("jobs completed", &completed.to_string());
    field("jobs unfilled", &unfilled.to_string());
    field("deposited", &money(snapshot.deposited));
    field("company balances", &money(snapshot.company_balances));
    field("held in escrow", &money(snapshot.escrowed));
    field("pending payouts", &money(snapshot.pending_payouts));
    field("paid out", &money(snapshot.paid_out));
    field("platform revenue", &money(snapshot.platform_revenue));
    if snapshot.reconciles() {
        done("ledger reconciles");
    } else {
        skipped("ledger does not reconcile");
    }
}
