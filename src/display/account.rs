//! Balance display formatting

use crate::models::AccountBalances;

/// Format the three account balances and their total as a table
pub fn format_balances(balances: &AccountBalances, symbol: &str) -> String {
    let mut output = String::new();

    output.push_str(&format!("{:<10}  {:>14}\n", "Account", "Balance"));
    output.push_str(&format!("{:-<10}  {:->14}\n", "", ""));

    for (kind, amount) in balances.iter() {
        output.push_str(&format!(
            "{:<10}  {:>14}\n",
            kind.to_string(),
            amount.format_with_symbol(symbol)
        ));
    }

    output.push_str(&format!("{:-<10}  {:->14}\n", "", ""));
    output.push_str(&format!(
        "{:<10}  {:>14}\n",
        "Total",
        balances.total().format_with_symbol(symbol)
    ));

    output
}
