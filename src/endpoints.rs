//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/categories/{category_id}', use [format_endpoint].

/// The route for logging in a user.
pub const LOG_IN: &str = "/api/log_in";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/api/log_out";
/// The route to register users.
pub const USERS: &str = "/api/users";
/// The route to view and edit the logged-in user's profile.
pub const PROFILE: &str = "/api/profile";
/// The route for checking that the server and its database are up.
pub const HEALTH: &str = "/health";
/// The route to list and create categories.
pub const CATEGORIES: &str = "/api/categories";
/// The route to update and delete a category.
pub const CATEGORY: &str = "/api/categories/{category_id}";
/// The route to list and create transactions (expenses).
pub const TRANSACTIONS: &str = "/api/transactions";
/// The route to update and delete a transaction.
pub const TRANSACTION: &str = "/api/transactions/{record_id}";
/// The route to list and create incomes.
pub const INCOMES: &str = "/api/incomes";
/// The route to update and delete an income.
pub const INCOME: &str = "/api/incomes/{record_id}";
/// The route to list and create investments.
pub const INVESTMENTS: &str = "/api/investments";
/// The route to update and delete an investment.
pub const INVESTMENT: &str = "/api/investments/{record_id}";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// Assumes that the parameter is the last part of the path and is wrapped in
/// braces, e.g. "/api/incomes/{record_id}".
#[cfg(test)]
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    match endpoint_path.find('{') {
        Some(start) => format!("{}{id}", &endpoint_path[..start]),
        None => endpoint_path.to_owned(),
    }
}
