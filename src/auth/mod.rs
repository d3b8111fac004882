mod cookie;
mod log_in;
mod log_out;
mod middleware;
mod register;
mod token;

pub use cookie::DEFAULT_COOKIE_DURATION;
pub use log_in::post_log_in;
pub use log_out::get_log_out;
pub use middleware::auth_guard;
pub use register::register_user;

#[cfg(test)]
pub(crate) use cookie::{COOKIE_TOKEN, set_auth_cookie};

#[cfg(test)]
pub use middleware::AuthState;
