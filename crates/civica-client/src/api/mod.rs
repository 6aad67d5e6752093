//! Resource group implementations.

mod credit_titles;
mod password;
mod taxpayers;
mod terms;
mod users;

pub use credit_titles::CreditTitlesApi;
pub use password::PasswordApi;
pub use taxpayers::TaxpayersApi;
pub use terms::TermsApi;
pub use users::UsersApi;
