pub mod account;
pub mod credential;

pub use account::Account;
pub use credential::Credential;
