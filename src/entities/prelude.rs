pub use super::accounts::Entity as Accounts;
pub use super::credentials::Entity as Credentials;
