//! Account service - authenticate-or-register.
//!
//! A first authentication with an unknown username registers the account
//! with a starting balance of zero; later authentications verify the
//! password against the stored bcrypt hash.

use crate::error::AppError;
use crate::models::account::Account;
use crate::store::{AccountStore, Store};

/// Resolve `username` to an account, creating it on first contact.
///
/// # Process
///
/// 1. Reject empty usernames/passwords
/// 2. Fetch the account; if absent, hash the password and create-if-absent
/// 3. Commit, then verify the password against the surviving row
///
/// Verifying after the create covers the registration race: if a
/// concurrent request created the account first, the surviving row's hash
/// decides whether this caller's password is accepted.
///
/// # Errors
///
/// - `InvalidInput`: empty username or password
/// - `InvalidCredentials`: password does not match the stored hash
/// - `Hashing`: bcrypt failure
/// - `Conflict` / `Database`: storage failure
pub async fn authenticate_or_register<S>(
    store: &S,
    username: &str,
    password: &str,
) -> Result<Account, AppError>
where
    S: AccountStore,
{
    if username.is_empty() || password.is_empty() {
        return Err(AppError::InvalidInput(
            "username and password are required".to_string(),
        ));
    }

    let mut tx = store.begin().await?;
    let account = match store.fetch(&mut tx, username).await? {
        Some(account) => account,
        None => {
            let password_hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)?;
            store.create_if_absent(&mut tx, username, &password_hash).await?
        }
    };
    store.commit(tx).await?;

    if !matches!(bcrypt::verify(password, &account.password_hash), Ok(true)) {
        return Err(AppError::InvalidCredentials);
    }

    Ok(account)
}
