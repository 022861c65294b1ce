//! Staff command - bootstraps staff accounts.
//!
//! Staff cannot register through the API; this is the only way in.

use crate::cli::args::{StaffAction, StaffArgs};
use crate::config::Config;
use crate::domain::{Account, AccountRole, NewAccount, Password, RegisterAccount};
use crate::errors::{AppError, AppResult};
use crate::infra::{AccountRepository, AccountStore, Database};

/// Execute the staff command
pub async fn execute(args: StaffArgs, config: Config) -> AppResult<()> {
    match args.action {
        StaffAction::Create {
            username,
            email,
            first_name,
            last_name,
            password,
        } => {
            let db = Database::connect(&config)
                .await
                .map_err(|e| AppError::internal(format!("Database connection failed: {}", e)))?;
            let accounts = AccountStore::new(db.get_connection());

            let input = RegisterAccount {
                username,
                email,
                first_name,
                last_name,
                password1: password.clone(),
                password2: password,
            };
            let account = create_staff(&accounts, input).await?;

            println!(
                "Created staff account '{}' <{}>",
                account.username, account.email
            );
            Ok(())
        }
    }
}

/// Validate and insert a staff account.
pub async fn create_staff(
    accounts: &dyn AccountRepository,
    input: RegisterAccount,
) -> AppResult<Account> {
    let input = input.clean()?;
    Password::check_pair(&input.password1, &input.password2, "password", "password")?;

    let username = input.username;
    let email = input.email;

    if accounts.username_exists(&username).await? {
        return Err(AppError::conflict("Username"));
    }
    if accounts.email_exists(&email, None).await? {
        return Err(AppError::conflict("Email"));
    }

    let password_hash = Password::new(&input.password1)?.into_string();
    let account = accounts
        .create(
            NewAccount {
                username,
                email,
                first_name: input.first_name,
                last_name: input.last_name,
                password_hash,
                role: AccountRole::Staff,
            },
            None,
        )
        .await?;

    tracing::info!(account_id = %account.id, username = %account.username, "Staff account created");
    Ok(account)
}
