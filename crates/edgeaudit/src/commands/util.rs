//! Shared helpers for command handlers.

use dialoguer::Input;
use secrecy::SecretString;

use crate::error::CliError;

/// Map a dialoguer / interactive I/O failure into CliError.
pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Ask for a non-empty line of text.
pub fn prompt_text(prompt: &str) -> Result<String, CliError> {
    let value: String = Input::new()
        .with_prompt(prompt)
        .interact_text()
        .map_err(prompt_err)?;
    let value = value.trim().to_owned();
    if value.is_empty() {
        return Err(CliError::Validation {
            field: prompt.to_lowercase(),
            reason: "cannot be empty".into(),
        });
    }
    Ok(value)
}

/// Ask for a non-empty secret without echo.
pub fn prompt_password(prompt: &str) -> Result<SecretString, CliError> {
    let secret = rpassword::prompt_password(format!("{prompt}: ")).map_err(prompt_err)?;
    if secret.is_empty() {
        return Err(CliError::Validation {
            field: prompt.to_lowercase(),
            reason: "cannot be empty".into(),
        });
    }
    Ok(SecretString::from(secret))
}

/// Store a secret under `account` in the system keyring.
pub fn store_in_keyring(account: &str, secret: &str, label: &str) -> Result<(), CliError> {
    let entry = keyring::Entry::new(edgeaudit_config::KEYRING_SERVICE, account).map_err(|e| {
        CliError::Validation {
            field: "keyring".into(),
            reason: format!("failed to access keyring: {e}"),
        }
    })?;
    entry.set_password(secret).map_err(|e| CliError::Validation {
        field: "keyring".into(),
        reason: format!("failed to store {label} in keyring: {e}"),
    })
}

/// Parse a `config set` value, naming the key on failure.
pub fn parse_value<T: std::str::FromStr>(key: &str, value: &str, expected: &str) -> Result<T, CliError> {
    value.trim().parse().map_err(|_| CliError::Validation {
        field: key.into(),
        reason: format!("must be {expected}"),
    })
}

/// Split a comma-separated list, dropping empty items.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn split_list_trims_and_drops_empties() {
        assert_eq!(split_list(" C1161X, ,C1127 ,"), vec!["C1161X", "C1127"]);
        assert!(split_list("").is_empty());
    }

    #[test]
    fn parse_value_names_the_key() {
        let n: u64 = parse_value("audit.shaper_threshold_mbps", " 150 ", "a number").unwrap();
        assert_eq!(n, 150);
        let err = parse_value::<u16>("ssh.port", "abc", "a port number").unwrap_err();
        assert!(matches!(err, CliError::Validation { ref field, .. } if field == "ssh.port"));
    }
}
