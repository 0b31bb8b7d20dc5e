//! Validation run on form input before anything is sent to the API

use crate::CoreError;

/// Game titles only need to be present
pub fn validate_title(title: &str) -> Result<(), CoreError> {
    if title.trim().is_empty() {
        return Err(CoreError::Validation("Title cannot be empty".into()));
    }
    Ok(())
}

/// Player names must be present and a single word
pub fn validate_player_name(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation("Name cannot be empty".into()));
    }
    if name.chars().any(char::is_whitespace) {
        return Err(CoreError::Validation("Name cannot contain spaces".into()));
    }
    Ok(())
}

/// Id of an existing player being added to a game
pub fn validate_player_id(id: &str) -> Result<(), CoreError> {
    if id.trim().is_empty() {
        return Err(CoreError::Validation("Id cannot be empty".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(result: Result<(), CoreError>) -> String {
        result.unwrap_err().to_string()
    }

    #[test]
    fn test_title() {
        assert!(validate_title("Trivia Night").is_ok());
        assert_eq!(message(validate_title("")), "Title cannot be empty");
        assert_eq!(message(validate_title(" \t ")), "Title cannot be empty");
    }

    #[test]
    fn test_player_name() {
        assert!(validate_player_name("alice").is_ok());
        assert_eq!(message(validate_player_name("   ")), "Name cannot be empty");
        assert_eq!(
            message(validate_player_name("al ice")),
            "Name cannot contain spaces"
        );
        assert_eq!(
            message(validate_player_name("alice\n")),
            "Name cannot contain spaces"
        );
        assert_eq!(
            message(validate_player_name(" alice")),
            "Name cannot contain spaces"
        );
    }

    #[test]
    fn test_player_id() {
        assert!(validate_player_id("42").is_ok());
        assert_eq!(message(validate_player_id("")), "Id cannot be empty");
    }
}
