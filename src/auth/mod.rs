pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use serde::{Deserialize, Serialize};
use validator::Validate;

// Re-export necessary items
pub use extractors::CurrentUser;
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password};
pub use token::{generate_token, verify_token, Claims, TokenSettings};

/// Represents the payload for a user login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// User's email address.
    #[validate(email)]
    pub email: String,
    /// User's password.
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

/// Form-encoded login body, as sent by OAuth2 password-flow clients.
///
/// `username` carries the email address.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl From<LoginForm> for LoginRequest {
    fn from(form: LoginForm) -> Self {
        Self {
            email: form.username,
            password: form.password,
        }
    }
}

/// Represents the payload for a new user registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address for the new account. Must be unique.
    #[validate(email, length(max = 255))]
    pub email: String,
    /// Password for the new account.
    /// Must be at least 6 characters long.
    #[validate(length(min = 6, max = 128))]
    pub password: String,
}

/// Response returned by a successful login.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    /// The signed access token, sent back as `Authorization: Bearer <token>`.
    pub access_token: String,
    /// Always `"bearer"`.
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_login_request_validation() {
        let valid_login = LoginRequest {
            email: "test@example.com".to_string(),
            password: "password123".to_string(),
        };
        assert!(valid_login.validate().is_ok());

        let invalid_email_login = LoginRequest {
            email: "testexample.com".to_string(),
            password: "password123".to_string(),
        };
        assert!(invalid_email_login.validate().is_err());

        let empty_password_login = LoginRequest {
            email: "test@example.com".to_string(),
            password: String::new(),
        };
        assert!(empty_password_login.validate().is_err());
    }

    #[test]
    fn test_login_form_maps_username_to_email() {
        let form: LoginForm = serde_json::from_str(
            r#"{"username": "form@example.com", "password": "secret"}"#,
        )
        .unwrap();
        let login = LoginRequest::from(form);
        assert_eq!(login.email, "form@example.com");
        assert_eq!(login.password, "secret");
        assert!(login.validate().is_ok());
    }

    #[test]
    fn test_register_request_validation() {
        let valid_register = RegisterRequest {
            email: "test@example.com".to_string(),
            password: "password123".to_string(),
        };
        assert!(valid_register.validate().is_ok());

        let invalid_email_register = RegisterRequest {
            email: "not an email".to_string(),
            password: "password123".to_string(),
        };
        assert!(invalid_email_register.validate().is_err());

        let short_password_register = RegisterRequest {
            email: "test@example.com".to_string(),
            password: "12345".to_string(),
        };
        assert!(short_password_register.validate().is_err());
    }

    #[test]
    fn test_token_response_is_bearer() {
        let response = TokenResponse::bearer("abc".to_string());
        assert_eq!(response.token_type, "bearer");
        assert_eq!(response.access_token, "abc");
    }
}
