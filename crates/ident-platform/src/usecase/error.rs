//! Use Case Errors
//!
//! Categorized failures returned by every identity operation. Each carries a
//! stable `code`, a human-readable `message` and a `details` map naming the
//! offending identifiers or values.
//!
//! ```ignore
//! use ident_platform::usecase::UseCaseError;
//! use ident_platform::details;
//!
//! UseCaseError::validation_with_details(
//!     "REQUIRED_PARAMETER",
//!     "Required parameter 'options' is missing",
//!     details! { "key" => "options" },
//! );
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::role::RoleType;

/// Build an error detail map from `key => value` pairs.
#[macro_export]
macro_rules! details {
    () => {
        std::collections::HashMap::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = std::collections::HashMap::new();
        $(
            map.insert($key.to_string(), serde_json::json!($value));
        )+
        map
    }};
}

pub type ErrorDetails = HashMap<String, serde_json::Value>;

/// Categorized error types for use case failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum UseCaseError {
    /// Missing or malformed input.
    ValidationError {
        code: String,
        message: String,
        #[serde(default)]
        details: ErrorDetails,
    },

    /// A domain rule rejected the request (wrong state, incompatible role).
    BusinessRuleViolation {
        code: String,
        message: String,
        #[serde(default)]
        details: ErrorDetails,
    },

    /// A referenced record does not exist or is outside the caller's scope.
    NotFoundError {
        code: String,
        message: String,
        #[serde(default)]
        details: ErrorDetails,
    },

    /// No authenticated caller.
    AuthenticationError {
        code: String,
        message: String,
        #[serde(default)]
        details: ErrorDetails,
    },

    /// The caller may not perform the operation.
    AuthorizationError {
        code: String,
        message: String,
        #[serde(default)]
        details: ErrorDetails,
    },

    ConcurrencyError {
        code: String,
        message: String,
        #[serde(default)]
        details: ErrorDetails,
    },

    /// Persistence or collaborator failure; nothing was written.
    CommitError {
        code: String,
        message: String,
        #[serde(default)]
        details: ErrorDetails,
    },
}

impl UseCaseError {
    pub fn validation(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::validation_with_details(code, message, HashMap::new())
    }

    pub fn validation_with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: ErrorDetails,
    ) -> Self {
        Self::ValidationError {
            code: code.into(),
            message: message.into(),
            details,
        }
    }

    pub fn business_rule(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::business_rule_with_details(code, message, HashMap::new())
    }

    pub fn business_rule_with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: ErrorDetails,
    ) -> Self {
        Self::BusinessRuleViolation {
            code: code.into(),
            message: message.into(),
            details,
        }
    }

    pub fn not_found(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::not_found_with_details(code, message, HashMap::new())
    }

    pub fn not_found_with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: ErrorDetails,
    ) -> Self {
        Self::NotFoundError {
            code: code.into(),
            message: message.into(),
            details,
        }
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::AuthenticationError {
            code: "UNAUTHENTICATED".to_string(),
            message: message.into(),
            details: HashMap::new(),
        }
    }

    pub fn authorization_with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: ErrorDetails,
    ) -> Self {
        Self::AuthorizationError {
            code: code.into(),
            message: message.into(),
            details,
        }
    }

    pub fn concurrency(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConcurrencyError {
            code: code.into(),
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Create a commit error.
    pub fn commit(message: impl Into<String>) -> Self {
        Self::CommitError {
            code: "COMMIT_FAILED".to_string(),
            message: message.into(),
            details: HashMap::new(),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            Self::ValidationError { code, .. }
            | Self::BusinessRuleViolation { code, .. }
            | Self::NotFoundError { code, .. }
            | Self::AuthenticationError { code, .. }
            | Self::AuthorizationError { code, .. }
            | Self::ConcurrencyError { code, .. }
            | Self::CommitError { code, .. } => code,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::ValidationError { message, .. }
            | Self::BusinessRuleViolation { message, .. }
            | Self::NotFoundError { message, .. }
            | Self::AuthenticationError { message, .. }
            | Self::AuthorizationError { message, .. }
            | Self::ConcurrencyError { message, .. }
            | Self::CommitError { message, .. } => message,
        }
    }

    pub fn details(&self) -> &ErrorDetails {
        match self {
            Self::ValidationError { details, .. }
            | Self::BusinessRuleViolation { details, .. }
            | Self::NotFoundError { details, .. }
            | Self::AuthenticationError { details, .. }
            | Self::AuthorizationError { details, .. }
            | Self::ConcurrencyError { details, .. }
            | Self::CommitError { details, .. } => details,
        }
    }

    /// Suggested HTTP status for transports that expose these errors.
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::ValidationError { .. } => 400,
            Self::AuthenticationError { .. } => 401,
            Self::AuthorizationError { .. } => 403,
            Self::NotFoundError { .. } => 404,
            Self::BusinessRuleViolation { .. } | Self::ConcurrencyError { .. } => 409,
            Self::CommitError { .. } => 500,
        }
    }
}

// Identity error kinds

impl UseCaseError {
    pub fn user_not_found(user_id: &str, domain_id: &str) -> Self {
        Self::not_found_with_details(
            "USER_NOT_FOUND",
            format!("User '{}' not found in domain '{}'", user_id, domain_id),
            details! { "user_id" => user_id, "domain_id" => domain_id },
        )
    }

    pub fn role_not_found(role_id: &str, domain_id: &str) -> Self {
        Self::not_found_with_details(
            "ROLE_NOT_FOUND",
            format!("Role '{}' not found in domain '{}'", role_id, domain_id),
            details! { "role_id" => role_id, "domain_id" => domain_id },
        )
    }

    pub fn workspace_not_found(workspace_id: &str, domain_id: &str) -> Self {
        Self::not_found_with_details(
            "WORKSPACE_NOT_FOUND",
            format!("Workspace '{}' not found in domain '{}'", workspace_id, domain_id),
            details! { "workspace_id" => workspace_id, "domain_id" => domain_id },
        )
    }

    pub fn role_binding_not_found(role_binding_id: &str, domain_id: &str) -> Self {
        Self::not_found_with_details(
            "ROLE_BINDING_NOT_FOUND",
            format!("Role binding '{}' not found in domain '{}'", role_binding_id, domain_id),
            details! { "role_binding_id" => role_binding_id, "domain_id" => domain_id },
        )
    }

    pub fn domain_not_found(domain_id: &str) -> Self {
        Self::not_found_with_details(
            "DOMAIN_NOT_FOUND",
            format!("Domain '{}' not found", domain_id),
            details! { "domain_id" => domain_id },
        )
    }

    /// A role's type does not fit the binding scope or the binding being re-pointed.
    pub fn not_allowed_role_type(
        request_role_id: &str,
        request_role_type: RoleType,
        supported_role_type: &[RoleType],
    ) -> Self {
        let supported: Vec<&str> = supported_role_type.iter().map(|t| t.as_str()).collect();
        Self::business_rule_with_details(
            "NOT_ALLOWED_ROLE_TYPE",
            format!(
                "Role '{}' has type {} but only {} is allowed here",
                request_role_id,
                request_role_type.as_str(),
                supported.join(" or ")
            ),
            details! {
                "request_role_id" => request_role_id,
                "request_role_type" => request_role_type.as_str(),
                "supported_role_type" => supported,
            },
        )
    }

    pub fn role_binding_already_exists(user_id: &str, role_id: &str, workspace_id: &str) -> Self {
        Self::business_rule_with_details(
            "ROLE_BINDING_ALREADY_EXISTS",
            format!(
                "User '{}' is already bound to role '{}' in workspace '{}'",
                user_id, role_id, workspace_id
            ),
            details! { "user_id" => user_id, "role_id" => role_id, "workspace_id" => workspace_id },
        )
    }

    pub fn required_parameter(key: &str) -> Self {
        Self::validation_with_details(
            "REQUIRED_PARAMETER",
            format!("Required parameter '{}' is missing", key),
            details! { "key" => key },
        )
    }

    pub fn mfa_already_enabled(user_id: &str) -> Self {
        Self::business_rule_with_details(
            "MFA_ALREADY_ENABLED",
            format!("MFA is already enabled for user '{}'", user_id),
            details! { "user_id" => user_id },
        )
    }

    pub fn mfa_already_disabled(user_id: &str) -> Self {
        Self::business_rule_with_details(
            "MFA_ALREADY_DISABLED",
            format!("MFA is already disabled for user '{}'", user_id),
            details! { "user_id" => user_id },
        )
    }

    pub fn mfa_not_enabled(user_id: &str) -> Self {
        Self::business_rule_with_details(
            "MFA_NOT_ENABLED",
            format!("MFA is not configured for user '{}'", user_id),
            details! { "user_id" => user_id },
        )
    }

    pub fn not_supported_mfa_type(requested: &str, supported: &[&str]) -> Self {
        Self::validation_with_details(
            "NOT_SUPPORTED_MFA_TYPE",
            format!("MFA type '{}' is not supported", requested),
            details! { "mfa_type" => requested, "support_mfa_types" => supported },
        )
    }

    pub fn invalid_verify_code(verify_code: &str) -> Self {
        Self::validation_with_details(
            "INVALID_VERIFY_CODE",
            "Verification code is invalid or expired",
            details! { "verify_code" => verify_code },
        )
    }

    pub fn permission_denied(permission: &str, user_id: &str) -> Self {
        Self::authorization_with_details(
            "PERMISSION_DENIED",
            format!("User '{}' lacks permission '{}'", user_id, permission),
            details! { "permission" => permission, "user_id" => user_id },
        )
    }

    pub fn not_allowed_role_scope(role_type: RoleType, allowed: &[RoleType]) -> Self {
        let allowed: Vec<&str> = allowed.iter().map(|t| t.as_str()).collect();
        Self::authorization_with_details(
            "NOT_ALLOWED_ROLE_SCOPE",
            format!("Role type {} may not call this operation", role_type.as_str()),
            details! { "role_type" => role_type.as_str(), "allowed_role_types" => allowed },
        )
    }

    /// The account's email is missing or not yet confirmed.
    pub fn verification_unavailable(user_id: &str) -> Self {
        Self::business_rule_with_details(
            "VERIFICATION_UNAVAILABLE",
            format!("Email of user '{}' is not verified", user_id),
            details! { "user_id" => user_id },
        )
    }

    pub fn unable_to_reset_password_in_external_auth(user_id: &str) -> Self {
        Self::business_rule_with_details(
            "UNABLE_TO_RESET_PASSWORD_IN_EXTERNAL_AUTH",
            format!("User '{}' authenticates externally", user_id),
            details! { "user_id" => user_id },
        )
    }

    pub fn unable_to_reset_password_without_email(user_id: &str) -> Self {
        Self::business_rule_with_details(
            "UNABLE_TO_RESET_PASSWORD_WITHOUT_EMAIL",
            format!("User '{}' has no email address", user_id),
            details! { "user_id" => user_id },
        )
    }

    pub fn invalid_password(reason: &str) -> Self {
        Self::validation_with_details(
            "INVALID_PASSWORD",
            format!("Password rejected: {}", reason),
            details! { "reason" => reason },
        )
    }

    pub fn invalid_email(email: &str) -> Self {
        Self::validation_with_details(
            "INVALID_EMAIL",
            format!("'{}' is not a valid email address", email),
            details! { "email" => email },
        )
    }
}

impl std::fmt::Display for UseCaseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message())
    }
}

impl std::error::Error for UseCaseError {}
