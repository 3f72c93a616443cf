//! Email bodies for the identity flows

use super::EmailMessage;

pub fn mfa_verify_code(to: &str, user_id: &str, code: &str, ttl_secs: u64) -> EmailMessage {
    EmailMessage {
        to: to.to_string(),
        subject: "Your multi-factor authentication code".to_string(),
        body: format!(
            "Hello {},\n\nYour verification code is {}.\nIt expires in {} minutes.\n",
            user_id,
            code,
            ttl_secs.div_ceil(60)
        ),
    }
}

pub fn email_verify_code(to: &str, user_id: &str, code: &str, ttl_secs: u64) -> EmailMessage {
    EmailMessage {
        to: to.to_string(),
        subject: "Confirm your email address".to_string(),
        body: format!(
            "Hello {},\n\nEnter {} to confirm this email address.\nThe code expires in {} minutes.\n",
            user_id,
            code,
            ttl_secs.div_ceil(60)
        ),
    }
}

pub fn reset_password_link(to: &str, user_id: &str, reset_url: &str) -> EmailMessage {
    EmailMessage {
        to: to.to_string(),
        subject: "Reset your password".to_string(),
        body: format!(
            "Hello {},\n\nOpen the link below to sign in and choose a new password:\n{}\n",
            user_id, reset_url
        ),
    }
}

pub fn temporary_password(
    to: &str,
    user_id: &str,
    password: &str,
    console_url: &str,
) -> EmailMessage {
    EmailMessage {
        to: to.to_string(),
        subject: "Your temporary password".to_string(),
        body: format!(
            "Hello {},\n\nYour temporary password is {}\nSign in at {} and set a new password.\n",
            user_id, password, console_url
        ),
    }
}
