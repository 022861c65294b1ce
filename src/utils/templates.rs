//! Plain text email templates.

use crate::jobs::EmailJob;

/// Sign-in details for a staff-created or reset account.
pub fn credentials_email(
    to: &str,
    full_name: &str,
    username: &str,
    password: &str,
    login_url: &str,
) -> EmailJob {
    let body = format!(
        "Hello {full_name},\n\
         \n\
         An account on the student records portal has been prepared for you.\n\
         \n\
         Username: {username}\n\
         Password: {password}\n\
         \n\
         Sign in at {login_url} and change your password after your first login.\n"
    );
    EmailJob::new(to, "Your student portal account", body)
}

/// Password reset link.
pub fn password_reset_email(to: &str, full_name: &str, link: &str, ttl_minutes: i64) -> EmailJob {
    let body = format!(
        "Hello {full_name},\n\
         \n\
         We received a request to reset the password of your student portal account.\n\
         Choose a new password here (valid for {ttl_minutes} minutes):\n\
         \n\
         {link}\n\
         \n\
         If you did not ask for this, you can ignore this email.\n"
    );
    EmailJob::new(to, "Reset your password", body)
}
