//! Delivery of verification and password reset codes.
//!
//! Lifecycle operations never wait on email delivery: `dispatch_code_email`
//! hands the message to a detached task, and a failed or timed-out send is
//! only visible in the logs.

use crate::config::EmailConfig;
use crate::errors::{ServiceError, ServiceResult};
use askama::Template;
use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart, SinglePart, header::ContentType};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// Why a code is being sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodePurpose {
    Signup,
    ResetPassword,
}

/// A coded email addressed to one user.
#[derive(Debug, Clone)]
pub struct CodeEmail {
    pub to_email: String,
    pub recipient_name: String,
    pub code: String,
    pub purpose: CodePurpose,
}

impl CodeEmail {
    pub fn subject(&self) -> String {
        match self.purpose {
            CodePurpose::Signup => format!("Relocator email verification code: {}", self.code),
            CodePurpose::ResetPassword => format!("Relocator password reset code: {}", self.code),
        }
    }

    pub fn text_body(&self) -> String {
        match self.purpose {
            CodePurpose::Signup => format!(
                "Hey {} your email verification code is {}",
                self.recipient_name, self.code
            ),
            CodePurpose::ResetPassword => format!(
                "Hey {} your password reset code is {}\n\nIf you did not request a password reset, you can safely ignore this email.",
                self.recipient_name, self.code
            ),
        }
    }

    /// Renders the HTML alternative. Template variables are HTML-escaped.
    pub fn html_body(&self) -> ServiceResult<String> {
        let (heading, intro) = match self.purpose {
            CodePurpose::Signup => ("Verify your email", "your email verification code is"),
            CodePurpose::ResetPassword => ("Reset your password", "your password reset code is"),
        };

        CodeEmailHtml {
            heading,
            intro,
            name: &self.recipient_name,
            code: &self.code,
        }
        .render()
        .map_err(|e| ServiceError::internal_error(format!("Failed to render email: {e}")))
    }
}

#[derive(Template)]
#[template(path = "email/code.html")]
struct CodeEmailHtml<'a> {
    heading: &'a str,
    intro: &'a str,
    name: &'a str,
    code: &'a str,
}

/// Transport used to deliver coded emails.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_code(&self, email: &CodeEmail) -> ServiceResult<()>;
}

/// SMTP delivery through lettre.
pub struct SmtpMailer {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    config: EmailConfig,
}

impl SmtpMailer {
    /// Creates a new SmtpMailer instance
    pub fn new(config: EmailConfig) -> ServiceResult<Self> {
        let creds = Credentials::new(config.smtp_username.clone(), config.smtp_password.clone());

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .map_err(|e| ServiceError::validation(format!("Invalid SMTP host: {e}")))?
            .port(config.smtp_port)
            .credentials(creds)
            .build();

        Ok(Self { mailer, config })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_code(&self, email: &CodeEmail) -> ServiceResult<()> {
        let html_body = email.html_body()?;

        let from_mailbox = Mailbox::from_str(&format!(
            "{} <{}>",
            self.config.from_name, self.config.from_email
        ))
        .map_err(|e| ServiceError::validation(format!("Invalid from email: {e}")))?;

        let to_mailbox = Mailbox::from_str(&email.to_email)
            .map_err(|e| ServiceError::validation(format!("Invalid recipient email: {e}")))?;

        let message = Message::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .subject(email.subject())
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(email.text_body()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body),
                    ),
            )
            .map_err(|e| ServiceError::validation(format!("Failed to build email: {e}")))?;

        self.mailer
            .send(message)
            .await
            .map_err(|e| ServiceError::external_service(format!("Failed to send email: {e}")))?;

        Ok(())
    }
}

/// Local dev mailer that logs instead of sending.
#[derive(Clone, Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_code(&self, email: &CodeEmail) -> ServiceResult<()> {
        tracing::info!(
            to_email = %email.to_email,
            purpose = ?email.purpose,
            "SMTP not configured, email not sent"
        );
        tracing::debug!(to_email = %email.to_email, code = %email.code, "undelivered code");
        Ok(())
    }
}

/// Picks the SMTP mailer when configured, the log mailer otherwise.
pub fn mailer_from_config(config: Option<EmailConfig>) -> ServiceResult<Arc<dyn Mailer>> {
    match config {
        Some(email_config) => Ok(Arc::new(SmtpMailer::new(email_config)?)),
        None => {
            tracing::warn!("SMTP_USERNAME/SMTP_PASSWORD not set, codes will only be logged");
            Ok(Arc::new(LogMailer))
        }
    }
}

/// Sends `email` on a detached task, bounded by `timeout`.
pub fn dispatch_code_email(mailer: Arc<dyn Mailer>, email: CodeEmail, timeout: Duration) {
    tokio::spawn(async move {
        match tokio::time::timeout(timeout, mailer.send_code(&email)).await {
            Ok(Ok(())) => {
                tracing::info!(to_email = %email.to_email, purpose = ?email.purpose, "Email sent")
            }
            Ok(Err(e)) => {
                tracing::error!(to_email = %email.to_email, "Error sending email: {e}")
            }
            Err(_) => tracing::warn!(
                to_email = %email.to_email,
                "Email send timed out after {}s",
                timeout.as_secs()
            ),
        }
    });
}


#[cfg(test)]
mod tests {
    use super::testing::RecordingMailer;
    use super::*;

    fn email(purpose: CodePurpose) -> CodeEmail {
        CodeEmail {
            to_email: "a@x.com".to_string(),
            recipient_name: "A B".to_string(),
            code: "12345".to_string(),
            purpose,
        }
    }

    #[test]
    fn test_content_depends_on_purpose() {
        let signup = email(CodePurpose::Signup);
        assert!(signup.subject().contains("verification code: 12345"));
        assert_eq!(
            signup.text_body(),
            "Hey A B your email verification code is 12345"
        );

        let reset = email(CodePurpose::ResetPassword);
        assert!(reset.subject().contains("password reset code: 12345"));
        assert!(reset.text_body().starts_with("Hey A B your password reset code is 12345"));
        assert!(reset.html_body().unwrap().contains("Reset your password"));
    }

    #[test]
    fn test_html_body_escapes_recipient_name() {
        let mut signup = email(CodePurpose::Signup);
        signup.recipient_name = r#"<a href="https://evil.example">claim</a> B"#.to_string();

        let html = signup.html_body().unwrap();
        assert!(!html.contains("<a href"));
        assert!(!html.contains("</a>"));
        assert!(html.contains("claim"));
        assert!(html.contains("12345"));
    }

    #[tokio::test]
    async fn test_dispatch_delivers_in_background() {
        let (mailer, outbox) = RecordingMailer::new();
        dispatch_code_email(mailer, email(CodePurpose::Signup), Duration::from_secs(1));

        let sent = outbox.next().await;
        assert_eq!(sent.to_email, "a@x.com");
        assert_eq!(sent.purpose, CodePurpose::Signup);
    }

    #[tokio::test]
    async fn test_log_mailer_always_succeeds() {
        assert!(LogMailer.send_code(&email(CodePurpose::ResetPassword)).await.is_ok());
        assert!(mailer_from_config(None).is_ok());
    }
}
