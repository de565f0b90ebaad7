pub mod templates;

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::SmtpConfig;

pub struct SystemMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SystemMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, String> {
        let creds = Credentials::new(config.user.clone(), config.pass.clone());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| format!("System SMTP error: {e}"))?
            .port(config.port)
            .credentials(creds)
            .build();

        Ok(Self {
            transport,
            from: config.from.clone(),
        })
    }

    /// Notify a form owner that a new submission arrived.
    pub async fn send_submission_notification(
        &self,
        to_email: &str,
        form_title: &str,
        submitter_name: Option<&str>,
        submission_count: i64,
    ) -> Result<(), String> {
        let html = templates::render_submission_notification(
            form_title,
            submitter_name.unwrap_or("Anonymous"),
            submission_count,
        );
        self.send(to_email, &format!("New response on '{form_title}'"), &html)
            .await
    }

    /// Invite someone to fill in a form.
    pub async fn send_form_invitation(
        &self,
        to_email: &str,
        form_title: &str,
        form_url: &str,
        sender_name: &str,
        custom_message: Option<&str>,
    ) -> Result<(), String> {
        let html =
            templates::render_form_invitation(form_title, form_url, sender_name, custom_message);
        self.send(
            to_email,
            &format!("You've been invited to fill in: {form_title}"),
            &html,
        )
        .await
    }

    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), String> {
        let message = Message::builder()
            .from(
                self.from
                    .parse()
                    .map_err(|e| format!("Invalid from address: {e}"))?,
            )
            .to(to.parse().map_err(|e| format!("Invalid to address: {e}"))?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body.to_string())
            .map_err(|e| format!("Failed to build email: {e}"))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| format!("Failed to send email: {e}"))?;

        Ok(())
    }
}
