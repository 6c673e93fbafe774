//! Certificate dispatch over SMTP (lettre), plus a log-only fallback for
//! environments without a configured relay.

use async_trait::async_trait;
use ccew_core::{CertificateDispatcher, DistributionError, RecipientSet, SubmissionRecord};
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{info, warn};

use crate::config::SmtpConfig;

fn email_err(e: impl std::fmt::Display) -> DistributionError {
    DistributionError::Email {
        message: e.to_string(),
    }
}

pub struct SmtpCertificateDispatcher {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpCertificateDispatcher {
    pub fn new(config: &SmtpConfig) -> anyhow::Result<Self> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?;
        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }
        Ok(Self {
            transport: builder.build(),
            from: config.from_address.parse()?,
        })
    }

    fn build_message(
        &self,
        document: &[u8],
        recipients: &RecipientSet,
        submission: &SubmissionRecord,
    ) -> Result<Message, DistributionError> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .to(recipients.primary.parse::<Mailbox>().map_err(email_err)?)
            .subject(format!(
                "CCEW {} - {}",
                submission.certificate_serial, submission.property_name
            ));
        for copy in &recipients.secondary {
            builder = builder.cc(copy.parse::<Mailbox>().map_err(email_err)?);
        }

        let body = format!(
            "Please find attached the Certificate of Compliance for Electrical Work.\n\n\
             Serial: {}\nProperty: {}\nEnergy provider: {}\nTest completed: {}\n",
            submission.certificate_serial,
            submission.property_name,
            submission.energy_provider,
            submission.test_date,
        );
        let attachment = Attachment::new(format!("ccew-{}.pdf", submission.certificate_serial))
            .body(
                document.to_vec(),
                ContentType::parse("application/pdf").map_err(email_err)?,
            );

        let text = SinglePart::builder()
            .header(ContentType::TEXT_PLAIN)
            .body(body);
        builder
            .multipart(MultiPart::mixed().singlepart(text).singlepart(attachment))
            .map_err(email_err)
    }
}

#[async_trait]
impl CertificateDispatcher for SmtpCertificateDispatcher {
    async fn dispatch(
        &self,
        document: &[u8],
        recipients: &RecipientSet,
        submission: &SubmissionRecord,
    ) -> Result<(), DistributionError> {
        let message = self.build_message(document, recipients, submission)?;
        self.transport.send(message).await.map_err(email_err)?;
        info!(
            primary = %recipients.primary,
            copies = recipients.secondary.len(),
            "certificate dispatched"
        );
        Ok(())
    }
}

/// Dispatcher used when no SMTP relay is configured: logs instead of
/// sending. Development only — a relay must be configured in production
/// for certificates to actually reach the provider.
pub struct LogOnlyDispatcher;

#[async_trait]
impl CertificateDispatcher for LogOnlyDispatcher {
    async fn dispatch(
        &self,
        document: &[u8],
        recipients: &RecipientSet,
        submission: &SubmissionRecord,
    ) -> Result<(), DistributionError> {
        warn!(
            primary = %recipients.primary,
            copies = recipients.secondary.len(),
            serial = %submission.certificate_serial,
            bytes = document.len(),
            "SMTP_HOST not set - certificate NOT sent (log-only dispatch)"
        );
        Ok(())
    }
}
