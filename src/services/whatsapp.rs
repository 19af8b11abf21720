use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when delivering a notification
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Inbox write failed: {0}")]
    InboxError(String),
}

/// Credentials for the Twilio Messages API
#[derive(Debug, Clone)]
pub struct TwilioCredentials {
    pub api_base: String,
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
}

enum Transport {
    /// Messages are only written to the log
    Log,
    Twilio {
        client: Client,
        credentials: TwilioCredentials,
    },
}

/// WhatsApp sender
///
/// In log mode nothing leaves the process, which is what local runs and
/// demos use. Twilio mode posts to the Messages API.
pub struct WhatsAppClient {
    transport: Transport,
}

impl WhatsAppClient {
    pub fn log_only() -> Self {
        Self {
            transport: Transport::Log,
        }
    }

    pub fn twilio(credentials: TwilioCredentials) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            transport: Transport::Twilio { client, credentials },
        })
    }

    pub fn is_live(&self) -> bool {
        matches!(self.transport, Transport::Twilio { .. })
    }

    /// Send `body` to `phone` over WhatsApp
    pub async fn send(&self, phone: &str, body: &str) -> Result<(), NotifyError> {
        match &self.transport {
            Transport::Log => {
                tracing::info!("WhatsApp (log only) to {}: {}", phone, body);
                Ok(())
            }
            Transport::Twilio { client, credentials } => {
                let url = format!(
                    "{}/2010-04-01/Accounts/{}/Messages.json",
                    credentials.api_base.trim_end_matches('/'),
                    credentials.account_sid
                );

                let from = format!("whatsapp:{}", credentials.from_number);
                let to = format!("whatsapp:{}", phone);
                let params = [("From", from.as_str()), ("To", to.as_str()), ("Body", body)];

                let response = client
                    .post(&url)
                    .basic_auth(&credentials.account_sid, Some(&credentials.auth_token))
                    .form(&params)
                    .send()
                    .await?;

                if !response.status().is_success() {
                    let status = response.status();
                    let text = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
                    return Err(NotifyError::ApiError(format!(
                        "Twilio rejected message: {} - {}",
                        status, text
                    )));
                }

                tracing::debug!("WhatsApp message accepted for {}", phone);
                Ok(())
            }
        }
    }
}

/// Body of the WhatsApp alert sent to a matched donor
pub fn format_emergency_alert(
    donor_name: &str,
    blood_group: &str,
    hospital_name: &str,
    distance_km: f64,
) -> String {
    format!(
        "BLOODLINK EMERGENCY ALERT\n\n\
         Hello {},\n\
         Urgent {} blood needed!\n\n\
         Hospital: {}\n\
         Distance: {} km\n\n\
         Open BloodLink App immediately.",
        donor_name, blood_group, hospital_name, distance_km
    )
}
