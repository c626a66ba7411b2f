use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::notifications::Notifier;

/// Domain events emitted by services after their database writes commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Transport events
    LegCreated {
        leg_id: Uuid,
        transporter_id: Uuid,
        amount: Decimal,
    },
    LegStatusChanged {
        leg_id: Uuid,
        old_status: String,
        new_status: String,
    },

    // Reconciliation events
    DeliveryAllocated {
        delivery_id: Uuid,
        leg_id: Uuid,
        amount: Decimal,
        remaining: Decimal,
    },
    DeliveryCancelled {
        delivery_id: Uuid,
        leg_id: Uuid,
        amount: Decimal,
    },
    DeliveryVerified {
        delivery_id: Uuid,
        accepted: bool,
        variance: Decimal,
        transporter_phone: String,
    },

    // Sales events
    SaleRecorded {
        sale_id: Uuid,
        diary_shop_id: Uuid,
        total_amount: Decimal,
    },
    SaleStatusChanged {
        sale_id: Uuid,
        new_status: String,
    },

    // Milk request events
    MilkRequestCreated {
        request_id: Uuid,
        amount: Decimal,
    },
    MilkRequestDecided {
        request_id: Uuid,
        new_status: String,
        requesting_contact: String,
    },

    // Account events
    UserRegistered {
        user_id: Uuid,
        role: String,
    },
    OtpIssued {
        phone: String,
        code: String,
    },
    PasswordResetRequested {
        email: String,
        token: String,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously. Failures are reported to the caller but
    /// must never abort the request that produced the event.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Fire-and-forget variant used on paths where the DB write has already
    /// committed.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!("event dropped: {}", e);
        }
    }
}

/// Background processor: logs every event and forwards notification-worthy
/// ones to the SMS/mail clients. Notification failures are logged and
/// swallowed; the state change that produced the event stands.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>, notifier: Arc<Notifier>) {
    while let Some(event) = receiver.recv().await {
        info!(?event, "domain event");

        let result = match &event {
            Event::DeliveryVerified {
                accepted,
                variance,
                transporter_phone,
                ..
            } => {
                let text = if *accepted {
                    format!(
                        "Delivery accepted. Recorded variance: {} liters.",
                        variance
                    )
                } else {
                    format!(
                        "Delivery rejected by receiving diary. Variance: {} liters.",
                        variance
                    )
                };
                notifier.sms.send_sms(transporter_phone, &text).await
            }
            Event::MilkRequestDecided {
                new_status,
                requesting_contact,
                ..
            } => {
                let text = format!("Your milk transfer request is now {}.", new_status);
                notifier.sms.send_sms(requesting_contact, &text).await
            }
            Event::OtpIssued { phone, code } => {
                let text = format!("Your verification code is {}. It expires in 5 minutes.", code);
                notifier.sms.send_sms(phone, &text).await
            }
            Event::PasswordResetRequested { email, token } => {
                notifier.mailer.send_password_reset(email, token).await
            }
            _ => Ok(()),
        };

        if let Err(e) = result {
            warn!(error = %e, "notification delivery failed");
        }
    }

    info!("event channel closed; processor exiting");
}
