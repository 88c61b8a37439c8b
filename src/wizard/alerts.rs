use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub id: u64,
    pub message: String,
    pub expires_at: DateTime<Utc>,
}

/// Transient, dismissible messages. Ids only ever grow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertQueue {
    next_id: u64,
    alerts: Vec<Alert>,
}

impl AlertQueue {
    pub fn push(
        &mut self,
        message: impl Into<String>,
        now: DateTime<Utc>,
        ttl_seconds: i64,
    ) -> u64 {
        self.next_id += 1;
        self.alerts.push(Alert {
            id: self.next_id,
            message: message.into(),
            expires_at: now + Duration::seconds(ttl_seconds),
        });
        self.next_id
    }

    pub fn dismiss(&mut self, id: u64) {
        self.alerts.retain(|alert| alert.id != id);
    }

    pub fn expire(&mut self, now: DateTime<Utc>) {
        self.alerts.retain(|alert| alert.expires_at > now);
    }

    pub fn active(&self) -> &[Alert] {
        &self.alerts
    }

    pub fn messages(&self) -> Vec<&str> {
        self.alerts.iter().map(|alert| alert.message.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }
}
