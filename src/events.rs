use tokio::sync::broadcast;
use uuid::Uuid;

/// Emitted after the registration transaction commits. Listeners drive
/// follow-up provisioning (verification mail, trial activation) off the
/// request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationEvent {
    pub user_id: Uuid,
    pub company_id: Uuid,
}

pub struct EventBus {
    sender: broadcast::Sender<RegistrationEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Best effort; with no live subscribers the event is dropped.
    pub fn emit(&self, event: RegistrationEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RegistrationEvent> {
        self.sender.subscribe()
    }
}
