// region:    --- Imports
use tokio::sync::broadcast;
use tracing::{debug, info};

// endregion: --- Imports

// region:    --- App Event
/// 화면 알림 이벤트
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    LoggedIn { name: String },
    LoggedOut,
    // 입찰 이벤트
    BidPlaced { listing_id: String, amount: f64 },
    // 상품 이벤트
    ListingCreated { id: String, title: String },
    ListingUpdated { id: String },
    ListingDeleted { id: String },
    ProfileUpdated { name: String },
}

impl AppEvent {
    /// 사용자에게 보여줄 알림 문구
    pub fn notice(&self) -> String {
        match self {
            AppEvent::LoggedIn { name } => format!("Welcome, {}!", name),
            AppEvent::LoggedOut => "You have been logged out.".to_string(),
            AppEvent::BidPlaced { amount, .. } => {
                format!("Your bid of {} kr has been placed successfully.", amount)
            }
            AppEvent::ListingCreated { title, .. } => {
                format!("Listing \"{}\" created successfully!", title)
            }
            AppEvent::ListingUpdated { .. } => "Listing updated successfully.".to_string(),
            AppEvent::ListingDeleted { .. } => "Listing deleted successfully.".to_string(),
            AppEvent::ProfileUpdated { .. } => "Profile updated successfully!".to_string(),
        }
    }
}
// endregion: --- App Event

// region:    --- Event Bus
/// 이벤트 버스. 구독자가 없어도 발행은 실패하지 않는다
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<AppEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(32)
    }
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.sender.subscribe()
    }

    /// 이벤트 발행
    pub fn publish(&self, event: AppEvent) {
        info!("{:<12} --> 이벤트 발행: {:?}", "EventBus", event);
        if self.sender.send(event).is_err() {
            debug!("{:<12} --> 구독자 없음", "EventBus");
        }
    }
}
// endregion: --- Event Bus

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_published_events() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.publish(AppEvent::ListingCreated {
            id: "l1".to_string(),
            title: "Bike".to_string(),
        });

        let event = rx.recv().await.unwrap();
        assert_eq!(event.notice(), "Listing \"Bike\" created successfully!");
    }

    #[test]
    fn publish_without_subscribers_is_fine() {
        let bus = EventBus::default();
        bus.publish(AppEvent::LoggedOut);
    }
}
