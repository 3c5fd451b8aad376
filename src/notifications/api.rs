//! Public API for the notification system
//!
//! External modules should import from here rather than directly from
//! internal modules.

use std::sync::Arc;
use tokio::sync::Mutex;

pub use crate::notifications::error::NotificationError;
pub use crate::notifications::event::{
    Event, EventFilter, ScanEvent, ScanEventType, SyncEvent, SyncEventType, SystemEvent,
    SystemEventType,
};
pub use crate::notifications::manager::{AsyncNotificationManager, EventReceiver};

/// Manager handle shared between the pipeline and the driver
pub type SharedNotificationManager = Arc<Mutex<AsyncNotificationManager>>;

/// Create an empty shared manager
///
/// # Examples
/// ```
/// # use scanlog::notifications::api::{new_shared_manager, Event, SystemEvent, SystemEventType};
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let notifications = new_shared_manager();
/// let event = Event::System(SystemEvent::new(SystemEventType::Startup));
/// notifications.lock().await.publish(event).await?;
/// # Ok(())
/// # }
/// ```
pub fn new_shared_manager() -> SharedNotificationManager {
    log::trace!("Initializing notification manager");
    Arc::new(Mutex::new(AsyncNotificationManager::new()))
}

/// Publish and log, never fail
///
/// Delivery problems are not the publisher's concern: they are logged at
/// warn level and otherwise ignored.
pub async fn publish_best_effort(manager: &SharedNotificationManager, event: Event) {
    let kind = event.kind();
    if let Err(e) = manager.lock().await.publish(event).await {
        log::warn!("{} notification not fully delivered: {}", kind, e);
    }
}
