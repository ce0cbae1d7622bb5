//! Notification store
//!
//! One user's notification list: snapshot loads, id-deduplicated pushes,
//! optimistic read-state mutations, and the unread-count / navigation
//! projections.

use anyhow::Result;

use crate::api::{notifications as rest, RefNetClient};
use crate::models::{Notification, NotificationKind, Role};

/// Where a notification click should take the user.
///
/// The store yields the target; acting on it is the caller's concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationTarget {
    pub route: &'static str,
    /// Set for message notifications so the destination can auto-open the
    /// right chat room.
    pub open_chat_for_request: Option<String>,
}

/// Newest-first notification list for the authenticated user.
#[derive(Default)]
pub struct NotificationStore {
    notifications: Vec<Notification>,
    loading: bool,
}

impl NotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    #[allow(dead_code)]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Fetch the full snapshot and replace the list wholesale. The loading
    /// flag clears on success and failure alike.
    pub async fn load(&mut self, api: &RefNetClient) -> Result<()> {
        self.begin_load();
        let result = rest::fetch_notifications(api).await;
        self.finish_load(result)
    }

    fn begin_load(&mut self) {
        self.loading = true;
    }

    fn finish_load(&mut self, result: Result<Vec<Notification>>) -> Result<()> {
        self.loading = false;
        self.notifications = result?;
        Ok(())
    }

    pub fn replace_all(&mut self, notifications: Vec<Notification>) {
        self.notifications = notifications;
    }

    /// Merge a pushed notification at the front (pushes are newer than the
    /// snapshot). Deduplicated by id so a snapshot/push race cannot double an
    /// entry. Returns true when the list grew.
    pub fn on_push(&mut self, notification: Notification) -> bool {
        if self.notifications.iter().any(|n| n.id == notification.id) {
            return false;
        }
        self.notifications.insert(0, notification);
        true
    }

    /// Mark one notification read: optimistic local flip first, then the
    /// REST call. The local state is kept even when the call fails.
    pub async fn mark_as_read(&mut self, api: &RefNetClient, id: &str) -> Result<()> {
        self.mark_as_read_local(id);
        rest::mark_read(api, id).await
    }

    /// Local part of `mark_as_read`; idempotent. Returns true when an unread
    /// entry was flipped.
    pub fn mark_as_read_local(&mut self, id: &str) -> bool {
        match self.notifications.iter_mut().find(|n| n.id == id) {
            Some(n) if !n.is_read => {
                n.is_read = true;
                true
            }
            _ => false,
        }
    }

    /// Mark every notification read: optimistic local flip, one REST call.
    pub async fn mark_all_read(&mut self, api: &RefNetClient) -> Result<()> {
        self.mark_all_read_local();
        rest::mark_all_read(api).await
    }

    /// Local part of `mark_all_read`.
    pub fn mark_all_read_local(&mut self) {
        for n in &mut self.notifications {
            n.is_read = true;
        }
    }

    /// Count of unread entries, recomputed on every call.
    pub fn unread_count(&self) -> usize {
        self.notifications.iter().filter(|n| !n.is_read).count()
    }

    /// Resolve a click: an unread entry is marked read first (click always
    /// implies read), then the navigation target is returned. `None` when the
    /// id is not in the list.
    pub async fn click(
        &mut self,
        api: &RefNetClient,
        id: &str,
        role: Role,
    ) -> Result<Option<NavigationTarget>> {
        let target = match self.notifications.iter().find(|n| n.id == id) {
            Some(n) => navigation_target(n, role),
            None => return Ok(None),
        };

        if self.mark_as_read_local(id) {
            rest::mark_read(api, id).await?;
        }
        Ok(Some(target))
    }
}

/// Dispatch a notification to its role-specific dashboard route; message
/// notifications carry the room id so the destination can open that chat.
pub fn navigation_target(notification: &Notification, role: Role) -> NavigationTarget {
    let open_chat_for_request = match notification.kind {
        NotificationKind::Message => notification.request.as_ref().map(|r| r.id.clone()),
        NotificationKind::RequestAccepted
        | NotificationKind::RequestRejected
        | NotificationKind::RequestReceived => None,
    };

    NavigationTarget {
        route: role.dashboard_route(),
        open_chat_for_request,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RequestRef, SenderRef};
    use chrono::Utc;

    fn notif(id: &str, kind: NotificationKind, is_read: bool) -> Notification {
        Notification {
            id: id.to_string(),
            kind,
            sender: Some(SenderRef {
                name: Some("Ada".to_string()),
            }),
            request: None,
            created_at: Utc::now(),
            is_read,
        }
    }

    #[test]
    fn test_loading_flag_clears_on_failure_too() {
        let mut store = NotificationStore::new();
        assert!(!store.is_loading());

        store.begin_load();
        assert!(store.is_loading());
        assert!(store
            .finish_load(Err(anyhow::anyhow!("network down")))
            .is_err());
        assert!(!store.is_loading());

        store.begin_load();
        store
            .finish_load(Ok(vec![notif("a", NotificationKind::Message, false)]))
            .unwrap();
        assert!(!store.is_loading());
        assert_eq!(store.notifications().len(), 1);
    }

    #[test]
    fn test_unread_count_recomputes() {
        let mut store = NotificationStore::new();
        store.replace_all(vec![
            notif("a", NotificationKind::Message, false),
            notif("b", NotificationKind::RequestReceived, false),
            notif("c", NotificationKind::RequestAccepted, true),
        ]);
        assert_eq!(store.unread_count(), 2);

        store.mark_all_read_local();
        assert_eq!(store.unread_count(), 0);
    }

    #[test]
    fn test_mark_all_read_from_any_state() {
        let mut store = NotificationStore::new();
        store.mark_all_read_local();
        assert_eq!(store.unread_count(), 0);

        store.replace_all(vec![notif("a", NotificationKind::Message, true)]);
        store.mark_all_read_local();
        assert_eq!(store.unread_count(), 0);
    }

    #[test]
    fn test_mark_as_read_is_idempotent() {
        let mut store = NotificationStore::new();
        store.replace_all(vec![notif("a", NotificationKind::Message, false)]);

        assert!(store.mark_as_read_local("a"));
        assert!(!store.mark_as_read_local("a"));
        assert!(store.notifications()[0].is_read);

        // Unknown id is tolerated.
        assert!(!store.mark_as_read_local("zzz"));
    }

    #[test]
    fn test_on_push_prepends_newest_first() {
        let mut store = NotificationStore::new();
        store.replace_all(vec![notif("a", NotificationKind::Message, true)]);

        assert!(store.on_push(notif("b", NotificationKind::RequestReceived, false)));
        assert_eq!(store.notifications()[0].id, "b");
        assert_eq!(store.notifications()[1].id, "a");
    }

    #[test]
    fn test_on_push_dedups_against_snapshot() {
        let mut store = NotificationStore::new();
        store.replace_all(vec![notif("a", NotificationKind::Message, false)]);

        // The same event raced in via snapshot and push.
        assert!(!store.on_push(notif("a", NotificationKind::Message, false)));
        assert_eq!(store.notifications().len(), 1);
    }

    #[test]
    fn test_message_click_deep_links_into_chat() {
        let mut n = notif("a", NotificationKind::Message, false);
        n.request = Some(RequestRef {
            id: "r1".to_string(),
        });

        let target = navigation_target(&n, Role::Employee);
        assert_eq!(target.route, "/employee/dashboard");
        assert_eq!(target.open_chat_for_request.as_deref(), Some("r1"));
    }

    #[test]
    fn test_request_events_navigate_without_state() {
        for kind in [
            NotificationKind::RequestAccepted,
            NotificationKind::RequestRejected,
            NotificationKind::RequestReceived,
        ] {
            let target = navigation_target(&notif("a", kind, false), Role::Student);
            assert_eq!(target.route, "/student/dashboard");
            assert_eq!(target.open_chat_for_request, None);
        }

        let target = navigation_target(&notif("a", NotificationKind::Message, true), Role::Admin);
        assert_eq!(target.route, "/admin/dashboard");
        // Message without a request back-reference cannot deep-link.
        assert_eq!(target.open_chat_for_request, None);
    }
}
