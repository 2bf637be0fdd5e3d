//! InfoPopup: the marker's info-window sub-state-machine.
//!
//! ```text
//!   Closed --non-empty content--> Ready --show--> Open
//!     ^                             |  <--hide--   |
//!     +--------empty content--------+--------------+
//! ```
//!
//! Entering `Ready` constructs the popup and, while the marker is connected,
//! binds two listeners: `click` on the marker and `closeclick` on the popup.
//! A popup created on a detached marker gets its listeners from
//! [`InfoPopup::relisten`] on reconnect. Leaving for `Closed` removes both and
//! drops the popup, so the listener count returns to where it started.

use crate::capability::api::{
    InfoWindowHandle, ListenerId, MapToken, MapsApi, MarkerHandle, MarkerToken,
};
use crate::event::external::{InfoWindowEvent, MarkerEvent};

/// Observable phase of an [`InfoPopup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupPhase {
    Closed,
    Ready,
    Open,
}

/// A constructed popup and its listener registrations.
pub struct Popup {
    window: Box<dyn InfoWindowHandle>,
    click: Option<ListenerId>,
    close_click: Option<ListenerId>,
}

impl Popup {
    fn listen(&mut self, marker: &mut dyn MarkerHandle) {
        if self.click.is_none() {
            self.click = Some(marker.add_listener(MarkerEvent::Click));
        }
        if self.close_click.is_none() {
            self.close_click = Some(self.window.add_listener(InfoWindowEvent::CloseClick));
        }
    }

    fn unlisten(&mut self, marker: &mut dyn MarkerHandle) {
        if let Some(id) = self.click.take() {
            marker.remove_listener(id);
        }
        if let Some(id) = self.close_click.take() {
            self.window.remove_listener(id);
        }
    }
}

/// The info popup attached to one marker.
#[derive(Default)]
pub enum InfoPopup {
    /// No popup object exists.
    #[default]
    Closed,
    /// Popup exists with content, not shown.
    Ready(Popup),
    /// Popup is shown.
    Open(Popup),
}

impl InfoPopup {
    /// Current phase, without the popup itself.
    pub fn phase(&self) -> PopupPhase {
        match self {
            InfoPopup::Closed => PopupPhase::Closed,
            InfoPopup::Ready(_) => PopupPhase::Ready,
            InfoPopup::Open(_) => PopupPhase::Open,
        }
    }

    /// Whether a popup object exists (`Ready` or `Open`).
    pub fn exists(&self) -> bool {
        !matches!(self, InfoPopup::Closed)
    }

    fn popup_mut(&mut self) -> Option<&mut Popup> {
        match self {
            InfoPopup::Closed => None,
            InfoPopup::Ready(p) | InfoPopup::Open(p) => Some(p),
        }
    }

    fn popup(&self) -> Option<&Popup> {
        match self {
            InfoPopup::Closed => None,
            InfoPopup::Ready(p) | InfoPopup::Open(p) => Some(p),
        }
    }

    /// Follow a content change. `None` (or empty content) discards the popup.
    ///
    /// A newly created popup binds its listeners only when `listen` is set.
    pub fn sync_content(
        &mut self,
        content: Option<&str>,
        api: &dyn MapsApi,
        marker: &mut dyn MarkerHandle,
        listen: bool,
    ) {
        let Some(html) = content.filter(|html| !html.is_empty()) else {
            self.discard(marker);
            return;
        };
        if let Some(popup) = self.popup_mut() {
            popup.window.set_content(html);
            return;
        }
        let mut window = api.create_info_window();
        window.set_content(html);
        let mut popup = Popup {
            window,
            click: None,
            close_click: None,
        };
        if listen {
            popup.listen(marker);
        }
        tracing::debug!(listen, "info popup created");
        *self = InfoPopup::Ready(popup);
    }

    /// Remove listeners and drop the popup, closing it first if shown.
    pub fn discard(&mut self, marker: &mut dyn MarkerHandle) {
        let was_open = matches!(self, InfoPopup::Open(_));
        if let InfoPopup::Ready(mut popup) | InfoPopup::Open(mut popup) =
            std::mem::take(self)
        {
            if was_open {
                popup.window.close();
            }
            popup.unlisten(marker);
            tracing::debug!("info popup discarded");
        }
    }

    /// Show the popup on `map` at `anchor`. Returns `false` if there is no
    /// popup to show.
    pub fn show(&mut self, map: MapToken, anchor: MarkerToken) -> bool {
        match std::mem::take(self) {
            InfoPopup::Closed => false,
            InfoPopup::Ready(mut popup) | InfoPopup::Open(mut popup) => {
                popup.window.open(map, anchor);
                *self = InfoPopup::Open(popup);
                true
            }
        }
    }

    /// Hide the popup. Returns `false` if there is no popup.
    pub fn hide(&mut self) -> bool {
        match std::mem::take(self) {
            InfoPopup::Closed => false,
            InfoPopup::Ready(mut popup) | InfoPopup::Open(mut popup) => {
                popup.window.close();
                *self = InfoPopup::Ready(popup);
                true
            }
        }
    }

    /// Drop listener registrations but keep the popup (marker detached).
    pub fn sever(&mut self, marker: &mut dyn MarkerHandle) {
        if let Some(popup) = self.popup_mut() {
            popup.unlisten(marker);
        }
    }

    /// Restore listener registrations after [`sever`](Self::sever).
    pub fn relisten(&mut self, marker: &mut dyn MarkerHandle) {
        if let Some(popup) = self.popup_mut() {
            popup.listen(marker);
        }
    }

    /// Whether the marker `click` listener is currently registered.
    pub fn listens_to_click(&self) -> bool {
        self.popup().is_some_and(|p| p.click.is_some())
    }

    /// Whether the popup `closeclick` listener is currently registered.
    pub fn listens_to_close(&self) -> bool {
        self.popup().is_some_and(|p| p.close_click.is_some())
    }
}

impl std::fmt::Debug for InfoPopup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InfoPopup")
            .field("phase", &self.phase())
            .field("click", &self.listens_to_click())
            .field("close_click", &self.listens_to_close())
            .finish()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::api::MarkerOptions;
    use crate::geometry::LatLng;
    use crate::testing::fake::{Call, FakeMaps};

    fn marker(fake: &FakeMaps) -> Box<dyn MarkerHandle> {
        fake.create_marker(&MarkerOptions {
            position: LatLng::default(),
            title: String::new(),
            label: None,
            draggable: false,
            visible: true,
        })
    }

    #[test]
    fn starts_closed() {
        let popup = InfoPopup::default();
        assert_eq!(popup.phase(), PopupPhase::Closed);
        assert!(!popup.exists());
    }

    #[test]
    fn content_creates_ready_popup() {
        let fake = FakeMaps::new();
        let mut m = marker(&fake);
        let mut popup = InfoPopup::default();

        popup.sync_content(Some("Hello"), &fake, m.as_mut(), true);
        assert_eq!(popup.phase(), PopupPhase::Ready);
        assert!(popup.listens_to_click());
        assert!(popup.listens_to_close());
        assert_eq!(fake.info_windows_created(), 1);
        assert_eq!(fake.listener_count(), 2);
    }

    #[test]
    fn unlistened_popup_binds_on_relisten() {
        let fake = FakeMaps::new();
        let mut m = marker(&fake);
        let mut popup = InfoPopup::default();

        popup.sync_content(Some("Hello"), &fake, m.as_mut(), false);
        assert_eq!(popup.phase(), PopupPhase::Ready);
        assert!(!popup.listens_to_click());
        assert_eq!(fake.listener_count(), 0);

        popup.relisten(m.as_mut());
        assert!(popup.listens_to_click());
        assert!(popup.listens_to_close());
        assert_eq!(fake.listener_count(), 2);
    }

    #[test]
    fn content_update_reuses_popup() {
        let fake = FakeMaps::new();
        let mut m = marker(&fake);
        let mut popup = InfoPopup::default();

        popup.sync_content(Some("a"), &fake, m.as_mut(), true);
        popup.sync_content(Some("b"), &fake, m.as_mut(), true);
        assert_eq!(fake.info_windows_created(), 1);
        assert_eq!(fake.count(|c| matches!(c, Call::SetContent { .. })), 2);
    }

    #[test]
    fn empty_content_discards_and_unlistens() {
        let fake = FakeMaps::new();
        let mut m = marker(&fake);
        let mut popup = InfoPopup::default();

        popup.sync_content(Some("Hello"), &fake, m.as_mut(), true);
        popup.sync_content(None, &fake, m.as_mut(), true);
        assert_eq!(popup.phase(), PopupPhase::Closed);
        assert_eq!(fake.info_windows_dropped(), 1);
        assert_eq!(fake.listener_count(), 0);
    }

    #[test]
    fn show_and_hide() {
        let fake = FakeMaps::new();
        let mut m = marker(&fake);
        let mut popup = InfoPopup::default();

        assert!(!popup.show(MapToken(1), m.token()));
        popup.sync_content(Some("Hello"), &fake, m.as_mut(), true);
        assert!(popup.show(MapToken(1), m.token()));
        assert_eq!(popup.phase(), PopupPhase::Open);
        assert!(popup.hide());
        assert_eq!(popup.phase(), PopupPhase::Ready);
    }

    #[test]
    fn discard_open_popup_closes_it() {
        let fake = FakeMaps::new();
        let mut m = marker(&fake);
        let mut popup = InfoPopup::default();

        popup.sync_content(Some("Hello"), &fake, m.as_mut(), true);
        popup.show(MapToken(1), m.token());
        popup.discard(m.as_mut());
        assert_eq!(fake.count(|c| matches!(c, Call::CloseInfoWindow { .. })), 1);
        assert_eq!(fake.info_windows_dropped(), 1);
    }

    #[test]
    fn sever_and_relisten_keep_popup() {
        let fake = FakeMaps::new();
        let mut m = marker(&fake);
        let mut popup = InfoPopup::default();

        popup.sync_content(Some("Hello"), &fake, m.as_mut(), true);
        popup.sever(m.as_mut());
        assert_eq!(fake.listener_count(), 0);
        assert_eq!(popup.phase(), PopupPhase::Ready);
        popup.relisten(m.as_mut());
        assert_eq!(fake.listener_count(), 2);
        assert_eq!(fake.info_windows_created(), 1);
    }
}
