//! The set of controls currently on the device screen.
//!
//! # Z-order (for beginners)
//!
//! Controls are kept in a `Vec` in the order they were added.  Drawing walks
//! the vector front to back, so later controls are painted over earlier
//! ones.  Hit testing walks it back to front, so the control the user sees
//! on top is the one that receives the touch.
//!
//! # Instance keys
//!
//! The server names controls by id, and may remove a control and create a
//! new one with the same id.  Anything that refers to a control across time
//! (an active pointer, a pending text edit) holds an [`InstanceKey`] instead.
//! Keys are never reused, so a stale key simply stops resolving.

use std::sync::Arc;

use super::controls::Control;
use super::geometry::Point;

/// Maximum number of controls on screen at once.
pub const MAX_CONTROLS: usize = 1024;

/// Registry-assigned identity of one control instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceKey(u64);

impl InstanceKey {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Outcome of adding a control; the discriminant is the reply status byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AddStatus {
    Ok = 0,
    TooMany = 1,
    Duplicate = 2,
}

/// Told whenever the visible state changes.
///
/// The presentation layer implements this to schedule a redraw; it must not
/// call back into the registry from `invalidate`.
pub trait RenderSink: Send + Sync {
    fn invalidate(&self);

    /// Shows a transient status message (a toast).
    fn notify(&self, _message: &str) {}
}

/// A sink that ignores everything, for headless use.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRenderSink;

impl RenderSink for NoopRenderSink {
    fn invalidate(&self) {}
}

/// Ordered, id-unique collection of controls.
pub struct ControlRegistry {
    controls: Vec<(InstanceKey, Control)>,
    next_key: u64,
    sink: Arc<dyn RenderSink>,
}

impl ControlRegistry {
    pub fn new(sink: Arc<dyn RenderSink>) -> Self {
        Self {
            controls: Vec::new(),
            next_key: 0,
            sink,
        }
    }

    /// A registry with no render sink attached.
    pub fn headless() -> Self {
        Self::new(Arc::new(NoopRenderSink))
    }

    pub fn sink(&self) -> &Arc<dyn RenderSink> {
        &self.sink
    }

    pub fn len(&self) -> usize {
        self.controls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }

    /// Adds `control` on top of everything else.
    ///
    /// The size limit is checked before the id, so a full registry reports
    /// [`AddStatus::TooMany`] even for a duplicate id.
    pub fn try_add(&mut self, control: Control) -> AddStatus {
        if self.controls.len() >= MAX_CONTROLS {
            return AddStatus::TooMany;
        }
        if self.position(control.id().as_bytes()).is_some() {
            return AddStatus::Duplicate;
        }
        let key = InstanceKey(self.next_key);
        self.next_key += 1;
        tracing::debug!(id = %control.id(), kind = control.kind(), key = key.0, "control added");
        self.controls.push((key, control));
        self.sink.invalidate();
        AddStatus::Ok
    }

    /// Removes the control with `id`.  Returns `false` if there was none.
    pub fn remove(&mut self, id: &[u8]) -> bool {
        match self.position(id) {
            Some(i) => {
                self.controls.remove(i);
                self.sink.invalidate();
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.controls.clear();
        self.sink.invalidate();
    }

    fn position(&self, id: &[u8]) -> Option<usize> {
        self.controls.iter().position(|(_, c)| c.id().as_bytes() == id)
    }

    fn position_by_key(&self, key: InstanceKey) -> Option<usize> {
        self.controls.iter().position(|(k, _)| *k == key)
    }

    pub fn get(&self, id: &[u8]) -> Option<&Control> {
        self.position(id).map(|i| &self.controls[i].1)
    }

    pub fn get_by_key(&self, key: InstanceKey) -> Option<&Control> {
        self.position_by_key(key).map(|i| &self.controls[i].1)
    }

    pub fn key_of(&self, id: &[u8]) -> Option<InstanceKey> {
        self.position(id).map(|i| self.controls[i].0)
    }

    /// Runs `f` on the control with `id` and signals a redraw.
    ///
    /// Returns `None` without calling `f` if there is no such control.
    pub fn update<R>(&mut self, id: &[u8], f: impl FnOnce(&mut Control) -> R) -> Option<R> {
        let i = self.position(id)?;
        let out = f(&mut self.controls[i].1);
        self.sink.invalidate();
        Some(out)
    }

    pub fn update_by_key<R>(
        &mut self,
        key: InstanceKey,
        f: impl FnOnce(&mut Control) -> R,
    ) -> Option<R> {
        let i = self.position_by_key(key)?;
        let out = f(&mut self.controls[i].1);
        self.sink.invalidate();
        Some(out)
    }

    /// The topmost control whose touch area contains `p`.
    pub fn hit_test(&self, p: Point) -> Option<(InstanceKey, &Control)> {
        self.controls
            .iter()
            .rev()
            .find(|(_, c)| c.contains(p))
            .map(|(k, c)| (*k, c))
    }

    /// Unchecks every other radio button sharing the group of `key`.
    ///
    /// Does nothing if `key` is not a radio button.
    pub fn select_radio(&mut self, key: InstanceKey) {
        let Some(group) = self
            .get_by_key(key)
            .and_then(Control::radio_group)
            .map(<[u8]>::to_vec)
        else {
            return;
        };
        for (k, control) in &mut self.controls {
            if *k == key || control.radio_group() != Some(group.as_slice()) {
                continue;
            }
            if let Some(toggle) = control.as_toggle_like_mut() {
                toggle.set_checked(false);
            }
        }
        self.sink.invalidate();
    }

    /// Controls in draw order (bottom first).
    pub fn iter(&self) -> impl Iterator<Item = (InstanceKey, &Control)> {
        self.controls.iter().map(|(k, c)| (*k, c))
    }
}

impl std::fmt::Debug for ControlRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlRegistry")
            .field("len", &self.controls.len())
            .field("next_key", &self.next_key)
            .finish()
    }
}
