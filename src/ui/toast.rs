//! Purpose: Transient toast notifications with independent two-step lifecycles.
//! Exports: `Toasts`, `Toast`, `ToastId`, `ToastPhase`, `TOAST_VISIBLE`, `TOAST_EXIT`.
//! Role: Notification stack owned by `Storefront`; timers are scheduled by the caller.
//! Invariants: A toast moves Visible -> Leaving -> removed, never backwards.
//! Invariants: Lifecycle steps for unknown ids are ignored, so stale timers are harmless.

use std::time::Duration;

pub const TOAST_VISIBLE: Duration = Duration::from_millis(3_000);
pub const TOAST_EXIT: Duration = Duration::from_millis(400);

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ToastId(u64);

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ToastPhase {
    Visible,
    Leaving,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Toast {
    pub id: ToastId,
    pub message: String,
    pub phase: ToastPhase,
}

#[derive(Clone, Debug, Default)]
pub struct Toasts {
    next_id: u64,
    active: Vec<Toast>,
}

impl Toasts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: impl Into<String>) -> ToastId {
        let id = ToastId(self.next_id);
        self.next_id += 1;
        self.active.push(Toast {
            id,
            message: message.into(),
            phase: ToastPhase::Visible,
        });
        id
    }

    pub fn active(&self) -> &[Toast] {
        &self.active
    }

    pub fn messages(&self) -> Vec<&str> {
        self.active.iter().map(|toast| toast.message.as_str()).collect()
    }

    /// Returns true when the toast entered its exit phase.
    pub fn begin_exit(&mut self, id: ToastId) -> bool {
        match self.active.iter_mut().find(|toast| toast.id == id) {
            Some(toast) if toast.phase == ToastPhase::Visible => {
                toast.phase = ToastPhase::Leaving;
                true
            }
            _ => false,
        }
    }

    pub fn remove(&mut self, id: ToastId) -> Option<Toast> {
        let index = self.active.iter().position(|toast| toast.id == id)?;
        Some(self.active.remove(index))
    }
}
