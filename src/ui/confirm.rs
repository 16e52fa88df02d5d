// Confirm-then-run modal. Holds one pending typed action; accept hands the
// action back to the caller to run, cancel and overlay clicks drop it.
use crate::core::error::{Error, ErrorKind};

#[derive(Clone, Debug, PartialEq)]
pub struct PendingConfirm<A> {
    pub title: &'static str,
    pub message: String,
    pub confirm_label: &'static str,
    pub action: A,
}

#[derive(Clone, Debug)]
pub struct ConfirmDialog<A> {
    pending: Option<PendingConfirm<A>>,
}

impl<A> Default for ConfirmDialog<A> {
    fn default() -> Self {
        Self { pending: None }
    }
}

impl<A> ConfirmDialog<A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending(&self) -> Option<&PendingConfirm<A>> {
        self.pending.as_ref()
    }

    pub fn open(&mut self, message: impl Into<String>, action: A) -> Result<(), Error> {
        if self.pending.is_some() {
            return Err(Error::new(ErrorKind::Busy)
                .with_message("a confirmation is already open"));
        }
        self.pending = Some(PendingConfirm {
            title: "Confirm action",
            message: message.into(),
            confirm_label: "Yes, delete",
            action,
        });
        Ok(())
    }

    pub fn accept(&mut self) -> Option<A> {
        self.pending.take().map(|pending| pending.action)
    }

    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }
}
