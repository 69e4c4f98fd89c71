//! Confirmation before destructive actions
//!
//! `ModalDialog` and its `ModalHandle` are created together, once. The host
//! wires the handle to the modal's buttons a single time; every call to
//! `confirm` then installs a fresh pending answer which the handle resolves
//! exactly once. Nothing is re-attached per invocation.

use async_trait::async_trait;
use serde::Serialize;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{oneshot, Notify};
use tracing::debug;

use crate::config::Labels;

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ConfirmRequest {
    pub title: String,
    pub message: String,
    /// Secondary text; empty when there is none
    pub note: String,
}

impl ConfirmRequest {
    pub fn new(
        title: impl Into<String>,
        message: impl Into<String>,
        note: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            note: note.into(),
        }
    }

    pub fn removal(labels: &Labels) -> Self {
        Self::new(
            labels.confirm_remove_title.clone(),
            labels.confirm_remove_message.clone(),
            labels.confirm_remove_note.clone(),
        )
    }
}

#[async_trait]
pub trait ConfirmDialog: Send + Sync {
    /// Resolves `true` only on an explicit accept
    async fn confirm(&self, request: ConfirmRequest) -> bool;
}

struct Pending {
    request: ConfirmRequest,
    respond: oneshot::Sender<bool>,
}

#[derive(Default)]
struct Inner {
    pending: Option<Pending>,
    closed: bool,
}

#[derive(Default)]
struct ModalState {
    inner: Mutex<Inner>,
    shown: Notify,
}

impl ModalState {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

pub struct ModalDialog {
    state: Arc<ModalState>,
}

/// The modal's single listener
pub struct ModalHandle {
    state: Arc<ModalState>,
}

impl ModalDialog {
    pub fn new() -> (Self, ModalHandle) {
        let state = Arc::new(ModalState::default());
        (
            Self {
                state: state.clone(),
            },
            ModalHandle { state },
        )
    }
}

#[async_trait]
impl ConfirmDialog for ModalDialog {
    async fn confirm(&self, request: ConfirmRequest) -> bool {
        let (respond, response) = oneshot::channel();
        {
            let mut inner = self.state.lock();
            if inner.closed {
                debug!("Confirmation requested after the modal was closed");
                return false;
            }
            // A newer prompt replaces an unanswered one
            if let Some(previous) = inner.pending.replace(Pending { request, respond }) {
                let _ = previous.respond.send(false);
            }
        }
        self.state.shown.notify_one();

        response.await.unwrap_or(false)
    }
}

impl ModalHandle {
    /// Request currently waiting for an answer
    pub fn current(&self) -> Option<ConfirmRequest> {
        self.state
            .lock()
            .pending
            .as_ref()
            .map(|pending| pending.request.clone())
    }

    /// Waits until a request is pending and returns it
    pub async fn shown(&self) -> ConfirmRequest {
        loop {
            let notified = self.state.shown.notified();
            if let Some(request) = self.current() {
                return request;
            }
            notified.await;
        }
    }

    /// Returns false when nothing was waiting
    pub fn accept(&self) -> bool {
        self.resolve(true)
    }

    pub fn dismiss(&self) -> bool {
        self.resolve(false)
    }

    fn resolve(&self, answer: bool) -> bool {
        match self.state.lock().pending.take() {
            Some(pending) => pending.respond.send(answer).is_ok(),
            None => false,
        }
    }
}

impl Drop for ModalHandle {
    fn drop(&mut self) {
        let mut inner = self.state.lock();
        inner.closed = true;
        if let Some(pending) = inner.pending.take() {
            let _ = pending.respond.send(false);
        }
    }
}

/// Asks on the terminal
pub struct TerminalDialog;

pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

#[async_trait]
impl ConfirmDialog for TerminalDialog {
    async fn confirm(&self, request: ConfirmRequest) -> bool {
        let answer = tokio::task::spawn_blocking(move || {
            eprintln!("{}", request.title);
            eprintln!("{}", request.message);
            if !request.note.trim().is_empty() {
                eprintln!("{}", request.note);
            }
            eprint!("[y/N] ");
            let _ = io::stderr().flush();

            let mut line = String::new();
            match io::stdin().read_line(&mut line) {
                Ok(_) => is_affirmative(&line),
                Err(_) => false,
            }
        })
        .await;

        answer.unwrap_or(false)
    }
}

/// Accepts everything without asking
pub struct NoConfirm;

#[async_trait]
impl ConfirmDialog for NoConfirm {
    async fn confirm(&self, _request: ConfirmRequest) -> bool {
        true
    }
}
