//! Client-side state for one user: the busy flag, the single error alert and
//! the last generated dashboard.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use instadash_core::{validate_input, GenerationRequest, InputError};

use crate::client::ApiClient;

/// What happened to one press of "generate".
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// New markup is available via [`Session::html`].
    Rendered,
    /// Input was invalid; nothing was sent.
    Rejected(InputError),
    /// The request failed; the message is in [`Session::error`].
    Failed(String),
    /// A request was already in flight; this trigger did nothing.
    Busy,
}

/// Clears the busy flag however `trigger` exits.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct Session {
    client: ApiClient,
    busy: AtomicBool,
    error: Mutex<Option<String>>,
    html: Mutex<Option<String>>,
}

impl Session {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            busy: AtomicBool::new(false),
            error: Mutex::new(None),
            html: Mutex::new(None),
        }
    }

    /// The alert currently shown, if any. There is never more than one.
    pub fn error(&self) -> Option<String> {
        self.error.lock().unwrap().clone()
    }

    /// Close the alert.
    pub fn dismiss_error(&self) {
        *self.error.lock().unwrap() = None;
    }

    /// Markup of the last successful generation.
    pub fn html(&self) -> Option<String> {
        self.html.lock().unwrap().clone()
    }

    fn show_error(&self, message: String) {
        *self.error.lock().unwrap() = Some(message);
    }

    /// Validate, send and store the result. A trigger while another is in
    /// flight is a no-op.
    pub async fn trigger(&self, json_text: &str, instruction_text: &str) -> Outcome {
        if self.busy.swap(true, Ordering::SeqCst) {
            return Outcome::Busy;
        }
        let _guard = BusyGuard(&self.busy);

        self.dismiss_error();

        let input = match validate_input(json_text, instruction_text) {
            Ok(input) => input,
            Err(err) => {
                self.show_error(err.to_string());
                return Outcome::Rejected(err);
            }
        };

        let request = GenerationRequest::new(input.instruction, input.json);
        match self.client.send(&request).await {
            Ok(html) => {
                *self.html.lock().unwrap() = Some(html);
                Outcome::Rendered
            }
            Err(err) => {
                tracing::error!(error = %err, "Generation error");
                let message = err.to_string();
                self.show_error(message.clone());
                Outcome::Failed(message)
            }
        }
    }
}
