//! Driving machines from the outside.
//!
//! A [`Session`] is the imperative shell around a pure machine: it owns the
//! current state, performs one `advance` per external message, and keeps a
//! history of what happened. A fault halts the session for good.

mod history;

pub use history::{StepHistory, StepRecord};

use crate::config::SessionConfig;
use crate::core::{Channel, Control, Fault, Machine, Message, State, Value};
use chrono::Utc;
use tracing::{debug, warn};
use uuid::Uuid;

/// A machine together with its live state.
///
/// # Example
///
/// ```rust
/// use chanalg::combinators::sequence;
/// use chanalg::primitives::{brk, yield_on};
/// use chanalg::session::Session;
/// use serde_json::json;
///
/// let mut session = Session::new(sequence(yield_on("ask"), brk()));
/// let out = session.send("result", json!("question")).unwrap();
/// assert_eq!(out.channel, "continue/ask");
/// let out = session.send("ask", json!("answer")).unwrap();
/// assert_eq!(out.channel, "continue/result");
/// ```
pub struct Session<M: Machine> {
    id: Uuid,
    machine: M,
    state: Option<M::State>,
    history: StepHistory,
    steps: usize,
    config: SessionConfig,
}

impl<M: Machine> Session<M> {
    pub fn new(machine: M) -> Self {
        Self::with_config(machine, SessionConfig::default().record_history(true))
    }

    pub fn with_config(machine: M, config: SessionConfig) -> Self {
        let state = machine.start();
        Self {
            id: Uuid::new_v4(),
            machine,
            state: Some(state),
            history: StepHistory::new(),
            steps: 0,
            config,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Current state, or `None` once the session has halted.
    pub fn state(&self) -> Option<&M::State> {
        self.state.as_ref()
    }

    pub fn is_halted(&self) -> bool {
        self.state.is_none()
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn history(&self) -> &StepHistory {
        &self.history
    }

    /// Perform one external step.
    ///
    /// A fault from the machine halts the session; every later call
    /// returns [`Fault::Halted`].
    pub fn send(&mut self, channel: impl Into<Channel>, data: Value) -> Result<Message, Fault> {
        let Some(state) = self.state.take() else {
            return Err(Fault::Halted);
        };
        if let Some(limit) = self.config.step_limit {
            if self.steps >= limit {
                self.state = Some(state);
                return Err(Fault::StepLimitExceeded { limit });
            }
        }

        let input = Message::new(channel, data);
        let from = state.name().to_string();
        match self.machine.advance(state, input.clone()) {
            Ok((next, output)) => {
                self.steps += 1;
                debug!(
                    session = %self.id,
                    step = self.steps,
                    from = %from,
                    to = next.name(),
                    input = %input.channel,
                    output = %output.channel,
                    "session step"
                );
                if self.config.record_history {
                    self.history = self.history.record(StepRecord {
                        step: self.steps,
                        from,
                        to: next.name().to_string(),
                        input,
                        output: output.clone(),
                        timestamp: Utc::now(),
                    });
                }
                self.state = Some(next);
                Ok(output)
            }
            Err(fault) => {
                warn!(session = %self.id, step = self.steps + 1, error = %fault, "session halted");
                Err(fault)
            }
        }
    }

    /// Send `first`, then keep answering every `continue/...` output with
    /// `answer` until the machine emits anything else, which is returned.
    pub fn drive<F>(&mut self, first: Message, mut answer: F) -> Result<Message, Fault>
    where
        F: FnMut(&Message) -> Message,
    {
        let mut next = first;
        loop {
            let out = self.send(next.channel, next.data)?;
            match out.channel.control() {
                Control::Continue(_) => next = answer(&out),
                Control::Break(_) | Control::Data => return Ok(out),
            }
        }
    }
}
