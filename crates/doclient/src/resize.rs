//! Multi-step droplet resize choreography.
//!
//! Resizing requires the droplet to be powered off, so the operation is a
//! sequence of three actions: power off, resize, power on. How long the
//! droplet needs between steps to settle depends on its actual power-state
//! transition, which the API does not report synchronously. The choreography
//! therefore executes one step per [`ResizeOperation::advance`] call and
//! hands control back, letting the caller poll or wait as it sees fit. There
//! is no automatic rollback: a failed step surfaces its error and leaves the
//! operation where it stopped.

use crate::client::DoClient;
use crate::models::{ActionStatus, DropletActionRequest, DropletId};
use doclient_core::Result;
use std::time::Duration;
use tokio::time::sleep;

/// Phases of the resize choreography, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizePhase {
    /// No step has run yet.
    Pending,
    /// The power-off action has been issued.
    PoweredOff,
    /// The resize action has been issued.
    ResizeRequested,
    /// The power-on action has been issued; the operation is complete.
    PoweredOn,
}

/// An in-flight droplet resize.
///
/// Created by [`DoClient::resize_droplet`]; borrows the facade for its
/// lifetime and issues each action through it.
#[derive(Debug)]
pub struct ResizeOperation<'a> {
    client: &'a DoClient,
    droplet_id: DropletId,
    size: String,
    disk: Option<bool>,
    phase: ResizePhase,
}

impl<'a> ResizeOperation<'a> {
    pub(crate) fn new(
        client: &'a DoClient,
        droplet_id: DropletId,
        size: String,
        disk: Option<bool>,
    ) -> Self {
        Self {
            client,
            droplet_id,
            size,
            disk,
            phase: ResizePhase::Pending,
        }
    }

    /// The droplet being resized.
    #[must_use]
    pub const fn droplet_id(&self) -> DropletId {
        self.droplet_id
    }

    /// The target size slug.
    #[must_use]
    pub fn size(&self) -> &str {
        &self.size
    }

    /// The phase reached so far.
    #[must_use]
    pub const fn phase(&self) -> ResizePhase {
        self.phase
    }

    /// Whether all steps have been issued.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        matches!(self.phase, ResizePhase::PoweredOn)
    }

    /// Execute exactly one step and return the phase reached.
    ///
    /// Calling `advance` on a completed operation is a no-op.
    ///
    /// # Errors
    ///
    /// Propagates the failing step's error; the phase is not advanced, so a
    /// retry re-issues the same step.
    pub async fn advance(&mut self) -> Result<ResizePhase> {
        match self.phase {
            ResizePhase::Pending => {
                self.client
                    .droplet_action(self.droplet_id, &DropletActionRequest::PowerOff)
                    .await?;
                self.phase = ResizePhase::PoweredOff;
            }
            ResizePhase::PoweredOff => {
                let action = DropletActionRequest::Resize {
                    size: self.size.clone(),
                    disk: self.disk,
                };
                self.client.droplet_action(self.droplet_id, &action).await?;
                self.phase = ResizePhase::ResizeRequested;
            }
            ResizePhase::ResizeRequested => {
                self.client
                    .droplet_action(self.droplet_id, &DropletActionRequest::PowerOn)
                    .await?;
                self.phase = ResizePhase::PoweredOn;
            }
            ResizePhase::PoweredOn => {}
        }
        Ok(self.phase)
    }

    /// Drive all remaining steps, sleeping `settle` between them.
    ///
    /// The fixed delay is a blind guess at how long the power-state
    /// transition takes; prefer driving [`Self::advance`] with real status
    /// polling where timing matters.
    ///
    /// # Errors
    ///
    /// Propagates the first failing step's error.
    pub async fn run_with_settle(mut self, settle: Duration) -> Result<ActionStatus> {
        while !self.is_complete() {
            self.advance().await?;
            if !self.is_complete() && !settle.is_zero() {
                sleep(settle).await;
            }
        }
        Ok(ActionStatus::new(format!(
            "Resized droplet {} to {}",
            self.droplet_id, self.size
        )))
    }
}
