//! Orders
//!
//! Tracking of submitted orders. An order moves forward through
//! `Pending -> Confirmed -> Delivering -> Delivered` and can be cancelled
//! until it leaves the store.

use std::{fmt, str::FromStr};

use thiserror::Error;
use tracing::debug;

use crate::checkout::OrderDraft;

/// Errors raised by order status changes.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderError {
    /// The requested status change is not allowed.
    #[error("cannot move order from {from} to {to}")]
    InvalidTransition {
        /// Current status
        from: OrderStatus,
        /// Requested status
        to: OrderStatus,
    },

    /// A stored status string was not recognised.
    #[error("unknown order status: {0}")]
    UnknownStatus(String),
}

/// Where an order is in its lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    /// Submitted, waiting for the store
    #[default]
    Pending,
    /// Accepted by the store
    Confirmed,
    /// With the courier
    Delivering,
    /// Handed to the customer
    Delivered,
    /// Cancelled before delivery
    Cancelled,
}

impl OrderStatus {
    /// The status as stored by the backend.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Delivering => "delivering",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Whether moving to `next` is allowed.
    #[must_use]
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Pending, OrderStatus::Confirmed | OrderStatus::Cancelled)
                | (OrderStatus::Confirmed, OrderStatus::Delivering | OrderStatus::Cancelled)
                | (OrderStatus::Delivering, OrderStatus::Delivered)
        )
    }

    /// Whether the order can still be cancelled.
    #[must_use]
    pub fn can_cancel(self) -> bool {
        self.can_transition_to(OrderStatus::Cancelled)
    }

    /// Whether no further changes are possible.
    #[must_use]
    pub fn is_final(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "confirmed" => Ok(OrderStatus::Confirmed),
            "delivering" => Ok(OrderStatus::Delivering),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" | "canceled" => Ok(OrderStatus::Cancelled),
            _ => Err(OrderError::UnknownStatus(s.to_string())),
        }
    }
}

/// A submitted order.
#[derive(Debug, Clone, PartialEq)]
pub struct Order<'a> {
    id: String,
    draft: OrderDraft<'a>,
    status: OrderStatus,
    cancel_reason: Option<String>,
}

impl<'a> Order<'a> {
    /// A freshly submitted order.
    pub fn new(id: impl Into<String>, draft: OrderDraft<'a>) -> Self {
        Self {
            id: id.into(),
            draft,
            status: OrderStatus::Pending,
            cancel_reason: None,
        }
    }

    /// Returns the order id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the priced order contents
    pub fn draft(&self) -> &OrderDraft<'a> {
        &self.draft
    }

    /// Returns the current status
    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// Returns why the order was cancelled
    pub fn cancel_reason(&self) -> Option<&str> {
        self.cancel_reason.as_deref()
    }

    /// Move the order to `next`.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::InvalidTransition`] if `next` is not reachable from the
    /// current status.
    pub fn transition(&mut self, next: OrderStatus) -> Result<(), OrderError> {
        if !self.status.can_transition_to(next) {
            return Err(OrderError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }

        debug!(order_id = %self.id, from = %self.status, to = %next, "order status changed");

        self.status = next;

        Ok(())
    }

    /// Store accepts the order.
    ///
    /// # Errors
    ///
    /// See [`Order::transition`].
    pub fn confirm(&mut self) -> Result<(), OrderError> {
        self.transition(OrderStatus::Confirmed)
    }

    /// Courier picks the order up.
    ///
    /// # Errors
    ///
    /// See [`Order::transition`].
    pub fn start_delivery(&mut self) -> Result<(), OrderError> {
        self.transition(OrderStatus::Delivering)
    }

    /// Customer receives the order.
    ///
    /// # Errors
    ///
    /// See [`Order::transition`].
    pub fn deliver(&mut self) -> Result<(), OrderError> {
        self.transition(OrderStatus::Delivered)
    }

    /// Cancel the order.
    ///
    /// # Errors
    ///
    /// See [`Order::transition`].
    pub fn cancel(&mut self, reason: impl Into<String>) -> Result<(), OrderError> {
        self.transition(OrderStatus::Cancelled)?;
        self.cancel_reason = Some(reason.into());

        Ok(())
    }
}
