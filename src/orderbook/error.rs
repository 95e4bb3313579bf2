//! Order book error types

use std::fmt;

use rust_decimal::Decimal;

use super::events::EventKind;
use super::order::OrderId;

/// Errors that can occur within the order book engine.
///
/// All mutation failures are local and non-fatal: the book is left unchanged
/// and the error is returned to the caller. A market order that matches less
/// than it requested is not an error; see
/// [`MarketOrderResult`](crate::orderbook::matching::MarketOrderResult).
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum OrderBookError {
    /// An order with this id is already resting in the book
    DuplicateOrder {
        /// The conflicting order id
        id: OrderId,
    },

    /// No resting order with this id
    OrderNotFound {
        /// The id that was looked up
        id: OrderId,
    },

    /// Requested size is not valid for the order's current fill state
    InvalidSize {
        /// The order being updated
        id: OrderId,
        /// The requested new total size
        size: Decimal,
        /// Quantity already filled; the new size must exceed this
        filled: Decimal,
    },

    /// Event kind is not one the engine dispatches
    UnknownEventKind {
        /// The kind that failed dispatch
        kind: String,
    },

    /// Event payload lacks a field required by its kind
    MissingEventField {
        /// The event kind being dispatched
        kind: EventKind,
        /// Name of the missing field
        field: &'static str,
    },

    /// Error while serializing snapshot data
    SerializationError {
        /// Underlying error message
        message: String,
    },

    /// Error while deserializing snapshot data
    DeserializationError {
        /// Underlying error message
        message: String,
    },

    /// Snapshot integrity check failed
    ChecksumMismatch {
        /// Expected checksum value
        expected: String,
        /// Actual checksum value
        actual: String,
    },

    /// Snapshot package was written with an unsupported format version
    UnsupportedVersion {
        /// Version found in the package
        version: u32,
        /// Version this build understands
        expected: u32,
    },
}

impl fmt::Display for OrderBookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderBookError::DuplicateOrder { id } => {
                write!(f, "Duplicate order id: {id}")
            }
            OrderBookError::OrderNotFound { id } => {
                write!(f, "Order not found: {id}")
            }
            OrderBookError::InvalidSize { id, size, filled } => {
                write!(
                    f,
                    "Invalid size for order {id}: new size {size} must exceed filled {filled}"
                )
            }
            OrderBookError::UnknownEventKind { kind } => {
                write!(f, "Unknown event kind: {kind}")
            }
            OrderBookError::MissingEventField { kind, field } => {
                write!(f, "Event of kind {kind} is missing required field `{field}`")
            }
            OrderBookError::SerializationError { message } => {
                write!(f, "Serialization error: {message}")
            }
            OrderBookError::DeserializationError { message } => {
                write!(f, "Deserialization error: {message}")
            }
            OrderBookError::ChecksumMismatch { expected, actual } => {
                write!(
                    f,
                    "Checksum mismatch: expected {expected}, but computed {actual}"
                )
            }
            OrderBookError::UnsupportedVersion { version, expected } => {
                write!(
                    f,
                    "Unsupported snapshot version: {version} (expected {expected})"
                )
            }
        }
    }
}

impl std::error::Error for OrderBookError {}
