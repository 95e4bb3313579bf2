//! Cross-module unit tests for the order book core.

#![cfg(test)]
