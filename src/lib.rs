/// Amount input normalization: strips thousands separators, rejects anything
/// that is not a plain decimal and clamps to the available balance.
pub mod amount;

/// Smallest-unit to display-unit conversion and amount formatting.
pub mod units;

/// Address syntax and checksum rules, receiver input classification.
pub mod address;

/// Receiver field of the send form. Names are resolved after a debounce
/// pause, and only the answer to the latest request is adopted.
pub mod receiver;

/// Assets and their balances. Balance fetches are tagged so that a late
/// answer for a previous selection is discarded.
pub mod balance;

/// Token metadata and fee schedules published by the exchange.
pub mod exchange;

/// Deposit, withdraw and send forms built on top of the modules above.
pub mod form;

/// Transaction history rows.
pub mod history;

/// Replays CSV event scripts against the forms. Used by the binary and by
/// the integration test.
pub mod bin_utils;
