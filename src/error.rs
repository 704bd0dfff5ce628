/// Errors surfaced by the scroll engine.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ScrollError {
    /// Virtualization was requested but neither `item_size` nor `min_item_size`
    /// is configured, so item offsets can never be computed.
    #[error("virtualization requires at least one of `item_size` or `min_item_size`")]
    MissingItemSize,

    /// An external direct write to engine state was rejected. State is only
    /// updated through the engine's operations (`update_options` and friends).
    #[error("state field `{field}` is read-only; use `update_options` to change engine behavior")]
    ReadOnlyState { field: &'static str },
}
