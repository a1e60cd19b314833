#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncError {
    #[error("packet must be exactly 5 bytes, got {0}")]
    WrongPacketLength(usize),

    #[error("sync marker bits set in first packet byte: {0:#04X}")]
    SyncMarkerSet(u8),

    #[error("channel sequence broken: expected channel {expected}, decoded {found}")]
    ChannelOutOfOrder { expected: u8, found: u8 },

    #[error("control or reserved symbol {0:#07b} inside packet data")]
    ForeignSymbol(u8),
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamError {
    #[error("capture exhausted before a complete frame")]
    BufferExhausted,
}
