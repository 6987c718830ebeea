//! Error types for encoding and decoding.

/// Errors produced by the codec. Encoding and decoding are atomic: any of
/// these aborts the whole operation, nothing partial is recovered.
#[derive(Debug, thiserror::Error)]
pub enum HuffError {
    /// File open/read/write failure.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// No symbols to encode. Cannot normally occur since the EOS
    /// pseudo-symbol is always injected.
    #[error("empty input: no symbols to encode")]
    EmptyInput,

    /// The fixed-width header fields cannot represent this input: more than
    /// 255 distinct symbols, or a canonical code longer than 8 bits.
    #[error("capacity exceeded: {0}")]
    CapacityExceeded(&'static str),

    /// Symbol count of zero, truncated header bytes, or a (symbol, length)
    /// list that does not describe a valid prefix-free code.
    #[error("malformed header: {0}")]
    MalformedHeader(&'static str),

    /// The payload ran out of bits before the EOS code was matched.
    #[error("corrupt payload: end of input reached before end-of-stream code")]
    CorruptPayload,
}
