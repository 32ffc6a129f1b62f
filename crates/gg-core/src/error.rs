use thiserror::Error;

/// Errors originating from the core pipeline.
#[derive(Error, Debug)]
pub enum CoreError {
    /// The planned grid needs more memory than could be reserved.
    #[error("Mémoire insuffisante pour les dimensions demandées ({bytes} octets)")]
    AllocationFailure {
        /// Bytes the failed reservation asked for.
        bytes: usize,
    },

    /// Source samples are not 8 bits per channel.
    #[error("Image en {bits} bits par canal, seul le 8 bits est supporté")]
    UnsupportedSampleDepth {
        /// Bits per channel reported by the decoder.
        bits: u8,
    },

    /// The solved output grid is empty; nothing is rendered for this image.
    #[error("Dimensions de sortie dégénérées : {width}×{height}")]
    DegenerateDimension {
        /// Planned width.
        width: u32,
        /// Planned height.
        height: u32,
    },

    /// Scanlines arrived out of order, out of range, or malformed.
    #[error("Flux de lignes invalide : {0}")]
    InvalidSourceStream(String),

    /// Invalid configuration value or structure.
    #[error("Configuration invalide : {0}")]
    Config(String),

    /// Invalid width/height dimensions.
    #[error("Dimensions invalides : {width}×{height}")]
    InvalidDimensions {
        /// Width value.
        width: u32,
        /// Height value.
        height: u32,
    },

    /// Writing to the output sink failed.
    #[error("Erreur d'écriture : {0}")]
    Io(#[from] std::io::Error),
}
