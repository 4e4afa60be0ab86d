/// Grayscale camera frames
pub mod frame;
/// Packed black/white module grid
pub mod matrix;
/// Validated encode requests
pub mod request;

pub use frame::LuminanceFrame;
pub use matrix::BitMatrix;
pub use request::EncodeRequest;
