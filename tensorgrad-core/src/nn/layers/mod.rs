pub mod batch_norm;
pub mod conv;
pub mod dropout;
pub mod embedding;
pub mod linear;
pub mod lrn;
pub mod lstm;
pub mod peephole_lstm;
pub mod pool;
pub(crate) mod recurrent;

pub use batch_norm::{BatchNormMode, BatchNormalize};
pub use conv::{Conv2d, Deconv2d, Window2d};
pub use dropout::{Dropout, SpatialDropout};
pub use embedding::Embedding;
pub use linear::Linear;
pub use lrn::Lrn;
pub use lstm::Lstm;
pub use peephole_lstm::PeepholeLstm;
pub use pool::{AveragePool2d, MaxPool2d};
