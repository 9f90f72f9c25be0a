//! Neural-network building blocks on top of the autograd engine.

pub mod init;
pub mod layers;
pub mod module;
pub mod parameter;

pub use init::{Constant, Initializer, Normal, Uniform};
pub use layers::{
    AveragePool2d, BatchNormMode, BatchNormalize, Conv2d, Deconv2d, Dropout, Embedding, Linear, Lrn, Lstm,
    MaxPool2d, PeepholeLstm, SpatialDropout, Window2d,
};
pub use module::Module;
pub use parameter::Parameter;
