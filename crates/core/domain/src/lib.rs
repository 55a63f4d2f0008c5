pub mod data;
pub mod fields;

pub use data::{PointSample, RawSample, SampleValue};
pub use fields::{DESCRIPTORS, FieldCode, FieldDescriptor, ScaleRule};
