mod finger;

pub(crate) use finger::push_unique_point;
pub use finger::{FingerJoint, FingerPattern, Gender};
