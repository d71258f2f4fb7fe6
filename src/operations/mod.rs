pub mod boolean;
pub mod collision;
pub mod fillet;
pub mod joint;
pub mod projection;
pub mod safe_space;
