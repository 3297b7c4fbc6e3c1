pub mod capture;
pub mod coords;
pub mod matcher;
pub mod normalize;
pub mod patterns;
pub mod types;
