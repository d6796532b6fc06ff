pub mod color;
pub mod easing;
pub mod spherical;
