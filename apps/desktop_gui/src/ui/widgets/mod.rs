pub mod slider;

pub use slider::ParameterSlider;
