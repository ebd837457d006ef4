pub mod saturation;
