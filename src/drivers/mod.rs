// PalmCare — Hardware Drivers

pub mod bus;
pub mod max30102;
pub mod mlx90614;
