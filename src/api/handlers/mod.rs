pub mod history;
pub mod minimum_power;
pub mod power_loss;
pub mod recommendations;
