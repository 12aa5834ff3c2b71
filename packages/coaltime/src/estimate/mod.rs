pub mod acceptance;
pub mod chain_state;
pub mod coalescent_order;
pub mod estimator;
pub mod finalize;
pub mod initialize;
pub mod log_ratio;
pub mod mutation_rate;
pub mod options;
pub mod population;
pub mod retime;
pub mod running_average;
pub mod switch_order;
