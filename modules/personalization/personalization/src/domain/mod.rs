pub mod debounce;
pub mod defaults;
pub mod edit;
pub mod error;
pub mod fields;
pub mod normalize;
pub mod optimistic;
pub mod ports;
pub mod save_state;
pub mod sync;
pub mod throttle;
