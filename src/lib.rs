use std::sync::Once;

pub mod dae;
pub mod s1_flat;
pub mod s2_analyzer;
pub mod s3_symbolic;
pub mod s4_generator;

static INIT: Once = Once::new();

pub fn init_logger() {
    INIT.call_once(|| {
        env_logger::init();
    });
}
