pub mod logging;
pub mod mask;
