pub mod error;
pub mod io_struct;
pub mod relay;
pub mod server;
pub mod upstream;
