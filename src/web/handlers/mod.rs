// Route handlers, one module per API area.

pub mod maps;
pub mod places;
pub mod regions;
pub mod session;
