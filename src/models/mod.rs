pub mod enums;
pub mod medicine;
pub mod prescription;
pub mod seller;
pub mod stock;

pub use medicine::*;
pub use prescription::*;
pub use seller::*;
pub use stock::*;
