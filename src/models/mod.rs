pub mod conditions;
pub mod crop;
pub mod location;
pub mod season;
pub mod suggestion;
pub mod weather;

pub use conditions::*;
pub use crop::*;
pub use location::*;
pub use season::*;
pub use suggestion::*;
pub use weather::*;
