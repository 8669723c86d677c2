pub mod gather;
pub mod history;
pub mod session;
pub mod settings;

pub use gather::*;
pub use history::*;
pub use session::*;
pub use settings::*;
