pub mod dashboard;
pub mod due;
pub mod gateway;
pub mod reminder;

pub use dashboard::Dashboard;
pub use gateway::Gateway;
