//! Terminal screens and the controller that moves between them.

mod controller;
mod level;
mod menu;
mod report;
mod screen;

pub use controller::{GameController, ScreenId};
pub use level::LevelScreen;
pub use menu::{MenuField, MenuScreen};
pub use report::{ReportAction, ReportScreen, SubmissionStatus, format_duration};
pub use screen::{Screen, ScreenTransition};
