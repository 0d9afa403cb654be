//! Core of the dashboard: modes, views, navigation and the error taxonomy

pub mod action;
pub mod command;
pub mod cursor;
pub mod dispatcher;
pub mod error;
pub mod key;
pub mod mode;
pub mod view;

pub use action::{Action, Target};
pub use command::{parse_command, Command};
pub use cursor::ListCursor;
pub use dispatcher::ModeDispatcher;
pub use error::{LookupError, NavError, RpcError};
pub use key::Key;
pub use mode::Mode;
pub use view::{Bar, BarSlot, Keypress, View, ViewState, WindowSize};
