//! UI components for the chat window

mod input_bar;
mod message_list;
mod notice_bar;

pub use input_bar::InputBar;
pub use message_list::MessageList;
pub use notice_bar::NoticeBar;
